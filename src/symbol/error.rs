// Tue Jan 20 2026 - Alex

use crate::symbol::SymbolId;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SymbolError {
    #[error("Symbol database not found: {0:?}")]
    NotFound(PathBuf),
    #[error("Failed to open symbol database {path:?}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("PDB error: {0}")]
    Pdb(#[from] pdb::Error),
    #[error("Global scope unavailable: {0}")]
    GlobalScope(String),
    #[error("Unknown symbol: {0}")]
    UnknownSymbol(SymbolId),
    #[error("Symbol {id} has no {property}")]
    MissingProperty {
        id: SymbolId,
        property: &'static str,
    },
}

impl SymbolError {
    pub fn missing(id: SymbolId, property: &'static str) -> Self {
        Self::MissingProperty { id, property }
    }
}
