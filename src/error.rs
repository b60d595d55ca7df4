// Thu Jan 22 2026 - Alex

use crate::config::ConfigError;
use crate::output::OutputError;
use crate::symbol::SymbolError;
use thiserror::Error;

/// Failures that abort a run. None of them leave an output file behind.
#[derive(Error, Debug)]
pub enum DumpError {
    #[error(transparent)]
    Symbol(#[from] SymbolError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Output(#[from] OutputError),
}

impl DumpError {
    pub fn exit_code(&self) -> i32 {
        match self {
            DumpError::Symbol(SymbolError::NotFound(_)) => 2,
            DumpError::Symbol(SymbolError::Open { .. }) => 3,
            DumpError::Symbol(_) => 4,
            DumpError::Config(_) => 5,
            DumpError::Output(_) => 6,
        }
    }
}
