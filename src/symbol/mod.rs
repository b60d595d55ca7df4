// Tue Jan 20 2026 - Alex

pub mod error;
pub mod loader;
pub mod name;
pub mod provider;
pub mod tree;

pub use error::SymbolError;
pub use name::NameDecoder;
pub use loader::PdbLoader;
pub use provider::{LocationKind, NativeName, SymbolId, SymbolKind, SymbolProvider};
pub use tree::{SymbolNode, SymbolTree};
