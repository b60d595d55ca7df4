// Tue Jan 20 2026 - Alex

use crate::symbol::{NativeName, SymbolError, SymbolId, SymbolProvider};

pub struct NameDecoder;

impl NameDecoder {
    /// Converts a provider name into an owned string. Invalid UTF-8 is
    /// replaced, trailing NULs from fixed-size records are dropped.
    pub fn decode(name: NativeName<'_>) -> String {
        let bytes = name.as_bytes();
        let end = bytes.iter().rposition(|&b| b != 0).map_or(0, |i| i + 1);
        String::from_utf8_lossy(&bytes[..end]).into_owned()
    }

    /// Reads and decodes the name of `id`. Empty names count as missing.
    pub fn read(provider: &dyn SymbolProvider, id: SymbolId) -> Result<String, SymbolError> {
        let decoded = Self::decode(provider.name(id)?);
        if decoded.is_empty() {
            return Err(SymbolError::missing(id, "name"));
        }
        Ok(decoded)
    }
}
