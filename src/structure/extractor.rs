// Wed Jan 21 2026 - Alex

use crate::structure::LayoutRecord;
use crate::symbol::{LocationKind, NameDecoder, SymbolError, SymbolId, SymbolProvider};

/// Functions whose name contains this are native dispatch thunks and are
/// never emitted.
pub const THUNK_MARKER: &str = "exec";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FunctionScope {
    /// Found while walking a structure.
    Member,
    /// Enumerated from the global scope.
    Global,
}

/// A named record ready to be written to the output document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Extracted {
    pub name: String,
    pub record: LayoutRecord,
}

/// Computes layout records for single data-member and function symbols.
///
/// `Ok(None)` means the symbol was declined (wrong storage class, thunk
/// name). `Err` means a property could not be read; callers skip the symbol.
pub struct LayoutExtractor<'p> {
    provider: &'p dyn SymbolProvider,
}

impl<'p> LayoutExtractor<'p> {
    pub fn new(provider: &'p dyn SymbolProvider) -> Self {
        Self { provider }
    }

    pub fn extract_field(&self, member: SymbolId) -> Result<Option<Extracted>, SymbolError> {
        let location = self.provider.location(member)?;
        if !location.is_extractable() {
            return Ok(None);
        }

        let type_id = self.provider.symbol_type(member)?;
        let offset = self.provider.offset(member)?;

        let bits = if location == LocationKind::BitField {
            let bitposition = self.provider.bit_position(member)?;
            // bitfield members report their width through their own length
            let numbits = self.provider.length(member)?;
            Some((bitposition, numbits))
        } else {
            None
        };

        let length = self.provider.length(type_id)?;
        let name = NameDecoder::read(self.provider, member)?;

        let record = match bits {
            Some((bitposition, numbits)) => LayoutRecord::Bitfield { offset, length, bitposition, numbits },
            None => LayoutRecord::Field { offset, length },
        };

        Ok(Some(Extracted { name, record }))
    }

    pub fn extract_function(&self, function: SymbolId, scope: FunctionScope) -> Result<Option<Extracted>, SymbolError> {
        let offset = self.provider.address_offset(function)?;
        let name = NameDecoder::read(self.provider, function)?;

        if is_thunk(&name) {
            return Ok(None);
        }

        let record = match scope {
            FunctionScope::Member => LayoutRecord::Method { offset },
            FunctionScope::Global => LayoutRecord::GlobalFunction { offset },
        };

        Ok(Some(Extracted { name, record }))
    }
}

pub fn is_thunk(name: &str) -> bool {
    name.contains(THUNK_MARKER)
}
