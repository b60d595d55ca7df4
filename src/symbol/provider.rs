// Tue Jan 20 2026 - Alex

use crate::symbol::SymbolError;
use std::borrow::Cow;
use std::fmt;

/// Opaque handle to a node owned by a [`SymbolProvider`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SymbolId(u32);

impl SymbolId {
    pub fn new(value: u32) -> Self {
        Self(value)
    }

    pub fn as_usize(&self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for SymbolId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SymbolKind {
    GlobalScope,
    /// Data member, enumerate or static variable.
    Data,
    /// Class, struct, union or enum.
    UserType,
    Function,
    /// Primitives, pointers, arrays and anything else the walker does not descend.
    Other,
}

impl SymbolKind {
    pub fn is_user_type(self) -> bool {
        matches!(self, Self::UserType)
    }
}

/// Storage classification of a data symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LocationKind {
    /// Byte offset from the owning structure's base.
    ThisRelative,
    /// Bit range inside a storage unit of the owning structure.
    BitField,
    Static,
    Constant,
    Register,
    None,
}

impl LocationKind {
    pub fn is_extractable(self) -> bool {
        matches!(self, Self::ThisRelative | Self::BitField)
    }
}

/// Name as stored by the provider, before decoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NativeName<'a> {
    bytes: Cow<'a, [u8]>,
}

impl<'a> NativeName<'a> {
    pub fn borrowed(bytes: &'a [u8]) -> Self {
        Self { bytes: Cow::Borrowed(bytes) }
    }

    pub fn owned(bytes: Vec<u8>) -> Self {
        Self { bytes: Cow::Owned(bytes) }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Read-only view over a debug symbol database.
///
/// Every accessor is a single attempt: a property the symbol does not carry
/// comes back as [`SymbolError::MissingProperty`], never as a default value.
pub trait SymbolProvider {
    fn global_scope(&self) -> Result<SymbolId, SymbolError>;

    /// Immediate children of `parent`, optionally restricted to one kind.
    fn children(&self, parent: SymbolId, filter: Option<SymbolKind>) -> Result<Vec<SymbolId>, SymbolError>;

    fn kind(&self, id: SymbolId) -> Result<SymbolKind, SymbolError>;

    fn name(&self, id: SymbolId) -> Result<NativeName<'_>, SymbolError>;

    /// Declared type of a data symbol, already resolved to its definition.
    fn symbol_type(&self, id: SymbolId) -> Result<SymbolId, SymbolError>;

    fn location(&self, id: SymbolId) -> Result<LocationKind, SymbolError>;

    fn offset(&self, id: SymbolId) -> Result<i64, SymbolError>;

    fn bit_position(&self, id: SymbolId) -> Result<u32, SymbolError>;

    /// Byte size for types, bit width for bitfield members.
    fn length(&self, id: SymbolId) -> Result<u64, SymbolError>;

    fn address_offset(&self, id: SymbolId) -> Result<u32, SymbolError>;
}
