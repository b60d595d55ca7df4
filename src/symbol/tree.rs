// Tue Jan 20 2026 - Alex

use crate::symbol::{LocationKind, NativeName, SymbolError, SymbolId, SymbolKind, SymbolProvider};

/// One entry of a [`SymbolTree`]. Properties left as `None` read back as missing.
#[derive(Debug, Clone)]
pub struct SymbolNode {
    kind: SymbolKind,
    name: Vec<u8>,
    type_id: Option<SymbolId>,
    location: Option<LocationKind>,
    offset: Option<i64>,
    bit_position: Option<u32>,
    length: Option<u64>,
    address_offset: Option<u32>,
    children: Vec<SymbolId>,
}

impl SymbolNode {
    pub fn new(kind: SymbolKind, name: impl Into<Vec<u8>>) -> Self {
        Self {
            kind,
            name: name.into(),
            type_id: None,
            location: None,
            offset: None,
            bit_position: None,
            length: None,
            address_offset: None,
            children: Vec::new(),
        }
    }

    pub fn with_type(mut self, type_id: SymbolId) -> Self {
        self.type_id = Some(type_id);
        self
    }

    pub fn with_location(mut self, location: LocationKind) -> Self {
        self.location = Some(location);
        self
    }

    pub fn with_offset(mut self, offset: i64) -> Self {
        self.offset = Some(offset);
        self
    }

    pub fn with_bit_position(mut self, bit_position: u32) -> Self {
        self.bit_position = Some(bit_position);
        self
    }

    pub fn with_length(mut self, length: u64) -> Self {
        self.length = Some(length);
        self
    }

    pub fn with_address_offset(mut self, address_offset: u32) -> Self {
        self.address_offset = Some(address_offset);
        self
    }
}

/// In-memory symbol database. Node 0 is the global scope.
#[derive(Debug, Clone)]
pub struct SymbolTree {
    nodes: Vec<SymbolNode>,
}

impl SymbolTree {
    pub fn new() -> Self {
        Self {
            nodes: vec![SymbolNode::new(SymbolKind::GlobalScope, Vec::<u8>::new())],
        }
    }

    pub fn global_scope_id(&self) -> SymbolId {
        SymbolId::new(0)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.len() <= 1
    }

    /// Adds `node`, attaching it to `parent` when one is given. Types that are
    /// only reachable through a member's type reference are added detached.
    pub fn insert(&mut self, parent: Option<SymbolId>, node: SymbolNode) -> SymbolId {
        let id = SymbolId::new(self.nodes.len() as u32);
        self.nodes.push(node);
        if let Some(parent) = parent {
            self.add_child(parent, id);
        }
        id
    }

    /// Links an existing node under `parent`. Linking a type under itself is
    /// allowed and produces a cyclic graph.
    pub fn add_child(&mut self, parent: SymbolId, child: SymbolId) {
        if let Some(node) = self.nodes.get_mut(parent.as_usize()) {
            node.children.push(child);
        }
    }

    pub fn add_udt(&mut self, parent: SymbolId, name: &str, length: u64) -> SymbolId {
        self.insert(Some(parent), SymbolNode::new(SymbolKind::UserType, name).with_length(length))
    }

    pub fn add_detached_udt(&mut self, name: &str, length: u64) -> SymbolId {
        self.insert(None, SymbolNode::new(SymbolKind::UserType, name).with_length(length))
    }

    pub fn add_base_type(&mut self, name: &str, length: u64) -> SymbolId {
        self.insert(None, SymbolNode::new(SymbolKind::Other, name).with_length(length))
    }

    pub fn add_member(&mut self, owner: SymbolId, name: &str, offset: i64, type_id: SymbolId) -> SymbolId {
        let node = SymbolNode::new(SymbolKind::Data, name)
            .with_location(LocationKind::ThisRelative)
            .with_offset(offset)
            .with_type(type_id);
        self.insert(Some(owner), node)
    }

    pub fn add_bitfield(
        &mut self,
        owner: SymbolId,
        name: &str,
        offset: i64,
        bit_position: u32,
        num_bits: u64,
        type_id: SymbolId,
    ) -> SymbolId {
        let node = SymbolNode::new(SymbolKind::Data, name)
            .with_location(LocationKind::BitField)
            .with_offset(offset)
            .with_bit_position(bit_position)
            .with_length(num_bits)
            .with_type(type_id);
        self.insert(Some(owner), node)
    }

    pub fn add_static_member(&mut self, owner: SymbolId, name: &str, type_id: SymbolId) -> SymbolId {
        let node = SymbolNode::new(SymbolKind::Data, name)
            .with_location(LocationKind::Static)
            .with_type(type_id);
        self.insert(Some(owner), node)
    }

    pub fn add_constant(&mut self, owner: SymbolId, name: &str, type_id: SymbolId) -> SymbolId {
        let node = SymbolNode::new(SymbolKind::Data, name)
            .with_location(LocationKind::Constant)
            .with_type(type_id);
        self.insert(Some(owner), node)
    }

    pub fn add_function(&mut self, parent: SymbolId, name: &str, address_offset: u32) -> SymbolId {
        let node = SymbolNode::new(SymbolKind::Function, name).with_address_offset(address_offset);
        self.insert(Some(parent), node)
    }

    pub fn add_other(&mut self, parent: SymbolId, name: &str) -> SymbolId {
        self.insert(Some(parent), SymbolNode::new(SymbolKind::Other, name))
    }

    fn node(&self, id: SymbolId) -> Result<&SymbolNode, SymbolError> {
        self.nodes.get(id.as_usize()).ok_or(SymbolError::UnknownSymbol(id))
    }
}

impl Default for SymbolTree {
    fn default() -> Self {
        Self::new()
    }
}

impl SymbolProvider for SymbolTree {
    fn global_scope(&self) -> Result<SymbolId, SymbolError> {
        Ok(self.global_scope_id())
    }

    fn children(&self, parent: SymbolId, filter: Option<SymbolKind>) -> Result<Vec<SymbolId>, SymbolError> {
        let node = self.node(parent)?;
        let mut children = Vec::with_capacity(node.children.len());
        for &child in &node.children {
            let kind = self.node(child)?.kind;
            if filter.map_or(true, |wanted| wanted == kind) {
                children.push(child);
            }
        }
        Ok(children)
    }

    fn kind(&self, id: SymbolId) -> Result<SymbolKind, SymbolError> {
        Ok(self.node(id)?.kind)
    }

    fn name(&self, id: SymbolId) -> Result<NativeName<'_>, SymbolError> {
        Ok(NativeName::borrowed(&self.node(id)?.name))
    }

    fn symbol_type(&self, id: SymbolId) -> Result<SymbolId, SymbolError> {
        let type_id = self.node(id)?.type_id.ok_or_else(|| SymbolError::missing(id, "type"))?;
        self.node(type_id)?;
        Ok(type_id)
    }

    fn location(&self, id: SymbolId) -> Result<LocationKind, SymbolError> {
        self.node(id)?.location.ok_or_else(|| SymbolError::missing(id, "location"))
    }

    fn offset(&self, id: SymbolId) -> Result<i64, SymbolError> {
        self.node(id)?.offset.ok_or_else(|| SymbolError::missing(id, "offset"))
    }

    fn bit_position(&self, id: SymbolId) -> Result<u32, SymbolError> {
        self.node(id)?.bit_position.ok_or_else(|| SymbolError::missing(id, "bit position"))
    }

    fn length(&self, id: SymbolId) -> Result<u64, SymbolError> {
        self.node(id)?.length.ok_or_else(|| SymbolError::missing(id, "length"))
    }

    fn address_offset(&self, id: SymbolId) -> Result<u32, SymbolError> {
        self.node(id)?.address_offset.ok_or_else(|| SymbolError::missing(id, "address offset"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_children_filtered_by_kind() {
        let mut tree = SymbolTree::new();
        let global = tree.global_scope_id();
        let foo = tree.add_udt(global, "Foo", 8);
        tree.add_function(global, "Bar", 0x1000);

        let udts = tree.children(global, Some(SymbolKind::UserType)).unwrap();
        assert_eq!(udts, vec![foo]);

        let all = tree.children(global, None).unwrap();
        assert_eq!(all.len(), 2);
    }

    #[test]
    fn test_missing_properties_are_errors() {
        let mut tree = SymbolTree::new();
        let global = tree.global_scope_id();
        let foo = tree.add_udt(global, "Foo", 8);

        assert!(matches!(tree.offset(foo), Err(SymbolError::MissingProperty { .. })));
        assert!(matches!(tree.symbol_type(foo), Err(SymbolError::MissingProperty { .. })));
        assert_eq!(tree.length(foo).unwrap(), 8);
    }

    #[test]
    fn test_unknown_symbol() {
        let tree = SymbolTree::new();
        assert!(matches!(tree.kind(SymbolId::new(42)), Err(SymbolError::UnknownSymbol(_))));
        assert!(tree.is_empty());
    }

    #[test]
    fn test_dangling_type_reference_is_unresolved() {
        let mut tree = SymbolTree::new();
        let global = tree.global_scope_id();
        let foo = tree.add_udt(global, "Foo", 8);
        let member = tree.add_member(foo, "x", 0, SymbolId::new(999));

        assert!(matches!(tree.symbol_type(member), Err(SymbolError::UnknownSymbol(_))));
    }
}
