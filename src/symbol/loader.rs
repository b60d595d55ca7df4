// Wed Jan 21 2026 - Alex

use crate::symbol::{LocationKind, SymbolError, SymbolId, SymbolKind, SymbolNode, SymbolProvider, SymbolTree};
use crate::utils::logging::scoped_timer;
use memmap2::Mmap;
use pdb::{FallibleIterator, Indirection, PrimitiveKind, SymbolData, TypeData, TypeFinder, TypeIndex, PDB};
use std::collections::HashMap;
use std::fs::File;
use std::io::Cursor;
use std::path::{Path, PathBuf};

/// Loads a program database into an in-memory [`SymbolTree`].
///
/// The type stream is converted eagerly: every class, union and enum
/// definition becomes a global user type with its field list as children.
/// Procedures from the module streams are attached to the user type named by
/// their scope prefix, everything else lands in the global scope.
pub struct PdbLoader {
    path: PathBuf,
}

impl PdbLoader {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn load(&self) -> Result<SymbolTree, SymbolError> {
        if !self.path.exists() {
            return Err(SymbolError::NotFound(self.path.clone()));
        }

        let file = File::open(&self.path)
            .map_err(|source| SymbolError::Open { path: self.path.clone(), source })?;
        let mmap = unsafe { Mmap::map(&file) }
            .map_err(|source| SymbolError::Open { path: self.path.clone(), source })?;

        let mut pdb = PDB::open(Cursor::new(mmap))?;

        let mut linker = {
            let _timer = scoped_timer("pdb types");
            let type_information = pdb.type_information()?;
            let collected = collect_definitions(&type_information)?;
            let mut converter = TypeConverter::new(&collected.finder, collected.definitions);
            for index in &collected.top_level {
                converter.add_top_level(*index);
            }
            converter.finish()
        };

        let _timer = scoped_timer("pdb procedures");
        let dbi = pdb.debug_information()?;
        let mut modules = dbi.modules()?;
        let mut procedures = 0usize;
        while let Some(module) = modules.next()? {
            let info = match pdb.module_info(&module)? {
                Some(info) => info,
                None => continue,
            };
            let mut symbols = info.symbols()?;
            while let Some(symbol) = symbols.next()? {
                if let Ok(SymbolData::Procedure(procedure)) = symbol.parse() {
                    linker.add_procedure(procedure.name.as_bytes(), procedure.offset.offset);
                    procedures += 1;
                }
            }
        }

        log::debug!(
            "Loaded {} symbols ({} user types, {} procedures) from {}",
            linker.tree.len(),
            linker.user_types.len(),
            procedures,
            self.path.display()
        );

        Ok(linker.tree)
    }
}

struct Definitions<'t> {
    finder: TypeFinder<'t>,
    /// Unique name (or plain name) of each definition to its type index.
    definitions: HashMap<Vec<u8>, TypeIndex>,
    /// First definition of every distinct name, in stream order.
    top_level: Vec<TypeIndex>,
}

fn collect_definitions<'t>(type_information: &'t pdb::TypeInformation<'_>) -> Result<Definitions<'t>, SymbolError> {
    let mut finder = type_information.finder();
    let mut iter = type_information.iter();
    let mut definitions = HashMap::new();
    let mut seen_names = HashMap::new();
    let mut top_level = Vec::new();

    while let Some(item) = iter.next()? {
        finder.update(&iter);

        let Ok(data) = item.parse() else { continue };
        let Some((name, unique_name)) = definition_names(&data) else { continue };

        let key = unique_name.unwrap_or(name).to_vec();
        definitions.entry(key).or_insert(item.index());
        definitions.entry(name.to_vec()).or_insert(item.index());

        if seen_names.insert(name.to_vec(), item.index()).is_none() {
            top_level.push(item.index());
        }
    }

    Ok(Definitions { finder, definitions, top_level })
}

/// Name and unique name of a complete class, union or enum definition.
fn definition_names<'a>(data: &'a TypeData<'_>) -> Option<(&'a [u8], Option<&'a [u8]>)> {
    let (properties, name, unique_name) = match data {
        TypeData::Class(class) => (class.properties, class.name, class.unique_name),
        TypeData::Union(union) => (union.properties, union.name, union.unique_name),
        TypeData::Enumeration(enumeration) => (enumeration.properties, enumeration.name, enumeration.unique_name),
        _ => return None,
    };
    if properties.forward_reference() || name.as_bytes().is_empty() {
        return None;
    }
    Some((name.as_bytes(), unique_name.map(|n| n.as_bytes())))
}

struct TypeConverter<'a, 't> {
    finder: &'a TypeFinder<'t>,
    definitions: HashMap<Vec<u8>, TypeIndex>,
    converted: HashMap<TypeIndex, SymbolId>,
    user_types: HashMap<String, SymbolId>,
    tree: SymbolTree,
}

impl<'a, 't> TypeConverter<'a, 't> {
    fn new(finder: &'a TypeFinder<'t>, definitions: HashMap<Vec<u8>, TypeIndex>) -> Self {
        Self {
            finder,
            definitions,
            converted: HashMap::new(),
            user_types: HashMap::new(),
            tree: SymbolTree::new(),
        }
    }

    fn finish(self) -> ProcedureLinker {
        ProcedureLinker {
            user_types: self.user_types,
            tree: self.tree,
        }
    }

    fn add_top_level(&mut self, index: TypeIndex) {
        match self.convert(index) {
            Ok(id) => {
                let global = self.tree.global_scope_id();
                self.tree.add_child(global, id);
                if let Ok(name) = self.tree.name(id) {
                    let name = String::from_utf8_lossy(name.as_bytes()).into_owned();
                    self.user_types.entry(name).or_insert(id);
                }
            }
            Err(e) => log::trace!("Skipping type {:?}: {}", index, e),
        }
    }

    fn convert(&mut self, index: TypeIndex) -> Result<SymbolId, SymbolError> {
        if let Some(&id) = self.converted.get(&index) {
            return Ok(id);
        }

        let data = match self.finder.find(index)?.parse() {
            Ok(data) => data,
            Err(e) => {
                log::trace!("Unparsed type {:?}: {}", index, e);
                return Ok(self.remember(index, SymbolNode::new(SymbolKind::Other, Vec::<u8>::new())));
            }
        };

        match data {
            TypeData::Class(class) => {
                if class.properties.forward_reference() {
                    return self.convert_forward(index, class.name.as_bytes(), class.unique_name.map(|n| n.as_bytes()));
                }
                let node = SymbolNode::new(SymbolKind::UserType, class.name.as_bytes()).with_length(u64::from(class.size));
                let id = self.remember(index, node);
                self.populate_fields(id, class.fields);
                Ok(id)
            }
            TypeData::Union(union) => {
                if union.properties.forward_reference() {
                    return self.convert_forward(index, union.name.as_bytes(), union.unique_name.map(|n| n.as_bytes()));
                }
                let node = SymbolNode::new(SymbolKind::UserType, union.name.as_bytes()).with_length(u64::from(union.size));
                let id = self.remember(index, node);
                self.populate_fields(id, Some(union.fields));
                Ok(id)
            }
            TypeData::Enumeration(enumeration) => {
                if enumeration.properties.forward_reference() {
                    return self.convert_forward(
                        index,
                        enumeration.name.as_bytes(),
                        enumeration.unique_name.map(|n| n.as_bytes()),
                    );
                }
                let underlying = self.convert(enumeration.underlying_type)?;
                let mut node = SymbolNode::new(SymbolKind::UserType, enumeration.name.as_bytes());
                if let Ok(length) = self.tree.length(underlying) {
                    node = node.with_length(length);
                }
                let id = self.remember(index, node);
                self.populate_fields(id, Some(enumeration.fields));
                Ok(id)
            }
            TypeData::Modifier(modifier) => {
                let id = self.convert(modifier.underlying_type)?;
                self.converted.insert(index, id);
                Ok(id)
            }
            TypeData::Primitive(primitive) => {
                let length = match primitive.indirection {
                    Some(Indirection::Near32) => 4,
                    Some(_) => 8,
                    None => primitive_length(primitive.kind),
                };
                let name = format!("{:?}", primitive.kind);
                Ok(self.remember(index, SymbolNode::new(SymbolKind::Other, name).with_length(length)))
            }
            TypeData::Pointer(pointer) => {
                let node = SymbolNode::new(SymbolKind::Other, "pointer").with_length(u64::from(pointer.attributes.size()));
                Ok(self.remember(index, node))
            }
            TypeData::Array(array) => {
                let length = array.dimensions.iter().copied().max().unwrap_or(0);
                let node = SymbolNode::new(SymbolKind::Other, "array").with_length(u64::from(length));
                Ok(self.remember(index, node))
            }
            TypeData::Bitfield(bitfield) => {
                let id = self.convert(bitfield.underlying_type)?;
                self.converted.insert(index, id);
                Ok(id)
            }
            _ => Ok(self.remember(index, SymbolNode::new(SymbolKind::Other, Vec::<u8>::new()))),
        }
    }

    fn convert_forward(&mut self, index: TypeIndex, name: &[u8], unique_name: Option<&[u8]>) -> Result<SymbolId, SymbolError> {
        let definition = unique_name
            .and_then(|unique| self.definitions.get(unique))
            .or_else(|| self.definitions.get(name))
            .copied();

        match definition {
            Some(definition) if definition != index => {
                let id = self.convert(definition)?;
                self.converted.insert(index, id);
                Ok(id)
            }
            _ => Ok(self.remember(index, SymbolNode::new(SymbolKind::UserType, name).with_length(0))),
        }
    }

    fn remember(&mut self, index: TypeIndex, node: SymbolNode) -> SymbolId {
        let id = self.tree.insert(None, node);
        self.converted.insert(index, id);
        id
    }

    fn populate_fields(&mut self, owner: SymbolId, fields: Option<TypeIndex>) {
        let mut next = fields;
        while let Some(index) = next.take() {
            let list = match self.finder.find(index).and_then(|item| item.parse()) {
                Ok(TypeData::FieldList(list)) => list,
                Ok(_) => return,
                Err(e) => {
                    log::trace!("Unreadable field list {:?}: {}", index, e);
                    return;
                }
            };

            for field in &list.fields {
                if let Err(e) = self.add_field(owner, field) {
                    log::trace!("Skipping field of {}: {}", owner, e);
                }
            }

            next = list.continuation;
        }
    }

    fn add_field(&mut self, owner: SymbolId, field: &TypeData<'_>) -> Result<(), SymbolError> {
        match field {
            TypeData::Member(member) => {
                let offset = member.offset as i64;
                match self.finder.find(member.field_type)?.parse()? {
                    TypeData::Bitfield(bitfield) => {
                        let type_id = self.convert(bitfield.underlying_type)?;
                        let node = SymbolNode::new(SymbolKind::Data, member.name.as_bytes())
                            .with_location(LocationKind::BitField)
                            .with_offset(offset)
                            .with_bit_position(u32::from(bitfield.position))
                            .with_length(u64::from(bitfield.length))
                            .with_type(type_id);
                        self.tree.insert(Some(owner), node);
                    }
                    _ => {
                        let type_id = self.convert(member.field_type)?;
                        let node = SymbolNode::new(SymbolKind::Data, member.name.as_bytes())
                            .with_location(LocationKind::ThisRelative)
                            .with_offset(offset)
                            .with_type(type_id);
                        self.tree.insert(Some(owner), node);
                    }
                }
            }
            TypeData::StaticMember(member) => {
                let type_id = self.convert(member.field_type)?;
                let node = SymbolNode::new(SymbolKind::Data, member.name.as_bytes())
                    .with_location(LocationKind::Static)
                    .with_type(type_id);
                self.tree.insert(Some(owner), node);
            }
            TypeData::Enumerate(enumerate) => {
                let node = SymbolNode::new(SymbolKind::Data, enumerate.name.as_bytes()).with_location(LocationKind::Constant);
                self.tree.insert(Some(owner), node);
            }
            TypeData::Nested(nested) => {
                let id = self.convert(nested.nested_type)?;
                let declared_here = {
                    let owner_name = self.tree.name(owner)?;
                    let target_name = self.tree.name(id)?;
                    declares_nested_type(owner_name.as_bytes(), nested.name.as_bytes(), target_name.as_bytes())
                };
                if declared_here {
                    self.tree.add_child(owner, id);
                } else {
                    log::trace!("Skipping type alias {} of {}", nested.name, owner);
                }
            }
            _ => {}
        }
        Ok(())
    }
}

/// Second phase of loading: attaches procedures once the type stream is gone.
struct ProcedureLinker {
    user_types: HashMap<String, SymbolId>,
    tree: SymbolTree,
}

impl ProcedureLinker {
    fn add_procedure(&mut self, raw_name: &[u8], offset: u32) {
        let name = String::from_utf8_lossy(raw_name);
        let parent = split_scope(&name)
            .and_then(|(scope, _)| self.user_types.get(scope).copied())
            .unwrap_or_else(|| self.tree.global_scope_id());
        let node = SymbolNode::new(SymbolKind::Function, raw_name).with_address_offset(offset);
        self.tree.insert(Some(parent), node);
    }
}

/// Splits `Scope::name` at the last `::` outside template arguments and
/// parameter lists.
pub fn split_scope(name: &str) -> Option<(&str, &str)> {
    let bytes = name.as_bytes();
    let mut depth = 0i32;
    let mut split = None;
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'<' | b'(' => depth += 1,
            b'>' | b')' => depth -= 1,
            b':' if depth == 0 && bytes.get(i + 1) == Some(&b':') => {
                split = Some(i);
                i += 1;
            }
            _ => {}
        }
        i += 1;
    }
    let at = split?;
    let (scope, rest) = (&name[..at], &name[at + 2..]);
    if scope.is_empty() || rest.is_empty() {
        return None;
    }
    Some((scope, rest))
}

/// A nested-type entry names either a type declared inside `owner`, spelled
/// `owner::entry`, or a class-scope alias such as `typedef Base Super`.
/// Only the former belongs to the owner's layout.
fn declares_nested_type(owner: &[u8], entry: &[u8], target: &[u8]) -> bool {
    target.len() == owner.len() + 2 + entry.len()
        && target.starts_with(owner)
        && target[owner.len()..].starts_with(b"::")
        && target.ends_with(entry)
}

fn primitive_length(kind: PrimitiveKind) -> u64 {
    match kind {
        PrimitiveKind::Char | PrimitiveKind::UChar | PrimitiveKind::RChar => 1,
        PrimitiveKind::I8 | PrimitiveKind::U8 | PrimitiveKind::Bool8 => 1,
        PrimitiveKind::WChar | PrimitiveKind::RChar16 | PrimitiveKind::Short | PrimitiveKind::UShort => 2,
        PrimitiveKind::F16 => 2,
        PrimitiveKind::I16 | PrimitiveKind::U16 | PrimitiveKind::Bool16 => 2,
        PrimitiveKind::Long | PrimitiveKind::ULong | PrimitiveKind::I32 | PrimitiveKind::U32 => 4,
        PrimitiveKind::RChar32 | PrimitiveKind::HRESULT => 4,
        PrimitiveKind::F32 | PrimitiveKind::F32PP | PrimitiveKind::Bool32 => 4,
        PrimitiveKind::F48 => 6,
        PrimitiveKind::Complex32 => 8,
        PrimitiveKind::Complex64 => 16,
        PrimitiveKind::Complex80 => 20,
        PrimitiveKind::Complex128 => 32,
        PrimitiveKind::Quad | PrimitiveKind::UQuad | PrimitiveKind::I64 | PrimitiveKind::U64 => 8,
        PrimitiveKind::F64 | PrimitiveKind::Bool64 => 8,
        PrimitiveKind::F80 => 10,
        PrimitiveKind::Octa | PrimitiveKind::UOcta | PrimitiveKind::I128 | PrimitiveKind::U128 => 16,
        PrimitiveKind::F128 => 16,
        _ => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_scope_simple() {
        assert_eq!(split_scope("Foo::Bar"), Some(("Foo", "Bar")));
        assert_eq!(split_scope("ns::Foo::Bar"), Some(("ns::Foo", "Bar")));
    }

    #[test]
    fn test_split_scope_ignores_template_arguments() {
        assert_eq!(
            split_scope("TArray<FName,std::allocator<FName> >::Add"),
            Some(("TArray<FName,std::allocator<FName> >", "Add"))
        );
        assert_eq!(split_scope("Wrap<ns::Inner>"), None);
    }

    #[test]
    fn test_split_scope_unscoped() {
        assert_eq!(split_scope("main"), None);
        assert_eq!(split_scope("::main"), None);
    }

    #[test]
    fn test_primitive_lengths() {
        assert_eq!(primitive_length(PrimitiveKind::I32), 4);
        assert_eq!(primitive_length(PrimitiveKind::UQuad), 8);
        assert_eq!(primitive_length(PrimitiveKind::Bool8), 1);
        assert_eq!(primitive_length(PrimitiveKind::Void), 0);
    }

    #[test]
    fn test_character_and_exotic_primitive_lengths() {
        assert_eq!(primitive_length(PrimitiveKind::RChar16), 2);
        assert_eq!(primitive_length(PrimitiveKind::RChar32), 4);
        assert_eq!(primitive_length(PrimitiveKind::HRESULT), 4);
        assert_eq!(primitive_length(PrimitiveKind::F16), 2);
        assert_eq!(primitive_length(PrimitiveKind::F32PP), 4);
        assert_eq!(primitive_length(PrimitiveKind::F48), 6);
        assert_eq!(primitive_length(PrimitiveKind::Complex32), 8);
        assert_eq!(primitive_length(PrimitiveKind::Complex64), 16);
        assert_eq!(primitive_length(PrimitiveKind::Complex80), 20);
        assert_eq!(primitive_length(PrimitiveKind::Complex128), 32);
    }

    #[test]
    fn test_nested_type_declared_in_owner() {
        assert!(declares_nested_type(b"Outer", b"Inner", b"Outer::Inner"));
        assert!(declares_nested_type(b"ns::Outer", b"EKind", b"ns::Outer::EKind"));
        assert!(declares_nested_type(b"Outer", b"<unnamed-tag>", b"Outer::<unnamed-tag>"));
    }

    #[test]
    fn test_class_scope_aliases_are_not_nested_types() {
        // typedef ACharacter Super; typedef AShooterCharacter ThisClass;
        assert!(!declares_nested_type(b"AShooterCharacter", b"Super", b"ACharacter"));
        assert!(!declares_nested_type(b"AShooterCharacter", b"ThisClass", b"AShooterCharacter"));
        // alias to another type's nested type
        assert!(!declares_nested_type(b"Outer", b"Alias", b"Other::Alias"));
        assert!(!declares_nested_type(b"Outer", b"Inner", b"Outer:Inner"));
        assert!(!declares_nested_type(b"Outer", b"Inner", b"OuterX::Inner"));
    }

    fn linker_with(names: &[&str]) -> (ProcedureLinker, HashMap<String, SymbolId>) {
        let mut tree = SymbolTree::new();
        let global = tree.global_scope_id();
        let mut user_types = HashMap::new();
        for name in names {
            let id = tree.add_udt(global, name, 8);
            user_types.insert(name.to_string(), id);
        }
        (ProcedureLinker { user_types: user_types.clone(), tree }, user_types)
    }

    fn function_names(tree: &SymbolTree, parent: SymbolId) -> Vec<String> {
        tree.children(parent, Some(SymbolKind::Function))
            .unwrap()
            .into_iter()
            .map(|id| String::from_utf8_lossy(tree.name(id).unwrap().as_bytes()).into_owned())
            .collect()
    }

    #[test]
    fn test_scoped_procedure_becomes_method_of_its_type() {
        let (mut linker, user_types) = linker_with(&["Foo", "ns::Bar"]);
        linker.add_procedure(b"Foo::Tick", 0x2000);
        linker.add_procedure(b"ns::Bar::Run", 0x3000);

        let foo = user_types["Foo"];
        assert_eq!(function_names(&linker.tree, foo), vec!["Foo::Tick"]);
        assert_eq!(function_names(&linker.tree, user_types["ns::Bar"]), vec!["ns::Bar::Run"]);

        let tick = linker.tree.children(foo, Some(SymbolKind::Function)).unwrap()[0];
        assert_eq!(linker.tree.address_offset(tick).unwrap(), 0x2000);
    }

    #[test]
    fn test_unmatched_procedures_stay_global() {
        let (mut linker, user_types) = linker_with(&["Foo"]);
        linker.add_procedure(b"ns::Free", 0x10);
        linker.add_procedure(b"Unknown::f", 0x20);
        linker.add_procedure(b"main", 0x30);

        let global = linker.tree.global_scope_id();
        assert_eq!(function_names(&linker.tree, global), vec!["ns::Free", "Unknown::f", "main"]);
        assert!(function_names(&linker.tree, user_types["Foo"]).is_empty());
    }

    #[test]
    fn test_missing_database_is_not_found() {
        let loader = PdbLoader::new(std::env::temp_dir().join("pdb-layout-dumper-missing.pdb"));
        assert!(matches!(loader.load(), Err(SymbolError::NotFound(_))));
    }
}
