// Wed Jan 21 2026 - Alex

use crate::structure::LayoutRecord;
use indexmap::IndexMap;
use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;

/// Key free functions are written under.
pub const GLOBAL_GROUP: &str = "Global";

/// Key used for a structure that is itself named [`GLOBAL_GROUP`].
pub const QUALIFIED_GLOBAL_STRUCTURE: &str = "::Global";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Group<'a> {
    Structure(&'a str),
    Global,
}

pub type MemberMap = IndexMap<String, LayoutRecord>;

/// Accumulates records as `group -> member -> record`.
///
/// Groups appear in the order their first record was written; a record
/// written twice under the same key keeps its first position.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OutputDocument {
    structures: IndexMap<String, MemberMap>,
    globals: MemberMap,
}

impl OutputDocument {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or overwrites `group[member]`. Returns the record it replaced.
    pub fn put(&mut self, group: Group<'_>, member: String, record: LayoutRecord) -> Option<LayoutRecord> {
        let members = match group {
            Group::Structure(name) => self.structures.entry(name.to_string()).or_default(),
            Group::Global => &mut self.globals,
        };
        members.insert(member, record)
    }

    pub fn group(&self, group: Group<'_>) -> Option<&MemberMap> {
        match group {
            Group::Structure(name) => self.structures.get(name),
            Group::Global if self.globals.is_empty() => None,
            Group::Global => Some(&self.globals),
        }
    }

    pub fn get(&self, group: Group<'_>, member: &str) -> Option<&LayoutRecord> {
        self.group(group)?.get(member)
    }

    pub fn structure_count(&self) -> usize {
        self.structures.len()
    }

    pub fn record_count(&self) -> usize {
        self.structures.values().map(IndexMap::len).sum::<usize>() + self.globals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.structures.is_empty() && self.globals.is_empty()
    }
}

impl Serialize for OutputDocument {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut root = serializer.serialize_map(Some(1))?;
        root.serialize_entry("structures", &Groups(self))?;
        root.end()
    }
}

struct Groups<'a>(&'a OutputDocument);

impl Serialize for Groups<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let document = self.0;
        let len = document.structures.len() + usize::from(!document.globals.is_empty());
        let mut map = serializer.serialize_map(Some(len))?;
        for (name, members) in &document.structures {
            let key = if name == GLOBAL_GROUP { QUALIFIED_GLOBAL_STRUCTURE } else { name.as_str() };
            map.serialize_entry(key, members)?;
        }
        if !document.globals.is_empty() {
            map.serialize_entry(GLOBAL_GROUP, &document.globals)?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_put_overwrites_in_place() {
        let mut document = OutputDocument::new();
        document.put(Group::Structure("Foo"), "a".to_string(), LayoutRecord::Field { offset: 0, length: 4 });
        document.put(Group::Structure("Foo"), "b".to_string(), LayoutRecord::Field { offset: 4, length: 4 });
        let replaced = document.put(Group::Structure("Foo"), "a".to_string(), LayoutRecord::Field { offset: 8, length: 2 });

        assert_eq!(replaced, Some(LayoutRecord::Field { offset: 0, length: 4 }));
        let members: Vec<_> = document.group(Group::Structure("Foo")).unwrap().keys().cloned().collect();
        assert_eq!(members, vec!["a", "b"]);
        assert_eq!(document.get(Group::Structure("Foo"), "a").unwrap().offset(), 8);
        assert_eq!(document.record_count(), 2);
    }

    #[test]
    fn test_global_group_is_separate() {
        let mut document = OutputDocument::new();
        document.put(Group::Structure(GLOBAL_GROUP), "x".to_string(), LayoutRecord::Field { offset: 0, length: 1 });
        document.put(Group::Global, "Bar".to_string(), LayoutRecord::GlobalFunction { offset: 0x1000 });

        assert!(document.get(Group::Global, "x").is_none());
        assert!(document.get(Group::Structure(GLOBAL_GROUP), "Bar").is_none());

        let value = serde_json::to_value(&document).unwrap();
        assert_eq!(
            value,
            json!({
                "structures": {
                    "::Global": { "x": { "kind": "field", "offset": 0, "length": 1 } },
                    "Global": { "Bar": { "kind": "globalfunction", "offset": 4096 } }
                }
            })
        );
    }

    #[test]
    fn test_empty_document_serializes_empty_structures() {
        let document = OutputDocument::new();
        assert!(document.is_empty());
        assert!(document.group(Group::Global).is_none());
        assert_eq!(serde_json::to_value(&document).unwrap(), json!({ "structures": {} }));
    }
}
