// Wed Jan 21 2026 - Alex

use indexmap::IndexSet;

/// Names selected for extraction. Matching is exact and case-sensitive.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AllowList {
    structures: IndexSet<String>,
    functions: IndexSet<String>,
}

impl AllowList {
    pub fn new<S, F>(structures: S, functions: F) -> Self
    where
        S: IntoIterator,
        S::Item: Into<String>,
        F: IntoIterator,
        F::Item: Into<String>,
    {
        Self {
            structures: structures.into_iter().map(Into::into).collect(),
            functions: functions.into_iter().map(Into::into).collect(),
        }
    }

    pub fn allows_structure(&self, name: &str) -> bool {
        self.structures.contains(name)
    }

    pub fn allows_function(&self, name: &str) -> bool {
        self.functions.contains(name)
    }

    pub fn structures(&self) -> impl Iterator<Item = &str> {
        self.structures.iter().map(String::as_str)
    }

    pub fn functions(&self) -> impl Iterator<Item = &str> {
        self.functions.iter().map(String::as_str)
    }

    pub fn structure_count(&self) -> usize {
        self.structures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.structures.is_empty() && self.functions.is_empty()
    }
}
