// Thu Jan 22 2026 - Alex

use crate::output::{Group, OutputDocument};
use crate::structure::walker::DEFAULT_MAX_DEPTH;
use crate::structure::{AllowList, Extracted, FunctionScope, LayoutExtractor, TypeWalker, WalkStats};
use crate::symbol::{NameDecoder, SymbolError, SymbolId, SymbolKind, SymbolProvider};
use crate::utils::logging::scoped_timer;
use indexmap::IndexSet;
use indicatif::{ProgressBar, ProgressStyle};

/// Outcome of one dump run, for reporting.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DumpSummary {
    pub structures_matched: usize,
    pub functions_matched: usize,
    pub records: usize,
    pub missing_structures: Vec<String>,
    pub missing_functions: Vec<String>,
    pub walk: WalkStats,
}

impl DumpSummary {
    pub fn has_missing(&self) -> bool {
        !self.missing_structures.is_empty() || !self.missing_functions.is_empty()
    }
}

/// Drives a run over the global scope: allow-listed structures first, then
/// allow-listed free functions.
pub struct DumpCoordinator<'p> {
    provider: &'p dyn SymbolProvider,
    allow_list: &'p AllowList,
    max_depth: u32,
    show_progress: bool,
}

impl<'p> DumpCoordinator<'p> {
    pub fn new(provider: &'p dyn SymbolProvider, allow_list: &'p AllowList) -> Self {
        Self {
            provider,
            allow_list,
            max_depth: DEFAULT_MAX_DEPTH,
            show_progress: false,
        }
    }

    pub fn with_max_depth(mut self, max_depth: u32) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }

    pub fn run(&self) -> Result<(OutputDocument, DumpSummary), SymbolError> {
        let global = self
            .provider
            .global_scope()
            .map_err(|e| SymbolError::GlobalScope(e.to_string()))?;

        let mut document = OutputDocument::new();
        let mut summary = DumpSummary::default();

        let matched_structures = self.dump_structures(global, &mut document, &mut summary)?;
        let matched_functions = self.dump_global_functions(global, &mut document)?;

        summary.structures_matched = matched_structures.len();
        summary.functions_matched = matched_functions.len();
        summary.records = document.record_count();
        summary.missing_structures = self
            .allow_list
            .structures()
            .filter(|name| !matched_structures.contains(*name))
            .map(str::to_string)
            .collect();
        summary.missing_functions = self
            .allow_list
            .functions()
            .filter(|name| !matched_functions.contains(*name))
            .map(str::to_string)
            .collect();

        for name in &summary.missing_structures {
            log::warn!("Structure not found in symbols: {}", name);
        }
        for name in &summary.missing_functions {
            log::warn!("Function not found in symbols: {}", name);
        }

        Ok((document, summary))
    }

    fn dump_structures(
        &self,
        global: SymbolId,
        document: &mut OutputDocument,
        summary: &mut DumpSummary,
    ) -> Result<IndexSet<String>, SymbolError> {
        let _timer = scoped_timer("structures");
        let types = self.provider.children(global, Some(SymbolKind::UserType))?;
        log::info!("Scanning {} top-level types", types.len());

        let progress = self.progress_bar(types.len() as u64, "Dumping structures");
        let mut matched = IndexSet::new();
        let mut walker = TypeWalker::new(self.provider, document).with_max_depth(self.max_depth);

        for udt in types {
            progress.inc(1);

            let name = match NameDecoder::read(self.provider, udt) {
                Ok(name) => name,
                Err(e) => {
                    log::trace!("Skipping type {}: {}", udt, e);
                    continue;
                }
            };
            if !self.allow_list.allows_structure(&name) {
                continue;
            }

            log::debug!("Dumping structure {}", name);
            progress.set_message(name.clone());
            walker.walk(udt, &name, 0);
            matched.insert(name);
        }

        progress.finish_and_clear();
        summary.walk = walker.stats();
        Ok(matched)
    }

    fn dump_global_functions(
        &self,
        global: SymbolId,
        document: &mut OutputDocument,
    ) -> Result<IndexSet<String>, SymbolError> {
        let _timer = scoped_timer("global functions");
        let functions = self.provider.children(global, Some(SymbolKind::Function))?;
        log::info!("Scanning {} global functions", functions.len());

        let extractor = LayoutExtractor::new(self.provider);
        let mut matched = IndexSet::new();

        for function in functions {
            let name = match NameDecoder::read(self.provider, function) {
                Ok(name) => name,
                Err(e) => {
                    log::trace!("Skipping function {}: {}", function, e);
                    continue;
                }
            };
            if !self.allow_list.allows_function(&name) {
                continue;
            }

            match extractor.extract_function(function, FunctionScope::Global) {
                Ok(Some(Extracted { name, record })) => {
                    document.put(Group::Global, name.clone(), record);
                    matched.insert(name);
                }
                Ok(None) => log::debug!("Function {} is a native thunk, not dumped", name),
                Err(e) => log::trace!("Skipping function {}: {}", function, e),
            }
        }

        Ok(matched)
    }

    fn progress_bar(&self, len: u64, message: &'static str) -> ProgressBar {
        if !self.show_progress {
            return ProgressBar::hidden();
        }

        let pb = ProgressBar::new(len);
        if let Ok(style) = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
        {
            pb.set_style(style.progress_chars("#>-"));
        }
        pb.set_message(message);
        pb
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::JsonWriter;
    use crate::structure::LayoutRecord;
    use crate::symbol::SymbolTree;
    use serde_json::json;

    fn foo_bar_tree() -> SymbolTree {
        let mut tree = SymbolTree::new();
        let global = tree.global_scope_id();
        let int = tree.add_base_type("int", 4);
        let foo = tree.add_udt(global, "Foo", 8);
        tree.add_member(foo, "x", 0, int);
        tree.add_bitfield(foo, "y", 4, 4, 3, int);
        tree.add_function(foo, "execDoThing", 0x2100);
        let other = tree.add_udt(global, "Unlisted", 4);
        tree.add_member(other, "z", 0, int);
        tree.add_function(global, "Bar", 0x1000);
        tree.add_function(global, "execBar", 0x1100);
        tree
    }

    fn run(tree: &SymbolTree, allow: &AllowList) -> (OutputDocument, DumpSummary) {
        DumpCoordinator::new(tree, allow).run().unwrap()
    }

    #[test]
    fn test_foo_bar_scenario() {
        let tree = foo_bar_tree();
        let allow = AllowList::new(["Foo"], ["Bar"]);
        let (document, summary) = run(&tree, &allow);

        assert_eq!(
            serde_json::to_value(&document).unwrap(),
            json!({
                "structures": {
                    "Foo": {
                        "x": { "kind": "field", "offset": 0, "length": 4 },
                        "y": { "kind": "bitfield", "offset": 4, "length": 4, "bitposition": 4, "numbits": 3 }
                    },
                    "Global": {
                        "Bar": { "kind": "globalfunction", "offset": 4096 }
                    }
                }
            })
        );
        assert_eq!(summary.structures_matched, 1);
        assert_eq!(summary.functions_matched, 1);
        assert_eq!(summary.records, 3);
        assert!(!summary.has_missing());
    }

    #[test]
    fn test_exec_functions_never_emitted() {
        let tree = foo_bar_tree();
        let allow = AllowList::new(["Foo"], ["Bar", "execBar"]);
        let (document, summary) = run(&tree, &allow);

        assert!(document.get(Group::Structure("Foo"), "execDoThing").is_none());
        assert!(document.get(Group::Global, "execBar").is_none());
        assert_eq!(summary.missing_functions, vec!["execBar".to_string()]);
    }

    #[test]
    fn test_absent_names_are_reported_not_fatal() {
        let tree = foo_bar_tree();
        let allow = AllowList::new(["Foo", "Missing"], ["Nope"]);
        let (document, summary) = run(&tree, &allow);

        assert!(document.group(Group::Structure("Missing")).is_none());
        assert!(document.group(Group::Global).is_none());
        assert_eq!(summary.missing_structures, vec!["Missing".to_string()]);
        assert_eq!(summary.missing_functions, vec!["Nope".to_string()]);
    }

    #[test]
    fn test_unlisted_structures_are_not_walked() {
        let tree = foo_bar_tree();
        let allow = AllowList::new(["Foo"], Vec::<String>::new());
        let (document, _) = run(&tree, &allow);

        assert_eq!(document.structure_count(), 1);
        assert!(document.group(Group::Structure("Unlisted")).is_none());
    }

    #[test]
    fn test_structure_named_global_keeps_free_functions_apart() {
        let mut tree = SymbolTree::new();
        let global = tree.global_scope_id();
        let int = tree.add_base_type("int", 4);
        let udt = tree.add_udt(global, "Global", 4);
        tree.add_member(udt, "Bar", 0, int);
        tree.add_function(global, "Bar", 0x1000);

        let allow = AllowList::new(["Global"], ["Bar"]);
        let (document, _) = run(&tree, &allow);

        assert_eq!(
            document.get(Group::Structure("Global"), "Bar"),
            Some(&LayoutRecord::Field { offset: 0, length: 4 })
        );
        assert_eq!(document.get(Group::Global, "Bar"), Some(&LayoutRecord::GlobalFunction { offset: 0x1000 }));

        let value = serde_json::to_value(&document).unwrap();
        assert_eq!(value["structures"]["::Global"]["Bar"]["kind"], "field");
        assert_eq!(value["structures"]["Global"]["Bar"]["kind"], "globalfunction");
    }

    #[test]
    fn test_runs_are_byte_identical() {
        let tree = foo_bar_tree();
        let allow = AllowList::new(["Foo", "Unlisted"], ["Bar"]);
        let writer = JsonWriter::new();

        let (first, _) = run(&tree, &allow);
        let (second, _) = run(&tree, &allow);

        assert_eq!(writer.serialize(&first).unwrap(), writer.serialize(&second).unwrap());
    }

    #[test]
    fn test_empty_allow_list_produces_empty_document() {
        let tree = foo_bar_tree();
        let (document, summary) = run(&tree, &AllowList::default());

        assert!(document.is_empty());
        assert_eq!(summary, DumpSummary::default());
    }
}
