// Wed Jan 21 2026 - Alex

use crate::output::{Group, OutputDocument};
use crate::structure::{Extracted, FunctionScope, LayoutExtractor};
use crate::symbol::{SymbolError, SymbolId, SymbolKind, SymbolProvider};

/// Walks deeper than this are cut off.
pub const DEFAULT_MAX_DEPTH: u32 = 5;

/// Depth added per descent, both into a member's type and into a type's children.
pub const DEPTH_STEP: u32 = 2;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WalkStats {
    pub visited: usize,
    pub emitted: usize,
    pub skipped: usize,
    pub cut_off: usize,
}

/// Recursive traversal of one structure's symbol subtree.
///
/// Every record found below the starting node is written under the same
/// owner group: members of nested types are flattened into their owner.
pub struct TypeWalker<'p, 'd> {
    provider: &'p dyn SymbolProvider,
    extractor: LayoutExtractor<'p>,
    document: &'d mut OutputDocument,
    max_depth: u32,
    stats: WalkStats,
}

impl<'p, 'd> TypeWalker<'p, 'd> {
    pub fn new(provider: &'p dyn SymbolProvider, document: &'d mut OutputDocument) -> Self {
        Self {
            provider,
            extractor: LayoutExtractor::new(provider),
            document,
            max_depth: DEFAULT_MAX_DEPTH,
            stats: WalkStats::default(),
        }
    }

    pub fn with_max_depth(mut self, max_depth: u32) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn stats(&self) -> WalkStats {
        self.stats
    }

    pub fn walk(&mut self, node: SymbolId, owner: &str, depth: u32) {
        if depth > self.max_depth {
            self.stats.cut_off += 1;
            return;
        }
        self.stats.visited += 1;

        let kind = match self.provider.kind(node) {
            Ok(kind) => kind,
            Err(e) => {
                self.skip(node, &e);
                return;
            }
        };

        match kind {
            SymbolKind::Data => {
                let extracted = self.extractor.extract_field(node);
                self.emit(node, owner, extracted);

                if let Some(nested) = self.nested_user_type(node) {
                    self.walk(nested, owner, depth + DEPTH_STEP);
                }
            }
            SymbolKind::UserType => {
                let children = match self.provider.children(node, None) {
                    Ok(children) => children,
                    Err(e) => {
                        self.skip(node, &e);
                        return;
                    }
                };
                for child in children {
                    self.walk(child, owner, depth + DEPTH_STEP);
                }
            }
            SymbolKind::Function => {
                let extracted = self.extractor.extract_function(node, FunctionScope::Member);
                self.emit(node, owner, extracted);
            }
            SymbolKind::GlobalScope | SymbolKind::Other => {}
        }
    }

    /// Declared type of a data member when it is a user-defined type.
    fn nested_user_type(&self, member: SymbolId) -> Option<SymbolId> {
        let type_id = self.provider.symbol_type(member).ok()?;
        let kind = self.provider.kind(type_id).ok()?;
        kind.is_user_type().then_some(type_id)
    }

    fn emit(&mut self, node: SymbolId, owner: &str, extracted: Result<Option<Extracted>, SymbolError>) {
        match extracted {
            Ok(Some(Extracted { name, record })) => {
                log::trace!("{}::{} {}", owner, name, record);
                self.document.put(Group::Structure(owner), name, record);
                self.stats.emitted += 1;
            }
            Ok(None) => {}
            Err(e) => self.skip(node, &e),
        }
    }

    fn skip(&mut self, node: SymbolId, error: &SymbolError) {
        self.stats.skipped += 1;
        log::trace!("Skipping symbol {}: {}", node, error);
    }
}
