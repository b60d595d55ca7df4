// Wed Jan 21 2026 - Alex

pub mod extractor;
pub mod filter;
pub mod record;
pub mod walker;

pub use extractor::{Extracted, FunctionScope, LayoutExtractor};
pub use filter::AllowList;
pub use record::LayoutRecord;
pub use walker::{TypeWalker, WalkStats};
