// Wed Jan 21 2026 - Alex

pub mod document;
pub mod json;

pub use document::{Group, MemberMap, OutputDocument, GLOBAL_GROUP};
pub use json::{JsonWriter, OutputError};
