// Tue Jan 13 2026 - Alex

pub mod coordinator;

pub use coordinator::{DumpCoordinator, DumpSummary};
