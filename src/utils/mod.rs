// Mon Jan 19 2026 - Alex

pub mod logging;
pub mod names;

pub use logging::{LoggingUtils, ScopedTimer};
pub use names::{method_kind, unqualified_name};
