// Mon Jan 19 2026 - Alex

pub mod config;
pub mod dump;
pub mod engine;
pub mod output;
pub mod structure;
pub mod symbol;
pub mod utils;

pub use config::Config;
pub use dump::{Dump, DumpError, ResolutionError, Stage};
pub use engine::Pipeline;
pub use output::{JsonSerializer, MethodKind, ResolvedClass};
pub use structure::TypeTable;
