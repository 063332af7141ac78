// Mon Jan 19 2026 - Alex

pub mod dedup;
pub mod hierarchy;
pub mod resolver;
pub mod table;
pub mod types;

pub use dedup::{deduplicate, DedupReport, Deduplicator};
pub use hierarchy::HierarchyStats;
pub use resolver::{Resolution, Resolver};
pub use table::TypeTable;
pub use types::{
    ClassRecord, FieldListEntry, FieldListRecord, MemberFunctionRecord, ProcedureRecord, PublicSymbol,
    SectionHeaderRecord, TypeId, TypeRecord, VirtualAddress,
};
