// Mon Jan 19 2026 - Alex

pub mod demangle;
pub mod procedure;
pub mod public;
pub mod section;

pub use demangle::{class_scope, demangle_member, ScopedMember};
pub use procedure::{parse_procedures, PROCEDURE_SECTIONS};
pub use public::{parse_publics, PublicIndex};
pub use section::SectionTable;

use crate::dump::error::DumpResult;
use crate::dump::scanner::Dump;
use crate::structure::types::{ProcedureRecord, PublicSymbol};

/// Address-bearing symbols read from the dump.
#[derive(Debug, Clone)]
pub struct SymbolTables {
    pub sections: SectionTable,
    pub procedures: Vec<ProcedureRecord>,
    pub publics: Vec<PublicSymbol>,
}

impl SymbolTables {
    pub fn load(dump: &Dump, image_base: u64, use_publics: bool) -> DumpResult<Self> {
        let sections = SectionTable::from_dump(dump, image_base)?;

        if !PROCEDURE_SECTIONS.iter().any(|section| dump.has_section(*section)) {
            log::warn!("dump has no symbol sections; methods will carry no addresses");
        }
        let procedures = parse_procedures(dump, &sections)?;
        let publics = if use_publics {
            parse_publics(dump, &sections)?
        } else {
            Vec::new()
        };

        Ok(Self {
            sections,
            procedures,
            publics,
        })
    }

    pub fn empty(image_base: u64) -> Self {
        Self {
            sections: SectionTable::absent(image_base),
            procedures: Vec::new(),
            publics: Vec::new(),
        }
    }
}
