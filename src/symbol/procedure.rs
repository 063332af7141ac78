// Mon Jan 19 2026 - Alex

use super::section::SectionTable;
use crate::dump::classifier::{classify, RecordKind, PROCEDURE_MARKER};
use crate::dump::error::{DumpError, DumpResult};
use crate::dump::extract::{parse_hex, parse_type_id};
use crate::dump::scanner::{Dump, Section};
use crate::structure::types::ProcedureRecord;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;

/// `S_GPROC32: [0001:00001010], Cb: 0000001A, Type:   0x1001, Base::Bar`
static PROCEDURE_LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"S_GPROC32\w*: \[([0-9A-Fa-f]+):([0-9A-Fa-f]+)\], Cb: [0-9A-Fa-f]+, Type:\s*(\S+?), (.+)$")
        .expect("procedure pattern is valid")
});

/// Sections that carry global procedure symbols.
pub const PROCEDURE_SECTIONS: [Section; 2] = [Section::Symbols, Section::Globals];

pub fn parse_procedure(line: &str, line_number: usize, sections: &SectionTable) -> DumpResult<ProcedureRecord> {
    let captures = PROCEDURE_LINE
        .captures(line)
        .ok_or_else(|| DumpError::grammar(PROCEDURE_MARKER, line_number, line))?;

    let section = u16::from_str_radix(&captures[1], 16)
        .map_err(|_| DumpError::grammar("section number", line_number, line))?;
    let offset = parse_hex(&captures[2]).ok_or_else(|| DumpError::grammar("section offset", line_number, line))?;
    let virtual_address = sections.resolve(section, offset, line_number, line)?;

    Ok(ProcedureRecord {
        name: captures[4].trim().to_string(),
        // T_NOTYPE(0000) and friends carry no type record
        type_id: parse_type_id(&captures[3]).filter(|id| !id.is_null()),
        virtual_address,
    })
}

/// Collects `S_GPROC32` symbols from the symbol sections present in the
/// dump, dropping repeats of the same procedure.
pub fn parse_procedures(dump: &Dump, sections: &SectionTable) -> DumpResult<Vec<ProcedureRecord>> {
    let mut procedures = Vec::new();
    let mut seen = HashSet::new();

    for section in PROCEDURE_SECTIONS {
        if !dump.has_section(section) {
            continue;
        }

        let mut scanner = dump.section(section)?;
        while let Some(line) = scanner.next_line() {
            if classify(line) != RecordKind::Procedure {
                continue;
            }
            let procedure = parse_procedure(line, scanner.line_number(), sections)?;
            if seen.insert((procedure.virtual_address, procedure.name.clone())) {
                procedures.push(procedure);
            }
        }
    }

    log::info!("parsed {} procedure symbols", procedures.len());
    Ok(procedures)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::structure::types::{SectionHeaderRecord, TypeId, VirtualAddress};

    fn sections() -> SectionTable {
        SectionTable::new(
            VirtualAddress::DEFAULT_IMAGE_BASE,
            vec![SectionHeaderRecord {
                number: 1,
                name: ".text".to_string(),
                virtual_size: 0x10000,
                virtual_address: 0x1000,
            }],
        )
    }

    #[test]
    fn test_parse_procedure_line() {
        let line = "(00012C) S_GPROC32: [0001:00001010], Cb: 0000001A, Type:             0x1001, Base::Bar";
        let procedure = parse_procedure(line, 5, &sections()).unwrap();

        assert_eq!(procedure.name, "Base::Bar");
        assert_eq!(procedure.type_id, Some(TypeId::new(0x1001)));
        assert_eq!(procedure.virtual_address, VirtualAddress::new(0x402010));
    }

    #[test]
    fn test_procedure_without_type() {
        let line = "(000200) S_GPROC32: [0001:00000020], Cb: 00000004, Type:   T_NOTYPE(0000), _start";
        let procedure = parse_procedure(line, 5, &sections()).unwrap();
        assert_eq!(procedure.type_id, None);
        assert_eq!(procedure.name, "_start");
    }

    #[test]
    fn test_template_names_keep_commas() {
        let line = "(000300) S_GPROC32: [0001:00000040], Cb: 00000004, Type: 0x1100, Map<int,char>::Insert";
        let procedure = parse_procedure(line, 5, &sections()).unwrap();
        assert_eq!(procedure.name, "Map<int,char>::Insert");
    }

    #[test]
    fn test_malformed_procedure_line() {
        let err = parse_procedure("(000300) S_GPROC32: garbage", 8, &sections()).unwrap_err();
        assert!(matches!(err, DumpError::Grammar { line_number: 8, .. }));
    }

    #[test]
    fn test_parse_procedures_across_sections() {
        let dump = Dump::from_text(
            "*** SYMBOLS\n\
             \n\
             ** Module: \"base.obj\"\n\
             (00012C) S_GPROC32: [0001:00001010], Cb: 0000001A, Type: 0x1001, Base::Bar\n\
             \x20        Parent: 00000000, End: 00000150, Next: 00000000\n\
             \n\
             *** GLOBALS\n\
             (00012C) S_GPROC32: [0001:00001010], Cb: 0000001A, Type: 0x1001, Base::Bar\n\
             (000180) S_GPROC32: [0001:00001100], Cb: 0000001A, Type: 0x1002, Base::Baz\n",
        );

        let procedures = parse_procedures(&dump, &sections()).unwrap();
        let names: Vec<_> = procedures.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["Base::Bar", "Base::Baz"]);
    }
}
