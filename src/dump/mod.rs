// Mon Jan 19 2026 - Alex

pub mod classifier;
pub mod error;
pub mod extract;
pub mod records;
pub mod scanner;

pub use classifier::{classify, RecordKind};
pub use error::{DumpError, DumpResult, ResolutionError, Stage};
pub use scanner::{Dump, LineScanner, Section};

use crate::structure::table::TypeTable;

/// Reads every record of the `*** TYPES` section into a type table.
pub fn parse_types(dump: &Dump) -> DumpResult<TypeTable> {
    let mut scanner = dump.section(Section::Types)?;
    let mut table = TypeTable::new();
    let mut skipped = 0usize;

    while let Some(header) = scanner.next_record() {
        let line_number = scanner.line_number();
        match records::parse_record(header, &mut scanner)? {
            Some(record) => table.insert(record, line_number)?,
            None => skipped += 1,
        }
    }

    log::info!("parsed {} type records ({} skipped)", table.len(), skipped);
    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::structure::types::{TypeId, TypeRecord};

    #[test]
    fn test_parse_types_collects_known_records() {
        let dump = Dump::from_text(
            "*** TYPES\n\
             \n\
             Total type bytes: 0x100\n\
             \n\
             0x1000 : Length = 38, Leaf = 0x1504 LF_CLASS\n\
             \t# members = 0,  field list type 0x0000, FORWARD REF, \n\
             \tSize = 0, class name = Base, unique name = .?AVBase@@, UDT(0x00001003)\n\
             \n\
             0x1001 : Length = 10, Leaf = 0x1002 LF_POINTER\n\
             \tPointer to type 0x1000\n\
             \n\
             0x1002 : Length = 58, Leaf = 0x1203 LF_FIELDLIST\n\
             \n\
             0x1003 : Length = 38, Leaf = 0x1504 LF_CLASS\n\
             \t# members = 0,  field list type 0x1002, \n\
             \tSize = 1, class name = Base, unique name = .?AVBase@@, UDT(0x00001003)\n\
             \n\
             *** SECTION HEADERS\n\
             \n\
             0x2000 : Length = 38, Leaf = 0x1504 LF_CLASS\n",
        );

        let table = parse_types(&dump).unwrap();

        // the pointer and the empty field list are dropped; the banner ends the section
        assert_eq!(table.len(), 2);
        assert!(table.class(TypeId::new(0x1000)).unwrap().is_forward_ref);
        assert!(table.real_class(TypeId::new(0x1003)).is_some());
        assert!(table.get(TypeId::new(0x2000)).is_none());
    }

    #[test]
    fn test_record_after_field_list_or_member_function_is_kept() {
        let dump = Dump::from_text(
            "*** TYPES\n\
             \n\
             0x1001 : Length = 26, Leaf = 0x1009 LF_MFUNCTION\n\
             \tReturn type = T_VOID(0003), Class type = 0x1003, This type = 0x1004, \n\
             \n\
             0x1002 : Length = 58, Leaf = 0x1203 LF_FIELDLIST\n\
             \tlist[0] = LF_ONEMETHOD, public, VANILLA, index = 0x1001, name = 'Bar'\n\
             \n\
             0x1003 : Length = 38, Leaf = 0x1504 LF_CLASS\n\
             \t# members = 1,  field list type 0x1002, \n\
             \tSize = 1, class name = Base, unique name = .?AVBase@@, UDT(0x00001003)\n\
             \n\
             0x1005 : Length = 58, Leaf = 0x1203 LF_FIELDLIST\n\
             \tlist[0] = LF_BCLASS, public, type = 0x1003, offset = 0\n\
             \n\
             0x1006 : Length = 38, Leaf = 0x1504 LF_CLASS\n\
             \t# members = 1,  field list type 0x1005, \n\
             \tSize = 1, class name = Derived, unique name = .?AVDerived@@, UDT(0x00001006)\n",
        );

        let table = parse_types(&dump).unwrap();

        let ids: Vec<_> = table.records().map(TypeRecord::type_id).collect();
        assert_eq!(
            ids,
            vec![
                TypeId::new(0x1001),
                TypeId::new(0x1002),
                TypeId::new(0x1003),
                TypeId::new(0x1005),
                TypeId::new(0x1006),
            ]
        );
        assert_eq!(table.real_class(TypeId::new(0x1003)).unwrap().field_list_id, Some(TypeId::new(0x1002)));
        assert!(table.real_class(TypeId::new(0x1006)).is_some());
    }

    #[test]
    fn test_parse_types_requires_section() {
        let dump = Dump::from_text("*** SYMBOLS\n\n");
        let err = parse_types(&dump).unwrap_err();
        assert!(matches!(err, DumpError::SectionNotFound { banner: "*** TYPES" }));
        assert_eq!(err.stage(), Stage::Scan);
    }
}
