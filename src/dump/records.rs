// Mon Jan 19 2026 - Alex

use super::classifier::*;
use super::error::{DumpError, DumpResult};
use super::extract::{
    ends_with_dangling_comma, leading_type_id, parse_type_id, quoted_after, text_after, text_until,
    token_after, type_id_after,
};
use super::scanner::LineScanner;
use crate::structure::types::{
    ClassRecord, FieldListEntry, FieldListRecord, MemberFunctionRecord, TypeRecord,
};
use std::borrow::Cow;

fn is_blank(line: &str) -> bool {
    line.trim().is_empty()
}

/// Flags are rendered as `, FLAG, `; the trailing space is often lost at
/// the end of a line.
fn has_flag(line: &str, flag: &str) -> bool {
    line.contains(flag) || line.trim_end().ends_with(flag.trim_end())
}

fn truncated(record: &'static str, scanner: &LineScanner<'_>) -> DumpError {
    DumpError::TruncatedRecord {
        record,
        line_number: scanner.line_number() + 1,
    }
}

/// Parses the record whose first line is `header` (already consumed from
/// `scanner`). Records of no interest yield `Ok(None)`.
pub fn parse_record(header: &str, scanner: &mut LineScanner<'_>) -> DumpResult<Option<TypeRecord>> {
    match classify(header) {
        RecordKind::Class => parse_class(header, scanner).map(|class| Some(TypeRecord::Class(class))),
        RecordKind::FieldList => Ok(parse_field_list(header, scanner)?.map(TypeRecord::FieldList)),
        RecordKind::MemberFunction => {
            parse_member_function(header, scanner).map(|function| Some(TypeRecord::MemberFunction(function)))
        }
        kind @ (RecordKind::BaseClass | RecordKind::Procedure | RecordKind::Unrecognized) => {
            log::trace!("skipping {} record at line {}", kind.name(), scanner.line_number());
            Ok(None)
        }
    }
}

pub fn parse_class(header: &str, scanner: &mut LineScanner<'_>) -> DumpResult<ClassRecord> {
    let type_id = leading_type_id(header, scanner.line_number())?;

    let second = scanner.next_line().ok_or_else(|| truncated("class", scanner))?;
    if is_blank(second) {
        return Err(DumpError::grammar(FIELD_LIST_TYPE, scanner.line_number(), header));
    }

    let is_forward_ref = has_flag(second, FORWARD_REF_FLAG);
    let field_list_id = if is_forward_ref {
        None
    } else {
        let id = type_id_after(second, FIELD_LIST_TYPE, scanner.line_number())?;
        (!id.is_null()).then_some(id)
    };

    let mut line = second;
    while !line.contains(CLASS_NAME) {
        line = scanner.next_line().ok_or_else(|| truncated("class", scanner))?;
        if is_blank(line) {
            return Err(DumpError::grammar(CLASS_NAME, scanner.line_number(), header));
        }
    }
    let name_line_number = scanner.line_number();

    let display_name = text_until(line, CLASS_NAME, ", unique name = ")
        .filter(|name| !name.is_empty())
        .ok_or_else(|| DumpError::grammar(CLASS_NAME, name_line_number, line))?;

    let mangled_name = match text_after(line, UNIQUE_NAME) {
        Some(name) => name,
        None => {
            // occasionally wrapped onto the following line
            let next = scanner
                .peek_line()
                .filter(|next| next.contains(UNIQUE_NAME))
                .ok_or_else(|| DumpError::grammar(UNIQUE_NAME, name_line_number, line))?;
            scanner.next_line();
            text_after(next, UNIQUE_NAME).unwrap_or_default()
        }
    };
    if mangled_name.is_empty() {
        return Err(DumpError::grammar(UNIQUE_NAME, scanner.line_number(), line));
    }

    let record = if is_forward_ref {
        ClassRecord::forward_ref(type_id, display_name, mangled_name)
    } else {
        ClassRecord::definition(type_id, display_name, mangled_name, field_list_id)
    };
    log::trace!(
        "class {} `{}`{}",
        record.type_id,
        record.display_name,
        if record.is_forward_ref { " (forward ref)" } else { "" }
    );
    Ok(record)
}

/// Joins a member line with its continuation lines while it ends in a
/// dangling comma.
fn join_continuations<'a>(first: &'a str, scanner: &mut LineScanner<'_>) -> DumpResult<Cow<'a, str>> {
    if !ends_with_dangling_comma(first) {
        return Ok(Cow::Borrowed(first));
    }

    let mut joined = first.trim_end().to_string();
    while ends_with_dangling_comma(&joined) {
        let next = scanner.next_line().ok_or_else(|| truncated("field list", scanner))?;
        if is_blank(next) {
            return Err(DumpError::TruncatedRecord {
                record: "field list",
                line_number: scanner.line_number(),
            });
        }
        joined.push(' ');
        joined.push_str(next.trim());
    }
    Ok(Cow::Owned(joined))
}

fn parse_method(member: &str, line_number: usize) -> DumpResult<FieldListEntry> {
    let type_id = type_id_after(member, INDEX, line_number)?;
    let name = quoted_after(member, NAME)
        .filter(|name| !name.is_empty())
        .ok_or_else(|| DumpError::grammar(NAME, line_number, member))?;

    Ok(FieldListEntry::Method {
        name: name.to_string(),
        type_id,
        is_static: has_flag(member, STATIC_FLAG),
    })
}

/// Parses a field list; lists without base classes or methods yield `None`.
pub fn parse_field_list(header: &str, scanner: &mut LineScanner<'_>) -> DumpResult<Option<FieldListRecord>> {
    let type_id = leading_type_id(header, scanner.line_number())?;
    let mut entries = Vec::new();

    // the blank separator stays unread for `next_record`
    while let Some(line) = scanner.peek_line().filter(|line| !is_blank(line)) {
        scanner.next_line();

        if line.contains(ONE_METHOD_MARKER) {
            let member = join_continuations(line, scanner)?;
            entries.push(parse_method(&member, scanner.line_number())?);
        } else if line.contains(BASE_CLASS_MARKER) || line.contains(VIRTUAL_BASE_CLASS_MARKER) {
            let base = type_id_after(line, TYPE, scanner.line_number())?;
            entries.push(FieldListEntry::BaseClassRef { type_id: base });
        }
    }

    if entries.is_empty() {
        log::trace!("discarding empty field list {}", type_id);
        return Ok(None);
    }
    Ok(Some(FieldListRecord::new(type_id, entries)))
}

pub fn parse_member_function(header: &str, scanner: &mut LineScanner<'_>) -> DumpResult<MemberFunctionRecord> {
    let header_line = scanner.line_number();
    let type_id = leading_type_id(header, header_line)?;
    let mut class_type_id = None;
    let mut this_type_id = None;

    while let Some(line) = scanner.peek_line().filter(|line| !is_blank(line)) {
        scanner.next_line();
        if line.contains(CLASS_TYPE) {
            class_type_id = Some(type_id_after(line, CLASS_TYPE, scanner.line_number())?);
        }
        if let Some(token) = token_after(line, THIS_TYPE) {
            // T_NOTYPE(0000) for static members
            this_type_id = parse_type_id(token).filter(|id| !id.is_null());
        }
    }

    let class_type_id = class_type_id.ok_or_else(|| DumpError::grammar(CLASS_TYPE, header_line, header))?;
    Ok(MemberFunctionRecord {
        type_id,
        class_type_id,
        this_type_id,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dump::scanner::Dump;
    use crate::structure::types::TypeId;

    fn parse_first(text: &str) -> DumpResult<Option<TypeRecord>> {
        let dump = Dump::from_text(text);
        let mut scanner = dump.scanner();
        let header = scanner.next_line().unwrap();
        parse_record(header, &mut scanner)
    }

    #[test]
    fn test_class_definition() {
        let record = parse_first(
            "0x1003 : Length = 38, Leaf = 0x1504 LF_CLASS\n\
             \t# members = 1,  field list type 0x1002, CONSTRUCTOR, \n\
             \tDerivation list type 0x0000, VT shape type 0x0000\n\
             \tSize = 4, class name = Base, unique name = .?AVBase@@, UDT(0x00001003)\n",
        )
        .unwrap();

        assert_eq!(
            record,
            Some(TypeRecord::Class(ClassRecord::definition(
                TypeId::new(0x1003),
                "Base",
                ".?AVBase@@",
                Some(TypeId::new(0x1002)),
            )))
        );
    }

    #[test]
    fn test_forward_ref_has_no_field_list() {
        let record = parse_first(
            "0x1000 : Length = 38, Leaf = 0x1504 LF_CLASS\n\
             \t# members = 0,  field list type 0x1234, FORWARD REF,\n\
             \tDerivation list type 0x0000, VT shape type 0x0000\n\
             \tSize = 0, class name = ns::Base, unique name = .?AVBase@ns@@, UDT(0x00001003)\n",
        )
        .unwrap();

        let Some(TypeRecord::Class(class)) = record else {
            panic!("expected class record");
        };
        assert!(class.is_forward_ref);
        assert_eq!(class.field_list_id, None);
        assert_eq!(class.display_name, "ns::Base");
        assert_eq!(class.mangled_name, ".?AVBase@ns@@");
    }

    #[test]
    fn test_structure_without_members() {
        let record = parse_first(
            "0x1010 : Length = 38, Leaf = 0x1505 LF_STRUCTURE\n\
             \t# members = 0,  field list type 0x0000, \n\
             \tSize = 1, class name = Empty, unique name = .?AUEmpty@@, UDT(0x00001010)\n",
        )
        .unwrap();

        let Some(TypeRecord::Class(class)) = record else {
            panic!("expected class record");
        };
        assert!(!class.is_forward_ref);
        assert_eq!(class.field_list_id, None);
    }

    #[test]
    fn test_class_missing_field_list_marker() {
        let err = parse_first(
            "0x1003 : Length = 38, Leaf = 0x1504 LF_CLASS\n\
             \t# members = 1, CONSTRUCTOR, \n",
        )
        .unwrap_err();

        match err {
            DumpError::Grammar { marker, line_number, .. } => {
                assert_eq!(marker, FIELD_LIST_TYPE);
                assert_eq!(line_number, 2);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_class_truncated_at_end_of_input() {
        let err = parse_first(
            "0x1003 : Length = 38, Leaf = 0x1504 LF_CLASS\n\
             \t# members = 1,  field list type 0x1002, \n",
        )
        .unwrap_err();
        assert!(matches!(err, DumpError::TruncatedRecord { record: "class", line_number: 3 }));
    }

    #[test]
    fn test_class_name_missing_before_blank_line() {
        let err = parse_first(
            "0x1003 : Length = 38, Leaf = 0x1504 LF_CLASS\n\
             \t# members = 1,  field list type 0x1002, \n\
             \n\
             0x1004 : Length = 2, Leaf = 0x1002 LF_POINTER\n",
        )
        .unwrap_err();
        assert!(matches!(err, DumpError::Grammar { ref marker, .. } if marker == CLASS_NAME));
    }

    #[test]
    fn test_field_list_preserves_overload_order() {
        let record = parse_first(
            "0x1002 : Length = 58, Leaf = 0x1203 LF_FIELDLIST\n\
             \tlist[0] = LF_ONEMETHOD, public, VANILLA, index = 0x1010, name = 'A'\n\
             \tlist[1] = LF_MEMBER, private, type = T_INT4(0074), offset = 0\n\
             \t\tmember name = 'm_value'\n\
             \tlist[2] = LF_ONEMETHOD, public, VANILLA, index = 0x1011, name = 'B'\n\
             \tlist[3] = LF_ONEMETHOD, public, VANILLA, index = 0x1012, name = 'A'\n",
        )
        .unwrap();

        let Some(TypeRecord::FieldList(list)) = record else {
            panic!("expected field list");
        };
        let names: Vec<_> = list
            .entries
            .iter()
            .map(|entry| match entry {
                FieldListEntry::Method { name, .. } => name.as_str(),
                FieldListEntry::BaseClassRef { .. } => "<base>",
            })
            .collect();
        assert_eq!(names, vec!["A", "B", "A"]);
    }

    #[test]
    fn test_continuation_line_matches_unwrapped_form() {
        let wrapped = parse_first(
            "0x1002 : Length = 58, Leaf = 0x1203 LF_FIELDLIST\n\
             \tlist[0] = LF_ONEMETHOD, public, INTRODUCING VIRTUAL,\n\
             \t\tindex = 0x1234, name = 'Foo'\n",
        )
        .unwrap();
        let single = parse_first(
            "0x1002 : Length = 58, Leaf = 0x1203 LF_FIELDLIST\n\
             \tlist[0] = LF_ONEMETHOD, public, INTRODUCING VIRTUAL, index = 0x1234, name = 'Foo'\n",
        )
        .unwrap();

        assert_eq!(wrapped, single);
        assert_eq!(
            wrapped,
            Some(TypeRecord::FieldList(FieldListRecord::new(
                TypeId::new(0x1002),
                vec![FieldListEntry::method("Foo", TypeId::new(0x1234))],
            )))
        );
    }

    #[test]
    fn test_continuation_truncated() {
        let err = parse_first(
            "0x1002 : Length = 58, Leaf = 0x1203 LF_FIELDLIST\n\
             \tlist[0] = LF_ONEMETHOD, public, VANILLA,\n",
        )
        .unwrap_err();
        assert!(matches!(err, DumpError::TruncatedRecord { record: "field list", .. }));
    }

    #[test]
    fn test_static_and_base_entries() {
        let record = parse_first(
            "0x1002 : Length = 58, Leaf = 0x1203 LF_FIELDLIST\n\
             \tlist[0] = LF_BCLASS, public, type = 0x1000, offset = 0\n\
             \tlist[1] = LF_VBCLASS, public, direct base type = 0x1001, virtual base ptr = 0x1008, vbpoff = 4, vbind = 1\n\
             \tlist[2] = LF_IVBCLASS, public, indirect base type = 0x1009, virtual base ptr = 0x1008, vbpoff = 4, vbind = 2\n\
             \tlist[3] = LF_ONEMETHOD, public, STATIC, index = 0x1020, name = 'Create'\n",
        )
        .unwrap();

        assert_eq!(
            record,
            Some(TypeRecord::FieldList(FieldListRecord::new(
                TypeId::new(0x1002),
                vec![
                    FieldListEntry::base(TypeId::new(0x1000)),
                    FieldListEntry::base(TypeId::new(0x1001)),
                    FieldListEntry::static_method("Create", TypeId::new(0x1020)),
                ],
            )))
        );
    }

    #[test]
    fn test_empty_field_list_discarded() {
        let record = parse_first(
            "0x1002 : Length = 58, Leaf = 0x1203 LF_FIELDLIST\n\
             \tlist[0] = LF_MEMBER, private, type = T_INT4(0074), offset = 0\n\
             \t\tmember name = 'm_value'\n",
        )
        .unwrap();
        assert_eq!(record, None);
    }

    #[test]
    fn test_bad_method_index_is_grammar_error() {
        let err = parse_first(
            "0x1002 : Length = 58, Leaf = 0x1203 LF_FIELDLIST\n\
             \tlist[0] = LF_ONEMETHOD, public, VANILLA, index = zz, name = 'A'\n",
        )
        .unwrap_err();
        assert!(matches!(err, DumpError::Grammar { ref marker, .. } if marker == INDEX));
    }

    #[test]
    fn test_member_function() {
        let record = parse_first(
            "0x1001 : Length = 26, Leaf = 0x1009 LF_MFUNCTION\n\
             \tReturn type = T_VOID(0003), Class type = 0x1000, This type = 0x1005, \n\
             \tCall type = ThisCall, Func attr = none\n\
             \tParms = 0, Arg list type = 0x1006, This adjust = 0\n",
        )
        .unwrap();
        assert_eq!(
            record,
            Some(TypeRecord::MemberFunction(MemberFunctionRecord {
                type_id: TypeId::new(0x1001),
                class_type_id: TypeId::new(0x1000),
                this_type_id: Some(TypeId::new(0x1005)),
            }))
        );

        let record = parse_first(
            "0x1021 : Length = 26, Leaf = 0x1009 LF_MFUNCTION\n\
             \tReturn type = 0x1003, Class type = 0x1000, This type = T_NOTYPE(0000), \n",
        )
        .unwrap();
        let Some(TypeRecord::MemberFunction(function)) = record else {
            panic!("expected member function");
        };
        assert!(function.is_static());
    }

    #[test]
    fn test_unrecognized_record_skipped() {
        let record = parse_first("0x1005 : Length = 10, Leaf = 0x1002 LF_POINTER\n\tPointer to type 0x1000\n").unwrap();
        assert_eq!(record, None);
    }
}
