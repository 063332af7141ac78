// Mon Jan 19 2026 - Alex

pub const CLASS_MARKER: &str = "LF_CLASS";
pub const STRUCTURE_MARKER: &str = "LF_STRUCTURE";
pub const FIELD_LIST_MARKER: &str = "LF_FIELDLIST";
pub const BASE_CLASS_MARKER: &str = " LF_BCLASS";
pub const VIRTUAL_BASE_CLASS_MARKER: &str = " LF_VBCLASS";
pub const PROCEDURE_MARKER: &str = "S_GPROC32";
pub const MEMBER_FUNCTION_MARKER: &str = "LF_MFUNCTION";
pub const ONE_METHOD_MARKER: &str = "= LF_ONEMETHOD, ";

pub const FORWARD_REF_FLAG: &str = ", FORWARD REF, ";
pub const STATIC_FLAG: &str = ", STATIC, ";

pub const FIELD_LIST_TYPE: &str = "field list type ";
pub const CLASS_NAME: &str = "class name = ";
pub const UNIQUE_NAME: &str = "unique name = ";
pub const INDEX: &str = "index = ";
pub const NAME: &str = "name = ";
pub const TYPE: &str = "type = ";
pub const CLASS_TYPE: &str = "Class type = ";
pub const THIS_TYPE: &str = "This type = ";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordKind {
    Class,
    FieldList,
    BaseClass,
    Procedure,
    MemberFunction,
    Unrecognized,
}

impl RecordKind {
    pub fn name(&self) -> &'static str {
        match self {
            RecordKind::Class => "class",
            RecordKind::FieldList => "field list",
            RecordKind::BaseClass => "base class",
            RecordKind::Procedure => "procedure",
            RecordKind::MemberFunction => "member function",
            RecordKind::Unrecognized => "unrecognized",
        }
    }
}

/// Identifies a record by marker substrings, first match wins.
pub fn classify(line: &str) -> RecordKind {
    if line.contains(CLASS_MARKER) || line.contains(STRUCTURE_MARKER) {
        RecordKind::Class
    } else if line.contains(FIELD_LIST_MARKER) {
        RecordKind::FieldList
    } else if line.contains(BASE_CLASS_MARKER) {
        RecordKind::BaseClass
    } else if line.contains(PROCEDURE_MARKER) {
        RecordKind::Procedure
    } else if line.contains(MEMBER_FUNCTION_MARKER) {
        RecordKind::MemberFunction
    } else {
        RecordKind::Unrecognized
    }
}
