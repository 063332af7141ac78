// Mon Jan 19 2026 - Alex

use std::fmt;

/// Numeric identifier of a type record, scoped to one dump.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TypeId(u32);

impl TypeId {
    pub fn new(value: u32) -> Self {
        Self(value)
    }

    pub fn as_u32(&self) -> u32 {
        self.0
    }

    pub fn is_null(&self) -> bool {
        self.0 == 0
    }
}

impl fmt::Display for TypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:04x}", self.0)
    }
}

impl From<u32> for TypeId {
    fn from(value: u32) -> Self {
        Self::new(value)
    }
}

/// Offset inside the loaded program image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct VirtualAddress {
    value: u64,
}

impl VirtualAddress {
    /// Preferred load address of a 32-bit PE image.
    pub const DEFAULT_IMAGE_BASE: u64 = 0x40_0000;

    pub fn new(value: u64) -> Self {
        Self { value }
    }

    pub fn as_u64(&self) -> u64 {
        self.value
    }

    pub fn checked_add(self, rhs: u64) -> Option<Self> {
        self.value.checked_add(rhs).map(Self::new)
    }
}

impl fmt::Display for VirtualAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:x}", self.value)
    }
}

impl fmt::LowerHex for VirtualAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::LowerHex::fmt(&self.value, f)
    }
}


impl From<u64> for VirtualAddress {
    fn from(value: u64) -> Self {
        Self::new(value)
    }
}

/// An `LF_CLASS` / `LF_STRUCTURE` record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassRecord {
    pub type_id: TypeId,
    pub mangled_name: String,
    pub display_name: String,
    pub field_list_id: Option<TypeId>,
    pub is_forward_ref: bool,
}

impl ClassRecord {
    pub fn definition(type_id: TypeId, display_name: &str, mangled_name: &str, field_list_id: Option<TypeId>) -> Self {
        Self {
            type_id,
            mangled_name: mangled_name.to_string(),
            display_name: display_name.to_string(),
            field_list_id,
            is_forward_ref: false,
        }
    }

    pub fn forward_ref(type_id: TypeId, display_name: &str, mangled_name: &str) -> Self {
        Self {
            type_id,
            mangled_name: mangled_name.to_string(),
            display_name: display_name.to_string(),
            field_list_id: None,
            is_forward_ref: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldListEntry {
    BaseClassRef { type_id: TypeId },
    Method { name: String, type_id: TypeId, is_static: bool },
}

impl FieldListEntry {
    pub fn method(name: &str, type_id: TypeId) -> Self {
        FieldListEntry::Method { name: name.to_string(), type_id, is_static: false }
    }

    pub fn static_method(name: &str, type_id: TypeId) -> Self {
        FieldListEntry::Method { name: name.to_string(), type_id, is_static: true }
    }

    pub fn base(type_id: TypeId) -> Self {
        FieldListEntry::BaseClassRef { type_id }
    }

    /// Value identity used when merging duplicate field lists. Methods
    /// compare by name and type, bases by type.
    pub fn same_as(&self, other: &FieldListEntry) -> bool {
        match (self, other) {
            (FieldListEntry::BaseClassRef { type_id: a }, FieldListEntry::BaseClassRef { type_id: b }) => a == b,
            (
                FieldListEntry::Method { name: name_a, type_id: a, .. },
                FieldListEntry::Method { name: name_b, type_id: b, .. },
            ) => name_a == name_b && a == b,
            _ => false,
        }
    }
}

/// An `LF_FIELDLIST` record holding base classes and methods in dump order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldListRecord {
    pub type_id: TypeId,
    pub entries: Vec<FieldListEntry>,
}

impl FieldListRecord {
    pub fn new(type_id: TypeId, entries: Vec<FieldListEntry>) -> Self {
        Self { type_id, entries }
    }

    pub fn base_classes(&self) -> impl Iterator<Item = TypeId> + '_ {
        self.entries.iter().filter_map(|entry| match entry {
            FieldListEntry::BaseClassRef { type_id } => Some(*type_id),
            FieldListEntry::Method { .. } => None,
        })
    }

    /// Appends every entry of `other` not already present. Returns how many
    /// were added.
    pub fn union_merge(&mut self, other: &[FieldListEntry]) -> usize {
        let mut added = 0;
        for entry in other {
            if !self.entries.iter().any(|existing| existing.same_as(entry)) {
                self.entries.push(entry.clone());
                added += 1;
            }
        }
        added
    }
}

/// An `LF_MFUNCTION` record, the type a method's procedure symbol points at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberFunctionRecord {
    pub type_id: TypeId,
    pub class_type_id: TypeId,
    pub this_type_id: Option<TypeId>,
}

impl MemberFunctionRecord {
    pub fn is_static(&self) -> bool {
        self.this_type_id.is_none()
    }
}

/// Every record kind the type table stores.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeRecord {
    Class(ClassRecord),
    FieldList(FieldListRecord),
    MemberFunction(MemberFunctionRecord),
}

impl TypeRecord {
    pub fn type_id(&self) -> TypeId {
        match self {
            TypeRecord::Class(class) => class.type_id,
            TypeRecord::FieldList(list) => list.type_id,
            TypeRecord::MemberFunction(function) => function.type_id,
        }
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            TypeRecord::Class(_) => "class",
            TypeRecord::FieldList(_) => "field list",
            TypeRecord::MemberFunction(_) => "member function",
        }
    }
}

/// A global procedure symbol (`S_GPROC32`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcedureRecord {
    pub name: String,
    pub type_id: Option<TypeId>,
    pub virtual_address: VirtualAddress,
}

/// A public symbol (`S_PUB32`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublicSymbol {
    pub mangled_name: String,
    pub virtual_address: VirtualAddress,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionHeaderRecord {
    pub number: u16,
    pub name: String,
    pub virtual_size: u64,
    pub virtual_address: u64,
}
