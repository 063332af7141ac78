// Mon Jan 19 2026 - Alex

use crate::dump::error::{DumpError, DumpResult};
use crate::structure::types::{ClassRecord, FieldListRecord, MemberFunctionRecord, TypeId, TypeRecord};
use indexmap::IndexMap;

/// Owning arena of every parsed type record, in dump order.
#[derive(Debug, Clone, Default)]
pub struct TypeTable {
    records: IndexMap<TypeId, TypeRecord>,
}

impl TypeTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a record parsed at `line_number`. The dumper numbers records
    /// uniquely, so a repeated id means the dump is corrupt.
    pub fn insert(&mut self, record: TypeRecord, line_number: usize) -> DumpResult<()> {
        let type_id = record.type_id();
        if let Some(existing) = self.records.get(&type_id) {
            return Err(DumpError::Grammar {
                marker: "unique type id".to_string(),
                line_number,
                line: format!("{} redefined ({} then {})", type_id, existing.kind_name(), record.kind_name()),
            });
        }
        self.records.insert(type_id, record);
        Ok(())
    }

    pub fn get(&self, type_id: TypeId) -> Option<&TypeRecord> {
        self.records.get(&type_id)
    }

    pub fn class(&self, type_id: TypeId) -> Option<&ClassRecord> {
        match self.records.get(&type_id)? {
            TypeRecord::Class(class) => Some(class),
            TypeRecord::FieldList(_) | TypeRecord::MemberFunction(_) => None,
        }
    }

    /// The class with `type_id` if it is a real definition.
    pub fn real_class(&self, type_id: TypeId) -> Option<&ClassRecord> {
        self.class(type_id).filter(|class| !class.is_forward_ref)
    }

    pub fn field_list(&self, type_id: TypeId) -> Option<&FieldListRecord> {
        match self.records.get(&type_id)? {
            TypeRecord::FieldList(list) => Some(list),
            TypeRecord::Class(_) | TypeRecord::MemberFunction(_) => None,
        }
    }

    pub fn member_function(&self, type_id: TypeId) -> Option<&MemberFunctionRecord> {
        match self.records.get(&type_id)? {
            TypeRecord::MemberFunction(function) => Some(function),
            TypeRecord::Class(_) | TypeRecord::FieldList(_) => None,
        }
    }

    /// Field list of a class, if it has one that survived parsing.
    pub fn field_list_of(&self, class: &ClassRecord) -> Option<&FieldListRecord> {
        class.field_list_id.and_then(|id| self.field_list(id))
    }

    pub fn classes(&self) -> impl Iterator<Item = &ClassRecord> {
        self.records.values().filter_map(|record| match record {
            TypeRecord::Class(class) => Some(class),
            TypeRecord::FieldList(_) | TypeRecord::MemberFunction(_) => None,
        })
    }

    pub fn real_classes(&self) -> impl Iterator<Item = &ClassRecord> {
        self.classes().filter(|class| !class.is_forward_ref)
    }

    pub fn forward_refs(&self) -> impl Iterator<Item = &ClassRecord> {
        self.classes().filter(|class| class.is_forward_ref)
    }

    pub fn records(&self) -> impl Iterator<Item = &TypeRecord> {
        self.records.values()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub(crate) fn class_mut(&mut self, type_id: TypeId) -> Option<&mut ClassRecord> {
        match self.records.get_mut(&type_id)? {
            TypeRecord::Class(class) => Some(class),
            TypeRecord::FieldList(_) | TypeRecord::MemberFunction(_) => None,
        }
    }

    pub(crate) fn field_list_mut(&mut self, type_id: TypeId) -> Option<&mut FieldListRecord> {
        match self.records.get_mut(&type_id)? {
            TypeRecord::FieldList(list) => Some(list),
            TypeRecord::Class(_) | TypeRecord::MemberFunction(_) => None,
        }
    }

    /// Removes a record keeping the order of the rest.
    pub(crate) fn remove(&mut self, type_id: TypeId) -> Option<TypeRecord> {
        self.records.shift_remove(&type_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::structure::types::FieldListEntry;

    fn sample() -> TypeTable {
        let mut table = TypeTable::new();
        table
            .insert(TypeRecord::Class(ClassRecord::forward_ref(TypeId::new(0x1000), "Base", ".?AVBase@@")), 1)
            .unwrap();
        table
            .insert(TypeRecord::FieldList(FieldListRecord::new(
                TypeId::new(0x1001),
                vec![FieldListEntry::method("Bar", TypeId::new(0x10))],
            )), 1)
            .unwrap();
        table
            .insert(TypeRecord::Class(ClassRecord::definition(
                TypeId::new(0x1002),
                "Base",
                ".?AVBase@@",
                Some(TypeId::new(0x1001)),
            )), 1)
            .unwrap();
        table
    }

    #[test]
    fn test_typed_lookups() {
        let table = sample();

        assert_eq!(table.len(), 3);
        assert!(table.class(TypeId::new(0x1000)).unwrap().is_forward_ref);
        assert!(table.real_class(TypeId::new(0x1000)).is_none());
        assert!(table.class(TypeId::new(0x1001)).is_none());
        assert!(table.field_list(TypeId::new(0x1001)).is_some());

        let base = table.real_class(TypeId::new(0x1002)).unwrap();
        assert_eq!(table.field_list_of(base).unwrap().entries.len(), 1);
    }

    #[test]
    fn test_iteration_keeps_insertion_order() {
        let table = sample();
        let ids: Vec<_> = table.classes().map(|class| class.type_id.as_u32()).collect();
        assert_eq!(ids, vec![0x1000, 0x1002]);
        assert_eq!(table.forward_refs().count(), 1);
        assert_eq!(table.real_classes().count(), 1);
    }

    #[test]
    fn test_duplicate_type_id_rejected() {
        let mut table = sample();
        let err = table
            .insert(TypeRecord::Class(ClassRecord::forward_ref(TypeId::new(0x1002), "X", ".?AVX@@")), 9)
            .unwrap_err();
        assert!(matches!(err, DumpError::Grammar { ref marker, .. } if marker == "unique type id"));
    }

    #[test]
    fn test_remove_preserves_order() {
        let mut table = sample();
        table.remove(TypeId::new(0x1001));
        let ids: Vec<_> = table.records().map(|record| record.type_id().as_u32()).collect();
        assert_eq!(ids, vec![0x1000, 0x1002]);
    }
}
