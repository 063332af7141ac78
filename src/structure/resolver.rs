// Mon Jan 19 2026 - Alex

//! Binds forward references to their definitions and links every real class
//! to its base classes and procedure symbols.

use crate::dump::error::ResolutionError;
use crate::structure::table::TypeTable;
use crate::structure::types::{ProcedureRecord, TypeId};
use indexmap::{IndexMap, IndexSet};

/// Mangled name of every real class, mapped to its type id.
pub type NameTable = IndexMap<String, TypeId>;

/// Real class mapped to the real classes it derives from.
pub type BaseClassMap = IndexMap<TypeId, IndexSet<TypeId>>;

/// Real class mapped to the indices of its procedure symbols.
pub type ProcedureMap = IndexMap<TypeId, Vec<usize>>;

/// Forward-reference type id mapped to the type id of its definition.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReferenceMap {
    targets: IndexMap<TypeId, TypeId>,
}

impl ReferenceMap {
    pub fn get(&self, forward_ref: TypeId) -> Option<TypeId> {
        self.targets.get(&forward_ref).copied()
    }

    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (TypeId, TypeId)> + '_ {
        self.targets.iter().map(|(from, to)| (*from, *to))
    }

    /// Points every reference aimed at `from` to `to` instead.
    pub(crate) fn redirect(&mut self, from: TypeId, to: TypeId) {
        for target in self.targets.values_mut() {
            if *target == from {
                *target = to;
            }
        }
    }
}

/// Output of the resolver. Everything is keyed by type id; procedures are
/// indices into the slice the resolver was given.
#[derive(Debug, Clone, Default)]
pub struct Resolution {
    pub names: NameTable,
    pub references: ReferenceMap,
    pub base_classes: BaseClassMap,
    pub procedures: ProcedureMap,
}

impl Resolution {
    pub fn bases_of(&self, class: TypeId) -> Option<&IndexSet<TypeId>> {
        self.base_classes.get(&class)
    }

    pub fn procedures_of(&self, class: TypeId) -> &[usize] {
        self.procedures.get(&class).map(Vec::as_slice).unwrap_or(&[])
    }
}

/// First pass: mangled name -> type id for every real class. On a clash the
/// first definition wins; the deduplicator folds the rest in later.
pub fn build_name_table(table: &TypeTable) -> NameTable {
    let mut names = NameTable::new();
    for class in table.real_classes() {
        if let Some(existing) = names.get(&class.mangled_name) {
            log::debug!(
                "`{}` defined by both {} and {}",
                class.mangled_name,
                existing,
                class.type_id
            );
            continue;
        }
        names.insert(class.mangled_name.clone(), class.type_id);
    }
    names
}

/// Second pass: binds each forward reference to its definition by mangled name.
pub fn resolve_references(table: &TypeTable, names: &NameTable) -> Result<ReferenceMap, ResolutionError> {
    let mut references = ReferenceMap::default();

    for forward in table.forward_refs() {
        let target = names
            .get(&forward.mangled_name)
            .copied()
            .ok_or_else(|| ResolutionError::UnresolvedForwardRef {
                type_id: forward.type_id,
                mangled_name: forward.mangled_name.clone(),
            })?;
        references.targets.insert(forward.type_id, target);
    }

    log::debug!("resolved {} forward references", references.len());
    Ok(references)
}

/// Real class named by `type_id`, either directly or through a forward reference.
pub fn resolve_class(table: &TypeTable, references: &ReferenceMap, type_id: TypeId) -> Option<TypeId> {
    references
        .get(type_id)
        .or_else(|| table.real_class(type_id).map(|class| class.type_id))
}

pub fn resolve_base_classes(
    table: &TypeTable,
    references: &ReferenceMap,
) -> Result<BaseClassMap, ResolutionError> {
    let mut bases = IndexMap::new();

    for class in table.real_classes() {
        let mut resolved = IndexSet::new();
        if let Some(list) = table.field_list_of(class) {
            for base in list.base_classes() {
                let target = resolve_class(table, references, base).ok_or_else(|| {
                    ResolutionError::UnresolvedBaseClass {
                        class_name: class.display_name.clone(),
                        base_type_id: base,
                    }
                })?;
                resolved.insert(target);
            }
        }
        bases.insert(class.type_id, resolved);
    }

    Ok(bases)
}

/// Attaches each procedure to the class its member-function type names.
/// Procedures without such a type are free functions and are skipped.
pub fn correlate_procedures(
    table: &TypeTable,
    references: &ReferenceMap,
    procedures: &[ProcedureRecord],
) -> ProcedureMap {
    let mut by_class = ProcedureMap::new();
    let mut dropped = 0usize;

    for (index, procedure) in procedures.iter().enumerate() {
        let owner = procedure
            .type_id
            .and_then(|type_id| table.member_function(type_id))
            .and_then(|function| resolve_class(table, references, function.class_type_id));

        match owner {
            Some(class) => by_class.entry(class).or_default().push(index),
            None => {
                log::trace!("{} at {} is not a method", procedure.name, procedure.virtual_address);
                dropped += 1;
            }
        }
    }

    log::debug!(
        "correlated {} procedures, {} free functions skipped",
        procedures.len() - dropped,
        dropped
    );
    by_class
}

pub struct Resolver;

impl Resolver {
    pub fn resolve(table: &TypeTable, procedures: &[ProcedureRecord]) -> Result<Resolution, ResolutionError> {
        let names = build_name_table(table);
        let references = resolve_references(table, &names)?;
        let base_classes = resolve_base_classes(table, &references)?;
        let procedures = correlate_procedures(table, &references, procedures);

        Ok(Resolution {
            names,
            references,
            base_classes,
            procedures,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::structure::types::{
        ClassRecord, FieldListEntry, FieldListRecord, MemberFunctionRecord, TypeRecord, VirtualAddress,
    };

    fn id(value: u32) -> TypeId {
        TypeId::new(value)
    }

    fn table(records: Vec<TypeRecord>) -> TypeTable {
        let mut table = TypeTable::new();
        for (line, record) in records.into_iter().enumerate() {
            table.insert(record, line + 1).unwrap();
        }
        table
    }

    fn hierarchy() -> TypeTable {
        table(vec![
            TypeRecord::Class(ClassRecord::forward_ref(id(0x1000), "Base", ".?AVBase@@")),
            TypeRecord::MemberFunction(MemberFunctionRecord {
                type_id: id(0x1001),
                class_type_id: id(0x1000),
                this_type_id: Some(id(0x1005)),
            }),
            TypeRecord::FieldList(FieldListRecord::new(id(0x1002), vec![FieldListEntry::method("Bar", id(0x1001))])),
            TypeRecord::Class(ClassRecord::definition(id(0x1003), "Base", ".?AVBase@@", Some(id(0x1002)))),
            TypeRecord::Class(ClassRecord::forward_ref(id(0x1004), "Derived", ".?AVDerived@@")),
            TypeRecord::FieldList(FieldListRecord::new(id(0x1006), vec![FieldListEntry::base(id(0x1000))])),
            TypeRecord::Class(ClassRecord::definition(id(0x1007), "Derived", ".?AVDerived@@", Some(id(0x1006)))),
        ])
    }

    #[test]
    fn test_name_table_only_holds_definitions() {
        let names = build_name_table(&hierarchy());
        assert_eq!(names.len(), 2);
        assert_eq!(names.get(".?AVBase@@"), Some(&id(0x1003)));
        assert_eq!(names.get(".?AVDerived@@"), Some(&id(0x1007)));
    }

    #[test]
    fn test_name_table_first_definition_wins() {
        let table = table(vec![
            TypeRecord::Class(ClassRecord::definition(id(0x10), "A", ".?AVA@@", None)),
            TypeRecord::Class(ClassRecord::definition(id(0x20), "A", ".?AVA@@", None)),
        ]);
        assert_eq!(build_name_table(&table).get(".?AVA@@"), Some(&id(0x10)));
    }

    #[test]
    fn test_forward_refs_bind_to_definitions() {
        let table = hierarchy();
        let references = resolve_references(&table, &build_name_table(&table)).unwrap();

        assert_eq!(references.get(id(0x1000)), Some(id(0x1003)));
        assert_eq!(references.get(id(0x1004)), Some(id(0x1007)));
        assert_eq!(references.get(id(0x1003)), None);
    }

    #[test]
    fn test_several_forward_refs_share_a_definition() {
        let table = table(vec![
            TypeRecord::Class(ClassRecord::forward_ref(id(0x10), "A", ".?AVA@@")),
            TypeRecord::Class(ClassRecord::forward_ref(id(0x11), "A", ".?AVA@@")),
            TypeRecord::Class(ClassRecord::definition(id(0x12), "A", ".?AVA@@", None)),
        ]);
        let references = resolve_references(&table, &build_name_table(&table)).unwrap();
        assert_eq!(references.get(id(0x10)), Some(id(0x12)));
        assert_eq!(references.get(id(0x11)), Some(id(0x12)));
    }

    #[test]
    fn test_unresolved_forward_ref() {
        let table = table(vec![TypeRecord::Class(ClassRecord::forward_ref(id(0x10), "Ghost", ".?AVGhost@@"))]);
        let err = resolve_references(&table, &build_name_table(&table)).unwrap_err();
        assert_eq!(
            err,
            ResolutionError::UnresolvedForwardRef {
                type_id: id(0x10),
                mangled_name: ".?AVGhost@@".to_string(),
            }
        );
    }

    #[test]
    fn test_base_classes_resolve_through_forward_refs() {
        let table = hierarchy();
        let resolution = Resolver::resolve(&table, &[]).unwrap();

        let bases: Vec<_> = resolution.bases_of(id(0x1007)).unwrap().iter().copied().collect();
        assert_eq!(bases, vec![id(0x1003)]);
        assert!(resolution.bases_of(id(0x1003)).unwrap().is_empty());
    }

    #[test]
    fn test_unresolvable_base_class() {
        let table = table(vec![
            TypeRecord::FieldList(FieldListRecord::new(id(0x20), vec![FieldListEntry::base(id(0x99))])),
            TypeRecord::Class(ClassRecord::definition(id(0x21), "Orphan", ".?AVOrphan@@", Some(id(0x20)))),
        ]);
        let err = Resolver::resolve(&table, &[]).unwrap_err();
        assert_eq!(
            err,
            ResolutionError::UnresolvedBaseClass {
                class_name: "Orphan".to_string(),
                base_type_id: id(0x99),
            }
        );
    }

    #[test]
    fn test_procedures_follow_member_function_class() {
        let table = hierarchy();
        let procedures = vec![
            ProcedureRecord {
                name: "Base::Bar".to_string(),
                type_id: Some(id(0x1001)),
                virtual_address: VirtualAddress::new(0x401000),
            },
            ProcedureRecord {
                name: "main".to_string(),
                type_id: Some(id(0x2000)),
                virtual_address: VirtualAddress::new(0x402000),
            },
            ProcedureRecord {
                name: "_start".to_string(),
                type_id: None,
                virtual_address: VirtualAddress::new(0x403000),
            },
        ];

        let resolution = Resolver::resolve(&table, &procedures).unwrap();
        assert_eq!(resolution.procedures_of(id(0x1003)), &[0]);
        assert!(resolution.procedures_of(id(0x1007)).is_empty());
        assert_eq!(resolution.procedures.len(), 1);
    }
}
