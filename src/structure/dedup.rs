// Mon Jan 19 2026 - Alex

//! Folds repeated definitions of the same class into one. A class compiled
//! into several translation units shows up once per unit in the dump.

use crate::structure::resolver::Resolution;
use crate::structure::table::TypeTable;
use crate::structure::types::{ClassRecord, TypeId};
use indexmap::IndexMap;
use std::fmt;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DedupReport {
    /// Removed duplicate mapped to the class it was folded into.
    pub merged: IndexMap<TypeId, TypeId>,
    pub entries_added: usize,
    pub field_lists_removed: usize,
}

impl DedupReport {
    pub fn is_empty(&self) -> bool {
        self.merged.is_empty()
    }
}

impl fmt::Display for DedupReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} duplicates merged, {} field-list entries added, {} field lists removed",
            self.merged.len(),
            self.entries_added,
            self.field_lists_removed
        )
    }
}

pub struct Deduplicator<'a> {
    table: &'a mut TypeTable,
    resolution: &'a mut Resolution,
    report: DedupReport,
}

impl<'a> Deduplicator<'a> {
    pub fn new(table: &'a mut TypeTable, resolution: &'a mut Resolution) -> Self {
        Self {
            table,
            resolution,
            report: DedupReport::default(),
        }
    }

    pub fn run(mut self) -> DedupReport {
        for (kept, duplicates) in self.duplicate_groups() {
            for duplicate in duplicates {
                self.merge(kept, duplicate);
            }
        }

        if !self.report.is_empty() {
            log::info!("{}", self.report);
        }
        self.report
    }

    /// Real classes grouped by display name, first definition as the key.
    fn duplicate_groups(&self) -> Vec<(TypeId, Vec<TypeId>)> {
        let mut groups: IndexMap<&str, Vec<TypeId>> = IndexMap::new();
        for class in self.table.real_classes() {
            groups.entry(class.display_name.as_str()).or_default().push(class.type_id);
        }

        groups
            .into_values()
            .filter(|ids| ids.len() > 1)
            .map(|ids| (ids[0], ids[1..].to_vec()))
            .collect()
    }

    fn merge(&mut self, kept: TypeId, duplicate: TypeId) {
        let Some(removed) = self.table.class(duplicate).cloned() else {
            return;
        };
        log::debug!("merging {} ({}) into {}", removed.display_name, duplicate, kept);

        self.merge_field_lists(kept, &removed);
        self.table.remove(duplicate);
        self.drop_orphaned_field_list(&removed);
        self.rewrite_resolution(kept, duplicate);

        self.report.merged.insert(duplicate, kept);
    }

    fn merge_field_lists(&mut self, kept: TypeId, duplicate: &ClassRecord) {
        let Some(duplicate_list) = duplicate.field_list_id else {
            return;
        };
        let kept_list = self.table.class(kept).and_then(|class| class.field_list_id);

        match kept_list {
            Some(list_id) if list_id == duplicate_list => {}
            Some(list_id) => {
                let entries = match self.table.field_list(duplicate_list) {
                    Some(list) => list.entries.clone(),
                    None => return,
                };
                if let Some(list) = self.table.field_list_mut(list_id) {
                    self.report.entries_added += list.union_merge(&entries);
                }
            }
            None => {
                if let Some(class) = self.table.class_mut(kept) {
                    class.field_list_id = Some(duplicate_list);
                }
            }
        }
    }

    fn drop_orphaned_field_list(&mut self, removed: &ClassRecord) {
        let Some(list_id) = removed.field_list_id else {
            return;
        };
        let still_used = self.table.classes().any(|class| class.field_list_id == Some(list_id));
        if !still_used && self.table.remove(list_id).is_some() {
            self.report.field_lists_removed += 1;
        }
    }

    fn rewrite_resolution(&mut self, kept: TypeId, duplicate: TypeId) {
        let resolution = &mut *self.resolution;

        resolution.references.redirect(duplicate, kept);
        for target in resolution.names.values_mut() {
            if *target == duplicate {
                *target = kept;
            }
        }

        if let Some(bases) = resolution.base_classes.shift_remove(&duplicate) {
            let kept_bases = resolution.base_classes.entry(kept).or_default();
            kept_bases.extend(bases);
        }
        // redirect in place so declaration order survives
        for (class, bases) in resolution.base_classes.iter_mut() {
            if bases.contains(&duplicate) {
                *bases = bases
                    .iter()
                    .map(|base| if *base == duplicate { kept } else { *base })
                    .filter(|base| base != class)
                    .collect();
            }
        }
        if let Some(bases) = resolution.base_classes.get_mut(&kept) {
            bases.shift_remove(&kept);
        }

        if let Some(procedures) = resolution.procedures.shift_remove(&duplicate) {
            let kept_procedures = resolution.procedures.entry(kept).or_default();
            for index in procedures {
                if !kept_procedures.contains(&index) {
                    kept_procedures.push(index);
                }
            }
            kept_procedures.sort_unstable();
        }
    }
}

pub fn deduplicate(table: &mut TypeTable, resolution: &mut Resolution) -> DedupReport {
    Deduplicator::new(table, resolution).run()
}
