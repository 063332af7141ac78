// Mon Jan 19 2026 - Alex

pub mod json;

pub use json::{ClassDocument, ClassEntry, JsonError, JsonSerializer, MethodEntry};

use crate::dump::error::ResolutionError;
use crate::structure::resolver::Resolution;
use crate::structure::table::TypeTable;
use crate::structure::types::{ClassRecord, FieldListEntry, ProcedureRecord, TypeId, VirtualAddress};
use crate::symbol::{class_scope, PublicIndex};
use crate::utils::names::{last_component, method_kind};
use indexmap::IndexSet;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MethodKind {
    Constructor,
    Destructor,
    Method,
}

impl fmt::Display for MethodKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MethodKind::Constructor => write!(f, "constructor"),
            MethodKind::Destructor => write!(f, "destructor"),
            MethodKind::Method => write!(f, "method"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddressSource {
    Procedure,
    Public,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodInfo {
    pub name: String,
    pub type_id: TypeId,
    pub virtual_address: Option<VirtualAddress>,
    pub source: Option<AddressSource>,
    pub kind: MethodKind,
}

/// A real class after resolution and deduplication, ready for output.
#[derive(Debug, Clone)]
pub struct ResolvedClass<'a> {
    pub class: &'a ClassRecord,
    pub base_classes: IndexSet<TypeId>,
    pub methods: Vec<MethodInfo>,
}

impl<'a> ResolvedClass<'a> {
    pub fn type_id(&self) -> TypeId {
        self.class.type_id
    }

    pub fn addressed_methods(&self) -> impl Iterator<Item = &MethodInfo> {
        self.methods.iter().filter(|method| method.virtual_address.is_some())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AssemblyStats {
    pub classes: usize,
    pub methods: usize,
    pub from_procedures: usize,
    pub from_publics: usize,
}

impl AssemblyStats {
    pub fn collect(classes: &[ResolvedClass<'_>]) -> Self {
        let mut stats = Self {
            classes: classes.len(),
            ..Self::default()
        };
        for method in classes.iter().flat_map(|class| &class.methods) {
            stats.methods += 1;
            match method.source {
                Some(AddressSource::Procedure) => stats.from_procedures += 1,
                Some(AddressSource::Public) => stats.from_publics += 1,
                None => {}
            }
        }
        stats
    }

    pub fn unaddressed(&self) -> usize {
        self.methods - self.from_procedures - self.from_publics
    }
}

pub struct Assembler<'a, 'r> {
    table: &'a TypeTable,
    resolution: &'r Resolution,
    procedures: &'r [ProcedureRecord],
    publics: Option<&'r PublicIndex>,
}

impl<'a, 'r> Assembler<'a, 'r> {
    pub fn new(table: &'a TypeTable, resolution: &'r Resolution, procedures: &'r [ProcedureRecord]) -> Self {
        Self {
            table,
            resolution,
            procedures,
            publics: None,
        }
    }

    pub fn with_publics(mut self, publics: &'r PublicIndex) -> Self {
        self.publics = Some(publics);
        self
    }

    pub fn assemble(&self) -> Result<Vec<ResolvedClass<'a>>, ResolutionError> {
        let classes: Vec<ResolvedClass<'a>> = self.table.real_classes().map(|class| self.assemble_class(class)).collect();
        check_closure(&classes)?;
        check_unique_names(&classes)?;
        Ok(classes)
    }

    fn assemble_class(&self, class: &'a ClassRecord) -> ResolvedClass<'a> {
        let declared: Vec<(&str, TypeId)> = self
            .table
            .field_list_of(class)
            .map(|list| {
                list.entries
                    .iter()
                    .filter_map(|entry| match entry {
                        FieldListEntry::Method {
                            name,
                            type_id,
                            is_static: false,
                        } => Some((name.as_str(), *type_id)),
                        _ => None,
                    })
                    .collect()
            })
            .unwrap_or_default();

        let methods = declared
            .iter()
            .map(|(name, type_id)| {
                let mut address = self.procedure_address(class.type_id, name, *type_id).map(|va| (va, AddressSource::Procedure));
                if address.is_none() {
                    let overloads = declared.iter().filter(|(other, _)| other == name).count();
                    if overloads == 1 {
                        address = self.public_address(class, name).map(|va| (va, AddressSource::Public));
                    }
                }

                MethodInfo {
                    name: name.to_string(),
                    type_id: *type_id,
                    virtual_address: address.map(|(va, _)| va),
                    source: address.map(|(_, source)| source),
                    kind: method_kind(&class.display_name, name),
                }
            })
            .collect();

        ResolvedClass {
            class,
            base_classes: self.resolution.bases_of(class.type_id).cloned().unwrap_or_default(),
            methods,
        }
    }

    fn procedure_address(&self, class: TypeId, name: &str, type_id: TypeId) -> Option<VirtualAddress> {
        self.resolution
            .procedures_of(class)
            .iter()
            .filter_map(|index| self.procedures.get(*index))
            .find(|procedure| procedure.type_id == Some(type_id) && last_component(&procedure.name) == name)
            .map(|procedure| procedure.virtual_address)
    }

    fn public_address(&self, class: &ClassRecord, name: &str) -> Option<VirtualAddress> {
        let publics = self.publics?;
        let scope = class_scope(&class.mangled_name)?;
        let address = publics.unique_address(scope, name)?;
        log::trace!("{}::{} placed at {} from public symbols", class.display_name, name, address);
        Some(address)
    }
}

/// Every base class must itself be among the assembled classes.
fn check_closure(classes: &[ResolvedClass<'_>]) -> Result<(), ResolutionError> {
    let known: HashSet<TypeId> = classes.iter().map(|class| class.type_id()).collect();

    for class in classes {
        if let Some(missing) = class.base_classes.iter().find(|base| !known.contains(*base)) {
            return Err(ResolutionError::DanglingBaseClass {
                class_name: class.class.display_name.clone(),
                base_type_id: *missing,
            });
        }
    }
    Ok(())
}

/// The output is keyed by mangled name, so two surviving classes may not
/// share one.
fn check_unique_names(classes: &[ResolvedClass<'_>]) -> Result<(), ResolutionError> {
    let mut seen: HashMap<&str, TypeId> = HashMap::new();
    for class in classes {
        if let Some(first) = seen.insert(class.class.mangled_name.as_str(), class.type_id()) {
            return Err(ResolutionError::DuplicateMangledName {
                mangled_name: class.class.mangled_name.clone(),
                first,
                second: class.type_id(),
            });
        }
    }
    Ok(())
}

pub fn assemble<'a>(
    table: &'a TypeTable,
    resolution: &Resolution,
    procedures: &[ProcedureRecord],
    publics: Option<&PublicIndex>,
) -> Result<Vec<ResolvedClass<'a>>, ResolutionError> {
    let assembler = Assembler::new(table, resolution, procedures);
    match publics {
        Some(publics) => assembler.with_publics(publics).assemble(),
        None => assembler.assemble(),
    }
}
