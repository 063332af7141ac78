// Mon Jan 19 2026 - Alex

use crate::output::{MethodKind, ResolvedClass};
use crate::structure::types::TypeId;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodEntry {
    pub name: String,
    pub kind: MethodKind,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassEntry {
    pub demangled_name: String,
    /// Mangled names of the direct base classes.
    pub base_classes: Vec<String>,
    /// Hex address (`0x401000`) to method.
    pub methods: IndexMap<String, MethodEntry>,
}

/// The output document: mangled class name to class entry, in dump order.
pub type ClassDocument = IndexMap<String, ClassEntry>;

#[derive(Error, Debug)]
pub enum JsonError {
    #[error("serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub struct JsonSerializer {
    pretty_print: bool,
}

impl JsonSerializer {
    pub fn new() -> Self {
        Self { pretty_print: true }
    }

    pub fn with_pretty_print(mut self, pretty: bool) -> Self {
        self.pretty_print = pretty;
        self
    }

    pub fn build_document(&self, classes: &[ResolvedClass<'_>]) -> ClassDocument {
        let mangled: HashMap<TypeId, &str> = classes
            .iter()
            .map(|class| (class.type_id(), class.class.mangled_name.as_str()))
            .collect();

        let mut document = ClassDocument::new();
        for class in classes {
            let mut methods = IndexMap::new();
            for method in &class.methods {
                let Some(address) = method.virtual_address else {
                    continue;
                };
                let key = address.to_string();
                if methods.contains_key(&key) {
                    log::debug!("{} shares {} with an earlier method", method.name, key);
                    continue;
                }
                methods.insert(
                    key,
                    MethodEntry {
                        name: method.name.clone(),
                        kind: method.kind,
                    },
                );
            }

            let entry = ClassEntry {
                demangled_name: class.class.display_name.clone(),
                base_classes: class
                    .base_classes
                    .iter()
                    .filter_map(|base| mangled.get(base).map(|name| name.to_string()))
                    .collect(),
                methods,
            };

            // assembled classes have unique mangled names
            document.insert(class.class.mangled_name.clone(), entry);
        }
        document
    }

    pub fn serialize(&self, classes: &[ResolvedClass<'_>]) -> Result<String, JsonError> {
        self.serialize_document(&self.build_document(classes))
    }

    pub fn serialize_document(&self, document: &ClassDocument) -> Result<String, JsonError> {
        let json = if self.pretty_print {
            serde_json::to_string_pretty(document)?
        } else {
            serde_json::to_string(document)?
        };
        Ok(json)
    }

    pub fn write_document<P: AsRef<Path>>(&self, document: &ClassDocument, path: P) -> Result<(), JsonError> {
        let json = self.serialize_document(document)?;
        let path = path.as_ref();
        let io_error = |source| JsonError::Io {
            path: path.to_path_buf(),
            source,
        };

        let file = File::create(path).map_err(io_error)?;
        let mut writer = BufWriter::new(file);
        writer.write_all(json.as_bytes()).map_err(io_error)?;
        writer.write_all(b"\n").map_err(io_error)?;
        writer.flush().map_err(io_error)?;
        log::info!("wrote {} classes to {}", document.len(), path.display());
        Ok(())
    }
}

impl Default for JsonSerializer {
    fn default() -> Self {
        Self::new()
    }
}
