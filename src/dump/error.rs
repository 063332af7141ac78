// Mon Jan 19 2026 - Alex

use crate::structure::types::TypeId;
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DumpError {
    #[error("cannot read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("section banner `{banner}` not found")]
    SectionNotFound { banner: &'static str },
    #[error("expected `{marker}` at line {line_number}: {line}")]
    Grammar {
        marker: String,
        line_number: usize,
        line: String,
    },
    #[error("{record} record truncated at line {line_number}")]
    TruncatedRecord {
        record: &'static str,
        line_number: usize,
    },
    #[error(transparent)]
    Resolution(#[from] ResolutionError),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResolutionError {
    #[error("forward reference {type_id} to `{mangled_name}` has no definition")]
    UnresolvedForwardRef { type_id: TypeId, mangled_name: String },
    #[error("class `{class_name}` names base class {base_type_id} which is not a resolvable class")]
    UnresolvedBaseClass { class_name: String, base_type_id: TypeId },
    #[error("class `{class_name}` references base {base_type_id} missing from the result")]
    DanglingBaseClass { class_name: String, base_type_id: TypeId },
    #[error("classes {first} and {second} share the mangled name `{mangled_name}`")]
    DuplicateMangledName {
        mangled_name: String,
        first: TypeId,
        second: TypeId,
    },
}

impl DumpError {
    pub fn grammar(marker: &str, line_number: usize, line: &str) -> Self {
        DumpError::Grammar {
            marker: marker.to_string(),
            line_number,
            line: line.trim().to_string(),
        }
    }

    pub fn stage(&self) -> Stage {
        match self {
            DumpError::Io { .. } | DumpError::SectionNotFound { .. } => Stage::Scan,
            DumpError::Grammar { .. } | DumpError::TruncatedRecord { .. } => Stage::Parse,
            DumpError::Resolution(
                ResolutionError::DanglingBaseClass { .. } | ResolutionError::DuplicateMangledName { .. },
            ) => Stage::Assemble,
            DumpError::Resolution(_) => Stage::Resolve,
        }
    }
}

pub type DumpResult<T> = Result<T, DumpError>;

/// Pipeline stage, used for progress reporting and diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Scan,
    Parse,
    Resolve,
    Dedup,
    Assemble,
}

impl Stage {
    pub const ALL: [Stage; 5] = [Stage::Scan, Stage::Parse, Stage::Resolve, Stage::Dedup, Stage::Assemble];

    pub fn name(&self) -> &'static str {
        match self {
            Stage::Scan => "scan",
            Stage::Parse => "parse",
            Stage::Resolve => "resolve",
            Stage::Dedup => "dedup",
            Stage::Assemble => "assemble",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
