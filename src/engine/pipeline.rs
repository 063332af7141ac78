// Mon Jan 19 2026 - Alex

//! Runs a dump through every stage: scan, parse, resolve, dedup, assemble.

use crate::config::Config;
use crate::dump::error::{DumpError, DumpResult, Stage};
use crate::dump::scanner::{Dump, Section};
use crate::dump::parse_types;
use crate::output::json::{ClassDocument, JsonSerializer};
use crate::output::{assemble, AssemblyStats, ResolvedClass};
use crate::structure::dedup::{deduplicate, DedupReport};
use crate::structure::hierarchy::HierarchyStats;
use crate::structure::resolver::{Resolution, Resolver};
use crate::structure::table::TypeTable;
use crate::symbol::{PublicIndex, SymbolTables};
use crate::utils::logging::ScopedTimer;
use std::path::Path;

/// Receives stage transitions, e.g. to drive a progress display.
pub trait StageObserver {
    fn stage_started(&mut self, _stage: Stage) {}
    fn stage_finished(&mut self, _stage: Stage, _summary: &str) {}
}

pub struct SilentObserver;

impl StageObserver for SilentObserver {}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PipelineOptions {
    pub image_base: u64,
    pub use_publics: bool,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self::from(&Config::default())
    }
}

impl From<&Config> for PipelineOptions {
    fn from(config: &Config) -> Self {
        Self {
            image_base: config.image_base,
            use_publics: config.use_publics,
        }
    }
}

/// Everything known after resolution and deduplication. Owns the records the
/// assembled classes borrow.
#[derive(Debug, Clone)]
pub struct Recovery {
    pub table: TypeTable,
    pub resolution: Resolution,
    pub symbols: SymbolTables,
    pub publics: Option<PublicIndex>,
    pub dedup: DedupReport,
}

impl Recovery {
    pub fn assemble(&self) -> DumpResult<Vec<ResolvedClass<'_>>> {
        let classes = assemble(
            &self.table,
            &self.resolution,
            &self.symbols.procedures,
            self.publics.as_ref(),
        )?;
        Ok(classes)
    }

    pub fn hierarchy(&self) -> HierarchyStats {
        HierarchyStats::from_bases(&self.resolution.base_classes)
    }
}

#[derive(Debug, Clone)]
pub struct PipelineReport {
    pub document: ClassDocument,
    pub assembly: AssemblyStats,
    pub hierarchy: HierarchyStats,
    pub dedup: DedupReport,
}

pub struct Pipeline {
    options: PipelineOptions,
}

impl Pipeline {
    pub fn new(options: PipelineOptions) -> Self {
        Self { options }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(PipelineOptions::from(config))
    }

    pub fn options(&self) -> PipelineOptions {
        self.options
    }

    pub fn run_file<P: AsRef<Path>>(&self, path: P, observer: &mut dyn StageObserver) -> DumpResult<PipelineReport> {
        observer.stage_started(Stage::Scan);
        let dump = Dump::read(path)?;
        self.scan(&dump, observer)?;
        self.finish(&dump, observer)
    }

    pub fn run(&self, dump: &Dump, observer: &mut dyn StageObserver) -> DumpResult<PipelineReport> {
        observer.stage_started(Stage::Scan);
        self.scan(dump, observer)?;
        self.finish(dump, observer)
    }

    /// Parse, resolve and dedup, stopping short of assembly.
    pub fn recover(&self, dump: &Dump, observer: &mut dyn StageObserver) -> DumpResult<Recovery> {
        let (table, symbols) = {
            let _timer = ScopedTimer::new("parse");
            observer.stage_started(Stage::Parse);
            let table = parse_types(dump)?;
            let symbols = SymbolTables::load(dump, self.options.image_base, self.options.use_publics)?;
            observer.stage_finished(
                Stage::Parse,
                &format!(
                    "{} type records, {} procedures, {} publics",
                    table.len(),
                    symbols.procedures.len(),
                    symbols.publics.len()
                ),
            );
            (table, symbols)
        };

        let mut resolution = {
            let _timer = ScopedTimer::new("resolve");
            observer.stage_started(Stage::Resolve);
            let resolution = Resolver::resolve(&table, &symbols.procedures)?;
            observer.stage_finished(
                Stage::Resolve,
                &format!(
                    "{} forward references, {} classes with procedures",
                    resolution.references.len(),
                    resolution.procedures.len()
                ),
            );
            resolution
        };

        let mut table = table;
        let dedup = {
            let _timer = ScopedTimer::new("dedup");
            observer.stage_started(Stage::Dedup);
            let report = deduplicate(&mut table, &mut resolution);
            observer.stage_finished(Stage::Dedup, &format!("{} duplicates merged", report.merged.len()));
            report
        };

        let publics = (self.options.use_publics && !symbols.publics.is_empty())
            .then(|| PublicIndex::build(&symbols.publics));

        Ok(Recovery {
            table,
            resolution,
            symbols,
            publics,
            dedup,
        })
    }

    fn scan(&self, dump: &Dump, observer: &mut dyn StageObserver) -> DumpResult<()> {
        if !dump.has_section(Section::Types) {
            return Err(DumpError::SectionNotFound {
                banner: Section::Types.banner(),
            });
        }
        for section in [Section::SectionHeaders, Section::Symbols, Section::Globals, Section::Publics] {
            log::debug!("{}: {}", section, if dump.has_section(section) { "present" } else { "absent" });
        }
        observer.stage_finished(Stage::Scan, &format!("{} lines", dump.line_count()));
        Ok(())
    }

    fn finish(&self, dump: &Dump, observer: &mut dyn StageObserver) -> DumpResult<PipelineReport> {
        let recovery = self.recover(dump, observer)?;

        let _timer = ScopedTimer::new("assemble");
        observer.stage_started(Stage::Assemble);
        let classes = recovery.assemble()?;
        let assembly = AssemblyStats::collect(&classes);
        let document = JsonSerializer::new().build_document(&classes);
        observer.stage_finished(
            Stage::Assemble,
            &format!("{} classes, {} of {} methods placed", assembly.classes, assembly.methods - assembly.unaddressed(), assembly.methods),
        );

        log::info!(
            "{} classes, {} methods from procedures, {} from public symbols, {} without address",
            assembly.classes,
            assembly.from_procedures,
            assembly.from_publics,
            assembly.unaddressed()
        );

        Ok(PipelineReport {
            document,
            assembly,
            hierarchy: recovery.hierarchy(),
            dedup: recovery.dedup,
        })
    }
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::new(PipelineOptions::default())
    }
}
