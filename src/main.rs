// Mon Jan 19 2026 - Alex

use anyhow::Context;
use clap::error::ErrorKind;
use clap::Parser;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use pdb_class_recovery::{
    config::Config,
    dump::{extract::parse_hex, Stage},
    engine::pipeline::{Pipeline, StageObserver},
    output::JsonSerializer,
    utils::LoggingUtils,
};
use std::path::PathBuf;
use std::time::Instant;

#[derive(Parser, Debug)]
#[command(author = "Alex")]
#[command(version = "1.0.0")]
#[command(about = "Recovers C++ class hierarchies and method addresses from cvdump text dumps", long_about = None)]
struct Args {
    /// cvdump text output
    dump: PathBuf,

    /// Write JSON here instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Image base in hex (default 0x400000)
    #[arg(long, value_parser = parse_image_base)]
    image_base: Option<u64>,

    /// Do not fall back to S_PUB32 symbols for method addresses
    #[arg(long)]
    no_publics: bool,

    /// Single-line JSON
    #[arg(long)]
    compact: bool,

    /// JSON config file; flags override its values
    #[arg(long)]
    config: Option<PathBuf>,

    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[arg(long)]
    log_level: Option<String>,

    #[arg(long)]
    no_progress: bool,
}

fn parse_image_base(value: &str) -> Result<u64, String> {
    parse_hex(value).ok_or_else(|| format!("`{}` is not a hexadecimal address", value))
}

/// Drives the stage progress bar.
struct ProgressObserver {
    bar: Option<ProgressBar>,
}

impl ProgressObserver {
    fn new(enabled: bool) -> Self {
        let bar = enabled.then(|| {
            let pb = ProgressBar::new(Stage::ALL.len() as u64);
            let style = ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
                .map(|style| style.progress_chars("#>-"))
                .unwrap_or_else(|_| ProgressStyle::default_bar());
            pb.set_style(style);
            pb.set_message("Initializing...");
            pb
        });
        Self { bar }
    }

    fn finish(&self) {
        if let Some(bar) = &self.bar {
            bar.finish_and_clear();
        }
    }
}

impl StageObserver for ProgressObserver {
    fn stage_started(&mut self, stage: Stage) {
        if let Some(bar) = &self.bar {
            bar.set_message(format!("{}...", stage));
        }
    }

    fn stage_finished(&mut self, stage: Stage, summary: &str) {
        log::info!("{}: {}", stage, summary);
        if let Some(bar) = &self.bar {
            bar.inc(1);
        }
    }
}

fn build_config(args: &Args) -> anyhow::Result<Config> {
    let mut config = match &args.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };

    if let Some(image_base) = args.image_base {
        config = config.with_image_base(image_base);
    }
    if args.no_publics {
        config = config.with_publics(false);
    }
    if args.compact {
        config = config.with_pretty_print(false);
    }
    if let Some(output) = &args.output {
        config = config.with_output_file(output.clone());
    }
    if args.no_progress {
        config = config.with_progress_bars(false);
    }
    if let Some(level) = &args.log_level {
        config = config.with_log_level(level);
    } else if args.verbose > 0 {
        let level = LoggingUtils::level_from_verbosity(args.verbose);
        config = config.with_log_level(&level.to_string());
    }

    config.validate()?;
    Ok(config)
}

fn run(args: Args) -> anyhow::Result<()> {
    let config = build_config(&args)?;
    let level = LoggingUtils::level_from_str(&config.log_level).unwrap_or(log::LevelFilter::Warn);
    LoggingUtils::init(level);

    let start_time = Instant::now();
    eprintln!("{} Loading dump: {}", "[*]".blue(), args.dump.display());

    let mut observer = ProgressObserver::new(config.enable_progress_bars);
    let result = Pipeline::from_config(&config).run_file(&args.dump, &mut observer);
    observer.finish();

    let report = result.map_err(|err| {
        let stage = err.stage();
        anyhow::Error::new(err).context(format!("{} stage failed for {}", stage, args.dump.display()))
    })?;

    let serializer = JsonSerializer::new().with_pretty_print(config.pretty_print);
    match &config.output_file {
        Some(path) => {
            serializer
                .write_document(&report.document, path)
                .with_context(|| format!("could not save results to {}", path.display()))?;
            eprintln!("{} Results saved to: {}", "[+]".green(), path.display());
        }
        None => {
            let json = serializer.serialize_document(&report.document)?;
            println!("{}", json);
        }
    }

    let elapsed = start_time.elapsed();
    let assembly = &report.assembly;
    eprintln!(
        "{} Recovered {} classes in {:.2}s",
        "[+]".green(),
        assembly.classes.to_string().green(),
        elapsed.as_secs_f64()
    );
    eprintln!(
        "{} Methods: {} from procedures, {} from public symbols, {} without address",
        "[+]".green(),
        assembly.from_procedures,
        assembly.from_publics,
        assembly.unaddressed()
    );
    if !report.dedup.is_empty() {
        eprintln!("{} Duplicates: {}", "[*]".blue(), report.dedup);
    }
    if level >= log::LevelFilter::Info {
        eprint!("{}", report.hierarchy);
    }

    Ok(())
}

fn main() {
    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(err) => {
            let code = match err.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => 0,
                _ => 1,
            };
            let _ = err.print();
            std::process::exit(code);
        }
    };

    if let Err(err) = run(args) {
        eprintln!("{} {:#}", "[!]".red(), err);
        std::process::exit(1);
    }
}
