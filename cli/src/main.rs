//! pdfoutline CLI - infer titles and heading outlines from PDFs

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::{Args, Parser, Subcommand, ValueEnum};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};

use pdfoutline::{
    pipeline, render, validate_json, CollectOptions, HashingEmbedder, JsonFormat, OutlineConfig,
    OutlineExtractor, OutlineReport, OutlineResult, PageSelection,
};

#[derive(Parser)]
#[command(name = "pdfoutline")]
#[command(version)]
#[command(about = "Infer the title and heading outline of PDF documents", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the outline of one PDF as JSON
    Outline {
        /// Input PDF file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        #[command(flatten)]
        analysis: AnalysisArgs,

        /// Output format
        #[arg(long, value_enum, default_value = "json")]
        format: OutputFormat,

        /// Print diagnostics and scores to stderr
        #[arg(long)]
        report: bool,
    },

    /// Print the outlines of every PDF in a directory
    Batch {
        /// Directory containing PDF files
        #[arg(value_name = "DIR")]
        dir: PathBuf,

        #[command(flatten)]
        analysis: AnalysisArgs,
    },

    /// Dump the positioned text fragments of a PDF
    Fragments {
        /// Input PDF file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Page range (e.g., "1-10", "1,3,5")
        #[arg(long)]
        pages: Option<String>,

        /// Output compact JSON
        #[arg(long)]
        compact: bool,
    },

    /// Check an outline JSON file against the output contract
    Check {
        /// Outline JSON file
        #[arg(value_name = "JSON")]
        input: PathBuf,
    },

    /// Show version information
    Version,
}

#[derive(Args)]
struct AnalysisArgs {
    /// Output compact JSON
    #[arg(long)]
    compact: bool,

    /// Enable the embedding similarity signal
    #[arg(long)]
    semantic: bool,

    /// Heading acceptance threshold
    #[arg(long, value_name = "SCORE")]
    threshold: Option<f32>,

    /// JSON configuration file (partial configs allowed)
    #[arg(long, value_name = "FILE", env = "PDFOUTLINE_CONFIG")]
    config: Option<PathBuf>,

    /// Page range (e.g., "1-10", "1,3,5")
    #[arg(long)]
    pages: Option<String>,
}

impl AnalysisArgs {
    fn json_format(&self) -> JsonFormat {
        if self.compact {
            JsonFormat::Compact
        } else {
            JsonFormat::Pretty
        }
    }

    fn extractor(&self) -> Result<OutlineExtractor, Box<dyn std::error::Error>> {
        let mut config = match &self.config {
            Some(path) => {
                log::debug!("Loading configuration from {}", path.display());
                OutlineConfig::from_json(&fs::read_to_string(path)?)?
            }
            None => OutlineConfig::default(),
        };
        if let Some(threshold) = self.threshold {
            config = config.with_heading_threshold(threshold);
        }
        config.validate()?;

        let mut extractor = OutlineExtractor::new()
            .with_config(config)
            .with_collect_options(collect_options(self.pages.as_deref())?);
        if self.semantic {
            extractor = extractor.with_embedder(Arc::new(HashingEmbedder::default()));
        }
        Ok(extractor)
    }
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    /// `{"title", "outline"}` JSON
    Json,
    /// Indented plain text
    Text,
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Outline {
            input,
            analysis,
            format,
            report,
        } => cmd_outline(&input, &analysis, format, report),
        Commands::Batch { dir, analysis } => cmd_batch(&dir, &analysis),
        Commands::Fragments {
            input,
            pages,
            compact,
        } => cmd_fragments(&input, pages.as_deref(), compact),
        Commands::Check { input } => cmd_check(&input),
        Commands::Version => {
            cmd_version();
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("{}: {}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

fn collect_options(pages: Option<&str>) -> Result<CollectOptions, Box<dyn std::error::Error>> {
    let page_selection = if let Some(p) = pages {
        PageSelection::parse(p).map_err(|e| format!("Invalid page range: {}", e))?
    } else {
        PageSelection::All
    };
    // Skip undecodable pages rather than losing the whole document
    Ok(CollectOptions::new().lenient().with_pages(page_selection))
}

fn cmd_outline(
    input: &Path,
    analysis: &AnalysisArgs,
    format: OutputFormat,
    report: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let extractor = analysis.extractor()?;
    let outcome = extractor.extract_file(input);

    if report {
        print_report(input, &outcome);
    } else {
        print_diagnostics(input, &outcome);
    }

    match format {
        OutputFormat::Json => println!("{}", render::to_json(&outcome.result, analysis.json_format())?),
        OutputFormat::Text => print!("{}", render::to_text(&outcome.result)),
    }

    Ok(())
}

fn cmd_batch(dir: &Path, analysis: &AnalysisArgs) -> Result<(), Box<dyn std::error::Error>> {
    let extractor = analysis.extractor()?;
    let files = pipeline::pdf_files_in(dir)?;

    if files.is_empty() {
        eprintln!("{} no PDF files in {}", "Warning:".yellow(), dir.display());
    }
    log::info!("Processing {} PDF files from {}", files.len(), dir.display());

    let pb = ProgressBar::new(files.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")?
            .progress_chars("#>-"),
    );

    let (sender, receiver) = crossbeam_channel::unbounded();
    let mut results: BTreeMap<String, OutlineResult> = BTreeMap::new();
    let mut failures = 0usize;

    std::thread::scope(|scope| {
        let extractor = &extractor;
        let files = &files;
        scope.spawn(move || extractor.process_batch_streaming(files, &sender));

        for item in receiver.iter() {
            let name = item
                .path
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_else(|| item.path.display().to_string());

            if item.report.is_extraction_failure() {
                failures += 1;
            }
            pb.suspend(|| print_diagnostics(&item.path, &item.report));
            pb.set_message(name.clone());
            pb.inc(1);
            results.insert(name, item.report.result);
        }
    });

    pb.finish_with_message("Done!");

    println!("{}", render::to_json_value(&results, analysis.json_format())?);

    if failures > 0 {
        eprintln!(
            "{} {} of {} documents could not be read",
            "Warning:".yellow(),
            failures,
            files.len()
        );
    }

    Ok(())
}

fn cmd_fragments(
    input: &Path,
    pages: Option<&str>,
    compact: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let extractor = OutlineExtractor::new().with_collect_options(collect_options(pages)?);
    let collection = extractor.collect_file(input)?;

    let format = if compact {
        JsonFormat::Compact
    } else {
        JsonFormat::Pretty
    };
    println!("{}", render::to_json_value(&collection, format)?);

    Ok(())
}

fn cmd_check(input: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let json = fs::read_to_string(input)?;
    match validate_json(&json) {
        Ok(()) => {
            println!("{} {}", "Valid".green().bold(), input.display());
            Ok(())
        }
        Err(e) => {
            println!("{} {}", "Invalid".red().bold(), input.display());
            Err(e.into())
        }
    }
}

fn print_diagnostics(input: &Path, report: &OutlineReport) {
    for diagnostic in &report.diagnostics {
        eprintln!(
            "{} {}: {}",
            "Warning:".yellow(),
            input.display(),
            diagnostic.message
        );
    }
}

fn print_report(input: &Path, report: &OutlineReport) {
    eprintln!("{}", "Outline Report".cyan().bold());
    eprintln!("{}", "─".repeat(40).dimmed());
    eprintln!("{}: {}", "File".bold(), input.display());
    eprintln!("{}: {:.1}pt", "Body size".bold(), report.body_size);
    eprintln!("{}: {:?}", "Clusters".bold(), report.clusters.centers());
    match report.title_score {
        Some(score) => eprintln!("{}: {} ({:.2})", "Title".bold(), report.result.title, score),
        None => eprintln!("{}: {}", "Title".bold(), "none".dimmed()),
    }

    eprintln!();
    for candidate in &report.candidates {
        eprintln!(
            "  {} p{:<3} {:>5.2} {:+.2}  {}",
            candidate.level().as_str().green(),
            candidate.page(),
            candidate.base_score,
            candidate.semantic_bonus,
            candidate.text()
        );
    }

    if report.has_diagnostics() {
        eprintln!();
        for diagnostic in &report.diagnostics {
            eprintln!(
                "{} {:?}: {}",
                "Warning:".yellow(),
                diagnostic.kind,
                diagnostic.message
            );
        }
    }
    eprintln!();
}

fn cmd_version() {
    println!("{} {}", "pdfoutline".cyan().bold(), env!("CARGO_PKG_VERSION"));
    println!("PDF title and heading outline inference");
    println!();
    println!("License: MIT");
}
