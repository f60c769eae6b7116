//! Logbook Maker CLI tool
//!
//! Adds page numbers, a copy number and a Controlled Copy watermark to a PDF.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use logbook_maker::config::{
    AnnotationConfig, DEFAULT_COPY_LABEL_TEMPLATE, DEFAULT_PAGE_LABEL_TEMPLATE,
    DEFAULT_WATERMARK_TEXT,
};
use logbook_maker::pdf::annotate_pdf;
use logbook_maker::{Error, ErrorKind};

/// Logbook Maker - Add page numbers and a Controlled Copy watermark to a PDF
#[derive(Parser, Debug)]
#[command(name = "logbook-maker")]
#[command(author, version, about, long_about = None)]
#[command(after_help = "EXAMPLES:
    # Number every page and stamp copy CC-001
    logbook-maker logbook.pdf out.pdf --copy-number CC-001

    # Only the first 5 pages, numbered out of 20
    logbook-maker logbook.pdf out.pdf --copy-number CC-002 --max-pages 5 --total-pages 20

    # Custom labels
    logbook-maker in.pdf out.pdf --copy-number 7 --page-label-template \"Page {number} of {total}\"

TEMPLATES:
    Copy label placeholders: {copy_number}
    Page label placeholders: {number}, {total}
    Use {{ and }} for literal braces.")]
struct Cli {
    /// Source PDF
    input_path: PathBuf,

    /// Where the annotated PDF will be saved
    output_path: PathBuf,

    /// Identifier displayed on every annotated page
    #[arg(long)]
    copy_number: String,

    /// Limit how many pages from the start of the PDF are annotated
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
    max_pages: Option<u32>,

    /// Total shown in the page label (defaults to the number of annotated pages)
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
    total_pages: Option<u32>,

    /// Number used for the first annotated page
    #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..))]
    start_number: u32,

    /// Text used as a diagonal watermark
    #[arg(long, default_value = DEFAULT_WATERMARK_TEXT)]
    watermark_text: String,

    /// Leave out the diagonal watermark
    #[arg(long, conflicts_with = "watermark_text")]
    no_watermark: bool,

    /// Template for the copy number label
    #[arg(long, default_value = DEFAULT_COPY_LABEL_TEMPLATE)]
    copy_label_template: String,

    /// Template for the page number label
    #[arg(long, default_value = DEFAULT_PAGE_LABEL_TEMPLATE)]
    page_label_template: String,

    /// Print debug logging to stderr
    #[arg(short, long)]
    verbose: bool,

    /// Do not print the summary line
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

impl Cli {
    fn annotation_config(&self) -> AnnotationConfig {
        AnnotationConfig {
            copy_number: self.copy_number.clone(),
            max_pages: self.max_pages,
            total_pages: self.total_pages,
            start_number: self.start_number,
            watermark_text: if self.no_watermark {
                String::new()
            } else {
                self.watermark_text.clone()
            },
            copy_label_template: self.copy_label_template.clone(),
            page_label_template: self.page_label_template.clone(),
            ..Default::default()
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            exit_code(&e)
        }
    }
}

fn init_logging(verbose: bool) {
    let default = if verbose {
        "logbook_maker=debug"
    } else {
        "logbook_maker=warn"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn run(cli: &Cli) -> anyhow::Result<()> {
    let config = cli.annotation_config();

    let summary = annotate_pdf(&cli.input_path, &cli.output_path, &config)
        .with_context(|| format!("failed to annotate {}", cli.input_path.display()))?;

    if !cli.quiet {
        eprintln!(
            "Annotated {} of {} pages: {}",
            summary.annotated_pages,
            summary.total_pages,
            cli.output_path.display()
        );
    }

    Ok(())
}

/// 2 for configuration problems (as clap does for usage errors),
/// 3 for unusable input documents, 4 for I/O failures
fn exit_code(err: &anyhow::Error) -> ExitCode {
    match err.downcast_ref::<Error>().map(Error::kind) {
        Some(ErrorKind::Config) => ExitCode::from(2),
        Some(ErrorKind::Document) => ExitCode::from(3),
        Some(ErrorKind::Io) | None => ExitCode::from(4),
    }
}
