use std::fs::{self, File};
use std::io::{self, stdout, IsTerminal, Write};
use std::ops::Range;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use itertools::izip;
use serde::Serialize;
use tracing::{debug, info};
use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, Registry};

use pairalign::aligner::scoring::{DEFAULT_GAP, DEFAULT_MATCH, DEFAULT_MISMATCH};
use pairalign::aligner::{GlobalAligner, LocalAligner, ScoringModel};
use pairalign::alignment::AlignmentResult;
use pairalign::gc::write_gc_report;
use pairalign::io::view::DEFAULT_LINE_WIDTH;
use pairalign::io::{load_first_sequence, open_fasta, read_sequences, write_aligned_pair, AlignmentView, SequenceRecord};

trait Output: Write + IsTerminal {}
impl<T> Output for T where T: Write + IsTerminal {}

/// The various output formats supported by pairalign
#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum OutputType {
    /// Plain text alignment with statistics
    Text,

    /// Colored block-wise visualization with legend and ruler
    Visual,

    /// Both aligned rows as FASTA records
    Fasta,

    /// Machine readable JSON report
    Json,
}

/// An enum indicating what kind of alignment to perform
#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum, Serialize)]
#[serde(rename_all = "lowercase")]
enum AlignmentMode {
    /// Needleman-Wunsch, align both sequences end-to-end
    Global,

    /// Smith-Waterman, align the best scoring pair of substrings
    Local,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum ColorChoice {
    /// Use colors when writing to a terminal
    Auto,
    Always,
    Never,
}

impl ColorChoice {
    fn enabled(&self, is_terminal: bool) -> bool {
        match self {
            Self::Auto => is_terminal,
            Self::Always => true,
            Self::Never => false,
        }
    }
}

#[derive(Parser, Debug)]
#[command(author, version, about)]
struct CliArgs {
    /// Set verbosity level. Use multiple times to increase the verbosity level.
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<PairalignSubcommand>,
}

#[derive(Subcommand, Debug)]
enum PairalignSubcommand {
    /// Align the first sequences of two FASTA files
    Align(AlignArgs),

    /// Visualize the first two records of an aligned FASTA file
    View(ViewArgs),

    /// Print the GC content of each sequence in a FASTA file
    Gc(GcArgs),
}

#[derive(Args, Debug)]
struct AlignArgs {
    /// First sequence in FASTA format (optionally gzipped)
    #[clap(help_heading = "Inputs")]
    seq1: PathBuf,

    /// Second sequence in FASTA format (optionally gzipped)
    #[clap(help_heading = "Inputs")]
    seq2: PathBuf,

    /// Output filename. If not given, defaults to stdout
    #[arg(short, long)]
    #[clap(help_heading = "Outputs")]
    output: Option<PathBuf>,

    /// Output file type.
    #[arg(value_enum, short = 'O', long, default_value = "text")]
    #[clap(help_heading = "Outputs")]
    output_type: OutputType,

    /// Number of alignment columns per line
    #[arg(short = 'w', long, default_value_t = DEFAULT_LINE_WIDTH)]
    #[clap(help_heading = "Outputs")]
    line_width: usize,

    /// Whether to color the visual output
    #[arg(value_enum, long, default_value = "auto")]
    #[clap(help_heading = "Outputs")]
    color: ColorChoice,

    /// Alignment mode, either global or local alignment.
    #[arg(value_enum, short = 'm', long, default_value = "global")]
    #[clap(help_heading = "Alignment configuration")]
    mode: AlignmentMode,

    /// Score for identical bases
    #[arg(long = "match", default_value_t = DEFAULT_MATCH, allow_negative_numbers = true)]
    #[clap(help_heading = "Alignment configuration")]
    match_score: i32,

    /// Score for differing bases
    #[arg(long, default_value_t = DEFAULT_MISMATCH, allow_negative_numbers = true)]
    #[clap(help_heading = "Alignment configuration")]
    mismatch: i32,

    /// Penalty per gap position (zero or negative)
    #[arg(long, default_value_t = DEFAULT_GAP, allow_negative_numbers = true)]
    #[clap(help_heading = "Alignment configuration")]
    gap: i32,
}

#[derive(Args, Debug)]
struct ViewArgs {
    /// Aligned FASTA file, e.g. from `align -O fasta`
    aligned: PathBuf,

    /// Output filename. If not given, defaults to stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Number of alignment columns per line
    #[arg(short = 'w', long, default_value_t = DEFAULT_LINE_WIDTH)]
    line_width: usize,

    /// Whether to color the output
    #[arg(value_enum, long, default_value = "auto")]
    color: ColorChoice,
}

#[derive(Args, Debug)]
struct GcArgs {
    /// Sequences in FASTA format (optionally gzipped)
    sequences: PathBuf,
}

#[derive(Serialize)]
struct AlignReport<'a> {
    mode: AlignmentMode,
    seq1: &'a str,
    seq2: &'a str,
    scoring: &'a ScoringModel,
    percent_identity: f64,
    cigar: String,

    #[serde(flatten)]
    result: &'a AlignmentResult,
}

/// Set up stderr logging. `RUST_LOG` takes precedence over `-v`.
fn init_logging(verbose: u8) -> Result<()> {
    let default_level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };

    let filter_layer = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_level))?;

    let stderr_log = tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_writer(io::stderr)
        .with_ansi(io::stderr().is_terminal())
        .with_filter(filter_layer);

    Registry::default().with(stderr_log).try_init()?;

    Ok(())
}

fn create_output(path: Option<&Path>) -> Result<Box<dyn Output>> {
    let writer = if let Some(path) = path {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?
        }

        let file = File::create(path)
            .with_context(|| format!("Could not create output file {path:?}"))?;
        Box::new(file) as Box<dyn Output>
    } else {
        Box::new(stdout()) as Box<dyn Output>
    };

    Ok(writer)
}

/// 1-based, inclusive coordinates of the aligned part of a sequence
fn write_region<W: Write>(writer: &mut W, label: &str, record: &SequenceRecord, range: Range<usize>) -> Result<()> {
    if !range.is_empty() {
        writeln!(writer, "{label} region: {}-{} of {}", range.start + 1, range.end, record.name)?;
    }

    Ok(())
}

fn write_text_report<W: Write>(
    writer: &mut W,
    seq1: &SequenceRecord,
    seq2: &SequenceRecord,
    result: &AlignmentResult,
    line_width: usize,
) -> Result<()> {
    writeln!(writer, "Sequence 1 length: {}", seq1.sequence.len())?;
    writeln!(writer, "Sequence 2 length: {}", seq2.sequence.len())?;
    writeln!(writer, "Alignment score: {}", result.score())?;
    write_region(writer, "Sequence 1", seq1, result.seq1_range())?;
    write_region(writer, "Sequence 2", seq2, result.seq2_range())?;
    writeln!(writer)?;

    let line_width = line_width.max(1);
    let match_line = result.match_line();
    for (row1, matches, row2) in izip!(
        result.aligned1().chunks(line_width),
        match_line.chunks(line_width),
        result.aligned2().chunks(line_width),
    ) {
        writer.write_all(row1)?;
        writeln!(writer)?;
        writer.write_all(matches)?;
        writeln!(writer)?;
        writer.write_all(row2)?;
        writeln!(writer)?;
        writeln!(writer)?;
    }

    writeln!(writer, "Alignment Statistics:")?;
    writeln!(writer, "Matches: {}", result.matches())?;
    writeln!(writer, "Mismatches: {}", result.mismatches())?;
    writeln!(writer, "Gaps: {}", result.gaps())?;
    writeln!(writer, "Alignment length: {}", result.len())?;
    writeln!(writer, "Sequence identity: {:.2}%", result.percent_identity())?;

    Ok(())
}

fn align_subcommand(align_args: &AlignArgs) -> Result<()> {
    let scoring = ScoringModel::new(align_args.match_score, align_args.mismatch, align_args.gap)
        .context("Invalid alignment scores")?;

    let seq1 = load_first_sequence(&align_args.seq1)
        .with_context(|| format!("Could not load a sequence from {:?}", align_args.seq1))?;
    let seq2 = load_first_sequence(&align_args.seq2)
        .with_context(|| format!("Could not load a sequence from {:?}", align_args.seq2))?;

    info!(
        "Aligning {} ({} bp) and {} ({} bp), {:?} mode...",
        seq1.name, seq1.sequence.len(), seq2.name, seq2.sequence.len(), align_args.mode
    );

    let result = match align_args.mode {
        AlignmentMode::Global => GlobalAligner::new(scoring).align(&seq1.sequence, &seq2.sequence)?,
        AlignmentMode::Local => LocalAligner::new(scoring).align(&seq1.sequence, &seq2.sequence)?,
    };

    info!("Done. Alignment score: {}", result.score());

    let mut writer = create_output(align_args.output.as_deref())?;
    let color = align_args.color.enabled(writer.is_terminal());
    debug!(output_type = ?align_args.output_type, color, "Writing output");

    match align_args.output_type {
        OutputType::Text => write_text_report(&mut writer, &seq1, &seq2, &result, align_args.line_width)?,
        OutputType::Visual => AlignmentView::new(result.aligned1(), result.aligned2())?
            .with_line_width(align_args.line_width)
            .with_color(color)
            .write_to(&mut writer)?,
        OutputType::Fasta => write_aligned_pair(&mut writer, &seq1.name, &seq2.name, &result)?,
        OutputType::Json => {
            let report = AlignReport {
                mode: align_args.mode,
                seq1: &seq1.name,
                seq2: &seq2.name,
                scoring: &scoring,
                percent_identity: result.percent_identity(),
                cigar: result.cigar(),
                result: &result,
            };

            serde_json::to_writer_pretty(&mut writer, &report)?;
            writeln!(writer)?;
        },
    }

    writer.flush()?;

    Ok(())
}

fn view_subcommand(view_args: &ViewArgs) -> Result<()> {
    let reader = open_fasta(&view_args.aligned)?;
    let records = read_sequences(reader)
        .with_context(|| format!("Could not read aligned sequences from {:?}", view_args.aligned))?;

    let [first, second, ..] = records.as_slice() else {
        bail!("Expected two aligned sequences in {:?}, found {}.", view_args.aligned, records.len());
    };

    let view = AlignmentView::new(&first.sequence, &second.sequence)
        .with_context(|| format!("{} and {} are not aligned", first.name, second.name))?;

    let mut writer = create_output(view_args.output.as_deref())?;
    let color = view_args.color.enabled(writer.is_terminal());

    view.with_line_width(view_args.line_width)
        .with_color(color)
        .write_to(&mut writer)?;
    writer.flush()?;

    Ok(())
}

fn gc_subcommand(gc_args: &GcArgs) -> Result<()> {
    let reader = open_fasta(&gc_args.sequences)?;
    let records = read_sequences(reader)
        .with_context(|| format!("Could not read sequences from {:?}", gc_args.sequences))?;

    let total = write_gc_report(stdout().lock(), &records)?;
    debug!(gc = total.gc, bases = total.total, "GC content of {} sequences", records.len());

    Ok(())
}

fn main() -> Result<()> {
    let args = CliArgs::parse();
    init_logging(args.verbose)?;

    match &args.command {
        Some(PairalignSubcommand::Align(v)) => align_subcommand(v)?,
        Some(PairalignSubcommand::View(v)) => view_subcommand(v)?,
        Some(PairalignSubcommand::Gc(v)) => gc_subcommand(v)?,
        None => bail!("No subcommand given."),
    };

    Ok(())
}
