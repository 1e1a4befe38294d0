use anyhow::{Context, Result};
use captionkit::config::{Config, OutputFormat};
use captionkit::subtitle::{export, import};
use captionkit::timecode::TimecodeFormat;
use captionkit::CaptionEditor;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser)]
#[command(name = "captionkit")]
#[command(version, about = "Edit and convert caption files")]
#[command(long_about = "Convert, retime and inspect captions in SubRip, WebVTT, ASS and JSON formats.")]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Convert a caption file to another format
    Convert {
        /// Input caption file
        input: PathBuf,

        /// Output file (defaults to input name with the target extension)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Output format: srt, vtt, ass, json (defaults to the configured format)
        #[arg(short, long)]
        format: Option<String>,

        /// Input format, when it can't be guessed from the extension
        #[arg(long)]
        from: Option<String>,
    },

    /// Shift every caption by a number of seconds
    Shift {
        /// Input caption file
        input: PathBuf,

        /// Offset in seconds (negative moves captions earlier)
        #[arg(long, allow_hyphen_values = true)]
        by: f64,

        /// Output file (defaults to <name>.shifted.<ext>)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Input format, when it can't be guessed from the extension
        #[arg(long)]
        from: Option<String>,
    },

    /// Print a summary of a caption file
    Info {
        /// Input caption file
        input: PathBuf,

        /// Input format, when it can't be guessed from the extension
        #[arg(long)]
        from: Option<String>,
    },
}

fn init_logging(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::INFO };

    FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .init();
}

fn parse_format(name: &str) -> Result<OutputFormat> {
    name.parse().map_err(|e: String| anyhow::anyhow!(e))
}

fn input_format(input: &Path, from: Option<&str>) -> Result<OutputFormat> {
    match from {
        Some(name) => parse_format(name),
        None => OutputFormat::from_path(input).with_context(|| {
            format!(
                "Can't tell the format of {}; pass --from",
                input.display()
            )
        }),
    }
}

fn derive_output_path(input: &Path, suffix: Option<&str>, format: &OutputFormat) -> PathBuf {
    let stem = input.file_stem().unwrap_or_default().to_string_lossy();
    let name = match suffix {
        Some(suffix) => format!("{}.{}.{}", stem, suffix, format.extension()),
        None => format!("{}.{}", stem, format.extension()),
    };
    let mut output = input.to_path_buf();
    output.set_file_name(name);
    output
}

/// Read and parse a caption file into a fresh editing session.
fn open(input: &Path, format: OutputFormat, config: &Config) -> Result<CaptionEditor> {
    if !input.exists() {
        anyhow::bail!("Input file not found: {}", input.display());
    }

    let contents = std::fs::read_to_string(input)
        .with_context(|| format!("Failed to read {}", input.display()))?;
    let entries = import(&contents, format)
        .with_context(|| format!("Failed to parse {} as {}", input.display(), format))?;

    let mut editor = CaptionEditor::with_policy(config.policy);
    let summary = editor.load(entries);
    if summary.trimmed > 0 || summary.dropped > 0 {
        warn!(
            "Repaired overlapping captions: {} trimmed, {} dropped",
            summary.trimmed, summary.dropped
        );
    }
    info!("Loaded {} captions from {}", summary.loaded, input.display());

    Ok(editor)
}

fn save(editor: &CaptionEditor, output: &Path, format: OutputFormat, config: &Config) -> Result<()> {
    let exported = export(editor.collection(), format, Some(&config.style));
    std::fs::write(output, exported.content)
        .with_context(|| format!("Failed to write {}", output.display()))?;
    info!("Wrote {} ({})", output.display(), exported.mime_type);
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let config = Config::load().context("Failed to load configuration")?;
    config
        .validate()
        .context("Configuration validation failed")?;

    match cli.command {
        Command::Convert {
            input,
            output,
            format,
            from,
        } => {
            let source = input_format(&input, from.as_deref())?;
            let target = match format {
                Some(name) => parse_format(&name)?,
                None => config.default_format,
            };
            let output = output.unwrap_or_else(|| derive_output_path(&input, None, &target));
            if output == input {
                anyhow::bail!("Refusing to overwrite the input file; pass --output");
            }

            info!("Input:  {} ({})", input.display(), source);
            info!("Output: {} ({})", output.display(), target);

            let editor = open(&input, source, &config)?;
            save(&editor, &output, target, &config)?;
        }
        Command::Shift {
            input,
            by,
            output,
            from,
        } => {
            let format = input_format(&input, from.as_deref())?;
            if format == OutputFormat::Ass {
                anyhow::bail!("ASS files can't be read back; convert from the original source instead");
            }
            let output =
                output.unwrap_or_else(|| derive_output_path(&input, Some("shifted"), &format));

            let mut editor = open(&input, format, &config)?;
            editor.shift_all(by);
            info!("Shifted {} captions by {:+.3}s", editor.len(), by);
            save(&editor, &output, format, &config)?;
        }
        Command::Info { input, from } => {
            let format = input_format(&input, from.as_deref())?;
            let editor = open(&input, format, &config)?;

            println!("Format:    {}", format);
            println!("Captions:  {}", editor.len());
            println!(
                "Duration:  {}",
                TimecodeFormat::Display.format(editor.total_duration())
            );
            if let (Some(first), Some(last)) = (editor.entries().first(), editor.entries().last()) {
                println!(
                    "Span:      {} --> {}",
                    TimecodeFormat::Vtt.format(first.start()),
                    TimecodeFormat::Vtt.format(last.end())
                );
            }
        }
    }

    Ok(())
}
