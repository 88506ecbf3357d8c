use clap::{Parser, Subcommand};
use sheetwrap::cli::{self, ConvertOptions};
use sheetwrap::config::{FormatterConfig, ENV_API_KEY, ENV_BASE_URL, ENV_MEMORY, ENV_MODEL};
use sheetwrap::core::LINE_WIDTH;
use sheetwrap::error::SheetwrapResult;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "sheetwrap")]
#[command(about = "Turn spreadsheet rows into fixed-width text laid out like your example.")]
#[command(long_about = "Sheetwrap - spreadsheet to fixed-width text
Column picking | Remembered layouts | Lines of at most 40 characters

COMMANDS:
  convert  - Convert a table into text shaped like an example
  project  - Print the selected columns as tab-separated text
  reflow   - Re-wrap text to a maximum line width
  memory   - Inspect remembered column selections and templates
  samples  - Write a sample table and matching example output

EXAMPLES:
  sheetwrap samples ./demo
  sheetwrap convert ./demo/example-output.csv --example ./demo/example-output.txt
  sheetwrap convert products.xlsx -o output.txt     # reuse the remembered template
  sheetwrap reflow notes.txt --width 40

ENVIRONMENT:
  SHEETWRAP_API_KEY (or GEMINI_API_KEY), SHEETWRAP_MODEL, SHEETWRAP_BASE_URL,
  SHEETWRAP_MEMORY, SHEETWRAP_LOG")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    #[command(long_about = "Convert a table into text shaped like an example.

The first sheet of SOURCE (.xlsx, .xlsm, .xls, .xlsb, .ods, .csv, .tsv) is read.
The first time a header row is seen you pick which columns to keep; the
choice is remembered for that header. After a successful conversion the
example is remembered for the kept columns, so the next file with the same
layout needs no --example at all.

COLUMN PICKER:
  1,3    toggle columns 1 and 3
  a      select all (or none if all are selected)
  Enter  confirm
  q      cancel

Every output line is re-wrapped to at most 40 characters. Press Ctrl+C
while the conversion runs to cancel it.

EXAMPLES:
  sheetwrap convert data.xlsx --example layout.txt -o output.txt
  sheetwrap convert data.csv --columns 1,3 --example-text \"Name: ...\"
  cat rows.tsv | sheetwrap convert - --example layout.txt")]
    /// Convert a table into text shaped like an example
    Convert {
        /// Spreadsheet or delimited file ('-' reads text from stdin)
        #[arg(required_unless_present = "source_text")]
        source: Option<PathBuf>,

        /// Use this text as the source instead of a file
        #[arg(long, conflicts_with = "source")]
        source_text: Option<String>,

        /// File with the example output format
        #[arg(short, long)]
        example: Option<PathBuf>,

        /// Example output format given inline
        #[arg(long, conflicts_with = "example")]
        example_text: Option<String>,

        /// Write the result here (UTF-8 with BOM) instead of printing it
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Columns to keep for a new layout, 1-based (e.g. 1,3)
        #[arg(short, long)]
        columns: Option<String>,

        /// Keep every column for a new layout
        #[arg(long, conflicts_with = "columns")]
        all_columns: bool,

        /// Remove this text (case-insensitive) from the data first (header row kept)
        #[arg(long)]
        remove_text: Option<String>,

        /// Model name
        #[arg(long, env = ENV_MODEL)]
        model: Option<String>,

        /// API key for the reformatting service
        #[arg(long, env = ENV_API_KEY, hide_env_values = true)]
        api_key: Option<String>,

        /// Base URL of the reformatting service
        #[arg(long, env = ENV_BASE_URL)]
        base_url: Option<String>,

        /// Template memory file (default: ~/.sheetwrap/storage.json)
        #[arg(long, env = ENV_MEMORY)]
        memory: Option<PathBuf>,
    },

    /// Print the selected columns of a table as tab-separated text
    Project {
        /// Spreadsheet or delimited file
        source: PathBuf,

        /// Columns to keep, 1-based (default: remembered selection, else all)
        #[arg(short, long)]
        columns: Option<String>,

        /// Remove this text (case-insensitive) from the data first (header row kept)
        #[arg(long)]
        remove_text: Option<String>,

        /// Template memory file
        #[arg(long, env = ENV_MEMORY)]
        memory: Option<PathBuf>,
    },

    /// Re-wrap text so no line exceeds the width
    Reflow {
        /// Text file (stdin when omitted or '-')
        file: Option<PathBuf>,

        /// Maximum characters per line
        #[arg(short, long, default_value_t = LINE_WIDTH)]
        width: usize,
    },

    /// Inspect remembered column selections and templates
    Memory {
        #[command(subcommand)]
        action: MemoryAction,

        /// Template memory file
        #[arg(long, env = ENV_MEMORY, global = true)]
        memory: Option<PathBuf>,
    },

    /// Write a sample table and its converted example output
    Samples {
        /// Directory to write into (created if missing)
        dir: PathBuf,
    },
}

#[derive(Subcommand)]
enum MemoryAction {
    /// List every remembered header signature
    List,

    /// Show the record for one header signature (cells joined with '|')
    Show { signature: String },
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env("SHEETWRAP_LOG")
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new("sheetwrap=warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> SheetwrapResult<()> {
    let cli = Cli::parse();
    init_tracing();

    match cli.command {
        Commands::Convert {
            source,
            source_text,
            example,
            example_text,
            output,
            columns,
            all_columns,
            remove_text,
            model,
            api_key,
            base_url,
            memory,
        } => {
            let formatter = FormatterConfig::from_env()
                .with_api_key(api_key)
                .with_model(model)
                .with_base_url(base_url);

            cli::convert(ConvertOptions {
                source,
                source_text,
                example,
                example_text,
                output,
                columns,
                all_columns,
                remove_text,
                memory,
                formatter,
            })
        }

        Commands::Project {
            source,
            columns,
            remove_text,
            memory,
        } => cli::project(source, columns, remove_text, memory),

        Commands::Reflow { file, width } => cli::reflow(file, width),

        Commands::Memory { action, memory } => match action {
            MemoryAction::List => cli::memory_list(memory),
            MemoryAction::Show { signature } => cli::memory_show(signature, memory),
        },

        Commands::Samples { dir } => cli::samples(dir),
    }
}
