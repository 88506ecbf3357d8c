use crate::config::FormatterConfig;
use crate::core::projector::{
    project as project_grid, raw_signature, selected_signature, strip_text, strip_text_str,
};
use crate::core::reflow::reflow as reflow_lines;
use crate::error::{SheetwrapError, SheetwrapResult};
use crate::excel::read_grid;
use crate::formatter::{Formatter, FormatterError, GeminiFormatter};
use crate::memory::{JsonFileStore, TemplateMemory, TemplateStore};
use crate::samples::{write_samples, EXAMPLE_SOURCE_NAME, EXAMPLE_TEMPLATE_NAME};
use crate::session::{resolve_columns, ConversionOutcome, Resolution, Session};
use crate::types::{ColumnMask, Grid, Signature};
use crate::writer;
use colored::Colorize;
use std::io::{self, BufRead, Read, Write};
use std::path::{Path, PathBuf};

/// Source argument that means "read standard input"
const STDIN_MARKER: &str = "-";

/// Everything `convert` needs, collected from flags and environment
#[derive(Debug, Default)]
pub struct ConvertOptions {
    pub source: Option<PathBuf>,
    pub source_text: Option<String>,
    pub example: Option<PathBuf>,
    pub example_text: Option<String>,
    pub output: Option<PathBuf>,
    pub columns: Option<String>,
    pub all_columns: bool,
    pub remove_text: Option<String>,
    pub memory: Option<PathBuf>,
    pub formatter: FormatterConfig,
}

/// Execute the convert command
pub fn convert(options: ConvertOptions) -> SheetwrapResult<()> {
    println!("{}", "🔥 Sheetwrap - Converting".bold().green());

    let store = open_store(options.memory.as_deref());
    println!("   Memory: {}", store.path().display());

    let mut session = Session::new(TemplateMemory::new(store));

    // Source first: a recalled template may fill the example
    match (&options.source_text, &options.source) {
        (Some(text), _) => {
            println!("   Source: {}", "pasted text".cyan());
            session.set_source_text(strip_pasted(text, &options));
        }
        (None, Some(path)) if path.as_os_str() == STDIN_MARKER => {
            println!("   Source: {}", "stdin".cyan());
            session.set_source_text(strip_pasted(&read_stdin()?, &options));
        }
        (None, Some(path)) => {
            println!("   Source: {}", path.display());
            let grid = read_source_grid(path, options.remove_text.as_deref())?;
            if !resolve_grid(&mut session, grid, &options)? {
                println!("{}", "⚠️  Column selection cancelled - nothing converted".yellow());
                return Ok(());
            }
        }
        (None, None) => {
            return Err(SheetwrapError::Validation(
                "No source given (pass a file, '-' for stdin, or --source-text)".to_string(),
            ))
        }
    }

    if let Some(path) = &options.example {
        println!("   Example: {}", path.display());
        session.load_example_file(path)?;
    } else if let Some(text) = &options.example_text {
        session.set_example_text(text.clone());
    } else if session.template_auto_loaded() {
        println!("{}", "📋 Using template remembered for these columns".cyan());
    }
    println!();

    session.validate()?;
    let formatter = GeminiFormatter::new(&options.formatter)?;
    println!(
        "{} {}",
        "🤖 Converting with".cyan(),
        formatter.model().bright_blue()
    );
    println!("   Press {} to cancel\n", "Ctrl+C".bold().yellow());

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    let outcome = runtime.block_on(run_cancellable(&mut session, &formatter))?;

    match outcome {
        ConversionOutcome::Completed(text) => {
            match &options.output {
                Some(path) => {
                    writer::write_output(path, &text)?;
                    println!("{}", "✅ Conversion complete!".bold().green());
                    println!("   Output: {}", path.display());
                    println!("   Lines:  {}", text.lines().count());
                }
                None => {
                    println!("{}", "✅ Conversion complete!".bold().green());
                    println!("{}", "─".repeat(40));
                    println!("{text}");
                    println!("{}", "─".repeat(40));
                }
            }
            Ok(())
        }
        ConversionOutcome::Failed(e) => Err(SheetwrapError::Formatter(e)),
        ConversionOutcome::Discarded => {
            println!("{}", "⚠️  Conversion cancelled".yellow());
            Ok(())
        }
    }
}

/// Run one conversion, cancelling it if Ctrl+C arrives first
async fn run_cancellable<S: TemplateStore>(
    session: &mut Session<S>,
    formatter: &dyn Formatter,
) -> SheetwrapResult<ConversionOutcome> {
    let request = session.begin_conversion()?;
    let token = request.token().clone();

    let result = tokio::select! {
        result = formatter.format(request.prompt(), &token) => result,
        _ = tokio::signal::ctrl_c() => {
            session.cancel_conversion();
            Err(FormatterError::Cancelled)
        }
    };

    Ok(session.finish_conversion(request, result))
}

/// Walk the grid through column resolution; `false` if the user cancelled
fn resolve_grid<S: TemplateStore>(
    session: &mut Session<S>,
    grid: Grid,
    options: &ConvertOptions,
) -> SheetwrapResult<bool> {
    let columns = grid.column_count();
    if let Resolution::Ready { .. } = session.load_grid(grid)? {
        println!("   Columns: {}", "remembered selection".cyan());
        print_selection(session.selected_columns());
        return Ok(true);
    }

    if options.all_columns {
        session.set_pending_mask(ColumnMask::all(columns));
    } else if let Some(list) = &options.columns {
        session.set_pending_mask(ColumnMask::from_indices(columns, &parse_column_list(list)?));
    } else {
        let stdin = io::stdin();
        let mut stdout = io::stdout();
        if !prompt_columns(session, stdin.lock(), &mut stdout)? {
            session.cancel_selection();
            return Ok(false);
        }
    }

    session.confirm_selection()?;
    print_selection(session.selected_columns());
    Ok(true)
}

fn print_selection(mask: Option<&ColumnMask>) {
    if let Some(mask) = mask {
        println!("   Kept {} of {} columns", mask.selected_count(), mask.len());
    }
}

/// Interactive column picker.
///
/// Numbers toggle columns (1-based, comma or space separated), `a` toggles
/// all, an empty line confirms and `q` cancels. Returns `true` when the
/// selection was accepted; end of input counts as cancel.
pub fn prompt_columns<S, R, W>(
    session: &mut Session<S>,
    mut input: R,
    out: &mut W,
) -> SheetwrapResult<bool>
where
    S: TemplateStore,
    R: BufRead,
    W: Write,
{
    writeln!(out, "\n{}", "📋 New table layout - choose the columns to keep".bold().cyan())?;

    loop {
        let Some(pending) = session.pending_selection() else {
            return Ok(false);
        };

        for (index, header) in pending.headers().iter().enumerate() {
            let mark = if pending.mask().is_selected(index) {
                "[x]".green()
            } else {
                "[ ]".dimmed()
            };
            writeln!(out, "   {} {:>2}. {}", mark, index + 1, header_label(index, header))?;
        }
        write!(
            out,
            "{} ",
            "Toggle by number (e.g. 1,3), 'a' = all/none, Enter = confirm, 'q' = cancel:".cyan()
        )?;
        out.flush()?;

        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            writeln!(out)?;
            return Ok(false);
        }

        match line.trim() {
            "" => {
                if session.pending_selection().is_some_and(|p| p.mask().none_selected()) {
                    writeln!(out, "{}", "⚠️  Select at least one column".yellow())?;
                    continue;
                }
                return Ok(true);
            }
            "q" | "Q" => return Ok(false),
            "a" | "A" => session.toggle_all(),
            entry => match parse_column_list(entry) {
                Ok(indices) => indices.into_iter().for_each(|i| session.toggle_column(i)),
                Err(e) => writeln!(out, "{}", format!("⚠️  {e}").yellow())?,
            },
        }
    }
}

/// Display name for a header cell; blank headers get a positional placeholder
pub fn header_label(index: usize, header: &str) -> String {
    if header.trim().is_empty() {
        format!("(Column {})", index + 1)
    } else {
        header.to_string()
    }
}

/// Parse a 1-based column list like `1,3` or `2 4` into zero-based indices
pub fn parse_column_list(list: &str) -> SheetwrapResult<Vec<usize>> {
    list.split(|c: char| c == ',' || c.is_whitespace())
        .filter(|part| !part.is_empty())
        .map(|part| match part.parse::<usize>() {
            Ok(n) if n >= 1 => Ok(n - 1),
            _ => Err(SheetwrapError::Validation(format!(
                "Invalid column number '{part}' (columns start at 1)"
            ))),
        })
        .collect()
}

/// Execute the project command: print the tab-delimited projection
pub fn project(
    source: PathBuf,
    columns: Option<String>,
    remove_text: Option<String>,
    memory: Option<PathBuf>,
) -> SheetwrapResult<()> {
    let grid = read_source_grid(&source, remove_text.as_deref())?;
    let memory = TemplateMemory::new(open_store(memory.as_deref()));

    let indices = columns.as_deref().map(parse_column_list).transpose()?;
    let mask = resolve_columns(&memory, &grid, indices.as_deref());
    if mask.none_selected() {
        return Err(SheetwrapError::Validation(
            "Select at least one column.".to_string(),
        ));
    }

    eprintln!("{} {}", "Raw signature:     ".dimmed(), raw_signature(&grid));
    eprintln!("{} {}", "Selected signature:".dimmed(), selected_signature(&grid, &mask));
    println!("{}", project_grid(&grid, &mask));
    Ok(())
}

/// Execute the reflow command on a file or stdin
pub fn reflow(file: Option<PathBuf>, width: usize) -> SheetwrapResult<()> {
    let text = match file {
        Some(path) if path.as_os_str() != STDIN_MARKER => std::fs::read_to_string(&path)?,
        _ => read_stdin()?,
    };
    let text = text.strip_prefix(writer::UTF8_BOM).unwrap_or(&text);
    println!("{}", reflow_lines(text.trim_end_matches('\n'), width));
    Ok(())
}

/// Execute `memory list`
pub fn memory_list(memory: Option<PathBuf>) -> SheetwrapResult<()> {
    let store = open_store(memory.as_deref());
    println!("{}", "📋 Sheetwrap - Template Memory".bold().green());
    println!("   File: {}\n", store.path().display());

    let entries = TemplateMemory::new(store).entries();
    if entries.is_empty() {
        println!("{}", "   No remembered layouts yet".yellow());
        return Ok(());
    }

    for (signature, record) in &entries {
        let columns = record
            .selected_columns
            .as_ref()
            .map(|mask| format!("{}/{} columns", mask.selected_count(), mask.len()))
            .unwrap_or_else(|| "-".to_string());
        let template = record
            .template
            .as_ref()
            .map(|t| format!("template, {} lines", t.lines().count()))
            .unwrap_or_else(|| "-".to_string());
        println!(
            "   {}  {}  {}",
            signature.as_str().bright_blue().bold(),
            columns.cyan(),
            template.cyan()
        );
    }
    println!("\n   {} entries", entries.len());
    Ok(())
}

/// Execute `memory show <SIGNATURE>`
pub fn memory_show(signature: String, memory: Option<PathBuf>) -> SheetwrapResult<()> {
    let memory = TemplateMemory::new(open_store(memory.as_deref()));
    let signature = Signature::new(signature);
    let record = memory.get(&signature).ok_or_else(|| {
        SheetwrapError::Validation(format!("Nothing remembered for '{signature}'"))
    })?;

    println!("{}", "📋 Sheetwrap - Template Memory".bold().green());
    println!("   Signature: {}\n", signature.as_str().bright_blue().bold());

    match &record.selected_columns {
        Some(mask) => {
            println!("{}", "Selected columns:".bold().cyan());
            for (index, cell) in signature.as_str().split('|').enumerate() {
                let mark = if mask.is_selected(index) { "[x]".green() } else { "[ ]".dimmed() };
                println!("   {} {}", mark, header_label(index, cell));
            }
        }
        None => println!("{}", "Selected columns: -".cyan()),
    }
    println!();

    match &record.template {
        Some(template) => {
            println!("{}", "Template:".bold().cyan());
            println!("{template}");
        }
        None => println!("{}", "Template: -".cyan()),
    }
    Ok(())
}

/// Execute the samples command
pub fn samples(dir: PathBuf) -> SheetwrapResult<()> {
    println!("{}", "🔥 Sheetwrap - Sample Files".bold().green());
    for path in write_samples(&dir)? {
        println!("   ✅ {}", path.display());
    }
    println!(
        "\n   Try: {}",
        format!(
            "sheetwrap convert {} --example {}",
            dir.join(EXAMPLE_SOURCE_NAME).display(),
            dir.join(EXAMPLE_TEMPLATE_NAME).display()
        )
        .bright_yellow()
    );
    Ok(())
}

fn open_store(path: Option<&Path>) -> JsonFileStore {
    path.map(JsonFileStore::new).unwrap_or_default()
}

fn read_source_grid(path: &Path, remove_text: Option<&str>) -> SheetwrapResult<Grid> {
    let grid = read_grid(path)?;
    Ok(match remove_text {
        Some(needle) => strip_text(&grid, needle),
        None => grid,
    })
}

fn strip_pasted(text: &str, options: &ConvertOptions) -> String {
    match options.remove_text.as_deref() {
        Some(needle) => strip_text_str(text, needle),
        None => text.to_string(),
    }
}

fn read_stdin() -> SheetwrapResult<String> {
    let mut text = String::new();
    io::stdin().read_to_string(&mut text)?;
    Ok(text)
}
