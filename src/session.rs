//! Conversion session: one user's source, example and output state
//!
//! A session walks an uploaded grid through column resolution (recalled
//! from template memory or confirmed by the user), holds the projected
//! source text and the example template, and runs conversions through a
//! `Formatter`.
//!
//! Two points suspend the flow. A grid with an unseen header waits in
//! `pending_selection` until `confirm_selection` or `cancel_selection`.
//! A conversion is split into `begin_conversion` / `finish_conversion` so
//! the caller can await the formatter while still being able to cancel;
//! a result whose token was cancelled, or that was superseded by a newer
//! conversion, is discarded without touching output or memory.

use crate::core::projector::{project, raw_signature, selected_signature};
use crate::core::reflow::{reflow, LINE_WIDTH};
use crate::error::{SheetwrapError, SheetwrapResult};
use crate::excel;
use crate::formatter::{build_prompt, Formatter, FormatterError};
use crate::memory::{MemorySnapshot, TemplateMemory, TemplateStore};
use crate::types::{ColumnMask, Grid, Signature};
use crate::writer;
use std::path::Path;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// Where a freshly loaded grid ended up
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// Columns are known and the source text is projected
    Ready { template_auto_loaded: bool },
    /// Waiting for the user to confirm or cancel a column selection
    NeedsColumnSelection,
}

/// A grid waiting for its columns to be chosen
#[derive(Debug, Clone)]
pub struct PendingSelection {
    grid: Grid,
    raw_signature: Signature,
    mask: ColumnMask,
}

impl PendingSelection {
    pub fn headers(&self) -> &[String] {
        self.grid.header()
    }

    pub fn mask(&self) -> &ColumnMask {
        &self.mask
    }

    pub fn raw_signature(&self) -> &Signature {
        &self.raw_signature
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }
}

/// A conversion in flight
#[derive(Debug, Clone)]
pub struct ConversionRequest {
    id: u64,
    prompt: String,
    token: CancellationToken,
    template: String,
    template_signature: Option<Signature>,
}

impl ConversionRequest {
    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    /// Token the formatter call should observe
    pub fn token(&self) -> &CancellationToken {
        &self.token
    }
}

/// What became of a conversion once the formatter call settled
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConversionOutcome {
    /// Reflowed output, now the session's output
    Completed(String),
    /// The formatter failed; its message is now the session's error
    Failed(FormatterError),
    /// Cancelled or superseded; nothing was changed
    Discarded,
}

pub struct Session<S> {
    memory: TemplateMemory<S>,
    max_width: usize,
    source_text: String,
    example_text: String,
    template_auto_loaded: bool,
    template_signature: Option<Signature>,
    selected_columns: Option<ColumnMask>,
    pending: Option<PendingSelection>,
    output: Option<String>,
    error: Option<String>,
    active: Option<(u64, CancellationToken)>,
    next_id: u64,
}

impl<S: TemplateStore> Session<S> {
    pub fn new(memory: TemplateMemory<S>) -> Self {
        Self {
            memory,
            max_width: LINE_WIDTH,
            source_text: String::new(),
            example_text: String::new(),
            template_auto_loaded: false,
            template_signature: None,
            selected_columns: None,
            pending: None,
            output: None,
            error: None,
            active: None,
            next_id: 0,
        }
    }

    pub fn memory(&self) -> &TemplateMemory<S> {
        &self.memory
    }

    pub fn max_width(&self) -> usize {
        self.max_width
    }

    pub fn source_text(&self) -> &str {
        &self.source_text
    }

    pub fn example_text(&self) -> &str {
        &self.example_text
    }

    /// Whether the example text was recalled from memory rather than typed
    pub fn template_auto_loaded(&self) -> bool {
        self.template_auto_loaded
    }

    /// Selected signature of the current source, if it came from a grid
    pub fn template_signature(&self) -> Option<&Signature> {
        self.template_signature.as_ref()
    }

    pub fn selected_columns(&self) -> Option<&ColumnMask> {
        self.selected_columns.as_ref()
    }

    pub fn pending_selection(&self) -> Option<&PendingSelection> {
        self.pending.as_ref()
    }

    pub fn output(&self) -> Option<&str> {
        self.output.as_deref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn is_converting(&self) -> bool {
        self.active.is_some()
    }

    // ── Source ingestion ────────────────────────────────────────────────

    /// Read a source file and resolve its columns
    pub fn ingest_file(&mut self, path: &Path) -> SheetwrapResult<Resolution> {
        let grid = excel::read_grid(path).map_err(|e| self.record_error(e))?;
        self.load_grid(grid)
    }

    /// Decode uploaded bytes and resolve their columns
    pub fn ingest_bytes(&mut self, bytes: &[u8], name: &str) -> SheetwrapResult<Resolution> {
        let grid = excel::read_grid_from_bytes(bytes, name).map_err(|e| self.record_error(e))?;
        self.load_grid(grid)
    }

    /// Resolve the columns of a decoded grid.
    ///
    /// A mask remembered for the raw header signature is adopted without
    /// asking; otherwise an all-columns selection is left pending.
    pub fn load_grid(&mut self, grid: Grid) -> SheetwrapResult<Resolution> {
        if grid.column_count() == 0 {
            return Err(self.record_error(SheetwrapError::Ingestion(
                "Sheet appears to be empty.".to_string(),
            )));
        }

        self.error = None;
        self.output = None;
        self.pending = None;

        let raw = raw_signature(&grid);
        let snapshot = self.memory.load();

        if let Some(mask) = snapshot.columns_for(&raw).cloned() {
            debug!(signature = %raw, "Column selection recalled");
            return Ok(self.apply_selection(&grid, mask, &snapshot));
        }

        debug!(signature = %raw, columns = grid.column_count(), "Unknown header, selection required");
        let mask = ColumnMask::all(grid.column_count());
        self.pending = Some(PendingSelection {
            grid,
            raw_signature: raw,
            mask,
        });
        Ok(Resolution::NeedsColumnSelection)
    }

    /// Flip one column of the pending selection
    pub fn toggle_column(&mut self, index: usize) {
        if let Some(pending) = self.pending.as_mut() {
            pending.mask.toggle(index);
        }
    }

    /// Select all columns, or none if all are already selected
    pub fn toggle_all(&mut self) {
        if let Some(pending) = self.pending.as_mut() {
            pending.mask.toggle_all();
        }
    }

    /// Replace the pending selection outright
    pub fn set_pending_mask(&mut self, mask: ColumnMask) {
        if let Some(pending) = self.pending.as_mut() {
            pending.mask = mask;
        }
    }

    /// Accept the pending selection, remember it and project the grid
    pub fn confirm_selection(&mut self) -> SheetwrapResult<Resolution> {
        let pending = self.pending.as_ref().ok_or_else(|| {
            SheetwrapError::Validation("No column selection is pending.".to_string())
        })?;

        if pending.mask.none_selected() {
            return Err(SheetwrapError::Validation(
                "Select at least one column.".to_string(),
            ));
        }

        let PendingSelection {
            grid,
            raw_signature,
            mask,
        } = self.pending.take().ok_or_else(|| {
            SheetwrapError::Validation("No column selection is pending.".to_string())
        })?;

        self.memory.remember_columns(&raw_signature, &mask);
        let snapshot = self.memory.load();
        Ok(self.apply_selection(&grid, mask, &snapshot))
    }

    /// Drop the pending grid; nothing is remembered
    pub fn cancel_selection(&mut self) {
        if self.pending.take().is_some() {
            debug!("Column selection cancelled");
        }
    }

    fn apply_selection(
        &mut self,
        grid: &Grid,
        mask: ColumnMask,
        snapshot: &MemorySnapshot,
    ) -> Resolution {
        self.source_text = project(grid, &mask);
        let selected = selected_signature(grid, &mask);

        let recalled = snapshot.template_for(&selected).map(str::to_string);
        match recalled {
            Some(template) => {
                debug!(signature = %selected, "Template recalled");
                self.example_text = template;
                self.template_auto_loaded = true;
            }
            None => {
                if self.template_auto_loaded {
                    self.example_text.clear();
                }
                self.template_auto_loaded = false;
            }
        }

        self.template_signature = Some(selected);
        self.selected_columns = Some(mask);
        Resolution::Ready {
            template_auto_loaded: self.template_auto_loaded,
        }
    }

    // ── Manual edits ────────────────────────────────────────────────────

    /// Pasted source text; it has no header fingerprint to remember against
    pub fn set_source_text(&mut self, text: impl Into<String>) {
        self.source_text = text.into();
        self.template_signature = None;
        self.selected_columns = None;
    }

    /// Typed or uploaded example; no longer counts as recalled
    pub fn set_example_text(&mut self, text: impl Into<String>) {
        self.example_text = text.into();
        self.template_auto_loaded = false;
    }

    /// Read an example file as text
    pub fn load_example_file(&mut self, path: &Path) -> SheetwrapResult<()> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            self.record_error(SheetwrapError::Ingestion(format!(
                "Failed to read example file: {}",
                e
            )))
        })?;
        self.set_example_text(text.strip_prefix(writer::UTF8_BOM).unwrap_or(&text));
        Ok(())
    }

    // ── Conversion ──────────────────────────────────────────────────────

    /// Check that no column selection is open and both inputs are present
    /// (whitespace counts as empty)
    pub fn validate(&self) -> SheetwrapResult<()> {
        if self.pending.is_some() {
            return Err(SheetwrapError::Validation(
                "Confirm or cancel the column selection first.".to_string(),
            ));
        }
        if self.source_text.trim().is_empty() {
            return Err(SheetwrapError::Validation(
                "Source data must not be empty.".to_string(),
            ));
        }
        if self.example_text.trim().is_empty() {
            return Err(SheetwrapError::Validation(
                "Example format must not be empty.".to_string(),
            ));
        }
        Ok(())
    }

    /// Validate inputs and start a conversion, superseding any active one
    pub fn begin_conversion(&mut self) -> SheetwrapResult<ConversionRequest> {
        if let Err(e) = self.validate() {
            return Err(self.record_error(e));
        }

        if let Some((id, token)) = self.active.take() {
            debug!(id, "Superseding active conversion");
            token.cancel();
        }

        self.error = None;
        self.output = None;
        self.next_id += 1;

        let token = CancellationToken::new();
        self.active = Some((self.next_id, token.clone()));

        info!(id = self.next_id, source_chars = self.source_text.len(), "Conversion started");

        Ok(ConversionRequest {
            id: self.next_id,
            prompt: build_prompt(&self.example_text, &self.source_text, self.max_width),
            token,
            template: self.example_text.clone(),
            template_signature: self.template_signature.clone(),
        })
    }

    /// Cancel the active conversion; its result will be discarded
    pub fn cancel_conversion(&mut self) {
        if let Some((id, token)) = self.active.take() {
            debug!(id, "Conversion cancelled");
            token.cancel();
        }
        self.error = None;
    }

    /// Commit the settled formatter result unless it was cancelled or superseded
    pub fn finish_conversion(
        &mut self,
        request: ConversionRequest,
        result: Result<String, FormatterError>,
    ) -> ConversionOutcome {
        let is_current = matches!(&self.active, Some((id, _)) if *id == request.id);
        if request.token.is_cancelled() || !is_current {
            debug!(id = request.id, "Discarding stale conversion result");
            return ConversionOutcome::Discarded;
        }
        self.active = None;

        match result {
            Ok(text) => {
                let wrapped = reflow(&text, self.max_width);
                self.output = Some(wrapped.clone());
                if let Some(signature) = &request.template_signature {
                    self.memory.remember_template(signature, &request.template);
                }
                info!(id = request.id, lines = wrapped.lines().count(), "Conversion completed");
                ConversionOutcome::Completed(wrapped)
            }
            Err(FormatterError::Cancelled) => ConversionOutcome::Discarded,
            Err(e) => {
                self.output = None;
                self.error = Some(SheetwrapError::Formatter(e.clone()).to_string());
                ConversionOutcome::Failed(e)
            }
        }
    }

    /// Run one conversion to completion through `formatter`
    pub async fn convert(&mut self, formatter: &dyn Formatter) -> SheetwrapResult<ConversionOutcome> {
        let request = self.begin_conversion()?;
        let result = formatter.format(&request.prompt, &request.token).await;
        Ok(self.finish_conversion(request, result))
    }

    /// BOM-prefixed bytes of the current output, if any
    pub fn download_bytes(&self) -> Option<Vec<u8>> {
        self.output.as_deref().map(writer::to_download_bytes)
    }

    fn record_error(&mut self, error: SheetwrapError) -> SheetwrapError {
        self.error = Some(error.to_string());
        error
    }
}

/// Pick a mask without asking: explicit zero-based `columns` first, then
/// the remembered mask for the grid's header, then every column.
pub fn resolve_columns<S: TemplateStore>(
    memory: &TemplateMemory<S>,
    grid: &Grid,
    columns: Option<&[usize]>,
) -> ColumnMask {
    if let Some(columns) = columns {
        return ColumnMask::from_indices(grid.column_count(), columns);
    }
    memory
        .load()
        .columns_for(&raw_signature(grid))
        .cloned()
        .unwrap_or_else(|| ColumnMask::all(grid.column_count()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::InMemoryStore;
    use pretty_assertions::assert_eq;

    fn session() -> Session<InMemoryStore> {
        Session::new(TemplateMemory::new(InMemoryStore::new()))
    }

    fn grid() -> Grid {
        Grid::from_rows([vec!["A", "B"], vec!["1", "2"]])
    }

    #[test]
    fn test_unknown_header_suspends_with_all_columns() {
        let mut s = session();
        assert_eq!(s.load_grid(grid()).unwrap(), Resolution::NeedsColumnSelection);

        let pending = s.pending_selection().unwrap();
        assert_eq!(pending.mask(), &ColumnMask::all(2));
        assert_eq!(pending.raw_signature().as_str(), "A|B");
        assert_eq!(s.source_text(), "");
    }

    #[test]
    fn test_confirm_projects_and_remembers_mask() {
        let mut s = session();
        s.load_grid(grid()).unwrap();
        s.toggle_column(1);

        let resolution = s.confirm_selection().unwrap();
        assert_eq!(resolution, Resolution::Ready { template_auto_loaded: false });
        assert_eq!(s.source_text(), "A\n1");
        assert_eq!(s.template_signature().unwrap().as_str(), "A");
        assert!(s.pending_selection().is_none());

        let record = s.memory().get(&Signature::new("A|B")).unwrap();
        assert_eq!(record.selected_columns, Some(ColumnMask::from(vec![true, false])));
    }

    #[test]
    fn test_confirm_with_nothing_selected_is_rejected() {
        let mut s = session();
        s.load_grid(grid()).unwrap();
        s.toggle_all();

        let err = s.confirm_selection().unwrap_err();
        assert!(matches!(err, SheetwrapError::Validation(_)));
        assert!(s.pending_selection().is_some());
        assert!(s.memory().load().is_empty());
    }

    #[test]
    fn test_cancel_selection_writes_nothing() {
        let mut s = session();
        s.set_source_text("previous");
        s.load_grid(grid()).unwrap();
        s.cancel_selection();

        assert!(s.pending_selection().is_none());
        assert!(s.memory().load().is_empty());
        assert_eq!(s.source_text(), "previous");
        assert!(s.confirm_selection().is_err());
    }

    #[test]
    fn test_recalled_mask_and_template_skip_prompt() {
        let mut s = session();
        s.memory()
            .remember_columns(&Signature::new("A|B"), &ColumnMask::from(vec![true, false]));
        s.memory().remember_template(&Signature::new("A"), "TPL");

        let resolution = s.load_grid(grid()).unwrap();
        assert_eq!(resolution, Resolution::Ready { template_auto_loaded: true });
        assert_eq!(s.selected_columns(), Some(&ColumnMask::from(vec![true, false])));
        assert_eq!(s.example_text(), "TPL");
        assert!(s.template_auto_loaded());
        assert_eq!(s.source_text(), "A\n1");
    }

    #[test]
    fn test_confirm_recalls_template_for_selected_signature() {
        let mut s = session();
        s.memory().remember_template(&Signature::new("A"), "shared");
        s.load_grid(grid()).unwrap();
        s.set_pending_mask(ColumnMask::from(vec![true, false]));

        assert_eq!(
            s.confirm_selection().unwrap(),
            Resolution::Ready { template_auto_loaded: true }
        );
        assert_eq!(s.example_text(), "shared");
    }

    #[test]
    fn test_no_recalled_template_keeps_user_example() {
        let mut s = session();
        s.set_example_text("typed by user");
        s.load_grid(grid()).unwrap();
        s.confirm_selection().unwrap();
        assert_eq!(s.example_text(), "typed by user");
        assert!(!s.template_auto_loaded());
    }

    #[test]
    fn test_no_recalled_template_clears_previous_auto_loaded_example() {
        let mut s = session();
        s.memory().remember_columns(&Signature::new("A|B"), &ColumnMask::all(2));
        s.memory().remember_template(&Signature::new("A|B"), "recalled");
        s.load_grid(grid()).unwrap();
        assert_eq!(s.example_text(), "recalled");

        s.load_grid(Grid::from_rows([vec!["X"], vec!["9"]])).unwrap();
        s.confirm_selection().unwrap();
        assert_eq!(s.example_text(), "");
        assert!(!s.template_auto_loaded());
    }

    #[test]
    fn test_manual_example_edit_clears_auto_flag_without_writing() {
        let mut s = session();
        s.memory().remember_columns(&Signature::new("A|B"), &ColumnMask::all(2));
        s.memory().remember_template(&Signature::new("A|B"), "recalled");
        s.load_grid(grid()).unwrap();

        s.set_example_text("edited");
        assert!(!s.template_auto_loaded());
        assert_eq!(
            s.memory().get(&Signature::new("A|B")).unwrap().template.as_deref(),
            Some("recalled")
        );
    }

    #[test]
    fn test_empty_grid_is_an_ingestion_error_and_keeps_state() {
        let mut s = session();
        s.set_source_text("kept");
        s.set_example_text("kept too");

        let err = s.load_grid(Grid::default()).unwrap_err();
        assert!(matches!(err, SheetwrapError::Ingestion(_)));
        assert_eq!(s.source_text(), "kept");
        assert_eq!(s.example_text(), "kept too");
        assert_eq!(s.error(), Some("File error: Sheet appears to be empty."));
    }

    #[test]
    fn test_ingest_bytes_runs_the_protocol() {
        let mut s = session();
        let resolution = s.ingest_bytes(b"A,B\n1,2\n", "data.csv").unwrap();
        assert_eq!(resolution, Resolution::NeedsColumnSelection);
        assert_eq!(s.pending_selection().unwrap().headers(), &["A".to_string(), "B".to_string()]);
    }

    #[test]
    fn test_begin_requires_source_and_example() {
        let mut s = session();
        s.set_example_text("ex");
        assert!(matches!(s.begin_conversion(), Err(SheetwrapError::Validation(_))));
        assert_eq!(s.error(), Some("Validation error: Source data must not be empty."));

        s.set_source_text("src");
        s.set_example_text("   ");
        assert!(matches!(s.begin_conversion(), Err(SheetwrapError::Validation(_))));
        assert!(!s.is_converting());
    }

    #[test]
    fn test_begin_is_blocked_while_selection_pending() {
        let mut s = session();
        s.load_grid(grid()).unwrap();
        s.confirm_selection().unwrap();
        s.set_example_text("EX");

        let resolution = s.load_grid(Grid::from_rows([vec!["X", "Y"], vec!["7", "8"]]));
        assert_eq!(resolution.unwrap(), Resolution::NeedsColumnSelection);

        let err = s.begin_conversion().unwrap_err();
        assert!(matches!(err, SheetwrapError::Validation(_)));
        assert!(!s.is_converting());
        assert_eq!(
            s.error(),
            Some("Validation error: Confirm or cancel the column selection first.")
        );
        assert_eq!(s.memory().get(&Signature::new("A|B")).unwrap().template, None);

        s.confirm_selection().unwrap();
        assert!(s.begin_conversion().is_ok());
    }

    #[test]
    fn test_failed_example_read_keeps_recalled_flag() {
        let mut s = session();
        s.memory().remember_columns(&Signature::new("A|B"), &ColumnMask::all(2));
        s.memory().remember_template(&Signature::new("A|B"), "recalled");
        s.load_grid(grid()).unwrap();

        let err = s
            .load_example_file(Path::new("/definitely/not/here.txt"))
            .unwrap_err();
        assert!(matches!(err, SheetwrapError::Ingestion(_)));
        assert_eq!(s.example_text(), "recalled");
        assert!(s.template_auto_loaded());
    }

    #[test]
    fn test_success_reflows_and_remembers_template() {
        let mut s = session();
        s.load_grid(grid()).unwrap();
        s.confirm_selection().unwrap();
        s.set_example_text("layout");

        let request = s.begin_conversion().unwrap();
        assert!(request.prompt().contains("layout"));
        assert!(s.is_converting());

        let long = "word ".repeat(20);
        let outcome = s.finish_conversion(request, Ok(long.trim_end().to_string()));
        match outcome {
            ConversionOutcome::Completed(text) => {
                assert!(text.lines().all(|l| l.chars().count() <= LINE_WIDTH));
            }
            other => panic!("unexpected outcome {other:?}"),
        }
        assert!(!s.is_converting());
        assert_eq!(
            s.memory().get(&Signature::new("A|B")).unwrap().template.as_deref(),
            Some("layout")
        );
    }

    #[test]
    fn test_pasted_source_does_not_remember_template() {
        let mut s = session();
        s.set_source_text("a\tb");
        s.set_example_text("layout");
        let request = s.begin_conversion().unwrap();
        s.finish_conversion(request, Ok("done".into()));
        assert_eq!(s.output(), Some("done"));
        assert!(s.memory().load().is_empty());
    }

    #[test]
    fn test_failure_records_error_and_skips_memory() {
        let mut s = session();
        s.load_grid(grid()).unwrap();
        s.confirm_selection().unwrap();
        s.set_example_text("layout");

        let request = s.begin_conversion().unwrap();
        let outcome = s.finish_conversion(request, Err(FormatterError::EmptyResponse));
        assert_eq!(outcome, ConversionOutcome::Failed(FormatterError::EmptyResponse));
        assert_eq!(s.output(), None);
        assert_eq!(s.error(), Some("Conversion failed: The service returned no text"));
        assert_eq!(s.memory().get(&Signature::new("A|B")).unwrap().template, None);
    }

    #[test]
    fn test_cancelled_late_response_is_discarded() {
        let mut s = session();
        s.load_grid(grid()).unwrap();
        s.confirm_selection().unwrap();
        s.set_example_text("layout");

        let request = s.begin_conversion().unwrap();
        s.cancel_conversion();

        let outcome = s.finish_conversion(request, Ok("late".into()));
        assert_eq!(outcome, ConversionOutcome::Discarded);
        assert_eq!(s.output(), None);
        assert_eq!(s.error(), None);
        assert_eq!(s.memory().get(&Signature::new("A|B")).unwrap().template, None);
    }

    #[test]
    fn test_superseded_response_is_discarded() {
        let mut s = session();
        s.set_source_text("src");
        s.set_example_text("ex");

        let first = s.begin_conversion().unwrap();
        let second = s.begin_conversion().unwrap();
        assert!(first.token().is_cancelled());

        assert_eq!(s.finish_conversion(first, Ok("old".into())), ConversionOutcome::Discarded);
        assert_eq!(
            s.finish_conversion(second, Ok("new".into())),
            ConversionOutcome::Completed("new".into())
        );
        assert_eq!(s.output(), Some("new"));
    }

    #[test]
    fn test_cancelled_error_is_not_reported() {
        let mut s = session();
        s.set_source_text("src");
        s.set_example_text("ex");
        let request = s.begin_conversion().unwrap();
        assert_eq!(
            s.finish_conversion(request, Err(FormatterError::Cancelled)),
            ConversionOutcome::Discarded
        );
        assert_eq!(s.error(), None);
    }

    #[test]
    fn test_resolve_columns_prefers_explicit_then_memory() {
        let memory = TemplateMemory::new(InMemoryStore::new());
        let g = grid();
        assert_eq!(resolve_columns(&memory, &g, None), ColumnMask::all(2));

        memory.remember_columns(&Signature::new("A|B"), &ColumnMask::from(vec![false, true]));
        assert_eq!(resolve_columns(&memory, &g, None), ColumnMask::from(vec![false, true]));
        assert_eq!(
            resolve_columns(&memory, &g, Some(&[0])),
            ColumnMask::from(vec![true, false])
        );
    }

    #[test]
    fn test_download_bytes() {
        let mut s = session();
        assert_eq!(s.download_bytes(), None);
        s.set_source_text("src");
        s.set_example_text("ex");
        let request = s.begin_conversion().unwrap();
        s.finish_conversion(request, Ok("out".into()));
        assert_eq!(s.download_bytes().unwrap(), b"\xEF\xBB\xBFout".to_vec());
    }
}
