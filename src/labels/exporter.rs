use std::collections::HashMap;
use std::io::Write as _;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::labels::raster::Rasterizer;
use crate::labels::renderer::{self, LabelDocument};
use crate::models::Item;

/// Print pages hold exactly this many labels in a 2-column grid.
pub const LABELS_PER_PAGE: usize = 10;

/// Upper bound on the per-item copy multiplier.
pub const MAX_COPIES: u32 = 99;

#[derive(Debug)]
pub enum ExportError {
    Zip(zip::result::ZipError),
    Io(std::io::Error),
}

impl std::fmt::Display for ExportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExportError::Zip(e) => write!(f, "archive assembly failed: {e}"),
            ExportError::Io(e) => write!(f, "archive write failed: {e}"),
        }
    }
}

impl From<zip::result::ZipError> for ExportError {
    fn from(e: zip::result::ZipError) -> Self {
        ExportError::Zip(e)
    }
}

impl From<std::io::Error> for ExportError {
    fn from(e: std::io::Error) -> Self {
        ExportError::Io(e)
    }
}

/// Cooperative cancellation for the download path. Polled between items,
/// never preemptive: an in-flight capture finishes or fails on its own.
#[derive(Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// One batch-export invocation: the resolved items with their copy
/// multipliers. Built per request, never ambient state.
pub struct ExportSession {
    pub entries: Vec<(Item, u32)>,
}

impl ExportSession {
    pub fn new(entries: Vec<(Item, u32)>) -> Self {
        Self { entries }
    }

    /// Applies the session copy-count overrides (default 1, clamped to
    /// `[1, MAX_COPIES]`, keyed by item row id).
    pub fn from_items(items: Vec<Item>, copies: &HashMap<String, u32>) -> Self {
        let entries = items
            .into_iter()
            .map(|item| {
                let n = copies.get(&item.id).copied().unwrap_or(1).clamp(1, MAX_COPIES);
                (item, n)
            })
            .collect();
        Self { entries }
    }
}

/// Print-mode expansion: an entry with copy count 3 appears three times
/// consecutively, order preserved.
pub fn expand_copies(entries: &[(Item, u32)]) -> Vec<&Item> {
    let mut expanded = Vec::new();
    for (item, copies) in entries {
        for _ in 0..(*copies).max(1) {
            expanded.push(item);
        }
    }
    expanded
}

/// Deterministic pagination: page `k` holds entries `[k*n, k*n+n)`; the last
/// page may be partial.
pub fn paginate<T>(entries: Vec<T>, per_page: usize) -> Vec<Vec<T>> {
    let mut pages: Vec<Vec<T>> = Vec::new();
    for entry in entries {
        match pages.last_mut() {
            Some(page) if page.len() < per_page => page.push(entry),
            _ => pages.push(vec![entry]),
        }
    }
    pages
}

pub struct RenderedLabel {
    pub doc: LabelDocument,
    pub qr_data_uri: String,
}

pub struct PrintJob {
    pub pages: Vec<Vec<RenderedLabel>>,
    pub attempted: usize,
    pub skipped: usize,
}

impl PrintJob {
    pub fn label_count(&self) -> usize {
        self.attempted - self.skipped
    }
}

/// Renders every expanded entry and lays the results out into fixed-size
/// pages. A failed render skips that entry and the batch continues.
pub fn build_print_job(session: &ExportSession) -> PrintJob {
    let expanded = expand_copies(&session.entries);
    let attempted = expanded.len();
    let mut labels = Vec::new();
    let mut skipped = 0usize;

    for item in expanded {
        let rendered = renderer::render(item)
            .and_then(|doc| renderer::qr_data_uri(&doc).map(|uri| (doc, uri)));
        match rendered {
            Ok((doc, qr_data_uri)) => labels.push(RenderedLabel { doc, qr_data_uri }),
            Err(e) => {
                tracing::warn!("Skipping label for {}: {e}", item.unique_id);
                skipped += 1;
            }
        }
    }

    PrintJob {
        pages: paginate(labels, LABELS_PER_PAGE),
        attempted,
        skipped,
    }
}

pub struct ExportOptions {
    /// Items captured at once in download mode. Rasterization is memory
    /// heavy per item, so the bound stays at 1 unless profiling says
    /// otherwise.
    pub concurrency: usize,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self { concurrency: 1 }
    }
}

pub struct ZipReport {
    pub attempted: usize,
    pub succeeded: usize,
    pub skipped: usize,
    pub cancelled: bool,
    /// Finished archive bytes; `None` when the export was cancelled.
    pub archive: Option<Vec<u8>>,
    pub file_name: String,
}

/// Download-mode export: one sticker PNG per item (copy counts do not
/// apply), added to a single archive. Per-item render/capture failures are
/// logged and skipped; the cancellation flag is checked before each item
/// starts and suppresses the archive entirely.
pub fn export_zip(
    session: &ExportSession,
    rasterizer: &dyn Rasterizer,
    options: &ExportOptions,
    cancel: &CancelToken,
    mut on_progress: impl FnMut(u8),
) -> Result<ZipReport, ExportError> {
    let total = session.entries.len();
    let file_name = zip_file_name();
    let concurrency = options.concurrency.max(1);

    let mut zip = zip::ZipWriter::new(std::io::Cursor::new(Vec::new()));
    let file_options = zip::write::SimpleFileOptions::default()
        .compression_method(zip::CompressionMethod::Deflated);

    let items: Vec<&Item> = session.entries.iter().map(|(item, _)| item).collect();
    let mut succeeded = 0usize;
    let mut done = 0usize;

    for batch in items.chunks(concurrency) {
        if cancel.is_cancelled() {
            tracing::info!("Label export cancelled after {done} of {total} items");
            return Ok(ZipReport {
                attempted: total,
                succeeded,
                skipped: done - succeeded,
                cancelled: true,
                archive: None,
                file_name,
            });
        }

        let captures: Vec<Option<Vec<u8>>> = if concurrency == 1 {
            batch.iter().map(|item| capture_one(item, rasterizer)).collect()
        } else {
            std::thread::scope(|scope| {
                let handles: Vec<_> = batch
                    .iter()
                    .map(|item| scope.spawn(move || capture_one(item, rasterizer)))
                    .collect();
                handles.into_iter().map(|h| h.join().unwrap_or(None)).collect()
            })
        };

        for (item, capture) in batch.iter().zip(captures) {
            done += 1;
            if let Some(bytes) = capture {
                zip.start_file(sticker_file_name(item), file_options)?;
                zip.write_all(&bytes)?;
                succeeded += 1;
            }
            on_progress(progress_percent(done, total));
        }
    }

    let cursor = zip.finish()?;
    Ok(ZipReport {
        attempted: total,
        succeeded,
        skipped: total - succeeded,
        cancelled: false,
        archive: Some(cursor.into_inner()),
        file_name,
    })
}

fn capture_one(item: &Item, rasterizer: &dyn Rasterizer) -> Option<Vec<u8>> {
    let result = renderer::render(item).and_then(|doc| rasterizer.capture(&doc));
    match result {
        Ok(bytes) => Some(bytes),
        Err(e) => {
            tracing::warn!("Skipping sticker for {}: {e}", item.unique_id);
            None
        }
    }
}

pub fn progress_percent(done: usize, total: usize) -> u8 {
    if total == 0 {
        return 100;
    }
    ((done as f64 * 100.0) / total as f64).round() as u8
}

/// `sticker-<property number or unique id>.png`, with every character
/// outside `[A-Za-z0-9_-]` replaced by an underscore.
pub fn sticker_file_name(item: &Item) -> String {
    format!("sticker-{}.png", sanitize_file_name(&renderer::property_no(item)))
}

pub fn sanitize_file_name(name: &str) -> String {
    name.chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect()
}

pub fn zip_file_name() -> String {
    format!("property-stickers-{}.zip", chrono::Local::now().format("%Y-%m-%d"))
}
