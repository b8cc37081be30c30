//! The patch pass: a single streaming read of an existing report file that
//! copies untouched lines verbatim, replaces each marker-bracketed region
//! with a freshly rendered fragment, and swaps the result in atomically.
//! The original file is never mutated in place.

use crate::action::ActionUpdate;
use crate::error::{ReportError, Result};
use crate::render::{FormatRenderer, RenderContext};
use crate::types::{ReportFormat, ReportVariant};
use crate::{frame, io, marker, paths};
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;
use tempfile::NamedTempFile;

// ---------------------------------------------------------------------------
// PatchStats / PatchContext
// ---------------------------------------------------------------------------

/// What one patch pass did to a report file.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PatchStats {
    /// Regions replaced with freshly rendered fragments.
    pub replaced: usize,
    /// Updates whose start marker was absent, appended after the copied
    /// content.
    pub appended: usize,
    /// Regions removed without replacement (failed-only file, action passed).
    pub dropped: usize,
}

/// Inputs shared by every update in one patch pass.
pub struct PatchContext<'a> {
    pub renderer: &'a dyn FormatRenderer,
    pub format: ReportFormat,
    pub variant: ReportVariant,
    pub step_safe_name: &'a str,
    pub report_dir: &'a Path,
}

// ---------------------------------------------------------------------------
// Patch pass
// ---------------------------------------------------------------------------

/// Resolve the pending regions of `original` in one streaming pass.
///
/// Lines outside regions are copied verbatim in order. A line equal to a
/// pending update's start marker opens that update's region: every line up
/// to the matching end marker is discarded and the fresh fragment is written
/// in its place (or nothing, for a passed action in a failed-only file).
/// Updates whose start marker never appears are appended fully rendered at
/// the end, so no update is silently dropped.
///
/// All-or-nothing: on any error (an end marker missing before EOF, a render
/// failure, I/O) the temp file is dropped and `original` is left exactly as
/// found. On success the temp file replaces `original` in a single rename.
pub fn patch_report(
    ctx: &PatchContext<'_>,
    original: &Path,
    updates: &[ActionUpdate<'_>],
) -> Result<PatchStats> {
    let mut pending: HashMap<String, usize> = HashMap::with_capacity(updates.len());
    for (pos, update) in updates.iter().enumerate() {
        pending.insert(
            marker::start_line(&update.action.id_in_matrix, ctx.format),
            pos,
        );
    }

    let reader = BufReader::new(File::open(original)?);
    let tmp = NamedTempFile::new_in(ctx.report_dir)?;
    let mut writer = BufWriter::new(tmp);

    let mut stats = PatchStats::default();
    let mut wrote_any = false;
    // (end marker to watch for, action id) while inside a region.
    let mut open_region: Option<(String, String)> = None;

    for line in reader.lines() {
        let line = line?;
        match &open_region {
            Some((end_line, _)) => {
                // Region content is replaced wholesale, never copied.
                if line == *end_line {
                    open_region = None;
                }
            }
            None => match pending.remove(line.as_str()) {
                Some(pos) => {
                    let update = &updates[pos];
                    let action = update.action;
                    open_region = Some((
                        marker::end_line(&action.id_in_matrix, ctx.format),
                        action.id_in_matrix.clone(),
                    ));
                    if ctx.variant == ReportVariant::FailedOnly && action.passed {
                        stats.dropped += 1;
                    } else {
                        let fragment = render_fragment(ctx, update)?;
                        writeln!(writer, "{fragment}")?;
                        wrote_any = true;
                        stats.replaced += 1;
                    }
                }
                None => {
                    writeln!(writer, "{line}")?;
                    wrote_any = true;
                }
            },
        }
    }

    if let Some((_, action_id)) = open_region {
        return Err(ReportError::UnterminatedRegion { action_id });
    }

    // Start markers that never appeared in the file: append in update order.
    let mut leftovers: Vec<usize> = pending.into_values().collect();
    leftovers.sort_unstable();
    for pos in leftovers {
        let update = &updates[pos];
        if ctx.variant == ReportVariant::FailedOnly && update.action.passed {
            continue;
        }
        let fragment = render_fragment(ctx, update)?;
        if ctx.format == ReportFormat::Json {
            writeln!(writer, "{}", frame::array_lead_in(!wrote_any))?;
        }
        writeln!(writer, "{fragment}")?;
        wrote_any = true;
        stats.appended += 1;
    }

    let tmp = writer.into_inner().map_err(|e| e.into_error())?;
    io::replace_file(tmp, original)?;
    Ok(stats)
}

fn render_fragment(ctx: &PatchContext<'_>, update: &ActionUpdate<'_>) -> Result<String> {
    let container_id = paths::container_id(ctx.step_safe_name, update.index);
    let render_ctx = RenderContext {
        container_id: &container_id,
        report_dir: ctx.report_dir,
        format: ctx.format,
        variant: ctx.variant,
    };
    ctx.renderer.render(update.action, &render_ctx)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
