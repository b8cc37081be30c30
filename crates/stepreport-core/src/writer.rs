use crate::action::{Action, ActionUpdate, MatrixStep};
use crate::config::ReportsConfig;
use crate::error::Result;
use crate::patch::{self, PatchContext};
use crate::render::{FormatRenderer, RenderContext};
use crate::sequence::SequenceAllocator;
use crate::types::{ReportFormat, ReportVariant};
use crate::{frame, io, marker, paths};
use std::fs;
use std::io::Write;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, error, warn};

/// Writes and updates per-action report files for one test run.
///
/// One instance per run. Callers must serialize access per physical report
/// file; two writes or a write and a patch pass never interleave on the same
/// file.
pub struct ActionReportWriter {
    config: ReportsConfig,
    renderer: Arc<dyn FormatRenderer>,
    sequence: SequenceAllocator,
}

impl ActionReportWriter {
    pub fn new(config: ReportsConfig, renderer: Arc<dyn FormatRenderer>) -> Self {
        Self {
            config,
            renderer,
            sequence: SequenceAllocator::new(),
        }
    }

    /// Last allocated action index.
    pub fn action_index(&self) -> u32 {
        self.sequence.current()
    }

    /// Returns the writer to its start-of-run state.
    pub fn reset(&self) {
        self.sequence.reset();
    }

    // -----------------------------------------------------------------------
    // Initial write path
    // -----------------------------------------------------------------------

    /// Appends `action`'s report to every enabled report file for its step.
    /// An asynchronous action whose payload is not finished yet gets a
    /// marker-bracketed placeholder to be patched later.
    ///
    /// Failures are logged and confined to this action; report content
    /// already on disk is unaffected.
    pub fn write_report(&self, action: &Action, reports_root: &Path) {
        let index = self.sequence.next();
        let report_dir = paths::report_dir(reports_root, &action.matrix_short_name);
        if let Err(e) = io::ensure_dir(&report_dir) {
            error!(dir = %report_dir.display(), error = %e, "could not create report directory");
            return;
        }
        if let Some(payload) = &action.payload {
            if let Err(e) = payload.process_details(&report_dir, action) {
                error!(
                    action = %action.id_in_matrix,
                    error = %e,
                    "result post-processing failed, report not written"
                );
                return;
            }
        }

        if self.config.complete_html {
            if let Err(e) = self.append_report(
                action,
                &report_dir,
                index,
                ReportFormat::Html,
                ReportVariant::Complete,
            ) {
                error!(action = %action.id_in_matrix, error = %e, "could not write HTML action report");
            }
        }
        if self.config.failed_html && (!action.passed || action.is_async) {
            if let Err(e) = self.append_report(
                action,
                &report_dir,
                index,
                ReportFormat::Html,
                ReportVariant::FailedOnly,
            ) {
                error!(action = %action.id_in_matrix, error = %e, "could not write failed-only HTML action report");
            }
        }
        if self.config.complete_json {
            if let Err(e) = self.append_report(
                action,
                &report_dir,
                index,
                ReportFormat::Json,
                ReportVariant::Complete,
            ) {
                error!(action = %action.id_in_matrix, error = %e, "could not write JSON action report");
            }
        }
    }

    fn append_report(
        &self,
        action: &Action,
        report_dir: &Path,
        index: u32,
        format: ReportFormat,
        variant: ReportVariant,
    ) -> Result<()> {
        // Render before touching the file: a renderer failure must not leave
        // a dangling array lead-in behind.
        let container_id = paths::container_id(&action.step_safe_name, index);
        let ctx = RenderContext {
            container_id: &container_id,
            report_dir,
            format,
            variant,
        };
        let fragment = self.renderer.render(action, &ctx)?;

        let path = paths::report_file(report_dir, &action.step_safe_name, format, variant);
        let empty = io::file_is_empty(&path);
        let mut writer = io::append_writer(&path)?;

        if format == ReportFormat::Json {
            writeln!(writer, "{}", frame::array_lead_in(empty))?;
        }
        if action.needs_placeholder() {
            writeln!(writer, "{}", marker::start_line(&action.id_in_matrix, format))?;
            writeln!(writer, "{fragment}")?;
            writeln!(writer, "{}", marker::end_line(&action.id_in_matrix, format))?;
        } else {
            writeln!(writer, "{fragment}")?;
        }
        writer.flush()?;
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Update path
    // -----------------------------------------------------------------------

    /// Replaces the placeholder regions of now-finished async actions with
    /// their final fragments. Each action gets a fresh sequence index for its
    /// rewritten container id. All-or-nothing per report file: a file that
    /// cannot be patched is left exactly as found.
    pub fn update_reports(&self, actions: &[Action], reports_root: &Path) {
        debug!(count = actions.len(), "updating reports");
        for (key, updates) in self.prepare_updates(actions) {
            let report_dir = paths::report_dir(reports_root, &key.matrix);
            for update in &updates {
                if let Some(payload) = &update.action.payload {
                    if let Err(e) = payload.process_details(&report_dir, update.action) {
                        error!(
                            action = %update.action.id_in_matrix,
                            error = %e,
                            "result post-processing failed"
                        );
                    }
                }
            }

            if self.config.complete_html {
                self.patch_file(
                    &key,
                    &updates,
                    &report_dir,
                    ReportFormat::Html,
                    ReportVariant::Complete,
                );
            }
            if self.config.failed_html {
                self.patch_file(
                    &key,
                    &updates,
                    &report_dir,
                    ReportFormat::Html,
                    ReportVariant::FailedOnly,
                );
            }
            if self.config.complete_json {
                self.patch_file(
                    &key,
                    &updates,
                    &report_dir,
                    ReportFormat::Json,
                    ReportVariant::Complete,
                );
            }
        }
    }

    /// Groups actions by (matrix, step) in first-seen order, allocating a
    /// fresh index for every action.
    fn prepare_updates<'a>(&self, actions: &'a [Action]) -> Vec<(MatrixStep, Vec<ActionUpdate<'a>>)> {
        let mut groups: Vec<(MatrixStep, Vec<ActionUpdate<'a>>)> = Vec::new();
        for action in actions {
            let key = action.matrix_step();
            let update = ActionUpdate {
                action,
                index: self.sequence.next(),
            };
            match groups.iter_mut().find(|(existing, _)| *existing == key) {
                Some((_, list)) => list.push(update),
                None => groups.push((key, vec![update])),
            }
        }
        groups
    }

    fn patch_file(
        &self,
        key: &MatrixStep,
        updates: &[ActionUpdate<'_>],
        report_dir: &Path,
        format: ReportFormat,
        variant: ReportVariant,
    ) {
        let original = paths::report_file(report_dir, &key.step, format, variant);
        let ctx = PatchContext {
            renderer: self.renderer.as_ref(),
            format,
            variant,
            step_safe_name: &key.step,
            report_dir,
        };
        match patch::patch_report(&ctx, &original, updates) {
            Ok(stats) => debug!(
                file = %original.display(),
                replaced = stats.replaced,
                appended = stats.appended,
                dropped = stats.dropped,
                "report updated"
            ),
            Err(e) => warn!(
                file = %original.display(),
                unresolved = updates.len(),
                error = %e,
                "report not updated to not affect other data"
            ),
        }
    }

    // -----------------------------------------------------------------------
    // Step completion
    // -----------------------------------------------------------------------

    /// Seals the step's JSON report in every matrix subdirectory by appending
    /// the closing bracket. Per-directory failures do not block siblings.
    pub fn seal_step_reports(&self, reports_root: &Path, step_safe_name: &str) {
        let entries = match fs::read_dir(reports_root) {
            Ok(entries) => entries,
            Err(e) => {
                error!(dir = %reports_root.display(), error = %e, "could not list report directories");
                return;
            }
        };
        for entry in entries {
            let path = match entry {
                Ok(entry) => entry.path(),
                Err(e) => {
                    error!(dir = %reports_root.display(), error = %e, "could not read report directory entry");
                    continue;
                }
            };
            if !path.is_dir() {
                continue;
            }
            let report = paths::report_file(
                &path,
                step_safe_name,
                ReportFormat::Json,
                ReportVariant::Complete,
            );
            if !report.is_file() {
                continue;
            }
            if let Err(e) = frame::seal(&report) {
                error!(file = %report.display(), error = %e, "cannot complete step json report");
            }
        }
    }

    /// Reopens the step's sealed JSON report for further appends. Must run
    /// before any write that follows [`Self::seal_step_reports`]. No-op when
    /// the JSON report is not enabled.
    pub fn prepare_reports_to_update(
        &self,
        reports_root: &Path,
        matrix_short_name: &str,
        step_safe_name: &str,
    ) -> Result<()> {
        if !self.config.complete_json {
            return Ok(());
        }
        let report_dir = paths::report_dir(reports_root, matrix_short_name);
        let report = paths::report_file(
            &report_dir,
            step_safe_name,
            ReportFormat::Json,
            ReportVariant::Complete,
        );
        frame::reopen(&report)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
