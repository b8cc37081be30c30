use crate::action::Action;
use crate::error::Result;
use crate::types::{ReportFormat, ReportVariant};
use std::path::Path;

/// Everything a renderer needs to emit one action's fragment.
#[derive(Debug, Clone, Copy)]
pub struct RenderContext<'a> {
    /// Identifier the fragment embeds so later patches can target the right
    /// element without re-parsing fragment content.
    pub container_id: &'a str,
    pub report_dir: &'a Path,
    pub format: ReportFormat,
    pub variant: ReportVariant,
}

/// Turns an action's result into a formatted fragment. One capability with
/// variant implementations selected by action kind and output format.
///
/// Implementations must never emit a line equal to an async marker line;
/// marker recognition is exact-line equality.
pub trait FormatRenderer: Send + Sync {
    fn render(&self, action: &Action, ctx: &RenderContext<'_>) -> Result<String>;
}
