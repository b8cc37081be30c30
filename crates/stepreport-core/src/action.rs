use crate::error::Result;
use std::fmt;
use std::path::Path;
use std::sync::Arc;

// ---------------------------------------------------------------------------
// ActionPayload
// ---------------------------------------------------------------------------

/// Result post-processing hook, run against the report directory before an
/// action's fragment is rendered. Rendering may read files it produces.
pub trait ActionPayload: Send + Sync {
    fn process_details(&self, report_dir: &Path, action: &Action) -> Result<()>;
}

// ---------------------------------------------------------------------------
// Action
// ---------------------------------------------------------------------------

/// One test step's execution unit, consumed read-only. Lifecycle is owned by
/// the execution engine; the report subsystem only triggers result
/// post-processing through [`ActionPayload`].
#[derive(Clone)]
pub struct Action {
    /// Identifier unique within the action's matrix, stable across the run.
    pub id_in_matrix: String,
    pub matrix_short_name: String,
    pub step_safe_name: String,
    pub is_async: bool,
    pub payload_finished: bool,
    pub passed: bool,
    pub payload: Option<Arc<dyn ActionPayload>>,
}

impl Action {
    /// True when the action's report must reserve a marker-bracketed region
    /// to be patched once the action finishes.
    pub fn needs_placeholder(&self) -> bool {
        self.is_async && !self.payload_finished
    }

    pub fn matrix_step(&self) -> MatrixStep {
        MatrixStep {
            matrix: self.matrix_short_name.clone(),
            step: self.step_safe_name.clone(),
        }
    }
}

impl fmt::Debug for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Action")
            .field("id_in_matrix", &self.id_in_matrix)
            .field("matrix_short_name", &self.matrix_short_name)
            .field("step_safe_name", &self.step_safe_name)
            .field("is_async", &self.is_async)
            .field("payload_finished", &self.payload_finished)
            .field("passed", &self.passed)
            .field("has_payload", &self.payload.is_some())
            .finish()
    }
}

// ---------------------------------------------------------------------------
// MatrixStep / ActionUpdate
// ---------------------------------------------------------------------------

/// Composite key grouping pending updates so all updates for one report file
/// are processed together. Equality is by the two identities.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MatrixStep {
    pub matrix: String,
    pub step: String,
}

/// An action paired with the sequence index allocated for this update batch.
/// Created fresh for every batch, never persisted.
#[derive(Debug, Clone, Copy)]
pub struct ActionUpdate<'a> {
    pub action: &'a Action,
    pub index: u32,
}
