use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// ReportsConfig
// ---------------------------------------------------------------------------

/// Which report files are produced for every action. Read once at writer
/// construction; loading and merging the value is the caller's concern.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportsConfig {
    #[serde(default = "default_complete_html")]
    pub complete_html: bool,
    #[serde(default = "default_failed_html")]
    pub failed_html: bool,
    #[serde(default = "default_complete_json")]
    pub complete_json: bool,
}

fn default_complete_html() -> bool {
    true
}

fn default_failed_html() -> bool {
    true
}

fn default_complete_json() -> bool {
    true
}

impl Default for ReportsConfig {
    fn default() -> Self {
        Self {
            complete_html: default_complete_html(),
            failed_html: default_failed_html(),
            complete_json: default_complete_json(),
        }
    }
}

impl ReportsConfig {
    pub fn any_enabled(&self) -> bool {
        self.complete_html || self.failed_html || self.complete_json
    }
}
