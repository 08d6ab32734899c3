use crate::convert::ConvertedArtifact;
use crate::staging::StagedFile;
use crate::window::ReportWindow;

use super::error::PipelineWarning;

/// State accumulated across the run's steps.
pub struct PipelineContext {
    pub run_id: String,

    // Query-configuration result
    pub window: Option<ReportWindow>,

    // Export result — guaranteed Some after step_export
    pub staged: Option<StagedFile>,

    // Conversion result — None when conversion failed (raw fallback)
    pub converted: Option<ConvertedArtifact>,

    // Non-fatal warnings from best-effort steps
    pub warnings: Vec<PipelineWarning>,
}

impl PipelineContext {
    pub fn new() -> Self {
        Self {
            run_id: uuid::Uuid::new_v4().to_string(),
            window: None,
            staged: None,
            converted: None,
            warnings: Vec::new(),
        }
    }
}

impl Default for PipelineContext {
    fn default() -> Self {
        Self::new()
    }
}
