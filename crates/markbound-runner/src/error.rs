use markbound_contract::ValidationError;
use markbound_extract::ExtractError;
use thiserror::Error;

/// Anything that can stop a report run.
///
/// Each variant maps to a stable machine code via [`RunError::code`]; hosts
/// key their user-facing handling off the code and show the `Display` text
/// as the detail line.
#[derive(Debug, Error)]
pub enum RunError {
    #[error("no contract with id `{0}`")]
    ContractNotFound(String),

    #[error("{0}")]
    ContractInvalid(#[from] ValidationError),

    #[error("template file not found at `{path}`")]
    TemplateMissing { path: String },

    #[error("parameter `{label}` ({mark}) has no value")]
    ParameterMissing { mark: String, label: String },

    #[error("parameter `{label}` ({mark}): {reason}")]
    ParameterInvalid {
        mark: String,
        label: String,
        reason: String,
    },

    #[error("no file uploaded for data source `{0}`")]
    DataSourceMissing(String),

    #[error("data source `{id}` could not be read: {reason}")]
    DataSourceUnreadable { id: String, reason: String },

    #[error("extraction failed for `{mark}` (data source `{data_source_id}`): {source}")]
    Extraction {
        mark: String,
        data_source_id: String,
        #[source]
        source: ExtractError,
    },

    #[error("rendering failed: {0}")]
    RenderFailed(String),

    #[error("contract storage failed: {0}")]
    StorageFailed(String),

    #[error("session staging failed: {0}")]
    StagingFailed(String),
}

impl RunError {
    /// Stable machine-readable code for the failure class.
    pub fn code(&self) -> &'static str {
        match self {
            RunError::ContractNotFound(_) => "CONTRACT_NOT_FOUND",
            RunError::ContractInvalid(_) => "CONTRACT_INVALID",
            RunError::TemplateMissing { .. } => "TEMPLATE_MISSING",
            RunError::ParameterMissing { .. } => "PARAMETER_MISSING",
            RunError::ParameterInvalid { .. } => "PARAMETER_INVALID",
            RunError::DataSourceMissing(_) => "DATA_SOURCE_NOT_FOUND",
            // unreadable files surface as extraction failures, same as a
            // workbook that opens but has the wrong shape
            RunError::DataSourceUnreadable { .. } => "DATA_EXTRACTION_FAILED",
            RunError::Extraction { .. } => "DATA_EXTRACTION_FAILED",
            RunError::RenderFailed(_) => "RENDER_FAILED",
            RunError::StorageFailed(_) => "STORAGE_FAILED",
            RunError::StagingFailed(_) => "STAGING_FAILED",
        }
    }
}
