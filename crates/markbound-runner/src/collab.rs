//! Collaborator seams of the run pipeline.
//!
//! The runner does not know where contracts are stored, where uploads land,
//! or how a template plus dataset becomes a file. It talks to four traits and
//! treats their failures as opaque: a collaborator error is wrapped into the
//! matching [`RunError`](crate::RunError) variant with its message, never
//! inspected further. This module also carries directory- and memory-backed
//! implementations good enough for embedding and for tests.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use markbound_contract::ReportContract;
use markbound_sheet::{Workbook, open_workbook_file};
use serde::{Deserialize, Serialize};

use crate::dataset::Dataset;
use crate::session::SessionRef;

/// Opaque collaborator failure. Only the `Display` text survives into run
/// errors.
pub type CollabError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// File format of the rendered artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Xlsx,
    Pdf,
    Ods,
}

impl OutputFormat {
    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Xlsx => "xlsx",
            OutputFormat::Pdf => "pdf",
            OutputFormat::Ods => "ods",
        }
    }
}

/// Read access to saved contracts.
pub trait ContractStore {
    /// Fetch a contract by id; `Ok(None)` when no such contract exists.
    fn fetch_contract(&self, id: &str) -> Result<Option<ReportContract>, CollabError>;
}

/// Per-session file area for uploads and outputs.
pub trait SessionStaging {
    /// Path of the file uploaded for a data source in this session, if any.
    fn data_source_file(
        &self,
        session: &SessionRef,
        data_source_id: &str,
    ) -> Result<Option<PathBuf>, CollabError>;

    /// Persist a rendered artifact under the session and return where it
    /// landed.
    fn store_output(
        &self,
        session: &SessionRef,
        file_name: &str,
        bytes: &[u8],
    ) -> Result<PathBuf, CollabError>;
}

/// Turns a template plus dataset into artifact bytes.
pub trait TemplateRenderer {
    fn render(
        &self,
        template: &Path,
        dataset: &Dataset,
        format: OutputFormat,
    ) -> Result<Vec<u8>, CollabError>;
}

/// Loads an uploaded file into a workbook snapshot.
pub trait WorkbookSource {
    fn open(&self, path: &Path) -> Result<Workbook, CollabError>;
}

/// In-memory contract store, mainly for tests and single-process embedding.
#[derive(Debug, Default)]
pub struct MemoryContractStore {
    contracts: HashMap<String, ReportContract>,
}

impl MemoryContractStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, contract: ReportContract) {
        self.contracts.insert(contract.id.clone(), contract);
    }

    pub fn with(mut self, contract: ReportContract) -> Self {
        self.insert(contract);
        self
    }
}

impl ContractStore for MemoryContractStore {
    fn fetch_contract(&self, id: &str) -> Result<Option<ReportContract>, CollabError> {
        Ok(self.contracts.get(id).cloned())
    }
}

/// Directory-backed staging.
///
/// Layout under the root:
///
/// ```text
/// <scope>/<scope_id>/<session>/<session_id>/data-sources/<data_source_id>/<upload>
/// <scope>/<scope_id>/<session>/<session_id>/outputs/<artifact>
/// ```
///
/// A data source directory holds at most one upload; when several files are
/// present the lexicographically first is used so lookups stay deterministic.
#[derive(Debug, Clone)]
pub struct DirStaging {
    root: PathBuf,
}

impl DirStaging {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn session_dir(&self, session: &SessionRef) -> PathBuf {
        self.root
            .join(session.scope.as_str())
            .join(&session.scope_id)
            .join(session.session.as_str())
            .join(&session.session_id)
    }

    fn data_source_dir(&self, session: &SessionRef, data_source_id: &str) -> PathBuf {
        self.session_dir(session)
            .join("data-sources")
            .join(data_source_id)
    }

    /// Copy a file into the session's area for a data source, replacing any
    /// previous upload. Returns the staged path.
    pub fn stage_data_source(
        &self,
        session: &SessionRef,
        data_source_id: &str,
        file: &Path,
    ) -> Result<PathBuf, CollabError> {
        let file_name = file
            .file_name()
            .ok_or_else(|| format!("`{}` has no file name", file.display()))?;
        let dir = self.data_source_dir(session, data_source_id);
        if dir.exists() {
            fs::remove_dir_all(&dir)?;
        }
        fs::create_dir_all(&dir)?;
        let staged = dir.join(file_name);
        fs::copy(file, &staged)?;
        Ok(staged)
    }

    /// Drop the whole session directory, uploads and outputs both.
    pub fn clear_session(&self, session: &SessionRef) -> Result<(), CollabError> {
        let dir = self.session_dir(session);
        if dir.exists() {
            fs::remove_dir_all(&dir)?;
        }
        Ok(())
    }
}

impl SessionStaging for DirStaging {
    fn data_source_file(
        &self,
        session: &SessionRef,
        data_source_id: &str,
    ) -> Result<Option<PathBuf>, CollabError> {
        let dir = self.data_source_dir(session, data_source_id);
        if !dir.is_dir() {
            return Ok(None);
        }
        let mut files: Vec<PathBuf> = fs::read_dir(&dir)?
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| path.is_file())
            .collect();
        files.sort();
        Ok(files.into_iter().next())
    }

    fn store_output(
        &self,
        session: &SessionRef,
        file_name: &str,
        bytes: &[u8],
    ) -> Result<PathBuf, CollabError> {
        let dir = self.session_dir(session).join("outputs");
        fs::create_dir_all(&dir)?;
        let path = dir.join(file_name);
        fs::write(&path, bytes)?;
        Ok(path)
    }
}

/// Renderer stand-in that serializes the dataset to pretty JSON.
///
/// Useful anywhere the rendering backend is out of reach: tests assert on
/// the exact dataset a run produced, and hosts can wire it up to inspect
/// what a real renderer would receive. The template path and format are
/// accepted and ignored.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonDatasetRenderer;

impl TemplateRenderer for JsonDatasetRenderer {
    fn render(
        &self,
        _template: &Path,
        dataset: &Dataset,
        _format: OutputFormat,
    ) -> Result<Vec<u8>, CollabError> {
        Ok(serde_json::to_vec_pretty(dataset)?)
    }
}

/// Opens uploads with the bundled xlsx reader.
#[derive(Debug, Clone, Copy, Default)]
pub struct XlsxWorkbookSource;

impl WorkbookSource for XlsxWorkbookSource {
    fn open(&self, path: &Path) -> Result<Workbook, CollabError> {
        Ok(open_workbook_file(path)?)
    }
}
