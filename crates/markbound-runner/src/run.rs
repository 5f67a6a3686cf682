//! The run pipeline.
//!
//! A run resolves its contract, checks the template, opens every referenced
//! data source once, extracts each binding in contract order, assembles the
//! dataset, renders and stages the artifact. The same pipeline serves saved
//! contracts ([`ReportRunner::run`]) and unsaved drafts being test-driven
//! from the designer ([`ReportRunner::test_draft`]); only the contract
//! resolution step differs.

use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::Instant;

use markbound_contract::{ContractDraft, DataBinding};
use markbound_extract::{ExtractionResult, Extractor};
use markbound_sheet::Workbook;

use crate::collab::{
    ContractStore, OutputFormat, SessionStaging, TemplateRenderer, WorkbookSource,
};
use crate::dataset::assemble;
use crate::error::RunError;
use crate::log::{LogEntry, RunLog};
use crate::session::SessionRef;

/// What to run and with which inputs.
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub contract_id: String,
    pub session: SessionRef,
    /// Parameter values keyed by mark (`v.issuedBy`).
    pub parameters: HashMap<String, String>,
    pub output_format: OutputFormat,
}

impl RunOptions {
    pub fn new(contract_id: impl Into<String>, session: SessionRef) -> Self {
        Self {
            contract_id: contract_id.into(),
            session,
            parameters: HashMap::new(),
            output_format: OutputFormat::default(),
        }
    }

    pub fn with_parameter(mut self, mark: impl Into<String>, value: impl Into<String>) -> Self {
        self.parameters.insert(mark.into(), value.into());
        self
    }

    pub fn with_output_format(mut self, format: OutputFormat) -> Self {
        self.output_format = format;
        self
    }
}

/// Test-drive an unsaved draft against uploaded files.
#[derive(Debug, Clone)]
pub struct DraftTestRequest {
    pub draft: ContractDraft,
    pub session: SessionRef,
    pub parameters: HashMap<String, String>,
    pub output_format: OutputFormat,
}

impl DraftTestRequest {
    pub fn new(draft: ContractDraft, session: SessionRef) -> Self {
        Self {
            draft,
            session,
            parameters: HashMap::new(),
            output_format: OutputFormat::default(),
        }
    }

    pub fn with_parameter(mut self, mark: impl Into<String>, value: impl Into<String>) -> Self {
        self.parameters.insert(mark.into(), value.into());
        self
    }
}

/// A finished run: where the artifact landed plus the full log.
#[derive(Debug, Clone)]
pub struct RunOutcome {
    pub artifact: PathBuf,
    pub duration_ms: u64,
    pub logs: Vec<LogEntry>,
}

/// A failed run still hands back everything logged up to the failure.
#[derive(Debug)]
pub struct RunFailure {
    pub error: RunError,
    pub logs: Vec<LogEntry>,
}

impl std::fmt::Display for RunFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.error)
    }
}

impl std::error::Error for RunFailure {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.error)
    }
}

/// Ties the four collaborators together and drives runs.
pub struct ReportRunner<S, F, R, W> {
    store: S,
    staging: F,
    renderer: R,
    workbooks: W,
    probe_soffice: bool,
}

impl<S, F, R, W> ReportRunner<S, F, R, W>
where
    S: ContractStore,
    F: SessionStaging,
    R: TemplateRenderer,
    W: WorkbookSource,
{
    pub fn new(store: S, staging: F, renderer: R, workbooks: W) -> Self {
        Self {
            store,
            staging,
            renderer,
            workbooks,
            probe_soffice: false,
        }
    }

    /// Check for a LibreOffice binary at the start of every run and log the
    /// outcome. Never fatal; pdf/ods rendering backends that shell out to
    /// soffice want the warning in the run log before they fail.
    pub fn with_soffice_probe(mut self) -> Self {
        self.probe_soffice = true;
        self
    }

    /// Run a saved contract to a staged artifact.
    pub fn run(&self, options: &RunOptions) -> Result<RunOutcome, RunFailure> {
        let started = Instant::now();
        let mut log = RunLog::new();
        let result = self.run_contract(options, &mut log);
        self.finish(result, started, log)
    }

    /// Run an unsaved draft the same way a contract would run.
    pub fn test_draft(&self, request: &DraftTestRequest) -> Result<RunOutcome, RunFailure> {
        let started = Instant::now();
        let mut log = RunLog::new();
        let result = self.run_draft(request, &mut log);
        self.finish(result, started, log)
    }

    fn finish(
        &self,
        result: Result<PathBuf, RunError>,
        started: Instant,
        mut log: RunLog,
    ) -> Result<RunOutcome, RunFailure> {
        let duration_ms = started.elapsed().as_millis() as u64;
        match result {
            Ok(artifact) => {
                log.info(format!("finished in {duration_ms} ms"));
                Ok(RunOutcome {
                    artifact,
                    duration_ms,
                    logs: log.into_entries(),
                })
            }
            Err(error) => {
                log.error(format!("run failed ({}): {error}", error.code()));
                Err(RunFailure {
                    error,
                    logs: log.into_entries(),
                })
            }
        }
    }

    fn run_contract(&self, options: &RunOptions, log: &mut RunLog) -> Result<PathBuf, RunError> {
        log.info(format!("starting run for contract `{}`", options.contract_id));
        let contract = self
            .store
            .fetch_contract(&options.contract_id)
            .map_err(|err| RunError::StorageFailed(err.to_string()))?
            .ok_or_else(|| RunError::ContractNotFound(options.contract_id.clone()))?;
        contract.validate()?;

        let subject = RunSubject {
            template_path: &contract.template_path,
            template_file_name: &contract.template_file_name,
            bindings: &contract.bindings,
        };
        self.execute(
            subject,
            &options.session,
            &options.parameters,
            options.output_format,
            log,
        )
    }

    fn run_draft(&self, request: &DraftTestRequest, log: &mut RunLog) -> Result<PathBuf, RunError> {
        log.info("starting test run for draft contract");
        request.draft.validate()?;

        let subject = RunSubject {
            template_path: &request.draft.template_path,
            template_file_name: &request.draft.template_file_name,
            bindings: &request.draft.bindings,
        };
        self.execute(
            subject,
            &request.session,
            &request.parameters,
            request.output_format,
            log,
        )
    }

    fn execute(
        &self,
        subject: RunSubject<'_>,
        session: &SessionRef,
        parameters: &HashMap<String, String>,
        format: OutputFormat,
        log: &mut RunLog,
    ) -> Result<PathBuf, RunError> {
        if self.probe_soffice {
            probe_soffice(log);
        }

        let template = Path::new(subject.template_path);
        if !template.is_file() {
            return Err(RunError::TemplateMissing {
                path: subject.template_path.to_string(),
            });
        }
        log.info(format!("template `{}` found", subject.template_file_name));

        let mut ctx = RunContext::default();
        let mut results = Vec::new();
        for binding in subject.bindings {
            let Some(data_source_id) = binding.data_source() else {
                continue;
            };
            let source = ctx.source_for(&self.staging, &self.workbooks, session, data_source_id, log)?;
            let extractor = Extractor::new(&source.workbook, source.label.clone());
            let extracted = match binding {
                DataBinding::Single(single) => {
                    extractor.extract_single(single).map(ExtractionResult::Single)
                }
                DataBinding::List(list) => {
                    extractor.extract_list(list).map(ExtractionResult::List)
                }
                DataBinding::Parameter(_) | DataBinding::Skip(_) => continue,
            };
            let extracted = extracted.map_err(|source| RunError::Extraction {
                mark: binding.mark().to_string(),
                data_source_id: data_source_id.to_string(),
                source,
            })?;
            log.info_with(
                format!("extracted `{}` from data source `{data_source_id}`", binding.mark()),
                binding.mark(),
            );
            results.push(extracted);
        }

        let dataset = assemble(subject.bindings, &results, parameters, log)?;
        log.info(format!(
            "dataset assembled ({} data entr{}, {} parameter{})",
            dataset.d.len(),
            if dataset.d.len() == 1 { "y" } else { "ies" },
            dataset.v.len(),
            if dataset.v.len() == 1 { "" } else { "s" },
        ));

        let file_name = build_output_file_name(subject.template_file_name, format);
        let bytes = self
            .renderer
            .render(template, &dataset, format)
            .map_err(|err| RunError::RenderFailed(err.to_string()))?;
        log.info(format!("rendered `{file_name}` ({} bytes)", bytes.len()));

        let artifact = self
            .staging
            .store_output(session, &file_name, &bytes)
            .map_err(|err| RunError::StagingFailed(err.to_string()))?;
        log.info(format!("stored output at {}", artifact.display()));
        Ok(artifact)
    }
}

/// The parts of a contract or draft the pipeline actually runs against.
struct RunSubject<'a> {
    template_path: &'a str,
    template_file_name: &'a str,
    bindings: &'a [DataBinding],
}

struct LoadedSource {
    workbook: Workbook,
    /// Upload file name, shown in extraction errors and logs.
    label: String,
}

/// Per-run workbook cache: each data source file is opened at most once no
/// matter how many bindings read from it.
#[derive(Default)]
struct RunContext {
    sources: HashMap<String, LoadedSource>,
}

impl RunContext {
    fn source_for<F, W>(
        &mut self,
        staging: &F,
        workbooks: &W,
        session: &SessionRef,
        data_source_id: &str,
        log: &mut RunLog,
    ) -> Result<&LoadedSource, RunError>
    where
        F: SessionStaging,
        W: WorkbookSource,
    {
        match self.sources.entry(data_source_id.to_string()) {
            Entry::Occupied(entry) => Ok(entry.into_mut()),
            Entry::Vacant(entry) => {
                let path = staging
                    .data_source_file(session, data_source_id)
                    .map_err(|err| RunError::StagingFailed(err.to_string()))?
                    .ok_or_else(|| RunError::DataSourceMissing(data_source_id.to_string()))?;
                // staging can race with cleanup; treat a vanished file the
                // same as one that was never uploaded
                if !path.is_file() {
                    return Err(RunError::DataSourceMissing(data_source_id.to_string()));
                }
                let label = path
                    .file_name()
                    .and_then(|name| name.to_str())
                    .unwrap_or(data_source_id)
                    .to_string();
                let workbook =
                    workbooks
                        .open(&path)
                        .map_err(|err| RunError::DataSourceUnreadable {
                            id: data_source_id.to_string(),
                            reason: err.to_string(),
                        })?;
                log.info(format!("loaded data source `{data_source_id}` from `{label}`"));
                Ok(entry.insert(LoadedSource { workbook, label }))
            }
        }
    }
}

/// `invoice.xlsx` run as pdf becomes `invoice-output.pdf`.
fn build_output_file_name(template_file_name: &str, format: OutputFormat) -> String {
    let stem = Path::new(template_file_name)
        .file_stem()
        .and_then(|stem| stem.to_str())
        .unwrap_or("report");
    format!("{stem}-output.{}", format.extension())
}

/// Warn-only availability check for the LibreOffice binary pdf/ods
/// conversion shells out to.
fn probe_soffice(log: &mut RunLog) {
    match Command::new("soffice").arg("--version").output() {
        Ok(output) if output.status.success() => {
            let stdout = String::from_utf8_lossy(&output.stdout);
            let version = stdout.lines().next().unwrap_or("").trim().to_string();
            log.info(format!("LibreOffice available: {version}"));
        }
        Ok(_) | Err(_) => {
            log.warn("LibreOffice (soffice) not found; pdf and ods output may be unavailable");
        }
    }
}
