//! Meta crate that re-exports the markbound building blocks with the whole
//! stack enabled by default. Downstream users can depend on this crate and
//! trim to specific layers via feature flags while keeping access to the
//! underlying crates when deeper integration is required.

#[cfg(feature = "common")]
pub use markbound_common as common;

#[cfg(feature = "sheet")]
pub use markbound_sheet as sheet;

#[cfg(feature = "contract")]
pub use markbound_contract as contract;

#[cfg(feature = "template")]
pub use markbound_template as template;

#[cfg(feature = "extract")]
pub use markbound_extract as extract;

#[cfg(feature = "runner")]
pub use markbound_runner as runner;

#[cfg(feature = "common")]
pub use markbound_common::{CellAddress, CellValue, MarkItem, MarkKind};

#[cfg(feature = "contract")]
pub use markbound_contract::{
    ContractDocument, ContractDraft, DataBinding, DataSource, ReportContract,
};

#[cfg(feature = "template")]
pub use markbound_template::{parse_template, scan_workbook};

#[cfg(feature = "extract")]
pub use markbound_extract::{ExtractionResult, Extractor};

#[cfg(feature = "runner")]
pub use markbound_runner::{
    Dataset, DirStaging, ReportRunner, RunOptions, RunOutcome, SessionRef,
};

#[cfg(feature = "template")]
pub mod doc_examples;
