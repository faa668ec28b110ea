pub mod api;
pub mod metric;
pub mod rules;
pub mod upload;

pub use api::{
    ApiErrorBody, BulkResponse, CleanResponse, DuplicateRemovalResponse, FileOutcome,
    InferenceStats, PreviewResponse, ProcessResult, UploadResponse,
};
pub use metric::{Metric, MetricSelection, VendorAnalysisType, WorkingCapitalKind};
pub use rules::{RuleName, RuleSet};
pub use upload::{FileSelection, FileStatus, UploadedFileRef};
