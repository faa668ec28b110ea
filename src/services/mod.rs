pub mod cleaning_service;
pub mod docx_writer;
pub mod download_service;
pub mod inference_service;
pub mod pipeline_service;
pub mod upload_service;

pub use cleaning_service::{CleaningService, PreviewKind};
pub use docx_writer::{DocxWriter, SaveReport};
pub use download_service::{DownloadReport, DownloadService};
pub use inference_service::{InferenceService, DEFAULT_PROMPT};
pub use pipeline_service::PipelineService;
pub use upload_service::UploadService;
