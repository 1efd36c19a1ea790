//! 專案紀錄：場景列表、匯出檔與本機儲存

pub mod export;
mod main;
pub mod model;
pub mod store;

pub use export::{ExportMetadata, ProjectExport, export_project_to_file, import_project_from_file};
pub use main::ProjectManager;
pub use model::{
    CompletionStats, DEFAULT_WORDS_PER_MINUTE, MediaFile, MediaType, Project, ProjectSettings,
    Scene, VoiceSettings, format_duration_from_seconds,
};
pub use store::{JsonFileProjectStore, ProjectStore};
