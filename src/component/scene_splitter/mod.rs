//! 影片場景切割元件
//!
//! 流程：
//! A. 取得影片長度（ffprobe）
//! B. 場景變換偵測（lavfi select=gt(scene)）
//! C. 依最短長度計算片段
//! D. 平行擷取片段（ffmpeg 重新編碼）
//! E. 建立專案紀錄

mod clip_extractor;
mod duration_probe;
mod main;
pub mod models;
pub mod oracle;
pub mod pipeline;
mod project_assembler;
mod scene_detector;
mod segment_builder;

pub use clip_extractor::{
    CLIP_EXTENSION, FfmpegClipExtractor, clip_output_path, format_timestamp, plan_clip_stems,
};
pub use duration_probe::FfprobeDurationProbe;
pub use main::{
    DEFAULT_PROJECT_FILE, SceneSplitter, SplitOutcome, SplitRequest, default_project_dir,
    default_project_title,
};
pub use models::{ClipDescriptor, Segment, TimeInterval};
pub use oracle::{BoundaryDetector, ClipExtractor, DurationProbe, MediaToolkit, SceneChange};
pub use pipeline::{
    FileClips, FileReport, FileStage, PipelineConfig, PipelineReport, RunSummary, ScenePipeline,
    SegmentReport,
};
pub use project_assembler::{MEDIA_DIR_NAME, assemble_project, scene_from_clip};
pub use scene_detector::{DEFAULT_SCENE_THRESHOLD, FfprobeBoundaryDetector};
pub use segment_builder::{build_segments, cut_points, number_segments};
