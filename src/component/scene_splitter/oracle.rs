//! 外部分析與擷取工具的介面
//!
//! 管線只依賴這三個 trait，實際的 ffmpeg / ffprobe 實作在各自的模組，
//! 測試可以換成假的實作。

use super::clip_extractor::FfmpegClipExtractor;
use super::duration_probe::FfprobeDurationProbe;
use super::models::{ClipDescriptor, TimeInterval};
use super::scene_detector::FfprobeBoundaryDetector;
use crate::config::ClipEncodingSettings;
use crate::error::{DetectionError, ExtractionError, ProbeError};
use crate::tools::{AvailableTools, ProcessRunner};
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::AtomicBool;
use std::time::Duration;

/// 場景變換點資訊
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SceneChange {
    pub timestamp: f64,
    pub score: f64,
}

pub trait DurationProbe: Send + Sync {
    /// 影片總長度（秒）
    fn probe(&self, source: &Path) -> Result<f64, ProbeError>;
}

pub trait BoundaryDetector: Send + Sync {
    /// 回傳已排序、去重且 `timestamp >= 0` 的變換點
    fn detect(&self, source: &Path, threshold: f64) -> Result<Vec<SceneChange>, DetectionError>;
}

pub trait ClipExtractor: Send + Sync {
    /// 擷取 `[start, end)` 到 `output`；失敗時不得留下輸出檔
    fn extract(
        &self,
        source: &Path,
        interval: TimeInterval,
        output: &Path,
    ) -> Result<ClipDescriptor, ExtractionError>;
}

/// 管線使用的一組工具
pub struct MediaToolkit {
    pub probe: Box<dyn DurationProbe>,
    pub detector: Box<dyn BoundaryDetector>,
    pub extractor: Box<dyn ClipExtractor>,
}

impl MediaToolkit {
    #[must_use]
    pub fn new(
        probe: Box<dyn DurationProbe>,
        detector: Box<dyn BoundaryDetector>,
        extractor: Box<dyn ClipExtractor>,
    ) -> Self {
        Self {
            probe,
            detector,
            extractor,
        }
    }

    /// 以 ffmpeg / ffprobe 建立工具組
    ///
    /// `clip_timeout` 只限制單一片段的擷取。長度讀取與場景偵測要解碼整個來源檔，
    /// 所需時間隨影片長度增加，不設逾時，只受中斷訊號控制。
    #[must_use]
    pub fn ffmpeg(
        tools: &AvailableTools,
        shutdown_signal: &Arc<AtomicBool>,
        clip_timeout: Option<Duration>,
        encoding: &ClipEncodingSettings,
    ) -> Self {
        let analysis_runner = ProcessRunner::new(Arc::clone(shutdown_signal), None);
        let extraction_runner = ProcessRunner::new(Arc::clone(shutdown_signal), clip_timeout);

        Self::new(
            Box::new(FfprobeDurationProbe::new(tools, analysis_runner.clone())),
            Box::new(FfprobeBoundaryDetector::new(tools, analysis_runner)),
            Box::new(FfmpegClipExtractor::new(
                tools,
                extraction_runner,
                encoding.clone(),
            )),
        )
    }
}
