//! 場景切割管線
//!
//! 每個來源檔依序經過：
//! `Probing -> Detecting -> Building -> Extracting -> Done`，
//! 長度讀取失敗或切不出片段時提早結束為 `Skipped`。
//!
//! 檔案之間、同一檔案的片段之間都平行處理，失敗只影響自己：
//! 單一片段失敗不影響同檔案的其他片段，單一檔案失敗不影響其他檔案。
//! 結果依輸入順序、片段順序排列，與完成先後無關。

use super::clip_extractor::{clip_output_path, plan_clip_stems};
use super::models::{ClipDescriptor, Segment};
use super::oracle::MediaToolkit;
use super::segment_builder::{build_segments, number_segments};
use crate::config::SceneSplitterSettings;
use crate::error::{DetectionError, ExtractionError, FileFailure, PipelineError, ProbeError};
use crate::signal::is_shutdown_requested;
use crate::tools::build_worker_pool;
use anyhow::Result;
use indicatif::ProgressBar;
use log::{debug, error, info, warn};
use rayon::prelude::*;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::AtomicBool;
use std::time::Duration;

/// 單次執行的參數
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub min_segment_seconds: f64,
    pub scene_threshold: f64,
    pub media_dir: PathBuf,
    pub workers: Option<usize>,
    pub clip_timeout: Option<Duration>,
}

impl PipelineConfig {
    #[must_use]
    pub fn from_settings(settings: &SceneSplitterSettings, media_dir: PathBuf) -> Self {
        Self {
            min_segment_seconds: settings.min_segment_seconds,
            scene_threshold: settings.scene_threshold,
            media_dir,
            workers: settings.max_workers,
            clip_timeout: settings.clip_timeout_seconds.map(Duration::from_secs),
        }
    }

    pub fn validate(&self) -> Result<(), PipelineError> {
        if !self.min_segment_seconds.is_finite() || self.min_segment_seconds <= 0.0 {
            return Err(PipelineError::InvalidConfig(format!(
                "片段最短長度必須大於 0，目前為 {}",
                self.min_segment_seconds
            )));
        }

        if !(0.0..=1.0).contains(&self.scene_threshold) {
            return Err(PipelineError::InvalidConfig(format!(
                "場景門檻必須介於 0 與 1 之間，目前為 {}",
                self.scene_threshold
            )));
        }

        if self.workers == Some(0) {
            return Err(PipelineError::InvalidConfig(
                "平行處理數量必須至少為 1".to_string(),
            ));
        }

        Ok(())
    }
}

/// 單一檔案目前所在的階段，用於紀錄
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileStage {
    Probing,
    Detecting,
    Building,
    Extracting,
}

impl fmt::Display for FileStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Probing => write!(f, "讀取長度"),
            Self::Detecting => write!(f, "場景偵測"),
            Self::Building => write!(f, "計算片段"),
            Self::Extracting => write!(f, "擷取片段"),
        }
    }
}

/// 單一片段的擷取結果
#[derive(Debug)]
pub struct SegmentReport {
    pub segment: Segment,
    pub output_path: PathBuf,
    pub result: Result<ClipDescriptor, ExtractionError>,
}

impl SegmentReport {
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        matches!(self.result, Err(ExtractionError::Cancelled { .. }))
    }
}

/// 到達 `Done` 的檔案
#[derive(Debug)]
pub struct FileClips {
    pub total_duration: f64,
    pub boundaries_detected: usize,
    /// 場景偵測失敗時以「無邊界」繼續處理
    pub detection_failed: bool,
    pub segments: Vec<SegmentReport>,
}

impl FileClips {
    pub fn clips(&self) -> impl Iterator<Item = &ClipDescriptor> {
        self.segments.iter().filter_map(|s| s.result.as_ref().ok())
    }

    #[must_use]
    pub fn failed_count(&self) -> usize {
        self.segments
            .iter()
            .filter(|s| s.result.is_err() && !s.is_cancelled())
            .count()
    }
}

#[derive(Debug)]
pub struct FileReport {
    pub source: PathBuf,
    pub outcome: Result<FileClips, FileFailure>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub files_total: usize,
    pub files_processed: usize,
    pub files_skipped: usize,
    pub files_cancelled: usize,
    pub segments_produced: usize,
    pub segments_failed: usize,
    pub segments_cancelled: usize,
}

#[derive(Debug)]
pub struct PipelineReport {
    pub files: Vec<FileReport>,
}

impl PipelineReport {
    /// 所有成功的片段，依輸入檔順序、片段順序排列
    pub fn clips(&self) -> impl Iterator<Item = &ClipDescriptor> {
        self.files
            .iter()
            .filter_map(|file| file.outcome.as_ref().ok())
            .flat_map(FileClips::clips)
    }

    #[must_use]
    pub fn summary(&self) -> RunSummary {
        let mut summary = RunSummary {
            files_total: self.files.len(),
            ..RunSummary::default()
        };

        for file in &self.files {
            match &file.outcome {
                Ok(clips) => {
                    summary.files_processed += 1;
                    for segment in &clips.segments {
                        match &segment.result {
                            Ok(_) => summary.segments_produced += 1,
                            Err(ExtractionError::Cancelled { .. }) => {
                                summary.segments_cancelled += 1;
                            }
                            Err(_) => summary.segments_failed += 1,
                        }
                    }
                }
                Err(FileFailure::Cancelled) => summary.files_cancelled += 1,
                Err(_) => summary.files_skipped += 1,
            }
        }

        summary
    }

    #[must_use]
    pub fn was_cancelled(&self) -> bool {
        let summary = self.summary();
        summary.files_cancelled > 0 || summary.segments_cancelled > 0
    }

    /// 取出所有成功片段；一個都沒有時整次執行視為失敗
    pub fn into_clips(self) -> Result<Vec<ClipDescriptor>, PipelineError> {
        let files = self.files.len();
        let clips: Vec<ClipDescriptor> = self
            .files
            .into_iter()
            .filter_map(|file| file.outcome.ok())
            .flat_map(|clips| clips.segments)
            .filter_map(|segment| segment.result.ok())
            .collect();

        if clips.is_empty() {
            return Err(PipelineError::NoClipsProduced { files });
        }

        Ok(clips)
    }
}

/// 場景切割管線
pub struct ScenePipeline<'a> {
    toolkit: &'a MediaToolkit,
    config: &'a PipelineConfig,
    shutdown_signal: Arc<AtomicBool>,
    progress: ProgressBar,
}

impl<'a> ScenePipeline<'a> {
    #[must_use]
    pub fn new(
        toolkit: &'a MediaToolkit,
        config: &'a PipelineConfig,
        shutdown_signal: Arc<AtomicBool>,
    ) -> Self {
        Self {
            toolkit,
            config,
            shutdown_signal,
            progress: ProgressBar::hidden(),
        }
    }

    /// 顯示片段擷取進度；總數會隨著各檔案算出片段數量逐步增加
    #[must_use]
    pub fn with_progress(mut self, progress: ProgressBar) -> Self {
        self.progress = progress;
        self
    }

    pub fn run(&self, sources: &[PathBuf]) -> Result<PipelineReport> {
        self.config.validate()?;

        let stems = plan_clip_stems(sources);
        let pool = build_worker_pool(self.config.workers)?;

        info!(
            "開始處理 {} 個檔案（最短片段 {:.1}s，門檻 {:.2}，{} 個執行緒）",
            sources.len(),
            self.config.min_segment_seconds,
            self.config.scene_threshold,
            pool.current_num_threads()
        );

        let files: Vec<FileReport> = pool.install(|| {
            sources
                .par_iter()
                .zip(&stems)
                .map(|(source, stem)| FileReport {
                    source: source.clone(),
                    outcome: self.process_file(source, stem),
                })
                .collect()
        });

        self.progress.finish_and_clear();

        let report = PipelineReport { files };
        let summary = report.summary();
        info!(
            "處理完成：{} 個檔案完成，{} 個跳過，共產生 {} 個片段（{} 個失敗）",
            summary.files_processed,
            summary.files_skipped,
            summary.segments_produced,
            summary.segments_failed
        );
        if report.was_cancelled() {
            warn!("處理被中斷，結果不完整");
        }

        Ok(report)
    }

    fn process_file(&self, source: &Path, stem: &str) -> Result<FileClips, FileFailure> {
        let name = source.display();

        if self.cancelled() {
            return Err(FileFailure::Cancelled);
        }

        debug!("[{}] {name}", FileStage::Probing);
        let total_duration = self.toolkit.probe.probe(source).map_err(|e| {
            if probe_cancelled(&e) {
                return FileFailure::Cancelled;
            }
            error!("無法讀取影片長度，跳過 {name}: {e}");
            FileFailure::ProbeFailed(e)
        })?;

        if self.cancelled() {
            return Err(FileFailure::Cancelled);
        }

        debug!("[{}] {name} ({total_duration:.2}s)", FileStage::Detecting);
        let (boundaries, detection_failed) = match self
            .toolkit
            .detector
            .detect(source, self.config.scene_threshold)
        {
            Ok(changes) => (
                changes.iter().map(|c| c.timestamp).collect::<Vec<f64>>(),
                false,
            ),
            Err(e) if detection_cancelled(&e) => return Err(FileFailure::Cancelled),
            Err(e) => {
                warn!("場景偵測失敗，以單一片段處理 {name}: {e}");
                (Vec::new(), true)
            }
        };

        debug!(
            "[{}] {name}: {} 個變換點",
            FileStage::Building,
            boundaries.len()
        );
        let intervals = build_segments(
            &boundaries,
            total_duration,
            self.config.min_segment_seconds,
        );
        if intervals.is_empty() {
            warn!(
                "影片長度 {total_duration:.2}s 短於最短片段 {:.2}s，跳過 {name}",
                self.config.min_segment_seconds
            );
            return Err(FileFailure::BuildInfeasible {
                total_duration,
                min_duration: self.config.min_segment_seconds,
            });
        }

        let segments = number_segments(intervals);
        debug!(
            "[{}] {name}: {} 個片段",
            FileStage::Extracting,
            segments.len()
        );
        self.progress.inc_length(segments.len() as u64);

        let reports: Vec<SegmentReport> = segments
            .par_iter()
            .map(|segment| self.extract_segment(source, stem, *segment))
            .collect();

        Ok(FileClips {
            total_duration,
            boundaries_detected: boundaries.len(),
            detection_failed,
            segments: reports,
        })
    }

    fn extract_segment(&self, source: &Path, stem: &str, segment: Segment) -> SegmentReport {
        let output_path = clip_output_path(&self.config.media_dir, stem, segment.index);

        let result = if self.cancelled() {
            Err(ExtractionError::Cancelled {
                output: output_path.clone(),
            })
        } else {
            self.toolkit
                .extractor
                .extract(source, segment.interval, &output_path)
        };

        match &result {
            Ok(clip) => debug!("片段完成: {}", clip.output_path.display()),
            Err(ExtractionError::Cancelled { .. }) => {}
            Err(e) => warn!("片段 {} 擷取失敗 {}: {e}", segment.index, source.display()),
        }
        self.progress.inc(1);

        SegmentReport {
            segment,
            output_path,
            result,
        }
    }

    fn cancelled(&self) -> bool {
        is_shutdown_requested(&self.shutdown_signal)
    }
}

fn probe_cancelled(error: &ProbeError) -> bool {
    matches!(error, ProbeError::Tool { source, .. } if source.is_cancelled())
}

fn detection_cancelled(error: &DetectionError) -> bool {
    matches!(error, DetectionError::Tool { source, .. } if source.is_cancelled())
}
