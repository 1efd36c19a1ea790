use super::oracle::MediaToolkit;
use super::pipeline::{FileReport, PipelineConfig, PipelineReport, RunSummary, ScenePipeline};
use super::project_assembler::{MEDIA_DIR_NAME, assemble_project};
use crate::component::project::{
    JsonFileProjectStore, Project, ProjectStore, export_project_to_file,
};
use crate::config::{Config, SceneSplitterSettings};
use crate::error::{FileFailure, PipelineError};
use crate::tools::{AvailableTools, ensure_directory_exists, expand_input_paths};
use anyhow::Result;
use chrono::{Local, Utc};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use log::{info, warn};
use rust_i18n::t;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::AtomicBool;

/// 專案匯出檔預設名稱
pub const DEFAULT_PROJECT_FILE: &str = "project.json";

/// 一次切割作業的輸入
#[derive(Debug, Clone)]
pub struct SplitRequest {
    pub inputs: Vec<PathBuf>,
    pub project_title: String,
    pub project_dir: PathBuf,
    pub output_file: PathBuf,
    pub settings: SceneSplitterSettings,
    /// `None` 表示不寫入專案資料庫
    pub store_path: Option<PathBuf>,
}

impl SplitRequest {
    /// 使用預設標題與 `./project_<unix 秒數>` 專案目錄
    #[must_use]
    pub fn new(inputs: Vec<PathBuf>, settings: SceneSplitterSettings) -> Self {
        let project_dir = default_project_dir();
        Self {
            inputs,
            project_title: default_project_title(),
            output_file: project_dir.join(DEFAULT_PROJECT_FILE),
            project_dir,
            settings,
            store_path: None,
        }
    }

    #[must_use]
    pub fn media_dir(&self) -> PathBuf {
        self.project_dir.join(MEDIA_DIR_NAME)
    }
}

#[must_use]
pub fn default_project_title() -> String {
    format!("Project {}", Local::now().format("%Y-%m-%d %H:%M:%S"))
}

#[must_use]
pub fn default_project_dir() -> PathBuf {
    PathBuf::from(format!("project_{}", Utc::now().timestamp()))
}

/// 成功完成的切割作業
#[derive(Debug)]
pub struct SplitOutcome {
    pub project: Project,
    pub output_file: PathBuf,
    pub summary: RunSummary,
}

/// 影片場景切割
///
/// 流程：
/// 1. 檢查 ffmpeg / ffprobe
/// 2. 展開輸入路徑（資料夾會掃描其中的影片）
/// 3. 平行偵測場景並擷取片段到 `<專案目錄>/media`
/// 4. 依片段順序建立專案並輸出 JSON
pub struct SceneSplitter {
    config: Config,
    shutdown_signal: Arc<AtomicBool>,
}

impl SceneSplitter {
    pub const fn new(config: Config, shutdown_signal: Arc<AtomicBool>) -> Self {
        Self {
            config,
            shutdown_signal,
        }
    }

    /// 使用 ffmpeg / ffprobe 執行
    pub fn run(&self, request: &SplitRequest) -> Result<SplitOutcome> {
        let pipeline_config =
            PipelineConfig::from_settings(&request.settings, request.media_dir());
        pipeline_config.validate()?;

        let tools = AvailableTools::check()?;
        info!("使用 {} / {}", tools.ffmpeg(), tools.ffprobe());

        let toolkit = MediaToolkit::ffmpeg(
            &tools,
            &self.shutdown_signal,
            pipeline_config.clip_timeout,
            &request.settings.encoding,
        );

        self.run_with_toolkit(&toolkit, request)
    }

    /// 使用指定的工具組執行
    pub fn run_with_toolkit(
        &self,
        toolkit: &MediaToolkit,
        request: &SplitRequest,
    ) -> Result<SplitOutcome> {
        println!("{}", style(t!("split.title")).cyan().bold());

        println!("{}", style(t!("split.scanning")).dim());
        let inputs = expand_input_paths(&request.inputs, &self.config.file_type_table)?;
        if inputs.is_empty() {
            anyhow::bail!(t!("split.no_videos").to_string());
        }

        println!(
            "{}",
            style(t!("split.found_videos", count = inputs.len())).green()
        );
        for (index, path) in inputs.iter().enumerate() {
            println!("  {}. {}", index + 1, display_name(path));
        }

        let pipeline_config =
            PipelineConfig::from_settings(&request.settings, request.media_dir());
        pipeline_config.validate()?;
        ensure_directory_exists(&pipeline_config.media_dir)?;

        println!();
        println!("{}", style(t!("split.processing")).cyan());

        let report = ScenePipeline::new(toolkit, &pipeline_config, Arc::clone(&self.shutdown_signal))
            .with_progress(create_progress_bar())
            .run(&inputs)?;

        print_file_reports(&report);

        let summary = report.summary();
        print_summary(&summary);

        if report.was_cancelled() {
            return Err(PipelineError::Cancelled.into());
        }

        let clips = report.into_clips()?;
        let mut project = assemble_project(&request.project_title, &clips);
        project.touch();

        export_project_to_file(&project, &request.output_file).map_err(|e| {
            PipelineError::ExportFailed {
                path: request.output_file.clone(),
                message: format!("{e:#}"),
            }
        })?;
        info!(
            "專案已輸出: {} ({} 個場景)",
            request.output_file.display(),
            project.scenes.len()
        );

        if let Some(store_path) = &request.store_path {
            store_project(store_path, &project);
        }

        println!(
            "\n{} {}",
            style("✓").green(),
            t!(
                "split.project_saved",
                path = request.output_file.display().to_string()
            )
        );
        println!(
            "  {}",
            t!(
                "split.project_scenes",
                count = project.scenes.len(),
                duration = project.format_total_duration()
            )
        );

        Ok(SplitOutcome {
            project,
            output_file: request.output_file.clone(),
            summary,
        })
    }
}

/// 資料庫寫入失敗不影響已輸出的專案檔
///
/// 與輸出檔使用同一個 `updatedAt`，因此原樣寫入。
fn store_project(store_path: &Path, project: &Project) {
    let result =
        JsonFileProjectStore::open(store_path).and_then(|mut store| store.insert(project));

    match result {
        Ok(()) => println!(
            "  {}",
            style(t!(
                "split.project_stored",
                path = store_path.display().to_string()
            ))
            .dim()
        ),
        Err(e) => {
            warn!("無法寫入專案資料庫 {}: {e:#}", store_path.display());
            println!(
                "  {} {}",
                style("!").yellow(),
                t!("split.store_failed", error = format!("{e:#}"))
            );
        }
    }
}

fn create_progress_bar() -> ProgressBar {
    let progress_bar = ProgressBar::new(0);
    progress_bar.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta}) {msg}")
            .expect("Invalid progress bar template")
            .progress_chars("#>-"),
    );
    progress_bar.set_message(t!("split.progress_message").to_string());
    progress_bar
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map_or_else(|| path.display().to_string(), |n| n.to_string_lossy().to_string())
}

fn print_file_reports(report: &PipelineReport) {
    println!();
    for FileReport { source, outcome } in &report.files {
        let name = display_name(source);

        match outcome {
            Ok(file) => {
                let produced = file.clips().count();
                let failed = file.failed_count();
                let marker = if produced > 0 {
                    style("✓").green()
                } else {
                    style("✗").red()
                };

                println!(
                    "  {} {}",
                    marker,
                    t!(
                        "split.file_done",
                        name = name,
                        clips = produced,
                        failed = failed
                    )
                );
                if file.detection_failed {
                    println!(
                        "    {} {}",
                        style("!").yellow(),
                        t!("split.detection_fallback")
                    );
                }
            }
            Err(FileFailure::BuildInfeasible {
                total_duration,
                min_duration,
            }) => println!(
                "  {} {}",
                style("⤳").dim(),
                t!(
                    "split.file_too_short",
                    name = name,
                    duration = format!("{total_duration:.1}"),
                    min = format!("{min_duration:.1}")
                )
            ),
            Err(FileFailure::Cancelled) => println!(
                "  {} {}",
                style("-").dim(),
                t!("split.file_cancelled", name = name)
            ),
            Err(e) => println!(
                "  {} {}",
                style("✗").red(),
                t!("split.file_failed", name = name, error = e.to_string())
            ),
        }
    }
}

fn print_summary(summary: &RunSummary) {
    println!();
    println!("{}", style(t!("split.summary_title")).cyan().bold());
    println!(
        "  {}",
        t!(
            "split.summary_files",
            total = summary.files_total,
            processed = summary.files_processed,
            skipped = summary.files_skipped
        )
    );
    println!(
        "  {}",
        t!(
            "split.summary_segments",
            produced = summary.segments_produced,
            failed = summary.segments_failed
        )
    );
    if summary.files_cancelled > 0 || summary.segments_cancelled > 0 {
        println!("  {}", style(t!("split.summary_cancelled")).yellow());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_defaults() {
        let request = SplitRequest::new(
            vec![PathBuf::from("a.mp4")],
            SceneSplitterSettings::default(),
        );

        assert!(request.project_title.starts_with("Project "));
        assert!(
            request
                .project_dir
                .to_string_lossy()
                .starts_with("project_")
        );
        assert_eq!(
            request.output_file,
            request.project_dir.join(DEFAULT_PROJECT_FILE)
        );
        assert_eq!(request.media_dir(), request.project_dir.join("media"));
        assert!(request.store_path.is_none());
    }
}
