//! 命令列參數定義

use crate::config::SceneSplitterSettings;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Split videos into scenes and build a scene project",
    long_about = "Detects scene changes with ffprobe, cuts each video into clips of at least a minimum length with ffmpeg, and writes a project JSON describing the scenes."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Enable debug logging for this crate
    #[arg(short, long, global = true, default_value_t = false)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Split videos into scene clips and export a project
    Split(SplitArgs),

    /// Inspect or manage stored projects
    #[command(subcommand)]
    Projects(ProjectCommands),

    /// Interactive menu (default when no subcommand is given)
    Interactive,
}

#[derive(Args, Debug)]
pub struct SplitArgs {
    /// Video files or directories containing videos
    #[arg(required = true, value_name = "VIDEOS")]
    pub videos: Vec<PathBuf>,

    /// Project title (defaults to "Project <local time>")
    #[arg(short = 't', long, value_name = "TITLE")]
    pub project_title: Option<String>,

    /// Project directory; clips go to <DIR>/media (defaults to ./project_<unix time>)
    #[arg(short = 'd', long, value_name = "DIR")]
    pub project_dir: Option<PathBuf>,

    /// Minimum segment length in seconds
    #[arg(short = 'm', long, value_name = "SECONDS")]
    pub min_segment: Option<f64>,

    /// Scene change threshold between 0 and 1 (lower finds more scenes)
    #[arg(short = 's', long, value_name = "THRESHOLD")]
    pub scene_threshold: Option<f64>,

    /// Project JSON output path (defaults to <DIR>/project.json)
    #[arg(short = 'o', long, value_name = "FILE")]
    pub output_file: Option<PathBuf>,

    /// Number of parallel workers (defaults to CPU count)
    #[arg(short = 'j', long, value_name = "N", value_parser = clap::value_parser!(usize))]
    pub workers: Option<usize>,

    /// Kill any single ffmpeg/ffprobe call running longer than this
    #[arg(long, value_name = "SECONDS")]
    pub clip_timeout: Option<u64>,

    /// Project store file (defaults to the path in settings.json)
    #[arg(long, value_name = "FILE", conflicts_with = "no_store")]
    pub store: Option<PathBuf>,

    /// Do not record the project in the project store
    #[arg(long, default_value_t = false)]
    pub no_store: bool,
}

impl SplitArgs {
    /// 以命令列參數覆寫設定檔的值
    #[must_use]
    pub fn apply_overrides(&self, settings: &SceneSplitterSettings) -> SceneSplitterSettings {
        let mut merged = settings.clone();

        if let Some(min) = self.min_segment {
            merged.min_segment_seconds = min;
        }
        if let Some(threshold) = self.scene_threshold {
            merged.scene_threshold = threshold;
        }
        if self.workers.is_some() {
            merged.max_workers = self.workers;
        }
        if self.clip_timeout.is_some() {
            merged.clip_timeout_seconds = self.clip_timeout;
        }

        merged
    }
}

#[derive(Subcommand, Debug)]
pub enum ProjectCommands {
    /// List stored projects, most recently updated first
    List(StoreArgs),

    /// Show the scenes of one project
    Show {
        #[arg(value_name = "ID")]
        id: String,
        #[command(flatten)]
        store: StoreArgs,
    },

    /// Delete a project from the store
    Delete {
        #[arg(value_name = "ID")]
        id: String,
        #[command(flatten)]
        store: StoreArgs,
    },

    /// Export a stored project as JSON
    Export {
        #[arg(value_name = "ID")]
        id: String,
        #[arg(value_name = "FILE")]
        file: PathBuf,
        #[command(flatten)]
        store: StoreArgs,
    },

    /// Import a project JSON into the store
    Import {
        #[arg(value_name = "FILE")]
        file: PathBuf,
        #[command(flatten)]
        store: StoreArgs,
    },
}

#[derive(Args, Debug)]
pub struct StoreArgs {
    /// Project store file (defaults to the path in settings.json)
    #[arg(long, value_name = "FILE")]
    pub store: Option<PathBuf>,
}
