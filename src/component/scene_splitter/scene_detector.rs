use super::oracle::{BoundaryDetector, SceneChange};
use crate::error::DetectionError;
use crate::tools::{AvailableTools, ProcessRunner};
use log::debug;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use std::process::Command;

/// 預設場景變換門檻
pub const DEFAULT_SCENE_THRESHOLD: f64 = 0.4;

/// 沒有分數標籤時使用的分數
const DEFAULT_SCORE: f64 = 1.0;

#[derive(Deserialize)]
struct FfprobeFrames {
    #[serde(default)]
    frames: Vec<FrameEntry>,
}

#[derive(Deserialize)]
struct FrameEntry {
    pts_time: Option<NumberOrText>,
    pkt_pts_time: Option<NumberOrText>,
    best_effort_timestamp_time: Option<NumberOrText>,
    #[serde(default)]
    tags: HashMap<String, String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum NumberOrText {
    Number(f64),
    Text(String),
}

impl NumberOrText {
    fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            Self::Text(s) => s.trim().parse().ok(),
        }
    }
}

impl FrameEntry {
    /// 依 ffmpeg 版本不同，時間欄位名稱也不同，取第一個可用的
    fn timestamp(&self) -> Option<f64> {
        [
            &self.pts_time,
            &self.pkt_pts_time,
            &self.best_effort_timestamp_time,
        ]
        .into_iter()
        .flatten()
        .find_map(NumberOrText::as_f64)
    }

    fn score(&self) -> f64 {
        self.tags
            .get("lavfi.scene_score")
            .and_then(|s| s.trim().parse().ok())
            .unwrap_or(DEFAULT_SCORE)
    }
}

/// 使用 ffprobe lavfi `select=gt(scene,threshold)` 偵測場景變換
pub struct FfprobeBoundaryDetector {
    ffprobe: String,
    runner: ProcessRunner,
}

impl FfprobeBoundaryDetector {
    #[must_use]
    pub fn new(tools: &AvailableTools, runner: ProcessRunner) -> Self {
        Self {
            ffprobe: tools.ffprobe().to_string(),
            runner,
        }
    }

    fn build_command(&self, source: &Path, threshold: f64) -> Command {
        let graph = format!(
            "movie={},select=gt(scene\\,{threshold})",
            escape_filter_path(source)
        );

        let mut cmd = Command::new(&self.ffprobe);
        cmd.args(["-v", "error", "-f", "lavfi", "-i"])
            .arg(graph)
            .args([
                "-show_entries",
                "frame=pts_time,pkt_pts_time,best_effort_timestamp_time:frame_tags=lavfi.scene_score",
                "-of",
                "json",
            ]);
        cmd
    }
}

impl BoundaryDetector for FfprobeBoundaryDetector {
    fn detect(&self, source: &Path, threshold: f64) -> Result<Vec<SceneChange>, DetectionError> {
        let threshold = threshold.clamp(0.0, 1.0);
        debug!("場景偵測 threshold={threshold}: {}", source.display());

        let output = self
            .runner
            .run(self.build_command(source, threshold))
            .map_err(|e| DetectionError::Tool {
                path: source.to_path_buf(),
                source: e,
            })?;

        parse_scene_frames(&output.stdout).map_err(|e| DetectionError::Parse {
            path: source.to_path_buf(),
            source: e,
        })
    }
}

/// 解析 ffprobe 的 JSON 輸出
fn parse_scene_frames(output: &str) -> Result<Vec<SceneChange>, serde_json::Error> {
    if output.trim().is_empty() {
        return Ok(Vec::new());
    }

    let parsed: FfprobeFrames = serde_json::from_str(output)?;

    let mut scenes: Vec<SceneChange> = parsed
        .frames
        .iter()
        .filter_map(|frame| {
            frame.timestamp().map(|timestamp| SceneChange {
                timestamp,
                score: frame.score(),
            })
        })
        .filter(|scene| scene.timestamp.is_finite() && scene.timestamp >= 0.0)
        .collect();

    scenes.sort_by(|a, b| a.timestamp.total_cmp(&b.timestamp));
    scenes.dedup_by(|a, b| a.timestamp == b.timestamp);

    debug!("偵測到 {} 個場景變換點", scenes.len());
    Ok(scenes)
}

/// 跳脫 lavfi 濾鏡中的檔案路徑
///
/// 路徑同時是濾鏡參數值（第一層）與濾鏡圖的一部分（第二層），兩層都要跳脫
fn escape_filter_path(path: &Path) -> String {
    let raw = path.to_string_lossy();
    let option_level = escape_chars(&raw, &['\\', '\'', ':']);
    escape_chars(&option_level, &['\\', '\'', '[', ']', ',', ';'])
}

fn escape_chars(input: &str, special: &[char]) -> String {
    let mut escaped = String::with_capacity(input.len());
    for c in input.chars() {
        if special.contains(&c) {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}
