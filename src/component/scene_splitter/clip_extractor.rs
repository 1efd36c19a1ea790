use super::models::{ClipDescriptor, TimeInterval};
use super::oracle::ClipExtractor;
use crate::config::ClipEncodingSettings;
use crate::error::ExtractionError;
use crate::tools::{AvailableTools, ProcessRunner};
use log::{debug, warn};
use regex::Regex;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::LazyLock;

/// 片段輸出副檔名
pub const CLIP_EXTENSION: &str = "mp4";

static REGEX_ILLEGAL_CHARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"[<>:"/\\|?*\[\]\x00-\x1f]"#).expect("Invalid regex"));

static REGEX_MULTIPLE_SPACES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("Invalid regex"));

/// 使用 ffmpeg 重新編碼擷取片段
///
/// `-ss`/`-to` 放在 `-i` 前並搭配重新編碼，切點與來源的關鍵幀位置無關。
/// 輸出先寫到 `.partial` 檔，成功後才改名，失敗或中斷時刪除。
pub struct FfmpegClipExtractor {
    ffmpeg: String,
    runner: ProcessRunner,
    encoding: ClipEncodingSettings,
}

impl FfmpegClipExtractor {
    #[must_use]
    pub fn new(tools: &AvailableTools, runner: ProcessRunner, encoding: ClipEncodingSettings) -> Self {
        Self {
            ffmpeg: tools.ffmpeg().to_string(),
            runner,
            encoding,
        }
    }

    fn build_command(&self, source: &Path, interval: TimeInterval, output: &Path) -> Command {
        let mut cmd = Command::new(&self.ffmpeg);
        cmd.args(["-hide_banner", "-nostdin", "-loglevel", "error", "-y"])
            .args(["-ss", &format_timestamp(interval.start)])
            .args(["-to", &format_timestamp(interval.end)])
            .arg("-i")
            .arg(source)
            .args(["-c:v", &self.encoding.video_codec])
            .args(["-preset", &self.encoding.preset])
            .args(["-crf", &self.encoding.crf.to_string()])
            .args(["-c:a", &self.encoding.audio_codec])
            .args(["-b:a", &self.encoding.audio_bitrate])
            .arg(output);
        cmd
    }
}

impl ClipExtractor for FfmpegClipExtractor {
    fn extract(
        &self,
        source: &Path,
        interval: TimeInterval,
        output: &Path,
    ) -> Result<ClipDescriptor, ExtractionError> {
        let partial = partial_path(output);
        discard_file(&partial);

        debug!(
            "擷取片段 [{:.3}, {:.3}) {} -> {}",
            interval.start,
            interval.end,
            source.display(),
            output.display()
        );

        if let Err(e) = self
            .runner
            .run(self.build_command(source, interval, &partial))
        {
            discard_file(&partial);
            return Err(if e.is_cancelled() {
                ExtractionError::Cancelled {
                    output: output.to_path_buf(),
                }
            } else {
                ExtractionError::Tool {
                    output: output.to_path_buf(),
                    source: e,
                }
            });
        }

        let written = fs::metadata(&partial).is_ok_and(|m| m.is_file() && m.len() > 0);
        if !written {
            discard_file(&partial);
            return Err(ExtractionError::MissingOutput {
                output: output.to_path_buf(),
            });
        }

        fs::rename(&partial, output).map_err(|source| {
            discard_file(&partial);
            ExtractionError::Io {
                output: output.to_path_buf(),
                source,
            }
        })?;

        Ok(ClipDescriptor::new(
            source.to_path_buf(),
            output.to_path_buf(),
            interval,
        ))
    }
}

/// ffmpeg `-ss` / `-to` 使用的定點秒數格式
#[must_use]
pub fn format_timestamp(seconds: f64) -> String {
    format!("{seconds:.3}")
}

/// 為每個輸入檔決定不重複的輸出檔名前綴
///
/// 在任何平行處理開始前完成，確保每個片段的輸出路徑唯一
#[must_use]
pub fn plan_clip_stems(sources: &[PathBuf]) -> Vec<String> {
    let mut assigned: HashSet<String> = HashSet::new();

    sources
        .iter()
        .map(|source| {
            let base = sanitize_stem(source);
            let stem = (1..)
                .map(|n| {
                    if n == 1 {
                        base.clone()
                    } else {
                        format!("{base}_{n}")
                    }
                })
                .find(|candidate| !assigned.contains(candidate))
                .unwrap_or_else(|| base.clone());

            assigned.insert(stem.clone());
            stem
        })
        .collect()
}

/// `<media_dir>/<stem>_scene_<NNN>.mp4`
#[must_use]
pub fn clip_output_path(media_dir: &Path, stem: &str, index: usize) -> PathBuf {
    media_dir.join(format!("{stem}_scene_{index:03}.{CLIP_EXTENSION}"))
}

fn sanitize_stem(source: &Path) -> String {
    let stem = source
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default();

    let cleaned = REGEX_ILLEGAL_CHARS.replace_all(&stem, "_");
    let cleaned = REGEX_MULTIPLE_SPACES.replace_all(cleaned.trim(), "_");

    if cleaned.is_empty() {
        "video".to_string()
    } else {
        cleaned.into_owned()
    }
}

fn partial_path(output: &Path) -> PathBuf {
    let stem = output
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| "clip".to_string());

    let name = match output.extension() {
        Some(ext) => format!("{stem}.partial.{}", ext.to_string_lossy()),
        None => format!("{stem}.partial"),
    };

    output.with_file_name(name)
}

fn discard_file(path: &Path) {
    if path.exists()
        && let Err(e) = fs::remove_file(path)
    {
        warn!("無法刪除未完成的輸出檔案 {}: {}", path.display(), e);
    }
}
