use crate::error::PipelineError;
use log::{debug, info};
use std::process::{Command, Stdio};

/// 已確認可執行的外部工具
///
/// 只能透過 [`AvailableTools::check`] 取得，ffmpeg 相關元件的建構子都要求這個值，
/// 確保工具檢查在啟動時只做一次。
#[derive(Debug, Clone)]
pub struct AvailableTools {
    ffmpeg: String,
    ffprobe: String,
}

impl AvailableTools {
    pub fn check() -> Result<Self, PipelineError> {
        Self::check_programs("ffmpeg", "ffprobe")
    }

    pub fn check_programs(ffmpeg: &str, ffprobe: &str) -> Result<Self, PipelineError> {
        let missing: Vec<String> = [ffmpeg, ffprobe]
            .into_iter()
            .filter(|program| !is_runnable(program))
            .map(str::to_string)
            .collect();

        if !missing.is_empty() {
            return Err(PipelineError::ToolsUnavailable(missing));
        }

        info!("外部工具檢查通過: {ffmpeg}, {ffprobe}");

        Ok(Self {
            ffmpeg: ffmpeg.to_string(),
            ffprobe: ffprobe.to_string(),
        })
    }

    #[must_use]
    pub fn ffmpeg(&self) -> &str {
        &self.ffmpeg
    }

    #[must_use]
    pub fn ffprobe(&self) -> &str {
        &self.ffprobe
    }
}

fn is_runnable(program: &str) -> bool {
    let runnable = Command::new(program)
        .arg("-version")
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .is_ok_and(|status| status.success());

    debug!("檢查 {program}: {runnable}");
    runnable
}
