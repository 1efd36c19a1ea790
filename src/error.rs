//! 管線各層級的錯誤型別
//!
//! 錯誤依影響範圍分層：
//! - `ExtractionError` 只影響單一片段
//! - `FileFailure` 只影響單一來源檔
//! - `PipelineError` 才會讓整次執行失敗

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// 外部工具（ffmpeg / ffprobe）執行失敗
#[derive(Debug, Error)]
pub enum ToolError {
    #[error("無法啟動 {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },

    #[error("{program} 執行失敗 (exit code {code:?}): {stderr}")]
    Failed {
        program: String,
        code: Option<i32>,
        stderr: String,
    },

    #[error("{program} 執行逾時（{seconds} 秒）")]
    TimedOut { program: String, seconds: u64 },

    #[error("{program} 已被中斷")]
    Cancelled { program: String },

    #[error("等待 {program} 結束時發生錯誤: {source}")]
    Wait {
        program: String,
        #[source]
        source: io::Error,
    },
}

impl ToolError {
    #[must_use]
    pub const fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled { .. })
    }
}

/// 取得影片長度失敗，該檔案會被跳過
#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("無法讀取影片長度 {path}: {source}")]
    Tool {
        path: PathBuf,
        #[source]
        source: ToolError,
    },

    #[error("ffprobe 回傳的長度無法解析 {path}: {output:?}")]
    InvalidOutput { path: PathBuf, output: String },
}

/// 場景偵測失敗，呼叫端會退回「無邊界」繼續處理
#[derive(Debug, Error)]
pub enum DetectionError {
    #[error("場景偵測失敗 {path}: {source}")]
    Tool {
        path: PathBuf,
        #[source]
        source: ToolError,
    },

    #[error("無法解析場景偵測輸出 {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// 片段擷取失敗，只影響該片段
#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("片段擷取失敗 {output}: {source}")]
    Tool {
        output: PathBuf,
        #[source]
        source: ToolError,
    },

    #[error("ffmpeg 已結束但輸出檔案不存在或為空: {output}")]
    MissingOutput { output: PathBuf },

    #[error("無法整理輸出檔案 {output}: {source}")]
    Io {
        output: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("片段擷取已中斷: {output}")]
    Cancelled { output: PathBuf },
}

/// 單一來源檔無法產生任何片段的原因
#[derive(Debug, Error)]
pub enum FileFailure {
    #[error(transparent)]
    ProbeFailed(#[from] ProbeError),

    #[error("影片長度 {total_duration:.2}s 無法切出至少 {min_duration:.2}s 的片段")]
    BuildInfeasible {
        total_duration: f64,
        min_duration: f64,
    },

    #[error("處理已中斷")]
    Cancelled,
}

/// 整次執行層級的錯誤
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("找不到必要的外部工具: {}", .0.join(", "))]
    ToolsUnavailable(Vec<String>),

    #[error("所有 {files} 個輸入檔案都沒有產生任何片段")]
    NoClipsProduced { files: usize },

    #[error("設定值無效: {0}")]
    InvalidConfig(String),

    #[error("無法輸出專案檔 {path}: {message}")]
    ExportFailed { path: PathBuf, message: String },

    #[error("處理已被使用者中斷")]
    Cancelled,
}

impl PipelineError {
    /// 對應的程序結束碼
    #[must_use]
    pub const fn exit_code(&self) -> u8 {
        match self {
            Self::InvalidConfig(_) => 1,
            Self::NoClipsProduced { .. } => 2,
            Self::ExportFailed { .. } => 3,
            Self::ToolsUnavailable(_) => 4,
            Self::Cancelled => 130,
        }
    }
}
