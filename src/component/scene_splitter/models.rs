use serde::Serialize;
use std::path::PathBuf;

/// 半開區間 `[start, end)`，單位為秒
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TimeInterval {
    pub start: f64,
    pub end: f64,
}

impl TimeInterval {
    /// 只接受 `0 <= start < end` 的有限值
    #[must_use]
    pub fn new(start: f64, end: f64) -> Option<Self> {
        (start.is_finite() && end.is_finite() && start >= 0.0 && start < end)
            .then_some(Self { start, end })
    }

    #[must_use]
    pub fn duration(&self) -> f64 {
        self.end - self.start
    }
}

/// 切割完成的片段，`index` 從 1 開始
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Segment {
    pub index: usize,
    pub interval: TimeInterval,
}

/// 成功擷取的片段紀錄
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClipDescriptor {
    pub source_path: PathBuf,
    pub output_path: PathBuf,
    pub interval: TimeInterval,
    pub duration_seconds: u64,
}

impl ClipDescriptor {
    #[must_use]
    pub fn new(source_path: PathBuf, output_path: PathBuf, interval: TimeInterval) -> Self {
        Self {
            source_path,
            output_path,
            interval,
            duration_seconds: interval.duration().round().max(0.0) as u64,
        }
    }
}
