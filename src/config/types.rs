use crate::component::scene_splitter::DEFAULT_SCENE_THRESHOLD;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::path::{Path, PathBuf};

pub const MAX_RECENT_PATHS: usize = 10;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileTypeTable {
    #[serde(rename = "VIDEO_FILE")]
    pub video_file: Vec<String>,
}

impl FileTypeTable {
    #[must_use]
    pub fn video_extensions_set(&self) -> HashSet<String> {
        self.video_file
            .iter()
            .map(|ext| ext.to_lowercase())
            .collect()
    }

    #[must_use]
    pub fn is_video_file(&self, path: &Path) -> bool {
        let video_extensions = self.video_extensions_set();
        path.extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| video_extensions.contains(&format!(".{}", ext.to_lowercase())))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Language {
    #[default]
    #[serde(rename = "en-US")]
    English,
    #[serde(rename = "zh-TW")]
    TraditionalChinese,
}

impl Language {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::English => "en-US",
            Self::TraditionalChinese => "zh-TW",
        }
    }

    pub const ALL: [Self; 2] = [Self::English, Self::TraditionalChinese];
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::English => write!(f, "English"),
            Self::TraditionalChinese => write!(f, "繁體中文"),
        }
    }
}

/// 片段重新編碼參數（擷取時一律重新編碼以對齊影格）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClipEncodingSettings {
    pub video_codec: String,
    pub preset: String,
    pub crf: u8,
    pub audio_codec: String,
    pub audio_bitrate: String,
}

impl Default for ClipEncodingSettings {
    fn default() -> Self {
        Self {
            video_codec: "libx264".to_string(),
            preset: "veryfast".to_string(),
            crf: 23,
            audio_codec: "aac".to_string(),
            audio_bitrate: "128k".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneSplitterSettings {
    /// 片段最短長度（秒）
    pub min_segment_seconds: f64,
    /// 場景變換分數門檻 (0-1)，越低越敏感
    pub scene_threshold: f64,
    /// 平行處理數量，`None` 表示使用 CPU 核心數
    pub max_workers: Option<usize>,
    /// 單一外部程序的逾時秒數
    pub clip_timeout_seconds: Option<u64>,
    pub encoding: ClipEncodingSettings,
}

impl Default for SceneSplitterSettings {
    fn default() -> Self {
        Self {
            min_segment_seconds: 5.0,
            scene_threshold: DEFAULT_SCENE_THRESHOLD,
            max_workers: None,
            clip_timeout_seconds: None,
            encoding: ClipEncodingSettings::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UserSettings {
    pub language: Language,
    pub recent_paths: Vec<String>,
    pub project_store_path: PathBuf,
    pub scene_splitter: SceneSplitterSettings,
}

impl Default for UserSettings {
    fn default() -> Self {
        Self {
            language: Language::default(),
            recent_paths: Vec::new(),
            project_store_path: PathBuf::from("scene_projects.json"),
            scene_splitter: SceneSplitterSettings::default(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub file_type_table: FileTypeTable,
    pub settings: UserSettings,
}
