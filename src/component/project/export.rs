use super::model::{Project, now_timestamp};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

pub const EXPORT_VERSION: &str = "1.0";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportMetadata {
    pub exported_at: String,
    pub version: String,
    pub total_scenes: usize,
    /// 所有場景 `audioDuration` 的總和（秒）
    pub total_duration: u64,
}

/// 匯出檔格式：`{ "project": ..., "metadata": ... }`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectExport {
    pub project: Project,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<ExportMetadata>,
}

impl ProjectExport {
    #[must_use]
    pub fn new(project: Project) -> Self {
        let metadata = ExportMetadata {
            exported_at: now_timestamp(),
            version: EXPORT_VERSION.to_string(),
            total_scenes: project.scenes.len(),
            total_duration: project
                .scenes
                .iter()
                .filter_map(|s| s.audio_duration)
                .sum(),
        };

        Self {
            project,
            metadata: Some(metadata),
        }
    }
}

/// 寫出格式化的 JSON，必要時建立上層目錄
pub fn export_project_to_file(project: &Project, output_file: &Path) -> Result<()> {
    if let Some(parent) = output_file.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)
            .with_context(|| format!("無法建立目錄: {}", parent.display()))?;
    }

    let export = ProjectExport::new(project.clone());
    let content = serde_json::to_string_pretty(&export).context("無法序列化專案")?;

    fs::write(output_file, content)
        .with_context(|| format!("無法寫入專案檔: {}", output_file.display()))?;

    Ok(())
}

/// 讀取匯出檔；也接受沒有外層包裝的專案 JSON
pub fn import_project_from_file(input_file: &Path) -> Result<Project> {
    let content = fs::read_to_string(input_file)
        .with_context(|| format!("無法讀取專案檔: {}", input_file.display()))?;

    if let Ok(export) = serde_json::from_str::<ProjectExport>(&content) {
        return Ok(export.project);
    }

    serde_json::from_str::<Project>(&content)
        .with_context(|| format!("無法解析專案檔: {}", input_file.display()))
}
