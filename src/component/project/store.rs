use super::model::Project;
use anyhow::{Context, Result};
use log::{debug, warn};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

const PROJECT_KEY_PREFIX: &str = "project:";

/// 專案的鍵值儲存，以專案 id 為鍵
pub trait ProjectStore {
    fn get(&self, project_id: &str) -> Result<Option<Project>>;

    /// 原樣寫入，不更新 `updatedAt`
    fn insert(&mut self, project: &Project) -> Result<()>;

    /// 寫入前會更新 `updatedAt`
    fn put(&mut self, project: &mut Project) -> Result<()> {
        project.touch();
        self.insert(project)
    }

    /// 依 `updatedAt` 由新到舊排序
    fn list(&self) -> Result<Vec<Project>>;

    fn delete(&mut self, project_id: &str) -> Result<bool>;
}

fn project_key(project_id: &str) -> String {
    format!("{PROJECT_KEY_PREFIX}{project_id}")
}

/// 以單一 JSON 檔保存所有專案，鍵為 `project:<id>`
///
/// 開啟時整份讀入，每次修改後整份重寫。其他前綴的鍵原樣保留。
#[derive(Debug)]
pub struct JsonFileProjectStore {
    path: PathBuf,
    entries: BTreeMap<String, Value>,
}

impl JsonFileProjectStore {
    pub fn open(path: &Path) -> Result<Self> {
        let entries = if path.exists() {
            let content = fs::read_to_string(path)
                .with_context(|| format!("無法讀取專案資料庫: {}", path.display()))?;

            if content.trim().is_empty() {
                BTreeMap::new()
            } else {
                serde_json::from_str(&content)
                    .with_context(|| format!("無法解析專案資料庫: {}", path.display()))?
            }
        } else {
            BTreeMap::new()
        };

        debug!("載入專案資料庫 {}（{} 筆）", path.display(), entries.len());

        Ok(Self {
            path: path.to_path_buf(),
            entries,
        })
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn save(&self) -> Result<()> {
        let content =
            serde_json::to_string_pretty(&self.entries).context("無法序列化專案資料庫")?;

        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)
                .with_context(|| format!("無法建立目錄: {}", parent.display()))?;
        }

        fs::write(&self.path, content)
            .with_context(|| format!("無法寫入專案資料庫: {}", self.path.display()))?;

        Ok(())
    }
}

impl ProjectStore for JsonFileProjectStore {
    fn get(&self, project_id: &str) -> Result<Option<Project>> {
        let Some(value) = self.entries.get(&project_key(project_id)) else {
            return Ok(None);
        };

        let project = serde_json::from_value(value.clone())
            .with_context(|| format!("專案資料格式錯誤: {project_id}"))?;
        Ok(Some(project))
    }

    fn insert(&mut self, project: &Project) -> Result<()> {
        let value = serde_json::to_value(project).context("無法序列化專案")?;
        self.entries.insert(project_key(&project.id), value);
        self.save()
    }

    fn list(&self) -> Result<Vec<Project>> {
        let mut projects: Vec<Project> = self
            .entries
            .iter()
            .filter(|(key, _)| key.starts_with(PROJECT_KEY_PREFIX))
            .filter_map(|(key, value)| match serde_json::from_value(value.clone()) {
                Ok(project) => Some(project),
                Err(e) => {
                    warn!("略過無法解析的專案 {key}: {e}");
                    None
                }
            })
            .collect();

        projects.sort_by(|a: &Project, b: &Project| b.updated_at.cmp(&a.updated_at));
        Ok(projects)
    }

    fn delete(&mut self, project_id: &str) -> Result<bool> {
        if self.entries.remove(&project_key(project_id)).is_none() {
            return Ok(false);
        }

        self.save()?;
        Ok(true)
    }
}
