use super::export::{export_project_to_file, import_project_from_file};
use super::model::Project;
use super::store::{JsonFileProjectStore, ProjectStore};
use anyhow::{Context, Result};
use console::style;
use log::info;
use rust_i18n::t;
use std::path::Path;

/// 專案資料庫的檢視與管理
pub struct ProjectManager {
    store: JsonFileProjectStore,
}

impl ProjectManager {
    pub fn open(store_path: &Path) -> Result<Self> {
        Ok(Self {
            store: JsonFileProjectStore::open(store_path)?,
        })
    }

    pub fn list(&self) -> Result<Vec<Project>> {
        let projects = self.store.list()?;

        println!("{}", style(t!("projects.list_title")).cyan().bold());
        if projects.is_empty() {
            println!("{}", style(t!("projects.empty")).yellow());
            return Ok(projects);
        }

        for project in &projects {
            let stats = project.completion_stats();
            println!(
                "  {} {}  {}",
                style(&project.id).dim(),
                style(&project.title).bold(),
                t!(
                    "projects.list_entry",
                    scenes = project.scenes.len(),
                    duration = project.format_total_duration(),
                    percentage = stats.percentage,
                    updated = project.updated_at.as_str()
                )
            );
        }

        Ok(projects)
    }

    pub fn show(&self, project_id: &str) -> Result<Project> {
        let project = self.require(project_id)?;

        println!("{}", style(&project.title).cyan().bold());
        println!(
            "{}",
            style(t!(
                "projects.show_header",
                id = project.id.as_str(),
                created = project.created_at.as_str(),
                updated = project.updated_at.as_str()
            ))
            .dim()
        );
        println!(
            "{}",
            t!(
                "projects.show_totals",
                scenes = project.scenes.len(),
                duration = project.format_total_duration()
            )
        );

        for (index, scene) in project.scenes.iter().enumerate() {
            let media = scene
                .media
                .iter()
                .map(|m| m.url.as_str())
                .collect::<Vec<_>>()
                .join(", ");
            let marker = if scene.is_completed {
                style("✓").green()
            } else {
                style("·").dim()
            };

            println!(
                "  {} {:>3}. {} [{}] {}",
                marker,
                index + 1,
                scene.title,
                scene.format_duration(),
                style(media).dim()
            );
        }

        Ok(project)
    }

    pub fn delete(&mut self, project_id: &str) -> Result<()> {
        if !self.store.delete(project_id)? {
            anyhow::bail!(t!("projects.not_found", id = project_id).to_string());
        }

        info!("已刪除專案 {project_id}");
        println!(
            "{} {}",
            style("✓").green(),
            t!("projects.deleted", id = project_id)
        );
        Ok(())
    }

    pub fn export(&self, project_id: &str, output_file: &Path) -> Result<()> {
        let project = self.require(project_id)?;
        export_project_to_file(&project, output_file)?;

        println!(
            "{} {}",
            style("✓").green(),
            t!(
                "projects.exported",
                path = output_file.display().to_string()
            )
        );
        Ok(())
    }

    pub fn import(&mut self, input_file: &Path) -> Result<Project> {
        let mut project = import_project_from_file(input_file)?;
        self.store
            .put(&mut project)
            .with_context(|| format!("無法匯入專案: {}", input_file.display()))?;

        info!("已匯入專案 {} ({})", project.id, project.title);
        println!(
            "{} {}",
            style("✓").green(),
            t!("projects.imported", id = project.id.as_str())
        );
        Ok(project)
    }

    fn require(&self, project_id: &str) -> Result<Project> {
        self.store
            .get(project_id)?
            .ok_or_else(|| anyhow::anyhow!(t!("projects.not_found", id = project_id).to_string()))
    }
}
