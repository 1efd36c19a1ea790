use crate::component::scene_splitter::{DEFAULT_PROJECT_FILE, SplitRequest};
use crate::component::{ProjectManager, SceneSplitter};
use crate::config::save::{add_recent_path, save_settings};
use crate::config::Config;
use crate::pause;
use anyhow::Result;
use console::{Term, style};
use dialoguer::theme::ColorfulTheme;
use dialoguer::{Confirm, Input, Select};
use log::warn;
use rust_i18n::t;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::AtomicBool;

pub fn run_scene_splitter(
    term: &Term,
    shutdown_signal: &Arc<AtomicBool>,
    config: &mut Config,
) -> Result<()> {
    term.clear_screen()?;

    let Some(inputs) = prompt_input_paths(config)? else {
        return Ok(());
    };

    let mut request = SplitRequest::new(
        inputs.iter().map(PathBuf::from).collect(),
        config.settings.scene_splitter.clone(),
    );

    request.project_title = Input::with_theme(&ColorfulTheme::default())
        .with_prompt(t!("split.prompt_title"))
        .default(request.project_title.clone())
        .interact_text()?
        .trim()
        .to_string();

    let project_dir: String = Input::with_theme(&ColorfulTheme::default())
        .with_prompt(t!("split.prompt_project_dir"))
        .default(request.project_dir.display().to_string())
        .interact_text()?;
    request.project_dir = PathBuf::from(project_dir.trim());
    request.output_file = request.project_dir.join(DEFAULT_PROJECT_FILE);
    request.store_path = Some(config.settings.project_store_path.clone());

    for path in &inputs {
        add_recent_path(&mut config.settings, path);
    }
    if let Err(e) = save_settings(&config.settings) {
        warn!("無法儲存最近使用的路徑: {e:#}");
    }

    let splitter = SceneSplitter::new(config.clone(), Arc::clone(shutdown_signal));
    if let Err(e) = splitter.run(&request) {
        eprintln!("{} {}", style(t!("common.error_prefix")).red().bold(), e);
    }

    pause(term)?;
    Ok(())
}

pub fn run_project_browser(term: &Term, config: &Config) -> Result<()> {
    term.clear_screen()?;

    let manager = ProjectManager::open(&config.settings.project_store_path)?;
    let projects = manager.list()?;

    if projects.is_empty() {
        pause(term)?;
        return Ok(());
    }

    println!();
    let items: Vec<String> = projects
        .iter()
        .map(|p| format!("{} ({})", p.title, p.id))
        .collect();

    let selection = Select::with_theme(&ColorfulTheme::default())
        .with_prompt(t!("projects.prompt_show"))
        .items(&items)
        .default(0)
        .interact_on_opt(term)?;

    if let Some(index) = selection {
        println!();
        manager.show(&projects[index].id)?;
        pause(term)?;
    }

    Ok(())
}

/// 依序輸入一或多個影片或資料夾路徑，ESC 返回
fn prompt_input_paths(config: &Config) -> Result<Option<Vec<String>>> {
    let mut paths: Vec<String> = Vec::new();

    loop {
        let Some(path) = prompt_single_path(&config.settings.recent_paths)? else {
            break;
        };

        if path.is_empty() {
            break;
        }
        if !Path::new(&path).exists() {
            println!(
                "{} {}",
                style("✗").red(),
                t!("split.path_missing", path = path.as_str())
            );
            continue;
        }

        paths.push(path);

        let more = Confirm::with_theme(&ColorfulTheme::default())
            .with_prompt(t!("split.prompt_add_more"))
            .default(false)
            .interact()?;
        if !more {
            break;
        }
    }

    Ok((!paths.is_empty()).then_some(paths))
}

fn prompt_single_path(recent_paths: &[String]) -> Result<Option<String>> {
    if recent_paths.is_empty() {
        return prompt_new_path().map(Some);
    }

    let mut options: Vec<String> = recent_paths
        .iter()
        .enumerate()
        .map(|(i, p)| {
            let indicator = if Path::new(p).exists() { "✓" } else { "✗" };
            format!("{} [{}] {}", i + 1, indicator, p)
        })
        .collect();
    options.push(t!("split.enter_new_path").to_string());

    println!("{}", style(t!("common.esc_hint")).dim());

    let selection = Select::with_theme(&ColorfulTheme::default())
        .with_prompt(t!("split.prompt_select_path"))
        .items(&options)
        .default(0)
        .interact_opt()?;

    match selection {
        None => Ok(None),
        Some(idx) if idx < recent_paths.len() => Ok(Some(recent_paths[idx].clone())),
        Some(_) => prompt_new_path().map(Some),
    }
}

fn prompt_new_path() -> Result<String> {
    let path: String = Input::with_theme(&ColorfulTheme::default())
        .with_prompt(t!("split.prompt_input_path"))
        .interact_text()?;
    Ok(path.trim().to_string())
}
