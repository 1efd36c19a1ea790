use crate::config::save::save_settings;
use crate::config::{Config, Language};
use crate::menu::handlers::{run_project_browser, run_scene_splitter};
use anyhow::Result;
use console::{Term, style};
use dialoguer::theme::ColorfulTheme;
use dialoguer::{Input, Select};
use rust_i18n::t;
use std::sync::Arc;
use std::sync::atomic::AtomicBool;

pub fn show_main_menu(
    term: &Term,
    shutdown_signal: &Arc<AtomicBool>,
    config: &mut Config,
) -> Result<bool> {
    term.clear_screen()?;

    println!("{}", style(t!("main_menu.title")).cyan().bold());
    println!("{}", style(t!("common.esc_hint")).dim());

    let options = vec![
        t!("main_menu.opt_split"),
        t!("main_menu.opt_projects"),
        t!("main_menu.opt_settings"),
        t!("main_menu.exit"),
    ];

    let selection = Select::with_theme(&ColorfulTheme::default())
        .with_prompt(t!("main_menu.prompt"))
        .items(&options)
        .default(0)
        .interact_on_opt(term)?;

    match selection {
        Some(0) => {
            run_scene_splitter(term, shutdown_signal, config)?;
            Ok(true)
        }
        Some(1) => {
            run_project_browser(term, config)?;
            Ok(true)
        }
        Some(2) => {
            show_settings_menu(term, config)?;
            Ok(true)
        }
        Some(3) | None => Ok(false), // ESC 也視為離開
        _ => unreachable!(),
    }
}

/// 設定選單
fn show_settings_menu(term: &Term, config: &mut Config) -> Result<()> {
    loop {
        term.clear_screen()?;

        println!("{}", style(t!("settings.title")).cyan().bold());
        println!("{}", style(t!("common.esc_hint")).dim());

        let splitter = &config.settings.scene_splitter;
        println!(
            "\n{}",
            style(t!(
                "settings.current",
                min = splitter.min_segment_seconds,
                threshold = splitter.scene_threshold,
                language = config.settings.language.to_string()
            ))
            .dim()
        );
        println!();

        let options = vec![
            t!("settings.opt_min_segment"),
            t!("settings.opt_threshold"),
            t!("settings.opt_language"),
            t!("settings.back"),
        ];

        let selection = Select::with_theme(&ColorfulTheme::default())
            .with_prompt(t!("settings.prompt"))
            .items(&options)
            .default(0)
            .interact_on_opt(term)?;

        match selection {
            Some(0) => edit_min_segment(config)?,
            Some(1) => edit_scene_threshold(config)?,
            Some(2) => show_language_menu(term, config)?,
            Some(3) | None => break,
            _ => unreachable!(),
        }
    }

    Ok(())
}

fn edit_min_segment(config: &mut Config) -> Result<()> {
    let current = config.settings.scene_splitter.min_segment_seconds;

    let value: f64 = Input::with_theme(&ColorfulTheme::default())
        .with_prompt(t!("settings.prompt_min_segment"))
        .default(current)
        .validate_with(|v: &f64| {
            if v.is_finite() && *v > 0.0 {
                Ok(())
            } else {
                Err(t!("settings.invalid_min_segment").to_string())
            }
        })
        .interact_text()?;

    if (value - current).abs() > f64::EPSILON {
        config.settings.scene_splitter.min_segment_seconds = value;
        save_and_confirm(config, &value.to_string())?;
    }

    Ok(())
}

fn edit_scene_threshold(config: &mut Config) -> Result<()> {
    let current = config.settings.scene_splitter.scene_threshold;

    let value: f64 = Input::with_theme(&ColorfulTheme::default())
        .with_prompt(t!("settings.prompt_threshold"))
        .default(current)
        .validate_with(|v: &f64| {
            if (0.0..=1.0).contains(v) {
                Ok(())
            } else {
                Err(t!("settings.invalid_threshold").to_string())
            }
        })
        .interact_text()?;

    if (value - current).abs() > f64::EPSILON {
        config.settings.scene_splitter.scene_threshold = value;
        save_and_confirm(config, &value.to_string())?;
    }

    Ok(())
}

/// 語言設定選單
fn show_language_menu(term: &Term, config: &mut Config) -> Result<()> {
    term.clear_screen()?;

    println!("{}", style(t!("settings.language.title")).cyan().bold());
    println!("{}", style(t!("common.esc_hint")).dim());

    let items: Vec<String> = Language::ALL.iter().map(ToString::to_string).collect();

    let default_index = Language::ALL
        .iter()
        .position(|&l| l == config.settings.language)
        .unwrap_or(0);

    let selection = Select::with_theme(&ColorfulTheme::default())
        .with_prompt(t!("settings.language.prompt"))
        .items(&items)
        .default(default_index)
        .interact_on_opt(term)?;

    let Some(selection) = selection else {
        return Ok(());
    };

    let selected_lang = Language::ALL[selection];

    if selected_lang != config.settings.language {
        config.settings.language = selected_lang;
        rust_i18n::set_locale(selected_lang.as_str());
        save_and_confirm(config, &selected_lang.to_string())?;
    }

    Ok(())
}

fn save_and_confirm(config: &Config, value: &str) -> Result<()> {
    save_settings(&config.settings)?;
    println!("\n{} {}", style(t!("settings.saved")).green(), value);
    std::thread::sleep(std::time::Duration::from_secs(1));
    Ok(())
}
