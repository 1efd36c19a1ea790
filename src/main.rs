use anyhow::Result;
use clap::Parser;
use console::{Term, style};
use log::{error, info, warn};
use rust_i18n::t;
use scene_splitter::cli::{Cli, Commands, ProjectCommands, SplitArgs, StoreArgs};
use scene_splitter::component::scene_splitter::{DEFAULT_PROJECT_FILE, SplitRequest};
use scene_splitter::component::{ProjectManager, SceneSplitter};
use scene_splitter::config::Config;
use scene_splitter::error::PipelineError;
use scene_splitter::init;
use scene_splitter::menu::show_main_menu;
use scene_splitter::signal::{is_shutdown_requested, setup_shutdown_signal};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::sync::atomic::AtomicBool;

rust_i18n::i18n!("locales", fallback = "en-US");

fn main() -> ExitCode {
    let cli = Cli::parse();
    init::init(cli.verbose);

    let shutdown_signal = match setup_shutdown_signal() {
        Ok(signal) => signal,
        Err(e) => {
            eprintln!("{} {e:#}", style(t!("common.error_prefix")).red().bold());
            return ExitCode::FAILURE;
        }
    };

    match run(cli, &shutdown_signal) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e:#}");
            eprintln!("{} {e:#}", style(t!("common.error_prefix")).red().bold());

            let code = if is_shutdown_requested(&shutdown_signal) {
                PipelineError::Cancelled.exit_code()
            } else {
                e.downcast_ref::<PipelineError>()
                    .map_or(1, PipelineError::exit_code)
            };
            ExitCode::from(code)
        }
    }
}

fn run(cli: Cli, shutdown_signal: &Arc<AtomicBool>) -> Result<()> {
    let mut config = Config::new()?;
    rust_i18n::set_locale(config.settings.language.as_str());

    match cli.command.unwrap_or(Commands::Interactive) {
        Commands::Split(args) => run_split(&args, config, shutdown_signal),
        Commands::Projects(command) => run_projects(command, &config),
        Commands::Interactive => run_interactive(shutdown_signal, &mut config),
    }
}

fn run_split(args: &SplitArgs, config: Config, shutdown_signal: &Arc<AtomicBool>) -> Result<()> {
    let settings = args.apply_overrides(&config.settings.scene_splitter);
    let mut request = SplitRequest::new(args.videos.clone(), settings);

    if let Some(title) = &args.project_title {
        request.project_title.clone_from(title);
    }
    if let Some(dir) = &args.project_dir {
        request.project_dir.clone_from(dir);
    }
    request.output_file = args
        .output_file
        .clone()
        .unwrap_or_else(|| request.project_dir.join(DEFAULT_PROJECT_FILE));
    request.store_path = if args.no_store {
        None
    } else {
        Some(store_path(args.store.as_ref(), &config))
    };

    let splitter = SceneSplitter::new(config, Arc::clone(shutdown_signal));
    let outcome = splitter.run(&request)?;

    info!(
        "完成：{} 個場景，{} 個片段失敗",
        outcome.project.scenes.len(),
        outcome.summary.segments_failed
    );
    Ok(())
}

fn run_projects(command: ProjectCommands, config: &Config) -> Result<()> {
    match command {
        ProjectCommands::List(StoreArgs { store }) => {
            ProjectManager::open(&store_path(store.as_ref(), config))?.list()?;
        }
        ProjectCommands::Show { id, store } => {
            ProjectManager::open(&store_path(store.store.as_ref(), config))?.show(&id)?;
        }
        ProjectCommands::Delete { id, store } => {
            ProjectManager::open(&store_path(store.store.as_ref(), config))?.delete(&id)?;
        }
        ProjectCommands::Export { id, file, store } => {
            ProjectManager::open(&store_path(store.store.as_ref(), config))?.export(&id, &file)?;
        }
        ProjectCommands::Import { file, store } => {
            ProjectManager::open(&store_path(store.store.as_ref(), config))?.import(&file)?;
        }
    }

    Ok(())
}

fn run_interactive(shutdown_signal: &Arc<AtomicBool>, config: &mut Config) -> Result<()> {
    let term = Term::stdout();

    loop {
        match show_main_menu(&term, shutdown_signal, config) {
            Ok(true) => {}
            Ok(false) => {
                term.clear_screen()?;
                println!("\n{}", style(t!("main_menu.goodbye")).green().bold());
                info!("程式正常結束");
                break;
            }
            Err(e) => {
                warn!("程式錯誤: {e}");
                return Err(e);
            }
        }
    }

    Ok(())
}

fn store_path(explicit: Option<&PathBuf>, config: &Config) -> PathBuf {
    explicit.map_or_else(
        || config.settings.project_store_path.clone(),
        Clone::clone,
    )
}
