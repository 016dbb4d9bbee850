mod cli;
mod config;
mod db;
mod error;
mod models;
mod report;
mod store;
mod tracker;

use anyhow::{Context, Result};
use chrono::{DateTime, Local, Utc};
use clap::Parser;
use dotenv::dotenv;
use log::{debug, info};
use std::io::{self, Write};
use std::process::ExitCode;

use cli::{Cli, Commands, ConfigAction};
use config::EffectiveConfig;
use db::Database;
use error::{parse_reference, TrackerError};
use report::render::Renderer;
use report::style::Palette;
use store::Store;

const NO_PROJECTS: &str = "No projects. Start one with `tk start <name>`";

fn main() -> ExitCode {
    dotenv().ok();
    env_logger::init();

    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) if err.downcast_ref::<TrackerError>() == Some(&TrackerError::NoProjects) => {
            println!("{}", NO_PROJECTS);
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("error: {:#}", err);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    if let Some(Commands::Config { action }) = &cli.command {
        return match action {
            ConfigAction::Init => cmd_config_init(),
            ConfigAction::Edit => cmd_config_edit(),
            ConfigAction::Show => cmd_config_show(),
        };
    }

    let config = EffectiveConfig::load()?;
    let palette = if cli.no_color {
        Palette::plain()
    } else {
        Palette::from_settings(&config.colors)
    };

    let db = Database::new(&config.database_path);
    info!("Using database {}", db.path().display());
    let loaded = db.load()?;
    let mut store = loaded.clone();

    let now = Local::now();
    let stdout = io::stdout();
    let mut out = stdout.lock();
    let mut renderer = Renderer::new(&mut out, &palette, now);

    dispatch(cli.command, &mut store, &mut renderer, &config, now)?;
    out.flush().context("Failed to flush output")?;

    if store.same_projects(&loaded) {
        debug!("Store unchanged, not writing");
    } else {
        db.save(&store)?;
    }

    Ok(())
}

fn dispatch<W: Write>(
    command: Option<Commands>,
    store: &mut Store,
    renderer: &mut Renderer<'_, W>,
    config: &EffectiveConfig,
    now: DateTime<Local>,
) -> Result<()> {
    let now_utc = now.with_timezone(&Utc);

    match command {
        None => {
            let project = store.current().ok_or(TrackerError::NoProjects)?;
            renderer.current(project)
        }
        Some(Commands::New { name }) => {
            let event = tracker::create(store, name.as_deref().unwrap_or_default(), now_utc)?;
            renderer.events(store, &[event])
        }
        Some(Commands::Start { target }) => {
            let target = tracker::resolve_target(store, target.as_deref(), now_utc)?;
            let events = tracker::start(store, target, now_utc)?;
            renderer.events(store, &events)
        }
        Some(Commands::Stop) => {
            let event = tracker::stop(store, now_utc);
            renderer.events(store, &[event])
        }
        Some(Commands::Toggle { target }) => {
            let target = tracker::resolve_target(store, target.as_deref(), now_utc)?;
            let events = tracker::toggle(store, target, now_utc)?;
            renderer.events(store, &events)
        }
        Some(Commands::List {
            all,
            all_archived,
            limit,
        }) => {
            let limit = if all || all_archived {
                None
            } else {
                Some(limit.unwrap_or(config.list_limit))
            };
            renderer.list(&store.list(all_archived), all_archived, limit)
        }
        Some(Commands::Archive { refs }) => {
            let mut events = Vec::new();
            for id in resolve_all(store, &refs)? {
                events.extend(tracker::toggle_archive(store, id, now_utc)?);
            }
            renderer.events(store, &events)
        }
        Some(Commands::Remove { all, refs }) => {
            let ids = if all {
                store.projects().iter().map(|p| p.id).collect()
            } else {
                resolve_all(store, &refs)?
            };
            let mut events = Vec::new();
            for id in ids {
                events.push(tracker::remove(store, id)?);
            }
            renderer.events(store, &events)
        }
        Some(Commands::Week) => renderer.week(&store.list(false)),
        Some(Commands::Config { .. }) => Ok(()),
    }
}

/// Turn reference arguments into project IDs, defaulting to reference 0
fn resolve_all(store: &Store, refs: &[String]) -> Result<Vec<i64>, TrackerError> {
    if refs.is_empty() {
        return Ok(vec![store.find(0)?.id]);
    }

    refs.iter()
        .map(|arg| -> Result<i64, TrackerError> {
            let reference = parse_reference(arg)?;
            Ok(store.find(reference)?.id)
        })
        .collect()
}

fn cmd_config_init() -> Result<()> {
    let path = config::init_global_config()?;
    println!("Configuration initialized at: {}", path.display());
    Ok(())
}

fn cmd_config_edit() -> Result<()> {
    let path = config::init_global_config()?;

    let editor = std::env::var("EDITOR").unwrap_or_else(|_| "vim".to_string());

    std::process::Command::new(&editor)
        .arg(&path)
        .status()
        .with_context(|| format!("Failed to open editor: {}", editor))?;

    Ok(())
}

fn cmd_config_show() -> Result<()> {
    let config = config::load_global_config()?;
    let toml = toml::to_string_pretty(&config)?;
    println!("{}", toml);
    Ok(())
}
