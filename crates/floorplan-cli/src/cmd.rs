use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use floorplan_core::config::PIXELS_PER_METER;
use floorplan_core::geometry::pixels_to_meters;
use floorplan_core::storage::{FileStorage, LAST_DOCUMENT_KEY, Storage};
use floorplan_core::{PlanStats, ProjectDocument};
use serde::Serialize;

use crate::args::{Cli, Command};

pub fn dispatch(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Info { file } => info(&file, cli.json),
        Command::Validate { file } => validate(&file, cli.json),
        Command::List { dir } => list(dir, cli.json),
        Command::New { name, dir } => new(&name, dir, cli.json),
    }
}

#[derive(Debug, Serialize)]
struct InfoOut {
    id: String,
    name: String,
    #[serde(flatten)]
    stats: PlanStats,
    wall_length_m: f64,
}

#[derive(Debug, Serialize)]
struct ValidateOut {
    file: String,
    valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

#[derive(Debug, Serialize)]
struct NewOut {
    id: String,
    name: String,
    dir: String,
}

fn read_document(path: &Path) -> Result<ProjectDocument> {
    let json = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    ProjectDocument::from_json(&json).with_context(|| format!("parsing {}", path.display()))
}

fn open_storage(dir: Option<PathBuf>) -> Result<FileStorage> {
    let storage = match dir {
        Some(dir) => FileStorage::new(dir)?,
        None => FileStorage::default_location()?,
    };
    Ok(storage)
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn info(file: &Path, json: bool) -> Result<()> {
    let document = read_document(file)?;
    let plan = document.to_floor_plan()?;
    let stats = plan.stats();
    let out = InfoOut {
        id: document.id,
        name: document.name,
        wall_length_m: pixels_to_meters(stats.wall_length, PIXELS_PER_METER),
        stats,
    };

    if json {
        return print_json(&out);
    }
    println!("{} ({})", out.name, out.id);
    println!("  nodes:    {}", out.stats.nodes);
    println!("  walls:    {} ({:.2} m)", out.stats.segments, out.wall_length_m);
    println!("  doors:    {}", out.stats.doors);
    println!("  windows:  {}", out.stats.windows);
    println!("  images:   {}", out.stats.images);
    println!("  texts:    {}", out.stats.texts);
    Ok(())
}

fn validate(file: &Path, json: bool) -> Result<()> {
    let document = read_document(file)?;
    let result = document.state.validate();
    if json {
        print_json(&ValidateOut {
            file: file.display().to_string(),
            valid: result.is_ok(),
            error: result.as_ref().err().map(ToString::to_string),
        })?;
    } else if result.is_ok() {
        println!("{}: ok", file.display());
    }
    result.with_context(|| format!("{} is not a valid project", file.display()))
}

/// Saved project ids, without the auto-save bookkeeping entry.
fn project_ids(storage: &FileStorage) -> Result<Vec<String>> {
    let mut ids = pollster::block_on(storage.list())?;
    ids.retain(|id| id != LAST_DOCUMENT_KEY);
    Ok(ids)
}

fn list(dir: Option<PathBuf>, json: bool) -> Result<()> {
    let storage = open_storage(dir)?;
    let ids = project_ids(&storage)?;
    if json {
        return print_json(&ids);
    }
    if ids.is_empty() {
        println!("no projects in {}", storage.base_path().display());
    }
    for id in ids {
        println!("{id}");
    }
    Ok(())
}

fn new(name: &str, dir: Option<PathBuf>, json: bool) -> Result<()> {
    let storage = open_storage(dir)?;
    let document = ProjectDocument::new(name);
    pollster::block_on(storage.save(&document.id, &document))?;
    log::info!("Created project '{}' ({})", document.name, document.id);

    let out = NewOut {
        id: document.id,
        name: document.name,
        dir: storage.base_path().display().to_string(),
    };
    if json {
        return print_json(&out);
    }
    println!("{}", out.id);
    Ok(())
}
