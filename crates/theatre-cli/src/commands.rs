use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL_CONDENSED;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};
use tracing::{info, info_span};

use theatre_persistence::write_atomic;
use theatre_studio::{InitializeOptions, OnDiskState, ProjectId, StudioConfig, StudioStore};

use crate::cli::ExportArgs;

/// Where the persisted studio state lives.
#[derive(Debug, Clone)]
pub struct StoreOptions {
    /// Config file. When unset, the default location is used if it exists.
    pub config: Option<PathBuf>,
    pub state_dir: Option<PathBuf>,
    pub key: String,
}

/// One row of the `projects` listing.
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectSummary {
    pub id: ProjectId,
    pub sheets: usize,
    pub tracks: usize,
    pub keyframes: usize,
    pub revisions: usize,
    pub latest_revision: Option<String>,
}

impl ProjectSummary {
    fn new(id: ProjectId, state: &OnDiskState) -> Self {
        Self {
            id,
            sheets: state.sheets_by_id.len(),
            tracks: state.sequence_tracks().count(),
            keyframes: state.keyframe_count(),
            revisions: state.revision_history.len(),
            latest_revision: state.revision_history.last().cloned(),
        }
    }
}

pub fn load_config(options: &StoreOptions) -> Result<StudioConfig> {
    let mut config = match &options.config {
        Some(path) => StudioConfig::load(path)
            .with_context(|| format!("load config {}", path.display()))?,
        None => {
            let path = StudioConfig::default_path();
            if path.is_file() {
                StudioConfig::load(&path)
                    .with_context(|| format!("load config {}", path.display()))?
            } else {
                StudioConfig::default()
            }
        }
    };
    if let Some(dir) = &options.state_dir {
        config.persistence.directory.clone_from(dir);
    }
    Ok(config)
}

/// Open a store over the persisted state named by `options`.
pub fn open_store(options: &StoreOptions) -> Result<StudioStore> {
    let config = load_config(options)?;
    let mut store = StudioStore::new(config);
    store
        .initialize(&InitializeOptions::persistent(options.key.as_str()))
        .context("initialize studio store")?;
    Ok(store)
}

pub fn project_summaries(store: &StudioStore) -> Result<Vec<ProjectSummary>> {
    store
        .project_ids()
        .into_iter()
        .filter_map(|id| match store.project_state(&id) {
            Ok(Some(state)) => Some(Ok(ProjectSummary::new(id, &state))),
            Ok(None) => None,
            Err(err) => Some(Err(anyhow::Error::new(err).context(format!("read project {id}")))),
        })
        .collect()
}

pub fn run_projects(options: &StoreOptions) -> Result<()> {
    let store = open_store(options)?;
    let summaries = project_summaries(&store)?;
    if summaries.is_empty() {
        println!("No projects in {}", options.key);
        return Ok(());
    }
    println!("{}", projects_table(&summaries));
    Ok(())
}

pub fn projects_table(summaries: &[ProjectSummary]) -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Project"),
        header_cell("Sheets"),
        header_cell("Tracks"),
        header_cell("Keyframes"),
        header_cell("Revisions"),
        header_cell("Latest revision"),
    ]);
    apply_table_style(&mut table);
    for index in 1..=4 {
        if let Some(column) = table.column_mut(index) {
            column.set_cell_alignment(CellAlignment::Right);
        }
    }
    for summary in summaries {
        table.add_row(vec![
            Cell::new(summary.id.as_str()).add_attribute(Attribute::Bold),
            Cell::new(summary.sheets),
            Cell::new(summary.tracks),
            Cell::new(summary.keyframes),
            Cell::new(summary.revisions),
            match &summary.latest_revision {
                Some(revision) => Cell::new(revision),
                None => Cell::new("-").fg(Color::DarkGrey),
            },
        ]);
    }
    table
}

fn header_cell(label: &str) -> Cell {
    Cell::new(label)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(120);
}

/// Write a project's save file and persist the revision it was stamped with.
/// Returns the path written.
pub fn run_export(options: &StoreOptions, args: &ExportArgs) -> Result<PathBuf> {
    let project_id: ProjectId = args
        .project_id
        .parse()
        .with_context(|| format!("invalid project id {:?}", args.project_id))?;
    let span = info_span!("export", project_id = %project_id);
    let _guard = span.enter();

    let mut store = open_store(options)?;
    let content = store
        .create_content_of_save_file(&project_id)
        .with_context(|| format!("export project {project_id}"))?;
    let json = content.to_json_pretty().context("serialize save file")?;

    let output = args
        .output
        .clone()
        .unwrap_or_else(|| default_output(&project_id));
    write_save_file(&output, &json)?;
    store.flush().context("persist studio state")?;

    info!(
        output = %output.display(),
        revision = content.revision_history.last().map_or("-", String::as_str),
        keyframes = content.keyframe_count(),
        "save file written"
    );
    Ok(output)
}

fn default_output(project_id: &ProjectId) -> PathBuf {
    PathBuf::from(format!("{project_id}.theatre-project.json"))
}

fn write_save_file(path: &Path, json: &str) -> Result<()> {
    write_atomic(path, json.as_bytes())
        .with_context(|| format!("write save file {}", path.display()))
}
