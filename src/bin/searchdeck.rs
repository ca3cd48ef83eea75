//! searchdeck CLI
//!
//! Usage:
//!   searchdeck list
//!   searchdeck --select-tag music panel
//!   searchdeck --select 0,2 --set 0=42 go --count 3
//!   searchdeck save my-queries.json
//!   searchdeck reset

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use serde_json::json;
use tracing::{info, warn};
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, reload, EnvFilter};

use searchdeck::config::LoggingSettings;
use searchdeck::templates::{Destination, SourceFormat};
use searchdeck::{
    Composer, ComposerView, EntryId, FileTemplateStore, InputEdit, InputPanel, Intent, Settings,
    TagSelection, TemplateStore, TagTarget,
};

#[derive(Parser)]
#[command(name = "searchdeck")]
#[command(version)]
#[command(about = "Compose randomized search queries from tagged templates")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Settings file (defaults to SEARCHDECK_CONFIG, then ./searchdeck.yaml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Read templates from this file instead of the configured store
    #[arg(long, global = true)]
    templates: Option<PathBuf>,

    /// Comma-separated template indices to select (default: all)
    #[arg(long, global = true)]
    select: Option<String>,

    /// Select every template carrying this tag (repeatable)
    #[arg(long = "select-tag", global = true)]
    select_tags: Vec<String>,

    /// Deselect every template carrying this tag (repeatable)
    #[arg(long = "deselect-tag", global = true)]
    deselect_tags: Vec<String>,

    /// Pin a panel entry to a value, as entry=value (repeatable)
    #[arg(long = "set", global = true, value_parser = parse_assignment)]
    assignments: Vec<(EntryId, String)>,

    /// Seed for reproducible random choices
    #[arg(long, global = true)]
    seed: Option<u64>,

    /// Output format
    #[arg(long, short = 'o', global = true, default_value = "text", value_enum)]
    format: OutputFormat,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Json,
    Text,
}

#[derive(Subcommand)]
enum Commands {
    /// List templates, the selection and tag states
    List,

    /// Show the merged input panel for the selection
    Panel,

    /// Generate destinations from randomly picked selected templates
    Go {
        /// Number of destinations to generate
        #[arg(long, short = 'n', default_value_t = 1)]
        count: usize,
    },

    /// Store a template file as the custom source
    Save { file: PathBuf },

    /// Remove the custom source and go back to the default
    Reset,
}

fn parse_assignment(s: &str) -> Result<(EntryId, String), String> {
    let pos = s
        .find('=')
        .ok_or_else(|| format!("Invalid entry=value pair: {}", s))?;
    let entry = s[..pos]
        .parse::<EntryId>()
        .map_err(|e| format!("Invalid entry '{}': {}", &s[..pos], e))?;
    Ok((entry, s[pos + 1..].to_string()))
}

/// Prints destinations as they are generated
struct TerminalView {
    format: OutputFormat,
}

impl ComposerView for TerminalView {
    fn open(&mut self, destination: &Destination) {
        match self.format {
            OutputFormat::Text => println!("{}", destination.url),
            OutputFormat::Json => println!(
                "{}",
                json!({
                    "template": destination.template,
                    "query": destination.query,
                    "url": destination.url.as_str(),
                })
            ),
        }
    }
}

fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    // RUST_LOG wins; otherwise start at the default filter and switch to the
    // configured one once settings are loaded
    let env_filter = EnvFilter::try_from_default_env().ok();
    let from_env = env_filter.is_some();
    let (filter, filter_handle) = reload::Layer::new(
        env_filter.unwrap_or_else(|| EnvFilter::new(LoggingSettings::default().filter)),
    );
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();

    let settings = match &cli.config {
        Some(path) => {
            let mut settings = Settings::load(path)?;
            settings.apply_overrides(|key| std::env::var(key).ok());
            settings
        }
        None => Settings::from_env()?,
    };

    if !from_env {
        let configured =
            EnvFilter::try_new(&settings.logging.filter).context("Invalid logging filter")?;
        filter_handle
            .reload(configured)
            .context("Failed to apply logging filter")?;
        info!("Logging filter set to '{}'", settings.logging.filter);
    }

    let store = FileTemplateStore::from_settings(&settings.templates);
    match &cli.command {
        Commands::Save { file } => {
            let text = std::fs::read_to_string(file)
                .with_context(|| format!("Failed to read {}", file.display()))?;
            store.save_custom(&text)?;
            println!("Saved custom templates to {}", store.custom_path().display());
            return Ok(());
        }
        Commands::Reset => {
            store.reset()?;
            println!("Reverted to the default templates");
            return Ok(());
        }
        Commands::List | Commands::Panel | Commands::Go { .. } => {}
    }

    let (source, format) = match &cli.templates {
        Some(path) => (
            std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read {}", path.display()))?,
            SourceFormat::from_path(path),
        ),
        None => {
            let stored = store.load()?;
            (stored.text, stored.format)
        }
    };

    let target = settings.destination_target()?;
    let mut composer = match cli.seed {
        Some(seed) => Composer::with_seed(target, seed),
        None => Composer::new(target),
    };
    let mut view = TerminalView { format: cli.format };

    composer.dispatch(Intent::LoadSource { source, format }, &mut view)?;
    // Tag selections start from nothing unless indices were given too
    match &cli.select {
        Some(csv) => {
            composer.dispatch(Intent::SelectIndices(csv.clone()), &mut view)?;
        }
        None if !cli.select_tags.is_empty() => {
            composer.dispatch(Intent::DeselectAll, &mut view)?;
        }
        None => {}
    }
    for tag in &cli.select_tags {
        composer.dispatch(
            Intent::SetTag {
                tag: tag.clone(),
                target: TagTarget::Select,
            },
            &mut view,
        )?;
    }
    for tag in &cli.deselect_tags {
        composer.dispatch(
            Intent::SetTag {
                tag: tag.clone(),
                target: TagTarget::Deselect,
            },
            &mut view,
        )?;
    }
    for (entry, value) in &cli.assignments {
        composer.dispatch(
            Intent::SetInput {
                entry: *entry,
                edit: InputEdit::Randomize(false),
            },
            &mut view,
        )?;
        composer.dispatch(
            Intent::SetInput {
                entry: *entry,
                edit: InputEdit::Value(value.clone()),
            },
            &mut view,
        )?;
    }

    match cli.command {
        Commands::List => print_list(&composer, cli.format),
        Commands::Panel => print_panel(&composer, cli.format),
        Commands::Go { count } => {
            generate_destinations(&mut composer, count, &mut view)?;
        }
        Commands::Save { .. } | Commands::Reset => {}
    }
    Ok(())
}

/// Generate up to `count` destinations; nothing selected is not an error
fn generate_destinations(
    composer: &mut Composer,
    count: usize,
    view: &mut dyn ComposerView,
) -> Result<usize> {
    if composer.selection().is_empty() {
        warn!("No templates selected, nothing to generate");
        return Ok(0);
    }
    let mut generated = 0;
    for _ in 0..count {
        if composer.dispatch(Intent::Generate, view)?.destination.is_some() {
            generated += 1;
        }
    }
    Ok(generated)
}

fn tag_marker(state: TagSelection) -> &'static str {
    match state {
        TagSelection::AllSelected => "[x]",
        TagSelection::SomeSelected => "[-]",
        TagSelection::NoneSelected => "[ ]",
    }
}

fn print_list(composer: &Composer, format: OutputFormat) {
    let registry = composer.registry();
    let selection = composer.selection();
    match format {
        OutputFormat::Json => {
            let templates: Vec<_> = registry
                .iter()
                .enumerate()
                .map(|(index, template)| {
                    json!({
                        "index": index,
                        "name": template.name(),
                        "query": template.query_pattern(),
                        "tags": template.tags(),
                        "selected": selection.contains(index),
                    })
                })
                .collect();
            println!(
                "{}",
                json!({
                    "title": selection.title(registry),
                    "templates": templates,
                    "tags": composer.tags(),
                })
            );
        }
        OutputFormat::Text => {
            println!("Selected: {}", selection.title(registry));
            println!();
            for (index, template) in registry.iter().enumerate() {
                let marker = if selection.contains(index) { "[x]" } else { "[ ]" };
                println!("{} {:>3}  {}", marker, index, template.display_label());
            }
            if !composer.tags().is_empty() {
                println!();
                for tag in composer.tags() {
                    println!("{} {}", tag_marker(tag.state), tag.display_label());
                }
            }
        }
    }
}

fn print_panel(composer: &Composer, format: OutputFormat) {
    let panel = composer.panel();
    match format {
        OutputFormat::Json => {
            let entries: Vec<_> = panel
                .entries()
                .iter()
                .map(|entry| {
                    let state = composer.widget(entry.id());
                    json!({
                        "entry": entry.id().index(),
                        "type": entry.descriptor().kind().type_name(),
                        "placeholder": entry.descriptor().placeholder(),
                        "range": entry.descriptor().range_label(),
                        "required_by": entry.required_by(),
                        "randomize": state.map(|s| s.randomize),
                        "value": state.map(|s| s.explicit.clone()),
                    })
                })
                .collect();
            println!("{}", json!({ "entries": entries }));
        }
        OutputFormat::Text => {
            if panel.is_empty() {
                println!("{}", InputPanel::EMPTY_MESSAGE);
                return;
            }
            for entry in panel.entries() {
                let mode = match composer.widget(entry.id()) {
                    Some(state) if !state.randomize => format!("= {}", state.explicit),
                    _ => "random".to_string(),
                };
                println!(
                    "{:>3}  {}  {}",
                    entry.id().index(),
                    entry.descriptor().range_label(),
                    mode
                );
                println!("     {}", entry.used_by_label());
            }
        }
    }
}
