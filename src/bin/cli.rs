use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};
use dotenvy::dotenv;
use serde_json::json;

use hr_access::app::AppState;
use hr_access::authz::templates::resolve_with_source;
use hr_access::authz::{actions, Actor};
use hr_access::catalog::canonical_key;
use hr_access::config::AppConfig;

#[derive(Parser, Debug)]
#[command(author, version, about = "hr-access permission resolution tool", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print the module catalog and action vocabulary
    Catalog,
    /// Resolve an actor record (JSON file) into canonical permissions
    Resolve {
        #[arg(long)]
        actor: PathBuf,
    },
    /// Check whether an actor may perform an action on a module
    Check {
        #[arg(long)]
        actor: PathBuf,
        #[arg(long)]
        module: String,
        #[arg(long, default_value = actions::VIEW)]
        action: String,
    },
    /// Resolve the active menu entry for a navigation path
    Menu {
        #[arg(long)]
        actor: PathBuf,
        #[arg(long)]
        path: String,
        #[arg(long, default_value = "")]
        query: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Try to load env from CWD, then fall back to the crate-local `.env`.
    if dotenv().is_err() {
        let crate_env = std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join(".env");
        let _ = dotenvy::from_path(crate_env);
    }

    let cli = Cli::parse();
    let config = AppConfig::from_env().context("invalid configuration")?;
    let state = AppState::from_config(&config).context("failed to build authorization engine")?;

    let output = match cli.command {
        Commands::Catalog => {
            let catalog = state.engine.catalog();
            json!({
                "modules": catalog.modules(),
                "actions": catalog.actions(),
            })
        }
        Commands::Resolve { actor } => {
            let actor = read_actor(&actor)?;
            let resolution = resolve_with_source(&state.engine, state.templates.as_ref(), &actor).await;
            json!({
                "role": actor.canonical_role(),
                "permissions": resolution.permissions,
                "sources": resolution.sources,
                "unrestricted": resolution.unrestricted,
            })
        }
        Commands::Check { actor, module, action } => {
            let actor = read_actor(&actor)?;
            let resolution = resolve_with_source(&state.engine, state.templates.as_ref(), &actor).await;
            let module = canonical_key(&module);
            let action = canonical_key(&action);
            json!({
                "allowed": state.engine.has_action(&resolution.permissions, &module, &action),
                "can_view": state.engine.can_view(&resolution.permissions, &module),
                "module": module,
                "action": action,
            })
        }
        Commands::Menu { actor, path, query } => {
            let actor = read_actor(&actor)?;
            let resolution = resolve_with_source(&state.engine, state.templates.as_ref(), &actor).await;
            let active = state.engine.active_menu(&path, &query, &resolution.permissions);
            serde_json::to_value(active)?
        }
    };

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn read_actor(path: &Path) -> anyhow::Result<Actor> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read actor record {}", path.display()))?;
    serde_json::from_str(&raw)
        .with_context(|| format!("invalid actor record in {}", path.display()))
}
