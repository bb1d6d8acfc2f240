use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use inventory_navigator::actions::{builtin, ActionKind, ActionRegistry, ActionRegistryBuilder};
use inventory_navigator::api::{self, AppState};
use inventory_navigator::config::Config;
use inventory_navigator::models::InventoryObjectRef;
use inventory_navigator::tree::{
    render_tree, ContainmentRelation, ExpandedTree, HierarchicalTreeProvider,
};

#[derive(Parser)]
#[command(name = "invnav")]
#[command(about = "Navigate network inventory containment trees and object actions")]
struct Cli {
    /// SQLite database file (overrides INVNAV_DB_PATH)
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP API server
    Serve {
        /// Port for HTTP API (overrides INVNAV_PORT)
        #[arg(short, long)]
        port: Option<u16>,
    },
    /// Print the containment tree below an object
    Tree {
        /// Class of the root object
        class: String,
        /// Id of the root object
        id: String,
        /// Follow special relationships instead of containment
        #[arg(long)]
        special: bool,
        /// Levels to expand below the root
        #[arg(short, long, default_value = "2")]
        depth: usize,
    },
    /// List the actions offered for a class
    Actions {
        /// Class of the selected object; omit for actions that apply to any class
        class: Option<String>,
        /// Restrict to one kind: misc, delete or relationship_management
        #[arg(short, long)]
        kind: Option<String>,
        /// Include actions declared for superclasses
        #[arg(short, long)]
        recursive: bool,
    },
    /// Apply pending database migrations
    Migrate,
}

/// Initialize tracing with output to stderr (for commands that print results) or stdout
fn init_tracing(use_stderr: bool) {
    let filter = tracing_subscriber::EnvFilter::new(
        std::env::var("RUST_LOG")
            .unwrap_or_else(|_| "inventory_navigator=debug,tower_http=debug".into()),
    );

    if use_stderr {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }
}

fn build_registry() -> Arc<ActionRegistry> {
    let mut builder = ActionRegistryBuilder::new();
    builtin::register_core_actions(&mut builder);
    builder.freeze()
}

async fn serve(config: Config) -> anyhow::Result<()> {
    tracing::info!("Starting inventory navigator on port {}", config.port);

    let db = config.open_database()?;
    let state = AppState::new(db, build_registry()).with_page_limit(config.page_limit);
    let app = api::create_router(state);

    let listener = tokio::net::TcpListener::bind(format!("127.0.0.1:{}", config.port)).await?;
    tracing::info!(
        "Inventory navigator listening on http://127.0.0.1:{}",
        config.port
    );

    axum::serve(listener, app).await?;
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Commands that print to stdout keep it clean of log lines
    let use_stderr = matches!(
        cli.command,
        Some(Commands::Tree { .. }) | Some(Commands::Actions { .. })
    );
    init_tracing(use_stderr);

    let mut config = Config::from_env();
    if let Some(db) = cli.db {
        config.db_path = Some(db);
    }

    match cli.command {
        Some(Commands::Serve { port }) => {
            if let Some(port) = port {
                config.port = port;
            }
            serve(config).await?;
        }
        Some(Commands::Tree {
            class,
            id,
            special,
            depth,
        }) => {
            let db = config.open_database()?;
            let root = db.get_object(&class, &id)?;
            let relation = if special {
                ContainmentRelation::Special
            } else {
                ContainmentRelation::Regular
            };

            let provider =
                HierarchicalTreeProvider::new(&db, InventoryObjectRef::from(&root), relation)
                    .with_limit(config.page_limit);
            tracing::debug!(
                "Expanding {} tree below {} to depth {}",
                provider.relation().as_str(),
                provider.root(),
                depth
            );
            let snapshot = ExpandedTree::new(provider).snapshot(depth);
            print!("{}", render_tree(&snapshot));
        }
        Some(Commands::Actions {
            class,
            kind,
            recursive,
        }) => {
            let kinds = match kind {
                Some(kind) => vec![ActionKind::from_str(&kind)
                    .ok_or_else(|| anyhow::anyhow!("Unknown action kind: {}", kind))?],
                None => ActionKind::ALL.to_vec(),
            };
            let class_name = class.unwrap_or_default();
            let registry = build_registry();
            let db = if recursive {
                Some(config.open_database()?)
            } else {
                None
            };

            for kind in kinds {
                let actions = match &db {
                    Some(db) => registry.get_actions_applicable_to_recursive(kind, &class_name, db),
                    None => registry
                        .get_actions_applicable_to(kind, &class_name)
                        .to_vec(),
                };
                for registered in actions {
                    println!(
                        "{:<24} {:<22} {} ({})",
                        kind.as_str(),
                        registered.module_id,
                        registered.action.label,
                        registered.action.id
                    );
                }
            }
        }
        Some(Commands::Migrate) => {
            config.open_database()?;
            tracing::info!("Database is up to date");
        }
        None => serve(config).await?,
    }

    Ok(())
}
