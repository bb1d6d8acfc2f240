//! Versioned schema for the inventory store.
//!
//! Each migration runs in its own transaction together with the row that
//! records it in `schema_migrations`, so a failed migration leaves neither
//! its tables nor its version behind.

use std::collections::HashSet;

use anyhow::{Context, Result};
use rusqlite::Connection;

struct Migration {
    version: &'static str,
    name: &'static str,
    sql: &'static str,
}

const MIGRATIONS: &[Migration] = &[
    Migration {
        version: "001",
        name: "initial",
        sql: include_str!("migrations/001_initial.sql"),
    },
    Migration {
        version: "002",
        name: "special_relationships",
        sql: include_str!("migrations/002_special_relationships.sql"),
    },
    Migration {
        version: "003",
        name: "pools",
        sql: include_str!("migrations/003_pools.sql"),
    },
];

const CREATE_LEDGER: &str = "CREATE TABLE IF NOT EXISTS schema_migrations (
    version TEXT PRIMARY KEY,
    name TEXT NOT NULL,
    applied_at TEXT NOT NULL
)";

pub fn run_migrations(conn: &Connection) -> Result<()> {
    let applied = apply_pending(conn, MIGRATIONS)?;
    if applied > 0 {
        tracing::info!("Inventory schema upgraded by {} migration(s)", applied);
    }
    Ok(())
}

/// Apply every migration not yet recorded, in slice order. Returns how many ran.
fn apply_pending(conn: &Connection, migrations: &[Migration]) -> Result<usize> {
    conn.execute_batch(CREATE_LEDGER)
        .context("Failed to create schema_migrations table")?;
    let done = applied_versions(conn)?;

    let pending: Vec<&Migration> = migrations
        .iter()
        .filter(|m| !done.contains(m.version))
        .collect();

    for migration in &pending {
        tracing::info!("Applying migration {} ({})", migration.version, migration.name);

        let tx = conn.unchecked_transaction()?;
        tx.execute_batch(migration.sql).with_context(|| {
            format!("Migration {} ({}) failed", migration.version, migration.name)
        })?;
        tx.execute(
            "INSERT INTO schema_migrations (version, name, applied_at) VALUES (?, ?, ?)",
            (
                migration.version,
                migration.name,
                chrono::Utc::now().to_rfc3339(),
            ),
        )?;
        tx.commit()?;
    }

    Ok(pending.len())
}

fn applied_versions(conn: &Connection) -> Result<HashSet<String>> {
    let mut stmt = conn.prepare("SELECT version FROM schema_migrations")?;
    let versions = stmt
        .query_map([], |row| row.get(0))?
        .collect::<Result<HashSet<String>, _>>()?;
    Ok(versions)
}
