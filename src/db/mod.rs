mod schema;

use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard};

use anyhow::Result;
use chrono::Utc;
use rusqlite::{Connection, OptionalExtension, Row};
use uuid::Uuid;

use crate::directory::{BusinessObjectDirectory, DirectoryError, DirectoryResult, SubclassOracle};
use crate::models::*;

/// Upper bound on containment and inheritance walks, guards against cycles
/// written directly into the database.
const MAX_HIERARCHY_DEPTH: usize = 256;

const OBJECT_COLUMNS: &str =
    "id, class_name, name, parent_class, parent_id, pool_id, created_at";

const CLASS_COLUMNS: &str = "name, parent_name, display_name, is_abstract, created_at";

/// SQLite-backed business object directory and class metadata store.
pub struct Database {
    conn: Arc<Mutex<Connection>>,
}

impl Database {
    pub fn open(path: PathBuf) -> Result<Self> {
        let parent = path
            .parent()
            .ok_or_else(|| anyhow::anyhow!("Database path has no parent directory"))?;
        std::fs::create_dir_all(parent)?;
        let conn = Connection::open(&path)?;
        conn.pragma_update(None, "journal_mode", "WAL")?;
        tracing::debug!("Opened inventory database at {}", path.display());
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub fn default_path() -> Result<PathBuf> {
        let dirs = directories::ProjectDirs::from("", "", "inventory-navigator")
            .ok_or_else(|| anyhow::anyhow!("Could not determine data directory"))?;
        Ok(dirs.data_dir().join("inventory.db"))
    }

    pub fn open_default() -> Result<Self> {
        Self::open(Self::default_path()?)
    }

    pub fn open_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub fn migrate(&self) -> Result<()> {
        let conn = self.lock();
        schema::run_migrations(&conn)
    }

    fn lock(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().expect("database lock poisoned")
    }

    // ============================================================
    // Class operations
    // ============================================================

    pub fn create_class(&self, input: CreateClassInput) -> DirectoryResult<InventoryClass> {
        let name = input.name.trim().to_string();
        if name.is_empty() {
            return Err(DirectoryError::InvalidArgument(
                "Class name cannot be empty".to_string(),
            ));
        }

        let conn = self.lock();
        if class_exists(&conn, &name)? {
            return Err(DirectoryError::InvalidArgument(format!(
                "Class {} already exists",
                name
            )));
        }
        if let Some(parent) = &input.parent_name {
            if !class_exists(&conn, parent)? {
                return Err(DirectoryError::MetadataNotFound(parent.clone()));
            }
        }

        let now = Utc::now();
        conn.execute(
            "INSERT INTO classes (name, parent_name, display_name, is_abstract, created_at)
             VALUES (?, ?, ?, ?, ?)",
            (
                &name,
                &input.parent_name,
                &input.display_name,
                input.is_abstract as i32,
                now.to_rfc3339(),
            ),
        )?;

        Ok(InventoryClass {
            name,
            parent_name: input.parent_name,
            display_name: input.display_name,
            is_abstract: input.is_abstract,
            created_at: now,
        })
    }

    pub fn get_class(&self, name: &str) -> DirectoryResult<Option<InventoryClass>> {
        let conn = self.lock();
        find_class(&conn, name)
    }

    pub fn get_all_classes(&self) -> DirectoryResult<Vec<InventoryClass>> {
        let conn = self.lock();
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM classes ORDER BY name",
            CLASS_COLUMNS
        ))?;
        let classes = stmt
            .query_map([], class_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(classes)
    }

    /// Direct subclasses of a class, ordered by name.
    pub fn get_subclasses(&self, name: &str) -> DirectoryResult<Vec<InventoryClass>> {
        let conn = self.lock();
        if !class_exists(&conn, name)? {
            return Err(DirectoryError::MetadataNotFound(name.to_string()));
        }
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM classes WHERE parent_name = ? ORDER BY name",
            CLASS_COLUMNS
        ))?;
        let classes = stmt
            .query_map([name], class_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(classes)
    }

    // ============================================================
    // Object operations
    // ============================================================

    pub fn create_object(&self, input: CreateObjectInput) -> DirectoryResult<BusinessObject> {
        if input.name.trim().is_empty() {
            return Err(DirectoryError::InvalidArgument(
                "Object name cannot be empty".to_string(),
            ));
        }

        let conn = self.lock();
        let class = find_class(&conn, &input.class_name)?
            .ok_or_else(|| DirectoryError::MetadataNotFound(input.class_name.clone()))?;
        if class.is_abstract {
            return Err(DirectoryError::InvalidArgument(format!(
                "Class {} is abstract and cannot be instantiated",
                class.name
            )));
        }

        match (&input.parent_class, &input.parent_id) {
            (Some(parent_class), Some(parent_id)) => {
                require_object(&conn, parent_class, parent_id)?;
            }
            (None, None) => {}
            _ => {
                return Err(DirectoryError::InvalidArgument(
                    "Parent class and parent id must be given together".to_string(),
                ));
            }
        }

        let id = Uuid::new_v4().to_string();
        let now = Utc::now();
        conn.execute(
            "INSERT INTO objects (id, class_name, name, parent_class, parent_id, created_at)
             VALUES (?, ?, ?, ?, ?, ?)",
            (
                &id,
                &input.class_name,
                &input.name,
                &input.parent_class,
                &input.parent_id,
                now.to_rfc3339(),
            ),
        )?;

        tracing::debug!("Created {} {} ({})", input.class_name, input.name, id);

        Ok(BusinessObject {
            id,
            class_name: input.class_name,
            name: input.name,
            parent_class: input.parent_class,
            parent_id: input.parent_id,
            pool_id: None,
            created_at: now,
        })
    }

    pub fn get_object(&self, class_name: &str, id: &str) -> DirectoryResult<BusinessObject> {
        let conn = self.lock();
        require_object(&conn, class_name, id)
    }

    /// Delete a leaf object together with the special relationships touching it.
    pub fn delete_object(&self, class_name: &str, id: &str) -> DirectoryResult<()> {
        let conn = self.lock();
        let tx = conn.unchecked_transaction()?;
        require_object(&tx, class_name, id)?;

        let children: i64 = tx.query_row(
            "SELECT COUNT(*) FROM objects WHERE parent_class = ? AND parent_id = ?",
            (class_name, id),
            |row| row.get(0),
        )?;
        if children > 0 {
            return Err(DirectoryError::InvalidArgument(format!(
                "{} {} still contains {} object(s)",
                class_name, id, children
            )));
        }

        let relationships = tx.execute(
            "DELETE FROM special_relationships
             WHERE (source_class = ?1 AND source_id = ?2) OR (target_class = ?1 AND target_id = ?2)",
            (class_name, id),
        )?;
        tx.execute(
            "DELETE FROM objects WHERE class_name = ? AND id = ?",
            (class_name, id),
        )?;
        tx.commit()?;

        tracing::debug!(
            "Deleted {} {} and {} special relationship(s)",
            class_name,
            id,
            relationships
        );
        Ok(())
    }

    // ============================================================
    // Special relationship operations
    // ============================================================

    pub fn create_special_relationship(
        &self,
        source_class: &str,
        source_id: &str,
        input: CreateRelationshipInput,
    ) -> DirectoryResult<SpecialRelationship> {
        if input.name.trim().is_empty() {
            return Err(DirectoryError::InvalidArgument(
                "Relationship name cannot be empty".to_string(),
            ));
        }

        let conn = self.lock();
        let source = require_object(&conn, source_class, source_id)?;
        let target = require_object(&conn, &input.target_class, &input.target_id)?;

        let id = Uuid::new_v4().to_string();
        let now = Utc::now();
        conn.execute(
            "INSERT INTO special_relationships
             (id, name, source_class, source_id, target_class, target_id, created_at)
             VALUES (?, ?, ?, ?, ?, ?, ?)",
            (
                &id,
                &input.name,
                &source.class_name,
                &source.id,
                &target.class_name,
                &target.id,
                now.to_rfc3339(),
            ),
        )?;

        Ok(SpecialRelationship {
            id,
            name: input.name,
            source: InventoryObjectRef::from(&source),
            target: InventoryObjectRef::from(&target),
            created_at: now,
        })
    }

    // ============================================================
    // Pool operations
    // ============================================================

    pub fn create_pool(&self, input: CreatePoolInput) -> DirectoryResult<Pool> {
        if input.name.trim().is_empty() {
            return Err(DirectoryError::InvalidArgument(
                "Pool name cannot be empty".to_string(),
            ));
        }

        let conn = self.lock();
        if !class_exists(&conn, &input.class_name)? {
            return Err(DirectoryError::MetadataNotFound(input.class_name));
        }

        let id = Uuid::new_v4().to_string();
        let now = Utc::now();
        conn.execute(
            "INSERT INTO pools (id, name, description, class_name, created_at)
             VALUES (?, ?, ?, ?, ?)",
            (
                &id,
                &input.name,
                &input.description,
                &input.class_name,
                now.to_rfc3339(),
            ),
        )?;

        Ok(Pool {
            id,
            name: input.name,
            description: input.description,
            class_name: input.class_name,
            created_at: now,
        })
    }

    pub fn get_pools(&self) -> DirectoryResult<Vec<Pool>> {
        let conn = self.lock();
        let mut stmt = conn.prepare(
            "SELECT id, name, description, class_name, created_at FROM pools ORDER BY name",
        )?;
        let pools = stmt
            .query_map([], pool_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(pools)
    }

    pub fn get_pool(&self, id: &str) -> DirectoryResult<Pool> {
        let conn = self.lock();
        require_pool(&conn, id)
    }

    /// Place an object in a pool. The object's class must be the pool's class
    /// or one of its subclasses.
    pub fn add_object_to_pool(
        &self,
        pool_id: &str,
        class_name: &str,
        id: &str,
    ) -> DirectoryResult<()> {
        let conn = self.lock();
        let pool = require_pool(&conn, pool_id)?;
        require_object(&conn, class_name, id)?;

        if !subclass_of(&conn, class_name, &pool.class_name)? {
            return Err(DirectoryError::InvalidArgument(format!(
                "Pool {} only accepts instances of {}",
                pool.name, pool.class_name
            )));
        }

        conn.execute(
            "UPDATE objects SET pool_id = ? WHERE class_name = ? AND id = ?",
            (pool_id, class_name, id),
        )?;
        Ok(())
    }

    pub fn get_pool_items(&self, pool_id: &str) -> DirectoryResult<Vec<InventoryObjectRef>> {
        let conn = self.lock();
        require_pool(&conn, pool_id)?;
        let mut stmt =
            conn.prepare("SELECT class_name, id, name FROM objects WHERE pool_id = ? ORDER BY seq")?;
        let items = stmt
            .query_map([pool_id], ref_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(items)
    }
}

impl BusinessObjectDirectory for Database {
    fn get_object_children(
        &self,
        class_name: &str,
        id: &str,
        limit: i64,
    ) -> DirectoryResult<Vec<InventoryObjectRef>> {
        if class_name.is_empty() {
            return Err(DirectoryError::InvalidArgument(
                "Class name cannot be empty".to_string(),
            ));
        }

        let conn = self.lock();
        require_object(&conn, class_name, id)?;

        // SQLite treats a negative LIMIT as unbounded
        let limit = if limit > 0 { limit } else { -1 };
        let mut stmt = conn.prepare(
            "SELECT class_name, id, name FROM objects
             WHERE parent_class = ? AND parent_id = ? ORDER BY seq LIMIT ?",
        )?;
        let children = stmt
            .query_map((class_name, id, limit), ref_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(children)
    }

    fn get_object_children_count(
        &self,
        class_name: &str,
        id: &str,
        filter: Option<&str>,
    ) -> DirectoryResult<u64> {
        let conn = self.lock();
        let mut stmt =
            conn.prepare("SELECT class_name FROM objects WHERE parent_class = ? AND parent_id = ?")?;
        let child_classes = stmt
            .query_map((class_name, id), |row| row.get::<_, String>(0))?
            .collect::<Result<Vec<_>, _>>()?;

        let Some(filter) = filter else {
            return Ok(child_classes.len() as u64);
        };
        if !class_exists(&conn, filter)? {
            return Err(DirectoryError::MetadataNotFound(filter.to_string()));
        }

        let mut count = 0;
        for child_class in &child_classes {
            if subclass_of(&conn, child_class, filter)? {
                count += 1;
            }
        }
        Ok(count)
    }

    fn get_object_special_children(
        &self,
        class_name: &str,
        id: &str,
    ) -> DirectoryResult<Vec<InventoryObjectRef>> {
        let conn = self.lock();
        require_object(&conn, class_name, id)?;

        let mut stmt = conn.prepare(
            "SELECT o.class_name, o.id, o.name FROM special_relationships r
             JOIN objects o ON o.class_name = r.target_class AND o.id = r.target_id
             WHERE r.source_class = ? AND r.source_id = ?
             GROUP BY o.class_name, o.id
             ORDER BY MIN(r.seq)",
        )?;
        let children = stmt
            .query_map((class_name, id), ref_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(children)
    }

    fn get_parents(&self, class_name: &str, id: &str) -> DirectoryResult<Vec<InventoryObjectRef>> {
        let conn = self.lock();
        let mut current = require_object(&conn, class_name, id)?;
        let mut parents = Vec::new();

        while let (Some(parent_class), Some(parent_id)) =
            (current.parent_class.clone(), current.parent_id.clone())
        {
            if parents.len() >= MAX_HIERARCHY_DEPTH {
                return Err(DirectoryError::InvalidArgument(format!(
                    "Containment of {} {} exceeds {} levels",
                    class_name, id, MAX_HIERARCHY_DEPTH
                )));
            }
            current = require_object(&conn, &parent_class, &parent_id)?;
            parents.push(InventoryObjectRef::from(&current));
        }

        Ok(parents)
    }
}

impl SubclassOracle for Database {
    fn is_subclass_of(&self, candidate: &str, ancestor: &str) -> DirectoryResult<bool> {
        let conn = self.lock();
        subclass_of(&conn, candidate, ancestor)
    }
}

impl Clone for Database {
    fn clone(&self) -> Self {
        Self {
            conn: self.conn.clone(),
        }
    }
}

// ============================================================
// Helpers (run against an already locked connection)
// ============================================================

fn class_exists(conn: &Connection, name: &str) -> DirectoryResult<bool> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM classes WHERE name = ?",
        [name],
        |row| row.get(0),
    )?;
    Ok(count > 0)
}

fn find_class(conn: &Connection, name: &str) -> DirectoryResult<Option<InventoryClass>> {
    let class = conn
        .query_row(
            &format!("SELECT {} FROM classes WHERE name = ?", CLASS_COLUMNS),
            [name],
            class_from_row,
        )
        .optional()?;
    Ok(class)
}

fn subclass_of(conn: &Connection, candidate: &str, ancestor: &str) -> DirectoryResult<bool> {
    if !class_exists(conn, ancestor)? {
        return Err(DirectoryError::MetadataNotFound(ancestor.to_string()));
    }

    let mut current = candidate.to_string();
    for _ in 0..MAX_HIERARCHY_DEPTH {
        if current == ancestor {
            return Ok(true);
        }
        let class = find_class(conn, &current)?
            .ok_or_else(|| DirectoryError::MetadataNotFound(current.clone()))?;
        match class.parent_name {
            Some(parent) => current = parent,
            None => return Ok(false),
        }
    }

    Err(DirectoryError::InvalidArgument(format!(
        "Inheritance chain of {} exceeds {} levels",
        candidate, MAX_HIERARCHY_DEPTH
    )))
}

fn require_object(conn: &Connection, class_name: &str, id: &str) -> DirectoryResult<BusinessObject> {
    conn.query_row(
        &format!(
            "SELECT {} FROM objects WHERE class_name = ? AND id = ?",
            OBJECT_COLUMNS
        ),
        (class_name, id),
        object_from_row,
    )
    .optional()?
    .ok_or_else(|| DirectoryError::object_not_found(class_name, id))
}

fn require_pool(conn: &Connection, id: &str) -> DirectoryResult<Pool> {
    conn.query_row(
        "SELECT id, name, description, class_name, created_at FROM pools WHERE id = ?",
        [id],
        pool_from_row,
    )
    .optional()?
    .ok_or_else(|| DirectoryError::object_not_found("Pool", id))
}

fn ref_from_row(row: &Row<'_>) -> rusqlite::Result<InventoryObjectRef> {
    Ok(InventoryObjectRef {
        class_name: row.get(0)?,
        id: row.get(1)?,
        name: row.get(2)?,
    })
}

fn object_from_row(row: &Row<'_>) -> rusqlite::Result<BusinessObject> {
    Ok(BusinessObject {
        id: row.get(0)?,
        class_name: row.get(1)?,
        name: row.get(2)?,
        parent_class: row.get(3)?,
        parent_id: row.get(4)?,
        pool_id: row.get(5)?,
        created_at: parse_datetime(row.get::<_, String>(6)?),
    })
}

fn class_from_row(row: &Row<'_>) -> rusqlite::Result<InventoryClass> {
    Ok(InventoryClass {
        name: row.get(0)?,
        parent_name: row.get(1)?,
        display_name: row.get(2)?,
        is_abstract: row.get::<_, i32>(3)? != 0,
        created_at: parse_datetime(row.get::<_, String>(4)?),
    })
}

fn pool_from_row(row: &Row<'_>) -> rusqlite::Result<Pool> {
    Ok(Pool {
        id: row.get(0)?,
        name: row.get(1)?,
        description: row.get(2)?,
        class_name: row.get(3)?,
        created_at: parse_datetime(row.get::<_, String>(4)?),
    })
}

fn parse_datetime(s: String) -> chrono::DateTime<Utc> {
    chrono::DateTime::parse_from_rfc3339(&s)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now())
}
