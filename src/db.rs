use anyhow::{Context, Result};
use r2d2::{Pool, PooledConnection};
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::functions::FunctionFlags;
use rusqlite::{params, OptionalExtension};
use serde_json::{Map, Value};
use std::path::Path;

use crate::graph::entity::{Node, NodeLabel};
use crate::graph::relationship::{RelationshipSpec, RelationshipType};
use crate::graph::store::{GraphStore, StoreError, WriteOutcome};

/// Database schema version - increment when schema changes
const CURRENT_SCHEMA_VERSION: i32 = 1;

/// Upper bound on pooled connections; the loader is sequential, queries are short
const MAX_CONNECTIONS: u32 = 4;

type Connection = PooledConnection<SqliteConnectionManager>;

/// SQLite-backed property graph storage
#[derive(Clone)]
pub struct Database {
    pool: Pool<SqliteConnectionManager>,
    db_path: String,
}

impl std::fmt::Debug for Database {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Database")
            .field("pool", &"SQLite Pool")
            .field("db_path", &self.db_path)
            .finish()
    }
}

impl Database {
    /// Open (or create) the database at `path`, initializing the schema if needed
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        let db_path = path.as_ref().to_string_lossy().to_string();
        let manager = SqliteConnectionManager::file(path.as_ref()).with_init(|conn| {
            conn.execute_batch("PRAGMA foreign_keys = ON;")?;
            register_unicode_lower(conn)
        });
        let pool = Pool::builder()
            .max_size(MAX_CONNECTIONS)
            .build(manager)
            .with_context(|| format!("Failed to open database at {}", db_path))?;

        let db = Self { pool, db_path };
        db.initialize_schema()?;
        Ok(db)
    }

    pub fn path(&self) -> &str {
        &self.db_path
    }

    /// Check out a pooled connection; it returns to the pool when dropped
    fn connection(&self) -> Result<Connection, StoreError> {
        Ok(self.pool.get()?)
    }

    /// Initialize the database schema if needed
    fn initialize_schema(&self) -> Result<()> {
        let conn = self.connection()?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS schema_version (
                version INTEGER PRIMARY KEY
            )",
            [],
        )?;
        // seed once; the row is updated in place by migrations
        conn.execute(
            "INSERT INTO schema_version (version)
             SELECT 0 WHERE NOT EXISTS (SELECT 1 FROM schema_version)",
            [],
        )?;

        drop(conn);
        self.apply_migrations()
    }

    /// Apply schema migrations as needed
    fn apply_migrations(&self) -> Result<()> {
        let conn = self.connection()?;

        let version: i32 =
            conn.query_row("SELECT MAX(version) FROM schema_version", [], |row| row.get(0))?;

        if version < 1 {
            conn.execute_batch(
                "CREATE TABLE nodes (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    label TEXT NOT NULL,
                    name TEXT NOT NULL,
                    properties TEXT NOT NULL DEFAULT '{}',
                    created_at TEXT NOT NULL
                );

                CREATE TABLE relationships (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    source_id INTEGER NOT NULL,
                    target_id INTEGER NOT NULL,
                    relationship_type TEXT NOT NULL,
                    name TEXT NOT NULL,
                    created_at TEXT NOT NULL,
                    FOREIGN KEY(source_id) REFERENCES nodes(id),
                    FOREIGN KEY(target_id) REFERENCES nodes(id)
                );

                CREATE INDEX idx_node_label_name ON nodes(label, name);
                CREATE INDEX idx_rel_source ON relationships(source_id, relationship_type);
                CREATE INDEX idx_rel_target ON relationships(target_id);",
            )?;

            conn.execute(
                "UPDATE schema_version SET version = ?1",
                params![CURRENT_SCHEMA_VERSION],
            )?;
        }

        // if version < 2 { ... }

        Ok(())
    }
}

/// Open the graph database at `path`
pub fn get_database(path: &str) -> Result<Database> {
    Database::new(path)
}

/// SQLite's built-in `lower()` only folds ASCII; this folds any letter
fn register_unicode_lower(conn: &rusqlite::Connection) -> rusqlite::Result<()> {
    conn.create_scalar_function(
        "unicode_lower",
        1,
        FunctionFlags::SQLITE_UTF8 | FunctionFlags::SQLITE_DETERMINISTIC,
        |ctx| {
            let text: String = ctx.get(0)?;
            Ok(text.to_lowercase())
        },
    )
}

fn to_count(count: i64) -> Result<usize, StoreError> {
    usize::try_from(count).map_err(|_| StoreError::Corrupt(format!("invalid row count {}", count)))
}

fn now() -> String {
    chrono::Utc::now().to_rfc3339()
}

fn node_exists(conn: &Connection, label: NodeLabel, name: &str) -> Result<bool, StoreError> {
    let found = conn
        .query_row(
            "SELECT 1 FROM nodes WHERE label = ?1 AND name = ?2 LIMIT 1",
            params![label.as_str(), name],
            |_| Ok(()),
        )
        .optional()?;
    Ok(found.is_some())
}

fn read_node(label: &str, name: String, properties: &str) -> Result<Node, StoreError> {
    let label = parse_node_label(label)
        .ok_or_else(|| StoreError::Corrupt(format!("unknown node label '{}'", label)))?;
    let properties: Map<String, Value> = serde_json::from_str(properties)?;
    Ok(Node {
        label,
        name,
        properties,
    })
}

impl GraphStore for Database {
    fn create_node(&self, node: &Node) -> Result<(), StoreError> {
        let properties = serde_json::to_string(&node.properties)?;
        let conn = self.connection()?;
        conn.execute(
            "INSERT INTO nodes (label, name, properties, created_at) VALUES (?1, ?2, ?3, ?4)",
            params![node.label.as_str(), node.name, properties, now()],
        )?;
        Ok(())
    }

    fn merge_node(&self, node: &Node) -> Result<WriteOutcome, StoreError> {
        let properties = serde_json::to_string(&node.properties)?;
        let mut conn = self.connection()?;
        let tx = conn.transaction()?;

        let existing: Option<i64> = tx
            .query_row(
                "SELECT id FROM nodes WHERE label = ?1 AND name = ?2 ORDER BY id LIMIT 1",
                params![node.label.as_str(), node.name],
                |row| row.get(0),
            )
            .optional()?;

        let outcome = match existing {
            Some(id) => {
                tx.execute(
                    "UPDATE nodes SET properties = ?1 WHERE id = ?2",
                    params![properties, id],
                )?;
                WriteOutcome::Matched
            }
            None => {
                tx.execute(
                    "INSERT INTO nodes (label, name, properties, created_at) VALUES (?1, ?2, ?3, ?4)",
                    params![node.label.as_str(), node.name, properties, now()],
                )?;
                WriteOutcome::Created
            }
        };

        tx.commit()?;
        Ok(outcome)
    }

    fn create_relationship(&self, spec: &RelationshipSpec) -> Result<usize, StoreError> {
        let conn = self.connection()?;

        for (label, name) in [
            (spec.source_label(), &spec.source),
            (spec.target_label(), &spec.target),
        ] {
            if !node_exists(&conn, label, name)? {
                return Err(StoreError::NodeNotFound {
                    label,
                    name: name.clone(),
                });
            }
        }

        let written = conn.execute(
            "INSERT INTO relationships (source_id, target_id, relationship_type, name, created_at)
             SELECT p.id, q.id, ?1, ?2, ?3
             FROM nodes p, nodes q
             WHERE p.label = ?4 AND p.name = ?5 AND q.label = ?6 AND q.name = ?7",
            params![
                spec.relationship_type.as_str(),
                spec.name(),
                now(),
                spec.source_label().as_str(),
                spec.source,
                spec.target_label().as_str(),
                spec.target,
            ],
        )?;
        Ok(written)
    }

    fn relationship_exists(&self, spec: &RelationshipSpec) -> Result<bool, StoreError> {
        let conn = self.connection()?;
        let found = conn
            .query_row(
                "SELECT 1 FROM relationships r
                 JOIN nodes p ON r.source_id = p.id
                 JOIN nodes q ON r.target_id = q.id
                 WHERE r.relationship_type = ?1
                   AND p.label = ?2 AND p.name = ?3
                   AND q.label = ?4 AND q.name = ?5
                 LIMIT 1",
                params![
                    spec.relationship_type.as_str(),
                    spec.source_label().as_str(),
                    spec.source,
                    spec.target_label().as_str(),
                    spec.target,
                ],
                |_| Ok(()),
            )
            .optional()?;
        Ok(found.is_some())
    }

    fn find_nodes_containing(
        &self,
        label: NodeLabel,
        fragment: &str,
    ) -> Result<Vec<Node>, StoreError> {
        let conn = self.connection()?;
        let mut stmt = conn.prepare(
            "SELECT label, name, properties FROM nodes
             WHERE label = ?1 AND instr(unicode_lower(name), unicode_lower(?2)) > 0
             ORDER BY name, id",
        )?;

        let rows = stmt.query_map(params![label.as_str(), fragment], |row| {
            let label: String = row.get(0)?;
            let name: String = row.get(1)?;
            let properties: String = row.get(2)?;
            Ok((label, name, properties))
        })?;

        let mut nodes = Vec::new();
        for row_result in rows {
            let (label, name, properties) = row_result?;
            nodes.push(read_node(&label, name, &properties)?);
        }
        Ok(nodes)
    }

    fn node_names(&self, label: NodeLabel) -> Result<Vec<String>, StoreError> {
        let conn = self.connection()?;
        let mut stmt =
            conn.prepare("SELECT DISTINCT name FROM nodes WHERE label = ?1 ORDER BY name")?;
        let names = stmt
            .query_map(params![label.as_str()], |row| row.get(0))?
            .collect::<Result<Vec<String>, _>>()?;
        Ok(names)
    }

    fn get_node(&self, label: NodeLabel, name: &str) -> Result<Option<Node>, StoreError> {
        let conn = self.connection()?;
        let row = conn
            .query_row(
                "SELECT label, name, properties FROM nodes
                 WHERE label = ?1 AND name = ?2 ORDER BY id LIMIT 1",
                params![label.as_str(), name],
                |row| {
                    let label: String = row.get(0)?;
                    let name: String = row.get(1)?;
                    let properties: String = row.get(2)?;
                    Ok((label, name, properties))
                },
            )
            .optional()?;

        match row {
            Some((label, name, properties)) => Ok(Some(read_node(&label, name, &properties)?)),
            None => Ok(None),
        }
    }

    fn neighbor_names(
        &self,
        source: &str,
        relationship_type: RelationshipType,
    ) -> Result<Vec<String>, StoreError> {
        let conn = self.connection()?;
        let mut stmt = conn.prepare(
            "SELECT DISTINCT q.name FROM relationships r
             JOIN nodes p ON r.source_id = p.id
             JOIN nodes q ON r.target_id = q.id
             WHERE p.label = ?1 AND p.name = ?2
               AND r.relationship_type = ?3 AND q.label = ?4
             ORDER BY q.name",
        )?;
        let names = stmt
            .query_map(
                params![
                    NodeLabel::HeritageSite.as_str(),
                    source,
                    relationship_type.as_str(),
                    relationship_type.target_label().as_str(),
                ],
                |row| row.get(0),
            )?
            .collect::<Result<Vec<String>, _>>()?;
        Ok(names)
    }

    fn count_nodes(&self, label: NodeLabel) -> Result<usize, StoreError> {
        let conn = self.connection()?;
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM nodes WHERE label = ?1",
            params![label.as_str()],
            |row| row.get(0),
        )?;
        to_count(count)
    }

    fn count_relationships(
        &self,
        relationship_type: RelationshipType,
    ) -> Result<usize, StoreError> {
        let conn = self.connection()?;
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM relationships WHERE relationship_type = ?1",
            params![relationship_type.as_str()],
            |row| row.get(0),
        )?;
        to_count(count)
    }
}

/// Parse node label from its stored representation
pub fn parse_node_label(label: &str) -> Option<NodeLabel> {
    NodeLabel::ALL
        .into_iter()
        .find(|candidate| candidate.as_str() == label)
}
