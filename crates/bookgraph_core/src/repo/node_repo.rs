//! Node persistence port and SQLite implementation.
//!
//! # Responsibility
//! - Seed the graph store at startup (`load_all`, `load_edges`).
//! - Persist each newly admitted node (`on_insert`) and every edge change.
//!
//! # Invariants
//! - `load_all` and `load_edges` return rows in their original insertion order.
//! - `on_insert` writes one node and its tags/links/details in one transaction.
//! - Read paths reject invalid persisted state instead of masking it.

use crate::db::DbError;
use crate::model::edge::{Edge, EdgeId};
use crate::model::node::{Detail, Node, NodeId, NormalizedNode};
use log::{error, info};
use rusqlite::{params, Connection, Row, TransactionBehavior};
use std::collections::BTreeSet;
use std::error::Error;
use std::fmt::{Display, Formatter};

const NODE_SELECT_SQL: &str = "SELECT
    id,
    title,
    author,
    year,
    abstract,
    notes,
    color
FROM nodes
ORDER BY seq ASC;";

const EDGE_SELECT_SQL: &str = "SELECT
    id,
    source_id,
    target_id,
    note
FROM node_edges
ORDER BY seq ASC;";

pub type RepoResult<T> = Result<T, RepoError>;

/// Persistence-layer error.
#[derive(Debug)]
pub enum RepoError {
    Db(DbError),
    /// Connection is missing a table this repository needs.
    MissingRequiredTable(&'static str),
    /// Stored row violates node invariants.
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::MissingRequiredTable(table) => write!(f, "missing required table `{table}`"),
            Self::InvalidData(message) => write!(f, "invalid persisted node data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::MissingRequiredTable(_) | Self::InvalidData(_) => None,
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Persistence collaborator of the workbench.
pub trait NodeRepository {
    /// Returns every stored node in insertion order.
    fn load_all(&self) -> RepoResult<Vec<Node>>;
    /// Called once after a node has been admitted into the graph store.
    fn on_insert(&mut self, node: &Node) -> RepoResult<()>;
    /// Returns every stored edge in insertion order.
    fn load_edges(&self) -> RepoResult<Vec<Edge>>;
    /// Called once after an edge has been drawn.
    fn on_edge_insert(&mut self, edge: &Edge) -> RepoResult<()>;
    /// Called after an edge note changed.
    fn on_edge_update(&mut self, edge: &Edge) -> RepoResult<()>;
    /// Called after an edge was deleted.
    fn on_edge_remove(&mut self, id: &EdgeId) -> RepoResult<()>;
}

/// Repository that stores nothing; for headless sessions and tests.
#[derive(Debug, Clone, Copy, Default)]
pub struct DetachedRepository;

impl NodeRepository for DetachedRepository {
    fn load_all(&self) -> RepoResult<Vec<Node>> {
        Ok(Vec::new())
    }

    fn on_insert(&mut self, _node: &Node) -> RepoResult<()> {
        Ok(())
    }

    fn load_edges(&self) -> RepoResult<Vec<Edge>> {
        Ok(Vec::new())
    }

    fn on_edge_insert(&mut self, _edge: &Edge) -> RepoResult<()> {
        Ok(())
    }

    fn on_edge_update(&mut self, _edge: &Edge) -> RepoResult<()> {
        Ok(())
    }

    fn on_edge_remove(&mut self, _id: &EdgeId) -> RepoResult<()> {
        Ok(())
    }
}

/// SQLite-backed node repository.
pub struct SqliteNodeRepository<'conn> {
    conn: &'conn mut Connection,
}

impl<'conn> SqliteNodeRepository<'conn> {
    /// Constructs a repository from a migrated connection.
    ///
    /// # Errors
    /// - `MissingRequiredTable` when the connection was not opened through
    ///   `open_db`/`open_db_in_memory`.
    pub fn try_new(conn: &'conn mut Connection) -> RepoResult<Self> {
        for table in [
            "nodes",
            "node_tags",
            "node_links",
            "node_details",
            "node_edges",
        ] {
            if !table_exists(conn, table)? {
                return Err(RepoError::MissingRequiredTable(table));
            }
        }
        Ok(Self { conn })
    }
}

impl NodeRepository for SqliteNodeRepository<'_> {
    fn load_all(&self) -> RepoResult<Vec<Node>> {
        let mut stmt = self.conn.prepare(NODE_SELECT_SQL)?;
        let mut rows = stmt.query([])?;
        let mut nodes = Vec::new();
        while let Some(row) = rows.next()? {
            nodes.push(parse_node_row(self.conn, row)?);
        }
        info!(
            "event=repo_load module=repo status=ok node_count={}",
            nodes.len()
        );
        Ok(nodes)
    }

    fn on_insert(&mut self, node: &Node) -> RepoResult<()> {
        let result = insert_node(self.conn, node);
        match &result {
            Ok(()) => info!(
                "event=repo_insert module=repo status=ok tags={} links={} details={}",
                node.record.tags.len(),
                node.record.links.len(),
                node.record.details.len()
            ),
            Err(err) => error!("event=repo_insert module=repo status=error error={err}"),
        }
        result
    }

    fn load_edges(&self) -> RepoResult<Vec<Edge>> {
        let mut stmt = self.conn.prepare(EDGE_SELECT_SQL)?;
        let edges = stmt
            .query_map([], |row| {
                Ok(Edge {
                    id: EdgeId::new(row.get::<_, String>("id")?),
                    source: NodeId::new(row.get::<_, String>("source_id")?),
                    target: NodeId::new(row.get::<_, String>("target_id")?),
                    note: row.get("note")?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        info!(
            "event=repo_load_edges module=repo status=ok edge_count={}",
            edges.len()
        );
        Ok(edges)
    }

    fn on_edge_insert(&mut self, edge: &Edge) -> RepoResult<()> {
        self.conn.execute(
            "INSERT INTO node_edges (id, source_id, target_id, note)
             VALUES (?1, ?2, ?3, ?4);",
            params![
                edge.id.as_str(),
                edge.source.as_str(),
                edge.target.as_str(),
                edge.note.as_str()
            ],
        )?;
        info!("event=repo_edge_insert module=repo status=ok edge_id={}", edge.id);
        Ok(())
    }

    fn on_edge_update(&mut self, edge: &Edge) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE node_edges SET note = ?2 WHERE id = ?1;",
            params![edge.id.as_str(), edge.note.as_str()],
        )?;
        if changed == 0 {
            return Err(RepoError::InvalidData(format!(
                "edge `{}` has no row in node_edges",
                edge.id
            )));
        }
        Ok(())
    }

    fn on_edge_remove(&mut self, id: &EdgeId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM node_edges WHERE id = ?1;", [id.as_str()])?;
        if changed == 0 {
            return Err(RepoError::InvalidData(format!(
                "edge `{id}` has no row in node_edges"
            )));
        }
        Ok(())
    }
}

fn insert_node(conn: &mut Connection, node: &Node) -> RepoResult<()> {
    let record = &node.record;
    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
    tx.execute(
        "INSERT INTO nodes (id, title, author, year, abstract, notes, color)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7);",
        params![
            node.id.as_str(),
            record.title.as_str(),
            record.author.as_deref(),
            record.year,
            record.abstract_text.as_deref(),
            record.notes.as_deref(),
            record.color.as_deref(),
        ],
    )?;

    for tag in &record.tags {
        tx.execute(
            "INSERT INTO node_tags (node_id, tag) VALUES (?1, ?2);",
            params![node.id.as_str(), tag.as_str()],
        )?;
    }
    for (position, url) in record.links.iter().enumerate() {
        tx.execute(
            "INSERT INTO node_links (node_id, position, url) VALUES (?1, ?2, ?3);",
            params![node.id.as_str(), position as i64, url.as_str()],
        )?;
    }
    for (position, detail) in record.details.iter().enumerate() {
        tx.execute(
            "INSERT INTO node_details (node_id, position, key, value)
             VALUES (?1, ?2, ?3, ?4);",
            params![
                node.id.as_str(),
                position as i64,
                detail.key.as_str(),
                detail.value.as_str()
            ],
        )?;
    }

    tx.commit()?;
    Ok(())
}

fn parse_node_row(conn: &Connection, row: &Row<'_>) -> RepoResult<Node> {
    let id: String = row.get("id")?;
    let title: String = row.get("title")?;
    if title.trim().is_empty() {
        return Err(RepoError::InvalidData(format!(
            "blank title for node `{id}` in nodes.title"
        )));
    }

    let tags = load_tags(conn, &id)?;
    if tags.is_empty() {
        return Err(RepoError::InvalidData(format!(
            "node `{id}` has no rows in node_tags"
        )));
    }

    let record = NormalizedNode {
        title,
        author: row.get("author")?,
        year: row.get("year")?,
        tags,
        links: load_links(conn, &id)?,
        details: load_details(conn, &id)?,
        abstract_text: row.get("abstract")?,
        notes: row.get("notes")?,
        color: row.get("color")?,
    };
    Ok(Node::new(NodeId::new(id), record))
}

fn load_tags(conn: &Connection, node_id: &str) -> RepoResult<BTreeSet<String>> {
    let mut stmt = conn.prepare("SELECT tag FROM node_tags WHERE node_id = ?1;")?;
    let tags = stmt
        .query_map([node_id], |row| row.get::<_, String>(0))?
        .collect::<Result<BTreeSet<_>, _>>()?;
    Ok(tags)
}

fn load_links(conn: &Connection, node_id: &str) -> RepoResult<Vec<String>> {
    let mut stmt =
        conn.prepare("SELECT url FROM node_links WHERE node_id = ?1 ORDER BY position ASC;")?;
    let links = stmt
        .query_map([node_id], |row| row.get::<_, String>(0))?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(links)
}

fn load_details(conn: &Connection, node_id: &str) -> RepoResult<Vec<Detail>> {
    let mut stmt = conn.prepare(
        "SELECT key, value FROM node_details WHERE node_id = ?1 ORDER BY position ASC;",
    )?;
    let details = stmt
        .query_map([node_id], |row| {
            Ok(Detail::new(
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
            ))
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(details)
}

fn table_exists(conn: &Connection, table: &str) -> RepoResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [table],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}
