use bookgraph_core::db::migrations::latest_version;
use bookgraph_core::db::{open_db, open_db_in_memory, DbError};
use bookgraph_core::{
    DraftField, NodeId, NodeRepository, RepoError, SqliteNodeRepository, Workbench,
};
use rusqlite::Connection;

fn add_node(
    workbench: &mut Workbench<SqliteNodeRepository<'_>>,
    title: &str,
    tags: &str,
    links: &[&str],
    details: &[(&str, &str)],
) -> NodeId {
    workbench.open_authoring();
    workbench.set_field(DraftField::Title, title).unwrap();
    workbench.set_field(DraftField::Tags, tags).unwrap();
    for url in links {
        let token = workbench.add_link_slot().unwrap();
        workbench.set_link(token, *url).unwrap();
    }
    for (key, value) in details {
        let token = workbench.add_detail_slot().unwrap();
        workbench.set_detail(token, *key, *value).unwrap();
    }
    let outcome = workbench.commit_authoring().unwrap();
    assert!(outcome.persisted);
    outcome.node_id
}

#[test]
fn open_db_in_memory_applies_all_migrations() {
    let conn = open_db_in_memory().unwrap();
    assert_eq!(schema_version(&conn), latest_version());
    for table in [
        "nodes",
        "node_tags",
        "node_links",
        "node_details",
        "node_edges",
    ] {
        assert_table_exists(&conn, table);
    }
}

#[test]
fn nodes_table_stores_only_node_fields() {
    let conn = open_db_in_memory().unwrap();
    let mut stmt = conn.prepare("PRAGMA table_info(nodes);").unwrap();
    let columns: Vec<String> = stmt
        .query_map([], |row| row.get::<_, String>("name"))
        .unwrap()
        .collect::<Result<_, _>>()
        .unwrap();
    assert_eq!(
        columns,
        vec!["seq", "id", "title", "author", "year", "abstract", "notes", "color"]
    );
}

#[test]
fn opening_database_with_newer_schema_version_returns_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("future.db");
    let conn = Connection::open(&path).unwrap();
    conn.execute_batch("PRAGMA user_version = 999;").unwrap();
    drop(conn);

    match open_db(&path).unwrap_err() {
        DbError::UnsupportedSchemaVersion {
            db_version,
            latest_supported,
        } => {
            assert_eq!(db_version, 999);
            assert_eq!(latest_supported, latest_version());
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn repository_requires_migrated_connection() {
    let mut conn = Connection::open_in_memory().unwrap();
    let err = SqliteNodeRepository::try_new(&mut conn).err().unwrap();
    assert!(matches!(err, RepoError::MissingRequiredTable("nodes")));
}

#[test]
fn committed_nodes_round_trip_through_sqlite() {
    let mut conn = open_db_in_memory().unwrap();
    let repo = SqliteNodeRepository::try_new(&mut conn).unwrap();
    let mut workbench = Workbench::open(repo).unwrap();

    add_node(
        &mut workbench,
        "Society of the Spectacle",
        "AN1101, theory",
        &["https://b.example", "https://a.example"],
        &[("ISBN", "978-0942299793"), ("Publisher", "Zone Books")],
    );
    workbench.open_authoring();
    workbench.set_field(DraftField::Title, "Ways of Seeing").unwrap();
    workbench.set_field(DraftField::Tags, "AN2202").unwrap();
    workbench.set_field(DraftField::Year, "1972").unwrap();
    workbench.set_field(DraftField::Author, "John Berger").unwrap();
    workbench.set_field(DraftField::Abstract, "Essays on images").unwrap();
    workbench.set_field(DraftField::Color, "#93c5fd").unwrap();
    workbench.commit_authoring().unwrap();

    let in_memory = workbench.list_all_nodes().to_vec();
    let loaded = workbench.repository().load_all().unwrap();
    assert_eq!(loaded, in_memory);
    assert_eq!(loaded[0].record.links[0], "https://b.example");
    assert_eq!(loaded[0].record.details[1].key, "Publisher");
    assert_eq!(loaded[1].record.year, Some(1972));
}

#[test]
fn reopening_file_database_restores_graph_in_insertion_order() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("bookgraph.sqlite3");

    let (first, second) = {
        let mut conn = open_db(&path).unwrap();
        let repo = SqliteNodeRepository::try_new(&mut conn).unwrap();
        let mut workbench = Workbench::open(repo).unwrap();
        let first = add_node(&mut workbench, "Zeta", "x", &[], &[]);
        let second = add_node(&mut workbench, "Alpha", "y", &["https://a.io"], &[]);
        (first, second)
    };

    let mut conn = open_db(&path).unwrap();
    let repo = SqliteNodeRepository::try_new(&mut conn).unwrap();
    let mut workbench = Workbench::open(repo).unwrap();
    let ids: Vec<&NodeId> = workbench.list_all_nodes().iter().map(|n| &n.id).collect();
    assert_eq!(ids, vec![&first, &second]);

    let again = add_node(&mut workbench, "Zeta", "x", &[], &[]);
    assert_eq!(again.as_str(), "zeta-2");
    assert_eq!(workbench.select_node(&second).unwrap().record.links.len(), 1);
}

#[test]
fn edges_survive_reopen_with_notes_and_order() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("edges.sqlite3");

    let (kept, kept_target) = {
        let mut conn = open_db(&path).unwrap();
        let repo = SqliteNodeRepository::try_new(&mut conn).unwrap();
        let mut workbench = Workbench::open(repo).unwrap();
        let a = add_node(&mut workbench, "A", "x", &[], &[]);
        let b = add_node(&mut workbench, "B", "x", &[], &[]);
        let c = add_node(&mut workbench, "C", "x", &[], &[]);
        let dropped = workbench.connect_nodes(&a, &b, None).unwrap();
        let kept = workbench.connect_nodes(&c, &a, Some(" draft ")).unwrap();
        assert!(kept.persisted);
        assert!(workbench
            .set_edge_note(&kept.edge_id, Some(" cites ch. 2 "))
            .unwrap()
            .persisted);
        assert!(workbench.remove_edge(&dropped.edge_id).unwrap().persisted);
        (kept.edge_id, a)
    };

    let mut conn = open_db(&path).unwrap();
    let repo = SqliteNodeRepository::try_new(&mut conn).unwrap();
    let workbench = Workbench::open(repo).unwrap();
    let edges = workbench.list_edges();
    assert_eq!(edges.len(), 1);
    assert_eq!(edges[0].id, kept);
    assert_eq!(edges[0].target, kept_target);
    assert_eq!(edges[0].note, "cites ch. 2");
}

#[test]
fn stored_node_without_tags_is_rejected_on_load() {
    let mut conn = open_db_in_memory().unwrap();
    conn.execute(
        "INSERT INTO nodes (id, title) VALUES ('orphan', 'Orphan');",
        [],
    )
    .unwrap();

    let repo = SqliteNodeRepository::try_new(&mut conn).unwrap();
    let err = repo.load_all().unwrap_err();
    assert!(matches!(err, RepoError::InvalidData(_)));
}

fn schema_version(conn: &Connection) -> u32 {
    conn.query_row("PRAGMA user_version;", [], |row| row.get(0))
        .unwrap()
}

fn assert_table_exists(conn: &Connection, table_name: &str) {
    let exists: i64 = conn
        .query_row(
            "SELECT EXISTS(
                SELECT 1
                FROM sqlite_master
                WHERE type = 'table' AND name = ?1
            );",
            [table_name],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(exists, 1, "table {table_name} does not exist");
}
