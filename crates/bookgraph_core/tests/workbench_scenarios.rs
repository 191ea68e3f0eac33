use bookgraph_core::{
    validate, AuthoringError, Detail, DraftField, Edge, EdgeId, GraphError, Node, NodeId,
    NodeRepository, NodeSearch, RepoError, RepoResult, ValidationIssue, Workbench,
    WorkbenchError,
};

fn add_test_node(workbench: &mut Workbench<impl NodeRepository>) -> NodeId {
    workbench.open_authoring();
    workbench.set_field(DraftField::Title, "Test Node").unwrap();
    workbench.set_field(DraftField::Tags, "AN1101").unwrap();
    let link = workbench.add_link_slot().unwrap();
    workbench.set_link(link, "https://example.com").unwrap();
    let detail = workbench.add_detail_slot().unwrap();
    workbench
        .set_detail(detail, "Test Key", "Test Value")
        .unwrap();
    workbench.commit_authoring().unwrap().node_id
}

#[test]
fn add_node_scenario_grows_graph_by_the_normalized_draft() {
    let mut workbench = Workbench::detached();
    workbench.open_authoring();
    workbench.set_field(DraftField::Title, "Test Node").unwrap();
    workbench.set_field(DraftField::Tags, "AN1101").unwrap();
    let link = workbench.add_link_slot().unwrap();
    workbench.set_link(link, "https://example.com").unwrap();
    let detail = workbench.add_detail_slot().unwrap();
    workbench
        .set_detail(detail, "Test Key", "Test Value")
        .unwrap();
    let expected = validate(workbench.draft().unwrap()).unwrap();

    let outcome = workbench.commit_authoring().unwrap();

    assert!(outcome.persisted);
    assert!(workbench.draft().is_none());
    let nodes = workbench.list_all_nodes();
    assert_eq!(nodes.len(), 1);
    assert_eq!(nodes[0].id, outcome.node_id);
    assert_eq!(nodes[0].record, expected);
    assert_eq!(nodes[0].record.details, vec![Detail::new("Test Key", "Test Value")]);
}

#[test]
fn empty_commit_scenario_fails_without_growth() {
    let mut workbench = Workbench::detached();
    workbench.open_authoring();

    let err = workbench.commit_authoring().unwrap_err();
    match err {
        WorkbenchError::Authoring(AuthoringError::Validation(errors)) => {
            assert!(errors.contains(ValidationIssue::MissingTitle));
            assert!(errors.contains(ValidationIssue::MissingTags));
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(workbench.list_all_nodes().is_empty());
    assert!(workbench.draft().is_some());
}

#[test]
fn select_scenario_keeps_selection_on_stale_id() {
    let mut workbench = Workbench::detached();
    let id = add_test_node(&mut workbench);

    let selected = workbench.select_node(&id).unwrap().clone();
    assert_eq!(workbench.current_selection(), Some(&selected));

    let err = workbench.node_clicked("does-not-exist").unwrap_err();
    assert!(matches!(err, WorkbenchError::Graph(_)));
    assert_eq!(workbench.current_selection(), Some(&selected));

    workbench.clear_selection();
    assert!(workbench.current_selection().is_none());
}

#[test]
fn cancel_never_affects_the_graph() {
    let mut workbench = Workbench::detached();
    add_test_node(&mut workbench);
    let before = workbench.list_all_nodes().to_vec();

    workbench.open_authoring();
    workbench.set_field(DraftField::Title, "Abandoned").unwrap();
    workbench.set_field(DraftField::Tags, "x").unwrap();
    workbench.cancel_authoring().unwrap();

    assert_eq!(workbench.list_all_nodes(), before.as_slice());
    assert!(matches!(
        workbench.cancel_authoring(),
        Err(WorkbenchError::NoActiveSession)
    ));
}

#[test]
fn authoring_commands_require_an_open_session() {
    let mut workbench = Workbench::detached();
    assert!(matches!(
        workbench.set_field(DraftField::Title, "x"),
        Err(WorkbenchError::NoActiveSession)
    ));
    assert!(matches!(
        workbench.commit_authoring(),
        Err(WorkbenchError::NoActiveSession)
    ));

    add_test_node(&mut workbench);
    assert!(matches!(
        workbench.add_link_slot(),
        Err(WorkbenchError::NoActiveSession)
    ));
}

#[test]
fn reopening_authoring_starts_from_a_fresh_draft() {
    let mut workbench = Workbench::detached();
    workbench.open_authoring();
    workbench.set_field(DraftField::Title, "Half written").unwrap();
    workbench.add_link_slot().unwrap();

    workbench.open_authoring();
    let draft = workbench.draft().unwrap();
    assert!(draft.title.is_empty());
    assert!(draft.links().is_empty());
}

#[test]
fn committed_node_is_searchable() {
    let mut workbench = Workbench::detached();
    let id = add_test_node(&mut workbench);
    let hits = workbench.search_nodes(&NodeSearch::new("an1101"));
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].id, id);
    assert_eq!(workbench.get_node(&id).unwrap().title(), "Test Node");
}

fn add_titled_node(workbench: &mut Workbench<impl NodeRepository>, title: &str) -> NodeId {
    workbench.open_authoring();
    workbench.set_field(DraftField::Title, title).unwrap();
    workbench.set_field(DraftField::Tags, "AN1101").unwrap();
    workbench.commit_authoring().unwrap().node_id
}

#[derive(Default)]
struct RecordingRepository {
    seeded: Vec<Node>,
    seeded_edges: Vec<Edge>,
    inserted: Vec<NodeId>,
    edge_log: Vec<String>,
    fail_inserts: bool,
}

impl NodeRepository for RecordingRepository {
    fn load_all(&self) -> RepoResult<Vec<Node>> {
        Ok(self.seeded.clone())
    }

    fn on_insert(&mut self, node: &Node) -> RepoResult<()> {
        if self.fail_inserts {
            return Err(RepoError::InvalidData("storage offline".to_string()));
        }
        self.inserted.push(node.id.clone());
        Ok(())
    }

    fn load_edges(&self) -> RepoResult<Vec<Edge>> {
        Ok(self.seeded_edges.clone())
    }

    fn on_edge_insert(&mut self, edge: &Edge) -> RepoResult<()> {
        if self.fail_inserts {
            return Err(RepoError::InvalidData("storage offline".to_string()));
        }
        self.edge_log.push(format!("insert {}", edge.id));
        Ok(())
    }

    fn on_edge_update(&mut self, edge: &Edge) -> RepoResult<()> {
        self.edge_log.push(format!("update {} {}", edge.id, edge.note));
        Ok(())
    }

    fn on_edge_remove(&mut self, id: &EdgeId) -> RepoResult<()> {
        self.edge_log.push(format!("remove {id}"));
        Ok(())
    }
}

#[test]
fn open_seeds_from_repository_and_mirrors_inserts() {
    let mut seed_source = Workbench::detached();
    let seeded_id = add_test_node(&mut seed_source);
    let repo = RecordingRepository {
        seeded: seed_source.list_all_nodes().to_vec(),
        ..RecordingRepository::default()
    };

    let mut workbench = Workbench::open(repo).unwrap();
    assert_eq!(workbench.list_all_nodes().len(), 1);
    workbench.select_node(&seeded_id).unwrap();

    let new_id = add_test_node(&mut workbench);
    assert_eq!(new_id.as_str(), "test-node-2");
    assert_eq!(workbench.repository().inserted, vec![new_id]);
}

#[test]
fn persistence_failure_keeps_the_in_memory_node() {
    let repo = RecordingRepository {
        fail_inserts: true,
        ..RecordingRepository::default()
    };
    let mut workbench = Workbench::open(repo).unwrap();
    workbench.open_authoring();
    workbench.set_field(DraftField::Title, "Offline").unwrap();
    workbench.set_field(DraftField::Tags, "x").unwrap();

    let outcome = workbench.commit_authoring().unwrap();
    assert!(!outcome.persisted);
    assert!(workbench.select_node(&outcome.node_id).is_ok());
}

#[test]
fn connecting_nodes_mirrors_every_edge_change() {
    let mut workbench = Workbench::open(RecordingRepository::default()).unwrap();
    let ways = add_titled_node(&mut workbench, "Ways of Seeing");
    let spectacle = add_titled_node(&mut workbench, "Society of the Spectacle");

    let outcome = workbench
        .connect_nodes(&ways, &spectacle, Some("  both on images "))
        .unwrap();
    assert!(outcome.persisted);
    assert_eq!(workbench.list_edges()[0].note, "both on images");
    assert_eq!(workbench.edges_of(&spectacle).len(), 1);

    workbench.set_edge_note(&outcome.edge_id, Some("   ")).unwrap();
    assert_eq!(workbench.list_edges()[0].note, "");

    workbench.remove_edge(&outcome.edge_id).unwrap();
    assert!(workbench.list_edges().is_empty());
    let id = &outcome.edge_id;
    assert_eq!(
        workbench.repository().edge_log,
        vec![
            format!("insert {id}"),
            format!("update {id} "),
            format!("remove {id}"),
        ]
    );
}

#[test]
fn duplicate_or_reversed_edge_is_rejected_without_change() {
    let mut workbench = Workbench::detached();
    let a = add_titled_node(&mut workbench, "A");
    let b = add_titled_node(&mut workbench, "B");
    workbench.connect_nodes(&a, &b, None).unwrap();

    let err = workbench.connect_nodes(&b, &a, Some("again")).unwrap_err();
    assert!(matches!(
        err,
        WorkbenchError::Graph(GraphError::AlreadyConnected { .. })
    ));
    let err = workbench.connect_nodes(&a, &a, None).unwrap_err();
    assert!(matches!(err, WorkbenchError::Graph(GraphError::SelfLoop(_))));
    assert_eq!(workbench.list_edges().len(), 1);
}

#[test]
fn edge_persistence_failure_keeps_the_in_memory_edge() {
    let mut seed_source = Workbench::detached();
    let a = add_titled_node(&mut seed_source, "A");
    let b = add_titled_node(&mut seed_source, "B");
    let repo = RecordingRepository {
        seeded: seed_source.list_all_nodes().to_vec(),
        fail_inserts: true,
        ..RecordingRepository::default()
    };

    let mut workbench = Workbench::open(repo).unwrap();
    let outcome = workbench.connect_nodes(&a, &b, None).unwrap();
    assert!(!outcome.persisted);
    assert_eq!(workbench.list_edges()[0].id, outcome.edge_id);
}

#[test]
fn open_rejects_seeded_edge_with_unknown_endpoint() {
    let mut seed_source = Workbench::detached();
    let a = add_titled_node(&mut seed_source, "A");
    let repo = RecordingRepository {
        seeded: seed_source.list_all_nodes().to_vec(),
        seeded_edges: vec![Edge::new(
            EdgeId::from("e1"),
            a,
            NodeId::from("missing"),
            None,
        )],
        ..RecordingRepository::default()
    };

    let err = Workbench::open(repo).err().unwrap();
    assert!(matches!(err, WorkbenchError::Graph(GraphError::NotFound(_))));
}
