//! CLI smoke entry point.
//!
//! # Responsibility
//! - Drive the workbench headlessly through one add-node/select round trip.
//! - Verify `bookgraph_core` wiring (config, logging, storage) end to end.

use bookgraph_core::db::{open_db, open_db_in_memory};
use bookgraph_core::{
    init_logging, CoreConfig, DraftField, SqliteNodeRepository, Workbench,
};
use std::error::Error;
use std::process::ExitCode;

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("bookgraph_cli error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<(), Box<dyn Error>> {
    let config = CoreConfig::from_env();
    if let Some(log_dir) = config.log_dir.as_deref() {
        init_logging(&config.log_level, &log_dir.to_string_lossy())?;
    }

    let mut conn = match config.db_path.as_deref() {
        Some(path) => open_db(path)?,
        None => open_db_in_memory()?,
    };
    let repo = SqliteNodeRepository::try_new(&mut conn)?;
    let mut workbench = Workbench::open(repo)?;
    println!("bookgraph_core version={}", bookgraph_core::core_version());
    println!("loaded nodes={}", workbench.list_all_nodes().len());

    workbench.open_authoring();
    workbench.set_field(DraftField::Title, "Test Node")?;
    workbench.set_field(DraftField::Tags, "AN1101")?;
    let link = workbench.add_link_slot()?;
    workbench.set_link(link, "https://example.com")?;
    let detail = workbench.add_detail_slot()?;
    workbench.set_detail(detail, "Test Key", "Test Value")?;
    let outcome = workbench.commit_authoring()?;
    log::info!(
        "event=cli_smoke module=cli status=ok persisted={}",
        outcome.persisted
    );

    let node = workbench.select_node(&outcome.node_id)?;
    let record = &node.record;
    println!("selected id={} title={}", node.id, record.title);
    println!(
        "tags={}",
        record.tags.iter().cloned().collect::<Vec<_>>().join(",")
    );
    for link in &record.links {
        println!("link={link}");
    }
    for detail in &record.details {
        println!("detail {}={}", detail.key, detail.value);
    }
    println!(
        "total nodes={} persisted={}",
        workbench.list_all_nodes().len(),
        outcome.persisted
    );
    Ok(())
}
