//! `copresence log`: Query the artifact log.

use copresence_core::artifact::ArtifactKind;
use copresence_core::query::{ArtifactQuery, SortOrder};
use copresence_store::ArtifactLog;
use std::path::Path;

use super::CommandResult;
use crate::display;

fn build_query(agent: Option<String>, kind: Option<ArtifactKind>, limit: usize, order: SortOrder) -> ArtifactQuery {
    let mut query = ArtifactQuery::new().order(order).limit(limit);
    if let Some(agent) = agent {
        query = query.agent(agent);
    }
    if let Some(kind) = kind {
        query = query.kind(kind);
    }
    query
}

pub fn run(
    path: Option<&Path>,
    agent: Option<String>,
    kind: Option<ArtifactKind>,
    limit: usize,
    order: SortOrder,
) -> CommandResult {
    let config = super::load_config(path)?;
    let log = ArtifactLog::open(config.artifact_log_path())?;

    let query = build_query(agent, kind, limit, order);
    let results = log.query(&query);
    if results.is_empty() {
        println!("  No matching artifacts ({} in log)", log.count());
        return Ok(());
    }

    for artifact in &results {
        display::print_log_line(artifact);
    }
    println!("\n  {} of {} artifacts", results.len(), log.count());
    Ok(())
}
