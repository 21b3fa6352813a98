//! `copresence summary`: Summarize the log without running.

use copresence_observer::{gaze_orientation, summarize};
use copresence_store::ArtifactLog;
use std::path::Path;

use super::CommandResult;
use crate::display;

pub fn run(path: Option<&Path>) -> CommandResult {
    let config = super::load_config(path)?;
    let log = ArtifactLog::open(config.artifact_log_path())?;

    let summary = summarize(log.all());
    display::print_summary(&summary);

    for name in [&config.agents.first, &config.agents.second] {
        let gaze = gaze_orientation(log.all(), name);
        let (Some(start), Some(end)) = (gaze.first(), gaze.last()) else {
            continue;
        };
        println!(
            "  {name} gaze: self {:.2} → {:.2}, other {:.2} → {:.2}, world {:.2} → {:.2}",
            start.self_focus, end.self_focus, start.other_focus, end.other_focus, start.world_focus, end.world_focus
        );
    }
    Ok(())
}
