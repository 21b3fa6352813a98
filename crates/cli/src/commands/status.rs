//! `copresence status`: Show data directory status.

use copresence_store::{ArtifactLog, ContentPool, ProfileStore};
use std::path::Path;

use super::CommandResult;

pub fn run(path: Option<&Path>) -> CommandResult {
    let config = super::load_config(path)?;
    let config_path = super::config_path(path);

    println!("CO-PRESENCE Status");
    println!("==================");
    println!("  Config:        {}", config_path.display());
    println!("  Data dir:      {}", config.data_dir.display());
    println!("  Endpoint:      {}", config.base_url);
    println!("  Model:         {}", config.model);
    println!("  Temperature:   {}", config.temperature);
    println!(
        "  Perturbation:  every {}..={} cycles",
        config.perturbation.min_gap, config.perturbation.max_gap
    );
    println!(
        "  API key:       {}",
        if config.has_api_key() { "set" } else { "missing" }
    );

    let log = ArtifactLog::open(config.artifact_log_path())?;
    println!();
    println!("  Artifacts:     {}", log.count());
    println!("  Latest cycle:  {}", log.latest_cycle());

    let pool = ContentPool::open(config.content_pool_path())?;
    println!("  Content pool:  {} entries", pool.count());
    for (category, n) in pool.category_counts() {
        println!("    {:<6} {n}", category.as_str());
    }

    let names = [&config.agents.first, &config.agents.second];
    for (slot, name) in names.into_iter().enumerate() {
        let profile_path = config.profile_path(slot);
        println!();
        if !profile_path.exists() {
            println!("  {name}: no profile yet");
            continue;
        }
        let store = ProfileStore::open(&profile_path, name)?;
        let p = store.snapshot();
        println!("  {name} ({} changes)", store.profile().history().len());
        println!("    abstraction_level: {}", p.abstraction_level);
        println!("    tendency_to_close: {:.2}", p.tendency_to_close);
        println!("    self_focus:        {:.2}", p.self_focus);
        println!("    other_focus:       {:.2}", p.other_focus);
        println!("    world_focus:       {:.2}", p.world_focus);
        println!("    complexity_target: {}", p.complexity_target);
    }

    if !config_path.exists() {
        println!("\n  No config file. Run `copresence init` first");
    }

    Ok(())
}
