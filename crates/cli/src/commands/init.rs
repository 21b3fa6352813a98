//! `copresence init`: Write a default configuration file.

use copresence_config::AppConfig;
use std::path::Path;

use super::CommandResult;

pub fn run(path: Option<&Path>, force: bool) -> CommandResult {
    let config_path = super::config_path(path);

    println!("CO-PRESENCE Setup");
    println!("===================\n");

    if config_path.exists() && !force {
        println!("  Config file exists: {}", config_path.display());
        println!("  Use --force to overwrite it.");
        return Ok(());
    }

    if let Some(parent) = config_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(&config_path, AppConfig::default_toml())?;
    println!("  Wrote {}", config_path.display());

    println!();
    println!("  Next steps:");
    println!("    1. Set COPRESENCE_API_KEY (or OPENAI_API_KEY)");
    println!("    2. Adjust base_url / model in {} if needed", config_path.display());
    println!("    3. copresence run -n 5");
    println!();

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writes_defaults_and_keeps_existing_without_force() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("copresence.toml");

        run(Some(&path), false).unwrap();
        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.contains("deepseek-chat"));

        std::fs::write(&path, "model = \"custom\"\n").unwrap();
        run(Some(&path), false).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "model = \"custom\"\n");

        run(Some(&path), true).unwrap();
        let config = AppConfig::load_from(&path).unwrap();
        assert_eq!(config.model, "deepseek-chat");
    }
}
