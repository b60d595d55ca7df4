// Tue Jan 13 2026 - Alex

pub mod config;
pub mod error;
pub mod orchestration;
pub mod output;
pub mod structure;
pub mod symbol;
pub mod utils;

pub use config::{Config, ConfigError, TargetConfig};
pub use error::DumpError;
pub use orchestration::{DumpCoordinator, DumpSummary};
pub use output::{JsonWriter, OutputDocument};
pub use structure::{AllowList, LayoutRecord};
pub use symbol::{PdbLoader, SymbolProvider, SymbolTree};

/// Loads the allow-list and the database, dumps every allow-listed name and
/// writes the result. Nothing is written unless every earlier step succeeded.
pub fn dump(config: &Config) -> Result<DumpSummary, DumpError> {
    config.validate()?;

    let targets = TargetConfig::load(&config.config_path)?;
    for warning in targets.warnings() {
        log::warn!("{}", warning);
    }
    let allow_list = targets.to_allow_list();

    let tree = PdbLoader::new(&config.pdb_path).load()?;

    let (document, summary) = DumpCoordinator::new(&tree, &allow_list)
        .with_max_depth(config.max_depth)
        .with_progress(config.show_progress)
        .run()?;
    drop(tree);

    let written = JsonWriter::new()
        .with_indent_size(config.indent)
        .write_to_file(&document, &config.output_path)?;
    log::info!("Wrote {} bytes to {}", written, config.output_path.display());

    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::PathBuf;

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("pdb-layout-dumper-{}-{}", name, std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn test_missing_config_aborts_without_output() {
        let dir = scratch_dir("no-config");
        let config = Config::new(dir.join("Game.pdb"));

        let err = dump(&config).unwrap_err();
        assert_eq!(err.exit_code(), 5);
        assert!(!config.output_path.exists());

        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_missing_database_aborts_without_output() {
        let dir = scratch_dir("no-pdb");
        let config = Config::new(dir.join("Game.pdb"));
        fs::write(&config.config_path, r#"{"structures": ["Foo"], "functions": []}"#).unwrap();

        let err = dump(&config).unwrap_err();
        assert_eq!(err.exit_code(), 2);
        assert!(!config.output_path.exists());

        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_garbage_database_is_provider_failure() {
        let dir = scratch_dir("bad-pdb");
        let config = Config::new(dir.join("Game.pdb"));
        fs::write(&config.config_path, r#"{"structures": ["Foo"]}"#).unwrap();
        fs::write(&config.pdb_path, b"this is not an msf file, just some bytes padding it out").unwrap();

        let err = dump(&config).unwrap_err();
        assert_eq!(err.exit_code(), 4);
        assert!(!config.output_path.exists());

        fs::remove_dir_all(&dir).ok();
    }
}
