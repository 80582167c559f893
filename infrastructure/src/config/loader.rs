//! Configuration file loader with multi-source merging

use super::file_config::FileConfig;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use std::path::{Path, PathBuf};

/// Project-level file names, checked in order
const PROJECT_FILES: [&str; 2] = ["kubex.toml", ".kubex.toml"];

/// Prefix of environment overrides (`KUBEX_LLM__MODEL` sets `llm.model`)
const ENV_PREFIX: &str = "KUBEX_";

/// Configuration loader that handles file discovery and merging
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from all sources with proper priority
    ///
    /// Priority (highest to lowest):
    /// 1. Environment variables `KUBEX_*` (`__` separates sections)
    /// 2. Explicit config path (if provided)
    /// 3. Project root: `./kubex.toml` or `./.kubex.toml`
    /// 4. Global: `$XDG_CONFIG_HOME/kubex/config.toml`
    /// 5. Default values
    pub fn load(config_path: Option<&Path>) -> Result<FileConfig, Box<figment::Error>> {
        Self::layered(
            Self::global_config_path().filter(|p| p.exists()).as_deref(),
            Self::project_config_path().as_deref(),
            config_path,
        )
        .merge(Env::prefixed(ENV_PREFIX).split("__"))
        .extract()
        .map_err(Box::new)
    }

    /// Load only default configuration (for --no-config)
    pub fn load_defaults() -> FileConfig {
        FileConfig::default()
    }

    /// Defaults overlaid with whichever files are given, lowest priority first
    fn layered(global: Option<&Path>, project: Option<&Path>, explicit: Option<&Path>) -> Figment {
        [global, project, explicit]
            .into_iter()
            .flatten()
            .fold(
                Figment::new().merge(Serialized::defaults(FileConfig::default())),
                |figment, path| figment.merge(Toml::file(path)),
            )
    }

    /// Get the global config file path
    ///
    /// Returns XDG_CONFIG_HOME/kubex/config.toml if set,
    /// otherwise the platform config directory.
    pub fn global_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("kubex").join("config.toml"))
    }

    /// Get the project-level config file path (if it exists)
    pub fn project_config_path() -> Option<PathBuf> {
        PROJECT_FILES
            .iter()
            .map(PathBuf::from)
            .find(|path| path.exists())
    }

    /// Describe the config file locations being used (for --show-config)
    pub fn describe_sources(explicit: Option<&Path>) -> Vec<String> {
        let mut lines = vec!["Configuration sources (in priority order):".to_string()];

        lines.push(format!("  [ENV  ] {ENV_PREFIX}* variables"));
        if let Some(path) = explicit {
            lines.push(format!("  [FOUND] Explicit: {}", path.display()));
        }
        match Self::project_config_path() {
            Some(path) => lines.push(format!("  [FOUND] Project: {}", path.display())),
            None => lines.push("  [     ] Project: ./kubex.toml or ./.kubex.toml".to_string()),
        }
        if let Some(path) = Self::global_config_path() {
            let mark = if path.exists() { "FOUND" } else { "     " };
            lines.push(format!("  [{mark}] Global:  {}", path.display()));
        }
        lines.push("  [     ] Default: built-in defaults".to_string());

        lines
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn write(dir: &tempfile::TempDir, name: &str, contents: &str) -> PathBuf {
        let path = dir.path().join(name);
        fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn test_load_defaults() {
        let config = ConfigLoader::load_defaults();
        assert_eq!(config, FileConfig::default());
    }

    #[test]
    fn test_global_config_path_returns_some() {
        let path = ConfigLoader::global_config_path().unwrap();
        assert!(path.ends_with("kubex/config.toml"));
    }

    #[test]
    fn test_later_files_override_earlier_ones() {
        let dir = tempfile::tempdir().unwrap();
        let global = write(
            &dir,
            "global.toml",
            "[llm]\nmodel = \"global-model\"\ntemperature = 0.1\n",
        );
        let project = write(&dir, "kubex.toml", "[llm]\nmodel = \"project-model\"\n");
        let explicit = write(&dir, "explicit.toml", "[api]\nbase_url = \"https://api.test\"\n");

        let config: FileConfig =
            ConfigLoader::layered(Some(&global), Some(&project), Some(&explicit))
                .extract()
                .unwrap();

        assert_eq!(config.llm.model, "project-model");
        assert_eq!(config.llm.temperature, 0.1);
        assert_eq!(config.api.base_url, "https://api.test");
        assert_eq!(config.memory.global_capacity, 10);
    }

    #[test]
    fn test_missing_file_keeps_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let absent = dir.path().join("absent.toml");

        let config: FileConfig = ConfigLoader::layered(None, None, Some(&absent))
            .extract()
            .unwrap();

        assert_eq!(config, FileConfig::default());
    }

    #[test]
    fn test_malformed_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let broken = write(&dir, "broken.toml", "[memory]\nglobal_capacity = \"lots\"\n");

        let result: Result<FileConfig, _> = ConfigLoader::layered(None, None, Some(&broken)).extract();
        assert!(result.is_err());
    }

    #[test]
    fn test_describe_sources_lists_explicit_file() {
        let lines = ConfigLoader::describe_sources(Some(Path::new("/etc/kubex.toml")));
        assert!(lines.iter().any(|l| l.contains("Explicit: /etc/kubex.toml")));
        assert!(lines.last().unwrap().contains("Default"));
    }
}
