use super::{Config, RemoteConfig, SweepConfig};
use std::path::PathBuf;

pub const DEFAULT_BASE_URL: &str = "https://gitlab.com";
pub const DEFAULT_ARCHIVE_PREFIX: &str = "archive/";

pub fn default_config() -> Config {
    Config {
        remote: RemoteConfig {
            base_url: DEFAULT_BASE_URL.to_string(),
            token: String::new(),
            project: None,
        },
        sweep: SweepConfig {
            archive_prefix: DEFAULT_ARCHIVE_PREFIX.to_string(),
            default_target: None,
        },
    }
}

pub fn get_default_config_dir() -> PathBuf {
    directories::ProjectDirs::from("", "", "glsweep")
        .map(|dirs| dirs.config_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from(".glsweep"))
}

pub fn get_config_file_path() -> PathBuf {
    // Environment override for the config path (used in tests)
    if let Ok(config_path) = std::env::var("GLSWEEP_CONFIG_PATH") {
        return PathBuf::from(config_path);
    }

    get_default_config_dir().join("config.json")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_values() {
        let config = default_config();
        assert_eq!(config.remote.base_url, "https://gitlab.com");
        assert!(config.remote.token.is_empty());
        assert!(config.remote.project.is_none());
        assert_eq!(config.sweep.archive_prefix, "archive/");
        assert!(config.sweep.default_target.is_none());
    }

    #[test]
    fn test_config_file_path_ends_with_config_json() {
        if std::env::var("GLSWEEP_CONFIG_PATH").is_err() {
            let config_file = get_config_file_path();
            assert!(config_file.ends_with("config.json"));
            assert!(config_file.parent().is_some());
        }
    }
}
