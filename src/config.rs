//! Configuration module for wikidex.
//!
//! Settings are layered:
//! 1. Built-in defaults
//! 2. `.wikidex/settings.toml` in the workspace (searched upwards from the
//!    current directory)
//! 3. Environment variables prefixed `WIKIDEX_`, with `__` separating nested
//!    levels (`WIKIDEX_SERVER__PORT=4000`)

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Directory holding the settings file.
pub const CONFIG_DIR: &str = ".wikidex";

/// Settings file name inside [`CONFIG_DIR`].
pub const CONFIG_FILE: &str = "settings.toml";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// Version of the configuration schema
    #[serde(default = "default_version")]
    pub version: u32,

    /// Wiki document root, relative to the workspace root unless absolute
    #[serde(default = "default_docs_root")]
    pub docs_root: PathBuf,

    /// Document extension without the dot
    #[serde(default = "default_extension")]
    pub extension: String,

    /// Workspace root (where `.wikidex` lives). Detected when not set.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub workspace_root: Option<PathBuf>,

    #[serde(default)]
    pub watch: WatchConfig,

    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WatchConfig {
    /// Keep the index current while serving
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Events for the same file inside this window are dropped
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,

    /// Bound of the channel between the OS watcher and the event loop
    #[serde(default = "default_channel_capacity")]
    pub channel_capacity: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind")]
    pub bind: String,

    /// First port tried
    #[serde(default = "default_port")]
    pub port: u16,

    /// Consecutive ports probed when the first one is taken
    #[serde(default = "default_port_attempts")]
    pub port_attempts: u16,

    /// Messages buffered per websocket subscriber
    #[serde(default = "default_broadcast_capacity")]
    pub broadcast_capacity: usize,
}

/// Log levels: `error`, `warn`, `info`, `debug`, `trace`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Level for everything without a module override
    #[serde(default = "default_log_level")]
    pub default: String,

    /// Per-module overrides, e.g. `wikidex::watcher = "debug"`
    #[serde(default)]
    pub modules: BTreeMap<String, String>,
}

fn default_version() -> u32 {
    1
}
fn default_docs_root() -> PathBuf {
    PathBuf::from("wiki-docs")
}
fn default_extension() -> String {
    crate::parsing::DEFAULT_EXTENSION.to_string()
}
fn default_true() -> bool {
    true
}
fn default_debounce_ms() -> u64 {
    crate::watcher::DEFAULT_DEBOUNCE_MS
}
fn default_channel_capacity() -> usize {
    crate::watcher::DEFAULT_CHANNEL_CAPACITY
}
fn default_bind() -> String {
    "127.0.0.1".to_string()
}
fn default_port() -> u16 {
    3055
}
fn default_port_attempts() -> u16 {
    10
}
fn default_broadcast_capacity() -> usize {
    100
}
fn default_log_level() -> String {
    "info".to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            version: default_version(),
            docs_root: default_docs_root(),
            extension: default_extension(),
            workspace_root: None,
            watch: WatchConfig::default(),
            server: ServerConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            debounce_ms: default_debounce_ms(),
            channel_capacity: default_channel_capacity(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            port: default_port(),
            port_attempts: default_port_attempts(),
            broadcast_capacity: default_broadcast_capacity(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            default: default_log_level(),
            modules: BTreeMap::new(),
        }
    }
}

impl Settings {
    /// Load configuration from all sources, starting the workspace search in
    /// the current directory.
    pub fn load() -> Result<Self, Box<figment::Error>> {
        let current = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        Self::load_in(&current)
    }

    /// Load configuration, searching for `.wikidex` from `start` upwards.
    pub fn load_in(start: &Path) -> Result<Self, Box<figment::Error>> {
        let workspace = Self::find_workspace(start);
        let config_path = workspace
            .as_ref()
            .map(|root| root.join(CONFIG_DIR).join(CONFIG_FILE))
            .unwrap_or_else(|| PathBuf::from(CONFIG_DIR).join(CONFIG_FILE));

        Self::figment(&config_path)
            .extract()
            .map_err(Box::new)
            .map(|mut settings: Settings| {
                // If workspace_root is not set in config, use the detected one
                if settings.workspace_root.is_none() {
                    settings.workspace_root = workspace;
                }
                settings
            })
    }

    /// Load configuration from a specific file
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self, Box<figment::Error>> {
        Self::figment(path.as_ref()).extract().map_err(Box::new)
    }

    fn figment(config_path: &Path) -> Figment {
        Figment::new()
            // Start with defaults
            .merge(Serialized::defaults(Settings::default()))
            // Layer in config file if it exists
            .merge(Toml::file(config_path))
            // Double underscore separates nested levels; single underscores
            // stay inside field names
            .merge(Env::prefixed("WIKIDEX_").map(|key| {
                key.as_str().to_lowercase().replace("__", ".").into()
            }))
    }

    /// Find the nearest ancestor of `start` containing a `.wikidex` directory.
    pub fn find_workspace(start: &Path) -> Option<PathBuf> {
        start
            .ancestors()
            .find(|ancestor| ancestor.join(CONFIG_DIR).is_dir())
            .map(Path::to_path_buf)
    }

    /// Save current configuration to file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), Box<dyn std::error::Error>> {
        let parent = path.as_ref().parent().ok_or("Invalid path")?;
        std::fs::create_dir_all(parent)?;

        let toml_string = toml::to_string_pretty(self)?;
        std::fs::write(path, toml_string)?;

        Ok(())
    }

    /// Effective settings as TOML.
    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }

    /// Document root resolved against the workspace root.
    pub fn docs_root_path(&self) -> PathBuf {
        if self.docs_root.is_absolute() {
            return self.docs_root.clone();
        }
        match &self.workspace_root {
            Some(root) => root.join(&self.docs_root),
            None => self.docs_root.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_default_settings() {
        let settings = Settings::default();
        assert_eq!(settings.version, 1);
        assert_eq!(settings.docs_root, PathBuf::from("wiki-docs"));
        assert_eq!(settings.extension, "md");
        assert_eq!(settings.watch.debounce_ms, 100);
        assert_eq!(settings.server.port, 3055);
        assert_eq!(settings.logging.default, "info");
    }

    #[test]
    fn test_load_from_toml() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("settings.toml");

        let toml_content = r#"
docs_root = "/srv/wiki"
extension = "markdown"

[watch]
debounce_ms = 250

[server]
port = 8080

[logging]
default = "warn"

[logging.modules]
"wikidex::watcher" = "debug"
"#;

        fs::write(&config_path, toml_content).unwrap();

        let settings = Settings::load_from(&config_path).unwrap();
        assert_eq!(settings.docs_root, PathBuf::from("/srv/wiki"));
        assert_eq!(settings.extension, "markdown");
        assert_eq!(settings.watch.debounce_ms, 250);
        assert!(settings.watch.enabled);
        assert_eq!(settings.server.port, 8080);
        assert_eq!(settings.server.port_attempts, 10);
        assert_eq!(settings.logging.default, "warn");
        assert_eq!(settings.logging.modules["wikidex::watcher"], "debug");
    }

    #[test]
    fn test_save_settings() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join(".wikidex/settings.toml");

        let mut settings = Settings::default();
        settings.server.port = 9999;
        settings.watch.enabled = false;

        settings.save(&config_path).unwrap();

        let loaded = Settings::load_from(&config_path).unwrap();
        assert_eq!(loaded.server.port, 9999);
        assert!(!loaded.watch.enabled);
    }

    #[test]
    fn test_workspace_discovery() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        fs::create_dir_all(root.join(".wikidex")).unwrap();
        fs::create_dir_all(root.join("deep/nested")).unwrap();
        fs::write(root.join(".wikidex/settings.toml"), "docs_root = \"pages\"\n").unwrap();

        let settings = Settings::load_in(&root.join("deep/nested")).unwrap();

        assert_eq!(settings.workspace_root.as_deref(), Some(root));
        assert_eq!(settings.docs_root_path(), root.join("pages"));
    }

    #[test]
    fn test_env_overrides_file() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("settings.toml");
        fs::write(&config_path, "[server]\nbroadcast_capacity = 5\n").unwrap();

        // Only this test reads broadcast_capacity, so the variable cannot
        // disturb the others.
        unsafe {
            std::env::set_var("WIKIDEX_SERVER__BROADCAST_CAPACITY", "42");
        }
        let settings = Settings::load_from(&config_path).unwrap();
        unsafe {
            std::env::remove_var("WIKIDEX_SERVER__BROADCAST_CAPACITY");
        }

        assert_eq!(settings.server.broadcast_capacity, 42);
    }

    #[test]
    fn test_to_toml_round_trips() {
        let settings = Settings::default();
        let text = settings.to_toml().unwrap();
        let parsed: Settings = toml::from_str(&text).unwrap();
        assert_eq!(parsed, settings);
    }
}
