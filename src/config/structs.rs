use serde::{Deserialize, Serialize};

/// Startup logging settings, loaded from TOML and environment variables
///
/// Runtime level changes and descriptor reloads go through the `control`
/// module and are never written back here.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct StaticConfig {
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl StaticConfig {
    /// Load configuration from `logutil.toml` and the environment
    ///
    /// Precedence: ENV > logutil.toml > defaults.
    /// ENV prefix `LOGUTIL`, separator `__`,
    /// e.g. `LOGUTIL__LOGGING__LEVEL=debug`.
    pub fn load() -> Self {
        Self::load_from("logutil.toml")
    }

    /// Same as [`StaticConfig::load`] with an explicit TOML path.
    pub fn load_from(path: &str) -> Self {
        use config::{Config, Environment, File};

        let builder = Config::builder()
            .add_source(File::with_name(path).required(false))
            .add_source(
                Environment::with_prefix("LOGUTIL")
                    .separator("__")
                    .try_parsing(true),
            );

        // logging is not up yet, so report straight to stderr
        match builder.build() {
            Ok(settings) => match settings.try_deserialize::<StaticConfig>() {
                Ok(config) => config,
                Err(e) => {
                    eprintln!("[ERROR] Failed to deserialize config: {}", e);
                    Self::default()
                }
            },
            Err(e) => {
                eprintln!("[ERROR] Failed to build config: {}", e);
                Self::default()
            }
        }
    }

    /// Render the default configuration as a sample TOML file
    pub fn generate_sample_config() -> String {
        toml::to_string_pretty(&Self::default())
            .unwrap_or_else(|e| format!("Error generating sample config: {}", e))
    }
}

/// Logging settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Root level, optionally followed by per-logger directives,
    /// e.g. `info,app::db=debug`.
    #[serde(default = "default_log_level")]
    pub level: String,
    /// `text` or `json`
    #[serde(default = "default_log_format")]
    pub format: String,
    #[serde(default = "default_log_file")]
    pub file: Option<String>,
    #[serde(default = "default_max_backups")]
    pub max_backups: u32,
    #[serde(default = "default_enable_rotation")]
    pub enable_rotation: bool,
    /// XML descriptor loaded at startup. When set it replaces `level`,
    /// `file` and the rotation settings entirely.
    #[serde(default)]
    pub descriptor: Option<String>,
    #[serde(default = "default_non_blocking")]
    pub non_blocking: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "text".to_string()
}

fn default_log_file() -> Option<String> {
    None
}

fn default_max_backups() -> u32 {
    5
}

fn default_enable_rotation() -> bool {
    true
}

fn default_non_blocking() -> bool {
    true
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            file: default_log_file(),
            max_backups: default_max_backups(),
            enable_rotation: default_enable_rotation(),
            descriptor: None,
            non_blocking: default_non_blocking(),
        }
    }
}

impl LoggingConfig {
    /// Output goes to the console when no file is configured.
    pub fn is_console(&self) -> bool {
        self.file.as_ref().is_none_or(|f| f.is_empty())
    }
}
