use alloc::sync::Arc;

use super::{LoggerConfig, TileLogLevel, ValidationConfig};

/// Static mutex holding the global configuration, initialized as `None`.
static TILE_GLOBAL_CONFIG: spin::Mutex<Option<Arc<GlobalConfig>>> = spin::Mutex::new(None);

/// Name of the configuration file searched in the current directory and its parents.
pub const CONFIG_FILE_NAME: &str = "cubecl-tile.toml";

/// Represents the global configuration of the tile access engine.
#[derive(Default, Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct GlobalConfig {
    /// Logging of setup and phase transitions.
    #[serde(default)]
    pub logger: LoggerConfig,

    /// Checks on traversal sequences.
    #[serde(default)]
    pub validation: ValidationConfig,
}

impl GlobalConfig {
    /// Retrieves the current global configuration, loading it from the current directory if not set.
    ///
    /// # Notes
    ///
    /// Calling this function takes a global lock. Hot paths should cache the values they
    /// need, as [crate::config::Logger] and [ValidationConfig] do.
    pub fn get() -> Arc<Self> {
        let mut state = TILE_GLOBAL_CONFIG.lock();
        match state.as_ref() {
            Some(config) => config.clone(),
            None => {
                #[cfg(feature = "std")]
                let config = Self::from_current_dir().override_from_env();
                #[cfg(not(feature = "std"))]
                let config = Self::default();

                let config = Arc::new(config);
                *state = Some(config.clone());
                config
            }
        }
    }

    /// Sets the global configuration to the provided value.
    ///
    /// # Panics
    /// Panics if the configuration has already been set or read, as it cannot be overridden.
    pub fn set(config: Self) {
        let mut state = TILE_GLOBAL_CONFIG.lock();
        if state.is_some() {
            panic!("Cannot set the global configuration multiple times.");
        }
        *state = Some(Arc::new(config));
    }

    /// Parses a configuration from TOML content.
    #[cfg(feature = "std")]
    pub fn from_toml_str(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    #[cfg(feature = "std")]
    /// Save the current configuration to the provided file path.
    pub fn save_default<P: AsRef<std::path::Path>>(path: P) -> std::io::Result<()> {
        let config = Self::get();
        let content = toml::to_string_pretty(config.as_ref())
            .map_err(|err| std::io::Error::new(std::io::ErrorKind::InvalidData, err))?;
        std::fs::write(path, content)
    }

    /// Overrides configuration fields based on environment variables.
    #[cfg(feature = "std")]
    pub fn override_from_env(self) -> Self {
        self.override_from(|key| std::env::var(key).ok())
    }

    /// Overrides configuration fields from a variable lookup.
    pub fn override_from<F>(mut self, var: F) -> Self
    where
        F: Fn(&str) -> Option<alloc::string::String>,
    {
        if let Some(val) = var("CUBECL_TILE_LOG") {
            match val.as_str() {
                "stdout" => self.logger.stdout = true,
                "stderr" => self.logger.stderr = true,
                "1" | "true" => self.logger.level = TileLogLevel::Full,
                "0" | "false" => self.logger.level = TileLogLevel::Disabled,
                _ => {}
            }
        }

        if let Some(val) = var("CUBECL_TILE_LOG_LEVEL") {
            match val.as_str() {
                "disabled" => self.logger.level = TileLogLevel::Disabled,
                "basic" => self.logger.level = TileLogLevel::Basic,
                "full" => self.logger.level = TileLogLevel::Full,
                _ => {}
            }
        }

        if let Some(val) = var("CUBECL_TILE_STRICT_ORDER") {
            match val.as_str() {
                "1" | "true" => self.validation.strict_tile_order = true,
                "0" | "false" => self.validation.strict_tile_order = false,
                _ => {}
            }
        }

        self
    }

    // Loads the configuration file from the current directory or its parents.
    //
    // Returns a default configuration if no file is found.
    #[cfg(feature = "std")]
    fn from_current_dir() -> Self {
        let Ok(mut dir) = std::env::current_dir() else {
            return Self::default();
        };

        loop {
            let path = dir.join(CONFIG_FILE_NAME);
            if let Ok(content) = std::fs::read_to_string(&path) {
                match Self::from_toml_str(&content) {
                    Ok(config) => return config,
                    Err(err) => {
                        log::warn!("Ignoring invalid config {}: {err}", path.display());
                        return Self::default();
                    }
                }
            }

            if !dir.pop() {
                break;
            }
        }

        Self::default()
    }
}
