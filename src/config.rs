use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct VignetteConfig {
    pub server: ServerConfig,
    pub storage: StorageConfig,
    pub embedding: EmbeddingConfig,
    pub cache: CacheConfig,
    pub generation: GenerationConfig,
    pub learning_path: LearningPathConfig,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub log_level: String,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct StorageConfig {
    pub db_path: String,
    pub collection: String,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct EmbeddingConfig {
    pub provider: String,
    pub model: String,
    pub cache_dir: String,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct CacheConfig {
    /// Cosine similarity above which a stored image is reused (strict `>`).
    pub similarity_threshold: f64,
    /// Hard cap on image generations per request.
    pub max_generations: usize,
    /// Number of leading learning-path units to enrich.
    pub unit_limit: usize,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct GenerationConfig {
    pub base_url: String,
    pub api_key: String,
    pub model: String,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct LearningPathConfig {
    pub base_url: String,
    pub session_token: String,
    pub session_token_2: String,
}

impl Default for VignetteConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            storage: StorageConfig::default(),
            embedding: EmbeddingConfig::default(),
            cache: CacheConfig::default(),
            generation: GenerationConfig::default(),
            learning_path: LearningPathConfig::default(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".into(),
            port: 8098,
            log_level: "info".into(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        let db_path = default_vignette_dir()
            .join("cache.db")
            .to_string_lossy()
            .into_owned();
        Self {
            db_path,
            collection: "titles".into(),
        }
    }
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        let cache_dir = default_vignette_dir()
            .join("models")
            .to_string_lossy()
            .into_owned();
        Self {
            provider: "local".into(),
            model: "all-MiniLM-L6-v2".into(),
            cache_dir,
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            similarity_threshold: 0.8,
            max_generations: 2,
            unit_limit: 2,
        }
    }
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.together.xyz".into(),
            api_key: String::new(),
            model: "black-forest-labs/FLUX.1-schnell".into(),
        }
    }
}

impl Default for LearningPathConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            session_token: String::new(),
            session_token_2: String::new(),
        }
    }
}

/// Returns `~/.vignette/`
pub fn default_vignette_dir() -> PathBuf {
    dirs::home_dir()
        .expect("home directory must exist")
        .join(".vignette")
}

/// Returns the default config file path: `~/.vignette/config.toml`
pub fn default_config_path() -> PathBuf {
    default_vignette_dir().join("config.toml")
}

impl VignetteConfig {
    /// Load config from TOML file (if it exists) then apply env var overrides.
    pub fn load() -> Result<Self> {
        Self::load_from(default_config_path())
    }

    /// Load from a specific path, then apply env var overrides.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let mut config = if path.exists() {
            let contents =
                std::fs::read_to_string(path).context("failed to read config file")?;
            toml::from_str(&contents).context("failed to parse config TOML")?
        } else {
            info!("no config file at {}, using defaults", path.display());
            VignetteConfig::default()
        };

        config.apply_env_overrides();
        Ok(config)
    }

    /// Apply environment variable overrides. Secrets (API key, session tokens)
    /// are expected to arrive this way rather than living in the TOML file.
    fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var("VIGNETTE_DB") {
            self.storage.db_path = val;
        }
        if let Ok(val) = std::env::var("VIGNETTE_LOG_LEVEL") {
            self.server.log_level = val;
        }
        if let Ok(val) = std::env::var("VIGNETTE_SIMILARITY_THRESHOLD") {
            if let Ok(parsed) = val.parse::<f64>() {
                self.cache.similarity_threshold = parsed;
            }
        }
        if let Ok(val) = std::env::var("VIGNETTE_TOGETHER_URL") {
            self.generation.base_url = val;
        }
        if let Ok(val) = std::env::var("VIGNETTE_TOGETHER_API_KEY") {
            self.generation.api_key = val;
        }
        if let Ok(val) = std::env::var("VIGNETTE_LEARNING_URL") {
            self.learning_path.base_url = val;
        }
        if let Ok(val) = std::env::var("VIGNETTE_SESSION_TOKEN") {
            self.learning_path.session_token = val;
        }
        if let Ok(val) = std::env::var("VIGNETTE_SESSION_TOKEN_2") {
            self.learning_path.session_token_2 = val;
        }
    }

    /// Validate settings the server cannot run without. Called once at startup;
    /// the algorithmic code never reads the environment itself.
    pub fn validate(&self) -> Result<()> {
        anyhow::ensure!(
            (-1.0..=1.0).contains(&self.cache.similarity_threshold),
            "cache.similarity_threshold must be within [-1, 1] (cosine similarity), got {}",
            self.cache.similarity_threshold
        );
        anyhow::ensure!(
            crate::db::schema::is_valid_collection(&self.storage.collection),
            "storage.collection must be a bare identifier, got {:?}",
            self.storage.collection
        );
        anyhow::ensure!(
            !self.generation.base_url.is_empty(),
            "generation.base_url is required (or set VIGNETTE_TOGETHER_URL)"
        );
        anyhow::ensure!(
            !self.generation.api_key.is_empty(),
            "generation.api_key is required (or set VIGNETTE_TOGETHER_API_KEY)"
        );
        anyhow::ensure!(
            !self.learning_path.base_url.is_empty(),
            "learning_path.base_url is required (or set VIGNETTE_LEARNING_URL)"
        );
        anyhow::ensure!(
            !self.learning_path.session_token.is_empty(),
            "learning_path.session_token is required (or set VIGNETTE_SESSION_TOKEN)"
        );
        Ok(())
    }

    /// Resolve the database path, expanding `~` if needed.
    pub fn resolved_db_path(&self) -> PathBuf {
        expand_tilde(&self.storage.db_path)
    }
}

pub fn expand_tilde(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        dirs::home_dir()
            .expect("home directory must exist")
            .join(rest)
    } else {
        PathBuf::from(path)
    }
}
