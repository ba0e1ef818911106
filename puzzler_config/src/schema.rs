use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;

// Extraction settings live next to the extractors that use them
use puzzler_extract::{TranscriptionConfig, YouTubeConfig};

const CONFIG_DIR: &str = "puzzler";
const CONFIG_FILE: &str = "config.json";

const CONFIG_TEMPLATE: &str = r#"{
  "generation": {
    "model": "gemini-2.0-flash",
    "base_url": "https://generativelanguage.googleapis.com/v1beta",
    "turn_limit": 5
  },
  "providers": {
    "gemini": {
      "api_key": "your-gemini-api-key-here"
    },
    "openai": {
      "api_key": ""
    }
  },
  "transcription": {
    "base_url": "https://api.openai.com",
    "model": "whisper-1"
  },
  "youtube": {
    "language": "en"
  }
}"#;

#[derive(Debug, Default, Deserialize, Serialize, Clone)]
pub struct Config {
    #[serde(default)]
    pub generation: GenerationConfig,
    #[serde(default)]
    pub providers: ProvidersConfig,
    #[serde(default)]
    pub transcription: TranscriptionConfig,
    #[serde(default)]
    pub youtube: YouTubeConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct GenerationConfig {
    #[serde(default = "GenerationConfig::default_model")]
    pub model: String,
    #[serde(default = "GenerationConfig::default_base_url")]
    pub base_url: String,
    #[serde(default = "GenerationConfig::default_turn_limit")]
    pub turn_limit: usize,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            model: Self::default_model(),
            base_url: Self::default_base_url(),
            turn_limit: Self::default_turn_limit(),
        }
    }
}

impl GenerationConfig {
    fn default_model() -> String {
        "gemini-2.0-flash".to_string()
    }

    fn default_base_url() -> String {
        "https://generativelanguage.googleapis.com/v1beta".to_string()
    }

    const fn default_turn_limit() -> usize {
        puzzler_core::DEFAULT_TURN_LIMIT
    }
}

#[derive(Debug, Default, Deserialize, Serialize, Clone)]
pub struct ProvidersConfig {
    #[serde(default)]
    pub gemini: ProviderConfig,
    #[serde(default)]
    pub openai: ProviderConfig,
}

#[derive(Debug, Default, Deserialize, Serialize, Clone)]
pub struct ProviderConfig {
    #[serde(default)]
    pub api_key: String,
}

impl ProviderConfig {
    /// The key, unless it is empty or still the template placeholder.
    #[must_use]
    pub fn key(&self) -> Option<&str> {
        let key = self.api_key.trim();
        (!key.is_empty() && !key.starts_with("your-")).then_some(key)
    }
}

impl Config {
    pub fn config_dir() -> anyhow::Result<PathBuf> {
        Ok(dirs::home_dir()
            .ok_or_else(|| anyhow::anyhow!("Cannot find home directory"))?
            .join(CONFIG_DIR))
    }

    pub fn config_path() -> anyhow::Result<PathBuf> {
        Ok(Self::config_dir()?.join(CONFIG_FILE))
    }

    /// Load `~/puzzler/config.json` (defaults when absent), then apply
    /// `GEMINI_API_KEY` / `OPENAI_API_KEY` from the environment or `.env`.
    pub fn load() -> anyhow::Result<Self> {
        let config_path = Self::config_path()?;

        let mut config = if config_path.exists() {
            let config = Self::load_from(&config_path)?;
            info!("Loaded config from {}", config_path.display());
            config
        } else {
            info!(
                "No config file at {}, using defaults",
                config_path.display()
            );
            Self::default()
        };

        if let Ok(path) = dotenvy::dotenv() {
            info!("Loaded environment from {}", path.display());
        }
        config.apply_env_overrides(|name| std::env::var(name).ok());

        Ok(config)
    }

    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&content).map_err(|e| {
            anyhow::anyhow!("Invalid config file {}: {e}", path.display())
        })?;
        Ok(config)
    }

    /// Non-empty environment values replace the API keys from the file.
    pub fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

        if let Some(key) = non_empty("GEMINI_API_KEY") {
            self.providers.gemini.api_key = key;
        }
        if let Some(key) = non_empty("OPENAI_API_KEY") {
            self.providers.openai.api_key = key;
        }
    }

    pub fn ensure_config_dir() -> anyhow::Result<PathBuf> {
        let config_dir = Self::config_dir()?;
        std::fs::create_dir_all(&config_dir)?;
        Ok(config_dir)
    }

    pub fn create_config() -> anyhow::Result<()> {
        let config_dir = Self::ensure_config_dir()?;
        let config_path = config_dir.join(CONFIG_FILE);

        if config_path.exists() {
            anyhow::bail!(
                "Config file already exists at: {}. Please edit it directly.",
                config_path.display()
            );
        }

        std::fs::write(&config_path, CONFIG_TEMPLATE)?;

        println!("✅ Created config file at: {}", config_path.display());
        println!();
        println!("📝 Next steps:");
        println!("   1. Edit the config file and add your Gemini API key");
        println!("      (or set GEMINI_API_KEY in the environment or a .env file)");
        println!("   2. Add an OpenAI API key if you want to transcribe video uploads");
        println!("   3. Run 'puzzler study --text \"...\"' to start a session");
        println!();
        println!("🔧 Configuration options:");
        println!("   - generation.model: Gemini model to use (gemini-2.0-flash, gemini-1.5-pro, etc.)");
        println!("   - generation.turn_limit: Number of questions the student asks");
        println!("   - youtube.language: Caption language to fetch");
        println!();
        Ok(())
    }
}
