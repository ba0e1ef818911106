use puzzler_config::{Config, ProviderConfig};

/// Strategy for displaying configuration information.
///
/// Prints the resolved configuration (file plus environment) with API keys
/// masked, and which lecture sources are usable with it.
#[derive(Debug, Clone, Copy)]
pub struct InfoStrategy;

impl super::CommandStrategy for InfoStrategy {
    type Input = ();

    async fn execute(&self, _input: Self::Input) -> anyhow::Result<()> {
        let config = Config::load()?;

        println!("=== puzzler Configuration ===\n");
        println!("Config file: {}\n", Config::config_path()?.display());

        println!("API Keys:");
        println!("  Gemini: {}", mask_key(&config.providers.gemini));
        println!("  OpenAI: {}", mask_key(&config.providers.openai));
        println!();

        println!("Generation:");
        println!("  Model: {}", config.generation.model);
        println!("  Base URL: {}", truncate(&config.generation.base_url, 60));
        println!("  Turn Limit: {}", config.generation.turn_limit);
        println!();

        println!("Transcription:");
        println!("  Base URL: {}", config.transcription.base_url);
        println!("  Model: {}", config.transcription.model);
        if let Some(ref language) = config.transcription.language {
            println!("  Language: {language}");
        }
        let status = if config.providers.openai.key().is_some() {
            "enabled"
        } else {
            "disabled (no OpenAI API key)"
        };
        println!("  Status: {status}");
        println!();

        println!("YouTube:");
        println!("  Caption Language: {}", config.youtube.language);

        Ok(())
    }
}

fn mask_key(provider: &ProviderConfig) -> String {
    match provider.key() {
        None => "(not set)".to_string(),
        Some(key) if key.chars().count() > 8 => {
            let chars: Vec<char> = key.chars().collect();
            let head: String = chars[..4].iter().collect();
            let tail: String = chars[chars.len() - 4..].iter().collect();
            format!("{head}...{tail}")
        }
        Some(_) => "***".to_string(),
    }
}

fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let head: String = s.chars().take(max_len - 3).collect();
        format!("{head}...")
    }
}
