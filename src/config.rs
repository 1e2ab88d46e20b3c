//! Provider configuration.
//!
//! Configuration is plain serde data so it can be loaded from TOML, YAML
//! or built in code. Each concrete provider holds its settings behind an
//! [`arc_swap::ArcSwap`], so a configuration reload becomes visible to
//! in-flight availability checks at the next call without locking.

use serde::Deserialize;

/// Top-level AI gateway configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AiConfig {
    /// Fallback order. Entries are provider registry keys; unknown keys
    /// are skipped with a warning at call time.
    #[serde(default = "default_priority")]
    pub provider_priority: Vec<String>,
    #[serde(default)]
    pub gemini: ProviderSettings,
    #[serde(default)]
    pub groq: ProviderSettings,
    #[serde(default)]
    pub openai: ProviderSettings,
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            provider_priority: default_priority(),
            gemini: ProviderSettings::default(),
            groq: ProviderSettings::default(),
            openai: ProviderSettings::default(),
        }
    }
}

fn default_priority() -> Vec<String> {
    vec!["gemini".into(), "groq".into(), "openai".into()]
}

/// Settings for one upstream provider.
#[derive(Debug, Clone, Deserialize)]
pub struct ProviderSettings {
    /// Master switch. A disabled provider is skipped by the orchestrator.
    #[serde(default)]
    pub enabled: bool,
    /// Bearer credential. Absence makes the provider unavailable.
    #[serde(default)]
    pub api_key: Option<String>,
    /// Override for the vendor endpoint (used by tests; each provider
    /// has a production default).
    #[serde(default)]
    pub base_url: Option<String>,
    /// Model identifier sent upstream. Empty string selects the
    /// provider's built-in default.
    #[serde(default)]
    pub model: String,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    #[serde(default = "default_temperature")]
    pub temperature: f64,
    /// Upstream call timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

impl Default for ProviderSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            api_key: None,
            base_url: None,
            model: String::new(),
            max_tokens: default_max_tokens(),
            temperature: default_temperature(),
            timeout_secs: default_timeout(),
        }
    }
}

impl ProviderSettings {
    /// Enabled and credentialed. Pure configuration check, no network
    /// call — this is what `AiProvider::is_available()` reflects.
    pub fn is_configured(&self) -> bool {
        self.enabled && self.api_key.as_deref().is_some_and(|k| !k.is_empty())
    }
}

fn default_max_tokens() -> u32 {
    1024
}

fn default_temperature() -> f64 {
    0.7
}

fn default_timeout() -> u64 {
    30
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_settings_are_unavailable() {
        let settings = ProviderSettings::default();
        assert!(!settings.is_configured());
    }

    #[test]
    fn enabled_without_key_is_unavailable() {
        let settings = ProviderSettings {
            enabled: true,
            ..ProviderSettings::default()
        };
        assert!(!settings.is_configured());

        let settings = ProviderSettings {
            enabled: true,
            api_key: Some(String::new()),
            ..ProviderSettings::default()
        };
        assert!(!settings.is_configured());
    }

    #[test]
    fn enabled_with_key_is_available() {
        let settings = ProviderSettings {
            enabled: true,
            api_key: Some("sk-test".into()),
            ..ProviderSettings::default()
        };
        assert!(settings.is_configured());
    }
}
