//! Settings file loading for the Cloudgram binary
//!
//! This module handles finding and loading the TOML settings file from
//! various locations (explicit path, local directory, system directory).
//! The `[render]` table is the library's [`AppConfig`]; `[server]` and
//! `[assistant]` are owned by the binary.

use std::{
    env, fs,
    net::SocketAddr,
    path::{Path, PathBuf},
    time::Duration,
};

use directories::ProjectDirs;
use log::{debug, info};
use serde::Deserialize;

use cloudgram::config::AppConfig;

use crate::error::ServerError;

/// Everything the binary reads from its settings file.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Settings {
    #[serde(default)]
    server: ServerConfig,

    #[serde(default)]
    render: AppConfig,

    #[serde(default)]
    assistant: AssistantConfig,
}

impl Settings {
    pub fn server(&self) -> &ServerConfig {
        &self.server
    }

    pub fn render(&self) -> &AppConfig {
        &self.render
    }

    pub fn assistant(&self) -> &AssistantConfig {
        &self.assistant
    }

    /// Replaces the output directory of the render section.
    pub fn with_output_directory(mut self, directory: impl Into<PathBuf>) -> Self {
        self.render = self.render.with_output_directory(directory);
        self
    }

    /// Replaces the listen address of the server section.
    pub fn with_listen(mut self, listen: impl Into<String>) -> Self {
        self.server.listen = listen.into();
        self
    }
}

/// HTTP service settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Socket address to listen on.
    listen: String,

    /// Seconds between two retention sweeps; 0 sweeps only at startup.
    sweep_interval_secs: u64,
}

impl ServerConfig {
    pub fn listen(&self) -> &str {
        &self.listen
    }

    /// Parses the listen address.
    ///
    /// # Errors
    ///
    /// Returns [`ServerError::Address`] if it is not a socket address.
    pub fn listen_addr(&self) -> Result<SocketAddr, ServerError> {
        self.listen.parse().map_err(|source| ServerError::Address {
            address: self.listen.clone(),
            source,
        })
    }

    /// Interval of the periodic sweep, `None` when disabled.
    pub fn sweep_interval(&self) -> Option<Duration> {
        (self.sweep_interval_secs > 0).then(|| Duration::from_secs(self.sweep_interval_secs))
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen: "127.0.0.1:8000".to_string(),
            sweep_interval_secs: 300,
        }
    }
}

/// Conversational assistant settings.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AssistantConfig {
    /// Providers in order of preference; the first is primary, the rest are fallbacks.
    #[serde(default)]
    providers: Vec<ProviderSettings>,
}

impl AssistantConfig {
    pub fn providers(&self) -> &[ProviderSettings] {
        &self.providers
    }

    pub fn is_enabled(&self) -> bool {
        !self.providers.is_empty()
    }
}

/// One language model provider.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ProviderSettings {
    /// Backend name: openai, anthropic, google, ollama, groq, mistral or deepseek.
    provider: String,

    model: String,

    /// Literal API key; takes precedence over `api_key_env`.
    #[serde(default)]
    api_key: Option<String>,

    /// Environment variable holding the API key.
    #[serde(default)]
    api_key_env: Option<String>,

    #[serde(default)]
    temperature: Option<f32>,
}

impl ProviderSettings {
    pub fn new(provider: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            provider: provider.into(),
            model: model.into(),
            api_key: None,
            api_key_env: None,
            temperature: None,
        }
    }

    pub fn provider(&self) -> &str {
        &self.provider
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn temperature(&self) -> Option<f32> {
        self.temperature
    }

    /// Resolves the API key from the literal value or the named environment
    /// variable. Empty values count as absent.
    pub fn api_key(&self) -> Option<String> {
        self.api_key
            .clone()
            .or_else(|| {
                self.api_key_env
                    .as_ref()
                    .and_then(|name| env::var(name).ok())
            })
            .filter(|key| !key.trim().is_empty())
    }
}

/// Find and load settings from various locations
///
/// Search order:
/// 1. Explicit path if provided
/// 2. Local project directory (cloudgram/config.toml)
/// 3. Platform-specific config directory
/// 4. Default settings if none found
///
/// # Errors
///
/// Returns error if:
/// - Explicit path is provided but file doesn't exist
/// - Settings file exists but cannot be parsed
pub fn load_settings(explicit_path: Option<impl AsRef<Path>>) -> Result<Settings, ServerError> {
    if let Some(path) = explicit_path {
        let path = path.as_ref();
        info!(path = path.display().to_string(); "Loading settings from explicit path");
        return load_settings_file(path);
    }

    let local_config = Path::new("cloudgram/config.toml");
    if local_config.exists() {
        info!(path = local_config.display().to_string(); "Loading settings from local path");
        return load_settings_file(local_config);
    }

    if let Some(proj_dirs) = ProjectDirs::from("com", "cloudgram", "cloudgram") {
        let system_config = proj_dirs.config_dir().join("config.toml");

        if system_config.exists() {
            info!(path = system_config.display().to_string(); "Loading settings from system path");
            return load_settings_file(system_config);
        }

        debug!(path = system_config.display().to_string(); "System settings file not found");
    } else {
        debug!("Could not determine platform-specific config directory");
    }

    debug!("No settings file found, using default settings");
    Ok(Settings::default())
}

fn load_settings_file(path: impl AsRef<Path>) -> Result<Settings, ServerError> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(ServerError::MissingConfig(path.to_path_buf()));
    }

    let content = fs::read_to_string(path)?;
    parse_settings(&content)
}

/// Parses and validates settings from TOML text.
///
/// # Errors
///
/// Returns [`ServerError::ConfigParse`] for malformed TOML and
/// [`ServerError::InvalidConfig`] for values that parse but cannot be used.
pub fn parse_settings(content: &str) -> Result<Settings, ServerError> {
    let settings: Settings =
        toml::from_str(content).map_err(|e| ServerError::ConfigParse(e.to_string()))?;

    settings.server.listen_addr()?;
    settings
        .render
        .style()
        .background_color()
        .map_err(ServerError::InvalidConfig)?;
    for provider in &settings.assistant.providers {
        if provider.model.trim().is_empty() {
            return Err(ServerError::InvalidConfig(format!(
                "provider `{}` has no model",
                provider.provider
            )));
        }
    }

    Ok(settings)
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use tempfile::NamedTempFile;

    use cloudgram::config::RetentionConfig;

    use super::*;

    #[test]
    fn test_empty_settings_use_defaults() {
        let settings = parse_settings("").unwrap();

        assert_eq!(settings.server().listen(), "127.0.0.1:8000");
        assert_eq!(
            settings.server().sweep_interval(),
            Some(Duration::from_secs(300))
        );
        assert_eq!(
            settings.render().output().directory(),
            Path::new("outputs")
        );
        assert!(!settings.assistant().is_enabled());
    }

    #[test]
    fn test_full_settings() {
        let settings = parse_settings(
            r##"
            [server]
            listen = "0.0.0.0:9000"
            sweep_interval_secs = 0

            [render.output]
            directory = "diagrams"
            scale = 2.0

            [render.output.retention]
            max_files = 10
            max_age_secs = 0

            [render.style]
            background_color = "#f8f8f8"

            [render.layout]
            horizontal_spacing = 120.0

            [[assistant.providers]]
            provider = "google"
            model = "gemini-2.0-flash-001"
            api_key = "secret"
            temperature = 0.0

            [[assistant.providers]]
            provider = "ollama"
            model = "llama3"
            "##,
        )
        .unwrap();

        assert_eq!(settings.server().listen(), "0.0.0.0:9000");
        assert_eq!(settings.server().sweep_interval(), None);
        assert_eq!(
            settings.render().output().directory(),
            Path::new("diagrams")
        );
        assert_eq!(settings.render().output().scale(), 2.0);
        assert_eq!(
            *settings.render().output().retention(),
            RetentionConfig::new(10, 0)
        );

        let providers = settings.assistant().providers();
        assert_eq!(providers.len(), 2);
        assert_eq!(providers[0].provider(), "google");
        assert_eq!(providers[0].api_key().as_deref(), Some("secret"));
        assert_eq!(providers[1].model(), "llama3");
        assert_eq!(providers[1].api_key(), None);
    }

    #[test]
    fn test_malformed_toml_is_parse_error() {
        let err = parse_settings("[server\nlisten = 1").unwrap_err();
        assert!(matches!(err, ServerError::ConfigParse(_)));
    }

    #[test]
    fn test_invalid_listen_address() {
        let err = parse_settings("[server]\nlisten = \"not an address\"").unwrap_err();
        assert!(matches!(err, ServerError::Address { .. }));
    }

    #[test]
    fn test_invalid_background_color() {
        let err = parse_settings("[render.style]\nbackground_color = \"no-such-color\"").unwrap_err();
        assert!(matches!(err, ServerError::InvalidConfig(_)));
    }

    #[test]
    fn test_provider_without_model_is_invalid() {
        let err = parse_settings("[[assistant.providers]]\nprovider = \"openai\"\nmodel = \"\"")
            .unwrap_err();
        assert!(matches!(err, ServerError::InvalidConfig(_)));
    }

    #[test]
    fn test_load_explicit_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[server]\nlisten = \"127.0.0.1:9100\"").unwrap();

        let settings = load_settings(Some(file.path())).unwrap();
        assert_eq!(settings.server().listen(), "127.0.0.1:9100");
    }

    #[test]
    fn test_load_missing_explicit_file() {
        let err = load_settings(Some("/definitely/not/here/config.toml")).unwrap_err();
        assert!(matches!(err, ServerError::MissingConfig(_)));
    }

    #[test]
    fn test_overrides() {
        let settings = Settings::default()
            .with_output_directory("elsewhere")
            .with_listen("127.0.0.1:1");
        assert_eq!(
            settings.render().output().directory(),
            Path::new("elsewhere")
        );
        assert_eq!(settings.server().listen(), "127.0.0.1:1");
    }
}
