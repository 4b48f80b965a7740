//! Configuration types for the chat application.
//!
//! This module provides CLI argument parsing via `arrrg` and configuration
//! structures for controlling the client.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use arrrg_derive::CommandLine;

use crate::types::Model;

/// Environment variable that overrides where logins are persisted.
pub const AUTH_FILE_ENV: &str = "AETHERMIND_AUTH_FILE";

/// Default request timeout in seconds.
const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Command-line arguments for the aethermind-chat tool.
#[derive(CommandLine, Debug, Default, PartialEq, Eq)]
pub struct ChatArgs {
    /// Base URL of the chat API.
    #[arrrg(optional, "API base URL (default: $AETHERMIND_BASE_URL or http://localhost:8787/)", "URL")]
    pub base_url: Option<String>,

    /// Model to use for chat.
    #[arrrg(optional, "Model to use (default: qwen/qwen-turbo)", "MODEL")]
    pub model: Option<String>,

    /// Request timeout in seconds.
    #[arrrg(optional, "Request timeout in seconds (default: 60)", "SECS")]
    pub timeout_secs: Option<u64>,

    /// Where users and logins are stored.
    #[arrrg(optional, "Auth file (default: $AETHERMIND_AUTH_FILE or ~/.aethermind/auth.json)", "PATH")]
    pub auth_file: Option<String>,

    /// Wait for whole replies instead of streaming.
    #[arrrg(flag, "Disable streamed replies")]
    pub no_stream: bool,

    /// Disable ANSI colors and styles.
    #[arrrg(flag, "Disable ANSI colors/styles")]
    pub no_color: bool,
}

/// Configuration for the chat client.
///
/// This struct holds the resolved configuration values after processing
/// command-line arguments with appropriate defaults.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatConfig {
    /// Base URL; `None` defers to the environment and the built-in default.
    pub base_url: Option<String>,

    /// The model selected for new sessions.
    pub model: Model,

    /// Request timeout.
    pub timeout: Duration,

    /// Where users and logins are stored.
    pub auth_file: PathBuf,

    /// Whether replies are streamed.
    pub streaming: bool,

    /// Whether to use ANSI colors and styles in output.
    pub use_color: bool,
}

impl ChatConfig {
    /// Creates a new ChatConfig with default values.
    ///
    /// Defaults:
    /// - Model: qwen/qwen-turbo
    /// - Timeout: 60 seconds
    /// - Streaming: enabled
    /// - Color: enabled
    pub fn new() -> Self {
        Self {
            base_url: None,
            model: Model::default(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            auth_file: default_auth_file(),
            streaming: true,
            use_color: true,
        }
    }

    /// Sets the API base URL.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Sets the model to use.
    pub fn with_model(mut self, model: Model) -> Self {
        self.model = model;
        self
    }

    /// Sets the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sets the auth file.
    pub fn with_auth_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.auth_file = path.into();
        self
    }

    /// Sets whether replies are streamed.
    pub fn with_streaming(mut self, streaming: bool) -> Self {
        self.streaming = streaming;
        self
    }

    /// Disables ANSI color output.
    pub fn without_color(mut self) -> Self {
        self.use_color = false;
        self
    }
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl From<ChatArgs> for ChatConfig {
    fn from(args: ChatArgs) -> Self {
        let defaults = ChatConfig::new();
        ChatConfig {
            base_url: args.base_url,
            model: args
                .model
                .map(|s| Model::from(s.as_str()))
                .unwrap_or(defaults.model),
            timeout: args
                .timeout_secs
                .map(Duration::from_secs)
                .unwrap_or(defaults.timeout),
            auth_file: args
                .auth_file
                .map(PathBuf::from)
                .unwrap_or(defaults.auth_file),
            streaming: !args.no_stream,
            use_color: !args.no_color,
        }
    }
}

/// `$AETHERMIND_AUTH_FILE`, else `$HOME/.aethermind/auth.json`, else `.aethermind/auth.json`.
pub fn default_auth_file() -> PathBuf {
    if let Some(path) = env::var_os(AUTH_FILE_ENV).filter(|p| !p.is_empty()) {
        return PathBuf::from(path);
    }
    let home = env::var_os("HOME")
        .filter(|h| !h.is_empty())
        .map(PathBuf::from)
        .unwrap_or_default();
    home.join(".aethermind").join("auth.json")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::KnownModel;

    #[test]
    fn default_config() {
        let config = ChatConfig::new();
        assert_eq!(config.model, Model::Known(KnownModel::QwenTurbo));
        assert_eq!(config.timeout, Duration::from_secs(60));
        assert!(config.base_url.is_none());
        assert!(config.streaming);
        assert!(config.use_color);
        assert!(config.auth_file.ends_with("auth.json"));
    }

    #[test]
    fn config_from_args_defaults() {
        let config = ChatConfig::from(ChatArgs::default());
        assert_eq!(config.model, Model::Known(KnownModel::QwenTurbo));
        assert!(config.streaming);
        assert!(config.use_color);
    }

    #[test]
    fn config_from_args_custom() {
        let args = ChatArgs {
            base_url: Some("http://research.local:9000/".to_string()),
            model: Some("deepseek/deepseek-coder".to_string()),
            timeout_secs: Some(5),
            auth_file: Some("/tmp/auth.json".to_string()),
            no_stream: true,
            no_color: true,
        };
        let config = ChatConfig::from(args);
        assert_eq!(config.base_url.as_deref(), Some("http://research.local:9000/"));
        assert_eq!(config.model, Model::Known(KnownModel::DeepseekCoder));
        assert_eq!(config.timeout, Duration::from_secs(5));
        assert_eq!(config.auth_file, PathBuf::from("/tmp/auth.json"));
        assert!(!config.streaming);
        assert!(!config.use_color);
    }

    #[test]
    fn unknown_models_are_kept() {
        let args = ChatArgs {
            model: Some("mistral/large".to_string()),
            ..ChatArgs::default()
        };
        assert_eq!(
            ChatConfig::from(args).model,
            Model::Custom("mistral/large".to_string())
        );
    }

    #[test]
    fn config_builder_pattern() {
        let config = ChatConfig::new()
            .with_base_url("http://localhost:1234/")
            .with_model(Model::Known(KnownModel::QwenPlus))
            .with_timeout(Duration::from_secs(1))
            .with_auth_file("auth.json")
            .with_streaming(false)
            .without_color();
        assert_eq!(config.base_url.as_deref(), Some("http://localhost:1234/"));
        assert_eq!(config.model, Model::Known(KnownModel::QwenPlus));
        assert_eq!(config.timeout, Duration::from_secs(1));
        assert_eq!(config.auth_file, PathBuf::from("auth.json"));
        assert!(!config.streaming);
        assert!(!config.use_color);
    }
}
