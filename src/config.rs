use std::path::Path;

use anyhow::{bail, Result};
use clap_serde_derive::ClapSerde;
use serde::{Deserialize, Serialize};

use crate::adapter::{MissingQuestionPolicy, DEFAULT_QUESTION};
use crate::invoker::gemini::GEMINI_API_BASE;
use crate::invoker::GenerationParams;
use crate::prompt::PromptStyle;
use crate::shaper::ErrorBodyFormat;

#[derive(ClapSerde, Debug)]
pub struct Config {
    /// The address the listener binds to
    #[default("0.0.0.0".to_string())]
    #[arg(short, long, env)]
    pub address: String,

    /// The port the listener binds to
    #[default(25566)]
    #[arg(short, long, env)]
    pub port: u16,

    /// API key for the model provider, empty when not configured
    #[default(String::new())]
    #[arg(long, env = "GEMINI_API_KEY", hide_env_values = true)]
    pub api_key: String,

    /// Base URL of the model provider's REST API
    #[default(GEMINI_API_BASE.to_string())]
    #[arg(long, env)]
    pub api_base: String,

    /// OTLP collector endpoint, traces are only exported when set
    #[default(String::new())]
    #[arg(long, env)]
    pub otlp_endpoint: String,

    /// Keep logging to the console while exporting traces
    #[default(false)]
    #[arg(long, env)]
    pub console: bool,

    /// Endpoint profiles, configurable through the TOML file only
    #[default(EndpointProfile::builtin())]
    #[arg(skip)]
    pub endpoints: Vec<EndpointProfile>,
}

pub const DEFAULT_CONFIG_FILE: &str = "TcmAdvisor.toml";

impl Config {
    /// Reads the configuration file. Only the default file may be absent, in which case defaults apply.
    pub fn load_file(path: &str) -> Result<Self> {
        match Self::from_toml(path) {
            Ok(config) => Ok(config),
            Err(_) if path == DEFAULT_CONFIG_FILE && !Path::new(path).exists() => {
                Ok(Config::default())
            }
            Err(err) => Err(err.context(format!("Failed to read configuration file {}", path))),
        }
    }

    pub fn from_toml(path: &str) -> Result<Self> {
        let str = std::fs::read_to_string(path)?;
        Self::from_toml_str(&str)
    }

    pub fn from_toml_str(str: &str) -> Result<Self> {
        let opt: <Config as ClapSerde>::Opt = toml::from_str(str)?;
        let config = Config::from(opt);
        config.validate()?;
        Ok(config)
    }

    pub fn otlp_endpoint(&self) -> Option<&str> {
        Some(self.otlp_endpoint.trim()).filter(|endpoint| !endpoint.is_empty())
    }

    pub fn validate(&self) -> Result<()> {
        if self.endpoints.is_empty() {
            bail!("At least one endpoint must be configured");
        }
        for (index, endpoint) in self.endpoints.iter().enumerate() {
            if endpoint.name.trim().is_empty() {
                bail!("Endpoint on path {} has no name", endpoint.path);
            }
            if !endpoint.path.starts_with('/') {
                bail!(
                    "Endpoint {} has path {} which does not start with '/'",
                    endpoint.name,
                    endpoint.path
                );
            }
            if endpoint.path.contains([':', '*']) {
                bail!(
                    "Endpoint {} has path {} with route captures, only literal paths are allowed",
                    endpoint.name,
                    endpoint.path
                );
            }
            if endpoint.path == HEALTH_PATH {
                bail!("Endpoint {} cannot use the reserved path {}", endpoint.name, HEALTH_PATH);
            }
            if endpoint.model.trim().is_empty() {
                bail!("Endpoint {} has no model", endpoint.name);
            }
            if self.endpoints[..index]
                .iter()
                .any(|other| other.path == endpoint.path || other.name == endpoint.name)
            {
                bail!("Endpoint {} is configured twice", endpoint.name);
            }
        }
        Ok(())
    }
}

pub const HEALTH_PATH: &str = "/health";

/// One deployed endpoint: which model, which prompt and how failures are reported.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct EndpointProfile {
    /// The name used in logs and on the health route
    pub name: String,

    /// The route the endpoint is mounted on
    pub path: String,

    /// The provider model identifier
    pub model: String,

    pub prompt_style: PromptStyle,

    #[serde(default)]
    pub on_missing_question: MissingQuestionPolicy,

    #[serde(default)]
    pub error_body_format: ErrorBodyFormat,

    #[serde(default)]
    pub generation: GenerationParams,
}

impl EndpointProfile {
    /// The profiles the service ships with, one per historical handler.
    pub fn builtin() -> Vec<EndpointProfile> {
        vec![
            EndpointProfile {
                name: "ask".into(),
                path: "/api/ask".into(),
                model: "gemini-1.5-flash".into(),
                prompt_style: PromptStyle::StrictTerminology,
                on_missing_question: MissingQuestionPolicy::Fail,
                error_body_format: ErrorBodyFormat::Json,
                generation: GenerationParams::default(),
            },
            EndpointProfile {
                name: "diagnose".into(),
                path: "/api/diagnose".into(),
                model: "gemini-1.5-pro".into(),
                prompt_style: PromptStyle::StructuredPattern,
                on_missing_question: MissingQuestionPolicy::Fail,
                error_body_format: ErrorBodyFormat::PlainText,
                generation: GenerationParams::default(),
            },
            EndpointProfile {
                name: "chat".into(),
                path: "/api/chat".into(),
                model: "gemini-pro".into(),
                prompt_style: PromptStyle::BriefExpert,
                on_missing_question: MissingQuestionPolicy::UseDefault(DEFAULT_QUESTION.into()),
                error_body_format: ErrorBodyFormat::Json,
                generation: GenerationParams::default(),
            },
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = Config::default();
        assert_eq!(config.address, "0.0.0.0");
        assert_eq!(config.port, 25566);
        assert!(config.api_key.is_empty());
        assert_eq!(config.api_base, GEMINI_API_BASE);
        assert!(config.otlp_endpoint().is_none());
        assert_eq!(config.endpoints, EndpointProfile::builtin());
        config.validate().unwrap();
    }

    #[test]
    fn builtin_profiles_cover_each_variant() {
        let profiles = EndpointProfile::builtin();
        assert!(profiles
            .iter()
            .any(|p| p.error_body_format == ErrorBodyFormat::PlainText));
        assert!(profiles
            .iter()
            .any(|p| p.on_missing_question == MissingQuestionPolicy::Fail));
        assert!(profiles
            .iter()
            .any(|p| matches!(p.on_missing_question, MissingQuestionPolicy::UseDefault(_))));
    }

    #[test]
    fn endpoints_from_toml() {
        let config = Config::from_toml_str(
            r#"
            port = 8080

            [[endpoints]]
            name = "herbs"
            path = "/api/herbs"
            model = "gemini-2.0-flash"
            prompt_style = "brief_expert"
            on_missing_question = { use_default = "Which herbs tonify Qi?" }
            error_body_format = "plain_text"
            generation = { temperature = 0.2, max_output_tokens = 256 }
            "#,
        )
        .unwrap();
        assert_eq!(config.port, 8080);
        assert_eq!(config.address, "0.0.0.0");
        assert_eq!(config.endpoints.len(), 1);
        let endpoint = &config.endpoints[0];
        assert_eq!(endpoint.model, "gemini-2.0-flash");
        assert_eq!(
            endpoint.on_missing_question,
            MissingQuestionPolicy::UseDefault("Which herbs tonify Qi?".into())
        );
        assert_eq!(endpoint.generation.max_output_tokens, Some(256));
    }

    #[test]
    fn example_file_matches_builtin_profiles() {
        let config = Config::from_toml_str(include_str!("../TcmAdvisor.example.toml")).unwrap();
        let builtin = EndpointProfile::builtin();
        assert_eq!(config.endpoints.len(), builtin.len());
        for (example, builtin) in config.endpoints.iter().zip(&builtin) {
            assert_eq!(example.path, builtin.path);
            assert_eq!(example.model, builtin.model);
            assert_eq!(example.on_missing_question, builtin.on_missing_question);
            assert_eq!(example.error_body_format, builtin.error_body_format);
        }
    }

    #[test]
    fn profile_fields_default() {
        let config = Config::from_toml_str(
            r#"
            [[endpoints]]
            name = "plain"
            path = "/plain"
            model = "gemini-pro"
            prompt_style = "strict_terminology"
            "#,
        )
        .unwrap();
        let endpoint = &config.endpoints[0];
        assert_eq!(endpoint.on_missing_question, MissingQuestionPolicy::Fail);
        assert_eq!(endpoint.error_body_format, ErrorBodyFormat::Json);
        assert_eq!(endpoint.generation, GenerationParams::default());
    }

    #[test]
    fn rejects_duplicate_paths() {
        let err = Config::from_toml_str(
            r#"
            [[endpoints]]
            name = "a"
            path = "/same"
            model = "m"
            prompt_style = "brief_expert"

            [[endpoints]]
            name = "b"
            path = "/same"
            model = "m"
            prompt_style = "brief_expert"
            "#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("configured twice"));
    }

    #[test]
    fn explicit_missing_file_is_an_error() {
        let err = Config::load_file("does/not/exist/Custom.toml").unwrap_err();
        assert!(err.to_string().contains("does/not/exist/Custom.toml"));
    }

    #[test]
    fn missing_default_file_uses_defaults() {
        if Path::new(DEFAULT_CONFIG_FILE).exists() {
            return;
        }
        let config = Config::load_file(DEFAULT_CONFIG_FILE).unwrap();
        assert_eq!(config.endpoints, EndpointProfile::builtin());
    }

    #[test]
    fn rejects_blank_name() {
        let err = Config::from_toml_str(
            r#"
            [[endpoints]]
            name = " "
            path = "/a"
            model = "m"
            prompt_style = "brief_expert"
            "#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("has no name"));
    }

    #[test]
    fn rejects_route_captures() {
        for path in ["/api/:model", "/api/*rest"] {
            let mut config = Config::default();
            config.endpoints[0].path = path.to_string();
            let err = config.validate().unwrap_err();
            assert!(err.to_string().contains("route captures"), "{}", path);
        }
    }

    #[test]
    fn rejects_health_path() {
        let err = Config::from_toml_str(
            r#"
            [[endpoints]]
            name = "a"
            path = "/health"
            model = "m"
            prompt_style = "brief_expert"
            "#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("reserved"));
    }
}
