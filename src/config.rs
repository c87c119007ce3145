//! Configuration types, read from the environment.

use std::path::PathBuf;

use secrecy::SecretString;

use crate::classifier::DEFAULT_MAX_TOKENS;
use crate::error::ConfigError;
use crate::llm::{LlmBackend, LlmConfig};
use crate::platform::UserId;
use crate::review::ReviewCancelPolicy;

/// Default model for the classifier.
pub const DEFAULT_MODEL: &str = "claude-3-opus-20240229";

/// Default group number; channels are named `group-<n>` and `group-<n>-mod`.
pub const DEFAULT_GROUP: u32 = 31;

/// Routing configuration.
#[derive(Debug, Clone)]
pub struct RouterConfig {
    /// Channel whose messages are auto-scanned.
    pub monitored_channel: String,
    /// Channel where moderators review and alerts are posted.
    pub mod_channel: String,
    pub cancel_policy: ReviewCancelPolicy,
    /// Messages from this user are ignored.
    pub bot_user_id: Option<UserId>,
}

impl RouterConfig {
    /// Channel names derived from a group number.
    pub fn for_group(group: u32) -> Self {
        Self {
            monitored_channel: format!("group-{group}"),
            mod_channel: format!("group-{group}-mod"),
            cancel_policy: ReviewCancelPolicy::default(),
            bot_user_id: None,
        }
    }
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self::for_group(DEFAULT_GROUP)
    }
}

/// Discord settings. Absent when no bot token is configured.
#[derive(Debug, Clone)]
pub struct DiscordConfig {
    pub bot_token: SecretString,
    pub api_base: Option<String>,
    pub gateway_url: Option<String>,
}

/// Everything the binary needs.
#[derive(Debug, Clone)]
pub struct BotConfig {
    pub llm: LlmConfig,
    pub classifier_max_tokens: u32,
    pub discord: Option<DiscordConfig>,
    pub router: RouterConfig,
    /// Directory for the rolling log file.
    pub log_dir: Option<PathBuf>,
}

impl BotConfig {
    /// Build config from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build config from any key lookup. Empty values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let api_key = get("ANTHROPIC_API_KEY")
            .ok_or_else(|| ConfigError::MissingEnvVar("ANTHROPIC_API_KEY".to_string()))?;
        let llm = LlmConfig {
            backend: LlmBackend::Anthropic,
            api_key: SecretString::from(api_key),
            model: get("MOD_INTAKE_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            base_url: get("ANTHROPIC_BASE_URL"),
        };

        let classifier_max_tokens = match get("MOD_INTAKE_LLM_MAX_TOKENS") {
            Some(raw) => parse_number("MOD_INTAKE_LLM_MAX_TOKENS", &raw)?,
            None => DEFAULT_MAX_TOKENS,
        };

        let discord = get("DISCORD_BOT_TOKEN").map(|token| DiscordConfig {
            bot_token: SecretString::from(token),
            api_base: get("DISCORD_API_BASE"),
            gateway_url: get("DISCORD_GATEWAY_URL"),
        });

        let group = match get("MOD_INTAKE_GROUP") {
            Some(raw) => parse_number("MOD_INTAKE_GROUP", &raw)?,
            None => DEFAULT_GROUP,
        };
        let mut router = RouterConfig::for_group(group);
        if let Some(name) = get("MOD_INTAKE_MONITORED_CHANNEL") {
            router.monitored_channel = name;
        }
        if let Some(name) = get("MOD_INTAKE_MOD_CHANNEL") {
            router.mod_channel = name;
        }
        if let Some(raw) = get("MOD_INTAKE_REVIEW_CANCEL") {
            router.cancel_policy = raw.parse().map_err(|message| ConfigError::InvalidValue {
                key: "MOD_INTAKE_REVIEW_CANCEL".to_string(),
                message,
            })?;
        }
        if let Some(raw) = get("MOD_INTAKE_BOT_USER_ID") {
            router.bot_user_id = Some(parse_number("MOD_INTAKE_BOT_USER_ID", &raw)?);
        }

        Ok(Self {
            llm,
            classifier_max_tokens,
            discord,
            router,
            log_dir: get("MOD_INTAKE_LOG_DIR").map(PathBuf::from),
        })
    }
}

fn parse_number<T>(key: &str, raw: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim().parse().map_err(|e: T::Err| ConfigError::InvalidValue {
        key: key.to_string(),
        message: e.to_string(),
    })
}
