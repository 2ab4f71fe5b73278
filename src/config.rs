use std::env;
use std::fs;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};

const CONFIG_DIR_ENV: &str = "RP_JIRA_CONFIG_DIR";
const CONFIG_FILE_NAME: &str = "config.json";

/// One configurable value, with its label and environment override.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Setting {
    Url,
    Username,
    Token,
    Project,
}

impl Setting {
    pub const ALL: [Setting; 4] = [
        Setting::Url,
        Setting::Username,
        Setting::Token,
        Setting::Project,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Setting::Url => "Jira URL",
            Setting::Username => "Jira username",
            Setting::Token => "Jira API token",
            Setting::Project => "Jira project key",
        }
    }

    pub fn env_var(self) -> &'static str {
        match self {
            Setting::Url => "RP_JIRA_URL",
            Setting::Username => "RP_JIRA_USERNAME",
            Setting::Token => "RP_JIRA_TOKEN",
            Setting::Project => "RP_JIRA_PROJECT",
        }
    }

    pub fn is_secret(self) -> bool {
        self == Setting::Token
    }
}

/// Values persisted by `config init`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredConfig {
    pub jira_url: Option<String>,
    pub jira_username: Option<String>,
    pub jira_token: Option<String>,
    pub jira_project: Option<String>,
}

impl StoredConfig {
    pub fn load() -> AppResult<Self> {
        let path = config_file_path()?;
        match fs::read_to_string(&path) {
            Ok(contents) => serde_json::from_str(&contents).map_err(|err| {
                AppError::Configuration(format!("invalid config file {}: {err}", path.display()))
            }),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(err) => Err(AppError::Io(err)),
        }
    }

    pub fn get(&self, setting: Setting) -> Option<&str> {
        match setting {
            Setting::Url => self.jira_url.as_deref(),
            Setting::Username => self.jira_username.as_deref(),
            Setting::Token => self.jira_token.as_deref(),
            Setting::Project => self.jira_project.as_deref(),
        }
    }

    pub fn slot_mut(&mut self, setting: Setting) -> &mut Option<String> {
        match setting {
            Setting::Url => &mut self.jira_url,
            Setting::Username => &mut self.jira_username,
            Setting::Token => &mut self.jira_token,
            Setting::Project => &mut self.jira_project,
        }
    }

    pub fn save(&self) -> AppResult<()> {
        let path = config_file_path()?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_string_pretty(self)?;
        fs::write(&path, data)?;
        Ok(())
    }
}

pub fn config_directory() -> AppResult<PathBuf> {
    if let Some(dir) = env::var_os(CONFIG_DIR_ENV).filter(|dir| !dir.is_empty()) {
        return Ok(PathBuf::from(dir));
    }
    dirs::config_dir()
        .map(|dir| dir.join("rp-jira"))
        .ok_or_else(|| {
            AppError::Configuration("unable to determine configuration directory".to_string())
        })
}

pub fn config_file_path() -> AppResult<PathBuf> {
    Ok(config_directory()?.join(CONFIG_FILE_NAME))
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub jira_url: Option<String>,
    pub jira_username: Option<String>,
    pub jira_token: Option<String>,
    pub jira_project: Option<String>,
}

impl AppConfig {
    /// Stored values, each overridable from the environment.
    pub fn load() -> AppResult<Self> {
        let stored = StoredConfig::load()?;
        Ok(Self {
            jira_url: env_override(Setting::Url).or(stored.jira_url),
            jira_username: env_override(Setting::Username).or(stored.jira_username),
            jira_token: env_override(Setting::Token).or(stored.jira_token),
            jira_project: env_override(Setting::Project).or(stored.jira_project),
        })
    }

    pub fn integration_params(&self) -> AppResult<IntegrationParams> {
        Ok(IntegrationParams {
            url: required(&self.jira_url, Setting::Url)?,
            username: required(&self.jira_username, Setting::Username)?,
            token: required(&self.jira_token, Setting::Token)?,
            project: required(&self.jira_project, Setting::Project)?,
        })
    }
}

/// Connection parameters of one configured integration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntegrationParams {
    pub url: String,
    pub username: String,
    pub token: String,
    pub project: String,
}

fn env_override(setting: Setting) -> Option<String> {
    env::var(setting.env_var())
        .ok()
        .filter(|value| !value.trim().is_empty())
}

fn required(value: &Option<String>, setting: Setting) -> AppResult<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
        .ok_or_else(|| AppError::Configuration(format!("{} not configured", setting.label())))
}
