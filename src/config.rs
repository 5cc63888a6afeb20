// ABOUTME: Account configuration loaded from ~/.hubdb-sync/config.toml
// ABOUTME: Resolves which account (and access token) a command runs against

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

const CONFIG_DIR: &str = ".hubdb-sync";
const CONFIG_FILE: &str = "config.toml";

/// Name given to the account assembled from environment values
pub const ENVIRONMENT_ACCOUNT_NAME: &str = "environment";

/// One configured account
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub name: String,
    pub account_id: u64,
    pub access_token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_base_url: Option<String>,
}

/// Contents of the config file
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub default_account: Option<String>,
    #[serde(default)]
    pub accounts: Vec<Account>,
}

/// Credentials supplied outside the config file (flags or environment).
/// Built by the binary and handed in; the library never reads the environment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvCredentials {
    pub account_id: Option<u64>,
    pub access_token: Option<String>,
    pub api_base_url: Option<String>,
}

impl EnvCredentials {
    fn into_account(self) -> Result<Account> {
        let access_token = self.access_token.ok_or_else(|| {
            Error::Config("An access token is required (set HUBDB_ACCESS_TOKEN)".to_string())
        })?;
        let account_id = self.account_id.ok_or_else(|| {
            Error::Config("An account id is required (set HUBDB_ACCOUNT_ID)".to_string())
        })?;

        Ok(Account {
            name: ENVIRONMENT_ACCOUNT_NAME.to_string(),
            account_id,
            access_token,
            api_base_url: self.api_base_url,
        })
    }
}

/// Default config location: ~/.hubdb-sync/config.toml
pub fn default_config_path() -> Result<PathBuf> {
    let home_dir = dirs::home_dir()
        .ok_or_else(|| Error::Config("Could not find home directory".to_string()))?;
    Ok(home_dir.join(CONFIG_DIR).join(CONFIG_FILE))
}

/// Load the config file. A missing file yields an empty config.
pub fn load(path: &Path) -> Result<Config> {
    if !path.exists() {
        return Ok(Config::default());
    }

    let content = fs::read_to_string(path)?;
    toml::from_str(&content)
        .map_err(|e| Error::Config(format!("Failed to parse {}: {}", path.display(), e)))
}

/// Pick the account to use.
///
/// Environment credentials win when `use_env` is set or an access token was
/// supplied. Otherwise `selector` (account name or id), then
/// `default_account`, then a sole configured account.
pub fn resolve_account(
    config: &Config,
    selector: Option<&str>,
    env: EnvCredentials,
    use_env: bool,
) -> Result<Account> {
    if use_env || env.access_token.is_some() {
        return env.into_account();
    }

    let wanted = selector.or(config.default_account.as_deref());
    let account = match wanted {
        Some(wanted) => config
            .accounts
            .iter()
            .find(|account| account.name == wanted || account.account_id.to_string() == wanted)
            .ok_or_else(|| Error::Config(format!("Account \"{}\" is not configured", wanted)))?,
        None => match config.accounts.as_slice() {
            [only] => only,
            [] => {
                return Err(Error::Config(
                    "No accounts configured. Add one to the config file or set \
                     HUBDB_ACCESS_TOKEN and HUBDB_ACCOUNT_ID"
                        .to_string(),
                ))
            }
            _ => {
                return Err(Error::Config(
                    "Several accounts are configured; pass --account or set default_account"
                        .to_string(),
                ))
            }
        },
    };

    let mut account = account.clone();
    if account.api_base_url.is_none() {
        account.api_base_url = env.api_base_url;
    }
    Ok(account)
}
