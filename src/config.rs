use std::{
    fs,
    path::{
        Path,
        PathBuf,
    },
};

use serde::Deserialize;

use crate::core::{
    CairnError,
    Collection,
};

const APP_NAME: &str = "cairn";
const SECRETS_FILE: &str = "secrets.toml";

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub store: StoreConfig,
    pub smtp: SmtpConfig,
    pub mail: MailAccounts,
    pub recipients: Recipients,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StoreConfig {
    pub url: String,
    pub key: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SmtpConfig {
    pub host: String,
    #[serde(default = "default_smtp_port")]
    pub port: u16,
}

fn default_smtp_port() -> u16 {
    465
}

/// One sender account per collection, so each card stream can go out from
/// its own address.
#[derive(Debug, Clone, Deserialize)]
pub struct MailAccounts {
    pub vocabulary: Account,
    pub correction: Account,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Account {
    pub sender: String,
    pub password: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Recipients {
    pub emails: Vec<String>,
}

impl Config {
    /// Loads `secrets.toml` from the platform config directory.
    pub fn load_default() -> Result<Config, CairnError> {
        Config::load(&default_path())
    }

    pub fn load(path: &Path) -> Result<Config, CairnError> {
        let text = fs::read_to_string(path).map_err(|e| {
            CairnError::Config(format!("cannot read {}: {}", path.display(), e))
        })?;
        toml::from_str(&text)
            .map_err(|e| CairnError::Config(format!("cannot parse {}: {}", path.display(), e)))
    }

    pub fn account(&self, collection: Collection) -> &Account {
        match collection {
            Collection::Vocabulary => &self.mail.vocabulary,
            Collection::Correction => &self.mail.correction,
        }
    }
}

fn default_path() -> PathBuf {
    if let Some(config_dir) = dirs::config_dir() {
        config_dir.join(APP_NAME).join(SECRETS_FILE)
    } else {
        PathBuf::from(SECRETS_FILE)
    }
}
