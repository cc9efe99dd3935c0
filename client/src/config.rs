//! Client configuration, loadable from `osapi.toml` and `OSAPI_*` variables.

use std::path::PathBuf;

use config::{Environment, File};
use secrecy::SecretString;
use serde::{Deserialize, Deserializer, de::Error as _};
use url::Url;
use validator::Validate;

use crate::{Error, Result};

pub const DEFAULT_ADDRESS: &str = "http://localhost:9200";

fn default_addresses() -> Vec<Url> {
    Url::parse(DEFAULT_ADDRESS)
        .into_iter()
        .collect()
}

fn default_timeout_ms() -> u64 {
    30_000
}

fn default_max_retries() -> u32 {
    3
}

fn default_retry_on_status() -> Vec<u16> {
    vec![502, 503, 504]
}

#[derive(Deserialize)]
#[serde(untagged)]
enum StatusValue {
    Number(u16),
    Text(String),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum StatusValues {
    One(StatusValue),
    Many(Vec<StatusValue>),
}

/// Accepts a list or a single code, as numbers or strings. A lone
/// `OSAPI_RETRY_ON_STATUS=503` arrives as a plain integer.
fn status_codes<'de, D>(deserializer: D) -> std::result::Result<Vec<u16>, D::Error>
where
    D: Deserializer<'de>, {
    let codes = match StatusValues::deserialize(deserializer)? {
        StatusValues::One(code) => vec![code],
        StatusValues::Many(codes) => codes,
    };

    codes
        .into_iter()
        .map(|code| {
            match code {
                StatusValue::Number(code) => Ok(code),
                StatusValue::Text(text) => {
                    text.trim()
                        .parse()
                        .map_err(|_| D::Error::custom(format!("invalid status code `{text}`")))
                },
            }
        })
        .collect()
}

fn default_user_agent() -> String {
    format!("osapi-rs/{}", env!("CARGO_PKG_VERSION"))
}

#[derive(Deserialize, Debug, Validate)]
pub struct Config {
    #[validate(length(min = 1, message = "at least one address is required"))]
    #[serde(default = "default_addresses")]
    pub addresses: Vec<Url>,

    #[serde(default)]
    pub username: Option<String>,

    #[serde(default)]
    pub password: Option<SecretString>,

    #[validate(range(min = 1))]
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    #[validate(range(max = 10))]
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    #[serde(
        default = "default_retry_on_status",
        deserialize_with = "status_codes"
    )]
    pub retry_on_status: Vec<u16>,

    #[serde(default)]
    pub disable_retry: bool,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Accept any TLS certificate. Only meant for local clusters using the
    /// demo certificates.
    #[serde(default)]
    pub insecure_skip_verify: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            addresses: default_addresses(),
            username: None,
            password: None,
            timeout_ms: default_timeout_ms(),
            max_retries: default_max_retries(),
            retry_on_status: default_retry_on_status(),
            disable_retry: false,
            user_agent: default_user_agent(),
            insecure_skip_verify: false,
        }
    }
}

impl Config {
    pub const NAME: &'static str = "osapi";
    pub const ENV: &'static str = "OSAPI";

    pub fn new(addresses: Vec<Url>) -> Self {
        Self {
            addresses,
            ..Default::default()
        }
    }

    pub fn with_basic_auth(
        mut self,
        username: impl Into<String>,
        password: SecretString,
    ) -> Self {
        self.username = Some(username.into());
        self.password = Some(password);
        self
    }

    /// Reads `{dir}/osapi.toml` when it exists, then overlays `OSAPI_*`
    /// environment variables. `OSAPI_ADDRESSES` and `OSAPI_RETRY_ON_STATUS`
    /// are comma separated.
    pub fn load<S: AsRef<str>>(dir: Option<S>) -> Result<Self> {
        Self::load_with_env(dir, None)
    }

    /// [`Config::load`] with `env` standing in for the process environment.
    fn load_with_env<S: AsRef<str>>(
        dir: Option<S>,
        env: Option<config::Map<String, String>>,
    ) -> Result<Self> {
        let file_name = format!(
            "{}",
            PathBuf::from(
                dir.map(|s| String::from(s.as_ref()))
                    .unwrap_or("./".into())
            )
            .join(Self::NAME)
            .display()
        );

        let this: Self = config::Config::builder()
            .add_source(File::with_name(&file_name).required(false))
            .add_source(
                Environment::with_prefix(Self::ENV)
                    .source(env)
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("addresses")
                    .with_list_parse_key("retry_on_status"),
            )
            .build()?
            .try_deserialize()?;

        this.validate()
            .map_err(Error::InvalidConfig)?;

        tracing::debug!(
            file = %file_name,
            addresses = ?this.addresses.iter().map(Url::as_str).collect::<Vec<_>>(),
            "loaded config"
        );

        Ok(this)
    }
}
