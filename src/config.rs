use std::{env, path::PathBuf};

/// Connection settings for the external cloud database. Absent when the
/// app runs in anonymous-only mode.
#[derive(Debug, Clone)]
pub struct RemoteConfig {
    pub base_url: String,
    pub api_key: String,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub data_path: PathBuf,
    pub remote: Option<RemoteConfig>,
}

impl Config {
    pub fn from_env() -> Self {
        let port = env::var("PORT")
            .ok()
            .and_then(|value| value.parse::<u16>().ok())
            .unwrap_or(8080);

        let data_path = env::var("APP_DATA_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("data/logs.json"));

        let remote = match (env::var("REMOTE_DB_URL"), env::var("REMOTE_DB_KEY")) {
            (Ok(base_url), Ok(api_key)) if !base_url.is_empty() && !api_key.is_empty() => {
                Some(RemoteConfig { base_url, api_key })
            }
            _ => None,
        };

        Self {
            port,
            data_path,
            remote,
        }
    }
}
