use std::env;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use unic_langid::LanguageIdentifier;
use url::Url;

pub const DEFAULT_SERVER: &str = "http://127.0.0.1:8000";
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;
pub const DEFAULT_QUALITY: &str = "720p";

/// Runtime settings, read once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub server: Url,
    pub timeout: Duration,
    pub preferred_quality: String,
    pub language: LanguageIdentifier,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: Url::parse(DEFAULT_SERVER).expect("default server url is valid"),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            preferred_quality: DEFAULT_QUALITY.to_string(),
            language: unic_langid::langid!("zh-CN"),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(server) = lookup("VIDEO_DL_SERVER") {
            config.server = parse_server(&server)
                .with_context(|| format!("invalid VIDEO_DL_SERVER: {}", server))?;
        }

        if let Some(secs) = lookup("VIDEO_DL_TIMEOUT_SECS") {
            let secs: u64 = secs
                .trim()
                .parse()
                .with_context(|| format!("invalid VIDEO_DL_TIMEOUT_SECS: {}", secs))?;
            config.timeout = Duration::from_secs(secs);
        }

        if let Some(quality) = lookup("VIDEO_DL_QUALITY") {
            if !quality.trim().is_empty() {
                config.preferred_quality = quality.trim().to_string();
            }
        }

        if let Some(lang) = lookup("LANG").as_deref().and_then(parse_lang) {
            config.language = lang;
        }

        Ok(config)
    }

    /// Socket endpoint on the same host as the HTTP API.
    pub fn ws_endpoint(&self) -> Result<Url> {
        let mut ws = self.server.join("/ws/download")?;
        let scheme = if self.server.scheme() == "https" { "wss" } else { "ws" };
        ws.set_scheme(scheme)
            .map_err(|_| anyhow!("cannot derive websocket url from {}", self.server))?;
        Ok(ws)
    }
}

fn parse_server(raw: &str) -> Result<Url> {
    let url = Url::parse(raw.trim())?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(anyhow!("unsupported scheme {}", other)),
    }
}

// LANG looks like `zh_CN.UTF-8`
fn parse_lang(raw: &str) -> Option<LanguageIdentifier> {
    let tag = raw.split('.').next()?.replace('_', "-");
    tag.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)]) -> Result<Config> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_without_environment() {
        let config = load(&[]).unwrap();
        assert_eq!(config.server.as_str(), "http://127.0.0.1:8000/");
        assert_eq!(config.timeout, Duration::from_secs(60));
        assert_eq!(config.preferred_quality, "720p");
        assert_eq!(config.language.language.as_str(), "zh");
    }

    #[test]
    fn reads_overrides() {
        let config = load(&[
            ("VIDEO_DL_SERVER", "https://dl.example.com"),
            ("VIDEO_DL_TIMEOUT_SECS", "5"),
            ("VIDEO_DL_QUALITY", "1080p"),
            ("LANG", "en_US.UTF-8"),
        ])
        .unwrap();
        assert_eq!(config.server.host_str(), Some("dl.example.com"));
        assert_eq!(config.timeout, Duration::from_secs(5));
        assert_eq!(config.preferred_quality, "1080p");
        assert_eq!(config.language.to_string(), "en-US");
    }

    #[test]
    fn rejects_bad_values() {
        assert!(load(&[("VIDEO_DL_SERVER", "ftp://host")]).is_err());
        assert!(load(&[("VIDEO_DL_TIMEOUT_SECS", "soon")]).is_err());
    }

    #[test]
    fn unparseable_lang_keeps_default() {
        let config = load(&[("LANG", "C")]).unwrap();
        assert_eq!(config.language.language.as_str(), "zh");
    }

    #[test]
    fn websocket_endpoint_follows_scheme() {
        let config = load(&[("VIDEO_DL_SERVER", "http://localhost:8000")]).unwrap();
        assert_eq!(config.ws_endpoint().unwrap().as_str(), "ws://localhost:8000/ws/download");

        let config = load(&[("VIDEO_DL_SERVER", "https://dl.example.com")]).unwrap();
        assert_eq!(config.ws_endpoint().unwrap().as_str(), "wss://dl.example.com/ws/download");
    }
}
