//! Client configuration and connection profiles.
//!
//! Profiles are a JSON mapping of name -> { url, tls_ca, poll_interval_ms } stored under
//! $XDG_CONFIG_HOME/termvision/profiles.json (fallback: platform config dir).

use serde::{Deserialize, Serialize};
use std::{collections::BTreeMap, fs, path::PathBuf, time::Duration};

pub const DEFAULT_URL: &str = "wss://localhost:8765/ws";
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(1);
/// Upper bound on TCP connect plus the WebSocket handshake.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Everything the session needs to connect and poll.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub url: String,
    pub tls_ca: Option<String>,
    pub poll_interval: Duration,
    pub connect_timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_URL.to_string(),
            tls_ca: None,
            poll_interval: DEFAULT_POLL_INTERVAL,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
        }
    }
}

impl ClientConfig {
    pub fn from_entry(entry: &ProfileEntry) -> Self {
        Self {
            url: entry.url.clone(),
            tls_ca: entry.tls_ca.clone(),
            poll_interval: entry
                .poll_interval_ms
                .filter(|ms| *ms > 0)
                .map(Duration::from_millis)
                .unwrap_or(DEFAULT_POLL_INTERVAL),
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
        }
    }

    pub fn to_entry(&self) -> ProfileEntry {
        let ms = self.poll_interval.as_millis() as u64;
        ProfileEntry {
            url: self.url.clone(),
            tls_ca: self.tls_ca.clone(),
            poll_interval_ms: (self.poll_interval != DEFAULT_POLL_INTERVAL).then_some(ms),
        }
    }
}

/// Parse a poll interval in milliseconds. Zero is rejected.
pub fn parse_interval_ms(s: &str) -> Option<Duration> {
    s.trim()
        .parse::<u64>()
        .ok()
        .filter(|ms| *ms > 0)
        .map(Duration::from_millis)
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct ProfileEntry {
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tls_ca: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub poll_interval_ms: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ProfilesFile {
    #[serde(default)]
    pub profiles: BTreeMap<String, ProfileEntry>,
    #[serde(default)]
    pub version: u32,
}

pub fn config_dir() -> PathBuf {
    if let Some(xdg) = std::env::var_os("XDG_CONFIG_HOME") {
        PathBuf::from(xdg).join("termvision")
    } else {
        dirs_next::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("termvision")
    }
}

pub fn profiles_path() -> PathBuf {
    config_dir().join("profiles.json")
}

pub fn load_profiles() -> ProfilesFile {
    let path = profiles_path();
    match fs::read_to_string(&path) {
        Ok(s) => serde_json::from_str(&s).unwrap_or_default(),
        Err(_) => ProfilesFile::default(),
    }
}

pub fn save_profiles(p: &ProfilesFile) -> anyhow::Result<()> {
    let path = profiles_path();
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let data = serde_json::to_vec_pretty(p)?;
    fs::write(path, data)?;
    Ok(())
}

pub enum ResolveProfile {
    /// Use the provided runtime inputs (maybe persisted by the caller).
    Direct(ClientConfig),
    /// Loaded from an existing profile entry
    Loaded(ClientConfig),
    /// Should prompt user to select among profile names
    PromptSelect(Vec<String>),
    /// Should prompt user to create a new profile (name)
    PromptCreate(String),
    /// Nothing given and nothing saved: use the default endpoint
    Default(ClientConfig),
}

pub struct ProfileRequest {
    pub profile_name: Option<String>,
    pub url: Option<String>,
    pub tls_ca: Option<String>,
    pub poll_interval: Option<Duration>,
}

impl ProfileRequest {
    pub fn resolve(self, pf: &ProfilesFile) -> ResolveProfile {
        // Only profile name given -> try load (CLI flags still win over stored values)
        if let (None, Some(name)) = (&self.url, &self.profile_name) {
            return match pf.profiles.get(name) {
                Some(entry) => {
                    let mut cfg = ClientConfig::from_entry(entry);
                    if self.tls_ca.is_some() {
                        cfg.tls_ca = self.tls_ca.clone();
                    }
                    if let Some(p) = self.poll_interval {
                        cfg.poll_interval = p;
                    }
                    ResolveProfile::Loaded(cfg)
                }
                None => ResolveProfile::PromptCreate(name.clone()),
            };
        }
        if let Some(url) = self.url {
            return ResolveProfile::Direct(ClientConfig {
                url,
                tls_ca: self.tls_ca,
                poll_interval: self.poll_interval.unwrap_or(DEFAULT_POLL_INTERVAL),
                ..ClientConfig::default()
            });
        }
        if pf.profiles.is_empty() {
            ResolveProfile::Default(ClientConfig {
                tls_ca: self.tls_ca,
                poll_interval: self.poll_interval.unwrap_or(DEFAULT_POLL_INTERVAL),
                ..ClientConfig::default()
            })
        } else {
            ResolveProfile::PromptSelect(pf.profiles.keys().cloned().collect())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file_with(name: &str, entry: ProfileEntry) -> ProfilesFile {
        let mut pf = ProfilesFile::default();
        pf.profiles.insert(name.into(), entry);
        pf
    }

    fn req(
        profile: Option<&str>,
        url: Option<&str>,
        poll_interval: Option<Duration>,
    ) -> ProfileRequest {
        ProfileRequest {
            profile_name: profile.map(Into::into),
            url: url.map(Into::into),
            tls_ca: None,
            poll_interval,
        }
    }

    #[test]
    fn defaults_match_reference_producer() {
        let cfg = ClientConfig::default();
        assert_eq!(cfg.url, "wss://localhost:8765/ws");
        assert_eq!(cfg.poll_interval, Duration::from_secs(1));
    }

    #[test]
    fn interval_parsing_rejects_zero_and_garbage() {
        assert_eq!(parse_interval_ms("250"), Some(Duration::from_millis(250)));
        assert_eq!(parse_interval_ms("0"), None);
        assert_eq!(parse_interval_ms("fast"), None);
    }

    #[test]
    fn named_profile_is_loaded_with_interval() {
        let pf = file_with(
            "lab",
            ProfileEntry {
                url: "ws://lab:8765/ws".into(),
                tls_ca: None,
                poll_interval_ms: Some(500),
            },
        );
        match req(Some("lab"), None, None).resolve(&pf) {
            ResolveProfile::Loaded(cfg) => {
                assert_eq!(cfg.url, "ws://lab:8765/ws");
                assert_eq!(cfg.poll_interval, Duration::from_millis(500));
            }
            _ => panic!("expected Loaded"),
        }
        match req(Some("lab"), None, Some(Duration::from_millis(50))).resolve(&pf) {
            ResolveProfile::Loaded(cfg) => assert_eq!(cfg.poll_interval, Duration::from_millis(50)),
            _ => panic!("expected Loaded"),
        }
    }

    #[test]
    fn unknown_profile_prompts_create() {
        let pf = ProfilesFile::default();
        assert!(matches!(
            req(Some("new"), None, None).resolve(&pf),
            ResolveProfile::PromptCreate(n) if n == "new"
        ));
    }

    #[test]
    fn nothing_given_uses_default_or_prompts() {
        assert!(matches!(
            req(None, None, None).resolve(&ProfilesFile::default()),
            ResolveProfile::Default(cfg) if cfg.url == DEFAULT_URL
        ));
        let pf = file_with("a", ProfileEntry::default());
        assert!(matches!(
            req(None, None, None).resolve(&pf),
            ResolveProfile::PromptSelect(names) if names == vec!["a".to_string()]
        ));
    }

    #[test]
    fn entry_round_trip_omits_default_interval() {
        let cfg = ClientConfig {
            url: "ws://h/ws".into(),
            tls_ca: Some("/tmp/ca.pem".into()),
            poll_interval: DEFAULT_POLL_INTERVAL,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
        };
        let entry = cfg.to_entry();
        assert_eq!(entry.poll_interval_ms, None);
        assert_eq!(ClientConfig::from_entry(&entry), cfg);
        let json = serde_json::to_string(&entry).unwrap();
        assert!(!json.contains("poll_interval_ms"));
    }
}
