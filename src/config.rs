//! Resolved build configuration.
//!
//! A payload is a JSON object with the user's build config under `config`
//! plus job, repository and worker settings next to it. Defaults are merged
//! underneath the payload once, before any stage runs; afterwards the
//! resulting [`Data`] is only ever read.

use serde::Deserialize;
use serde_json::{Value, json};

use crate::error::{CompileError, Result};

/// Outcome of fetching the user's build config.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigStatus {
    Ok,
    NotFound,
    ServerError,
}

impl ConfigStatus {
    pub fn from_marker(marker: Option<&str>) -> Self {
        match marker {
            Some("not_found") => ConfigStatus::NotFound,
            Some("server_error") => ConfigStatus::ServerError,
            _ => ConfigStatus::Ok,
        }
    }
}

/// A payload together with the status of the config fetch.
#[derive(Debug, Clone)]
pub struct Resolved {
    pub payload: Value,
    pub status: ConfigStatus,
}

/// Supplies the payload a compile runs against.
pub trait ConfigResolver {
    fn resolve(&self) -> Result<Resolved>;
}

/// Resolver over an in-memory payload; the fetch status is read from the
/// `.result` marker inside `config`.
#[derive(Debug, Clone)]
pub struct PayloadResolver {
    payload: Value,
}

impl PayloadResolver {
    pub fn new(payload: Value) -> Self {
        Self { payload }
    }
}

impl ConfigResolver for PayloadResolver {
    fn resolve(&self) -> Result<Resolved> {
        if !self.payload.is_object() {
            return Err(CompileError::Payload("payload must be an object".to_string()));
        }
        let marker = self
            .payload
            .pointer("/config/.result")
            .and_then(Value::as_str);
        Ok(Resolved {
            payload: self.payload.clone(),
            status: ConfigStatus::from_marker(marker),
        })
    }
}

/// Merges `right` into `left`. Objects merge key by key; anything else in
/// `right` replaces what is in `left`.
pub fn deep_merge(left: &mut Value, right: &Value) {
    match (left, right) {
        (Value::Object(l), Value::Object(r)) => {
            for (key, value) in r {
                match l.get_mut(key) {
                    Some(existing) => deep_merge(existing, value),
                    None => {
                        l.insert(key.clone(), value.clone());
                    }
                }
            }
        }
        (l, r) => *l = r.clone(),
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvVar {
    pub key: String,
    pub value: String,
    pub secure: bool,
    pub echo: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvVarGroup {
    pub source: String,
    pub vars: Vec<EnvVar>,
    pub announce: bool,
}

#[derive(Debug, Deserialize)]
struct SettingsVar {
    name: String,
    value: String,
    #[serde(default)]
    public: bool,
}

/// Splits `A=1 B="two words"` into key/value pairs. Quotes stay part of the
/// value so it can be exported as written.
pub fn parse_env_pairs(line: &str) -> Vec<(String, String)> {
    let mut pairs = Vec::new();
    let mut chars = line.chars().peekable();

    loop {
        while chars.peek().is_some_and(|c| c.is_whitespace()) {
            chars.next();
        }
        if chars.peek().is_none() {
            break;
        }

        let mut word = String::new();
        let mut quote: Option<char> = None;
        while let Some(&c) = chars.peek() {
            match quote {
                Some(q) if c == q => quote = None,
                Some(_) => {}
                None if c == '"' || c == '\'' => quote = Some(c),
                None if c.is_whitespace() => break,
                None => {}
            }
            word.push(c);
            chars.next();
        }

        if let Some((key, value)) = word.split_once('=') {
            if !key.is_empty() {
                pairs.push((key.to_string(), value.to_string()));
            }
        }
    }

    pairs
}

const SECURE_PREFIX: &str = "SECURE ";

fn config_env_entries(value: Option<&Value>) -> Vec<String> {
    match value {
        Some(Value::String(s)) => vec![s.clone()],
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(Value::as_str)
            .map(str::to_string)
            .collect(),
        _ => Vec::new(),
    }
}

/// Read-only view over the merged payload.
#[derive(Debug, Clone)]
pub struct Data {
    raw: Value,
}

impl Data {
    /// Merges `payload` over `{config: defaults}`.
    pub fn new(defaults: Value, payload: &Value) -> Self {
        let mut raw = json!({ "config": defaults });
        deep_merge(&mut raw, payload);
        Self { raw }
    }

    pub fn raw(&self) -> &Value {
        &self.raw
    }

    pub fn config(&self) -> &Value {
        self.raw.get("config").unwrap_or(&Value::Null)
    }

    /// Config value at a `/`-separated path below `config`.
    pub fn get(&self, path: &str) -> Option<&Value> {
        self.config().pointer(&format!("/{}", path))
    }

    /// Config value rendered as plain text; numbers keep their literal
    /// form so `ghc: 7.8` and `ghc: "7.8"` behave the same.
    pub fn get_str(&self, path: &str) -> Option<String> {
        match self.get(path)? {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            _ => None,
        }
    }

    /// Config value as a list of strings; a single string becomes a
    /// one-element list.
    pub fn get_list(&self, path: &str) -> Vec<String> {
        match self.get(path) {
            Some(Value::String(s)) => vec![s.clone()],
            Some(Value::Array(items)) => items
                .iter()
                .filter_map(|v| match v {
                    Value::String(s) => Some(s.clone()),
                    Value::Number(n) => Some(n.to_string()),
                    _ => None,
                })
                .collect(),
            _ => Vec::new(),
        }
    }

    pub fn has(&self, path: &str) -> bool {
        matches!(self.get(path), Some(v) if !v.is_null())
    }

    pub fn language(&self) -> Option<String> {
        self.get_str("language")
    }

    fn flag(&self, key: &str) -> bool {
        self.raw.get(key).and_then(Value::as_bool).unwrap_or(false)
    }

    pub fn paranoid_mode(&self) -> bool {
        self.flag("paranoid")
    }

    pub fn skip_resolv_updates(&self) -> bool {
        self.flag("skip_resolv_updates")
    }

    pub fn skip_etc_hosts_fix(&self) -> bool {
        self.flag("skip_etc_hosts_fix")
    }

    /// Whether `cache` enables `kind`, either as `cache: kind`,
    /// `cache: [kind, ...]` or `cache: {kind: true}`.
    pub fn cache(&self, kind: &str) -> bool {
        match self.get("cache") {
            Some(Value::String(s)) => s == kind,
            Some(Value::Array(items)) => items.iter().any(|v| v.as_str() == Some(kind)),
            Some(Value::Object(map)) => map.get(kind).is_some_and(|v| match v {
                Value::Bool(b) => *b,
                Value::Null => false,
                _ => true,
            }),
            _ => false,
        }
    }

    pub fn cache_directories(&self) -> Vec<String> {
        self.get_list("cache/directories")
    }

    pub fn apt_cache_host(&self) -> Option<String> {
        self.raw
            .pointer("/hosts/apt_cache")
            .and_then(Value::as_str)
            .map(str::to_string)
    }

    pub fn slug(&self) -> Option<String> {
        self.raw_str("/repository/slug")
    }

    pub fn source_url(&self) -> Option<String> {
        self.raw_str("/repository/source_url")
    }

    pub fn branch(&self) -> Option<String> {
        self.raw_str("/job/branch")
    }

    pub fn commit(&self) -> Option<String> {
        self.raw_str("/job/commit")
    }

    pub fn git_ref(&self) -> Option<String> {
        self.raw_str("/job/ref")
    }

    pub fn pull_request(&self) -> bool {
        match self.raw.pointer("/job/pull_request") {
            Some(Value::Bool(b)) => *b,
            Some(Value::Number(_)) | Some(Value::String(_)) => true,
            _ => false,
        }
    }

    pub fn secure_env_enabled(&self) -> bool {
        self.raw
            .pointer("/job/secure_env_enabled")
            .and_then(Value::as_bool)
            .unwrap_or(false)
    }

    fn raw_str(&self, pointer: &str) -> Option<String> {
        self.raw.pointer(pointer).and_then(Value::as_str).map(str::to_string)
    }

    /// Environment variable groups in render order: repository settings
    /// first, then `.travis.yml` (`global_env` before `env`). Secure vars
    /// are dropped unless the job has secure env enabled.
    pub fn env_var_groups(&self) -> Vec<EnvVarGroup> {
        let keep_secure = self.secure_env_enabled();
        let settings: Vec<EnvVar> = self
            .raw
            .get("env_vars")
            .cloned()
            .and_then(|v| serde_json::from_value::<Vec<SettingsVar>>(v).ok())
            .unwrap_or_default()
            .into_iter()
            .map(|v| EnvVar {
                key: v.name,
                value: v.value,
                secure: !v.public,
                echo: true,
            })
            .filter(|v| keep_secure || !v.secure)
            .collect();

        let mut config_vars = Vec::new();
        let entries = config_env_entries(self.get("global_env"))
            .into_iter()
            .chain(config_env_entries(self.get("env")));
        for entry in entries {
            let (secure, line) = match entry.strip_prefix(SECURE_PREFIX) {
                Some(rest) => (true, rest.to_string()),
                None => (false, entry),
            };
            if secure && !keep_secure {
                continue;
            }
            for (key, value) in parse_env_pairs(&line) {
                config_vars.push(EnvVar {
                    key,
                    value,
                    secure,
                    echo: true,
                });
            }
        }

        vec![
            EnvVarGroup {
                source: "repository settings".to_string(),
                announce: !settings.is_empty(),
                vars: settings,
            },
            EnvVarGroup {
                source: ".travis.yml".to_string(),
                vars: config_vars,
                announce: false,
            },
        ]
    }
}
