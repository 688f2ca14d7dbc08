//! Language profiles and the registry that selects one per compile.

pub mod android;
pub mod c;
pub mod clojure;
pub mod cpp;
pub mod erlang;
pub mod go;
pub mod groovy;
pub mod haskell;
pub mod jvm;
pub mod node_js;
pub mod perl;
pub mod php;
pub mod python;
pub mod ruby;
pub mod scala;

use std::collections::BTreeMap;

use serde_json::Value;
use tracing::warn;

use crate::error::{CompileError, Result};
use crate::stages::StageHooks;

/// Language profile used when the config names none, or one that is not
/// registered.
pub const FALLBACK_LANGUAGE: &str = "ruby";

#[derive(Clone, Copy)]
pub struct ProfileEntry {
    pub name: &'static str,
    /// Config defaults merged underneath the user config.
    pub defaults: fn() -> Value,
    pub build: fn() -> Box<dyn StageHooks>,
}

impl std::fmt::Debug for ProfileEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProfileEntry").field("name", &self.name).finish()
    }
}

#[derive(Debug, Clone, Default)]
pub struct Registry {
    entries: BTreeMap<String, ProfileEntry>,
    fallback: Option<String>,
}

fn normalize(id: &str) -> String {
    id.trim().to_ascii_lowercase()
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `entry` under each of `ids`.
    pub fn register(&mut self, ids: &[&str], entry: ProfileEntry) {
        for id in ids {
            self.entries.insert(normalize(id), entry);
        }
    }

    pub fn set_fallback(&mut self, id: &str) {
        self.fallback = Some(normalize(id));
    }

    pub fn lookup(&self, id: &str) -> Option<&ProfileEntry> {
        self.entries.get(&normalize(id))
    }

    /// Picks the profile for `requested`, falling back when it is missing
    /// or unknown.
    pub fn select(&self, requested: Option<&str>) -> Result<&ProfileEntry> {
        if let Some(entry) = requested.and_then(|id| self.lookup(id)) {
            return Ok(entry);
        }
        let fallback = self.fallback.as_deref();
        match (requested, fallback) {
            (Some(id), Some(fb)) => warn!(language = id, fallback = fb, "unknown language, using fallback profile"),
            (Some(id), None) => return Err(CompileError::UnknownLanguage(id.to_string())),
            (None, _) => {}
        }
        let fb = fallback.ok_or_else(|| CompileError::UnknownLanguage(String::new()))?;
        self.lookup(fb).ok_or_else(|| CompileError::UnknownLanguage(fb.to_string()))
    }

    /// Registered identifiers, aliases included.
    pub fn languages(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn builtin() -> Self {
        let mut registry = Self::new();
        registry.register(&["android"], android::entry());
        registry.register(&["c"], c::entry());
        registry.register(&["clojure"], clojure::entry());
        registry.register(&["cpp", "c++"], cpp::entry());
        registry.register(&["erlang"], erlang::entry());
        registry.register(&["go"], go::entry());
        registry.register(&["groovy"], groovy::entry());
        registry.register(&["haskell"], haskell::entry());
        registry.register(&["java", "jvm"], jvm::entry());
        registry.register(&["node_js", "nodejs", "node"], node_js::entry());
        registry.register(&["perl"], perl::entry());
        registry.register(&["php"], php::entry());
        registry.register(&["python"], python::entry());
        registry.register(&["ruby"], ruby::entry());
        registry.register(&["scala"], scala::entry());
        registry.set_fallback(FALLBACK_LANGUAGE);
        registry
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aliases_share_a_profile() {
        let registry = Registry::builtin();
        assert_eq!(registry.lookup("c++").map(|e| e.name), Some("cpp"));
        assert_eq!(registry.lookup("JVM").map(|e| e.name), Some("java"));
        assert_eq!(registry.lookup(" node_js ").map(|e| e.name), Some("node_js"));
    }

    #[test]
    fn unknown_language_falls_back_to_ruby() {
        let registry = Registry::builtin();
        assert_eq!(registry.select(Some("cobol")).unwrap().name, "ruby");
        assert_eq!(registry.select(None).unwrap().name, "ruby");
    }

    #[test]
    fn unknown_language_without_fallback_is_an_error() {
        let mut registry = Registry::new();
        registry.register(&["c"], c::entry());
        assert_eq!(
            registry.select(Some("cobol")).unwrap_err(),
            CompileError::UnknownLanguage("cobol".to_string())
        );
        assert_eq!(registry.select(Some("c")).unwrap().name, "c");
    }
}
