//! API key resolution.
//!
//! Sources are tried in a fixed order: the process environment, then an
//! optional [`SecretsLookup`] collaborator. Absence is not an error; the
//! resolver returns an empty string and callers check it before going to
//! the network.

use std::collections::HashMap;
use std::path::PathBuf;

/// Name under which the API key is looked up.
pub const API_KEY_VAR: &str = "SAM_API_KEY";

/// A secrets store that can be asked for a value by name.
pub trait SecretsLookup: Send + Sync {
    fn lookup(&self, key: &str) -> Option<String>;
}

/// In-memory secrets, mostly for tests and embedding.
#[derive(Debug, Clone, Default)]
pub struct StaticSecrets {
    values: HashMap<String, String>,
}

impl StaticSecrets {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: &str, value: &str) -> Self {
        self.values.insert(key.to_string(), value.to_string());
        self
    }
}

impl SecretsLookup for StaticSecrets {
    fn lookup(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }
}

/// Reads values from a `.env`-format file without touching the process
/// environment.
#[derive(Debug, Clone)]
pub struct DotenvSecrets {
    path: PathBuf,
}

impl DotenvSecrets {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl SecretsLookup for DotenvSecrets {
    fn lookup(&self, key: &str) -> Option<String> {
        let iter = match dotenvy::from_path_iter(&self.path) {
            Ok(iter) => iter,
            Err(e) => {
                tracing::debug!("Secrets file {} unreadable: {}", self.path.display(), e);
                return None;
            }
        };
        iter.filter_map(Result::ok)
            .find(|(k, _)| k == key)
            .map(|(_, v)| v)
    }
}

/// Locates credentials in priority order.
#[derive(Default)]
pub struct CredentialResolver {
    secrets: Option<Box<dyn SecretsLookup>>,
}

impl CredentialResolver {
    /// Resolver that only consults the environment.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a secrets collaborator consulted after the environment.
    pub fn with_secrets(mut self, secrets: impl SecretsLookup + 'static) -> Self {
        self.secrets = Some(Box::new(secrets));
        self
    }

    /// Resolves `key`, returning an empty string when no source has it.
    pub fn resolve(&self, key: &str) -> String {
        if let Some(value) = std::env::var(key).ok().and_then(non_empty) {
            return value;
        }
        if let Some(value) = self
            .secrets
            .as_ref()
            .and_then(|s| s.lookup(key))
            .and_then(non_empty)
        {
            return value;
        }
        tracing::debug!("No value found for {}", key);
        String::new()
    }

    /// Resolves the upstream API key.
    pub fn resolve_api_key(&self) -> String {
        self.resolve(API_KEY_VAR)
    }
}

fn non_empty(value: String) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
