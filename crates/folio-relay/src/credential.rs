//! Credential resolution for the upstream provider
//!
//! A [`CredentialResolver`] walks an ordered list of [`CredentialSource`]s and
//! returns the first non-empty value. The order is data:
//!
//! 1. the value configured in the application config (if any)
//! 2. the process environment
//! 3. `.env.local`, then `.env` in the working directory
//!
//! Nothing is cached. Every call to [`CredentialResolver::resolve`] reads the
//! sources again, so a key added to `.env` while the server runs is picked up
//! by the next request.

use crate::error::{Error, Result};
use crate::util::mask_api_key;
use regex::Regex;
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Environment variable holding the Groq API key
pub const DEFAULT_KEY_NAME: &str = "GROQ_API_KEY";

/// Fallback files scanned when the environment has no key, in priority order
pub const DEFAULT_FALLBACK_FILES: &[&str] = &[".env.local", ".env"];

// ============================================================================
// Secure String
// ============================================================================

/// A string that is wiped from memory on drop and never printed
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct SecureString {
    inner: String,
}

impl SecureString {
    /// Wrap a secret value
    #[must_use]
    pub fn new(s: impl Into<String>) -> Self {
        Self { inner: s.into() }
    }

    /// Temporarily expose the string value
    #[must_use]
    pub fn expose(&self) -> &str {
        &self.inner
    }

    /// Check if the secret is empty or whitespace only
    #[must_use]
    pub fn is_blank(&self) -> bool {
        self.inner.trim().is_empty()
    }

    /// Masked form suitable for logs
    #[must_use]
    pub fn masked(&self) -> String {
        mask_api_key(&self.inner)
    }
}

impl fmt::Debug for SecureString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SecureString([REDACTED, {} bytes])", self.inner.len())
    }
}

impl fmt::Display for SecureString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[REDACTED]")
    }
}

// ============================================================================
// Sources
// ============================================================================

/// One place a credential may come from
pub trait CredentialSource: Send + Sync {
    /// Human readable name used in logs
    fn name(&self) -> String;

    /// Look up `key`. `Ok(None)` means this source has no value for it.
    fn lookup(&self, key: &str) -> Result<Option<SecureString>>;
}

/// A value supplied directly by the application config
pub struct ConfiguredValue {
    value: Option<SecureString>,
}

impl ConfiguredValue {
    /// Wrap an optional configured value
    #[must_use]
    pub fn new(value: Option<String>) -> Self {
        Self {
            value: value.map(SecureString::new),
        }
    }
}

impl CredentialSource for ConfiguredValue {
    fn name(&self) -> String {
        "config".to_string()
    }

    fn lookup(&self, _key: &str) -> Result<Option<SecureString>> {
        Ok(self.value.clone())
    }
}

/// The process environment
pub struct EnvSource;

impl CredentialSource for EnvSource {
    fn name(&self) -> String {
        "env".to_string()
    }

    fn lookup(&self, key: &str) -> Result<Option<SecureString>> {
        Ok(std::env::var(key).ok().map(SecureString::new))
    }
}

/// A `KEY=value` file scanned for the key
pub struct DotenvFileSource {
    path: PathBuf,
}

impl DotenvFileSource {
    /// Scan the file at `path`
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// File being scanned
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl CredentialSource for DotenvFileSource {
    fn name(&self) -> String {
        self.path.display().to_string()
    }

    fn lookup(&self, key: &str) -> Result<Option<SecureString>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let content = std::fs::read_to_string(&self.path)
            .map_err(|e| Error::Source(format!("{}: {}", self.path.display(), e)))?;
        Ok(scan_for_key(&content, key)?.map(SecureString::new))
    }
}

/// Find the first `KEY=value` assignment in dotenv-style text.
///
/// Accepts `KEY=value`, `KEY = "value"`, `KEY='value'` and an optional
/// leading `export`. Commented-out lines do not match.
pub fn scan_for_key(content: &str, key: &str) -> Result<Option<String>> {
    let pattern = format!(
        r#"(?m)^[ \t]*(?:export[ \t]+)?{}[ \t]*=[ \t]*(?:"([^"]+)"|'([^']+)'|([^\s"']+))"#,
        regex::escape(key)
    );
    let re = Regex::new(&pattern).map_err(|e| Error::Source(e.to_string()))?;

    for caps in re.captures_iter(content) {
        let value = caps
            .get(1)
            .or_else(|| caps.get(2))
            .or_else(|| caps.get(3))
            .map(|m| m.as_str().trim())
            .unwrap_or_default();
        if !value.is_empty() {
            return Ok(Some(value.to_string()));
        }
    }
    Ok(None)
}

// ============================================================================
// Resolver
// ============================================================================

/// A credential together with the source that produced it
#[derive(Debug, Clone)]
pub struct ResolvedCredential {
    /// The secret
    pub secret: SecureString,
    /// Name of the source it came from
    pub source: String,
}

/// Ordered, first-match-wins credential lookup
pub struct CredentialResolver {
    key_name: String,
    sources: Vec<Box<dyn CredentialSource>>,
}

impl CredentialResolver {
    /// Create a resolver with no sources
    #[must_use]
    pub fn new(key_name: impl Into<String>) -> Self {
        Self {
            key_name: key_name.into(),
            sources: Vec::new(),
        }
    }

    /// Standard order: configured value, environment, then each fallback file
    #[must_use]
    pub fn standard(
        key_name: impl Into<String>,
        configured: Option<String>,
        fallback_files: &[PathBuf],
    ) -> Self {
        let mut resolver = Self::new(key_name)
            .with_source(ConfiguredValue::new(configured))
            .with_source(EnvSource);
        for path in fallback_files {
            resolver = resolver.with_source(DotenvFileSource::new(path.clone()));
        }
        resolver
    }

    /// Append a source at the lowest priority
    #[must_use]
    pub fn with_source(mut self, source: impl CredentialSource + 'static) -> Self {
        self.sources.push(Box::new(source));
        self
    }

    /// Key name being resolved
    #[must_use]
    pub fn key_name(&self) -> &str {
        &self.key_name
    }

    /// Source names in priority order
    #[must_use]
    pub fn source_names(&self) -> Vec<String> {
        self.sources.iter().map(|s| s.name()).collect()
    }

    /// Resolve the credential, reading every source afresh
    pub fn resolve(&self) -> Result<ResolvedCredential> {
        for source in &self.sources {
            match source.lookup(&self.key_name) {
                Ok(Some(secret)) if !secret.is_blank() => {
                    debug!(
                        source = %source.name(),
                        key = %secret.masked(),
                        "Resolved {}", self.key_name
                    );
                    return Ok(ResolvedCredential {
                        secret,
                        source: source.name(),
                    });
                }
                Ok(_) => continue,
                Err(e) => {
                    warn!(source = %source.name(), error = %e, "Credential source unreadable");
                }
            }
        }

        warn!(
            key = %self.key_name,
            sources = ?self.source_names(),
            "No credential found in any source"
        );
        Err(Error::ConfigurationMissing(format!(
            "{} not found in environment or dossiers (.env).",
            self.key_name
        )))
    }
}

impl fmt::Debug for CredentialResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialResolver")
            .field("key_name", &self.key_name)
            .field("sources", &self.source_names())
            .finish()
    }
}
