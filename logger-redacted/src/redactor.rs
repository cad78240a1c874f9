use std::sync::atomic::{AtomicBool, Ordering};

use base64::{engine::general_purpose, Engine as _};
use lazy_static::lazy_static;
use regex::{Captures, Regex};
use sha2::{Digest, Sha256};

#[allow(clippy::unwrap_used)]
mod patterns {
    use lazy_static::lazy_static;
    use regex::Regex;

    lazy_static! {
        pub static ref EMAIL: Regex =
            Regex::new(r"\b[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}\b").unwrap();
        pub static ref IPV4: Regex = Regex::new(r"\b(?:[0-9]{1,3}\.){3}[0-9]{1,3}\b").unwrap();
        /// Three base64url segments starting with an encoded `{"`
        pub static ref JWT: Regex =
            Regex::new(r"\beyJ[A-Za-z0-9_-]*\.[A-Za-z0-9_-]+\.[A-Za-z0-9_-]+").unwrap();
    }
}

lazy_static! {
    static ref DEFAULT_REDACTOR: Redactor = Redactor::default();
}

static REDACTION_ENABLED: AtomicBool = AtomicBool::new(true);

/// Turn the process-wide [`redact`] function on or off
pub fn set_redaction_enabled(enabled: bool) {
    REDACTION_ENABLED.store(enabled, Ordering::Relaxed);
}

pub fn redaction_enabled() -> bool {
    REDACTION_ENABLED.load(Ordering::Relaxed)
}

/// How a matched value is replaced
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Masking {
    /// `EMAIL[hash]`: unreadable, but equal inputs give equal output so log
    /// lines about one principal can be correlated
    Hash,
    /// Keep a hint of the value, e.g. `j***@e***`
    Partial,
}

/// One kind of sensitive value
#[derive(Debug, Clone)]
pub enum RedactionRule {
    Email,
    IpAddress,
    /// Bearer tokens pasted into messages or error strings
    Jwt,
    Custom { pattern: Regex, replacement: String },
}

impl RedactionRule {
    fn apply(&self, text: &str, masking: Masking) -> String {
        match self {
            RedactionRule::Email => patterns::EMAIL
                .replace_all(text, |caps: &Captures| mask_email(matched(caps), masking))
                .into_owned(),
            RedactionRule::IpAddress => patterns::IPV4
                .replace_all(text, |caps: &Captures| mask_ip(matched(caps), masking))
                .into_owned(),
            RedactionRule::Jwt => patterns::JWT
                .replace_all(text, |caps: &Captures| match masking {
                    Masking::Hash => format!("JWT[{}]", hash_value(matched(caps))),
                    Masking::Partial => "JWT[REDACTED]".to_string(),
                })
                .into_owned(),
            RedactionRule::Custom {
                pattern,
                replacement,
            } => pattern.replace_all(text, replacement.as_str()).into_owned(),
        }
    }
}

/// Applies its rules in order to log fields and messages
#[derive(Debug, Clone)]
pub struct Redactor {
    rules: Vec<RedactionRule>,
    masking: Masking,
}

impl Default for Redactor {
    fn default() -> Self {
        Self::new(
            vec![
                RedactionRule::Jwt,
                RedactionRule::Email,
                RedactionRule::IpAddress,
            ],
            Masking::Hash,
        )
    }
}

impl Redactor {
    pub fn new(rules: Vec<RedactionRule>, masking: Masking) -> Self {
        Self { rules, masking }
    }

    pub fn with_rule(mut self, rule: RedactionRule) -> Self {
        self.rules.push(rule);
        self
    }

    pub fn redact(&self, text: &str) -> String {
        self.rules
            .iter()
            .fold(text.to_string(), |acc, rule| rule.apply(&acc, self.masking))
    }
}

/// Redact `text` with the default rules, unless redaction was switched off
/// with [`set_redaction_enabled`].
///
/// Used for log fields such as a principal's email address.
pub fn redact(text: &str) -> String {
    if redaction_enabled() {
        DEFAULT_REDACTOR.redact(text)
    } else {
        text.to_string()
    }
}

fn matched<'t>(caps: &Captures<'t>) -> &'t str {
    caps.get(0).map_or("", |m| m.as_str())
}

fn mask_email(email: &str, masking: Masking) -> String {
    if masking == Masking::Hash {
        return format!("EMAIL[{}]", hash_value(email));
    }
    match email.split_once('@') {
        Some((local, domain)) => format!(
            "{}***@{}***",
            local.chars().next().unwrap_or('*'),
            domain.chars().next().unwrap_or('*')
        ),
        None => "***@***".to_string(),
    }
}

fn mask_ip(ip: &str, masking: Masking) -> String {
    if masking == Masking::Hash {
        return format!("IP[{}]", hash_value(ip));
    }
    match (ip.split('.').next(), ip.rsplit('.').next()) {
        (Some(first), Some(last)) => format!("{first}.***.***.{last}"),
        _ => "***.***.***.***".to_string(),
    }
}

/// First 8 bytes of SHA-256 over the lowercased value, base64url
fn hash_value(value: &str) -> String {
    let digest = Sha256::digest(value.to_lowercase().as_bytes());
    general_purpose::URL_SAFE_NO_PAD.encode(digest.get(..8).unwrap_or_default())
}
