//! Shared Access Signature tokens for the event hub endpoint.
//!
//! A token authorizes requests against one resource URI until its expiry:
//!
//! ```text
//! SharedAccessSignature sr=<uri>&sig=<signature>&se=<expiry>&skn=<policy>
//! ```
//!
//! `sig` is the Base64 HMAC-SHA256 of `"<uri>\n<expiry>"` keyed with the
//! policy key. Both `sr` and `sig` are query-escaped; `skn` is passed through.
//! The current time comes from a [`Clock`] so tokens are reproducible in tests.

use std::fmt;

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use hmac::{Hmac, Mac};
use sha2::Sha256;

use crate::config::{SAS_MISSING_PARAMETER, SAS_TOKEN_TTL_SECS};

type HmacSha256 = Hmac<Sha256>;

/// Source of the current Unix time in seconds.
pub trait Clock: Send + Sync {
    fn now_unix(&self) -> i64;
}

/// Wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_unix(&self) -> i64 {
        chrono::Utc::now().timestamp()
    }
}

/// Clock pinned to a single instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub i64);

impl Clock for FixedClock {
    fn now_unix(&self) -> i64 {
        self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum SignError {
    /// URI, policy name or key was empty
    #[error("{}", SAS_MISSING_PARAMETER)]
    MissingParameter,
}

/// A signed access token. Only lives for the request it authorizes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedToken {
    resource: String,
    signature: String,
    expiry: i64,
    policy_name: String,
}

impl SignedToken {
    /// Query-escaped resource URI (`sr`)
    pub fn resource(&self) -> &str {
        &self.resource
    }

    /// Query-escaped Base64 signature (`sig`)
    pub fn signature(&self) -> &str {
        &self.signature
    }

    /// Expiry as Unix seconds (`se`)
    pub fn expiry(&self) -> i64 {
        self.expiry
    }

    /// Policy name (`skn`)
    pub fn policy_name(&self) -> &str {
        &self.policy_name
    }
}

impl fmt::Display for SignedToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "SharedAccessSignature sr={}&sig={}&se={}&skn={}",
            self.resource, self.signature, self.expiry, self.policy_name
        )
    }
}

/// Builds shared access tokens. Stateless apart from the clock, so one signer
/// can be shared by every request.
#[derive(Debug, Clone, Default)]
pub struct TokenSigner<C = SystemClock> {
    clock: C,
}

impl TokenSigner<SystemClock> {
    pub fn new() -> Self {
        Self { clock: SystemClock }
    }
}

impl<C: Clock> TokenSigner<C> {
    pub fn with_clock(clock: C) -> Self {
        Self { clock }
    }

    /// Sign `uri` for `policy_name` with `key`.
    ///
    /// Returns the `Missing required parameter` sentinel instead of a token
    /// when any argument is empty. Use [`TokenSigner::try_sign`] to get the
    /// failure as a `Result`.
    pub fn sign(&self, uri: &str, policy_name: &str, key: &str) -> String {
        match self.try_sign(uri, policy_name, key) {
            Ok(token) => token.to_string(),
            Err(e) => e.to_string(),
        }
    }

    pub fn try_sign(
        &self,
        uri: &str,
        policy_name: &str,
        key: &str,
    ) -> Result<SignedToken, SignError> {
        if uri.is_empty() || policy_name.is_empty() || key.is_empty() {
            return Err(SignError::MissingParameter);
        }

        let resource = query_escape(uri);
        let expiry = self.clock.now_unix().saturating_add(SAS_TOKEN_TTL_SECS);
        let signature_base = format!("{}\n{}", resource, expiry);

        let mut mac = <HmacSha256 as Mac>::new_from_slice(key.as_bytes())
            .expect("HMAC accepts keys of any length");
        mac.update(signature_base.as_bytes());
        let signature = query_escape(&BASE64.encode(mac.finalize().into_bytes()));

        Ok(SignedToken {
            resource,
            signature,
            expiry,
            policy_name: policy_name.to_string(),
        })
    }
}

/// Escape a value for use inside a URL query.
///
/// Letters, digits and `-_.~` are kept, space becomes `+`, every other byte
/// is percent-encoded with uppercase hex.
pub fn query_escape(value: &str) -> String {
    // urlencoding only emits %20 for a literal space; a literal '%' is %25
    urlencoding::encode(value).replace("%20", "+")
}
