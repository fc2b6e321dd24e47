//! Signed-in session state.
//!
//! Tokens are JWTs issued by the content service. The payload is decoded
//! for display only (who is signed in, which role, when it expires); the
//! signature is never checked here, so nothing in this crate may treat the
//! claims as proof of identity.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::{info, warn};

#[derive(Error, Debug)]
pub enum SessionError {
    #[error("token is not a three-part JWT")]
    MalformedToken,

    #[error("token payload is not valid base64url: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("token payload is not valid JSON: {0}")]
    Claims(#[source] serde_json::Error),

    #[error("failed to access session file {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("session file {} is corrupt: {source}", path.display())]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Display-only claims from a token payload.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Claims {
    pub user_id: Option<String>,
    pub role: Option<String>,
    /// Expiry in seconds since the Unix epoch.
    pub expires_at: Option<u64>,
}

#[derive(Deserialize)]
struct RawClaims {
    sub: Option<Value>,
    id: Option<Value>,
    #[serde(rename = "userId")]
    user_id: Option<Value>,
    role: Option<String>,
    exp: Option<u64>,
}

fn id_to_string(value: Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Decode the payload of a JWT without verifying it.
pub fn decode_claims(token: &str) -> Result<Claims, SessionError> {
    let mut parts = token.trim().split('.');
    let (Some(_header), Some(payload), Some(_signature), None) =
        (parts.next(), parts.next(), parts.next(), parts.next())
    else {
        return Err(SessionError::MalformedToken);
    };
    if payload.is_empty() {
        return Err(SessionError::MalformedToken);
    }
    let normalized: String = payload
        .trim_end_matches('=')
        .chars()
        .map(|c| match c {
            '+' => '-',
            '/' => '_',
            other => other,
        })
        .collect();
    let bytes = URL_SAFE_NO_PAD.decode(normalized)?;
    let raw: RawClaims = serde_json::from_slice(&bytes).map_err(SessionError::Claims)?;
    Ok(Claims {
        user_id: [raw.sub, raw.id, raw.user_id]
            .into_iter()
            .flatten()
            .find_map(id_to_string),
        role: raw.role,
        expires_at: raw.exp,
    })
}

/// Seconds since the Unix epoch.
pub fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |d| d.as_secs())
}

/// A decoded token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    token: String,
    claims: Claims,
}

impl Session {
    pub fn from_token(token: impl Into<String>) -> Result<Self, SessionError> {
        let token = token.into();
        let claims = decode_claims(&token)?;
        Ok(Self { token, claims })
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    pub const fn claims(&self) -> &Claims {
        &self.claims
    }

    /// A token without `exp` never expires.
    pub fn is_expired_at(&self, now: u64) -> bool {
        self.claims.expires_at.is_some_and(|exp| exp <= now)
    }

    /// Value for an `Authorization` header.
    pub fn bearer_header(&self) -> String {
        format!("Bearer {}", self.token)
    }

    /// Short label for the status bar.
    pub fn label(&self) -> String {
        let user = self.claims.user_id.as_deref().unwrap_or("unknown user");
        match &self.claims.role {
            Some(role) => format!("{user} ({role})"),
            None => user.to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum AuthState {
    #[default]
    Anonymous,
    Authenticated(Session),
    Expired(Session),
}

impl AuthState {
    pub fn from_session(session: Session, now: u64) -> Self {
        if session.is_expired_at(now) {
            Self::Expired(session)
        } else {
            Self::Authenticated(session)
        }
    }

    pub const fn session(&self) -> Option<&Session> {
        match self {
            Self::Authenticated(session) | Self::Expired(session) => Some(session),
            Self::Anonymous => None,
        }
    }

    pub const fn is_authenticated(&self) -> bool {
        matches!(self, Self::Authenticated(_))
    }
}

#[derive(Serialize, Deserialize)]
struct SessionFile {
    token: String,
}

/// Persists the session token as `{"token": "…"}`.
#[derive(Debug, Clone)]
pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The stored token, or `None` when no session file exists.
    pub fn load(&self) -> Result<Option<String>, SessionError> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(source) => {
                return Err(SessionError::Io {
                    path: self.path.clone(),
                    source,
                });
            }
        };
        let file: SessionFile =
            serde_json::from_str(&content).map_err(|source| SessionError::Corrupt {
                path: self.path.clone(),
                source,
            })?;
        Ok(Some(file.token))
    }

    pub fn save(&self, token: &str) -> Result<(), SessionError> {
        let io_err = |source| SessionError::Io {
            path: self.path.clone(),
            source,
        };
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(io_err)?;
        }
        let body = serde_json::to_string_pretty(&SessionFile {
            token: token.to_string(),
        })
        .map_err(|source| SessionError::Corrupt {
            path: self.path.clone(),
            source,
        })?;
        fs::write(&self.path, body).map_err(io_err)?;
        info!(path = %self.path.display(), "session saved");
        Ok(())
    }

    pub fn clear(&self) -> Result<(), SessionError> {
        match fs::remove_file(&self.path) {
            Ok(()) => {
                info!(path = %self.path.display(), "session cleared");
                Ok(())
            }
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(source) => Err(SessionError::Io {
                path: self.path.clone(),
                source,
            }),
        }
    }

    /// Load and classify the stored session.
    ///
    /// Expired or undecodable tokens are removed from disk and reported as
    /// [`AuthState::Expired`] or [`AuthState::Anonymous`].
    pub fn restore(&self, now: u64) -> Result<AuthState, SessionError> {
        let Some(token) = self.load()? else {
            return Ok(AuthState::Anonymous);
        };
        match Session::from_token(token) {
            Ok(session) => {
                let state = AuthState::from_session(session, now);
                if let AuthState::Expired(session) = &state {
                    info!(user = %session.label(), "stored session expired, signing out");
                    self.clear()?;
                }
                Ok(state)
            }
            Err(err) => {
                warn!(error = %err, "discarding undecodable session token");
                self.clear()?;
                Ok(AuthState::Anonymous)
            }
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use tempfile::tempdir;

    pub(crate) fn make_token(payload: &str) -> String {
        let header = URL_SAFE_NO_PAD.encode(r#"{"alg":"HS256","typ":"JWT"}"#);
        let body = URL_SAFE_NO_PAD.encode(payload);
        format!("{header}.{body}.signature")
    }

    #[test]
    fn test_decode_claims_reads_sub_role_exp() {
        let token = make_token(r#"{"sub":"42","role":"admin","exp":1700000000}"#);
        let claims = decode_claims(&token).unwrap();
        assert_eq!(claims.user_id.as_deref(), Some("42"));
        assert_eq!(claims.role.as_deref(), Some("admin"));
        assert_eq!(claims.expires_at, Some(1_700_000_000));
    }

    #[test]
    fn test_decode_claims_falls_back_to_user_id() {
        let token = make_token(r#"{"userId":7,"role":"editor"}"#);
        let claims = decode_claims(&token).unwrap();
        assert_eq!(claims.user_id.as_deref(), Some("7"));
        assert_eq!(claims.expires_at, None);
    }

    #[test]
    fn test_decode_claims_tolerates_padding() {
        let header = URL_SAFE_NO_PAD.encode("{}");
        let body = base64::engine::general_purpose::URL_SAFE.encode(r#"{"id":"a"}"#);
        assert!(body.ends_with('='));
        let claims = decode_claims(&format!("{header}.{body}.sig")).unwrap();
        assert_eq!(claims.user_id.as_deref(), Some("a"));
    }

    #[test]
    fn test_decode_claims_errors() {
        assert!(matches!(
            decode_claims("only.two"),
            Err(SessionError::MalformedToken)
        ));
        assert!(matches!(
            decode_claims("a.b.c.d"),
            Err(SessionError::MalformedToken)
        ));
        assert!(matches!(
            decode_claims("a.@@@.c"),
            Err(SessionError::Base64(_))
        ));
        let not_json = format!("a.{}.c", URL_SAFE_NO_PAD.encode("nope"));
        assert!(matches!(
            decode_claims(&not_json),
            Err(SessionError::Claims(_))
        ));
    }

    #[test]
    fn test_session_expiry_and_header() {
        let session = Session::from_token(make_token(r#"{"sub":"u","exp":100}"#)).unwrap();
        assert!(!session.is_expired_at(99));
        assert!(session.is_expired_at(100));
        assert!(session.bearer_header().starts_with("Bearer "));
        assert_eq!(session.label(), "u");
    }

    #[test]
    fn test_store_round_trip_and_clear() {
        let dir = tempdir().unwrap();
        let store = SessionStore::new(dir.path().join("nested").join("session.json"));
        assert_eq!(store.load().unwrap(), None);

        store.save("abc.def.ghi").unwrap();
        assert_eq!(store.load().unwrap().as_deref(), Some("abc.def.ghi"));

        store.clear().unwrap();
        assert_eq!(store.load().unwrap(), None);
        store.clear().unwrap();
    }

    #[test]
    fn test_store_reports_corrupt_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("session.json");
        fs::write(&path, "not json").unwrap();
        let store = SessionStore::new(&path);
        assert!(matches!(store.load(), Err(SessionError::Corrupt { .. })));
    }

    #[test]
    fn test_restore_clears_expired_session() {
        let dir = tempdir().unwrap();
        let store = SessionStore::new(dir.path().join("session.json"));
        store
            .save(&make_token(r#"{"sub":"u","role":"admin","exp":10}"#))
            .unwrap();

        let state = store.restore(20).unwrap();
        assert!(matches!(state, AuthState::Expired(_)));
        assert_eq!(store.load().unwrap(), None);
    }

    #[test]
    fn test_restore_keeps_valid_session() {
        let dir = tempdir().unwrap();
        let store = SessionStore::new(dir.path().join("session.json"));
        store
            .save(&make_token(r#"{"sub":"u","exp":1000}"#))
            .unwrap();

        let state = store.restore(20).unwrap();
        assert!(state.is_authenticated());
        assert!(store.load().unwrap().is_some());
    }

    #[test]
    fn test_restore_discards_garbage_token() {
        let dir = tempdir().unwrap();
        let store = SessionStore::new(dir.path().join("session.json"));
        store.save("garbage").unwrap();
        assert_eq!(store.restore(0).unwrap(), AuthState::Anonymous);
        assert_eq!(store.load().unwrap(), None);
    }
}
