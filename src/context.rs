//! Process-wide application context.
//!
//! Holds the signed-in session and the resolved color theme. It is built
//! once in `main` with [`AppContext::init`], handed to the page model, and
//! closed with [`AppContext::teardown`] on exit.

use tracing::{info, warn};

use crate::config::ThemeMode;
use crate::session::{AuthState, Session, SessionError, SessionStore, unix_now};
use crate::ui::style::Theme;

#[derive(Debug, Clone)]
pub struct AppContext {
    auth: AuthState,
    sessions: SessionStore,
    theme: Theme,
    require_session: bool,
}

impl AppContext {
    /// Restore the stored session and resolve the theme.
    ///
    /// An expired stored session is signed out immediately. A corrupt
    /// session file is reported and treated as signed out.
    pub fn init(sessions: SessionStore, theme: ThemeMode, require_session: bool) -> Self {
        let auth = match sessions.restore(unix_now()) {
            Ok(auth) => auth,
            Err(err) => {
                warn!(error = %err, "could not restore session");
                AuthState::Anonymous
            }
        };
        match &auth {
            AuthState::Authenticated(session) => info!(user = %session.label(), "session restored"),
            AuthState::Expired(_) => info!("session expired"),
            AuthState::Anonymous => info!("no session"),
        }
        Self {
            auth,
            sessions,
            theme: Theme::for_mode(theme),
            require_session,
        }
    }

    pub const fn auth(&self) -> &AuthState {
        &self.auth
    }

    pub const fn theme(&self) -> &Theme {
        &self.theme
    }

    pub const fn sessions(&self) -> &SessionStore {
        &self.sessions
    }

    /// Whether editing is allowed by the session gate.
    ///
    /// The gate only exists when `--require-session` is set, and it only
    /// freezes the local UI.
    pub const fn editing_allowed(&self) -> bool {
        !self.require_session || self.auth.is_authenticated()
    }

    /// Decode and persist a new token.
    pub fn sign_in(&mut self, token: &str) -> Result<&Session, SessionError> {
        let session = Session::from_token(token.trim())?;
        self.sessions.save(session.token())?;
        self.auth = AuthState::from_session(session, unix_now());
        info!(authenticated = self.auth.is_authenticated(), "signed in");
        self.auth.session().ok_or(SessionError::MalformedToken)
    }

    pub fn sign_out(&mut self) -> Result<(), SessionError> {
        self.sessions.clear()?;
        self.auth = AuthState::Anonymous;
        Ok(())
    }

    /// Re-check expiry against the clock. Returns true when the session
    /// just expired.
    pub fn refresh_expiry(&mut self, now: u64) -> bool {
        let expired = match &self.auth {
            AuthState::Authenticated(session) => session.is_expired_at(now),
            _ => false,
        };
        if expired {
            let state = std::mem::take(&mut self.auth);
            if let AuthState::Authenticated(session) = state {
                info!(user = %session.label(), "session expired");
                self.auth = AuthState::Expired(session);
            }
        }
        expired
    }

    /// Close the context. A session that expired while running is removed
    /// from disk.
    pub fn teardown(mut self) {
        self.refresh_expiry(unix_now());
        if matches!(self.auth, AuthState::Expired(_))
            && let Err(err) = self.sessions.clear()
        {
            warn!(error = %err, "could not clear expired session");
        }
        info!("context closed");
    }
}

impl Default for AppContext {
    fn default() -> Self {
        Self {
            auth: AuthState::Anonymous,
            sessions: SessionStore::new(crate::config::default_session_path()),
            theme: Theme::default(),
            require_session: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::tests::make_token;
    use tempfile::tempdir;

    #[test]
    fn test_init_without_session_is_anonymous() {
        let dir = tempdir().expect("tempdir");
        let ctx = AppContext::init(
            SessionStore::new(dir.path().join("session.json")),
            ThemeMode::Dark,
            false,
        );
        assert_eq!(ctx.auth(), &AuthState::Anonymous);
        assert!(ctx.editing_allowed());
    }

    #[test]
    fn test_require_session_gates_editing() {
        let dir = tempdir().expect("tempdir");
        let ctx = AppContext::init(
            SessionStore::new(dir.path().join("session.json")),
            ThemeMode::Dark,
            true,
        );
        assert!(!ctx.editing_allowed());
    }

    #[test]
    fn test_sign_in_persists_and_sign_out_clears() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("session.json");
        let mut ctx = AppContext::init(SessionStore::new(&path), ThemeMode::Light, true);

        let token = make_token(r#"{"sub":"ada","role":"admin"}"#);
        let session = ctx.sign_in(&token).expect("sign in");
        assert_eq!(session.label(), "ada (admin)");
        assert!(ctx.editing_allowed());
        assert!(path.exists());

        ctx.sign_out().expect("sign out");
        assert!(!path.exists());
        assert!(!ctx.editing_allowed());
    }

    #[test]
    fn test_sign_in_rejects_garbage() {
        let dir = tempdir().expect("tempdir");
        let mut ctx = AppContext::init(
            SessionStore::new(dir.path().join("session.json")),
            ThemeMode::Dark,
            false,
        );
        assert!(ctx.sign_in("not-a-token").is_err());
        assert_eq!(ctx.auth(), &AuthState::Anonymous);
    }

    #[test]
    fn test_refresh_expiry_flips_state() {
        let dir = tempdir().expect("tempdir");
        let store = SessionStore::new(dir.path().join("session.json"));
        store
            .save(&make_token(r#"{"sub":"u","exp":4102444800}"#))
            .expect("save");
        let mut ctx = AppContext::init(store, ThemeMode::Dark, false);
        assert!(ctx.auth().is_authenticated());
        assert!(ctx.refresh_expiry(4_102_444_800));
        assert!(matches!(ctx.auth(), AuthState::Expired(_)));
        assert!(!ctx.refresh_expiry(4_102_444_900));
    }

    #[test]
    fn test_teardown_clears_expired_session() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("session.json");
        let store = SessionStore::new(&path);
        store.save(&make_token(r#"{"sub":"u","exp":4102444800}"#)).expect("save");
        let mut ctx = AppContext::init(store, ThemeMode::Dark, false);
        ctx.refresh_expiry(4_102_444_800);
        ctx.teardown();
        assert!(!path.exists());
    }
}
