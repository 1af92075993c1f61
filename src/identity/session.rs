//! Opaque bearer-token lifecycle: issue, resolve, revoke.
//! Tokens carry no expiry and there is no sweep; a token lives until it is
//! revoked or its owner is deleted. Known limitation; an `expires_at` field
//! plus a sweep would bolt on without changing this contract.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use base64::Engine;
use parking_lot::RwLock;

use super::rng::{OsTokenSource, TokenSource};
use crate::problem::{Problem, ProblemResult};
use crate::tprintln;

pub type SessionToken = String;

#[derive(Default)]
struct SessionState {
    by_token: HashMap<SessionToken, String>,
    // owner id -> outstanding tokens, maintained with by_token in one critical section
    by_owner: HashMap<String, HashSet<SessionToken>>,
}

pub struct SessionIssuer {
    rng: Arc<dyn TokenSource>,
    state: RwLock<SessionState>,
}

impl Default for SessionIssuer {
    fn default() -> Self {
        Self::new(Arc::new(OsTokenSource))
    }
}

impl SessionIssuer {
    pub fn new(rng: Arc<dyn TokenSource>) -> Self {
        Self { rng, state: RwLock::new(SessionState::default()) }
    }

    /// Mint a fresh bearer token for `owner_id`. Tokens are independent: issuing
    /// a new one never invalidates those already outstanding, and nothing about
    /// the token is derived from the owner id.
    pub fn issue(&self, owner_id: &str) -> ProblemResult<SessionToken> {
        let token = self.gen_token()?;
        let mut state = self.state.write();
        state.by_token.insert(token.clone(), owner_id.to_string());
        state
            .by_owner
            .entry(owner_id.to_string())
            .or_default()
            .insert(token.clone());
        tprintln!("session.issue owner={}", owner_id);
        Ok(token)
    }

    /// Resolve a token back to its owner id. An unknown token reports the same
    /// problem kind as a failed login, so token guessing is no more informative
    /// than password guessing.
    pub fn resolve(&self, token: &str) -> ProblemResult<String> {
        self.state.read().by_token.get(token).cloned().ok_or_else(|| {
            Problem::invalid_credentials("Token is invalid or has been revoked", "")
        })
    }

    /// Remove one token. Revoking a token that is already gone is not an error;
    /// the return value says whether anything was removed.
    pub fn revoke(&self, token: &str) -> bool {
        let mut state = self.state.write();
        let Some(owner) = state.by_token.remove(token) else { return false };
        if let Some(set) = state.by_owner.get_mut(&owner) {
            set.remove(token);
            if set.is_empty() {
                state.by_owner.remove(&owner);
            }
        }
        true
    }

    /// Remove every outstanding token for `owner_id`, returning how many fell.
    /// Used by the identity directory when it deletes an identity.
    pub fn revoke_all(&self, owner_id: &str) -> usize {
        let mut state = self.state.write();
        let Some(tokens) = state.by_owner.remove(owner_id) else { return 0 };
        let mut count = 0usize;
        for t in tokens {
            if state.by_token.remove(&t).is_some() {
                count += 1;
            }
        }
        tprintln!("session.revoke owner={} count={}", owner_id, count);
        count
    }

    fn gen_token(&self) -> ProblemResult<SessionToken> {
        // 256-bit random token, base64url without padding
        let mut buf = [0u8; 32];
        self.rng.fill(&mut buf)?;
        Ok(base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(buf))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::problem::ProblemKind;
    use parking_lot::Mutex;

    // Counter-backed source: deterministic, still distinct across calls.
    struct CountingSource(Mutex<u8>);

    impl CountingSource {
        fn new() -> Self {
            Self(Mutex::new(0))
        }
    }

    impl TokenSource for CountingSource {
        fn fill(&self, buf: &mut [u8]) -> ProblemResult<()> {
            let mut n = self.0.lock();
            *n = n.wrapping_add(1);
            buf.fill(*n);
            Ok(())
        }
    }

    #[test]
    fn issue_twice_yields_distinct_live_tokens() {
        let issuer = SessionIssuer::default();
        let t1 = issuer.issue("owner-1").unwrap();
        let t2 = issuer.issue("owner-1").unwrap();
        assert_ne!(t1, t2);
        assert_eq!(issuer.resolve(&t1).unwrap(), "owner-1");
        assert_eq!(issuer.resolve(&t2).unwrap(), "owner-1");
    }

    #[test]
    fn revoke_one_leaves_the_other_valid() {
        let issuer = SessionIssuer::default();
        let t1 = issuer.issue("owner-1").unwrap();
        let t2 = issuer.issue("owner-1").unwrap();
        assert!(issuer.revoke(&t1));
        assert_eq!(issuer.resolve(&t1).unwrap_err().kind, ProblemKind::InvalidCredentials);
        assert_eq!(issuer.resolve(&t2).unwrap(), "owner-1");
    }

    #[test]
    fn revoke_is_idempotent() {
        let issuer = SessionIssuer::default();
        let t = issuer.issue("owner-1").unwrap();
        assert!(issuer.revoke(&t));
        assert!(!issuer.revoke(&t));
        assert!(!issuer.revoke("never-issued"));
    }

    #[test]
    fn revoke_all_clears_every_token_for_the_owner() {
        let issuer = SessionIssuer::default();
        let t1 = issuer.issue("owner-1").unwrap();
        let t2 = issuer.issue("owner-1").unwrap();
        let other = issuer.issue("owner-2").unwrap();
        assert_eq!(issuer.revoke_all("owner-1"), 2);
        assert_eq!(issuer.revoke_all("owner-1"), 0);
        assert!(issuer.resolve(&t1).is_err());
        assert!(issuer.resolve(&t2).is_err());
        assert_eq!(issuer.resolve(&other).unwrap(), "owner-2");
    }

    #[test]
    fn injected_source_drives_token_bytes() {
        let issuer = SessionIssuer::new(Arc::new(CountingSource::new()));
        let t1 = issuer.issue("owner-1").unwrap();
        let t2 = issuer.issue("owner-1").unwrap();
        // First fill is all 0x01, second all 0x02: deterministic and distinct.
        assert_eq!(t1, base64::engine::general_purpose::URL_SAFE_NO_PAD.encode([1u8; 32]));
        assert_eq!(t2, base64::engine::general_purpose::URL_SAFE_NO_PAD.encode([2u8; 32]));
    }

    #[test]
    fn unknown_token_reports_invalid_credentials() {
        let issuer = SessionIssuer::default();
        let err = issuer.resolve("no-such-token").unwrap_err();
        assert_eq!(err.kind, ProblemKind::InvalidCredentials);
    }
}
