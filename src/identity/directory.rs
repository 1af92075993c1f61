//! The authoritative identity registry: registration, lookup and password
//! login. Owns the credential store and coordinates delete-time cleanup across
//! it and the session issuer, which have no knowledge of each other.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::{debug, info};
use uuid::Uuid;

use super::credentials::CredentialStore;
use super::model::{Identity, LoginRequest, NewIdentity, USERS_BASE_PATH};
use super::session::{SessionIssuer, SessionToken};
use crate::problem::{Problem, ProblemResult};

// One detail for every login failure; unknown username and wrong password must
// read identically to the caller.
const BAD_LOGIN_DETAIL: &str = "Username or password is invalid";

#[derive(Default)]
struct DirectoryState {
    identities: HashMap<String, Identity>,
    // username -> id, maintained inside the same critical section as `identities`
    by_username: HashMap<String, String>,
}

pub struct Directory {
    credentials: CredentialStore,
    sessions: Arc<SessionIssuer>,
    state: RwLock<DirectoryState>,
}

impl Default for Directory {
    fn default() -> Self {
        Self::new(CredentialStore::new(), Arc::new(SessionIssuer::default()))
    }
}

impl Directory {
    pub fn new(credentials: CredentialStore, sessions: Arc<SessionIssuer>) -> Self {
        Self { credentials, sessions, state: RwLock::new(DirectoryState::default()) }
    }

    /// The issuer this directory revokes through, shared with the HTTP layer
    /// for token resolution.
    pub fn sessions(&self) -> &Arc<SessionIssuer> {
        &self.sessions
    }

    /// Create an identity with a fresh id and store its credential. Usernames
    /// are unique, compared case-sensitively.
    pub fn register(&self, req: NewIdentity) -> ProblemResult<Identity> {
        let identity = {
            let mut state = self.state.write();
            if state.by_username.contains_key(&req.username) {
                return Err(Problem::already_exists(
                    format!("A user with username, {}, already exists", req.username),
                    USERS_BASE_PATH,
                ));
            }
            let id = Uuid::new_v4().to_string();
            // A v4 collision would mean the 128-bit-random invariant is broken,
            // not that we should retry.
            debug_assert!(!state.identities.contains_key(&id));
            let identity = Identity {
                id: id.clone(),
                username: req.username.clone(),
                full_name: req.full_name.clone(),
            };
            state.identities.insert(id.clone(), identity.clone());
            state.by_username.insert(req.username.clone(), id);
            identity
        };
        // Hashing runs outside the directory lock. Registration stays atomic
        // from the caller's view: if credential setup fails, the identity is
        // unwound and neither half survives.
        if let Err(e) = self.credentials.set(&identity.id, &req.password) {
            let mut state = self.state.write();
            state.identities.remove(&identity.id);
            state.by_username.remove(&identity.username);
            debug!(username = %identity.username, error = %e, "registration unwound");
            return Err(Problem::invalid_request(
                format!("Could not store credential: {e}"),
                USERS_BASE_PATH,
            ));
        }
        info!(username = %identity.username, id = %identity.id, "identity registered");
        Ok(identity)
    }

    /// Index lookup, no scan. This is the id-keyed-adjacent internal path and
    /// may say NotFound; the login path below never does.
    pub fn find_by_username(&self, username: &str) -> ProblemResult<Identity> {
        let state = self.state.read();
        state
            .by_username
            .get(username)
            .and_then(|id| state.identities.get(id))
            .cloned()
            .ok_or_else(|| {
                Problem::not_found(format!("No user with username, {username}, found"), "")
            })
    }

    /// Password login. Unknown username, verify failure and plain mismatch all
    /// collapse to one indistinguishable invalid-credentials outcome. The error
    /// values are identical, but an unknown username skips the argon2 work, so
    /// response timing can still tell the two apart; known limitation, closable
    /// with a dummy verify against a static hash if it ever matters here.
    pub fn authenticate(&self, req: &LoginRequest) -> ProblemResult<Identity> {
        let identity = self
            .find_by_username(&req.username)
            .map_err(|_| Problem::invalid_credentials(BAD_LOGIN_DETAIL, ""))?;
        match self.credentials.verify(&identity.id, &req.password) {
            Ok(true) => Ok(identity),
            Ok(false) | Err(_) => Err(Problem::invalid_credentials(BAD_LOGIN_DETAIL, "")),
        }
    }

    /// Login and mint a bearer token in one step.
    pub fn create_token(&self, req: &LoginRequest) -> ProblemResult<SessionToken> {
        let identity = self.authenticate(req)?;
        self.sessions.issue(&identity.id)
    }

    pub fn get(&self, id: &str) -> ProblemResult<Identity> {
        self.state
            .read()
            .identities
            .get(id)
            .cloned()
            .ok_or_else(|| not_found_by_id(id))
    }

    pub fn list(&self) -> Vec<Identity> {
        self.state.read().identities.values().cloned().collect()
    }

    /// Display name is the one mutable identity field.
    pub fn update_full_name(&self, id: &str, full_name: &str) -> ProblemResult<Identity> {
        let mut state = self.state.write();
        match state.identities.get_mut(id) {
            Some(identity) => {
                identity.full_name = full_name.to_string();
                Ok(identity.clone())
            }
            None => Err(not_found_by_id(id)),
        }
    }

    /// Remove the identity, purge its credential and revoke all of its tokens.
    /// The map removal is the commit point; both cascades are idempotent, so
    /// either all three go or none do.
    pub fn delete(&self, id: &str) -> ProblemResult<()> {
        let identity = {
            let mut state = self.state.write();
            let Some(identity) = state.identities.remove(id) else {
                return Err(not_found_by_id(id));
            };
            state.by_username.remove(&identity.username);
            identity
        };
        self.credentials.remove(id);
        let revoked = self.sessions.revoke_all(id);
        info!(username = %identity.username, id = %id, revoked, "identity deleted");
        Ok(())
    }
}

fn not_found_by_id(id: &str) -> Problem {
    Problem::not_found(
        format!("User with uuid, {id}, does not exist."),
        format!("{USERS_BASE_PATH}/{id}"),
    )
}
