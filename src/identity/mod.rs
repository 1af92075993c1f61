//! Central identity and session management for the review board.
//! Keep the public surface thin and split implementation across sub-modules.

mod credentials;
mod directory;
mod model;
mod rng;
mod session;

pub use credentials::{CredentialError, CredentialStore};
pub use directory::Directory;
pub use model::{Identity, LoginRequest, NewIdentity, TokenResponse, USERS_BASE_PATH};
pub use rng::{OsTokenSource, TokenSource};
pub use session::{SessionIssuer, SessionToken};
