/// Authentication module
///
/// Password hashing, bearer header parsing, access tokens (JWT), refresh
/// tokens, and the session flows built from them.

mod bearer;
mod claims;
mod jwt;
mod password;
mod refresh_token;
mod session;

pub use bearer::extract_bearer;
pub use jwt::{issue_access_token, verify_access_token};
pub use password::{hash_password, verify_password};
pub use refresh_token::{
    fingerprint, generate_refresh_token, lookup_refresh_token, revoke_refresh_token,
    save_refresh_token, RefreshToken, RefreshTokenState,
};
pub use session::{LoginSession, SessionService};
