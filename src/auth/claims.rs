use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::users::repo::Role;

/// JWT payload carried by a session token. `sub` and `role` are the typed
/// identity the proxy layer authorizes against; issuing these tokens is the
/// external identity provider's job.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,   // user ID
    pub role: Role,  // authorization role
    pub iat: usize,  // issued at (unix timestamp)
    pub exp: usize,  // expires at (unix timestamp)
    pub iss: String, // issuer
    pub aud: String, // audience
}
