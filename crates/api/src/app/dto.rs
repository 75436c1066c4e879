use serde::{Deserialize, Serialize};

use warden_auth::{Identity, role_for_authority};

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthenticationResponse {
    pub access_token: String,
}

/// Public view of the signed-in user.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: String,
    pub username: String,
    pub display_name: String,
    /// Role names, without the `ROLE_` prefix.
    pub roles: Vec<String>,
}

impl From<&Identity> for UserProfile {
    fn from(identity: &Identity) -> Self {
        Self {
            id: identity.id().to_string(),
            username: identity.username().to_string(),
            display_name: identity.display_name().to_string(),
            roles: identity
                .authorities()
                .iter()
                .filter_map(role_for_authority)
                .map(|role| role.to_string())
                .collect(),
        }
    }
}
