//! Session configuration.

use serde::{Deserialize, Serialize};

/// Session behaviour at startup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Re-fetch the profile from the server after rehydrating.
    #[serde(default)]
    pub revalidate_on_start: bool,

    /// Endpoint returning the signed-in user's profile.
    #[serde(default = "default_profile_path")]
    pub profile_path: String,
}

fn default_profile_path() -> String {
    "/auth/me".to_string()
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            revalidate_on_start: false,
            profile_path: default_profile_path(),
        }
    }
}
