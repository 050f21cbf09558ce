//! Credential directory backing the identity-exchange endpoint.
//!
//! Maps sign-in codes to resolved profiles. In demo mode
//! (`allow_any_credential`) any non-empty code is accepted and a profile is
//! derived from it, so the client can be exercised without provisioning
//! accounts.

use std::collections::HashMap;

use tokio::sync::RwLock;

use taskdeck_proto::identity::Profile;
use taskdeck_proto::task::UserKey;

/// Directory of known credentials, thread-safe via [`RwLock`].
pub struct CredentialDirectory {
    known: RwLock<HashMap<String, Profile>>,
    allow_any: bool,
}

impl CredentialDirectory {
    /// Creates an empty directory that only accepts registered codes.
    #[must_use]
    pub fn new() -> Self {
        Self {
            known: RwLock::new(HashMap::new()),
            allow_any: false,
        }
    }

    /// Creates a directory that derives a profile from any non-empty code.
    #[must_use]
    pub fn allow_any() -> Self {
        Self {
            known: RwLock::new(HashMap::new()),
            allow_any: true,
        }
    }

    /// Registers a code, replacing any previous profile under it.
    pub async fn register(&self, code: &str, profile: Profile) {
        let mut known = self.known.write().await;
        known.insert(code.to_string(), profile);
    }

    /// Resolves a code to a profile.
    ///
    /// Registered codes win over derivation. Returns `None` for unknown
    /// codes (or any empty code).
    pub async fn exchange(&self, code: &str) -> Option<Profile> {
        if code.is_empty() {
            return None;
        }
        let known = self.known.read().await;
        if let Some(profile) = known.get(code) {
            return Some(profile.clone());
        }
        if self.allow_any {
            return Some(derive_profile(code));
        }
        None
    }
}

impl Default for CredentialDirectory {
    fn default() -> Self {
        Self::new()
    }
}

/// Derives a demo profile from a credential code.
fn derive_profile(code: &str) -> Profile {
    Profile {
        user_key: UserKey::new(format!("user-{code}")),
        display_name: code.to_string(),
        avatar_url: String::new(),
    }
}
