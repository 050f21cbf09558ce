//! Identity exchange: turning a sign-in credential into a resolved profile.
//!
//! The provider handshake itself is an opaque collaborator behind the
//! [`IdentityExchange`] trait. The real implementation lives on the remote
//! backend ([`crate::store::remote::RemoteStore`]); [`StubIdentity`] serves
//! offline demo mode and tests.

use taskdeck_proto::identity::Profile;
use taskdeck_proto::task::UserKey;

/// Errors that can occur during credential exchange.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// The credential was rejected by the provider.
    #[error("invalid or expired credential")]
    InvalidCredential,

    /// The provider could not be reached.
    #[error("identity provider unavailable: {0}")]
    Unavailable(String),
}

/// Async seam to the identity provider.
pub trait IdentityExchange: Send + Sync {
    /// Exchange a provider credential for a resolved [`Profile`].
    ///
    /// A failed exchange aborts session establishment; the caller stays on
    /// the unauthenticated view.
    fn exchange_credential(
        &self,
        code: &str,
    ) -> impl std::future::Future<Output = Result<Profile, AuthError>> + Send;
}

/// Offline identity provider: derives a stable profile from the code.
///
/// Accepts any non-empty credential, so demo mode and unit tests can sign
/// in without a provider.
#[derive(Debug, Default)]
pub struct StubIdentity;

impl StubIdentity {
    /// Creates the stub provider.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl IdentityExchange for StubIdentity {
    async fn exchange_credential(&self, code: &str) -> Result<Profile, AuthError> {
        if code.is_empty() {
            return Err(AuthError::InvalidCredential);
        }
        Ok(Profile {
            user_key: UserKey::new(format!("user-{code}")),
            display_name: code.to_string(),
            avatar_url: String::new(),
        })
    }
}
