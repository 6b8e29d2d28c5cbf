use std::fmt;
use std::sync::Arc;

use tracing::{debug, error};

use super::outcomes::{PolicyDenial, PolicyOutcome};
use super::token_service::TokenService;
use crate::domain::users::Role;
use crate::domain::users::auth::domain::repositories::CredentialStore;

/// Decides whether a bearer access token satisfies a required role.
///
/// Role membership is read from the token's claims, so a role change is only
/// observed once the holder receives a new access token.
pub struct PolicyService {
    tokens: Arc<TokenService>,
    store: Arc<dyn CredentialStore>,
}

impl fmt::Debug for PolicyService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PolicyService")
            .field("store_refs", &Arc::strong_count(&self.store))
            .finish_non_exhaustive()
    }
}

impl PolicyService {
    pub fn new(tokens: Arc<TokenService>, store: Arc<dyn CredentialStore>) -> Self {
        Self { tokens, store }
    }

    pub async fn check_policy(&self, token: &str, required: Role) -> PolicyOutcome {
        let claims = match self.tokens.decode_access_token(token) {
            Ok(claims) => claims,
            Err(err) => {
                debug!(error = %err, role = %required, "policy check with invalid token");
                return PolicyOutcome::Failure(PolicyDenial::InvalidToken);
            }
        };

        let Some(email) = claims.subject_email() else {
            return PolicyOutcome::Failure(PolicyDenial::MissingSubject);
        };

        // The admin policy does not require a confirmed address.
        if required != Role::Admin {
            match self.store.find_by_email(email).await {
                Ok(Some(user)) if user.email_confirmed => {}
                Ok(_) => {
                    return PolicyOutcome::Failure(PolicyDenial::EmailNotConfirmed);
                }
                Err(err) => {
                    error!(error = %err, "user lookup failed during policy check");
                    return PolicyOutcome::Unexpected;
                }
            }
        }

        if claims.has_role(required) {
            PolicyOutcome::Success
        } else {
            PolicyOutcome::Failure(PolicyDenial::RoleNotGranted)
        }
    }

    pub async fn check_customer(&self, token: &str) -> PolicyOutcome {
        self.check_policy(token, Role::Customer).await
    }

    pub async fn check_vendor(&self, token: &str) -> PolicyOutcome {
        self.check_policy(token, Role::Vendor).await
    }

    pub async fn check_admin(&self, token: &str) -> PolicyOutcome {
        self.check_policy(token, Role::Admin).await
    }
}
