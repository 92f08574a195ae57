//! Delegated authorization coordination
//!
//! Phase two of the sign-in flow: submit a scoped authorization request
//! to the [`AuthorizationProvider`] and branch on its response. A grant
//! either resolves silently ([`AuthorizationOutcome::AlreadyAuthorized`],
//! optionally carrying an offline/refresh code) or requires a
//! user-facing approval step ([`AuthorizationOutcome::NeedsApproval`]).

use std::sync::Arc;

use crate::error::{Result, SignFlowError};
use crate::signin::providers::{AuthorizationProvider, AuthorizationRequest};
use crate::signin::types::{default_scopes, PresentationHandle};

/// Tagged outcome of a delegated authorization request.
#[derive(Debug, Clone, PartialEq)]
pub enum AuthorizationOutcome {
    /// The grant was satisfied without user interaction. The server
    /// auth code may be absent: a silent grant carries no offline code.
    AlreadyAuthorized(Option<String>),

    /// The grant needs an OS-mediated approval presentation before it
    /// can complete.
    NeedsApproval(PresentationHandle),
}

/// Requests scoped authorization for a retrieved credential.
///
/// Scope semantics: `None` means "use the default profile+email set";
/// an explicit empty slice is passed through as-is. The two are
/// distinct on purpose -- callers that want no scopes at all must be
/// able to say so.
///
/// The `force_refresh_code` flag is forwarded verbatim in the request.
/// It only controls whether the provider mints a fresh offline code; it
/// never influences the approval-needed vs already-authorized branch.
///
/// # Examples
///
/// ```no_run
/// use std::sync::Arc;
/// use signflow::signin::coordinator::{AuthorizationCoordinator, AuthorizationOutcome};
/// # use signflow::signin::providers::AuthorizationProvider;
///
/// # async fn example(provider: Arc<dyn AuthorizationProvider>) -> signflow::Result<()> {
/// let coordinator = AuthorizationCoordinator::new(provider);
/// match coordinator.authorize("client-123", None, false).await? {
///     AuthorizationOutcome::AlreadyAuthorized(code) => println!("silent grant, code {code:?}"),
///     AuthorizationOutcome::NeedsApproval(handle) => println!("needs approval {}", handle.id),
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct AuthorizationCoordinator {
    provider: Arc<dyn AuthorizationProvider>,
}

impl AuthorizationCoordinator {
    /// Creates a coordinator over the given authorization collaborator.
    pub fn new(provider: Arc<dyn AuthorizationProvider>) -> Self {
        Self { provider }
    }

    /// Submits one authorization request and maps the response.
    ///
    /// Suspends on the provider call without blocking; the provider's
    /// response resolves through the same future the request was
    /// submitted with.
    ///
    /// # Errors
    ///
    /// Returns [`SignFlowError::AuthorizationFailed`] wrapping the
    /// underlying cause when the provider fails.
    pub async fn authorize(
        &self,
        provider_client_id: &str,
        scopes: Option<&[String]>,
        force_refresh_code: bool,
    ) -> Result<AuthorizationOutcome> {
        let requested_scopes = match scopes {
            Some(explicit) => explicit.to_vec(),
            None => default_scopes(),
        };

        tracing::debug!(
            client_id = %provider_client_id,
            scopes = ?requested_scopes,
            force_refresh_code,
            "submitting authorization request"
        );

        let request = AuthorizationRequest {
            provider_client_id: provider_client_id.to_string(),
            scopes: requested_scopes,
            force_refresh_code,
        };

        let response = self
            .provider
            .authorize(request)
            .await
            .map_err(|e| SignFlowError::AuthorizationFailed(e.to_string()))?;

        // A pending presentation wins even when a server auth code is
        // also present: the grant is not usable until approved.
        match response.pending_presentation {
            Some(handle) => {
                tracing::debug!(handle_id = %handle.id, "authorization requires external approval");
                Ok(AuthorizationOutcome::NeedsApproval(handle))
            }
            None => {
                tracing::debug!(
                    has_auth_code = response.server_auth_code.is_some(),
                    "authorization satisfied silently"
                );
                Ok(AuthorizationOutcome::AlreadyAuthorized(response.server_auth_code))
            }
        }
    }
}
