//! Collaborator traits at the identity-platform boundary
//!
//! This module defines the seams between the orchestration core and the
//! external identity platform. Three collaborators exist:
//!
//! - [`CredentialProvider`] -- performs the actual credential
//!   verification and identity token issuance.
//! - [`AuthorizationProvider`] -- grants scoped access beyond bare
//!   identity, optionally minting an offline/refresh code.
//! - [`PresentationHost`] -- the OS-level "present this approval UI and
//!   report the outcome later" mechanism.
//!
//! The crate never implements these itself; hosts supply concrete
//! implementations (and tests supply in-process fakes). Implementations
//! are used polymorphically through `Arc<dyn ...>`.
//!
//! # Canonical Import Path
//!
//! ```no_run
//! use signflow::signin::providers::CredentialProvider;
//! ```

use std::fmt;
use std::sync::Arc;

use crate::error::Result;
use crate::signin::types::{PresentationHandle, PresentationOutcome};

// ---------------------------------------------------------------------------
// Request / response values
// ---------------------------------------------------------------------------

/// Request for one credential retrieval.
#[derive(Debug, Clone)]
pub struct CredentialRequest {
    /// Provider client identifier of the calling application.
    pub provider_client_id: String,

    /// Freshly generated per-call nonce for replay resistance.
    pub nonce: String,
}

/// Raw response from a credential provider.
///
/// The payload stays opaque at this boundary; the retriever checks the
/// type tag and deserializes the payload into a
/// [`CredentialResult`](super::types::CredentialResult).
#[derive(Debug, Clone)]
pub struct CredentialResponse {
    /// Provider-specific credential type tag.
    pub credential_type: String,

    /// Opaque credential data bundle.
    pub payload: serde_json::Value,
}

/// Request for one delegated authorization.
#[derive(Debug, Clone)]
pub struct AuthorizationRequest {
    /// Provider client identifier of the calling application.
    pub provider_client_id: String,

    /// Scopes to request. Already resolved: the default set has been
    /// substituted for an absent list before this struct is built, and
    /// an explicit empty list arrives here empty.
    pub scopes: Vec<String>,

    /// When `true`, the provider must mint a fresh offline/refresh code
    /// rather than reusing a cached grant.
    pub force_refresh_code: bool,
}

/// Raw response from an authorization provider.
#[derive(Debug, Clone)]
pub struct AuthorizationResponse {
    /// Set when the grant needs a user-facing approval step. Takes
    /// precedence over `server_auth_code` when both are present.
    pub pending_presentation: Option<PresentationHandle>,

    /// Offline/refresh code from a silent grant; may be absent.
    pub server_auth_code: Option<String>,
}

// ---------------------------------------------------------------------------
// Collaborator traits
// ---------------------------------------------------------------------------

/// Identity collaborator that verifies the user and issues a credential.
///
/// The entire external round trip is one suspension point; the provider
/// must not block the calling executor.
///
/// # Errors
///
/// Implementations should fail with the matching
/// [`SignFlowError`](crate::SignFlowError) kind where one applies:
/// [`NoCredentialAvailable`](crate::SignFlowError::NoCredentialAvailable)
/// when the platform reports none, and
/// [`Cancelled`](crate::SignFlowError::Cancelled) when the user or
/// platform cancels mid-retrieval. Other failures are wrapped as
/// [`Unknown`](crate::SignFlowError::Unknown) by the retriever.
#[async_trait::async_trait]
pub trait CredentialProvider: Send + Sync + fmt::Debug {
    /// Performs one credential retrieval round trip.
    async fn get_credential(&self, request: CredentialRequest) -> Result<CredentialResponse>;
}

/// Authorization collaborator that grants scoped access.
///
/// The response resolves through the same future the request was
/// submitted with; there is no blocking wait.
#[async_trait::async_trait]
pub trait AuthorizationProvider: Send + Sync + fmt::Debug {
    /// Submits one delegated authorization request.
    async fn authorize(&self, request: AuthorizationRequest) -> Result<AuthorizationResponse>;
}

/// Callback a [`PresentationHost`] invokes when an approval presentation
/// finishes.
///
/// Invoked by the host, not by this crate. The bridge's callback is
/// safe to call at any time; stale or duplicate deliveries are
/// discarded.
pub type PresentationCallback = Arc<dyn Fn(PresentationOutcome) + Send + Sync>;

/// OS-level mechanism that displays approval UIs and reports outcomes.
pub trait PresentationHost: Send + Sync + fmt::Debug {
    /// Registers the outcome callback, returning the live subscription.
    ///
    /// # Errors
    ///
    /// Fails with [`NoHostSurface`](crate::SignFlowError::NoHostSurface)
    /// when the host has no UI surface to attach the registration to.
    fn register(&self, callback: PresentationCallback) -> Result<Box<dyn PresentationSubscription>>;
}

/// A live registration with a [`PresentationHost`].
pub trait PresentationSubscription: Send + Sync + fmt::Debug {
    /// Hands an approval request to the host for display.
    ///
    /// The outcome arrives later through the registered callback, not
    /// through this call.
    fn launch(&self, handle: &PresentationHandle) -> Result<()>;

    /// Tears down the registration. Outcomes delivered after this point
    /// are the host's business; the bridge treats them as stale.
    fn unregister(&self);
}
