//! Value types shared across the sign-in flow
//!
//! Everything here is immutable data: the normalized credential, the
//! public sign-in result, the opaque presentation handle, and the
//! outcome a presentation host reports back.

use url::Url;
use uuid::Uuid;

/// Credential type tag for a provider-issued identity token credential.
///
/// Any other tag returned by the identity collaborator fails retrieval
/// with [`UnsupportedCredentialType`](crate::SignFlowError::UnsupportedCredentialType).
pub const ID_TOKEN_CREDENTIAL_TYPE: &str = "identity.google.id-token";

/// Scope granting access to the user's basic profile.
pub const SCOPE_PROFILE: &str = "profile";

/// Scope granting access to the user's email address.
pub const SCOPE_EMAIL: &str = "email";

/// Returns the default scope set used when the caller passes no scopes.
///
/// Absence means "use this default"; an explicit empty list is passed
/// through as-is and never replaced by the default.
pub fn default_scopes() -> Vec<String> {
    vec![SCOPE_PROFILE.to_string(), SCOPE_EMAIL.to_string()]
}

// ---------------------------------------------------------------------------
// CredentialResult
// ---------------------------------------------------------------------------

/// Normalized result of a successful credential retrieval.
///
/// Populated once by the [`CredentialRetriever`](super::retriever::CredentialRetriever)
/// and immutable thereafter. `server_auth_code` is only set on paths
/// where the identity collaborator minted one during retrieval.
#[derive(Debug, Clone, PartialEq, serde::Deserialize)]
pub struct CredentialResult {
    /// The provider-issued identity token.
    pub id_token: String,

    #[serde(default)]
    pub display_name: Option<String>,

    #[serde(default)]
    pub family_name: Option<String>,

    #[serde(default)]
    pub given_name: Option<String>,

    #[serde(default)]
    pub profile_picture_uri: Option<Url>,

    #[serde(default)]
    pub phone_number: Option<String>,

    #[serde(default)]
    pub server_auth_code: Option<String>,
}

// ---------------------------------------------------------------------------
// SignInResult
// ---------------------------------------------------------------------------

/// Final combined result surfaced to the caller.
///
/// All fields are absent-capable; a host can serialize this directly
/// (absent fields are skipped) to ship it across a process boundary.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize)]
pub struct SignInResult {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id_token: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub family_name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub given_name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile_picture_uri: Option<Url>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub server_auth_code: Option<String>,
}

impl SignInResult {
    /// Builds a result from a retrieved credential plus the server auth
    /// code the silent authorization carried (which may be absent).
    pub fn from_credential(credential: &CredentialResult, server_auth_code: Option<String>) -> Self {
        Self {
            id_token: Some(credential.id_token.clone()),
            display_name: credential.display_name.clone(),
            family_name: credential.family_name.clone(),
            given_name: credential.given_name.clone(),
            profile_picture_uri: credential.profile_picture_uri.clone(),
            phone_number: credential.phone_number.clone(),
            server_auth_code,
        }
    }

    /// Combines the original credential with the payload the approval
    /// presentation reported back.
    ///
    /// Payload fields take precedence where present; the server auth
    /// code always comes from the payload since the approval is what
    /// minted it.
    pub fn combine(credential: &CredentialResult, payload: &ApprovalPayload) -> Self {
        Self {
            id_token: payload
                .id_token
                .clone()
                .or_else(|| Some(credential.id_token.clone())),
            display_name: payload
                .display_name
                .clone()
                .or_else(|| credential.display_name.clone()),
            family_name: payload
                .family_name
                .clone()
                .or_else(|| credential.family_name.clone()),
            given_name: payload
                .given_name
                .clone()
                .or_else(|| credential.given_name.clone()),
            profile_picture_uri: payload
                .profile_picture_uri
                .clone()
                .or_else(|| credential.profile_picture_uri.clone()),
            phone_number: payload
                .phone_number
                .clone()
                .or_else(|| credential.phone_number.clone()),
            server_auth_code: payload.server_auth_code.clone(),
        }
    }
}

// ---------------------------------------------------------------------------
// PresentationHandle
// ---------------------------------------------------------------------------

/// Opaque token representing a pending OS-mediated approval request.
///
/// Created by the authorization collaborator, consumed by the
/// [`ExternalResultBridge`](super::bridge::ExternalResultBridge). The
/// `id` keys the pending-completion table; `token` is the opaque launch
/// blob handed back to the presentation host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PresentationHandle {
    /// Unique identifier used to correlate the eventual outcome.
    pub id: Uuid,

    /// Provider-opaque blob required to launch the presentation.
    pub token: String,
}

impl PresentationHandle {
    /// Creates a handle with a fresh identifier around a provider blob.
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            token: token.into(),
        }
    }
}

// ---------------------------------------------------------------------------
// Presentation outcome
// ---------------------------------------------------------------------------

/// Outcome code a presentation host reports for an approval request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutcomeCode {
    /// The presentation finished successfully.
    Ok,
    /// The presentation was dismissed, cancelled, or failed.
    NotOk,
}

/// Result payload carried by a successful approval presentation.
///
/// Mirrors the fields the identity platform attaches to the approval
/// result. All fields are optional; missing ones fall back to the
/// session's original credential when combined.
#[derive(Debug, Clone, Default, PartialEq, serde::Deserialize)]
pub struct ApprovalPayload {
    #[serde(default)]
    pub id_token: Option<String>,

    #[serde(default)]
    pub display_name: Option<String>,

    #[serde(default)]
    pub family_name: Option<String>,

    #[serde(default)]
    pub given_name: Option<String>,

    #[serde(default)]
    pub profile_picture_uri: Option<Url>,

    #[serde(default)]
    pub phone_number: Option<String>,

    #[serde(default)]
    pub server_auth_code: Option<String>,
}

/// Outcome delivered by the presentation host's callback.
#[derive(Debug, Clone)]
pub struct PresentationOutcome {
    /// Identifier of the [`PresentationHandle`] this outcome belongs to.
    pub handle_id: Uuid,

    /// Whether the presentation finished successfully.
    pub code: OutcomeCode,

    /// Result payload; only meaningful when `code` is [`OutcomeCode::Ok`].
    pub payload: Option<ApprovalPayload>,
}
