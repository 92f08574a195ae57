//! Credential retrieval against the identity collaborator
//!
//! Phase one of the sign-in flow: one awaited call to the
//! [`CredentialProvider`], with the provider-specific response
//! normalized into a [`CredentialResult`] or a typed failure.

use std::sync::Arc;

use base64::Engine as _;

use crate::error::{Result, SignFlowError};
use crate::signin::providers::{CredentialProvider, CredentialRequest};
use crate::signin::types::{CredentialResult, ID_TOKEN_CREDENTIAL_TYPE};

/// Performs one awaited credential retrieval and normalizes the result.
///
/// The retriever has no side effects beyond the single external call:
/// it generates a per-call nonce, issues the request, checks the
/// credential type tag, and parses the opaque payload.
///
/// # Examples
///
/// ```no_run
/// use std::sync::Arc;
/// use signflow::signin::retriever::CredentialRetriever;
/// # use signflow::signin::providers::CredentialProvider;
///
/// # async fn example(provider: Arc<dyn CredentialProvider>) -> signflow::Result<()> {
/// let retriever = CredentialRetriever::new(provider);
/// let credential = retriever.retrieve("client-123").await?;
/// println!("signed in as {:?}", credential.display_name);
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct CredentialRetriever {
    provider: Arc<dyn CredentialProvider>,
}

impl CredentialRetriever {
    /// Creates a retriever over the given identity collaborator.
    pub fn new(provider: Arc<dyn CredentialProvider>) -> Self {
        Self { provider }
    }

    /// Retrieves and normalizes one credential.
    ///
    /// # Errors
    ///
    /// - [`SignFlowError::UnsupportedCredentialType`] when the provider
    ///   returns a credential with an unexpected type tag.
    /// - [`SignFlowError::InvalidToken`] when the payload cannot be
    ///   parsed or carries an empty identity token.
    /// - [`SignFlowError::NoCredentialAvailable`] and
    ///   [`SignFlowError::Cancelled`] pass through from the provider;
    ///   any other provider failure is wrapped as
    ///   [`SignFlowError::Unknown`] with the cause preserved.
    pub async fn retrieve(&self, provider_client_id: &str) -> Result<CredentialResult> {
        let request = CredentialRequest {
            provider_client_id: provider_client_id.to_string(),
            nonce: generate_nonce(),
        };

        tracing::debug!(client_id = %provider_client_id, "requesting credential from identity provider");

        let response = match self.provider.get_credential(request).await {
            Ok(response) => response,
            Err(e) => return Err(normalize_provider_failure(e)),
        };

        if response.credential_type != ID_TOKEN_CREDENTIAL_TYPE {
            tracing::warn!(
                credential_type = %response.credential_type,
                "identity provider returned an unexpected credential type"
            );
            return Err(SignFlowError::UnsupportedCredentialType(response.credential_type).into());
        }

        let credential: CredentialResult = serde_json::from_value(response.payload)
            .map_err(|e| SignFlowError::InvalidToken(format!("credential payload could not be parsed: {e}")))?;

        if credential.id_token.trim().is_empty() {
            return Err(
                SignFlowError::InvalidToken("credential payload carries an empty id_token".to_string()).into(),
            );
        }

        tracing::debug!("credential retrieval completed");
        Ok(credential)
    }
}

/// Generates a cryptographically random per-call nonce.
///
/// 16 random bytes encoded as base64url without padding.
fn generate_nonce() -> String {
    use rand::RngCore as _;
    let mut bytes = [0u8; 16];
    rand::rng().fill_bytes(&mut bytes);
    base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(bytes)
}

/// Passes through failures that already carry a [`SignFlowError`] kind;
/// wraps anything else as [`SignFlowError::Unknown`].
fn normalize_provider_failure(error: anyhow::Error) -> anyhow::Error {
    if error.downcast_ref::<SignFlowError>().is_some() {
        error
    } else {
        SignFlowError::Unknown(format!("credential provider failure: {error}")).into()
    }
}
