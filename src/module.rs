//! Host-facing module surface
//!
//! [`SignInModule`] is what a host framework embeds: lifecycle hooks
//! that bracket the module's life (`on_create` / `on_destroy`) and the
//! single public operation `sign_in_async`. The host must call
//! [`on_create`](SignInModule::on_create) before any sign-in call can
//! succeed, and [`on_destroy`](SignInModule::on_destroy) on shutdown.

use std::sync::Arc;

use crate::config::SignInConfig;
use crate::error::Result;
use crate::signin::providers::{AuthorizationProvider, CredentialProvider, PresentationHost};
use crate::signin::session::SessionLifecycleManager;
use crate::signin::types::SignInResult;

/// Embeddable sign-in module over three external collaborators.
///
/// # Examples
///
/// ```no_run
/// use std::sync::Arc;
/// use signflow::SignInModule;
/// # use signflow::signin::providers::{CredentialProvider, AuthorizationProvider, PresentationHost};
///
/// # async fn example(
/// #     credentials: Arc<dyn CredentialProvider>,
/// #     authorization: Arc<dyn AuthorizationProvider>,
/// #     host: Arc<dyn PresentationHost>,
/// # ) -> signflow::Result<()> {
/// let module = SignInModule::new(credentials, authorization, host);
/// module.on_create()?;
/// let result = module.sign_in_async("client-123", None, None).await?;
/// module.on_destroy();
/// # Ok(())
/// # }
/// ```
pub struct SignInModule {
    manager: SessionLifecycleManager,
}

impl SignInModule {
    /// Wires a module over the given collaborators. No registration
    /// happens until [`on_create`](Self::on_create).
    pub fn new(
        credential_provider: Arc<dyn CredentialProvider>,
        authorization_provider: Arc<dyn AuthorizationProvider>,
        presentation_host: Arc<dyn PresentationHost>,
    ) -> Self {
        Self {
            manager: SessionLifecycleManager::new(
                credential_provider,
                authorization_provider,
                presentation_host,
            ),
        }
    }

    /// Lifecycle hook: registers the presentation bridge.
    ///
    /// Must run before any sign-in call can succeed. Idempotent.
    ///
    /// # Errors
    ///
    /// Propagates [`SignFlowError::NoHostSurface`](crate::SignFlowError::NoHostSurface)
    /// when the host has no UI surface to register against.
    pub fn on_create(&self) -> Result<()> {
        self.manager.bridge().register_once()
    }

    /// Signs the user in and obtains delegated authorization.
    ///
    /// `scopes: None` requests the default profile+email set; an
    /// explicit empty slice requests no scopes. `force_refresh_code`
    /// defaults to `false` when absent.
    ///
    /// Resolves when the whole flow finishes -- immediately for silent
    /// grants, or after the user acts on the external approval UI.
    pub async fn sign_in_async(
        &self,
        provider_client_id: &str,
        scopes: Option<&[String]>,
        force_refresh_code: Option<bool>,
    ) -> Result<SignInResult> {
        let handle = self
            .manager
            .start(
                provider_client_id,
                scopes,
                force_refresh_code.unwrap_or(false),
            )
            .await?;
        handle.await_result().await
    }

    /// Signs in using a validated [`SignInConfig`].
    pub async fn sign_in_with_config(&self, config: &SignInConfig) -> Result<SignInResult> {
        config.validate()?;
        self.sign_in_async(
            &config.provider_client_id,
            config.scopes.as_deref(),
            Some(config.force_refresh_code),
        )
        .await
    }

    /// Lifecycle hook: tears down any live session and unregisters the
    /// presentation bridge.
    pub fn on_destroy(&self) {
        self.manager.teardown();
    }

    /// The underlying session lifecycle manager.
    pub fn manager(&self) -> &SessionLifecycleManager {
        &self.manager
    }
}
