//! Session lifecycle and the single-flight sign-in state machine
//!
//! The [`SessionLifecycleManager`] is the root of the orchestration
//! core. It owns the single in-flight [`AuthSession`], enforces the
//! single-flight guarantee, wires the retriever, coordinator, and
//! bridge together, and owns the exactly-once resolution of the
//! completion handle.
//!
//! # Flow overview
//!
//! 1. `start()` claims the session slot or fails fast with
//!    [`SignFlowError::SessionAlreadyInFlight`].
//! 2. Phase one: the credential retriever runs; a failure resolves the
//!    completion handle and destroys the session.
//! 3. Phase two: the authorization coordinator runs. An
//!    `AlreadyAuthorized` grant resolves the handle immediately; a
//!    `NeedsApproval` grant parks the completion in the pending table,
//!    launches the presentation, and returns with the handle
//!    unfulfilled.
//! 4. The bridge callback resolves parked completions when the external
//!    outcome arrives -- possibly minutes later.
//!
//! # Concurrency
//!
//! All shared mutable state (the session slot and the pending table)
//! sits behind short-lived `std::sync::Mutex` critical sections that
//! are never held across an await. The host's outcome callback locks
//! the same mutexes, so no two transitions ever run concurrently on one
//! session.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use tokio::sync::oneshot;
use uuid::Uuid;

use crate::error::{Result, SignFlowError};
use crate::signin::bridge::{ExternalResultBridge, PendingSignIn, PendingTable};
use crate::signin::coordinator::{AuthorizationCoordinator, AuthorizationOutcome};
use crate::signin::lock;
use crate::signin::providers::{AuthorizationProvider, CredentialProvider, PresentationHost};
use crate::signin::retriever::CredentialRetriever;
use crate::signin::types::{CredentialResult, PresentationHandle, SignInResult};

// ---------------------------------------------------------------------------
// AuthSession
// ---------------------------------------------------------------------------

/// State of the in-flight sign-in session.
///
/// "Idle" has no variant: it is represented by the session slot being
/// empty, which also covers the destroyed state after completion or
/// teardown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Phase one: awaiting the credential provider round trip.
    RetrievingCredential,
    /// Phase two: awaiting the authorization provider round trip.
    Authorizing,
    /// Parked: awaiting the external approval outcome.
    AwaitingExternalApproval,
    /// Terminal; the slot is cleared immediately after entering it.
    Completed,
}

/// The unit of work: one sign-in attempt, at most one live at a time.
#[derive(Debug)]
pub struct AuthSession {
    /// Identifier used to detect stale transitions: a step that outlived
    /// its session (teardown happened in between) must not touch the
    /// slot a newer session may occupy.
    pub(crate) id: Uuid,
    pub(crate) state: SessionState,
    /// Set once after a successful retrieval; immutable thereafter.
    pub(crate) credential: Option<CredentialResult>,
    /// Set when entering [`SessionState::AwaitingExternalApproval`].
    pub(crate) presentation: Option<PresentationHandle>,
}

impl AuthSession {
    pub(crate) fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            state: SessionState::RetrievingCredential,
            credential: None,
            presentation: None,
        }
    }

    /// Current state of the session.
    pub fn state(&self) -> SessionState {
        self.state
    }
}

/// Shared slot holding the single in-flight session.
pub(crate) type SessionSlot = Arc<Mutex<Option<AuthSession>>>;

// ---------------------------------------------------------------------------
// SignInHandle
// ---------------------------------------------------------------------------

/// Completion handle for one sign-in attempt.
///
/// Wraps the receiving half of a one-shot channel; the orchestration
/// side fulfils the sending half exactly once. Await the result with
/// [`await_result`](Self::await_result) -- which may take minutes when
/// the flow is parked on user interaction.
#[derive(Debug)]
pub struct SignInHandle {
    receiver: oneshot::Receiver<Result<SignInResult>>,
}

impl SignInHandle {
    /// Waits for the sign-in attempt to resolve.
    ///
    /// # Errors
    ///
    /// Besides the failures the flow itself produces, a session
    /// abandoned by [`SessionLifecycleManager::teardown`] before the
    /// external outcome arrived surfaces as
    /// [`SignFlowError::Cancelled`].
    pub async fn await_result(self) -> Result<SignInResult> {
        match self.receiver.await {
            Ok(resolution) => resolution,
            Err(_) => {
                Err(SignFlowError::Cancelled("session torn down before completion".to_string()).into())
            }
        }
    }
}

// ---------------------------------------------------------------------------
// SessionLifecycleManager
// ---------------------------------------------------------------------------

/// Root coordinator for the two-phase sign-in flow.
///
/// # Thread safety
///
/// All methods take `&self`; the manager is `Send + Sync` and can be
/// shared across tasks behind an `Arc`. The single-flight guard, not
/// the type system, rejects overlapping attempts.
///
/// # Examples
///
/// ```no_run
/// use std::sync::Arc;
/// use signflow::signin::session::SessionLifecycleManager;
/// # use signflow::signin::providers::{CredentialProvider, AuthorizationProvider, PresentationHost};
///
/// # async fn example(
/// #     credentials: Arc<dyn CredentialProvider>,
/// #     authorization: Arc<dyn AuthorizationProvider>,
/// #     host: Arc<dyn PresentationHost>,
/// # ) -> signflow::Result<()> {
/// let manager = SessionLifecycleManager::new(credentials, authorization, host);
/// manager.bridge().register_once()?;
///
/// let handle = manager.start("client-123", None, false).await?;
/// let result = handle.await_result().await?;
/// println!("server auth code: {:?}", result.server_auth_code);
/// # Ok(())
/// # }
/// ```
pub struct SessionLifecycleManager {
    retriever: CredentialRetriever,
    coordinator: AuthorizationCoordinator,
    bridge: ExternalResultBridge,
    session: SessionSlot,
    pending: PendingTable,
}

impl SessionLifecycleManager {
    /// Wires a manager over the three external collaborators.
    pub fn new(
        credential_provider: Arc<dyn CredentialProvider>,
        authorization_provider: Arc<dyn AuthorizationProvider>,
        presentation_host: Arc<dyn PresentationHost>,
    ) -> Self {
        let session: SessionSlot = Arc::new(Mutex::new(None));
        let pending: PendingTable = Arc::new(Mutex::new(HashMap::new()));
        let bridge = ExternalResultBridge::new(
            presentation_host,
            Arc::clone(&pending),
            Arc::clone(&session),
        );

        Self {
            retriever: CredentialRetriever::new(credential_provider),
            coordinator: AuthorizationCoordinator::new(authorization_provider),
            bridge,
            session,
            pending,
        }
    }

    /// The bridge owning the presentation-host subscription.
    pub fn bridge(&self) -> &ExternalResultBridge {
        &self.bridge
    }

    /// State of the in-flight session, or `None` when idle.
    pub fn session_state(&self) -> Option<SessionState> {
        lock(&self.session).as_ref().map(AuthSession::state)
    }

    /// Starts one sign-in attempt and returns its completion handle.
    ///
    /// Runs credential retrieval, then authorization. A silent grant
    /// fulfils the handle before this method returns; a grant needing
    /// approval leaves the session parked and the handle unfulfilled
    /// until the external outcome arrives.
    ///
    /// Exactly one of success/failure reaches the handle per call;
    /// every failure mode after the session is created resolves the
    /// handle rather than the return value.
    ///
    /// # Errors
    ///
    /// Returned directly (the session is never created):
    ///
    /// - [`SignFlowError::Config`] when `provider_client_id` is empty.
    /// - [`SignFlowError::NoPresentationChannel`] when the bridge was
    ///   never registered -- sign-in cannot succeed without a way to
    ///   present an eventual approval.
    /// - [`SignFlowError::SessionAlreadyInFlight`] when a session is
    ///   live; the in-flight session is left untouched.
    pub async fn start(
        &self,
        provider_client_id: &str,
        scopes: Option<&[String]>,
        force_refresh_code: bool,
    ) -> Result<SignInHandle> {
        if provider_client_id.trim().is_empty() {
            return Err(SignFlowError::Config("provider_client_id must not be empty".to_string()).into());
        }
        if !self.bridge.is_registered() {
            return Err(SignFlowError::NoPresentationChannel.into());
        }

        // Single-flight: claim the slot atomically.
        let session_id = {
            let mut slot = lock(&self.session);
            if let Some(live) = slot.as_ref() {
                if live.state != SessionState::Completed {
                    tracing::warn!(
                        state = ?live.state,
                        "rejecting sign-in attempt; a session is already in flight"
                    );
                    return Err(SignFlowError::SessionAlreadyInFlight.into());
                }
            }
            let session = AuthSession::new();
            let id = session.id;
            *slot = Some(session);
            id
        };

        let (completion, receiver) = oneshot::channel();
        let handle = SignInHandle { receiver };

        tracing::info!(client_id = %provider_client_id, "starting sign-in session");

        // Phase one: credential retrieval.
        let credential = match self.retriever.retrieve(provider_client_id).await {
            Ok(credential) => credential,
            Err(e) => {
                tracing::warn!(error = %e, "credential retrieval failed");
                self.finish_with(session_id, completion, Err(e));
                return Ok(handle);
            }
        };

        self.with_session(session_id, |session| {
            session.credential = Some(credential.clone());
            session.state = SessionState::Authorizing;
        });

        // Phase two: delegated authorization.
        let outcome = match self
            .coordinator
            .authorize(provider_client_id, scopes, force_refresh_code)
            .await
        {
            Ok(outcome) => outcome,
            Err(e) => {
                tracing::warn!(error = %e, "authorization failed");
                self.finish_with(session_id, completion, Err(e));
                return Ok(handle);
            }
        };

        match outcome {
            AuthorizationOutcome::AlreadyAuthorized(server_auth_code) => {
                tracing::info!("authorization satisfied without presentation");
                let result = SignInResult::from_credential(&credential, server_auth_code);
                self.finish_with(session_id, completion, Ok(result));
            }
            AuthorizationOutcome::NeedsApproval(presentation) => {
                // Park the completion before launching so the outcome
                // callback can never race ahead of the insert.
                lock(&self.pending).insert(
                    presentation.id,
                    PendingSignIn {
                        completion,
                        credential: credential.clone(),
                    },
                );
                self.with_session(session_id, |session| {
                    session.presentation = Some(presentation.clone());
                    session.state = SessionState::AwaitingExternalApproval;
                });

                if let Err(e) = self.bridge.present(&presentation) {
                    tracing::warn!(error = %e, "failed to launch approval presentation");
                    if let Some(parked) = lock(&self.pending).remove(&presentation.id) {
                        self.finish_with(session_id, parked.completion, Err(e));
                    }
                } else {
                    tracing::info!(handle_id = %presentation.id, "awaiting external approval");
                }
            }
        }

        Ok(handle)
    }

    /// Forcibly clears any live session state.
    ///
    /// Drops every parked completion without fulfilling it (the
    /// abandoned caller observes a cancellation from the receiver
    /// side), empties the session slot, and unregisters the bridge.
    /// A late outcome callback for an abandoned session misses the
    /// pending table and is discarded.
    pub fn teardown(&self) {
        let abandoned = {
            let mut pending = lock(&self.pending);
            let count = pending.len();
            pending.clear();
            count
        };
        if abandoned > 0 {
            tracing::warn!(abandoned, "tearing down with sign-in attempts awaiting approval");
        }

        *lock(&self.session) = None;
        self.bridge.unregister();
        tracing::debug!("session lifecycle torn down");
    }

    // -----------------------------------------------------------------------
    // Private helpers
    // -----------------------------------------------------------------------

    /// Mutates the in-flight session, but only while the slot still
    /// belongs to `session_id`; a step that outlived its session (for
    /// example across a teardown) becomes a no-op.
    fn with_session(&self, session_id: Uuid, mutate: impl FnOnce(&mut AuthSession)) {
        let mut slot = lock(&self.session);
        if let Some(session) = slot.as_mut() {
            if session.id == session_id {
                mutate(session);
            }
        }
    }

    /// Resolves the completion handle and destroys the session.
    fn finish_with(
        &self,
        session_id: Uuid,
        completion: oneshot::Sender<Result<SignInResult>>,
        resolution: Result<SignInResult>,
    ) {
        {
            let mut slot = lock(&self.session);
            let owns_slot = slot.as_ref().map(|s| s.id == session_id).unwrap_or(false);
            if owns_slot {
                if let Some(session) = slot.as_mut() {
                    session.state = SessionState::Completed;
                }
                *slot = None;
            }
        }

        if completion.send(resolution).is_err() {
            tracing::debug!("caller dropped its sign-in handle before resolution");
        }
    }
}
