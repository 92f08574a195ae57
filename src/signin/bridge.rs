//! Bridge between the OS presentation mechanism and pending completions
//!
//! The [`ExternalResultBridge`] owns the single callback registration
//! with the [`PresentationHost`] and translates eventual
//! [`PresentationOutcome`]s into resolutions of the current session's
//! completion handle.
//!
//! Pending completions live in an explicit table keyed by the opaque
//! presentation-handle id, so staleness is an explicit lookup: an
//! outcome whose id misses the table (duplicate delivery, or a session
//! torn down while awaiting approval) is discarded silently.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use tokio::sync::oneshot;
use uuid::Uuid;

use crate::error::{Result, SignFlowError};
use crate::signin::lock;
use crate::signin::providers::{PresentationCallback, PresentationHost, PresentationSubscription};
use crate::signin::session::{SessionSlot, SessionState};
use crate::signin::types::{CredentialResult, OutcomeCode, PresentationHandle, PresentationOutcome, SignInResult};

// ---------------------------------------------------------------------------
// Pending-completion table
// ---------------------------------------------------------------------------

/// One sign-in attempt parked while awaiting external approval.
pub(crate) struct PendingSignIn {
    /// One-shot sender for the eventual result. Consumed on send, which
    /// makes exactly-once fulfilment structural.
    pub completion: oneshot::Sender<Result<SignInResult>>,

    /// The credential retrieved in phase one, combined with the
    /// approval payload when the outcome arrives.
    pub credential: CredentialResult,
}

/// Table of pending completions keyed by presentation-handle id.
pub(crate) type PendingTable = Arc<Mutex<HashMap<Uuid, PendingSignIn>>>;

// ---------------------------------------------------------------------------
// ExternalResultBridge
// ---------------------------------------------------------------------------

/// Owns the single presentation-host subscription and resolves pending
/// completion handles when outcomes arrive.
///
/// Registration is process-wide state: at most one active subscription
/// exists per bridge. [`register_once`](Self::register_once) is
/// idempotent; re-registration is only valid after
/// [`unregister`](Self::unregister). The subscription survives
/// individual outcomes and is reused across sign-in attempts.
pub struct ExternalResultBridge {
    host: Arc<dyn PresentationHost>,
    subscription: Mutex<Option<Box<dyn PresentationSubscription>>>,
    pending: PendingTable,
    session: SessionSlot,
}

impl ExternalResultBridge {
    /// Creates a bridge sharing the session slot and pending table with
    /// the session lifecycle manager.
    pub(crate) fn new(host: Arc<dyn PresentationHost>, pending: PendingTable, session: SessionSlot) -> Self {
        Self {
            host,
            subscription: Mutex::new(None),
            pending,
            session,
        }
    }

    /// Registers the outcome callback with the presentation host.
    ///
    /// Idempotent: calling when already registered is a no-op. Must
    /// succeed before any [`present`](Self::present) call can.
    ///
    /// # Errors
    ///
    /// Propagates the host's registration failure, typically
    /// [`SignFlowError::NoHostSurface`] when no UI surface is available.
    pub fn register_once(&self) -> Result<()> {
        let mut subscription = lock(&self.subscription);
        if subscription.is_some() {
            tracing::debug!("presentation callback already registered; ignoring");
            return Ok(());
        }

        let pending = Arc::clone(&self.pending);
        let session = Arc::clone(&self.session);
        let callback: PresentationCallback = Arc::new(move |outcome| {
            Self::handle_outcome(&pending, &session, outcome);
        });

        *subscription = Some(self.host.register(callback)?);
        tracing::debug!("registered presentation result callback");
        Ok(())
    }

    /// Returns whether an active subscription exists.
    pub fn is_registered(&self) -> bool {
        lock(&self.subscription).is_some()
    }

    /// Hands an approval request to the presentation host for display.
    ///
    /// # Errors
    ///
    /// - [`SignFlowError::NoPresentationChannel`] when
    ///   [`register_once`](Self::register_once) never succeeded (or the
    ///   subscription was torn down).
    /// - [`SignFlowError::PresentationLaunchFailed`] when the handoff
    ///   itself fails.
    pub fn present(&self, handle: &PresentationHandle) -> Result<()> {
        let subscription = lock(&self.subscription);
        let subscription = subscription
            .as_ref()
            .ok_or(SignFlowError::NoPresentationChannel)?;

        subscription
            .launch(handle)
            .map_err(|e| SignFlowError::PresentationLaunchFailed(e.to_string()))?;

        tracing::debug!(handle_id = %handle.id, "handed approval request to presentation host");
        Ok(())
    }

    /// Tears down the subscription.
    ///
    /// Subsequent [`present`](Self::present) calls fail until
    /// [`register_once`](Self::register_once) runs again.
    pub fn unregister(&self) {
        if let Some(subscription) = lock(&self.subscription).take() {
            subscription.unregister();
            tracing::debug!("unregistered presentation result callback");
        }
    }

    /// Translates one presentation outcome into a completion resolution.
    ///
    /// Invoked from the host's callback, possibly long after the session
    /// started and possibly more than once for the same handle. A miss
    /// on the pending table means the outcome is stale (duplicate
    /// delivery, or teardown already abandoned the session) and is
    /// discarded without error.
    fn handle_outcome(pending: &PendingTable, session: &SessionSlot, outcome: PresentationOutcome) {
        let entry = lock(pending).remove(&outcome.handle_id);
        let Some(PendingSignIn { completion, credential }) = entry else {
            tracing::debug!(handle_id = %outcome.handle_id, "discarding stale presentation outcome");
            return;
        };

        let resolution: Result<SignInResult> = match (outcome.code, outcome.payload) {
            (OutcomeCode::Ok, Some(payload)) => Ok(SignInResult::combine(&credential, &payload)),
            (OutcomeCode::Ok, None) => {
                tracing::warn!(handle_id = %outcome.handle_id, "approval presentation returned no payload");
                Err(SignFlowError::NoDataReturned.into())
            }
            (OutcomeCode::NotOk, _) => {
                tracing::debug!(handle_id = %outcome.handle_id, "approval presentation cancelled or failed");
                Err(SignFlowError::Cancelled(
                    "approval presentation reported a non-ok outcome".to_string(),
                )
                .into())
            }
        };

        // Clear the session slot, but only if it still belongs to this
        // handle; a newer session must not be clobbered.
        {
            let mut slot = lock(session);
            let owns_slot = slot
                .as_ref()
                .and_then(|s| s.presentation.as_ref())
                .map(|p| p.id == outcome.handle_id)
                .unwrap_or(false);
            if owns_slot {
                if let Some(s) = slot.as_mut() {
                    s.state = SessionState::Completed;
                }
                *slot = None;
            }
        }

        if completion.send(resolution).is_err() {
            tracing::debug!("sign-in caller dropped its handle before the outcome arrived");
        }
    }
}
