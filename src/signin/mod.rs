//! Sign-in orchestration core
//!
//! This module owns the two-phase sign-in flow. Phase one is an awaited
//! credential retrieval against a [`providers::CredentialProvider`].
//! Phase two submits a delegated authorization request to a
//! [`providers::AuthorizationProvider`]; the request either resolves
//! silently or hands back an opaque presentation handle that must be
//! shown to the user through an OS-level [`providers::PresentationHost`],
//! whose outcome arrives later through a registered callback.
//!
//! Components, leaf-first:
//!
//! - [`retriever::CredentialRetriever`] -- one awaited call to the
//!   identity collaborator, normalized into a
//!   [`types::CredentialResult`].
//! - [`coordinator::AuthorizationCoordinator`] -- requests scoped
//!   authorization and branches into "already satisfied" vs "needs
//!   external approval".
//! - [`bridge::ExternalResultBridge`] -- owns the single callback
//!   registration with the presentation host and resolves pending
//!   completion handles when outcomes arrive.
//! - [`session::SessionLifecycleManager`] -- owns the single in-flight
//!   session, enforces single-flight, and wires the above together.
//!
//! # Canonical Import Path
//!
//! ```no_run
//! use signflow::signin::session::SessionLifecycleManager;
//! ```

pub mod bridge;
pub mod coordinator;
pub mod providers;
pub mod retriever;
pub mod session;
pub mod types;

#[cfg(test)]
pub(crate) mod fake;

pub use coordinator::{AuthorizationCoordinator, AuthorizationOutcome};
pub use retriever::CredentialRetriever;
pub use session::{SessionLifecycleManager, SessionState, SignInHandle};
pub use types::{CredentialResult, PresentationHandle, PresentationOutcome, SignInResult};

/// Locks a mutex, recovering the guard if a previous holder panicked.
///
/// Session state is plain data; a poisoned lock carries no invariant
/// worth aborting over.
pub(crate) fn lock<T>(mutex: &std::sync::Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
}
