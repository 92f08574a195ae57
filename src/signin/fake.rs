//! In-process fake collaborators for unit tests
//!
//! These fakes replace the identity platform in tests: scripted
//! responses are queued ahead of time, every request is recorded for
//! later assertions, and presentation outcomes are delivered by hand
//! through [`FakePresentationHost::deliver`].
//!
//! # Usage
//!
//! ```text
//! provider.push_payload(json!({...}))  -- queue the next response
//! provider.requests()                  -- inspect what the code sent
//! host.deliver(outcome)                -- invoke the registered callback
//! ```

use std::collections::VecDeque;
use std::fmt;
use std::sync::{Arc, Mutex};

use crate::error::{Result, SignFlowError};
use crate::signin::providers::{
    AuthorizationProvider, AuthorizationRequest, AuthorizationResponse, CredentialProvider,
    CredentialRequest, CredentialResponse, PresentationCallback, PresentationHost,
    PresentationSubscription,
};
use crate::signin::types::{PresentationHandle, PresentationOutcome, ID_TOKEN_CREDENTIAL_TYPE};

// ---------------------------------------------------------------------------
// FakeCredentialProvider
// ---------------------------------------------------------------------------

/// Scripted [`CredentialProvider`] recording every request.
#[derive(Debug, Default)]
pub struct FakeCredentialProvider {
    responses: Mutex<VecDeque<Result<CredentialResponse>>>,
    requests: Mutex<Vec<CredentialRequest>>,
}

impl FakeCredentialProvider {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Queues a success response with the standard id-token type tag.
    pub fn push_payload(&self, payload: serde_json::Value) {
        self.push_typed_payload(ID_TOKEN_CREDENTIAL_TYPE, payload);
    }

    /// Queues a success response with an arbitrary type tag.
    pub fn push_typed_payload(&self, credential_type: &str, payload: serde_json::Value) {
        self.responses
            .lock()
            .unwrap()
            .push_back(Ok(CredentialResponse {
                credential_type: credential_type.to_string(),
                payload,
            }));
    }

    /// Queues a typed failure.
    pub fn push_failure(&self, error: SignFlowError) {
        self.responses.lock().unwrap().push_back(Err(error.into()));
    }

    /// Queues a failure that carries no [`SignFlowError`] kind.
    pub fn push_untyped_failure(&self, message: &str) {
        self.responses
            .lock()
            .unwrap()
            .push_back(Err(anyhow::anyhow!("{message}")));
    }

    /// Requests received so far, in order.
    pub fn requests(&self) -> Vec<CredentialRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl CredentialProvider for FakeCredentialProvider {
    async fn get_credential(&self, request: CredentialRequest) -> Result<CredentialResponse> {
        self.requests.lock().unwrap().push(request);
        self.responses.lock().unwrap().pop_front().unwrap_or_else(|| {
            Err(SignFlowError::NoCredentialAvailable("fake has no scripted response".to_string()).into())
        })
    }
}

// ---------------------------------------------------------------------------
// FakeAuthorizationProvider
// ---------------------------------------------------------------------------

/// Scripted [`AuthorizationProvider`] recording every request.
#[derive(Debug, Default)]
pub struct FakeAuthorizationProvider {
    responses: Mutex<VecDeque<Result<AuthorizationResponse>>>,
    requests: Mutex<Vec<AuthorizationRequest>>,
}

impl FakeAuthorizationProvider {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Queues a silent grant, optionally carrying a server auth code.
    pub fn push_silent_grant(&self, server_auth_code: Option<String>) {
        self.push_response(Ok(AuthorizationResponse {
            pending_presentation: None,
            server_auth_code,
        }));
    }

    /// Queues a grant that needs the given approval presentation.
    pub fn push_pending_presentation(&self, handle: PresentationHandle) {
        self.push_response(Ok(AuthorizationResponse {
            pending_presentation: Some(handle),
            server_auth_code: None,
        }));
    }

    /// Queues a raw response or failure.
    pub fn push_response(&self, response: Result<AuthorizationResponse>) {
        self.responses.lock().unwrap().push_back(response);
    }

    /// Requests received so far, in order.
    pub fn requests(&self) -> Vec<AuthorizationRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl AuthorizationProvider for FakeAuthorizationProvider {
    async fn authorize(&self, request: AuthorizationRequest) -> Result<AuthorizationResponse> {
        self.requests.lock().unwrap().push(request);
        self.responses.lock().unwrap().pop_front().unwrap_or_else(|| {
            Err(SignFlowError::Unknown("fake has no scripted response".to_string()).into())
        })
    }
}

// ---------------------------------------------------------------------------
// FakePresentationHost
// ---------------------------------------------------------------------------

#[derive(Default)]
struct HostInner {
    callback: Mutex<Option<PresentationCallback>>,
    launched: Mutex<Vec<PresentationHandle>>,
    registrations: Mutex<usize>,
    launch_failure: Mutex<Option<String>>,
    has_surface: bool,
}

/// Scripted [`PresentationHost`] whose outcomes are delivered by hand.
pub struct FakePresentationHost {
    inner: Arc<HostInner>,
}

impl FakePresentationHost {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            inner: Arc::new(HostInner {
                has_surface: true,
                ..Default::default()
            }),
        })
    }

    /// A host with no UI surface; registration fails.
    pub fn without_surface() -> Arc<Self> {
        Arc::new(Self {
            inner: Arc::new(HostInner::default()),
        })
    }

    /// Makes the next `launch` call fail with the given message.
    pub fn fail_next_launch(&self, message: &str) {
        *self.inner.launch_failure.lock().unwrap() = Some(message.to_string());
    }

    /// Handles launched so far, in order.
    pub fn launched(&self) -> Vec<PresentationHandle> {
        self.inner.launched.lock().unwrap().clone()
    }

    /// How many times `register` succeeded.
    pub fn registration_count(&self) -> usize {
        *self.inner.registrations.lock().unwrap()
    }

    /// The currently registered callback, if any.
    ///
    /// Tests clone this before teardown to simulate an OS dispatch
    /// already in flight when the registration is torn down.
    pub fn callback(&self) -> Option<PresentationCallback> {
        self.inner.callback.lock().unwrap().clone()
    }

    /// Invokes the registered callback with the given outcome.
    pub fn deliver(&self, outcome: PresentationOutcome) {
        let callback = self
            .callback()
            .expect("deliver() requires a registered callback");
        callback(outcome);
    }
}

impl fmt::Debug for FakePresentationHost {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FakePresentationHost")
            .field("registered", &self.callback().is_some())
            .field("has_surface", &self.inner.has_surface)
            .finish()
    }
}

impl PresentationHost for FakePresentationHost {
    fn register(&self, callback: PresentationCallback) -> Result<Box<dyn PresentationSubscription>> {
        if !self.inner.has_surface {
            return Err(SignFlowError::NoHostSurface.into());
        }
        *self.inner.callback.lock().unwrap() = Some(callback);
        *self.inner.registrations.lock().unwrap() += 1;
        Ok(Box::new(FakeSubscription {
            inner: Arc::clone(&self.inner),
        }))
    }
}

struct FakeSubscription {
    inner: Arc<HostInner>,
}

impl fmt::Debug for FakeSubscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FakeSubscription").finish()
    }
}

impl PresentationSubscription for FakeSubscription {
    fn launch(&self, handle: &PresentationHandle) -> Result<()> {
        if let Some(message) = self.inner.launch_failure.lock().unwrap().take() {
            return Err(SignFlowError::Unknown(message).into());
        }
        self.inner.launched.lock().unwrap().push(handle.clone());
        Ok(())
    }

    fn unregister(&self) {
        *self.inner.callback.lock().unwrap() = None;
    }
}
