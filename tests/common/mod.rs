//! Shared fakes and helpers for integration tests
//!
//! These implement the public collaborator traits in-process so the
//! full module surface can be driven without any real identity
//! platform: responses are scripted ahead of time and presentation
//! outcomes are delivered by hand.

use std::collections::VecDeque;
use std::fmt;
use std::sync::{Arc, Mutex, Once};

use signflow::error::{Result, SignFlowError};
use signflow::signin::providers::{
    AuthorizationProvider, AuthorizationRequest, AuthorizationResponse, CredentialProvider,
    CredentialRequest, CredentialResponse, PresentationCallback, PresentationHost,
    PresentationSubscription,
};
use signflow::signin::types::{PresentationHandle, PresentationOutcome, ID_TOKEN_CREDENTIAL_TYPE};

static TRACING: Once = Once::new();

/// Initializes tracing output once per test binary.
///
/// Controlled through `RUST_LOG`, e.g. `RUST_LOG=signflow=debug`.
#[allow(dead_code)]
pub fn init_tracing() {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

// ---------------------------------------------------------------------------
// Scripted credential provider
// ---------------------------------------------------------------------------

/// Scripted [`CredentialProvider`] recording every request.
#[derive(Debug, Default)]
pub struct ScriptedCredentials {
    responses: Mutex<VecDeque<Result<CredentialResponse>>>,
    requests: Mutex<Vec<CredentialRequest>>,
}

impl ScriptedCredentials {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Queues a success response carrying the given profile payload.
    #[allow(dead_code)]
    pub fn push_payload(&self, payload: serde_json::Value) {
        self.responses
            .lock()
            .unwrap()
            .push_back(Ok(CredentialResponse {
                credential_type: ID_TOKEN_CREDENTIAL_TYPE.to_string(),
                payload,
            }));
    }

    /// Queues a typed failure.
    #[allow(dead_code)]
    pub fn push_failure(&self, error: SignFlowError) {
        self.responses.lock().unwrap().push_back(Err(error.into()));
    }

    /// Requests received so far, in order.
    #[allow(dead_code)]
    pub fn requests(&self) -> Vec<CredentialRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl CredentialProvider for ScriptedCredentials {
    async fn get_credential(&self, request: CredentialRequest) -> Result<CredentialResponse> {
        self.requests.lock().unwrap().push(request);
        self.responses.lock().unwrap().pop_front().unwrap_or_else(|| {
            Err(SignFlowError::NoCredentialAvailable("no scripted response".to_string()).into())
        })
    }
}

// ---------------------------------------------------------------------------
// Scripted authorization provider
// ---------------------------------------------------------------------------

/// Scripted [`AuthorizationProvider`] recording every request.
#[derive(Debug, Default)]
pub struct ScriptedAuthorization {
    responses: Mutex<VecDeque<Result<AuthorizationResponse>>>,
    requests: Mutex<Vec<AuthorizationRequest>>,
}

impl ScriptedAuthorization {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Queues a silent grant, optionally carrying a server auth code.
    #[allow(dead_code)]
    pub fn push_silent_grant(&self, server_auth_code: Option<&str>) {
        self.responses
            .lock()
            .unwrap()
            .push_back(Ok(AuthorizationResponse {
                pending_presentation: None,
                server_auth_code: server_auth_code.map(str::to_string),
            }));
    }

    /// Queues a grant that needs the given approval presentation.
    #[allow(dead_code)]
    pub fn push_pending_presentation(&self, handle: PresentationHandle) {
        self.responses
            .lock()
            .unwrap()
            .push_back(Ok(AuthorizationResponse {
                pending_presentation: Some(handle),
                server_auth_code: None,
            }));
    }

    /// Requests received so far, in order.
    #[allow(dead_code)]
    pub fn requests(&self) -> Vec<AuthorizationRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl AuthorizationProvider for ScriptedAuthorization {
    async fn authorize(&self, request: AuthorizationRequest) -> Result<AuthorizationResponse> {
        self.requests.lock().unwrap().push(request);
        self.responses.lock().unwrap().pop_front().unwrap_or_else(|| {
            Err(SignFlowError::Unknown("no scripted response".to_string()).into())
        })
    }
}

// ---------------------------------------------------------------------------
// Manual presentation host
// ---------------------------------------------------------------------------

#[derive(Default)]
struct HostState {
    callback: Mutex<Option<PresentationCallback>>,
    launched: Mutex<Vec<PresentationHandle>>,
}

/// Presentation host whose outcomes are delivered by the test.
#[derive(Default)]
pub struct ManualPresentationHost {
    state: Arc<HostState>,
}

impl ManualPresentationHost {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Handles launched so far, in order.
    #[allow(dead_code)]
    pub fn launched(&self) -> Vec<PresentationHandle> {
        self.state.launched.lock().unwrap().clone()
    }

    /// The registered callback, cloned so it can outlive teardown.
    #[allow(dead_code)]
    pub fn callback(&self) -> Option<PresentationCallback> {
        self.state.callback.lock().unwrap().clone()
    }

    /// Invokes the registered callback with the given outcome.
    #[allow(dead_code)]
    pub fn deliver(&self, outcome: PresentationOutcome) {
        let callback = self
            .callback()
            .expect("deliver() requires a registered callback");
        callback(outcome);
    }
}

impl fmt::Debug for ManualPresentationHost {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ManualPresentationHost")
            .field("registered", &self.callback().is_some())
            .finish()
    }
}

impl PresentationHost for ManualPresentationHost {
    fn register(&self, callback: PresentationCallback) -> Result<Box<dyn PresentationSubscription>> {
        *self.state.callback.lock().unwrap() = Some(callback);
        Ok(Box::new(ManualSubscription {
            state: Arc::clone(&self.state),
        }))
    }
}

struct ManualSubscription {
    state: Arc<HostState>,
}

impl fmt::Debug for ManualSubscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ManualSubscription").finish()
    }
}

impl PresentationSubscription for ManualSubscription {
    fn launch(&self, handle: &PresentationHandle) -> Result<()> {
        self.state.launched.lock().unwrap().push(handle.clone());
        Ok(())
    }

    fn unregister(&self) {
        *self.state.callback.lock().unwrap() = None;
    }
}
