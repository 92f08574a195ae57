//! Signflow - two-phase interactive sign-in orchestration
//!
//! This library orchestrates a sign-in flow against pluggable identity
//! collaborators: an awaited credential retrieval, then a delegated
//! authorization request that either resolves silently or requires an
//! OS-mediated approval UI whose outcome arrives later through an
//! out-of-band callback. The crate owns the session state machine, the
//! single-flight guarantee, and the bridge between the external
//! presentation step and a deferred one-shot completion handle.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//!
//! - `signin`: The orchestration core -- collaborator traits, the
//!   credential retriever, the authorization coordinator, the external
//!   result bridge, and the session lifecycle manager
//! - `module`: The host-facing surface with `on_create` / `on_destroy`
//!   lifecycle hooks and the `sign_in_async` operation
//! - `config`: Configuration loading and validation
//! - `error`: Error types and result aliases
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use signflow::SignInModule;
//! # use signflow::signin::providers::{CredentialProvider, AuthorizationProvider, PresentationHost};
//!
//! # async fn example(
//! #     credentials: Arc<dyn CredentialProvider>,
//! #     authorization: Arc<dyn AuthorizationProvider>,
//! #     host: Arc<dyn PresentationHost>,
//! # ) -> signflow::Result<()> {
//! let module = SignInModule::new(credentials, authorization, host);
//! module.on_create()?;
//!
//! let result = module.sign_in_async("client-123", None, None).await?;
//! println!("signed in as {:?}", result.display_name);
//!
//! module.on_destroy();
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod module;
pub mod signin;

// Re-export commonly used types
pub use config::SignInConfig;
pub use error::{Result, SignFlowError};
pub use module::SignInModule;
pub use signin::session::{SessionLifecycleManager, SessionState, SignInHandle};
pub use signin::types::{CredentialResult, SignInResult};
