//! Remote collaborators of the PlanPal client.
//!
//! Everything that talks to another machine lives here:
//!
//! - [`AgentApi`] / [`HttpAgentClient`] - the chat agent (`POST /agent`)
//! - [`AuthExchange`] / [`HttpAuthExchange`] - the code exchange (`POST /auth/google`)
//! - [`Authorizer`] / [`LoopbackAuthorizer`] - Google's authorization-code consent flow
//! - [`Login`] - consent plus exchange, resolved into one [`LoginError`]-or-payload result
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────┐   code   ┌───────────────────┐  {code}   ┌──────────────┐
//! │ Google consent   │ ───────▶ │ LoopbackAuthorizer│ ────────▶ │ /auth/google │
//! └──────────────────┘          └───────────────────┘           └──────┬───────┘
//!                                                                      │ {token, user}
//!                                                                      ▼
//!                                ┌───────────────────┐  Bearer   ┌──────────────┐
//!                                │  HttpAgentClient  │ ────────▶ │    /agent    │
//!                                └───────────────────┘           └──────────────┘
//! ```

pub mod agent;
pub mod error;
pub mod exchange;
pub mod login;
pub mod oauth;

use std::future::Future;
use std::pin::Pin;

pub use agent::{AgentApi, AgentReply, HttpAgentClient};
pub use error::{BackendError, BackendErrorCode, BackendResult};
pub use exchange::{AuthExchange, HttpAuthExchange};
pub use login::{Login, LoginError};
pub use oauth::{AuthRequest, Authorizer, LoopbackAuthorizer, CALENDAR_SCOPE};

/// A boxed future for async trait methods.
///
/// Boxing keeps the collaborator traits object-safe, so the client can hold
/// them as `Box<dyn AgentApi>` and tests can swap in fakes.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;
