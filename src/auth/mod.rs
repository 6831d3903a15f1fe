//! Authentication module
//!
//! Provides the [`Session`] handle every listing request runs under, and the
//! [`SessionProvider`] that creates it from credentials.

mod provider;
mod types;

pub use provider::{authenticated_session, FormLoginProvider, SessionProvider};
pub use types::{default_user_agent, LoginConfig, Session};
