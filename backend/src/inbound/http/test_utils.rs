//! Test helpers for inbound HTTP components.

use std::sync::Arc;

use actix_session::{storage::CookieSessionStore, SessionMiddleware};
use actix_web::cookie::Key;

use crate::inbound::http::state::HttpState;
use crate::test_support::{
    InMemoryCompanies, InMemoryGuides, InMemoryLogin, InMemoryObjects, InMemoryProducts,
    InMemoryTastings, InMemoryUsers, InMemoryVerificationCodes,
};
use crate::domain::VerificationService;

/// Build a session middleware configured for tests.
///
/// - Generates a fresh signing/encryption key per invocation.
/// - Sets the cookie name to `session` and disables the `Secure` flag for
///   local HTTP tests.
pub fn test_session_middleware() -> SessionMiddleware<CookieSessionStore> {
    SessionMiddleware::builder(CookieSessionStore::default(), Key::generate())
        .cookie_name("session".to_owned())
        .cookie_secure(false)
        .build()
}

/// Build an [`HttpState`] backed entirely by in-memory fakes.
pub fn test_state() -> HttpState {
    let users = Arc::new(InMemoryUsers::default());
    HttpState {
        login: Arc::new(InMemoryLogin::new(users.clone())),
        users,
        companies: Arc::new(InMemoryCompanies::default()),
        products: Arc::new(InMemoryProducts::default()),
        tastings: Arc::new(InMemoryTastings::default()),
        guides: Arc::new(InMemoryGuides::default()),
        verification: VerificationService::new(Arc::new(InMemoryVerificationCodes::default())),
        objects: Arc::new(InMemoryObjects::default()),
    }
}
