//! Shared HTTP adapter state.
//!
//! HTTP handlers accept this state via `actix_web::web::Data` so they only
//! depend on domain ports and remain testable without I/O.

use std::sync::Arc;

use crate::domain::ports::{
    CompanyRepository, GuideRepository, LoginService, ObjectStore, ProductRepository,
    TastingRepository, UserRepository,
};
use crate::domain::VerificationService;

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    /// Credential checking for `POST /login`.
    pub login: Arc<dyn LoginService>,
    /// User aggregate persistence.
    pub users: Arc<dyn UserRepository>,
    /// Company aggregate persistence.
    pub companies: Arc<dyn CompanyRepository>,
    /// Product aggregate persistence.
    pub products: Arc<dyn ProductRepository>,
    /// Tasting aggregate persistence.
    pub tastings: Arc<dyn TastingRepository>,
    /// Guide persistence, one per tasting.
    pub guides: Arc<dyn GuideRepository>,
    /// Verification code issue and confirmation flow.
    pub verification: VerificationService,
    /// Uploaded file storage for logos, product shots, and attachments.
    pub objects: Arc<dyn ObjectStore>,
}
