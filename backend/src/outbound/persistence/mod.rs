//! PostgreSQL persistence adapters using Diesel ORM.
//!
//! Concrete implementations of the domain repository ports backed by
//! PostgreSQL via `diesel-async` with `bb8` connection pooling.
//!
//! The adapters stay thin: they translate between Diesel row structs
//! (`models.rs`) and domain types, and map driver errors into
//! [`crate::domain::ports::PersistenceError`] variants. Row structs and
//! schema definitions never leak out of this module.

pub(crate) mod diesel_helpers;

mod diesel_company_repository;
mod diesel_guide_repository;
mod diesel_login_service;
mod diesel_product_repository;
mod diesel_tasting_repository;
mod diesel_user_repository;
mod diesel_verification_code_repository;
mod models;
mod pool;
mod schema;

pub use diesel_company_repository::DieselCompanyRepository;
pub use diesel_guide_repository::DieselGuideRepository;
pub use diesel_login_service::DieselLoginService;
pub use diesel_product_repository::DieselProductRepository;
pub use diesel_tasting_repository::DieselTastingRepository;
pub use diesel_user_repository::DieselUserRepository;
pub use diesel_verification_code_repository::DieselVerificationCodeRepository;
pub use pool::{DbPool, PoolConfig, PoolError};
