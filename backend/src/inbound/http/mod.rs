//! HTTP inbound adapter exposing the REST API.

pub mod auth;
pub mod companies;
pub mod error;
pub mod guides;
pub mod health;
pub mod products;
pub mod query;
pub mod session;
pub mod state;
pub mod tastings;
#[cfg(test)]
pub mod test_utils;
pub mod users;
pub mod validation;
pub mod verification;

pub use error::ApiResult;
