//! Builders wiring database-backed adapters into the HTTP state.

use std::sync::Arc;

use actix_web::web;

use backend::domain::VerificationService;
use backend::inbound::http::state::HttpState;
use backend::outbound::persistence::{
    DieselCompanyRepository, DieselGuideRepository, DieselLoginService, DieselProductRepository,
    DieselTastingRepository, DieselUserRepository, DieselVerificationCodeRepository,
};

use super::ServerConfig;

/// Build the shared HTTP state from the configured pool and object store.
pub(super) fn build_http_state(config: &ServerConfig) -> web::Data<HttpState> {
    let pool = config.db_pool.clone();
    web::Data::new(HttpState {
        login: Arc::new(DieselLoginService::new(pool.clone())),
        users: Arc::new(DieselUserRepository::new(pool.clone())),
        companies: Arc::new(DieselCompanyRepository::new(pool.clone())),
        products: Arc::new(DieselProductRepository::new(pool.clone())),
        tastings: Arc::new(DieselTastingRepository::new(pool.clone())),
        guides: Arc::new(DieselGuideRepository::new(pool.clone())),
        verification: VerificationService::new(Arc::new(DieselVerificationCodeRepository::new(
            pool,
        ))),
        objects: Arc::new(config.objects.clone()),
    })
}
