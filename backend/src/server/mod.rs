//! Server construction and middleware wiring.

mod config;
mod state_builders;

pub use config::ServerConfig;

use state_builders::build_http_state;

use actix_session::{
    SessionMiddleware,
    config::{CookieContentSecurity, PersistentSession},
    storage::CookieSessionStore,
};
use actix_web::cookie::{Key, SameSite};
use actix_web::dev::{Server, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, HttpServer, web};

use backend::Trace;
#[cfg(debug_assertions)]
use backend::doc::ApiDoc;
use backend::inbound::http::auth::{login, logout};
use backend::inbound::http::companies::{
    archive_company, create_company, get_company, list_companies, update_company,
    upload_company_logo,
};
use backend::inbound::http::guides::{delete_guide, get_guide, put_guide};
use backend::inbound::http::health::{HealthState, live, ready};
use backend::inbound::http::products::{
    archive_product, create_product, get_product, list_products, update_product,
    upload_product_image,
};
use backend::inbound::http::state::HttpState;
use backend::inbound::http::tastings::{
    cancel_tasting, create_tasting, get_tasting, list_tastings, transition_tasting, update_tasting,
};
use backend::inbound::http::users::{archive_user, create_user, get_user, list_users, update_user};
use backend::inbound::http::verification::{confirm_verification, request_verification};
#[cfg(debug_assertions)]
use utoipa::OpenApi;
#[cfg(debug_assertions)]
use utoipa_swagger_ui::SwaggerUi;

#[derive(Clone)]
struct AppDependencies {
    health_state: web::Data<HealthState>,
    http_state: web::Data<HttpState>,
    key: Key,
    cookie_secure: bool,
    same_site: SameSite,
}

fn build_app(
    deps: AppDependencies,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let AppDependencies {
        health_state,
        http_state,
        key,
        cookie_secure,
        same_site,
    } = deps;

    let session = SessionMiddleware::builder(CookieSessionStore::default(), key)
        .cookie_name("session".into())
        .cookie_path("/".into())
        .cookie_secure(cookie_secure)
        .cookie_http_only(true)
        .cookie_content_security(CookieContentSecurity::Private)
        .cookie_same_site(same_site)
        .session_lifecycle(
            PersistentSession::default().session_ttl(actix_web::cookie::time::Duration::hours(2)),
        )
        .build();

    let api = web::scope("/api/v1")
        .wrap(session)
        .service(login)
        .service(logout)
        .service(create_user)
        .service(list_users)
        .service(get_user)
        .service(update_user)
        .service(archive_user)
        .service(create_company)
        .service(list_companies)
        .service(get_company)
        .service(update_company)
        .service(archive_company)
        .service(upload_company_logo)
        .service(create_product)
        .service(list_products)
        .service(get_product)
        .service(update_product)
        .service(archive_product)
        .service(upload_product_image)
        .service(create_tasting)
        .service(list_tastings)
        .service(get_tasting)
        .service(update_tasting)
        .service(cancel_tasting)
        .service(transition_tasting)
        .service(get_guide)
        .service(put_guide)
        .service(delete_guide)
        .service(request_verification)
        .service(confirm_verification);

    let app = App::new()
        .app_data(health_state)
        .app_data(http_state)
        .wrap(Trace)
        .service(api)
        .service(ready)
        .service(live);

    #[cfg(debug_assertions)]
    let app = app.service(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()));
    #[cfg(not(debug_assertions))]
    let app = app;

    app
}

/// Construct an Actix HTTP server from the provided configuration.
///
/// # Errors
/// Propagates [`std::io::Error`] when binding the socket fails.
pub fn create_server(
    health_state: web::Data<HealthState>,
    config: ServerConfig,
) -> std::io::Result<Server> {
    let http_state = build_http_state(&config);
    let ServerConfig {
        key,
        cookie_secure,
        same_site,
        bind_addr,
        db_pool: _,
        objects: _,
    } = config;

    let server_health_state = health_state.clone();
    let server = HttpServer::new(move || {
        build_app(AppDependencies {
            health_state: server_health_state.clone(),
            http_state: http_state.clone(),
            key: key.clone(),
            cookie_secure,
            same_site,
        })
    })
    .bind(bind_addr)?
    .run();

    health_state.mark_ready();
    Ok(server)
}
