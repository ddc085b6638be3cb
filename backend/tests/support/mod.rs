//! Shared fixtures for HTTP integration tests.
//!
//! Builds the API against the in-memory port implementations so tests
//! exercise real handlers, session middleware, and error mapping without
//! a database.

use std::sync::Arc;

use actix_http::Request;
use actix_session::SessionMiddleware;
use actix_session::storage::CookieSessionStore;
use actix_web::body::MessageBody;
use actix_web::cookie::{Cookie, Key};
use actix_web::dev::{Service, ServiceResponse};
use actix_web::http::StatusCode;
use actix_web::{test, web};
use chrono::Utc;

use backend::domain::ports::UserRepository;
use backend::domain::user::{DisplayName, Role};
use backend::domain::{EmailAddress, Password, PasswordHash, User, VerificationService};
use backend::inbound::http::state::HttpState;
use backend::inbound::http::{auth, companies, guides, products, tastings, users, verification};
use backend::test_support::{
    InMemoryCompanies, InMemoryGuides, InMemoryLogin, InMemoryObjects, InMemoryProducts,
    InMemoryTastings, InMemoryUsers, InMemoryVerificationCodes,
};

/// The HTTP state plus handles onto the fakes behind it.
pub struct TestBackend {
    pub state: HttpState,
    pub users: Arc<InMemoryUsers>,
    pub codes: Arc<InMemoryVerificationCodes>,
}

/// Build an [`HttpState`] backed entirely by in-memory ports.
pub fn test_backend() -> TestBackend {
    let users = Arc::new(InMemoryUsers::default());
    let codes = Arc::new(InMemoryVerificationCodes::default());
    let state = HttpState {
        login: Arc::new(InMemoryLogin::new(users.clone())),
        users: users.clone(),
        companies: Arc::new(InMemoryCompanies::default()),
        products: Arc::new(InMemoryProducts::default()),
        tastings: Arc::new(InMemoryTastings::default()),
        guides: Arc::new(InMemoryGuides::default()),
        verification: VerificationService::new(codes.clone()),
        objects: Arc::new(InMemoryObjects::default()),
    };
    TestBackend {
        state,
        users,
        codes,
    }
}

/// Cookie-backed session middleware with a throwaway key.
pub fn session_middleware() -> SessionMiddleware<CookieSessionStore> {
    SessionMiddleware::builder(CookieSessionStore::default(), Key::generate())
        .cookie_name("session".into())
        .cookie_secure(false)
        .build()
}

/// Register every API handler on the scope under construction.
pub fn routes(cfg: &mut web::ServiceConfig) {
    cfg.service(auth::login)
        .service(auth::logout)
        .service(users::create_user)
        .service(users::list_users)
        .service(users::get_user)
        .service(users::update_user)
        .service(users::archive_user)
        .service(companies::create_company)
        .service(companies::list_companies)
        .service(companies::get_company)
        .service(companies::update_company)
        .service(companies::archive_company)
        .service(companies::upload_company_logo)
        .service(products::create_product)
        .service(products::list_products)
        .service(products::get_product)
        .service(products::update_product)
        .service(products::archive_product)
        .service(products::upload_product_image)
        .service(tastings::create_tasting)
        .service(tastings::list_tastings)
        .service(tastings::get_tasting)
        .service(tastings::update_tasting)
        .service(tastings::cancel_tasting)
        .service(tastings::transition_tasting)
        .service(guides::get_guide)
        .service(guides::put_guide)
        .service(guides::delete_guide)
        .service(verification::request_verification)
        .service(verification::confirm_verification);
}

/// Seed a user with a known password straight into the repository.
pub async fn seed_user(users: &InMemoryUsers, email: &str, role: Role, password: &str) -> User {
    let user = User::create(
        EmailAddress::new(email).expect("valid email"),
        DisplayName::new("Test User").expect("valid name"),
        role,
        None,
        Utc::now(),
    );
    let hash = PasswordHash::derive(&Password::new(password).expect("valid password"));
    users.insert(&user, &hash).await.expect("seed user");
    user
}

/// Log in over HTTP and return the session cookie.
pub async fn obtain_session<S, B>(app: &S, email: &str, password: &str) -> Cookie<'static>
where
    S: Service<Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    let req = test::TestRequest::post()
        .uri("/api/v1/login")
        .set_json(serde_json::json!({ "email": email, "password": password }))
        .to_request();
    let res = test::call_service(app, req).await;
    assert_eq!(res.status(), StatusCode::OK, "login should succeed");
    res.response()
        .cookies()
        .find(|c| c.name() == "session")
        .expect("session cookie issued")
        .into_owned()
}

/// Build the API application around the supplied [`HttpState`].
#[macro_export]
macro_rules! test_app {
    ($state:expr) => {
        actix_web::test::init_service(
            actix_web::App::new()
                .app_data(actix_web::web::Data::new($state.clone()))
                .wrap(backend::Trace)
                .service(
                    actix_web::web::scope("/api/v1")
                        .wrap($crate::support::session_middleware())
                        .configure($crate::support::routes),
                ),
        )
        .await
    };
}
