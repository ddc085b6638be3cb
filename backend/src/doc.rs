//! OpenAPI documentation configuration.
//!
//! [`ApiDoc`] generates the OpenAPI specification for the REST API:
//! every handler path from the inbound layer, the domain schemas they
//! reference, and the session cookie security scheme. Swagger UI serves
//! the document in debug builds.

use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::domain::{Company, Error, ErrorCode, Guide, Product, Tasting, TastingStatus, User};
use crate::inbound::http;

/// Enrich the generated document with the session cookie security scheme.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            "SessionCookie",
            SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::with_description(
                "session",
                "Session cookie issued by POST /api/v1/login.",
            ))),
        );
    }
}

/// OpenAPI document for the REST API.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "Promo Plan backend API",
        description = "Administrative dashboard API for companies, products, \
                       tastings, guides, and email verification."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    security(("SessionCookie" = [])),
    paths(
        http::auth::login,
        http::auth::logout,
        http::users::create_user,
        http::users::list_users,
        http::users::get_user,
        http::users::update_user,
        http::users::archive_user,
        http::companies::create_company,
        http::companies::list_companies,
        http::companies::get_company,
        http::companies::update_company,
        http::companies::archive_company,
        http::companies::upload_company_logo,
        http::products::create_product,
        http::products::list_products,
        http::products::get_product,
        http::products::update_product,
        http::products::archive_product,
        http::products::upload_product_image,
        http::tastings::create_tasting,
        http::tastings::list_tastings,
        http::tastings::get_tasting,
        http::tastings::update_tasting,
        http::tastings::cancel_tasting,
        http::tastings::transition_tasting,
        http::guides::get_guide,
        http::guides::put_guide,
        http::guides::delete_guide,
        http::verification::request_verification,
        http::verification::confirm_verification,
        http::health::ready,
        http::health::live,
    ),
    components(schemas(
        Error,
        ErrorCode,
        User,
        Company,
        Product,
        Tasting,
        TastingStatus,
        Guide,
        http::auth::LoginRequest,
        http::users::CreateUserRequest,
        http::users::UpdateUserRequest,
        http::companies::CompanyRequest,
        http::products::CreateProductRequest,
        http::products::UpdateProductRequest,
        http::tastings::CreateTastingRequest,
        http::tastings::UpdateTastingRequest,
        http::tastings::TransitionRequest,
        http::guides::GuideRequest,
        http::verification::VerificationRequest,
        http::verification::VerificationConfirmRequest,
        http::verification::VerificationReceipt,
    )),
    tags(
        (name = "auth", description = "Session login and logout"),
        (name = "users", description = "Dashboard user management"),
        (name = "companies", description = "Client companies"),
        (name = "products", description = "Promotable products"),
        (name = "tastings", description = "Tasting events and their lifecycle"),
        (name = "guides", description = "Run sheets attached to tastings"),
        (name = "verification", description = "Email verification codes"),
        (name = "health", description = "Readiness and liveness probes")
    )
)]
pub struct ApiDoc;
