//! Company management handlers.
//!
//! ```text
//! POST   /api/v1/companies
//! GET    /api/v1/companies
//! GET    /api/v1/companies/{id}
//! PUT    /api/v1/companies/{id}
//! DELETE /api/v1/companies/{id}
//! PUT    /api/v1/companies/{id}/logo
//! ```
//!
//! Reads are open to any authenticated user; mutations require an admin
//! or manager.

use actix_web::{delete, get, post, put, web, HttpResponse};
use chrono::Utc;
use pagination::Page;
use serde::{Deserialize, Serialize};
use serde_json::json;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::domain::ports::{CompanyListFilter, ObjectKey, PersistenceError};
use crate::domain::{Company, CompanyValidationError, Error, ResourceStatus};
use crate::inbound::http::query::ListQuery;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{field_error, parse_uuid};
use crate::inbound::http::ApiResult;

/// Request body for creating or updating a company.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CompanyRequest {
    /// Company display name, unique across companies.
    pub name: String,
    /// Contact address shown on tasting paperwork.
    pub contact_email: String,
}

/// Query parameters for `GET /api/v1/companies`.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct ListCompaniesQuery {
    /// Restrict to `active` or `archived` companies.
    pub status: Option<String>,
    #[serde(flatten)]
    #[param(inline)]
    pub page: ListQuery,
}

fn map_company_validation(err: CompanyValidationError) -> Error {
    let field = match err {
        CompanyValidationError::EmptyName | CompanyValidationError::NameTooLong { .. } => "name",
        CompanyValidationError::Email(_) => "contactEmail",
    };
    field_error(field, err.to_string())
}

fn map_insert_conflict(err: PersistenceError) -> Error {
    match err {
        PersistenceError::Conflict { .. } => {
            Error::conflict("company name already in use").with_details(json!({ "field": "name" }))
        }
        other => other.into(),
    }
}

pub(crate) fn parse_resource_status(raw: &str) -> Result<ResourceStatus, Error> {
    ResourceStatus::parse(raw)
        .ok_or_else(|| field_error("status", "status must be active or archived"))
}

async fn load_company(state: &HttpState, id: Uuid) -> Result<Company, Error> {
    state
        .companies
        .find_by_id(id)
        .await?
        .ok_or_else(|| Error::not_found("no such company"))
}

/// Create a company.
#[utoipa::path(
    post,
    path = "/api/v1/companies",
    request_body = CompanyRequest,
    responses(
        (status = 201, description = "Company created", body = Company),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Forbidden", body = Error),
        (status = 409, description = "Name already in use", body = Error)
    ),
    tags = ["companies"],
    operation_id = "createCompany"
)]
#[post("/companies")]
pub async fn create_company(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<CompanyRequest>,
) -> ApiResult<HttpResponse> {
    session.require_editor()?;
    let payload = payload.into_inner();
    let company = Company::create(&payload.name, &payload.contact_email, Utc::now())
        .map_err(map_company_validation)?;
    state
        .companies
        .insert(&company)
        .await
        .map_err(map_insert_conflict)?;
    Ok(HttpResponse::Created().json(company))
}

/// List companies, newest first.
#[utoipa::path(
    get,
    path = "/api/v1/companies",
    params(ListCompaniesQuery),
    responses(
        (status = 200, description = "Page of companies"),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Unauthorised", body = Error)
    ),
    tags = ["companies"],
    operation_id = "listCompanies"
)]
#[get("/companies")]
pub async fn list_companies(
    state: web::Data<HttpState>,
    session: SessionContext,
    query: web::Query<ListCompaniesQuery>,
) -> ApiResult<web::Json<Page<Company>>> {
    session.require_user_id()?;
    let query = query.into_inner();
    let filter = CompanyListFilter {
        status: query
            .status
            .as_deref()
            .map(parse_resource_status)
            .transpose()?,
    };
    let page = query.page.page_request()?;
    let companies = state.companies.list(&filter, page).await?;
    Ok(web::Json(Page::from_slice(companies, page)))
}

/// Fetch one company.
#[utoipa::path(
    get,
    path = "/api/v1/companies/{id}",
    responses(
        (status = 200, description = "Company", body = Company),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 404, description = "Not found", body = Error)
    ),
    tags = ["companies"],
    operation_id = "getCompany"
)]
#[get("/companies/{id}")]
pub async fn get_company(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<web::Json<Company>> {
    session.require_user_id()?;
    let id = parse_uuid(&path.into_inner(), "id")?;
    Ok(web::Json(load_company(&state, id).await?))
}

/// Update a company's name or contact email.
#[utoipa::path(
    put,
    path = "/api/v1/companies/{id}",
    request_body = CompanyRequest,
    responses(
        (status = 200, description = "Updated company", body = Company),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Forbidden", body = Error),
        (status = 404, description = "Not found", body = Error)
    ),
    tags = ["companies"],
    operation_id = "updateCompany"
)]
#[put("/companies/{id}")]
pub async fn update_company(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
    payload: web::Json<CompanyRequest>,
) -> ApiResult<web::Json<Company>> {
    session.require_editor()?;
    let id = parse_uuid(&path.into_inner(), "id")?;
    let payload = payload.into_inner();

    let mut company = load_company(&state, id).await?;
    company
        .update(&payload.name, &payload.contact_email, Utc::now())
        .map_err(map_company_validation)?;
    if !state.companies.update(&company).await? {
        return Err(Error::not_found("no such company"));
    }
    Ok(web::Json(company))
}

/// Archive a company.
#[utoipa::path(
    delete,
    path = "/api/v1/companies/{id}",
    responses(
        (status = 204, description = "Company archived"),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Forbidden", body = Error),
        (status = 404, description = "Not found", body = Error)
    ),
    tags = ["companies"],
    operation_id = "archiveCompany"
)]
#[delete("/companies/{id}")]
pub async fn archive_company(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    session.require_editor()?;
    let id = parse_uuid(&path.into_inner(), "id")?;
    let mut company = load_company(&state, id).await?;
    company.archive(Utc::now());
    if !state.companies.update(&company).await? {
        return Err(Error::not_found("no such company"));
    }
    Ok(HttpResponse::NoContent().finish())
}

/// Upload a company logo.
///
/// The raw request body is stored in the object store and the resulting
/// key is recorded on the company.
#[utoipa::path(
    put,
    path = "/api/v1/companies/{id}/logo",
    request_body(content = Vec<u8>, content_type = "application/octet-stream"),
    responses(
        (status = 200, description = "Company with updated logo key", body = Company),
        (status = 400, description = "Empty upload", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Forbidden", body = Error),
        (status = 404, description = "Not found", body = Error)
    ),
    tags = ["companies"],
    operation_id = "uploadCompanyLogo"
)]
#[put("/companies/{id}/logo")]
pub async fn upload_company_logo(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
    body: web::Bytes,
) -> ApiResult<web::Json<Company>> {
    session.require_editor()?;
    let id = parse_uuid(&path.into_inner(), "id")?;
    if body.is_empty() {
        return Err(Error::invalid_request("upload body must not be empty"));
    }

    let mut company = load_company(&state, id).await?;
    let key = ObjectKey::new(format!("companies/{id}/logo"))
        .map_err(|err| Error::internal(format!("derived object key invalid: {err}")))?;
    state.objects.put(&key, &body).await?;
    company.set_logo_key(key.as_str().to_owned(), Utc::now());
    if !state.companies.update(&company).await? {
        return Err(Error::not_found("no such company"));
    }
    Ok(web::Json(company))
}
