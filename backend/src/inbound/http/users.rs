//! User management handlers, restricted to admins.
//!
//! ```text
//! POST   /api/v1/users
//! GET    /api/v1/users
//! GET    /api/v1/users/{id}
//! PUT    /api/v1/users/{id}
//! DELETE /api/v1/users/{id}
//! ```
//!
//! Deletion is soft: accounts move to the `archived` status and stop
//! being able to sign in.

use actix_web::{delete, get, post, put, web, HttpResponse};
use chrono::Utc;
use pagination::Page;
use serde::{Deserialize, Serialize};
use serde_json::json;
use utoipa::{IntoParams, ToSchema};

use crate::domain::ports::UserListFilter;
use crate::domain::user::UserId;
use crate::domain::{
    DisplayName, EmailAddress, Error, Password, PasswordHash, Role, User, UserStatus,
    UserValidationError,
};
use crate::inbound::http::auth::map_login_validation_error;
use crate::inbound::http::query::ListQuery;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{field_error, parse_optional_uuid};
use crate::inbound::http::ApiResult;

/// Request body for `POST /api/v1/users`.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserRequest {
    /// Account email, unique across users.
    pub email: String,
    /// Name shown in the dashboard.
    pub display_name: String,
    /// Granted role: `admin`, `manager`, or `promoter`.
    pub role: String,
    /// Owning company for managers and promoters.
    #[serde(default)]
    pub company_id: Option<String>,
    /// Initial password.
    pub password: String,
}

/// Request body for `PUT /api/v1/users/{id}`.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserRequest {
    /// Name shown in the dashboard.
    pub display_name: String,
    /// Granted role: `admin`, `manager`, or `promoter`.
    pub role: String,
    /// Owning company for managers and promoters.
    #[serde(default)]
    pub company_id: Option<String>,
    /// Account status: `active`, `invited`, or `archived`.
    pub status: String,
}

/// Query parameters for `GET /api/v1/users`.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct ListUsersQuery {
    /// Restrict to a single role.
    pub role: Option<String>,
    /// Restrict to a single status.
    pub status: Option<String>,
    #[serde(flatten)]
    #[param(inline)]
    pub page: ListQuery,
}

fn map_user_validation(err: UserValidationError, field: &'static str) -> Error {
    field_error(field, err.to_string())
}

fn parse_role(raw: &str) -> Result<Role, Error> {
    Role::parse(raw).map_err(|err| map_user_validation(err, "role"))
}

fn parse_status(raw: &str) -> Result<UserStatus, Error> {
    UserStatus::parse(raw).map_err(|err| map_user_validation(err, "status"))
}

fn map_insert_conflict(err: crate::domain::ports::PersistenceError) -> Error {
    match err {
        crate::domain::ports::PersistenceError::Conflict { .. } => {
            Error::conflict("email already in use").with_details(json!({ "field": "email" }))
        }
        other => other.into(),
    }
}

fn user_id_from_path(raw: &str) -> Result<UserId, Error> {
    UserId::new(raw).map_err(|_| {
        Error::invalid_request("id must be a valid UUID")
            .with_details(json!({ "field": "id", "value": raw }))
    })
}

/// Create a user account.
#[utoipa::path(
    post,
    path = "/api/v1/users",
    request_body = CreateUserRequest,
    responses(
        (status = 201, description = "User created", body = User),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Forbidden", body = Error),
        (status = 409, description = "Email already in use", body = Error)
    ),
    tags = ["users"],
    operation_id = "createUser"
)]
#[post("/users")]
pub async fn create_user(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<CreateUserRequest>,
) -> ApiResult<HttpResponse> {
    session.require_admin()?;
    let payload = payload.into_inner();

    let email =
        EmailAddress::new(&payload.email).map_err(|err| field_error("email", err.to_string()))?;
    let display_name = DisplayName::new(payload.display_name)
        .map_err(|err| map_user_validation(err, "displayName"))?;
    let role = parse_role(&payload.role)?;
    let company_id = parse_optional_uuid(payload.company_id.as_deref(), "companyId")?;
    let password = Password::new(payload.password).map_err(map_login_validation_error)?;

    let user = User::create(email, display_name, role, company_id, Utc::now());
    let hash = PasswordHash::derive(&password);
    state
        .users
        .insert(&user, &hash)
        .await
        .map_err(map_insert_conflict)?;
    Ok(HttpResponse::Created().json(user))
}

/// List user accounts, newest first.
#[utoipa::path(
    get,
    path = "/api/v1/users",
    params(ListUsersQuery),
    responses(
        (status = 200, description = "Page of users"),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Forbidden", body = Error)
    ),
    tags = ["users"],
    operation_id = "listUsers"
)]
#[get("/users")]
pub async fn list_users(
    state: web::Data<HttpState>,
    session: SessionContext,
    query: web::Query<ListUsersQuery>,
) -> ApiResult<web::Json<Page<User>>> {
    session.require_admin()?;
    let query = query.into_inner();
    let filter = UserListFilter {
        role: query.role.as_deref().map(parse_role).transpose()?,
        status: query.status.as_deref().map(parse_status).transpose()?,
    };
    let page = query.page.page_request()?;
    let users = state.users.list(&filter, page).await?;
    Ok(web::Json(Page::from_slice(users, page)))
}

/// Fetch one user account.
///
/// Admins may fetch anyone; other roles only their own account.
#[utoipa::path(
    get,
    path = "/api/v1/users/{id}",
    responses(
        (status = 200, description = "User", body = User),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Forbidden", body = Error),
        (status = 404, description = "Not found", body = Error)
    ),
    tags = ["users"],
    operation_id = "getUser"
)]
#[get("/users/{id}")]
pub async fn get_user(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<web::Json<User>> {
    let caller = session.require_user_id()?;
    let id = user_id_from_path(&path.into_inner())?;
    if caller != id {
        session.require_admin()?;
    }
    let user = state
        .users
        .find_by_id(&id)
        .await?
        .ok_or_else(|| Error::not_found("no such user"))?;
    Ok(web::Json(user))
}

/// Update a user's profile, role, or status.
#[utoipa::path(
    put,
    path = "/api/v1/users/{id}",
    request_body = UpdateUserRequest,
    responses(
        (status = 200, description = "Updated user", body = User),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Forbidden", body = Error),
        (status = 404, description = "Not found", body = Error)
    ),
    tags = ["users"],
    operation_id = "updateUser"
)]
#[put("/users/{id}")]
pub async fn update_user(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
    payload: web::Json<UpdateUserRequest>,
) -> ApiResult<web::Json<User>> {
    session.require_admin()?;
    let id = user_id_from_path(&path.into_inner())?;
    let payload = payload.into_inner();

    let display_name = DisplayName::new(payload.display_name)
        .map_err(|err| map_user_validation(err, "displayName"))?;
    let role = parse_role(&payload.role)?;
    let status = parse_status(&payload.status)?;
    let company_id = parse_optional_uuid(payload.company_id.as_deref(), "companyId")?;

    let mut user = state
        .users
        .find_by_id(&id)
        .await?
        .ok_or_else(|| Error::not_found("no such user"))?;
    user.update(display_name, role, company_id, status, Utc::now());
    if !state.users.update(&user).await? {
        return Err(Error::not_found("no such user"));
    }
    Ok(web::Json(user))
}

/// Archive a user account.
#[utoipa::path(
    delete,
    path = "/api/v1/users/{id}",
    responses(
        (status = 204, description = "User archived"),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Forbidden", body = Error),
        (status = 404, description = "Not found", body = Error)
    ),
    tags = ["users"],
    operation_id = "archiveUser"
)]
#[delete("/users/{id}")]
pub async fn archive_user(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    session.require_admin()?;
    let id = user_id_from_path(&path.into_inner())?;
    let mut user = state
        .users
        .find_by_id(&id)
        .await?
        .ok_or_else(|| Error::not_found("no such user"))?;
    user.archive(Utc::now());
    if !state.users.update(&user).await? {
        return Err(Error::not_found("no such user"));
    }
    Ok(HttpResponse::NoContent().finish())
}
