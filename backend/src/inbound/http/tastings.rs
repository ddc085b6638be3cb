//! Tasting management handlers.
//!
//! ```text
//! POST   /api/v1/tastings
//! GET    /api/v1/tastings
//! GET    /api/v1/tastings/{id}
//! PUT    /api/v1/tastings/{id}
//! DELETE /api/v1/tastings/{id}            (cancel)
//! POST   /api/v1/tastings/{id}/transition
//! ```
//!
//! Lifecycle legality lives on the domain entity; illegal transitions
//! surface as `409 Conflict` with both states named.

use actix_web::{delete, get, post, put, web, HttpResponse};
use chrono::Utc;
use pagination::Page;
use serde::{Deserialize, Serialize};
use serde_json::json;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::domain::ports::TastingListFilter;
use crate::domain::{Error, InvalidTransition, Tasting, TastingStatus, TastingValidationError};
use crate::inbound::http::query::ListQuery;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{
    field_error, parse_optional_uuid, parse_rfc3339_timestamp, parse_uuid,
};
use crate::inbound::http::ApiResult;

/// Request body for `POST /api/v1/tastings`.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateTastingRequest {
    /// Company the event promotes for.
    pub company_id: String,
    /// Product being tasted.
    pub product_id: String,
    /// Venue description.
    pub venue: String,
    /// Scheduled start, RFC 3339.
    pub starts_at: String,
    /// Scheduled end, RFC 3339.
    pub ends_at: String,
}

/// Request body for `PUT /api/v1/tastings/{id}`.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTastingRequest {
    /// Venue description.
    pub venue: String,
    /// Scheduled start, RFC 3339.
    pub starts_at: String,
    /// Scheduled end, RFC 3339.
    pub ends_at: String,
    /// Assigned promoter, if booked.
    #[serde(default)]
    pub promoter_id: Option<String>,
}

/// Request body for `POST /api/v1/tastings/{id}/transition`.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TransitionRequest {
    /// Target lifecycle status.
    pub status: String,
}

/// Query parameters for `GET /api/v1/tastings`.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct ListTastingsQuery {
    /// Restrict to one company's tastings.
    pub company_id: Option<String>,
    /// Restrict to tastings assigned to one promoter.
    pub promoter_id: Option<String>,
    /// Restrict to a single lifecycle status.
    pub status: Option<String>,
    #[serde(flatten)]
    #[param(inline)]
    pub page: ListQuery,
}

fn map_tasting_validation(err: TastingValidationError) -> Error {
    let field = match err {
        TastingValidationError::EmptyVenue | TastingValidationError::VenueTooLong { .. } => {
            "venue"
        }
        TastingValidationError::InvalidWindow => "endsAt",
        TastingValidationError::UnknownStatus => "status",
    };
    field_error(field, err.to_string())
}

fn map_invalid_transition(err: InvalidTransition) -> Error {
    Error::conflict(err.to_string()).with_details(json!({
        "from": err.from.as_str(),
        "to": err.to.as_str(),
    }))
}

fn parse_tasting_status(raw: &str) -> Result<TastingStatus, Error> {
    TastingStatus::parse(raw).map_err(map_tasting_validation)
}

async fn load_tasting(state: &HttpState, id: Uuid) -> Result<Tasting, Error> {
    state
        .tastings
        .find_by_id(id)
        .await?
        .ok_or_else(|| Error::not_found("no such tasting"))
}

async fn store_tasting(state: &HttpState, tasting: &Tasting) -> Result<(), Error> {
    if !state.tastings.update(tasting).await? {
        return Err(Error::not_found("no such tasting"));
    }
    Ok(())
}

/// Create a draft tasting.
#[utoipa::path(
    post,
    path = "/api/v1/tastings",
    request_body = CreateTastingRequest,
    responses(
        (status = 201, description = "Tasting created as a draft", body = Tasting),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Forbidden", body = Error),
        (status = 404, description = "Company or product not found", body = Error)
    ),
    tags = ["tastings"],
    operation_id = "createTasting"
)]
#[post("/tastings")]
pub async fn create_tasting(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<CreateTastingRequest>,
) -> ApiResult<HttpResponse> {
    session.require_editor()?;
    let payload = payload.into_inner();
    let company_id = parse_uuid(&payload.company_id, "companyId")?;
    let product_id = parse_uuid(&payload.product_id, "productId")?;
    let starts_at = parse_rfc3339_timestamp(&payload.starts_at, "startsAt")?;
    let ends_at = parse_rfc3339_timestamp(&payload.ends_at, "endsAt")?;

    if state.companies.find_by_id(company_id).await?.is_none() {
        return Err(Error::not_found("no such company"));
    }
    let product = state
        .products
        .find_by_id(product_id)
        .await?
        .ok_or_else(|| Error::not_found("no such product"))?;
    if product.company_id != company_id {
        return Err(
            field_error("productId", "product belongs to a different company")
        );
    }

    let tasting = Tasting::create(
        company_id,
        product_id,
        &payload.venue,
        starts_at,
        ends_at,
        Utc::now(),
    )
    .map_err(map_tasting_validation)?;
    state.tastings.insert(&tasting).await?;
    Ok(HttpResponse::Created().json(tasting))
}

/// List tastings ordered by start time.
#[utoipa::path(
    get,
    path = "/api/v1/tastings",
    params(ListTastingsQuery),
    responses(
        (status = 200, description = "Page of tastings"),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Unauthorised", body = Error)
    ),
    tags = ["tastings"],
    operation_id = "listTastings"
)]
#[get("/tastings")]
pub async fn list_tastings(
    state: web::Data<HttpState>,
    session: SessionContext,
    query: web::Query<ListTastingsQuery>,
) -> ApiResult<web::Json<Page<Tasting>>> {
    session.require_user_id()?;
    let query = query.into_inner();
    let filter = TastingListFilter {
        company_id: parse_optional_uuid(query.company_id.as_deref(), "companyId")?,
        promoter_id: parse_optional_uuid(query.promoter_id.as_deref(), "promoterId")?,
        status: query
            .status
            .as_deref()
            .map(parse_tasting_status)
            .transpose()?,
    };
    let page = query.page.page_request()?;
    let tastings = state.tastings.list(&filter, page).await?;
    Ok(web::Json(Page::from_slice(tastings, page)))
}

/// Fetch one tasting.
#[utoipa::path(
    get,
    path = "/api/v1/tastings/{id}",
    responses(
        (status = 200, description = "Tasting", body = Tasting),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 404, description = "Not found", body = Error)
    ),
    tags = ["tastings"],
    operation_id = "getTasting"
)]
#[get("/tastings/{id}")]
pub async fn get_tasting(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<web::Json<Tasting>> {
    session.require_user_id()?;
    let id = parse_uuid(&path.into_inner(), "id")?;
    Ok(web::Json(load_tasting(&state, id).await?))
}

/// Update a tasting's schedulable fields.
#[utoipa::path(
    put,
    path = "/api/v1/tastings/{id}",
    request_body = UpdateTastingRequest,
    responses(
        (status = 200, description = "Updated tasting", body = Tasting),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Forbidden", body = Error),
        (status = 404, description = "Not found", body = Error)
    ),
    tags = ["tastings"],
    operation_id = "updateTasting"
)]
#[put("/tastings/{id}")]
pub async fn update_tasting(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
    payload: web::Json<UpdateTastingRequest>,
) -> ApiResult<web::Json<Tasting>> {
    session.require_editor()?;
    let id = parse_uuid(&path.into_inner(), "id")?;
    let payload = payload.into_inner();
    let starts_at = parse_rfc3339_timestamp(&payload.starts_at, "startsAt")?;
    let ends_at = parse_rfc3339_timestamp(&payload.ends_at, "endsAt")?;
    let promoter_id = parse_optional_uuid(payload.promoter_id.as_deref(), "promoterId")?;

    let mut tasting = load_tasting(&state, id).await?;
    tasting
        .update(&payload.venue, starts_at, ends_at, promoter_id, Utc::now())
        .map_err(map_tasting_validation)?;
    store_tasting(&state, &tasting).await?;
    Ok(web::Json(tasting))
}

/// Cancel a tasting.
///
/// Deleting is expressed through the lifecycle: the tasting moves to
/// `cancelled` and stays queryable for reporting.
#[utoipa::path(
    delete,
    path = "/api/v1/tastings/{id}",
    responses(
        (status = 200, description = "Cancelled tasting", body = Tasting),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Forbidden", body = Error),
        (status = 404, description = "Not found", body = Error),
        (status = 409, description = "Tasting already terminal", body = Error)
    ),
    tags = ["tastings"],
    operation_id = "cancelTasting"
)]
#[delete("/tastings/{id}")]
pub async fn cancel_tasting(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<web::Json<Tasting>> {
    session.require_editor()?;
    let id = parse_uuid(&path.into_inner(), "id")?;
    let mut tasting = load_tasting(&state, id).await?;
    tasting
        .transition(TastingStatus::Cancelled, Utc::now())
        .map_err(map_invalid_transition)?;
    store_tasting(&state, &tasting).await?;
    Ok(web::Json(tasting))
}

/// Move a tasting along its lifecycle.
#[utoipa::path(
    post,
    path = "/api/v1/tastings/{id}/transition",
    request_body = TransitionRequest,
    responses(
        (status = 200, description = "Tasting in its new status", body = Tasting),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Forbidden", body = Error),
        (status = 404, description = "Not found", body = Error),
        (status = 409, description = "Illegal transition", body = Error)
    ),
    tags = ["tastings"],
    operation_id = "transitionTasting"
)]
#[post("/tastings/{id}/transition")]
pub async fn transition_tasting(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
    payload: web::Json<TransitionRequest>,
) -> ApiResult<web::Json<Tasting>> {
    session.require_editor()?;
    let id = parse_uuid(&path.into_inner(), "id")?;
    let next = parse_tasting_status(&payload.status)?;

    let mut tasting = load_tasting(&state, id).await?;
    tasting
        .transition(next, Utc::now())
        .map_err(map_invalid_transition)?;
    store_tasting(&state, &tasting).await?;
    Ok(web::Json(tasting))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ErrorCode;
    use rstest::rstest;
    use serde_json::Value;

    #[rstest]
    fn illegal_transitions_are_conflicts_with_both_states() {
        let err = map_invalid_transition(InvalidTransition {
            from: TastingStatus::Completed,
            to: TastingStatus::Active,
        });
        assert_eq!(err.code(), ErrorCode::Conflict);
        let details = err.details().and_then(Value::as_object).expect("details");
        assert_eq!(details.get("from").and_then(Value::as_str), Some("completed"));
        assert_eq!(details.get("to").and_then(Value::as_str), Some("active"));
    }

    #[rstest]
    fn inverted_windows_map_to_the_ends_at_field() {
        let err = map_tasting_validation(TastingValidationError::InvalidWindow);
        let details = err.details().and_then(Value::as_object).expect("details");
        assert_eq!(details.get("field").and_then(Value::as_str), Some("endsAt"));
    }

    #[rstest]
    #[case("draft", TastingStatus::Draft)]
    #[case("cancelled", TastingStatus::Cancelled)]
    fn status_strings_parse(#[case] raw: &str, #[case] expected: TastingStatus) {
        assert_eq!(parse_tasting_status(raw).expect("valid"), expected);
    }
}
