//! Guide handlers, nested under their tasting.
//!
//! ```text
//! GET    /api/v1/tastings/{id}/guide
//! PUT    /api/v1/tastings/{id}/guide
//! DELETE /api/v1/tastings/{id}/guide
//! ```
//!
//! Each tasting carries at most one guide; `PUT` creates or replaces it.

use actix_web::{delete, get, put, web, HttpResponse};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::json;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::ports::ObjectKey;
use crate::domain::{Error, Guide, GuideValidationError};
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{field_error, parse_uuid};
use crate::inbound::http::ApiResult;

/// Request body for `PUT /api/v1/tastings/{id}/guide`.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GuideRequest {
    /// One-line summary shown at the top of the run sheet.
    pub headline: String,
    /// Ordered instructions for the promoter.
    pub steps: Vec<String>,
    /// Object-store keys for supporting files.
    #[serde(default)]
    pub attachment_keys: Vec<String>,
}

fn map_guide_validation(err: GuideValidationError) -> Error {
    let field = match err {
        GuideValidationError::EmptyHeadline | GuideValidationError::HeadlineTooLong { .. } => {
            "headline"
        }
        GuideValidationError::NoSteps
        | GuideValidationError::TooManySteps { .. }
        | GuideValidationError::EmptyStep { .. } => "steps",
    };
    field_error(field, err.to_string())
}

fn validate_attachment_keys(keys: &[String]) -> Result<(), Error> {
    for (index, key) in keys.iter().enumerate() {
        if ObjectKey::new(key.clone()).is_err() {
            return Err(
                Error::invalid_request("attachment keys must be valid object-store keys")
                    .with_details(json!({
                        "field": "attachmentKeys",
                        "index": index,
                        "value": key,
                    })),
            );
        }
    }
    Ok(())
}

async fn require_tasting(state: &HttpState, id: Uuid) -> Result<(), Error> {
    if state.tastings.find_by_id(id).await?.is_none() {
        return Err(Error::not_found("no such tasting"));
    }
    Ok(())
}

/// Fetch the guide attached to a tasting.
#[utoipa::path(
    get,
    path = "/api/v1/tastings/{id}/guide",
    responses(
        (status = 200, description = "Guide", body = Guide),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 404, description = "Tasting or guide not found", body = Error)
    ),
    tags = ["guides"],
    operation_id = "getGuide"
)]
#[get("/tastings/{id}/guide")]
pub async fn get_guide(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<web::Json<Guide>> {
    session.require_user_id()?;
    let tasting_id = parse_uuid(&path.into_inner(), "id")?;
    require_tasting(&state, tasting_id).await?;
    let guide = state
        .guides
        .find_by_tasting(tasting_id)
        .await?
        .ok_or_else(|| Error::not_found("tasting has no guide"))?;
    Ok(web::Json(guide))
}

/// Create or replace the guide for a tasting.
#[utoipa::path(
    put,
    path = "/api/v1/tastings/{id}/guide",
    request_body = GuideRequest,
    responses(
        (status = 200, description = "Stored guide", body = Guide),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Forbidden", body = Error),
        (status = 404, description = "Tasting not found", body = Error)
    ),
    tags = ["guides"],
    operation_id = "putGuide"
)]
#[put("/tastings/{id}/guide")]
pub async fn put_guide(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
    payload: web::Json<GuideRequest>,
) -> ApiResult<web::Json<Guide>> {
    session.require_editor()?;
    let tasting_id = parse_uuid(&path.into_inner(), "id")?;
    require_tasting(&state, tasting_id).await?;
    let payload = payload.into_inner();
    validate_attachment_keys(&payload.attachment_keys)?;

    let now = Utc::now();
    let guide = match state.guides.find_by_tasting(tasting_id).await? {
        Some(mut existing) => {
            existing
                .update(
                    &payload.headline,
                    payload.steps,
                    payload.attachment_keys,
                    now,
                )
                .map_err(map_guide_validation)?;
            existing
        }
        None => Guide::create(
            tasting_id,
            &payload.headline,
            payload.steps,
            payload.attachment_keys,
            now,
        )
        .map_err(map_guide_validation)?,
    };
    state.guides.upsert(&guide).await?;
    Ok(web::Json(guide))
}

/// Delete the guide attached to a tasting.
#[utoipa::path(
    delete,
    path = "/api/v1/tastings/{id}/guide",
    responses(
        (status = 204, description = "Guide deleted"),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Forbidden", body = Error),
        (status = 404, description = "Tasting or guide not found", body = Error)
    ),
    tags = ["guides"],
    operation_id = "deleteGuide"
)]
#[delete("/tastings/{id}/guide")]
pub async fn delete_guide(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    session.require_editor()?;
    let tasting_id = parse_uuid(&path.into_inner(), "id")?;
    require_tasting(&state, tasting_id).await?;
    if !state.guides.delete_by_tasting(tasting_id).await? {
        return Err(Error::not_found("tasting has no guide"));
    }
    Ok(HttpResponse::NoContent().finish())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ErrorCode;
    use rstest::rstest;
    use serde_json::Value;

    #[rstest]
    fn blank_steps_map_to_the_steps_field() {
        let err = map_guide_validation(GuideValidationError::EmptyStep { index: 2 });
        assert_eq!(err.code(), ErrorCode::InvalidRequest);
        let details = err.details().and_then(Value::as_object).expect("details");
        assert_eq!(details.get("field").and_then(Value::as_str), Some("steps"));
    }

    #[rstest]
    fn attachment_keys_reject_traversal() {
        let keys = vec!["guides/ok.pdf".to_owned(), "../etc/passwd".to_owned()];
        let err = validate_attachment_keys(&keys).expect_err("traversal rejected");
        let details = err.details().and_then(Value::as_object).expect("details");
        assert_eq!(details.get("index").and_then(Value::as_u64), Some(1));
    }

    #[rstest]
    fn clean_attachment_keys_pass() {
        let keys = vec!["guides/poster.pdf".to_owned()];
        validate_attachment_keys(&keys).expect("valid keys");
    }
}
