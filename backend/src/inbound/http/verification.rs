//! Email verification flow handlers.
//!
//! ```text
//! POST /api/v1/verification/request  {"email":"guest@promo.plan"}
//! POST /api/v1/verification/confirm  {"email":"guest@promo.plan","code":"123456"}
//! ```
//!
//! Both endpoints are reachable without a session: the flow exists to
//! prove control of an email address before an account can sign in.
//! The plaintext code travels only through the delivery channel and is
//! never echoed in a response.

use actix_web::{post, web, HttpResponse};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{EmailAddress, Error};
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::field_error;
use crate::inbound::http::ApiResult;

/// Request body for `POST /api/v1/verification/request`.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VerificationRequest {
    /// Address to verify.
    pub email: String,
}

/// Request body for `POST /api/v1/verification/confirm`.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VerificationConfirmRequest {
    /// Address the code was issued to.
    pub email: String,
    /// Submitted six-digit code.
    pub code: String,
}

/// Response body for `POST /api/v1/verification/request`.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VerificationReceipt {
    /// Instant the issued code stops being accepted.
    pub expires_at: DateTime<Utc>,
}

fn parse_email(raw: &str) -> Result<EmailAddress, Error> {
    EmailAddress::new(raw).map_err(|err| field_error("email", err.to_string()))
}

/// Issue a verification code for an email address.
///
/// Any previously outstanding code for the address is superseded.
#[utoipa::path(
    post,
    path = "/api/v1/verification/request",
    request_body = VerificationRequest,
    responses(
        (status = 202, description = "Code issued and queued for delivery", body = VerificationReceipt),
        (status = 400, description = "Invalid email", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["verification"],
    operation_id = "requestVerification",
    security([])
)]
#[post("/verification/request")]
pub async fn request_verification(
    state: web::Data<HttpState>,
    payload: web::Json<VerificationRequest>,
) -> ApiResult<HttpResponse> {
    let email = parse_email(&payload.email)?;
    let pending = state.verification.request(email).await?;
    // The plaintext in `pending` is handed to the delivery channel and
    // deliberately dropped here.
    Ok(HttpResponse::Accepted().json(VerificationReceipt {
        expires_at: pending.expires_at,
    }))
}

/// Confirm a submitted verification code.
#[utoipa::path(
    post,
    path = "/api/v1/verification/confirm",
    request_body = VerificationConfirmRequest,
    responses(
        (status = 204, description = "Code confirmed"),
        (status = 400, description = "Invalid email", body = Error),
        (status = 404, description = "No code outstanding", body = Error),
        (status = 410, description = "Code expired", body = Error),
        (status = 422, description = "Code mismatch", body = Error),
        (status = 429, description = "Attempts exhausted", body = Error)
    ),
    tags = ["verification"],
    operation_id = "confirmVerification",
    security([])
)]
#[post("/verification/confirm")]
pub async fn confirm_verification(
    state: web::Data<HttpState>,
    payload: web::Json<VerificationConfirmRequest>,
) -> ApiResult<HttpResponse> {
    let email = parse_email(&payload.email)?;
    state.verification.confirm(&email, &payload.code).await?;
    Ok(HttpResponse::NoContent().finish())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ErrorCode;
    use rstest::rstest;

    #[rstest]
    #[case("")]
    #[case("not-an-email")]
    fn bad_emails_are_invalid_requests(#[case] raw: &str) {
        let err = parse_email(raw).expect_err("invalid email");
        assert_eq!(err.code(), ErrorCode::InvalidRequest);
    }

    #[rstest]
    fn emails_are_normalised() {
        let email = parse_email("  Guest@Promo.Plan ").expect("valid email");
        assert_eq!(email.as_str(), "guest@promo.plan");
    }
}
