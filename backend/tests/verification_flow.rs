//! Email verification flow over HTTP.
//!
//! The plaintext code never crosses the API, so the tests issue codes
//! through a second [`VerificationService`] handle sharing the same
//! in-memory store, exactly as the delivery channel would.

mod support;

use actix_web::http::StatusCode;
use actix_web::test;
use serde_json::{Value, json};

use backend::domain::{EmailAddress, VerificationService};

const EMAIL: &str = "guest@promo.plan";

fn wrong_code(plaintext: &str) -> String {
    if plaintext == "000000" {
        "000001".to_owned()
    } else {
        "000000".to_owned()
    }
}

#[actix_web::test]
async fn requesting_a_code_returns_only_its_expiry() {
    let backend = support::test_backend();
    let app = test_app!(backend.state);

    let req = test::TestRequest::post()
        .uri("/api/v1/verification/request")
        .set_json(json!({ "email": EMAIL }))
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::ACCEPTED);

    let body: Value = test::read_body_json(res).await;
    let object = body.as_object().expect("receipt object");
    assert!(object.contains_key("expiresAt"));
    assert_eq!(object.len(), 1, "no code material may leak");
}

#[actix_web::test]
async fn a_delivered_code_confirms_exactly_once() {
    let backend = support::test_backend();
    let issuer = VerificationService::new(backend.codes.clone());
    let app = test_app!(backend.state);

    let email = EmailAddress::new(EMAIL).expect("valid email");
    let pending = issuer.request(email).await.expect("issue code");

    let req = test::TestRequest::post()
        .uri("/api/v1/verification/confirm")
        .set_json(json!({ "email": EMAIL, "code": pending.plaintext }))
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::NO_CONTENT);

    // The code was consumed; replaying it finds nothing outstanding.
    let req = test::TestRequest::post()
        .uri("/api/v1/verification/confirm")
        .set_json(json!({ "email": EMAIL, "code": pending.plaintext }))
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn confirming_without_a_request_is_not_found() {
    let backend = support::test_backend();
    let app = test_app!(backend.state);

    let req = test::TestRequest::post()
        .uri("/api/v1/verification/confirm")
        .set_json(json!({ "email": EMAIL, "code": "123456" }))
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["code"], "not_found");
}

#[actix_web::test]
async fn three_mismatches_burn_the_code() {
    let backend = support::test_backend();
    let issuer = VerificationService::new(backend.codes.clone());
    let app = test_app!(backend.state);

    let email = EmailAddress::new(EMAIL).expect("valid email");
    let pending = issuer.request(email).await.expect("issue code");
    let bad = wrong_code(&pending.plaintext);

    for _ in 0..2 {
        let req = test::TestRequest::post()
            .uri("/api/v1/verification/confirm")
            .set_json(json!({ "email": EMAIL, "code": bad }))
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    // The third mismatch exhausts the attempt budget.
    let req = test::TestRequest::post()
        .uri("/api/v1/verification/confirm")
        .set_json(json!({ "email": EMAIL, "code": bad }))
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::TOO_MANY_REQUESTS);

    // Even the correct digits are refused once the code is burned.
    let req = test::TestRequest::post()
        .uri("/api/v1/verification/confirm")
        .set_json(json!({ "email": EMAIL, "code": pending.plaintext }))
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::TOO_MANY_REQUESTS);
}

#[actix_web::test]
async fn a_new_request_supersedes_the_old_code() {
    let backend = support::test_backend();
    let issuer = VerificationService::new(backend.codes.clone());
    let app = test_app!(backend.state);

    let email = EmailAddress::new(EMAIL).expect("valid email");
    let first = issuer.request(email.clone()).await.expect("first code");
    let second = issuer.request(email).await.expect("second code");

    // Guard against the first and second codes drawing the same digits.
    if first.plaintext != second.plaintext {
        let req = test::TestRequest::post()
            .uri("/api/v1/verification/confirm")
            .set_json(json!({ "email": EMAIL, "code": first.plaintext }))
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    let req = test::TestRequest::post()
        .uri("/api/v1/verification/confirm")
        .set_json(json!({ "email": EMAIL, "code": second.plaintext }))
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::NO_CONTENT);
}
