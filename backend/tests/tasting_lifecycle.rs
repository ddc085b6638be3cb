//! Tasting lifecycle and guide management over HTTP.

mod support;

use actix_web::http::StatusCode;
use actix_web::test;
use chrono::{Duration, Utc};
use serde_json::{Value, json};

use backend::domain::user::Role;
use backend::domain::{Company, Guide, Product, Tasting, TastingStatus};

async fn seed_catalogue<S, B>(app: &S, session: &actix_web::cookie::Cookie<'static>) -> (Company, Product)
where
    S: actix_web::dev::Service<
        actix_http::Request,
        Response = actix_web::dev::ServiceResponse<B>,
        Error = actix_web::Error,
    >,
    B: actix_web::body::MessageBody,
{
    let req = test::TestRequest::post()
        .uri("/api/v1/companies")
        .cookie(session.clone())
        .set_json(json!({ "name": "Vintners", "contactEmail": "cellar@vintners.example" }))
        .to_request();
    let res = test::call_service(app, req).await;
    assert_eq!(res.status(), StatusCode::CREATED);
    let company: Company = test::read_body_json(res).await;

    let req = test::TestRequest::post()
        .uri("/api/v1/products")
        .cookie(session.clone())
        .set_json(json!({ "companyId": company.id, "name": "Estate Red" }))
        .to_request();
    let res = test::call_service(app, req).await;
    assert_eq!(res.status(), StatusCode::CREATED);
    let product: Product = test::read_body_json(res).await;
    (company, product)
}

fn tasting_payload(company: &Company, product: &Product) -> Value {
    let starts = Utc::now() + Duration::days(7);
    let ends = starts + Duration::hours(3);
    json!({
        "companyId": company.id,
        "productId": product.id,
        "venue": "Riverside Market, stand 4",
        "startsAt": starts.to_rfc3339(),
        "endsAt": ends.to_rfc3339(),
    })
}

#[actix_web::test]
async fn tastings_walk_the_lifecycle_and_reject_bad_transitions() {
    let backend = support::test_backend();
    support::seed_user(&backend.users, "mgr@promo.plan", Role::Manager, "mgr-pass").await;
    let app = test_app!(backend.state);
    let session = support::obtain_session(&app, "mgr@promo.plan", "mgr-pass").await;
    let (company, product) = seed_catalogue(&app, &session).await;

    let req = test::TestRequest::post()
        .uri("/api/v1/tastings")
        .cookie(session.clone())
        .set_json(tasting_payload(&company, &product))
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::CREATED);
    let tasting: Tasting = test::read_body_json(res).await;
    assert_eq!(tasting.status, TastingStatus::Draft);

    // Draft cannot jump straight to completed.
    let req = test::TestRequest::post()
        .uri(&format!("/api/v1/tastings/{}/transition", tasting.id))
        .cookie(session.clone())
        .set_json(json!({ "status": "completed" }))
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::CONFLICT);
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["details"]["from"], "draft");
    assert_eq!(body["details"]["to"], "completed");

    let req = test::TestRequest::post()
        .uri(&format!("/api/v1/tastings/{}/transition", tasting.id))
        .cookie(session.clone())
        .set_json(json!({ "status": "scheduled" }))
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::OK);
    let scheduled: Tasting = test::read_body_json(res).await;
    assert_eq!(scheduled.status, TastingStatus::Scheduled);

    // DELETE cancels rather than removes.
    let req = test::TestRequest::delete()
        .uri(&format!("/api/v1/tastings/{}", tasting.id))
        .cookie(session.clone())
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::OK);
    let cancelled: Tasting = test::read_body_json(res).await;
    assert_eq!(cancelled.status, TastingStatus::Cancelled);

    // Cancelled is terminal; a second cancel conflicts.
    let req = test::TestRequest::delete()
        .uri(&format!("/api/v1/tastings/{}", tasting.id))
        .cookie(session)
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::CONFLICT);
}

#[actix_web::test]
async fn mismatched_product_and_company_are_rejected() {
    let backend = support::test_backend();
    support::seed_user(&backend.users, "mgr@promo.plan", Role::Manager, "mgr-pass").await;
    let app = test_app!(backend.state);
    let session = support::obtain_session(&app, "mgr@promo.plan", "mgr-pass").await;
    let (_, product) = seed_catalogue(&app, &session).await;

    let req = test::TestRequest::post()
        .uri("/api/v1/companies")
        .cookie(session.clone())
        .set_json(json!({ "name": "Rivals", "contactEmail": "sales@rivals.example" }))
        .to_request();
    let res = test::call_service(&app, req).await;
    let rival: Company = test::read_body_json(res).await;

    let req = test::TestRequest::post()
        .uri("/api/v1/tastings")
        .cookie(session)
        .set_json(tasting_payload(&rival, &product))
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["details"]["field"], "productId");
}

#[actix_web::test]
async fn guides_upsert_and_delete_per_tasting() {
    let backend = support::test_backend();
    support::seed_user(&backend.users, "mgr@promo.plan", Role::Manager, "mgr-pass").await;
    let app = test_app!(backend.state);
    let session = support::obtain_session(&app, "mgr@promo.plan", "mgr-pass").await;
    let (company, product) = seed_catalogue(&app, &session).await;

    let req = test::TestRequest::post()
        .uri("/api/v1/tastings")
        .cookie(session.clone())
        .set_json(tasting_payload(&company, &product))
        .to_request();
    let res = test::call_service(&app, req).await;
    let tasting: Tasting = test::read_body_json(res).await;
    let guide_uri = format!("/api/v1/tastings/{}/guide", tasting.id);

    // No guide yet.
    let req = test::TestRequest::get()
        .uri(&guide_uri)
        .cookie(session.clone())
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    let req = test::TestRequest::put()
        .uri(&guide_uri)
        .cookie(session.clone())
        .set_json(json!({
            "headline": "Launch day",
            "steps": ["Set up the stand", "Pour 25ml samples"],
        }))
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::OK);
    let guide: Guide = test::read_body_json(res).await;

    // Replacing keeps the identity but swaps the content.
    let req = test::TestRequest::put()
        .uri(&guide_uri)
        .cookie(session.clone())
        .set_json(json!({
            "headline": "Launch day, revised",
            "steps": ["Set up the stand", "Pour 25ml samples", "Collect feedback"],
        }))
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::OK);
    let replaced: Guide = test::read_body_json(res).await;
    assert_eq!(replaced.id, guide.id);
    assert_eq!(replaced.steps.len(), 3);

    let req = test::TestRequest::delete()
        .uri(&guide_uri)
        .cookie(session.clone())
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::NO_CONTENT);

    let req = test::TestRequest::delete()
        .uri(&guide_uri)
        .cookie(session)
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}
