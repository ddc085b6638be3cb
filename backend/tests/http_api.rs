//! HTTP surface tests for sessions, users, companies, and products.

mod support;

use actix_web::http::StatusCode;
use actix_web::test;
use pagination::Page;
use serde_json::{Value, json};

use backend::domain::user::Role;
use backend::domain::{Company, Product, User};

#[actix_web::test]
async fn login_issues_a_session_and_logout_clears_it() {
    let backend = support::test_backend();
    support::seed_user(&backend.users, "ada@promo.plan", Role::Admin, "s3cret-pass").await;
    let app = test_app!(backend.state);

    // Wrong password is a uniform 401.
    let req = test::TestRequest::post()
        .uri("/api/v1/login")
        .set_json(json!({ "email": "ada@promo.plan", "password": "wrong-pass" }))
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    let cookie = support::obtain_session(&app, "ada@promo.plan", "s3cret-pass").await;

    // The session grants access to an authenticated endpoint.
    let req = test::TestRequest::get()
        .uri("/api/v1/companies")
        .cookie(cookie.clone())
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::OK);

    let req = test::TestRequest::post()
        .uri("/api/v1/logout")
        .cookie(cookie)
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::NO_CONTENT);
}

#[actix_web::test]
async fn unauthenticated_requests_are_rejected_with_a_trace_id() {
    let backend = support::test_backend();
    let app = test_app!(backend.state);

    let req = test::TestRequest::get().uri("/api/v1/products").to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    assert!(res.headers().contains_key("trace-id"));

    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["code"], "unauthorized");
}

#[actix_web::test]
async fn user_management_is_admin_only() {
    let backend = support::test_backend();
    support::seed_user(&backend.users, "admin@promo.plan", Role::Admin, "admin-pass").await;
    let promoter_user =
        support::seed_user(&backend.users, "promo@promo.plan", Role::Promoter, "promo-pass").await;
    let app = test_app!(backend.state);

    let admin = support::obtain_session(&app, "admin@promo.plan", "admin-pass").await;
    let promoter = support::obtain_session(&app, "promo@promo.plan", "promo-pass").await;

    let payload = json!({
        "email": "new@promo.plan",
        "displayName": "New Manager",
        "role": "manager",
        "password": "first-pass",
    });

    let req = test::TestRequest::post()
        .uri("/api/v1/users")
        .cookie(promoter.clone())
        .set_json(payload.clone())
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    let req = test::TestRequest::post()
        .uri("/api/v1/users")
        .cookie(admin.clone())
        .set_json(payload.clone())
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::CREATED);
    let created: User = test::read_body_json(res).await;
    assert_eq!(created.email().as_str(), "new@promo.plan");
    assert_eq!(created.role(), Role::Manager);

    // Duplicate email conflicts.
    let req = test::TestRequest::post()
        .uri("/api/v1/users")
        .cookie(admin.clone())
        .set_json(payload)
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::CONFLICT);

    // A promoter may fetch their own record but nobody else's.
    let req = test::TestRequest::get()
        .uri(&format!("/api/v1/users/{}", promoter_user.id()))
        .cookie(promoter.clone())
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::OK);

    let req = test::TestRequest::get()
        .uri(&format!("/api/v1/users/{}", created.id()))
        .cookie(promoter)
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);
}

#[actix_web::test]
async fn archiving_a_user_blocks_their_login() {
    let backend = support::test_backend();
    support::seed_user(&backend.users, "admin@promo.plan", Role::Admin, "admin-pass").await;
    let target =
        support::seed_user(&backend.users, "gone@promo.plan", Role::Manager, "gone-pass").await;
    let app = test_app!(backend.state);

    let admin = support::obtain_session(&app, "admin@promo.plan", "admin-pass").await;
    let req = test::TestRequest::delete()
        .uri(&format!("/api/v1/users/{}", target.id()))
        .cookie(admin)
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::NO_CONTENT);

    let req = test::TestRequest::post()
        .uri("/api/v1/login")
        .set_json(json!({ "email": "gone@promo.plan", "password": "gone-pass" }))
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn company_crud_round_trips() {
    let backend = support::test_backend();
    support::seed_user(&backend.users, "mgr@promo.plan", Role::Manager, "mgr-pass").await;
    let app = test_app!(backend.state);
    let session = support::obtain_session(&app, "mgr@promo.plan", "mgr-pass").await;

    let req = test::TestRequest::post()
        .uri("/api/v1/companies")
        .cookie(session.clone())
        .set_json(json!({ "name": "Acme Fine Foods", "contactEmail": "hello@acme.example" }))
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::CREATED);
    let company: Company = test::read_body_json(res).await;

    // Duplicate name conflicts.
    let req = test::TestRequest::post()
        .uri("/api/v1/companies")
        .cookie(session.clone())
        .set_json(json!({ "name": "Acme Fine Foods", "contactEmail": "other@acme.example" }))
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::CONFLICT);

    let req = test::TestRequest::put()
        .uri(&format!("/api/v1/companies/{}", company.id))
        .cookie(session.clone())
        .set_json(json!({ "name": "Acme Foods", "contactEmail": "hello@acme.example" }))
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::OK);
    let updated: Company = test::read_body_json(res).await;
    assert_eq!(updated.name, "Acme Foods");

    let req = test::TestRequest::put()
        .uri(&format!("/api/v1/companies/{}/logo", company.id))
        .cookie(session.clone())
        .set_payload(&b"png bytes"[..])
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::OK);
    let with_logo: Company = test::read_body_json(res).await;
    assert_eq!(
        with_logo.logo_key.as_deref(),
        Some(format!("companies/{}/logo", company.id).as_str())
    );

    let req = test::TestRequest::delete()
        .uri(&format!("/api/v1/companies/{}", company.id))
        .cookie(session.clone())
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::NO_CONTENT);

    let req = test::TestRequest::get()
        .uri(&format!("/api/v1/companies/{}", company.id))
        .cookie(session)
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::OK);
    let archived: Company = test::read_body_json(res).await;
    assert_eq!(archived.status.as_str(), "archived");
}

#[actix_web::test]
async fn products_require_an_existing_company() {
    let backend = support::test_backend();
    support::seed_user(&backend.users, "mgr@promo.plan", Role::Manager, "mgr-pass").await;
    let app = test_app!(backend.state);
    let session = support::obtain_session(&app, "mgr@promo.plan", "mgr-pass").await;

    let req = test::TestRequest::post()
        .uri("/api/v1/products")
        .cookie(session.clone())
        .set_json(json!({
            "companyId": "3fa85f64-5717-4562-b3fc-2c963f66afa6",
            "name": "Orphan Ale",
        }))
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    let req = test::TestRequest::post()
        .uri("/api/v1/companies")
        .cookie(session.clone())
        .set_json(json!({ "name": "Brewers", "contactEmail": "brew@ers.example" }))
        .to_request();
    let res = test::call_service(&app, req).await;
    let company: Company = test::read_body_json(res).await;

    let req = test::TestRequest::post()
        .uri("/api/v1/products")
        .cookie(session.clone())
        .set_json(json!({
            "companyId": company.id,
            "name": "Pale Ale",
            "description": "Crisp and floral.",
        }))
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::CREATED);
    let product: Product = test::read_body_json(res).await;
    assert_eq!(product.company_id, company.id);

    // The company filter only returns matching products.
    let req = test::TestRequest::get()
        .uri(&format!("/api/v1/products?companyId={}", company.id))
        .cookie(session)
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::OK);
    let page: Page<Product> = Page::from_json(&test::read_body(res).await).expect("page");
    assert_eq!(page.items.len(), 1);
    assert_eq!(page.items[0].id, product.id);
}

#[actix_web::test]
async fn company_lists_paginate_with_cursors() {
    let backend = support::test_backend();
    support::seed_user(&backend.users, "mgr@promo.plan", Role::Manager, "mgr-pass").await;
    let app = test_app!(backend.state);
    let session = support::obtain_session(&app, "mgr@promo.plan", "mgr-pass").await;

    for name in ["Alpha", "Beta", "Gamma"] {
        let req = test::TestRequest::post()
            .uri("/api/v1/companies")
            .cookie(session.clone())
            .set_json(json!({
                "name": name,
                "contactEmail": format!("{}@promo.plan", name.to_lowercase()),
            }))
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::CREATED);
    }

    let req = test::TestRequest::get()
        .uri("/api/v1/companies?limit=2")
        .cookie(session.clone())
        .to_request();
    let res = test::call_service(&app, req).await;
    let first: Page<Company> = Page::from_json(&test::read_body(res).await).expect("page");
    assert_eq!(first.items.len(), 2);
    let cursor = first.next_cursor.expect("more pages");

    let req = test::TestRequest::get()
        .uri(&format!("/api/v1/companies?limit=2&cursor={cursor}"))
        .cookie(session)
        .to_request();
    let res = test::call_service(&app, req).await;
    let second: Page<Company> = Page::from_json(&test::read_body(res).await).expect("page");
    assert_eq!(second.items.len(), 1);
    assert!(second.next_cursor.is_none());
}
