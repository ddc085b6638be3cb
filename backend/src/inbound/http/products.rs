//! Product management handlers.
//!
//! ```text
//! POST   /api/v1/products
//! GET    /api/v1/products
//! GET    /api/v1/products/{id}
//! PUT    /api/v1/products/{id}
//! DELETE /api/v1/products/{id}
//! PUT    /api/v1/products/{id}/image
//! ```

use actix_web::{delete, get, post, put, web, HttpResponse};
use chrono::Utc;
use pagination::Page;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::domain::ports::{ObjectKey, ProductListFilter};
use crate::domain::{Error, Product, ProductValidationError};
use crate::inbound::http::companies::parse_resource_status;
use crate::inbound::http::query::ListQuery;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{field_error, parse_optional_uuid, parse_uuid};
use crate::inbound::http::ApiResult;

/// Request body for `POST /api/v1/products`.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateProductRequest {
    /// Owning company.
    pub company_id: String,
    /// Product display name.
    pub name: String,
    /// Optional marketing blurb.
    #[serde(default)]
    pub description: Option<String>,
}

/// Request body for `PUT /api/v1/products/{id}`.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProductRequest {
    /// Product display name.
    pub name: String,
    /// Optional marketing blurb.
    #[serde(default)]
    pub description: Option<String>,
}

/// Query parameters for `GET /api/v1/products`.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct ListProductsQuery {
    /// Restrict to one company's products.
    pub company_id: Option<String>,
    /// Restrict to `active` or `archived` products.
    pub status: Option<String>,
    #[serde(flatten)]
    #[param(inline)]
    pub page: ListQuery,
}

fn map_product_validation(err: ProductValidationError) -> Error {
    let field = match err {
        ProductValidationError::EmptyName | ProductValidationError::NameTooLong { .. } => "name",
        ProductValidationError::DescriptionTooLong { .. } => "description",
    };
    field_error(field, err.to_string())
}

async fn load_product(state: &HttpState, id: Uuid) -> Result<Product, Error> {
    state
        .products
        .find_by_id(id)
        .await?
        .ok_or_else(|| Error::not_found("no such product"))
}

/// Create a product under an existing company.
#[utoipa::path(
    post,
    path = "/api/v1/products",
    request_body = CreateProductRequest,
    responses(
        (status = 201, description = "Product created", body = Product),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Forbidden", body = Error),
        (status = 404, description = "Company not found", body = Error)
    ),
    tags = ["products"],
    operation_id = "createProduct"
)]
#[post("/products")]
pub async fn create_product(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<CreateProductRequest>,
) -> ApiResult<HttpResponse> {
    session.require_editor()?;
    let payload = payload.into_inner();
    let company_id = parse_uuid(&payload.company_id, "companyId")?;
    if state.companies.find_by_id(company_id).await?.is_none() {
        return Err(Error::not_found("no such company"));
    }

    let product = Product::create(
        company_id,
        &payload.name,
        payload.description.as_deref(),
        Utc::now(),
    )
    .map_err(map_product_validation)?;
    state.products.insert(&product).await?;
    Ok(HttpResponse::Created().json(product))
}

/// List products, newest first.
#[utoipa::path(
    get,
    path = "/api/v1/products",
    params(ListProductsQuery),
    responses(
        (status = 200, description = "Page of products"),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Unauthorised", body = Error)
    ),
    tags = ["products"],
    operation_id = "listProducts"
)]
#[get("/products")]
pub async fn list_products(
    state: web::Data<HttpState>,
    session: SessionContext,
    query: web::Query<ListProductsQuery>,
) -> ApiResult<web::Json<Page<Product>>> {
    session.require_user_id()?;
    let query = query.into_inner();
    let filter = ProductListFilter {
        company_id: parse_optional_uuid(query.company_id.as_deref(), "companyId")?,
        status: query
            .status
            .as_deref()
            .map(parse_resource_status)
            .transpose()?,
    };
    let page = query.page.page_request()?;
    let products = state.products.list(&filter, page).await?;
    Ok(web::Json(Page::from_slice(products, page)))
}

/// Fetch one product.
#[utoipa::path(
    get,
    path = "/api/v1/products/{id}",
    responses(
        (status = 200, description = "Product", body = Product),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 404, description = "Not found", body = Error)
    ),
    tags = ["products"],
    operation_id = "getProduct"
)]
#[get("/products/{id}")]
pub async fn get_product(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<web::Json<Product>> {
    session.require_user_id()?;
    let id = parse_uuid(&path.into_inner(), "id")?;
    Ok(web::Json(load_product(&state, id).await?))
}

/// Update a product's name or description.
#[utoipa::path(
    put,
    path = "/api/v1/products/{id}",
    request_body = UpdateProductRequest,
    responses(
        (status = 200, description = "Updated product", body = Product),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Forbidden", body = Error),
        (status = 404, description = "Not found", body = Error)
    ),
    tags = ["products"],
    operation_id = "updateProduct"
)]
#[put("/products/{id}")]
pub async fn update_product(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
    payload: web::Json<UpdateProductRequest>,
) -> ApiResult<web::Json<Product>> {
    session.require_editor()?;
    let id = parse_uuid(&path.into_inner(), "id")?;
    let payload = payload.into_inner();

    let mut product = load_product(&state, id).await?;
    product
        .update(&payload.name, payload.description.as_deref(), Utc::now())
        .map_err(map_product_validation)?;
    if !state.products.update(&product).await? {
        return Err(Error::not_found("no such product"));
    }
    Ok(web::Json(product))
}

/// Archive a product.
#[utoipa::path(
    delete,
    path = "/api/v1/products/{id}",
    responses(
        (status = 204, description = "Product archived"),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Forbidden", body = Error),
        (status = 404, description = "Not found", body = Error)
    ),
    tags = ["products"],
    operation_id = "archiveProduct"
)]
#[delete("/products/{id}")]
pub async fn archive_product(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    session.require_editor()?;
    let id = parse_uuid(&path.into_inner(), "id")?;
    let mut product = load_product(&state, id).await?;
    product.archive(Utc::now());
    if !state.products.update(&product).await? {
        return Err(Error::not_found("no such product"));
    }
    Ok(HttpResponse::NoContent().finish())
}

/// Upload a product shot.
#[utoipa::path(
    put,
    path = "/api/v1/products/{id}/image",
    request_body(content = Vec<u8>, content_type = "application/octet-stream"),
    responses(
        (status = 200, description = "Product with updated image key", body = Product),
        (status = 400, description = "Empty upload", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Forbidden", body = Error),
        (status = 404, description = "Not found", body = Error)
    ),
    tags = ["products"],
    operation_id = "uploadProductImage"
)]
#[put("/products/{id}/image")]
pub async fn upload_product_image(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
    body: web::Bytes,
) -> ApiResult<web::Json<Product>> {
    session.require_editor()?;
    let id = parse_uuid(&path.into_inner(), "id")?;
    if body.is_empty() {
        return Err(Error::invalid_request("upload body must not be empty"));
    }

    let mut product = load_product(&state, id).await?;
    let key = ObjectKey::new(format!("products/{id}/image"))
        .map_err(|err| Error::internal(format!("derived object key invalid: {err}")))?;
    state.objects.put(&key, &body).await?;
    product.set_image_key(key.as_str().to_owned(), Utc::now());
    if !state.products.update(&product).await? {
        return Err(Error::not_found("no such product"));
    }
    Ok(web::Json(product))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ErrorCode;
    use rstest::rstest;
    use serde_json::Value;

    #[rstest]
    fn long_descriptions_map_to_the_description_field() {
        let err = map_product_validation(ProductValidationError::DescriptionTooLong { max: 2000 });
        assert_eq!(err.code(), ErrorCode::InvalidRequest);
        let details = err.details().and_then(Value::as_object).expect("details");
        assert_eq!(
            details.get("field").and_then(Value::as_str),
            Some("description")
        );
    }
}
