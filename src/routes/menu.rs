use axum::{
    Json, Router,
    extract::{Path, State},
    routing::get,
};
use uuid::Uuid;

use crate::{
    dto::catalog::{CategoryList, ProductList},
    error::AppResult,
    middleware::auth::AuthUser,
    response::ApiResponse,
    services::{category_service, product_service},
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/categories", get(list_categories))
        .route("/categories/{id}/products", get(list_category_products))
}

#[utoipa::path(
    get,
    path = "/api/menu/categories",
    responses(
        (status = 200, description = "Active menu categories", body = ApiResponse<CategoryList>)
    ),
    security(("bearer_auth" = [])),
    tag = "Menu"
)]
pub async fn list_categories(
    State(state): State<AppState>,
    _user: AuthUser,
) -> AppResult<Json<ApiResponse<CategoryList>>> {
    let resp = category_service::list_active(&state).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/menu/categories/{id}/products",
    params(
        ("id" = Uuid, Path, description = "Category ID")
    ),
    responses(
        (status = 200, description = "Active products in the category", body = ApiResponse<ProductList>)
    ),
    security(("bearer_auth" = [])),
    tag = "Menu"
)]
pub async fn list_category_products(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<ProductList>>> {
    let resp = product_service::list_active_by_category(&state, id).await?;
    Ok(Json(resp))
}
