use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{get, patch},
};
use sea_orm::{ColumnTrait, Condition, EntityTrait, QueryFilter};
use tower_sessions::Session;

use crate::{
    cart,
    dto::cart::{AddToCartRequest, CartCount, CartSummary, UpdateCartNoteRequest},
    entity::products::{Column as ProductCol, Entity as Products},
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    response::{ApiResponse, Meta},
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(show_cart).post(add_to_cart).delete(clear_cart))
        .route("/count", get(cart_count))
        .route("/{index}", patch(update_note).delete(remove_item))
}

#[utoipa::path(
    get,
    path = "/api/cart",
    responses(
        (status = 200, description = "Current cart with total", body = ApiResponse<CartSummary>)
    ),
    security(("bearer_auth" = [])),
    tag = "Cart"
)]
pub async fn show_cart(
    session: Session,
    _user: AuthUser,
) -> AppResult<Json<ApiResponse<CartSummary>>> {
    let cart = cart::load(&session).await?;
    let summary = CartSummary {
        total: cart.total(),
        count: cart.len(),
        items: cart.lines().to_vec(),
    };
    Ok(Json(ApiResponse::success("OK", summary, Some(Meta::empty()))))
}

#[utoipa::path(
    post,
    path = "/api/cart",
    request_body = AddToCartRequest,
    responses(
        (status = 200, description = "Product added or note replaced", body = ApiResponse<CartCount>),
        (status = 400, description = "Product unavailable")
    ),
    security(("bearer_auth" = [])),
    tag = "Cart"
)]
pub async fn add_to_cart(
    State(state): State<AppState>,
    session: Session,
    _user: AuthUser,
    Json(payload): Json<AddToCartRequest>,
) -> AppResult<Json<ApiResponse<CartCount>>> {
    // Only active products can enter the cart; deactivated ones vanish from
    // the menu and from checkout at the same time.
    let product = Products::find()
        .filter(
            Condition::all()
                .add(ProductCol::Id.eq(payload.product_id))
                .add(ProductCol::Active.eq(true)),
        )
        .one(&state.orm)
        .await?
        .ok_or_else(|| AppError::BadRequest("Product not available".into()))?;

    let note = payload
        .note
        .as_deref()
        .map(str::trim)
        .unwrap_or_default()
        .to_string();

    let mut cart = cart::load(&session).await?;
    let added = cart.add_or_update(product.id, product.name.clone(), product.price, note);
    cart::store(&session, &cart).await?;

    let message = if added {
        format!("{} added to cart", product.name)
    } else {
        format!("Note updated for {}", product.name)
    };
    Ok(Json(ApiResponse::success(
        message,
        CartCount { count: cart.len() },
        Some(Meta::empty()),
    )))
}

#[utoipa::path(
    patch,
    path = "/api/cart/{index}",
    params(
        ("index" = usize, Path, description = "Zero-based cart line index")
    ),
    request_body = UpdateCartNoteRequest,
    responses(
        (status = 200, description = "Note replaced", body = ApiResponse<CartSummary>),
        (status = 404, description = "No cart line at that index")
    ),
    security(("bearer_auth" = [])),
    tag = "Cart"
)]
pub async fn update_note(
    session: Session,
    _user: AuthUser,
    Path(index): Path<usize>,
    Json(payload): Json<UpdateCartNoteRequest>,
) -> AppResult<Json<ApiResponse<CartSummary>>> {
    let note = payload
        .note
        .as_deref()
        .map(str::trim)
        .unwrap_or_default()
        .to_string();

    let mut cart = cart::load(&session).await?;
    if !cart.update_note(index, note) {
        return Err(AppError::NotFound);
    }
    cart::store(&session, &cart).await?;

    let summary = CartSummary {
        total: cart.total(),
        count: cart.len(),
        items: cart.lines().to_vec(),
    };
    Ok(Json(ApiResponse::success(
        "Note updated",
        summary,
        Some(Meta::empty()),
    )))
}

#[utoipa::path(
    delete,
    path = "/api/cart/{index}",
    params(
        ("index" = usize, Path, description = "Zero-based cart line index")
    ),
    responses(
        (status = 200, description = "Line removed", body = ApiResponse<CartSummary>),
        (status = 404, description = "No cart line at that index")
    ),
    security(("bearer_auth" = [])),
    tag = "Cart"
)]
pub async fn remove_item(
    session: Session,
    _user: AuthUser,
    Path(index): Path<usize>,
) -> AppResult<Json<ApiResponse<CartSummary>>> {
    let mut cart = cart::load(&session).await?;
    let removed = cart.remove(index).ok_or(AppError::NotFound)?;
    cart::store(&session, &cart).await?;

    let summary = CartSummary {
        total: cart.total(),
        count: cart.len(),
        items: cart.lines().to_vec(),
    };
    Ok(Json(ApiResponse::success(
        format!("{} removed from cart", removed.name),
        summary,
        Some(Meta::empty()),
    )))
}

#[utoipa::path(
    delete,
    path = "/api/cart",
    responses(
        (status = 200, description = "Cart emptied", body = ApiResponse<CartCount>)
    ),
    security(("bearer_auth" = [])),
    tag = "Cart"
)]
pub async fn clear_cart(
    session: Session,
    _user: AuthUser,
) -> AppResult<Json<ApiResponse<CartCount>>> {
    cart::clear(&session).await?;
    Ok(Json(ApiResponse::success(
        "Cart cleared",
        CartCount { count: 0 },
        Some(Meta::empty()),
    )))
}

#[utoipa::path(
    get,
    path = "/api/cart/count",
    responses(
        (status = 200, description = "Number of cart lines", body = ApiResponse<CartCount>)
    ),
    security(("bearer_auth" = [])),
    tag = "Cart"
)]
pub async fn cart_count(
    session: Session,
    _user: AuthUser,
) -> AppResult<Json<ApiResponse<CartCount>>> {
    let cart = cart::load(&session).await?;
    Ok(Json(ApiResponse::success(
        "OK",
        CartCount { count: cart.len() },
        Some(Meta::empty()),
    )))
}
