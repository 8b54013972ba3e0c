use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::ActiveValue::NotSet;
use sea_orm::{ActiveModelTrait, ColumnTrait, Condition, EntityTrait, QueryFilter, QueryOrder, Set};
use uuid::Uuid;

use crate::{
    audit::log_audit,
    dto::catalog::ProductList,
    entity::{
        categories::Entity as Categories,
        products::{
            ActiveModel as ProductActive, Column as ProductCol, Entity as Products,
            Model as ProductModel,
        },
    },
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_admin},
    models::Product,
    response::{ApiResponse, Meta},
    routes::admin::ProductForm,
    state::AppState,
    upload,
};

/// Active products of one category, as shown on the menu.
pub async fn list_active_by_category(
    state: &AppState,
    category_id: Uuid,
) -> AppResult<ApiResponse<ProductList>> {
    let items = Products::find()
        .filter(
            Condition::all()
                .add(ProductCol::CategoryId.eq(category_id))
                .add(ProductCol::Active.eq(true)),
        )
        .order_by_asc(ProductCol::Name)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(product_from_entity)
        .collect();

    Ok(ApiResponse::success(
        "OK",
        ProductList { items },
        Some(Meta::empty()),
    ))
}

pub async fn list_all(state: &AppState, user: &AuthUser) -> AppResult<ApiResponse<ProductList>> {
    ensure_admin(user)?;
    let items = Products::find()
        .order_by_asc(ProductCol::Name)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(product_from_entity)
        .collect();

    Ok(ApiResponse::success(
        "Products",
        ProductList { items },
        Some(Meta::empty()),
    ))
}

pub async fn create_product(
    state: &AppState,
    user: &AuthUser,
    form: ProductForm,
) -> AppResult<ApiResponse<Product>> {
    ensure_admin(user)?;
    let (name, description, price, category_id) = validate_form(&form)?;

    Categories::find_by_id(category_id)
        .one(&state.orm)
        .await?
        .ok_or_else(|| AppError::BadRequest("Category not found".into()))?;

    let image = match &form.image {
        Some(upload) => Some(
            upload::save_image(&state.config.upload_dir, &upload.filename, &upload.bytes).await?,
        ),
        None => None,
    };

    let product = ProductActive {
        id: Set(Uuid::new_v4()),
        name: Set(name),
        description: Set(description),
        price: Set(price),
        image: Set(image),
        active: Set(true),
        category_id: Set(category_id),
        created_at: NotSet,
    }
    .insert(&state.orm)
    .await?;

    if let Err(err) = log_audit(
        &state.pool,
        Some(user.user_id),
        "product_create",
        Some("products"),
        Some(serde_json::json!({ "product_id": product.id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Product added",
        product_from_entity(product),
        Some(Meta::empty()),
    ))
}

pub async fn update_product(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    form: ProductForm,
) -> AppResult<ApiResponse<Product>> {
    ensure_admin(user)?;
    let (name, description, price, category_id) = validate_form(&form)?;

    let existing = Products::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;

    Categories::find_by_id(category_id)
        .one(&state.orm)
        .await?
        .ok_or_else(|| AppError::BadRequest("Category not found".into()))?;

    let old_image = existing.image.clone();
    let image = if form.remove_image {
        if let Some(old) = old_image.as_deref() {
            upload::delete_image(&state.config.upload_dir, old).await;
        }
        None
    } else if let Some(upload) = &form.image {
        if let Some(old) = old_image.as_deref() {
            upload::delete_image(&state.config.upload_dir, old).await;
        }
        Some(upload::save_image(&state.config.upload_dir, &upload.filename, &upload.bytes).await?)
    } else {
        old_image
    };

    let mut active: ProductActive = existing.into();
    active.name = Set(name);
    active.description = Set(description);
    active.price = Set(price);
    active.category_id = Set(category_id);
    active.image = Set(image);
    let product = active.update(&state.orm).await?;

    if let Err(err) = log_audit(
        &state.pool,
        Some(user.user_id),
        "product_update",
        Some("products"),
        Some(serde_json::json!({ "product_id": product.id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Product updated",
        product_from_entity(product),
        Some(Meta::empty()),
    ))
}

pub async fn toggle_product(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<Product>> {
    ensure_admin(user)?;

    let existing = Products::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;

    let next = !existing.active;
    let mut active: ProductActive = existing.into();
    active.active = Set(next);
    let product = active.update(&state.orm).await?;

    if let Err(err) = log_audit(
        &state.pool,
        Some(user.user_id),
        "product_toggle",
        Some("products"),
        Some(serde_json::json!({ "product_id": product.id, "active": product.active })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    let message = if product.active {
        "Product activated"
    } else {
        "Product deactivated"
    };
    Ok(ApiResponse::success(
        message,
        product_from_entity(product),
        Some(Meta::empty()),
    ))
}

fn validate_form(form: &ProductForm) -> AppResult<(String, Option<String>, Decimal, Uuid)> {
    let name = form.name.trim().to_string();
    if name.is_empty() {
        return Err(AppError::BadRequest("Name is required".into()));
    }
    if form.price <= Decimal::ZERO {
        return Err(AppError::BadRequest("Price must be greater than 0".into()));
    }
    let description = form
        .description
        .as_deref()
        .map(str::trim)
        .filter(|d| !d.is_empty())
        .map(str::to_string);
    Ok((name, description, form.price, form.category_id))
}

fn product_from_entity(model: ProductModel) -> Product {
    Product {
        id: model.id,
        name: model.name,
        description: model.description,
        price: model.price,
        image: model.image,
        active: model.active,
        category_id: model.category_id,
        created_at: model.created_at.with_timezone(&Utc),
    }
}
