use chrono::Utc;
use sea_orm::ActiveValue::NotSet;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set,
};
use uuid::Uuid;

use crate::{
    audit::log_audit,
    dto::catalog::CategoryList,
    entity::{
        categories::{
            ActiveModel as CategoryActive, Column as CategoryCol, Entity as Categories,
            Model as CategoryModel,
        },
        products::{Column as ProductCol, Entity as Products},
    },
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_admin},
    models::Category,
    response::{ApiResponse, Meta},
    routes::admin::CategoryPayload,
    state::AppState,
};

pub const MIN_CATEGORY_NAME_LEN: usize = 2;

/// Active categories only; this is what the menu shows.
pub async fn list_active(state: &AppState) -> AppResult<ApiResponse<CategoryList>> {
    let items = Categories::find()
        .filter(CategoryCol::Active.eq(true))
        .order_by_asc(CategoryCol::Name)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(category_from_entity)
        .collect();

    Ok(ApiResponse::success(
        "OK",
        CategoryList { items },
        Some(Meta::empty()),
    ))
}

pub async fn list_all(state: &AppState, user: &AuthUser) -> AppResult<ApiResponse<CategoryList>> {
    ensure_admin(user)?;
    let items = Categories::find()
        .order_by_asc(CategoryCol::Name)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(category_from_entity)
        .collect();

    Ok(ApiResponse::success(
        "Categories",
        CategoryList { items },
        Some(Meta::empty()),
    ))
}

pub async fn create_category(
    state: &AppState,
    user: &AuthUser,
    payload: CategoryPayload,
) -> AppResult<ApiResponse<Category>> {
    ensure_admin(user)?;
    let (name, description) = validate_payload(&payload)?;

    let name_taken = Categories::find()
        .filter(CategoryCol::Name.eq(name.clone()))
        .count(&state.orm)
        .await?;
    if name_taken > 0 {
        return Err(AppError::BadRequest("Category name is already in use".into()));
    }

    let category = CategoryActive {
        id: Set(Uuid::new_v4()),
        name: Set(name),
        description: Set(description),
        active: Set(true),
        created_at: NotSet,
        updated_at: NotSet,
    }
    .insert(&state.orm)
    .await?;

    if let Err(err) = log_audit(
        &state.pool,
        Some(user.user_id),
        "category_create",
        Some("categories"),
        Some(serde_json::json!({ "category_id": category.id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Category added",
        category_from_entity(category),
        Some(Meta::empty()),
    ))
}

pub async fn update_category(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: CategoryPayload,
) -> AppResult<ApiResponse<Category>> {
    ensure_admin(user)?;
    let (name, description) = validate_payload(&payload)?;

    let existing = Categories::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;

    let name_taken = Categories::find()
        .filter(
            Condition::all()
                .add(CategoryCol::Name.eq(name.clone()))
                .add(CategoryCol::Id.ne(id)),
        )
        .count(&state.orm)
        .await?;
    if name_taken > 0 {
        return Err(AppError::BadRequest("Category name is already in use".into()));
    }

    let mut active: CategoryActive = existing.into();
    active.name = Set(name);
    active.description = Set(description);
    active.updated_at = Set(Utc::now().into());
    let category = active.update(&state.orm).await?;

    if let Err(err) = log_audit(
        &state.pool,
        Some(user.user_id),
        "category_update",
        Some("categories"),
        Some(serde_json::json!({ "category_id": category.id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Category updated",
        category_from_entity(category),
        Some(Meta::empty()),
    ))
}

/// Flip the active flag. Deactivation is refused while the category still owns
/// active products.
pub async fn toggle_category(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<Category>> {
    ensure_admin(user)?;

    let existing = Categories::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;

    if existing.active {
        let active_products = Products::find()
            .filter(
                Condition::all()
                    .add(ProductCol::CategoryId.eq(id))
                    .add(ProductCol::Active.eq(true)),
            )
            .count(&state.orm)
            .await?;
        if active_products > 0 {
            return Err(AppError::BadRequest(format!(
                "Cannot deactivate a category with {active_products} active product(s)"
            )));
        }
    }

    let next = !existing.active;
    let mut active: CategoryActive = existing.into();
    active.active = Set(next);
    active.updated_at = Set(Utc::now().into());
    let category = active.update(&state.orm).await?;

    if let Err(err) = log_audit(
        &state.pool,
        Some(user.user_id),
        "category_toggle",
        Some("categories"),
        Some(serde_json::json!({ "category_id": category.id, "active": category.active })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    let message = if category.active {
        "Category activated"
    } else {
        "Category deactivated"
    };
    Ok(ApiResponse::success(
        message,
        category_from_entity(category),
        Some(Meta::empty()),
    ))
}

fn validate_payload(payload: &CategoryPayload) -> AppResult<(String, Option<String>)> {
    let name = payload.name.trim().to_string();
    if name.is_empty() {
        return Err(AppError::BadRequest("Name is required".into()));
    }
    if name.len() < MIN_CATEGORY_NAME_LEN {
        return Err(AppError::BadRequest(
            "Name must be at least 2 characters".into(),
        ));
    }
    let description = payload
        .description
        .as_deref()
        .map(str::trim)
        .filter(|d| !d.is_empty())
        .map(str::to_string);
    Ok((name, description))
}

fn category_from_entity(model: CategoryModel) -> Category {
    Category {
        id: model.id,
        name: model.name,
        description: model.description,
        active: model.active,
        created_at: model.created_at.with_timezone(&Utc),
        updated_at: model.updated_at.with_timezone(&Utc),
    }
}
