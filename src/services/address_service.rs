use chrono::Utc;
use sea_orm::ActiveValue::NotSet;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set, TransactionTrait,
};
use uuid::Uuid;

use crate::{
    audit::log_audit,
    dto::addresses::{AddressList, CreateAddressRequest},
    entity::addresses::{
        ActiveModel as AddressActive, Column as AddressCol, Entity as Addresses,
        Model as AddressModel,
    },
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_customer},
    models::Address,
    response::{ApiResponse, Meta},
    state::AppState,
};

// The restaurant only delivers inside its own town.
pub const DELIVERY_CITY: &str = "Ubarana";
pub const DELIVERY_STATE: &str = "SP";

pub async fn list_addresses(
    state: &AppState,
    user: &AuthUser,
) -> AppResult<ApiResponse<AddressList>> {
    ensure_customer(user)?;
    let items = Addresses::find()
        .filter(AddressCol::UserId.eq(user.user_id))
        .order_by_desc(AddressCol::Principal)
        .order_by_desc(AddressCol::CreatedAt)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(address_from_entity)
        .collect();

    Ok(ApiResponse::success(
        "OK",
        AddressList { items },
        Some(Meta::empty()),
    ))
}

/// The user's first address automatically becomes the principal one.
pub async fn add_address(
    state: &AppState,
    user: &AuthUser,
    payload: CreateAddressRequest,
) -> AppResult<ApiResponse<Address>> {
    ensure_customer(user)?;

    let postal_code = payload.postal_code.trim().to_string();
    let street = payload.street.trim().to_string();
    let number = payload.number.trim().to_string();
    let neighborhood = payload.neighborhood.trim().to_string();
    let complement = payload
        .complement
        .as_deref()
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .map(str::to_string);

    if postal_code.is_empty() || street.is_empty() || number.is_empty() || neighborhood.is_empty()
    {
        return Err(AppError::BadRequest(
            "Postal code, street, number and neighborhood are required".into(),
        ));
    }

    // Count and insert share a transaction so two racing first-adds cannot
    // both come out principal.
    let txn = state.orm.begin().await?;

    let existing = Addresses::find()
        .filter(AddressCol::UserId.eq(user.user_id))
        .count(&txn)
        .await?;

    let address = AddressActive {
        id: Set(Uuid::new_v4()),
        user_id: Set(user.user_id),
        postal_code: Set(postal_code),
        street: Set(street),
        number: Set(number),
        complement: Set(complement),
        neighborhood: Set(neighborhood),
        city: Set(DELIVERY_CITY.to_string()),
        state: Set(DELIVERY_STATE.to_string()),
        principal: Set(existing == 0),
        created_at: NotSet,
    }
    .insert(&txn)
    .await?;

    txn.commit().await?;

    if let Err(err) = log_audit(
        &state.pool,
        Some(user.user_id),
        "address_add",
        Some("addresses"),
        Some(serde_json::json!({ "address_id": address.id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Address added",
        address_from_entity(address),
        Some(Meta::empty()),
    ))
}

/// Clear every principal flag for the user and set the target, in one
/// transaction so there is never a window with two principal addresses.
pub async fn set_principal(
    state: &AppState,
    user: &AuthUser,
    address_id: Uuid,
) -> AppResult<ApiResponse<Address>> {
    ensure_customer(user)?;

    let txn = state.orm.begin().await?;

    let target = Addresses::find()
        .filter(
            Condition::all()
                .add(AddressCol::Id.eq(address_id))
                .add(AddressCol::UserId.eq(user.user_id)),
        )
        .one(&txn)
        .await?
        .ok_or(AppError::NotFound)?;

    Addresses::update_many()
        .col_expr(AddressCol::Principal, Expr::value(false))
        .filter(AddressCol::UserId.eq(user.user_id))
        .exec(&txn)
        .await?;

    let mut active: AddressActive = target.into();
    active.principal = Set(true);
    let updated = active.update(&txn).await?;

    txn.commit().await?;

    if let Err(err) = log_audit(
        &state.pool,
        Some(user.user_id),
        "address_set_principal",
        Some("addresses"),
        Some(serde_json::json!({ "address_id": updated.id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Principal address set",
        address_from_entity(updated),
        Some(Meta::empty()),
    ))
}

/// Removing the principal address leaves the user without one; no other
/// address is promoted.
pub async fn remove_address(
    state: &AppState,
    user: &AuthUser,
    address_id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    ensure_customer(user)?;

    let result = Addresses::delete_many()
        .filter(
            Condition::all()
                .add(AddressCol::Id.eq(address_id))
                .add(AddressCol::UserId.eq(user.user_id)),
        )
        .exec(&state.orm)
        .await?;

    if result.rows_affected == 0 {
        return Err(AppError::NotFound);
    }

    if let Err(err) = log_audit(
        &state.pool,
        Some(user.user_id),
        "address_remove",
        Some("addresses"),
        Some(serde_json::json!({ "address_id": address_id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Address removed",
        serde_json::json!({}),
        Some(Meta::empty()),
    ))
}

fn address_from_entity(model: AddressModel) -> Address {
    Address {
        id: model.id,
        user_id: model.user_id,
        postal_code: model.postal_code,
        street: model.street,
        number: model.number,
        complement: model.complement,
        neighborhood: model.neighborhood,
        city: model.city,
        state: model.state,
        principal: model.principal,
        created_at: model.created_at.with_timezone(&Utc),
    }
}
