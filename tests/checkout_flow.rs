use axum_restaurant_api::{
    cart::Cart,
    config::AppConfig,
    db::{create_orm_conn, create_pool, run_migrations},
    dto::{addresses::CreateAddressRequest, orders::CheckoutRequest},
    entity::{
        categories::ActiveModel as CategoryActive, products::ActiveModel as ProductActive,
        users::ActiveModel as UserActive,
    },
    error::AppError,
    middleware::auth::AuthUser,
    routes::admin::UpdateOrderStatusRequest,
    services::{
        address_service, admin_service, category_service, order_service, product_service,
    },
    state::AppState,
};
use rust_decimal::Decimal;
use sea_orm::ActiveValue::NotSet;
use sea_orm::{ActiveModelTrait, ConnectionTrait, Set, Statement};
use uuid::Uuid;

// Integration flow: customer manages addresses, fills the cart and checks out;
// admin moves the order through its lifecycle and manages the menu.
#[tokio::test]
async fn cart_checkout_and_admin_flow() -> anyhow::Result<()> {
    // Allow skipping when no DB is configured in the environment.
    let database_url = match std::env::var("TEST_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
    {
        Ok(url) => url,
        Err(_) => {
            eprintln!(
                "Skipping test: set TEST_DATABASE_URL or DATABASE_URL to run integration flow tests."
            );
            return Ok(());
        }
    };

    let state = setup_state(&database_url).await?;

    let customer_id = create_user(&state, "ana", "ana@example.com", false).await?;
    let admin_id = create_user(&state, "admin", "admin@example.com", true).await?;

    let customer = AuthUser {
        user_id: customer_id,
        is_admin: false,
    };
    let admin = AuthUser {
        user_id: admin_id,
        is_admin: true,
    };

    let category = CategoryActive {
        id: Set(Uuid::new_v4()),
        name: Set("Burgers".into()),
        description: Set(None),
        active: Set(true),
        created_at: NotSet,
        updated_at: NotSet,
    }
    .insert(&state.orm)
    .await?;

    let burger = create_product(&state, category.id, "X-Burger", Decimal::new(1590, 2)).await?;
    let soda = create_product(&state, category.id, "Soda Can", Decimal::new(590, 2)).await?;

    // First address becomes principal automatically.
    let first = address_service::add_address(
        &state,
        &customer,
        CreateAddressRequest {
            postal_code: "15360-000".into(),
            street: "Rua A".into(),
            number: "10".into(),
            complement: None,
            neighborhood: "Centro".into(),
        },
    )
    .await?
    .data
    .unwrap();
    assert!(first.principal);
    assert_eq!(first.city, "Ubarana");
    assert_eq!(first.state, "SP");

    let second = address_service::add_address(
        &state,
        &customer,
        CreateAddressRequest {
            postal_code: "15360-001".into(),
            street: "Rua B".into(),
            number: "22".into(),
            complement: Some("Apt 3".into()),
            neighborhood: "Jardim".into(),
        },
    )
    .await?
    .data
    .unwrap();
    assert!(!second.principal);

    // Exactly one principal at a time.
    address_service::set_principal(&state, &customer, second.id).await?;
    let addresses = address_service::list_addresses(&state, &customer)
        .await?
        .data
        .unwrap()
        .items;
    let principals: Vec<_> = addresses.iter().filter(|a| a.principal).collect();
    assert_eq!(principals.len(), 1);
    assert_eq!(principals[0].id, second.id);

    // Checkout with an empty cart is refused.
    let empty = Cart::default();
    let err = order_service::place_order(
        &state,
        &customer,
        &empty,
        CheckoutRequest {
            payment_method: "pix".into(),
            change_for: None,
            address_id: second.id,
            note: None,
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::BadRequest(_)));

    let mut cart = Cart::default();
    cart.add_or_update(burger, "X-Burger", Decimal::new(1590, 2), "no onions");
    cart.add_or_update(soda, "Soda Can", Decimal::new(590, 2), "");

    // Cash needs change covering the total.
    let err = order_service::place_order(
        &state,
        &customer,
        &cart,
        CheckoutRequest {
            payment_method: "cash".into(),
            change_for: Some(Decimal::new(1000, 2)),
            address_id: second.id,
            note: None,
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::BadRequest(_)));

    // Pix checkout stores zero change and a pending order.
    let placed = order_service::place_order(
        &state,
        &customer,
        &cart,
        CheckoutRequest {
            payment_method: "pix".into(),
            change_for: None,
            address_id: second.id,
            note: Some("ring the bell".into()),
        },
    )
    .await?
    .data
    .unwrap();
    assert_eq!(placed.order.status, "pending");
    assert_eq!(placed.order.total, Decimal::new(2180, 2));
    assert_eq!(placed.order.change_for, Decimal::ZERO);
    assert_eq!(placed.items.len(), 2);
    assert!(placed.items.iter().all(|i| i.quantity == 1));
    assert!(
        placed
            .items
            .iter()
            .any(|i| i.product_id == burger && i.note.as_deref() == Some("no onions"))
    );

    // The customer sees their own order; the order detail is owner-scoped.
    let own = order_service::get_order(&state, &customer, placed.order.id)
        .await?
        .data
        .unwrap();
    assert_eq!(own.order.id, placed.order.id);

    // Admin lifecycle: only the five labels are accepted and only for admins.
    let err = admin_service::update_order_status(
        &state,
        &customer,
        placed.order.id,
        UpdateOrderStatusRequest {
            status: "preparing".into(),
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::Forbidden));

    let err = admin_service::update_order_status(
        &state,
        &admin,
        placed.order.id,
        UpdateOrderStatusRequest {
            status: "shipped".into(),
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::BadRequest(_)));

    let updated = admin_service::update_order_status(
        &state,
        &admin,
        placed.order.id,
        UpdateOrderStatusRequest {
            status: "preparing".into(),
        },
    )
    .await?
    .data
    .unwrap();
    assert_eq!(updated.status, "preparing");

    // Removing the principal address never promotes another one.
    address_service::remove_address(&state, &customer, second.id).await?;
    let remaining = address_service::list_addresses(&state, &customer)
        .await?
        .data
        .unwrap()
        .items;
    assert_eq!(remaining.len(), 1);
    assert!(!remaining[0].principal);

    // A category cannot be deactivated while it still has active products.
    let err = category_service::toggle_category(&state, &admin, category.id)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::BadRequest(_)));

    product_service::toggle_product(&state, &admin, burger).await?;
    product_service::toggle_product(&state, &admin, soda).await?;
    let toggled = category_service::toggle_category(&state, &admin, category.id)
        .await?
        .data
        .unwrap();
    assert!(!toggled.active);

    Ok(())
}

async fn setup_state(database_url: &str) -> anyhow::Result<AppState> {
    let pool = create_pool(database_url).await?;
    let orm = create_orm_conn(database_url).await?;
    run_migrations(&orm).await?;

    // Clean tables between runs
    let backend = orm.get_database_backend();
    orm.execute(Statement::from_string(
        backend,
        "TRUNCATE TABLE order_items, orders, addresses, audit_logs, products, categories, users RESTART IDENTITY CASCADE",
    ))
    .await?;

    Ok(AppState {
        pool,
        orm,
        config: AppConfig {
            database_url: database_url.to_string(),
            host: "127.0.0.1".to_string(),
            port: 0,
            upload_dir: std::env::temp_dir()
                .join("restaurant-test-uploads")
                .to_string_lossy()
                .into_owned(),
        },
    })
}

async fn create_user(
    state: &AppState,
    username: &str,
    email: &str,
    is_admin: bool,
) -> anyhow::Result<Uuid> {
    let user = UserActive {
        id: Set(Uuid::new_v4()),
        username: Set(username.to_string()),
        email: Set(email.to_string()),
        password_hash: Set("dummy".into()),
        is_admin: Set(is_admin),
        created_at: NotSet,
        updated_at: NotSet,
    }
    .insert(&state.orm)
    .await?;

    Ok(user.id)
}

async fn create_product(
    state: &AppState,
    category_id: Uuid,
    name: &str,
    price: Decimal,
) -> anyhow::Result<Uuid> {
    let product = ProductActive {
        id: Set(Uuid::new_v4()),
        name: Set(name.to_string()),
        description: Set(None),
        price: Set(price),
        image: Set(None),
        active: Set(true),
        category_id: Set(category_id),
        created_at: NotSet,
    }
    .insert(&state.orm)
    .await?;

    Ok(product.id)
}
