use axum_restaurant_api::{
    db::create_pool, dto::auth::RegisterRequest, error::AppError, services::auth_service,
};

// Single test per binary; it truncates shared tables, so it must not run
// alongside other DB tests in the same process.
#[tokio::test]
async fn registration_validates_and_rejects_duplicates() -> anyhow::Result<()> {
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

    let pool = create_pool(&database_url).await?;
    sqlx::migrate!("./migrations").run(&pool).await?;
    sqlx::query(
        "TRUNCATE TABLE order_items, orders, addresses, audit_logs, products, categories, users RESTART IDENTITY CASCADE",
    )
    .execute(&pool)
    .await?;

    let err = auth_service::register_user(
        &pool,
        RegisterRequest {
            username: "bob".into(),
            email: "bob@example.com".into(),
            password: "secret1".into(),
            confirm_password: "different".into(),
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::BadRequest(_)));

    let created = auth_service::register_user(
        &pool,
        RegisterRequest {
            username: "bob".into(),
            email: "Bob@Example.com".into(),
            password: "secret1".into(),
            confirm_password: "secret1".into(),
        },
    )
    .await?
    .data
    .unwrap();
    assert_eq!(created.email, "bob@example.com");
    assert!(!created.is_admin);

    let err = auth_service::register_user(
        &pool,
        RegisterRequest {
            username: "bobby".into(),
            email: "bob@example.com".into(),
            password: "secret1".into(),
            confirm_password: "secret1".into(),
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::BadRequest(_)));

    Ok(())
}
