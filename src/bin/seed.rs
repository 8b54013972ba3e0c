use argon2::{
    Argon2, PasswordHasher,
    password_hash::{SaltString, rand_core::OsRng},
};
use rust_decimal::Decimal;
use uuid::Uuid;

use axum_restaurant_api::{config::AppConfig, db::create_pool};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = AppConfig::from_env()?;

    let pool = create_pool(&config.database_url).await?;
    // Ensure migrations are applied.
    sqlx::migrate!("./migrations").run(&pool).await?;

    let admin_id = ensure_user(&pool, "admin", "admin@example.com", "admin123", true).await?;
    seed_menu(&pool).await?;

    println!("Seed completed. Admin ID: {admin_id}");
    Ok(())
}

async fn ensure_user(
    pool: &sqlx::PgPool,
    username: &str,
    email: &str,
    password: &str,
    is_admin: bool,
) -> anyhow::Result<Uuid> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();
    let password_hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!(e.to_string()))?
        .to_string();

    let row: Option<(Uuid,)> = sqlx::query_as(
        r#"
        INSERT INTO users (id, username, email, password_hash, is_admin)
        VALUES ($1, $2, $3, $4, $5)
        ON CONFLICT (email) DO UPDATE SET is_admin = EXCLUDED.is_admin
        RETURNING id
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(username)
    .bind(email)
    .bind(password_hash)
    .bind(is_admin)
    .fetch_optional(pool)
    .await?;

    let user_id = match row {
        Some((id,)) => id,
        None => {
            let existing: (Uuid,) = sqlx::query_as("SELECT id FROM users WHERE email = $1")
                .bind(email)
                .fetch_one(pool)
                .await?;
            existing.0
        }
    };

    println!("Ensured user {email} (admin={is_admin})");
    Ok(user_id)
}

async fn seed_menu(pool: &sqlx::PgPool) -> anyhow::Result<()> {
    let categories = vec![
        ("Burgers", Some("Grilled burgers and combos")),
        ("Pizzas", Some("Traditional and special pizzas")),
        ("Drinks", Some("Sodas, juices and water")),
        ("Desserts", Some("Sweets to finish the meal")),
        ("Portions", Some("Portions to share")),
    ];

    for (name, description) in &categories {
        sqlx::query(
            r#"
            INSERT INTO categories (id, name, description)
            VALUES ($1, $2, $3)
            ON CONFLICT (name) DO NOTHING
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(name)
        .bind(description)
        .execute(pool)
        .await?;
    }

    let products: Vec<(&str, &str, Decimal, &str)> = vec![
        (
            "X-Burger",
            "Beef patty, cheese, lettuce and tomato",
            Decimal::new(1590, 2),
            "Burgers",
        ),
        (
            "X-Bacon",
            "Beef patty, bacon, cheese and barbecue sauce",
            Decimal::new(1890, 2),
            "Burgers",
        ),
        (
            "Margherita Pizza",
            "Mozzarella, tomato and basil",
            Decimal::new(3990, 2),
            "Pizzas",
        ),
        (
            "Pepperoni Pizza",
            "Mozzarella and pepperoni",
            Decimal::new(4490, 2),
            "Pizzas",
        ),
        ("Soda Can", "350ml can", Decimal::new(590, 2), "Drinks"),
        (
            "Orange Juice",
            "Freshly squeezed, 500ml",
            Decimal::new(890, 2),
            "Drinks",
        ),
        (
            "Chocolate Pudding",
            "Homemade pudding slice",
            Decimal::new(990, 2),
            "Desserts",
        ),
        (
            "French Fries",
            "Portion for two, with cheddar",
            Decimal::new(1990, 2),
            "Portions",
        ),
    ];

    for (name, description, price, category) in products {
        sqlx::query(
            r#"
            INSERT INTO products (id, name, description, price, category_id)
            SELECT $1, $2, $3, $4, c.id FROM categories c
            WHERE c.name = $5
              AND NOT EXISTS (SELECT 1 FROM products p WHERE p.name = $2)
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(name)
        .bind(description)
        .bind(price)
        .bind(category)
        .execute(pool)
        .await?;
    }

    println!("Seeded menu");
    Ok(())
}
