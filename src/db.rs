use sqlx::PgPool;
use sqlx::migrate::Migrator;
use sqlx::postgres::PgPoolOptions;

use crate::auth::password;
use crate::errors::AppError;
use crate::models::user::{self, NewUser, Role};

pub type DbPool = PgPool;

pub static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

pub async fn init_pool(database_url: &str, max_connections: u32) -> Result<DbPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(max_connections)
        .connect(database_url)
        .await
}

pub async fn run_migrations(pool: &PgPool) -> Result<(), AppError> {
    MIGRATOR.run(pool).await?;
    log::info!("Database migrations complete");
    Ok(())
}

/// Create the `admin` account on an empty database. Returns true if a user was created.
pub async fn seed_admin(pool: &PgPool, admin_password: &str) -> Result<bool, AppError> {
    let existing = user::count(pool).await?;
    if existing > 0 {
        log::info!("Database already has {existing} users, skipping admin seed");
        return Ok(false);
    }

    let hash = password::hash_password(admin_password)?;
    let admin = NewUser {
        username: "admin".to_string(),
        password: hash,
        display_name: "Administrator".to_string(),
        department: String::new(),
        plant: String::new(),
        role: Role::Admin,
    };
    let created = user::create(pool, &admin).await?.is_some();
    if created {
        log::info!("Seeded default admin user");
    }
    Ok(created)
}
