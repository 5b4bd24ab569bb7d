//! Shared helpers for the integration tests.
//!
//! Database tests run under `#[sqlx::test(migrator = "kaizen::db::MIGRATOR")]`,
//! which hands each test a fresh, migrated Postgres database.

#![allow(dead_code)]

use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use sqlx::PgPool;

use kaizen::auth::password;
use kaizen::config::AppConfig;
use kaizen::models::kaizen::{self as kaizen_model, Kaizen, NewKaizen};
use kaizen::models::user::{self, NewUser, Role};

pub const TEST_PASSWORD: &str = "password123";

pub fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(y, m, d)
        .and_then(|date| date.and_hms_opt(h, min, 0))
        .expect("valid timestamp")
}

pub fn new_kaizen(department: &str, title: &str, cost_saving: Option<Decimal>) -> NewKaizen {
    NewKaizen {
        employee_name: "Aiko Tanaka".to_string(),
        employee_no: "E1001".to_string(),
        department: department.to_string(),
        plant: "P1".to_string(),
        category: "Safety".to_string(),
        title: title.to_string(),
        description: format!("{title} on line 3"),
        cost_saving,
        currency_rate: None,
        has_benefit: false,
        other_benefits: None,
        before_image: None,
        after_image: None,
        employee_image: None,
    }
}

pub async fn create_kaizen(pool: &PgPool, department: &str, submitted_at: NaiveDateTime) -> Kaizen {
    kaizen_model::create(pool, &new_kaizen(department, "Shadow board", None), None, submitted_at)
        .await
        .expect("create kaizen")
}

pub async fn create_kaizen_with_saving(
    pool: &PgPool,
    cost_saving: Option<Decimal>,
    submitted_at: NaiveDateTime,
) -> Kaizen {
    kaizen_model::create(pool, &new_kaizen("Assembly", "Saving", cost_saving), None, submitted_at)
        .await
        .expect("create kaizen")
}

pub async fn create_user(pool: &PgPool, username: &str, role: Role, department: &str) -> i64 {
    let new = NewUser {
        username: username.to_string(),
        password: password::hash_password(TEST_PASSWORD).expect("hash"),
        display_name: format!("{username} display"),
        department: department.to_string(),
        plant: "P1".to_string(),
        role,
    };
    user::create(pool, &new)
        .await
        .expect("create user")
        .expect("username free")
}

pub fn test_config() -> AppConfig {
    AppConfig::from_lookup(|key| match key {
        "DATABASE_URL" => Some("postgres://unused".to_string()),
        _ => None,
    })
    .expect("config")
}
