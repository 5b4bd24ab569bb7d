//! User accounts: creation, lookup, deletion and the admin seed.

mod common;

use sqlx::PgPool;

use kaizen::auth::password;
use kaizen::db;
use kaizen::errors::AppError;
use kaizen::models::user::{self, NewUser, Role};
use common::*;

#[sqlx::test(migrator = "kaizen::db::MIGRATOR")]
async fn test_create_and_find_by_username(pool: PgPool) {
    let id = create_user(&pool, "eng_one", Role::Engineer, "Assembly").await;

    let found = user::find_by_username(&pool, " eng_one ")
        .await
        .expect("query")
        .expect("found");
    assert_eq!(found.id, id);
    assert_eq!(found.role(), Role::Engineer);
    assert_eq!(found.department, "Assembly");
    assert!(password::verify_password(TEST_PASSWORD, &found.password_hash).expect("verify"));

    let display = user::find_display_by_id(&pool, id).await.expect("query").expect("found");
    assert_eq!(display.role_label(), "Engineer");
}

#[sqlx::test(migrator = "kaizen::db::MIGRATOR")]
async fn test_duplicate_username_is_reported(pool: PgPool) {
    create_user(&pool, "dupe", Role::Submitter, "").await;

    let again = NewUser {
        username: "dupe".to_string(),
        password: "hash".to_string(),
        display_name: String::new(),
        department: String::new(),
        plant: String::new(),
        role: Role::Manager,
    };
    assert_eq!(user::create(&pool, &again).await.expect("insert"), None);
    assert_eq!(user::count(&pool).await.expect("count"), 1);
}

#[sqlx::test(migrator = "kaizen::db::MIGRATOR")]
async fn test_delete_user(pool: PgPool) {
    let id = create_user(&pool, "leaver", Role::Submitter, "").await;
    user::delete(&pool, id).await.expect("delete");
    assert!(matches!(user::delete(&pool, id).await, Err(AppError::NotFound)));
}

#[sqlx::test(migrator = "kaizen::db::MIGRATOR")]
async fn test_deleting_submitter_keeps_their_suggestions(pool: PgPool) {
    let id = create_user(&pool, "submitter", Role::Submitter, "").await;
    let k = kaizen::models::kaizen::create(
        &pool,
        &new_kaizen("Assembly", "Label racks", None),
        Some(id),
        at(2025, 1, 1, 9, 0),
    )
    .await
    .expect("create");

    user::delete(&pool, id).await.expect("delete");
    let k = kaizen::models::kaizen::get(&pool, k.id).await.expect("still there");
    assert_eq!(k.submitted_by, None);
}

#[sqlx::test(migrator = "kaizen::db::MIGRATOR")]
async fn test_admin_seed_runs_once(pool: PgPool) {
    assert!(db::seed_admin(&pool, "admin123").await.expect("seed"));
    assert!(!db::seed_admin(&pool, "admin123").await.expect("seed again"));

    let admin = user::find_by_username(&pool, "admin").await.expect("query").expect("admin");
    assert_eq!(admin.role(), Role::Admin);
}

#[sqlx::test(migrator = "kaizen::db::MIGRATOR")]
async fn test_listing_is_sorted_by_username(pool: PgPool) {
    create_user(&pool, "zoe", Role::Manager, "").await;
    create_user(&pool, "adam", Role::Engineer, "").await;

    let names: Vec<String> = user::find_all_display(&pool)
        .await
        .expect("list")
        .into_iter()
        .map(|u| u.username)
        .collect();
    assert_eq!(names, vec!["adam", "zoe"]);
}
