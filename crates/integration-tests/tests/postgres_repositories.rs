//! `PostgreSQL` repository tests.
//!
//! These run against a live database and are ignored by default:
//!
//! ```bash
//! HELPDESK_TEST_DATABASE_URL=postgres://localhost/helpdesk_test \
//!     cargo test -p helpdesk-integration-tests -- --ignored
//! ```

#![allow(clippy::unwrap_used, clippy::expect_used)]

use chrono::Utc;
use sqlx::PgPool;

use helpdesk_core::{Email, TicketStatus, UserId, UserRole};
use helpdesk_server::db::postgres::{PgProfileRepository, PgTicketRepository, PgUserRepository};
use helpdesk_server::db::{ProfileRepository, RepositoryError, TicketRepository, UserRepository};
use helpdesk_server::models::{NewTicket, NewUser, ProfileUpdate};

async fn pool() -> PgPool {
    let url = std::env::var("HELPDESK_TEST_DATABASE_URL")
        .expect("HELPDESK_TEST_DATABASE_URL must be set");
    let pool = PgPool::connect(&url).await.expect("connect");
    sqlx::migrate!("../server/migrations")
        .run(&pool)
        .await
        .expect("migrate");
    pool
}

fn unique_email() -> Email {
    Email::parse(&format!("pg-{}@powergrid.in", UserId::new())).unwrap()
}

// =============================================================================
// Users
// =============================================================================

#[tokio::test]
#[ignore = "Requires running database"]
async fn user_create_lookup_and_conflict() {
    let repo = PgUserRepository::new(pool().await);
    let email = unique_email();

    let user = repo
        .create(NewUser {
            name: "Pg User".to_string(),
            email: email.clone(),
            employee_id: Some("PG9001".to_string()),
            role: UserRole::Support,
            password_hash: Some("hash".to_string()),
        })
        .await
        .unwrap();

    let (found, hash) = repo
        .get_with_password_by_email(&email)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(found.id, user.id);
    assert_eq!(found.role, UserRole::Support);
    assert_eq!(hash.as_deref(), Some("hash"));

    let duplicate = repo
        .create(NewUser {
            name: "Again".to_string(),
            email,
            employee_id: None,
            role: UserRole::Employee,
            password_hash: None,
        })
        .await;
    assert!(matches!(duplicate, Err(RepositoryError::Conflict(_))));

    assert!(repo.update_password(user.id, "new-hash").await.unwrap());
    assert!(!repo.update_password(UserId::new(), "x").await.unwrap());
}

// =============================================================================
// Profiles and tickets
// =============================================================================

#[tokio::test]
#[ignore = "Requires running database"]
async fn profile_upsert_keeps_omitted_fields() {
    let repo = PgProfileRepository::new(pool().await);
    let uid = format!("pg-{}", UserId::new());

    repo.upsert(ProfileUpdate {
        uid: uid.clone(),
        phone: Some("111".to_string()),
        ..ProfileUpdate::default()
    })
    .await
    .unwrap();
    repo.upsert(ProfileUpdate {
        uid: uid.clone(),
        department: Some("Grid Ops".to_string()),
        ..ProfileUpdate::default()
    })
    .await
    .unwrap();

    let profile = repo.get(&uid).await.unwrap().unwrap();
    assert_eq!(profile.phone.as_deref(), Some("111"));
    assert_eq!(profile.department.as_deref(), Some("Grid Ops"));
}

#[tokio::test]
#[ignore = "Requires running database"]
async fn ticket_resolve_round_trip() {
    let repo = PgTicketRepository::new(pool().await);

    let ticket = repo
        .create(NewTicket {
            employee_email: unique_email(),
            employee_phone: None,
            subject: "Printer".to_string(),
            description: "Jammed".to_string(),
        })
        .await
        .unwrap();
    assert_eq!(ticket.status, TicketStatus::Open);

    let resolved = repo
        .set_status(ticket.id, TicketStatus::Resolved, Some(Utc::now()))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(resolved.status, TicketStatus::Resolved);
    assert!(resolved.resolved_at.is_some());

    let listed = repo.list(Some(TicketStatus::Resolved)).await.unwrap();
    assert!(listed.iter().any(|t| t.id == ticket.id));
}
