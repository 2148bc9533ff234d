//! PostgreSQL integration tests
//!
//! These tests use a shared PostgreSQL container for efficiency.
//! Run with:
//!
//! ```bash
//! cargo test -p store --test postgres_integration -- --test-threads=1
//! ```
//!
//! `PostgresStore` implements all four repository traits, so each test
//! takes per-trait views (`&dyn UserStore`, …) to call them unambiguously,
//! the same shape the domain services consume.

use std::sync::Arc;

use chrono::{Duration, Utc};
use crypto::fingerprint;
use sqlx::PgPool;
use store::{
    NewOrder, NewReservation, NewTicket, NewUser, OrderStatus, OrderStore, PaymentStatus,
    PostgresStore, ReservationStore, Role, StoreError, SupportStore, TicketStatus, User, UserStore,
};
use testcontainers::{ContainerAsync, runners::AsyncRunner};
use testcontainers_modules::postgres::Postgres;
use tokio::sync::OnceCell;

/// Shared container info - container stays alive for all tests
struct ContainerInfo {
    #[allow(dead_code)] // Container must stay alive for tests
    container: ContainerAsync<Postgres>,
    connection_string: String,
}

/// Global shared container
static CONTAINER: OnceCell<Arc<ContainerInfo>> = OnceCell::const_new();

async fn get_container_info() -> Arc<ContainerInfo> {
    CONTAINER
        .get_or_init(|| async {
            let container = Postgres::default().start().await.unwrap();

            let host = container.get_host().await.unwrap();
            let port = container.get_host_port_ipv4(5432).await.unwrap();

            let connection_string =
                format!("postgres://postgres:postgres@{}:{}/postgres", host, port);

            // Create a temporary pool just for the schema
            let temp_pool = PgPool::connect(&connection_string).await.unwrap();

            sqlx::raw_sql(include_str!(
                "../../../migrations/001_create_booking_tables.sql"
            ))
            .execute(&temp_pool)
            .await
            .unwrap();

            temp_pool.close().await;

            Arc::new(ContainerInfo {
                container,
                connection_string,
            })
        })
        .await
        .clone()
}

/// Get a fresh store with its own pool and cleared tables
async fn get_test_store() -> PostgresStore {
    let info = get_container_info().await;

    let pool = sqlx::postgres::PgPoolOptions::new()
        .max_connections(5)
        .connect(&info.connection_string)
        .await
        .unwrap();

    sqlx::query("TRUNCATE TABLE reservations, support_tickets, orders, users")
        .execute(&pool)
        .await
        .unwrap();

    PostgresStore::new(pool)
}

async fn seed_user(users: &dyn UserStore, email: &str, role: Role) -> User {
    users
        .create(NewUser {
            email: email.to_string(),
            role,
        })
        .await
        .unwrap()
}

fn order_for(user: &User, cnpj: &str) -> NewOrder {
    NewOrder {
        user_id: user.id,
        venue_name: "ciphertext-venue".to_string(),
        description: "ciphertext-description".to_string(),
        cnpj: "ciphertext-cnpj".to_string(),
        phone: "ciphertext-phone".to_string(),
        cnpj_digest: fingerprint(cnpj),
        status: OrderStatus::Pending,
    }
}

fn ticket_for(user: &User, subject: &str, status: TicketStatus) -> NewTicket {
    NewTicket {
        user_id: user.id,
        user_email: user.email.clone(),
        subject: subject.to_string(),
        message: "please help".to_string(),
        status,
    }
}

#[tokio::test]
async fn user_roundtrip_by_id_and_email() {
    let store = get_test_store().await;
    let users: &dyn UserStore = &store;

    let user = seed_user(users, "alice@example.com", Role::Admin).await;

    let by_id = users.find_by_id(user.id).await.unwrap().unwrap();
    assert_eq!(by_id, user);

    let by_email = users
        .find_by_email("alice@example.com")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(by_email.role, Role::Admin);

    assert!(
        users
            .find_by_email("nobody@example.com")
            .await
            .unwrap()
            .is_none()
    );
}

#[tokio::test]
async fn order_create_and_tax_id_claim() {
    let store = get_test_store().await;
    let users: &dyn UserStore = &store;
    let orders: &dyn OrderStore = &store;

    let user = seed_user(users, "owner@example.com", Role::User).await;

    let created = orders
        .create(order_for(&user, "11.222.333/0001-44"))
        .await
        .unwrap();
    assert_eq!(created.status, OrderStatus::Pending);

    let claim = orders
        .find_by_cnpj("11.222.333/0001-44")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(claim.user_id, user.id);
    assert_eq!(claim.cnpj_digest, fingerprint("11.222.333/0001-44"));

    assert!(
        orders
            .find_by_cnpj("99.888.777/0001-00")
            .await
            .unwrap()
            .is_none()
    );

    let reloaded = orders.find_by_id(created.id).await.unwrap().unwrap();
    assert_eq!(reloaded, created);
}

#[tokio::test]
async fn unique_index_rejects_duplicate_tax_id() {
    let store = get_test_store().await;
    let users: &dyn UserStore = &store;
    let orders: &dyn OrderStore = &store;

    let first = seed_user(users, "first@example.com", Role::User).await;
    let second = seed_user(users, "second@example.com", Role::User).await;

    orders
        .create(order_for(&first, "11.222.333/0001-44"))
        .await
        .unwrap();

    let err = orders
        .create(order_for(&second, "11.222.333/0001-44"))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        StoreError::UniqueViolation { ref constraint } if constraint == "orders_cnpj_digest_key"
    ));
}

#[tokio::test]
async fn partial_index_allows_new_order_after_terminal_status() {
    let store = get_test_store().await;
    let users: &dyn UserStore = &store;
    let orders: &dyn OrderStore = &store;

    let user = seed_user(users, "retry@example.com", Role::User).await;

    let first = orders
        .create(order_for(&user, "11.222.333/0001-44"))
        .await
        .unwrap();

    // A second pending order for the same user trips the partial index.
    let err = orders
        .create(order_for(&user, "55.666.777/0001-88"))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        StoreError::UniqueViolation { ref constraint }
            if constraint == "orders_one_pending_per_user_key"
    ));

    // Once the first order is terminal the same user may file again.
    orders
        .update_status(first.id, OrderStatus::Rejected)
        .await
        .unwrap();
    let second = orders
        .create(order_for(&user, "55.666.777/0001-88"))
        .await
        .unwrap();

    let latest = orders.find_by_user(user.id).await.unwrap().unwrap();
    assert_eq!(latest.id, second.id);

    assert_eq!(orders.find_all().await.unwrap().len(), 2);
}

#[tokio::test]
async fn tickets_are_returned_newest_first() {
    let store = get_test_store().await;
    let users: &dyn UserStore = &store;
    let tickets: &dyn SupportStore = &store;

    let user = seed_user(users, "needy@example.com", Role::User).await;
    let other = seed_user(users, "other@example.com", Role::User).await;

    let mut ids = Vec::new();
    for subject in ["first", "second"] {
        ids.push(
            tickets
                .create(ticket_for(&user, subject, TicketStatus::Open))
                .await
                .unwrap()
                .id,
        );
    }
    tickets
        .create(ticket_for(&other, "unrelated", TicketStatus::Open))
        .await
        .unwrap();

    let latest = tickets.find_latest_by_user(user.id).await.unwrap().unwrap();
    assert_eq!(latest.id, ids[1]);

    let mine = tickets.find_by_user(user.id).await.unwrap();
    assert_eq!(
        mine.iter().map(|t| t.id).collect::<Vec<_>>(),
        vec![ids[1], ids[0]]
    );

    let all = tickets.find_all().await.unwrap();
    assert_eq!(all.len(), 3);
}

#[tokio::test]
async fn ticket_status_update_preserves_other_fields() {
    let store = get_test_store().await;
    let users: &dyn UserStore = &store;
    let tickets: &dyn SupportStore = &store;

    let user = seed_user(users, "ticket@example.com", Role::User).await;

    let created = tickets
        .create(ticket_for(&user, "broken net", TicketStatus::Closed))
        .await
        .unwrap();

    tickets
        .update_status(created.id, TicketStatus::Open)
        .await
        .unwrap();

    let reloaded = tickets.find_by_id(created.id).await.unwrap().unwrap();
    assert_eq!(reloaded.status, TicketStatus::Open);
    assert_eq!(reloaded.subject, created.subject);
    assert_eq!(reloaded.message, created.message);
    assert_eq!(reloaded.user_email, created.user_email);
}

#[tokio::test]
async fn reservation_admissibility_queries() {
    let store = get_test_store().await;
    let users: &dyn UserStore = &store;
    let reservations: &dyn ReservationStore = &store;

    let user = seed_user(users, "player@example.com", Role::User).await;
    let now = Utc::now();

    assert!(!reservations.has_active_confirmed(user.id).await.unwrap());
    assert!(
        reservations
            .last_confirmed_elapsed_end(user.id)
            .await
            .unwrap()
            .is_none()
    );

    // Elapsed confirmed reservations feed the closing-boundary lookup.
    for hours_ago in [30i64, 10] {
        reservations
            .create(NewReservation {
                user_id: user.id,
                start_time: now - Duration::hours(hours_ago + 1),
                end_time: now - Duration::hours(hours_ago),
                payment_status: PaymentStatus::Confirmed,
            })
            .await
            .unwrap();
    }
    // Pending payment never counts as active.
    reservations
        .create(NewReservation {
            user_id: user.id,
            start_time: now + Duration::hours(1),
            end_time: now + Duration::hours(2),
            payment_status: PaymentStatus::Pending,
        })
        .await
        .unwrap();

    assert!(!reservations.has_active_confirmed(user.id).await.unwrap());
    let last = reservations
        .last_confirmed_elapsed_end(user.id)
        .await
        .unwrap()
        .unwrap();
    assert!((last - (now - Duration::hours(10))).num_seconds().abs() < 1);

    // A confirmed future reservation flips the active check.
    reservations
        .create(NewReservation {
            user_id: user.id,
            start_time: now + Duration::hours(3),
            end_time: now + Duration::hours(4),
            payment_status: PaymentStatus::Confirmed,
        })
        .await
        .unwrap();
    assert!(reservations.has_active_confirmed(user.id).await.unwrap());
}
