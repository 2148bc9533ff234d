//! PostgreSQL-backed store implementation.
//!
//! One struct implements all four repository traits over a shared
//! connection pool. Schema lives in `migrations/` at the workspace root;
//! the unique indexes there are the authoritative uniqueness arbiter.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use common::{OrderId, ReservationId, TicketId, UserId};
use crypto::fingerprint;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use uuid::Uuid;

use crate::error::{Result, StoreError};
use crate::order::{NewOrder, Order, OrderStatus, TaxIdClaim};
use crate::reservation::{NewReservation, Reservation};
use crate::store::{OrderStore, ReservationStore, SupportStore, UserStore};
use crate::support::{NewTicket, Support, TicketStatus};
use crate::user::{NewUser, User};

/// PostgreSQL store for users, orders, tickets, and reservations.
#[derive(Clone)]
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    /// Creates a store over an existing connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Gets a reference to the underlying connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    fn row_to_user(row: PgRow) -> Result<User> {
        Ok(User {
            id: UserId::from_uuid(row.try_get::<Uuid, _>("id")?),
            email: row.try_get("email")?,
            role: row.try_get::<String, _>("role")?.parse()?,
        })
    }

    fn row_to_order(row: PgRow) -> Result<Order> {
        Ok(Order {
            id: OrderId::from_uuid(row.try_get::<Uuid, _>("id")?),
            user_id: UserId::from_uuid(row.try_get::<Uuid, _>("user_id")?),
            venue_name: row.try_get("venue_name")?,
            description: row.try_get("description")?,
            cnpj: row.try_get("cnpj")?,
            phone: row.try_get("phone")?,
            cnpj_digest: row.try_get("cnpj_digest")?,
            status: row.try_get::<String, _>("status")?.parse()?,
        })
    }

    fn row_to_ticket(row: PgRow) -> Result<Support> {
        Ok(Support {
            id: TicketId::from_uuid(row.try_get::<Uuid, _>("id")?),
            user_id: UserId::from_uuid(row.try_get::<Uuid, _>("user_id")?),
            user_email: row.try_get("user_email")?,
            subject: row.try_get("subject")?,
            message: row.try_get("message")?,
            status: row.try_get::<String, _>("status")?.parse()?,
            created_at: row.try_get("created_at")?,
        })
    }
}

/// Maps unique-index rejections to [`StoreError::UniqueViolation`] so
/// callers see one error shape from both implementations.
fn map_write_err(e: sqlx::Error) -> StoreError {
    match &e {
        sqlx::Error::Database(db) if db.is_unique_violation() => StoreError::UniqueViolation {
            constraint: db.constraint().unwrap_or("unknown").to_string(),
        },
        _ => StoreError::Database(e),
    }
}

#[async_trait]
impl UserStore for PostgresStore {
    async fn create(&self, user: NewUser) -> Result<User> {
        let id = UserId::new();
        sqlx::query("INSERT INTO users (id, email, role) VALUES ($1, $2, $3)")
            .bind(id.as_uuid())
            .bind(&user.email)
            .bind(user.role.as_str())
            .execute(&self.pool)
            .await
            .map_err(map_write_err)?;

        Ok(User {
            id,
            email: user.email,
            role: user.role,
        })
    }

    async fn find_by_id(&self, id: UserId) -> Result<Option<User>> {
        let row = sqlx::query("SELECT id, email, role FROM users WHERE id = $1")
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await?;
        row.map(Self::row_to_user).transpose()
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        let row = sqlx::query("SELECT id, email, role FROM users WHERE email = $1")
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        row.map(Self::row_to_user).transpose()
    }
}

#[async_trait]
impl OrderStore for PostgresStore {
    async fn create(&self, order: NewOrder) -> Result<Order> {
        let id = OrderId::new();
        sqlx::query(
            r#"
            INSERT INTO orders (id, user_id, venue_name, description, cnpj, phone, cnpj_digest, status)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(id.as_uuid())
        .bind(order.user_id.as_uuid())
        .bind(&order.venue_name)
        .bind(&order.description)
        .bind(&order.cnpj)
        .bind(&order.phone)
        .bind(&order.cnpj_digest)
        .bind(order.status.as_str())
        .execute(&self.pool)
        .await
        .map_err(map_write_err)?;

        tracing::debug!(order_id = %id, user_id = %order.user_id, "order row inserted");
        Ok(Order {
            id,
            user_id: order.user_id,
            venue_name: order.venue_name,
            description: order.description,
            cnpj: order.cnpj,
            phone: order.phone,
            cnpj_digest: order.cnpj_digest,
            status: order.status,
        })
    }

    async fn find_by_cnpj(&self, cnpj: &str) -> Result<Option<TaxIdClaim>> {
        let row = sqlx::query("SELECT cnpj_digest, user_id FROM orders WHERE cnpj_digest = $1")
            .bind(fingerprint(cnpj))
            .fetch_optional(&self.pool)
            .await?;
        row.map(|row| {
            Ok(TaxIdClaim {
                cnpj_digest: row.try_get("cnpj_digest")?,
                user_id: UserId::from_uuid(row.try_get::<Uuid, _>("user_id")?),
            })
        })
        .transpose()
    }

    async fn find_by_user(&self, user_id: UserId) -> Result<Option<Order>> {
        let row = sqlx::query(
            "SELECT * FROM orders WHERE user_id = $1 ORDER BY created_at DESC LIMIT 1",
        )
        .bind(user_id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;
        row.map(Self::row_to_order).transpose()
    }

    async fn find_by_id(&self, id: OrderId) -> Result<Option<Order>> {
        let row = sqlx::query("SELECT * FROM orders WHERE id = $1")
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await?;
        row.map(Self::row_to_order).transpose()
    }

    async fn find_all(&self) -> Result<Vec<Order>> {
        let rows = sqlx::query("SELECT * FROM orders ORDER BY created_at")
            .fetch_all(&self.pool)
            .await?;
        rows.into_iter().map(Self::row_to_order).collect()
    }

    async fn update_status(&self, id: OrderId, status: OrderStatus) -> Result<()> {
        sqlx::query("UPDATE orders SET status = $2 WHERE id = $1")
            .bind(id.as_uuid())
            .bind(status.as_str())
            .execute(&self.pool)
            .await
            .map_err(map_write_err)?;
        tracing::debug!(order_id = %id, status = %status, "order status written");
        Ok(())
    }
}

#[async_trait]
impl SupportStore for PostgresStore {
    async fn create(&self, ticket: NewTicket) -> Result<Support> {
        let id = TicketId::new();
        let created_at: DateTime<Utc> = sqlx::query_scalar(
            r#"
            INSERT INTO support_tickets (id, user_id, user_email, subject, message, status)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING created_at
            "#,
        )
        .bind(id.as_uuid())
        .bind(ticket.user_id.as_uuid())
        .bind(&ticket.user_email)
        .bind(&ticket.subject)
        .bind(&ticket.message)
        .bind(ticket.status.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(map_write_err)?;

        Ok(Support {
            id,
            user_id: ticket.user_id,
            user_email: ticket.user_email,
            subject: ticket.subject,
            message: ticket.message,
            status: ticket.status,
            created_at,
        })
    }

    async fn find_latest_by_user(&self, user_id: UserId) -> Result<Option<Support>> {
        let row = sqlx::query(
            "SELECT * FROM support_tickets WHERE user_id = $1 ORDER BY created_at DESC LIMIT 1",
        )
        .bind(user_id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;
        row.map(Self::row_to_ticket).transpose()
    }

    async fn find_by_user(&self, user_id: UserId) -> Result<Vec<Support>> {
        let rows = sqlx::query(
            "SELECT * FROM support_tickets WHERE user_id = $1 ORDER BY created_at DESC",
        )
        .bind(user_id.as_uuid())
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(Self::row_to_ticket).collect()
    }

    async fn find_by_id(&self, id: TicketId) -> Result<Option<Support>> {
        let row = sqlx::query("SELECT * FROM support_tickets WHERE id = $1")
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await?;
        row.map(Self::row_to_ticket).transpose()
    }

    async fn find_all(&self) -> Result<Vec<Support>> {
        let rows = sqlx::query("SELECT * FROM support_tickets ORDER BY created_at DESC")
            .fetch_all(&self.pool)
            .await?;
        rows.into_iter().map(Self::row_to_ticket).collect()
    }

    async fn update_status(&self, id: TicketId, status: TicketStatus) -> Result<()> {
        sqlx::query("UPDATE support_tickets SET status = $2 WHERE id = $1")
            .bind(id.as_uuid())
            .bind(status.as_str())
            .execute(&self.pool)
            .await
            .map_err(map_write_err)?;
        Ok(())
    }
}

#[async_trait]
impl ReservationStore for PostgresStore {
    async fn create(&self, reservation: NewReservation) -> Result<Reservation> {
        let id = ReservationId::new();
        sqlx::query(
            r#"
            INSERT INTO reservations (id, user_id, start_time, end_time, payment_status)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(id.as_uuid())
        .bind(reservation.user_id.as_uuid())
        .bind(reservation.start_time)
        .bind(reservation.end_time)
        .bind(reservation.payment_status.as_str())
        .execute(&self.pool)
        .await
        .map_err(map_write_err)?;

        Ok(Reservation {
            id,
            user_id: reservation.user_id,
            start_time: reservation.start_time,
            end_time: reservation.end_time,
            payment_status: reservation.payment_status,
        })
    }

    async fn has_active_confirmed(&self, user_id: UserId) -> Result<bool> {
        let exists: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM reservations
                WHERE user_id = $1
                  AND payment_status = 'confirmed'
                  AND end_time > now()
            )
            "#,
        )
        .bind(user_id.as_uuid())
        .fetch_one(&self.pool)
        .await?;
        Ok(exists)
    }

    async fn last_confirmed_elapsed_end(&self, user_id: UserId) -> Result<Option<DateTime<Utc>>> {
        let last: Option<DateTime<Utc>> = sqlx::query_scalar(
            r#"
            SELECT MAX(end_time) FROM reservations
            WHERE user_id = $1
              AND payment_status = 'confirmed'
              AND end_time <= now()
            "#,
        )
        .bind(user_id.as_uuid())
        .fetch_one(&self.pool)
        .await?;
        Ok(last)
    }
}
