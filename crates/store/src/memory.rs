//! In-memory store implementations for testing.
//!
//! Each store keeps its records behind `Arc<RwLock<Vec<_>>>` and mirrors
//! the PostgreSQL behavior, unique constraints included, so domain tests
//! observe the same failure modes as production.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use common::{OrderId, ReservationId, TicketId, UserId};
use crypto::fingerprint;
use tokio::sync::RwLock;

use crate::error::{Result, StoreError};
use crate::order::{NewOrder, Order, OrderStatus, TaxIdClaim};
use crate::reservation::{NewReservation, PaymentStatus, Reservation};
use crate::store::{OrderStore, ReservationStore, SupportStore, UserStore};
use crate::support::{NewTicket, Support, TicketStatus};
use crate::user::{NewUser, User};

/// In-memory user store.
#[derive(Clone, Default)]
pub struct InMemoryUserStore {
    users: Arc<RwLock<Vec<User>>>,
}

impl InMemoryUserStore {
    /// Creates a new empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for InMemoryUserStore {
    async fn create(&self, user: NewUser) -> Result<User> {
        let mut users = self.users.write().await;
        if users.iter().any(|u| u.email == user.email) {
            return Err(StoreError::unique("users_email_key"));
        }
        let stored = User {
            id: UserId::new(),
            email: user.email,
            role: user.role,
        };
        users.push(stored.clone());
        Ok(stored)
    }

    async fn find_by_id(&self, id: UserId) -> Result<Option<User>> {
        let users = self.users.read().await;
        Ok(users.iter().find(|u| u.id == id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        let users = self.users.read().await;
        Ok(users.iter().find(|u| u.email == email).cloned())
    }
}

/// In-memory order store, simulating the tax-id and pending-per-user
/// unique indexes.
#[derive(Clone, Default)]
pub struct InMemoryOrderStore {
    orders: Arc<RwLock<Vec<Order>>>,
}

impl InMemoryOrderStore {
    /// Creates a new empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the total number of orders stored.
    pub async fn order_count(&self) -> usize {
        self.orders.read().await.len()
    }
}

#[async_trait]
impl OrderStore for InMemoryOrderStore {
    async fn create(&self, order: NewOrder) -> Result<Order> {
        let mut orders = self.orders.write().await;

        if orders.iter().any(|o| o.cnpj_digest == order.cnpj_digest) {
            return Err(StoreError::unique("orders_cnpj_digest_key"));
        }
        if order.status == OrderStatus::Pending
            && orders
                .iter()
                .any(|o| o.user_id == order.user_id && o.status == OrderStatus::Pending)
        {
            return Err(StoreError::unique("orders_one_pending_per_user_key"));
        }

        let stored = Order {
            id: OrderId::new(),
            user_id: order.user_id,
            venue_name: order.venue_name,
            description: order.description,
            cnpj: order.cnpj,
            phone: order.phone,
            cnpj_digest: order.cnpj_digest,
            status: order.status,
        };
        orders.push(stored.clone());
        Ok(stored)
    }

    async fn find_by_cnpj(&self, cnpj: &str) -> Result<Option<TaxIdClaim>> {
        let digest = fingerprint(cnpj);
        let orders = self.orders.read().await;
        Ok(orders.iter().find(|o| o.cnpj_digest == digest).map(|o| {
            TaxIdClaim {
                cnpj_digest: o.cnpj_digest.clone(),
                user_id: o.user_id,
            }
        }))
    }

    async fn find_by_user(&self, user_id: UserId) -> Result<Option<Order>> {
        let orders = self.orders.read().await;
        // Insertion order doubles as recency.
        Ok(orders.iter().rev().find(|o| o.user_id == user_id).cloned())
    }

    async fn find_by_id(&self, id: OrderId) -> Result<Option<Order>> {
        let orders = self.orders.read().await;
        Ok(orders.iter().find(|o| o.id == id).cloned())
    }

    async fn find_all(&self) -> Result<Vec<Order>> {
        let orders = self.orders.read().await;
        Ok(orders.clone())
    }

    async fn update_status(&self, id: OrderId, status: OrderStatus) -> Result<()> {
        let mut orders = self.orders.write().await;
        if let Some(order) = orders.iter_mut().find(|o| o.id == id) {
            order.status = status;
        }
        Ok(())
    }
}

/// In-memory support-ticket store.
#[derive(Clone, Default)]
pub struct InMemorySupportStore {
    tickets: Arc<RwLock<Vec<Support>>>,
}

impl InMemorySupportStore {
    /// Creates a new empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SupportStore for InMemorySupportStore {
    async fn create(&self, ticket: NewTicket) -> Result<Support> {
        let stored = Support {
            id: TicketId::new(),
            user_id: ticket.user_id,
            user_email: ticket.user_email,
            subject: ticket.subject,
            message: ticket.message,
            status: ticket.status,
            created_at: Utc::now(),
        };
        self.tickets.write().await.push(stored.clone());
        Ok(stored)
    }

    async fn find_latest_by_user(&self, user_id: UserId) -> Result<Option<Support>> {
        let tickets = self.tickets.read().await;
        Ok(tickets
            .iter()
            .filter(|t| t.user_id == user_id)
            .max_by_key(|t| t.created_at)
            .cloned())
    }

    async fn find_by_user(&self, user_id: UserId) -> Result<Vec<Support>> {
        let tickets = self.tickets.read().await;
        let mut matching: Vec<_> = tickets
            .iter()
            .filter(|t| t.user_id == user_id)
            .cloned()
            .collect();
        matching.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(matching)
    }

    async fn find_by_id(&self, id: TicketId) -> Result<Option<Support>> {
        let tickets = self.tickets.read().await;
        Ok(tickets.iter().find(|t| t.id == id).cloned())
    }

    async fn find_all(&self) -> Result<Vec<Support>> {
        let tickets = self.tickets.read().await;
        let mut all = tickets.clone();
        all.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(all)
    }

    async fn update_status(&self, id: TicketId, status: TicketStatus) -> Result<()> {
        let mut tickets = self.tickets.write().await;
        if let Some(ticket) = tickets.iter_mut().find(|t| t.id == id) {
            ticket.status = status;
        }
        Ok(())
    }
}

/// In-memory reservation store. Admissibility queries compare against
/// `Utc::now()` like the PostgreSQL implementation.
#[derive(Clone, Default)]
pub struct InMemoryReservationStore {
    reservations: Arc<RwLock<Vec<Reservation>>>,
}

impl InMemoryReservationStore {
    /// Creates a new empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ReservationStore for InMemoryReservationStore {
    async fn create(&self, reservation: NewReservation) -> Result<Reservation> {
        let stored = Reservation {
            id: ReservationId::new(),
            user_id: reservation.user_id,
            start_time: reservation.start_time,
            end_time: reservation.end_time,
            payment_status: reservation.payment_status,
        };
        self.reservations.write().await.push(stored.clone());
        Ok(stored)
    }

    async fn has_active_confirmed(&self, user_id: UserId) -> Result<bool> {
        let now = Utc::now();
        let reservations = self.reservations.read().await;
        Ok(reservations.iter().any(|r| {
            r.user_id == user_id
                && r.payment_status == PaymentStatus::Confirmed
                && r.end_time > now
        }))
    }

    async fn last_confirmed_elapsed_end(&self, user_id: UserId) -> Result<Option<DateTime<Utc>>> {
        let now = Utc::now();
        let reservations = self.reservations.read().await;
        Ok(reservations
            .iter()
            .filter(|r| {
                r.user_id == user_id
                    && r.payment_status == PaymentStatus::Confirmed
                    && r.end_time <= now
            })
            .map(|r| r.end_time)
            .max())
    }
}
