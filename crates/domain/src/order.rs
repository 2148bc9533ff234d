//! Owner-onboarding order lifecycle.

use common::{OrderId, UserId};
use crypto::{FieldCipher, fingerprint};
use store::{NewOrder, Order, OrderStatus, OrderStore, UserStore};

use crate::error::{DomainError, Result};

/// Command to file an owner-onboarding order.
///
/// All fields arrive in plaintext; the service encrypts the sensitive ones
/// before anything reaches storage.
#[derive(Debug, Clone)]
pub struct CreateOrder {
    /// The user requesting to become a facility owner.
    pub user_id: UserId,

    /// Name of the venue being registered.
    pub venue_name: String,

    /// Free-form description of the venue.
    pub description: String,

    /// Tax id (CNPJ) of the venue.
    pub cnpj: String,

    /// Contact phone number.
    pub phone: String,
}

/// Command to move an order through review.
#[derive(Debug, Clone)]
pub struct UpdateOrderStatus {
    /// The elevated actor performing the review.
    pub user_id: UserId,

    /// The order under review.
    pub order_id: OrderId,

    /// The status to move to.
    pub new_status: OrderStatus,
}

/// Service for the owner-onboarding order lifecycle.
///
/// Generic over the user/order repositories and the field cipher so tests
/// can substitute in-memory stores and observing cipher doubles.
pub struct OrderService<U, O, C> {
    users: U,
    orders: O,
    cipher: C,
}

impl<U: UserStore, O: OrderStore, C: FieldCipher> OrderService<U, O, C> {
    /// Creates a new order service.
    pub fn new(users: U, orders: O, cipher: C) -> Self {
        Self {
            users,
            orders,
            cipher,
        }
    }

    /// Files a new order.
    ///
    /// Preconditions, checked in order against the caller-supplied
    /// plaintext: the tax id must be unclaimed, and the user must not have
    /// an order still under review. Only after both pass are the four
    /// sensitive fields encrypted and the order persisted with
    /// [`OrderStatus::Pending`]. The returned order carries ciphertext;
    /// callers needing plaintext decrypt explicitly.
    #[tracing::instrument(skip(self, cmd), fields(user_id = %cmd.user_id))]
    pub async fn create_order(&self, cmd: CreateOrder) -> Result<Order> {
        if let Some(claim) = self.orders.find_by_cnpj(&cmd.cnpj).await? {
            tracing::warn!(claimed_by = %claim.user_id, "tax id already claimed");
            return Err(DomainError::DuplicateTaxId);
        }

        if let Some(existing) = self.orders.find_by_user(cmd.user_id).await?
            && !existing.status.is_terminal()
        {
            return Err(DomainError::DuplicateOrder(cmd.user_id));
        }

        let cnpj_digest = fingerprint(&cmd.cnpj);
        let order = NewOrder {
            user_id: cmd.user_id,
            venue_name: self.cipher.encrypt(&cmd.venue_name)?,
            description: self.cipher.encrypt(&cmd.description)?,
            cnpj: self.cipher.encrypt(&cmd.cnpj)?,
            phone: self.cipher.encrypt(&cmd.phone)?,
            cnpj_digest,
            status: OrderStatus::Pending,
        };

        let stored = self.orders.create(order).await?;
        metrics::counter!("orders_created_total").increment(1);
        tracing::debug!(order_id = %stored.id, "order filed");
        Ok(stored)
    }

    /// Returns every order with its sensitive fields decrypted.
    ///
    /// Restricted to elevated actors; the role check runs before any order
    /// is read. A decryption failure on any record aborts the whole call;
    /// partial plaintext is never returned.
    #[tracing::instrument(skip(self))]
    pub async fn list_orders(&self, user_id: UserId) -> Result<Vec<Order>> {
        let actor = self
            .users
            .find_by_id(user_id)
            .await?
            .ok_or(DomainError::UserNotFound(user_id))?;
        if !actor.role.is_elevated() {
            return Err(DomainError::AccessDenied(user_id));
        }

        let orders = self.orders.find_all().await?;
        if orders.is_empty() {
            return Err(DomainError::NoOrdersFound);
        }

        orders
            .into_iter()
            .map(|order| self.decrypt_order(order))
            .collect()
    }

    /// Moves an order to a new review status. Only the status is written.
    #[tracing::instrument(skip(self, cmd), fields(order_id = %cmd.order_id))]
    pub async fn update_status(&self, cmd: UpdateOrderStatus) -> Result<()> {
        let actor = self
            .users
            .find_by_id(cmd.user_id)
            .await?
            .ok_or(DomainError::UserNotFound(cmd.user_id))?;
        if !actor.role.is_elevated() {
            return Err(DomainError::AccessDenied(cmd.user_id));
        }

        let order = self
            .orders
            .find_by_id(cmd.order_id)
            .await?
            .ok_or(DomainError::OrderNotFound(cmd.order_id))?;

        if !order.status.transition_allowed(cmd.new_status) {
            return Err(DomainError::InvalidStatusTransition {
                from: order.status.as_str(),
                to: cmd.new_status.as_str(),
            });
        }

        self.orders.update_status(cmd.order_id, cmd.new_status).await?;
        metrics::counter!("order_status_updates_total").increment(1);
        Ok(())
    }

    /// Decrypts the four sensitive fields in place, in stored-field order.
    fn decrypt_order(&self, mut order: Order) -> Result<Order> {
        order.venue_name = self.cipher.decrypt(&order.venue_name)?;
        order.description = self.cipher.decrypt(&order.description)?;
        order.cnpj = self.cipher.decrypt(&order.cnpj)?;
        order.phone = self.cipher.decrypt(&order.phone)?;
        Ok(order)
    }
}
