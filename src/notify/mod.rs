//! Lender notification trigger
//!
//! When a broker creates a deal, the lenders whose criteria accept it are
//! handed to a [`Notifier`]. Delivery (email, push) lives behind the trait;
//! the default implementation only logs.

use async_trait::async_trait;
use uuid::Uuid;

use crate::deal::Deal;

#[async_trait]
pub trait Notifier: Send + Sync {
    /// Called once per created deal with the matching lender ids.
    /// Failures must not fail the deal creation.
    async fn deal_matched(&self, deal: &Deal, lender_ids: &[Uuid]);
}

/// Notifier that records the fan-out in the log
#[derive(Debug, Default, Clone)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn deal_matched(&self, deal: &Deal, lender_ids: &[Uuid]) {
        tracing::info!(
            deal_id = %deal.id,
            matched_lenders = lender_ids.len(),
            "Deal {} matches {} lenders",
            deal.id,
            lender_ids.len()
        );
    }
}
