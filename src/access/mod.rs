//! Access control for deal-scoped resources
//!
//! Every read or write that targets a deal goes through [`authorize`] after
//! the deal has been loaded. A missing deal is reported as `NotFound` by the
//! caller before the guard ever runs.
//!
//! | Action          | Broker            | Lender                 |
//! |-----------------|-------------------|------------------------|
//! | ExpressInterest | denied            | always                 |
//! | ViewInterests   | owner             | denied                 |
//! | SelectLender    | owner             | denied                 |
//! | messages        | owner             | selected lender        |
//! | documents       | owner             | selected lender        |
//! | Complete        | owner             | selected lender        |

use uuid::Uuid;

use crate::deal::Deal;
use crate::error::{ApiError, ApiResult};
use crate::models::{User, UserRole};
use crate::store::Store;

/// Identity the guard decides for
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Actor {
    pub id: Uuid,
    pub role: UserRole,
    /// Display name copied onto records the actor creates
    pub name: String,
}

impl Actor {
    pub fn new(id: Uuid, role: UserRole, name: impl Into<String>) -> Self {
        Self {
            id,
            role,
            name: name.into(),
        }
    }
}

impl From<&User> for Actor {
    fn from(user: &User) -> Self {
        Self::new(user.id, user.role, user.name.clone())
    }
}

/// Deal-scoped actions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    ExpressInterest,
    ViewInterests,
    SelectLender,
    SendMessage,
    ReadMessages,
    UploadDocument,
    ListDocuments,
    Complete,
}

impl Action {
    fn describe(self) -> &'static str {
        match self {
            Action::ExpressInterest => "express interest in this deal",
            Action::ViewInterests => "view interests on this deal",
            Action::SelectLender => "select a lender for this deal",
            Action::SendMessage => "send messages on this deal",
            Action::ReadMessages => "read messages on this deal",
            Action::UploadDocument => "upload documents to this deal",
            Action::ListDocuments => "list documents of this deal",
            Action::Complete => "complete this deal",
        }
    }
}

/// Whether `actor` may perform `action` on `deal`
pub fn is_allowed(actor: &Actor, deal: &Deal, action: Action) -> bool {
    match (actor.role, action) {
        (UserRole::Broker, Action::ExpressInterest) => false,
        (UserRole::Lender, Action::ExpressInterest) => true,

        (UserRole::Broker, Action::ViewInterests | Action::SelectLender) => {
            deal.is_owned_by(actor.id)
        }
        (UserRole::Lender, Action::ViewInterests | Action::SelectLender) => false,

        (
            UserRole::Broker,
            Action::SendMessage
            | Action::ReadMessages
            | Action::UploadDocument
            | Action::ListDocuments
            | Action::Complete,
        ) => deal.is_owned_by(actor.id),
        (
            UserRole::Lender,
            Action::SendMessage
            | Action::ReadMessages
            | Action::UploadDocument
            | Action::ListDocuments
            | Action::Complete,
        ) => deal.is_selected_lender(actor.id),
    }
}

/// Fails with `AccessDenied` unless `actor` may perform `action` on `deal`
pub fn authorize(actor: &Actor, deal: &Deal, action: Action) -> ApiResult<()> {
    if is_allowed(actor, deal, action) {
        return Ok(());
    }

    tracing::debug!(
        deal_id = %deal.id,
        user_id = %actor.id,
        role = %actor.role,
        action = ?action,
        "Deal access denied"
    );
    Err(ApiError::AccessDenied(format!(
        "not permitted to {}",
        action.describe()
    )))
}

/// Load a deal and authorize `action` on it.
///
/// `NotFound` takes precedence over `AccessDenied`.
pub async fn load_authorized(
    store: &dyn Store,
    actor: &Actor,
    deal_id: Uuid,
    action: Action,
) -> ApiResult<Deal> {
    let deal = store
        .find_deal(deal_id)
        .await?
        .ok_or_else(ApiError::deal_not_found)?;
    authorize(actor, &deal, action)?;
    Ok(deal)
}

/// Fails with `AccessDenied` unless `actor` holds `role`
pub fn require_role(actor: &Actor, role: UserRole) -> ApiResult<()> {
    if actor.role == role {
        Ok(())
    } else {
        Err(ApiError::AccessDenied(format!("only {}s may do this", role)))
    }
}
