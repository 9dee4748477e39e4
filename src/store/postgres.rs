//! PostgreSQL store

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use super::{Store, StoreError, StoreResult};
use crate::deal::{Deal, DealStatus, LenderInterest};
use crate::matching::LenderCriteria;
use crate::messaging::Message;
use crate::models::{Session, User};
use crate::vault::{DocumentMetadata, StoredDocument};

const USER_COLUMNS: &str = "id, email, name, role, password_hash, created_at";
const SESSION_COLUMNS: &str =
    "id, user_id, token_hash, issued_at, expires_at, revoked, revoked_at";
const CRITERIA_COLUMNS: &str = "lender_id, loan_types, min_amount, max_amount, regions, \
     credit_score_min, ltv_max, created_at, updated_at";
const DEAL_COLUMNS: &str = "id, broker_id, broker_name, title, loan_type, amount, region, \
     borrower_credit_score, ltv_ratio, property_type, description, status, matched_lenders, \
     selected_lender, created_at, updated_at";
const DOCUMENT_METADATA_COLUMNS: &str = "id, deal_id, uploader_id, uploader_role, filename, \
     content_type, size_bytes, uploaded_at";

/// Store backed by a Postgres pool
#[derive(Clone)]
pub struct PgStore {
    db_pool: PgPool,
}

impl PgStore {
    pub fn new(db_pool: PgPool) -> Self {
        Self { db_pool }
    }
}

#[async_trait]
impl Store for PgStore {
    async fn insert_user(&self, user: &User) -> StoreResult<()> {
        sqlx::query(
            r#"
            INSERT INTO users (id, email, name, role, password_hash, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(user.id)
        .bind(&user.email)
        .bind(&user.name)
        .bind(user.role)
        .bind(&user.password_hash)
        .bind(user.created_at)
        .execute(&self.db_pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db) if db.is_unique_violation() => StoreError::DuplicateEmail,
            other => other.into(),
        })?;

        Ok(())
    }

    async fn find_user_by_id(&self, id: Uuid) -> StoreResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {} FROM users WHERE id = $1",
            USER_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.db_pool)
        .await?;

        Ok(user)
    }

    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {} FROM users WHERE email = $1",
            USER_COLUMNS
        ))
        .bind(email)
        .fetch_optional(&self.db_pool)
        .await?;

        Ok(user)
    }

    async fn insert_session(&self, session: &Session) -> StoreResult<()> {
        sqlx::query(
            r#"
            INSERT INTO sessions (id, user_id, token_hash, issued_at, expires_at, revoked)
            VALUES ($1, $2, $3, $4, $5, FALSE)
            "#,
        )
        .bind(session.id)
        .bind(session.user_id)
        .bind(&session.token_hash)
        .bind(session.issued_at)
        .bind(session.expires_at)
        .execute(&self.db_pool)
        .await?;

        Ok(())
    }

    async fn find_session_by_token_hash(&self, token_hash: &str) -> StoreResult<Option<Session>> {
        let session = sqlx::query_as::<_, Session>(&format!(
            "SELECT {} FROM sessions WHERE token_hash = $1",
            SESSION_COLUMNS
        ))
        .bind(token_hash)
        .fetch_optional(&self.db_pool)
        .await?;

        Ok(session)
    }

    async fn revoke_session(&self, session_id: Uuid) -> StoreResult<bool> {
        let rows_affected = sqlx::query(
            r#"
            UPDATE sessions
            SET revoked = TRUE, revoked_at = NOW()
            WHERE id = $1 AND revoked = FALSE
            "#,
        )
        .bind(session_id)
        .execute(&self.db_pool)
        .await?
        .rows_affected();

        Ok(rows_affected > 0)
    }

    async fn revoke_user_sessions(&self, user_id: Uuid) -> StoreResult<u64> {
        let rows_affected = sqlx::query(
            r#"
            UPDATE sessions
            SET revoked = TRUE, revoked_at = NOW()
            WHERE user_id = $1 AND revoked = FALSE
            "#,
        )
        .bind(user_id)
        .execute(&self.db_pool)
        .await?
        .rows_affected();

        Ok(rows_affected)
    }

    async fn upsert_criteria(&self, criteria: &LenderCriteria) -> StoreResult<LenderCriteria> {
        let stored = sqlx::query_as::<_, LenderCriteria>(&format!(
            r#"
            INSERT INTO lender_criteria (
                lender_id, loan_types, min_amount, max_amount, regions,
                credit_score_min, ltv_max, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            ON CONFLICT (lender_id) DO UPDATE SET
                loan_types = EXCLUDED.loan_types,
                min_amount = EXCLUDED.min_amount,
                max_amount = EXCLUDED.max_amount,
                regions = EXCLUDED.regions,
                credit_score_min = EXCLUDED.credit_score_min,
                ltv_max = EXCLUDED.ltv_max,
                updated_at = EXCLUDED.updated_at
            RETURNING {}
            "#,
            CRITERIA_COLUMNS
        ))
        .bind(criteria.lender_id)
        .bind(&criteria.loan_types)
        .bind(criteria.min_amount)
        .bind(criteria.max_amount)
        .bind(&criteria.regions)
        .bind(criteria.credit_score_min)
        .bind(criteria.ltv_max)
        .bind(criteria.created_at)
        .bind(criteria.updated_at)
        .fetch_one(&self.db_pool)
        .await?;

        Ok(stored)
    }

    async fn find_criteria(&self, lender_id: Uuid) -> StoreResult<Option<LenderCriteria>> {
        let criteria = sqlx::query_as::<_, LenderCriteria>(&format!(
            "SELECT {} FROM lender_criteria WHERE lender_id = $1",
            CRITERIA_COLUMNS
        ))
        .bind(lender_id)
        .fetch_optional(&self.db_pool)
        .await?;

        Ok(criteria)
    }

    async fn list_criteria(&self) -> StoreResult<Vec<LenderCriteria>> {
        let criteria = sqlx::query_as::<_, LenderCriteria>(&format!(
            "SELECT {} FROM lender_criteria",
            CRITERIA_COLUMNS
        ))
        .fetch_all(&self.db_pool)
        .await?;

        Ok(criteria)
    }

    async fn insert_deal(&self, deal: &Deal) -> StoreResult<()> {
        sqlx::query(
            r#"
            INSERT INTO deals (
                id, broker_id, broker_name, title, loan_type, amount, region,
                borrower_credit_score, ltv_ratio, property_type, description,
                status, matched_lenders, selected_lender, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16)
            "#,
        )
        .bind(deal.id)
        .bind(deal.broker_id)
        .bind(&deal.broker_name)
        .bind(&deal.title)
        .bind(&deal.loan_type)
        .bind(deal.amount)
        .bind(&deal.region)
        .bind(deal.borrower_credit_score)
        .bind(deal.ltv_ratio)
        .bind(&deal.property_type)
        .bind(&deal.description)
        .bind(deal.status)
        .bind(&deal.matched_lenders)
        .bind(deal.selected_lender)
        .bind(deal.created_at)
        .bind(deal.updated_at)
        .execute(&self.db_pool)
        .await?;

        Ok(())
    }

    async fn find_deal(&self, id: Uuid) -> StoreResult<Option<Deal>> {
        let deal = sqlx::query_as::<_, Deal>(&format!(
            "SELECT {} FROM deals WHERE id = $1",
            DEAL_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.db_pool)
        .await?;

        Ok(deal)
    }

    async fn list_deals_by_broker(&self, broker_id: Uuid, limit: i64) -> StoreResult<Vec<Deal>> {
        let deals = sqlx::query_as::<_, Deal>(&format!(
            "SELECT {} FROM deals WHERE broker_id = $1 ORDER BY created_at ASC LIMIT $2",
            DEAL_COLUMNS
        ))
        .bind(broker_id)
        .bind(limit)
        .fetch_all(&self.db_pool)
        .await?;

        Ok(deals)
    }

    async fn list_matching_pending_deals(
        &self,
        criteria: &LenderCriteria,
        limit: i64,
    ) -> StoreResult<Vec<Deal>> {
        // Same clauses as matching::matches, evaluated before the limit
        let deals = sqlx::query_as::<_, Deal>(&format!(
            r#"
            SELECT {} FROM deals
            WHERE status = $1
              AND loan_type = ANY($2)
              AND amount BETWEEN $3 AND $4
              AND region = ANY($5)
              AND borrower_credit_score >= $6
              AND ltv_ratio <= $7
            ORDER BY created_at ASC
            LIMIT $8
            "#,
            DEAL_COLUMNS
        ))
        .bind(DealStatus::Pending)
        .bind(&criteria.loan_types)
        .bind(criteria.min_amount)
        .bind(criteria.max_amount)
        .bind(&criteria.regions)
        .bind(criteria.credit_score_min)
        .bind(criteria.ltv_max)
        .bind(limit)
        .fetch_all(&self.db_pool)
        .await?;

        Ok(deals)
    }

    async fn assign_lender(
        &self,
        deal_id: Uuid,
        broker_id: Uuid,
        lender_id: Uuid,
    ) -> StoreResult<Option<Deal>> {
        let deal = sqlx::query_as::<_, Deal>(&format!(
            r#"
            UPDATE deals
            SET selected_lender = $3, status = 'in_progress', updated_at = NOW()
            WHERE id = $1 AND broker_id = $2 AND status = 'pending' AND selected_lender IS NULL
            RETURNING {}
            "#,
            DEAL_COLUMNS
        ))
        .bind(deal_id)
        .bind(broker_id)
        .bind(lender_id)
        .fetch_optional(&self.db_pool)
        .await?;

        Ok(deal)
    }

    async fn mark_completed(&self, deal_id: Uuid) -> StoreResult<Option<Deal>> {
        let deal = sqlx::query_as::<_, Deal>(&format!(
            r#"
            UPDATE deals
            SET status = 'completed', updated_at = NOW()
            WHERE id = $1 AND status IN ('in_progress', 'completed')
            RETURNING {}
            "#,
            DEAL_COLUMNS
        ))
        .bind(deal_id)
        .fetch_optional(&self.db_pool)
        .await?;

        Ok(deal)
    }

    async fn record_interest(&self, interest: &LenderInterest) -> StoreResult<bool> {
        let mut tx = self.db_pool.begin().await?;

        // Set union; a deal already containing the lender still counts as found
        let rows_affected = sqlx::query(
            r#"
            UPDATE deals
            SET matched_lenders = CASE
                    WHEN $2 = ANY(matched_lenders) THEN matched_lenders
                    ELSE array_append(matched_lenders, $2)
                END,
                updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(interest.deal_id)
        .bind(interest.lender_id)
        .execute(&mut *tx)
        .await?
        .rows_affected();

        if rows_affected == 0 {
            tx.rollback().await?;
            return Ok(false);
        }

        sqlx::query(
            r#"
            INSERT INTO lender_interests (
                id, deal_id, lender_id, lender_name, interest_type, amount, message, created_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(interest.id)
        .bind(interest.deal_id)
        .bind(interest.lender_id)
        .bind(&interest.lender_name)
        .bind(interest.interest_type)
        .bind(interest.amount)
        .bind(&interest.message)
        .bind(interest.created_at)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(true)
    }

    async fn list_interests(&self, deal_id: Uuid, limit: i64) -> StoreResult<Vec<LenderInterest>> {
        let interests = sqlx::query_as::<_, LenderInterest>(
            r#"
            SELECT id, deal_id, lender_id, lender_name, interest_type, amount, message, created_at
            FROM lender_interests
            WHERE deal_id = $1
            ORDER BY created_at ASC
            LIMIT $2
            "#,
        )
        .bind(deal_id)
        .bind(limit)
        .fetch_all(&self.db_pool)
        .await?;

        Ok(interests)
    }

    async fn insert_document(&self, document: &StoredDocument) -> StoreResult<()> {
        sqlx::query(
            r#"
            INSERT INTO documents (
                id, deal_id, uploader_id, uploader_role, filename, content_type,
                size_bytes, key_id, nonce, ciphertext, uploaded_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            "#,
        )
        .bind(document.id)
        .bind(document.deal_id)
        .bind(document.uploader_id)
        .bind(document.uploader_role)
        .bind(&document.filename)
        .bind(&document.content_type)
        .bind(document.size_bytes)
        .bind(&document.key_id)
        .bind(&document.nonce)
        .bind(&document.ciphertext)
        .bind(document.uploaded_at)
        .execute(&self.db_pool)
        .await?;

        Ok(())
    }

    async fn find_document(&self, id: Uuid) -> StoreResult<Option<StoredDocument>> {
        let document = sqlx::query_as::<_, StoredDocument>(
            r#"
            SELECT id, deal_id, uploader_id, uploader_role, filename, content_type,
                   size_bytes, key_id, nonce, ciphertext, uploaded_at
            FROM documents
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.db_pool)
        .await?;

        Ok(document)
    }

    async fn list_documents(
        &self,
        deal_id: Uuid,
        limit: i64,
    ) -> StoreResult<Vec<DocumentMetadata>> {
        // ciphertext is never selected for listings
        let documents = sqlx::query_as::<_, DocumentMetadata>(&format!(
            "SELECT {} FROM documents WHERE deal_id = $1 ORDER BY uploaded_at ASC LIMIT $2",
            DOCUMENT_METADATA_COLUMNS
        ))
        .bind(deal_id)
        .bind(limit)
        .fetch_all(&self.db_pool)
        .await?;

        Ok(documents)
    }

    async fn insert_message(&self, message: &Message) -> StoreResult<()> {
        sqlx::query(
            r#"
            INSERT INTO messages (id, deal_id, sender_id, sender_name, sender_role, message, timestamp)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(message.id)
        .bind(message.deal_id)
        .bind(message.sender_id)
        .bind(&message.sender_name)
        .bind(message.sender_role)
        .bind(&message.message)
        .bind(message.timestamp)
        .execute(&self.db_pool)
        .await?;

        Ok(())
    }

    async fn list_messages(&self, deal_id: Uuid, limit: i64) -> StoreResult<Vec<Message>> {
        let messages = sqlx::query_as::<_, Message>(
            r#"
            SELECT id, deal_id, sender_id, sender_name, sender_role, message, timestamp
            FROM messages
            WHERE deal_id = $1
            ORDER BY timestamp ASC, seq ASC
            LIMIT $2
            "#,
        )
        .bind(deal_id)
        .bind(limit)
        .fetch_all(&self.db_pool)
        .await?;

        Ok(messages)
    }

    async fn ping(&self) -> StoreResult<()> {
        crate::db::check_health(&self.db_pool)
            .await
            .map_err(|e| StoreError::Database(e.to_string()))
    }
}
