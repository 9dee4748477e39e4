//! Document models

use serde::{Deserialize, Serialize};
use sqlx::types::chrono::{DateTime, Utc};
use uuid::Uuid;
use validator::Validate;

use crate::models::UserRole;

/// Document as persisted. Deliberately not `Serialize`: ciphertext never
/// leaves the vault.
#[derive(Debug, sqlx::FromRow, Clone)]
pub struct StoredDocument {
    pub id: Uuid,
    pub deal_id: Uuid,
    pub uploader_id: Uuid,
    pub uploader_role: UserRole,
    pub filename: String,
    pub content_type: String,
    pub size_bytes: i64,
    pub key_id: String,
    pub nonce: Vec<u8>,
    pub ciphertext: Vec<u8>,
    pub uploaded_at: DateTime<Utc>,
}

/// Listing view of a document
#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, Clone)]
pub struct DocumentMetadata {
    pub id: Uuid,
    pub deal_id: Uuid,
    pub uploader_id: Uuid,
    pub uploader_role: UserRole,
    pub filename: String,
    pub content_type: String,
    pub size_bytes: i64,
    pub uploaded_at: DateTime<Utc>,
}

impl From<&StoredDocument> for DocumentMetadata {
    fn from(doc: &StoredDocument) -> Self {
        Self {
            id: doc.id,
            deal_id: doc.deal_id,
            uploader_id: doc.uploader_id,
            uploader_role: doc.uploader_role,
            filename: doc.filename.clone(),
            content_type: doc.content_type.clone(),
            size_bytes: doc.size_bytes,
            uploaded_at: doc.uploaded_at,
        }
    }
}

/// How `content` in an upload is encoded
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentEncoding {
    #[default]
    Text,
    Base64,
}

/// Request DTO for uploading a document
#[derive(Debug, Clone, Deserialize, Serialize, Validate)]
pub struct UploadDocumentRequest {
    #[validate(length(min = 1, max = 255))]
    pub filename: String,
    pub content: String,
    #[validate(length(min = 1, max = 127))]
    pub content_type: String,
    #[serde(default)]
    pub encoding: ContentEncoding,
}

/// Response DTO for document upload
#[derive(Debug, Serialize, Deserialize)]
pub struct UploadDocumentResponse {
    pub message: String,
    pub document_id: Uuid,
}
