//! Document vault service

use std::sync::Arc;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use chrono::Utc;
use uuid::Uuid;

use crate::access::{self, Action, Actor};
use crate::error::{ApiError, ApiResult};
use crate::store::{Store, PAGE_SIZE};
use crate::vault::{
    ContentEncoding, DocumentCipher, DocumentMetadata, StoredDocument, UploadDocumentRequest,
};

/// Allowance for the JSON envelope around an upload's content
const UPLOAD_ENVELOPE_BYTES: usize = 64 * 1024;

/// Stores deal documents encrypted at rest
#[derive(Clone)]
pub struct DocumentVault {
    store: Arc<dyn Store>,
    cipher: Arc<DocumentCipher>,
    max_document_bytes: usize,
}

impl DocumentVault {
    pub fn new(
        store: Arc<dyn Store>,
        cipher: Arc<DocumentCipher>,
        max_document_bytes: usize,
    ) -> Self {
        Self {
            store,
            cipher,
            max_document_bytes,
        }
    }

    /// Largest upload request body that can still carry a document at the
    /// size limit: base64 expansion plus the JSON envelope
    pub fn request_body_limit(&self) -> usize {
        (self.max_document_bytes + 2) / 3 * 4 + UPLOAD_ENVELOPE_BYTES
    }

    /// Encrypt and store a document on the deal. Returns the document id.
    pub async fn upload(
        &self,
        actor: &Actor,
        deal_id: Uuid,
        request: UploadDocumentRequest,
    ) -> ApiResult<Uuid> {
        access::load_authorized(self.store.as_ref(), actor, deal_id, Action::UploadDocument)
            .await?;

        let plaintext = match request.encoding {
            ContentEncoding::Text => request.content.into_bytes(),
            ContentEncoding::Base64 => BASE64
                .decode(request.content.trim())
                .map_err(|_| ApiError::InvalidInput("content is not valid base64".to_string()))?,
        };

        if plaintext.len() > self.max_document_bytes {
            return Err(ApiError::InvalidInput(format!(
                "document exceeds {} bytes",
                self.max_document_bytes
            )));
        }

        let sealed = self.cipher.seal(&plaintext)?;
        let document = StoredDocument {
            id: Uuid::new_v4(),
            deal_id,
            uploader_id: actor.id,
            uploader_role: actor.role,
            filename: request.filename,
            content_type: request.content_type,
            size_bytes: plaintext.len() as i64,
            key_id: sealed.key_id,
            nonce: sealed.nonce.to_vec(),
            ciphertext: sealed.ciphertext,
            uploaded_at: Utc::now(),
        };
        self.store.insert_document(&document).await?;

        tracing::info!(
            deal_id = %deal_id,
            document_id = %document.id,
            user_id = %actor.id,
            size_bytes = document.size_bytes,
            "Document uploaded"
        );
        Ok(document.id)
    }

    /// Metadata of the deal's documents; never contents
    pub async fn list(&self, actor: &Actor, deal_id: Uuid) -> ApiResult<Vec<DocumentMetadata>> {
        access::load_authorized(self.store.as_ref(), actor, deal_id, Action::ListDocuments).await?;
        Ok(self.store.list_documents(deal_id, PAGE_SIZE).await?)
    }

    /// Decrypted document contents. Internal; no route serves it.
    pub async fn read_content(&self, document_id: Uuid) -> ApiResult<Vec<u8>> {
        let document = self
            .store
            .find_document(document_id)
            .await?
            .ok_or_else(|| ApiError::NotFound("Document".to_string()))?;

        Ok(self
            .cipher
            .open(&document.key_id, &document.nonce, &document.ciphertext)?)
    }
}
