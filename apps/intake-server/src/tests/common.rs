//! Common test helpers and utilities for server tests.
//!
//! This module provides shared test infrastructure including:
//! - A recording email provider that can be told to fail
//! - An in-memory document store that can be told to fail
//! - Test server creation over in-memory SQLite
//! - Payload and expiry helpers

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{Duration, Utc};
use intake_reminders::ReminderScheduler;
use intake_storage::{
    ApplicantInfo, CompanyInfo, DocumentDescriptor, FormPayload, InvitationRecord, Inventor, Store,
};
use intake_store_sqlite::SqliteStore;

use crate::config::ServerConfig;
use crate::documents::{DecodedFile, DocumentStorage, UploadError};
use crate::email::{EmailContent, EmailError, EmailProvider, NotificationDispatcher, SendReceipt};
use crate::reminders::EmailReminderSink;
use crate::server::IntakeServer;

pub const ADMIN_TOKEN: &str = "test-admin-token";

/// Base64 of `%PDF-1.4`.
pub const PDF_BASE64: &str = "JVBERi0xLjQ=";

#[derive(Clone, Debug)]
pub struct SentEmail {
    pub to: String,
    pub subject: String,
    pub text: String,
}

#[derive(Default)]
pub struct RecordingEmailProvider {
    pub sent: Mutex<Vec<SentEmail>>,
    pub attempts: Mutex<usize>,
    fail: AtomicBool,
}

impl RecordingEmailProvider {
    pub fn set_failing(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    pub fn sent(&self) -> Vec<SentEmail> {
        self.sent.lock().unwrap().clone()
    }

    pub fn attempts(&self) -> usize {
        *self.attempts.lock().unwrap()
    }
}

#[async_trait]
impl EmailProvider for RecordingEmailProvider {
    async fn deliver(
        &self,
        to: &str,
        content: &EmailContent,
        _from_address: &str,
        _from_name: Option<&str>,
    ) -> Result<SendReceipt, EmailError> {
        *self.attempts.lock().unwrap() += 1;
        if self.fail.load(Ordering::SeqCst) {
            return Err(EmailError::SendFailed("provider rejected message".into()));
        }
        let mut sent = self.sent.lock().unwrap();
        sent.push(SentEmail {
            to: to.to_string(),
            subject: content.subject.clone(),
            text: content.text.clone(),
        });
        Ok(SendReceipt {
            message_id: Some(format!("msg-{}", sent.len())),
        })
    }
}

#[derive(Default)]
pub struct MemoryDocumentStorage {
    pub uploads: Mutex<Vec<(String, usize)>>,
    pub deleted: Mutex<Vec<String>>,
    fail: AtomicBool,
}

impl MemoryDocumentStorage {
    pub fn set_failing(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl DocumentStorage for MemoryDocumentStorage {
    async fn upload(
        &self,
        file: DecodedFile,
        folder: &str,
        original_filename: Option<&str>,
    ) -> Result<DocumentDescriptor, UploadError> {
        let bytes = file.bytes;
        if self.fail.load(Ordering::SeqCst) {
            return Err(UploadError::Backend("bucket unavailable".into()));
        }
        let mut uploads = self.uploads.lock().unwrap();
        uploads.push((folder.to_string(), bytes.len()));
        let public_id = format!("{}/doc-{}", folder, uploads.len());
        Ok(DocumentDescriptor {
            url: format!("http://files.test/{public_id}.pdf"),
            secure_url: format!("https://files.test/{public_id}.pdf"),
            public_id,
            original_filename: original_filename.map(str::to_string),
            bytes: bytes.len() as u64,
            format: "pdf".into(),
            uploaded_at: Utc::now(),
        })
    }

    async fn delete(&self, document: &DocumentDescriptor) -> Result<(), UploadError> {
        self.deleted
            .lock()
            .unwrap()
            .push(document.public_id.clone());
        Ok(())
    }
}

pub struct TestHarness {
    pub server: IntakeServer,
    pub email: Arc<RecordingEmailProvider>,
    pub documents: Arc<MemoryDocumentStorage>,
}

pub fn test_config() -> ServerConfig {
    ServerConfig {
        admin_token: Some(ADMIN_TOKEN.to_string()),
        ..ServerConfig::default()
    }
}

/// Test helper: Create a server around an arbitrary store
pub fn create_test_server_with_store(store: Arc<dyn Store>) -> TestHarness {
    let email = Arc::new(RecordingEmailProvider::default());
    let documents = Arc::new(MemoryDocumentStorage::default());
    let dispatcher = NotificationDispatcher::new(email.clone(), "noreply@test.local", None);
    let sink = Arc::new(EmailReminderSink::new(
        dispatcher.clone(),
        vec!["team@test.local".to_string()],
    ));
    let config = test_config();
    let reminders = Arc::new(ReminderScheduler::new(
        config.reminders.schedule.clone(),
        sink,
    ));

    TestHarness {
        server: IntakeServer::new(store, dispatcher, documents.clone(), config, reminders),
        email,
        documents,
    }
}

/// Test helper: Create a server with in-memory SQLite
pub async fn create_test_server() -> TestHarness {
    let store = Arc::new(SqliteStore::open_in_memory().await.unwrap());
    create_test_server_with_store(store)
}

pub fn complete_company(name: &str) -> CompanyInfo {
    CompanyInfo {
        name: Some(name.to_string()),
        address: Some("12 MG Road, Bengaluru".into()),
        pin_code: Some("560001".into()),
        gst_number: Some("29ABCDE1234F1Z5".into()),
        entity_type: Some("Private Limited".into()),
        ..Default::default()
    }
}

pub fn inventor(name: &str) -> Inventor {
    Inventor {
        name: Some(name.to_string()),
        address: Some("4 Lake View".into()),
        pin_code: Some("560034".into()),
        nationality: Some("Indian".into()),
        email: Some(format!("{}@example.com", name.to_lowercase())),
        phone: None,
    }
}

/// Every text field needed for submit; certificates must be uploaded separately.
pub fn complete_payload(company: &str) -> FormPayload {
    FormPayload {
        company_info: Some(complete_company(company)),
        applicant_info: Some(ApplicantInfo {
            name: Some("Priya Sharma".into()),
            email: Some("priya@example.com".into()),
            ..Default::default()
        }),
        inventors: Some(vec![inventor("Ada")]),
        comments: Some("Please file before month end".into()),
    }
}

/// Test helper: Upload both certificates for a token
pub async fn upload_certificates(server: &IntakeServer, token: &str) {
    for field in ["gstCertificate", "entityCertificate"] {
        crate::lifecycle::upload_document(server, token, field, PDF_BASE64, Some("cert.pdf"))
            .await
            .unwrap();
    }
}

/// Test helper: Move a record's expiry into the past
pub async fn expire(server: &IntakeServer, token: &str) -> InvitationRecord {
    let mut record = server.store.find_by_token(token).await.unwrap().unwrap();
    record.expires_at = Utc::now() - Duration::minutes(1);
    server.store.update_in_place(&record).await.unwrap()
}

/// Test helper: Send an invitation and drive it to `completed`
pub async fn completed_invitation(
    server: &IntakeServer,
    email: &str,
    company: &str,
) -> InvitationRecord {
    let record = crate::invitations::send(server, email, Some("Client"))
        .await
        .unwrap();
    upload_certificates(server, &record.token).await;
    crate::lifecycle::submit(server, &record.token, complete_payload(company))
        .await
        .unwrap()
}
