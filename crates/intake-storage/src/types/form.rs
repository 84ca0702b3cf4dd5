//! Form payload types: company, applicant, inventors and uploaded documents.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Descriptor returned by the object-storage collaborator for one uploaded file.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentDescriptor {
    pub public_id: String,
    pub url: String,
    pub secure_url: String,
    pub original_filename: Option<String>,
    pub bytes: u64,
    pub format: String,
    pub uploaded_at: DateTime<Utc>,
}

/// Document slots a client may upload into (the only writable upload targets).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DocumentField {
    GstCertificate,
    EntityCertificate,
}

impl DocumentField {
    pub const ALL: [DocumentField; 2] = [
        DocumentField::GstCertificate,
        DocumentField::EntityCertificate,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentField::GstCertificate => "gstCertificate",
            DocumentField::EntityCertificate => "entityCertificate",
        }
    }

    /// Parse an allow-listed field name; anything else is rejected.
    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.as_str() == name)
    }
}

impl std::fmt::Display for DocumentField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Company-level data. Locked as a whole when auto-prefilled.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CompanyInfo {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pin_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gst_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gst_certificate: Option<DocumentDescriptor>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entity_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entity_certificate: Option<DocumentDescriptor>,
}

impl CompanyInfo {
    /// Field-wise overlay: values present in `patch` win, absent ones keep `self`.
    pub fn merged_with(&self, patch: &CompanyInfo) -> CompanyInfo {
        CompanyInfo {
            name: patch.name.clone().or_else(|| self.name.clone()),
            address: patch.address.clone().or_else(|| self.address.clone()),
            pin_code: patch.pin_code.clone().or_else(|| self.pin_code.clone()),
            gst_number: patch.gst_number.clone().or_else(|| self.gst_number.clone()),
            gst_certificate: patch
                .gst_certificate
                .clone()
                .or_else(|| self.gst_certificate.clone()),
            entity_type: patch.entity_type.clone().or_else(|| self.entity_type.clone()),
            entity_certificate: patch
                .entity_certificate
                .clone()
                .or_else(|| self.entity_certificate.clone()),
        }
    }

    /// True when the record carries a usable company name.
    pub fn has_name(&self) -> bool {
        is_present(&self.name)
    }

    pub fn document(&self, field: DocumentField) -> Option<&DocumentDescriptor> {
        match field {
            DocumentField::GstCertificate => self.gst_certificate.as_ref(),
            DocumentField::EntityCertificate => self.entity_certificate.as_ref(),
        }
    }

    pub fn set_document(&mut self, field: DocumentField, descriptor: DocumentDescriptor) {
        match field {
            DocumentField::GstCertificate => self.gst_certificate = Some(descriptor),
            DocumentField::EntityCertificate => self.entity_certificate = Some(descriptor),
        }
    }
}

/// Person filing on behalf of the company.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ApplicantInfo {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub designation: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
}

impl ApplicantInfo {
    pub fn merged_with(&self, patch: &ApplicantInfo) -> ApplicantInfo {
        ApplicantInfo {
            name: patch.name.clone().or_else(|| self.name.clone()),
            email: patch.email.clone().or_else(|| self.email.clone()),
            phone: patch.phone.clone().or_else(|| self.phone.clone()),
            designation: patch.designation.clone().or_else(|| self.designation.clone()),
            address: patch.address.clone().or_else(|| self.address.clone()),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Inventor {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pin_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nationality: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

/// Client-supplied form data for save-draft and submit. Absent sections are left alone.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FormPayload {
    pub company_info: Option<CompanyInfo>,
    pub applicant_info: Option<ApplicantInfo>,
    pub inventors: Option<Vec<Inventor>>,
    pub comments: Option<String>,
}

/// A value counts as present when it is set and not just whitespace.
pub fn is_present(value: &Option<String>) -> bool {
    value.as_deref().is_some_and(|v| !v.trim().is_empty())
}
