//! Submit-time completeness checks.
//!
//! Checks run in a fixed order and stop at the first gap. Messages embed the
//! field path in parentheses so older clients can keep matching substrings.

use intake_storage::{is_present, CompanyInfo, DocumentDescriptor, Inventor};

use crate::error::{ValidationError, ValidationReason};

fn required(label: &str, field: &str) -> ValidationError {
    ValidationError {
        field: field.to_string(),
        reason: ValidationReason::Required,
        message: format!("{label} is required ({field})"),
    }
}

fn upload_required(label: &str, field: &str) -> ValidationError {
    ValidationError {
        field: field.to_string(),
        reason: ValidationReason::UploadRequired,
        message: format!("{label} upload is required ({field})"),
    }
}

fn uploaded(doc: &Option<DocumentDescriptor>) -> bool {
    doc.as_ref()
        .is_some_and(|d| !d.secure_url.trim().is_empty())
}

/// Validate effective company data and inventor list.
pub fn validate(company: &CompanyInfo, inventors: &[Inventor]) -> Result<(), ValidationError> {
    let text_checks = [
        (&company.name, "Company name", "companyInfo.name"),
        (&company.address, "Company address", "companyInfo.address"),
        (&company.pin_code, "Company PIN code", "companyInfo.pinCode"),
        (&company.gst_number, "GST number", "companyInfo.gstNumber"),
    ];
    for (value, label, field) in text_checks {
        if !is_present(value) {
            return Err(required(label, field));
        }
    }

    if !uploaded(&company.gst_certificate) {
        return Err(upload_required("GST certificate", "companyInfo.gstCertificate"));
    }
    if !is_present(&company.entity_type) {
        return Err(required("Entity type", "companyInfo.entityType"));
    }
    if !uploaded(&company.entity_certificate) {
        return Err(upload_required(
            "Entity certificate",
            "companyInfo.entityCertificate",
        ));
    }

    if inventors.is_empty() {
        return Err(ValidationError {
            field: "inventors".to_string(),
            reason: ValidationReason::AtLeastOne,
            message: "At least one inventor is required (inventors)".to_string(),
        });
    }

    for (index, inventor) in inventors.iter().enumerate() {
        let fields = [
            (&inventor.name, "name"),
            (&inventor.address, "address"),
            (&inventor.pin_code, "pinCode"),
            (&inventor.nationality, "nationality"),
        ];
        if let Some((_, name)) = fields.iter().find(|(value, _)| !is_present(value)) {
            let path = format!("inventors[{index}].{name}");
            return Err(ValidationError {
                message: format!("Inventor {}: {} is required ({})", index + 1, name, path),
                field: path,
                reason: ValidationReason::Required,
            });
        }
    }

    Ok(())
}
