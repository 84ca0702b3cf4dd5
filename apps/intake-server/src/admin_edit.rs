//! Typed admin edits over the known editable fields of a record.

use intake_storage::{InvitationRecord, Inventor};
use serde::Deserialize;

use crate::error::LifecycleError;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CompanyField {
    Name,
    Address,
    PinCode,
    GstNumber,
    EntityType,
}

impl CompanyField {
    fn as_str(&self) -> &'static str {
        match self {
            CompanyField::Name => "name",
            CompanyField::Address => "address",
            CompanyField::PinCode => "pinCode",
            CompanyField::GstNumber => "gstNumber",
            CompanyField::EntityType => "entityType",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ApplicantField {
    Name,
    Email,
    Phone,
    Designation,
    Address,
}

impl ApplicantField {
    fn as_str(&self) -> &'static str {
        match self {
            ApplicantField::Name => "name",
            ApplicantField::Email => "email",
            ApplicantField::Phone => "phone",
            ApplicantField::Designation => "designation",
            ApplicantField::Address => "address",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum InventorField {
    Name,
    Address,
    PinCode,
    Nationality,
    Email,
    Phone,
}

impl InventorField {
    fn as_str(&self) -> &'static str {
        match self {
            InventorField::Name => "name",
            InventorField::Address => "address",
            InventorField::PinCode => "pinCode",
            InventorField::Nationality => "nationality",
            InventorField::Email => "email",
            InventorField::Phone => "phone",
        }
    }
}

/// One admin edit. A `null` or missing `value` clears the field.
///
/// ```json
/// {"section": "companyInfo", "field": "gstNumber", "value": "29ABCDE1234F1Z5"}
/// {"section": "inventor", "index": 1, "field": "nationality", "value": "Indian"}
/// {"section": "removeInventor", "index": 0}
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(tag = "section", rename_all = "camelCase")]
pub enum AdminEdit {
    CompanyInfo {
        field: CompanyField,
        #[serde(default)]
        value: Option<String>,
    },
    ApplicantInfo {
        field: ApplicantField,
        #[serde(default)]
        value: Option<String>,
    },
    Inventor {
        index: usize,
        field: InventorField,
        #[serde(default)]
        value: Option<String>,
    },
    AddInventor {
        inventor: Inventor,
    },
    RemoveInventor {
        index: usize,
    },
    Comments {
        #[serde(default)]
        value: Option<String>,
    },
}

impl AdminEdit {
    /// Dotted path of the edited field, recorded in history.
    pub fn path(&self) -> String {
        match self {
            AdminEdit::CompanyInfo { field, .. } => format!("companyInfo.{}", field.as_str()),
            AdminEdit::ApplicantInfo { field, .. } => format!("applicantInfo.{}", field.as_str()),
            AdminEdit::Inventor { index, field, .. } => {
                format!("inventors[{index}].{}", field.as_str())
            }
            AdminEdit::AddInventor { .. } => "inventors".to_string(),
            AdminEdit::RemoveInventor { index } => format!("inventors[{index}]"),
            AdminEdit::Comments { .. } => "comments".to_string(),
        }
    }

    /// Apply to `record`. Locks bind client writes only, so locked sections are editable here.
    pub fn apply(&self, record: &mut InvitationRecord) -> Result<(), LifecycleError> {
        match self {
            AdminEdit::CompanyInfo { field, value } => {
                let company = &mut record.company_info;
                let slot = match field {
                    CompanyField::Name => &mut company.name,
                    CompanyField::Address => &mut company.address,
                    CompanyField::PinCode => &mut company.pin_code,
                    CompanyField::GstNumber => &mut company.gst_number,
                    CompanyField::EntityType => &mut company.entity_type,
                };
                *slot = value.clone();
            }
            AdminEdit::ApplicantInfo { field, value } => {
                let applicant = &mut record.applicant_info;
                let slot = match field {
                    ApplicantField::Name => &mut applicant.name,
                    ApplicantField::Email => &mut applicant.email,
                    ApplicantField::Phone => &mut applicant.phone,
                    ApplicantField::Designation => &mut applicant.designation,
                    ApplicantField::Address => &mut applicant.address,
                };
                *slot = value.clone();
            }
            AdminEdit::Inventor {
                index,
                field,
                value,
            } => {
                let count = record.inventors.len();
                let inventor = record
                    .inventors
                    .get_mut(*index)
                    .ok_or_else(|| out_of_range(*index, count))?;
                let slot = match field {
                    InventorField::Name => &mut inventor.name,
                    InventorField::Address => &mut inventor.address,
                    InventorField::PinCode => &mut inventor.pin_code,
                    InventorField::Nationality => &mut inventor.nationality,
                    InventorField::Email => &mut inventor.email,
                    InventorField::Phone => &mut inventor.phone,
                };
                *slot = value.clone();
            }
            AdminEdit::AddInventor { inventor } => record.inventors.push(inventor.clone()),
            AdminEdit::RemoveInventor { index } => {
                if *index >= record.inventors.len() {
                    return Err(out_of_range(*index, record.inventors.len()));
                }
                record.inventors.remove(*index);
            }
            AdminEdit::Comments { value } => record.comments = value.clone(),
        }
        Ok(())
    }
}

fn out_of_range(index: usize, count: usize) -> LifecycleError {
    LifecycleError::InvalidEdit(format!(
        "inventor index {index} is out of range ({count} inventors)"
    ))
}
