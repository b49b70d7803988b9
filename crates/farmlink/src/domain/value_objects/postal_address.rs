//! PostalAddress - Delivery destination in province / district / ward form

use serde::{Deserialize, Serialize};

use crate::domain::errors::DomainError;

/// Receiver and location details of a delivery address
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PostalAddress {
    pub receiver_name: String,
    pub receiver_phone: String,
    pub province: String,
    pub district: String,
    pub ward: String,
    pub detail: String,
}

impl PostalAddress {
    /// Trim every field, normalize the phone number and reject blanks
    pub fn normalized(self) -> Result<Self, DomainError> {
        let field = |name: &str, value: String| -> Result<String, DomainError> {
            let trimmed = value.trim().to_string();
            if trimmed.is_empty() {
                Err(DomainError::validation(format!("{} is required", name)))
            } else {
                Ok(trimmed)
            }
        };

        Ok(Self {
            receiver_name: field("receiver_name", self.receiver_name)?,
            receiver_phone: normalize_phone(&self.receiver_phone)?,
            province: field("province", self.province)?,
            district: field("district", self.district)?,
            ward: field("ward", self.ward)?,
            detail: field("detail", self.detail)?,
        })
    }

    /// Single-line rendering, most specific part first
    pub fn one_line(&self) -> String {
        format!(
            "{}, {}, {}, {}",
            self.detail, self.ward, self.district, self.province
        )
    }
}

/// Accepts `0xxxxxxxxx` or `+84xxxxxxxxx`; spaces, dots and dashes are ignored.
pub fn normalize_phone(raw: &str) -> Result<String, DomainError> {
    let compact: String = raw
        .chars()
        .filter(|c| !matches!(c, ' ' | '.' | '-'))
        .collect();

    let (prefix, rest) = if let Some(rest) = compact.strip_prefix("+84") {
        ("+84", rest)
    } else if let Some(rest) = compact.strip_prefix('0') {
        ("0", rest)
    } else {
        return Err(DomainError::validation("phone must start with 0 or +84"));
    };

    if rest.len() != 9 || !rest.chars().all(|c| c.is_ascii_digit()) {
        return Err(DomainError::validation("phone must have 10 digits"));
    }

    Ok(format!("{}{}", prefix, rest))
}
