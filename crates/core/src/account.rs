//! Customer profile fields and the checks built on them.

use serde::{Deserialize, Serialize};

/// Editable profile fields, shared by the storefront profile page and the
/// back-office user editor.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileFields {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub postal_code: Option<String>,
    pub city: Option<String>,
    pub country: Option<String>,
}

/// A profile field that failed validation.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("{field} must be at most {max} characters")]
pub struct FieldTooLong {
    pub field: &'static str,
    pub max: usize,
}

impl ProfileFields {
    /// Longest accepted value for most text fields.
    pub const MAX_TEXT: usize = 255;
    /// Longest accepted phone number.
    pub const MAX_PHONE: usize = 20;
    /// Longest accepted postal code.
    pub const MAX_POSTAL_CODE: usize = 10;

    /// Trim every field and turn blanks into `None`.
    #[must_use]
    pub fn normalized(self) -> Self {
        let clean = |v: Option<String>| {
            v.map(|s| s.trim().to_owned()).filter(|s| !s.is_empty())
        };
        Self {
            first_name: clean(self.first_name),
            last_name: clean(self.last_name),
            phone: clean(self.phone),
            address: clean(self.address),
            postal_code: clean(self.postal_code),
            city: clean(self.city),
            country: clean(self.country),
        }
    }

    /// Check field lengths.
    ///
    /// # Errors
    ///
    /// Returns the first field that is too long.
    pub fn validate(&self) -> Result<(), FieldTooLong> {
        let checks: [(&'static str, &Option<String>, usize); 7] = [
            ("first name", &self.first_name, Self::MAX_TEXT),
            ("last name", &self.last_name, Self::MAX_TEXT),
            ("phone", &self.phone, Self::MAX_PHONE),
            ("address", &self.address, Self::MAX_TEXT),
            ("postal code", &self.postal_code, Self::MAX_POSTAL_CODE),
            ("city", &self.city, Self::MAX_TEXT),
            ("country", &self.country, Self::MAX_TEXT),
        ];

        for (field, value, max) in checks {
            if value.as_deref().is_some_and(|v| v.chars().count() > max) {
                return Err(FieldTooLong { field, max });
            }
        }
        Ok(())
    }

    /// The shipping details checkout needs, if they are all filled in.
    #[must_use]
    pub fn shipping_details(&self) -> Option<ShippingDetails> {
        let filled = |v: &Option<String>| {
            v.as_deref()
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(ToOwned::to_owned)
        };
        Some(ShippingDetails {
            first_name: filled(&self.first_name)?,
            last_name: filled(&self.last_name)?,
            phone: filled(&self.phone)?,
            address: filled(&self.address)?,
            postal_code: filled(&self.postal_code)?,
            city: filled(&self.city)?,
            country: filled(&self.country),
        })
    }
}

/// Complete shipping details. Only [`ProfileFields::shipping_details`]
/// constructs one, so holding a value proves checkout may proceed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ShippingDetails {
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
    pub address: String,
    pub postal_code: String,
    pub city: String,
    pub country: Option<String>,
}

impl ShippingDetails {
    /// "First Last".
    #[must_use]
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn complete() -> ProfileFields {
        ProfileFields {
            first_name: Some("Ada".to_owned()),
            last_name: Some("Lovelace".to_owned()),
            phone: Some("0601020304".to_owned()),
            address: Some("12 rue des Lilas".to_owned()),
            postal_code: Some("75011".to_owned()),
            city: Some("Paris".to_owned()),
            country: None,
        }
    }

    #[test]
    fn test_complete_profile_can_ship() {
        let details = complete().shipping_details().unwrap();
        assert_eq!(details.full_name(), "Ada Lovelace");
        assert_eq!(details.country, None);
    }

    #[test]
    fn test_any_missing_field_blocks_shipping() {
        let mut fields = complete();
        fields.phone = Some("   ".to_owned());
        assert!(fields.shipping_details().is_none());

        let mut fields = complete();
        fields.city = None;
        assert!(fields.shipping_details().is_none());
    }

    #[test]
    fn test_normalized_drops_blanks() {
        let fields = ProfileFields {
            first_name: Some("  Ada ".to_owned()),
            city: Some(String::new()),
            ..ProfileFields::default()
        }
        .normalized();
        assert_eq!(fields.first_name.as_deref(), Some("Ada"));
        assert_eq!(fields.city, None);
    }

    #[test]
    fn test_length_limits() {
        assert!(complete().validate().is_ok());

        let mut fields = complete();
        fields.phone = Some("0".repeat(21));
        assert_eq!(
            fields.validate(),
            Err(FieldTooLong { field: "phone", max: 20 })
        );

        let mut fields = complete();
        fields.postal_code = Some("12345678901".to_owned());
        assert_eq!(fields.validate().unwrap_err().field, "postal code");

        let mut fields = complete();
        fields.city = Some("é".repeat(255));
        assert!(fields.validate().is_ok());
    }
}
