//! Delivery addresses.

use core::fmt;

use serde::{Deserialize, Serialize};

use super::id::AddressId;

/// Errors from validating an [`AddressForm`] or acting on the address dialog.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddressError {
    /// A required field is empty after trimming.
    #[error("{0} is required")]
    MissingField(AddressField),

    /// The address dialog only accepts changes between opening and closing.
    #[error("address dialog is not open")]
    DialogClosed,
}

/// Fields of an address form, in the order they are validated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AddressField {
    Name,
    Phone,
    Line1,
    Line2,
    City,
    State,
    Pincode,
}

impl fmt::Display for AddressField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Name => "name",
            Self::Phone => "phone",
            Self::Line1 => "address line 1",
            Self::Line2 => "address line 2",
            Self::City => "city",
            Self::State => "state",
            Self::Pincode => "pincode",
        };
        f.write_str(label)
    }
}

/// A saved delivery address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    pub id: AddressId,
    pub name: String,
    pub phone: String,
    pub line1: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line2: Option<String>,
    pub city: String,
    pub state: String,
    pub pincode: String,
}

impl Address {
    /// Build an address from validated form fields.
    #[must_use]
    pub fn from_fields(id: AddressId, fields: AddressFields) -> Self {
        let AddressFields {
            name,
            phone,
            line1,
            line2,
            city,
            state,
            pincode,
        } = fields;
        Self {
            id,
            name,
            phone,
            line1,
            line2,
            city,
            state,
            pincode,
        }
    }

    /// Overwrite every field except the id.
    pub fn merge(&mut self, fields: AddressFields) {
        let id = self.id.clone();
        *self = Self::from_fields(id, fields);
    }

    /// Three-line block used in order messages:
    ///
    /// ```text
    /// <name> (<phone>)
    /// <line1>[, <line2>]
    /// <city>, <state> - <pincode>
    /// ```
    #[must_use]
    pub fn block(&self) -> String {
        let line2 = self
            .line2
            .as_deref()
            .filter(|l| !l.is_empty())
            .map(|l| format!(", {l}"))
            .unwrap_or_default();
        format!(
            "{} ({})\n{}{line2}\n{}, {} - {}",
            self.name, self.phone, self.line1, self.city, self.state, self.pincode
        )
    }
}

/// Validated, trimmed address fields without an id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddressFields {
    pub name: String,
    pub phone: String,
    pub line1: String,
    pub line2: Option<String>,
    pub city: String,
    pub state: String,
    pub pincode: String,
}

/// Raw address form input. Every field is free text until validated.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddressForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub line1: String,
    #[serde(default)]
    pub line2: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub pincode: String,
}

impl AddressForm {
    /// Pre-fill a form from a saved address (missing `line2` becomes blank).
    #[must_use]
    pub fn from_address(address: &Address) -> Self {
        Self {
            name: address.name.clone(),
            phone: address.phone.clone(),
            line1: address.line1.clone(),
            line2: address.line2.clone().unwrap_or_default(),
            city: address.city.clone(),
            state: address.state.clone(),
            pincode: address.pincode.clone(),
        }
    }

    /// Copy of the form with surrounding whitespace removed from every field.
    #[must_use]
    pub fn trimmed(&self) -> Self {
        Self {
            name: self.name.trim().to_owned(),
            phone: self.phone.trim().to_owned(),
            line1: self.line1.trim().to_owned(),
            line2: self.line2.trim().to_owned(),
            city: self.city.trim().to_owned(),
            state: self.state.trim().to_owned(),
            pincode: self.pincode.trim().to_owned(),
        }
    }

    /// Trim and validate the form.
    ///
    /// # Errors
    ///
    /// Returns [`AddressError::MissingField`] naming the first required
    /// field (name, phone, line 1, city, state, pincode) that is blank.
    pub fn validate(&self) -> Result<AddressFields, AddressError> {
        let t = self.trimmed();

        let required = [
            (AddressField::Name, &t.name),
            (AddressField::Phone, &t.phone),
            (AddressField::Line1, &t.line1),
            (AddressField::City, &t.city),
            (AddressField::State, &t.state),
            (AddressField::Pincode, &t.pincode),
        ];
        if let Some((field, _)) = required.iter().find(|(_, value)| value.is_empty()) {
            return Err(AddressError::MissingField(*field));
        }

        Ok(AddressFields {
            name: t.name,
            phone: t.phone,
            line1: t.line1,
            line2: Some(t.line2).filter(|l| !l.is_empty()),
            city: t.city,
            state: t.state,
            pincode: t.pincode,
        })
    }
}
