// Transient Input
//
// Per-invocation, out-of-band key/value bundle carrying the confidential
// fields of a write. Values never reach the public transaction log, so this
// type never prints them.
//
// Validation is an ordered sequence and stops at the first failure:
// name -> surname -> dni -> hiringDate.

use std::collections::BTreeMap;
use std::fmt;

use crate::record::Employee;

/// Required transient keys, in validation order.
pub const REQUIRED_FIELDS: [&str; 4] = ["name", "surname", "dni", "hiringDate"];

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum TransientError {
    #[error("transient data was not specified")]
    Empty,

    /// `position` is 1-based within [`REQUIRED_FIELDS`].
    #[error("the {field} key was not specified in transient data (required field {position} of 4)")]
    MissingField { field: &'static str, position: usize },

    #[error("the {field} key in transient data is invalid: {reason}")]
    InvalidField { field: &'static str, reason: String },
}

/// Opaque per-call bundle of raw transient values.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct TransientInput {
    entries: BTreeMap<String, Vec<u8>>,
}

impl TransientInput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Vec<u8>>) {
        self.entries.insert(key.into(), value.into());
    }

    /// Builder-style insert.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Vec<u8>>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn get(&self, key: &str) -> Option<&[u8]> {
        self.entries.get(key).map(Vec::as_slice)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Validate the bundle and build the employee it describes.
    ///
    /// A key present with a zero-length value counts as missing.
    pub fn to_employee(&self) -> Result<Employee, TransientError> {
        if self.is_empty() {
            return Err(TransientError::Empty);
        }

        let name = self.text(0)?;
        let surname = self.text(1)?;
        let dni = self.integer(2)?;
        let hiring_date = self.text(3)?;

        Ok(Employee {
            name,
            surname,
            dni,
            hiring_date,
        })
    }

    fn require(&self, index: usize) -> Result<&[u8], TransientError> {
        let field = REQUIRED_FIELDS[index];
        match self.get(field) {
            Some(value) if !value.is_empty() => Ok(value),
            _ => Err(TransientError::MissingField {
                field,
                position: index + 1,
            }),
        }
    }

    fn text(&self, index: usize) -> Result<String, TransientError> {
        let raw = self.require(index)?;
        String::from_utf8(raw.to_vec()).map_err(|_| TransientError::InvalidField {
            field: REQUIRED_FIELDS[index],
            reason: "value is not valid UTF-8".into(),
        })
    }

    fn integer(&self, index: usize) -> Result<i64, TransientError> {
        let field = REQUIRED_FIELDS[index];
        let text = self.text(index)?;
        text.trim()
            .parse::<i64>()
            .map_err(|e| TransientError::InvalidField {
                field,
                reason: format!("expected a base-10 integer: {e}"),
            })
    }
}

impl<K: Into<String>, V: Into<Vec<u8>>> FromIterator<(K, V)> for TransientInput {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            entries: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

// Keys only.
impl fmt::Debug for TransientInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.entries.keys()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full() -> TransientInput {
        TransientInput::new()
            .with("name", "J")
            .with("surname", "Doe")
            .with("dni", "123")
            .with("hiringDate", "2020-01-01")
    }

    #[test]
    fn builds_employee_from_complete_input() {
        let employee = full().to_employee().unwrap();
        assert_eq!(employee, Employee::new("J", "Doe", 123, "2020-01-01"));
    }

    #[test]
    fn empty_input_is_rejected() {
        assert_eq!(
            TransientInput::new().to_employee(),
            Err(TransientError::Empty)
        );
    }

    #[test]
    fn first_missing_field_in_order_is_reported() {
        let input = TransientInput::new()
            .with("name", "J")
            .with("surname", "Doe");

        assert_eq!(
            input.to_employee(),
            Err(TransientError::MissingField {
                field: "dni",
                position: 3
            })
        );
    }

    #[test]
    fn unrelated_keys_do_not_satisfy_name() {
        let input = TransientInput::new().with("prVal", "125");

        let err = input.to_employee().unwrap_err();
        assert_eq!(
            err.to_string(),
            "the name key was not specified in transient data (required field 1 of 4)"
        );
    }

    #[test]
    fn zero_length_value_counts_as_missing() {
        let input = full().with("surname", "");

        assert_eq!(
            input.to_employee(),
            Err(TransientError::MissingField {
                field: "surname",
                position: 2
            })
        );
    }

    #[test]
    fn non_numeric_dni_is_invalid() {
        let input = full().with("dni", "12a");

        let err = input.to_employee().unwrap_err();
        assert!(matches!(err, TransientError::InvalidField { field: "dni", .. }));
    }

    #[test]
    fn invalid_dni_reported_before_missing_hiring_date() {
        let input = TransientInput::new()
            .with("name", "J")
            .with("surname", "Doe")
            .with("dni", "x");

        assert!(matches!(
            input.to_employee(),
            Err(TransientError::InvalidField { field: "dni", .. })
        ));
    }

    #[test]
    fn debug_output_hides_values() {
        let rendered = format!("{:?}", full());
        assert!(rendered.contains("surname"));
        assert!(!rendered.contains("Doe"));
    }
}
