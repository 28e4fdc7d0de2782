// Employee Record
//
// The confidential entity kept in an organization's private partition.
// Its serialized byte form is the input to the public commitment, so the
// encoding here must stay stable across writes and verification.

use serde::{Deserialize, Serialize};

/// A single employee record.
///
/// Field declaration order is the serialization order:
/// `name`, `surname`, `dni`, `hiringDate`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Employee {
    pub name: String,
    pub surname: String,
    /// National identity number.
    pub dni: i64,
    /// Opaque date-like string, never parsed.
    pub hiring_date: String,
}

#[derive(Debug, thiserror::Error)]
pub enum RecordError {
    #[error("failed to encode employee: {0}")]
    Encode(#[source] serde_json::Error),

    #[error("content is not a valid employee record: {0}")]
    Decode(#[source] serde_json::Error),
}

impl Employee {
    pub fn new(
        name: impl Into<String>,
        surname: impl Into<String>,
        dni: i64,
        hiring_date: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            surname: surname.into(),
            dni,
            hiring_date: hiring_date.into(),
        }
    }

    /// Canonical byte form written to the private partition and hashed
    /// into the commitment.
    pub fn to_bytes(&self) -> Result<Vec<u8>, RecordError> {
        serde_json::to_vec(self).map_err(RecordError::Encode)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, RecordError> {
        serde_json::from_slice(bytes).map_err(RecordError::Decode)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_in_fixed_field_order() {
        let employee = Employee::new("J", "Doe", 123, "2020-01-01");
        let bytes = employee.to_bytes().unwrap();

        assert_eq!(
            String::from_utf8(bytes).unwrap(),
            r#"{"name":"J","surname":"Doe","dni":123,"hiringDate":"2020-01-01"}"#
        );
    }

    #[test]
    fn decodes_regardless_of_key_order() {
        let json = br#"{"hiringDate":"2021-03-04","dni":7,"surname":"Roe","name":"R"}"#;
        let employee = Employee::from_bytes(json).unwrap();

        assert_eq!(employee, Employee::new("R", "Roe", 7, "2021-03-04"));
    }

    #[test]
    fn rejects_foreign_content() {
        let err = Employee::from_bytes(br#"{"privateValue":"150"}"#).unwrap_err();
        assert!(matches!(err, RecordError::Decode(_)));
    }
}
