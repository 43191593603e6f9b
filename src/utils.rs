// Utility helpers

use uuid::Uuid;

use crate::error::{AppError, Result};

/// Parses a record id, reporting a malformed-identifier error for `kind`.
pub fn parse_id(kind: &'static str, value: &str) -> Result<Uuid> {
    Uuid::parse_str(value.trim()).map_err(|_| AppError::MalformedId {
        kind,
        value: value.to_string(),
    })
}
