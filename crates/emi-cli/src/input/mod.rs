pub mod file;
pub mod stdin;

use emi_core::EmiError;
use serde::de::DeserializeOwned;
use serde_json::Value;

/// Resolve raw request JSON from `--input <file>`, then piped stdin. Returns
/// `None` when neither is present so the caller can fall back to flags.
pub fn read_request(path: Option<&str>) -> Result<Option<Value>, Box<dyn std::error::Error>> {
    if let Some(path) = path {
        return Ok(Some(file::read_json(path)?));
    }
    stdin::read_stdin()
}

/// Deserialise a request body. Missing or non-numeric fields are reported as
/// `InvalidInput`, the same as values the engine rejects.
pub fn parse_request<T: DeserializeOwned>(value: Value) -> Result<T, EmiError> {
    serde_json::from_value(value).map_err(|e| EmiError::InvalidInput {
        field: "request".into(),
        reason: e.to_string(),
    })
}
