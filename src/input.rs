use crate::error::{AppResult, Error};
use serde_json::{Map, Value};
use std::fmt;
use std::io::Read;

/// Fields that must be present in the stdin payload
pub const REQUIRED_FIELDS: [&str; 4] = ["email", "password", "startDate", "endDate"];

/// Payload read from stdin
#[derive(Clone, PartialEq, Eq)]
pub struct SyncRequest {
    pub email: String,
    pub password: String,
    pub start_date: String,
    pub end_date: String,
}

impl fmt::Debug for SyncRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SyncRequest")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .field("start_date", &self.start_date)
            .field("end_date", &self.end_date)
            .finish()
    }
}

/// Read the whole of `reader` and parse it as a request
pub fn read_request<R: Read>(mut reader: R) -> AppResult<SyncRequest> {
    let mut raw = String::new();
    reader.read_to_string(&mut raw).map_err(Error::StdinRead)?;
    parse_request(&raw)
}

/// Parse a request, telling invalid JSON apart from missing fields
pub fn parse_request(raw: &str) -> AppResult<SyncRequest> {
    let value: Value = serde_json::from_str(raw).map_err(Error::InvalidJson)?;

    let fields = value
        .as_object()
        .filter(|fields| !fields.is_empty())
        .ok_or(Error::MissingFields)?;

    if !REQUIRED_FIELDS
        .iter()
        .all(|name| fields.get(*name).is_some_and(Value::is_string))
    {
        return Err(Error::MissingFields);
    }

    Ok(SyncRequest {
        email: string_field(fields, "email")?,
        password: string_field(fields, "password")?,
        start_date: string_field(fields, "startDate")?,
        end_date: string_field(fields, "endDate")?,
    })
}

fn string_field(fields: &Map<String, Value>, name: &str) -> AppResult<String> {
    fields
        .get(name)
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or(Error::MissingFields)
}
