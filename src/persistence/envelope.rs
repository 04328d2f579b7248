//! Versioned JSON envelope
//!
//! Current payloads are written as `{"v": 1, "data": {...}}`. Payloads from
//! the first release were the bare record with no envelope.

use serde::Serialize;
use serde_json::Value;

use crate::consts::SCHEMA_VERSION;
use crate::form::FormRecord;

/// What `save` writes
#[derive(Debug, Serialize)]
pub struct Envelope<'a> {
    pub v: u32,
    pub data: &'a FormRecord,
}

impl<'a> Envelope<'a> {
    pub fn current(data: &'a FormRecord) -> Self {
        Self {
            v: SCHEMA_VERSION,
            data,
        }
    }
}

/// Shape of a stored payload after parsing
#[derive(Debug, PartialEq)]
pub enum Payload {
    /// `{v, data}` envelope; `version` is `None` if `v` is missing or not an integer
    Versioned {
        version: Option<u64>,
        data: FormRecord,
    },
    /// Bare record without envelope
    Legacy(FormRecord),
    /// Not JSON, not an object, or an envelope whose `data` is not an object
    Corrupt,
}

impl Payload {
    /// Classify raw stored text
    pub fn parse(raw: &str) -> Self {
        let Ok(Value::Object(mut obj)) = serde_json::from_str::<Value>(raw) else {
            return Payload::Corrupt;
        };

        match obj.remove("data") {
            Some(Value::Object(data)) => Payload::Versioned {
                version: obj.get("v").and_then(Value::as_u64),
                data,
            },
            Some(_) => Payload::Corrupt,
            None => Payload::Legacy(obj),
        }
    }
}
