//! Typed mapping of RPC `result` values.
//!
//! Every record is built field by field: unknown fields are ignored, missing
//! required fields name themselves in the error, and optional fields accept
//! absence or `null` but not a value of the wrong type.

use serde_json::{Map, Value};

use crate::error::DecodeError;
use crate::types::{Balance, BlockInfo, BlockTx, SimulationResult, TransactionInfo};

type Object = Map<String, Value>;

pub fn block_info_from_json(value: &Value) -> Result<BlockInfo, DecodeError> {
    let obj = as_object(value, "result")?;

    let transactions = match present(obj, "transactions") {
        None => None,
        Some(Value::Array(items)) => Some(
            items
                .iter()
                .enumerate()
                .map(|(i, item)| block_tx_from_json(item, &format!("transactions[{i}]")))
                .collect::<Result<Vec<_>, _>>()?,
        ),
        Some(other) => return Err(invalid("transactions", "expected an array", other)),
    };

    Ok(BlockInfo {
        slot: required_u64(obj, "", "slot")?,
        hash: required_string(obj, "", "hash")?,
        parent_hash: optional_string(obj, "", "parent_hash")?,
        timestamp_ms: optional_i64(obj, "", "timestamp_ms")?,
        leader: optional_string(obj, "", "leader")?,
        transactions,
    })
}

fn block_tx_from_json(value: &Value, path: &str) -> Result<BlockTx, DecodeError> {
    let obj = as_object(value, path)?;
    let prefix = format!("{path}.");
    Ok(BlockTx {
        id: required_string(obj, &prefix, "id")?,
        submitter: optional_string(obj, &prefix, "submitter")?,
        command_type: optional_string(obj, &prefix, "command_type")?,
    })
}

pub fn transaction_info_from_json(value: &Value) -> Result<TransactionInfo, DecodeError> {
    let obj = as_object(value, "result")?;
    Ok(TransactionInfo {
        id: required_string(obj, "", "id")?,
        submitter: optional_string(obj, "", "submitter")?,
        status: optional_string(obj, "", "status")?,
        created_at: optional_i64(obj, "", "created_at")?,
        error: optional_string(obj, "", "error")?,
    })
}

pub fn simulation_result_from_json(value: &Value) -> Result<SimulationResult, DecodeError> {
    let obj = as_object(value, "result")?;

    let ok = match present(obj, "ok") {
        None => return Err(DecodeError::MissingField("ok".to_owned())),
        Some(Value::Bool(b)) => *b,
        Some(other) => return Err(invalid("ok", "expected a boolean", other)),
    };

    let logs = match present(obj, "logs") {
        None => None,
        Some(Value::Array(items)) => Some(
            items
                .iter()
                .enumerate()
                .map(|(i, item)| {
                    item.as_str()
                        .map(str::to_owned)
                        .ok_or_else(|| invalid(&format!("logs[{i}]"), "expected a string", item))
                })
                .collect::<Result<Vec<_>, _>>()?,
        ),
        Some(other) => return Err(invalid("logs", "expected an array of strings", other)),
    };

    Ok(SimulationResult {
        ok,
        logs,
        error: optional_string(obj, "", "error")?,
    })
}

/// Decode a balance given as a JSON integer of any size or a decimal string.
///
/// Numbers keep their original decimal text (serde_json `arbitrary_precision`),
/// so values past `u64::MAX` are never rounded through `f64`.
pub fn balance_from_json(value: &Value) -> Result<Balance, DecodeError> {
    let text = match value {
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.clone(),
        other => return Err(invalid("result", "expected a number or decimal string", other)),
    };
    Balance::from_decimal_str(&text)
        .ok_or_else(|| invalid("result", "expected a non-negative integer", value))
}

pub fn u64_from_json(value: &Value) -> Result<u64, DecodeError> {
    value
        .as_u64()
        .ok_or_else(|| invalid("result", "expected an unsigned integer", value))
}

pub fn string_from_json(value: &Value) -> Result<String, DecodeError> {
    value
        .as_str()
        .map(str::to_owned)
        .ok_or_else(|| invalid("result", "expected a string", value))
}

// ==============================================================================
// Field Helpers
// ==============================================================================

fn as_object<'a>(value: &'a Value, path: &str) -> Result<&'a Object, DecodeError> {
    value
        .as_object()
        .ok_or_else(|| invalid(path, "expected an object", value))
}

/// The field's value, treating `null` the same as absence.
fn present<'a>(obj: &'a Object, name: &str) -> Option<&'a Value> {
    obj.get(name).filter(|v| !v.is_null())
}

fn required_string(obj: &Object, prefix: &str, name: &str) -> Result<String, DecodeError> {
    optional_string(obj, prefix, name)?
        .ok_or_else(|| DecodeError::MissingField(format!("{prefix}{name}")))
}

fn optional_string(obj: &Object, prefix: &str, name: &str) -> Result<Option<String>, DecodeError> {
    match present(obj, name) {
        None => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(other) => Err(invalid(&format!("{prefix}{name}"), "expected a string", other)),
    }
}

fn required_u64(obj: &Object, prefix: &str, name: &str) -> Result<u64, DecodeError> {
    match present(obj, name) {
        None => Err(DecodeError::MissingField(format!("{prefix}{name}"))),
        Some(v) => v.as_u64().ok_or_else(|| {
            invalid(&format!("{prefix}{name}"), "expected an unsigned integer", v)
        }),
    }
}

fn optional_i64(obj: &Object, prefix: &str, name: &str) -> Result<Option<i64>, DecodeError> {
    match present(obj, name) {
        None => Ok(None),
        Some(v) => v
            .as_i64()
            .map(Some)
            .ok_or_else(|| invalid(&format!("{prefix}{name}"), "expected an integer", v)),
    }
}

fn invalid(field: &str, expected: &str, got: &Value) -> DecodeError {
    DecodeError::InvalidField {
        field: field.to_owned(),
        reason: format!("{expected}, got {got}"),
    }
}
