//! Canonical decoding of ledger responses.
//!
//! Campaign rows arrive either as named-field objects or as positional
//! arrays (tuple shape), depending on the node's codec. One decode function
//! tries both shapes and fails loudly with `MalformedResponse` if neither
//! matches; nothing is silently defaulted.

use crate::domain::{CampaignRecord, LedgerEvent, PositionedEvent, Wei};
use crate::foundation::{AccountId, CampaignId, Position, Result, SyncError};
use serde_json::Value;

/// Decode one campaign row. `index` is the 0-based array position in the
/// ledger response; the canonical id is the 1-based `index + 1`.
pub fn decode_campaign(index: usize, row: &Value) -> Result<CampaignRecord> {
    let id = CampaignId::new(index as u64 + 1);
    match row {
        Value::Object(_) => decode_campaign_object(id, row),
        Value::Array(fields) => decode_campaign_tuple(id, fields),
        other => Err(malformed(format!("campaign row {index} is neither object nor tuple: {other}"))),
    }
}

fn decode_campaign_object(id: CampaignId, row: &Value) -> Result<CampaignRecord> {
    Ok(CampaignRecord {
        id,
        title: string_field(row, "title")?,
        description: string_field(row, "description")?,
        category: string_field(row, "category")?,
        image_url: string_field(row, "image")?,
        goal: amount_field(row, "goal")?,
        ledger_raised: amount_field(row, "raised")?,
        owner: AccountId::new(string_field(row, "owner")?),
        withdrawn: bool_field(row, "withdrawn")?,
    })
}

fn decode_campaign_tuple(id: CampaignId, fields: &[Value]) -> Result<CampaignRecord> {
    if fields.len() < 8 {
        return Err(malformed(format!("campaign tuple has {} fields, expected 8", fields.len())));
    }
    Ok(CampaignRecord {
        id,
        title: as_string(&fields[0], "title")?,
        description: as_string(&fields[1], "description")?,
        category: as_string(&fields[2], "category")?,
        image_url: as_string(&fields[3], "image")?,
        goal: as_amount(&fields[4], "goal")?,
        ledger_raised: as_amount(&fields[5], "raised")?,
        owner: AccountId::new(as_string(&fields[6], "owner")?),
        withdrawn: as_bool(&fields[7], "withdrawn")?,
    })
}

pub fn decode_event(row: &Value) -> Result<PositionedEvent> {
    let position = Position::new(u64_field(row, "position")?);
    let log_index = u64_field(row, "log_index")? as u32;
    let timestamp_nanos = u64_field(row, "timestamp_nanos")?;
    let kind = string_field(row, "kind")?;

    let event = match kind.as_str() {
        "campaign_created" => LedgerEvent::CampaignCreated {
            campaign_id: CampaignId::new(u64_field(row, "campaign_id")?),
            owner: AccountId::new(string_field(row, "owner")?),
        },
        "donated" => LedgerEvent::Donated {
            campaign_id: CampaignId::new(u64_field(row, "campaign_id")?),
            donor: AccountId::new(string_field(row, "donor")?),
            amount: amount_field(row, "amount")?,
        },
        "withdrawn" => LedgerEvent::Withdrawn {
            campaign_id: CampaignId::new(u64_field(row, "campaign_id")?),
            amount: amount_field(row, "amount")?,
        },
        other => return Err(malformed(format!("unknown event kind: {other}"))),
    };

    Ok(PositionedEvent { position, log_index, timestamp_nanos, event })
}

pub fn decode_position(value: &Value) -> Result<Position> {
    match value {
        Value::Number(n) => n.as_u64().map(Position::new).ok_or_else(|| malformed(format!("position out of range: {n}"))),
        Value::String(s) => s.parse::<u64>().map(Position::new).map_err(|_| malformed(format!("position is not an integer: {s}"))),
        other => Err(malformed(format!("position is neither number nor string: {other}"))),
    }
}

fn field<'a>(row: &'a Value, name: &str) -> Result<&'a Value> {
    row.get(name).ok_or_else(|| malformed(format!("missing field: {name}")))
}

fn string_field(row: &Value, name: &str) -> Result<String> {
    as_string(field(row, name)?, name)
}

fn amount_field(row: &Value, name: &str) -> Result<Wei> {
    as_amount(field(row, name)?, name)
}

fn bool_field(row: &Value, name: &str) -> Result<bool> {
    as_bool(field(row, name)?, name)
}

fn u64_field(row: &Value, name: &str) -> Result<u64> {
    let value = field(row, name)?;
    match value {
        Value::Number(n) => n.as_u64().ok_or_else(|| malformed(format!("{name} out of range: {n}"))),
        Value::String(s) => s.parse::<u64>().map_err(|_| malformed(format!("{name} is not an integer: {s}"))),
        other => Err(malformed(format!("{name} is neither number nor string: {other}"))),
    }
}

fn as_string(value: &Value, name: &str) -> Result<String> {
    value.as_str().map(str::to_string).ok_or_else(|| malformed(format!("{name} is not a string: {value}")))
}

fn as_bool(value: &Value, name: &str) -> Result<bool> {
    value.as_bool().ok_or_else(|| malformed(format!("{name} is not a bool: {value}")))
}

/// Amounts arrive as decimal strings (preferred, lossless) or as JSON
/// numbers for small values.
fn as_amount(value: &Value, name: &str) -> Result<Wei> {
    match value {
        Value::String(s) => Wei::from_minor_str(s).map_err(|err| malformed(format!("{name}: {err}"))),
        Value::Number(n) => match n.as_u64() {
            Some(v) => Wei::from_minor_str(&v.to_string()).map_err(|err| malformed(format!("{name}: {err}"))),
            None => Err(malformed(format!("{name} is not a non-negative integer: {n}"))),
        },
        other => Err(malformed(format!("{name} is neither string nor number: {other}"))),
    }
}

fn malformed(details: String) -> SyncError {
    SyncError::MalformedResponse(details)
}
