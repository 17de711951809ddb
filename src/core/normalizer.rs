use crate::domain::model::{ConsoleLog, PropertyRecord, RawApiRecord};
use crate::utils::error::NormalizeError;
use alloy_primitives::U256;
use serde_json::Value;

pub const ADDRESS_FIELD: &str = "UnparsedAddress";
pub const YEAR_BUILT_FIELD: &str = "YearBuilt";
pub const LOT_SIZE_FIELD: &str = "LotSizeSquareFeet";

/// Extracts the property fields and coerces them to their on-chain types.
///
/// Numeric fields accept JSON numbers and numeric strings; fractional parts are
/// truncated toward zero. One diagnostic line per field is written to `console`.
pub fn normalize(
    raw: &RawApiRecord,
    console: &mut ConsoleLog,
) -> Result<PropertyRecord, NormalizeError> {
    let address = extract_address(raw.get(ADDRESS_FIELD))?;
    console.log(format!("Real Estate Address: {}", address));

    let year_built = coerce_uint(YEAR_BUILT_FIELD, raw.get(YEAR_BUILT_FIELD))?;
    console.log(format!("Year Built: {}", year_built));

    let lot_size_square_feet = coerce_uint(LOT_SIZE_FIELD, raw.get(LOT_SIZE_FIELD))?;
    console.log(format!("Lot Size Square Feet: {}", lot_size_square_feet));

    Ok(PropertyRecord {
        address,
        year_built,
        lot_size_square_feet,
    })
}

fn extract_address(value: Option<&Value>) -> Result<String, NormalizeError> {
    match value {
        Some(Value::String(s)) if !s.is_empty() => Ok(s.clone()),
        None | Some(Value::Null) | Some(Value::String(_)) => Err(NormalizeError::MissingField {
            field: ADDRESS_FIELD.to_string(),
        }),
        Some(other) => Err(NormalizeError::InvalidString {
            field: ADDRESS_FIELD.to_string(),
            value: other.to_string(),
        }),
    }
}

pub fn coerce_uint(field: &str, value: Option<&Value>) -> Result<U256, NormalizeError> {
    let invalid = |value: String, reason: &str| NormalizeError::InvalidNumber {
        field: field.to_string(),
        value,
        reason: reason.to_string(),
    };

    match value {
        None => Err(invalid("<absent>".to_string(), "field is absent")),
        Some(Value::Number(n)) => {
            if let Some(u) = n.as_u64() {
                return Ok(U256::from(u));
            }
            if n.as_i64().is_some() {
                return Err(invalid(n.to_string(), "value is negative"));
            }
            let f = n
                .as_f64()
                .ok_or_else(|| invalid(n.to_string(), "value is not a number"))?;
            float_to_uint(f).map_err(|reason| invalid(n.to_string(), reason))
        }
        Some(Value::String(s)) => parse_numeric_str(s).map_err(|reason| invalid(s.clone(), reason)),
        Some(other) => Err(invalid(
            other.to_string(),
            "expected a number or a numeric string",
        )),
    }
}

fn parse_numeric_str(raw: &str) -> Result<U256, &'static str> {
    let s = raw.trim();
    if s.is_empty() {
        return Err("value is empty");
    }

    if let Some(hex_digits) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        if hex_digits.is_empty() || !hex_digits.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err("value is not a number");
        }
        return U256::from_str_radix(hex_digits, 16).map_err(|_| "value exceeds 256 bits");
    }

    // 純十進位字串直接取整數部分，避免經過 f64 損失精度
    let unsigned = s.strip_prefix('+').unwrap_or(s);
    let (int_part, frac_part) = unsigned.split_once('.').unwrap_or((unsigned, ""));
    let all_digits = |part: &str| part.bytes().all(|b| b.is_ascii_digit());
    if all_digits(int_part)
        && all_digits(frac_part)
        && !(int_part.is_empty() && frac_part.is_empty())
    {
        if int_part.is_empty() {
            return Ok(U256::ZERO);
        }
        return U256::from_str_radix(int_part, 10).map_err(|_| "value exceeds 256 bits");
    }

    let f: f64 = s.parse().map_err(|_| "value is not a number")?;
    float_to_uint(f)
}

fn float_to_uint(f: f64) -> Result<U256, &'static str> {
    if !f.is_finite() {
        return Err("value is not finite");
    }
    if f < 0.0 {
        return Err("value is negative");
    }
    let truncated = f.trunc();
    if truncated < u64::MAX as f64 {
        return Ok(U256::from(truncated as u64));
    }
    U256::from_str_radix(&format!("{:.0}", truncated), 10).map_err(|_| "value exceeds 256 bits")
}
