//! Typed parsing of questionnaire metadata cells.

/// Parses an integer cell. Blank input is `Ok(None)`; exports sometimes
/// write whole numbers as `100.0`, which is accepted.
pub fn parse_integer(value: &str) -> Result<Option<i64>, String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    if let Ok(parsed) = trimmed.parse::<i64>() {
        return Ok(Some(parsed));
    }
    match trimmed.parse::<f64>() {
        Ok(parsed) if parsed.fract() == 0.0 && (-I64_BOUND..I64_BOUND).contains(&parsed) => {
            Ok(Some(parsed as i64))
        }
        _ => Err(trimmed.to_string()),
    }
}

/// 2^63; whole floats in `[-2^63, 2^63)` convert to `i64` exactly.
const I64_BOUND: f64 = 9_223_372_036_854_775_808.0;

/// Parses a boolean flag cell (`True`/`False`, `1`/`0`, `Yes`/`No`).
pub fn parse_flag(value: &str) -> Result<Option<bool>, String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    match trimmed.to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "y" => Ok(Some(true)),
        "false" | "0" | "no" | "n" => Ok(Some(false)),
        _ => Err(trimmed.to_string()),
    }
}
