// src/analysis/format.rs
use serde_json::Value;

const SIGNIFICANT_DIGITS: i32 = 3;
const EXPONENT_DECIMALS: usize = 3;

/// Three significant figures, scientific notation below 0.001 or from 1000 up
pub fn format_metric(n: f64) -> String {
    if !n.is_finite() {
        return n.to_string();
    }
    let abs = n.abs();
    if (abs != 0.0 && abs < 0.001) || abs >= 1000.0 {
        return format!("{:.*e}", EXPONENT_DECIMALS, n);
    }
    if abs == 0.0 {
        return format!("{:.*}", (SIGNIFICANT_DIGITS - 1) as usize, 0.0);
    }

    let magnitude = abs.log10().floor() as i32;
    let decimals = (SIGNIFICANT_DIGITS - 1 - magnitude).max(0);
    let rounded = format!("{:.*}", decimals as usize, n);
    let Ok(r) = rounded.parse::<f64>() else {
        return rounded;
    };
    // 999.96 rounds up to 1000
    if r.abs() >= 1000.0 {
        return format!("{:.*e}", EXPONENT_DECIMALS, r);
    }
    // 9.996 rounds up to 10.00, which has one significant figure too many
    if r.abs() >= 10f64.powi(magnitude + 1) && decimals > 0 {
        return format!("{:.*}", (decimals - 1) as usize, n);
    }
    rounded
}

/// Table cell text for a raw field value
pub fn format_cell(value: Option<&Value>) -> String {
    match value {
        Some(Value::Number(n)) if n.is_f64() => n.as_f64().map(format_metric).unwrap_or_default(),
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::String(s)) => s.clone(),
        Some(Value::Bool(b)) => b.to_string(),
        Some(Value::Null) | None => String::new(),
        Some(other) => other.to_string(),
    }
}
