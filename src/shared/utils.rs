//! Utility functions and helpers

use alloy_primitives::U256;

/// Format a raw token amount with its decimals
pub fn format_amount(amount: U256, decimals: u8) -> String {
    format!("{:.6}", to_ui_amount(amount, decimals))
}

/// Convert a raw token amount to a floating point UI amount.
/// Only for logging and the USD policy layer.
pub fn to_ui_amount(amount: U256, decimals: u8) -> f64 {
    u256_to_f64(amount) / 10_f64.powi(decimals as i32)
}

/// Lossy U256 -> f64 conversion
pub fn u256_to_f64(value: U256) -> f64 {
    value.to_string().parse::<f64>().unwrap_or(f64::MAX)
}

/// Convert a UI amount back to raw units, rounding down.
/// Negative or non-finite inputs map to zero; values beyond u128 saturate.
pub fn from_ui_amount(amount: f64, decimals: u8) -> U256 {
    let raw = amount * 10_f64.powi(decimals as i32);
    if !raw.is_finite() || raw <= 0.0 {
        return U256::ZERO;
    }
    U256::from(raw.floor() as u128)
}

/// Generate unique ID
pub fn generate_id() -> String {
    uuid::Uuid::new_v4().to_string()
}
