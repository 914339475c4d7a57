//! Rounding helpers shared by every calculator
//!
//! Money is reported to cents, rates to basis points. Intermediate values keep
//! full precision; only reported figures pass through here.

/// Decimal places for monetary amounts
pub const MONEY_DECIMALS: u32 = 2;

/// Decimal places for rates (basis-point precision)
pub const RATE_DECIMALS: u32 = 4;

/// Round to an arbitrary number of decimal places (half away from zero)
pub fn round_to(value: f64, decimals: u32) -> f64 {
    let factor = 10f64.powi(decimals as i32);
    let rounded = (value * factor).round() / factor;
    // Avoid reporting -0.0
    if rounded == 0.0 {
        0.0
    } else {
        rounded
    }
}

/// Round a monetary amount to cents
pub fn round_to_cents(value: f64) -> f64 {
    round_to(value, MONEY_DECIMALS)
}

/// Round a rate to four decimals
pub fn round_rate(value: f64) -> f64 {
    round_to(value, RATE_DECIMALS)
}

/// Convert a percentage-per-annum figure (e.g. 7.0) to a decimal rate (0.07)
pub fn pct_to_rate(pct: f64) -> f64 {
    pct / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_to_cents() {
        assert_eq!(round_to_cents(4288.004), 4288.0);
        assert_eq!(round_to_cents(1.236), 1.24);
        assert_eq!(round_to_cents(-12.346), -12.35);
    }

    #[test]
    fn test_round_rate() {
        assert_eq!(round_rate(0.115_289), 0.1153);
        assert_eq!(round_rate(1.0 / 3.0), 0.3333);
    }

    #[test]
    fn test_no_negative_zero() {
        let r = round_to_cents(-0.001);
        assert!(r == 0.0 && r.is_sign_positive());
    }

    #[test]
    fn test_pct_to_rate() {
        assert!((pct_to_rate(7.0) - 0.07).abs() < 1e-12);
    }
}
