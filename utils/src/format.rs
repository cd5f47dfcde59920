//! Presentation helpers for token amounts and percentages.

use ballot_types::{Amount, MINOR_UNITS_PER_TOKEN};

/// Format minor units as whole tokens with up to six decimals, trailing
/// zeros trimmed: `1_500_000` -> `"1.5"`.
pub fn format_tokens(amount: Amount) -> String {
    let raw = amount.raw();
    let whole = raw / MINOR_UNITS_PER_TOKEN;
    let frac = raw % MINOR_UNITS_PER_TOKEN;
    if frac == 0 {
        return group_thousands(whole);
    }
    let frac = format!("{frac:06}");
    format!("{}.{}", group_thousands(whole), frac.trim_end_matches('0'))
}

/// Compact token amount for narrow columns: `1.2K`, `3.4M`, `5B`.
pub fn format_tokens_compact(amount: Amount) -> String {
    let tokens = amount.as_tokens();
    let (value, suffix) = if tokens >= 1e9 {
        (tokens / 1e9, "B")
    } else if tokens >= 1e6 {
        (tokens / 1e6, "M")
    } else if tokens >= 1e3 {
        (tokens / 1e3, "K")
    } else {
        (tokens, "")
    };
    let s = format!("{value:.1}");
    format!("{}{suffix}", s.strip_suffix(".0").unwrap_or(&s))
}

/// Percentage with two decimals: `12.3456` -> `"12.35%"`.
pub fn format_percent(value: f64) -> String {
    if !value.is_finite() {
        return "-".to_string();
    }
    format!("{value:.2}%")
}

fn group_thousands(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn whole_and_fractional_tokens() {
        assert_eq!(format_tokens(Amount::new(0)), "0");
        assert_eq!(format_tokens(Amount::new(1_500_000)), "1.5");
        assert_eq!(format_tokens(Amount::new(1)), "0.000001");
        assert_eq!(format_tokens(Amount::new(1_000_000_000)), "1,000");
        assert_eq!(format_tokens(Amount::new(1_234_567_890_000)), "1,234,567.89");
    }

    #[test]
    fn compact_suffixes() {
        assert_eq!(format_tokens_compact(Amount::new(500_000_000)), "500");
        assert_eq!(format_tokens_compact(Amount::new(1_200_000_000)), "1.2K");
        assert_eq!(format_tokens_compact(Amount::from_tokens(3_400_000.0)), "3.4M");
        assert_eq!(format_tokens_compact(Amount::from_tokens(5e9)), "5B");
    }

    #[test]
    fn percent_rounding() {
        assert_eq!(format_percent(12.3456), "12.35%");
        assert_eq!(format_percent(0.0), "0.00%");
        assert_eq!(format_percent(f64::NAN), "-");
    }
}
