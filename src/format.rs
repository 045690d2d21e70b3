use rust_decimal::{Decimal, RoundingStrategy};

use crate::models::FiatInfo;

fn group_int_digits(int_part: &str) -> String {
    let mut out = String::with_capacity(int_part.len() + int_part.len() / 3);
    let len = int_part.len();
    for (i, ch) in int_part.chars().enumerate() {
        out.push(ch);
        let remaining = len - (i + 1);
        if remaining > 0 && remaining % 3 == 0 {
            out.push(',');
        }
    }
    out
}

/// Pad or cut the fractional part to exactly `dp` digits.
fn fix_fraction(s: &str, dp: u32) -> String {
    let (int_part, frac_part) = s.split_once('.').unwrap_or((s, ""));
    if dp == 0 {
        return int_part.to_string();
    }
    let mut frac: String = frac_part.chars().take(dp as usize).collect();
    while frac.len() < dp as usize {
        frac.push('0');
    }
    format!("{int_part}.{frac}")
}

/// Render an unsigned amount with fixed decimals and optional grouping.
fn render_amount(abs: f64, decimals: u32, grouping: bool) -> String {
    let digits = match Decimal::from_f64_retain(abs) {
        Some(d) => {
            let rounded = d.round_dp_with_strategy(decimals, RoundingStrategy::MidpointAwayFromZero);
            fix_fraction(&rounded.normalize().to_string(), decimals)
        }
        // Beyond Decimal's range; nothing sensible to group.
        None => return format!("{abs:.prec$}", prec = decimals as usize),
    };

    if !grouping {
        return digits;
    }
    match digits.split_once('.') {
        Some((int_part, frac)) => format!("{}.{frac}", group_int_digits(int_part)),
        None => group_int_digits(&digits),
    }
}

/// Format a fiat value for display, e.g. `R$ 24,990.00`.
///
/// The sign precedes the symbol: `-$ 12.50`.
pub fn format_fiat(value: f64, fiat: &FiatInfo, decimals: u32, grouping: bool) -> String {
    if !value.is_finite() {
        return format!("{} -", fiat.symbol);
    }
    let amount = render_amount(value.abs(), decimals, grouping);
    let zero = amount.chars().all(|c| matches!(c, '0' | '.' | ','));
    let sign = if value < 0.0 && !zero { "-" } else { "" };
    format!("{sign}{} {amount}", fiat.symbol)
}

/// Percent change with an explicit sign, e.g. `+2.50%`.
pub fn format_percent(change: f64) -> String {
    if change >= 0.0 {
        format!("+{change:.2}%")
    } else {
        format!("{change:.2}%")
    }
}

/// Token quantity without trailing zeros, up to eight decimals.
pub fn format_quantity(balance: f64) -> String {
    match Decimal::from_f64_retain(balance) {
        Some(d) => d
            .round_dp_with_strategy(8, RoundingStrategy::MidpointAwayFromZero)
            .normalize()
            .to_string(),
        None => format!("{balance}"),
    }
}
