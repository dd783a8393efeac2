/// Amount conversion and display helpers shared by the store, the CLI and
/// the quote sources

/// Convert a UI amount ("1.5") into the token's smallest unit
///
/// Exact decimal-string arithmetic: fraction digits beyond `decimals` are
/// truncated, never rounded. Returns `None` for anything that is not a plain
/// non-negative decimal number or that overflows `u128`.
pub fn to_smallest_unit(amount: &str, decimals: u8) -> Option<u128> {
    let amount = amount.trim();
    if amount.is_empty() {
        return None;
    }

    let (int_part, frac_part) = match amount.split_once('.') {
        Some((int_part, frac_part)) => (int_part, frac_part),
        None => (amount, ""),
    };

    if int_part.is_empty() && frac_part.is_empty() {
        return None;
    }
    if !int_part.chars().all(|c| c.is_ascii_digit()) || !frac_part.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }

    let decimals = decimals as usize;
    let mut digits = String::with_capacity(int_part.len() + decimals);
    digits.push_str(int_part);
    let kept = &frac_part[..frac_part.len().min(decimals)];
    digits.push_str(kept);
    digits.extend(std::iter::repeat('0').take(decimals - kept.len()));

    let digits = digits.trim_start_matches('0');
    if digits.is_empty() {
        return Some(0);
    }
    digits.parse::<u128>().ok()
}

/// A UI amount worth fetching a quote for
pub fn is_positive_amount(amount: &str) -> bool {
    matches!(amount.trim().parse::<f64>(), Ok(value) if value.is_finite() && value > 0.0)
}

/// `raw / 10^decimals`; unparsable raw amounts normalize to zero
pub fn normalize_amount(raw: &str, decimals: u8) -> f64 {
    match raw.trim().parse::<u128>() {
        Ok(value) => value as f64 / 10f64.powi(decimals as i32),
        Err(_) => 0.0,
    }
}

/// Output amount as shown next to the amount field: 6 decimals for tokens
/// with more than 4, otherwise the token's own precision
pub fn format_output_amount(raw: &str, decimals: u8) -> String {
    let precision = if decimals > 4 { 6 } else { decimals as usize };
    format!("{:.*}", precision, normalize_amount(raw, decimals))
}

/// Compact display of a raw amount (K/M/B suffixes)
pub fn format_amount(raw: &str, decimals: u8) -> String {
    let num = normalize_amount(raw, decimals);
    if num == 0.0 {
        "0".to_string()
    } else if num < 0.001 {
        format!("{:.2e}", num)
    } else if num < 1.0 {
        format!("{:.4}", num)
    } else if num < 1_000.0 {
        format!("{:.2}", num)
    } else if num < 1_000_000.0 {
        format!("{:.2}K", num / 1_000.0)
    } else if num < 1_000_000_000.0 {
        format!("{:.2}M", num / 1_000_000.0)
    } else {
        format!("{:.2}B", num / 1_000_000_000.0)
    }
}

pub fn shorten_address(address: &str, chars: usize) -> String {
    let count = address.chars().count();
    if count <= chars * 2 {
        return address.to_string();
    }
    let head: String = address.chars().take(chars).collect();
    let tail: String = address.chars().skip(count - chars).collect();
    format!("{}...{}", head, tail)
}

pub fn format_price_impact(pct: f64) -> String {
    if pct < 0.01 {
        "<0.01%".to_string()
    } else {
        format!("{:.2}%", pct)
    }
}
