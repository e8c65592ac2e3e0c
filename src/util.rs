pub fn mean(data: &[f64]) -> Option<f64> {
    let sum = data.iter().sum::<f64>();
    let count = data.len();

    match count {
        positive if positive > 0 => Some(sum / count as f64),
        _ => None,
    }
}

/// Digits of `value` left-padded with zeros to `width`
pub fn zero_pad(value: u64, width: usize) -> String {
    format!("{value:0width$}")
}

/// Parse a typed entry made only of ASCII digits. Leading zeros are allowed.
pub fn parse_digits(entry: &str) -> Option<u64> {
    if entry.is_empty() || !entry.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    entry.parse().ok()
}
