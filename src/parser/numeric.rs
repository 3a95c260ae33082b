/// Counts at or above this are treated as capture noise, not engagement.
pub const MAX_PLAUSIBLE_COUNT: u64 = 10_000_000_000;

/// Parse a rendered count such as `"1,204"`, `"1.2k"` or `"3M"`.
///
/// Thousands separators and inner whitespace are ignored, a single trailing
/// `k`/`m`/`b` (any case) scales the value, and the result is rounded.
/// Returns `None` for anything that is not a non-negative finite number below
/// [`MAX_PLAUSIBLE_COUNT`].
pub fn parse_scaled_count(raw: &str) -> Option<u64> {
    let cleaned: String = raw
        .trim()
        .chars()
        .filter(|c| *c != ',' && !c.is_whitespace())
        .collect::<String>()
        .to_ascii_lowercase();

    let (digits, scale) = match cleaned.chars().last()? {
        'k' => (&cleaned[..cleaned.len() - 1], 1e3),
        'm' => (&cleaned[..cleaned.len() - 1], 1e6),
        'b' => (&cleaned[..cleaned.len() - 1], 1e9),
        _ => (cleaned.as_str(), 1.0),
    };

    if !digits.chars().any(|c| c.is_ascii_digit())
        || !digits.chars().all(|c| c.is_ascii_digit() || c == '.')
    {
        return None;
    }

    let value: f64 = digits.parse().ok()?;
    let scaled = (value * scale).round();
    #[allow(clippy::cast_precision_loss)]
    let ceiling = MAX_PLAUSIBLE_COUNT as f64;
    if !scaled.is_finite() || scaled < 0.0 || scaled >= ceiling {
        return None;
    }

    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    Some(scaled as u64)
}
