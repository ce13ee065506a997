/// Trims surrounding whitespace; blank values become `None`.
pub fn clean_str(raw: &str) -> Option<&str> {
    let trimmed = raw.trim();
    (!trimmed.is_empty()).then_some(trimmed)
}

/// Rewrites float-rendered integers (`"7337.0"`, `"12.00"`) as integers.
/// Any other text, leading zeros included, is returned unchanged.
pub fn normalize_identifier(s: &str) -> &str {
    let Some((int, frac)) = s.split_once('.') else {
        return s;
    };
    let digits = int.strip_prefix('-').unwrap_or(int);
    if !digits.is_empty()
        && digits.bytes().all(|b| b.is_ascii_digit())
        && !frac.is_empty()
        && frac.bytes().all(|b| b == b'0')
    {
        int
    } else {
        s
    }
}
