//! Pure field validators for user records. No side effects; the manager
//! existence check lives in the store layer since it needs a query.

/// A mobile number is valid once normalized: exactly 10 ASCII digits.
pub fn is_valid_mobile(mob_num: &str) -> bool {
    mob_num.len() == 10 && mob_num.bytes().all(|b| b.is_ascii_digit())
}

/// PAN format: 5 uppercase letters, 4 digits, 1 uppercase letter.
pub fn is_valid_pan(pan_num: &str) -> bool {
    let b = pan_num.as_bytes();
    b.len() == 10
        && b[..5].iter().all(u8::is_ascii_uppercase)
        && b[5..9].iter().all(u8::is_ascii_digit)
        && b[9].is_ascii_uppercase()
}

/// Strip a single leading "+91" country code or a single leading "0" from a
/// raw mobile number. Only one prefix is removed, and only at the start.
pub fn normalize_mobile(raw: &str) -> String {
    let trimmed = raw.trim();
    let stripped = trimmed
        .strip_prefix("+91")
        .or_else(|| trimmed.strip_prefix('0'))
        .unwrap_or(trimmed);
    stripped.to_string()
}
