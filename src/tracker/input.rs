//! Normalization of raw text typed by the user. Nothing here fails: text either maps to a number
//! or to the value the caller should fall back to.

/// Goal used for a new exercise when the typed goal can't be read.
pub const DEFAULT_GOAL: i64 = 10;

/// Reads the leading integer of `text`, the way a lenient number field does: `"12x"` is 12.
fn leading_integer(text: &str) -> Option<i64> {
    let text = text.trim();
    let (sign, digits) = match text.strip_prefix('-') {
        Some(rest) => (-1, rest),
        None => (1, text.strip_prefix('+').unwrap_or(text)),
    };
    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    let digits = &digits[..end];
    if digits.is_empty() {
        return None;
    }
    // Saturate absurdly long inputs instead of discarding them.
    Some(digits.parse::<i64>().unwrap_or(i64::MAX) * sign)
}

/// Blank input means zero. Returns `None` when the edit should be ignored.
pub fn parse_reps(text: &str) -> Option<i64> {
    if text.trim().is_empty() {
        return Some(0);
    }
    leading_integer(text)
}

/// Goal for a newly added exercise.
pub fn parse_new_goal(text: &str) -> i64 {
    leading_integer(text)
        .filter(|&goal| goal != 0)
        .unwrap_or(DEFAULT_GOAL)
}

/// Goal for an existing exercise. `None` keeps the previous goal.
pub fn parse_updated_goal(text: &str) -> Option<i64> {
    leading_integer(text)
}
