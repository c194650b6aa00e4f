//! Target resolution and the resume cursor

use std::ops::RangeInclusive;

/// Parses a site-reported chapter count into a positive target
///
/// Takes the first run of digits, allowing `,` and `_` as thousands
/// separators, so `"1,204 Chapters"` resolves to 1204. Returns `None` for
/// text without digits, negative counts, zero, and values that overflow.
pub fn parse_declared_count(declared: &str) -> Option<u32> {
    let start = declared.find(|c: char| c.is_ascii_digit())?;
    if declared[..start].trim_end().ends_with('-') {
        return None;
    }

    let mut digits = String::new();
    let mut chars = declared[start..].chars().peekable();
    while let Some(c) = chars.next() {
        if c.is_ascii_digit() {
            digits.push(c);
        } else if (c == ',' || c == '_') && chars.peek().is_some_and(|n| n.is_ascii_digit()) {
            continue;
        } else {
            break;
        }
    }

    digits.parse::<u32>().ok().filter(|n| *n > 0)
}

/// First chapter number to fetch, given the highest one already stored
pub fn resume_cursor(highest_stored: Option<u32>) -> u32 {
    highest_stored.unwrap_or(0).saturating_add(1)
}

/// Chapter numbers still to ingest, in ascending order
///
/// Empty when the stored chapters already reach the target.
pub fn remaining_chapters(highest_stored: Option<u32>, target: u32) -> RangeInclusive<u32> {
    resume_cursor(highest_stored)..=target
}
