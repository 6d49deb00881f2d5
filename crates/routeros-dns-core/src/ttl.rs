//! TTL duration strings
//!
//! Records are written with an `XhYmZs` duration (`24h0m0s`). RouterOS
//! echoes TTLs back in its own unit notation (`1d`, `1w2d3h4m5s`), so
//! parsing accepts any sequence of `<digits><unit>` pairs with units
//! `w`, `d`, `h`, `m` and `s`.

use crate::error::{Error, Result};

/// Format a TTL in seconds as a duration string
///
/// Hours are omitted below one hour and minutes below one minute,
/// so `90` becomes `1m30s` and `0` becomes `0s`.
pub fn format_ttl(secs: u64) -> String {
    let hours = secs / 3600;
    let minutes = (secs % 3600) / 60;
    let seconds = secs % 60;

    if hours > 0 {
        format!("{hours}h{minutes}m{seconds}s")
    } else if minutes > 0 {
        format!("{minutes}m{seconds}s")
    } else {
        format!("{seconds}s")
    }
}

/// Parse a duration string into seconds
pub fn parse_ttl(value: &str) -> Result<u64> {
    let invalid = || Error::InvalidTtl(value.to_string());

    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(invalid());
    }
    if trimmed == "0" {
        return Ok(0);
    }

    let mut total: u64 = 0;
    let mut digits = String::new();
    for c in trimmed.chars() {
        if c.is_ascii_digit() {
            digits.push(c);
            continue;
        }

        let multiplier = match c {
            'w' => 7 * 24 * 3600,
            'd' => 24 * 3600,
            'h' => 3600,
            'm' => 60,
            's' => 1,
            _ => return Err(invalid()),
        };
        if digits.is_empty() {
            return Err(invalid());
        }

        let amount: u64 = digits.parse().map_err(|_| invalid())?;
        total = amount
            .checked_mul(multiplier)
            .and_then(|part| total.checked_add(part))
            .ok_or_else(invalid)?;
        digits.clear();
    }

    // trailing number without a unit
    if !digits.is_empty() {
        return Err(invalid());
    }

    Ok(total)
}
