//! Field-level sanitisers.
//!
//! Every externally-sourced value passes through one of these before it
//! reaches the state store. They coerce and clamp rather than reject: bad
//! input from an operator mid-broadcast must degrade to a safe value, not
//! block the panel. The one contract every function here upholds is
//! idempotence: feeding a sanitiser its own output returns the same value.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

/// `#rgb`, `#rgba`, `#rrggbb`, `#rrggbbaa`.
static HEX_COLOR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^#(?:[0-9a-fA-F]{3}|[0-9a-fA-F]{4}|[0-9a-fA-F]{6}|[0-9a-fA-F]{8})$")
        .expect("hex color regex")
});

/// Functional color notations with a strictly numeric body. The body
/// grammar is deliberately narrower than CSS: digits and separators only,
/// so nothing script-like can ride through into a style attribute.
static FUNC_COLOR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?i:rgb|rgba|hsl|hsla)\(\s*[0-9][0-9.,%\s/]{0,40}\)$").expect("func color regex")
});

/// Named colors: purely alphabetic, bounded length.
static NAMED_COLOR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-zA-Z]{3,25}$").expect("named color regex"));

/// Coerce to a trimmed, length-capped string. Non-string input becomes the
/// empty string, never an error.
pub fn text(value: &Value, max_chars: usize) -> String {
    match value {
        Value::String(s) => clip(s, max_chars),
        _ => String::new(),
    }
}

/// Parse a number, falling back to `fallback` when the input is missing,
/// non-numeric, or non-finite, then clamp into `[min, max]`. The fallback is
/// the caller's previous value so a bad submission never clobbers good state.
pub fn number(value: &Value, min: f64, max: f64, fallback: f64) -> f64 {
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    match parsed {
        Some(v) if v.is_finite() => v.clamp(min, max),
        _ => fallback.clamp(min, max),
    }
}

/// Integer-second variant of [`number`]: rounds before clamping.
pub fn int_seconds(value: &Value, min: i64, max: i64, fallback: i64) -> i64 {
    let v = number(value, min as f64, max as f64, fallback as f64);
    (v.round() as i64).clamp(min, max)
}

/// [`int_seconds`] for optional fields: `None` when the input doesn't
/// parse, so the caller can keep an unset previous value instead of
/// inventing one.
pub fn opt_int_seconds(value: &Value, min: i64, max: i64) -> Option<i64> {
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    parsed
        .filter(|v| v.is_finite())
        .map(|v| (v.round() as i64).clamp(min, max))
}

/// Boolean toggle. Only a JSON boolean flips the value; anything else keeps
/// the fallback.
pub fn flag(value: &Value, fallback: bool) -> bool {
    match value {
        Value::Bool(b) => *b,
        _ => fallback,
    }
}

/// Case-insensitive match against `allowed`, yielding `default` otherwise.
/// Enums never fall back to the previous value: an unknown variant is
/// unambiguously wrong, not possibly-mangled.
pub fn enum_or_default(value: &Value, allowed: &[&str], default: &str) -> String {
    if let Value::String(s) = value {
        let needle = s.trim().to_ascii_lowercase();
        for candidate in allowed {
            if *candidate == needle {
                return (*candidate).to_string();
            }
        }
    }
    default.to_string()
}

/// Accept only values matching the safe color grammars; everything else
/// (including `javascript:` and friends) collapses to empty.
pub fn color(value: &Value) -> String {
    let Value::String(s) = value else {
        return String::new();
    };
    let trimmed = s.trim();
    if HEX_COLOR.is_match(trimmed) || FUNC_COLOR.is_match(trimmed) || NAMED_COLOR.is_match(trimmed)
    {
        trimmed.to_string()
    } else {
        String::new()
    }
}

/// Normalise a list of strings from either a JSON array or a
/// newline-separated string. Entries are trimmed, length-capped, empties
/// dropped, and the list capped at `max_entries`.
pub fn string_list(value: &Value, max_entries: usize, max_chars: usize) -> Vec<String> {
    let raw: Vec<String> = match value {
        Value::Array(items) => items
            .iter()
            .filter_map(|v| v.as_str().map(|s| s.to_string()))
            .collect(),
        Value::String(s) => s.lines().map(|l| l.to_string()).collect(),
        _ => Vec::new(),
    };

    raw.iter()
        .map(|entry| clip(entry, max_chars))
        .filter(|entry| !entry.is_empty())
        .take(max_entries)
        .collect()
}

/// Normalise a comma-separated term list into canonical `"a, b, c"` form.
/// Empty segments are dropped; entries that would push the joined string
/// past `max_chars` are dropped whole rather than cut mid-term.
pub fn comma_list(value: &Value, max_chars: usize) -> String {
    let Value::String(s) = value else {
        return String::new();
    };

    let mut out = String::new();
    let mut out_chars = 0usize;
    for term in s.split(',') {
        let term = term.trim();
        if term.is_empty() {
            continue;
        }
        // Budget in chars, matching every other length cap here.
        let term_chars = term.chars().count();
        let needed = if out.is_empty() {
            term_chars
        } else {
            out_chars + 2 + term_chars
        };
        if needed > max_chars {
            break;
        }
        if !out.is_empty() {
            out.push_str(", ");
        }
        out.push_str(term);
        out_chars = needed;
    }
    out
}

/// Optional absolute-millisecond timestamp. Explicit `null` clears; an
/// unparseable or non-positive value keeps `prev`, matching the other
/// numeric sanitisers.
pub fn timestamp_ms(value: &Value, prev: Option<i64>) -> Option<i64> {
    if value.is_null() {
        return None;
    }
    let parsed = match value {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    };
    match parsed.filter(|ts| *ts > 0) {
        Some(ts) => Some(ts),
        None => prev,
    }
}

/// Trim, cap at `max_chars` characters, then strip any trailing whitespace
/// the cut exposed. Cutting at a char boundary keeps this UTF-8 safe.
fn clip(s: &str, max_chars: usize) -> String {
    let trimmed: String = s.trim().chars().take(max_chars).collect();
    trimmed.trim_end().to_string()
}
