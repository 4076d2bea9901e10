// src/domain/coerce.rs

use std::sync::OnceLock;

use regex::Regex;

use crate::domain::table::Cell;

/// A run of digit groups joined by single spaces, no-break spaces or dots.
fn number_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"[0-9]+(?:[ \x{00A0}\x{202F}.][0-9]+)*").expect("static regex")
    })
}

fn integer_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[0-9]+").expect("static regex"))
}

/// ASCII digits for Arabic-Indic ones, separators dropped, Arabic decimal
/// mark turned into a dot.
fn ascii_digits(s: &str) -> String {
    s.chars()
        .filter_map(|c| match c {
            ',' | '\u{066C}' => None,
            '\u{066B}' => Some('.'),
            '\u{0660}'..='\u{0669}' => char::from_digit(c as u32 - 0x0660, 10),
            '\u{06F0}'..='\u{06F9}' => char::from_digit(c as u32 - 0x06F0, 10),
            other => Some(other),
        })
        .collect()
}

/// Reads one digit run. Groups of exactly three digits after a space or a
/// dot continue the integer part (`450 000`, `1.250.000`); any other dot
/// starts the fraction (`92.5`).
fn read_grouped(token: &str) -> Option<f64> {
    let mut groups: Vec<&str> = Vec::new();
    let mut seps: Vec<char> = Vec::new();
    let mut start = 0;
    for (i, c) in token.char_indices() {
        if !c.is_ascii_digit() {
            groups.push(&token[start..i]);
            seps.push(c);
            start = i + c.len_utf8();
        }
    }
    groups.push(&token[start..]);

    let mut number = groups[0].to_string();
    let mut next = 1;
    if groups[0].len() <= 3 {
        while next < groups.len() && groups[next].len() == 3 {
            number.push_str(groups[next]);
            next += 1;
        }
    }
    if next < groups.len() && seps[next - 1] == '.' {
        number.push('.');
        number.push_str(groups[next]);
    }
    number.parse::<f64>().ok()
}

/// First number embedded in a scraped string: `"1,000 LYD"` → 1000.0,
/// `"450 000 LYD"` → 450000.0, `"140 meter square"` → 140.0. No digits at
/// all → `None`.
pub fn coerce_number(raw: &str) -> Option<f64> {
    let cleaned = ascii_digits(raw);
    number_re()
        .find(&cleaned)
        .and_then(|m| read_grouped(m.as_str()))
}

/// Prices are read the same way as any other embedded number.
pub fn coerce_price(raw: &str) -> Option<f64> {
    coerce_number(raw)
}

/// First run of digits only (`"5 years"` → 5.0, `"2.5"` → 2.0).
pub fn extract_integer(raw: &str) -> Option<f64> {
    let cleaned = ascii_digits(raw);
    integer_re()
        .find(&cleaned)
        .and_then(|m| m.as_str().parse::<f64>().ok())
}

/// Bedroom / bathroom labels as the classifieds site shows them.
pub fn room_count(label: &str) -> Option<f64> {
    let lower = label.trim().to_lowercase();
    if lower.starts_with("more than") {
        return Some(7.0);
    }
    if lower == "studio" || lower.starts_with("one ") || lower == "one" {
        return Some(1.0);
    }
    coerce_number(&lower)
}

/// Cell-level numeric coercion: numbers pass through, bools become 1/0,
/// text goes through `parse`, anything unparseable becomes Missing.
pub fn coerce_cell(cell: &Cell, parse: fn(&str) -> Option<f64>) -> Cell {
    match cell {
        Cell::Number(n) => Cell::Number(*n),
        Cell::Bool(b) => Cell::Number(if *b { 1.0 } else { 0.0 }),
        Cell::Text(s) => parse(s).map_or(Cell::Missing, Cell::Number),
        Cell::Missing => Cell::Missing,
    }
}

/// Whole-field parse: `"3"` is a number, `"3 floors"` is not.
pub fn strict_number(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok().filter(|n| n.is_finite())
}
