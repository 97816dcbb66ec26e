// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Lossy coordinate rounding.
//!
//! Pure text transform applied before the model is loaded: every
//! `IFCCARTESIANPOINT((x,y,z))` record has its coordinate fields rounded to
//! the requested number of decimal digits. Rounding mode is half away from
//! zero (`f64::round`). Fields that fail to parse as numbers pass through
//! unchanged, so accidentally matched non-numeric content is never
//! corrupted. Re-applying the transform at the same precision is a no-op.

use memchr::memmem;

const POINT_KEYWORD: &[u8] = b"IFCCARTESIANPOINT";

/// Round the coordinates of all cartesian point records in `text`.
pub fn round_coordinates(text: &str, precision: u32) -> String {
    let bytes = text.as_bytes();
    let finder = memmem::Finder::new(POINT_KEYWORD);

    let mut out = String::with_capacity(text.len());
    let mut last = 0usize;

    for start in finder.find_iter(bytes) {
        if start < last {
            continue; // overlapping match inside an already-rewritten span
        }
        let keyword_end = start + POINT_KEYWORD.len();
        let Some((list_start, list_end)) = coordinate_list_span(bytes, keyword_end) else {
            continue;
        };

        out.push_str(&text[last..list_start]);
        let mut first = true;
        for field in text[list_start..list_end].split(',') {
            if !first {
                out.push(',');
            }
            first = false;
            out.push_str(&round_field(field, precision));
        }
        last = list_end;
    }

    out.push_str(&text[last..]);
    out
}

/// Locate the inner coordinate list after the keyword: `((` ... `)`.
/// Returns the span of the list contents, or None when the record shape
/// does not match (e.g. IFCCARTESIANPOINTLIST3D).
fn coordinate_list_span(bytes: &[u8], mut pos: usize) -> Option<(usize, usize)> {
    let len = bytes.len();

    for _ in 0..2 {
        while pos < len && bytes[pos].is_ascii_whitespace() {
            pos += 1;
        }
        if pos >= len || bytes[pos] != b'(' {
            return None;
        }
        pos += 1;
    }

    let content_start = pos;
    while pos < len {
        match bytes[pos] {
            b')' => return Some((content_start, pos)),
            // a nested paren or an early terminator means this is not a
            // plain coordinate list
            b'(' | b';' => return None,
            _ => pos += 1,
        }
    }
    None
}

fn round_field(field: &str, precision: u32) -> String {
    match fast_float::parse::<f64, _>(field.trim()) {
        Ok(value) => format_rounded(round_half_away(value, precision)),
        Err(_) => field.to_string(),
    }
}

fn round_half_away(value: f64, precision: u32) -> f64 {
    let scale = 10f64.powi(precision as i32);
    (value * scale).round() / scale
}

/// Shortest decimal form that keeps a fractional part: `2.0`, `1.23`, `-0.5`
fn format_rounded(value: f64) -> String {
    if value.is_finite() && value == value.trunc() {
        format!("{:.1}", value)
    } else {
        format!("{}", value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rounding_scenario() {
        let text = "#5=IFCCARTESIANPOINT((1.23456,2.00001,-0.5));";
        assert_eq!(
            round_coordinates(text, 2),
            "#5=IFCCARTESIANPOINT((1.23,2.0,-0.5));"
        );
    }

    #[test]
    fn test_rounding_is_idempotent() {
        let text = "#5=IFCCARTESIANPOINT((1.23456,2.00001,-0.5));";
        let once = round_coordinates(text, 2);
        assert_eq!(round_coordinates(&once, 2), once);
    }

    #[test]
    fn test_rounding_bound() {
        let precision = 3;
        for &v in &[0.0004999, 1.23456, -987.654321, 0.125, 42.0] {
            let rounded = round_half_away(v, precision);
            assert!(
                (rounded - v).abs() < 10f64.powi(-(precision as i32)),
                "|{} - {}| out of bound",
                rounded,
                v
            );
        }
    }

    #[test]
    fn test_non_numeric_fields_pass_through() {
        let text = "#5=IFCCARTESIANPOINT((1.5,$,2.5));";
        assert_eq!(round_coordinates(text, 1), "#5=IFCCARTESIANPOINT((1.5,$,2.5));");
    }

    #[test]
    fn test_point_list_records_untouched() {
        let text = "#5=IFCCARTESIANPOINTLIST3D(((1.23456,0.,0.),(2.34567,0.,0.)));";
        assert_eq!(round_coordinates(text, 2), text);
    }

    #[test]
    fn test_multiple_records() {
        let text = "#1=IFCCARTESIANPOINT((0.123,0.456));\n#2=IFCCARTESIANPOINT((7.891,2.345));\n";
        assert_eq!(
            round_coordinates(text, 1),
            "#1=IFCCARTESIANPOINT((0.1,0.5));\n#2=IFCCARTESIANPOINT((7.9,2.3));\n"
        );
    }

    #[test]
    fn test_surrounding_text_preserved() {
        let text = "DATA;\n#9=IFCWALL('IFCCARTESIANPOINT is not here',$,$,$,$,$,$,$);\n";
        assert_eq!(round_coordinates(text, 2), text);
    }
}
