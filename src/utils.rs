// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Context, Result};
use chrono::{Datelike, NaiveDate};
use comfy_table::{Cell, Table, presets::UTF8_FULL};
use once_cell::sync::Lazy;
use regex::Regex;
use rust_decimal::Decimal;
use std::io::Write;
use std::path::Path;
use std::time::Duration;

const UA: &str = concat!("aqualink/", env!("CARGO_PKG_VERSION"));

/// Blocking client carrying the crate user agent. `None` lifts the request timeout.
pub fn http_client(timeout: impl Into<Option<Duration>>) -> reqwest::Result<reqwest::blocking::Client> {
    reqwest::blocking::Client::builder()
        .timeout(timeout)
        .user_agent(UA)
        .build()
}

pub fn parse_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
        .with_context(|| format!("Invalid date '{}', expected YYYY-MM-DD", s))
}

pub fn parse_decimal(s: &str) -> Result<Decimal> {
    s.trim()
        .parse::<Decimal>()
        .with_context(|| format!("Invalid decimal '{}'", s))
}

/// Form-field semantics: blank or unparsable text reads as zero.
pub fn parse_lenient_decimal(s: &str) -> Decimal {
    let t = s.trim().replace(',', "");
    t.parse::<Decimal>()
        .or_else(|_| Decimal::from_scientific(&t))
        .unwrap_or(Decimal::ZERO)
}

/// First day of the month `offset` months away from the month containing `d`.
pub fn month_start(d: NaiveDate, offset: i32) -> NaiveDate {
    let idx = d.year() * 12 + d.month0() as i32 + offset;
    let (y, m0) = (idx.div_euclid(12), idx.rem_euclid(12) as u32);
    NaiveDate::from_ymd_opt(y, m0 + 1, 1).unwrap_or(d)
}

pub fn month_key(d: NaiveDate) -> String {
    d.format("%Y-%m").to_string()
}

/// `LKR 1,234.50`, with a leading sign when `signed` and the amount is nonzero.
pub fn fmt_money(d: &Decimal, ccy: &str, signed: bool) -> String {
    let r = d.round_dp(2);
    let abs = format!("{:.2}", r.abs());
    let (int_part, dec_part) = abs.split_once('.').unwrap_or((abs.as_str(), "00"));
    let mut grouped = String::new();
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    let sign = if r.is_sign_negative() && !r.is_zero() {
        "-"
    } else if signed && !r.is_zero() {
        "+"
    } else {
        ""
    };
    format!("{}{} {}.{}", sign, ccy, grouped, dec_part)
}

static UNSAFE_CSV: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s*[,\r\n]+\s*").expect("static regex"));

/// Replaces commas and line breaks so a field can sit unquoted in a CSV row.
pub fn sanitize_csv_field(s: &str) -> String {
    UNSAFE_CSV.replace_all(s, " ").trim().to_string()
}

pub fn dated_filename(stem: &str, date: NaiveDate, ext: &str) -> String {
    format!("{}-{}.{}", stem, date.format("%Y-%m-%d"), ext)
}

/// Writes `bytes` to `path` via a temp file in the same directory, so readers
/// never observe a half-written file.
pub fn write_atomic(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
    tmp.write_all(bytes)?;
    tmp.flush()?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

pub fn pretty_table(headers: &[&str], rows: Vec<Vec<String>>) -> Table {
    let mut t = Table::new();
    t.load_preset(UTF8_FULL);
    t.set_header(headers.iter().map(|h| Cell::new(*h)));
    for r in rows {
        t.add_row(r.into_iter().map(Cell::new));
    }
    t
}

pub fn maybe_print_json<T: serde::Serialize>(
    json_flag: bool,
    jsonl_flag: bool,
    v: &T,
) -> Result<bool> {
    if json_flag {
        println!("{}", serde_json::to_string_pretty(v)?);
        return Ok(true);
    }
    if jsonl_flag {
        // If v is an array, stream each element; else stream single line
        let val = serde_json::to_value(v)?;
        if let Some(arr) = val.as_array() {
            for item in arr {
                println!("{}", serde_json::to_string(item)?);
            }
        } else {
            println!("{}", serde_json::to_string(&val)?);
        }
        return Ok(true);
    }
    Ok(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn money_groups_thousands_and_signs() {
        let d: Decimal = "1234567.5".parse().unwrap();
        assert_eq!(fmt_money(&d, "LKR", false), "LKR 1,234,567.50");
        assert_eq!(fmt_money(&d, "LKR", true), "+LKR 1,234,567.50");
        assert_eq!(fmt_money(&-d, "LKR", true), "-LKR 1,234,567.50");
        assert_eq!(fmt_money(&Decimal::ZERO, "LKR", true), "LKR 0.00");
    }

    #[test]
    fn month_start_crosses_year_boundaries() {
        let d = NaiveDate::from_ymd_opt(2025, 2, 17).unwrap();
        assert_eq!(month_start(d, -2), NaiveDate::from_ymd_opt(2024, 12, 1).unwrap());
        assert_eq!(month_start(d, 11), NaiveDate::from_ymd_opt(2026, 1, 1).unwrap());
    }

    #[test]
    fn lenient_decimal_reads_garbage_as_zero() {
        assert_eq!(parse_lenient_decimal(""), Decimal::ZERO);
        assert_eq!(parse_lenient_decimal("abc"), Decimal::ZERO);
        assert_eq!(parse_lenient_decimal(" 1,500.25 "), "1500.25".parse().unwrap());
    }

    #[test]
    fn sanitize_strips_commas_and_newlines() {
        assert_eq!(sanitize_csv_field("Feed, filters\nand nets"), "Feed filters and nets");
    }
}
