// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use crate::ast::{Ref, Term};
use crate::builtins::utils::{ensure_string, ensure_string_collection};

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

const DATE_PATTERNS: &[&str] = &["yyyy-MM-dd", "yyyy/MM/dd"];
const DATE_TIME_PATTERNS: &[&str] = &["yyyy-MM-dd'T'HH:mm:ss", "yyyy-MM-dd'T'HH:mm:ss.SSS"];
const HOUR_PATTERNS: &[&str] = &["HH:mm", "hh:mm a", "HH:mm:ss"];

/// Translate a `yyyy-MM-dd` style pattern into a chrono format string.
///
/// Text between single quotes is copied literally. `''` is a quote, both
/// inside and outside quoted text.
pub fn to_chrono_format(pattern: &str) -> String {
    let chars: Vec<char> = pattern.chars().collect();
    let mut out = String::with_capacity(pattern.len() * 2);
    let mut i = 0;
    while i < chars.len() {
        let ch = chars[i];
        let mut run = 1;
        while i + run < chars.len() && chars[i + run] == ch {
            run += 1;
        }

        match ch {
            '\'' => {
                if run >= 2 {
                    out.push('\'');
                    i += 2;
                    continue;
                }
                i += 1;
                while i < chars.len() {
                    match (chars[i], chars.get(i + 1)) {
                        ('\'', Some('\'')) => {
                            out.push('\'');
                            i += 2;
                        }
                        ('\'', _) => break,
                        (ch, _) => {
                            push_literal(&mut out, ch);
                            i += 1;
                        }
                    }
                }
                i += 1;
                continue;
            }
            'y' if run == 2 => out.push_str("%y"),
            'y' => out.push_str("%Y"),
            'M' => out.push_str("%m"),
            'd' => out.push_str("%d"),
            'H' => out.push_str("%H"),
            'h' => out.push_str("%I"),
            'm' => out.push_str("%M"),
            's' => out.push_str("%S"),
            'S' => out.push_str(&format!("%{}f", run.min(9))),
            'a' => out.push_str("%p"),
            _ => {
                for _ in 0..run {
                    push_literal(&mut out, ch);
                }
            }
        }
        i += run;
    }
    out
}

fn push_literal(out: &mut String, ch: char) {
    match ch {
        '%' => out.push_str("%%"),
        _ => out.push(ch),
    }
}

fn patterns<'a>(args: &'a [Ref<Term>], defaults: &[&'a str]) -> Option<Vec<&'a str>> {
    match args.len() {
        1 => Some(defaults.to_vec()),
        _ => ensure_string_collection(args, 1),
    }
}

fn check(
    args: &[Ref<Term>],
    defaults: &[&str],
    parses: impl Fn(&str, &str) -> bool,
) -> Option<Ref<Term>> {
    let value = ensure_string(args, 0)?;
    let patterns = patterns(args, defaults)?;
    let matched = patterns
        .iter()
        .any(|p| parses(value, &to_chrono_format(p)));
    Some(Term::boolean(matched))
}

pub fn is_date(args: &[Ref<Term>]) -> Option<Ref<Term>> {
    check(args, DATE_PATTERNS, |v, f| {
        NaiveDate::parse_from_str(v, f).is_ok()
    })
}

pub fn is_date_time(args: &[Ref<Term>]) -> Option<Ref<Term>> {
    check(args, DATE_TIME_PATTERNS, |v, f| {
        NaiveDateTime::parse_from_str(v, f).is_ok()
    })
}

pub fn is_hour(args: &[Ref<Term>]) -> Option<Ref<Term>> {
    check(args, HOUR_PATTERNS, |v, f| {
        NaiveTime::parse_from_str(v, f).is_ok()
    })
}
