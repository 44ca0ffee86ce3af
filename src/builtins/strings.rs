// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use crate::ast::{Ref, Term};
use crate::builtins::utils::ensure_string;

use lazy_static::lazy_static;
use regex::Regex;

// Local part length is checked separately since the regex crate has no
// lookahead.
const EMAIL_PATTERN: &str = r"^[A-Za-z0-9_-]+(\.[A-Za-z0-9_-]+)*@[^-][A-Za-z0-9-]+(\.[A-Za-z0-9-]+)*(\.[A-Za-z]{2,})$";
const EMAIL_MAX_LOCAL_PART: usize = 64;

lazy_static! {
    static ref EMAIL_REGEX: Option<Regex> = Regex::new(EMAIL_PATTERN).ok();
}

pub fn length(args: &[Ref<Term>]) -> Option<Ref<Term>> {
    let s = ensure_string(args, 0)?;
    Some(Term::number(s.chars().count()))
}

pub fn equals(args: &[Ref<Term>]) -> Option<Ref<Term>> {
    let (first, second) = (args.first()?, args.get(1)?);
    if first == second {
        return Some(Term::boolean(true));
    }
    let (first, second) = (first.as_str()?, second.as_str()?);
    Some(Term::boolean(first == second))
}

pub fn sub_string(args: &[Ref<Term>]) -> Option<Ref<Term>> {
    let first = ensure_string(args, 0)?;
    let second = ensure_string(args, 1)?;

    if first.is_empty() || first == second {
        return Some(Term::boolean(false));
    }

    // Every string contains the empty string.
    if second.is_empty() {
        return None;
    }

    Some(Term::boolean(first.contains(&**second)))
}

pub fn is_numeric(args: &[Ref<Term>]) -> Option<Ref<Term>> {
    let s = ensure_string(args, 0)?;
    Some(Term::boolean(s.trim().parse::<f64>().is_ok()))
}

pub fn is_url(args: &[Ref<Term>]) -> Option<Ref<Term>> {
    let s = ensure_string(args, 0)?;
    Some(Term::boolean(url::Url::parse(s).is_ok()))
}

pub fn matches_regex(args: &[Ref<Term>]) -> Option<Ref<Term>> {
    let value = ensure_string(args, 0)?;
    let pattern = ensure_string(args, 1)?;
    // Anchor so that the whole value has to match.
    let re = Regex::new(&format!("^(?:{pattern})$")).ok()?;
    Some(Term::boolean(re.is_match(value)))
}

pub fn is_email(args: &[Ref<Term>]) -> Option<Ref<Term>> {
    let s = ensure_string(args, 0)?;
    let re = EMAIL_REGEX.as_ref()?;
    let local_part_ok = match s.find('@') {
        Some(at) => (1..=EMAIL_MAX_LOCAL_PART).contains(&s[..at].chars().count()),
        None => false,
    };
    Some(Term::boolean(local_part_ok && re.is_match(s)))
}
