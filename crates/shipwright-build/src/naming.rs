//! Build name templates
//!
//! A template is literal text with `{token}` placeholders:
//!
//! | Token | Renders |
//! |-------|---------|
//! | `product` | product name (`Game` when blank) |
//! | `version` | version string (`0.0.0` when blank) |
//! | `profile` | profile display name |
//! | `profileid` | profile id |
//! | `platform`, `target` | platform identifier |
//! | `flags` | enabled flag ids, sorted, joined with `-`; `none` when none |
//! | `flag:<id>` | `true` or `false` |
//! | `date[:fmt]`, `time[:fmt]`, `datetime[:fmt]` | the supplied instant |
//!
//! Token names are case-insensitive and unknown tokens render empty. The
//! result is always a safe file name.

use crate::flags::FlagStates;
use crate::host::DEFAULT_PRODUCT_NAME;
use crate::version::DEFAULT_VERSION;
use chrono::format::{Item, StrftimeItems};
use chrono::NaiveDateTime;
use regex::{Captures, Regex};
use shipwright_config::Profile;
use std::fmt::Write;
use std::sync::OnceLock;

/// Fallback file name when nothing usable remains
pub const FALLBACK_FILE_NAME: &str = "build";

const DEFAULT_DATE_FORMAT: &str = "yyyyMMdd";
const DEFAULT_TIME_FORMAT: &str = "HHmmss";
const DEFAULT_DATETIME_FORMAT: &str = "yyyyMMdd_HHmmss";

const INVALID_FILE_NAME_CHARS: &[char] = &['"', '<', '>', '|', ':', '*', '?', '\\', '/'];

fn token_regex() -> &'static Regex {
    static TOKEN: OnceLock<Regex> = OnceLock::new();
    TOKEN.get_or_init(|| Regex::new(r"\{([^{}]+)\}").expect("valid token regex"))
}

/// Inputs to name resolution
#[derive(Debug, Clone, Copy)]
pub struct NameInputs<'a> {
    pub profile: &'a Profile,
    pub product: &'a str,
    pub version: &'a str,
    pub flags: &'a FlagStates,
    pub now: NaiveDateTime,
}

/// Resolve the profile's name template into a safe file name
pub fn resolve_build_name(inputs: &NameInputs<'_>) -> String {
    resolve_template(inputs.profile.name_template(), inputs)
}

/// Resolve an explicit template into a safe file name
pub fn resolve_template(template: &str, inputs: &NameInputs<'_>) -> String {
    let resolved = token_regex().replace_all(template, |caps: &Captures<'_>| {
        resolve_token(&caps[1], inputs)
    });
    make_safe_file_name(&resolved)
}

fn resolve_token(token: &str, inputs: &NameInputs<'_>) -> String {
    let token = token.trim();
    let (key, argument) = match token.split_once(':') {
        Some((key, argument)) => (key.trim().to_lowercase(), Some(argument.trim())),
        None => (token.to_lowercase(), None),
    };

    match (key.as_str(), argument) {
        ("flag", Some(id)) => inputs.flags.is_enabled(id).to_string(),
        ("date", format) => format_timestamp(inputs.now, format, DEFAULT_DATE_FORMAT),
        ("time", format) => format_timestamp(inputs.now, format, DEFAULT_TIME_FORMAT),
        ("datetime", format) => format_timestamp(inputs.now, format, DEFAULT_DATETIME_FORMAT),
        ("product", None) => non_blank_or(inputs.product, DEFAULT_PRODUCT_NAME),
        ("version", None) => non_blank_or(inputs.version, DEFAULT_VERSION),
        ("profile", None) => inputs.profile.display_name().to_string(),
        ("profileid", None) => inputs.profile.id.clone(),
        ("platform" | "target", None) => inputs.profile.platform.name().to_string(),
        ("flags", None) => flags_token(inputs.flags),
        _ => String::new(),
    }
}

fn non_blank_or(value: &str, default: &str) -> String {
    let value = value.trim();
    if value.is_empty() {
        default.to_string()
    } else {
        value.to_string()
    }
}

fn flags_token(flags: &FlagStates) -> String {
    let mut enabled: Vec<String> = flags
        .enabled_ids()
        .map(make_safe_file_name)
        .collect();

    if enabled.is_empty() {
        return "none".to_string();
    }

    enabled.sort_by_key(|id| id.to_lowercase());
    enabled.join("-")
}

/// Replace characters not allowed in file names with `_` and trim
///
/// Returns `build` when the input has no usable characters.
pub fn make_safe_file_name(value: &str) -> String {
    let replaced: String = value
        .trim()
        .chars()
        .map(|c| {
            if c.is_control() || INVALID_FILE_NAME_CHARS.contains(&c) {
                '_'
            } else {
                c
            }
        })
        .collect();

    let has_valid = value
        .chars()
        .any(|c| !c.is_whitespace() && !c.is_control() && !INVALID_FILE_NAME_CHARS.contains(&c));

    let trimmed = replaced.trim();
    if trimmed.is_empty() || !has_valid {
        FALLBACK_FILE_NAME.to_string()
    } else {
        trimmed.to_string()
    }
}

/// Format an instant with a user pattern, falling back to `default`
///
/// Patterns containing `%` are strftime patterns. Anything else uses the
/// familiar `yyyy`/`MM`/`dd`/`HH`/`mm`/`ss` letters.
pub fn format_timestamp(now: NaiveDateTime, format: Option<&str>, default: &str) -> String {
    let format = format.map(str::trim).filter(|f| !f.is_empty());
    if let Some(rendered) = format.and_then(|f| try_format(now, f)) {
        return rendered;
    }
    try_format(now, default).unwrap_or_default()
}

fn try_format(now: NaiveDateTime, format: &str) -> Option<String> {
    let pattern = if format.contains('%') {
        format.to_string()
    } else {
        to_strftime(format)
    };

    let items: Vec<Item<'_>> = StrftimeItems::new(&pattern).collect();
    if items.iter().any(|item| matches!(item, Item::Error)) {
        return None;
    }

    let mut out = String::new();
    write!(out, "{}", now.format_with_items(items.into_iter())).ok()?;
    Some(out)
}

/// Translate letter patterns (`yyyyMMdd_HHmmss`) to strftime
fn to_strftime(format: &str) -> String {
    let chars: Vec<char> = format.chars().collect();
    let mut out = String::new();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];

        if c == '\'' || c == '"' {
            i += 1;
            while i < chars.len() && chars[i] != c {
                push_literal(&mut out, chars[i]);
                i += 1;
            }
            i += 1;
            continue;
        }

        if c == '\\' {
            if let Some(&next) = chars.get(i + 1) {
                push_literal(&mut out, next);
            }
            i += 2;
            continue;
        }

        let mut run = 1;
        while i + run < chars.len() && chars[i + run] == c {
            run += 1;
        }

        let spec = match (c, run) {
            ('y', 1 | 2) => "%y",
            ('y', _) => "%Y",
            ('M', 1) => "%-m",
            ('M', 2) => "%m",
            ('M', 3) => "%b",
            ('M', _) => "%B",
            ('d', 1) => "%-d",
            ('d', 2) => "%d",
            ('d', 3) => "%a",
            ('d', _) => "%A",
            ('H', 1) => "%-H",
            ('H', _) => "%H",
            ('h', 1) => "%-I",
            ('h', _) => "%I",
            ('m', 1) => "%-M",
            ('m', _) => "%M",
            ('s', 1) => "%-S",
            ('s', _) => "%S",
            ('f', 1..=3) => "%3f",
            ('f', 4..=6) => "%6f",
            ('f', _) => "%9f",
            ('t', _) => "%p",
            _ => {
                for _ in 0..run {
                    push_literal(&mut out, c);
                }
                i += run;
                continue;
            }
        };

        out.push_str(spec);
        i += run;
    }

    out
}

fn push_literal(out: &mut String, c: char) {
    if c == '%' {
        out.push_str("%%");
    } else {
        out.push(c);
    }
}
