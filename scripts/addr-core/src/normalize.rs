//! Per-field address normalizers. Each one is a pure string transform that
//! maps missing/placeholder input to the empty string.

use once_cell::sync::Lazy;
use regex::Regex;

static QUOTE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r#"^"|"$"#).unwrap());
static WS_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());
static TRAILING_DOT_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\.\s*$").unwrap());
static LEADING_NUMBER_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(?:\d+\s+)+").unwrap());
static DIGIT_RUN_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d+").unwrap());
static MA_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)\bma\b|massachusetts").unwrap());
static NH_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)\bnh\b|new hampshire").unwrap());

/// Whole-word pattern for one street-type abbreviation: the short form, any
/// prefix of its completion tail already spelled out, and an optional
/// trailing period ("St", "St.", "Str" and "Street" all match the first
/// rule).
fn expansion_pattern(short: &str, tail: &str) -> Regex {
    let mut suffix = String::new();
    for ch in tail.chars().rev() {
        suffix = format!("(?:{ch}{suffix})?");
    }
    Regex::new(&format!(r"(?i)\b{short}{suffix}\.?\b")).unwrap()
}

/// Street-type abbreviation expansions, applied in this exact order. Later
/// rules can re-match text produced by earlier ones, so the order is part of
/// the behavior.
static ABBREVIATIONS: Lazy<Vec<(Regex, &'static str)>> = Lazy::new(|| {
    [
        ("St", "reet", "Street"),
        ("Rd", "oad", "Road"),
        ("Ave", "nue", "Avenue"),
        ("Blvd", "oulevard", "Boulevard"),
        ("Dr", "ive", "Drive"),
        ("Ct", "ourt", "Court"),
        ("Ln", "", "Lane"),
        ("Cir", "cle", "Circle"),
        ("Pl", "", "Place"),
        ("Plz", "", "Plaza"),
        ("Pkwy", "", "Parkway"),
        ("Hwy", "", "Highway"),
        ("Sq", "", "Square"),
    ]
    .into_iter()
    .map(|(short, tail, full)| (expansion_pattern(short, tail), full))
    .collect()
});

/// True when a raw cell holds no usable value: blank, or the literal "nan"
/// that tabular exports produce for missing cells.
fn is_missing(raw: &str) -> bool {
    let trimmed = raw.trim();
    trimmed.is_empty() || trimmed.eq_ignore_ascii_case("nan")
}

fn strip_quotes(value: &str) -> String {
    QUOTE_RE.replace_all(value, "").into_owned()
}

/// Title-case each alphabetic run: a letter is upper-cased when the
/// preceding character is not a letter, lower-cased otherwise, so
/// "o'brien" becomes "O'Brien".
fn title_case(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut prev_alpha = false;
    for ch in value.chars() {
        if ch.is_alphabetic() {
            if prev_alpha {
                out.extend(ch.to_lowercase());
            } else {
                out.extend(ch.to_uppercase());
            }
            prev_alpha = true;
        } else {
            out.push(ch);
            prev_alpha = false;
        }
    }
    out
}

/// Standardize a street name: strip quotes, collapse whitespace, drop a
/// street number that leaked into the name field, expand street-type
/// abbreviations, drop a trailing period, title-case.
pub fn normalize_street_name(raw: &str) -> String {
    if is_missing(raw) {
        return String::new();
    }
    let mut name = strip_quotes(raw.trim());
    name = WS_RE.replace_all(&name, " ").into_owned();
    name = LEADING_NUMBER_RE.replace(&name, "").into_owned();
    for (pattern, full) in ABBREVIATIONS.iter() {
        name = pattern.replace_all(&name, *full).into_owned();
    }
    name = TRAILING_DOT_RE.replace(&name, "").into_owned();
    // Quote stripping can leave padding behind ("\" Elm \"" -> " Elm ").
    title_case(name.trim())
}

/// Keep only the digits of a street number.
pub fn normalize_street_number(raw: &str) -> String {
    if is_missing(raw) {
        return String::new();
    }
    strip_quotes(raw.trim())
        .chars()
        .filter(char::is_ascii_digit)
        .collect()
}

/// Apartment identifiers are free-form ("Apt 3B", "#2"); trim and keep them
/// verbatim.
pub fn normalize_apartment(raw: &str) -> String {
    if is_missing(raw) {
        return String::new();
    }
    raw.trim().to_string()
}

pub fn normalize_city(raw: &str) -> String {
    if is_missing(raw) {
        return String::new();
    }
    raw.trim().to_string()
}

/// Map state variants to the two-letter postal code. Only MA and NH are
/// special-cased; anything else passes through upper-cased.
pub fn normalize_state(raw: &str) -> String {
    if is_missing(raw) {
        return String::new();
    }
    let mut state = strip_quotes(raw.trim()).to_lowercase();
    state = WS_RE.replace_all(&state, " ").into_owned();
    state = MA_RE.replace_all(&state, "MA").into_owned();
    state = NH_RE.replace_all(&state, "NH").into_owned();
    state.to_uppercase()
}

/// Extract the last digit run of a ZIP value and left-pad it to five digits.
/// The rightmost run wins so a "02134-5" style extension keeps the extension
/// digits, not the core ZIP; runs longer than five digits are cut to their
/// first five so the result is always exactly five digits or empty.
pub fn normalize_zip(raw: &str) -> String {
    if is_missing(raw) {
        return String::new();
    }
    let trimmed = raw.trim();
    let last_run = match DIGIT_RUN_RE.find_iter(trimmed).last() {
        Some(m) => m.as_str(),
        None => return String::new(),
    };
    if last_run.len() >= 5 {
        last_run[..5].to_string()
    } else {
        format!("{:0>5}", last_run)
    }
}
