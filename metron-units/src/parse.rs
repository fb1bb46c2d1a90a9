//! Unit expression parsing - "kg m^2 s^-2", "km/h", "m²"
//!
//! An expression is a flat product of powers. Terms are separated by
//! whitespace, `*`, `·` or `⋅`; a single `/` negates the exponent of every
//! term after it. Symbols that are not registered are kept as opaque
//! literals, so parsing only fails on malformed syntax.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use num_traits::{One, Zero};
use crate::{UnitError, UnitRegistry};
use crate::dimension::{exponent_suffix, Exponent};
use crate::unit::{Prefix, Unit};

/// What a term refers to
#[derive(Debug, Clone)]
pub enum Term {
    /// A registered unit, optionally prefixed
    Known {
        prefix: Option<Arc<Prefix>>,
        unit: Arc<Unit>,
    },
    /// An unregistered symbol, kept verbatim
    Unknown(String),
}

/// One factor of a unit expression
#[derive(Debug, Clone)]
pub struct ParsedTerm {
    pub term: Term,
    pub exponent: Exponent,
    /// The token as written, exponent included
    pub text: String,
}

impl ParsedTerm {
    /// Canonical symbol: prefix and unit symbols, or the unknown literal
    pub fn symbol(&self) -> String {
        match &self.term {
            Term::Known { prefix: Some(prefix), unit } => format!("{}{}", prefix.symbol(), unit.symbol()),
            Term::Known { prefix: None, unit } => unit.symbol().to_string(),
            Term::Unknown(literal) => literal.clone(),
        }
    }

    pub fn is_known(&self) -> bool {
        matches!(self.term, Term::Known { .. })
    }
}

/// A parsed unit expression. Term order only matters for display.
#[derive(Debug, Clone, Default)]
pub struct UnitExpression {
    source: String,
    terms: Vec<ParsedTerm>,
}

impl UnitExpression {
    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn terms(&self) -> &[ParsedTerm] {
        &self.terms
    }

    /// True for the empty (dimensionless) expression
    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// Unregistered literals appearing in the expression
    pub fn unknown_literals(&self) -> Vec<&str> {
        self.terms
            .iter()
            .filter_map(|t| match &t.term {
                Term::Unknown(literal) => Some(literal.as_str()),
                Term::Known { .. } => None,
            })
            .collect()
    }

    /// Canonical text with repeated symbols merged: `m m s^-1` → `m^2 s^-1`
    pub fn merged_text(&self) -> String {
        let mut known: Vec<(String, Exponent)> = Vec::new();
        let mut unknown: BTreeMap<String, Exponent> = BTreeMap::new();

        for term in &self.terms {
            match &term.term {
                Term::Known { .. } => {
                    let symbol = term.symbol();
                    match known.iter_mut().find(|(s, _)| *s == symbol) {
                        Some((_, exp)) => *exp += term.exponent,
                        None => known.push((symbol, term.exponent)),
                    }
                }
                Term::Unknown(literal) => {
                    *unknown.entry(literal.clone()).or_insert_with(Exponent::zero) += term.exponent;
                }
            }
        }

        render_terms(known, unknown)
    }
}

impl fmt::Display for UnitExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.source)
    }
}

/// Render symbol/exponent pairs as unit text.
///
/// Positive exponents come first, then negative ones, each group sorted by
/// symbol; unknown literals follow in the order given. Zero exponents are
/// dropped.
pub(crate) fn render_terms(
    mut known: Vec<(String, Exponent)>,
    unknown: impl IntoIterator<Item = (String, Exponent)>,
) -> String {
    known.retain(|(_, exp)| !exp.is_zero());
    known.sort_by(|a, b| {
        let a_negative = a.1 < Exponent::zero();
        let b_negative = b.1 < Exponent::zero();
        a_negative.cmp(&b_negative).then_with(|| a.0.cmp(&b.0))
    });

    known
        .into_iter()
        .chain(unknown.into_iter().filter(|(_, exp)| !exp.is_zero()))
        .map(|(symbol, exp)| format!("{}{}", symbol, exponent_suffix(exp)))
        .collect::<Vec<_>>()
        .join(" ")
}

/// A symbol with its exponent, before registry lookup
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct RawTerm {
    pub symbol: String,
    pub exponent: Exponent,
    pub text: String,
}

const SEPARATORS: [char; 3] = ['*', '·', '⋅'];

/// Split an expression into raw terms, applying the denominator sign
pub(crate) fn tokenize(text: &str) -> Result<Vec<RawTerm>, UnitError> {
    let chars: Vec<char> = text.chars().collect();
    let mut tokens: Vec<(String, bool)> = Vec::new();
    let mut current = String::new();
    let mut denominator = false;
    let mut tokens_before_slash = 0;

    for (i, &c) in chars.iter().enumerate() {
        if c.is_whitespace() || SEPARATORS.contains(&c) {
            flush(&mut current, &mut tokens, denominator);
            continue;
        }
        if c == '/' {
            // m^1/2 keeps the slash inside the exponent
            let in_exponent = current.contains('^')
                && i > 0
                && chars[i - 1].is_ascii_digit()
                && chars.get(i + 1).is_some_and(|n| n.is_ascii_digit());
            if in_exponent {
                current.push(c);
                continue;
            }
            flush(&mut current, &mut tokens, denominator);
            if denominator {
                return Err(UnitError::format(text, "more than one '/'"));
            }
            denominator = true;
            tokens_before_slash = tokens.len();
            continue;
        }
        current.push(c);
    }
    flush(&mut current, &mut tokens, denominator);

    if denominator && tokens.len() == tokens_before_slash {
        return Err(UnitError::format(text, "nothing follows '/'"));
    }

    let mut terms = Vec::with_capacity(tokens.len());
    for (token, negate) in tokens {
        if let Some(mut term) = parse_token(&token, text)? {
            if negate {
                term.exponent = -term.exponent;
            }
            terms.push(term);
        }
    }
    Ok(terms)
}

fn flush(current: &mut String, tokens: &mut Vec<(String, bool)>, denominator: bool) {
    if !current.is_empty() {
        tokens.push((std::mem::take(current), denominator));
    }
}

/// Split one token into symbol and exponent; `1` is the dimensionless unit
fn parse_token(token: &str, expression: &str) -> Result<Option<RawTerm>, UnitError> {
    if token == "1" {
        return Ok(None);
    }

    let (symbol, exponent) = if let Some((symbol, exp_text)) = token.split_once('^') {
        let exponent = parse_exponent(exp_text).ok_or_else(|| {
            UnitError::format(expression, format!("invalid exponent '{}'", exp_text))
        })?;
        (symbol, exponent)
    } else if let Some((symbol, superscript)) = split_superscript(token) {
        let exponent = superscript_exponent(superscript).ok_or_else(|| {
            UnitError::format(expression, format!("invalid exponent '{}'", superscript))
        })?;
        (symbol, exponent)
    } else {
        (token, Exponent::one())
    };

    if symbol.is_empty() {
        return Err(UnitError::format(expression, format!("missing symbol in '{}'", token)));
    }

    Ok(Some(RawTerm {
        symbol: symbol.to_string(),
        exponent,
        text: token.to_string(),
    }))
}

/// Parse `2`, `-3`, `+1`, `1/2`, `-1/2` or `(1/2)`
fn parse_exponent(text: &str) -> Option<Exponent> {
    let inner = text
        .strip_prefix('(')
        .and_then(|t| t.strip_suffix(')'))
        .unwrap_or(text);
    let (negative, digits) = match inner.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, inner.strip_prefix('+').unwrap_or(inner)),
    };
    let (numer, denom) = digits.split_once('/').unwrap_or((digits, "1"));
    if !is_digits(numer) || !is_digits(denom) {
        return None;
    }
    let numer: i32 = numer.parse().ok()?;
    let denom: i32 = denom.parse().ok()?;
    if denom == 0 {
        return None;
    }
    let exp = Exponent::new(numer, denom);
    Some(if negative { -exp } else { exp })
}

fn is_digits(text: &str) -> bool {
    !text.is_empty() && text.bytes().all(|b| b.is_ascii_digit())
}

fn superscript_char(c: char) -> Option<char> {
    match c {
        '⁰' => Some('0'),
        '¹' => Some('1'),
        '²' => Some('2'),
        '³' => Some('3'),
        '⁴' => Some('4'),
        '⁵' => Some('5'),
        '⁶' => Some('6'),
        '⁷' => Some('7'),
        '⁸' => Some('8'),
        '⁹' => Some('9'),
        '⁻' => Some('-'),
        '⁺' => Some('+'),
        _ => None,
    }
}

/// Split a trailing run of superscript characters off a token
fn split_superscript(token: &str) -> Option<(&str, &str)> {
    let start = token
        .char_indices()
        .rev()
        .take_while(|(_, c)| superscript_char(*c).is_some())
        .last()
        .map(|(i, _)| i)?;
    Some((&token[..start], &token[start..]))
}

fn superscript_exponent(superscript: &str) -> Option<Exponent> {
    let plain: String = superscript.chars().filter_map(superscript_char).collect();
    parse_exponent(&plain)
}

/// Parse unit text against a registry.
///
/// Never fails on unknown symbols, which become `Term::Unknown`; only
/// malformed syntax (bad exponent, misplaced `/`) is an error.
pub fn parse(text: &str, registry: &UnitRegistry) -> Result<UnitExpression, UnitError> {
    let terms = tokenize(text)?
        .into_iter()
        .map(|raw| {
            let term = match registry.resolve(&raw.symbol) {
                Some((unit, prefix)) => Term::Known { prefix, unit },
                None => Term::Unknown(raw.symbol),
            };
            ParsedTerm { term, exponent: raw.exponent, text: raw.text }
        })
        .collect();

    Ok(UnitExpression { source: text.trim().to_string(), terms })
}
