//! Placeholder tokens and safe substitution of bound values.
//!
//! Templates reference bound values with `%<mode><index>%` tokens, where the
//! index is 1-based. [`assemble`] substitutes every token with its value
//! rendered according to the mode, so user-supplied values never reach the
//! query language unescaped.

use chrono::{DateTime, Utc};
use lazy_static::lazy_static;
use regex::{Captures, Regex};

use crate::error::{PikeError, Result};
use crate::filter::node::{Binding, PlaceholderMode};

lazy_static! {
    /// Matches a placeholder token such as `%L1%` or `%p12%`.
    pub(crate) static ref PLACEHOLDER: Regex = Regex::new(r"%([A-Za-z])(\d+)%").unwrap();
}

/// A placeholder token found in a template.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placeholder {
    /// Rendering mode.
    pub mode: PlaceholderMode,
    /// 1-based binding index.
    pub index: usize,
}

/// Parse a regex capture into a placeholder.
pub(crate) fn parse_placeholder(caps: &Captures<'_>) -> Result<Placeholder> {
    let code = caps[1].chars().next().unwrap_or('L');
    let mode = PlaceholderMode::from_code(code)
        .ok_or_else(|| PikeError::query(format!("unknown placeholder mode '{}'", &caps[0])))?;
    let index = caps[2]
        .parse::<usize>()
        .map_err(|_| PikeError::query(format!("placeholder index out of range in '{}'", &caps[0])))?;
    if index == 0 {
        return Err(PikeError::query(format!(
            "placeholder indices start at 1, found '{}'",
            &caps[0]
        )));
    }
    Ok(Placeholder { mode, index })
}

/// List every placeholder in a template, in order of appearance.
pub fn placeholders(template: &str) -> Result<Vec<Placeholder>> {
    PLACEHOLDER
        .captures_iter(template)
        .map(|caps| parse_placeholder(&caps))
        .collect()
}

/// Escape query syntax characters so the input is matched as a single term.
pub fn escape_term(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len() + 8);
    for c in input.chars() {
        match c {
            '+' | '-' | '&' | '|' | '!' | '(' | ')' | '{' | '}' | '[' | ']' | '^' | '"' | '~'
            | '*' | '?' | ':' | '/' | '\\' => {
                escaped.push('\\');
                escaped.push(c);
            }
            c if c.is_whitespace() => {
                escaped.push('\\');
                escaped.push(c);
            }
            c => escaped.push(c),
        }
    }
    escaped
}

/// Quote the input so it is matched as an exact phrase.
pub fn escape_phrase(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len() + 2);
    escaped.push('"');
    for c in input.chars() {
        if c == '"' || c == '\\' {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('"');
    escaped
}

fn format_date(value: &Binding) -> Result<String> {
    let dt = match value {
        Binding::DateTime(dt) => *dt,
        Binding::Text(s) => s
            .parse::<DateTime<Utc>>()
            .map_err(|e| PikeError::query(format!("'{s}' is not a valid date: {e}")))?,
        Binding::Integer(ts) => DateTime::from_timestamp(*ts, 0)
            .ok_or_else(|| PikeError::query(format!("timestamp {ts} is out of range")))?,
        other => {
            return Err(PikeError::query(format!(
                "value '{other}' cannot be rendered as a date"
            )));
        }
    };
    Ok(dt.format("%Y-%m-%dT%H:%M:%SZ").to_string())
}

/// Render a bound value according to a placeholder mode.
pub fn render_binding(value: &Binding, mode: PlaceholderMode) -> Result<String> {
    match mode {
        PlaceholderMode::Literal => Ok(value.to_string()),
        PlaceholderMode::Term => Ok(escape_term(&value.to_string())),
        PlaceholderMode::Phrase => Ok(escape_phrase(&value.to_string())),
        PlaceholderMode::Date => format_date(value),
    }
}

/// Substitute every placeholder in `template` with its rendered binding.
pub fn assemble(template: &str, bindings: &[Binding]) -> Result<String> {
    let mut assembled = String::with_capacity(template.len());
    let mut last = 0;

    for caps in PLACEHOLDER.captures_iter(template) {
        let Some(whole) = caps.get(0) else {
            continue;
        };
        let placeholder = parse_placeholder(&caps)?;
        let value = bindings.get(placeholder.index - 1).ok_or_else(|| {
            PikeError::query(format!(
                "placeholder '{}' has no bound value ({} bindings supplied)",
                whole.as_str(),
                bindings.len()
            ))
        })?;

        assembled.push_str(&template[last..whole.start()]);
        assembled.push_str(&render_binding(value, placeholder.mode)?);
        last = whole.end();
    }

    assembled.push_str(&template[last..]);
    Ok(assembled)
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn test_escape_term() {
        assert_eq!(escape_term("red"), "red");
        assert_eq!(escape_term("a:b"), "a\\:b");
        assert_eq!(escape_term("c++ (beta)"), "c\\+\\+\\ \\(beta\\)");
        assert_eq!(escape_term("path/to"), "path\\/to");
    }

    #[test]
    fn test_escape_phrase() {
        assert_eq!(escape_phrase("new york"), "\"new york\"");
        assert_eq!(escape_phrase("say \"hi\""), "\"say \\\"hi\\\"\"");
    }

    #[test]
    fn test_placeholders_in_order() {
        let found = placeholders("price:[%L1% TO %L2%] AND name:%p3%").unwrap();
        assert_eq!(found.len(), 3);
        assert_eq!(found[0].index, 1);
        assert_eq!(found[2].mode, PlaceholderMode::Phrase);

        assert!(placeholders("field:%L0%").is_err());
        assert!(placeholders("field:%X1%").is_err());
    }

    #[test]
    fn test_assemble_modes() {
        let dt = Utc.with_ymd_and_hms(2023, 12, 31, 23, 59, 59).unwrap();
        let assembled = assemble(
            "name:%T1% AND title:%P2% AND count:%L3% AND created:[%D4% TO NOW]",
            &["jo:hn".into(), "big apple".into(), 7.into(), dt.into()],
        )
        .unwrap();

        assert_eq!(
            assembled,
            "name:jo\\:hn AND title:\"big apple\" AND count:7 AND created:[2023-12-31T23:59:59Z TO NOW]"
        );
    }

    #[test]
    fn test_assemble_missing_binding() {
        let err = assemble("a:%L1% OR b:%L2%", &["x".into()]).unwrap_err();
        assert!(err.to_string().contains("%L2%"));
    }

    #[test]
    fn test_date_mode_rejects_non_dates() {
        assert!(render_binding(&Binding::Boolean(true), PlaceholderMode::Date).is_err());
        assert!(render_binding(&Binding::from("yesterday"), PlaceholderMode::Date).is_err());
        assert_eq!(
            render_binding(&Binding::Integer(0), PlaceholderMode::Date).unwrap(),
            "1970-01-01T00:00:00Z"
        );
    }
}
