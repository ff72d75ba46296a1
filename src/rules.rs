//! Field-level validation rules for data contracts.
//!
//! A [`Rule`] checks one property of a [`Record`] (a map of field names to values)
//! and explains itself when the check fails. Rules compose with `&`, `|` and `!`:
//!
//! ```rust
//! use veritas::rules::{Record, Rule};
//! use veritas::value::Value;
//!
//! let rule = Rule::required("age") & Rule::number_range("age", Some(0.0), Some(120.0));
//! let mut record = Record::new();
//! record.insert("age".to_string(), Value::Int(130));
//! assert!(!rule.is_valid(&record));
//! assert_eq!(rule.error_message(&record), "Field 'age' must be between 0 and 120");
//! ```

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};
use std::collections::BTreeMap;
use std::ops::{BitAnd, BitOr, Not};

use regex::Regex;

use crate::value::Value;

/// The data a contract validates.
pub type Record = BTreeMap<String, Value>;

#[derive(Debug, Clone)]
pub enum Rule {
    /// Present and not null.
    Required { field: String },
    StringLength {
        field: String,
        min: Option<usize>,
        max: Option<usize>,
    },
    /// The pattern must match at the start of the value.
    StringPattern { field: String, regex: Regex },
    StringChoices { field: String, choices: Vec<String> },
    /// Inclusive on both ends. Integers and floats both count as numbers.
    NumberRange {
        field: String,
        min: Option<f64>,
        max: Option<f64>,
    },
    Integer { field: String },
    Float { field: String },
    Boolean { field: String },
    /// A string that parses as a date, time or datetime with a `strftime` format.
    DateTimeFormat { field: String, format: String },
    /// A string holding a JSON document.
    Json { field: String },
    /// Both fields are ISO 8601 datetimes and `end` is strictly later.
    EndAfterStart { start: String, end: String },
    And(Box<Rule>, Box<Rule>),
    Or(Box<Rule>, Box<Rule>),
    Not(Box<Rule>),
}

impl Rule {
    pub fn required(field: impl Into<String>) -> Rule {
        Rule::Required { field: field.into() }
    }

    pub fn string_length(field: impl Into<String>, min: Option<usize>, max: Option<usize>) -> Rule {
        Rule::StringLength {
            field: field.into(),
            min,
            max,
        }
    }

    pub fn string_pattern(field: impl Into<String>, pattern: &str) -> Result<Rule, regex::Error> {
        Ok(Rule::StringPattern {
            field: field.into(),
            regex: Regex::new(pattern)?,
        })
    }

    pub fn one_of<I, S>(field: impl Into<String>, choices: I) -> Rule
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Rule::StringChoices {
            field: field.into(),
            choices: choices.into_iter().map(Into::into).collect(),
        }
    }

    pub fn number_range(field: impl Into<String>, min: Option<f64>, max: Option<f64>) -> Rule {
        Rule::NumberRange {
            field: field.into(),
            min,
            max,
        }
    }

    pub fn integer(field: impl Into<String>) -> Rule {
        Rule::Integer { field: field.into() }
    }

    pub fn float(field: impl Into<String>) -> Rule {
        Rule::Float { field: field.into() }
    }

    pub fn boolean(field: impl Into<String>) -> Rule {
        Rule::Boolean { field: field.into() }
    }

    pub fn datetime_format(field: impl Into<String>, format: impl Into<String>) -> Rule {
        Rule::DateTimeFormat {
            field: field.into(),
            format: format.into(),
        }
    }

    pub fn json(field: impl Into<String>) -> Rule {
        Rule::Json { field: field.into() }
    }

    pub fn end_after_start(start: impl Into<String>, end: impl Into<String>) -> Rule {
        Rule::EndAfterStart {
            start: start.into(),
            end: end.into(),
        }
    }

    pub fn is_valid(&self, record: &Record) -> bool {
        match self {
            Rule::Required { field } => record.get(field).map_or(false, |v| !v.is_nil()),
            Rule::StringLength { field, min, max } => string(record, field).map_or(false, |s| {
                let len = s.chars().count();
                min.map_or(true, |min| len >= min) && max.map_or(true, |max| len <= max)
            }),
            Rule::StringPattern { field, regex } => string(record, field)
                .and_then(|s| regex.find(s))
                .map_or(false, |m| m.start() == 0),
            Rule::StringChoices { field, choices } => {
                string(record, field).map_or(false, |s| choices.iter().any(|c| c == s))
            }
            Rule::NumberRange { field, min, max } => number(record, field).map_or(false, |n| {
                min.map_or(true, |min| n >= min) && max.map_or(true, |max| n <= max)
            }),
            Rule::Integer { field } => matches!(record.get(field), Some(Value::Int(_))),
            Rule::Float { field } => matches!(record.get(field), Some(Value::Float(_))),
            Rule::Boolean { field } => matches!(record.get(field), Some(Value::Bool(_))),
            Rule::DateTimeFormat { field, format } => {
                string(record, field).map_or(false, |s| matches_format(s, format))
            }
            Rule::Json { field } => string(record, field)
                .map_or(false, |s| serde_json::from_str::<serde_json::Value>(s).is_ok()),
            Rule::EndAfterStart { start, end } => {
                match (datetime(record, start), datetime(record, end)) {
                    (Some(start), Some(end)) => end > start,
                    _ => false,
                }
            }
            Rule::And(a, b) => a.is_valid(record) && b.is_valid(record),
            Rule::Or(a, b) => a.is_valid(record) || b.is_valid(record),
            Rule::Not(rule) => !rule.is_valid(record),
        }
    }

    /// Explains why the rule fails for `record`. Only meaningful when
    /// [`Rule::is_valid`] is false.
    pub fn error_message(&self, record: &Record) -> String {
        match self {
            Rule::Required { field } => format!("Field '{field}' is required"),
            Rule::StringLength { field, min, max } => {
                if string(record, field).is_none() {
                    return must_be_string(field);
                }
                match (min, max) {
                    (Some(min), Some(max)) => format!(
                        "Field '{field}' must be between {min} and {max} characters long"
                    ),
                    (Some(min), None) => {
                        format!("Field '{field}' must be at least {min} characters long")
                    }
                    (None, Some(max)) => {
                        format!("Field '{field}' must be at most {max} characters long")
                    }
                    (None, None) => must_be_string(field),
                }
            }
            Rule::StringPattern { field, regex } => match string(record, field) {
                None => must_be_string(field),
                Some(_) => format!(
                    "Field '{field}' must match the regular expression: {}",
                    regex.as_str()
                ),
            },
            Rule::StringChoices { field, choices } => match string(record, field) {
                None => must_be_string(field),
                Some(_) => format!(
                    "Field '{field}' must be one of the following choices: {}",
                    quoted_list(choices)
                ),
            },
            Rule::NumberRange { field, min, max } => {
                if number(record, field).is_none() {
                    return format!("Field '{field}' must be a number");
                }
                match (min, max) {
                    (Some(min), Some(max)) => format!("Field '{field}' must be between {min} and {max}"),
                    (Some(min), None) => format!("Field '{field}' must be at least {min}"),
                    (None, Some(max)) => format!("Field '{field}' must be at most {max}"),
                    (None, None) => format!("Field '{field}' must be a number"),
                }
            }
            Rule::Integer { field } => format!("Field '{field}' must be an integer"),
            Rule::Float { field } => format!("Field '{field}' must be a float"),
            Rule::Boolean { field } => format!("Field '{field}' must be a boolean"),
            Rule::DateTimeFormat { field, format } => match record.get(field) {
                None | Some(Value::Nil) => format!(
                    "Field '{field}' must be a datetime or a string that can be converted to a datetime"
                ),
                Some(_) => format!("Field '{field}' must be in the format: {format}"),
            },
            Rule::Json { field } => format!("Field '{field}' must contain valid JSON"),
            Rule::EndAfterStart { start, end } => {
                if datetime(record, start).is_none() || datetime(record, end).is_none() {
                    format!("Fields '{start}' and '{end}' must both be datetimes")
                } else {
                    format!("Field '{end}' must be after field '{start}'")
                }
            }
            Rule::And(a, b) => {
                if a.is_valid(record) {
                    b.error_message(record)
                } else {
                    a.error_message(record)
                }
            }
            Rule::Or(a, b) => format!(
                "Both rules failed: {} OR {}",
                a.error_message(record),
                b.error_message(record)
            ),
            Rule::Not(rule) => format!(
                "Rule should not have been valid: {}",
                rule.error_message(record)
            ),
        }
    }
}

impl BitAnd for Rule {
    type Output = Rule;

    fn bitand(self, rhs: Rule) -> Rule {
        Rule::And(Box::new(self), Box::new(rhs))
    }
}

impl BitOr for Rule {
    type Output = Rule;

    fn bitor(self, rhs: Rule) -> Rule {
        Rule::Or(Box::new(self), Box::new(rhs))
    }
}

impl Not for Rule {
    type Output = Rule;

    fn not(self) -> Rule {
        Rule::Not(Box::new(self))
    }
}

// -----------------------------------------------------------------------------
// Field access
// -----------------------------------------------------------------------------

fn string<'r>(record: &'r Record, field: &str) -> Option<&'r str> {
    record.get(field).and_then(Value::as_str)
}

fn number(record: &Record, field: &str) -> Option<f64> {
    record.get(field).and_then(Value::as_float)
}

fn must_be_string(field: &str) -> String {
    format!("Field '{field}' must be a string")
}

fn quoted_list(items: &[String]) -> String {
    let quoted: Vec<String> = items.iter().map(|s| format!("'{s}'")).collect();
    format!("[{}]", quoted.join(", "))
}

fn matches_format(text: &str, format: &str) -> bool {
    NaiveDateTime::parse_from_str(text, format).is_ok()
        || NaiveDate::parse_from_str(text, format).is_ok()
        || NaiveTime::parse_from_str(text, format).is_ok()
}

/// ISO 8601 datetimes, with or without an offset, or bare dates at midnight.
/// Offset datetimes are compared in UTC.
fn datetime(record: &Record, field: &str) -> Option<NaiveDateTime> {
    let text = string(record, field)?.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.naive_utc());
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M"]
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(text, format).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(text, "%Y-%m-%d")
                .ok()
                .and_then(|date| date.and_hms_opt(0, 0, 0))
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(value: serde_json::Value) -> Record {
        match Value::from_json_any(&value) {
            Value::Map(map) => map,
            other => panic!("not an object: {other}"),
        }
    }

    #[test]
    fn required_rejects_missing_and_null() {
        let rule = Rule::required("email");
        assert!(rule.is_valid(&record(json!({"email": ""}))));
        assert!(!rule.is_valid(&record(json!({}))));
        assert!(!rule.is_valid(&record(json!({"email": null}))));
        assert_eq!(rule.error_message(&record(json!({}))), "Field 'email' is required");
    }

    #[test]
    fn string_length_counts_characters() {
        let rule = Rule::string_length("name", Some(3), Some(5));
        assert!(rule.is_valid(&record(json!({"name": "ñño"}))));
        assert!(!rule.is_valid(&record(json!({"name": "Jo"}))));
        assert_eq!(
            rule.error_message(&record(json!({"name": "Jo"}))),
            "Field 'name' must be between 3 and 5 characters long"
        );
        assert_eq!(
            rule.error_message(&record(json!({"name": 7}))),
            "Field 'name' must be a string"
        );
        let at_most = Rule::string_length("name", None, Some(2));
        assert_eq!(
            at_most.error_message(&record(json!({"name": "long"}))),
            "Field 'name' must be at most 2 characters long"
        );
    }

    #[test]
    fn pattern_is_anchored_at_the_start_only() {
        let rule = Rule::string_pattern("code", "[A-Z]{2}").unwrap();
        assert!(rule.is_valid(&record(json!({"code": "AB-123"}))));
        assert!(!rule.is_valid(&record(json!({"code": "x-AB"}))));
        assert_eq!(
            rule.error_message(&record(json!({"code": "x-AB"}))),
            "Field 'code' must match the regular expression: [A-Z]{2}"
        );
        assert!(Rule::string_pattern("code", "[").is_err());
    }

    #[test]
    fn choices_are_listed_in_the_message() {
        let rule = Rule::one_of("color", ["red", "green"]);
        assert!(rule.is_valid(&record(json!({"color": "red"}))));
        assert_eq!(
            rule.error_message(&record(json!({"color": "blue"}))),
            "Field 'color' must be one of the following choices: ['red', 'green']"
        );
    }

    #[test]
    fn number_range_accepts_ints_and_floats() {
        let rule = Rule::number_range("age", Some(0.0), Some(120.0));
        assert!(rule.is_valid(&record(json!({"age": 120}))));
        assert!(rule.is_valid(&record(json!({"age": 0.5}))));
        assert!(!rule.is_valid(&record(json!({"age": -1}))));
        assert_eq!(
            rule.error_message(&record(json!({"age": "thirty"}))),
            "Field 'age' must be a number"
        );
        let floor = Rule::number_range("t", Some(-0.5), None);
        assert_eq!(
            floor.error_message(&record(json!({"t": -1}))),
            "Field 't' must be at least -0.5"
        );
    }

    #[test]
    fn type_rules_are_strict() {
        let data = record(json!({"i": 1, "f": 1.0, "b": false}));
        assert!(Rule::integer("i").is_valid(&data));
        assert!(!Rule::integer("f").is_valid(&data));
        assert!(Rule::float("f").is_valid(&data));
        assert!(!Rule::float("i").is_valid(&data));
        assert!(Rule::boolean("b").is_valid(&data));
        assert_eq!(Rule::boolean("i").error_message(&data), "Field 'i' must be a boolean");
    }

    #[test]
    fn datetime_format_uses_strftime_syntax() {
        let rule = Rule::datetime_format("day", "%d/%m/%Y");
        assert!(rule.is_valid(&record(json!({"day": "15/01/2023"}))));
        assert!(!rule.is_valid(&record(json!({"day": "2023-01-15"}))));
        assert_eq!(
            rule.error_message(&record(json!({"day": "2023-01-15"}))),
            "Field 'day' must be in the format: %d/%m/%Y"
        );
        assert_eq!(
            rule.error_message(&record(json!({}))),
            "Field 'day' must be a datetime or a string that can be converted to a datetime"
        );
    }

    #[test]
    fn json_rule_parses_strings_only() {
        let rule = Rule::json("payload");
        assert!(rule.is_valid(&record(json!({"payload": "{\"a\": [1, 2]}"}))));
        assert!(!rule.is_valid(&record(json!({"payload": "{a: 1}"}))));
        assert!(!rule.is_valid(&record(json!({"payload": {"a": 1}}))));
    }

    #[test]
    fn end_must_follow_start() {
        let rule = Rule::end_after_start("start_date", "end_date");
        assert!(rule.is_valid(&record(json!({
            "start_date": "2023-01-15T00:00:00", "end_date": "2024-02-16"
        }))));
        let inverted = record(json!({"start_date": "2024-02-16", "end_date": "2023-01-15"}));
        assert!(!rule.is_valid(&inverted));
        assert_eq!(
            rule.error_message(&inverted),
            "Field 'end_date' must be after field 'start_date'"
        );
        let same = record(json!({"start_date": "2024-02-16", "end_date": "2024-02-16T00:00:00Z"}));
        assert!(!rule.is_valid(&same));
        let garbled = record(json!({"start_date": "soon", "end_date": "2024-02-16"}));
        assert_eq!(
            rule.error_message(&garbled),
            "Fields 'start_date' and 'end_date' must both be datetimes"
        );
    }

    #[test]
    fn combinators_explain_themselves() {
        let data = record(json!({"n": 5}));
        let and = Rule::required("n") & Rule::number_range("n", Some(10.0), None);
        assert!(!and.is_valid(&data));
        assert_eq!(and.error_message(&data), "Field 'n' must be at least 10");

        let or = Rule::integer("m") | Rule::boolean("m");
        assert!(!or.is_valid(&data));
        assert_eq!(
            or.error_message(&data),
            "Both rules failed: Field 'm' must be an integer OR Field 'm' must be a boolean"
        );

        let not = !Rule::integer("n");
        assert!(!not.is_valid(&data));
        assert_eq!(
            not.error_message(&data),
            "Rule should not have been valid: Field 'n' must be an integer"
        );
        assert!((!Rule::integer("m")).is_valid(&data));
    }
}
