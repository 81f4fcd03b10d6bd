//! Form collector: the sixteen client input widgets and their constraints.
//!
//! Numbers are clamped to the widget bounds, choices are restricted to a closed
//! vocabulary, and every field has a default so a collected record is never
//! incomplete. The vocabulary must match the one the model was trained with,
//! since the one-hot column names are derived from it.

use crate::error::FormError;
use crate::types::client::{AttributeValue, ClientRecord};
use std::collections::HashMap;
use std::num::IntErrorKind;
use tracing::debug;

/// Input widget kind
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Integer input clamped to `min..=max`
    Number { min: i64, max: i64, default: i64 },
    /// Select box; the first choice is the default
    Choice { choices: &'static [&'static str] },
}

/// One form field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    /// Attribute / column name
    pub name: &'static str,
    /// Human-readable label
    pub label: &'static str,
    pub kind: FieldKind,
}

impl FieldSpec {
    const fn number(name: &'static str, label: &'static str, min: i64, max: i64, default: i64) -> Self {
        Self {
            name,
            label,
            kind: FieldKind::Number { min, max, default },
        }
    }

    const fn choice(name: &'static str, label: &'static str, choices: &'static [&'static str]) -> Self {
        Self {
            name,
            label,
            kind: FieldKind::Choice { choices },
        }
    }

    pub fn is_categorical(&self) -> bool {
        matches!(self.kind, FieldKind::Choice { .. })
    }

    /// Parse and constrain a raw submitted value
    fn parse(&self, raw: &str, record: &mut ClientRecord) -> Result<(), FormError> {
        match self.kind {
            FieldKind::Number { min, max, .. } => {
                let value = match raw.trim().parse::<i64>() {
                    Ok(value) => self.clamp(value, min, max),
                    // Integers too large for i64 are still just out of range
                    Err(e) if *e.kind() == IntErrorKind::PosOverflow => max,
                    Err(e) if *e.kind() == IntErrorKind::NegOverflow => min,
                    Err(_) => {
                        return Err(FormError::InvalidNumber {
                            field: self.name,
                            value: raw.to_string(),
                        })
                    }
                };
                record.set_number(self.name, value);
            }
            FieldKind::Choice { choices } => {
                let choice = self.check_choice(raw, choices)?;
                record.set_category(self.name, choice);
            }
        }
        Ok(())
    }

    fn clamp(&self, value: i64, min: i64, max: i64) -> i64 {
        let clamped = value.clamp(min, max);
        if clamped != value {
            debug!(field = self.name, value, clamped, "Clamped out-of-range input");
        }
        clamped
    }

    fn check_choice<'a>(&self, raw: &'a str, choices: &[&str]) -> Result<&'a str, FormError> {
        if choices.iter().any(|c| *c == raw) {
            Ok(raw)
        } else {
            Err(FormError::UnknownChoice {
                field: self.name,
                value: raw.to_string(),
            })
        }
    }
}

pub const JOBS: &[&str] = &[
    "admin.",
    "technician",
    "services",
    "management",
    "retired",
    "blue-collar",
    "unemployed",
    "unknown",
    "self-employed",
    "entrepreneur",
    "housemaid",
    "student",
];
pub const MARITAL: &[&str] = &["married", "single", "divorced"];
pub const EDUCATION: &[&str] = &["unknown", "secondary", "primary", "tertiary"];
pub const YES_NO: &[&str] = &["no", "yes"];
pub const CONTACT: &[&str] = &["unknown", "cellular", "telephone"];
pub const MONTHS: &[&str] = &[
    "jan", "feb", "mar", "apr", "may", "jun", "jul", "aug", "sep", "oct", "nov", "dec",
];
pub const POUTCOME: &[&str] = &["unknown", "success", "failure", "other"];

/// All form fields, in display order
pub const CLIENT_FIELDS: [FieldSpec; 16] = [
    FieldSpec::number("age", "Age", 18, 100, 30),
    FieldSpec::choice("job", "Job", JOBS),
    FieldSpec::choice("marital", "Marital Status", MARITAL),
    FieldSpec::choice("education", "Education", EDUCATION),
    FieldSpec::choice("default", "Has Credit in Default?", YES_NO),
    FieldSpec::number("balance", "Balance (in euros)", -2000, 100_000, 0),
    FieldSpec::choice("housing", "Has Housing Loan?", YES_NO),
    FieldSpec::choice("loan", "Has Personal Loan?", YES_NO),
    FieldSpec::choice("contact", "Contact Communication Type", CONTACT),
    FieldSpec::number("day", "Day of the Month (Last Contact)", 1, 31, 15),
    FieldSpec::choice("month", "Month of Last Contact", MONTHS),
    FieldSpec::number("duration", "Duration of Last Contact (seconds)", 0, 5000, 0),
    FieldSpec::number("campaign", "Number of Contacts During Campaign", 1, 50, 1),
    FieldSpec::number(
        "pdays",
        "Days Since Client Was Last Contacted (-1 means never)",
        -1,
        999,
        -1,
    ),
    FieldSpec::number("previous", "Number of Contacts Before this Campaign", 0, 50, 0),
    FieldSpec::choice("poutcome", "Outcome of Previous Campaign", POUTCOME),
];

/// Look up a field by attribute name
pub fn field(name: &str) -> Option<&'static FieldSpec> {
    CLIENT_FIELDS.iter().find(|f| f.name == name)
}

/// Apply every valid submitted value to a default record, returning the
/// errors of the fields that were left at their default.
fn apply(submission: &HashMap<String, String>) -> (ClientRecord, Vec<FormError>) {
    let mut record = ClientRecord::default();
    let mut errors = Vec::new();
    for spec in &CLIENT_FIELDS {
        if let Some(raw) = submission.get(spec.name) {
            if let Err(e) = spec.parse(raw, &mut record) {
                errors.push(e);
            }
        }
    }
    (record, errors)
}

/// Build a record from raw form values. Absent fields keep their default.
pub fn collect(submission: &HashMap<String, String>) -> Result<ClientRecord, FormError> {
    let (record, errors) = apply(submission);
    match errors.into_iter().next() {
        Some(e) => Err(e),
        None => Ok(record),
    }
}

/// The record to show again after a rejected submission: valid values are
/// kept, invalid ones fall back to the field default.
pub fn prefill(submission: &HashMap<String, String>) -> ClientRecord {
    apply(submission).0
}

/// Apply the widget constraints to a record that did not come through the form
pub fn normalize(mut record: ClientRecord) -> Result<ClientRecord, FormError> {
    for spec in &CLIENT_FIELDS {
        match (spec.kind, record.attribute(spec.name)) {
            (FieldKind::Number { min, max, .. }, Some(AttributeValue::Number(value))) => {
                let clamped = spec.clamp(value, min, max);
                record.set_number(spec.name, clamped);
            }
            (FieldKind::Choice { choices }, Some(AttributeValue::Category(value))) => {
                spec.check_choice(value, choices)?;
            }
            _ => {}
        }
    }
    Ok(record)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn submission(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_defaults_match_record_default() {
        let record = ClientRecord::default();
        for spec in &CLIENT_FIELDS {
            let expected = match spec.kind {
                FieldKind::Number { default, .. } => AttributeValue::Number(default),
                FieldKind::Choice { choices } => AttributeValue::Category(choices[0]),
            };
            assert_eq!(record.attribute(spec.name), Some(expected), "field {}", spec.name);
        }
    }

    #[test]
    fn test_collect_empty_submission_yields_defaults() {
        let record = collect(&HashMap::new()).unwrap();
        assert_eq!(record, ClientRecord::default());
    }

    #[test]
    fn test_collect_parses_and_clamps() {
        let record = collect(&submission(&[
            ("age", "130"),
            ("balance", " -5000 "),
            ("job", "student"),
            ("month", "may"),
            ("pdays", "-1"),
        ]))
        .unwrap();

        assert_eq!(record.age, 100);
        assert_eq!(record.balance, -2000);
        assert_eq!(record.job, "student");
        assert_eq!(record.month, "may");
        assert_eq!(record.pdays, -1);
    }

    #[test]
    fn test_collect_rejects_bad_input() {
        let err = collect(&submission(&[("duration", "12.5")])).unwrap_err();
        assert_eq!(
            err,
            FormError::InvalidNumber {
                field: "duration",
                value: "12.5".to_string()
            }
        );

        let err = collect(&submission(&[("education", "doctorate")])).unwrap_err();
        assert_eq!(
            err,
            FormError::UnknownChoice {
                field: "education",
                value: "doctorate".to_string()
            }
        );
    }

    #[test]
    fn test_collect_clamps_overflowing_integers() {
        let record = collect(&submission(&[
            ("age", "99999999999999999999"),
            ("balance", "-99999999999999999999"),
        ]))
        .unwrap();
        assert_eq!(record.age, 100);
        assert_eq!(record.balance, -2000);
    }

    #[test]
    fn test_prefill_keeps_valid_values() {
        let fields = submission(&[
            ("job", "student"),
            ("duration", "120"),
            ("education", "doctorate"),
            ("age", "abc"),
        ]);
        assert!(collect(&fields).is_err());

        let record = prefill(&fields);
        assert_eq!(record.job, "student");
        assert_eq!(record.duration, 120);
        assert_eq!(record.education, "unknown");
        assert_eq!(record.age, 30);
    }

    #[test]
    fn test_normalize() {
        let record = ClientRecord {
            campaign: 0,
            day: 45,
            ..ClientRecord::default()
        };
        let record = normalize(record).unwrap();
        assert_eq!(record.campaign, 1);
        assert_eq!(record.day, 31);

        let record = ClientRecord {
            contact: "email".to_string(),
            ..ClientRecord::default()
        };
        assert!(matches!(
            normalize(record),
            Err(FormError::UnknownChoice { field: "contact", .. })
        ));
    }

    #[test]
    fn test_field_lookup() {
        assert_eq!(field("poutcome").map(|f| f.is_categorical()), Some(true));
        assert_eq!(field("age").map(|f| f.is_categorical()), Some(false));
        assert!(field("day_of_week").is_none());
    }
}
