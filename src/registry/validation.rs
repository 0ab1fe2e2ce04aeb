//! Field constraints for target records
//!
//! Validation runs in two explicit steps:
//!
//! 1. [`TargetFields::normalize`] fills defaults (currently only `port`).
//! 2. [`check_fields`] applies the per-field constraints in a fixed order
//!    (`name`, `description`, `host`, `port`) and reports the first failure.
//!
//! The uniqueness rule needs a store lookup and lives in [`check_unique`],
//! which takes the record found by name and the record being updated (if
//! any) as plain arguments.
//!
//! Request bodies are screened by [`check_not_null`] first: a field sent as
//! an explicit JSON `null` is an error rather than an absent field.
//!
//! `host` is checked against a dotted-quad pattern only. Octet ranges are not
//! checked, so `999.1.1.1` is accepted.

use std::ops::{Range, RangeInclusive};
use std::sync::LazyLock;

use regex::Regex;
use serde::Deserialize;
use serde_json::Value;

use super::error::ValidationError;
use crate::storage::{DEFAULT_PORT, Target};

pub const NAME_LENGTH: RangeInclusive<usize> = 2..=64;
pub const DESCRIPTION_LENGTH: RangeInclusive<usize> = 0..=512;
pub const PORT_RANGE: Range<i64> = 1024..65536;

const MISSING: &str = "Missing data for required field.";
const NULL: &str = "Field may not be null.";

const FIELD_NAMES: [&str; 5] = ["name", "description", "host", "port", "password"];

static HOST_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\d{1,3}\.\d{1,3}\.\d{1,3}\.\d{1,3}$").expect("host pattern is valid")
});

/// Candidate or partial input for a target
///
/// Every field is optional: on create `name` and `host` are required by
/// [`check_fields`], on update absent fields keep their stored values.
/// `port` is wide so out-of-range values reach the validator.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct TargetFields {
    pub name: Option<String>,
    pub description: Option<String>,
    pub host: Option<String>,
    pub port: Option<i64>,
    pub password: Option<String>,
}

/// Fully validated and defaulted field set
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedFields {
    pub name: String,
    pub description: Option<String>,
    pub host: String,
    pub port: u16,
    pub password: Option<String>,
}

impl TargetFields {
    /// Fill defaults ahead of constraint checks
    pub fn normalize(mut self) -> Self {
        self.port.get_or_insert(i64::from(DEFAULT_PORT));
        self
    }

    /// Take absent fields from an existing record
    pub fn merged_onto(self, existing: &Target) -> Self {
        Self {
            name: self.name.or_else(|| Some(existing.name.clone())),
            description: self.description.or_else(|| existing.description.clone()),
            host: self.host.or_else(|| Some(existing.host.clone())),
            port: self.port.or(Some(i64::from(existing.port))),
            password: self.password.or_else(|| existing.password.clone()),
        }
    }
}

fn check_length(
    field: &'static str,
    value: &str,
    range: &RangeInclusive<usize>,
) -> Result<(), ValidationError> {
    let len = value.chars().count();
    if range.contains(&len) {
        return Ok(());
    }

    let message = if *range.start() == 0 {
        format!("Longer than maximum length {}.", range.end())
    } else {
        format!(
            "Length must be between {} and {}.",
            range.start(),
            range.end()
        )
    };
    Err(ValidationError::new(field, message))
}

/// Apply per-field constraints; expects normalized input
pub fn check_fields(fields: TargetFields) -> Result<ValidatedFields, ValidationError> {
    let TargetFields {
        name,
        description,
        host,
        port,
        password,
    } = fields;

    let name = name.ok_or_else(|| ValidationError::new("name", MISSING))?;
    check_length("name", &name, &NAME_LENGTH)?;

    if let Some(description) = &description {
        check_length("description", description, &DESCRIPTION_LENGTH)?;
    }

    let host = host.ok_or_else(|| ValidationError::new("host", MISSING))?;
    if !HOST_PATTERN.is_match(&host) {
        return Err(ValidationError::new(
            "host",
            "String does not match expected pattern.",
        ));
    }

    let port = port.unwrap_or(i64::from(DEFAULT_PORT));
    if !PORT_RANGE.contains(&port) {
        return Err(ValidationError::new(
            "port",
            format!(
                "Must be greater than or equal to {} and less than {}.",
                PORT_RANGE.start, PORT_RANGE.end
            ),
        ));
    }
    let port = u16::try_from(port).map_err(|_| ValidationError::new("port", "Out of range."))?;

    Ok(ValidatedFields {
        name,
        description,
        host,
        port,
        password,
    })
}

/// Reject fields present in a request body with a `null` value
pub fn check_not_null(body: &Value) -> Result<(), ValidationError> {
    let Some(object) = body.as_object() else {
        return Ok(());
    };

    match FIELD_NAMES
        .into_iter()
        .find(|field| object.get(*field).is_some_and(Value::is_null))
    {
        Some(field) => Err(ValidationError::new(field, NULL)),
        None => Ok(()),
    }
}

/// Name-uniqueness rule
///
/// `found` is the record currently owning the candidate name, `existing`
/// the record being updated (`None` when creating). A record may keep its
/// own name.
pub fn check_unique(
    found: Option<&Target>,
    existing: Option<&Target>,
) -> Result<(), ValidationError> {
    match (found, existing) {
        (None, _) => Ok(()),
        (Some(found), Some(existing)) if found.id == existing.id => Ok(()),
        (Some(_), _) => Err(ValidationError::name_conflict()),
    }
}
