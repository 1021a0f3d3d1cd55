//! Component identity — `type[/name]` ids for receivers.

use std::fmt;

use crate::error::ReceiverError;

/// Identifies one receiver instance, e.g. `stdin` or `stdin/primary`.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ComponentId {
    kind: String,
    name: Option<String>,
}

impl ComponentId {
    pub const MAX_NAME_BYTES: usize = 1024;

    /// Build an id from a component type with no instance name.
    pub fn new(kind: &str) -> Result<Self, ReceiverError> {
        validate_kind(kind).map_err(|why| ReceiverError::InvalidComponentId(kind.to_string(), why))?;
        Ok(Self {
            kind: kind.to_string(),
            name: None,
        })
    }

    /// Build an id from a component type and an instance name.
    pub fn with_name(kind: &str, name: &str) -> Result<Self, ReceiverError> {
        let mut id = Self::new(kind)?;
        validate_name(name)
            .map_err(|why| ReceiverError::InvalidComponentId(format!("{}/{}", kind, name), why))?;
        id.name = Some(name.to_string());
        Ok(id)
    }

    /// Parse the `type[/name]` string form.
    pub fn parse(raw: &str) -> Result<Self, ReceiverError> {
        match raw.split_once('/') {
            Some((kind, name)) => Self::with_name(kind, name),
            None => Self::new(raw),
        }
    }

    pub fn kind(&self) -> &str {
        &self.kind
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }
}

impl fmt::Display for ComponentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.name {
            Some(name) => write!(f, "{}/{}", self.kind, name),
            None => f.write_str(&self.kind),
        }
    }
}

fn validate_kind(kind: &str) -> Result<(), &'static str> {
    let mut chars = kind.chars();
    let Some(first) = chars.next() else {
        return Err("type must not be empty");
    };
    if !first.is_ascii_alphabetic() {
        return Err("type must start with an ASCII letter");
    }
    if !chars.all(|ch| ch.is_ascii_alphanumeric() || ch == '_') {
        return Err("type may only contain ASCII letters, digits and '_'");
    }
    Ok(())
}

fn validate_name(name: &str) -> Result<(), &'static str> {
    if name.is_empty() {
        return Err("name must not be empty");
    }
    if name.len() > ComponentId::MAX_NAME_BYTES {
        return Err("name is too long");
    }
    if name.chars().any(|ch| ch.is_whitespace() || ch.is_control()) {
        return Err("name must not contain whitespace or control characters");
    }
    Ok(())
}
