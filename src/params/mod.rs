// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Docdesk-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Docdesk and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Loosely typed call arguments.
//!
//! A [`ParamBag`] wraps the JSON object a tool call carries and hands out typed values.
//! It only detects absence and shape mismatches; domain validation (bounds, paths, option
//! conflicts) stays with the handlers.

use serde_json::{Map, Value};

use crate::error::{DocError, DocResult};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParamBag {
    values: Map<String, Value>,
}

impl ParamBag {
    pub fn new(values: Map<String, Value>) -> Self {
        Self { values }
    }

    /// Accepts a JSON object or `null` (no parameters).
    pub fn from_value(value: Value) -> DocResult<Self> {
        match value {
            Value::Object(values) => Ok(Self { values }),
            Value::Null => Ok(Self::default()),
            other => Err(DocError::TypeMismatch {
                name: "params".to_owned(),
                expected: "an object",
                actual: json_type_name(&other),
            }),
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// True when the key is present with a non-null value.
    pub fn contains(&self, name: &str) -> bool {
        self.raw(name).is_some()
    }

    pub fn raw(&self, name: &str) -> Option<&Value> {
        self.values.get(name).filter(|value| !value.is_null())
    }

    pub fn required<T: FromParam>(&self, name: &str) -> DocResult<T> {
        let value = self.raw(name).ok_or_else(|| DocError::MissingParameter {
            name: name.to_owned(),
        })?;
        coerce(name, value)
    }

    pub fn optional<T: FromParam>(&self, name: &str) -> DocResult<Option<T>> {
        self.raw(name).map(|value| coerce(name, value)).transpose()
    }

    pub fn optional_or<T: FromParam>(&self, name: &str, default: T) -> DocResult<T> {
        Ok(self.optional(name)?.unwrap_or(default))
    }

    /// Like [`ParamBag::required`] but rejects blank strings.
    pub fn required_str(&self, name: &str) -> DocResult<String> {
        let value: String = self.required(name)?;
        if value.trim().is_empty() {
            return Err(DocError::argument(format!("parameter '{name}' must not be empty")));
        }
        Ok(value)
    }
}

impl From<Map<String, Value>> for ParamBag {
    fn from(values: Map<String, Value>) -> Self {
        Self::new(values)
    }
}

fn coerce<T: FromParam>(name: &str, value: &Value) -> DocResult<T> {
    T::from_param(value).ok_or_else(|| DocError::TypeMismatch {
        name: name.to_owned(),
        expected: T::EXPECTED,
        actual: json_type_name(value),
    })
}

pub fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(n) if n.is_f64() => "a float",
        Value::Number(_) => "an integer",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Conversion from a JSON value into a typed parameter.
pub trait FromParam: Sized {
    const EXPECTED: &'static str;

    fn from_param(value: &Value) -> Option<Self>;
}

impl FromParam for Value {
    const EXPECTED: &'static str = "any value";

    fn from_param(value: &Value) -> Option<Self> {
        Some(value.clone())
    }
}

impl FromParam for String {
    const EXPECTED: &'static str = "a string";

    fn from_param(value: &Value) -> Option<Self> {
        value.as_str().map(str::to_owned)
    }
}

impl FromParam for bool {
    const EXPECTED: &'static str = "a boolean";

    fn from_param(value: &Value) -> Option<Self> {
        value.as_bool()
    }
}

impl FromParam for f64 {
    const EXPECTED: &'static str = "a number";

    fn from_param(value: &Value) -> Option<Self> {
        // Integers widen; as_f64 covers i64/u64/f64 numbers.
        value.as_f64()
    }
}

impl FromParam for i64 {
    const EXPECTED: &'static str = "an integer";

    fn from_param(value: &Value) -> Option<Self> {
        value.as_i64()
    }
}

impl FromParam for u64 {
    const EXPECTED: &'static str = "a non-negative integer";

    fn from_param(value: &Value) -> Option<Self> {
        value.as_u64()
    }
}

impl FromParam for u32 {
    const EXPECTED: &'static str = "a non-negative 32-bit integer";

    fn from_param(value: &Value) -> Option<Self> {
        value.as_u64().and_then(|n| u32::try_from(n).ok())
    }
}

impl FromParam for usize {
    const EXPECTED: &'static str = "a non-negative integer";

    fn from_param(value: &Value) -> Option<Self> {
        value.as_u64().and_then(|n| usize::try_from(n).ok())
    }
}

impl FromParam for Map<String, Value> {
    const EXPECTED: &'static str = "an object";

    fn from_param(value: &Value) -> Option<Self> {
        value.as_object().cloned()
    }
}

impl<T: FromParam> FromParam for Vec<T> {
    const EXPECTED: &'static str = "an array";

    fn from_param(value: &Value) -> Option<Self> {
        value.as_array()?.iter().map(T::from_param).collect()
    }
}

impl<T: FromParam> FromParam for Option<T> {
    const EXPECTED: &'static str = T::EXPECTED;

    fn from_param(value: &Value) -> Option<Self> {
        if value.is_null() {
            return Some(None);
        }
        T::from_param(value).map(Some)
    }
}
