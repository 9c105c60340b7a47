//! Configuration view
//!
//! Configuration is a tree of named values loaded from a YAML file. Keys are
//! matched case-insensitively (`Port` and `port` are the same option) and
//! read through typed accessors that return `None` when a value is missing
//! or cannot be interpreted as the requested type. Callers decide on the
//! defaults.

use std::path::Path;

use serde_json::{Map, Value};

use crate::prelude::*;

#[derive(Debug, Clone, Default)]
pub struct Config {
	values: Map<String, Value>,
}

impl Config {
	pub fn new() -> Self {
		Self::default()
	}

	/// Wrap a JSON tree; the root must be an object (or null for empty)
	pub fn from_value(value: Value) -> PcResult<Self> {
		match value {
			Value::Object(values) => Ok(Self { values }),
			Value::Null => Ok(Self::default()),
			other => Err(Error::ConfigInvalid(format!(
				"Configuration root must be a mapping, got {}",
				type_name(&other)
			))),
		}
	}

	pub fn from_yaml(text: &str) -> PcResult<Self> {
		let value: Value = serde_yaml::from_str(text)?;
		Self::from_value(value)
	}

	/// Load a YAML configuration file. A missing file yields an empty config.
	pub fn load(path: &Path) -> PcResult<Self> {
		match std::fs::read_to_string(path) {
			Ok(text) => {
				info!("Loading configuration from {}", path.display());
				Self::from_yaml(&text)
			}
			Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
				info!("No configuration at {}, using defaults", path.display());
				Ok(Self::default())
			}
			Err(e) => Err(e.into()),
		}
	}

	/// Set a value (replacing any key that matches case-insensitively)
	pub fn set(&mut self, key: &str, value: impl Into<Value>) -> &mut Self {
		let existing = self.values.keys().find(|k| k.eq_ignore_ascii_case(key)).cloned();
		if let Some(existing) = existing {
			self.values.remove(&existing);
		}
		self.values.insert(key.to_string(), value.into());
		self
	}

	fn lookup(&self, key: &str) -> Option<&Value> {
		self.values.get(key).or_else(|| {
			self.values.iter().find(|(k, _)| k.eq_ignore_ascii_case(key)).map(|(_, v)| v)
		})
	}

	pub fn contains(&self, key: &str) -> bool {
		self.lookup(key).is_some_and(|v| !v.is_null())
	}

	/// String value; scalars are converted to their textual form
	pub fn get_str(&self, key: &str) -> Option<String> {
		match self.lookup(key)? {
			Value::String(s) => Some(s.clone()),
			Value::Number(n) => Some(n.to_string()),
			Value::Bool(b) => Some(b.to_string()),
			_ => None,
		}
	}

	/// Integer value; numeric strings are accepted
	pub fn get_i64(&self, key: &str) -> Option<i64> {
		match self.lookup(key)? {
			Value::Number(n) => n.as_i64(),
			Value::String(s) => s.trim().parse().ok(),
			_ => None,
		}
	}

	pub fn get_bool(&self, key: &str) -> Option<bool> {
		match self.lookup(key)? {
			Value::Bool(b) => Some(*b),
			Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
				"true" | "yes" | "on" | "1" => Some(true),
				"false" | "no" | "off" | "0" => Some(false),
				_ => None,
			},
			_ => None,
		}
	}

	/// List of strings; a single scalar is treated as a one-element list
	pub fn get_list(&self, key: &str) -> Vec<String> {
		match self.lookup(key) {
			Some(Value::Array(items)) => items
				.iter()
				.filter_map(|item| match item {
					Value::String(s) => Some(s.clone()),
					Value::Number(n) => Some(n.to_string()),
					_ => None,
				})
				.collect(),
			Some(Value::String(s)) => vec![s.clone()],
			_ => Vec::new(),
		}
	}

	/// Nested section; empty when absent or not a mapping
	pub fn section(&self, key: &str) -> Config {
		match self.lookup(key) {
			Some(Value::Object(values)) => Config { values: values.clone() },
			_ => Config::default(),
		}
	}

	pub fn is_empty(&self) -> bool {
		self.values.is_empty()
	}
}

fn type_name(value: &Value) -> &'static str {
	match value {
		Value::Null => "null",
		Value::Bool(_) => "boolean",
		Value::Number(_) => "number",
		Value::String(_) => "string",
		Value::Array(_) => "sequence",
		Value::Object(_) => "mapping",
	}
}


// vim: ts=4
