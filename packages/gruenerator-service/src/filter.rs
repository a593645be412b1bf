use std::collections::BTreeMap;

use qdrant_client::qdrant::{Condition, Filter};
use serde_json::Value;

use gruenerator_config::{FilterField, FilterFieldKind};

/// Filter values supplied by a caller, keyed by collection field name.
pub type FilterSpec = BTreeMap<String, Value>;

/// Translates recognized, non-null filter entries into a conjunction of exact-match conditions.
///
/// Unknown fields are ignored. Returns `None` when no condition was produced.
pub fn build_filter(
	fields: &BTreeMap<String, FilterField>,
	spec: Option<&FilterSpec>,
) -> Option<Filter> {
	let mut must = Vec::new();

	for (name, field, raw) in recognized_entries(fields, spec) {
		let key = field.key.clone().unwrap_or_else(|| name.to_string());
		let condition = match field.kind {
			FilterFieldKind::Keyword => Some(Condition::matches(key, raw.clone())),
			FilterFieldKind::Integer =>
				raw.trim().parse::<i64>().ok().map(|value| Condition::matches(key, value)),
			FilterFieldKind::Boolean =>
				raw.trim().parse::<bool>().ok().map(|value| Condition::matches(key, value)),
		};

		match condition {
			Some(condition) => must.push(condition),
			None => tracing::warn!(
				field = name,
				kind = field.kind.as_str(),
				value = %raw,
				"Dropping filter value that does not match the field type."
			),
		}
	}

	if must.is_empty() { None } else { Some(Filter { must, ..Default::default() }) }
}

/// The recognized, non-null subset of `spec` as echoed back to callers.
pub fn applied_filters(
	fields: &BTreeMap<String, FilterField>,
	spec: Option<&FilterSpec>,
) -> Option<BTreeMap<String, String>> {
	let applied: BTreeMap<String, String> = recognized_entries(fields, spec)
		.into_iter()
		.map(|(name, _, raw)| (name.to_string(), raw))
		.collect();

	if applied.is_empty() { None } else { Some(applied) }
}

fn recognized_entries<'a>(
	fields: &'a BTreeMap<String, FilterField>,
	spec: Option<&'a FilterSpec>,
) -> Vec<(&'a str, &'a FilterField, String)> {
	let Some(spec) = spec else {
		return Vec::new();
	};

	spec.iter()
		.filter_map(|(name, value)| {
			let Some(field) = fields.get(name) else {
				tracing::debug!(field = %name, "Ignoring unrecognized filter field.");

				return None;
			};

			scalar_value(value).map(|raw| (name.as_str(), field, raw))
		})
		.collect()
}

fn scalar_value(value: &Value) -> Option<String> {
	match value {
		Value::String(text) if !text.trim().is_empty() => Some(text.trim().to_string()),
		Value::Number(number) => Some(number.to_string()),
		Value::Bool(flag) => Some(flag.to_string()),
		_ => None,
	}
}
