use std::collections::HashMap;

use qdrant_client::qdrant::{PointId, Value, point_id::PointIdOptions, value::Kind};

use crate::models::{HitMethod, SearchHit};

pub const UNKNOWN_TITLE: &str = "Unbekannt";

const METADATA_KEY: &str = "metadata";
const DOCUMENT_ID_KEY: &str = "document_id";
const FILENAME_KEY: &str = "filename";

/// Payload keys a hit is read from.
#[derive(Clone, Debug)]
pub struct PayloadFields {
	pub text: String,
	pub title: String,
}

pub fn hit_from_payload(
	point_id: Option<&PointId>,
	payload: &HashMap<String, Value>,
	fields: &PayloadFields,
	score: f32,
	method: HitMethod,
) -> SearchHit {
	let metadata = payload_struct(payload, METADATA_KEY);
	let title = payload_string(payload, &fields.title)
		.filter(|title| !title.trim().is_empty())
		.or_else(|| metadata.and_then(|meta| payload_string(meta, "title")))
		.filter(|title| !title.trim().is_empty())
		.unwrap_or_else(|| UNKNOWN_TITLE.to_string());
	let filename = payload_string(payload, FILENAME_KEY)
		.or_else(|| metadata.and_then(|meta| payload_string(meta, FILENAME_KEY)));

	SearchHit {
		point_id: point_id.and_then(point_id_to_string).unwrap_or_default(),
		score,
		title,
		text: payload_string(payload, &fields.text).unwrap_or_default(),
		document_id: payload_scalar(payload, DOCUMENT_ID_KEY),
		filename,
		method,
	}
}

pub fn point_id_to_string(point_id: &PointId) -> Option<String> {
	match &point_id.point_id_options {
		Some(PointIdOptions::Uuid(id)) => Some(id.clone()),
		Some(PointIdOptions::Num(id)) => Some(id.to_string()),
		None => None,
	}
}

pub fn payload_string(payload: &HashMap<String, Value>, key: &str) -> Option<String> {
	let value = payload.get(key)?;

	match &value.kind {
		Some(Kind::StringValue(text)) => Some(text.to_string()),
		_ => None,
	}
}

/// Strings and integers rendered as text, for ids stored either way.
pub fn payload_scalar(payload: &HashMap<String, Value>, key: &str) -> Option<String> {
	let value = payload.get(key)?;

	match &value.kind {
		Some(Kind::StringValue(text)) => Some(text.to_string()),
		Some(Kind::IntegerValue(value)) => Some(value.to_string()),
		_ => None,
	}
}

fn payload_struct<'a>(
	payload: &'a HashMap<String, Value>,
	key: &str,
) -> Option<&'a HashMap<String, Value>> {
	match &payload.get(key)?.kind {
		Some(Kind::StructValue(inner)) => Some(&inner.fields),
		_ => None,
	}
}

#[cfg(test)]
mod tests {
	use qdrant_client::qdrant::Struct;

	use super::*;

	fn string(value: &str) -> Value {
		Value { kind: Some(Kind::StringValue(value.to_string())) }
	}

	fn fields() -> PayloadFields {
		PayloadFields { text: "chunk_text".to_string(), title: "title".to_string() }
	}

	#[test]
	fn reads_top_level_fields() {
		let payload = HashMap::from([
			("title".to_string(), string("Wahlprogramm 2025")),
			("chunk_text".to_string(), string("Wir wollen Klimaschutz.")),
			("document_id".to_string(), Value { kind: Some(Kind::IntegerValue(42)) }),
			("filename".to_string(), string("programm.pdf")),
		]);
		let id = PointId { point_id_options: Some(PointIdOptions::Num(7)) };
		let hit = hit_from_payload(Some(&id), &payload, &fields(), 0.5, HitMethod::Vector);

		assert_eq!(hit.point_id, "7");
		assert_eq!(hit.title, "Wahlprogramm 2025");
		assert_eq!(hit.text, "Wir wollen Klimaschutz.");
		assert_eq!(hit.document_id.as_deref(), Some("42"));
		assert_eq!(hit.filename.as_deref(), Some("programm.pdf"));
	}

	#[test]
	fn falls_back_to_metadata_then_placeholder() {
		let metadata = Struct {
			fields: HashMap::from([
				("title".to_string(), string("Aus Metadaten")),
				("filename".to_string(), string("meta.pdf")),
			]),
		};
		let payload = HashMap::from([(
			"metadata".to_string(),
			Value { kind: Some(Kind::StructValue(metadata)) },
		)]);
		let hit = hit_from_payload(None, &payload, &fields(), 0.1, HitMethod::Text);

		assert_eq!(hit.title, "Aus Metadaten");
		assert_eq!(hit.filename.as_deref(), Some("meta.pdf"));
		assert_eq!(hit.text, "");
		assert_eq!(hit.point_id, "");

		let empty = hit_from_payload(None, &HashMap::new(), &fields(), 0.1, HitMethod::Text);

		assert_eq!(empty.title, UNKNOWN_TITLE);
		assert!(empty.filename.is_none());
	}
}
