use std::time::Duration;

use reqwest::Client;
use serde_json::Value;

use crate::{Error, Result};
use gruenerator_config::EmbeddingProviderConfig;

pub async fn embed(cfg: &EmbeddingProviderConfig, texts: &[String]) -> Result<Vec<Vec<f32>>> {
	let client = Client::builder().timeout(Duration::from_millis(cfg.timeout_ms)).build()?;
	let url = format!("{}{}", cfg.api_base, cfg.path);
	let body = build_request_body(cfg, texts);
	let res = client
		.post(url)
		.headers(crate::auth_headers(&cfg.api_key, &cfg.default_headers)?)
		.json(&body)
		.send()
		.await?;
	let json: Value = res.error_for_status()?.json().await?;
	let vectors = parse_embedding_response(json)?;

	if vectors.len() != texts.len() {
		return Err(Error::InvalidResponse {
			message: format!(
				"Embedding provider returned {} vectors for {} inputs.",
				vectors.len(),
				texts.len()
			),
		});
	}

	Ok(vectors)
}

fn build_request_body(cfg: &EmbeddingProviderConfig, texts: &[String]) -> Value {
	let mut body = serde_json::json!({
		"model": cfg.model,
		"input": texts,
	});

	if let Some(dimensions) = cfg.dimensions {
		body["dimensions"] = Value::from(dimensions);
	}

	body
}

fn parse_embedding_response(json: Value) -> Result<Vec<Vec<f32>>> {
	let data = json.get("data").and_then(|v| v.as_array()).ok_or_else(|| {
		Error::InvalidResponse { message: "Embedding response is missing data array.".to_string() }
	})?;
	let mut indexed: Vec<(usize, Vec<f32>)> = Vec::with_capacity(data.len());

	for (fallback_index, item) in data.iter().enumerate() {
		let index = item
			.get("index")
			.and_then(|v| v.as_u64())
			.map(|v| v as usize)
			.unwrap_or(fallback_index);
		let embedding = item.get("embedding").and_then(|v| v.as_array()).ok_or_else(|| {
			Error::InvalidResponse {
				message: "Embedding item missing embedding array.".to_string(),
			}
		})?;
		let mut vec = Vec::with_capacity(embedding.len());

		for value in embedding {
			let number = value.as_f64().ok_or_else(|| Error::InvalidResponse {
				message: "Embedding value must be numeric.".to_string(),
			})?;

			vec.push(number as f32);
		}

		indexed.push((index, vec));
	}

	indexed.sort_by_key(|(index, _)| *index);

	Ok(indexed.into_iter().map(|(_, vec)| vec).collect())
}

#[cfg(test)]
mod tests {
	use serde_json::Map;

	use super::*;

	fn sample_cfg(dimensions: Option<u32>) -> EmbeddingProviderConfig {
		EmbeddingProviderConfig {
			provider_id: "mistral".to_string(),
			api_base: "https://api.mistral.ai".to_string(),
			api_key: "key".to_string(),
			path: "/v1/embeddings".to_string(),
			model: "mistral-embed".to_string(),
			dimensions,
			timeout_ms: 1_000,
			default_headers: Map::new(),
		}
	}

	#[test]
	fn parses_embeddings_in_index_order() {
		let json = serde_json::json!({
			"data": [
				{ "index": 1, "embedding": [2.0, 3.0] },
				{ "index": 0, "embedding": [0.5, 1.5] }
			]
		});
		let parsed = parse_embedding_response(json).expect("parse failed");

		assert_eq!(parsed.len(), 2);
		assert_eq!(parsed[0], vec![0.5, 1.5]);
		assert_eq!(parsed[1], vec![2.0, 3.0]);
	}

	#[test]
	fn rejects_response_without_data() {
		let err = parse_embedding_response(serde_json::json!({ "object": "list" }))
			.expect_err("Expected invalid response.");

		assert!(err.to_string().contains("missing data array"), "Unexpected error: {err}");
	}

	#[test]
	fn rejects_non_numeric_values() {
		let json = serde_json::json!({ "data": [{ "index": 0, "embedding": ["x"] }] });

		assert!(parse_embedding_response(json).is_err());
	}

	#[test]
	fn request_body_includes_dimensions_only_when_configured() {
		let texts = vec!["Klimaschutz".to_string()];
		let without = build_request_body(&sample_cfg(None), &texts);
		let with = build_request_body(&sample_cfg(Some(1_024)), &texts);

		assert!(without.get("dimensions").is_none());
		assert_eq!(with["dimensions"], 1_024);
		assert_eq!(with["input"], serde_json::json!(["Klimaschutz"]));
		assert_eq!(with["model"], "mistral-embed");
	}
}
