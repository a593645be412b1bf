//! Fixtures shared by the workspace test suites.

use std::collections::BTreeMap;

use serde_json::Map;

use gruenerator_config::{
	Cache, Collection, Config, EmbeddingProviderConfig, FilterField, FilterFieldKind, Providers,
	Qdrant, Search, Service, Storage,
};
use gruenerator_storage::models::{HitMethod, SearchHit};

pub const EMBEDDING_DIMENSIONS: u32 = 4;

/// A valid configuration with the `kommunalwiki` and `deutschland` collections.
pub fn sample_config() -> Config {
	Config {
		service: Service { mcp_bind: "127.0.0.1:0".to_string(), log_level: "info".to_string() },
		storage: Storage {
			qdrant: Qdrant {
				url: "http://127.0.0.1:6334".to_string(),
				api_key: None,
				timeout_ms: 1_000,
				text_field: "chunk_text".to_string(),
				title_field: "title".to_string(),
				dense_vector_name: None,
			},
		},
		providers: Providers {
			embedding: EmbeddingProviderConfig {
				provider_id: "test".to_string(),
				api_base: "http://127.0.0.1:1".to_string(),
				api_key: "test-key".to_string(),
				path: "/v1/embeddings".to_string(),
				model: "test-embed".to_string(),
				dimensions: Some(EMBEDDING_DIMENSIONS),
				timeout_ms: 1_000,
				default_headers: Map::new(),
			},
		},
		search: Search::default(),
		cache: Cache::default(),
		collections: vec![
			Collection {
				id: "kommunalwiki".to_string(),
				name: "kommunalwiki_documents".to_string(),
				display_name: "KommunalWiki".to_string(),
				description: "Fachwissen für grüne Kommunalpolitik.".to_string(),
				filters: BTreeMap::from([
					("article_type".to_string(), keyword("Artikeltyp", None)),
					("category".to_string(), keyword("Kategorie", None)),
				]),
			},
			Collection {
				id: "deutschland".to_string(),
				name: "grundsatz_documents".to_string(),
				display_name: "Bündnis 90/Die Grünen Grundsatzprogramm".to_string(),
				description: "Programme der Bundespartei.".to_string(),
				filters: BTreeMap::from([
					("documentType".to_string(), keyword("Dokumenttyp", Some("document_type"))),
					("year".to_string(), FilterField {
						label: "Jahr".to_string(),
						key: None,
						kind: FilterFieldKind::Integer,
					}),
				]),
			},
		],
	}
}

pub fn sample_hit(id: &str, score: f32, text: &str) -> SearchHit {
	SearchHit {
		point_id: id.to_string(),
		score,
		title: format!("Dokument {id}"),
		text: text.to_string(),
		document_id: Some(format!("doc-{id}")),
		filename: None,
		method: HitMethod::Vector,
	}
}

fn keyword(label: &str, key: Option<&str>) -> FilterField {
	FilterField { label: label.to_string(), key: key.map(str::to_string), kind: FilterFieldKind::Keyword }
}
