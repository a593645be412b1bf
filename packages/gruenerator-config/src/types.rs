use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
	pub service: Service,
	pub storage: Storage,
	pub providers: Providers,
	#[serde(default)]
	pub search: Search,
	#[serde(default)]
	pub cache: Cache,
	pub collections: Vec<Collection>,
}
impl Config {
	pub fn collection(&self, id: &str) -> Option<&Collection> {
		self.collections.iter().find(|collection| collection.id == id)
	}

	pub fn collection_ids(&self) -> Vec<&str> {
		self.collections.iter().map(|collection| collection.id.as_str()).collect()
	}
}

#[derive(Debug, Deserialize, Clone)]
pub struct Service {
	pub mcp_bind: String,
	#[serde(default = "default_log_level")]
	pub log_level: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct Storage {
	pub qdrant: Qdrant,
}

#[derive(Debug, Deserialize, Clone)]
pub struct Qdrant {
	pub url: String,
	pub api_key: Option<String>,
	#[serde(default = "default_timeout_ms")]
	pub timeout_ms: u64,
	/// Payload key holding the chunk text.
	#[serde(default = "default_text_field")]
	pub text_field: String,
	#[serde(default = "default_title_field")]
	pub title_field: String,
	/// Unset for collections with a single unnamed dense vector.
	pub dense_vector_name: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct Providers {
	pub embedding: EmbeddingProviderConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct EmbeddingProviderConfig {
	pub provider_id: String,
	pub api_base: String,
	pub api_key: String,
	pub path: String,
	pub model: String,
	/// When set, requested from the provider and enforced on every returned vector.
	pub dimensions: Option<u32>,
	#[serde(default = "default_timeout_ms")]
	pub timeout_ms: u64,
	#[serde(default)]
	pub default_headers: Map<String, Value>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct Search {
	#[serde(default = "default_limit")]
	pub default_limit: u32,
	#[serde(default = "default_max_limit")]
	pub max_limit: u32,
	#[serde(default = "default_excerpt_max_chars")]
	pub excerpt_max_chars: usize,
	/// Candidates fetched per leg are `limit * candidate_multiplier`.
	#[serde(default = "default_candidate_multiplier")]
	pub candidate_multiplier: u32,
	#[serde(default = "default_rrf_k")]
	pub rrf_k: u32,
	#[serde(default = "default_max_filter_values")]
	pub max_filter_values: u32,
}
impl Default for Search {
	fn default() -> Self {
		Self {
			default_limit: default_limit(),
			max_limit: default_max_limit(),
			excerpt_max_chars: default_excerpt_max_chars(),
			candidate_multiplier: default_candidate_multiplier(),
			rrf_k: default_rrf_k(),
			max_filter_values: default_max_filter_values(),
		}
	}
}

#[derive(Debug, Deserialize, Clone)]
pub struct Cache {
	#[serde(default = "default_embedding_cache")]
	pub embedding: CacheStore,
	#[serde(default = "default_search_cache")]
	pub search: CacheStore,
}
impl Default for Cache {
	fn default() -> Self {
		Self { embedding: default_embedding_cache(), search: default_search_cache() }
	}
}

#[derive(Debug, Deserialize, Clone)]
pub struct CacheStore {
	pub capacity: usize,
	pub ttl_secs: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct Collection {
	/// Identifier exposed to tool callers, e.g. "kommunalwiki".
	pub id: String,
	/// Backend collection name.
	pub name: String,
	pub display_name: String,
	pub description: String,
	#[serde(default)]
	pub filters: BTreeMap<String, FilterField>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct FilterField {
	pub label: String,
	/// Backend payload key. Defaults to the field name.
	pub key: Option<String>,
	#[serde(rename = "type", default)]
	pub kind: FilterFieldKind,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterFieldKind {
	#[default]
	Keyword,
	Integer,
	Boolean,
}
impl FilterFieldKind {
	pub fn as_str(self) -> &'static str {
		match self {
			Self::Keyword => "keyword",
			Self::Integer => "integer",
			Self::Boolean => "boolean",
		}
	}
}

fn default_log_level() -> String {
	"info".to_string()
}

fn default_timeout_ms() -> u64 {
	30_000
}

fn default_text_field() -> String {
	"chunk_text".to_string()
}

fn default_title_field() -> String {
	"title".to_string()
}

fn default_limit() -> u32 {
	5
}

fn default_max_limit() -> u32 {
	20
}

fn default_excerpt_max_chars() -> usize {
	800
}

fn default_candidate_multiplier() -> u32 {
	2
}

fn default_rrf_k() -> u32 {
	60
}

fn default_max_filter_values() -> u32 {
	200
}

fn default_embedding_cache() -> CacheStore {
	CacheStore { capacity: 1_000, ttl_secs: 3_600 }
}

fn default_search_cache() -> CacheStore {
	CacheStore { capacity: 500, ttl_secs: 900 }
}
