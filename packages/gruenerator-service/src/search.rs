use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{Error, GrueneratorService, Result, filter::{FilterSpec, applied_filters, build_filter}};
use gruenerator_config::Collection;
use gruenerator_storage::models::{FusionMetadata, HitMethod, LexicalQuery, SearchHit};
use gruenerator_text::query_variants;

pub const EMPTY_QUERY_MESSAGE: &str = "Suchbegriff darf nicht leer sein";
pub const NO_RESULTS_MESSAGE: &str = "Keine Ergebnisse gefunden";

const ELLIPSIS: &str = "...";

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchMode {
	#[default]
	Hybrid,
	Vector,
	Text,
}
impl SearchMode {
	pub fn as_str(self) -> &'static str {
		match self {
			Self::Hybrid => "hybrid",
			Self::Vector => "vector",
			Self::Text => "text",
		}
	}
}

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchRequest {
	pub query: String,
	pub collection: String,
	#[serde(default)]
	pub search_mode: SearchMode,
	/// Falls back to `search.default_limit`; clamped into `[1, search.max_limit]`.
	pub limit: Option<i64>,
	#[serde(default)]
	pub filters: Option<FilterSpec>,
	#[serde(default = "default_use_cache")]
	pub use_cache: bool,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResult {
	pub rank: usize,
	pub relevance: String,
	pub source: String,
	pub excerpt: String,
	pub search_method: HitMethod,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchMetadata {
	pub strategy: SearchMode,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub embedding_cached: Option<bool>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub text_variants: Option<Vec<String>>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub fusion: Option<FusionMetadata>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResponse {
	pub collection: String,
	pub description: String,
	pub query: String,
	pub search_mode: SearchMode,
	pub results_count: usize,
	pub results: Vec<SearchResult>,
	pub metadata: SearchMetadata,
	pub filters: Option<BTreeMap<String, String>>,
	pub cached: bool,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NoResultsResponse {
	pub collection: String,
	pub query: String,
	pub search_mode: SearchMode,
	pub message: String,
	pub results: Vec<SearchResult>,
	pub cached: bool,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResponse {
	pub error: bool,
	pub message: String,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub collection: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub collection_id: Option<String>,
}
impl ErrorResponse {
	pub fn new(message: impl Into<String>) -> Self {
		Self { error: true, message: message.into(), collection: None, collection_id: None }
	}
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum SearchOutcome {
	Found(SearchResponse),
	Empty(NoResultsResponse),
	Error(ErrorResponse),
}
impl SearchOutcome {
	pub fn is_error(&self) -> bool {
		matches!(self, Self::Error(_))
	}
}

impl GrueneratorService {
	/// Runs one search call. Every failure is reported as [`SearchOutcome::Error`].
	pub async fn search(&self, req: SearchRequest) -> SearchOutcome {
		let Some(collection) = self.cfg.collection(&req.collection) else {
			return SearchOutcome::Error(ErrorResponse::new(crate::unknown_collection_message(
				&self.cfg,
				&req.collection,
			)));
		};
		let query = req.query.trim();

		if query.is_empty() {
			return SearchOutcome::Error(ErrorResponse::new(EMPTY_QUERY_MESSAGE));
		}

		let mode = req.search_mode;
		let filters = req.filters.as_ref();
		let limit = clamp_limit(req.limit, &self.cfg.search);

		if req.use_cache
			&& let Some(mut cached) =
				self.caches.search.get_cached_search(&collection.id, query, mode, filters)
		{
			tracing::info!(
				collection = %collection.id,
				mode = mode.as_str(),
				cached = true,
				"Search served from cache."
			);

			cached.cached = true;

			return SearchOutcome::Found(cached);
		}

		match self.run_search(collection, query, mode, limit, filters).await {
			Ok(None) => {
				tracing::info!(
					collection = %collection.id,
					mode = mode.as_str(),
					"Search returned no results."
				);

				SearchOutcome::Empty(NoResultsResponse {
					collection: collection.display_name.clone(),
					query: query.to_string(),
					search_mode: mode,
					message: NO_RESULTS_MESSAGE.to_string(),
					results: Vec::new(),
					cached: false,
				})
			},
			Ok(Some(response)) => {
				tracing::info!(
					collection = %collection.id,
					mode = mode.as_str(),
					results = response.results_count,
					cached = false,
					"Search completed."
				);

				if req.use_cache {
					self.caches.search.cache_search(
						&collection.id,
						query,
						mode,
						filters,
						response.clone(),
					);
				}

				SearchOutcome::Found(response)
			},
			Err(err) => {
				tracing::error!(
					collection = %collection.id,
					mode = mode.as_str(),
					error = %err,
					"Search failed."
				);

				SearchOutcome::Error(ErrorResponse::new(format!("Suchfehler: {err}")))
			},
		}
	}

	async fn run_search(
		&self,
		collection: &Collection,
		query: &str,
		mode: SearchMode,
		limit: u32,
		filters: Option<&FilterSpec>,
	) -> Result<Option<SearchResponse>> {
		let filter = build_filter(&collection.filters, filters);
		let backend_limit = u64::from(limit);
		let (hits, metadata) = match mode {
			SearchMode::Text => {
				let lexical = lexical_query(query);
				let hits =
					self.backend.text_search(&collection.name, &lexical, backend_limit, filter).await?;

				(hits, SearchMetadata {
					strategy: mode,
					embedding_cached: None,
					text_variants: Some(lexical.variants),
					fusion: None,
				})
			},
			SearchMode::Vector => {
				let (vector, embedding_cached) = self.resolve_embedding(query).await?;
				let hits =
					self.backend.vector_search(&collection.name, vector, backend_limit, filter).await?;

				(hits, SearchMetadata {
					strategy: mode,
					embedding_cached: Some(embedding_cached),
					text_variants: None,
					fusion: None,
				})
			},
			SearchMode::Hybrid => {
				let (vector, embedding_cached) = self.resolve_embedding(query).await?;
				let lexical = lexical_query(query);
				let fused = self
					.backend
					.hybrid_search(&collection.name, vector, &lexical, backend_limit, filter)
					.await?;

				(fused.hits, SearchMetadata {
					strategy: mode,
					embedding_cached: Some(embedding_cached),
					text_variants: Some(lexical.variants),
					fusion: Some(fused.metadata),
				})
			},
		};

		if hits.is_empty() {
			return Ok(None);
		}

		let results: Vec<SearchResult> = hits
			.iter()
			.take(limit as usize)
			.enumerate()
			.map(|(idx, hit)| shape_hit(idx, hit, self.cfg.search.excerpt_max_chars))
			.collect();

		Ok(Some(SearchResponse {
			collection: collection.display_name.clone(),
			description: collection.description.clone(),
			query: query.to_string(),
			search_mode: mode,
			results_count: results.len(),
			results,
			metadata,
			filters: applied_filters(&collection.filters, filters),
			cached: false,
		}))
	}

	/// Returns the query embedding and whether it came from the cache.
	async fn resolve_embedding(&self, query: &str) -> Result<(Vec<f32>, bool)> {
		if let Some(vector) = self.caches.embedding.get(query) {
			return Ok((vector, true));
		}

		let cfg = &self.cfg.providers.embedding;
		let texts = vec![query.to_string()];
		let vectors = self.providers.embedding.embed(cfg, &texts).await?;
		let Some(vector) = vectors.into_iter().next() else {
			return Err(Error::Provider {
				message: "Embedding provider returned no vectors.".to_string(),
			});
		};

		if vector.is_empty() {
			return Err(Error::Provider {
				message: "Embedding provider returned an empty vector.".to_string(),
			});
		}
		if let Some(dimensions) = cfg.dimensions
			&& vector.len() != dimensions as usize
		{
			return Err(Error::Provider {
				message: format!(
					"Embedding dimension mismatch: expected {dimensions}, got {}.",
					vector.len()
				),
			});
		}

		self.caches.embedding.cache_embedding(query, vector.clone());

		Ok((vector, false))
	}
}

pub fn clamp_limit(limit: Option<i64>, cfg: &gruenerator_config::Search) -> u32 {
	let max = i64::from(cfg.max_limit.max(1));
	let requested = limit.unwrap_or(i64::from(cfg.default_limit));

	requested.clamp(1, max) as u32
}

/// Percentage string of a `[0, 1]` score, e.g. `0.83` becomes `"83%"`.
pub fn relevance(score: f32) -> String {
	format!("{}%", (f64::from(score) * 100.0).round() as i64)
}

/// Cuts `text` to `max_chars` characters and marks the cut with an ellipsis.
pub fn excerpt(text: &str, max_chars: usize) -> String {
	match text.char_indices().nth(max_chars) {
		Some((cut, _)) => format!("{}{ELLIPSIS}", &text[..cut]),
		None => text.to_string(),
	}
}

fn shape_hit(idx: usize, hit: &SearchHit, max_chars: usize) -> SearchResult {
	SearchResult {
		rank: idx + 1,
		relevance: relevance(hit.score),
		source: hit.title.clone(),
		excerpt: excerpt(&hit.text, max_chars),
		search_method: hit.method,
	}
}

fn lexical_query(query: &str) -> LexicalQuery {
	LexicalQuery { text: query.to_string(), variants: query_variants(query) }
}

fn default_use_cache() -> bool {
	true
}
