pub mod cache;
pub mod discovery;
pub mod filter;
pub mod search;

mod error;

pub use cache::{CacheStats, CacheStatsReport, CacheStore, Caches, EmbeddingCache, SearchCache};
pub use discovery::{CollectionFilters, FilterValues, FilterValuesOutcome};
pub use error::{Error, Result};
pub use filter::{FilterSpec, applied_filters, build_filter};
pub use search::{
	ErrorResponse, NoResultsResponse, SearchMetadata, SearchMode, SearchOutcome, SearchRequest,
	SearchResponse, SearchResult,
};

use std::{future::Future, pin::Pin, sync::Arc};

use qdrant_client::qdrant::Filter;

use gruenerator_config::{Config, EmbeddingProviderConfig};
use gruenerator_providers::embedding;
use gruenerator_storage::{
	models::{HybridHits, LexicalQuery, SearchHit},
	qdrant::QdrantStore,
};

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

pub trait EmbeddingProvider
where
	Self: Send + Sync,
{
	fn embed<'a>(
		&'a self,
		cfg: &'a EmbeddingProviderConfig,
		texts: &'a [String],
	) -> BoxFuture<'a, gruenerator_providers::Result<Vec<Vec<f32>>>>;
}

/// Retrieval operations the orchestrator needs from a document store.
pub trait SearchBackend
where
	Self: Send + Sync,
{
	fn vector_search<'a>(
		&'a self,
		collection: &'a str,
		vector: Vec<f32>,
		limit: u64,
		filter: Option<Filter>,
	) -> BoxFuture<'a, gruenerator_storage::Result<Vec<SearchHit>>>;

	fn text_search<'a>(
		&'a self,
		collection: &'a str,
		query: &'a LexicalQuery,
		limit: u64,
		filter: Option<Filter>,
	) -> BoxFuture<'a, gruenerator_storage::Result<Vec<SearchHit>>>;

	fn hybrid_search<'a>(
		&'a self,
		collection: &'a str,
		vector: Vec<f32>,
		query: &'a LexicalQuery,
		limit: u64,
		filter: Option<Filter>,
	) -> BoxFuture<'a, gruenerator_storage::Result<HybridHits>>;

	fn distinct_field_values<'a>(
		&'a self,
		collection: &'a str,
		key: &'a str,
		limit: u64,
	) -> BoxFuture<'a, gruenerator_storage::Result<Vec<String>>>;
}

#[derive(Clone)]
pub struct Providers {
	pub embedding: Arc<dyn EmbeddingProvider>,
}

pub struct GrueneratorService {
	pub cfg: Config,
	pub backend: Arc<dyn SearchBackend>,
	pub providers: Providers,
	pub caches: Arc<Caches>,
}

struct DefaultProviders;

impl EmbeddingProvider for DefaultProviders {
	fn embed<'a>(
		&'a self,
		cfg: &'a EmbeddingProviderConfig,
		texts: &'a [String],
	) -> BoxFuture<'a, gruenerator_providers::Result<Vec<Vec<f32>>>> {
		Box::pin(embedding::embed(cfg, texts))
	}
}

impl SearchBackend for QdrantStore {
	fn vector_search<'a>(
		&'a self,
		collection: &'a str,
		vector: Vec<f32>,
		limit: u64,
		filter: Option<Filter>,
	) -> BoxFuture<'a, gruenerator_storage::Result<Vec<SearchHit>>> {
		Box::pin(QdrantStore::vector_search(self, collection, vector, limit, filter))
	}

	fn text_search<'a>(
		&'a self,
		collection: &'a str,
		query: &'a LexicalQuery,
		limit: u64,
		filter: Option<Filter>,
	) -> BoxFuture<'a, gruenerator_storage::Result<Vec<SearchHit>>> {
		Box::pin(QdrantStore::text_search(self, collection, query, limit, filter))
	}

	fn hybrid_search<'a>(
		&'a self,
		collection: &'a str,
		vector: Vec<f32>,
		query: &'a LexicalQuery,
		limit: u64,
		filter: Option<Filter>,
	) -> BoxFuture<'a, gruenerator_storage::Result<HybridHits>> {
		Box::pin(QdrantStore::hybrid_search(self, collection, vector, query, limit, filter))
	}

	fn distinct_field_values<'a>(
		&'a self,
		collection: &'a str,
		key: &'a str,
		limit: u64,
	) -> BoxFuture<'a, gruenerator_storage::Result<Vec<String>>> {
		Box::pin(QdrantStore::distinct_field_values(self, collection, key, limit))
	}
}

impl Providers {
	pub fn new(embedding: Arc<dyn EmbeddingProvider>) -> Self {
		Self { embedding }
	}
}

impl Default for Providers {
	fn default() -> Self {
		Self { embedding: Arc::new(DefaultProviders) }
	}
}

impl GrueneratorService {
	pub fn new(cfg: Config, backend: Arc<dyn SearchBackend>, caches: Arc<Caches>) -> Self {
		Self { cfg, backend, providers: Providers::default(), caches }
	}

	pub fn with_providers(
		cfg: Config,
		backend: Arc<dyn SearchBackend>,
		caches: Arc<Caches>,
		providers: Providers,
	) -> Self {
		Self { cfg, backend, providers, caches }
	}

	pub fn cache_stats(&self) -> CacheStatsReport {
		self.caches.stats()
	}
}

pub(crate) fn unknown_collection_message(cfg: &Config, collection: &str) -> String {
	format!("Unbekannte Sammlung: {collection}. Verfügbar: {}", cfg.collection_ids().join(", "))
}
