use std::{
	hash::Hash,
	num::NonZeroUsize,
	sync::{Mutex, PoisonError},
	time::{Duration, Instant},
};

use lru::LruCache;
use serde::Serialize;

use crate::{Error, Result, filter::FilterSpec, search::{SearchMode, SearchResponse}};

const SEARCH_CACHE_SCHEMA_VERSION: u32 = 1;

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheStats {
	pub hits: u64,
	pub misses: u64,
	pub size: usize,
	pub evictions: u64,
	pub capacity: usize,
	pub hit_rate: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheStatsReport {
	pub embedding: CacheStats,
	pub search: CacheStats,
	pub total_entries: usize,
	pub hit_rate: f64,
}

struct CacheEntry<V> {
	value: V,
	// `None` when the TTL reaches past what `Instant` can represent.
	expires_at: Option<Instant>,
}

struct CacheState<K, V> {
	entries: LruCache<K, CacheEntry<V>>,
	hits: u64,
	misses: u64,
	evictions: u64,
}

/// Bounded key/value store with per-entry expiry and least-recently-used eviction.
///
/// Expiry is checked lazily on read; an expired entry is dropped and counted as a miss.
pub struct CacheStore<K, V> {
	state: Mutex<CacheState<K, V>>,
	capacity: NonZeroUsize,
	ttl: Duration,
}
impl<K, V> CacheStore<K, V>
where
	K: Hash + Eq,
	V: Clone,
{
	pub fn new(capacity: NonZeroUsize, ttl: Duration) -> Self {
		Self {
			state: Mutex::new(CacheState {
				entries: LruCache::new(capacity),
				hits: 0,
				misses: 0,
				evictions: 0,
			}),
			capacity,
			ttl,
		}
	}

	pub fn ttl(&self) -> Duration {
		self.ttl
	}

	pub fn get(&self, key: &K) -> Option<V> {
		let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
		let now = Instant::now();
		let lookup = state.entries.get(key).map(|entry| {
			let live = entry.expires_at.is_none_or(|expires_at| expires_at > now);

			live.then(|| entry.value.clone())
		});

		match lookup {
			Some(Some(value)) => {
				state.hits += 1;

				Some(value)
			},
			Some(None) => {
				state.entries.pop(key);
				state.misses += 1;

				None
			},
			None => {
				state.misses += 1;

				None
			},
		}
	}

	pub fn set(&self, key: K, value: V) {
		self.set_with_ttl(key, value, self.ttl);
	}

	pub fn set_with_ttl(&self, key: K, value: V, ttl: Duration) {
		let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
		let entry = CacheEntry { value, expires_at: Instant::now().checked_add(ttl) };

		if !state.entries.contains(&key)
			&& state.entries.len() >= self.capacity.get()
			&& state.entries.pop_lru().is_some()
		{
			state.evictions += 1;
		}

		state.entries.put(key, entry);
	}

	pub fn stats(&self) -> CacheStats {
		let state = self.state.lock().unwrap_or_else(PoisonError::into_inner);

		CacheStats {
			hits: state.hits,
			misses: state.misses,
			size: state.entries.len(),
			evictions: state.evictions,
			capacity: self.capacity.get(),
			hit_rate: hit_rate(state.hits, state.misses),
		}
	}

	pub fn clear(&self) {
		let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);

		state.entries.clear();
		state.hits = 0;
		state.misses = 0;
		state.evictions = 0;
	}
}

/// Query embeddings keyed by the query text as sent to the provider.
pub struct EmbeddingCache {
	store: CacheStore<String, Vec<f32>>,
}
impl EmbeddingCache {
	pub fn new(store: CacheStore<String, Vec<f32>>) -> Self {
		Self { store }
	}

	pub fn get(&self, query: &str) -> Option<Vec<f32>> {
		self.store.get(&query.to_string())
	}

	pub fn cache_embedding(&self, query: &str, vector: Vec<f32>) {
		self.store.set(query.to_string(), vector);
	}

	pub fn stats(&self) -> CacheStats {
		self.store.stats()
	}

	pub fn clear(&self) {
		self.store.clear();
	}
}

/// Formatted search responses keyed by collection, query, mode and filters.
pub struct SearchCache {
	store: CacheStore<String, SearchResponse>,
}
impl SearchCache {
	pub fn new(store: CacheStore<String, SearchResponse>) -> Self {
		Self { store }
	}

	pub fn get_cached_search(
		&self,
		collection: &str,
		query: &str,
		mode: SearchMode,
		filters: Option<&FilterSpec>,
	) -> Option<SearchResponse> {
		self.store.get(&search_cache_key(collection, query, mode, filters))
	}

	pub fn cache_search(
		&self,
		collection: &str,
		query: &str,
		mode: SearchMode,
		filters: Option<&FilterSpec>,
		response: SearchResponse,
	) {
		self.store.set(search_cache_key(collection, query, mode, filters), response);
	}

	pub fn stats(&self) -> CacheStats {
		self.store.stats()
	}

	pub fn clear(&self) {
		self.store.clear();
	}
}

pub struct Caches {
	pub embedding: EmbeddingCache,
	pub search: SearchCache,
}
impl Caches {
	pub fn new(embedding: EmbeddingCache, search: SearchCache) -> Self {
		Self { embedding, search }
	}

	pub fn from_config(cfg: &gruenerator_config::Cache) -> Result<Self> {
		Ok(Self {
			embedding: EmbeddingCache::new(CacheStore::new(
				non_zero_capacity("cache.embedding", cfg.embedding.capacity)?,
				Duration::from_secs(cfg.embedding.ttl_secs),
			)),
			search: SearchCache::new(CacheStore::new(
				non_zero_capacity("cache.search", cfg.search.capacity)?,
				Duration::from_secs(cfg.search.ttl_secs),
			)),
		})
	}

	pub fn stats(&self) -> CacheStatsReport {
		let embedding = self.embedding.stats();
		let search = self.search.stats();

		CacheStatsReport {
			total_entries: embedding.size + search.size,
			hit_rate: hit_rate(embedding.hits + search.hits, embedding.misses + search.misses),
			embedding,
			search,
		}
	}

	pub fn clear(&self) {
		self.embedding.clear();
		self.search.clear();
	}
}

/// Null filter entries are dropped and an empty filter set keys like no filters at all.
pub fn search_cache_key(
	collection: &str,
	query: &str,
	mode: SearchMode,
	filters: Option<&FilterSpec>,
) -> String {
	let filters: Option<serde_json::Map<String, serde_json::Value>> = filters
		.map(|spec| {
			spec.iter()
				.filter(|(_, value)| !value.is_null())
				.map(|(field, value)| (field.clone(), value.clone()))
				.collect()
		})
		.filter(|entries: &serde_json::Map<String, serde_json::Value>| !entries.is_empty());
	let payload = serde_json::json!({
		"kind": "search",
		"schema_version": SEARCH_CACHE_SCHEMA_VERSION,
		"collection": collection,
		"query": query,
		"mode": mode.as_str(),
		"filters": filters,
	});

	blake3::hash(payload.to_string().as_bytes()).to_hex().to_string()
}

fn non_zero_capacity(label: &str, capacity: usize) -> Result<NonZeroUsize> {
	NonZeroUsize::new(capacity).ok_or_else(|| Error::InvalidRequest {
		message: format!("{label}.capacity must be greater than zero."),
	})
}

fn hit_rate(hits: u64, misses: u64) -> f64 {
	let total = hits + misses;

	if total == 0 { 0.0 } else { hits as f64 / total as f64 }
}

#[cfg(test)]
mod tests {
	use super::*;

	fn store(capacity: usize, ttl: Duration) -> CacheStore<String, u32> {
		CacheStore::new(NonZeroUsize::new(capacity).expect("capacity is non-zero"), ttl)
	}

	#[test]
	fn counts_hits_and_misses() {
		let cache = store(2, Duration::from_secs(60));

		assert_eq!(cache.get(&"a".to_string()), None);

		cache.set("a".to_string(), 1);

		assert_eq!(cache.get(&"a".to_string()), Some(1));

		let stats = cache.stats();

		assert_eq!((stats.hits, stats.misses, stats.size, stats.evictions), (1, 1, 1, 0));
		assert_eq!(stats.hit_rate, 0.5);
	}

	#[test]
	fn expired_entries_are_misses_not_evictions() {
		let cache = store(2, Duration::from_secs(60));

		cache.set_with_ttl("a".to_string(), 1, Duration::ZERO);

		assert_eq!(cache.get(&"a".to_string()), None);

		let stats = cache.stats();

		assert_eq!((stats.misses, stats.evictions, stats.size), (1, 0, 0));
	}

	#[test]
	fn oversized_ttl_never_expires() {
		let cache = store(2, Duration::from_secs(i64::MAX as u64));

		cache.set("a".to_string(), 1);
		cache.set_with_ttl("b".to_string(), 2, Duration::MAX);

		assert_eq!(cache.get(&"a".to_string()), Some(1));
		assert_eq!(cache.get(&"b".to_string()), Some(2));
	}

	#[test]
	fn replacing_a_key_does_not_evict() {
		let cache = store(2, Duration::from_secs(60));

		cache.set("a".to_string(), 1);
		cache.set("b".to_string(), 2);
		cache.set("a".to_string(), 3);

		assert_eq!(cache.stats().evictions, 0);
		assert_eq!(cache.get(&"a".to_string()), Some(3));
		assert_eq!(cache.get(&"b".to_string()), Some(2));
	}

	#[test]
	fn clear_resets_entries_and_counters() {
		let cache = store(2, Duration::from_secs(60));

		cache.set("a".to_string(), 1);
		cache.get(&"a".to_string());
		cache.clear();

		assert_eq!(cache.stats(), CacheStats { capacity: 2, ..Default::default() });
	}
}
