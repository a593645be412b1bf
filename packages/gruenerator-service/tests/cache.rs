use std::{collections::BTreeMap, num::NonZeroUsize, time::Duration};

use serde_json::Value;

use gruenerator_service::{
	CacheStore, Caches, EmbeddingCache, FilterSpec, SearchCache, SearchMetadata, SearchMode,
	SearchResponse, cache::search_cache_key,
};

fn response(query: &str) -> SearchResponse {
	SearchResponse {
		collection: "KommunalWiki".to_string(),
		description: "Fachwissen".to_string(),
		query: query.to_string(),
		search_mode: SearchMode::Hybrid,
		results_count: 0,
		results: Vec::new(),
		metadata: SearchMetadata {
			strategy: SearchMode::Hybrid,
			embedding_cached: None,
			text_variants: None,
			fusion: None,
		},
		filters: None,
		cached: false,
	}
}

fn search_cache(capacity: usize, ttl: Duration) -> SearchCache {
	SearchCache::new(CacheStore::new(NonZeroUsize::new(capacity).expect("non-zero"), ttl))
}

fn spec(entries: &[(&str, Value)]) -> FilterSpec {
	entries.iter().map(|(key, value)| (key.to_string(), value.clone())).collect()
}

#[test]
fn stored_search_is_returned_until_a_component_differs() {
	let cache = search_cache(10, Duration::from_secs(60));
	let filters = spec(&[("category", Value::from("verkehr"))]);

	cache.cache_search("kommunalwiki", "AfD", SearchMode::Hybrid, Some(&filters), response("AfD"));

	assert_eq!(
		cache.get_cached_search("kommunalwiki", "AfD", SearchMode::Hybrid, Some(&filters)),
		Some(response("AfD"))
	);
	assert!(cache.get_cached_search("deutschland", "AfD", SearchMode::Hybrid, Some(&filters)).is_none());
	assert!(cache.get_cached_search("kommunalwiki", "afd", SearchMode::Hybrid, Some(&filters)).is_none());
	assert!(cache.get_cached_search("kommunalwiki", "AfD", SearchMode::Text, Some(&filters)).is_none());
	assert!(cache.get_cached_search("kommunalwiki", "AfD", SearchMode::Hybrid, None).is_none());
	assert!(
		cache
			.get_cached_search(
				"kommunalwiki",
				"AfD",
				SearchMode::Hybrid,
				Some(&spec(&[("category", Value::from("energie"))]))
			)
			.is_none()
	);
}

#[test]
fn filter_order_does_not_change_the_key() {
	let mut forward = serde_json::Map::new();

	forward.insert("a".to_string(), Value::from(1));
	forward.insert("b".to_string(), Value::from(2));

	let mut backward = serde_json::Map::new();

	backward.insert("b".to_string(), Value::from(2));
	backward.insert("a".to_string(), Value::from(1));

	let forward: FilterSpec = forward.into_iter().collect();
	let backward: FilterSpec = backward.into_iter().collect();
	let cache = search_cache(10, Duration::from_secs(60));

	cache.cache_search("kommunalwiki", "AfD", SearchMode::Hybrid, Some(&backward), response("AfD"));

	assert!(cache.get_cached_search("kommunalwiki", "AfD", SearchMode::Hybrid, Some(&forward)).is_some());
}

#[test]
fn empty_and_null_filters_key_like_no_filters() {
	let none = search_cache_key("kommunalwiki", "AfD", SearchMode::Hybrid, None);
	let empty = search_cache_key("kommunalwiki", "AfD", SearchMode::Hybrid, Some(&BTreeMap::new()));
	let nulls = search_cache_key(
		"kommunalwiki",
		"AfD",
		SearchMode::Hybrid,
		Some(&spec(&[("category", Value::Null)])),
	);

	assert_eq!(none, empty);
	assert_eq!(none, nulls);
}

#[test]
fn capacity_is_never_exceeded_and_lru_goes_first() {
	let store: CacheStore<String, u32> =
		CacheStore::new(NonZeroUsize::new(3).expect("non-zero"), Duration::from_secs(60));

	for (idx, key) in ["a", "b", "c"].into_iter().enumerate() {
		store.set(key.to_string(), idx as u32);
	}

	// Touch "a" so "b" becomes least recently used.
	assert_eq!(store.get(&"a".to_string()), Some(0));

	store.set("d".to_string(), 3);
	store.set("e".to_string(), 4);

	let stats = store.stats();

	assert_eq!(stats.size, 3);
	assert_eq!(stats.capacity, 3);
	assert_eq!(stats.evictions, 2);
	assert!(store.get(&"b".to_string()).is_none());
	assert!(store.get(&"c".to_string()).is_none());
	assert_eq!(store.get(&"a".to_string()), Some(0));
	assert_eq!(store.get(&"e".to_string()), Some(4));
}

#[test]
fn expired_searches_are_misses() {
	let cache = search_cache(10, Duration::ZERO);

	cache.cache_search("kommunalwiki", "AfD", SearchMode::Hybrid, None, response("AfD"));

	assert!(cache.get_cached_search("kommunalwiki", "AfD", SearchMode::Hybrid, None).is_none());

	let stats = cache.stats();

	assert_eq!(stats.misses, 1);
	assert_eq!(stats.evictions, 0);
	assert_eq!(stats.size, 0);
}

#[test]
fn embeddings_are_keyed_by_raw_query() {
	let cache = EmbeddingCache::new(CacheStore::new(
		NonZeroUsize::new(10).expect("non-zero"),
		Duration::from_secs(60),
	));

	cache.cache_embedding("Klima-Schutz", vec![0.1, 0.2]);

	assert_eq!(cache.get("Klima-Schutz"), Some(vec![0.1, 0.2]));
	assert!(cache.get("klimaschutz").is_none());
}

#[test]
fn combined_stats_sum_both_stores() {
	let caches = Caches::from_config(&gruenerator_config::Cache::default())
		.expect("Failed to build caches.");

	caches.embedding.cache_embedding("AfD", vec![1.0]);
	caches.search.cache_search("kommunalwiki", "AfD", SearchMode::Text, None, response("AfD"));
	caches.embedding.get("AfD");
	caches.search.get_cached_search("kommunalwiki", "Grüne", SearchMode::Text, None);

	let report = caches.stats();

	assert_eq!(report.total_entries, 2);
	assert_eq!(report.hit_rate, 0.5);
	assert_eq!(report.embedding.capacity, 1_000);
	assert_eq!(report.search.capacity, 500);

	let json = serde_json::to_value(&report).expect("Failed to encode stats.");

	assert_eq!(json["totalEntries"], 2);
	assert_eq!(json["search"]["hitRate"], 0.0);

	caches.clear();

	assert_eq!(caches.stats().total_entries, 0);
}
