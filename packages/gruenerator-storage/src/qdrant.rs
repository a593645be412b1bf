use std::time::Duration;

use qdrant_client::{
	Qdrant,
	qdrant::{
		Condition, FacetCountsBuilder, Filter, MinShould, Query, QueryPointsBuilder,
		ScrollPoints, ScrollPointsBuilder, facet_value::Variant,
	},
};

use crate::{
	Error, Result,
	fusion::rrf_fuse,
	lexical::best_lexical_score,
	models::{HitMethod, HybridHits, LexicalQuery, SearchHit},
	payload::{PayloadFields, hit_from_payload},
};

pub struct QdrantStore {
	pub client: Qdrant,
	pub fields: PayloadFields,
	pub dense_vector_name: Option<String>,
	pub candidate_multiplier: u32,
	pub rrf_k: u32,
}
impl QdrantStore {
	pub fn new(cfg: &gruenerator_config::Qdrant, search: &gruenerator_config::Search) -> Result<Self> {
		let mut builder =
			Qdrant::from_url(&cfg.url).timeout(Duration::from_millis(cfg.timeout_ms));

		if let Some(key) = cfg.api_key.as_ref() {
			builder = builder.api_key(key.clone());
		}

		let client = builder.build()?;

		Ok(Self {
			client,
			fields: PayloadFields { text: cfg.text_field.clone(), title: cfg.title_field.clone() },
			dense_vector_name: cfg.dense_vector_name.clone(),
			candidate_multiplier: search.candidate_multiplier.max(1),
			rrf_k: search.rrf_k,
		})
	}

	pub async fn vector_search(
		&self,
		collection: &str,
		vector: Vec<f32>,
		limit: u64,
		filter: Option<Filter>,
	) -> Result<Vec<SearchHit>> {
		if vector.is_empty() {
			return Err(Error::InvalidArgument("Query vector must be non-empty.".to_string()));
		}

		let mut search = QueryPointsBuilder::new(collection.to_string())
			.query(Query::new_nearest(vector))
			.limit(limit)
			.with_payload(true);

		if let Some(name) = self.dense_vector_name.as_deref() {
			search = search.using(name);
		}
		if let Some(filter) = filter {
			search = search.filter(filter);
		}

		let response = self.client.query(search).await?;

		Ok(response
			.result
			.iter()
			.map(|point| {
				hit_from_payload(
					point.id.as_ref(),
					&point.payload,
					&self.fields,
					point.score,
					HitMethod::Vector,
				)
			})
			.collect())
	}

	/// Full-text candidates for any variant, re-scored in process against the best-matching
	/// variant.
	pub async fn text_search(
		&self,
		collection: &str,
		query: &LexicalQuery,
		limit: u64,
		filter: Option<Filter>,
	) -> Result<Vec<SearchHit>> {
		let candidates = self.candidate_count(limit);
		let mut hits = self.scored_text_candidates(collection, query, candidates, filter).await?;

		hits.truncate(usize::try_from(limit).unwrap_or(usize::MAX));

		Ok(hits)
	}

	pub async fn hybrid_search(
		&self,
		collection: &str,
		vector: Vec<f32>,
		query: &LexicalQuery,
		limit: u64,
		filter: Option<Filter>,
	) -> Result<HybridHits> {
		let candidates = self.candidate_count(limit);
		let (vector_hits, text_hits) = tokio::try_join!(
			self.vector_search(collection, vector, candidates, filter.clone()),
			self.scored_text_candidates(collection, query, candidates, filter),
		)?;

		tracing::debug!(
			collection,
			vector_candidates = vector_hits.len(),
			text_candidates = text_hits.len(),
			"Fusing hybrid search legs."
		);

		Ok(rrf_fuse(
			vector_hits,
			text_hits,
			self.rrf_k,
			usize::try_from(limit).unwrap_or(usize::MAX),
		))
	}

	// Qdrant full-text matching does not rank, so up to `candidates` points are scored here.
	async fn scored_text_candidates(
		&self,
		collection: &str,
		query: &LexicalQuery,
		candidates: u64,
		filter: Option<Filter>,
	) -> Result<Vec<SearchHit>> {
		let scroll = self.text_scroll(collection, query, candidates, filter);
		let response = self.client.scroll(scroll).await?;
		let mut hits: Vec<SearchHit> = response
			.result
			.iter()
			.map(|point| {
				let mut hit = hit_from_payload(
					point.id.as_ref(),
					&point.payload,
					&self.fields,
					0.0,
					HitMethod::Text,
				);

				hit.score = best_lexical_score(query, &hit.text);

				hit
			})
			.collect();

		// Stable sort keeps backend order among equal scores.
		hits.sort_by(|a, b| b.score.total_cmp(&a.score));

		Ok(hits)
	}

	fn candidate_count(&self, limit: u64) -> u64 {
		limit.saturating_mul(u64::from(self.candidate_multiplier))
	}

	fn text_scroll(
		&self,
		collection: &str,
		query: &LexicalQuery,
		candidates: u64,
		filter: Option<Filter>,
	) -> ScrollPoints {
		let mut variants = query.variants.clone();

		if variants.is_empty() {
			variants.push(query.text.trim().to_string());
		}

		let conditions = variants
			.into_iter()
			.map(|variant| Condition::matches_text(self.fields.text.clone(), variant))
			.collect();
		let text_filter = Filter {
			must: filter.map(|filter| filter.must).unwrap_or_default(),
			min_should: Some(MinShould { min_count: 1, conditions }),
			..Default::default()
		};

		ScrollPointsBuilder::new(collection.to_string())
			.filter(text_filter)
			.limit(u32::try_from(candidates).unwrap_or(u32::MAX))
			.with_payload(true)
			.build()
	}

	/// Distinct payload values of `key`, sorted.
	pub async fn distinct_field_values(
		&self,
		collection: &str,
		key: &str,
		limit: u64,
	) -> Result<Vec<String>> {
		let request = FacetCountsBuilder::new(collection.to_string(), key.to_string()).limit(limit);
		let response = self.client.facet(request).await?;
		let mut values: Vec<String> = response
			.hits
			.into_iter()
			.filter_map(|hit| hit.value.and_then(|value| value.variant))
			.map(|variant| match variant {
				Variant::StringValue(value) => value,
				Variant::IntegerValue(value) => value.to_string(),
				Variant::BoolValue(value) => value.to_string(),
			})
			.collect();

		values.sort();
		values.dedup();

		Ok(values)
	}
}
