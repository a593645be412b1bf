use std::collections::HashMap;

use crate::models::{FusionMetadata, HitMethod, HybridHits, SearchHit};

pub const FUSION_METHOD: &str = "rrf";

struct Fused {
	hit: SearchHit,
	rrf: f32,
	first_seen: usize,
	vector_score: Option<f32>,
	in_text: bool,
}

/// Merges both legs with reciprocal rank fusion, `1 / (k + rank + 1)` per leg with a 0-based rank.
///
/// Hits are identified by point id. A hit found by both legs is tagged [`HitMethod::Hybrid`] and
/// keeps its vector similarity as display score.
pub fn rrf_fuse(vector: Vec<SearchHit>, text: Vec<SearchHit>, k: u32, limit: usize) -> HybridHits {
	let vector_candidates = vector.len();
	let text_candidates = text.len();
	let mut fused: HashMap<String, Fused> = HashMap::new();
	let mut order = 0_usize;

	for (rank, hit) in vector.into_iter().enumerate() {
		let contribution = rrf_contribution(k, rank);
		let entry = fused.entry(fusion_key(&hit)).or_insert_with(|| {
			order += 1;

			Fused {
				hit: hit.clone(),
				rrf: 0.0,
				first_seen: order,
				vector_score: None,
				in_text: false,
			}
		});

		entry.rrf += contribution;
		entry.vector_score.get_or_insert(hit.score);
	}

	let mut overlap = 0_usize;

	for (rank, hit) in text.into_iter().enumerate() {
		let contribution = rrf_contribution(k, rank);
		let entry = fused.entry(fusion_key(&hit)).or_insert_with(|| {
			order += 1;

			Fused { hit: hit.clone(), rrf: 0.0, first_seen: order, vector_score: None, in_text: false }
		});

		if !entry.in_text && entry.vector_score.is_some() {
			overlap += 1;
		}

		entry.rrf += contribution;
		entry.in_text = true;
	}

	let mut merged: Vec<Fused> = fused.into_values().collect();

	merged.sort_by(|a, b| b.rrf.total_cmp(&a.rrf).then_with(|| a.first_seen.cmp(&b.first_seen)));

	let hits = merged
		.into_iter()
		.take(limit)
		.map(|entry| {
			let mut hit = entry.hit;

			hit.method = match (entry.vector_score, entry.in_text) {
				(Some(_), true) => HitMethod::Hybrid,
				(Some(_), false) => HitMethod::Vector,
				(None, _) => HitMethod::Text,
			};

			if let Some(score) = entry.vector_score {
				hit.score = score;
			}

			hit
		})
		.collect();

	HybridHits {
		hits,
		metadata: FusionMetadata {
			method: FUSION_METHOD.to_string(),
			k,
			vector_candidates,
			text_candidates,
			overlap,
		},
	}
}

fn rrf_contribution(k: u32, rank: usize) -> f32 {
	1.0 / (k as f32 + rank as f32 + 1.0)
}

fn fusion_key(hit: &SearchHit) -> String {
	if hit.point_id.is_empty() {
		format!("{}\u{0}{}", hit.title, hit.text)
	} else {
		hit.point_id.clone()
	}
}
