use serde::{Deserialize, Serialize};

/// Which retrieval leg produced a hit.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HitMethod {
	Vector,
	Text,
	Hybrid,
}
impl HitMethod {
	pub fn as_str(self) -> &'static str {
		match self {
			Self::Vector => "vector",
			Self::Text => "text",
			Self::Hybrid => "hybrid",
		}
	}
}

#[derive(Clone, Debug, PartialEq)]
pub struct SearchHit {
	pub point_id: String,
	/// Similarity in `[0, 1]`: cosine score for vector hits, lexical coverage for text hits.
	pub score: f32,
	pub title: String,
	pub text: String,
	pub document_id: Option<String>,
	pub filename: Option<String>,
	pub method: HitMethod,
}

/// A lexical query together with the spellings that should all match.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LexicalQuery {
	pub text: String,
	pub variants: Vec<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FusionMetadata {
	pub method: String,
	pub k: u32,
	pub vector_candidates: usize,
	pub text_candidates: usize,
	pub overlap: usize,
}

#[derive(Clone, Debug, PartialEq)]
pub struct HybridHits {
	pub hits: Vec<SearchHit>,
	pub metadata: FusionMetadata,
}
