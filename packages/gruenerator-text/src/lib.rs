//! Text handling for German search queries: canonical normalization, lexical variants and a
//! conservative tokenizer.

pub mod normalize;
pub mod tokenize;
pub mod variants;

pub use normalize::{fold_umlauts, normalize_query, normalize_unicode_digits};
pub use tokenize::tokenize_query;
pub use variants::query_variants;
