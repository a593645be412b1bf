use gruenerator_text::{
	fold_umlauts, normalize_query, normalize_unicode_digits, query_variants, tokenize_query,
};

const SAMPLES: &[&str] = &[
	"",
	"   ",
	"AfD",
	"Klima-Schutz",
	"Klima – Schutz — Gesetz",
	"Über\u{00AD}gangs-Regelung",
	"Straßenbahn  und   ÖPNV",
	"CO₂-Ausstoß 2,5 %",
	"m² Wohnfläche",
	"GRÜNE\tWahl-\nprogramm",
	"a-b-c-d",
	"Mu\u{0308}ll",
	"Mu\u{00AD}\u{0308}ll",
	"STRAẞE",
	"  führende und folgende Leerzeichen  ",
];

#[test]
fn normalizes_german_query() {
	assert_eq!(normalize_query("Klima-Schutz"), "klimaschutz");
	assert_eq!(normalize_query("Straßenbahn  und   ÖPNV"), "strassenbahn und oepnv");
	assert_eq!(normalize_query("Über\u{00AD}gangs-Regelung"), "uebergangsregelung");
	assert_eq!(normalize_query("CO₂ Ausstoß"), "co2 ausstoss");
	assert_eq!(normalize_query("Wahl-\nprogramm"), "wahlprogramm");
}

#[test]
fn empty_input_normalizes_to_empty() {
	assert_eq!(normalize_query(""), "");
	assert_eq!(normalize_query(" \t\n "), "");
}

#[test]
fn decomposed_umlauts_fold_like_precomposed_ones() {
	assert_eq!(normalize_query("Mu\u{0308}ll"), normalize_query("Müll"));
	assert_eq!(normalize_query("Müll"), "muell");
}

#[test]
fn soft_hyphen_before_combining_mark_still_composes() {
	assert_eq!(normalize_query("Mu\u{00AD}\u{0308}ll"), "muell");
}

#[test]
fn normalization_is_idempotent() {
	for sample in SAMPLES {
		let once = normalize_query(sample);
		let twice = normalize_query(&once);

		assert_eq!(once, twice, "Normalization is not idempotent for {sample:?}.");
	}
}

#[test]
fn folds_umlauts_preserving_case() {
	assert_eq!(fold_umlauts("Äpfel Öl Übung"), "Aepfel Oel Uebung");
	assert_eq!(fold_umlauts("Maß"), "Mass");
	assert_eq!(fold_umlauts(""), "");
}

#[test]
fn maps_sub_and_superscript_digits() {
	assert_eq!(normalize_unicode_digits("H₂O m³ x⁰¹²"), "H2O m3 x012");
}

#[test]
fn variants_cover_hyphen_space_and_compound_forms() {
	assert_eq!(query_variants("Klima-Schutz"), vec!["klima-schutz", "klima schutz", "klimaschutz"]);
}

#[test]
fn variants_include_folded_forms_after_originals() {
	assert_eq!(
		query_variants("Müll-Trennung"),
		vec![
			"müll-trennung",
			"müll trennung",
			"mülltrennung",
			"muell-trennung",
			"muell trennung",
			"muelltrennung",
		]
	);
}

#[test]
fn variants_include_digit_and_decimal_forms() {
	assert_eq!(
		query_variants("CO₂ 2,5"),
		vec!["co₂ 2,5", "co₂-2,5", "co₂2,5", "co2 2,5", "co₂ 2.5"]
	);
	assert!(query_variants("1.5 Grad").contains(&"1,5 grad".to_string()));
}

#[test]
fn short_compounds_are_skipped() {
	assert_eq!(query_variants("a b"), vec!["a b", "a-b"]);
	assert_eq!(query_variants("x"), Vec::<String>::new());
}

#[test]
fn blank_input_has_no_variants() {
	assert!(query_variants("").is_empty());
	assert!(query_variants("  \t ").is_empty());
}

#[test]
fn variants_are_deterministic_and_distinct() {
	for sample in SAMPLES {
		let first = query_variants(sample);
		let second = query_variants(sample);

		assert_eq!(first, second, "Variants differ between runs for {sample:?}.");

		let mut deduped = first.clone();

		deduped.sort();
		deduped.dedup();

		assert_eq!(deduped.len(), first.len(), "Duplicate variants for {sample:?}.");
		assert!(first.iter().all(|variant| variant.chars().count() >= 2));
	}
}

#[test]
fn tokenizes_conservatively() {
	assert_eq!(
		tokenize_query("Was sagt die Partei zu \"Klima-Schutz\" & Müll?"),
		vec!["Was", "sagt", "die", "Partei", "zu", "Klima-Schutz", "Müll"]
	);
	assert_eq!(tokenize_query("Über\u{00AD}gang"), vec!["Übergang"]);
	assert!(tokenize_query("?!").is_empty());
}
