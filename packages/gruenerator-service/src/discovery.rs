use std::collections::BTreeMap;

use serde::Serialize;

use crate::{GrueneratorService, Result, search::ErrorResponse};
use gruenerator_config::{Collection, FilterFieldKind};

pub const NO_FILTERS_MESSAGE: &str = "Keine Filter für diese Sammlung verfügbar";

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct FilterValues {
	pub label: String,
	#[serde(rename = "type")]
	pub kind: FilterFieldKind,
	pub values: Vec<String>,
	pub count: usize,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectionFilters {
	pub collection: String,
	pub collection_id: String,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub description: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub message: Option<String>,
	pub filters: BTreeMap<String, FilterValues>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum FilterValuesOutcome {
	Found(CollectionFilters),
	Error(ErrorResponse),
}

impl GrueneratorService {
	/// Lists the distinct stored values of every filter field of a collection.
	pub async fn filter_values(&self, collection_id: &str) -> FilterValuesOutcome {
		let Some(collection) = self.cfg.collection(collection_id) else {
			return FilterValuesOutcome::Error(ErrorResponse::new(
				crate::unknown_collection_message(&self.cfg, collection_id),
			));
		};

		if collection.filters.is_empty() {
			return FilterValuesOutcome::Found(CollectionFilters {
				collection: collection.display_name.clone(),
				collection_id: collection.id.clone(),
				description: None,
				message: Some(NO_FILTERS_MESSAGE.to_string()),
				filters: BTreeMap::new(),
			});
		}

		match self.collect_filter_values(collection).await {
			Ok(filters) => FilterValuesOutcome::Found(CollectionFilters {
				collection: collection.display_name.clone(),
				collection_id: collection.id.clone(),
				description: Some(collection.description.clone()),
				message: None,
				filters,
			}),
			Err(err) => {
				tracing::error!(collection = %collection.id, error = %err, "Filter discovery failed.");

				FilterValuesOutcome::Error(ErrorResponse {
					error: true,
					message: format!("Fehler beim Abrufen der Filter: {err}"),
					collection: Some(collection.display_name.clone()),
					collection_id: Some(collection.id.clone()),
				})
			},
		}
	}

	async fn collect_filter_values(
		&self,
		collection: &Collection,
	) -> Result<BTreeMap<String, FilterValues>> {
		let limit = u64::from(self.cfg.search.max_filter_values);
		let mut out = BTreeMap::new();

		for (field, spec) in &collection.filters {
			let key = spec.key.as_deref().unwrap_or(field.as_str());

			tracing::debug!(
				collection = %collection.id,
				field = %field,
				key,
				"Fetching distinct filter values."
			);

			let values =
				self.backend.distinct_field_values(&collection.name, key, limit).await?;

			out.insert(field.clone(), FilterValues {
				label: spec.label.clone(),
				kind: spec.kind,
				count: values.len(),
				values,
			});
		}

		Ok(out)
	}
}
