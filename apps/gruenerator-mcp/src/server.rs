use std::{net::SocketAddr, sync::Arc};

use axum::{Json, Router, extract::State, routing::get};
use color_eyre::Result;
use rmcp::{
	ErrorData, ServerHandler,
	handler::server::router::tool::ToolRouter,
	model::{CallToolResult, JsonObject, ServerCapabilities, ServerInfo},
	transport::streamable_http_server::{
		StreamableHttpServerConfig, StreamableHttpService, session::local::LocalSessionManager,
	},
};
use serde::Serialize;
use serde_json::Value;
use tokio::net::TcpListener;

use gruenerator_config::Config;
use gruenerator_service::{GrueneratorService, SearchRequest};

pub const SERVICE_NAME: &str = "gruenerator-mcp";
pub const TOOL_SEARCH: &str = "gruenerator_search";
pub const TOOL_GET_FILTERS: &str = "gruenerator_get_filters";
pub const TOOL_CACHE_STATS: &str = "gruenerator_cache_stats";

#[derive(Clone)]
pub struct GrueneratorMcp {
	service: Arc<GrueneratorService>,
	instructions: String,
	tool_router: ToolRouter<Self>,
}
impl GrueneratorMcp {
	pub fn new(service: Arc<GrueneratorService>) -> Self {
		let instructions = build_instructions(&service.cfg);

		Self { service, instructions, tool_router: Self::tool_router() }
	}

	pub fn tool_names(&self) -> Vec<String> {
		self.tool_router.list_all().into_iter().map(|tool| tool.name.to_string()).collect()
	}
}

#[rmcp::tool_router]
impl GrueneratorMcp {
	#[rmcp::tool(
		name = "gruenerator_search",
		description = "Durchsucht Grüne Parteiprogramme und Inhalte nach relevanten Textpassagen. Unterstützt hybride Suche (Vektor + Text), Filter und Caching.",
		input_schema = search_schema()
	)]
	pub async fn gruenerator_search(
		&self,
		params: JsonObject,
	) -> Result<CallToolResult, ErrorData> {
		let req: SearchRequest = serde_json::from_value(Value::Object(params)).map_err(|err| {
			ErrorData::invalid_params(format!("Invalid search arguments: {err}"), None)
		})?;
		let outcome = self.service.search(req).await;

		tool_result(&outcome, outcome.is_error())
	}

	#[rmcp::tool(
		name = "gruenerator_get_filters",
		description = "Gibt verfügbare Filterwerte für eine Sammlung zurück. Vor der Verwendung von Filtern in gruenerator_search aufrufen.",
		input_schema = get_filters_schema()
	)]
	pub async fn gruenerator_get_filters(
		&self,
		mut params: JsonObject,
	) -> Result<CallToolResult, ErrorData> {
		let collection = take_string(&mut params, "collection")?;
		let outcome = self.service.filter_values(&collection).await;
		let is_error = matches!(outcome, gruenerator_service::FilterValuesOutcome::Error(_));

		tool_result(&outcome, is_error)
	}

	#[rmcp::tool(
		name = "gruenerator_cache_stats",
		description = "Zeigt Statistiken des Embedding- und Such-Caches.",
		input_schema = empty_schema()
	)]
	pub async fn gruenerator_cache_stats(&self) -> Result<CallToolResult, ErrorData> {
		tool_result(&self.service.cache_stats(), false)
	}
}

#[rmcp::tool_handler]
impl ServerHandler for GrueneratorMcp {
	fn get_info(&self) -> ServerInfo {
		ServerInfo {
			instructions: Some(self.instructions.clone()),
			capabilities: ServerCapabilities::builder().enable_tools().build(),
			..Default::default()
		}
	}
}

#[derive(Debug, Serialize)]
struct Health {
	status: &'static str,
	service: &'static str,
	version: &'static str,
	collections: Vec<String>,
}

/// `/health` plus the streamable HTTP MCP endpoint at `/mcp`.
pub fn router(service: Arc<GrueneratorService>) -> Router {
	let session_manager: Arc<LocalSessionManager> = Default::default();
	let mcp_service = {
		let service = service.clone();

		StreamableHttpService::new(
			move || Ok(GrueneratorMcp::new(service.clone())),
			session_manager,
			StreamableHttpServerConfig::default(),
		)
	};

	Router::new()
		.route("/health", get(health))
		.with_state(service)
		.nest_service("/mcp", mcp_service)
}

pub async fn serve_mcp(service: Arc<GrueneratorService>) -> Result<()> {
	let bind_addr: SocketAddr = service.cfg.service.mcp_bind.parse()?;
	let listener = TcpListener::bind(bind_addr).await?;

	tracing::info!(%bind_addr, "MCP server listening.");

	axum::serve(listener, router(service)).await?;

	Ok(())
}

async fn health(State(service): State<Arc<GrueneratorService>>) -> Json<Health> {
	Json(Health {
		status: "ok",
		service: SERVICE_NAME,
		version: gruenerator_cli::VERSION,
		collections: service.cfg.collection_ids().into_iter().map(str::to_string).collect(),
	})
}

fn tool_result<T>(value: &T, is_error: bool) -> Result<CallToolResult, ErrorData>
where
	T: Serialize,
{
	let json = serde_json::to_value(value).map_err(|err| {
		ErrorData::internal_error(format!("Failed to encode tool result: {err}"), None)
	})?;

	if is_error {
		Ok(CallToolResult::structured_error(json))
	} else {
		Ok(CallToolResult::structured(json))
	}
}

fn take_string(params: &mut JsonObject, key: &str) -> Result<String, ErrorData> {
	let value = params
		.remove(key)
		.ok_or_else(|| ErrorData::invalid_params(format!("{key} is required."), None))?;

	match value {
		Value::String(text) => Ok(text),
		_ => Err(ErrorData::invalid_params(format!("{key} must be a string."), None)),
	}
}

fn build_instructions(cfg: &Config) -> String {
	let collections: Vec<String> = cfg
		.collections
		.iter()
		.map(|collection| {
			let filters = if collection.filters.is_empty() {
				"keine".to_string()
			} else {
				collection
					.filters
					.iter()
					.map(|(field, spec)| format!("{field} ({})", spec.label))
					.collect::<Vec<_>>()
					.join(", ")
			};

			format!(
				"- {}: {} - {}\n  Filter: {filters}",
				collection.id, collection.display_name, collection.description
			)
		})
		.collect();

	format!(
		"Semantische Suche in Grünen Parteiprogrammen und Inhalten.\n\n\
		Regeln:\n\
		1. Nennt der Nutzer eine Sammlung, verwende genau diese als collection.\n\
		2. Für mehrere Sammlungen {TOOL_SEARCH} mehrfach aufrufen.\n\
		3. Vor dem Filtern zuerst {TOOL_GET_FILTERS} aufrufen, dann {TOOL_SEARCH} mit filters.\n\n\
		Sammlungen:\n{}\n\n\
		searchMode: \"hybrid\" (Standard), \"vector\" oder \"text\". limit: 1-{} (Standard {}).\n\
		{TOOL_CACHE_STATS} zeigt Cache-Statistiken.",
		collections.join("\n"),
		cfg.search.max_limit,
		cfg.search.default_limit,
	)
}

fn search_schema() -> Arc<JsonObject> {
	Arc::new(rmcp::object!({
		"type": "object",
		"additionalProperties": false,
		"required": ["query", "collection"],
		"properties": {
			"query": { "type": "string", "description": "Suchbegriff oder Frage" },
			"collection": { "type": "string", "description": "Kennung der Dokumentensammlung" },
			"searchMode": {
				"type": "string",
				"enum": ["hybrid", "vector", "text"],
				"default": "hybrid"
			},
			"limit": {
				"type": "integer",
				"minimum": 1,
				"maximum": gruenerator_config::MAX_SEARCH_LIMIT,
				"default": 5
			},
			"filters": {
				"type": ["object", "null"],
				"additionalProperties": { "type": ["string", "integer", "boolean", "null"] }
			},
			"useCache": { "type": "boolean", "default": true }
		}
	}))
}

fn get_filters_schema() -> Arc<JsonObject> {
	Arc::new(rmcp::object!({
		"type": "object",
		"additionalProperties": false,
		"required": ["collection"],
		"properties": {
			"collection": { "type": "string", "description": "Kennung der Dokumentensammlung" }
		}
	}))
}

fn empty_schema() -> Arc<JsonObject> {
	Arc::new(rmcp::object!({
		"type": "object",
		"additionalProperties": false,
		"properties": {}
	}))
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn instructions_describe_every_collection_and_filter() {
		let cfg = gruenerator_testkit::sample_config();
		let instructions = build_instructions(&cfg);

		assert!(instructions.contains("- kommunalwiki: KommunalWiki"));
		assert!(instructions.contains("article_type (Artikeltyp), category (Kategorie)"));
		assert!(instructions.contains("documentType (Dokumenttyp)"));
		assert!(instructions.contains("limit: 1-20 (Standard 5)"));
	}

	#[test]
	fn search_schema_limit_matches_the_config_cap() {
		let schema = search_schema();

		assert_eq!(
			schema["properties"]["limit"]["maximum"],
			Value::from(gruenerator_config::MAX_SEARCH_LIMIT)
		);
	}
}
