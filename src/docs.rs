use std::sync::Arc;

use axum::{routing::get, Json, Router};
use serde_json::{json, Map, Value};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::{authz, catalog, models, routes};

#[derive(OpenApi)]
#[openapi(
	paths(
		routes::health::health,
		routes::authz::catalog,
		routes::authz::resolve,
		routes::authz::check,
		routes::authz::menu
	),
	components(
		schemas(
			routes::health::HealthResponse,
			authz::Actor,
			authz::CustomRole,
			authz::PermissionSource,
			catalog::ModuleDescriptor,
			models::permission::PermissionEntry,
			models::menu::MenuEntry,
			models::menu::ActiveMenu,
			models::authz::CatalogResponse,
			models::authz::ResolveRequest,
			models::authz::ResolveResponse,
			models::authz::CheckRequest,
			models::authz::CheckResponse,
			models::authz::MenuRequest,
			models::authz::MenuResponse
		)
	),
	tags(
		(name = "Health", description = "Service health"),
		(name = "Authorization", description = "Permission resolution and menu visibility")
	)
)]
pub struct ApiDoc;

pub fn build_openapi(port: u16) -> anyhow::Result<utoipa::openapi::OpenApi> {
	let mut doc = serde_json::to_value(ApiDoc::openapi())?;

	normalize_path_operations(&mut doc);
	ensure_openapi_version(&mut doc);
	add_examples(&mut doc);
	ensure_servers(&mut doc, port);

	Ok(serde_json::from_value(doc)?)
}

pub fn swagger_routes(doc: utoipa::openapi::OpenApi) -> anyhow::Result<Router> {
	let swagger_config = utoipa_swagger_ui::Config::new(["/api-docs/openapi.json"])
		.try_it_out_enabled(true);

	let doc_json = Arc::new(serde_json::to_value(&doc)?);

	let json_route = {
		let doc_json = Arc::clone(&doc_json);
		get(move || {
			let doc_json = Arc::clone(&doc_json);
			async move { Json((*doc_json).clone()) }
		})
	};

	Ok(Router::new()
		.route("/api-docs/openapi.json", json_route)
		.merge(SwaggerUi::new("/docs").config(swagger_config)))
}

fn normalize_path_operations(doc: &mut Value) {
	if let Some(paths) = doc.get_mut("paths").and_then(Value::as_object_mut) {
		let snapshot = paths.clone();
		for (path, item) in snapshot {
			if let Some(ops) = item.as_object() {
				let mut normalized = Map::new();
				for (method, val) in ops {
					let key = method.to_lowercase();
					if let Some(existing) = normalized.get_mut(&key) {
						merge_values(existing, val);
					} else {
						normalized.insert(key, val.clone());
					}
				}
				paths.insert(path, Value::Object(normalized));
			}
		}
	}
}

fn ensure_openapi_version(doc: &mut Value) {
	if let Some(root) = doc.as_object_mut() {
		root.entry("openapi")
			.or_insert_with(|| Value::String("3.1.0".to_string()));
	}
}

fn ensure_servers(doc: &mut Value, port: u16) {
	if let Some(root) = doc.as_object_mut() {
		root.entry("servers")
			.or_insert_with(|| json!([{ "url": format!("http://localhost:{}", port) }]));
	}
}

fn add_examples(doc: &mut Value) {
	if let Some(paths) = doc.get_mut("paths").and_then(Value::as_object_mut) {
		for item in paths.values_mut() {
			if let Some(operations) = item.as_object_mut() {
				for operation in operations.values_mut() {
					apply_request_examples(operation);
				}
			}
		}
	}
}

fn apply_request_examples(operation: &mut Value) {
	let Some(request_body) = operation.get_mut("requestBody") else { return; };
	let Some(content) = request_body.get_mut("content").and_then(Value::as_object_mut) else { return; };
	let Some(app_json) = content.get_mut("application/json").and_then(Value::as_object_mut) else { return; };
	let Some(schema) = app_json.get("schema").and_then(Value::as_object) else { return; };
	let Some(reference) = schema.get("$ref").and_then(Value::as_str) else { return; };

	let actor = json!({
		"role": "Employee",
		"sidebar_permissions": ["dashboard", "staff"],
		"direct_permissions": ["staff_create", "job_openings.view"]
	});

	let example = match reference {
		"#/components/schemas/ResolveRequest" => Some(json!({ "actor": actor })),
		"#/components/schemas/CheckRequest" => Some(json!({
			"actor": actor,
			"module": "staff",
			"action": "create"
		})),
		"#/components/schemas/MenuRequest" => Some(json!({
			"actor": actor,
			"path": "/staff/attendance/today",
			"query": ""
		})),
		_ => None,
	};

	if let Some(example) = example {
		app_json.insert("example".to_string(), example);
	}
}

fn merge_values(a: &mut Value, b: &Value) {
	match (a, b) {
		(Value::Object(ma), Value::Object(mb)) => {
			for (k, vb) in mb {
				if let Some(va) = ma.get_mut(k) {
					merge_values(va, vb);
				} else {
					ma.insert(k.clone(), vb.clone());
				}
			}
		}
		(Value::Array(aa), Value::Array(ba)) => {
			for item in ba {
				if !aa.contains(item) {
					aa.push(item.clone());
				}
			}
		}
		_ => {}
	}
}
