//! In-memory stand-in for the index and alias endpoints of a cluster.
//!
//! Bodies and error bodies follow what a real node returns, so the client
//! can be exercised end to end without a container. Index expressions
//! support comma lists, `_all` and a single `*` wildcard per name.

use std::{
    collections::{BTreeMap, BTreeSet},
    sync::{Mutex, MutexGuard, PoisonError},
};

use actix_web::{HttpResponse, http::StatusCode, web};
use osapi_client::{Client, Config};
use serde_json::{Map, Value, json};
use url::Url;

use crate::server::{Running, spawn};

pub const CLUSTER_NAME: &str = "osapi-mock";
pub const NODE_NAME: &str = "osapi-mock-node";

type Aliases = BTreeMap<String, Value>;

#[derive(Debug, Default)]
struct Cluster {
    indices: BTreeMap<String, Aliases>,
}

type Shared = web::Data<Mutex<Cluster>>;

fn lock(cluster: &Shared) -> MutexGuard<'_, Cluster> {
    cluster
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
}

fn is_pattern(name: &str) -> bool {
    name == "_all" || name.contains('*')
}

fn matches(
    pattern: &str,
    name: &str,
) -> bool {
    if pattern == "_all" {
        return true;
    }
    match pattern.split_once('*') {
        None => pattern == name,
        Some((prefix, suffix)) => {
            name.len() >= prefix.len() + suffix.len()
                && name.starts_with(prefix)
                && name.ends_with(suffix)
        },
    }
}

fn split(expr: &str) -> Vec<&str> {
    expr.split(',')
        .map(str::trim)
        .filter(|it| !it.is_empty())
        .collect()
}

fn exception(
    status: StatusCode,
    kind: &str,
    reason: String,
    extra: Value,
) -> HttpResponse {
    let mut cause = json!({ "type": kind, "reason": reason });
    if let (Some(cause), Value::Object(extra)) = (cause.as_object_mut(), extra) {
        cause.extend(extra);
    }
    let mut error = cause.clone();
    error["root_cause"] = json!([cause]);

    HttpResponse::build(status).json(json!({ "error": error, "status": status.as_u16() }))
}

fn index_not_found(index: &str) -> HttpResponse {
    exception(
        StatusCode::NOT_FOUND,
        "index_not_found_exception",
        format!("no such index [{index}]"),
        json!({
            "index": index,
            "index_uuid": "_na_",
            "resource.type": "index_or_alias",
            "resource.id": index,
        }),
    )
}

fn missing_message(missing: &[String]) -> String {
    if missing.len() == 1 {
        format!("alias [{}] missing", missing[0])
    } else {
        format!("aliases [{}] missing", missing.join(","))
    }
}

fn acknowledged() -> HttpResponse {
    HttpResponse::Ok().json(json!({ "acknowledged": true }))
}

/// Result of matching alias names against a set of indices.
struct Selection {
    found: Map<String, Value>,
    missing: Vec<String>,
    any: bool,
}

impl Cluster {
    fn resolve(
        &self,
        expr: &str,
    ) -> Result<Vec<String>, HttpResponse> {
        let mut out = BTreeSet::new();
        for part in split(expr) {
            if is_pattern(part) {
                out.extend(
                    self.indices
                        .keys()
                        .filter(|it| matches(part, it))
                        .cloned(),
                );
            } else if self.indices.contains_key(part) {
                out.insert(part.to_string());
            } else {
                return Err(index_not_found(part));
            }
        }
        Ok(out.into_iter().collect())
    }

    fn select(
        &self,
        indices: Option<&str>,
        names: Option<&str>,
    ) -> Result<Selection, HttpResponse> {
        let targets = match indices {
            Some(expr) => self.resolve(expr)?,
            None => self.indices.keys().cloned().collect(),
        };
        let patterns = names.map(split);

        let mut found = Map::new();
        let mut seen = BTreeSet::new();
        for index in targets {
            let Some(aliases) = self.indices.get(&index) else {
                continue;
            };
            let selected: Map<String, Value> = aliases
                .iter()
                .filter(|(name, _)| {
                    patterns
                        .as_ref()
                        .is_none_or(|ps| ps.iter().any(|p| matches(p, name)))
                })
                .map(|(name, props)| (name.clone(), props.clone()))
                .collect();

            seen.extend(selected.keys().cloned());
            if patterns.is_none() || !selected.is_empty() {
                found.insert(index, json!({ "aliases": selected }));
            }
        }

        let missing = patterns
            .iter()
            .flatten()
            .filter(|name| !is_pattern(name) && !seen.contains(**name))
            .map(|name| name.to_string())
            .collect();

        Ok(Selection {
            found,
            missing,
            any: !seen.is_empty(),
        })
    }
}

/// Alias properties as the cluster stores and reports them.
fn alias_props(body: &[u8]) -> Result<Value, HttpResponse> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(json!({}));
    }
    let Ok(Value::Object(input)) = serde_json::from_slice::<Value>(body) else {
        return Err(exception(
            StatusCode::BAD_REQUEST,
            "parse_exception",
            "request body must be a JSON object".into(),
            json!({}),
        ));
    };

    let mut props = Map::new();
    if let Some(filter) = input.get("filter") {
        props.insert("filter".into(), filter.clone());
    }
    if let Some(routing) = input.get("routing") {
        props.insert("index_routing".into(), routing.clone());
        props.insert("search_routing".into(), routing.clone());
    }
    for key in [
        "index_routing",
        "search_routing",
        "is_write_index",
        "is_hidden",
    ] {
        if let Some(value) = input.get(key) {
            props.insert(key.into(), value.clone());
        }
    }
    Ok(Value::Object(props))
}

async fn info() -> HttpResponse {
    HttpResponse::Ok().json(json!({
        "name": NODE_NAME,
        "cluster_name": CLUSTER_NAME,
        "cluster_uuid": "osapi-mock-cluster-uuid",
        "version": {
            "distribution": "opensearch",
            "number": "2.19.1",
            "build_type": "tar",
            "build_hash": "mock",
            "build_date": "2025-01-01T00:00:00.000000000Z",
            "build_snapshot": false,
            "lucene_version": "9.12.1",
            "minimum_wire_compatibility_version": "7.10.0",
            "minimum_index_compatibility_version": "7.0.0"
        },
        "tagline": "The OpenSearch Project: https://opensearch.org/"
    }))
}

async fn create_index(
    cluster: Shared,
    path: web::Path<String>,
    body: web::Bytes,
) -> HttpResponse {
    let index = path.into_inner();

    if index.starts_with('_') || index.chars().any(|c| c.is_ascii_uppercase() || c == ',') {
        return exception(
            StatusCode::BAD_REQUEST,
            "invalid_index_name_exception",
            format!("Invalid index name [{index}]"),
            json!({ "index": index, "index_uuid": "_na_" }),
        );
    }

    let aliases = if body.iter().all(u8::is_ascii_whitespace) {
        Aliases::new()
    } else {
        match serde_json::from_slice::<Value>(&body) {
            Ok(Value::Object(mut settings)) => {
                match settings.remove("aliases") {
                    Some(Value::Object(aliases)) => aliases.into_iter().collect(),
                    _ => Aliases::new(),
                }
            },
            _ => {
                return exception(
                    StatusCode::BAD_REQUEST,
                    "parse_exception",
                    "request body must be a JSON object".into(),
                    json!({}),
                );
            },
        }
    };

    let mut cluster = lock(&cluster);
    if cluster.indices.contains_key(&index) {
        return exception(
            StatusCode::BAD_REQUEST,
            "resource_already_exists_exception",
            format!("index [{index}/osapi-mock-uuid] already exists"),
            json!({ "index": index, "index_uuid": "osapi-mock-uuid" }),
        );
    }
    cluster.indices.insert(index.clone(), aliases);

    HttpResponse::Ok().json(json!({
        "acknowledged": true,
        "shards_acknowledged": true,
        "index": index,
    }))
}

async fn delete_index(
    cluster: Shared,
    path: web::Path<String>,
) -> HttpResponse {
    let mut cluster = lock(&cluster);
    let targets = match cluster.resolve(&path) {
        Ok(targets) => targets,
        Err(resp) => return resp,
    };
    for index in targets {
        cluster.indices.remove(&index);
    }
    acknowledged()
}

async fn index_exists(
    cluster: Shared,
    path: web::Path<String>,
) -> HttpResponse {
    match lock(&cluster).resolve(&path) {
        Ok(targets) if !targets.is_empty() => HttpResponse::Ok().finish(),
        _ => HttpResponse::NotFound().finish(),
    }
}

async fn put_alias(
    cluster: Shared,
    path: web::Path<(String, String)>,
    body: web::Bytes,
) -> HttpResponse {
    let (indices, name) = path.into_inner();
    let props = match alias_props(&body) {
        Ok(props) => props,
        Err(resp) => return resp,
    };

    let mut cluster = lock(&cluster);
    let targets = match cluster.resolve(&indices) {
        Ok(targets) => targets,
        Err(resp) => return resp,
    };
    if cluster.indices.contains_key(&name) {
        return exception(
            StatusCode::BAD_REQUEST,
            "invalid_alias_name_exception",
            format!("Invalid alias name [{name}]: an index or data stream exists with the same name as the alias"),
            json!({ "index": name }),
        );
    }
    for index in targets {
        if let Some(aliases) = cluster.indices.get_mut(&index) {
            aliases.insert(name.clone(), props.clone());
        }
    }
    acknowledged()
}

fn get_response(
    cluster: &Shared,
    indices: Option<&str>,
    names: Option<&str>,
) -> HttpResponse {
    let selection = match lock(cluster).select(indices, names) {
        Ok(selection) => selection,
        Err(resp) => return resp,
    };

    if selection.missing.is_empty() {
        return HttpResponse::Ok().json(Value::Object(selection.found));
    }

    let mut body = selection.found;
    body.insert("error".into(), json!(missing_message(&selection.missing)));
    body.insert("status".into(), json!(404));
    HttpResponse::NotFound().json(Value::Object(body))
}

/// 200 when some alias matched and no named alias is missing.
fn head_response(
    cluster: &Shared,
    indices: Option<&str>,
    names: Option<&str>,
) -> HttpResponse {
    match lock(cluster).select(indices, names) {
        Ok(selection) if selection.missing.is_empty() && selection.any => {
            HttpResponse::Ok().finish()
        },
        _ => HttpResponse::NotFound().finish(),
    }
}

async fn get_all_aliases(cluster: Shared) -> HttpResponse {
    get_response(&cluster, None, None)
}

async fn head_all_aliases(cluster: Shared) -> HttpResponse {
    head_response(&cluster, None, None)
}

async fn get_aliases_by_name(
    cluster: Shared,
    path: web::Path<String>,
) -> HttpResponse {
    get_response(&cluster, None, Some(path.as_str()))
}

async fn head_aliases_by_name(
    cluster: Shared,
    path: web::Path<String>,
) -> HttpResponse {
    head_response(&cluster, None, Some(path.as_str()))
}

async fn get_index_aliases(
    cluster: Shared,
    path: web::Path<String>,
) -> HttpResponse {
    get_response(&cluster, Some(path.as_str()), None)
}

async fn head_index_aliases(
    cluster: Shared,
    path: web::Path<String>,
) -> HttpResponse {
    head_response(&cluster, Some(path.as_str()), None)
}

async fn get_alias(
    cluster: Shared,
    path: web::Path<(String, String)>,
) -> HttpResponse {
    let (indices, names) = path.into_inner();
    get_response(&cluster, Some(&indices), Some(&names))
}

async fn head_alias(
    cluster: Shared,
    path: web::Path<(String, String)>,
) -> HttpResponse {
    let (indices, names) = path.into_inner();
    head_response(&cluster, Some(&indices), Some(&names))
}

async fn delete_alias(
    cluster: Shared,
    path: web::Path<(String, String)>,
) -> HttpResponse {
    let (indices, names) = path.into_inner();
    let patterns = split(&names);

    let mut cluster = lock(&cluster);
    let targets = match cluster.resolve(&indices) {
        Ok(targets) => targets,
        Err(resp) => return resp,
    };

    let mut removed = BTreeSet::new();
    for index in targets {
        if let Some(aliases) = cluster.indices.get_mut(&index) {
            aliases.retain(|name, _| {
                let hit = patterns.iter().any(|p| matches(p, name));
                if hit {
                    removed.insert(name.clone());
                }
                !hit
            });
        }
    }

    let missing: Vec<String> = patterns
        .iter()
        .filter(|name| !is_pattern(name) && !removed.contains(**name))
        .map(|name| name.to_string())
        .collect();

    if removed.is_empty() || !missing.is_empty() {
        let missing = if missing.is_empty() {
            patterns
                .iter()
                .map(|it| it.to_string())
                .collect()
        } else {
            missing
        };
        return exception(
            StatusCode::NOT_FOUND,
            "aliases_not_found_exception",
            format!("aliases [{}] missing", missing.join(",")),
            json!({ "resource.type": "aliases", "resource.id": missing.join(",") }),
        );
    }

    acknowledged()
}

fn routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/", web::get().to(info))
        .route("/_alias", web::get().to(get_all_aliases))
        .route("/_alias", web::head().to(head_all_aliases))
        .route("/_alias/{name}", web::get().to(get_aliases_by_name))
        .route("/_alias/{name}", web::head().to(head_aliases_by_name))
        .route("/{index}", web::put().to(create_index))
        .route("/{index}", web::delete().to(delete_index))
        .route("/{index}", web::head().to(index_exists))
        .route("/{index}/_alias", web::get().to(get_index_aliases))
        .route("/{index}/_alias", web::head().to(head_index_aliases))
        .route("/{index}/_alias/{name}", web::put().to(put_alias))
        .route("/{index}/_alias/{name}", web::get().to(get_alias))
        .route("/{index}/_alias/{name}", web::head().to(head_alias))
        .route("/{index}/_alias/{name}", web::delete().to(delete_alias));
}

/// A running mock cluster. Stops when dropped.
pub struct MockOpenSearch {
    running: Running,
    cluster: Shared,
}

impl MockOpenSearch {
    pub fn start() -> Self {
        let cluster: Shared = web::Data::new(Mutex::new(Cluster::default()));

        let app_cluster = cluster.clone();
        let running = spawn("osapi-mock", move |cfg: &mut web::ServiceConfig| {
            cfg.app_data(app_cluster.clone());
            routes(cfg);
        });

        Self { running, cluster }
    }

    pub fn url(&self) -> Url {
        self.running.url()
    }

    pub fn config(&self) -> Config {
        Config::new(vec![self.url()])
    }

    pub fn client(&self) -> Client {
        Client::new(&self.config()).expect("mock client")
    }

    pub fn indices(&self) -> Vec<String> {
        lock(&self.cluster)
            .indices
            .keys()
            .cloned()
            .collect()
    }

    /// Aliases currently pointing at `index`, with their properties.
    pub fn aliases(
        &self,
        index: &str,
    ) -> Option<BTreeMap<String, Value>> {
        lock(&self.cluster)
            .indices
            .get(index)
            .cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wildcard_matching() {
        assert!(matches("_all", "logs"));
        assert!(matches("*", "logs"));
        assert!(matches("log*", "logs"));
        assert!(matches("*-2024", "logs-2024"));
        assert!(matches("logs-*-a", "logs-x-a"));
        assert!(!matches("logs-*-a", "logs-a"));
        assert!(!matches("metrics*", "logs"));
        assert!(matches("logs", "logs"));
        assert!(!matches("logs", "logs-1"));
    }

    #[test]
    fn routing_expands_to_both_sides() {
        let props = alias_props(br#"{"routing": "1", "is_write_index": true}"#).unwrap();
        assert_eq!(
            props,
            json!({"index_routing": "1", "search_routing": "1", "is_write_index": true})
        );
    }

    #[test]
    fn empty_body_means_no_properties() {
        assert_eq!(alias_props(b"").unwrap(), json!({}));
    }

    async fn body(resp: HttpResponse) -> Value {
        let bytes = actix_web::body::to_bytes(resp.into_body())
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[actix_web::test]
    async fn index_not_found_body() {
        let resp = index_not_found("logs");
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        let json = body(resp).await;

        crate::assert_sorted_json_snapshot!(json, @r#"
        {
          "error": {
            "index": "logs",
            "index_uuid": "_na_",
            "reason": "no such index [logs]",
            "resource.id": "logs",
            "resource.type": "index_or_alias",
            "root_cause": [
              {
                "index": "logs",
                "index_uuid": "_na_",
                "reason": "no such index [logs]",
                "resource.id": "logs",
                "resource.type": "index_or_alias",
                "type": "index_not_found_exception"
              }
            ],
            "type": "index_not_found_exception"
          },
          "status": 404
        }
        "#);
    }

    #[actix_web::test]
    async fn missing_alias_body_keeps_found_indices() {
        let mut cluster = Cluster::default();
        cluster.indices.insert(
            "logs".into(),
            Aliases::from([("recent".to_string(), json!({}))]),
        );
        let cluster: Shared = web::Data::new(Mutex::new(cluster));

        let resp = get_response(&cluster, Some("logs"), Some("recent,gone"));
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        let json = body(resp).await;

        crate::assert_sorted_json_snapshot!(json, @r#"
        {
          "error": "alias [gone] missing",
          "logs": {
            "aliases": {
              "recent": {}
            }
          },
          "status": 404
        }
        "#);
    }

    #[test]
    fn select_reports_missing_concrete_names() {
        let mut cluster = Cluster::default();
        cluster.indices.insert(
            "logs".into(),
            Aliases::from([("recent".to_string(), json!({}))]),
        );
        cluster.indices.insert("metrics".into(), Aliases::new());

        let selection = cluster
            .select(None, Some("recent,gone,any*"))
            .unwrap();
        assert_eq!(selection.missing, vec!["gone".to_string()]);
        assert!(selection.any);
        assert_eq!(
            Value::Object(selection.found),
            json!({"logs": {"aliases": {"recent": {}}}})
        );

        let all = cluster.select(Some("_all"), None).unwrap();
        assert_eq!(
            Value::Object(all.found),
            json!({"logs": {"aliases": {"recent": {}}}, "metrics": {"aliases": {}}})
        );
    }
}
