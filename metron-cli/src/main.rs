//! Metron command line front end
//!
//! Reads one JSON request per line from stdin and writes one JSON response
//! per line to stdout. Logs go to stderr; set `RUST_LOG` to change the level.
//!
//! Methods:
//! - call: `{"function": "convert", "args": [36, "km/h", "m s^-1"], "tolerance": 1e-9}`
//! - list_functions: `{"category": "units"}` (optional)
//! - help: `{"name": "simplify"}` (optional)
//!
//! Requests without an `id` are processed but get no response.

use metron_core::{codes, MetronError, Value};
use metron_plugin::{EvalContext, PluginRegistry};
use metron_units::UNITS;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::collections::HashMap;
use std::io::{self, BufRead, Write};
use std::sync::Arc;
use tracing::{debug, error, info, warn};
use tracing_subscriber::EnvFilter;

const SERVER_VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Debug, Deserialize)]
struct Request {
    id: Option<JsonValue>,
    method: String,
    #[serde(default)]
    params: Option<JsonValue>,
}

#[derive(Debug, Serialize)]
struct Response {
    #[serde(skip_serializing_if = "Option::is_none")]
    id: Option<JsonValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    result: Option<JsonValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<MetronError>,
}

impl Response {
    fn ok(id: Option<JsonValue>, result: JsonValue) -> Self {
        Response { id, result: Some(result), error: None }
    }

    fn err(id: Option<JsonValue>, error: MetronError) -> Self {
        Response { id, result: None, error: Some(error) }
    }
}

fn create_registry() -> Arc<PluginRegistry> {
    Arc::new(metron_units::load_units_library(PluginRegistry::new()))
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(io::stderr)
        .init();

    let registry = create_registry();
    info!(
        version = SERVER_VERSION,
        units = UNITS.registry().len(),
        functions = registry.function_names().len(),
        "metron ready, waiting for requests"
    );

    let stdin = io::stdin();
    let mut reader = io::BufReader::new(stdin.lock());

    loop {
        let mut line = String::new();
        match reader.read_line(&mut line) {
            Ok(0) => {
                info!("end of input");
                break;
            }
            Ok(_) => {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }
                debug!(bytes = line.len(), "request received");

                let response = match serde_json::from_str::<Request>(line) {
                    Ok(request) => {
                        let response = handle_request(&registry, &request);
                        // No id, no response
                        if request.id.is_none() {
                            debug!(method = %request.method, "notification processed");
                            continue;
                        }
                        response
                    }
                    Err(e) => {
                        warn!(error = %e, "malformed request");
                        Response::err(None, MetronError::parse_error(e.to_string()))
                    }
                };

                if let Err(e) = write_response(&response) {
                    error!(error = %e, "cannot write response");
                    break;
                }
            }
            Err(e) => {
                error!(error = %e, "cannot read input");
                break;
            }
        }
    }

    info!("shutting down");
}

fn write_response(response: &Response) -> io::Result<()> {
    let json = serde_json::to_string(response).map_err(io::Error::other)?;
    let mut stdout = io::stdout().lock();
    writeln!(stdout, "{}", json)?;
    stdout.flush()
}

fn handle_request(registry: &Arc<PluginRegistry>, request: &Request) -> Response {
    let id = request.id.clone();
    let params = request.params.as_ref();

    let result = match request.method.as_str() {
        "call" => handle_call(registry, params),
        "list_functions" => {
            let category = params.and_then(|p| p.get("category")).and_then(|c| c.as_str());
            Ok(registry.list_functions(category))
        }
        "help" => {
            let name = params.and_then(|p| p.get("name")).and_then(|n| n.as_str());
            Ok(registry.help(name))
        }
        other => Err(MetronError::new(codes::NOT_FOUND, format!("Method not found: {}", other))
            .with_suggestion("Use call, list_functions or help")),
    };

    match result {
        Ok(Value::Error(e)) => Response::err(id, e),
        Ok(value) => Response::ok(id, value.to_json()),
        Err(e) => Response::err(id, e),
    }
}

fn handle_call(registry: &Arc<PluginRegistry>, params: Option<&JsonValue>) -> Result<Value, MetronError> {
    let params = params.ok_or_else(|| {
        MetronError::new(codes::ARG_COUNT, "call needs params with a function name")
    })?;

    let function = params.get("function").and_then(|f| f.as_str()).ok_or_else(|| {
        MetronError::arg_type("call", "function", "Text", json_type_name(params.get("function")))
    })?;

    let args: Vec<Value> = match params.get("args") {
        Some(JsonValue::Array(items)) => items.iter().map(json_to_value).collect(),
        Some(other) => return Err(MetronError::arg_type("call", "args", "List", json_type_name(Some(other)))),
        None => Vec::new(),
    };

    let mut ctx = EvalContext::new();
    if let Some(tolerance) = params.get("tolerance").and_then(|t| t.as_f64()) {
        ctx = ctx.with_tolerance(tolerance);
    }

    debug!(function, args = args.len(), "calling");
    Ok(registry.call_function(function, &args, &ctx))
}

fn json_to_value(json: &JsonValue) -> Value {
    match json {
        JsonValue::Null => Value::Null,
        JsonValue::Bool(b) => Value::Bool(*b),
        JsonValue::Number(n) => n.as_f64().map_or(Value::Null, Value::Number),
        JsonValue::String(s) => Value::Text(s.clone()),
        JsonValue::Array(items) => Value::List(items.iter().map(json_to_value).collect()),
        JsonValue::Object(map) => Value::Object(
            map.iter().map(|(k, v)| (k.clone(), json_to_value(v))).collect::<HashMap<_, _>>(),
        ),
    }
}

fn json_type_name(json: Option<&JsonValue>) -> &'static str {
    match json {
        None | Some(JsonValue::Null) => "Null",
        Some(JsonValue::Bool(_)) => "Bool",
        Some(JsonValue::Number(_)) => "Number",
        Some(JsonValue::String(_)) => "Text",
        Some(JsonValue::Array(_)) => "List",
        Some(JsonValue::Object(_)) => "Object",
    }
}
