//! Route-level contract: JSON body in, `{"image": ...}` or `{"error": ...}` out.
//!
//! Transport (HTTP, CLI, whatever) stays with the caller; this module only
//! applies the per-route defaults and the lenient scalar coercion.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;
use serde_json::Value;
use tracing::warn;

use crate::engine::Engine;
use crate::error::RenderError;
use crate::floorplan::FloorPlanRequest;
use crate::fonts::TextMeasure;
use crate::projection::ProjectionRequest;
use crate::robot::RobotRequest;
use crate::sink::{Artifact, OutputSink};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    GenerateHouse,
    GenerateCrypto,
    GenerateRobot,
}

impl Route {
    pub fn name(self) -> &'static str {
        match self {
            Route::GenerateHouse => "generate_house",
            Route::GenerateCrypto => "generate_crypto",
            Route::GenerateRobot => "generate_robot",
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Route {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().trim_start_matches('/').replace('-', "_");
        match normalized.as_str() {
            "generate_house" | "house" => Ok(Route::GenerateHouse),
            "generate_crypto" | "crypto" => Ok(Route::GenerateCrypto),
            "generate_robot" | "robot" => Ok(Route::GenerateRobot),
            _ => Err(format!(
                "Unknown route '{}'. Available: generate_house, generate_crypto, generate_robot",
                s
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Response {
    Image { image: String },
    Error { error: String },
}

impl Response {
    pub fn from_result(result: Result<Artifact, RenderError>) -> Self {
        match result {
            Ok(artifact) => Response::Image {
                image: artifact.public_path,
            },
            Err(err) => Response::Error {
                error: err.to_string(),
            },
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Response::Error { .. })
    }
}

pub fn dispatch<M, S>(engine: &Engine<M>, sink: &S, route: Route, body: &Value) -> Response
where
    M: TextMeasure,
    S: OutputSink + ?Sized,
{
    let result = handle(engine, sink, route, body);
    if let Err(err) = &result {
        warn!(route = route.name(), error = %err, "render request rejected");
    }
    Response::from_result(result)
}

fn handle<M, S>(
    engine: &Engine<M>,
    sink: &S,
    route: Route,
    body: &Value,
) -> Result<Artifact, RenderError>
where
    M: TextMeasure,
    S: OutputSink + ?Sized,
{
    if !body.is_object() {
        return Err(RenderError::invalid("body", "expected a JSON object"));
    }

    match route {
        Route::GenerateHouse => engine.render_floor_plan(
            coerce_int(body, "floors", FloorPlanRequest::DEFAULT_FLOORS)?,
            coerce_int(body, "rooms", FloorPlanRequest::DEFAULT_ROOMS)?,
            coerce_int(body, "sqft", FloorPlanRequest::DEFAULT_SQFT)?,
            sink,
        ),
        Route::GenerateCrypto => engine.render_projection(
            &coerce_text(body, "investment_type", ProjectionRequest::DEFAULT_ASSET_TYPE),
            coerce_real(body, "budget", ProjectionRequest::DEFAULT_BUDGET)?,
            sink,
        ),
        Route::GenerateRobot => engine.render_robot_schematic(
            &coerce_text(body, "robot_type", RobotRequest::DEFAULT_ROBOT_TYPE),
            sink,
        ),
    }
}

/// Missing and `null` fields both fall back to the default.
fn field<'a>(body: &'a Value, name: &str) -> Option<&'a Value> {
    body.get(name).filter(|v| !v.is_null())
}

/// Integers, floats (truncated toward zero), booleans and numeric strings.
pub fn coerce_int(body: &Value, name: &'static str, default: i64) -> Result<i64, RenderError> {
    let Some(value) = field(body, name) else {
        return Ok(default);
    };

    match value {
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Ok(i)
            } else if let Some(f) = n.as_f64().filter(|f| f.is_finite()) {
                let truncated = f.trunc();
                if truncated >= i64::MIN as f64 && truncated < i64::MAX as f64 {
                    Ok(truncated as i64)
                } else {
                    Err(RenderError::invalid(name, format!("{} is out of range", n)))
                }
            } else {
                Err(RenderError::invalid(name, format!("{} is out of range", n)))
            }
        }
        Value::Bool(b) => Ok(i64::from(*b)),
        Value::String(s) => s
            .trim()
            .parse::<i64>()
            .map_err(|_| RenderError::invalid(name, format!("'{}' is not an integer", s))),
        other => Err(RenderError::invalid(
            name,
            format!("expected an integer, got {}", other),
        )),
    }
}

/// Numbers, booleans and numeric strings.
pub fn coerce_real(body: &Value, name: &'static str, default: f64) -> Result<f64, RenderError> {
    let Some(value) = field(body, name) else {
        return Ok(default);
    };

    match value {
        Value::Number(n) => n
            .as_f64()
            .ok_or_else(|| RenderError::invalid(name, format!("{} is not a number", n))),
        Value::Bool(b) => Ok(if *b { 1.0 } else { 0.0 }),
        Value::String(s) => s
            .trim()
            .parse::<f64>()
            .map_err(|_| RenderError::invalid(name, format!("'{}' is not a number", s))),
        other => Err(RenderError::invalid(
            name,
            format!("expected a number, got {}", other),
        )),
    }
}

/// Any JSON value becomes text; strings are taken verbatim.
pub fn coerce_text(body: &Value, name: &str, default: &str) -> String {
    match field(body, name) {
        None => default.to_string(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fonts::FixedAdvanceMeasure;
    use crate::raster::Rasterizer;
    use crate::sink::{ArtifactKind, MemorySink};
    use serde_json::json;

    fn engine() -> Engine<FixedAdvanceMeasure> {
        Engine::with_measure(Rasterizer::without_fonts(), FixedAdvanceMeasure::default())
    }

    #[test]
    fn routes_parse_from_paths_and_short_names() {
        assert_eq!("/generate_house".parse::<Route>(), Ok(Route::GenerateHouse));
        assert_eq!("crypto".parse::<Route>(), Ok(Route::GenerateCrypto));
        assert_eq!("generate-robot".parse::<Route>(), Ok(Route::GenerateRobot));
        assert!("generate_boat".parse::<Route>().is_err());
    }

    #[test]
    fn int_coercion_is_lenient_like_a_form_handler() {
        let body = json!({"a": 3, "b": 3.9, "c": " 7 ", "d": true, "e": null, "f": "x", "g": [1]});
        assert_eq!(coerce_int(&body, "a", 1).ok(), Some(3));
        assert_eq!(coerce_int(&body, "b", 1).ok(), Some(3));
        assert_eq!(coerce_int(&body, "c", 1).ok(), Some(7));
        assert_eq!(coerce_int(&body, "d", 1).ok(), Some(1));
        assert_eq!(coerce_int(&body, "e", 1).ok(), Some(1));
        assert_eq!(coerce_int(&body, "missing", 100).ok(), Some(100));
        assert!(coerce_int(&body, "f", 1).is_err());
        assert!(coerce_int(&body, "g", 1).is_err());
    }

    #[test]
    fn real_and_text_coercion() {
        let body = json!({"budget": "2.5e5", "bad": "lots", "n": 42, "s": "drone"});
        assert_eq!(coerce_real(&body, "budget", 1.0).ok(), Some(250_000.0));
        assert!(coerce_real(&body, "bad", 1.0).is_err());
        assert_eq!(coerce_text(&body, "n", "x"), "42");
        assert_eq!(coerce_text(&body, "s", "x"), "drone");
        assert_eq!(coerce_text(&body, "missing", "fighting"), "fighting");
    }

    #[test]
    fn empty_bodies_use_route_defaults() {
        let engine = engine();
        let sink = MemorySink::new();

        for (route, path) in [
            (Route::GenerateHouse, "/static/house_blueprint.png"),
            (Route::GenerateCrypto, "/static/crypto_plan.png"),
            (Route::GenerateRobot, "/static/robot_model.png"),
        ] {
            let response = dispatch(&engine, &sink, route, &json!({}));
            assert_eq!(
                response,
                Response::Image {
                    image: path.to_string()
                }
            );
        }
        assert_eq!(sink.len(), ArtifactKind::ALL.len());
    }

    #[test]
    fn errors_become_error_payloads() {
        let engine = engine();
        let sink = MemorySink::new();

        let response = dispatch(&engine, &sink, Route::GenerateHouse, &json!({"rooms": 0}));
        assert!(response.is_error());
        assert_eq!(
            serde_json::to_value(&response).expect("json"),
            json!({"error": "Invalid parameter `rooms`: must be at least 1, got 0"})
        );

        let response = dispatch(&engine, &sink, Route::GenerateCrypto, &json!({"budget": "abc"}));
        assert!(response.is_error());

        let response = dispatch(&engine, &sink, Route::GenerateRobot, &json!([1, 2]));
        assert!(response.is_error());
        assert!(sink.is_empty());
    }
}
