//! Scene loading, parsing, and validation logic.
//!
//! A scene lists the nodes of an experiment (position and transmit power),
//! the propagation configuration, and the stream index the loss model is
//! seeded with.

use anyhow::Context;
use serde::Deserialize;
use std::collections::HashSet;
use std::fs;
use std::path::Path;

use crate::propagation::{ConfigError, LogNormalConfig, Position};

const MAX_NODES: usize = 1000;
const MIN_TX_POWER: f64 = -50.0;
const MAX_TX_POWER: f64 = 50.0;

/// Error type for scene loading failures.
#[derive(Debug)]
pub enum SceneLoadError {
    FileReadError(String),
    ParseError(String),
    ValidationError(String),
}

impl std::fmt::Display for SceneLoadError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SceneLoadError::FileReadError(msg) => write!(f, "Failed to read file: {}", msg),
            SceneLoadError::ParseError(msg) => write!(f, "Failed to parse JSON: {}", msg),
            SceneLoadError::ValidationError(msg) => write!(f, "Validation error: {}", msg),
        }
    }
}

impl std::error::Error for SceneLoadError {}

/// A transmitter/receiver in the scene.
#[derive(Debug, Deserialize, Clone)]
pub struct Node {
    pub node_id: u32,
    pub position: Position,
    /// Transmit power in dBm.
    pub tx_power: f64,
}

fn default_stream() -> i64 {
    0
}

/// Root structure representing the entire scene.
#[derive(Debug, Deserialize)]
pub struct Scene {
    /// All nodes present in the scene.
    pub nodes: Vec<Node>,
    /// Loss model parameters. When absent, `config.toml` next to the scene
    /// file is used, falling back to the defaults.
    #[serde(default)]
    pub propagation: Option<LogNormalConfig>,
    /// Stream index the loss model is seeded with.
    #[serde(default = "default_stream")]
    pub stream: i64,
    /// Optional receiver sensitivity (dBm) used to classify links.
    #[serde(default)]
    pub rx_sensitivity: Option<f64>,
}

/// Load and parse a scene from a file.
///
/// # Parameters
///
/// * `path` - Path to the scene JSON file
///
/// # Returns
///
/// Parsed and validated Scene or an error.
pub fn load_scene(path: &Path) -> Result<Scene, SceneLoadError> {
    let data = fs::read_to_string(path)
        .with_context(|| format!("Failed to read file: {}", path.display()))
        .map_err(|e| SceneLoadError::FileReadError(e.to_string()))?;

    let scene = parse_scene(&data)?;
    log::info!("Loaded scene with {} nodes from {:?}", scene.nodes.len(), path);
    Ok(scene)
}

/// Parse and validate a scene from JSON text.
pub fn parse_scene(data: &str) -> Result<Scene, SceneLoadError> {
    let scene: Scene = serde_json::from_str(data)
        .context("Invalid JSON format")
        .map_err(|e| SceneLoadError::ParseError(format!("{:#}", e)))?;

    validate_scene(&scene).map_err(SceneLoadError::ValidationError)?;
    Ok(scene)
}

/// Validate scene configuration.
///
/// # Returns
///
/// `Ok(())` if validation passes, `Err(String)` with error description otherwise.
pub fn validate_scene(scene: &Scene) -> Result<(), String> {
    if scene.nodes.is_empty() {
        return Err("Scene must contain at least one node".to_string());
    }
    if scene.nodes.len() > MAX_NODES {
        return Err(format!("Node count {} exceeds maximum of {}", scene.nodes.len(), MAX_NODES));
    }

    let mut node_ids = HashSet::new();
    for node in &scene.nodes {
        if !node_ids.insert(node.node_id) {
            return Err(format!("Duplicate node_id found: {}", node.node_id));
        }
    }

    for node in &scene.nodes {
        if !node.position.is_finite() {
            return Err(format!("Node {} has a non-finite position", node.node_id));
        }
        if !(MIN_TX_POWER..=MAX_TX_POWER).contains(&node.tx_power) {
            return Err(format!(
                "Node {} tx_power {} dBm outside realistic range ({} to {} dBm)",
                node.node_id, node.tx_power, MIN_TX_POWER, MAX_TX_POWER
            ));
        }
    }

    if let Some(sensitivity) = scene.rx_sensitivity {
        if !sensitivity.is_finite() {
            return Err(format!("Invalid rx_sensitivity {}, must be finite", sensitivity));
        }
    }

    if let Some(propagation) = &scene.propagation {
        propagation.validate().map_err(|e| e.to_string())?;
    }

    Ok(())
}

/// Pick the propagation configuration for a scene loaded from `scene_path`.
///
/// Inline `propagation` wins; otherwise `config.toml` beside the scene file is
/// loaded if it exists; otherwise the defaults apply.
pub fn resolve_propagation(scene: &Scene, scene_path: &Path) -> Result<LogNormalConfig, ConfigError> {
    if let Some(config) = &scene.propagation {
        return Ok(config.clone());
    }
    let config_path = LogNormalConfig::config_path_from_scene(scene_path);
    if config_path.exists() {
        return LogNormalConfig::load(&config_path);
    }
    log::info!("No propagation configuration found, using defaults");
    Ok(LogNormalConfig::default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::propagation::RandomVariableSpec;

    const SCENE: &str = r#"{
        "stream": 3,
        "rx_sensitivity": -90.0,
        "propagation": {
            "exponent": 2.5,
            "random_variable": "ns3::NormalRandomVariable[Mean=0.0|Variance=2.0]"
        },
        "nodes": [
            { "node_id": 1, "position": { "x": 0.0, "y": 0.0 }, "tx_power": 16.0 },
            { "node_id": 2, "position": { "x": 30.0, "y": 40.0, "z": 0.0 }, "tx_power": 16.0 }
        ]
    }"#;

    #[test]
    fn parses_complete_scene() {
        let scene = parse_scene(SCENE).unwrap();
        assert_eq!(scene.stream, 3);
        assert_eq!(scene.nodes.len(), 2);
        assert_eq!(scene.nodes[1].position, Position::new(30.0, 40.0, 0.0));
        let propagation = scene.propagation.unwrap();
        assert_eq!(propagation.exponent, 2.5);
        assert_eq!(propagation.reference_loss, 46.6777);
        assert_eq!(
            propagation.random_variable,
            RandomVariableSpec::Normal {
                mean: 0.0,
                variance: 2.0,
                bound: None
            }
        );
    }

    #[test]
    fn rejects_empty_and_duplicate_nodes() {
        let err = parse_scene(r#"{ "nodes": [] }"#).unwrap_err();
        assert!(matches!(err, SceneLoadError::ValidationError(_)));

        let err = parse_scene(
            r#"{ "nodes": [
                { "node_id": 1, "position": { "x": 0, "y": 0 }, "tx_power": 0 },
                { "node_id": 1, "position": { "x": 1, "y": 0 }, "tx_power": 0 }
            ] }"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("Duplicate node_id"));
    }

    #[test]
    fn rejects_too_many_nodes() {
        let nodes: Vec<String> = (0..=MAX_NODES)
            .map(|id| format!(r#"{{ "node_id": {}, "position": {{ "x": {}, "y": 0 }}, "tx_power": 0 }}"#, id, id))
            .collect();
        let err = parse_scene(&format!(r#"{{ "nodes": [{}] }}"#, nodes.join(","))).unwrap_err();
        assert!(err.to_string().contains("exceeds maximum"));
    }

    #[test]
    fn rejects_unrealistic_tx_power() {
        let err = parse_scene(r#"{ "nodes": [ { "node_id": 1, "position": { "x": 0, "y": 0 }, "tx_power": 90 } ] }"#).unwrap_err();
        assert!(err.to_string().contains("tx_power"));
    }

    #[test]
    fn rejects_invalid_propagation() {
        let err = parse_scene(
            r#"{ "propagation": { "reference_distance": -1.0 },
                 "nodes": [ { "node_id": 1, "position": { "x": 0, "y": 0 }, "tx_power": 0 } ] }"#,
        )
        .unwrap_err();
        assert!(matches!(err, SceneLoadError::ValidationError(_)));
    }

    #[test]
    fn rejects_malformed_json() {
        assert!(matches!(parse_scene("{ nodes: ").unwrap_err(), SceneLoadError::ParseError(_)));
    }

    #[test]
    fn resolves_config_file_next_to_scene() {
        let dir = tempfile::tempdir().unwrap();
        let scene_path = dir.path().join("scene.json");
        fs::write(&scene_path, r#"{ "nodes": [ { "node_id": 7, "position": { "x": 0, "y": 0 }, "tx_power": 10 } ] }"#).unwrap();

        let scene = load_scene(&scene_path).unwrap();
        assert_eq!(scene.stream, 0);
        assert_eq!(resolve_propagation(&scene, &scene_path).unwrap(), LogNormalConfig::default());

        fs::write(dir.path().join("config.toml"), "exponent = 3.8\n").unwrap();
        assert_eq!(resolve_propagation(&scene, &scene_path).unwrap().exponent, 3.8);
    }

    #[test]
    fn inline_propagation_wins_over_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let scene_path = dir.path().join("scene.json");
        fs::write(dir.path().join("config.toml"), "exponent = 3.8\n").unwrap();
        let scene = parse_scene(SCENE).unwrap();
        assert_eq!(resolve_propagation(&scene, &scene_path).unwrap().exponent, 2.5);
    }

    #[test]
    fn missing_file_is_a_read_error() {
        let err = load_scene(Path::new("/nonexistent/scene.json")).unwrap_err();
        assert!(matches!(err, SceneLoadError::FileReadError(_)));
    }
}
