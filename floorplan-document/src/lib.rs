use region_detection::{find_closed_regions_with_config, Edge, Point, Region, RegionConfig, Vertex};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::warn;

/// A saved floor-plan annotation: the drawn topology plus points of interest.
///
/// Regions are never stored; they are recomputed from the topology on demand.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub id: String,
    pub name: String,
    pub descriptions: Vec<String>,
    /// Base image `[width, height]` in pixels
    pub size: [f64; 2],
    pub topology: Vec<TopologyRecord>,
    pub features: Vec<Feature>,
}

/// One entry of the mixed vertex/edge topology list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum TopologyRecord {
    Vertex(Vertex),
    Edge(Edge),
}

/// Point of interest placed on the plan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Feature {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub descriptions: Vec<String>,
    pub position: Point,
}

/// Error types for document import/export
#[derive(Debug)]
pub enum DocumentError {
    Io(std::io::Error),
    Parse(serde_json::Error),
    Serialize(serde_json::Error),
}

impl std::fmt::Display for DocumentError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DocumentError::Io(e) => write!(f, "IO error: {}", e),
            DocumentError::Parse(e) => write!(f, "Could not read floor plan: {}", e),
            DocumentError::Serialize(e) => write!(f, "Could not write floor plan: {}", e),
        }
    }
}

impl std::error::Error for DocumentError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            DocumentError::Io(e) => Some(e),
            DocumentError::Parse(e) | DocumentError::Serialize(e) => Some(e),
        }
    }
}

impl From<std::io::Error> for DocumentError {
    fn from(err: std::io::Error) -> Self {
        DocumentError::Io(err)
    }
}

impl From<serde_json::Error> for DocumentError {
    fn from(err: serde_json::Error) -> Self {
        DocumentError::Parse(err)
    }
}

/// Lenient on-disk shape: every field optional (absent or `null`), records kept as raw
/// JSON until checked
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawDocument {
    id: Option<String>,
    name: Option<String>,
    descriptions: Option<Vec<String>>,
    size: Option<[f64; 2]>,
    topology: Option<Vec<serde_json::Value>>,
    features: Option<Vec<serde_json::Value>>,
}

/// Keep the records that deserialize, log and skip the rest
fn parse_records<T: serde::de::DeserializeOwned>(kind: &str, values: Vec<serde_json::Value>) -> Vec<T> {
    values
        .into_iter()
        .enumerate()
        .filter_map(|(idx, value)| match serde_json::from_value(value) {
            Ok(record) => Some(record),
            Err(e) => {
                warn!("Skipping malformed {} record {}: {}", kind, idx, e);
                None
            }
        })
        .collect()
}

impl Document {
    pub fn new(name: impl Into<String>, size: [f64; 2]) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            name: name.into(),
            descriptions: Vec::new(),
            size,
            topology: Vec::new(),
            features: Vec::new(),
        }
    }

    /// Parse a document, filling in whatever optional fields are missing.
    ///
    /// A missing id gets a fresh UUID and individually malformed topology or feature
    /// records are dropped. Only text that is not a JSON object at all is an error.
    pub fn from_json_str(text: &str) -> Result<Self, DocumentError> {
        let raw: RawDocument = serde_json::from_str(text)?;

        Ok(Self {
            id: raw.id.unwrap_or_else(|| uuid::Uuid::new_v4().to_string()),
            name: raw.name.unwrap_or_default(),
            descriptions: raw.descriptions.unwrap_or_default(),
            size: raw.size.unwrap_or([0.0, 0.0]),
            topology: parse_records("topology", raw.topology.unwrap_or_default()),
            features: parse_records("feature", raw.features.unwrap_or_default()),
        })
    }

    pub fn to_json_string(&self) -> Result<String, DocumentError> {
        serde_json::to_string_pretty(self).map_err(DocumentError::Serialize)
    }

    pub fn vertices(&self) -> Vec<Vertex> {
        self.topology
            .iter()
            .filter_map(|record| match record {
                TopologyRecord::Vertex(v) => Some(v.clone()),
                TopologyRecord::Edge(_) => None,
            })
            .collect()
    }

    pub fn edges(&self) -> Vec<Edge> {
        self.topology
            .iter()
            .filter_map(|record| match record {
                TopologyRecord::Edge(e) => Some(e.clone()),
                TopologyRecord::Vertex(_) => None,
            })
            .collect()
    }

    pub fn add_vertex(&mut self, vertex: Vertex) {
        self.topology.push(TopologyRecord::Vertex(vertex));
    }

    pub fn add_edge(&mut self, edge: Edge) {
        self.topology.push(TopologyRecord::Edge(edge));
    }

    /// Recompute the closed regions of the current topology
    pub fn regions(&self, config: &RegionConfig) -> Vec<Region> {
        find_closed_regions_with_config(&self.vertices(), &self.edges(), config)
    }
}

/// Result of a lenient import
#[derive(Debug)]
pub struct Imported {
    pub document: Document,
    /// Set when the text could not be read; `document` is then empty
    pub error: Option<DocumentError>,
}

/// Import a document without failing.
///
/// Malformed JSON yields an empty document together with the error so the caller can
/// show it to the user instead of losing the session.
pub fn import_document(text: &str) -> Imported {
    match Document::from_json_str(text) {
        Ok(document) => Imported {
            document,
            error: None,
        },
        Err(e) => {
            warn!("Import failed, falling back to an empty document: {}", e);
            Imported {
                document: Document::new("", [0.0, 0.0]),
                error: Some(e),
            }
        }
    }
}

/// Load a document from disk
pub fn load_document(path: &Path) -> Result<Document, DocumentError> {
    let text = fs::read_to_string(path)?;
    Document::from_json_str(&text)
}

/// Save a document to disk as pretty-printed JSON
pub fn save_document(path: &Path, document: &Document) -> Result<(), DocumentError> {
    fs::write(path, document.to_json_string()?)?;
    Ok(())
}
