//! GeoJSON line-geometry importer
//!
//! Builds road graph topology from a FeatureCollection:
//! - every consecutive coordinate pair of a line becomes a two-way edge pair
//! - endpoints are nodes identified by their rounded coordinates
//! - edge weight is the haversine distance in kilometres
//!
//! The whole document is parsed and validated before the graph is touched,
//! so a malformed document leaves the target graph unchanged.

use super::{coordinate_key, haversine_distance, DEFAULT_COORDINATE_PRECISION, EARTH_RADIUS_KM};
use crate::graph::{EdgeType, GraphEngine, GraphError, NodeId};
use geojson::{Feature, GeoJson, LineStringType, Value};
use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::Path;
use thiserror::Error;
use tracing::{debug, info};

/// Import errors
#[derive(Error, Debug)]
pub enum ImportError {
    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Document is not valid GeoJSON
    #[error("Failed to parse GeoJSON: {0}")]
    Parse(#[from] geojson::Error),

    #[error("GeoJSON must be a FeatureCollection, found {0}")]
    NotFeatureCollection(&'static str),

    #[error("Feature {feature}: position {position} is not a finite [lon, lat] pair")]
    InvalidPosition { feature: usize, position: usize },

    #[error("Invalid sphere radius {0}: must be finite and positive")]
    InvalidRadius(f64),

    #[error("Graph error: {0}")]
    Graph(#[from] GraphError),
}

pub type ImportResult<T> = Result<T, ImportError>;

/// Importer configuration
#[derive(Debug, Clone)]
pub struct ImportOptions {
    /// Sphere radius used for edge weights; weights come out in this unit
    pub earth_radius_km: f64,
    /// Decimal digits per coordinate in generated node identifiers
    pub coordinate_precision: usize,
    /// Kind given to every imported edge
    pub edge_type: EdgeType,
    /// Feature property copied into edge labels when it holds a string
    pub name_property: Option<String>,
}

impl Default for ImportOptions {
    fn default() -> Self {
        ImportOptions {
            earth_radius_km: EARTH_RADIUS_KM,
            coordinate_precision: DEFAULT_COORDINATE_PRECISION,
            edge_type: EdgeType::new("ROAD"),
            name_property: Some("name".to_string()),
        }
    }
}

/// What an import did
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportSummary {
    /// Features in the collection
    pub features: usize,
    /// Line geometries processed (a MultiLineString counts each member)
    pub lines: usize,
    /// Features without a line geometry
    pub skipped_features: usize,
    /// Coordinate pairs turned into edge pairs
    pub segments: usize,
    /// Coordinate pairs dropped because both ends map to the same node
    pub degenerate_segments: usize,
    pub nodes_created: usize,
    pub edges_created: usize,
}

impl ImportSummary {
    /// True when at least one line contributed to the graph
    pub fn imported_any(&self) -> bool {
        self.lines > 0
    }
}

#[derive(Debug, Clone)]
struct Endpoint {
    key: String,
    lon: f64,
    lat: f64,
}

#[derive(Debug, Clone)]
struct Segment {
    from: Endpoint,
    to: Endpoint,
    weight: f64,
    label: Option<String>,
}

/// Validated, graph-independent result of reading a document
#[derive(Debug, Default)]
struct ImportPlan {
    segments: Vec<Segment>,
    summary: ImportSummary,
}

/// Builds a [`GraphEngine`] from GeoJSON line features
#[derive(Debug, Clone, Default)]
pub struct GeoJsonImporter {
    options: ImportOptions,
}

impl GeoJsonImporter {
    pub fn new(options: ImportOptions) -> Self {
        GeoJsonImporter { options }
    }

    pub fn options(&self) -> &ImportOptions {
        &self.options
    }

    /// Import a GeoJSON document held in a string
    pub fn import_str(&self, graph: &mut GraphEngine, text: &str) -> ImportResult<ImportSummary> {
        let geojson: GeoJson = text.parse()?;
        self.import_geojson(graph, geojson)
    }

    pub fn import_reader<R: Read>(
        &self,
        graph: &mut GraphEngine,
        mut reader: R,
    ) -> ImportResult<ImportSummary> {
        let mut text = String::new();
        reader.read_to_string(&mut text)?;
        self.import_str(graph, &text)
    }

    pub fn import_file(
        &self,
        graph: &mut GraphEngine,
        path: impl AsRef<Path>,
    ) -> ImportResult<ImportSummary> {
        let path = path.as_ref();
        info!("Importing GeoJSON from: {:?}", path);
        let file = File::open(path)?;
        self.import_reader(graph, BufReader::new(file))
    }

    /// Import an already parsed document
    pub fn import_geojson(
        &self,
        graph: &mut GraphEngine,
        geojson: GeoJson,
    ) -> ImportResult<ImportSummary> {
        let plan = self.plan(&geojson)?;
        self.apply(graph, plan)
    }

    fn plan(&self, geojson: &GeoJson) -> ImportResult<ImportPlan> {
        let radius = self.options.earth_radius_km;
        if !radius.is_finite() || radius <= 0.0 {
            return Err(ImportError::InvalidRadius(radius));
        }

        let collection = match geojson {
            GeoJson::FeatureCollection(collection) => collection,
            GeoJson::Feature(_) => return Err(ImportError::NotFeatureCollection("Feature")),
            GeoJson::Geometry(_) => return Err(ImportError::NotFeatureCollection("Geometry")),
        };

        let mut plan = ImportPlan::default();
        for (index, feature) in collection.features.iter().enumerate() {
            plan.summary.features += 1;

            let lines: Vec<&LineStringType> = match feature.geometry.as_ref().map(|g| &g.value) {
                Some(Value::LineString(line)) => vec![line],
                Some(Value::MultiLineString(lines)) => lines.iter().collect(),
                _ => {
                    debug!("Skipping feature {} without line geometry", index);
                    plan.summary.skipped_features += 1;
                    continue;
                }
            };

            let label = self.feature_label(feature);
            for line in lines {
                plan.summary.lines += 1;
                self.plan_line(index, line, label.as_deref(), &mut plan)?;
            }
        }

        plan.summary.segments = plan.segments.len();
        Ok(plan)
    }

    fn plan_line(
        &self,
        feature: usize,
        line: &LineStringType,
        label: Option<&str>,
        plan: &mut ImportPlan,
    ) -> ImportResult<()> {
        let mut previous: Option<Endpoint> = None;
        for (position, coordinates) in line.iter().enumerate() {
            let (lon, lat) = parse_position(coordinates)
                .ok_or(ImportError::InvalidPosition { feature, position })?;
            let endpoint = Endpoint {
                key: coordinate_key(lon, lat, self.options.coordinate_precision),
                lon,
                lat,
            };

            if let Some(from) = previous.take() {
                if from.key == endpoint.key {
                    plan.summary.degenerate_segments += 1;
                } else {
                    let weight = haversine_distance(
                        from.lon,
                        from.lat,
                        endpoint.lon,
                        endpoint.lat,
                        self.options.earth_radius_km,
                    );
                    // A huge radius can still overflow to infinity
                    if !weight.is_finite() {
                        return Err(GraphError::InvalidWeight(weight).into());
                    }
                    plan.segments.push(Segment {
                        from,
                        to: endpoint.clone(),
                        weight,
                        label: label.map(str::to_string),
                    });
                }
            }
            previous = Some(endpoint);
        }
        Ok(())
    }

    fn feature_label(&self, feature: &Feature) -> Option<String> {
        let key = self.options.name_property.as_deref()?;
        feature
            .properties
            .as_ref()?
            .get(key)?
            .as_str()
            .map(str::to_string)
    }

    fn apply(&self, graph: &mut GraphEngine, plan: ImportPlan) -> ImportResult<ImportSummary> {
        let ImportPlan {
            segments,
            mut summary,
        } = plan;

        for segment in segments {
            let (from, from_created) = resolve_node(graph, &segment.from);
            let (to, to_created) = resolve_node(graph, &segment.to);
            summary.nodes_created += usize::from(from_created) + usize::from(to_created);

            let (ab, ba) = graph.create_bidirectional_edge(
                from,
                to,
                segment.weight,
                self.options.edge_type.clone(),
            )?;
            summary.edges_created += 2;

            if let Some(label) = segment.label {
                for id in [ab, ba] {
                    if let Some(edge) = graph.edge_mut(id) {
                        edge.label = label.clone();
                    }
                }
            }
        }

        info!(
            "GeoJSON import: {} features, {} lines, {} nodes created, {} edges created",
            summary.features, summary.lines, summary.nodes_created, summary.edges_created
        );
        Ok(summary)
    }
}

/// `[lon, lat, ...]` with both components finite; extra components (altitude) are ignored.
fn parse_position(position: &[f64]) -> Option<(f64, f64)> {
    match position {
        [lon, lat, ..] if lon.is_finite() && lat.is_finite() => Some((*lon, *lat)),
        _ => None,
    }
}

/// Look up the node for an endpoint, creating it when absent.
fn resolve_node(graph: &mut GraphEngine, endpoint: &Endpoint) -> (NodeId, bool) {
    match graph.find_node_by_name(&endpoint.key) {
        Some(id) => (id, false),
        None => (
            graph.create_node_at(endpoint.key.clone(), endpoint.lon, endpoint.lat),
            true,
        ),
    }
}
