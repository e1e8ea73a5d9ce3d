//! Geographic helpers and the GeoJSON line importer
//!
//! - Great-circle (haversine) distance between lon/lat points
//! - Deterministic node identifiers derived from rounded coordinates

pub mod import;

pub use import::{GeoJsonImporter, ImportError, ImportOptions, ImportResult, ImportSummary};

/// Mean Earth radius in kilometres
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Decimal digits kept per coordinate component in node identifiers (~0.1 m)
pub const DEFAULT_COORDINATE_PRECISION: usize = 6;

/// Great-circle distance between two lon/lat points (degrees), in the unit of `radius`.
pub fn haversine_distance(lon1: f64, lat1: f64, lon2: f64, lat2: f64, radius: f64) -> f64 {
    let d_lat = (lat2 - lat1).to_radians();
    let d_lon = (lon2 - lon1).to_radians();
    let a = (d_lat / 2.0).sin().powi(2)
        + lat1.to_radians().cos() * lat2.to_radians().cos() * (d_lon / 2.0).sin().powi(2);
    // Rounding can push `a` just past 1 for near-antipodal points
    let a = a.clamp(0.0, 1.0);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());
    radius * c
}

/// Haversine distance in kilometres on a sphere of [`EARTH_RADIUS_KM`]
pub fn haversine_km(lon1: f64, lat1: f64, lon2: f64, lat2: f64) -> f64 {
    haversine_distance(lon1, lat1, lon2, lat2, EARTH_RADIUS_KM)
}

/// Node identifier for a coordinate: `"<lon>,<lat>"` with `precision` decimals.
///
/// Points that round to the same digits share an identifier, which is how
/// consecutive line segments end up sharing endpoint nodes.
pub fn coordinate_key(lon: f64, lat: f64, precision: usize) -> String {
    format!(
        "{},{}",
        format_component(lon, precision),
        format_component(lat, precision)
    )
}

fn format_component(value: f64, precision: usize) -> String {
    let formatted = format!("{:.*}", precision, value);
    // "-0.000000" and "0.000000" must coalesce
    match formatted.strip_prefix('-') {
        Some(digits) if digits.bytes().all(|b| b == b'0' || b == b'.') => digits.to_string(),
        _ => formatted,
    }
}
