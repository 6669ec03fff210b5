//! Stored-location parsing.
//!
//! Collection members come back from storage with a loosely typed
//! `location`: a GeoJSON point, a `{lat, lng}` object, either of those as a
//! JSON string, or a WKT `POINT(lng lat)` string, optionally with an EWKT
//! `SRID=4326;` prefix. Members whose location cannot be read are dropped
//! before planning.

use serde::Deserialize;
use serde_json::Value;

use crate::model::Point;

/// A collection member as resolved from storage.
#[derive(Debug, Clone, Deserialize)]
pub struct CollectionMember {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub location: Value,
}

impl CollectionMember {
    pub fn to_point(&self) -> Option<Point> {
        let (lat, lng) = parse_location(&self.location)?;
        let point = Point::new(self.id.clone(), lat, lng);
        Some(match &self.name {
            Some(name) => point.with_metadata(serde_json::json!({ "name": name })),
            None => point,
        })
    }
}

/// Points for every member with a readable location, in input order.
pub fn located_points(members: &[CollectionMember]) -> Vec<Point> {
    members.iter().filter_map(CollectionMember::to_point).collect()
}

/// Reads a stored location into (lat, lng).
pub fn parse_location(value: &Value) -> Option<(f64, f64)> {
    match value {
        Value::Object(_) => parse_object(value),
        Value::String(text) => match serde_json::from_str::<Value>(text) {
            Ok(parsed) => parse_object(&parsed),
            Err(_) => parse_wkt_point(text),
        },
        _ => None,
    }
}

fn parse_object(value: &Value) -> Option<(f64, f64)> {
    if value.get("type").and_then(Value::as_str) == Some("Point") {
        let coordinates = value.get("coordinates")?.as_array()?;
        let lng = coordinates.first()?.as_f64()?;
        let lat = coordinates.get(1)?.as_f64()?;
        return finite(lat, lng);
    }

    let lat = value.get("lat")?.as_f64()?;
    let lng = value.get("lng")?.as_f64()?;
    finite(lat, lng)
}

/// Parses `POINT(lng lat)` anywhere in `text`, case-insensitive, tolerant
/// of extra spaces. Prefixes such as EWKT `SRID=4326;` are skipped.
fn parse_wkt_point(text: &str) -> Option<(f64, f64)> {
    let start = text.to_ascii_uppercase().find("POINT")?;
    let body = text[start + 5..].trim_start().strip_prefix('(')?;
    let body = &body[..body.find(')')?];
    let mut parts = body.split_whitespace();
    let lng = parts.next()?.parse::<f64>().ok()?;
    let lat = parts.next()?.parse::<f64>().ok()?;
    if parts.next().is_some() {
        return None;
    }
    finite(lat, lng)
}

fn finite(lat: f64, lng: f64) -> Option<(f64, f64)> {
    (lat.is_finite() && lng.is_finite()).then_some((lat, lng))
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_geojson_point() {
        let value = json!({"type": "Point", "coordinates": [2.1744, 41.4036]});
        assert_eq!(parse_location(&value), Some((41.4036, 2.1744)));
    }

    #[test]
    fn test_lat_lng_object() {
        let value = json!({"lat": 41.3916, "lng": 2.1649});
        assert_eq!(parse_location(&value), Some((41.3916, 2.1649)));
    }

    #[test]
    fn test_json_string() {
        let value = json!(r#"{"type":"Point","coordinates":[2.1619,41.3954]}"#);
        assert_eq!(parse_location(&value), Some((41.3954, 2.1619)));

        let value = json!(r#"{"lat":41.4145,"lng":2.1527}"#);
        assert_eq!(parse_location(&value), Some((41.4145, 2.1527)));
    }

    #[test]
    fn test_wkt_point() {
        assert_eq!(parse_location(&json!("POINT(2.174 41.3789)")), Some((41.3789, 2.174)));
        assert_eq!(parse_location(&json!("point ( -0.5  51.5 )")), Some((51.5, -0.5)));
        assert_eq!(parse_location(&json!("SRID=4326;POINT(1 2)")), Some((2.0, 1.0)));
    }

    #[test]
    fn test_ewkt_point() {
        let value = json!("SRID=4326;POINT(2.1744 41.4036)");
        assert_eq!(parse_location(&value), Some((41.4036, 2.1744)));
        assert_eq!(parse_location(&json!("srid=4326;point(2.1527 41.4145)")), Some((41.4145, 2.1527)));
        assert_eq!(parse_location(&json!("SRID=4326;POINT EMPTY")), None);
    }

    #[test]
    fn test_unreadable_locations() {
        assert_eq!(parse_location(&Value::Null), None);
        assert_eq!(parse_location(&json!(42)), None);
        assert_eq!(parse_location(&json!({"type": "Point", "coordinates": [1.0]})), None);
        assert_eq!(parse_location(&json!({"lat": "north", "lng": 2.0})), None);
        assert_eq!(parse_location(&json!("POINT(a b)")), None);
        assert_eq!(parse_location(&json!("")), None);
    }

    #[test]
    fn test_located_points_filters_and_keeps_order() {
        let members: Vec<CollectionMember> = serde_json::from_value(json!([
            {"id": "a", "name": "Casa Batllo", "location": {"lat": 41.3916, "lng": 2.1649}},
            {"id": "b", "location": null},
            {"id": "c", "location": "POINT(2.1527 41.4145)"}
        ]))
        .unwrap();

        let points = located_points(&members);
        let ids: Vec<&str> = points.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "c"]);
        assert_eq!(points[0].metadata, Some(json!({"name": "Casa Batllo"})));
        assert_eq!(points[1].metadata, None);
    }
}
