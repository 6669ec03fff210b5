//! Barcelona architecture landmarks for realistic test fixtures.
//!
//! Coordinates are approximate building locations.

use itinerary_planner::model::Point;

/// A named location with coordinates.
#[derive(Debug, Clone)]
pub struct Landmark {
    pub id: &'static str,
    pub name: &'static str,
    pub lat: f64,
    pub lng: f64,
}

impl Landmark {
    pub const fn new(id: &'static str, name: &'static str, lat: f64, lng: f64) -> Self {
        Self { id, name, lat, lng }
    }

    pub fn point(&self) -> Point {
        Point::new(self.id, self.lat, self.lng)
            .with_metadata(serde_json::json!({ "name": self.name }))
    }
}

// ============================================================================
// Eixample / Gràcia (north of Plaça de Catalunya)
// ============================================================================

pub const EIXAMPLE: &[Landmark] = &[
    Landmark::new("sagrada-familia", "Sagrada Família", 41.4036, 2.1744),
    Landmark::new("casa-batllo", "Casa Batlló", 41.3916, 2.1649),
    Landmark::new("casa-mila", "Casa Milà", 41.3954, 2.1619),
    Landmark::new("sant-pau", "Hospital de Sant Pau", 41.4115, 2.1744),
    Landmark::new("park-guell", "Park Güell", 41.4145, 2.1527),
    Landmark::new("casa-vicens", "Casa Vicens", 41.4035, 2.1508),
    Landmark::new("torre-glories", "Torre Glòries", 41.4034, 2.1894),
];

// ============================================================================
// Ciutat Vella / Montjuïc (south of Plaça de Catalunya)
// ============================================================================

pub const OLD_TOWN: &[Landmark] = &[
    Landmark::new("palau-guell", "Palau Güell", 41.3789, 2.1740),
    Landmark::new("macba", "MACBA", 41.3830, 2.1668),
    Landmark::new("palau-musica", "Palau de la Música Catalana", 41.3875, 2.1753),
    Landmark::new("santa-maria-del-mar", "Santa Maria del Mar", 41.3838, 2.1820),
    Landmark::new("barcelona-pavilion", "Barcelona Pavilion", 41.3705, 2.1501),
    Landmark::new("fundacio-miro", "Fundació Joan Miró", 41.3686, 2.1600),
];

pub fn all_points() -> Vec<Point> {
    EIXAMPLE.iter().chain(OLD_TOWN.iter()).map(Landmark::point).collect()
}
