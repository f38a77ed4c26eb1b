//! Spherical Web Mercator (EPSG:3857) conversions.
//!
//! Geographic input is `(longitude, latitude)` in degrees, metric output is
//! `(x, y)` in meters. Area ratios only make sense after this step.

use geo::{BoundingRect, Coord, LineString, MapCoords, Point, Polygon};
use serde::Serialize;

pub const EARTH_RADIUS: f64 = 6_378_137.0;

/// Latitude where Web Mercator becomes a square world.
pub const MAX_LATITUDE: f64 = 85.051_128_78;

pub fn to_web_mercator(lon: f64, lat: f64) -> (f64, f64) {
    let lat = lat.clamp(-MAX_LATITUDE, MAX_LATITUDE);
    let x = EARTH_RADIUS * lon.to_radians();
    let y = EARTH_RADIUS * (std::f64::consts::FRAC_PI_4 + lat.to_radians() / 2.0).tan().ln();
    (x, y)
}

pub fn from_web_mercator(x: f64, y: f64) -> (f64, f64) {
    let lon = (x / EARTH_RADIUS).to_degrees();
    let lat = (2.0 * (y / EARTH_RADIUS).exp().atan() - std::f64::consts::FRAC_PI_2).to_degrees();
    (lon, lat)
}

pub fn project_point(point: Point<f64>) -> Point<f64> {
    let (x, y) = to_web_mercator(point.x(), point.y());
    Point::new(x, y)
}

pub fn project_polygon(polygon: &Polygon<f64>) -> Polygon<f64> {
    polygon.map_coords(|Coord { x, y }| {
        let (x, y) = to_web_mercator(x, y);
        Coord { x, y }
    })
}

/// Builds a closed polygon from a `(lon, lat)` ring and projects it.
pub fn project_ring(ring: &[(f64, f64)]) -> Polygon<f64> {
    let coords: Vec<(f64, f64)> = ring
        .iter()
        .map(|&(lon, lat)| to_web_mercator(lon, lat))
        .collect();
    Polygon::new(LineString::from(coords), vec![])
}

/// Axis-aligned rectangle in Web Mercator meters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Extent {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl Extent {
    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }

    pub fn expand(&self, margin: f64) -> Self {
        Self {
            min_x: self.min_x - margin,
            min_y: self.min_y - margin,
            max_x: self.max_x + margin,
            max_y: self.max_y + margin,
        }
    }

    /// Grows one axis around the center until `width / height == aspect`.
    pub fn fit_aspect(&self, aspect: f64) -> Self {
        let (cx, cy) = (
            (self.min_x + self.max_x) / 2.0,
            (self.min_y + self.max_y) / 2.0,
        );
        let mut width = self.width();
        let mut height = self.height();
        if width / height > aspect {
            height = width / aspect;
        } else {
            width = height * aspect;
        }
        Self {
            min_x: cx - width / 2.0,
            min_y: cy - height / 2.0,
            max_x: cx + width / 2.0,
            max_y: cy + height / 2.0,
        }
    }

    pub fn intersects(&self, other: &Extent) -> bool {
        self.min_x < other.max_x
            && self.max_x > other.min_x
            && self.min_y < other.max_y
            && self.max_y > other.min_y
    }
}

/// Total bounds of a set of polygons, `None` for an empty set.
pub fn total_bounds<'a, I>(polygons: I) -> Option<Extent>
where
    I: IntoIterator<Item = &'a Polygon<f64>>,
{
    let mut extent: Option<Extent> = None;
    for polygon in polygons {
        let Some(rect) = polygon.bounding_rect() else {
            continue;
        };
        let next = Extent {
            min_x: rect.min().x,
            min_y: rect.min().y,
            max_x: rect.max().x,
            max_y: rect.max().y,
        };
        extent = Some(match extent {
            None => next,
            Some(current) => Extent {
                min_x: current.min_x.min(next.min_x),
                min_y: current.min_y.min(next.min_y),
                max_x: current.max_x.max(next.max_x),
                max_y: current.max_y.max(next.max_y),
            },
        });
    }
    extent
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn origin_maps_to_origin() {
        let (x, y) = to_web_mercator(0.0, 0.0);
        assert!(x.abs() < 1e-9);
        assert!(y.abs() < 1e-9);
    }

    #[test]
    fn antimeridian_is_half_circumference() {
        let (x, _) = to_web_mercator(180.0, 0.0);
        assert!((x - 20_037_508.342_789_244).abs() < 1e-6);
    }

    #[test]
    fn round_trip_is_sub_meter() {
        let lon = 6.180_199_7;
        let lat = 52.274_274_4;
        let (x, y) = to_web_mercator(lon, lat);
        let (back_lon, back_lat) = from_web_mercator(x, y);
        let (x2, y2) = to_web_mercator(back_lon, back_lat);
        assert!((x - x2).abs() < 1e-3);
        assert!((y - y2).abs() < 1e-3);
        assert!((lon - back_lon).abs() < 1e-9);
        assert!((lat - back_lat).abs() < 1e-9);
    }

    #[test]
    fn latitude_is_clamped() {
        let (_, y_pole) = to_web_mercator(0.0, 90.0);
        let (_, y_max) = to_web_mercator(0.0, MAX_LATITUDE);
        assert_eq!(y_pole, y_max);
        assert!(y_pole.is_finite());
    }

    #[test]
    fn projected_ring_preserves_vertex_count() {
        let ring = [(6.0, 52.0), (6.1, 52.0), (6.1, 52.1), (6.0, 52.0)];
        let polygon = project_ring(&ring);
        assert_eq!(polygon.exterior().0.len(), 4);
        let first = polygon.exterior().0[0];
        let (x, y) = to_web_mercator(6.0, 52.0);
        assert!((first.x - x).abs() < 1e-9);
        assert!((first.y - y).abs() < 1e-9);
    }

    #[test]
    fn total_bounds_spans_all_polygons() {
        let a = Polygon::new(LineString::from(vec![(0.0, 0.0), (1.0, 0.0), (1.0, 1.0)]), vec![]);
        let b = Polygon::new(LineString::from(vec![(5.0, -2.0), (6.0, -2.0), (6.0, 3.0)]), vec![]);
        let extent = total_bounds([&a, &b]).expect("non-empty");
        assert_eq!(
            extent,
            Extent { min_x: 0.0, min_y: -2.0, max_x: 6.0, max_y: 3.0 }
        );
        assert_eq!(total_bounds(std::iter::empty::<&Polygon<f64>>()), None);
    }

    #[test]
    fn fit_aspect_keeps_center_and_contains_input() {
        let extent = Extent { min_x: 0.0, min_y: 0.0, max_x: 400.0, max_y: 100.0 };
        let fitted = extent.fit_aspect(2.0);
        assert!((fitted.width() / fitted.height() - 2.0).abs() < 1e-12);
        assert!((fitted.width() - 400.0).abs() < 1e-12);
        assert!((fitted.min_y - -50.0).abs() < 1e-12);

        let tall = extent.fit_aspect(8.0);
        assert!((tall.height() - 100.0).abs() < 1e-12);
        assert!((tall.min_x - -200.0).abs() < 1e-12);
    }
}
