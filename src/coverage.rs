//! Risk-zone coverage: how much of each region falls inside the zone circle.
//!
//! All inputs are planar polygons in the same metric projection.

use geo::{Area, BooleanOps, Centroid, Contains, LineString, Point, Polygon};
use serde::Serialize;
use std::f64::consts::PI;

/// Coverage of one region by the risk zone.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Coverage {
    /// Share of the region's area inside the zone, 0..=100.
    pub percentage: f64,
    /// Centroid of the intersection, where the label goes.
    pub anchor: (f64, f64),
}

/// A [`Coverage`] tagged with the region it was computed for.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegionCoverage {
    pub name: String,
    pub percentage: f64,
    pub anchor: (f64, f64),
}

/// Approximates a circle with `4 * quad_segments` segments, counter-clockwise.
pub fn buffer_point(center: Point<f64>, radius: f64, quad_segments: usize) -> Polygon<f64> {
    let n = quad_segments.max(1) * 4;
    let r = radius.abs();
    let mut coords = Vec::with_capacity(n + 1);
    for i in 0..n {
        let angle = 2.0 * PI * i as f64 / n as f64;
        coords.push((center.x() + r * angle.cos(), center.y() + r * angle.sin()));
    }
    coords.push(coords[0]);
    Polygon::new(LineString::from(coords), vec![])
}

/// Returns `None` when the overlap is empty or has zero area, so callers
/// never draw a "0%" label for a region that merely touches the zone.
pub fn compute_coverage(region: &Polygon<f64>, zone: &Polygon<f64>) -> Option<Coverage> {
    let region_area = region.unsigned_area();
    if region_area <= 0.0 {
        return None;
    }

    if zone.contains(region) {
        let anchor = region.centroid()?;
        return Some(Coverage {
            percentage: 100.0,
            anchor: (anchor.x(), anchor.y()),
        });
    }

    let (overlap_area, anchor) = if region.contains(zone) {
        (zone.unsigned_area(), zone.centroid()?)
    } else {
        let overlap = region.intersection(zone);
        if overlap.0.is_empty() {
            return None;
        }
        (overlap.unsigned_area(), overlap.centroid()?)
    };
    if overlap_area == 0.0 {
        return None;
    }

    Some(Coverage {
        percentage: (overlap_area / region_area * 100.0).clamp(0.0, 100.0),
        anchor: (anchor.x(), anchor.y()),
    })
}

/// Coverage for each named region, in input order; misses are left out.
pub fn annotate<'a, I>(regions: I, zone: &Polygon<f64>) -> Vec<RegionCoverage>
where
    I: IntoIterator<Item = (&'a str, &'a Polygon<f64>)>,
{
    let mut out = Vec::new();
    for (name, polygon) in regions {
        match compute_coverage(polygon, zone) {
            Some(coverage) => {
                log::debug!("{name}: {:.2}% inside risk zone", coverage.percentage);
                out.push(RegionCoverage {
                    name: name.to_string(),
                    percentage: coverage.percentage,
                    anchor: coverage.anchor,
                });
            }
            None => log::debug!("{name}: outside risk zone"),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::polygon;

    fn square(x0: f64, y0: f64, size: f64) -> Polygon<f64> {
        polygon![
            (x: x0, y: y0),
            (x: x0 + size, y: y0),
            (x: x0 + size, y: y0 + size),
            (x: x0, y: y0 + size),
        ]
    }

    #[test]
    fn enclosed_region_is_fully_covered() {
        let zone = buffer_point(Point::new(0.0, 0.0), 1.0, 16);
        let region = square(-0.5, -0.5, 1.0);
        let coverage = compute_coverage(&region, &zone).expect("covered");
        assert!((coverage.percentage - 100.0).abs() < 1e-6);
        assert!(coverage.anchor.0.abs() < 1e-9);
        assert!(coverage.anchor.1.abs() < 1e-9);
    }

    #[test]
    fn disjoint_region_has_no_result() {
        let zone = buffer_point(Point::new(0.0, 0.0), 1.0, 16);
        let region = square(10.0, 10.0, 2.0);
        assert_eq!(compute_coverage(&region, &zone), None);
    }

    #[test]
    fn touching_region_has_no_result() {
        // The circle has a vertex at (1, 0); the square's left edge passes through it.
        let zone = buffer_point(Point::new(0.0, 0.0), 1.0, 16);
        let region = square(1.0, -1.0, 2.0);
        assert_eq!(compute_coverage(&region, &zone), None);
    }

    #[test]
    fn square_circumscribing_circle() {
        let zone = buffer_point(Point::new(1.0, 1.0), 1.0, 16);
        let region = square(0.0, 0.0, 2.0);
        let coverage = compute_coverage(&region, &zone).expect("overlap");
        let expected = zone.unsigned_area() / 4.0 * 100.0;
        assert!((coverage.percentage - expected).abs() < 1e-6);
        assert!((coverage.percentage - 78.54).abs() < 0.2);
        assert!((coverage.anchor.0 - 1.0).abs() < 1e-6);
        assert!((coverage.anchor.1 - 1.0).abs() < 1e-6);
    }

    #[test]
    fn partial_overlap_is_translation_invariant() {
        let zone = buffer_point(Point::new(0.0, 0.0), 1.0, 16);
        let region = square(0.0, 0.0, 2.0);
        let base = compute_coverage(&region, &zone).expect("overlap");
        assert!(base.percentage > 0.0 && base.percentage < 100.0);

        let (dx, dy) = (684_000.0, 6_849_000.0);
        let moved_zone = buffer_point(Point::new(dx, dy), 1.0, 16);
        let moved_region = square(dx, dy, 2.0);
        let moved = compute_coverage(&moved_region, &moved_zone).expect("overlap");
        assert!((base.percentage - moved.percentage).abs() < 1e-3);
        assert!((base.anchor.0 + dx - moved.anchor.0).abs() < 1e-3);
    }

    #[test]
    fn quarter_overlap_anchor_sits_in_quadrant() {
        let zone = buffer_point(Point::new(0.0, 0.0), 1.0, 16);
        let region = square(0.0, 0.0, 2.0);
        let coverage = compute_coverage(&region, &zone).expect("overlap");
        // A quarter disc inside a 2x2 square: about pi/16 of the square.
        assert!((coverage.percentage - 100.0 * PI / 16.0).abs() < 0.2);
        assert!(coverage.anchor.0 > 0.0 && coverage.anchor.0 < 1.0);
        assert!(coverage.anchor.1 > 0.0 && coverage.anchor.1 < 1.0);
    }

    #[test]
    fn degenerate_region_has_no_result() {
        let zone = buffer_point(Point::new(0.0, 0.0), 1.0, 16);
        let line = polygon![(x: 0.0, y: 0.0), (x: 0.5, y: 0.0), (x: 0.25, y: 0.0)];
        assert_eq!(compute_coverage(&line, &zone), None);
    }

    #[test]
    fn buffer_has_expected_vertex_count() {
        let circle = buffer_point(Point::new(3.0, 4.0), 2.0, 16);
        assert_eq!(circle.exterior().0.len(), 65);
        let area = circle.signed_area();
        assert!(area > 0.0);
        assert!((area - PI * 4.0).abs() < 0.05);
    }

    #[test]
    fn annotate_keeps_order_and_skips_misses() {
        let zone = buffer_point(Point::new(0.0, 0.0), 1.0, 16);
        let inside = square(-0.25, -0.25, 0.5);
        let outside = square(5.0, 5.0, 1.0);
        let partial = square(0.0, 0.0, 2.0);
        let results = annotate(
            [("inside", &inside), ("outside", &outside), ("partial", &partial)],
            &zone,
        );
        let names: Vec<&str> = results.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["inside", "partial"]);
    }
}
