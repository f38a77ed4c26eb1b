//! Geographic content of the map: development regions, farms and the risk zone.

use crate::coverage::buffer_point;
use crate::error::MapError;
use crate::projection::{project_point, project_ring};
use geo::{Point, Polygon};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Region {
    pub name: String,
    /// Closed `(lon, lat)` ring.
    pub ring: Vec<(f64, f64)>,
    /// Palette name or hex color.
    pub color: String,
    /// `None` shares the legend entry of an earlier region with the same color.
    pub label: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MarkerKind {
    Primary,
    Other,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Marker {
    pub name: String,
    pub lon: f64,
    pub lat: f64,
    pub kind: MarkerKind,
    pub color: String,
    /// Marker area in pt^2.
    pub size: f32,
    pub edge_color: String,
    pub edge_width: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskZone {
    pub lon: f64,
    pub lat: f64,
    pub radius_m: f64,
    pub color: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Header {
    pub kicker: String,
    pub title: String,
    pub subtitle: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LegendText {
    pub title: String,
    pub zone: String,
    pub primary_marker: String,
    pub other_marker: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Scene {
    pub regions: Vec<Region>,
    pub markers: Vec<Marker>,
    pub risk_zone: RiskZone,
    pub header: Header,
    pub legend: LegendText,
}

impl Scene {
    /// Housing plans around the goat farm east of Deventer.
    pub fn deventer() -> Self {
        let regions = vec![
            Region {
                name: "400 woningen".to_string(),
                ring: vec![
                    (6.1672178, 52.2786201),
                    (6.1673895, 52.2777274),
                    (6.1659732, 52.2772547),
                    (6.1676469, 52.2754692),
                    (6.1698142, 52.2752329),
                    (6.1693636, 52.2743795),
                    (6.1722818, 52.2743926),
                    (6.173462, 52.2776617),
                    (6.1702219, 52.2783313),
                    (6.1672178, 52.2786201),
                ],
                color: "blauw".to_string(),
                label: Some("Reeds gebouwd (400)".to_string()),
            },
            Region {
                name: "800 woningen".to_string(),
                ring: vec![
                    (6.173462, 52.2776617),
                    (6.1763947, 52.277302),
                    (6.1776822, 52.2797701),
                    (6.1705368, 52.2807153),
                    (6.1703222, 52.2801509),
                    (6.1678117, 52.2804397),
                    (6.1671679, 52.2787068),
                    (6.1701505, 52.2784442),
                    (6.173462, 52.2776617),
                ],
                color: "roze".to_string(),
                label: Some("Wordt nu gebouwd (800)".to_string()),
            },
            Region {
                name: "1600 woningen".to_string(),
                ring: vec![
                    (6.17936, 52.2762582),
                    (6.1783729, 52.2739343),
                    (6.1967192, 52.2736454),
                    (6.1963759, 52.2754442),
                    (6.1973415, 52.276954),
                    (6.1911402, 52.2777417),
                    (6.1872993, 52.2771115),
                    (6.183158, 52.2762582),
                    (6.17936, 52.2762582),
                ],
                color: "geel".to_string(),
                label: Some("Nog te bouwen (1.640)".to_string()),
            },
            Region {
                name: "40 woningen".to_string(),
                ring: vec![
                    (6.1865383, 52.2710481),
                    (6.1868674, 52.2699887),
                    (6.1879484, 52.269978),
                    (6.1883829, 52.2704245),
                    (6.1883922, 52.2711852),
                    (6.1865383, 52.2710481),
                ],
                color: "geel".to_string(),
                label: None,
            },
        ];

        let farm = |name: &str, lon: f64, lat: f64| Marker {
            name: name.to_string(),
            lon,
            lat,
            kind: MarkerKind::Other,
            color: "dollargroen".to_string(),
            size: 200.0,
            edge_color: "#FFFFFF".to_string(),
            edge_width: 2.0,
        };

        let markers = vec![
            Marker {
                name: "geitenhouderij".to_string(),
                lon: 6.1801997,
                lat: 52.2742744,
                kind: MarkerKind::Primary,
                color: "rood".to_string(),
                size: 300.0,
                edge_color: "#FFFFFF".to_string(),
                edge_width: 2.0,
            },
            farm("varkens", 6.1886441, 52.2772935),
            farm("koeien", 6.192552, 52.2759297),
        ];

        Self {
            regions,
            markers,
            risk_zone: RiskZone {
                lon: 6.1801997,
                lat: 52.2742744,
                radius_m: 1000.0,
                color: "rood".to_string(),
            },
            header: Header {
                kicker: "FOLLOW THE MONEY".to_string(),
                title: "Woningen en geiten in Deventer".to_string(),
                subtitle: vec![
                    "Binnen 1 kilometer van deze geitenhouderij zijn al 400 woningen gebouwd."
                        .to_string(),
                    "Als drie andere bouwplannen doorgaan, komen daar nog 2.440 woningen bij."
                        .to_string(),
                ],
            },
            legend: LegendText {
                title: "LEGENDA".to_string(),
                zone: "1 km risicozone".to_string(),
                primary_marker: "Geitenhouderij".to_string(),
                other_marker: "Overige veehouderij".to_string(),
            },
        }
    }

    pub fn validate(&self) -> Result<(), MapError> {
        if self.regions.is_empty() {
            return Err(MapError::InvalidScene("no regions".to_string()));
        }
        for region in &self.regions {
            let mut distinct: Vec<(f64, f64)> = Vec::new();
            for vertex in &region.ring {
                if !vertex.0.is_finite() || !vertex.1.is_finite() {
                    return Err(MapError::InvalidScene(format!(
                        "region {:?} has a non-finite vertex",
                        region.name
                    )));
                }
                if !distinct.contains(vertex) {
                    distinct.push(*vertex);
                }
            }
            if distinct.len() < 3 {
                return Err(MapError::InvalidScene(format!(
                    "region {:?} needs at least three distinct vertices",
                    region.name
                )));
            }
        }
        let radius = self.risk_zone.radius_m;
        if !radius.is_finite() || radius <= 0.0 {
            return Err(MapError::InvalidScene(format!(
                "risk zone radius must be positive, got {radius}"
            )));
        }
        Ok(())
    }

    pub fn project(&self, quad_segments: usize) -> ProjectedScene {
        let regions = self
            .regions
            .iter()
            .map(|region| ProjectedRegion {
                name: region.name.clone(),
                polygon: project_ring(&region.ring),
            })
            .collect();
        let markers = self
            .markers
            .iter()
            .map(|marker| project_point(Point::new(marker.lon, marker.lat)))
            .collect();
        let center = project_point(Point::new(self.risk_zone.lon, self.risk_zone.lat));
        ProjectedScene {
            regions,
            markers,
            zone: buffer_point(center, self.risk_zone.radius_m, quad_segments),
        }
    }
}

impl Default for Scene {
    fn default() -> Self {
        Self::deventer()
    }
}

#[derive(Debug, Clone)]
pub struct ProjectedRegion {
    pub name: String,
    pub polygon: Polygon<f64>,
}

/// Scene geometry in Web Mercator meters. Indexes match the source `Scene`.
#[derive(Debug, Clone)]
pub struct ProjectedScene {
    pub regions: Vec<ProjectedRegion>,
    pub markers: Vec<Point<f64>>,
    pub zone: Polygon<f64>,
}

impl ProjectedScene {
    pub fn region_polygons(&self) -> impl Iterator<Item = (&str, &Polygon<f64>)> {
        self.regions
            .iter()
            .map(|region| (region.name.as_str(), &region.polygon))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deventer_scene_is_valid() {
        let scene = Scene::deventer();
        scene.validate().expect("valid scene");
        assert_eq!(scene.regions.len(), 4);
        assert_eq!(scene.markers.len(), 3);
        assert_eq!(
            scene
                .markers
                .iter()
                .filter(|m| m.kind == MarkerKind::Primary)
                .count(),
            1
        );
    }

    #[test]
    fn rejects_short_ring() {
        let mut scene = Scene::deventer();
        scene.regions[0].ring = vec![(6.0, 52.0), (6.1, 52.0), (6.0, 52.0)];
        let err = scene.validate().unwrap_err();
        assert!(matches!(err, MapError::InvalidScene(_)));
    }

    #[test]
    fn rejects_non_positive_radius() {
        let mut scene = Scene::deventer();
        scene.risk_zone.radius_m = 0.0;
        assert!(scene.validate().is_err());
    }

    #[test]
    fn projection_keeps_indexes() {
        let scene = Scene::deventer();
        let projected = scene.project(16);
        assert_eq!(projected.regions.len(), scene.regions.len());
        assert_eq!(projected.markers.len(), scene.markers.len());
        assert_eq!(projected.regions[2].name, "1600 woningen");
        assert_eq!(projected.zone.exterior().0.len(), 65);
    }

    #[test]
    fn scene_round_trips_through_json() {
        let scene = Scene::deventer();
        let json = serde_json::to_string(&scene).expect("serialize");
        let back: Scene = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back.regions[3].label, None);
        assert_eq!(back.markers[0].kind, MarkerKind::Primary);

        let value = serde_json::to_value(&scene).expect("value");
        assert!(value.get("riskZone").is_some());
        assert!(value["riskZone"].get("radiusM").is_some());
    }
}
