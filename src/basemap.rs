//! Raster basemap tiles on the standard Web Mercator slippy-map grid.

use crate::config::BasemapConfig;
use crate::error::MapError;
use crate::projection::{EARTH_RADIUS, Extent};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// Half the Web Mercator world width in meters.
pub const ORIGIN_SHIFT: f64 = PI * EARTH_RADIUS;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TileProvider {
    pub name: String,
    /// Placeholders: `{s}`, `{z}`, `{x}`, `{y}`, `{r}`.
    pub url_template: String,
    pub subdomains: Vec<String>,
    pub attribution: String,
}

impl TileProvider {
    pub fn carto_positron() -> Self {
        Self {
            name: "CartoDB.Positron".to_string(),
            url_template: "https://{s}.basemaps.cartocdn.com/light_all/{z}/{x}/{y}{r}.png"
                .to_string(),
            subdomains: vec!["a".into(), "b".into(), "c".into(), "d".into()],
            attribution: "\u{a9} OpenStreetMap contributors \u{a9} CARTO".to_string(),
        }
    }

    pub fn tile_url(&self, tile: TileId) -> String {
        let subdomain = if self.subdomains.is_empty() {
            ""
        } else {
            let idx = (tile.x as usize + tile.y as usize) % self.subdomains.len();
            self.subdomains[idx].as_str()
        };
        self.url_template
            .replace("{s}", subdomain)
            .replace("{z}", &tile.z.to_string())
            .replace("{x}", &tile.x.to_string())
            .replace("{y}", &tile.y.to_string())
            .replace("{r}", "")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TileId {
    pub x: u32,
    pub y: u32,
    pub z: u8,
}

#[derive(Debug, Clone)]
pub struct Tile {
    pub id: TileId,
    pub bounds: Extent,
    pub png: Vec<u8>,
}

pub fn tile_size_m(zoom: u8) -> f64 {
    2.0 * ORIGIN_SHIFT / f64::from(1u32 << zoom)
}

/// Tile containing the metric point; clamped to the grid.
pub fn tile_for_mercator(x: f64, y: f64, zoom: u8) -> TileId {
    let n = 1u32 << zoom;
    let size = tile_size_m(zoom);
    let clamp = |v: f64| v.floor().clamp(0.0, f64::from(n - 1)) as u32;
    TileId {
        x: clamp((x + ORIGIN_SHIFT) / size),
        y: clamp((ORIGIN_SHIFT - y) / size),
        z: zoom,
    }
}

pub fn tile_bounds(tile: TileId) -> Extent {
    let size = tile_size_m(tile.z);
    let min_x = -ORIGIN_SHIFT + f64::from(tile.x) * size;
    let max_y = ORIGIN_SHIFT - f64::from(tile.y) * size;
    Extent {
        min_x,
        min_y: max_y - size,
        max_x: min_x + size,
        max_y,
    }
}

/// Row-major tiles covering `extent`, top row first.
pub fn tiles_covering(extent: &Extent, zoom: u8) -> Vec<TileId> {
    let top_left = tile_for_mercator(extent.min_x, extent.max_y, zoom);
    let bottom_right = tile_for_mercator(extent.max_x, extent.min_y, zoom);
    let mut tiles = Vec::new();
    for y in top_left.y..=bottom_right.y {
        for x in top_left.x..=bottom_right.x {
            tiles.push(TileId { x, y, z: zoom });
        }
    }
    tiles
}

#[cfg(feature = "basemap")]
pub fn fetch_tiles(config: &BasemapConfig, extent: &Extent) -> Result<Vec<Tile>, MapError> {
    use std::time::Duration;

    let ids = tiles_covering(extent, config.zoom);
    if ids.len() > config.max_tiles {
        return Err(MapError::TileLimit {
            requested: ids.len(),
            zoom: config.zoom,
            limit: config.max_tiles,
        });
    }
    log::info!(
        "Fetching {} {} tiles at zoom {}",
        ids.len(),
        config.provider.name,
        config.zoom
    );

    let client = reqwest::blocking::Client::builder()
        .timeout(Duration::from_secs(config.timeout_secs))
        .user_agent(config.user_agent.clone())
        .build()
        .map_err(|e| MapError::Basemap {
            url: config.provider.url_template.clone(),
            message: e.to_string(),
        })?;

    let mut tiles = Vec::with_capacity(ids.len());
    for id in ids {
        let url = config.provider.tile_url(id);
        log::debug!("GET {url}");
        let failed = |message: String| MapError::Basemap {
            url: url.clone(),
            message,
        };
        let response = client.get(&url).send().map_err(|e| failed(e.to_string()))?;
        if !response.status().is_success() {
            return Err(failed(format!("status {}", response.status())));
        }
        let png = response.bytes().map_err(|e| failed(e.to_string()))?.to_vec();
        tiles.push(Tile {
            id,
            bounds: tile_bounds(id),
            png,
        });
    }
    Ok(tiles)
}

#[cfg(not(feature = "basemap"))]
pub fn fetch_tiles(config: &BasemapConfig, _extent: &Extent) -> Result<Vec<Tile>, MapError> {
    Err(MapError::Basemap {
        url: config.provider.url_template.clone(),
        message: "built without the `basemap` feature".to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::projection::to_web_mercator;

    #[test]
    fn goat_farm_tile_at_zoom_14() {
        let (x, y) = to_web_mercator(6.1801997, 52.2742744);
        let tile = tile_for_mercator(x, y, 14);
        assert_eq!(tile, TileId { x: 8473, y: 5391, z: 14 });
        let bounds = tile_bounds(tile);
        assert!(bounds.min_x <= x && x < bounds.max_x);
        assert!(bounds.min_y < y && y <= bounds.max_y);
    }

    #[test]
    fn zoom_zero_is_one_tile() {
        let tile = tile_for_mercator(1_000.0, -5_000_000.0, 0);
        assert_eq!(tile, TileId { x: 0, y: 0, z: 0 });
        let bounds = tile_bounds(tile);
        assert!((bounds.min_x + ORIGIN_SHIFT).abs() < 1e-6);
        assert!((bounds.max_y - ORIGIN_SHIFT).abs() < 1e-6);
    }

    #[test]
    fn covering_small_extent() {
        let size = tile_size_m(14);
        let base = tile_bounds(TileId { x: 100, y: 200, z: 14 });
        let extent = Extent {
            min_x: base.min_x + size * 0.5,
            min_y: base.min_y - size * 0.5,
            max_x: base.max_x + size * 0.5,
            max_y: base.max_y - size * 0.5,
        };
        let tiles = tiles_covering(&extent, 14);
        assert_eq!(
            tiles,
            vec![
                TileId { x: 100, y: 200, z: 14 },
                TileId { x: 101, y: 200, z: 14 },
                TileId { x: 100, y: 201, z: 14 },
                TileId { x: 101, y: 201, z: 14 },
            ]
        );
    }

    #[test]
    fn url_template_expands() {
        let provider = TileProvider::carto_positron();
        let url = provider.tile_url(TileId { x: 8473, y: 5391, z: 14 });
        assert_eq!(url, "https://a.basemaps.cartocdn.com/light_all/14/8473/5391.png");
    }
}
