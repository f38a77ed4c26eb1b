//! Places every map element in figure coordinates.
//!
//! Figure units are points (1/72 in) with the origin at the top-left corner.
//! Metric map coordinates go through [`MapTransform`], which keeps both axes
//! at the same scale.

use crate::basemap::Tile;
use crate::config::{Config, LayoutConfig};
use crate::coverage::RegionCoverage;
use crate::error::MapError;
use crate::fonts::{resolve_installed, text_width};
use crate::projection::{Extent, total_bounds};
use crate::scene::{MarkerKind, ProjectedScene};
use crate::theme::Theme;
use geo::Polygon;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

#[derive(Debug, Clone, Copy)]
pub struct MapTransform {
    pub extent: Extent,
    pub viewport: Viewport,
}

impl MapTransform {
    pub fn to_screen(&self, x: f64, y: f64) -> (f32, f32) {
        let sx = (x - self.extent.min_x) / self.extent.width();
        let sy = (self.extent.max_y - y) / self.extent.height();
        (
            self.viewport.x + (sx as f32) * self.viewport.width,
            self.viewport.y + (sy as f32) * self.viewport.height,
        )
    }

    /// Figure points per metric meter.
    pub fn scale(&self) -> f32 {
        self.viewport.width / self.extent.width() as f32
    }

    fn ring(&self, polygon: &Polygon<f64>) -> Vec<(f32, f32)> {
        polygon
            .exterior()
            .coords()
            .map(|c| self.to_screen(c.x, c.y))
            .collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextAnchor {
    Start,
    Middle,
    End,
}

impl TextAnchor {
    pub fn as_svg(self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::Middle => "middle",
            Self::End => "end",
        }
    }
}

#[derive(Debug, Clone)]
pub struct TextItem {
    pub x: f32,
    /// Baseline.
    pub y: f32,
    pub text: String,
    pub size: f32,
    pub family: String,
    pub bold: bool,
    pub color: String,
    pub anchor: TextAnchor,
}

#[derive(Debug, Clone)]
pub struct RegionShape {
    pub name: String,
    pub points: Vec<(f32, f32)>,
    pub color: String,
}

#[derive(Debug, Clone)]
pub struct MarkerShape {
    pub x: f32,
    pub y: f32,
    pub radius: f32,
    pub fill: String,
    pub edge: String,
    pub edge_width: f32,
}

#[derive(Debug, Clone)]
pub struct ZoneShape {
    pub points: Vec<(f32, f32)>,
    pub color: String,
}

#[derive(Debug, Clone)]
pub struct TileImage {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub png: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum LegendSymbol {
    Swatch { color: String },
    DashedLine { color: String },
    Marker { color: String, edge: String },
}

#[derive(Debug, Clone)]
pub struct LegendEntry {
    pub symbol: LegendSymbol,
    /// Top-left of the symbol cell.
    pub x: f32,
    pub y: f32,
    pub label: TextItem,
}

#[derive(Debug, Clone)]
pub struct LegendLayout {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub background: String,
    /// Drop shadow offset in points, both axes.
    pub shadow_offset: f32,
    pub marker_radius: f32,
    pub title: TextItem,
    pub entries: Vec<LegendEntry>,
}

#[derive(Debug, Clone)]
pub struct MapLayout {
    pub width: f32,
    pub height: f32,
    pub background: String,
    pub transform: MapTransform,
    pub tiles: Vec<TileImage>,
    pub zone: ZoneShape,
    pub regions: Vec<RegionShape>,
    pub markers: Vec<MarkerShape>,
    pub coverage_labels: Vec<TextItem>,
    pub header: Vec<TextItem>,
    pub legend: LegendLayout,
    pub attribution: Option<TextItem>,
}

/// Font families after matching the theme preferences against installed fonts.
#[derive(Debug, Clone)]
pub struct ResolvedFonts {
    pub sans: String,
    pub mono: String,
}

impl ResolvedFonts {
    pub fn resolve(theme: &Theme) -> Self {
        Self {
            sans: resolve_installed(&theme.sans_families, &theme.sans_default),
            mono: resolve_installed(&theme.mono_families, &theme.mono_default),
        }
    }

    pub fn generic() -> Self {
        Self {
            sans: "sans-serif".to_string(),
            mono: "monospace".to_string(),
        }
    }
}

pub fn compute_viewport(config: &LayoutConfig) -> Viewport {
    let width = config.figure_width();
    let height = config.figure_height();
    Viewport {
        x: config.map_padding,
        y: config.header_height,
        width: (width - 2.0 * config.map_padding).max(1.0),
        height: (height - config.header_height - config.map_padding).max(1.0),
    }
}

/// Regions' total bounds plus the margin, widened to the viewport's aspect.
pub fn map_extent(
    projected: &ProjectedScene,
    config: &LayoutConfig,
    viewport: &Viewport,
) -> Result<Extent, MapError> {
    let bounds = total_bounds(projected.regions.iter().map(|r| &r.polygon))
        .ok_or(MapError::EmptyExtent)?;
    let padded = bounds.expand(config.margin_m);
    if padded.width() <= 0.0 || padded.height() <= 0.0 {
        return Err(MapError::EmptyExtent);
    }
    let aspect = f64::from(viewport.width) / f64::from(viewport.height);
    Ok(padded.fit_aspect(aspect))
}

pub fn compute_layout(
    config: &Config,
    projected: &ProjectedScene,
    coverage: &[RegionCoverage],
    tiles: &[Tile],
    fonts: &ResolvedFonts,
) -> Result<MapLayout, MapError> {
    let theme = &config.theme;
    let layout_cfg = &config.layout;
    let scene = &config.scene;

    let viewport = compute_viewport(layout_cfg);
    let extent = map_extent(projected, layout_cfg, &viewport)?;
    let transform = MapTransform { extent, viewport };
    log::debug!(
        "map extent {:.0}x{:.0} m at {:.4} pt/m",
        extent.width(),
        extent.height(),
        transform.scale()
    );

    let tiles: Vec<TileImage> = tiles
        .iter()
        .filter(|tile| tile.bounds.intersects(&extent))
        .map(|tile| {
            let (x0, y0) = transform.to_screen(tile.bounds.min_x, tile.bounds.max_y);
            let (x1, y1) = transform.to_screen(tile.bounds.max_x, tile.bounds.min_y);
            TileImage {
                x: x0,
                y: y0,
                width: x1 - x0,
                height: y1 - y0,
                png: tile.png.clone(),
            }
        })
        .collect();

    let regions = scene
        .regions
        .iter()
        .zip(&projected.regions)
        .map(|(region, shape)| RegionShape {
            name: region.name.clone(),
            points: transform.ring(&shape.polygon),
            color: theme.color(&region.color),
        })
        .collect();

    let zone = ZoneShape {
        points: transform.ring(&projected.zone),
        color: theme.color(&scene.risk_zone.color),
    };

    let markers = scene
        .markers
        .iter()
        .zip(&projected.markers)
        .map(|(marker, point)| {
            let (x, y) = transform.to_screen(point.x(), point.y());
            MarkerShape {
                x,
                y,
                radius: marker.size.max(0.0).sqrt() / 2.0,
                fill: theme.color(&marker.color),
                edge: theme.color(&marker.edge_color),
                edge_width: marker.edge_width,
            }
        })
        .collect();

    let coverage_labels = if layout_cfg.coverage_labels {
        coverage
            .iter()
            .map(|item| {
                let (x, y) = transform.to_screen(item.anchor.0, item.anchor.1);
                TextItem {
                    x,
                    y: y + theme.coverage_label_size * 0.35,
                    text: format_percentage(item.percentage, config.coverage.label_decimals),
                    size: theme.coverage_label_size,
                    family: fonts.sans.clone(),
                    bold: true,
                    color: theme.text_color.clone(),
                    anchor: TextAnchor::Middle,
                }
            })
            .collect()
    } else {
        Vec::new()
    };

    let header = header_items(config, fonts);
    let legend = legend_layout(config, &viewport, fonts);

    let attribution = if tiles.is_empty() {
        None
    } else {
        Some(TextItem {
            x: viewport.x + viewport.width - 4.0,
            y: viewport.y + viewport.height - 4.0,
            text: config.basemap.provider.attribution.clone(),
            size: 7.0,
            family: fonts.sans.clone(),
            bold: false,
            color: theme.muted_text_color.clone(),
            anchor: TextAnchor::End,
        })
    };

    Ok(MapLayout {
        width: layout_cfg.figure_width(),
        height: layout_cfg.figure_height(),
        background: config.render.background.clone(),
        transform,
        tiles,
        zone,
        regions,
        markers,
        coverage_labels,
        header,
        legend,
        attribution,
    })
}

pub fn format_percentage(percentage: f64, decimals: usize) -> String {
    format!("{percentage:.decimals$}%")
}

fn header_items(config: &Config, fonts: &ResolvedFonts) -> Vec<TextItem> {
    let theme = &config.theme;
    let layout = &config.layout;
    let header = &config.scene.header;
    let x = layout.header_x * layout.figure_width();
    let top = |fraction: f32, size: f32| fraction * layout.figure_height() + size * 0.8;

    let mut items = vec![
        TextItem {
            x,
            y: top(layout.kicker_y, theme.kicker_size),
            text: header.kicker.clone(),
            size: theme.kicker_size,
            family: fonts.mono.clone(),
            bold: true,
            color: theme.muted_text_color.clone(),
            anchor: TextAnchor::Start,
        },
        TextItem {
            x,
            y: top(layout.title_y, theme.title_size),
            text: header.title.clone(),
            size: theme.title_size,
            family: fonts.sans.clone(),
            bold: true,
            color: theme.text_color.clone(),
            anchor: TextAnchor::Start,
        },
    ];
    let first = top(layout.subtitle_y, theme.subtitle_size);
    let step = theme.subtitle_size * layout.label_line_height;
    for (idx, line) in header.subtitle.iter().enumerate() {
        items.push(TextItem {
            x,
            y: first + idx as f32 * step,
            text: line.clone(),
            size: theme.subtitle_size,
            family: fonts.sans.clone(),
            bold: false,
            color: theme.muted_text_color.clone(),
            anchor: TextAnchor::Start,
        });
    }
    items
}

/// Legend symbols and labels in display order.
pub fn legend_entries(config: &Config) -> Vec<(LegendSymbol, String)> {
    let theme = &config.theme;
    let scene = &config.scene;
    let mut entries: Vec<(LegendSymbol, String)> = Vec::new();

    for region in &scene.regions {
        let Some(label) = region.label.as_ref() else {
            continue;
        };
        if entries.iter().any(|(_, existing)| existing == label) {
            continue;
        }
        entries.push((
            LegendSymbol::Swatch {
                color: theme.color(&region.color),
            },
            label.clone(),
        ));
    }

    entries.push((
        LegendSymbol::DashedLine {
            color: theme.color(&scene.risk_zone.color),
        },
        scene.legend.zone.clone(),
    ));

    for (kind, label) in [
        (MarkerKind::Primary, &scene.legend.primary_marker),
        (MarkerKind::Other, &scene.legend.other_marker),
    ] {
        if let Some(marker) = scene.markers.iter().find(|m| m.kind == kind) {
            entries.push((
                LegendSymbol::Marker {
                    color: theme.color(&marker.color),
                    edge: theme.color(&marker.edge_color),
                },
                label.clone(),
            ));
        }
    }
    entries
}

fn legend_layout(config: &Config, viewport: &Viewport, fonts: &ResolvedFonts) -> LegendLayout {
    let theme = &config.theme;
    let cfg = &config.layout;
    let entries = legend_entries(config);

    let requested = cfg.legend_columns.max(1).min(entries.len().max(1));
    let rows = entries.len().div_ceil(requested).max(1);
    // Column-major filling can leave trailing columns empty.
    let columns = entries.len().div_ceil(rows).max(1);
    let row_height = theme.legend_size.max(cfg.legend_swatch_height) + cfg.legend_row_gap;
    let label_gap = 8.0;

    let mut column_widths = vec![0.0f32; columns];
    for (idx, (_, label)) in entries.iter().enumerate() {
        let col = idx / rows;
        let width = cfg.legend_swatch_width
            + label_gap
            + text_width(label, theme.legend_size, &fonts.sans, false);
        column_widths[col] = column_widths[col].max(width);
    }

    let title_width = text_width(
        &config.scene.legend.title,
        theme.legend_title_size,
        &fonts.sans,
        true,
    );
    let columns_width: f32 = column_widths.iter().sum::<f32>()
        + cfg.legend_column_gap * (columns.saturating_sub(1)) as f32;
    let width = columns_width.max(title_width) + 2.0 * cfg.legend_padding;
    let title_block = theme.legend_title_size * 1.6;
    let height = 2.0 * cfg.legend_padding + title_block + rows as f32 * row_height
        - cfg.legend_row_gap;

    let x = viewport.x + cfg.legend_inset;
    let y = viewport.y + viewport.height - cfg.legend_inset - height;

    let title = TextItem {
        x: x + width / 2.0,
        y: y + cfg.legend_padding + theme.legend_title_size * 0.8,
        text: config.scene.legend.title.clone(),
        size: theme.legend_title_size,
        family: fonts.sans.clone(),
        bold: true,
        color: theme.text_color.clone(),
        anchor: TextAnchor::Middle,
    };

    let rows_top = y + cfg.legend_padding + title_block;
    let mut column_x = Vec::with_capacity(columns);
    let mut cursor = x + cfg.legend_padding;
    for col_width in &column_widths {
        column_x.push(cursor);
        cursor += col_width + cfg.legend_column_gap;
    }

    let entries = entries
        .into_iter()
        .enumerate()
        .map(|(idx, (symbol, label))| {
            let col = idx / rows;
            let row = idx % rows;
            let cell_x = column_x[col];
            let cell_y = rows_top + row as f32 * row_height;
            let cell_h = row_height - cfg.legend_row_gap;
            LegendEntry {
                symbol,
                x: cell_x,
                y: cell_y,
                label: TextItem {
                    x: cell_x + cfg.legend_swatch_width + label_gap,
                    y: cell_y + cell_h / 2.0 + theme.legend_size * 0.35,
                    text: label,
                    size: theme.legend_size,
                    family: fonts.sans.clone(),
                    bold: false,
                    color: theme.text_color.clone(),
                    anchor: TextAnchor::Start,
                },
            }
        })
        .collect();

    LegendLayout {
        x,
        y,
        width,
        height,
        background: theme.color(&theme.legend_background),
        shadow_offset: cfg.legend_shadow_offset,
        marker_radius: cfg.legend_marker_size / 2.0,
        title,
        entries,
    }
}
