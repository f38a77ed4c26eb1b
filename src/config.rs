use crate::basemap::TileProvider;
use crate::error::MapError;
use crate::scene::Scene;
use crate::theme::Theme;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayoutConfig {
    pub figure_width_in: f32,
    pub figure_height_in: f32,
    /// Height of the header band above the map, in points.
    pub header_height: f32,
    /// Horizontal header offset as a fraction of the figure width.
    pub header_x: f32,
    /// Baseline offsets from the top, as fractions of the figure height.
    pub kicker_y: f32,
    pub title_y: f32,
    pub subtitle_y: f32,
    pub label_line_height: f32,
    pub map_padding: f32,
    /// Extra meters around the regions' bounding box.
    pub margin_m: f64,
    pub legend_columns: usize,
    pub legend_inset: f32,
    pub legend_padding: f32,
    pub legend_row_gap: f32,
    pub legend_column_gap: f32,
    pub legend_swatch_width: f32,
    pub legend_swatch_height: f32,
    pub legend_marker_size: f32,
    pub legend_shadow_offset: f32,
    pub coverage_labels: bool,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            figure_width_in: 16.0,
            figure_height_in: 12.0,
            header_height: 110.0,
            header_x: 0.02,
            kicker_y: 0.02,
            title_y: 0.05,
            subtitle_y: 0.075,
            label_line_height: 1.3,
            map_padding: 18.0,
            margin_m: 500.0,
            legend_columns: 1,
            legend_inset: 14.0,
            legend_padding: 10.0,
            legend_row_gap: 6.0,
            legend_column_gap: 18.0,
            legend_swatch_width: 22.0,
            legend_swatch_height: 11.0,
            legend_marker_size: 10.0,
            legend_shadow_offset: 2.5,
            coverage_labels: true,
        }
    }
}

impl LayoutConfig {
    pub fn figure_width(&self) -> f32 {
        self.figure_width_in * 72.0
    }

    pub fn figure_height(&self) -> f32 {
        self.figure_height_in * 72.0
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StyleConfig {
    pub region_fill_opacity: f32,
    pub region_stroke_width: f32,
    pub zone_fill_opacity: f32,
    pub zone_stroke_width: f32,
    pub zone_stroke_opacity: f32,
    pub zone_dasharray: String,
    pub legend_swatch_opacity: f32,
}

impl Default for StyleConfig {
    fn default() -> Self {
        Self {
            region_fill_opacity: 0.25,
            region_stroke_width: 3.0,
            zone_fill_opacity: 0.04,
            zone_stroke_width: 2.5,
            zone_stroke_opacity: 0.8,
            // 12/8 point dashes scaled by the line width.
            zone_dasharray: "30 20".to_string(),
            legend_swatch_opacity: 0.4,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderConfig {
    pub dpi: f32,
    pub background: String,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            dpi: 300.0,
            background: "#F5F1ED".to_string(),
        }
    }
}

impl RenderConfig {
    pub fn scale(&self) -> f32 {
        self.dpi / 72.0
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BasemapConfig {
    pub enabled: bool,
    pub provider: TileProvider,
    pub zoom: u8,
    pub max_tiles: usize,
    pub timeout_secs: u64,
    pub user_agent: String,
}

impl Default for BasemapConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            provider: TileProvider::carto_positron(),
            zoom: 14,
            max_tiles: 256,
            timeout_secs: 30,
            user_agent: concat!("goatmap/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoverageConfig {
    /// Circle segments per quarter turn.
    pub quad_segments: usize,
    pub label_decimals: usize,
}

impl Default for CoverageConfig {
    fn default() -> Self {
        Self {
            quad_segments: 16,
            label_decimals: 0,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub theme: Theme,
    pub layout: LayoutConfig,
    pub style: StyleConfig,
    pub render: RenderConfig,
    pub basemap: BasemapConfig,
    pub coverage: CoverageConfig,
    pub scene: Scene,
}

impl Default for Config {
    fn default() -> Self {
        let theme = Theme::editorial();
        let render = RenderConfig {
            background: theme.background.clone(),
            ..Default::default()
        };
        Self {
            theme,
            layout: LayoutConfig::default(),
            style: StyleConfig::default(),
            render,
            basemap: BasemapConfig::default(),
            coverage: CoverageConfig::default(),
            scene: Scene::deventer(),
        }
    }
}

impl Config {
    pub fn validate(&self) -> Result<(), MapError> {
        let layout = &self.layout;
        if layout.figure_width_in <= 0.0 || layout.figure_height_in <= 0.0 {
            return Err(MapError::InvalidConfig(format!(
                "figure size must be positive, got {}x{} in",
                layout.figure_width_in, layout.figure_height_in
            )));
        }
        if layout.header_height < 0.0 || layout.header_height >= layout.figure_height() {
            return Err(MapError::InvalidConfig(format!(
                "header height {} does not fit a {} pt figure",
                layout.header_height,
                layout.figure_height()
            )));
        }
        if layout.legend_columns == 0 {
            return Err(MapError::InvalidConfig(
                "legend needs at least one column".to_string(),
            ));
        }
        if layout.margin_m.is_nan() || layout.margin_m < 0.0 {
            return Err(MapError::InvalidConfig(format!(
                "margin must be non-negative, got {}",
                layout.margin_m
            )));
        }
        if self.render.dpi.is_nan() || self.render.dpi <= 0.0 {
            return Err(MapError::InvalidConfig(format!(
                "dpi must be positive, got {}",
                self.render.dpi
            )));
        }
        if self.basemap.zoom > 19 {
            return Err(MapError::InvalidConfig(format!(
                "basemap zoom must be 0..=19, got {}",
                self.basemap.zoom
            )));
        }
        if self.coverage.quad_segments == 0 {
            return Err(MapError::InvalidConfig(
                "quad_segments must be at least 1".to_string(),
            ));
        }
        self.scene.validate()
    }
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct PaletteFile {
    blauw: Option<String>,
    roze: Option<String>,
    geel: Option<String>,
    rood: Option<String>,
    zwart: Option<String>,
    dollargroen: Option<String>,
    offwhite: Option<String>,
    zilver: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct ThemeFile {
    palette: Option<PaletteFile>,
    sans_families: Option<Vec<String>>,
    mono_families: Option<Vec<String>>,
    kicker_size: Option<f32>,
    title_size: Option<f32>,
    subtitle_size: Option<f32>,
    legend_size: Option<f32>,
    legend_title_size: Option<f32>,
    coverage_label_size: Option<f32>,
    background: Option<String>,
    text_color: Option<String>,
    muted_text_color: Option<String>,
    legend_background: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct LayoutConfigFile {
    figure_width_in: Option<f32>,
    figure_height_in: Option<f32>,
    header_height: Option<f32>,
    header_x: Option<f32>,
    kicker_y: Option<f32>,
    title_y: Option<f32>,
    subtitle_y: Option<f32>,
    label_line_height: Option<f32>,
    map_padding: Option<f32>,
    margin_m: Option<f64>,
    legend_columns: Option<usize>,
    legend_inset: Option<f32>,
    legend_padding: Option<f32>,
    legend_row_gap: Option<f32>,
    legend_column_gap: Option<f32>,
    legend_swatch_width: Option<f32>,
    legend_swatch_height: Option<f32>,
    legend_marker_size: Option<f32>,
    legend_shadow_offset: Option<f32>,
    coverage_labels: Option<bool>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct StyleConfigFile {
    region_fill_opacity: Option<f32>,
    region_stroke_width: Option<f32>,
    zone_fill_opacity: Option<f32>,
    zone_stroke_width: Option<f32>,
    zone_stroke_opacity: Option<f32>,
    zone_dasharray: Option<String>,
    legend_swatch_opacity: Option<f32>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct RenderConfigFile {
    dpi: Option<f32>,
    background: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct BasemapConfigFile {
    enabled: Option<bool>,
    provider: Option<TileProvider>,
    zoom: Option<u8>,
    max_tiles: Option<usize>,
    timeout_secs: Option<u64>,
    user_agent: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct CoverageConfigFile {
    quad_segments: Option<usize>,
    label_decimals: Option<usize>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct ConfigFile {
    theme: Option<ThemeFile>,
    layout: Option<LayoutConfigFile>,
    style: Option<StyleConfigFile>,
    render: Option<RenderConfigFile>,
    basemap: Option<BasemapConfigFile>,
    coverage: Option<CoverageConfigFile>,
    scene: Option<Scene>,
}

pub fn load_config(path: Option<&Path>) -> anyhow::Result<Config> {
    let Some(path) = path else {
        return Ok(Config::default());
    };
    let contents = std::fs::read_to_string(path)?;
    let config = parse_config(&contents)?;
    log::info!("Loaded config from {}", path.display());
    Ok(config)
}

pub fn parse_config(contents: &str) -> anyhow::Result<Config> {
    let mut config = Config::default();
    let parsed: ConfigFile = serde_json::from_str(contents)?;

    if let Some(theme) = parsed.theme {
        apply_theme(&mut config, theme);
    }

    if let Some(layout) = parsed.layout {
        let cfg = &mut config.layout;
        if let Some(v) = layout.figure_width_in {
            cfg.figure_width_in = v;
        }
        if let Some(v) = layout.figure_height_in {
            cfg.figure_height_in = v;
        }
        if let Some(v) = layout.header_height {
            cfg.header_height = v;
        }
        if let Some(v) = layout.header_x {
            cfg.header_x = v;
        }
        if let Some(v) = layout.kicker_y {
            cfg.kicker_y = v;
        }
        if let Some(v) = layout.title_y {
            cfg.title_y = v;
        }
        if let Some(v) = layout.subtitle_y {
            cfg.subtitle_y = v;
        }
        if let Some(v) = layout.label_line_height {
            cfg.label_line_height = v;
        }
        if let Some(v) = layout.map_padding {
            cfg.map_padding = v;
        }
        if let Some(v) = layout.margin_m {
            cfg.margin_m = v;
        }
        if let Some(v) = layout.legend_columns {
            cfg.legend_columns = v;
        }
        if let Some(v) = layout.legend_inset {
            cfg.legend_inset = v;
        }
        if let Some(v) = layout.legend_padding {
            cfg.legend_padding = v;
        }
        if let Some(v) = layout.legend_row_gap {
            cfg.legend_row_gap = v;
        }
        if let Some(v) = layout.legend_column_gap {
            cfg.legend_column_gap = v;
        }
        if let Some(v) = layout.legend_swatch_width {
            cfg.legend_swatch_width = v;
        }
        if let Some(v) = layout.legend_swatch_height {
            cfg.legend_swatch_height = v;
        }
        if let Some(v) = layout.legend_marker_size {
            cfg.legend_marker_size = v;
        }
        if let Some(v) = layout.legend_shadow_offset {
            cfg.legend_shadow_offset = v;
        }
        if let Some(v) = layout.coverage_labels {
            cfg.coverage_labels = v;
        }
    }

    if let Some(style) = parsed.style {
        let cfg = &mut config.style;
        if let Some(v) = style.region_fill_opacity {
            cfg.region_fill_opacity = v;
        }
        if let Some(v) = style.region_stroke_width {
            cfg.region_stroke_width = v;
        }
        if let Some(v) = style.zone_fill_opacity {
            cfg.zone_fill_opacity = v;
        }
        if let Some(v) = style.zone_stroke_width {
            cfg.zone_stroke_width = v;
        }
        if let Some(v) = style.zone_stroke_opacity {
            cfg.zone_stroke_opacity = v;
        }
        if let Some(v) = style.zone_dasharray {
            cfg.zone_dasharray = v;
        }
        if let Some(v) = style.legend_swatch_opacity {
            cfg.legend_swatch_opacity = v;
        }
    }

    if let Some(render) = parsed.render {
        if let Some(v) = render.dpi {
            config.render.dpi = v;
        }
        if let Some(v) = render.background {
            config.render.background = v;
        }
    }

    if let Some(basemap) = parsed.basemap {
        let cfg = &mut config.basemap;
        if let Some(v) = basemap.enabled {
            cfg.enabled = v;
        }
        if let Some(v) = basemap.provider {
            cfg.provider = v;
        }
        if let Some(v) = basemap.zoom {
            cfg.zoom = v;
        }
        if let Some(v) = basemap.max_tiles {
            cfg.max_tiles = v;
        }
        if let Some(v) = basemap.timeout_secs {
            cfg.timeout_secs = v;
        }
        if let Some(v) = basemap.user_agent {
            cfg.user_agent = v;
        }
    }

    if let Some(coverage) = parsed.coverage {
        if let Some(v) = coverage.quad_segments {
            config.coverage.quad_segments = v;
        }
        if let Some(v) = coverage.label_decimals {
            config.coverage.label_decimals = v;
        }
    }

    if let Some(scene) = parsed.scene {
        config.scene = scene;
    }

    config.validate()?;
    Ok(config)
}

fn apply_theme(config: &mut Config, theme: ThemeFile) {
    let cfg = &mut config.theme;
    if let Some(palette) = theme.palette {
        let p = &mut cfg.palette;
        if let Some(v) = palette.blauw {
            p.blauw = v;
        }
        if let Some(v) = palette.roze {
            p.roze = v;
        }
        if let Some(v) = palette.geel {
            p.geel = v;
        }
        if let Some(v) = palette.rood {
            p.rood = v;
        }
        if let Some(v) = palette.zwart {
            p.zwart = v;
        }
        if let Some(v) = palette.dollargroen {
            p.dollargroen = v;
        }
        if let Some(v) = palette.offwhite {
            p.offwhite = v;
        }
        if let Some(v) = palette.zilver {
            p.zilver = v;
        }
    }
    if let Some(v) = theme.sans_families {
        cfg.sans_families = v;
    }
    if let Some(v) = theme.mono_families {
        cfg.mono_families = v;
    }
    if let Some(v) = theme.kicker_size {
        cfg.kicker_size = v;
    }
    if let Some(v) = theme.title_size {
        cfg.title_size = v;
    }
    if let Some(v) = theme.subtitle_size {
        cfg.subtitle_size = v;
    }
    if let Some(v) = theme.legend_size {
        cfg.legend_size = v;
    }
    if let Some(v) = theme.legend_title_size {
        cfg.legend_title_size = v;
    }
    if let Some(v) = theme.coverage_label_size {
        cfg.coverage_label_size = v;
    }
    if let Some(v) = theme.text_color {
        cfg.text_color = v;
    }
    if let Some(v) = theme.muted_text_color {
        cfg.muted_text_color = v;
    }
    if let Some(v) = theme.legend_background {
        cfg.legend_background = v;
    }
    if let Some(v) = theme.background {
        config.render.background = v.clone();
        cfg.background = v;
    }
}
