use crate::basemap::fetch_tiles;
use crate::config::{Config, load_config};
use crate::coverage::{RegionCoverage, annotate};
use crate::layout::{ResolvedFonts, compute_layout, compute_viewport, map_extent};
use crate::render::{render_svg, write_output_png, write_output_svg};
use anyhow::Result;
use clap::{Parser, ValueEnum};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "goatmap", version, about = "Render the goat-farm risk-zone map")]
pub struct Args {
    /// Output file (svg/png)
    #[arg(short = 'o', long = "output", default_value = "map_visualization.png")]
    pub output: PathBuf,

    /// Output format
    #[arg(short = 'e', long = "outputFormat", value_enum, default_value = "png")]
    pub output_format: OutputFormat,

    /// Config JSON file (layout, theme, basemap and scene overrides)
    #[arg(short = 'c', long = "configFile")]
    pub config: Option<PathBuf>,

    /// Raster resolution
    #[arg(long = "dpi")]
    pub dpi: Option<f32>,

    /// Skip fetching basemap tiles
    #[arg(long = "no-basemap")]
    pub no_basemap: bool,

    /// Do not draw coverage percentages
    #[arg(long = "no-coverage-labels")]
    pub no_coverage_labels: bool,

    /// Print the coverage table as JSON and exit
    #[arg(long = "dump-coverage")]
    pub dump_coverage: bool,
}

#[derive(ValueEnum, Debug, Clone, Copy)]
pub enum OutputFormat {
    Svg,
    Png,
}

pub fn run() -> Result<()> {
    let args = Args::parse();
    let mut config = load_config(args.config.as_deref())?;
    apply_args(&mut config, &args);
    config.validate()?;

    let projected = config.scene.project(config.coverage.quad_segments);
    let coverage = annotate(projected.region_polygons(), &projected.zone);
    log::info!(
        "{} of {} regions overlap the {} m risk zone",
        coverage.len(),
        projected.regions.len(),
        config.scene.risk_zone.radius_m
    );

    if args.dump_coverage {
        println!("{}", coverage_json(&coverage)?);
        return Ok(());
    }

    let tiles = if config.basemap.enabled {
        let viewport = compute_viewport(&config.layout);
        let extent = map_extent(&projected, &config.layout, &viewport)?;
        fetch_tiles(&config.basemap, &extent)?
    } else {
        log::info!("Basemap disabled");
        Vec::new()
    };

    let fonts = ResolvedFonts::resolve(&config.theme);
    let layout = compute_layout(&config, &projected, &coverage, &tiles, &fonts)?;
    let svg = render_svg(&layout, &config.style);

    match args.output_format {
        OutputFormat::Svg => write_output_svg(&svg, Some(args.output.as_path()))?,
        OutputFormat::Png => write_output_png(&svg, &args.output, &config.render, &fonts.sans)?,
    }
    println!("Map saved to: {}", args.output.display());
    Ok(())
}

fn apply_args(config: &mut Config, args: &Args) {
    if let Some(dpi) = args.dpi {
        config.render.dpi = dpi;
    }
    if args.no_basemap {
        config.basemap.enabled = false;
    }
    if args.no_coverage_labels {
        config.layout.coverage_labels = false;
    }
}

pub fn coverage_json(coverage: &[RegionCoverage]) -> Result<String> {
    Ok(serde_json::to_string_pretty(coverage)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_invocation_writes_default_png() {
        let args = Args::parse_from(["goatmap"]);
        assert_eq!(args.output, PathBuf::from("map_visualization.png"));
        assert!(matches!(args.output_format, OutputFormat::Png));
        let mut config = Config::default();
        apply_args(&mut config, &args);
        assert!(config.basemap.enabled);
        assert_eq!(config.render.dpi, 300.0);
    }

    #[test]
    fn flags_override_config() {
        let args = Args::parse_from([
            "goatmap",
            "--no-basemap",
            "--no-coverage-labels",
            "--dpi",
            "96",
            "-e",
            "svg",
        ]);
        let mut config = Config::default();
        apply_args(&mut config, &args);
        assert!(!config.basemap.enabled);
        assert!(!config.layout.coverage_labels);
        assert_eq!(config.render.dpi, 96.0);
        assert!(matches!(args.output_format, OutputFormat::Svg));
    }

    #[test]
    fn coverage_dump_is_json_array() {
        let config = Config::default();
        let projected = config.scene.project(16);
        let coverage = annotate(projected.region_polygons(), &projected.zone);
        let json = coverage_json(&coverage).expect("json");
        let value: serde_json::Value = serde_json::from_str(&json).expect("parse");
        let items = value.as_array().expect("array");
        assert_eq!(items.len(), coverage.len());
        assert!(items.iter().all(|item| item.get("percentage").is_some()));
    }
}
