use goatmap::config::Config;
use goatmap::projection::{from_web_mercator, to_web_mercator};
use goatmap::{ResolvedFonts, annotate, compute_layout, render_svg};

fn render_default(config: &Config) -> String {
    let projected = config.scene.project(config.coverage.quad_segments);
    let coverage = annotate(projected.region_polygons(), &projected.zone);
    let layout = compute_layout(config, &projected, &coverage, &[], &ResolvedFonts::generic())
        .expect("layout failed");
    render_svg(&layout, &config.style)
}

#[test]
fn every_deventer_region_touches_the_zone() {
    let config = Config::default();
    let projected = config.scene.project(config.coverage.quad_segments);
    let coverage = annotate(projected.region_polygons(), &projected.zone);

    let names: Vec<&str> = coverage.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(
        names,
        vec!["400 woningen", "800 woningen", "1600 woningen", "40 woningen"]
    );
    for item in &coverage {
        assert!(
            item.percentage > 0.0 && item.percentage < 100.0,
            "{}: {}",
            item.name,
            item.percentage
        );
    }
}

#[test]
fn shrinking_the_zone_drops_far_regions() {
    let mut config = Config::default();
    config.scene.risk_zone.radius_m = 300.0;
    let projected = config.scene.project(config.coverage.quad_segments);
    let coverage = annotate(projected.region_polygons(), &projected.zone);
    let names: Vec<&str> = coverage.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, vec!["1600 woningen"]);
}

#[test]
fn default_map_svg_has_all_layers() {
    let config = Config::default();
    let svg = render_default(&config);

    assert!(svg.contains("<svg"), "missing <svg tag");
    assert!(svg.contains("</svg>"), "missing </svg tag");
    for text in [
        "FOLLOW THE MONEY",
        "Woningen en geiten in Deventer",
        "LEGENDA",
        "Reeds gebouwd (400)",
        "Wordt nu gebouwd (800)",
        "Nog te bouwen (1.640)",
        "1 km risicozone",
        "Geitenhouderij",
        "Overige veehouderij",
    ] {
        assert!(svg.contains(text), "missing {text:?}");
    }
    assert_eq!(svg.matches("<circle").count(), 3 + 2);
    assert!(svg.matches("%</text>").count() >= 4);
    assert!(svg.contains("fill=\"#F5F1ED\""));
}

#[test]
fn layout_is_configuration() {
    let mut config = Config::default();
    config.layout.figure_width_in = 12.0;
    config.layout.figure_height_in = 9.0;
    config.layout.legend_columns = 3;
    let svg = render_default(&config);
    assert!(svg.contains("width=\"864\" height=\"648\""));
}

#[test]
fn geographic_round_trip_is_sub_meter() {
    for (lon, lat) in [(6.1801997, 52.2742744), (6.192552, 52.2759297), (-73.98, 40.75)] {
        let (x, y) = to_web_mercator(lon, lat);
        let (back_lon, back_lat) = from_web_mercator(x, y);
        let (x2, y2) = to_web_mercator(back_lon, back_lat);
        assert!((x - x2).abs() < 1.0 && (y - y2).abs() < 1.0);
    }
}
