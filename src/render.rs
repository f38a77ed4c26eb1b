use crate::config::{RenderConfig, StyleConfig};
use crate::layout::{LegendEntry, LegendLayout, LegendSymbol, MapLayout, TextItem};
use anyhow::Result;
use base64::Engine;
use std::path::Path;

pub fn render_svg(layout: &MapLayout, style: &StyleConfig) -> String {
    let mut svg = String::new();
    let width = layout.width;
    let height = layout.height;
    let vp = layout.transform.viewport;

    svg.push_str(&format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{width}\" height=\"{height}\" viewBox=\"0 0 {width} {height}\">",
    ));
    svg.push_str(&format!(
        "<rect width=\"100%\" height=\"100%\" fill=\"{}\"/>",
        layout.background
    ));

    svg.push_str("<defs>");
    svg.push_str(&format!(
        "<clipPath id=\"map-clip\"><rect x=\"{:.2}\" y=\"{:.2}\" width=\"{:.2}\" height=\"{:.2}\"/></clipPath>",
        vp.x, vp.y, vp.width, vp.height
    ));
    let shadow = layout.legend.shadow_offset;
    svg.push_str(&format!(
        "<filter id=\"legend-shadow\" x=\"-10%\" y=\"-10%\" width=\"130%\" height=\"130%\"><feDropShadow dx=\"{shadow}\" dy=\"{shadow}\" stdDeviation=\"1.5\" flood-color=\"#000000\" flood-opacity=\"0.3\"/></filter>"
    ));
    svg.push_str("</defs>");

    svg.push_str("<g clip-path=\"url(#map-clip)\">");
    for tile in &layout.tiles {
        let encoded = base64::engine::general_purpose::STANDARD.encode(&tile.png);
        svg.push_str(&format!(
            "<image x=\"{:.3}\" y=\"{:.3}\" width=\"{:.3}\" height=\"{:.3}\" preserveAspectRatio=\"none\" href=\"data:image/png;base64,{encoded}\"/>",
            tile.x, tile.y, tile.width, tile.height
        ));
    }

    let zone_path = points_to_path(&layout.zone.points, true);
    svg.push_str(&format!(
        "<path d=\"{zone_path}\" fill=\"{}\" fill-opacity=\"{}\" stroke=\"none\"/>",
        layout.zone.color, style.zone_fill_opacity
    ));

    for region in &layout.regions {
        svg.push_str(&format!(
            "<path d=\"{}\" fill=\"{}\" fill-opacity=\"{}\" stroke=\"{}\" stroke-width=\"{}\" stroke-linejoin=\"round\"/>",
            points_to_path(&region.points, true),
            region.color,
            style.region_fill_opacity,
            region.color,
            style.region_stroke_width
        ));
    }

    svg.push_str(&format!(
        "<path d=\"{zone_path}\" fill=\"none\" stroke=\"{}\" stroke-width=\"{}\" stroke-opacity=\"{}\" stroke-dasharray=\"{}\"/>",
        layout.zone.color, style.zone_stroke_width, style.zone_stroke_opacity, style.zone_dasharray
    ));

    for marker in &layout.markers {
        svg.push_str(&format!(
            "<circle cx=\"{:.2}\" cy=\"{:.2}\" r=\"{:.2}\" fill=\"{}\" stroke=\"{}\" stroke-width=\"{}\"/>",
            marker.x, marker.y, marker.radius, marker.fill, marker.edge, marker.edge_width
        ));
    }

    for label in &layout.coverage_labels {
        svg.push_str(&text_svg(label, Some("#FFFFFF")));
    }
    svg.push_str("</g>");

    if let Some(attribution) = &layout.attribution {
        svg.push_str(&text_svg(attribution, None));
    }

    for item in &layout.header {
        svg.push_str(&text_svg(item, None));
    }

    svg.push_str(&legend_svg(&layout.legend, style));

    svg.push_str("</svg>");
    svg
}

fn legend_svg(legend: &LegendLayout, style: &StyleConfig) -> String {
    let mut svg = String::new();
    svg.push_str(&format!(
        "<rect x=\"{:.2}\" y=\"{:.2}\" width=\"{:.2}\" height=\"{:.2}\" fill=\"{}\" stroke=\"none\" filter=\"url(#legend-shadow)\"/>",
        legend.x, legend.y, legend.width, legend.height, legend.background
    ));
    svg.push_str(&text_svg(&legend.title, None));
    for entry in &legend.entries {
        svg.push_str(&legend_symbol_svg(entry, legend.marker_radius, style));
        svg.push_str(&text_svg(&entry.label, None));
    }
    svg
}

fn legend_symbol_svg(entry: &LegendEntry, marker_radius: f32, style: &StyleConfig) -> String {
    // Symbols are centered on the label's x-height.
    let size = entry.label.size;
    let cy = entry.label.y - size * 0.35;
    let w = entry.label.x - entry.x - 8.0;
    match &entry.symbol {
        LegendSymbol::Swatch { color } => {
            let h = size * 1.1;
            format!(
                "<rect x=\"{:.2}\" y=\"{:.2}\" width=\"{w:.2}\" height=\"{h:.2}\" fill=\"{color}\" fill-opacity=\"{}\" stroke=\"{color}\" stroke-width=\"1\"/>",
                entry.x,
                cy - h / 2.0,
                style.legend_swatch_opacity
            )
        }
        LegendSymbol::DashedLine { color } => format!(
            "<line x1=\"{:.2}\" y1=\"{cy:.2}\" x2=\"{:.2}\" y2=\"{cy:.2}\" stroke=\"{color}\" stroke-width=\"2\" stroke-dasharray=\"6 3\"/>",
            entry.x,
            entry.x + w
        ),
        LegendSymbol::Marker { color, edge } => format!(
            "<circle cx=\"{:.2}\" cy=\"{cy:.2}\" r=\"{:.2}\" fill=\"{color}\" stroke=\"{edge}\" stroke-width=\"1\"/>",
            entry.x + w / 2.0,
            marker_radius
        ),
    }
}

fn points_to_path(points: &[(f32, f32)], close: bool) -> String {
    if points.is_empty() {
        return String::new();
    }
    let mut d = String::new();
    d.push_str(&format!("M {:.2} {:.2}", points[0].0, points[0].1));
    for point in points.iter().skip(1) {
        d.push_str(&format!(" L {:.2} {:.2}", point.0, point.1));
    }
    if close {
        d.push_str(" Z");
    }
    d
}

fn text_svg(item: &TextItem, halo: Option<&str>) -> String {
    let weight = if item.bold { "bold" } else { "normal" };
    let halo_attrs = halo
        .map(|color| {
            format!(" stroke=\"{color}\" stroke-width=\"3\" stroke-linejoin=\"round\" paint-order=\"stroke\"")
        })
        .unwrap_or_default();
    format!(
        "<text x=\"{:.2}\" y=\"{:.2}\" text-anchor=\"{}\" font-family=\"{}\" font-size=\"{}\" font-weight=\"{weight}\" fill=\"{}\"{halo_attrs}>{}</text>",
        item.x,
        item.y,
        item.anchor.as_svg(),
        escape_xml(&item.family),
        item.size,
        item.color,
        escape_xml(&item.text)
    )
}

pub fn write_output_svg(svg: &str, output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => {
            std::fs::write(path, svg)?;
        }
        None => {
            print!("{}", svg);
        }
    }
    Ok(())
}

#[cfg(feature = "png")]
pub fn write_output_png(svg: &str, output: &Path, render_cfg: &RenderConfig, font_family: &str) -> Result<()> {
    let mut opt = usvg::Options {
        font_family: font_family.to_string(),
        ..usvg::Options::default()
    };
    opt.fontdb_mut().load_system_fonts();

    let tree = usvg::Tree::from_str(svg, &opt)?;
    let scale = render_cfg.scale();
    let size = tree
        .size()
        .to_int_size()
        .scale_by(scale)
        .ok_or_else(|| anyhow::anyhow!("Invalid output size at {} dpi", render_cfg.dpi))?;
    let mut pixmap = resvg::tiny_skia::Pixmap::new(size.width(), size.height())
        .ok_or_else(|| anyhow::anyhow!("Failed to allocate pixmap"))?;
    if let Some(color) = parse_hex_color(&render_cfg.background) {
        pixmap.fill(color);
    }

    let mut pixmap_mut = pixmap.as_mut();
    resvg::render(
        &tree,
        resvg::tiny_skia::Transform::from_scale(scale, scale),
        &mut pixmap_mut,
    );
    pixmap.save_png(output)?;
    log::info!(
        "Rasterized {}x{} px at {} dpi",
        size.width(),
        size.height(),
        render_cfg.dpi
    );
    Ok(())
}

#[cfg(not(feature = "png"))]
pub fn write_output_png(_svg: &str, _output: &Path, _render_cfg: &RenderConfig, _font_family: &str) -> Result<()> {
    Err(anyhow::anyhow!("PNG output requires the `png` feature"))
}

#[cfg(feature = "png")]
fn parse_hex_color(value: &str) -> Option<resvg::tiny_skia::Color> {
    let hex = value.trim().strip_prefix('#')?;
    if hex.len() != 6 {
        return None;
    }
    let channel = |idx: usize| u8::from_str_radix(&hex[idx..idx + 2], 16).ok();
    Some(resvg::tiny_skia::Color::from_rgba8(
        channel(0)?,
        channel(2)?,
        channel(4)?,
        255,
    ))
}

fn escape_xml(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}
