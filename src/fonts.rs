use fontdb::{Database, Family, Query, Stretch, Style, Weight};
use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::sync::Mutex;
use ttf_parser::Face;

static FONT_CATALOG: Lazy<Mutex<FontCatalog>> = Lazy::new(|| Mutex::new(FontCatalog::new()));

/// First preference found in `installed` (case-insensitive), else `default`.
pub fn resolve_font_family(preferences: &[String], installed: &[String], default: &str) -> String {
    for preferred in preferences {
        if let Some(found) = installed
            .iter()
            .find(|name| name.eq_ignore_ascii_case(preferred.trim()))
        {
            return found.clone();
        }
    }
    default.to_string()
}

pub fn installed_families() -> Vec<String> {
    match FONT_CATALOG.lock() {
        Ok(mut guard) => guard.families(),
        Err(_) => Vec::new(),
    }
}

/// Resolves against the system fonts.
pub fn resolve_installed(preferences: &[String], default: &str) -> String {
    let installed = installed_families();
    let resolved = resolve_font_family(preferences, &installed, default);
    log::debug!("font preferences {preferences:?} resolved to {resolved:?}");
    resolved
}

/// Advance width of `text`, or `None` if no face matches `font_family`.
pub fn measure_text_width(text: &str, font_size: f32, font_family: &str, bold: bool) -> Option<f32> {
    if text.is_empty() || font_size <= 0.0 {
        return Some(0.0);
    }
    let mut guard = FONT_CATALOG.lock().ok()?;
    guard.measure(text, font_size, font_family, bold)
}

/// Width estimate used when no font can be loaded.
pub fn estimate_text_width(text: &str, font_size: f32) -> f32 {
    text.chars().count() as f32 * font_size * 0.56
}

pub fn text_width(text: &str, font_size: f32, font_family: &str, bold: bool) -> f32 {
    measure_text_width(text, font_size, font_family, bold)
        .unwrap_or_else(|| estimate_text_width(text, font_size))
}

struct FontCatalog {
    db: Database,
    loaded_system_fonts: bool,
    faces: HashMap<(String, bool), Option<FaceData>>,
}

struct FaceData {
    bytes: Vec<u8>,
    index: u32,
}

impl FontCatalog {
    fn new() -> Self {
        Self {
            db: Database::new(),
            loaded_system_fonts: false,
            faces: HashMap::new(),
        }
    }

    fn ensure_loaded(&mut self) {
        if !self.loaded_system_fonts {
            self.db.load_system_fonts();
            self.loaded_system_fonts = true;
            log::debug!("loaded {} system font faces", self.db.len());
        }
    }

    fn families(&mut self) -> Vec<String> {
        self.ensure_loaded();
        let mut names: Vec<String> = self
            .db
            .faces()
            .flat_map(|face| face.families.iter().map(|(name, _)| name.clone()))
            .collect();
        names.sort();
        names.dedup();
        names
    }

    fn measure(&mut self, text: &str, font_size: f32, font_family: &str, bold: bool) -> Option<f32> {
        let key = (font_family.trim().to_string(), bold);
        if !self.faces.contains_key(&key) {
            let face = self.load_face(font_family, bold);
            self.faces.insert(key.clone(), face);
        }
        let data = self.faces.get(&key)?.as_ref()?;
        let face = Face::parse(&data.bytes, data.index).ok()?;
        let scale = font_size / face.units_per_em().max(1) as f32;
        let fallback = font_size * 0.56;

        let mut width = 0.0f32;
        for ch in text.chars() {
            if ch == '\n' {
                continue;
            }
            let advance = face
                .glyph_index(ch)
                .and_then(|glyph| face.glyph_hor_advance(glyph));
            match advance {
                Some(advance) if advance > 0 => width += advance as f32 * scale,
                _ => width += fallback,
            }
        }
        Some(width.max(0.0))
    }

    fn load_face(&mut self, font_family: &str, bold: bool) -> Option<FaceData> {
        self.ensure_loaded();
        let family = match font_family.trim().to_ascii_lowercase().as_str() {
            "" | "sans-serif" => Family::SansSerif,
            "serif" => Family::Serif,
            "monospace" => Family::Monospace,
            _ => Family::Name(font_family.trim()),
        };
        let families = [family, Family::SansSerif];
        let query = Query {
            families: &families,
            weight: if bold { Weight::BOLD } else { Weight::NORMAL },
            stretch: Stretch::Normal,
            style: Style::Normal,
        };
        let id = self.db.query(&query)?;
        let mut loaded = None;
        self.db.with_face_data(id, |data, index| {
            if Face::parse(data, index).is_ok() {
                loaded = Some(FaceData {
                    bytes: data.to_vec(),
                    index,
                });
            }
        });
        loaded
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn picks_first_installed_preference() {
        let preferences = names(&["Helvetica Neue", "Arial", "DejaVu Sans"]);
        let installed = names(&["DejaVu Sans", "Arial", "Noto Sans"]);
        assert_eq!(
            resolve_font_family(&preferences, &installed, "sans-serif"),
            "Arial"
        );
    }

    #[test]
    fn matches_case_insensitively() {
        let preferences = names(&["dejavu sans"]);
        let installed = names(&["DejaVu Sans"]);
        assert_eq!(
            resolve_font_family(&preferences, &installed, "sans-serif"),
            "DejaVu Sans"
        );
    }

    #[test]
    fn falls_back_to_default() {
        let preferences = names(&["Helvetica Neue"]);
        let installed = names(&["Noto Sans"]);
        assert_eq!(
            resolve_font_family(&preferences, &installed, "sans-serif"),
            "sans-serif"
        );
        assert_eq!(resolve_font_family(&[], &installed, "monospace"), "monospace");
    }

    #[test]
    fn text_width_is_positive_and_monotonic() {
        let short = text_width("Geit", 10.0, "sans-serif", false);
        let long = text_width("Geitenhouderij", 10.0, "sans-serif", false);
        assert!(short > 0.0);
        assert!(long > short);
        assert_eq!(text_width("", 10.0, "sans-serif", false), 0.0);
    }
}
