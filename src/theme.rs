use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Palette {
    pub blauw: String,
    pub roze: String,
    pub geel: String,
    pub rood: String,
    pub zwart: String,
    pub dollargroen: String,
    pub offwhite: String,
    pub zilver: String,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            blauw: "#0067AF".to_string(),
            roze: "#B0279C".to_string(),
            geel: "#D4A535".to_string(),
            rood: "#FF5725".to_string(),
            zwart: "#000000".to_string(),
            dollargroen: "#706F5F".to_string(),
            offwhite: "#F5F1ED".to_string(),
            zilver: "#A19B89".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Theme {
    pub palette: Palette,
    /// Preferred sans families, first installed one wins.
    pub sans_families: Vec<String>,
    pub mono_families: Vec<String>,
    pub sans_default: String,
    pub mono_default: String,
    pub kicker_size: f32,
    pub title_size: f32,
    pub subtitle_size: f32,
    pub legend_size: f32,
    pub legend_title_size: f32,
    pub coverage_label_size: f32,
    pub background: String,
    pub text_color: String,
    pub muted_text_color: String,
    pub legend_background: String,
}

impl Theme {
    pub fn editorial() -> Self {
        let palette = Palette::default();
        Self {
            sans_families: vec![
                "Helvetica Neue".to_string(),
                "Helvetica".to_string(),
                "Arial".to_string(),
                "DejaVu Sans".to_string(),
            ],
            mono_families: vec![
                "Courier New".to_string(),
                "DejaVu Sans Mono".to_string(),
            ],
            sans_default: "sans-serif".to_string(),
            mono_default: "monospace".to_string(),
            kicker_size: 10.0,
            title_size: 24.0,
            subtitle_size: 11.0,
            legend_size: 10.0,
            legend_title_size: 11.0,
            coverage_label_size: 12.0,
            background: palette.offwhite.clone(),
            text_color: palette.zwart.clone(),
            muted_text_color: palette.zilver.clone(),
            legend_background: "#FFFFFF".to_string(),
            palette,
        }
    }

    /// Resolves a palette name (`"rood"`) to its color; anything else passes through.
    pub fn color(&self, name_or_hex: &str) -> String {
        let palette = &self.palette;
        match name_or_hex {
            "blauw" => palette.blauw.clone(),
            "roze" => palette.roze.clone(),
            "geel" => palette.geel.clone(),
            "rood" => palette.rood.clone(),
            "zwart" => palette.zwart.clone(),
            "dollargroen" => palette.dollargroen.clone(),
            "offwhite" => palette.offwhite.clone(),
            "zilver" => palette.zilver.clone(),
            other => other.to_string(),
        }
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::editorial()
    }
}
