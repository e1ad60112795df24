use std::collections::BTreeMap;

use eframe::egui::Color32;
use palette::{Hsl, IntoColor, Srgb};

use cre_dashboard::VariableRegistry;

// ---------------------------------------------------------------------------
// Color palette generator
// ---------------------------------------------------------------------------

/// Generates `n` visually distinct colours using evenly spaced hues.
pub fn generate_palette(n: usize) -> Vec<Color32> {
    if n == 0 {
        return Vec::new();
    }
    (0..n)
        .map(|i| {
            let hue = (i as f32 / n as f32) * 360.0;
            let hsl = Hsl::new(hue, 0.75, 0.55);
            let rgb: Srgb = hsl.into_color();
            Color32::from_rgb(
                (rgb.red * 255.0) as u8,
                (rgb.green * 255.0) as u8,
                (rgb.blue * 255.0) as u8,
            )
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Series colours: variable key → Color32
// ---------------------------------------------------------------------------

/// One fixed colour per registry variable, so a series keeps its colour
/// when other variables are toggled.
#[derive(Debug, Clone, Default)]
pub struct SeriesColors {
    mapping: BTreeMap<String, Color32>,
}

impl SeriesColors {
    pub fn new(registry: &VariableRegistry) -> Self {
        let palette = generate_palette(registry.len());
        let mapping = registry
            .keys()
            .zip(palette)
            .map(|(k, c)| (k.to_string(), c))
            .collect();
        Self { mapping }
    }

    /// Colour for a variable; grey for keys outside the registry.
    pub fn color_for(&self, key: &str) -> Color32 {
        self.mapping.get(key).copied().unwrap_or(Color32::GRAY)
    }
}
