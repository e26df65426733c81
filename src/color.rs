use std::str::FromStr;

use eframe::egui::Color32;
use palette::Srgb;

// ---------------------------------------------------------------------------
// Chart colours
// ---------------------------------------------------------------------------

pub const SALES_BY_DATE: &str = "#00ff00";
pub const SALES_BY_PRODUCT: &str = "#ffd700";
pub const UNITS_BY_PRODUCT: &str = "#bada55";

/// Parse a `#rrggbb` (or `#rgb`) string. Unparseable input maps to grey.
pub fn hex_color(hex: &str) -> Color32 {
    match Srgb::<u8>::from_str(hex) {
        Ok(rgb) => Color32::from_rgb(rgb.red, rgb.green, rgb.blue),
        Err(e) => {
            log::warn!("Invalid colour '{hex}': {e}");
            Color32::GRAY
        }
    }
}

/// The colours of the three dashboard charts.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChartColors {
    pub sales_by_date: Color32,
    pub sales_by_product: Color32,
    pub units_by_product: Color32,
}

impl Default for ChartColors {
    fn default() -> Self {
        Self {
            sales_by_date: hex_color(SALES_BY_DATE),
            sales_by_product: hex_color(SALES_BY_PRODUCT),
            units_by_product: hex_color(UNITS_BY_PRODUCT),
        }
    }
}
