use palette::{named, Hsl, IntoColor, Srgb};
use serde::Serialize;

use crate::data::model::Severity;

// ---------------------------------------------------------------------------
// Severity colours
// ---------------------------------------------------------------------------

/// Marker colour for a pollution classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SeverityColor {
    Green,
    Orange,
    Red,
    DarkRed,
    Black,
}

impl SeverityColor {
    pub fn for_severity(severity: Option<Severity>) -> Self {
        match severity {
            Some(Severity::Perfect | Severity::Good) => SeverityColor::Green,
            Some(Severity::Moderate) => SeverityColor::Orange,
            Some(Severity::Poor) => SeverityColor::Red,
            Some(Severity::VeryPoor) => SeverityColor::DarkRed,
            // Extremely Poor, and rows without a level
            Some(Severity::ExtremelyPoor) | None => SeverityColor::Black,
        }
    }

    /// CSS colour keyword.
    pub fn css_name(self) -> &'static str {
        match self {
            SeverityColor::Green => "green",
            SeverityColor::Orange => "orange",
            SeverityColor::Red => "red",
            SeverityColor::DarkRed => "darkred",
            SeverityColor::Black => "black",
        }
    }

    /// `#rrggbb` for the same keyword.
    pub fn hex(self) -> String {
        let c: Srgb<u8> = match self {
            SeverityColor::Green => named::GREEN,
            SeverityColor::Orange => named::ORANGE,
            SeverityColor::Red => named::RED,
            SeverityColor::DarkRed => named::DARKRED,
            SeverityColor::Black => named::BLACK,
        };
        to_hex(c)
    }
}

fn to_hex(c: Srgb<u8>) -> String {
    format!("#{:02x}{:02x}{:02x}", c.red, c.green, c.blue)
}

// ---------------------------------------------------------------------------
// Heat-layer gradient
// ---------------------------------------------------------------------------

/// `steps` gradient stops from green (low) to red (high) with evenly spaced
/// hues, as `(position in 0..=1, #rrggbb)`.
pub fn heat_gradient(steps: usize) -> Vec<(f32, String)> {
    match steps {
        0 => Vec::new(),
        1 => vec![(1.0, hsl_hex(0.0))],
        n => (0..n)
            .map(|i| {
                let t = i as f32 / (n - 1) as f32;
                (t, hsl_hex(120.0 * (1.0 - t)))
            })
            .collect(),
    }
}

fn hsl_hex(hue: f32) -> String {
    let hsl = Hsl::new(hue, 0.85, 0.5);
    let rgb: Srgb = hsl.into_color();
    to_hex(rgb.into_format())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn severity_colour_mapping_is_fixed() {
        let cases = [
            (Some(Severity::Perfect), "green"),
            (Some(Severity::Good), "green"),
            (Some(Severity::Moderate), "orange"),
            (Some(Severity::Poor), "red"),
            (Some(Severity::VeryPoor), "darkred"),
            (Some(Severity::ExtremelyPoor), "black"),
            (None, "black"),
        ];
        for (severity, css) in cases {
            assert_eq!(SeverityColor::for_severity(severity).css_name(), css);
        }
    }

    #[test]
    fn unknown_labels_render_black() {
        let severity = Severity::from_label("off the charts");
        assert_eq!(SeverityColor::for_severity(Some(severity)), SeverityColor::Black);
    }

    #[test]
    fn hex_matches_css_keywords() {
        assert_eq!(SeverityColor::Green.hex(), "#008000");
        assert_eq!(SeverityColor::DarkRed.hex(), "#8b0000");
        assert_eq!(SeverityColor::Black.hex(), "#000000");
    }

    #[test]
    fn gradient_runs_green_to_red() {
        let stops = heat_gradient(5);
        assert_eq!(stops.len(), 5);
        assert_eq!(stops[0].0, 0.0);
        assert_eq!(stops[4].0, 1.0);
        assert!(stops[0].1.starts_with('#') && stops[0].1.len() == 7);
        let channel = |hex: &str, i: usize| u8::from_str_radix(&hex[1 + 2 * i..3 + 2 * i], 16).unwrap();
        // Low end is green-dominant, high end red-dominant.
        assert!(channel(&stops[0].1, 1) > channel(&stops[0].1, 0));
        assert!(channel(&stops[4].1, 0) > channel(&stops[4].1, 1));
    }
}
