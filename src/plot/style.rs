//! Figure styling.
//!
//! Fonts and sizes travel with each render call as a `PlotStyle` value; there is
//! no process-wide plotting state. Per-band marker styling for the light curve
//! is a fixed table.

use plotters::style::RGBColor;

use crate::domain::Band;

pub const BLACK: RGBColor = RGBColor(0, 0, 0);
pub const WHITE: RGBColor = RGBColor(255, 255, 255);
pub const GREY: RGBColor = RGBColor(128, 128, 128);
/// u-band orange.
pub const ORANGE: RGBColor = RGBColor(0xf9, 0x8e, 0x09);
/// g-band purple.
pub const PURPLE: RGBColor = RGBColor(0x57, 0x10, 0x6e);

/// Fonts and text sizes (pixels) for a figure.
#[derive(Debug, Clone, PartialEq)]
pub struct PlotStyle {
    pub font_family: String,
    pub label_size: f64,
    pub tick_size: f64,
    pub legend_size: f64,
}

impl Default for PlotStyle {
    fn default() -> Self {
        Self {
            font_family: "serif".to_string(),
            label_size: 22.0,
            tick_size: 20.0,
            legend_size: 17.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Marker {
    Circle,
    Square,
    TriangleDown,
}

/// How one photometric band is drawn.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BandStyle {
    pub marker: Marker,
    /// Marker half-width in pixels.
    pub size: i32,
    /// Marker outline and error-bar color.
    pub edge: RGBColor,
    pub fill: RGBColor,
    /// Higher values are drawn later (on top).
    pub z_order: i32,
}

/// Style for a known band; `None` for bands the figure does not show.
pub fn band_style(band: &Band) -> Option<BandStyle> {
    let style = match band {
        Band::U => BandStyle {
            marker: Marker::Circle,
            size: 5,
            edge: ORANGE,
            fill: ORANGE,
            z_order: 8,
        },
        Band::G => BandStyle {
            marker: Marker::Circle,
            size: 5,
            edge: PURPLE,
            fill: WHITE,
            z_order: 2,
        },
        Band::R => BandStyle {
            marker: Marker::Square,
            size: 6,
            edge: BLACK,
            fill: BLACK,
            z_order: 9,
        },
        Band::I => BandStyle {
            marker: Marker::TriangleDown,
            size: 5,
            edge: GREY,
            fill: GREY,
            z_order: 2,
        },
        Band::Z => BandStyle {
            marker: Marker::Square,
            size: 6,
            edge: BLACK,
            fill: WHITE,
            z_order: 1,
        },
        Band::Other(_) => return None,
    };
    Some(style)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_bands_have_styles() {
        let r = band_style(&Band::R).unwrap();
        assert_eq!(r.marker, Marker::Square);
        assert_eq!(r.z_order, 9);

        let g = band_style(&Band::G).unwrap();
        assert_eq!(g.edge, PURPLE);
        assert_eq!(g.fill, WHITE);

        assert_eq!(band_style(&Band::I).unwrap().marker, Marker::TriangleDown);
        assert!(band_style(&Band::Other("w".to_string())).is_none());
    }

    #[test]
    fn z_band_is_drawn_first() {
        let min = [Band::U, Band::G, Band::R, Band::I, Band::Z]
            .iter()
            .filter_map(|b| band_style(b).map(|s| (s.z_order, b.clone())))
            .min_by_key(|(z, _)| *z)
            .unwrap();
        assert_eq!(min.1, Band::Z);
    }
}
