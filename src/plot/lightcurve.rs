//! Multi-band light curve on an inverted magnitude axis.

use std::error::Error;
use std::path::Path;

use chrono::{Duration, NaiveDate};
use plotters::coord::Shift;
use plotters::prelude::*;

use crate::domain::{BandSeries, LightCurve};
use crate::error::AppError;
use crate::plot::style::{BLACK, BandStyle, Marker, PlotStyle, WHITE, band_style};
use crate::plot::{check_output_format, is_svg, pad_range};

/// Figure size in pixels (8x5 at 100 dpi).
pub const FIGURE_SIZE: (u32, u32) = (800, 500);

/// Offset between Julian Date and Modified Julian Date.
pub const JD_MJD_OFFSET: f64 = 2_400_000.5;

/// Calendar date (UT) of an MJD.
pub fn mjd_to_date(mjd: f64) -> Option<NaiveDate> {
    let epoch = NaiveDate::from_ymd_opt(1858, 11, 17)?.and_hms_opt(0, 0, 0)?;
    let millis = (mjd * 86_400_000.0).round();
    if !millis.is_finite() || millis.abs() > i64::MAX as f64 {
        return None;
    }
    epoch
        .checked_add_signed(Duration::milliseconds(millis as i64))
        .map(|dt| dt.date())
}

/// X-axis description naming the zero point as JD and calendar date.
pub fn zero_point_label(zp_mjd: f64) -> String {
    let jd = zp_mjd + JD_MJD_OFFSET;
    match mjd_to_date(zp_mjd) {
        Some(date) => format!("Days since JD {jd:.4} ({} UT)", date.format("%Y %b %d")),
        None => format!("Days since JD {jd:.4}"),
    }
}

/// Bands that have a style, ordered for drawing (ascending z-order).
pub fn drawable_bands(lc: &LightCurve) -> Vec<(&BandSeries, BandStyle)> {
    let mut out: Vec<(&BandSeries, BandStyle)> = Vec::new();
    for series in &lc.bands {
        match band_style(&series.band) {
            Some(style) => out.push((series, style)),
            None => log::warn!(
                "band '{}' has no plot style; {} point(s) not drawn",
                series.band,
                series.points.len()
            ),
        }
    }
    out.sort_by_key(|(_, style)| style.z_order);
    out
}

/// The drawable bands in legend order (u, g, r, i, z).
pub fn legend_order<'a>(bands: &[(&'a BandSeries, BandStyle)]) -> Vec<(&'a BandSeries, BandStyle)> {
    let mut out = bands.to_vec();
    out.sort_by(|a, b| a.0.band.cmp(&b.0.band));
    out
}

/// Marker vertices in pixels; y grows downwards, so `(0, s)` is the bottom tip.
fn triangle_down(s: i32) -> Vec<(i32, i32)> {
    vec![(-s, -s), (s, -s), (0, s)]
}

/// Render the light curve to SVG, or to PNG when built with `ttf`.
pub fn render_light_curve(path: &Path, lc: &LightCurve, style: &PlotStyle) -> Result<(), AppError> {
    check_output_format(path)?;
    let bands = drawable_bands(lc);
    if bands.is_empty() {
        return Err(AppError::empty("No detections in a plottable band (u, g, r, i, z)."));
    }

    let result = if is_svg(path) {
        draw_light_curve(SVGBackend::new(path, FIGURE_SIZE).into_drawing_area(), lc, &bands, style)
    } else {
        draw_light_curve(BitMapBackend::new(path, FIGURE_SIZE).into_drawing_area(), lc, &bands, style)
    };
    result.map_err(|e| AppError::output(format!("Failed to render '{}': {e}", path.display())))?;
    log::info!("wrote light curve to {}", path.display());
    Ok(())
}

fn draw_light_curve<DB>(
    root: DrawingArea<DB, Shift>,
    lc: &LightCurve,
    bands: &[(&BandSeries, BandStyle)],
    style: &PlotStyle,
) -> Result<(), Box<dyn Error>>
where
    DB: DrawingBackend,
    DB::ErrorType: 'static,
{
    root.fill(&WHITE)?;

    let all = bands.iter().flat_map(|(s, _)| s.points.iter());
    let (t_min, t_max) = pad_range(all.clone().map(|p| p.dt), 0.05).unwrap_or((-1.0, 1.0));
    let (bright, faint) = pad_range(
        all.flat_map(|p| [p.mag - p.emag, p.mag + p.emag]),
        0.05,
    )
    .unwrap_or((15.0, 25.0));

    let family = style.font_family.as_str();
    let x_desc = zero_point_label(lc.zero_point_mjd);

    // Faint magnitudes at the bottom: the y range runs from faint to bright.
    let mut chart = ChartBuilder::on(&root)
        .margin(12)
        .x_label_area_size(60)
        .y_label_area_size(70)
        .build_cartesian_2d(t_min..t_max, faint..bright)?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .disable_y_mesh()
        .x_desc(x_desc)
        .y_desc("Apparent Magnitude")
        .label_style((family, style.tick_size))
        .axis_desc_style((family, style.label_size))
        .draw()?;

    for (series, bs) in bands {
        let points: Vec<(f64, f64, f64)> = series.points.iter().map(|p| (p.dt, p.mag, p.emag)).collect();
        let (edge, fill, s) = (bs.edge, bs.fill, bs.size);

        chart.draw_series(points.iter().map(|&(t, m, e)| {
            PathElement::new(vec![(t, m - e), (t, m + e)], edge.stroke_width(1))
        }))?;

        match bs.marker {
            Marker::Circle => {
                chart.draw_series(points.iter().map(|&(t, m, _)| {
                    EmptyElement::at((t, m))
                        + Circle::new((0, 0), s, fill.filled())
                        + Circle::new((0, 0), s, edge.stroke_width(1))
                }))?;
            }
            Marker::Square => {
                chart.draw_series(points.iter().map(|&(t, m, _)| {
                    EmptyElement::at((t, m))
                        + Rectangle::new([(-s, -s), (s, s)], fill.filled())
                        + Rectangle::new([(-s, -s), (s, s)], edge.stroke_width(1))
                }))?;
            }
            Marker::TriangleDown => {
                chart.draw_series(points.iter().map(|&(t, m, _)| {
                    EmptyElement::at((t, m)) + Polygon::new(triangle_down(s), fill.filled())
                }))?;
            }
        }
    }

    // Legend entries are empty series so they can follow band order.
    for (series, bs) in legend_order(bands) {
        let (edge, fill, s) = (bs.edge, bs.fill, bs.size);
        let entry = chart.draw_series(std::iter::empty::<PathElement<(f64, f64)>>())?;
        entry.label(series.band.to_string());
        match bs.marker {
            Marker::Circle => {
                entry.legend(move |(x, y)| {
                    EmptyElement::at((x, y))
                        + Circle::new((0, 0), s, fill.filled())
                        + Circle::new((0, 0), s, edge.stroke_width(1))
                });
            }
            Marker::Square => {
                entry.legend(move |(x, y)| {
                    EmptyElement::at((x, y))
                        + Rectangle::new([(-s, -s), (s, s)], fill.filled())
                        + Rectangle::new([(-s, -s), (s, s)], edge.stroke_width(1))
                });
            }
            Marker::TriangleDown => {
                entry.legend(move |(x, y)| EmptyElement::at((x, y)) + Polygon::new(triangle_down(s), fill.filled()));
            }
        }
    }

    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::UpperRight)
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .label_font((family, style.legend_size))
        .draw()?;

    root.present()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Band, LightCurvePoint};

    fn light_curve() -> LightCurve {
        let band = |band: Band, pts: &[(f64, f64)]| BandSeries {
            band,
            points: pts
                .iter()
                .map(|&(dt, mag)| LightCurvePoint { dt, mag, emag: 0.05 })
                .collect(),
        };
        LightCurve {
            zero_point_mjd: 58370.1634,
            bands: vec![
                band(Band::U, &[(1.0, 18.9)]),
                band(Band::G, &[(0.0, 19.5), (2.0, 18.6)]),
                band(Band::R, &[(0.1, 19.4), (3.0, 18.7)]),
                band(Band::Z, &[(4.0, 18.8)]),
                band(Band::Other("w2".to_string()), &[(5.0, 19.0)]),
            ],
        }
    }

    #[test]
    fn zero_point_label_names_jd_and_date() {
        assert_eq!(
            zero_point_label(58370.1634),
            "Days since JD 2458370.6634 (2018 Sep 09 UT)"
        );
    }

    #[test]
    fn mjd_epoch_is_1858_11_17() {
        assert_eq!(mjd_to_date(0.0), NaiveDate::from_ymd_opt(1858, 11, 17));
        assert_eq!(mjd_to_date(f64::NAN), None);
    }

    #[test]
    fn bands_draw_in_z_order_and_unknown_bands_are_skipped() {
        let lc = light_curve();
        let order: Vec<String> = drawable_bands(&lc)
            .iter()
            .map(|(s, _)| s.band.to_string())
            .collect();
        assert_eq!(order, vec!["z", "g", "u", "r"]);
    }

    #[test]
    fn legend_lists_bands_in_filter_order() {
        let lc = light_curve();
        let drawn = drawable_bands(&lc);
        let order: Vec<String> = legend_order(&drawn)
            .iter()
            .map(|(s, _)| s.band.to_string())
            .collect();
        assert_eq!(order, vec!["u", "g", "r", "z"]);
    }

    #[cfg(not(feature = "ttf"))]
    #[test]
    fn png_output_is_an_error_without_ttf() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("lc.png");
        let err = render_light_curve(&path, &light_curve(), &PlotStyle::default()).unwrap_err();
        assert_eq!(err.exit_code(), 5);
        assert!(!path.exists());
    }

    #[test]
    fn renders_svg_light_curve() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("lc.svg");
        render_light_curve(&path, &light_curve(), &PlotStyle::default()).unwrap();
        let svg = std::fs::read_to_string(&path).unwrap();
        assert!(svg.contains("Apparent Magnitude"));
    }

    #[test]
    fn only_unknown_bands_is_an_error() {
        let lc = LightCurve {
            zero_point_mjd: 0.0,
            bands: vec![BandSeries {
                band: Band::Other("w1".to_string()),
                points: vec![LightCurvePoint { dt: 0.0, mag: 19.0, emag: 0.1 }],
            }],
        };
        let dir = tempfile::tempdir().unwrap();
        let err = render_light_curve(&dir.path().join("x.svg"), &lc, &PlotStyle::default()).unwrap_err();
        assert_eq!(err.exit_code(), 3);
    }
}
