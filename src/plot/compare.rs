//! Three-panel comparison of observations and the model.
//!
//! Panels share a logarithmic time axis fixed to `[0.2, 50]` days:
//! 1. bolometric luminosity with the model curve
//! 2. photospheric radius (fixed `[1e14, 1e16]` cm)
//! 3. effective temperature
//!
//! Every value axis is logarithmic; error bars are asymmetric.

use std::error::Error;
use std::path::Path;

use plotters::coord::Shift;
use plotters::prelude::*;

use crate::domain::{ModelOnGrid, Observations, Quantity, Series};
use crate::error::AppError;
use crate::plot::style::{BLACK, GREY, PlotStyle, WHITE};
use crate::plot::{check_output_format, is_svg, log_bounds};

/// Shared time axis bounds (days).
pub const TIME_BOUNDS: (f64, f64) = (0.2, 50.0);

/// Radius panel bounds (cm).
pub const RADIUS_BOUNDS: (f64, f64) = (1e14, 1e16);

/// Figure size in pixels (portrait, 6x8 at 100 dpi).
pub const FIGURE_SIZE: (u32, u32) = (600, 800);

/// Everything the comparison figure draws.
#[derive(Debug, Clone)]
pub struct ComparisonFigure<'a> {
    pub observations: &'a Observations,
    pub model: &'a ModelOnGrid,
    /// Optional fitted curve overlaid on one panel.
    pub overlay: Option<(Quantity, Vec<(f64, f64)>)>,
    pub style: &'a PlotStyle,
}

/// Render the figure to SVG, or to PNG when built with `ttf`.
pub fn render_comparison(path: &Path, figure: &ComparisonFigure<'_>) -> Result<(), AppError> {
    check_output_format(path)?;
    let result = if is_svg(path) {
        draw_comparison(SVGBackend::new(path, FIGURE_SIZE).into_drawing_area(), figure)
    } else {
        draw_comparison(BitMapBackend::new(path, FIGURE_SIZE).into_drawing_area(), figure)
    };
    result.map_err(|e| AppError::output(format!("Failed to render '{}': {e}", path.display())))?;
    log::info!("wrote comparison figure to {}", path.display());
    Ok(())
}

fn draw_comparison<DB>(root: DrawingArea<DB, Shift>, figure: &ComparisonFigure<'_>) -> Result<(), Box<dyn Error>>
where
    DB: DrawingBackend,
    DB::ErrorType: 'static,
{
    root.fill(&WHITE)?;
    let panels = root.split_evenly((3, 1));
    let obs = figure.observations;

    let model_lum: Vec<(f64, f64)> = figure
        .model
        .dt
        .iter()
        .copied()
        .zip(figure.model.luminosity.iter().copied())
        .collect();

    for (idx, (area, quantity)) in panels.iter().zip(Quantity::ALL).enumerate() {
        let series = obs.series(quantity);
        let curve = (quantity == Quantity::Luminosity).then_some(model_lum.as_slice());
        let overlay = figure
            .overlay
            .as_ref()
            .filter(|(q, _)| *q == quantity)
            .map(|(_, pts)| pts.as_slice());

        let y_bounds = match quantity {
            Quantity::Radius => RADIUS_BOUNDS,
            _ => value_bounds(series, curve).unwrap_or((1.0, 10.0)),
        };

        let panel = Panel {
            series,
            y_bounds,
            curve,
            overlay,
            bottom: idx == Quantity::ALL.len() - 1,
        };
        draw_panel(area, &panel, figure.style)?;
    }

    root.present()?;
    Ok(())
}

struct Panel<'a> {
    series: &'a Series,
    y_bounds: (f64, f64),
    curve: Option<&'a [(f64, f64)]>,
    overlay: Option<&'a [(f64, f64)]>,
    /// Only the bottom panel carries x tick labels and the x description.
    bottom: bool,
}

fn draw_panel<DB>(area: &DrawingArea<DB, Shift>, panel: &Panel<'_>, style: &PlotStyle) -> Result<(), Box<dyn Error>>
where
    DB: DrawingBackend,
    DB::ErrorType: 'static,
{
    let (x0, x1) = TIME_BOUNDS;
    let (y0, y1) = panel.y_bounds;
    let family = style.font_family.as_str();

    let mut chart = ChartBuilder::on(area)
        .margin(8)
        .x_label_area_size(if panel.bottom { 55 } else { 0 })
        .y_label_area_size(95)
        .build_cartesian_2d((x0..x1).log_scale(), (y0..y1).log_scale())?;

    let fmt_x = |v: &f64| format!("{v}");
    let fmt_y = |v: &f64| format!("{v:.0e}");
    let mut mesh = chart.configure_mesh();
    mesh.disable_x_mesh()
        .disable_y_mesh()
        .y_desc(panel.series.quantity.axis_label())
        .x_label_formatter(&fmt_x)
        .y_label_formatter(&fmt_y)
        .label_style((family, style.tick_size))
        .axis_desc_style((family, style.label_size));
    if panel.bottom {
        mesh.x_desc("Days since t0");
    }
    mesh.draw()?;

    let in_x = |x: f64| x >= x0 && x <= x1;
    let marks = panel_marks(panel.series, (x0, x1), (y0, y1));

    chart.draw_series(
        marks
            .bars
            .iter()
            .map(|&(x, lo, hi)| PathElement::new(vec![(x, lo), (x, hi)], BLACK.stroke_width(1))),
    )?;
    chart.draw_series(marks.points.iter().map(|&(x, y)| Circle::new((x, y), 4, BLACK.filled())))?;

    if let Some(curve) = panel.curve {
        chart.draw_series(LineSeries::new(
            curve.iter().copied().filter(|&(x, y)| in_x(x) && y > 0.0),
            BLACK.stroke_width(1),
        ))?;
    }
    if let Some(overlay) = panel.overlay {
        chart.draw_series(LineSeries::new(
            overlay.iter().copied().filter(|&(x, y)| in_x(x) && y > 0.0),
            GREY.stroke_width(2),
        ))?;
    }

    Ok(())
}

/// Error bars and markers that fit inside one panel.
#[derive(Debug, Default, PartialEq)]
struct PanelMarks {
    /// `(x, lo, hi)` clipped to the value bounds.
    bars: Vec<(f64, f64, f64)>,
    /// Markers whose value lies inside the value bounds.
    points: Vec<(f64, f64)>,
}

/// Points outside the axes are not drawn; bars are clipped to the value
/// range and dropped when nothing of them is visible.
fn panel_marks(series: &Series, (x0, x1): (f64, f64), (y0, y1): (f64, f64)) -> PanelMarks {
    let mut marks = PanelMarks::default();
    for s in &series.samples {
        if !(s.dt >= x0 && s.dt <= x1 && s.value > 0.0) {
            continue;
        }
        let lo = (s.value - s.lower).max(y0);
        let hi = (s.value + s.upper).min(y1);
        if lo < hi {
            marks.bars.push((s.dt, lo, hi));
        }
        if s.value >= y0 && s.value <= y1 {
            marks.points.push((s.dt, s.value));
        }
    }
    marks
}

/// Log-padded value bounds from the error bars and an optional curve.
fn value_bounds(series: &Series, curve: Option<&[(f64, f64)]>) -> Option<(f64, f64)> {
    let lows = series.samples.iter().map(|s| {
        let lo = s.value - s.lower;
        if lo > 0.0 { lo } else { s.value }
    });
    let highs = series.samples.iter().map(|s| s.value + s.upper);
    let curve_vals = curve.into_iter().flatten().map(|&(_, y)| y);
    log_bounds(lows.chain(highs).chain(curve_vals), 0.1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Sample;

    fn series(quantity: Quantity, values: &[(f64, f64)]) -> Series {
        Series {
            quantity,
            samples: values
                .iter()
                .map(|&(dt, value)| Sample {
                    dt,
                    value,
                    lower: 0.2 * value,
                    upper: 0.2 * value,
                })
                .collect(),
        }
    }

    #[test]
    fn bounds_cover_error_bars_and_curve() {
        let s = series(Quantity::Luminosity, &[(1.0, 1e43), (10.0, 1e42)]);
        let curve = [(1.0, 2e43), (10.0, 5e41)];
        let (lo, hi) = value_bounds(&s, Some(&curve)).unwrap();
        assert!(lo < 5e41 && hi > 2e43);
    }

    #[test]
    fn out_of_range_radius_has_no_marker() {
        let s = series(Quantity::Radius, &[(1.0, 1e15), (2.0, 1e17), (3.0, 9e15), (100.0, 1e15)]);
        let marks = panel_marks(&s, TIME_BOUNDS, RADIUS_BOUNDS);
        assert_eq!(marks.points, vec![(1.0, 1e15), (3.0, 9e15)]);
        // The 9e15 bar reaches past the top and is cut at the bound.
        assert_eq!(marks.bars.len(), 2);
        assert_eq!(marks.bars[1].2, RADIUS_BOUNDS.1);
    }

    #[test]
    fn clipped_radius_marker_is_absent_from_svg() {
        let obs = Observations {
            luminosity: series(Quantity::Luminosity, &[(1.0, 1e44), (2.0, 5e43)]),
            radius: series(Quantity::Radius, &[(1.0, 1e15), (2.0, 1e17)]),
            temperature: series(Quantity::Temperature, &[(1.0, 2e4), (2.0, 1.5e4)]),
        };
        let model = ModelOnGrid {
            dt: vec![1.0, 2.0],
            luminosity: vec![1e44, 5e43],
            radius: vec![1e15; 2],
            temperature: vec![2e4; 2],
            outside: 0,
        };
        let style = PlotStyle::default();
        let figure = ComparisonFigure {
            observations: &obs,
            model: &model,
            overlay: None,
            style: &style,
        };

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("clip.svg");
        render_comparison(&path, &figure).unwrap();
        let svg = std::fs::read_to_string(&path).unwrap();
        assert_eq!(svg.matches("<circle").count(), 5);
    }

    #[cfg(not(feature = "ttf"))]
    #[test]
    fn png_output_is_an_error_without_ttf() {
        let obs = Observations {
            luminosity: series(Quantity::Luminosity, &[(1.0, 1e44)]),
            radius: series(Quantity::Radius, &[(1.0, 1e15)]),
            temperature: series(Quantity::Temperature, &[(1.0, 2e4)]),
        };
        let model = ModelOnGrid {
            dt: vec![1.0],
            luminosity: vec![1e44],
            radius: vec![1e15],
            temperature: vec![2e4],
            outside: 0,
        };
        let style = PlotStyle::default();
        let figure = ComparisonFigure {
            observations: &obs,
            model: &model,
            overlay: None,
            style: &style,
        };

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("c.png");
        let err = render_comparison(&path, &figure).unwrap_err();
        assert_eq!(err.exit_code(), 5);
        assert!(!path.exists());
    }

    #[test]
    fn renders_svg_figure() {
        let obs = Observations {
            luminosity: series(Quantity::Luminosity, &[(0.5, 3e44), (2.0, 1e44), (10.0, 1e43)]),
            radius: series(Quantity::Radius, &[(0.5, 2e14), (2.0, 8e14), (10.0, 3e15)]),
            temperature: series(Quantity::Temperature, &[(0.5, 4e4), (2.0, 2e4), (10.0, 8e3)]),
        };
        let model = ModelOnGrid {
            dt: vec![0.5, 2.0, 10.0],
            luminosity: vec![2.5e44, 1.2e44, 1.1e43],
            radius: vec![1e14; 3],
            temperature: vec![1e4; 3],
            outside: 0,
        };
        let style = PlotStyle::default();
        let figure = ComparisonFigure {
            observations: &obs,
            model: &model,
            overlay: Some((Quantity::Temperature, vec![(1.0, 3e4), (20.0, 6e3)])),
            style: &style,
        };

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("compare.svg");
        render_comparison(&path, &figure).unwrap();
        let svg = std::fs::read_to_string(&path).unwrap();
        assert!(svg.contains("<svg"));
        assert!(svg.contains("R_ph (cm)"));
    }
}
