//! ASCII plotting for terminal previews.
//!
//! Fixed-size character grid with deterministic output (helpful for golden
//! tests). Curves are drawn first with `-`; points overlay them with their own
//! marker character.

use crate::plot::pad_range;

/// Axis transforms for a preview.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AsciiAxes {
    pub log_x: bool,
    pub log_y: bool,
    /// Larger values at the bottom (magnitudes).
    pub invert_y: bool,
}

impl AsciiAxes {
    pub fn log_log() -> Self {
        Self {
            log_x: true,
            log_y: true,
            invert_y: false,
        }
    }

    pub fn magnitudes() -> Self {
        Self {
            log_x: false,
            log_y: false,
            invert_y: true,
        }
    }

    fn to_x(self, x: f64) -> Option<f64> {
        transform(x, self.log_x)
    }

    fn to_y(self, y: f64) -> Option<f64> {
        transform(y, self.log_y)
    }
}

fn transform(v: f64, log: bool) -> Option<f64> {
    let out = if log {
        if v <= 0.0 {
            return None;
        }
        v.log10()
    } else {
        v
    };
    out.is_finite().then_some(out)
}

fn untransform(v: f64, log: bool) -> f64 {
    if log { 10f64.powf(v) } else { v }
}

/// Render points `(x, y, marker)` and an optional curve to a text grid.
///
/// Points that cannot be placed on a log axis are dropped. The x range spans
/// the data exactly; the y range is padded by 5%.
pub fn render_ascii(
    title: &str,
    points: &[(f64, f64, char)],
    curve: Option<&[(f64, f64)]>,
    axes: AsciiAxes,
    width: usize,
    height: usize,
) -> String {
    let width = width.max(10);
    let height = height.max(5);

    let pts: Vec<(f64, f64, char)> = points
        .iter()
        .filter_map(|&(x, y, ch)| Some((axes.to_x(x)?, axes.to_y(y)?, ch)))
        .collect();
    let line: Vec<(f64, f64)> = curve
        .unwrap_or(&[])
        .iter()
        .filter_map(|&(x, y)| Some((axes.to_x(x)?, axes.to_y(y)?)))
        .collect();

    let xs = pts.iter().map(|p| p.0).chain(line.iter().map(|p| p.0));
    let ys = pts.iter().map(|p| p.1).chain(line.iter().map(|p| p.1));
    let (x_min, x_max) = pad_range(xs, 0.0).unwrap_or((0.0, 1.0));
    let (y_min, y_max) = pad_range(ys, 0.05).unwrap_or((0.0, 1.0));

    let frame = Frame {
        x_min,
        x_max,
        y_min,
        y_max,
        width,
        height,
        invert_y: axes.invert_y,
    };
    let mut grid = vec![vec![' '; width]; height];

    if line.len() >= 2 {
        let mut prev: Option<(usize, usize)> = None;
        for &(x, y) in &line {
            let (col, row) = (frame.col(x), frame.row(y));
            match prev {
                Some((c0, r0)) => draw_line(&mut grid, c0, r0, col, row, '-'),
                None => grid[row][col] = '-',
            }
            prev = Some((col, row));
        }
    }

    for &(x, y, ch) in &pts {
        grid[frame.row(y)][frame.col(x)] = ch;
    }

    let mut out = format!(
        "{title}: x=[{:.3}, {:.3}] | y=[{:.3e}, {:.3e}]\n",
        untransform(x_min, axes.log_x),
        untransform(x_max, axes.log_x),
        untransform(y_min, axes.log_y),
        untransform(y_max, axes.log_y),
    );
    for row in grid {
        out.extend(row);
        out.push('\n');
    }
    out
}

struct Frame {
    x_min: f64,
    x_max: f64,
    y_min: f64,
    y_max: f64,
    width: usize,
    height: usize,
    invert_y: bool,
}

impl Frame {
    fn col(&self, x: f64) -> usize {
        let u = ((x - self.x_min) / (self.x_max - self.x_min)).clamp(0.0, 1.0);
        (u * (self.width as f64 - 1.0)).round() as usize
    }

    fn row(&self, y: f64) -> usize {
        let u = ((y - self.y_min) / (self.y_max - self.y_min)).clamp(0.0, 1.0);
        let span = self.height as f64 - 1.0;
        // Row 0 is the top of the grid.
        let r = if self.invert_y { u * span } else { span - u * span };
        r.round() as usize
    }
}

/// Integer line drawing (Bresenham); only fills blank cells.
fn draw_line(grid: &mut [Vec<char>], x0: usize, y0: usize, x1: usize, y1: usize, ch: char) {
    let mut x0 = x0 as isize;
    let mut y0 = y0 as isize;
    let x1 = x1 as isize;
    let y1 = y1 as isize;

    let dx = (x1 - x0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let dy = -(y1 - y0).abs();
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;

    loop {
        if y0 >= 0
            && (y0 as usize) < grid.len()
            && x0 >= 0
            && (x0 as usize) < grid[0].len()
            && grid[y0 as usize][x0 as usize] == ' '
        {
            grid[y0 as usize][x0 as usize] = ch;
        }

        if x0 == x1 && y0 == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x0 += sx;
        }
        if e2 <= dx {
            err += dx;
            y0 += sy;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const POINTS: [(f64, f64, char); 2] = [(1.0, 100.0, 'o'), (10.0, 110.0, 'o')];
    const FLAT: [(f64, f64); 2] = [(1.0, 100.0), (10.0, 100.0)];

    #[test]
    fn plot_golden_snapshot_small() {
        let txt = render_ascii("L_bol", &POINTS, Some(&FLAT), AsciiAxes::default(), 10, 5);
        let expected = concat!(
            "L_bol: x=[1.000, 10.000] | y=[9.950e1, 1.105e2]\n",
            "         o\n",
            "          \n",
            "          \n",
            "          \n",
            "o---------\n",
        );
        assert_eq!(txt, expected);
    }

    #[test]
    fn inverted_axis_puts_large_values_at_the_bottom() {
        let txt = render_ascii("mag", &POINTS, Some(&FLAT), AsciiAxes::magnitudes(), 10, 5);
        let rows: Vec<&str> = txt.lines().skip(1).collect();
        assert_eq!(rows[0], "o---------");
        assert_eq!(rows[4], "         o");
    }

    #[test]
    fn log_axes_place_decades_linearly() {
        let points = [(1.0, 1e44, 'o'), (10.0, 1e43, 'o')];
        let txt = render_ascii("L", &points, None, AsciiAxes::log_log(), 10, 5);
        let rows: Vec<&str> = txt.lines().skip(1).collect();
        assert_eq!(
            rows,
            vec!["o         ", "          ", "          ", "          ", "         o"]
        );
    }

    #[test]
    fn non_positive_values_are_dropped_on_log_axes() {
        let points = [(0.0, 1e44, 'x'), (1.0, -1.0, 'x'), (1.0, 1e44, 'o'), (10.0, 1e43, 'o')];
        let txt = render_ascii("L", &points, None, AsciiAxes::log_log(), 10, 5);
        assert!(!txt.contains('x'));
    }

    #[test]
    fn empty_input_renders_blank_grid() {
        let txt = render_ascii("empty", &[], None, AsciiAxes::default(), 12, 6);
        assert_eq!(txt.lines().count(), 7);
        assert!(txt.lines().skip(1).all(|row| row.trim().is_empty() && row.len() == 12));
    }
}
