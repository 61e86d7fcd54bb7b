//! ASCII plotting for terminal output.
//!
//! This is intentionally "dumb" (fixed-size grid), optimized for:
//! - quick visual sanity checks in a terminal
//! - deterministic output (helpful for golden tests)
//!
//! Plot elements (x = row position, y = target value):
//! - train: `.`
//! - validate: `o`
//! - test: `x`
//! - prediction: `*` (drawn last, over everything else)

use crate::plot::ForecastSeries;

/// Render train/validate/test windows plus an optional prediction.
pub fn render_forecast_plot(series: &ForecastSeries<'_>, width: usize, height: usize) -> String {
    let width = width.max(10);
    let height = height.max(5);

    let segments = series.segments();
    let (x_min, x_max) = x_range(series.total_len());
    let (y_min, y_max) = y_range(segments.iter().flat_map(|s| s.points.iter().map(|&(_, y)| y)))
        .unwrap_or((0.0, 1.0));
    let (y_min, y_max) = pad_range(y_min, y_max, 0.05);

    let mut grid = vec![vec![' '; width]; height];
    for segment in &segments {
        let ch = match segment.kind {
            SegmentKind::Train => '.',
            SegmentKind::Validate => 'o',
            SegmentKind::Test => 'x',
            SegmentKind::Prediction => '*',
        };
        let overwrite = segment.kind == SegmentKind::Prediction;
        draw_segment(&mut grid, &segment.points, ch, overwrite, (x_min, x_max), (y_min, y_max));
    }

    let mut out = String::new();
    out.push_str(&format!(
        "Plot: {} | x=[{x_min:.0}, {x_max:.0}] | y=[{y_min:.2}, {y_max:.2}]\n",
        series.target
    ));
    for row in grid {
        out.push_str(&row.into_iter().collect::<String>());
        out.push('\n');
    }

    out.push_str(". train  o validate  x test");
    if let Some((label, _)) = series.prediction {
        out.push_str(&format!("  * {label}"));
    }
    out.push('\n');

    out
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SegmentKind {
    Train,
    Validate,
    Test,
    Prediction,
}

/// One window's `(position, value)` points.
pub(crate) struct Segment {
    pub kind: SegmentKind,
    pub points: Vec<(f64, f64)>,
}

impl ForecastSeries<'_> {
    pub(crate) fn total_len(&self) -> usize {
        self.train.len() + self.validate.len() + self.test.len()
    }

    /// Windows positioned on one shared x axis. The prediction starts where
    /// validate starts.
    pub(crate) fn segments(&self) -> Vec<Segment> {
        let at = |offset: usize, values: &[f64]| -> Vec<(f64, f64)> {
            values
                .iter()
                .enumerate()
                .map(|(i, &v)| ((offset + i) as f64, v))
                .collect()
        };

        let validate_start = self.train.len();
        let test_start = validate_start + self.validate.len();

        let mut out = vec![
            Segment { kind: SegmentKind::Train, points: at(0, self.train) },
            Segment { kind: SegmentKind::Validate, points: at(validate_start, self.validate) },
            Segment { kind: SegmentKind::Test, points: at(test_start, self.test) },
        ];
        if let Some((_, values)) = self.prediction {
            out.push(Segment { kind: SegmentKind::Prediction, points: at(validate_start, values) });
        }
        out
    }
}

pub(crate) fn x_range(len: usize) -> (f64, f64) {
    if len < 2 { (0.0, 1.0) } else { (0.0, (len - 1) as f64) }
}

pub(crate) fn y_range(values: impl Iterator<Item = f64>) -> Option<(f64, f64)> {
    let mut min_y = f64::INFINITY;
    let mut max_y = f64::NEG_INFINITY;
    for y in values.filter(|y| y.is_finite()) {
        min_y = min_y.min(y);
        max_y = max_y.max(y);
    }

    if !(min_y.is_finite() && max_y.is_finite()) {
        None
    } else if max_y > min_y {
        Some((min_y, max_y))
    } else {
        // Flat series: give it a unit-height band.
        Some((min_y - 0.5, max_y + 0.5))
    }
}

pub(crate) fn pad_range(min: f64, max: f64, frac: f64) -> (f64, f64) {
    let span = (max - min).abs();
    let pad = (span * frac).max(1e-12);
    (min - pad, max + pad)
}

fn map_x(t: f64, t_min: f64, t_max: f64, width: usize) -> usize {
    let width = width.max(2);
    let u = ((t - t_min) / (t_max - t_min)).clamp(0.0, 1.0);
    (u * (width as f64 - 1.0)).round() as usize
}

fn map_y(y: f64, y_min: f64, y_max: f64, height: usize) -> usize {
    let height = height.max(2);
    let u = ((y - y_min) / (y_max - y_min)).clamp(0.0, 1.0);
    // y=top is max -> row 0
    (height as f64 - 1.0 - (u * (height as f64 - 1.0))).round() as usize
}

fn draw_segment(
    grid: &mut [Vec<char>],
    points: &[(f64, f64)],
    ch: char,
    overwrite: bool,
    (x_min, x_max): (f64, f64),
    (y_min, y_max): (f64, f64),
) {
    let height = grid.len();
    let width = grid[0].len();

    let mut prev = None;
    for &(t, y) in points.iter().filter(|(_, y)| y.is_finite()) {
        let x = map_x(t, x_min, x_max, width);
        let yy = map_y(y, y_min, y_max, height);
        match prev {
            Some((x0, y0)) => draw_line(grid, x0, y0, x, yy, ch, overwrite),
            None => {
                if overwrite || grid[yy][x] == ' ' {
                    grid[yy][x] = ch;
                }
            }
        }
        prev = Some((x, yy));
    }
}

/// Integer line drawing (Bresenham-ish).
fn draw_line(grid: &mut [Vec<char>], x0: usize, y0: usize, x1: usize, y1: usize, ch: char, overwrite: bool) {
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
        if y0 >= 0 && (y0 as usize) < grid.len() && x0 >= 0 && (x0 as usize) < grid[0].len() {
            let cell = &mut grid[y0 as usize][x0 as usize];
            if overwrite || *cell == ' ' {
                *cell = ch;
            }
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
