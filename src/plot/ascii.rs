//! ASCII plotting for terminal output.
//!
//! This is intentionally "dumb" (fixed-size grid), optimized for:
//! - quick visual sanity checks in a terminal
//! - deterministic output (helpful for golden tests)
//!
//! The x-axis is calendar time (days), so uneven gaps between observations
//! stay visible. Each fund is drawn with its own marker (`1`, `2`, ...), and
//! consecutive observations of a fund are joined by a line of the same marker.

use chrono::Datelike;
use rust_decimal::prelude::ToPrimitive;

use crate::domain::{CalendarDate, NavRecord};
use crate::report::{NO_DATA, series_marker};
use crate::series::AlignedTable;

/// Plot a single fund's sorted series.
pub fn render_series_plot(records: &[NavRecord], width: usize, height: usize) -> String {
    let points: Vec<(f64, f64)> = records
        .iter()
        .filter_map(|r| Some((day_number(r.day())?, r.nav().to_f64()?)))
        .collect();
    render_plot(&[points], width, height)
}

/// Plot every column of an aligned table on a shared date axis.
pub fn render_aligned_plot(table: &AlignedTable, width: usize, height: usize) -> String {
    let series: Vec<Vec<(f64, f64)>> = (0..table.codes.len())
        .map(|col| {
            table
                .rows
                .iter()
                .filter_map(|row| {
                    let v = row.values[col]?.to_f64()?;
                    Some((day_number(row.day)?, v))
                })
                .collect()
        })
        .collect();
    render_plot(&series, width, height)
}

fn render_plot(series: &[Vec<(f64, f64)>], width: usize, height: usize) -> String {
    let width = width.max(10);
    let height = height.max(5);

    let Some((x_min, x_max)) = x_range(series) else {
        return format!("{NO_DATA}\n");
    };
    let (y_min, y_max) = y_range(series).unwrap_or((0.0, 1.0));
    let (y_min, y_max) = pad_range(y_min, y_max, 0.05);

    let mut grid = vec![vec![' '; width]; height];

    for (i, points) in series.iter().enumerate() {
        let marker = series_marker(i);
        let mut prev = None;
        for &(x, y) in points {
            let cx = map_x(x, x_min, x_max, width);
            let cy = map_y(y, y_min, y_max, height);
            match prev {
                Some((x0, y0)) => draw_line(&mut grid, x0, y0, cx, cy, marker),
                None => grid[cy][cx] = marker,
            }
            prev = Some((cx, cy));
        }
    }

    let mut out = String::new();
    out.push_str(&format!(
        "Plot: dates=[{}, {}] | nav=[{y_min:.2}, {y_max:.2}]\n",
        label_for(x_min),
        label_for(x_max),
    ));

    for row in grid {
        out.push_str(&row.into_iter().collect::<String>());
        out.push('\n');
    }

    out
}

/// Days since 0001-01-01, used as the x coordinate.
fn day_number(date: CalendarDate) -> Option<f64> {
    date.to_naive().map(|d| d.num_days_from_ce() as f64)
}

fn label_for(day_number: f64) -> String {
    chrono::NaiveDate::from_num_days_from_ce_opt(day_number.round() as i32)
        .map(|d| CalendarDate::from_naive(d).to_dmy())
        .unwrap_or_else(|| "-".to_string())
}

fn x_range(series: &[Vec<(f64, f64)>]) -> Option<(f64, f64)> {
    let mut min_x = f64::INFINITY;
    let mut max_x = f64::NEG_INFINITY;
    for &(x, _) in series.iter().flatten() {
        min_x = min_x.min(x);
        max_x = max_x.max(x);
    }
    if !(min_x.is_finite() && max_x.is_finite()) {
        return None;
    }
    if max_x > min_x {
        Some((min_x, max_x))
    } else {
        // A single date: center it.
        Some((min_x - 1.0, max_x + 1.0))
    }
}

fn y_range(series: &[Vec<(f64, f64)>]) -> Option<(f64, f64)> {
    let mut min_y = f64::INFINITY;
    let mut max_y = f64::NEG_INFINITY;
    for &(_, y) in series.iter().flatten() {
        min_y = min_y.min(y);
        max_y = max_y.max(y);
    }

    if min_y.is_finite() && max_y.is_finite() && max_y > min_y {
        Some((min_y, max_y))
    } else if min_y.is_finite() {
        Some((min_y - 0.5, min_y + 0.5))
    } else {
        None
    }
}

fn pad_range(min: f64, max: f64, frac: f64) -> (f64, f64) {
    let span = (max - min).abs();
    let pad = (span * frac).max(1e-12);
    (min - pad, max + pad)
}

fn map_x(x: f64, x_min: f64, x_max: f64, width: usize) -> usize {
    let width = width.max(2);
    let u = ((x - x_min) / (x_max - x_min)).clamp(0.0, 1.0);
    (u * (width as f64 - 1.0)).round() as usize
}

fn map_y(y: f64, y_min: f64, y_max: f64, height: usize) -> usize {
    let height = height.max(2);
    let u = ((y - y_min) / (y_max - y_min)).clamp(0.0, 1.0);
    // y=top is max -> row 0
    (height as f64 - 1.0 - (u * (height as f64 - 1.0))).round() as usize
}

/// Integer line drawing (Bresenham-ish). Existing marks are kept.
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
