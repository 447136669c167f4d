//! Chart renderer - pure SVG generation
//!
//! Turns an ordered point sequence plus the historical-high scalar into an
//! SVG byte buffer. The x axis is each point's timestamp minus the first
//! point's timestamp, so the chart always starts at zero; the y axis is the
//! container's total size in bytes. A dashed reference line marks the
//! historical high, drawn even when there are no points at all (the empty
//! case renders axes, the reference line, and an explicit no-data legend
//! entry).
//!
//! No clock, no I/O, no randomness: identical inputs produce byte-identical
//! output.

use crate::query::SamplePoint;

const WIDTH: f64 = 700.0;
const HEIGHT: f64 = 360.0;
const MARGIN_LEFT: f64 = 80.0;
const MARGIN_RIGHT: f64 = 24.0;
const MARGIN_TOP: f64 = 48.0;
const MARGIN_BOTTOM: f64 = 64.0;

const SERIES_COLOR: &str = "#1f77b4";
const HIGH_COLOR: &str = "#d62728";
const GRID_COLOR: &str = "#cccccc";
const TEXT_COLOR: &str = "#333333";

/// Render the windowed series and its historical-high reference line
pub fn render(points: &[SamplePoint], historical_high: u64) -> Vec<u8> {
    let plot_w = WIDTH - MARGIN_LEFT - MARGIN_RIGHT;
    let plot_h = HEIGHT - MARGIN_TOP - MARGIN_BOTTOM;

    // Normalize x to seconds since the first point
    let x0 = points.first().map(|p| p.timestamp).unwrap_or(0);
    let x_span = points
        .last()
        .map(|p| (p.timestamp - x0).max(1))
        .unwrap_or(1) as f64;

    // The reference line must always be inside the plot, so it participates
    // in the y scale; 1 guards the all-zero case, 5% headroom keeps the top
    // point off the frame.
    let y_peak = points
        .iter()
        .map(|p| p.total_size)
        .max()
        .unwrap_or(0)
        .max(historical_high)
        .max(1) as f64;
    let y_max = y_peak * 1.05;

    let scale_x = |ts: i64| MARGIN_LEFT + ((ts - x0) as f64 / x_span) * plot_w;
    let scale_y = |size: f64| MARGIN_TOP + plot_h - (size / y_max) * plot_h;

    let mut svg = String::with_capacity(4096);
    svg.push_str(&format!(
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{WIDTH}" height="{HEIGHT}" viewBox="0 0 {WIDTH} {HEIGHT}">"#
    ));
    svg.push_str(r#"<rect width="100%" height="100%" fill="white"/>"#);

    svg.push_str(&format!(
        r#"<text x="{x}" y="24" font-family="sans-serif" font-size="15" fill="{TEXT_COLOR}" text-anchor="middle">Container size (last window) with historical high</text>"#,
        x = WIDTH / 2.0
    ));

    // Horizontal gridlines with byte labels
    for i in 0..=4 {
        let value = y_max * (i as f64) / 4.0;
        let y = scale_y(value);
        svg.push_str(&format!(
            r#"<line x1="{MARGIN_LEFT}" y1="{y:.1}" x2="{x2}" y2="{y:.1}" stroke="{GRID_COLOR}" stroke-width="0.5" stroke-dasharray="2,3"/>"#,
            x2 = WIDTH - MARGIN_RIGHT
        ));
        svg.push_str(&format!(
            r#"<text x="{x}" y="{ty:.1}" font-family="sans-serif" font-size="10" fill="{TEXT_COLOR}" text-anchor="end">{label}</text>"#,
            x = MARGIN_LEFT - 6.0,
            ty = y + 3.0,
            label = format_bytes(value)
        ));
    }

    // Axes
    svg.push_str(&format!(
        r#"<line x1="{MARGIN_LEFT}" y1="{y1}" x2="{x2}" y2="{y1}" stroke="{TEXT_COLOR}" stroke-width="1"/>"#,
        y1 = HEIGHT - MARGIN_BOTTOM,
        x2 = WIDTH - MARGIN_RIGHT
    ));
    svg.push_str(&format!(
        r#"<line x1="{MARGIN_LEFT}" y1="{MARGIN_TOP}" x2="{MARGIN_LEFT}" y2="{y2}" stroke="{TEXT_COLOR}" stroke-width="1"/>"#,
        y2 = HEIGHT - MARGIN_BOTTOM
    ));

    // Axis labels
    svg.push_str(&format!(
        r#"<text x="{x}" y="{y}" font-family="sans-serif" font-size="12" fill="{TEXT_COLOR}" text-anchor="middle">Seconds (relative)</text>"#,
        x = MARGIN_LEFT + plot_w / 2.0,
        y = HEIGHT - 20.0
    ));
    svg.push_str(&format!(
        r#"<text x="18" y="{y}" font-family="sans-serif" font-size="12" fill="{TEXT_COLOR}" text-anchor="middle" transform="rotate(-90 18 {y})">Total size (bytes)</text>"#,
        y = MARGIN_TOP + plot_h / 2.0
    ));

    // X extent labels
    svg.push_str(&format!(
        r#"<text x="{MARGIN_LEFT}" y="{y}" font-family="sans-serif" font-size="10" fill="{TEXT_COLOR}" text-anchor="middle">0</text>"#,
        y = HEIGHT - MARGIN_BOTTOM + 16.0
    ));
    if !points.is_empty() {
        svg.push_str(&format!(
            r#"<text x="{x}" y="{y}" font-family="sans-serif" font-size="10" fill="{TEXT_COLOR}" text-anchor="middle">{span}</text>"#,
            x = WIDTH - MARGIN_RIGHT,
            y = HEIGHT - MARGIN_BOTTOM + 16.0,
            span = x_span as i64
        ));
    }

    // Historical-high reference line, always drawn
    let high_y = scale_y(historical_high as f64);
    svg.push_str(&format!(
        r#"<line x1="{MARGIN_LEFT}" y1="{high_y:.1}" x2="{x2}" y2="{high_y:.1}" stroke="{HIGH_COLOR}" stroke-width="1.2" stroke-dasharray="6,4"/>"#,
        x2 = WIDTH - MARGIN_RIGHT
    ));

    // Data series
    if !points.is_empty() {
        let coords: Vec<String> = points
            .iter()
            .map(|p| format!("{:.1},{:.1}", scale_x(p.timestamp), scale_y(p.total_size as f64)))
            .collect();
        svg.push_str(&format!(
            r#"<polyline points="{}" fill="none" stroke="{SERIES_COLOR}" stroke-width="1.5"/>"#,
            coords.join(" ")
        ));
        for p in points {
            svg.push_str(&format!(
                r#"<circle cx="{:.1}" cy="{:.1}" r="3" fill="{SERIES_COLOR}"/>"#,
                scale_x(p.timestamp),
                scale_y(p.total_size as f64)
            ));
        }
    }

    // Legend
    let series_label = if points.is_empty() {
        "No data in window"
    } else {
        "Last window size"
    };
    let legend_x = MARGIN_LEFT + 10.0;
    svg.push_str(&format!(
        r#"<rect x="{x}" y="{y}" width="14" height="3" fill="{SERIES_COLOR}"/>"#,
        x = legend_x,
        y = MARGIN_TOP + 6.0
    ));
    svg.push_str(&format!(
        r#"<text x="{x}" y="{y}" font-family="sans-serif" font-size="11" fill="{TEXT_COLOR}">{series_label}</text>"#,
        x = legend_x + 20.0,
        y = MARGIN_TOP + 11.0
    ));
    svg.push_str(&format!(
        r#"<line x1="{x1}" y1="{y}" x2="{x2}" y2="{y}" stroke="{HIGH_COLOR}" stroke-width="1.5" stroke-dasharray="6,4"/>"#,
        x1 = legend_x,
        x2 = legend_x + 14.0,
        y = MARGIN_TOP + 23.0
    ));
    svg.push_str(&format!(
        r#"<text x="{x}" y="{y}" font-family="sans-serif" font-size="11" fill="{TEXT_COLOR}">Historical high ({high})</text>"#,
        x = legend_x + 20.0,
        y = MARGIN_TOP + 27.0,
        high = format_bytes(historical_high as f64)
    ));

    svg.push_str("</svg>");
    svg.into_bytes()
}

/// Human-readable byte label for axis ticks and the legend
fn format_bytes(value: f64) -> String {
    const UNITS: [&str; 5] = ["B", "KiB", "MiB", "GiB", "TiB"];
    let mut v = value;
    let mut unit = 0;
    while v >= 1024.0 && unit < UNITS.len() - 1 {
        v /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{} {}", v.round() as u64, UNITS[unit])
    } else {
        format!("{:.1} {}", v, UNITS[unit])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn svg_text(points: &[SamplePoint], high: u64) -> String {
        String::from_utf8(render(points, high)).unwrap()
    }

    #[test]
    fn test_empty_series_renders_reference_line_and_no_data_legend() {
        let svg = svg_text(&[], 5);

        assert!(svg.starts_with("<svg"));
        assert!(svg.contains("No data in window"));
        assert!(svg.contains("Historical high"));
        assert!(svg.contains("stroke-dasharray=\"6,4\""));
        // No data series drawn
        assert!(!svg.contains("<polyline"));
    }

    #[test]
    fn test_series_renders_polyline_and_markers() {
        let points = [
            SamplePoint { timestamp: 100, total_size: 18 },
            SamplePoint { timestamp: 101, total_size: 27 },
            SamplePoint { timestamp: 102, total_size: 0 },
            SamplePoint { timestamp: 103, total_size: 2 },
        ];
        let svg = svg_text(&points, 27);

        assert!(svg.contains("<polyline"));
        assert_eq!(svg.matches("<circle").count(), 4);
        assert!(svg.contains("Last window size"));
    }

    #[test]
    fn test_x_axis_starts_at_zero() {
        let shifted = [
            SamplePoint { timestamp: 1_700_000_000, total_size: 10 },
            SamplePoint { timestamp: 1_700_000_060, total_size: 20 },
        ];
        let based = [
            SamplePoint { timestamp: 0, total_size: 10 },
            SamplePoint { timestamp: 60, total_size: 20 },
        ];

        // Same offsets, same geometry: absolute timestamps must not leak in
        assert_eq!(render(&shifted, 20), render(&based, 20));
    }

    #[test]
    fn test_deterministic() {
        let points = [SamplePoint { timestamp: 10, total_size: 5 }];
        assert_eq!(render(&points, 9), render(&points, 9));
    }

    #[test]
    fn test_single_point_does_not_panic() {
        let svg = svg_text(&[SamplePoint { timestamp: 42, total_size: 7 }], 7);
        assert!(svg.contains("<circle"));
    }

    #[test]
    fn test_all_zero_sizes() {
        let points = [
            SamplePoint { timestamp: 1, total_size: 0 },
            SamplePoint { timestamp: 2, total_size: 0 },
        ];
        let svg = svg_text(&points, 0);
        assert!(svg.contains("<polyline"));
    }

    #[test]
    fn test_format_bytes() {
        assert_eq!(format_bytes(512.0), "512 B");
        assert_eq!(format_bytes(2048.0), "2.0 KiB");
        assert_eq!(format_bytes(3.5 * 1024.0 * 1024.0), "3.5 MiB");
    }
}
