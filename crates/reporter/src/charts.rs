use crate::error::ReporterError;
use analytics::AnalysisReport;
use chrono::NaiveDate;
use std::fmt::Write as _;
use std::path::{Path, PathBuf};

const WIDTH: f64 = 960.0;
const HEIGHT: f64 = 400.0;
const PADDING: f64 = 56.0;
const Y_TICKS: usize = 5;
const X_TICKS: usize = 6;
// The matplotlib "tab10" cycle.
const PALETTE: [&str; 10] = [
    "#1f77b4", "#ff7f0e", "#2ca02c", "#d62728", "#9467bd", "#8c564b", "#e377c2", "#7f7f7f",
    "#bcbd22", "#17becf",
];

pub const PRICE_CHART_TITLE: &str = "Stock Prices Over Time";
pub const CUMULATIVE_CHART_TITLE: &str = "Cumulative Returns";
pub const PORTFOLIO_CHART_TITLE: &str = "Portfolio Cumulative Return";

struct Line<'a> {
    label: &'a str,
    color: &'a str,
    values: &'a [f64],
}

/// Closing prices of every instrument.
pub fn price_chart(report: &AnalysisReport) -> String {
    let lines = palette_lines(report.prices.iter_columns());
    render_line_chart(PRICE_CHART_TITLE, report.prices.dates(), &lines, true)
}

/// Growth of one unit invested in each instrument.
pub fn cumulative_chart(report: &AnalysisReport) -> String {
    let lines = palette_lines(report.cumulative.iter_columns());
    render_line_chart(CUMULATIVE_CHART_TITLE, report.cumulative.dates(), &lines, true)
}

/// Growth of one unit invested in the equal-weight portfolio, drawn in black.
pub fn portfolio_chart(report: &AnalysisReport) -> String {
    let series = &report.portfolio_cumulative;
    let lines = [Line {
        label: &series.name,
        color: "black",
        values: &series.values,
    }];
    render_line_chart(PORTFOLIO_CHART_TITLE, &series.dates, &lines, false)
}

/// Writes the three charts as SVG files into `dir`, creating it if needed.
pub fn write_charts(report: &AnalysisReport, dir: &Path) -> Result<Vec<PathBuf>, ReporterError> {
    std::fs::create_dir_all(dir)?;

    let charts = [
        ("stock_prices.svg", price_chart(report)),
        ("cumulative_returns.svg", cumulative_chart(report)),
        ("portfolio_cumulative_return.svg", portfolio_chart(report)),
    ];

    let mut paths = Vec::with_capacity(charts.len());
    for (file_name, svg) in charts {
        let path = dir.join(file_name);
        std::fs::write(&path, svg)?;
        paths.push(path);
    }
    tracing::info!(dir = %dir.display(), "Charts written.");
    Ok(paths)
}

fn palette_lines<'a>(columns: impl Iterator<Item = (&'a str, &'a [f64])>) -> Vec<Line<'a>> {
    columns
        .enumerate()
        .map(|(i, (label, values))| Line {
            label,
            color: PALETTE[i % PALETTE.len()],
            values,
        })
        .collect()
}

fn render_line_chart(title: &str, dates: &[NaiveDate], lines: &[Line], legend: bool) -> String {
    let mut svg = String::new();
    let _ = write!(
        svg,
        r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 {WIDTH} {HEIGHT}" role="img"><title>{t}</title><style>text{{font-family:Arial,sans-serif;font-size:11px;fill:#444}}</style><rect width="100%" height="100%" fill="white"/><text x="{x:.1}" y="24" text-anchor="middle" style="font-size:15px;fill:#222">{t}</text>"#,
        t = escape(title),
        x = WIDTH / 2.0,
    );

    if let Some((min_v, max_v)) = extent(lines) {
        let xs = x_positions(dates.len());
        draw_grid(&mut svg, min_v, max_v);
        draw_time_axis(&mut svg, dates, &xs);

        for line in lines {
            let points = xs
                .iter()
                .zip(line.values)
                .filter(|(_, v)| v.is_finite())
                .map(|(x, v)| format!("{x:.2},{:.2}", scale(*v, min_v, max_v)))
                .collect::<Vec<_>>()
                .join(" ");
            let _ = write!(
                svg,
                r#"<polyline fill="none" stroke="{}" stroke-width="1.5" points="{points}"/>"#,
                line.color
            );
        }

        if legend {
            draw_legend(&mut svg, lines);
        }
    }

    svg.push_str("</svg>");
    svg
}

fn extent(lines: &[Line]) -> Option<(f64, f64)> {
    let (min_v, max_v) = lines
        .iter()
        .flat_map(|l| l.values.iter().copied())
        .filter(|v| v.is_finite())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
            (lo.min(v), hi.max(v))
        });
    if !min_v.is_finite() || !max_v.is_finite() {
        return None;
    }
    if min_v == max_v {
        // Widen flat ranges so the line sits mid-plot.
        let adjust = if min_v == 0.0 { 1.0 } else { min_v.abs() * 0.1 };
        return Some((min_v - adjust, max_v + adjust));
    }
    Some((min_v, max_v))
}

fn scale(value: f64, min_v: f64, max_v: f64) -> f64 {
    let norm = (value - min_v) / (max_v - min_v);
    PADDING + (1.0 - norm) * (HEIGHT - 2.0 * PADDING)
}

fn x_positions(len: usize) -> Vec<f64> {
    match len {
        0 => Vec::new(),
        1 => vec![WIDTH / 2.0],
        _ => {
            let inner = WIDTH - 2.0 * PADDING;
            (0..len)
                .map(|i| PADDING + inner * i as f64 / (len - 1) as f64)
                .collect()
        }
    }
}

fn draw_grid(svg: &mut String, min_v: f64, max_v: f64) {
    for i in 0..=Y_TICKS {
        let value = min_v + (max_v - min_v) * i as f64 / Y_TICKS as f64;
        let y = scale(value, min_v, max_v);
        let _ = write!(
            svg,
            r##"<line x1="{PADDING}" y1="{y:.2}" x2="{x2}" y2="{y:.2}" stroke="#e0e0e0" stroke-width="1"/><text x="{lx}" y="{ly:.2}" text-anchor="end">{value:.2}</text>"##,
            x2 = WIDTH - PADDING,
            lx = PADDING - 6.0,
            ly = y + 4.0,
        );
    }
}

fn draw_time_axis(svg: &mut String, dates: &[NaiveDate], xs: &[f64]) {
    let axis_y = HEIGHT - PADDING;
    let _ = write!(
        svg,
        r##"<line x1="{PADDING}" y1="{axis_y}" x2="{x2}" y2="{axis_y}" stroke="#000" stroke-width="1"/>"##,
        x2 = WIDTH - PADDING,
    );
    if dates.is_empty() {
        return;
    }

    let step = (dates.len() / X_TICKS).max(1);
    for (date, x) in dates.iter().zip(xs).step_by(step) {
        let _ = write!(
            svg,
            r##"<line x1="{x:.2}" y1="{PADDING}" x2="{x:.2}" y2="{axis_y}" stroke="#f0f0f0" stroke-width="1"/><text x="{x:.2}" y="{ty}" text-anchor="middle">{label}</text>"##,
            ty = axis_y + 18.0,
            label = date.format("%Y-%m-%d"),
        );
    }
}

fn draw_legend(svg: &mut String, lines: &[Line]) {
    let x = WIDTH - PADDING - 90.0;
    for (i, line) in lines.iter().enumerate() {
        let y = PADDING + 14.0 + i as f64 * 16.0;
        let _ = write!(
            svg,
            r#"<line x1="{x}" y1="{ly:.2}" x2="{x2}" y2="{ly:.2}" stroke="{color}" stroke-width="2"/><text x="{tx}" y="{y:.2}">{label}</text>"#,
            ly = y - 4.0,
            x2 = x + 20.0,
            color = line.color,
            tx = x + 26.0,
            label = escape(line.label),
        );
    }
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::analysis;

    #[test]
    fn test_price_chart_draws_one_line_per_instrument() {
        let report = analysis().report;
        let svg = price_chart(&report);

        assert!(svg.starts_with("<svg"));
        assert!(svg.ends_with("</svg>"));
        assert!(svg.contains(PRICE_CHART_TITLE));
        assert_eq!(svg.matches("<polyline").count(), report.symbols().len());
    }

    #[test]
    fn test_portfolio_chart_is_a_single_black_line() {
        let svg = portfolio_chart(&analysis().report);
        assert!(svg.contains(PORTFOLIO_CHART_TITLE));
        assert_eq!(svg.matches("<polyline").count(), 1);
        assert!(svg.contains(r#"stroke="black""#));
    }

    #[test]
    fn test_flat_series_still_renders() {
        let values = [1.0, 1.0];
        let dates = [
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(),
        ];
        let lines = [Line { label: "<B&B>", color: "black", values: &values }];
        let svg = render_line_chart("Flat", &dates, &lines, true);

        assert_eq!(svg.matches("<polyline").count(), 1);
        assert!(svg.contains("&lt;B&amp;B&gt;"));
        assert!(!svg.contains("NaN"));
    }

    #[test]
    fn test_write_charts_creates_three_files() {
        let dir = tempfile::tempdir().unwrap();
        let paths = write_charts(&analysis().report, &dir.path().join("charts")).unwrap();

        assert_eq!(paths.len(), 3);
        for path in paths {
            let svg = std::fs::read_to_string(path).unwrap();
            assert!(svg.starts_with("<svg"));
        }
    }
}
