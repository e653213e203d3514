//! Text line chart for the feed-engagement column.

use crate::model::EngagementPoint;

pub const DEFAULT_CHART_HEIGHT: usize = 12;

const POINT: char = '*';
const LINK: char = '|';

/// Render feed engagement over time, one column per day, y axis 0..100.
pub fn render_line_chart(series: &[EngagementPoint], height: usize) -> String {
    let height = height.max(2);
    if series.is_empty() {
        return String::from("(no data)\n");
    }

    let rows: Vec<usize> = series
        .iter()
        .map(|p| value_to_row(p.feed_engagement, height))
        .collect();

    let mut grid = vec![vec![' '; series.len()]; height];
    for (col, window) in rows.windows(2).enumerate() {
        let (lo, hi) = (window[0].min(window[1]), window[0].max(window[1]));
        for row in grid.iter_mut().take(hi).skip(lo + 1) {
            row[col + 1] = LINK;
        }
    }
    for (col, &row) in rows.iter().enumerate() {
        grid[row][col] = POINT;
    }

    let mut out = String::new();
    for (row_idx, row) in grid.iter().enumerate().rev() {
        let label = if row_idx == height - 1 {
            "100"
        } else if row_idx == (height - 1) / 2 {
            " 50"
        } else if row_idx == 0 {
            "  0"
        } else {
            "   "
        };
        let line: String = row.iter().flat_map(|&c| [c, ' ']).collect();
        out.push_str(label);
        out.push_str(" |");
        out.push_str(line.trim_end());
        out.push('\n');
    }

    out.push_str("    +");
    out.push_str(&"-".repeat(series.len() * 2));
    out.push('\n');

    let first = series[0].date.format("%Y-%m-%d").to_string();
    let last = series[series.len() - 1].date.format("%Y-%m-%d").to_string();
    let gap = (series.len() * 2).saturating_sub(first.len() + last.len()).max(1);
    out.push_str("     ");
    out.push_str(&first);
    out.push_str(&" ".repeat(gap));
    out.push_str(&last);
    out.push('\n');
    out.push_str("     Feed Engagement (%) by date\n");
    out
}

/// Row 0 is the bottom of the chart.
fn value_to_row(value: f64, height: usize) -> usize {
    let clamped = value.clamp(0.0, 100.0);
    let row = (clamped / 100.0 * (height - 1) as f64).round() as usize;
    row.min(height - 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engagement::generate_series;

    #[test]
    fn one_point_per_day() {
        let series = generate_series();
        let chart = render_line_chart(&series, DEFAULT_CHART_HEIGHT);
        assert_eq!(chart.matches(POINT).count(), series.len());
        assert!(chart.contains("2023-01-01"));
        assert!(chart.contains("2023-01-30"));
    }

    #[test]
    fn extremes_land_on_top_and_bottom_rows() {
        assert_eq!(value_to_row(0.0, 10), 0);
        assert_eq!(value_to_row(99.99, 10), 9);
        assert_eq!(value_to_row(150.0, 10), 9);
    }

    #[test]
    fn empty_series_renders_placeholder() {
        assert_eq!(render_line_chart(&[], 10), "(no data)\n");
    }
}
