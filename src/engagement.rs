//! Synthetic engagement data for the analysis view.
//!
//! The values are uniform random noise standing in for real analytics. Nothing
//! here predicts anything.

use chrono::{Days, NaiveDate};
use rand::Rng;
use std::io::Write;

use crate::error::CaptioneerError;
use crate::model::EngagementPoint;

pub const SERIES_LENGTH: usize = 30;

/// First date of every generated series.
pub fn series_start() -> NaiveDate {
    NaiveDate::from_ymd_opt(2023, 1, 1).unwrap_or_default()
}

/// Generate a fresh, unseeded series.
pub fn generate_series() -> Vec<EngagementPoint> {
    generate_series_with(&mut rand::thread_rng())
}

/// Generate a series from the given random source.
pub fn generate_series_with<R: Rng>(rng: &mut R) -> Vec<EngagementPoint> {
    let start = series_start();
    (0..SERIES_LENGTH)
        .map(|day| EngagementPoint {
            date: start + Days::new(day as u64),
            feed_engagement: rng.gen_range(0.0..100.0),
            user_engagement: rng.gen_range(0.0..100.0),
        })
        .collect()
}

/// Write the series as CSV with a `Date,Feed Engagement,User Engagement` header.
pub fn write_csv<W: Write>(series: &[EngagementPoint], writer: W) -> Result<(), CaptioneerError> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    csv_writer.write_record(["Date", "Feed Engagement", "User Engagement"])?;
    for point in series {
        csv_writer.write_record([
            point.date.format("%Y-%m-%d").to_string(),
            format!("{:.2}", point.feed_engagement),
            format!("{:.2}", point.user_engagement),
        ])?;
    }
    csv_writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn series_has_thirty_consecutive_days() {
        let series = generate_series();
        assert_eq!(series.len(), SERIES_LENGTH);
        assert_eq!(series[0].date, NaiveDate::from_ymd_opt(2023, 1, 1).unwrap());
        for pair in series.windows(2) {
            assert_eq!(pair[1].date, pair[0].date + Days::new(1));
        }
    }

    #[test]
    fn values_stay_in_range() {
        for _ in 0..20 {
            for point in generate_series() {
                assert!((0.0..100.0).contains(&point.feed_engagement));
                assert!((0.0..100.0).contains(&point.user_engagement));
            }
        }
    }

    #[test]
    fn unseeded_series_differ() {
        let a: Vec<f64> = generate_series().iter().map(|p| p.feed_engagement).collect();
        let b: Vec<f64> = generate_series().iter().map(|p| p.feed_engagement).collect();
        assert_ne!(a, b);
    }

    #[test]
    fn seeded_generator_is_repeatable() {
        let a = generate_series_with(&mut StdRng::seed_from_u64(7));
        let b = generate_series_with(&mut StdRng::seed_from_u64(7));
        assert_eq!(a, b);
    }

    #[test]
    fn csv_has_header_and_one_row_per_day() {
        let mut buf = Vec::new();
        write_csv(&generate_series(), &mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "Date,Feed Engagement,User Engagement");
        assert_eq!(lines.len(), SERIES_LENGTH + 1);
        assert!(lines[1].starts_with("2023-01-01,"));
        assert!(lines[30].starts_with("2023-01-30,"));
    }
}
