//! Chart data for the served / refused time series.
//!
//! Both series have exactly one point per result row, in row order. Points
//! whose day or count is null stay in the series as `None` so the series
//! always line up with the table; renderers plot only the complete ones.

use crate::model::ResultRow;

pub const SERVED_LABEL: &str = "Served visitors";
pub const REFUSED_LABEL: &str = "Refused visitors";

/// One trace: x = elapsed days, y = visitor count.
#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    pub name: &'static str,
    pub x: Vec<Option<f64>>,
    pub y: Vec<Option<f64>>,
}

impl Series {
    fn from_rows(
        name: &'static str,
        rows: &[ResultRow],
        y: impl Fn(&ResultRow) -> Option<i64>,
    ) -> Self {
        Self {
            name,
            x: rows.iter().map(ResultRow::elapsed_days).collect(),
            y: rows.iter().map(|r| y(r).map(|v| v as f64)).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.x.len()
    }

    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }

    /// Points with both coordinates present.
    pub fn points(&self) -> Vec<(f64, f64)> {
        self.x
            .iter()
            .zip(&self.y)
            .filter_map(|(x, y)| Some(((*x)?, (*y)?)))
            .collect()
    }

    /// Most recent plotted value.
    pub fn latest(&self) -> Option<f64> {
        self.points().last().map(|&(_, y)| y)
    }
}

/// Axis ranges covering every plotted point of both series.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub x: [f64; 2],
    pub y: [f64; 2],
}

/// Served and refused traces over elapsed days.
#[derive(Debug, Clone, PartialEq)]
pub struct ServiceChart {
    pub served: Series,
    pub refused: Series,
}

impl ServiceChart {
    pub fn from_rows(rows: &[ResultRow]) -> Self {
        Self {
            served: Series::from_rows(SERVED_LABEL, rows, |r| r.cust_served),
            refused: Series::from_rows(REFUSED_LABEL, rows, |r| r.cust_refused),
        }
    }

    /// True when neither series has a complete point.
    pub fn is_blank(&self) -> bool {
        self.served.points().is_empty() && self.refused.points().is_empty()
    }

    /// X spans the plotted days; Y is filled down to zero like an area chart
    /// and padded 10% above the highest count. `[0, 1]` on an axis with
    /// nothing to plot.
    pub fn bounds(&self) -> Bounds {
        let points: Vec<(f64, f64)> = self
            .served
            .points()
            .into_iter()
            .chain(self.refused.points())
            .collect();
        if points.is_empty() {
            return Bounds {
                x: [0.0, 1.0],
                y: [0.0, 1.0],
            };
        }

        let x_min = points.iter().map(|p| p.0).fold(f64::INFINITY, f64::min);
        let x_max = points.iter().map(|p| p.0).fold(f64::NEG_INFINITY, f64::max);
        let y_min = points.iter().map(|p| p.1).fold(0.0, f64::min);
        let y_max = points.iter().map(|p| p.1).fold(0.0, f64::max);

        let x = if x_max > x_min {
            [x_min, x_max]
        } else {
            [x_min - 0.5, x_max + 0.5]
        };
        let y = if y_max > y_min {
            [y_min, y_max * 1.1]
        } else {
            [y_min, y_min + 1.0]
        };
        Bounds { x, y }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(minutes: Option<f64>, served: Option<i64>, refused: Option<i64>) -> ResultRow {
        ResultRow {
            scenario_number: Some(1),
            sim_year: minutes,
            cust_served: served,
            cust_refused: refused,
            terminals: Some(4),
        }
    }

    #[test]
    fn placeholder_gives_one_null_point_per_series() {
        let chart = ServiceChart::from_rows(&[ResultRow::PLACEHOLDER]);
        assert_eq!(chart.served.len(), 1);
        assert_eq!(chart.refused.len(), 1);
        assert_eq!(chart.served.y.len(), 1);
        assert_eq!(chart.served.x[0], None);
        assert!(chart.is_blank());
    }

    #[test]
    fn series_lengths_match_row_count() {
        let rows = vec![
            row(Some(1440.0), Some(10), Some(1)),
            row(None, Some(11), None),
            row(Some(4320.0), None, Some(3)),
        ];
        let chart = ServiceChart::from_rows(&rows);
        for s in [&chart.served, &chart.refused] {
            assert_eq!(s.x.len(), rows.len());
            assert_eq!(s.y.len(), rows.len());
        }
    }

    #[test]
    fn x_is_elapsed_days() {
        let chart = ServiceChart::from_rows(&[row(Some(2160.0), Some(7), Some(2))]);
        assert_eq!(chart.served.x, vec![Some(1.5)]);
        assert_eq!(chart.served.y, vec![Some(7.0)]);
        assert_eq!(chart.refused.y, vec![Some(2.0)]);
    }

    #[test]
    fn points_skip_incomplete_rows() {
        let rows = vec![
            row(Some(1440.0), Some(10), Some(1)),
            row(None, Some(11), Some(2)),
            row(Some(2880.0), None, Some(3)),
        ];
        let chart = ServiceChart::from_rows(&rows);
        assert_eq!(chart.served.points(), vec![(1.0, 10.0)]);
        assert_eq!(chart.refused.points(), vec![(1.0, 1.0), (2.0, 3.0)]);
        assert_eq!(chart.refused.latest(), Some(3.0));
    }

    #[test]
    fn bounds_fallback_when_blank() {
        let b = ServiceChart::from_rows(&[ResultRow::PLACEHOLDER]).bounds();
        assert_eq!(b.x, [0.0, 1.0]);
        assert_eq!(b.y, [0.0, 1.0]);
    }

    #[test]
    fn bounds_cover_both_series_from_zero() {
        let rows = vec![
            row(Some(1440.0), Some(10), Some(2)),
            row(Some(4320.0), Some(20), Some(5)),
        ];
        let b = ServiceChart::from_rows(&rows).bounds();
        assert_eq!(b.x, [1.0, 3.0]);
        assert_eq!(b.y[0], 0.0);
        assert!((b.y[1] - 22.0).abs() < 1e-9);
    }

    #[test]
    fn bounds_widen_single_point() {
        let b = ServiceChart::from_rows(&[row(Some(1440.0), Some(0), Some(0))]).bounds();
        assert_eq!(b.x, [0.5, 1.5]);
        assert_eq!(b.y, [0.0, 1.0]);
    }
}
