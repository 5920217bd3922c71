//! Year to chart-space mapping
//!
//! The chart canvas is logically 100×100 units with 5-unit margins on the left
//! and right. Years are bucketed into equal-width slots across the remaining
//! 90 units, and coloured by a hue sweep across the year range.

use serde::Serialize;

/// Left margin of the chart in canvas units
pub const MARGIN: f64 = 5.0;

/// Width available to year slots in canvas units
pub const SPAN: f64 = 90.0;

/// Widest year range accepted from data files
pub const MAX_YEAR_SLOTS: i64 = 1000;

/// Inclusive span of release years across the dataset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct YearRange {
    pub min: i32,
    pub max: i32,
}

impl YearRange {
    /// Create a range; the bounds are swapped if given out of order
    pub fn new(a: i32, b: i32) -> Self {
        Self {
            min: a.min(b),
            max: a.max(b),
        }
    }

    /// Compute the range over a set of years, `None` if there are none
    pub fn from_years<I>(years: I) -> Option<Self>
    where
        I: IntoIterator<Item = i32>,
    {
        years.into_iter().fold(None, |range, year| match range {
            None => Some(Self::new(year, year)),
            Some(r) => Some(Self::new(r.min.min(year), r.max.max(year))),
        })
    }

    /// Number of year slots, counting both ends
    pub fn slots(&self) -> i64 {
        i64::from(self.max) - i64::from(self.min) + 1
    }

    /// Whether the range holds a single year
    pub fn is_degenerate(&self) -> bool {
        self.min == self.max
    }

    /// Every year in the range, in order
    pub fn years(&self) -> impl Iterator<Item = i32> {
        self.min..=self.max
    }
}

/// Maps release years to x positions, slot widths and hues
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoordinateMapper {
    range: YearRange,
}

impl CoordinateMapper {
    pub fn new(range: YearRange) -> Self {
        Self { range }
    }

    pub fn range(&self) -> YearRange {
        self.range
    }

    /// Horizontal width of one year slot
    pub fn year_width(&self) -> f64 {
        SPAN / self.range.slots() as f64
    }

    /// Left edge of the slot for `year`; `min` maps to 5 and `max` to
    /// `95 - year_width()`
    pub fn x_from_year(&self, year: i32) -> f64 {
        let offset = f64::from(year) - f64::from(self.range.min);
        offset / self.range.slots() as f64 * SPAN + MARGIN
    }

    /// Hue angle in degrees, 0 at `min` and 360 at `max`
    ///
    /// A single-year range has no sweep to spread across and always yields 0.
    pub fn hue_from_year(&self, year: i32) -> f64 {
        if self.range.is_degenerate() {
            return 0.0;
        }
        let offset = f64::from(year) - f64::from(self.range.min);
        let extent = f64::from(self.range.max) - f64::from(self.range.min);
        offset / extent * 360.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn mapper(min: i32, max: i32) -> CoordinateMapper {
        CoordinateMapper::new(YearRange::new(min, max))
    }

    #[test]
    fn range_from_years() {
        let range = YearRange::from_years([1990, 1980, 2004, 1985]).unwrap();
        assert_eq!(range, YearRange { min: 1980, max: 2004 });
        assert_eq!(range.slots(), 25);
    }

    #[test]
    fn empty_years_have_no_range() {
        assert_eq!(YearRange::from_years(Vec::new()), None);
    }

    #[test]
    fn year_width_divides_span_by_slots() {
        let m = mapper(1980, 1989);
        assert!((m.year_width() - 9.0).abs() < 1e-12);
    }

    #[test]
    fn x_bounds() {
        let m = mapper(1980, 2000);
        assert!((m.x_from_year(1980) - 5.0).abs() < 1e-12);
        assert!((m.x_from_year(2000) - (95.0 - m.year_width())).abs() < 1e-9);
    }

    #[test]
    fn hue_bounds() {
        let m = mapper(1980, 2000);
        assert_eq!(m.hue_from_year(1980), 0.0);
        assert!((m.hue_from_year(2000) - 360.0).abs() < 1e-12);
        assert!((m.hue_from_year(1990) - 180.0).abs() < 1e-12);
    }

    #[test]
    fn degenerate_range_is_defined() {
        let m = mapper(1995, 1995);
        assert_eq!(m.hue_from_year(1995), 0.0);
        assert_eq!(m.x_from_year(1995), 5.0);
        assert_eq!(m.year_width(), 90.0);
    }

    proptest! {
        #[test]
        fn x_is_monotonic(min in 1950i32..2000, len in 0i32..60, a in 0i32..60, b in 0i32..60) {
            let m = mapper(min, min + len);
            let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
            let lo = min + lo.min(len);
            let hi = min + hi.min(len);
            prop_assert!(m.x_from_year(lo) <= m.x_from_year(hi));
        }

        #[test]
        fn outputs_stay_in_bounds(min in 1950i32..2000, len in 0i32..60, pick in 0i32..60) {
            let m = mapper(min, min + len);
            let year = min + pick.min(len);
            let x = m.x_from_year(year);
            let hue = m.hue_from_year(year);
            prop_assert!((MARGIN..=MARGIN + SPAN).contains(&x));
            prop_assert!((0.0..=360.0).contains(&hue));
        }
    }
}
