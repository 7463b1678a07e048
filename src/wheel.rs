use std::fmt::Display;

use anyhow::{ensure, Result};

use crate::calculator::ROUND_ANGLE;

/// Fewest sectors a wheel can hold; below this a wheel is meaningless.
pub const MIN_SECTORS: usize = 2;
/// Most sectors a wheel can hold; past this the labels run out of arc space.
pub const MAX_SECTORS: usize = 8;

/// An ordered set of labeled sectors. Index 0 starts at the top of the wheel
/// and indices proceed clockwise, each covering an equal span of 360/N
/// degrees.
#[derive(Debug, Clone)]
pub struct Wheel {
    labels: Vec<String>,
}

impl Wheel {
    /// Builds a wheel from its sector labels, rejecting label lists outside
    /// the 2..=8 range the layout supports.
    pub fn new(labels: Vec<String>) -> Result<Wheel> {
        ensure!(
            labels.len() >= MIN_SECTORS,
            "a wheel needs at least {} sectors, got {}",
            MIN_SECTORS,
            labels.len()
        );
        ensure!(
            labels.len() <= MAX_SECTORS,
            "a wheel holds at most {} sectors, got {}",
            MAX_SECTORS,
            labels.len()
        );
        Ok(Wheel { labels })
    }

    /// Builds a wheel of `n` sectors labeled "1" through "n".
    pub fn with_sectors(n: usize) -> Result<Wheel> {
        Wheel::new((1..=n).map(|i| i.to_string()).collect())
    }

    pub fn n_sectors(&self) -> usize {
        self.labels.len()
    }

    /// Angular width of one sector, in degrees.
    pub fn span(&self) -> f64 {
        ROUND_ANGLE / self.labels.len() as f64
    }

    /// Label under `index`. None for negative indices and for out-of-range
    /// values decoded from a pass-through forced index.
    pub fn label(&self, index: i32) -> Option<&str> {
        if index < 0 {
            return None;
        }
        self.labels.get(index as usize).map(|s| s.as_str())
    }
}

impl Display for Wheel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Wheel({} sectors x {:.1}deg: {})",
            self.n_sectors(),
            self.span(),
            self.labels.join(", ")
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_too_few_and_too_many_sectors() {
        assert!(Wheel::with_sectors(1).is_err());
        assert!(Wheel::with_sectors(9).is_err());
        for n in MIN_SECTORS..=MAX_SECTORS {
            assert!(Wheel::with_sectors(n).is_ok());
        }
    }

    #[test]
    fn span_divides_the_full_circle() {
        let wheel = Wheel::with_sectors(8).unwrap();
        assert_eq!(wheel.span(), 45.0);
        assert_eq!(wheel.span() * wheel.n_sectors() as f64, ROUND_ANGLE);
    }

    #[test]
    fn label_lookup_is_total() {
        let wheel = Wheel::new(vec!["red".into(), "black".into()]).unwrap();
        assert_eq!(wheel.label(0), Some("red"));
        assert_eq!(wheel.label(1), Some("black"));
        assert_eq!(wheel.label(2), None);
        assert_eq!(wheel.label(-1), None);
    }
}
