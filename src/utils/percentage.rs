use std::{fmt::Display, ops::Deref};

/// Whole percentage. Completion numbers are shown to the user as integers, so there is no point
/// in carrying fractions around.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub struct Percentage(u32);

impl Display for Percentage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}%", self.0)
    }
}

impl Percentage {
    pub const ZERO: Percentage = Percentage(0);
    pub const FULL: Percentage = Percentage(100);

    /// `part / whole` rounded to the nearest integer, halves go up. Nothing out of nothing is 0%.
    pub fn rounded(part: u32, whole: u32) -> Percentage {
        if whole == 0 {
            return Percentage::ZERO;
        }
        Percentage((part as f64 / whole as f64 * 100.).round() as u32)
    }

    /// `part / whole` rounded down and capped at 100%. Used for targets, where an empty target is
    /// met from the start.
    pub fn of_target(part: u32, target: u32) -> Percentage {
        if target == 0 {
            return Percentage::FULL;
        }
        Percentage(((part as f64 / target as f64 * 100.).floor() as u32).min(100))
    }
}

impl Deref for Percentage {
    type Target = u32;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}
