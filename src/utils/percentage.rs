use std::{fmt::Display, ops::Deref};

#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Percentage(f64);

impl Display for Percentage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.0}%", self.0)
    }
}

impl Percentage {
    pub const ZERO: Percentage = Percentage(0.);
    pub const FULL: Percentage = Percentage(100.);

    pub fn new_opt(value: f64) -> Option<Percentage> {
        if value < 0. || value.is_nan() {
            None
        } else {
            Some(Percentage(value))
        }
    }

    /// Whether the value reached a full hundred percent.
    pub fn is_full(&self) -> bool {
        self.0 >= 100.
    }
}

impl Deref for Percentage {
    type Target = f64;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

/// Share of `value` in `whole`, capped at 100%. An empty whole yields 0%.
pub fn capped_percentage(value: u64, whole: u64) -> Percentage {
    if whole == 0 {
        return Percentage::ZERO;
    }
    Percentage::new_opt(f64::min(value as f64 * 100. / whole as f64, 100.))
        .expect("Percentage should always be at least 0")
}
