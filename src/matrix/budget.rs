use std::fmt;

use serde::Serialize;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BudgetColor {
    Green,
    Yellow,
    Red,
}

impl BudgetColor {
    pub fn as_str(self) -> &'static str {
        match self {
            BudgetColor::Green => "green",
            BudgetColor::Yellow => "yellow",
            BudgetColor::Red => "red",
        }
    }
}

impl fmt::Display for BudgetColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Low/high pair of the range-price variant.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub struct PriceRange {
    pub low: f64,
    pub high: f64,
}

impl fmt::Display for PriceRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}–{}", format_amount(self.low), format_amount(self.high))
    }
}

/// Whole amounts print without a fractional part; others with two decimals.
pub fn format_amount(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{value:.2}")
    }
}

/// `None` when `total_price` is zero: there is no budget to measure against.
pub fn budget_utilization_percent(selected_total: f64, total_price: f64) -> Option<f64> {
    if total_price == 0.0 {
        return None;
    }
    Some(selected_total / total_price * 100.0)
}

pub fn budget_color(percent: f64) -> BudgetColor {
    if percent > 95.0 {
        BudgetColor::Red
    } else if percent > 80.0 {
        BudgetColor::Yellow
    } else {
        BudgetColor::Green
    }
}

/// Band of the range variant: `[..75)` low, `[75, 96)` mid, `[96..]` high.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Band {
    Low,
    Mid,
    High,
}

pub const MID_BAND_START: f64 = 75.0;
pub const HIGH_BAND_START: f64 = 96.0;

impl Band {
    pub fn of(percent: f64) -> Band {
        if percent >= HIGH_BAND_START {
            Band::High
        } else if percent >= MID_BAND_START {
            Band::Mid
        } else {
            Band::Low
        }
    }

    pub fn color(self) -> BudgetColor {
        match self {
            Band::Low => BudgetColor::Green,
            Band::Mid => BudgetColor::Yellow,
            Band::High => BudgetColor::Red,
        }
    }
}

/// Two-stop gradient spanning the low and high estimates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct Gradient {
    pub from: BudgetColor,
    pub to: BudgetColor,
}

impl Gradient {
    /// Name of the gradient, e.g. `green-yellow`.
    pub fn name(&self) -> String {
        format!("{}-{}", self.from, self.to)
    }

    pub fn css(&self) -> String {
        format!("linear-gradient(to right, {}, {})", self.from, self.to)
    }
}

pub fn range_band_color(low_percent: f64, high_percent: f64) -> Gradient {
    Gradient {
        from: Band::of(low_percent).color(),
        to: Band::of(high_percent).color(),
    }
}
