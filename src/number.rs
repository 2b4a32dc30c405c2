//! Decimal arithmetic settings and numeric coercion.
//!
//! Every numeric reduction in this crate (`sum`, `avg`, percentages) is computed in
//! [`rust_decimal::Decimal`], never in native floating point. A [`NumberFormat`] carried by each
//! [`crate::types::Frame`] decides the scale and rounding applied to results that would otherwise
//! have unbounded precision (averages, percentages).

use std::str::FromStr;

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use crate::error::{FrameError, FrameResult};

/// Rounding applied when a decimal result is reduced to a fixed scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoundingMode {
    /// Away from zero.
    Up,
    /// Towards zero (truncate).
    Down,
    /// Towards positive infinity.
    Ceiling,
    /// Towards negative infinity.
    Floor,
    /// Nearest neighbour; ties away from zero.
    #[default]
    HalfUp,
    /// Nearest neighbour; ties towards zero.
    HalfDown,
    /// Nearest neighbour; ties to the even neighbour.
    HalfEven,
}

impl RoundingMode {
    fn strategy(self) -> RoundingStrategy {
        match self {
            Self::Up => RoundingStrategy::AwayFromZero,
            Self::Down => RoundingStrategy::ToZero,
            Self::Ceiling => RoundingStrategy::ToPositiveInfinity,
            Self::Floor => RoundingStrategy::ToNegativeInfinity,
            Self::HalfUp => RoundingStrategy::MidpointAwayFromZero,
            Self::HalfDown => RoundingStrategy::MidpointTowardZero,
            Self::HalfEven => RoundingStrategy::MidpointNearestEven,
        }
    }
}

/// Scale and rounding configuration for decimal results.
///
/// Use [`Default`] for the common case: two decimal places, [`RoundingMode::HalfUp`], and an
/// average of zero values defined as `0`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NumberFormat {
    /// Number of decimal places kept in averages and percentages.
    pub scale: u32,
    /// Rounding used when reducing to `scale`.
    pub rounding: RoundingMode,
    /// Result of averaging zero values.
    ///
    /// `None` makes such an average fail with [`FrameError::DivideByZero`].
    pub empty_average: Option<Decimal>,
}

impl Default for NumberFormat {
    fn default() -> Self {
        Self {
            scale: 2,
            rounding: RoundingMode::HalfUp,
            empty_average: Some(Decimal::ZERO),
        }
    }
}

impl NumberFormat {
    /// Create a format with the given scale and rounding (empty averages resolve to zero).
    pub fn new(scale: u32, rounding: RoundingMode) -> Self {
        Self {
            scale,
            rounding,
            ..Self::default()
        }
    }

    /// Same format, but averaging zero values is an error.
    pub fn strict(self) -> Self {
        Self {
            empty_average: None,
            ..self
        }
    }

    /// Round `value` to this format's scale.
    pub fn round(&self, value: Decimal) -> Decimal {
        value.round_dp_with_strategy(self.scale, self.rounding.strategy())
    }

    /// Divide `sum` by `count`, rounded to this format.
    ///
    /// A zero `count` resolves to [`Self::empty_average`], or fails if that is unset.
    pub fn average(&self, sum: Decimal, count: usize, operation: &'static str) -> FrameResult<Decimal> {
        if count == 0 {
            return self
                .empty_average
                .map(|v| self.round(v))
                .ok_or(FrameError::DivideByZero { operation });
        }
        let quotient = sum
            .checked_div(Decimal::from(count))
            .ok_or(FrameError::NumericOverflow { operation })?;
        Ok(self.round(quotient))
    }

    /// `value / total * 100`, rounded to `scale` places with this format's rounding.
    pub fn percent(&self, value: Decimal, total: Decimal, scale: u32) -> FrameResult<Decimal> {
        if total.is_zero() {
            return Err(FrameError::DivideByZero {
                operation: "map_percent",
            });
        }
        let ratio = value
            .checked_mul(Decimal::ONE_HUNDRED)
            .and_then(|v| v.checked_div(total))
            .ok_or(FrameError::NumericOverflow {
                operation: "map_percent",
            })?;
        Ok(ratio.round_dp_with_strategy(scale, self.rounding.strategy()))
    }
}

/// Coercion of a field value into an exact decimal.
///
/// `Ok(None)` means the value is absent and is skipped by reductions (it does not count towards
/// an average). Values that cannot be represented fail with [`FrameError::TypeConversion`].
pub trait ToDecimal {
    fn to_decimal(&self) -> FrameResult<Option<Decimal>>;
}

macro_rules! int_to_decimal {
    ($($t:ty),*) => {
        $(
            impl ToDecimal for $t {
                fn to_decimal(&self) -> FrameResult<Option<Decimal>> {
                    Ok(Some(Decimal::from(*self)))
                }
            }
        )*
    };
}

int_to_decimal!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize);

fn float_to_decimal(v: f64) -> FrameResult<Option<Decimal>> {
    if !v.is_finite() {
        return Err(FrameError::type_conversion(format!(
            "non-finite float {v} has no decimal value"
        )));
    }
    // Shortest round-trip text, so 0.1 becomes 0.1 rather than its binary expansion.
    Decimal::from_str(&v.to_string())
        .or_else(|_| Decimal::from_scientific(&format!("{v:e}")))
        .map(Some)
        .map_err(|e| FrameError::type_conversion(format!("float {v} out of decimal range: {e}")))
}

impl ToDecimal for f64 {
    fn to_decimal(&self) -> FrameResult<Option<Decimal>> {
        float_to_decimal(*self)
    }
}

impl ToDecimal for f32 {
    fn to_decimal(&self) -> FrameResult<Option<Decimal>> {
        // Go through the f32 text form; widening first would expose binary noise.
        if !self.is_finite() {
            return float_to_decimal(f64::from(*self));
        }
        Decimal::from_str(&self.to_string())
            .map(Some)
            .map_err(|e| FrameError::type_conversion(format!("float {self} out of decimal range: {e}")))
    }
}

impl ToDecimal for Decimal {
    fn to_decimal(&self) -> FrameResult<Option<Decimal>> {
        Ok(Some(*self))
    }
}

impl ToDecimal for str {
    fn to_decimal(&self) -> FrameResult<Option<Decimal>> {
        let trimmed = self.trim();
        if trimmed.is_empty() {
            return Ok(None);
        }
        Decimal::from_str(trimmed)
            .or_else(|_| Decimal::from_scientific(trimmed))
            .map(Some)
            .map_err(|_| FrameError::type_conversion(format!("'{trimmed}' is not a number")))
    }
}

impl ToDecimal for String {
    fn to_decimal(&self) -> FrameResult<Option<Decimal>> {
        self.as_str().to_decimal()
    }
}

impl<N: ToDecimal + ?Sized> ToDecimal for &N {
    fn to_decimal(&self) -> FrameResult<Option<Decimal>> {
        (**self).to_decimal()
    }
}

impl<N: ToDecimal> ToDecimal for Option<N> {
    fn to_decimal(&self) -> FrameResult<Option<Decimal>> {
        match self {
            Some(v) => v.to_decimal(),
            None => Ok(None),
        }
    }
}

/// Running decimal sum plus the number of non-absent values folded into it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub(crate) struct DecimalAcc {
    pub(crate) sum: Decimal,
    pub(crate) count: usize,
}

impl DecimalAcc {
    pub(crate) fn push<V: ToDecimal>(&mut self, value: &V, operation: &'static str) -> FrameResult<()> {
        if let Some(v) = value.to_decimal()? {
            self.sum = self
                .sum
                .checked_add(v)
                .ok_or(FrameError::NumericOverflow { operation })?;
            self.count += 1;
        }
        Ok(())
    }

    pub(crate) fn merge(self, other: Self, operation: &'static str) -> FrameResult<Self> {
        Ok(Self {
            sum: self
                .sum
                .checked_add(other.sum)
                .ok_or(FrameError::NumericOverflow { operation })?,
            count: self.count + other.count,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::{NumberFormat, RoundingMode, ToDecimal};
    use crate::error::FrameError;
    use rust_decimal::Decimal;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn floats_convert_through_shortest_text() {
        assert_eq!(0.1f64.to_decimal().unwrap(), Some(dec("0.1")));
        assert_eq!(2.5f32.to_decimal().unwrap(), Some(dec("2.5")));
        assert!(matches!(
            f64::NAN.to_decimal(),
            Err(FrameError::TypeConversion { .. })
        ));
    }

    #[test]
    fn strings_parse_or_fail_with_type_conversion() {
        assert_eq!("12.50".to_decimal().unwrap(), Some(dec("12.50")));
        assert_eq!("".to_decimal().unwrap(), None);
        assert!(matches!(
            "abc".to_decimal(),
            Err(FrameError::TypeConversion { .. })
        ));
    }

    #[test]
    fn options_are_absent_when_none() {
        assert_eq!(Option::<i32>::None.to_decimal().unwrap(), None);
        assert_eq!(Some(7u8).to_decimal().unwrap(), Some(Decimal::from(7)));
    }

    #[test]
    fn rounding_modes_follow_their_names() {
        let v = dec("2.345");
        assert_eq!(NumberFormat::new(2, RoundingMode::HalfUp).round(v), dec("2.35"));
        assert_eq!(NumberFormat::new(2, RoundingMode::HalfDown).round(v), dec("2.34"));
        assert_eq!(NumberFormat::new(2, RoundingMode::HalfEven).round(v), dec("2.34"));
        assert_eq!(NumberFormat::new(2, RoundingMode::Down).round(v), dec("2.34"));
        assert_eq!(NumberFormat::new(1, RoundingMode::Up).round(v), dec("2.4"));
        assert_eq!(NumberFormat::new(0, RoundingMode::Floor).round(dec("-2.1")), dec("-3"));
        assert_eq!(NumberFormat::new(0, RoundingMode::Ceiling).round(dec("-2.9")), dec("-2"));
    }

    #[test]
    fn average_of_nothing_uses_default_or_fails_when_strict() {
        let fmt = NumberFormat::default();
        assert_eq!(fmt.average(Decimal::ZERO, 0, "avg").unwrap(), Decimal::ZERO);
        assert!(matches!(
            fmt.strict().average(Decimal::ZERO, 0, "avg"),
            Err(FrameError::DivideByZero { operation: "avg" })
        ));
        assert_eq!(fmt.average(Decimal::from(10), 3, "avg").unwrap(), dec("3.33"));
    }

    #[test]
    fn number_format_loads_from_json_with_defaults() {
        let fmt: NumberFormat = serde_json::from_str(r#"{"scale": 4, "rounding": "half_even"}"#).unwrap();
        assert_eq!(fmt.scale, 4);
        assert_eq!(fmt.rounding, RoundingMode::HalfEven);
        assert_eq!(fmt.empty_average, Some(Decimal::ZERO));
    }
}
