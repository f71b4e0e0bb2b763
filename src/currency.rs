//! Cent-quantized currency arithmetic.
//!
//! Money values are decimal with two fractional digits and are represented
//! internally as integer cents. Addition and subtraction reduce to integer
//! arithmetic, which keeps aggregates exact and associative no matter the
//! order amounts are summed in. Rounding, where a fractional result must be
//! quantized, is half away from zero.

use std::{
    fmt,
    iter::Sum,
    ops::{Add, AddAssign, Neg, Sub, SubAssign},
};

use rusqlite::{
    ToSql,
    types::{FromSql, FromSqlResult, ToSqlOutput, ValueRef},
};
use serde::{Deserialize, Serialize};

/// A money value stored as integer cents.
///
/// `Amount` is used for every monetary value in the crate: transaction
/// magnitudes, budget limits and spending totals, goal targets and balances.
/// Construct one from a decimal value with [Amount::from_major] or from user
/// input with [Amount::parse]; read it back out with [Amount::to_major] or
/// [Amount::format].
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Amount(i64);

impl Amount {
    /// Zero cents.
    pub const ZERO: Amount = Amount(0);

    /// Create an amount from a raw cent count.
    pub const fn from_cents(cents: i64) -> Self {
        Self(cents)
    }

    /// The raw value in cents.
    pub const fn cents(self) -> i64 {
        self.0
    }

    /// Create an amount from a decimal value in whole currency units.
    ///
    /// The value is quantized to cents, rounding half away from zero.
    /// Non-finite input quantizes to zero.
    pub fn from_major(value: f64) -> Self {
        if !value.is_finite() {
            return Self::ZERO;
        }

        Self((value * 100.0).round() as i64)
    }

    /// The value in whole currency units.
    pub fn to_major(self) -> f64 {
        self.0 as f64 / 100.0
    }

    /// The magnitude of the amount.
    pub const fn abs(self) -> Self {
        Self(self.0.abs())
    }

    /// Whether the amount is exactly zero.
    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }

    /// Whether the amount is below zero.
    pub const fn is_negative(self) -> bool {
        self.0 < 0
    }

    /// Scale the amount by an arbitrary factor, rounding the resulting cent
    /// count half away from zero. A non-finite factor yields zero.
    pub fn scale(self, factor: f64) -> Self {
        if !factor.is_finite() {
            return Self::ZERO;
        }

        Self((self.0 as f64 * factor).round() as i64)
    }

    /// Parse a decimal string into an amount, quantized to cents.
    ///
    /// Unparseable or non-finite input yields [Amount::ZERO] rather than an
    /// error; malformed form input is treated as "no amount entered".
    pub fn parse(input: &str) -> Self {
        input
            .trim()
            .parse::<f64>()
            .map(Self::from_major)
            .unwrap_or(Self::ZERO)
    }

    /// Format the amount as a plain decimal string.
    ///
    /// With `show_decimals` the result always carries two fractional digits
    /// (`"12.30"`); without, the amount is rounded to whole units and
    /// rendered with none (`"12"`).
    pub fn format(self, show_decimals: bool) -> String {
        if show_decimals {
            self.to_string()
        } else {
            let half = if self.0 < 0 { -50 } else { 50 };
            format!("{}", (self.0 + half) / 100)
        }
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let cents = self.0.unsigned_abs();

        write!(f, "{sign}{}.{:02}", cents / 100, cents % 100)
    }
}

impl Add for Amount {
    type Output = Amount;

    fn add(self, rhs: Amount) -> Self::Output {
        Amount(self.0 + rhs.0)
    }
}

impl AddAssign for Amount {
    fn add_assign(&mut self, rhs: Amount) {
        self.0 += rhs.0;
    }
}

impl Sub for Amount {
    type Output = Amount;

    fn sub(self, rhs: Amount) -> Self::Output {
        Amount(self.0 - rhs.0)
    }
}

impl SubAssign for Amount {
    fn sub_assign(&mut self, rhs: Amount) {
        self.0 -= rhs.0;
    }
}

impl Neg for Amount {
    type Output = Amount;

    fn neg(self) -> Self::Output {
        Amount(-self.0)
    }
}

impl Sum for Amount {
    fn sum<I: Iterator<Item = Amount>>(iter: I) -> Self {
        iter.fold(Amount::ZERO, Add::add)
    }
}

impl ToSql for Amount {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.0))
    }
}

impl FromSql for Amount {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        i64::column_result(value).map(Amount)
    }
}
