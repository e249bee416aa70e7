//! Storage helpers for exact decimal amounts.
//!
//! Amounts are stored as TEXT so that SQLite never rounds them through a
//! floating point REAL.

use std::str::FromStr;

use rusqlite::{Row, types::Type};
use rust_decimal::Decimal;

/// Read the decimal amount stored as text in column `index` of `row`.
///
/// # Errors
/// Returns [rusqlite::Error::FromSqlConversionFailure] if the column does not
/// hold a valid decimal number.
pub(crate) fn get_decimal(row: &Row, index: usize) -> Result<Decimal, rusqlite::Error> {
    let raw_amount: String = row.get(index)?;

    Decimal::from_str(&raw_amount).map_err(|error| {
        rusqlite::Error::FromSqlConversionFailure(index, Type::Text, Box::new(error))
    })
}
