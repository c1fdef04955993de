//! Age derivation from a birth date.

use chrono::{Datelike, NaiveDate};

/// Whole years between `date_of_birth` and `as_of`.
///
/// Year difference, minus one if `as_of`'s (month, day) falls before the
/// birthday's. A Feb 29 birthday therefore ticks over on Mar 1 in common
/// years. Birth dates after `as_of` yield zero or negative values; rejecting
/// those is the validator's job.
pub fn compute_age(date_of_birth: NaiveDate, as_of: NaiveDate) -> i32 {
    let age = as_of.year() - date_of_birth.year();
    if (as_of.month(), as_of.day()) < (date_of_birth.month(), date_of_birth.day()) {
        age - 1
    } else {
        age
    }
}
