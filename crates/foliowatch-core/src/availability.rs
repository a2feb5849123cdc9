// SPDX-FileCopyrightText: 2026 Foliowatch Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Availability calculation for a single folio series.

/// Computes how many identifiers remain unused in a series.
///
/// - An inactive series has nothing available.
/// - A series that has never issued a document (`counter` is `None`) has the
///   whole inclusive range available.
/// - Otherwise the count is `range_end - counter`.
///
/// Results are not clamped: a counter past the end of the range yields a
/// negative count, which the alert evaluator treats as critical.
pub fn compute(range_start: i64, range_end: i64, counter: Option<i64>, active: bool) -> i64 {
    if !active {
        return 0;
    }
    match counter {
        None => range_end - range_start + 1,
        Some(current) => range_end - current,
    }
}
