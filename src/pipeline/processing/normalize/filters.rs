use crate::types::{Cell, RecordSet};

/// Literal substring replacement on every text value of `column`.
/// Non-text cells are left alone and an empty pattern is a no-op.
pub fn replace_text(set: &mut RecordSet, column: &str, pattern: &str, replacement: &str) {
    if pattern.is_empty() || !set.has_column(column) {
        return;
    }
    set.map_column(column, |cell| match cell {
        Cell::Text(s) => Cell::Text(s.replace(pattern, replacement)),
        other => other.clone(),
    });
}

/// Drop every row whose `column` value is not one of `allowed`.
pub fn filter_allowed(set: &mut RecordSet, column: &str, allowed: &[String]) -> usize {
    let before = set.len();
    set.retain_rows(|row| {
        row.get(column)
            .and_then(Cell::as_str)
            .is_some_and(|v| allowed.iter().any(|a| a == v))
    });
    before - set.len()
}

/// Whether a value converts to a whole number without error.
pub fn is_integer(cell: &Cell) -> bool {
    match cell {
        Cell::Int(_) | Cell::Bool(_) => true,
        Cell::Float(f) => f.is_finite(),
        Cell::Text(s) => {
            let trimmed = s.trim();
            let digits = trimmed.strip_prefix(['+', '-']).unwrap_or(trimmed);
            !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit())
        }
        Cell::Null | Cell::Date(_) | Cell::NoDate => false,
    }
}

/// Keep only rows whose `column` value is integer-like; values are not rewritten.
pub fn filter_integers(set: &mut RecordSet, column: &str) -> usize {
    let before = set.len();
    set.retain_rows(|row| row.get(column).is_some_and(is_integer));
    before - set.len()
}

/// Remove the named columns when present. Returns the columns actually removed.
pub fn drop_columns(set: &mut RecordSet, columns: &[String]) -> Vec<String> {
    columns
        .iter()
        .filter(|c| set.drop_column(c))
        .cloned()
        .collect()
}
