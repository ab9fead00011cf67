use crate::types::{Cell, RecordSet};

pub const KG_PER_GRAM: f64 = 0.001;
/// Approximate; kept at 28.35 for parity with previously loaded data.
pub const GRAMS_PER_OUNCE: f64 = 28.35;

/// Separator of "<count> x <weight><unit>" expressions
const MULTIPLIER_SEPARATOR: &str = " x ";
/// Unit letters stripped from a multiplicative expression before splitting
const UNIT_LETTERS: [char; 4] = ['k', 'g', 'm', 'l'];

/// Convert a free-form weight token into kilograms rounded to 3 decimals.
///
/// Recognised suffixes are `kg`, `ml` (density 1), `g` preceded by a digit and
/// `oz`. A bare number is read as kilograms. Returns `None` for anything that
/// does not resolve to a finite number.
pub fn normalize_weight(cell: &Cell) -> Option<f64> {
    let token = weight_token(cell)?;
    let kg = token_to_kg(&token)?;
    kg.is_finite().then(|| round3(kg))
}

fn weight_token(cell: &Cell) -> Option<String> {
    match cell {
        Cell::Null | Cell::NoDate => None,
        Cell::Text(s) => {
            let trimmed = s.trim();
            // A trailing period is a data-entry artifact, not a decimal point
            let trimmed = trimmed.strip_suffix('.').unwrap_or(trimmed);
            Some(trimmed.trim().to_string())
        }
        other => Some(other.to_string()),
    }
}

fn token_to_kg(token: &str) -> Option<f64> {
    let mut tail = token.chars().rev();
    let last = tail.next()?;
    let before = tail.next()?;

    match (before, last) {
        ('k', 'g') => quantity(token.strip_suffix("kg")?),
        ('m', 'l') => Some(KG_PER_GRAM * quantity(token.strip_suffix("ml")?)?),
        (d, 'g') if d.is_ascii_digit() => Some(KG_PER_GRAM * quantity(token.strip_suffix('g')?)?),
        ('o', 'z') => Some(KG_PER_GRAM * GRAMS_PER_OUNCE * quantity(token.strip_suffix("oz")?)?),
        _ => parse_number(token),
    }
}

/// Numeric quantity of a suffix-free token, multiplying out "a x b".
fn quantity(token: &str) -> Option<f64> {
    if !token.contains(MULTIPLIER_SEPARATOR) {
        return parse_number(token);
    }

    let stripped = token.trim_end_matches(UNIT_LETTERS);
    let mut operands = stripped.split(MULTIPLIER_SEPARATOR);
    let count = parse_number(operands.next()?)?;
    let each = parse_number(operands.next()?)?;
    if operands.next().is_some() {
        return None;
    }
    Some(count * each)
}

fn parse_number(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok()
}

/// Round on the exact decimal value, ties to even.
fn round3(value: f64) -> f64 {
    format!("{value:.3}").parse().unwrap_or(value)
}

/// Replace every value of `column` with its weight in kilograms, dropping rows
/// whose token is invalid. Returns the number of rows dropped.
pub fn clean_weights(set: &mut RecordSet, column: &str) -> usize {
    set.filter_map_column(column, |cell| normalize_weight(cell).map(Cell::Float))
}
