use super::model::CellValue;

/// Outcome of coercing one column.
#[derive(Debug, Clone, PartialEq)]
pub struct Coerced {
    pub values: Vec<CellValue>,
    /// Whether the column was converted to numbers.
    pub numeric: bool,
    /// Text cells that could not be parsed and became `Null`.
    pub lost: usize,
}

/// Parse a single text cell as a number. Integers stay integers.
pub fn parse_number(s: &str) -> Option<CellValue> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    if let Ok(i) = s.parse::<i64>() {
        return Some(CellValue::Integer(i));
    }
    match s.parse::<f64>() {
        Ok(f) if f.is_finite() => Some(CellValue::Float(f)),
        _ => None,
    }
}

/// Coerce a column of cells.
///
/// A column holding text is numeric-convertible when at least one non-blank
/// text cell parses. Convertible columns turn every unparseable text cell
/// into `Null`; other columns keep their text. Blank text is always `Null`.
/// Never fails.
pub fn coerce_column(values: Vec<CellValue>) -> Coerced {
    let mut any_text = false;
    let mut any_parse = false;
    for v in &values {
        if let CellValue::Text(s) = v {
            if s.trim().is_empty() {
                continue;
            }
            any_text = true;
            if parse_number(s).is_some() {
                any_parse = true;
                break;
            }
        }
    }

    if !any_text || !any_parse {
        return Coerced {
            values: values.into_iter().map(blank_to_null).collect(),
            numeric: false,
            lost: 0,
        };
    }

    let mut lost = 0;
    let values = values
        .into_iter()
        .map(|v| match v {
            CellValue::Text(s) => match parse_number(&s) {
                Some(n) => n,
                None => {
                    if !s.trim().is_empty() {
                        lost += 1;
                    }
                    CellValue::Null
                }
            },
            CellValue::Bool(_) => {
                lost += 1;
                CellValue::Null
            }
            other => other,
        })
        .collect();

    Coerced {
        values,
        numeric: true,
        lost,
    }
}

/// Label columns only lose their blank cells.
pub fn blank_to_null(v: CellValue) -> CellValue {
    match v {
        CellValue::Text(s) if s.trim().is_empty() => CellValue::Null,
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(s: &str) -> CellValue {
        CellValue::Text(s.to_string())
    }

    #[test]
    fn mixed_column_becomes_numbers_and_nulls() {
        let out = coerce_column(vec![text("12.5"), text("n/a"), text(" 7 "), text("")]);
        assert!(out.numeric);
        assert_eq!(
            out.values,
            vec![
                CellValue::Float(12.5),
                CellValue::Null,
                CellValue::Integer(7),
                CellValue::Null
            ]
        );
        assert_eq!(out.lost, 1);
    }

    #[test]
    fn all_text_column_is_left_alone() {
        let out = coerce_column(vec![text("north"), text("south"), text("  ")]);
        assert!(!out.numeric);
        assert_eq!(out.values, vec![text("north"), text("south"), CellValue::Null]);
    }

    #[test]
    fn already_numeric_column_is_untouched() {
        let values = vec![CellValue::Float(1.0), CellValue::Null, CellValue::Integer(3)];
        let out = coerce_column(values.clone());
        assert!(!out.numeric);
        assert_eq!(out.values, values);
    }

    #[test]
    fn numeric_text_next_to_typed_numbers() {
        let out = coerce_column(vec![CellValue::Float(1.5), text("2"), text("x")]);
        assert_eq!(
            out.values,
            vec![CellValue::Float(1.5), CellValue::Integer(2), CellValue::Null]
        );
    }

    #[test]
    fn non_finite_text_is_not_a_number() {
        assert_eq!(parse_number("inf"), None);
        assert_eq!(parse_number("NaN"), None);
        assert_eq!(parse_number("-3.25e1"), Some(CellValue::Float(-32.5)));
    }
}
