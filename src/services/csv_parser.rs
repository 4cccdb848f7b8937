use crate::error::AppError;
use crate::models::{MovementKind, TransactionRecord, MAX_AMOUNT_CENTS};
use tracing::{debug, trace, warn};

#[derive(Debug)]
pub struct ParseResult {
    pub records: Vec<TransactionRecord>,
    pub errors: Vec<String>,
}

pub fn parse_csv(content: &[u8]) -> Result<ParseResult, AppError> {
    trace!(content_size = content.len(), "Starting CSV parsing");

    let content_str =
        std::str::from_utf8(content).map_err(|e| AppError::CsvParse(e.to_string()))?;
    if content_str.trim().is_empty() {
        return Err(AppError::CsvParse("CSV file is empty".into()));
    }

    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(content_str.as_bytes());

    let headers = reader
        .headers()
        .map_err(|e| AppError::CsvParse(e.to_string()))?
        .clone();

    debug!(column_count = headers.len(), "CSV headers parsed");

    let date_col = find_column(&headers, &["date", "fecha"])
        .ok_or_else(|| AppError::CsvParse("No date column found in CSV".into()))?;
    let kind_col = find_column(&headers, &["type", "kind", "tipo"])
        .ok_or_else(|| AppError::CsvParse("No type column found in CSV".into()))?;
    let amount_col = find_column(&headers, &["amount", "monto"])
        .ok_or_else(|| AppError::CsvParse("No amount column found in CSV".into()))?;
    let category_col = find_column(&headers, &["category", "categoria"]);

    let mut records = Vec::new();
    let mut errors = Vec::new();

    for (row_idx, result) in reader.records().enumerate() {
        let row_number = row_idx + 2;

        let record = match result {
            Ok(r) => r,
            Err(e) => {
                errors.push(format!("Row {}: {}", row_number, e));
                continue;
            }
        };

        let date = record.get(date_col).unwrap_or("").trim();
        let kind = record.get(kind_col).unwrap_or("").trim();
        let amount = record.get(amount_col).unwrap_or("").trim();

        if date.is_empty() || kind.is_empty() || amount.is_empty() {
            errors.push(format!("Row {}: Missing date, type or amount", row_number));
            continue;
        }

        let kind = match kind.parse::<MovementKind>() {
            Ok(kind) => kind,
            Err(_) => {
                errors.push(format!("Row {}: Invalid type '{}'", row_number, kind));
                continue;
            }
        };

        let amount_cents = match parse_amount_cents(amount) {
            Some(cents) if cents >= 0 => cents,
            Some(_) => {
                errors.push(format!("Row {}: Negative amount '{}'", row_number, amount));
                continue;
            }
            None => {
                errors.push(format!("Row {}: Invalid amount '{}'", row_number, amount));
                continue;
            }
        };

        let mut parsed = match TransactionRecord::new(date, kind, amount_cents) {
            Ok(parsed) => parsed,
            Err(e) => {
                errors.push(format!("Row {}: {}", row_number, e));
                continue;
            }
        };
        if let Some(category) = category_col.and_then(|col| record.get(col)) {
            parsed = parsed.with_category(category.trim());
        }

        records.push(parsed);
    }

    if !errors.is_empty() {
        warn!(
            error_count = errors.len(),
            "CSV parsing completed with errors"
        );
    }
    debug!(
        row_count = records.len(),
        error_count = errors.len(),
        "CSV parsing completed"
    );

    Ok(ParseResult { records, errors })
}

fn find_column(headers: &csv::StringRecord, names: &[&str]) -> Option<usize> {
    headers.iter().position(|header| {
        names
            .iter()
            .any(|name| header.trim().eq_ignore_ascii_case(name))
    })
}

fn parse_amount_cents(amount: &str) -> Option<i64> {
    let cleaned = clean_amount(amount);
    let value = cleaned.parse::<f64>().ok()?;
    if !value.is_finite() {
        return None;
    }
    let cents = (value * 100.0).round();
    // Reject instead of letting the cast saturate.
    if cents.abs() > MAX_AMOUNT_CENTS as f64 {
        return None;
    }
    Some(cents as i64)
}

fn clean_amount(amount: &str) -> String {
    // If both . and , appear, the last one is the decimal separator
    let last_dot = amount.rfind('.');
    let last_comma = amount.rfind(',');

    let decimal_char = match (last_dot, last_comma) {
        (Some(d), Some(c)) => {
            if d > c {
                Some('.')
            } else {
                Some(',')
            }
        }
        (Some(_), None) => Some('.'),
        (None, Some(_)) => Some(','),
        (None, None) => None,
    };

    let mut result = String::new();
    let mut has_decimal = false;

    for c in amount.chars() {
        if c.is_ascii_digit() {
            result.push(c);
        } else if Some(c) == decimal_char && !has_decimal {
            result.push('.');
            has_decimal = true;
        } else if c == '-' && result.is_empty() {
            result.push(c);
        }
        // Skip thousand separators and currency symbols
    }

    result
}
