//! Money formatting for the plain-text report.
//!
//! Format: sign + currency symbol + number with thousands separator.
//! Amounts stay in cents everywhere else; only output goes through here.

/// Format cents with a sign prefix for non-zero amounts, e.g. "+S/1,234.50".
pub fn format_money(cents: i64, currency: &str, locale: &str) -> String {
    let sign = if cents > 0 {
        "+"
    } else if cents < 0 {
        "-"
    } else {
        ""
    };
    format!("{}{}", sign, format_money_neutral(cents, currency, locale))
}

/// Format cents without sign prefix, e.g. "S/1,234.50".
pub fn format_money_neutral(cents: i64, currency: &str, locale: &str) -> String {
    let abs_cents = cents.abs();
    let whole = abs_cents / 100;
    let fractional = abs_cents % 100;

    let (thousands_sep, decimal_sep) = locale_separators(locale);
    let whole_str = format_with_thousands(whole, thousands_sep);
    let symbol = currency_symbol(currency);

    format!("{}{}{}{:02}", symbol, whole_str, decimal_sep, fractional)
}

/// Format a share of a total with two decimals, e.g. "12.35%".
pub fn format_percent(value: f64, locale: &str) -> String {
    let (_, decimal_sep) = locale_separators(locale);
    let hundredths = (value.abs() * 100.0).round() as i64;
    let sign = if value < 0.0 && hundredths > 0 { "-" } else { "" };

    format!(
        "{}{}{}{:02}%",
        sign,
        hundredths / 100,
        decimal_sep,
        hundredths % 100
    )
}

/// Get thousands and decimal separators based on locale.
fn locale_separators(locale: &str) -> (char, char) {
    match locale {
        "de-DE" | "de-AT" | "fr-FR" | "es-ES" | "es-AR" | "es-CO" | "es-CL" | "it-IT"
        | "pt-BR" | "pt-PT" | "nl-NL" | "id-ID" | "tr-TR" => ('.', ','),
        // es-PE, es-MX, en-* and most others
        _ => (',', '.'),
    }
}

fn format_with_thousands(n: i64, sep: char) -> String {
    if n == 0 {
        return "0".to_string();
    }

    let s = n.to_string();
    let chars: Vec<char> = s.chars().rev().collect();
    let mut result = Vec::new();

    for (i, c) in chars.iter().enumerate() {
        if i > 0 && i % 3 == 0 {
            result.push(sep);
        }
        result.push(*c);
    }

    result.iter().rev().collect()
}

fn currency_symbol(currency: &str) -> &'static str {
    match currency.to_uppercase().as_str() {
        "PEN" => "S/",
        "USD" => "$",
        "EUR" => "\u{20ac}",
        "GBP" => "\u{00a3}",
        "JPY" => "\u{00a5}",
        "BRL" => "R$",
        "MXN" => "MX$",
        "CLP" => "CLP$",
        "COP" => "COL$",
        "ARS" => "AR$",
        "CAD" => "C$",
        "AUD" => "A$",
        "CHF" => "CHF\u{00a0}",
        _ => "$",
    }
}
