use mortgage_core::display::format_money;
use mortgage_core::normalize::parse_decimal;
use serde_json::{Map, Value};

use super::{format_scalar, result_object};

/// Key answer of each command, in priority order. Searched in the result
/// object and then one level down (e.g. `summary.interest_savings`).
const PRIORITY_KEYS: [&str; 10] = [
    "installment",
    "interest_savings",
    "max_loan_amount",
    "band",
    "total_recognized_income",
    "income_deficit",
    "total",
    "cash_back",
    "max_tenure",
    "version",
];

/// Amount fields printed with thousands separators.
const MONEY_KEYS: [&str; 7] = [
    "installment",
    "interest_savings",
    "max_loan_amount",
    "total_recognized_income",
    "income_deficit",
    "total",
    "cash_back",
];

/// Print just the key answer value from the output.
pub fn print_minimal(value: &Value) {
    let Some(result) = result_object(value).or_else(|| value.as_object()) else {
        println!("{}", format_scalar(value));
        return;
    };

    for key in PRIORITY_KEYS {
        if let Some(val) = find_key(result, key) {
            println!("{}", render(key, val));
            return;
        }
    }

    if let Some((key, val)) = result.iter().next() {
        println!("{}: {}", key, format_scalar(val));
    }
}

fn find_key<'a>(map: &'a Map<String, Value>, key: &str) -> Option<&'a Value> {
    if let Some(val) = map.get(key).filter(|v| !v.is_null()) {
        return Some(val);
    }
    map.values()
        .filter_map(Value::as_object)
        .find_map(|nested| nested.get(key).filter(|v| !v.is_null()))
}

fn render(key: &str, value: &Value) -> String {
    match value {
        Value::String(s) if MONEY_KEYS.contains(&key) => format_money(parse_decimal(s)),
        _ => format_scalar(value),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_nested_key_found() {
        let result = json!({"points": [], "summary": {"interest_savings": "12345.6"}});
        let map = result.as_object().unwrap();
        let val = find_key(map, "interest_savings").unwrap();
        assert_eq!(render("interest_savings", val), "12,345.60");
    }

    #[test]
    fn test_band_printed_verbatim() {
        assert_eq!(render("band", &json!("FAIL_COST")), "FAIL_COST");
    }
}
