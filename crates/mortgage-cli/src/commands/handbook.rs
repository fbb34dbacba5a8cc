use serde_json::Value;

use mortgage_core::Handbook;

/// The effective handbook after any `--handbook` overrides, as JSON.
pub fn run_handbook(handbook: &Handbook) -> Result<Value, Box<dyn std::error::Error>> {
    Ok(serde_json::json!({
        "result": {
            "max_tenure": handbook.global.max_tenure,
            "max_age": handbook.global.max_age,
            "default_dsr_limit": handbook.bank_strategies.default_dsr_limit,
            "income_matrix": handbook.income_matrix,
            "banks": handbook.bank_strategies.banks,
        },
        "methodology": "Effective lending policy handbook",
        "warnings": [],
    }))
}
