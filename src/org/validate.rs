use rust_decimal::{Decimal, RoundingStrategy};
use std::collections::HashSet;
use std::str::FromStr;

use super::OrgError;
use crate::models::{BudgetLine, CostCode};

/// Largest amount a DECIMAL(12,2) column can hold: 9,999,999,999.99.
const MAX_AMOUNT: Decimal = Decimal::from_parts(3_567_587_327, 232, 0, false, 2);

pub(crate) fn validate_name(name: &str) -> Result<String, OrgError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(OrgError::invalid("Department name must not be empty"));
    }
    Ok(trimmed.to_string())
}

/// Parse a user-entered amount. `$`, `,` and surrounding whitespace are ignored.
pub(crate) fn parse_amount(raw: &str) -> Result<Decimal, OrgError> {
    let cleaned = raw.replace(['$', ','], "");
    Decimal::from_str(cleaned.trim())
        .map_err(|_| OrgError::invalid(format!("Invalid amount: {raw}")))
}

pub(crate) fn parse_cost_code(raw: &str) -> Result<CostCode, OrgError> {
    CostCode::parse(raw).ok_or_else(|| {
        let codes: Vec<&str> = CostCode::all().iter().map(|c| c.as_str()).collect();
        OrgError::invalid(format!(
            "Unknown cost code '{raw}'. Expected one of: {}",
            codes.join(", ")
        ))
    })
}

pub(crate) fn parse_budget_line(
    code: &str,
    allocated: &str,
    spent: &str,
) -> Result<BudgetLine, OrgError> {
    Ok(BudgetLine::new(
        parse_cost_code(code)?,
        parse_amount(allocated)?,
        parse_amount(spent)?,
    ))
}

/// Check a replacement set and normalise amounts to 2 fraction digits.
///
/// Rejects negative or out-of-range amounts and repeated cost codes.
pub(crate) fn validate_budget_lines(lines: &[BudgetLine]) -> Result<Vec<BudgetLine>, OrgError> {
    let mut seen = HashSet::new();
    let mut normalized = Vec::with_capacity(lines.len());
    for line in lines {
        if !seen.insert(line.cost_code) {
            return Err(OrgError::invalid(format!(
                "Duplicate cost code: {}",
                line.cost_code
            )));
        }
        let allocated = check_amount(line.cost_code, "allocatedAmount", line.allocated_amount)?;
        let spent = check_amount(line.cost_code, "spentAmount", line.spent_amount)?;
        normalized.push(BudgetLine::new(line.cost_code, allocated, spent));
    }
    Ok(normalized)
}

fn check_amount(code: CostCode, field: &str, amount: Decimal) -> Result<Decimal, OrgError> {
    if amount.is_sign_negative() && !amount.is_zero() {
        return Err(OrgError::invalid(format!(
            "{code}: {field} must not be less than 0"
        )));
    }
    let rounded = amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    if rounded > MAX_AMOUNT {
        return Err(OrgError::invalid(format!(
            "{code}: {field} exceeds the maximum of {MAX_AMOUNT}"
        )));
    }
    Ok(rounded.abs())
}
