use serde::Serialize;

use super::domain::Tenant;

/// Required income multiple when qualifying on gross income.
pub const GROSS_INCOME_MULTIPLIER: f64 = 2.5;
/// Required income multiple when qualifying on net income. Net figures get
/// the stricter multiplier because they already exclude deductions.
pub const NET_INCOME_MULTIPLIER: f64 = 3.0;

/// Which income figure a qualification verdict was computed from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IncomeBasis {
    Gross,
    Net,
}

/// Verdict of the income multiple check. The ratio is reported whenever an
/// income figure exists, qualified or not, so callers can show how far off
/// an applicant is.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IncomeQualification {
    pub qualified: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ratio: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub basis: Option<IncomeBasis>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

/// Verdict of the disposable-income check. Exactly one of
/// `disposable_after_rent` and `shortfall` is populated when an income
/// signal exists.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AffordabilityCheck {
    pub affordable: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub disposable_after_rent: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shortfall: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ratio: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

fn round_2dp(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Pure check of whether a tenant's income clears the required multiple of
/// the rent. Gross income is preferred and gets the more lenient
/// multiplier; net income is the fallback.
pub fn check_income_qualification(tenant: &Tenant, monthly_rent: f64) -> IncomeQualification {
    if !(monthly_rent.is_finite() && monthly_rent > 0.0) {
        return IncomeQualification {
            qualified: false,
            ratio: None,
            basis: None,
            reason: Some("monthly rent must be a positive amount".to_string()),
        };
    }

    let employment = tenant.employment.as_ref();
    let gross = employment.and_then(|details| details.gross_monthly_income);
    let net = employment.and_then(|details| details.net_monthly_income);

    let (income, multiplier, basis) = match (gross, net) {
        (Some(income), _) => (income, GROSS_INCOME_MULTIPLIER, IncomeBasis::Gross),
        (None, Some(income)) => (income, NET_INCOME_MULTIPLIER, IncomeBasis::Net),
        (None, None) => {
            return IncomeQualification {
                qualified: false,
                ratio: None,
                basis: None,
                reason: Some("no income information provided".to_string()),
            };
        }
    };

    let required = monthly_rent * multiplier;
    let qualified = income >= required;
    let ratio = round_2dp(income / monthly_rent);
    let reason = if qualified {
        None
    } else {
        Some(format!(
            "income {income:.2} below required {required:.2} ({multiplier:.1}x rent)"
        ))
    };

    IncomeQualification {
        qualified,
        ratio: Some(ratio),
        basis: Some(basis),
        reason,
    }
}

/// Pure check of whether a tenant's disposable income covers the rent.
/// Uses the explicit affordability assessment when present; otherwise falls
/// back to employment gross income with zero assumed outgoings. Fails
/// closed when no income signal exists at all.
pub fn check_affordability(tenant: &Tenant, monthly_rent: f64) -> AffordabilityCheck {
    if !(monthly_rent.is_finite() && monthly_rent > 0.0) {
        return AffordabilityCheck {
            affordable: false,
            disposable_after_rent: None,
            shortfall: None,
            ratio: None,
            reason: Some("monthly rent must be a positive amount".to_string()),
        };
    }

    let disposable = match &tenant.affordability {
        Some(assessment) => {
            assessment.monthly_income - assessment.monthly_expenses - assessment.monthly_commitments
        }
        None => match tenant
            .employment
            .as_ref()
            .and_then(|details| details.gross_monthly_income)
        {
            Some(income) => income,
            None => {
                return AffordabilityCheck {
                    affordable: false,
                    disposable_after_rent: None,
                    shortfall: None,
                    ratio: None,
                    reason: Some("no income data".to_string()),
                };
            }
        },
    };

    let ratio = round_2dp(disposable / monthly_rent);
    if disposable >= monthly_rent {
        AffordabilityCheck {
            affordable: true,
            disposable_after_rent: Some(round_2dp(disposable - monthly_rent)),
            shortfall: None,
            ratio: Some(ratio),
            reason: None,
        }
    } else {
        AffordabilityCheck {
            affordable: false,
            disposable_after_rent: None,
            shortfall: Some(round_2dp(monthly_rent - disposable)),
            ratio: Some(ratio),
            reason: Some("disposable income does not cover the rent".to_string()),
        }
    }
}
