pub mod validation;

use serde::{Deserialize, Serialize};

use crate::decimal::Money;
use crate::types::LoanPurpose;

pub use validation::{
    ApplicationValidator, Field, FieldError, FieldErrorKind, ValidationResult,
};

/// third party vouching for repayment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Guarantor {
    pub name: String,
    pub phone: String,
}

impl Guarantor {
    pub fn new(name: impl Into<String>, phone: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            phone: phone.into(),
        }
    }

    /// name key used for the distinct-guarantor check
    pub fn name_key(&self) -> String {
        normalize_name(&self.name)
    }

    /// phone key used for the distinct-guarantor check
    pub fn phone_key(&self) -> String {
        normalize_phone(&self.phone)
    }
}

/// a loan application that passed field validation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanApplication {
    pub principal: Money,
    pub period_months: u32,
    pub purpose: LoanPurpose,
    pub guarantors: [Guarantor; 2],
}

/// raw submission payload, every field as entered
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoanApplicationForm {
    #[serde(default, alias = "loanAmount")]
    pub amount: Option<String>,
    #[serde(default, alias = "loanPeriod")]
    pub period: Option<String>,
    #[serde(default, alias = "loanPurpose")]
    pub purpose: Option<String>,
    #[serde(default)]
    pub guarantor1: Option<String>,
    #[serde(default)]
    pub guarantor1_phone: Option<String>,
    #[serde(default)]
    pub guarantor2: Option<String>,
    #[serde(default)]
    pub guarantor2_phone: Option<String>,
}

impl LoanApplicationForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn amount(mut self, amount: impl Into<String>) -> Self {
        self.amount = Some(amount.into());
        self
    }

    pub fn period(mut self, period: impl Into<String>) -> Self {
        self.period = Some(period.into());
        self
    }

    pub fn purpose(mut self, purpose: impl Into<String>) -> Self {
        self.purpose = Some(purpose.into());
        self
    }

    pub fn guarantor1(mut self, name: impl Into<String>, phone: impl Into<String>) -> Self {
        self.guarantor1 = Some(name.into());
        self.guarantor1_phone = Some(phone.into());
        self
    }

    pub fn guarantor2(mut self, name: impl Into<String>, phone: impl Into<String>) -> Self {
        self.guarantor2 = Some(name.into());
        self.guarantor2_phone = Some(phone.into());
        self
    }
}

impl From<&LoanApplication> for LoanApplicationForm {
    fn from(app: &LoanApplication) -> Self {
        let [g1, g2] = &app.guarantors;
        LoanApplicationForm::new()
            .amount(app.principal.to_string())
            .period(app.period_months.to_string())
            .purpose(app.purpose.as_str())
            .guarantor1(g1.name.clone(), g1.phone.clone())
            .guarantor2(g2.name.clone(), g2.phone.clone())
    }
}

pub(crate) fn normalize_name(name: &str) -> String {
    name.trim().to_lowercase()
}

pub(crate) fn normalize_phone(phone: &str) -> String {
    phone.chars().filter(|c| !c.is_whitespace()).collect()
}

/// optional `+`, then 10+ digits. Spaces and hyphens may only sit between
/// digit groups, and parentheses may only wrap a digit group, as in
/// "(0772) 654-321".
pub fn is_valid_phone(phone: &str) -> bool {
    let trimmed = phone.trim();
    let body: Vec<char> = trimmed.strip_prefix('+').unwrap_or(trimmed).chars().collect();

    let mut digits = 0;
    let mut in_parens = false;
    for (i, &c) in body.iter().enumerate() {
        let prev = i.checked_sub(1).map(|j| body[j]);
        let next = body.get(i + 1).copied();
        match c {
            '0'..='9' => digits += 1,
            ' ' | '-' => {
                let after_group = matches!(prev, Some('0'..='9' | ')'));
                let before_group = matches!(next, Some('0'..='9' | '('));
                if !after_group || !before_group {
                    return false;
                }
            }
            '(' => {
                if in_parens || !matches!(next, Some('0'..='9')) {
                    return false;
                }
                in_parens = true;
            }
            ')' => {
                if !in_parens || !matches!(prev, Some('0'..='9')) {
                    return false;
                }
                in_parens = false;
            }
            _ => return false,
        }
    }

    !in_parens && matches!(body.last(), Some('0'..='9')) && digits >= 10
}
