use serde::{Deserialize, Serialize};
use std::fmt;

use super::{is_valid_phone, normalize_name, normalize_phone, Guarantor, LoanApplication, LoanApplicationForm};
use crate::config::{LoanPolicy, ValidationMode};
use crate::decimal::Money;
use crate::types::LoanPurpose;

/// application field an error refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    Amount,
    Period,
    Purpose,
    Guarantor1Name,
    Guarantor1Phone,
    Guarantor2Name,
    Guarantor2Phone,
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Field::Amount => "amount",
            Field::Period => "period",
            Field::Purpose => "purpose",
            Field::Guarantor1Name => "guarantor1",
            Field::Guarantor1Phone => "guarantor1_phone",
            Field::Guarantor2Name => "guarantor2",
            Field::Guarantor2Phone => "guarantor2_phone",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FieldErrorKind {
    Required,
    NotNumeric,
    NotWholeAmount,
    BelowMinimum { minimum: Money },
    AboveMaximum { maximum: Money },
    PeriodNotOffered { offered: Vec<u32> },
    UnknownPurpose,
    InvalidPhone,
    DuplicateGuarantorName,
    DuplicateGuarantorPhone,
}

/// one violated rule
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    pub field: Field,
    #[serde(flatten)]
    pub kind: FieldErrorKind,
}

impl FieldError {
    pub fn new(field: Field, kind: FieldErrorKind) -> Self {
        Self { field, kind }
    }

    /// message for the member filling in the form
    pub fn message(&self) -> String {
        match (&self.kind, self.field) {
            (FieldErrorKind::Required, Field::Amount) => "Please enter the loan amount.".to_string(),
            (FieldErrorKind::Required, Field::Period) => "Please select a loan period.".to_string(),
            (FieldErrorKind::Required, Field::Purpose) => "Please select the loan purpose.".to_string(),
            (FieldErrorKind::Required, Field::Guarantor1Name | Field::Guarantor1Phone) => {
                "Please provide details for Guarantor 1.".to_string()
            }
            (FieldErrorKind::Required, Field::Guarantor2Name | Field::Guarantor2Phone) => {
                "Please provide details for Guarantor 2.".to_string()
            }
            (FieldErrorKind::NotNumeric, Field::Period) => "Loan period must be a whole number of months.".to_string(),
            (FieldErrorKind::NotNumeric, _) => "Loan amount must be a number.".to_string(),
            (FieldErrorKind::NotWholeAmount, _) => {
                "Loan amount must be in whole shillings.".to_string()
            }
            (FieldErrorKind::BelowMinimum { minimum }, _) => {
                format!("Minimum loan amount is UGX {}.", minimum.grouped())
            }
            (FieldErrorKind::AboveMaximum { maximum }, _) => {
                format!("Maximum loan amount is UGX {}.", maximum.grouped())
            }
            (FieldErrorKind::PeriodNotOffered { offered }, _) => format!(
                "Loan period must be one of {} months.",
                offered
                    .iter()
                    .map(|m| m.to_string())
                    .collect::<Vec<_>>()
                    .join(", ")
            ),
            (FieldErrorKind::UnknownPurpose, _) => "Please select the loan purpose.".to_string(),
            (FieldErrorKind::InvalidPhone, Field::Guarantor1Phone) => {
                "Please provide a valid phone number for Guarantor 1.".to_string()
            }
            (FieldErrorKind::InvalidPhone, _) => {
                "Please provide a valid phone number for Guarantor 2.".to_string()
            }
            (FieldErrorKind::DuplicateGuarantorName, _) => "Guarantors must be different persons.".to_string(),
            (FieldErrorKind::DuplicateGuarantorPhone, _) => {
                "Guarantors must have different phone numbers.".to_string()
            }
        }
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message())
    }
}

/// result of validating a submitted form
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationResult {
    Valid(LoanApplication),
    /// never empty, in rule order
    Invalid(Vec<FieldError>),
}

impl ValidationResult {
    pub fn is_valid(&self) -> bool {
        matches!(self, ValidationResult::Valid(_))
    }

    pub fn errors(&self) -> &[FieldError] {
        match self {
            ValidationResult::Valid(_) => &[],
            ValidationResult::Invalid(errors) => errors,
        }
    }

    pub fn into_result(self) -> crate::errors::Result<LoanApplication> {
        match self {
            ValidationResult::Valid(app) => Ok(app),
            ValidationResult::Invalid(errors) => Err(crate::errors::LoanError::Validation { errors }),
        }
    }
}

/// collects errors, stopping early in fail-fast mode
struct Collector {
    mode: ValidationMode,
    errors: Vec<FieldError>,
}

impl Collector {
    fn push(&mut self, field: Field, kind: FieldErrorKind) {
        self.errors.push(FieldError::new(field, kind));
    }

    fn done(&self) -> bool {
        self.mode == ValidationMode::FailFast && !self.errors.is_empty()
    }
}

/// field-level checks for loan applications
#[derive(Debug, Clone)]
pub struct ApplicationValidator {
    minimum_principal: Money,
    maximum_principal: Money,
    offered_periods: Vec<u32>,
    mode: ValidationMode,
}

impl ApplicationValidator {
    pub fn new(policy: &LoanPolicy) -> Self {
        Self {
            minimum_principal: policy.minimum_principal,
            maximum_principal: policy.maximum_principal,
            offered_periods: policy.offered_periods.clone(),
            mode: policy.validation_mode,
        }
    }

    /// validate a submitted form, producing a typed application
    pub fn validate(&self, form: &LoanApplicationForm) -> ValidationResult {
        let mut c = Collector {
            mode: self.mode,
            errors: Vec::new(),
        };

        let principal = self.check_amount(form.amount.as_deref(), &mut c);
        if c.done() {
            return ValidationResult::Invalid(c.errors);
        }

        let period = self.check_period(form.period.as_deref(), &mut c);
        if c.done() {
            return ValidationResult::Invalid(c.errors);
        }

        let purpose = check_purpose(form.purpose.as_deref(), &mut c);
        if c.done() {
            return ValidationResult::Invalid(c.errors);
        }

        let g1_name = required_text(form.guarantor1.as_deref(), Field::Guarantor1Name, &mut c);
        if c.done() {
            return ValidationResult::Invalid(c.errors);
        }
        let g1_phone = required_text(form.guarantor1_phone.as_deref(), Field::Guarantor1Phone, &mut c);
        if c.done() {
            return ValidationResult::Invalid(c.errors);
        }

        let g2_name = required_text(form.guarantor2.as_deref(), Field::Guarantor2Name, &mut c);
        if c.done() {
            return ValidationResult::Invalid(c.errors);
        }
        let g2_phone = required_text(form.guarantor2_phone.as_deref(), Field::Guarantor2Phone, &mut c);
        if c.done() {
            return ValidationResult::Invalid(c.errors);
        }

        let g1_phone = g1_phone.filter(|p| check_phone(p, Field::Guarantor1Phone, &mut c));
        if c.done() {
            return ValidationResult::Invalid(c.errors);
        }

        let g2_phone = g2_phone.filter(|p| check_phone(p, Field::Guarantor2Phone, &mut c));
        if c.done() {
            return ValidationResult::Invalid(c.errors);
        }

        if let (Some(a), Some(b)) = (g1_name, g2_name) {
            if normalize_name(a) == normalize_name(b) {
                c.push(Field::Guarantor2Name, FieldErrorKind::DuplicateGuarantorName);
                if c.done() {
                    return ValidationResult::Invalid(c.errors);
                }
            }
        }

        if let (Some(a), Some(b)) = (g1_phone, g2_phone) {
            if normalize_phone(a) == normalize_phone(b) {
                c.push(Field::Guarantor2Phone, FieldErrorKind::DuplicateGuarantorPhone);
            }
        }

        if !c.errors.is_empty() {
            return ValidationResult::Invalid(c.errors);
        }

        match (principal, period, purpose, g1_name, g1_phone, g2_name, g2_phone) {
            (Some(principal), Some(period_months), Some(purpose), Some(n1), Some(p1), Some(n2), Some(p2)) => {
                ValidationResult::Valid(LoanApplication {
                    principal,
                    period_months,
                    purpose,
                    guarantors: [
                        Guarantor::new(n1.trim(), p1.trim()),
                        Guarantor::new(n2.trim(), p2.trim()),
                    ],
                })
            }
            // every missing value above pushed an error
            _ => ValidationResult::Invalid(c.errors),
        }
    }

    /// re-check an already typed application against this policy
    pub fn validate_application(&self, application: &LoanApplication) -> ValidationResult {
        self.validate(&LoanApplicationForm::from(application))
    }

    fn check_amount(&self, raw: Option<&str>, c: &mut Collector) -> Option<Money> {
        let raw = match raw.map(str::trim).filter(|s| !s.is_empty()) {
            Some(raw) => raw,
            None => {
                c.push(Field::Amount, FieldErrorKind::Required);
                return None;
            }
        };

        let amount = match Money::parse_grouped(raw) {
            Some(amount) => amount,
            None => {
                c.push(Field::Amount, FieldErrorKind::NotNumeric);
                return None;
            }
        };

        if !amount.as_decimal().fract().is_zero() {
            c.push(Field::Amount, FieldErrorKind::NotWholeAmount);
            return None;
        }

        if amount < self.minimum_principal {
            c.push(
                Field::Amount,
                FieldErrorKind::BelowMinimum {
                    minimum: self.minimum_principal,
                },
            );
            return None;
        }

        if amount > self.maximum_principal {
            c.push(
                Field::Amount,
                FieldErrorKind::AboveMaximum {
                    maximum: self.maximum_principal,
                },
            );
            return None;
        }

        Some(amount)
    }

    fn check_period(&self, raw: Option<&str>, c: &mut Collector) -> Option<u32> {
        let raw = match raw.map(str::trim).filter(|s| !s.is_empty()) {
            Some(raw) => raw,
            None => {
                c.push(Field::Period, FieldErrorKind::Required);
                return None;
            }
        };

        let months = match raw.parse::<u32>() {
            Ok(months) => months,
            Err(_) => {
                c.push(Field::Period, FieldErrorKind::NotNumeric);
                return None;
            }
        };

        if !self.offered_periods.contains(&months) {
            c.push(
                Field::Period,
                FieldErrorKind::PeriodNotOffered {
                    offered: self.offered_periods.clone(),
                },
            );
            return None;
        }

        Some(months)
    }
}

fn check_purpose(raw: Option<&str>, c: &mut Collector) -> Option<LoanPurpose> {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        None => {
            c.push(Field::Purpose, FieldErrorKind::Required);
            None
        }
        Some(raw) => match raw.parse::<LoanPurpose>() {
            Ok(purpose) => Some(purpose),
            Err(_) => {
                c.push(Field::Purpose, FieldErrorKind::UnknownPurpose);
                None
            }
        },
    }
}

fn required_text<'a>(raw: Option<&'a str>, field: Field, c: &mut Collector) -> Option<&'a str> {
    match raw.filter(|s| !s.trim().is_empty()) {
        Some(value) => Some(value),
        None => {
            c.push(field, FieldErrorKind::Required);
            None
        }
    }
}

fn check_phone(phone: &str, field: Field, c: &mut Collector) -> bool {
    if is_valid_phone(phone) {
        true
    } else {
        c.push(field, FieldErrorKind::InvalidPhone);
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn validator() -> ApplicationValidator {
        ApplicationValidator::new(&LoanPolicy::cooperative())
    }

    fn fail_fast() -> ApplicationValidator {
        ApplicationValidator::new(
            &LoanPolicy::cooperative().with_validation_mode(ValidationMode::FailFast),
        )
    }

    fn good_form() -> LoanApplicationForm {
        LoanApplicationForm::new()
            .amount("500,000")
            .period("6")
            .purpose("business")
            .guarantor1("Grace Nakato", "0700 123 456")
            .guarantor2("John Okello", "+256 772 654 321")
    }

    #[test]
    fn test_valid_form_produces_application() {
        match validator().validate(&good_form()) {
            ValidationResult::Valid(app) => {
                assert_eq!(app.principal, Money::from_major(500_000));
                assert_eq!(app.period_months, 6);
                assert_eq!(app.purpose, LoanPurpose::Business);
                assert_eq!(app.guarantors[0].name, "Grace Nakato");
                assert_eq!(app.guarantors[1].phone, "+256 772 654 321");
            }
            ValidationResult::Invalid(errors) => panic!("unexpected errors: {errors:?}"),
        }
    }

    #[test]
    fn test_amount_bounds() {
        let below = validator().validate(&good_form().amount("40000"));
        assert_eq!(
            below.errors(),
            &[FieldError::new(
                Field::Amount,
                FieldErrorKind::BelowMinimum {
                    minimum: Money::from_major(50_000)
                }
            )]
        );
        assert_eq!(below.errors()[0].message(), "Minimum loan amount is UGX 50,000.");

        let above = validator().validate(&good_form().amount("2,500,000"));
        assert_eq!(above.errors().len(), 1);
        assert_eq!(above.errors()[0].message(), "Maximum loan amount is UGX 2,000,000.");

        // bounds are inclusive
        assert!(validator().validate(&good_form().amount("50000")).is_valid());
        assert!(validator().validate(&good_form().amount("2000000")).is_valid());
    }

    #[test]
    fn test_amount_required_and_numeric() {
        let mut form = good_form();
        form.amount = None;
        assert_eq!(validator().validate(&form).errors()[0].kind, FieldErrorKind::Required);

        let result = validator().validate(&good_form().amount("   "));
        assert_eq!(result.errors()[0].kind, FieldErrorKind::Required);

        let result = validator().validate(&good_form().amount("lots"));
        assert_eq!(result.errors()[0].kind, FieldErrorKind::NotNumeric);
    }

    #[test]
    fn test_amount_must_be_whole_shillings() {
        let result = validator().validate(&good_form().amount("75000.5"));
        assert_eq!(
            result.errors(),
            &[FieldError::new(Field::Amount, FieldErrorKind::NotWholeAmount)]
        );
        assert_eq!(
            result.errors()[0].message(),
            "Loan amount must be in whole shillings."
        );

        // trailing zero decimals are still a whole amount
        match validator().validate(&good_form().amount("75,000.00")) {
            ValidationResult::Valid(app) => assert_eq!(app.principal, Money::from_major(75_000)),
            ValidationResult::Invalid(errors) => panic!("unexpected errors: {errors:?}"),
        }
    }

    #[test]
    fn test_period_must_be_offered() {
        let result = validator().validate(&good_form().period("7"));
        assert_eq!(result.errors()[0].field, Field::Period);
        assert!(matches!(
            result.errors()[0].kind,
            FieldErrorKind::PeriodNotOffered { .. }
        ));

        let result = validator().validate(&good_form().period("six"));
        assert_eq!(result.errors()[0].kind, FieldErrorKind::NotNumeric);

        let result = validator().validate(&good_form().period("0"));
        assert_eq!(result.errors()[0].field, Field::Period);
    }

    #[test]
    fn test_purpose_must_be_known() {
        let result = validator().validate(&good_form().purpose("holiday"));
        assert_eq!(
            result.errors(),
            &[FieldError::new(Field::Purpose, FieldErrorKind::UnknownPurpose)]
        );
        assert!(validator().validate(&good_form().purpose("EDUCATION")).is_valid());
    }

    #[test]
    fn test_guarantor_details_required() {
        let form = good_form().guarantor2("   ", "");
        let result = validator().validate(&form);
        assert_eq!(
            result.errors(),
            &[
                FieldError::new(Field::Guarantor2Name, FieldErrorKind::Required),
                FieldError::new(Field::Guarantor2Phone, FieldErrorKind::Required),
            ]
        );
        assert_eq!(
            result.errors()[0].message(),
            "Please provide details for Guarantor 2."
        );
    }

    #[test]
    fn test_invalid_phone() {
        let result = validator().validate(&good_form().guarantor1("Grace Nakato", "07001"));
        assert_eq!(
            result.errors(),
            &[FieldError::new(Field::Guarantor1Phone, FieldErrorKind::InvalidPhone)]
        );
    }

    #[test]
    fn test_identical_phones_rejected_even_with_different_names() {
        let form = good_form()
            .guarantor1("Grace Nakato", "0700 123 456")
            .guarantor2("John Okello", "0700123456");
        let result = validator().validate(&form);
        assert_eq!(
            result.errors(),
            &[FieldError::new(
                Field::Guarantor2Phone,
                FieldErrorKind::DuplicateGuarantorPhone
            )]
        );
    }

    #[test]
    fn test_same_guarantor_name_rejected_case_insensitively() {
        let form = good_form()
            .guarantor1("Grace Nakato", "0700123456")
            .guarantor2("  grace NAKATO ", "0772654321");
        let result = validator().validate(&form);
        assert_eq!(
            result.errors(),
            &[FieldError::new(
                Field::Guarantor2Name,
                FieldErrorKind::DuplicateGuarantorName
            )]
        );
    }

    #[test]
    fn test_collect_all_reports_every_violation_in_order() {
        let form = LoanApplicationForm::new()
            .amount("10,000")
            .period("5")
            .guarantor1("Grace", "123")
            .guarantor2("grace", "123");
        let fields: Vec<Field> = validator()
            .validate(&form)
            .errors()
            .iter()
            .map(|e| e.field)
            .collect();
        assert_eq!(
            fields,
            vec![
                Field::Amount,
                Field::Period,
                Field::Purpose,
                Field::Guarantor1Phone,
                Field::Guarantor2Phone,
                Field::Guarantor2Name,
            ]
        );
    }

    #[test]
    fn test_fail_fast_stops_at_first_violation() {
        let form = LoanApplicationForm::new()
            .amount("10,000")
            .period("5")
            .guarantor1("Grace", "123")
            .guarantor2("grace", "123");
        let result = fail_fast().validate(&form);
        assert_eq!(result.errors().len(), 1);
        assert_eq!(result.errors()[0].field, Field::Amount);

        assert!(fail_fast().validate(&good_form()).is_valid());
    }

    #[test]
    fn test_fail_fast_reports_one_error_for_missing_guarantor() {
        let mut form = good_form();
        form.guarantor1 = None;
        form.guarantor1_phone = None;
        assert_eq!(
            fail_fast().validate(&form).errors(),
            &[FieldError::new(Field::Guarantor1Name, FieldErrorKind::Required)]
        );

        let form = good_form().guarantor2("", "  ");
        assert_eq!(
            fail_fast().validate(&form).errors(),
            &[FieldError::new(Field::Guarantor2Name, FieldErrorKind::Required)]
        );

        // collect-all still reports both fields
        let mut form = good_form();
        form.guarantor1 = None;
        form.guarantor1_phone = None;
        assert_eq!(validator().validate(&form).errors().len(), 2);
    }

    #[test]
    fn test_validate_typed_application() {
        let app = match validator().validate(&good_form()) {
            ValidationResult::Valid(app) => app,
            ValidationResult::Invalid(errors) => panic!("unexpected errors: {errors:?}"),
        };
        assert!(validator().validate_application(&app).is_valid());

        let mut too_big = app.clone();
        too_big.principal = Money::from_major(3_000_000);
        assert!(!validator().validate_application(&too_big).is_valid());
    }

    #[test]
    fn test_invalid_result_converts_to_error() {
        let err = validator()
            .validate(&good_form().amount("1"))
            .into_result()
            .unwrap_err();
        assert!(err.to_string().contains("Minimum loan amount is UGX 50,000."));
    }
}
