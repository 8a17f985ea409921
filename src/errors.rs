use thiserror::Error;

use crate::application::FieldError;
use crate::decimal::Rate;
use crate::eligibility::IneligibilityReason;
use crate::types::{LoanId, LoanStatus, MemberId};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum LoanError {
    #[error("application invalid: {}", summarize(.errors))]
    Validation {
        errors: Vec<FieldError>,
    },

    #[error("member not eligible: {reason}")]
    Ineligible {
        reason: IneligibilityReason,
    },

    #[error("member blocked: {reason}")]
    Blocked {
        reason: IneligibilityReason,
    },

    #[error("member {member_id} already has a loan in progress")]
    ActiveLoanConflict {
        member_id: MemberId,
    },

    #[error("member not found: {member_id}")]
    MemberNotFound {
        member_id: MemberId,
    },

    #[error("loan not found: {loan_id}")]
    LoanNotFound {
        loan_id: LoanId,
    },

    #[error("invalid status transition: {from} -> {to}")]
    InvalidTransition {
        from: LoanStatus,
        to: LoanStatus,
    },

    #[error("invalid interest rate: {rate}")]
    InvalidInterestRate {
        rate: Rate,
    },

    #[error("invalid configuration: {message}")]
    InvalidConfiguration {
        message: String,
    },

    #[error("storage error: {message}")]
    Storage {
        message: String,
    },
}

fn summarize(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

pub type Result<T> = std::result::Result<T, LoanError>;
