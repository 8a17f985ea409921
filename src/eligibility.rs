use serde::{Deserialize, Serialize};
use std::fmt;

use crate::errors::LoanError;
use crate::member::Member;

/// why a member may not apply
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IneligibilityReason {
    MembershipFeeUnpaid,
    OverduePayments,
    ActiveLoanOutstanding,
}

impl IneligibilityReason {
    /// message shown to the member alongside the status badge
    pub fn member_message(&self) -> &'static str {
        match self {
            IneligibilityReason::MembershipFeeUnpaid => {
                "Membership fee payment required before applying for loans."
            }
            IneligibilityReason::OverduePayments => {
                "Account blocked due to overdue payments. Please clear outstanding dues to continue."
            }
            IneligibilityReason::ActiveLoanOutstanding => {
                "You have an active loan. Complete current loan repayment before applying for a new loan."
            }
        }
    }
}

impl fmt::Display for IneligibilityReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let reason = match self {
            IneligibilityReason::MembershipFeeUnpaid => "membership fee payment required",
            IneligibilityReason::OverduePayments => "account blocked due to overdue payments",
            IneligibilityReason::ActiveLoanOutstanding => "active loan must be completed first",
        };
        f.write_str(reason)
    }
}

/// outcome of an eligibility check
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "decision", content = "reason", rename_all = "snake_case")]
pub enum LoanDecision {
    Eligible,
    Blocked(IneligibilityReason),
    Ineligible(IneligibilityReason),
}

impl LoanDecision {
    pub fn is_eligible(&self) -> bool {
        matches!(self, LoanDecision::Eligible)
    }

    pub fn reason(&self) -> Option<IneligibilityReason> {
        match self {
            LoanDecision::Eligible => None,
            LoanDecision::Blocked(reason) | LoanDecision::Ineligible(reason) => Some(*reason),
        }
    }

    /// status badge text
    pub fn status_label(&self) -> &'static str {
        match self {
            LoanDecision::Eligible => "APPROVED",
            LoanDecision::Blocked(_) => "BLOCKED",
            LoanDecision::Ineligible(_) => "NOT ELIGIBLE",
        }
    }

    pub fn member_message(&self) -> &'static str {
        match self {
            LoanDecision::Eligible => "Eligible for loan application",
            LoanDecision::Blocked(reason) | LoanDecision::Ineligible(reason) => {
                reason.member_message()
            }
        }
    }

    /// convert a rejection into the matching error
    pub fn into_result(self) -> Result<(), LoanError> {
        match self {
            LoanDecision::Eligible => Ok(()),
            LoanDecision::Blocked(reason) => Err(LoanError::Blocked { reason }),
            LoanDecision::Ineligible(reason) => Err(LoanError::Ineligible { reason }),
        }
    }
}

/// decide whether the member may apply for a new loan.
///
/// Rules are checked in severity order and the first match wins: unpaid
/// membership, then a blocked or overdue account, then an outstanding loan.
pub fn evaluate(member: &Member) -> LoanDecision {
    if !member.membership_paid {
        LoanDecision::Ineligible(IneligibilityReason::MembershipFeeUnpaid)
    } else if member.is_account_blocked || member.overdue_payments {
        LoanDecision::Blocked(IneligibilityReason::OverduePayments)
    } else if member.has_active_loan {
        LoanDecision::Ineligible(IneligibilityReason::ActiveLoanOutstanding)
    } else {
        LoanDecision::Eligible
    }
}
