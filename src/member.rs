use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::decimal::Money;
use crate::types::{MemberId, MembershipFeeStatus};

/// snapshot of a member's account standing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Member {
    pub member_id: MemberId,
    pub membership_paid: bool,
    /// true while exactly one of the member's loans is under review or active
    pub has_active_loan: bool,
    pub is_account_blocked: bool,
    pub overdue_payments: bool,
    pub member_since: NaiveDate,
    pub last_payment: Option<NaiveDate>,
    #[serde(default)]
    pub membership_fee_status: MembershipFeeStatus,
    #[serde(default)]
    pub active_loan_amount: Money,
    #[serde(default)]
    pub overdue_amount: Money,
}

impl Member {
    /// member in good standing: fee paid, nothing outstanding
    pub fn in_good_standing(member_since: NaiveDate) -> Self {
        Self {
            member_id: Uuid::new_v4(),
            membership_paid: true,
            has_active_loan: false,
            is_account_blocked: false,
            overdue_payments: false,
            member_since,
            last_payment: None,
            membership_fee_status: MembershipFeeStatus::Paid,
            active_loan_amount: Money::ZERO,
            overdue_amount: Money::ZERO,
        }
    }

    pub fn with_membership_unpaid(mut self) -> Self {
        self.membership_paid = false;
        self.membership_fee_status = MembershipFeeStatus::Pending;
        self
    }

    pub fn with_overdue(mut self, amount: Money) -> Self {
        self.overdue_payments = true;
        self.overdue_amount = amount;
        self
    }

    pub fn with_blocked_account(mut self) -> Self {
        self.is_account_blocked = true;
        self
    }

    pub fn with_active_loan(mut self, amount: Money) -> Self {
        self.has_active_loan = true;
        self.active_loan_amount = amount;
        self
    }

    pub fn with_last_payment(mut self, date: NaiveDate) -> Self {
        self.last_payment = Some(date);
        self
    }
}
