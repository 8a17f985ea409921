use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::application::{Guarantor, LoanApplication};
use crate::decimal::Money;
use crate::errors::{LoanError, Result};
use crate::repayment::{RepaymentSchedule, ScheduledInstallment};
use crate::types::{LoanId, LoanPurpose, LoanStatus, MemberId};

/// loan record owned by the store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Loan {
    pub loan_id: LoanId,
    pub member_id: MemberId,
    pub purpose: LoanPurpose,
    pub guarantors: [Guarantor; 2],
    pub schedule: RepaymentSchedule,
    pub status: LoanStatus,
    pub applied_at: DateTime<Utc>,
    pub last_status_change: DateTime<Utc>,
}

impl Loan {
    /// new record for an accepted application, under review
    pub fn from_application(
        member_id: MemberId,
        application: LoanApplication,
        schedule: RepaymentSchedule,
        applied_at: DateTime<Utc>,
    ) -> Self {
        Self {
            loan_id: Uuid::new_v4(),
            member_id,
            purpose: application.purpose,
            guarantors: application.guarantors,
            schedule,
            status: LoanStatus::UnderReview,
            applied_at,
            last_status_change: applied_at,
        }
    }

    pub fn principal(&self) -> Money {
        self.schedule.principal()
    }

    pub fn is_open(&self) -> bool {
        !self.status.is_terminal()
    }

    /// move to `next`, rejecting transitions the lifecycle does not allow
    pub fn transition(&mut self, next: LoanStatus, at: DateTime<Utc>) -> Result<LoanStatus> {
        if !self.status.can_transition_to(next) {
            return Err(LoanError::InvalidTransition {
                from: self.status,
                to: next,
            });
        }
        let old = self.status;
        self.status = next;
        self.last_status_change = at;
        Ok(old)
    }

    pub fn applied_on(&self) -> NaiveDate {
        self.applied_at.date_naive()
    }

    /// dated installments, starting from the application date
    pub fn installments(&self) -> Vec<ScheduledInstallment> {
        self.schedule.installments(self.applied_on())
    }

    /// heading for the history list, e.g. "Business Loan"
    pub fn title(&self) -> &'static str {
        self.purpose.title()
    }

    /// history line, e.g. "UGX 500,000 • 6 months • 1.5% monthly"
    pub fn summary(&self) -> String {
        format!(
            "UGX {} • {} months • {} monthly",
            self.principal().grouped(),
            self.schedule.period_months(),
            self.schedule.monthly_rate()
        )
    }

    /// pretty json, for debugging and the member history view
    pub fn to_json_pretty(&self) -> String {
        serde_json::to_string_pretty(self)
            .unwrap_or_else(|e| format!("{{\"error\": \"{}\"}}", e))
    }

    pub fn json(&self) -> String {
        self.to_json_pretty()
    }
}

/// which loans to list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum LoanFilter {
    #[default]
    All,
    Status(LoanStatus),
}

impl LoanFilter {
    pub fn matches(&self, loan: &Loan) -> bool {
        match self {
            LoanFilter::All => true,
            LoanFilter::Status(status) => loan.status == *status,
        }
    }
}

/// counts shown above the history list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct LoanStats {
    pub total: usize,
    pub active: usize,
    pub completed: usize,
    pub total_borrowed: Money,
}

/// filtered view of a member's loans, newest first
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanHistory {
    pub loans: Vec<Loan>,
    pub stats: LoanStats,
}

impl LoanHistory {
    pub fn build(mut loans: Vec<Loan>, filter: LoanFilter) -> Self {
        loans.retain(|loan| filter.matches(loan));
        loans.sort_by(|a, b| b.applied_at.cmp(&a.applied_at));

        let stats = LoanStats {
            total: loans.len(),
            active: loans.iter().filter(|l| l.status == LoanStatus::Active).count(),
            completed: loans.iter().filter(|l| l.status == LoanStatus::Completed).count(),
            total_borrowed: loans
                .iter()
                .filter(|l| matches!(l.status, LoanStatus::Active | LoanStatus::Completed))
                .map(|l| l.principal())
                .fold(Money::ZERO, |acc, x| acc + x),
        };

        Self { loans, stats }
    }
}
