use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// unique identifier for a member
pub type MemberId = Uuid;

/// unique identifier for a loan record
pub type LoanId = Uuid;

/// what the borrowed money is for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoanPurpose {
    Business,
    Emergency,
    Education,
    Agriculture,
    Personal,
}

impl LoanPurpose {
    pub const ALL: [LoanPurpose; 5] = [
        LoanPurpose::Business,
        LoanPurpose::Emergency,
        LoanPurpose::Education,
        LoanPurpose::Agriculture,
        LoanPurpose::Personal,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            LoanPurpose::Business => "business",
            LoanPurpose::Emergency => "emergency",
            LoanPurpose::Education => "education",
            LoanPurpose::Agriculture => "agriculture",
            LoanPurpose::Personal => "personal",
        }
    }

    /// title shown in loan history, e.g. "Business Loan"
    pub fn title(&self) -> &'static str {
        match self {
            LoanPurpose::Business => "Business Loan",
            LoanPurpose::Emergency => "Emergency Loan",
            LoanPurpose::Education => "Education Loan",
            LoanPurpose::Agriculture => "Agriculture Loan",
            LoanPurpose::Personal => "Personal Loan",
        }
    }
}

impl fmt::Display for LoanPurpose {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// unknown purpose value
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownPurpose(pub String);

impl FromStr for LoanPurpose {
    type Err = UnknownPurpose;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim();
        LoanPurpose::ALL
            .into_iter()
            .find(|p| p.as_str().eq_ignore_ascii_case(needle))
            .ok_or_else(|| UnknownPurpose(needle.to_string()))
    }
}

/// loan record status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoanStatus {
    /// submitted, awaiting approval
    UnderReview,
    /// approved and being repaid
    Active,
    /// fully repaid
    Completed,
    /// turned down at review
    Rejected,
}

impl LoanStatus {
    /// terminal loans no longer count as the member's active loan
    pub fn is_terminal(&self) -> bool {
        matches!(self, LoanStatus::Completed | LoanStatus::Rejected)
    }

    pub fn can_transition_to(&self, next: LoanStatus) -> bool {
        matches!(
            (self, next),
            (LoanStatus::UnderReview, LoanStatus::Active)
                | (LoanStatus::UnderReview, LoanStatus::Rejected)
                | (LoanStatus::Active, LoanStatus::Completed)
        )
    }
}

impl fmt::Display for LoanStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            LoanStatus::UnderReview => "Under Review",
            LoanStatus::Active => "Active",
            LoanStatus::Completed => "Completed",
            LoanStatus::Rejected => "Rejected",
        };
        f.write_str(label)
    }
}

/// state of the member's membership fee
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum MembershipFeeStatus {
    #[default]
    Paid,
    Pending,
    Overdue,
}
