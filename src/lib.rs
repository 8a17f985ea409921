pub mod application;
pub mod config;
pub mod decimal;
pub mod desk;
pub mod eligibility;
pub mod errors;
pub mod events;
pub mod loan;
pub mod member;
pub mod repayment;
pub mod store;
pub mod types;

// re-export key types
pub use application::{
    is_valid_phone, ApplicationValidator, Field, FieldError, FieldErrorKind, Guarantor,
    LoanApplication, LoanApplicationForm, ValidationResult,
};
pub use config::{LoanPolicy, ValidationMode};
pub use decimal::{Money, Rate};
pub use desk::{Assessment, LoanDesk, Submission};
pub use eligibility::{evaluate, IneligibilityReason, LoanDecision};
pub use errors::{LoanError, Result};
pub use events::{Event, EventStore};
pub use loan::{Loan, LoanFilter, LoanHistory, LoanStats};
pub use member::Member;
pub use repayment::{compute_schedule, RepaymentSchedule, ScheduledInstallment};
pub use store::{InMemoryLoanStore, LoanStore};
pub use types::{LoanId, LoanPurpose, LoanStatus, MemberId, MembershipFeeStatus};

// re-export external dependencies that users will need
pub use chrono;
pub use hourglass_rs::{SafeTimeProvider, TimeSource};
pub use rust_decimal::Decimal;
pub use uuid::Uuid;
