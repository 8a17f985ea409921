use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::application::FieldError;
use crate::decimal::Money;
use crate::eligibility::LoanDecision;
use crate::types::{LoanId, LoanPurpose, LoanStatus, MemberId};

/// all events that can be emitted by the loan desk
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Event {
    // intake events
    ApplicationReceived {
        member_id: MemberId,
        timestamp: DateTime<Utc>,
    },
    ApplicationInvalid {
        member_id: MemberId,
        errors: Vec<FieldError>,
        timestamp: DateTime<Utc>,
    },
    EligibilityEvaluated {
        member_id: MemberId,
        decision: LoanDecision,
        timestamp: DateTime<Utc>,
    },
    /// refused by the eligibility policy
    ApplicationRejected {
        member_id: MemberId,
        decision: LoanDecision,
        timestamp: DateTime<Utc>,
    },

    // schedule events
    ScheduleComputed {
        member_id: MemberId,
        principal: Money,
        period_months: u32,
        monthly_installment: Money,
        total_repayment: Money,
        timestamp: DateTime<Utc>,
    },

    // lifecycle events
    LoanCommitted {
        loan_id: LoanId,
        member_id: MemberId,
        principal: Money,
        purpose: LoanPurpose,
        timestamp: DateTime<Utc>,
    },
    CommitConflict {
        member_id: MemberId,
        timestamp: DateTime<Utc>,
    },
    LoanStatusChanged {
        loan_id: LoanId,
        old_status: LoanStatus,
        new_status: LoanStatus,
        timestamp: DateTime<Utc>,
    },
}

/// event store for collecting events during operations
#[derive(Debug, Default)]
pub struct EventStore {
    events: Vec<Event>,
}

impl EventStore {
    pub fn new() -> Self {
        Self {
            events: Vec::new(),
        }
    }

    pub fn emit(&mut self, event: Event) {
        self.events.push(event);
    }

    pub fn take_events(&mut self) -> Vec<Event> {
        std::mem::take(&mut self.events)
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }
}
