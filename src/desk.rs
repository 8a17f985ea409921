use hourglass_rs::SafeTimeProvider;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::application::{ApplicationValidator, LoanApplication, LoanApplicationForm, ValidationResult};
use crate::config::LoanPolicy;
use crate::decimal::Money;
use crate::eligibility::{evaluate, LoanDecision};
use crate::errors::{LoanError, Result};
use crate::events::{Event, EventStore};
use crate::loan::{Loan, LoanFilter, LoanHistory};
use crate::member::Member;
use crate::repayment::{compute_schedule, RepaymentSchedule};
use crate::store::LoanStore;
use crate::types::{LoanId, LoanStatus, MemberId};

/// application that passed validation and eligibility, with its schedule
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Assessment {
    pub application: LoanApplication,
    pub decision: LoanDecision,
    pub schedule: RepaymentSchedule,
}

/// accepted submission
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Submission {
    pub decision: LoanDecision,
    pub schedule: RepaymentSchedule,
    pub loan: Loan,
}

/// request-facing loan desk: validate, evaluate, price, then commit
pub struct LoanDesk<'a, S: LoanStore> {
    policy: LoanPolicy,
    validator: ApplicationValidator,
    store: S,
    time: &'a SafeTimeProvider,
    pub events: EventStore,
}

impl<'a, S: LoanStore> LoanDesk<'a, S> {
    pub fn new(policy: LoanPolicy, store: S, time: &'a SafeTimeProvider) -> Result<Self> {
        policy.validate()?;
        Ok(Self {
            validator: ApplicationValidator::new(&policy),
            policy,
            store,
            time,
            events: EventStore::new(),
        })
    }

    pub fn policy(&self) -> &LoanPolicy {
        &self.policy
    }

    /// eligibility of a stored member, for enabling the application form
    pub fn eligibility(&self, member_id: MemberId) -> Result<LoanDecision> {
        let member = self.store.member(member_id)?;
        Ok(evaluate(&member))
    }

    /// live calculator figures at the policy rate
    pub fn quote(&self, principal: Money, period_months: u32) -> RepaymentSchedule {
        compute_schedule(principal, period_months, self.policy.monthly_rate)
    }

    /// run the checks against a member snapshot without touching the store
    pub fn assess(&self, member: &Member, form: &LoanApplicationForm) -> Result<Assessment> {
        let application = self.validator.validate(form).into_result()?;

        let decision = evaluate(member);
        decision.into_result()?;

        let schedule = compute_schedule(
            application.principal,
            application.period_months,
            self.policy.monthly_rate,
        );

        Ok(Assessment {
            application,
            decision,
            schedule,
        })
    }

    /// accept a loan application from a member.
    ///
    /// Validation runs before eligibility; the first failing stage decides
    /// the error. The commit is refused if another application for the same
    /// member was committed since the snapshot was read.
    pub fn submit(&mut self, member_id: MemberId, form: &LoanApplicationForm) -> Result<Submission> {
        let now = self.time.now();
        self.events.emit(Event::ApplicationReceived {
            member_id,
            timestamp: now,
        });

        let member = self.store.member(member_id)?;

        let application = match self.validator.validate(form) {
            ValidationResult::Valid(application) => application,
            ValidationResult::Invalid(errors) => {
                warn!(%member_id, error_count = errors.len(), "loan application failed validation");
                self.events.emit(Event::ApplicationInvalid {
                    member_id,
                    errors: errors.clone(),
                    timestamp: now,
                });
                return Err(LoanError::Validation { errors });
            }
        };

        let decision = evaluate(&member);
        self.events.emit(Event::EligibilityEvaluated {
            member_id,
            decision,
            timestamp: now,
        });
        if let Err(e) = decision.into_result() {
            info!(%member_id, status = decision.status_label(), "loan application refused: {e}");
            self.events.emit(Event::ApplicationRejected {
                member_id,
                decision,
                timestamp: now,
            });
            return Err(e);
        }

        let schedule = compute_schedule(
            application.principal,
            application.period_months,
            self.policy.monthly_rate,
        );
        debug!(
            %member_id,
            principal = %schedule.principal(),
            period_months = schedule.period_months(),
            installment = %schedule.monthly_installment(),
            "repayment schedule computed"
        );
        self.events.emit(Event::ScheduleComputed {
            member_id,
            principal: schedule.principal(),
            period_months: schedule.period_months(),
            monthly_installment: schedule.monthly_installment(),
            total_repayment: schedule.total_repayment(),
            timestamp: now,
        });

        let purpose = application.purpose;
        let loan = Loan::from_application(member_id, application, schedule, now);
        let loan = match self.store.commit_loan(loan) {
            Ok(loan) => loan,
            Err(e @ LoanError::ActiveLoanConflict { .. }) => {
                warn!(%member_id, "concurrent application already committed");
                self.events.emit(Event::CommitConflict {
                    member_id,
                    timestamp: now,
                });
                return Err(e);
            }
            Err(e) => return Err(e),
        };

        info!(loan_id = %loan.loan_id, %member_id, "loan application accepted for review");
        self.events.emit(Event::LoanCommitted {
            loan_id: loan.loan_id,
            member_id,
            principal: loan.principal(),
            purpose,
            timestamp: now,
        });

        Ok(Submission {
            decision,
            schedule,
            loan,
        })
    }

    pub fn approve(&mut self, loan_id: LoanId) -> Result<Loan> {
        self.change_status(loan_id, LoanStatus::Active)
    }

    pub fn reject(&mut self, loan_id: LoanId) -> Result<Loan> {
        self.change_status(loan_id, LoanStatus::Rejected)
    }

    pub fn complete(&mut self, loan_id: LoanId) -> Result<Loan> {
        self.change_status(loan_id, LoanStatus::Completed)
    }

    /// member's loans matching `filter`, newest first, with counts
    pub fn history(&self, member_id: MemberId, filter: LoanFilter) -> Result<LoanHistory> {
        let loans = self.store.loans_for(member_id)?;
        Ok(LoanHistory::build(loans, filter))
    }

    fn change_status(&mut self, loan_id: LoanId, next: LoanStatus) -> Result<Loan> {
        let now = self.time.now();
        let mut loan = self.store.loan(loan_id)?;
        let old_status = loan.transition(next, now)?;
        self.store.update_loan_status(&loan, old_status)?;

        info!(%loan_id, from = %old_status, to = %next, "loan status changed");
        self.events.emit(Event::LoanStatusChanged {
            loan_id,
            old_status,
            new_status: next,
            timestamp: now,
        });

        Ok(loan)
    }
}
