use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::errors::{LoanError, Result};
use crate::loan::Loan;
use crate::member::Member;
use crate::types::{LoanId, LoanStatus, MemberId};

/// persistence seam for members and loan records.
///
/// `commit_loan` and `update_loan_status` must be atomic per member: a
/// commit for a member whose `has_active_loan` is already set fails with
/// [`LoanError::ActiveLoanConflict`], so two concurrent submissions cannot
/// both be accepted. A status update only applies while the stored record
/// is still in the status the caller read.
pub trait LoanStore {
    fn member(&self, member_id: MemberId) -> Result<Member>;

    /// store the loan and set the member's `has_active_loan`
    fn commit_loan(&self, loan: Loan) -> Result<Loan>;

    fn loan(&self, loan_id: LoanId) -> Result<Loan>;

    /// persist a status change made from `expected`; terminal statuses
    /// clear `has_active_loan`. Fails with [`LoanError::InvalidTransition`]
    /// when the stored record has moved on since it was read.
    fn update_loan_status(&self, loan: &Loan, expected: LoanStatus) -> Result<()>;

    fn loans_for(&self, member_id: MemberId) -> Result<Vec<Loan>>;
}

macro_rules! forward_store {
    ($($ty:ty),*) => {$(
        impl<T: LoanStore + ?Sized> LoanStore for $ty {
            fn member(&self, member_id: MemberId) -> Result<Member> {
                (**self).member(member_id)
            }

            fn commit_loan(&self, loan: Loan) -> Result<Loan> {
                (**self).commit_loan(loan)
            }

            fn loan(&self, loan_id: LoanId) -> Result<Loan> {
                (**self).loan(loan_id)
            }

            fn update_loan_status(&self, loan: &Loan, expected: LoanStatus) -> Result<()> {
                (**self).update_loan_status(loan, expected)
            }

            fn loans_for(&self, member_id: MemberId) -> Result<Vec<Loan>> {
                (**self).loans_for(member_id)
            }
        }
    )*};
}

forward_store!(&T, Arc<T>);

#[derive(Debug, Default)]
struct Tables {
    members: HashMap<MemberId, Member>,
    loans: HashMap<LoanId, Loan>,
}

/// mutex-guarded store for tests and demos
#[derive(Debug, Default)]
pub struct InMemoryLoanStore {
    tables: Mutex<Tables>,
}

impl InMemoryLoanStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_members(members: impl IntoIterator<Item = Member>) -> Self {
        let mut store = Self::new();
        let tables = store.tables.get_mut().unwrap_or_else(|poisoned| poisoned.into_inner());
        tables
            .members
            .extend(members.into_iter().map(|m| (m.member_id, m)));
        store
    }

    pub fn upsert_member(&self, member: Member) -> Result<()> {
        self.lock()?.members.insert(member.member_id, member);
        Ok(())
    }

    fn lock(&self) -> Result<MutexGuard<'_, Tables>> {
        self.tables.lock().map_err(|_| LoanError::Storage {
            message: "store lock poisoned".to_string(),
        })
    }
}

impl LoanStore for InMemoryLoanStore {
    fn member(&self, member_id: MemberId) -> Result<Member> {
        self.lock()?
            .members
            .get(&member_id)
            .cloned()
            .ok_or(LoanError::MemberNotFound { member_id })
    }

    fn commit_loan(&self, loan: Loan) -> Result<Loan> {
        let mut tables = self.lock()?;
        let member = tables
            .members
            .get_mut(&loan.member_id)
            .ok_or(LoanError::MemberNotFound {
                member_id: loan.member_id,
            })?;

        if member.has_active_loan {
            return Err(LoanError::ActiveLoanConflict {
                member_id: loan.member_id,
            });
        }

        member.has_active_loan = true;
        member.active_loan_amount = loan.principal();
        tables.loans.insert(loan.loan_id, loan.clone());
        Ok(loan)
    }

    fn loan(&self, loan_id: LoanId) -> Result<Loan> {
        self.lock()?
            .loans
            .get(&loan_id)
            .cloned()
            .ok_or(LoanError::LoanNotFound { loan_id })
    }

    fn update_loan_status(&self, loan: &Loan, expected: LoanStatus) -> Result<()> {
        let mut tables = self.lock()?;
        let stored = tables
            .loans
            .get(&loan.loan_id)
            .map(|stored| stored.status)
            .ok_or(LoanError::LoanNotFound {
                loan_id: loan.loan_id,
            })?;

        if stored != expected || !stored.can_transition_to(loan.status) {
            return Err(LoanError::InvalidTransition {
                from: stored,
                to: loan.status,
            });
        }

        if loan.status.is_terminal() {
            if let Some(member) = tables.members.get_mut(&loan.member_id) {
                member.has_active_loan = false;
                member.active_loan_amount = crate::decimal::Money::ZERO;
            }
        } else if loan.status == LoanStatus::Active {
            if let Some(member) = tables.members.get_mut(&loan.member_id) {
                member.active_loan_amount = loan.principal();
            }
        }

        tables.loans.insert(loan.loan_id, loan.clone());
        Ok(())
    }

    fn loans_for(&self, member_id: MemberId) -> Result<Vec<Loan>> {
        Ok(self
            .lock()?
            .loans
            .values()
            .filter(|loan| loan.member_id == member_id)
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::{Guarantor, LoanApplication};
    use crate::decimal::{Money, Rate};
    use crate::repayment::compute_schedule;
    use crate::types::LoanPurpose;
    use chrono::{NaiveDate, Utc};
    use std::sync::Arc;
    use std::thread;

    fn member() -> Member {
        Member::in_good_standing(NaiveDate::from_ymd_opt(2023, 1, 15).unwrap())
    }

    fn loan_for(member_id: MemberId) -> Loan {
        let application = LoanApplication {
            principal: Money::from_major(400_000),
            period_months: 12,
            purpose: LoanPurpose::Education,
            guarantors: [
                Guarantor::new("Grace Nakato", "0700123456"),
                Guarantor::new("John Okello", "0772654321"),
            ],
        };
        let schedule = compute_schedule(application.principal, 12, Rate::from_bps(150));
        Loan::from_application(member_id, application, schedule, Utc::now())
    }

    #[test]
    fn test_commit_marks_member_with_active_loan() {
        let m = member();
        let store = InMemoryLoanStore::with_members([m.clone()]);

        let loan = store.commit_loan(loan_for(m.member_id)).unwrap();
        let stored = store.member(m.member_id).unwrap();
        assert!(stored.has_active_loan);
        assert_eq!(stored.active_loan_amount, Money::from_major(400_000));
        assert_eq!(store.loan(loan.loan_id).unwrap(), loan);
    }

    #[test]
    fn test_second_commit_conflicts() {
        let m = member();
        let store = InMemoryLoanStore::with_members([m.clone()]);

        store.commit_loan(loan_for(m.member_id)).unwrap();
        assert_eq!(
            store.commit_loan(loan_for(m.member_id)),
            Err(LoanError::ActiveLoanConflict {
                member_id: m.member_id
            })
        );
        assert_eq!(store.loans_for(m.member_id).unwrap().len(), 1);
    }

    #[test]
    fn test_concurrent_commits_accept_exactly_one() {
        let m = member();
        let store = Arc::new(InMemoryLoanStore::with_members([m.clone()]));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let store = Arc::clone(&store);
                let member_id = m.member_id;
                thread::spawn(move || store.commit_loan(loan_for(member_id)).is_ok())
            })
            .collect();

        let accepted = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|ok| *ok)
            .count();
        assert_eq!(accepted, 1);
        assert_eq!(store.loans_for(m.member_id).unwrap().len(), 1);
    }

    #[test]
    fn test_terminal_status_clears_active_flag() {
        let m = member();
        let store = InMemoryLoanStore::with_members([m.clone()]);
        let mut loan = store.commit_loan(loan_for(m.member_id)).unwrap();

        let old = loan.transition(LoanStatus::Rejected, Utc::now()).unwrap();
        store.update_loan_status(&loan, old).unwrap();

        let stored = store.member(m.member_id).unwrap();
        assert!(!stored.has_active_loan);
        assert_eq!(stored.active_loan_amount, Money::ZERO);
        assert_eq!(store.loan(loan.loan_id).unwrap().status, LoanStatus::Rejected);
    }

    #[test]
    fn test_stale_status_update_is_refused() {
        let m = member();
        let store = InMemoryLoanStore::with_members([m.clone()]);
        let committed = store.commit_loan(loan_for(m.member_id)).unwrap();

        // two loan officers read the loan while it is under review
        let mut first = store.loan(committed.loan_id).unwrap();
        let mut second = store.loan(committed.loan_id).unwrap();

        let old = first.transition(LoanStatus::Rejected, Utc::now()).unwrap();
        store.update_loan_status(&first, old).unwrap();

        let old = second.transition(LoanStatus::Active, Utc::now()).unwrap();
        assert_eq!(
            store.update_loan_status(&second, old),
            Err(LoanError::InvalidTransition {
                from: LoanStatus::Rejected,
                to: LoanStatus::Active,
            })
        );

        assert_eq!(store.loan(committed.loan_id).unwrap().status, LoanStatus::Rejected);
        assert!(!store.member(m.member_id).unwrap().has_active_loan);

        // the member may apply again, and only one loan is open
        store.commit_loan(loan_for(m.member_id)).unwrap();
        let open = store
            .loans_for(m.member_id)
            .unwrap()
            .into_iter()
            .filter(Loan::is_open)
            .count();
        assert_eq!(open, 1);
    }

    #[test]
    fn test_unknown_ids() {
        let store = InMemoryLoanStore::new();
        let id = uuid::Uuid::new_v4();
        assert_eq!(store.member(id), Err(LoanError::MemberNotFound { member_id: id }));
        assert_eq!(store.loan(id), Err(LoanError::LoanNotFound { loan_id: id }));
        assert!(matches!(
            store.commit_loan(loan_for(id)),
            Err(LoanError::MemberNotFound { .. })
        ));
    }
}
