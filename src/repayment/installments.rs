use chrono::{Months, NaiveDate};
use serde::{Deserialize, Serialize};

use super::RepaymentSchedule;
use crate::decimal::Money;

/// one dated installment of a repayment plan
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduledInstallment {
    pub number: u32,
    pub due_date: NaiveDate,
    pub amount: Money,
    pub principal_portion: Money,
    pub interest_portion: Money,
    /// total still owed after this installment
    pub balance_after: Money,
}

impl RepaymentSchedule {
    /// expand into dated monthly installments, the first due one month after `start`.
    ///
    /// Every installment is the rounded monthly installment except the last,
    /// which takes whatever remains so the plan sums to the total repayment.
    pub fn installments(&self, start: NaiveDate) -> Vec<ScheduledInstallment> {
        if self.is_zero() {
            return Vec::new();
        }

        let total = self.total_repayment();
        // share of every shilling repaid that is interest
        let interest_ratio = self.total_interest().as_decimal() / total.as_decimal();

        let mut plan = Vec::with_capacity(self.period_months() as usize);
        let mut remaining = total;
        let mut interest_remaining = self.total_interest();

        for number in 1..=self.period_months() {
            let is_last = number == self.period_months();

            let (amount, interest_portion) = if is_last {
                (remaining, interest_remaining)
            } else {
                let amount = self.monthly_installment().min(remaining);
                let interest = (amount * interest_ratio).min(interest_remaining);
                (amount, interest)
            };

            remaining -= amount;
            interest_remaining -= interest_portion;

            plan.push(ScheduledInstallment {
                number,
                due_date: add_months(start, number),
                amount,
                principal_portion: amount - interest_portion,
                interest_portion,
                balance_after: remaining,
            });
        }

        plan
    }
}

fn add_months(date: NaiveDate, months: u32) -> NaiveDate {
    date.checked_add_months(Months::new(months))
        .unwrap_or(NaiveDate::MAX)
}
