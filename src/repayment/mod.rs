pub mod installments;

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use crate::decimal::{Money, Rate};

pub use installments::ScheduledInstallment;

/// flat-rate repayment terms, fixed once computed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepaymentSchedule {
    principal: Money,
    period_months: u32,
    monthly_rate: Rate,
    total_interest: Money,
    total_repayment: Money,
    monthly_installment: Money,
}

impl RepaymentSchedule {
    /// schedule for a non-positive principal or a zero period
    pub const ZERO: RepaymentSchedule = RepaymentSchedule {
        principal: Money::ZERO,
        period_months: 0,
        monthly_rate: Rate::ZERO,
        total_interest: Money::ZERO,
        total_repayment: Money::ZERO,
        monthly_installment: Money::ZERO,
    };

    pub fn principal(&self) -> Money {
        self.principal
    }

    pub fn period_months(&self) -> u32 {
        self.period_months
    }

    pub fn monthly_rate(&self) -> Rate {
        self.monthly_rate
    }

    pub fn total_interest(&self) -> Money {
        self.total_interest
    }

    pub fn total_repayment(&self) -> Money {
        self.total_repayment
    }

    /// total repayment over the period, rounded to whole shillings
    pub fn monthly_installment(&self) -> Money {
        self.monthly_installment
    }

    pub fn is_zero(&self) -> bool {
        *self == Self::ZERO
    }
}

/// compute a flat-rate schedule.
///
/// Interest is charged once on the full principal for every month of the
/// period: `interest = principal * rate * months`. The installment is the
/// total repayment spread evenly over the period, rounded half away from
/// zero to whole shillings. A non-positive principal or a zero period gives
/// [`RepaymentSchedule::ZERO`], as does a principal and rate whose totals
/// overflow the decimal range. A negative rate charges no interest.
pub fn compute_schedule(principal: Money, period_months: u32, monthly_rate: Rate) -> RepaymentSchedule {
    if !principal.is_positive() || period_months == 0 {
        return RepaymentSchedule::ZERO;
    }

    let rate = if monthly_rate.is_negative() {
        Rate::ZERO
    } else {
        monthly_rate
    };

    let months = Decimal::from(period_months);
    let totals = rate
        .as_decimal()
        .checked_mul(months)
        .and_then(|factor| principal.as_decimal().checked_mul(factor))
        .map(|interest| interest.round_dp(8))
        .and_then(|interest| {
            principal
                .as_decimal()
                .checked_add(interest)
                .map(|total| (interest, total))
        });

    let (total_interest, total_repayment) = match totals {
        Some((interest, total)) => (Money::from_decimal(interest), Money::from_decimal(total)),
        None => return RepaymentSchedule::ZERO,
    };
    let monthly_installment = Money::from_decimal(
        (total_repayment.as_decimal() / months)
            .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero),
    );

    RepaymentSchedule {
        principal,
        period_months,
        monthly_rate: rate,
        total_interest,
        total_repayment,
        monthly_installment,
    }
}
