/// quick start - price a loan with the cooperative policy
use coop_loan_engine::{compute_schedule, LoanPolicy, Money};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let policy = LoanPolicy::cooperative();

    // UGX 500,000 over 6 months at 1.5% per month
    let schedule = compute_schedule(Money::from_major(500_000), 6, policy.monthly_rate);

    println!("total interest:      UGX {}", schedule.total_interest());
    println!("total repayment:     UGX {}", schedule.total_repayment());
    println!("monthly installment: UGX {}", schedule.monthly_installment());
    println!("\n{}", serde_json::to_string_pretty(&schedule)?);

    Ok(())
}
