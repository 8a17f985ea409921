/// lifecycle - review, repay and reapply
use chrono::{Duration, NaiveDate, TimeZone, Utc};
use coop_loan_engine::{
    InMemoryLoanStore, LoanApplicationForm, LoanDesk, LoanFilter, LoanPolicy, Member,
    SafeTimeProvider, TimeSource,
};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("=== loan lifecycle ===\n");

    let time = SafeTimeProvider::new(TimeSource::Test(
        Utc.with_ymd_and_hms(2024, 1, 15, 9, 0, 0).unwrap()
    ));
    let controller = time.test_control().unwrap();

    let member = Member::in_good_standing(NaiveDate::from_ymd_opt(2023, 1, 15).unwrap());
    let store = InMemoryLoanStore::with_members([member.clone()]);
    let mut desk = LoanDesk::new(LoanPolicy::cooperative(), &store, &time)?;
    println!(
        "policy: {} monthly, UGX {} - {}\n",
        desk.policy().monthly_rate,
        desk.policy().minimum_principal.grouped(),
        desk.policy().maximum_principal.grouped()
    );

    let form = LoanApplicationForm::new()
        .amount("300,000")
        .period("3")
        .purpose("education")
        .guarantor1("Grace Nakato", "0700123456")
        .guarantor2("John Okello", "0772654321");

    let loan = desk.submit(member.member_id, &form)?.loan;
    println!("applied {}: {}", time.now().format("%Y-%m-%d"), loan.status);

    controller.advance(Duration::days(2));
    let loan = desk.approve(loan.loan_id)?;
    println!("approved {}: {}", time.now().format("%Y-%m-%d"), loan.status);

    let decision = desk.eligibility(member.member_id)?;
    println!("new application while repaying: {}", decision.status_label());

    controller.advance(Duration::days(90));
    let loan = desk.complete(loan.loan_id)?;
    println!("repaid {}: {}", time.now().format("%Y-%m-%d"), loan.status);

    let decision = desk.eligibility(member.member_id)?;
    println!("new application after repayment: {}", decision.status_label());

    let history = desk.history(member.member_id, LoanFilter::All)?;
    println!("\nhistory:");
    for loan in &history.loans {
        println!("  {} ({}, applied {})", loan.title(), loan.status, loan.applied_on());
        println!("  {}", loan.summary());
    }
    println!("{}", serde_json::to_string_pretty(&history)?);

    Ok(())
}
