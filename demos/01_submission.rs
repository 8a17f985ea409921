/// submission - validate, evaluate and commit a member's application
use chrono::{NaiveDate, TimeZone, Utc};
use coop_loan_engine::{
    InMemoryLoanStore, LoanApplicationForm, LoanDesk, LoanError, LoanPolicy, Member, Money,
    SafeTimeProvider, TimeSource,
};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("=== loan submission ===\n");

    let time = SafeTimeProvider::new(TimeSource::Test(
        Utc.with_ymd_and_hms(2024, 1, 15, 9, 0, 0).unwrap()
    ));

    let member = Member::in_good_standing(NaiveDate::from_ymd_opt(2023, 1, 15).unwrap());
    let overdue = Member::in_good_standing(NaiveDate::from_ymd_opt(2022, 6, 1).unwrap())
        .with_overdue(Money::from_major(40_000));
    let store = InMemoryLoanStore::with_members([member.clone(), overdue.clone()]);
    let mut desk = LoanDesk::new(LoanPolicy::cooperative(), &store, &time)?;

    // 1. a form with mistakes
    let sloppy = LoanApplicationForm::new()
        .amount("20,000")
        .period("6")
        .guarantor1("Grace Nakato", "0700 123 456")
        .guarantor2("grace nakato", "0700123456");
    if let Err(LoanError::Validation { errors }) = desk.submit(member.member_id, &sloppy) {
        println!("1. rejected form:");
        for error in &errors {
            println!("   - {}", error);
        }
    }

    // 2. a good form from a member with overdue payments
    let form = LoanApplicationForm::new()
        .amount("500,000")
        .period("6")
        .purpose("agriculture")
        .guarantor1("Grace Nakato", "0700 123 456")
        .guarantor2("John Okello", "+256 772 654 321");
    let decision = desk.eligibility(overdue.member_id)?;
    println!("\n2. overdue member: {} - {}", decision.status_label(), decision.member_message());
    if let Err(e) = desk.submit(overdue.member_id, &form) {
        println!("   submission refused: {}", e);
    }

    // 3. the same form from a member in good standing
    let submission = desk.submit(member.member_id, &form)?;
    println!("\n3. accepted: {}", submission.loan.summary());
    for installment in submission.loan.installments() {
        println!(
            "   #{} due {}: UGX {}",
            installment.number, installment.due_date, installment.amount
        );
    }

    println!("\nevents recorded: {}", desk.events.events().len());

    Ok(())
}
