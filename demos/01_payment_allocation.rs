/// payment allocation - whole installments, earliest due first, 3 month window
use chrono::{Duration, TimeZone, Utc};
use loan_engine_rs::{
    CreateLoanRequest, LoanPolicy, LoanService, MemoryStore, Money, Principal, Rate,
    RegistrationRequest, SafeTimeProvider, TimeSource,
};
use rust_decimal_macros::dec;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt().with_env_filter("info").init();
    println!("=== payment allocation example ===\n");

    let time = SafeTimeProvider::new(TimeSource::Test(
        Utc.with_ymd_and_hms(2024, 1, 15, 9, 0, 0).unwrap(),
    ));
    let controller = time.test_control().unwrap();
    let service = LoanService::new(MemoryStore::new(), LoanPolicy::default(), &time)?;

    let customer_id = service
        .register_customer(RegistrationRequest::customer(
            "sam@bank.test",
            "Sam",
            "Lee",
            Money::from_major(5_000),
            Money::ZERO,
        ))?
        .customer_id;
    let caller = Principal::customer(customer_id);

    // 2,500 at 20% over 6 months -> 6 x 500.00, first due 2024-02-01
    let loan = service.create_loan(
        &caller,
        CreateLoanRequest {
            customer_id,
            amount: Money::from_major(2_500),
            interest_rate: Rate::from_decimal(dec!(0.2)),
            number_of_installments: 6,
        },
    )?;
    println!("today: {}", time.now().format("%Y-%m-%d"));

    // too little for a single installment
    if let Err(err) = service.pay_loan(&caller, loan.id, Money::from_major(300)) {
        println!("rejected: {}", err);
    }

    // only feb, mar and apr are inside the window, 1,000 is left unapplied
    let outcome = service.pay_loan(&caller, loan.id, Money::from_major(2_500))?;
    println!("{}", outcome.message);

    if let Err(err) = service.pay_loan(&caller, loan.id, Money::from_major(500)) {
        println!("rejected: {}", err);
    }

    controller.advance(Duration::days(90));
    println!("\nadvanced to: {}", time.now().format("%Y-%m-%d"));
    let outcome = service.pay_loan(&caller, loan.id, Money::from_major(1_500))?;
    println!("{}", outcome.message);

    for detail in service.list_loan_installments(&caller, loan.id)? {
        println!(
            "#{:<2} due {} amount {} paid {}",
            detail.installment_number,
            detail.due_date,
            detail.amount,
            detail
                .payment_date
                .map_or_else(|| "-".to_string(), |d| d.to_string())
        );
    }

    for event in service.take_events() {
        println!("{:?}", event);
    }

    Ok(())
}
