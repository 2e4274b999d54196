/// quick start - register a customer, take a loan, pay the first installment
use loan_engine_rs::{
    CreateLoanRequest, LoanPolicy, LoanService, MemoryStore, Money, Principal, Rate,
    RegistrationRequest, SafeTimeProvider, TimeSource,
};
use rust_decimal_macros::dec;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt().with_env_filter("info").init();

    let time = SafeTimeProvider::new(TimeSource::System);
    let service = LoanService::new(MemoryStore::new(), LoanPolicy::default(), &time)?;

    // a customer with a 20,000 credit line
    let registered = service.register_customer(RegistrationRequest::customer(
        "jane@bank.test",
        "Jane",
        "Doe",
        Money::from_major(20_000),
        Money::ZERO,
    ))?;
    println!("{}", registered.message);

    let caller = Principal::customer(registered.customer_id);
    let loan = service.create_loan(
        &caller,
        CreateLoanRequest {
            customer_id: registered.customer_id,
            amount: Money::from_major(10_000),
            interest_rate: Rate::from_decimal(dec!(0.2)),
            number_of_installments: 12,
        },
    )?;
    println!(
        "loan {} originated: total {} in {} installments of {}",
        loan.id,
        loan.total_amount(),
        loan.number_of_installments,
        loan.installments[0].amount
    );

    let outcome = service.pay_loan(&caller, loan.id, Money::from_major(1_000))?;
    println!("{}", outcome.message);

    for summary in service.list_loans(&caller, registered.customer_id, None, None)? {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    }

    Ok(())
}
