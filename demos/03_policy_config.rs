/// policy config - load origination bounds and the payment window from json
use loan_engine_rs::{
    CreateLoanRequest, LoanPolicy, LoanService, MemoryStore, Money, Principal, Rate,
    RegistrationRequest, SafeTimeProvider, TimeSource,
};
use rust_decimal_macros::dec;

const POLICY: &str = r#"{
    "minimum_principal": "500",
    "allowed_installments": [12, 24],
    "payment_window_months": 6
}"#;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt().with_env_filter("info").init();

    let policy = LoanPolicy::from_json(POLICY)?;
    println!("{}", serde_json::to_string_pretty(&policy)?);

    // unknown keys are refused
    if let Err(err) = LoanPolicy::from_json(r#"{ "grace_days": 5 }"#) {
        println!("rejected policy: {}", err);
    }

    let time = SafeTimeProvider::new(TimeSource::System);
    let service = LoanService::new(MemoryStore::new(), policy, &time)?;
    let customer_id = service
        .register_customer(RegistrationRequest::customer(
            "ana@bank.test",
            "Ana",
            "Silva",
            Money::from_major(50_000),
            Money::ZERO,
        ))?
        .customer_id;
    let caller = Principal::customer(customer_id);

    let request = CreateLoanRequest {
        customer_id,
        amount: Money::from_major(200),
        interest_rate: Rate::from_decimal(dec!(0.7)),
        number_of_installments: 6,
    };
    if let Err(err) = service.create_loan(&caller, request) {
        println!("{}", serde_json::to_string_pretty(&err.to_response())?);
    }

    let loan = service.create_loan(
        &caller,
        CreateLoanRequest {
            customer_id,
            amount: Money::from_major(6_000),
            interest_rate: Rate::from_decimal(dec!(0.25)),
            number_of_installments: 12,
        },
    )?;

    // six months of installments are reachable today
    let outcome = service.pay_loan(&caller, loan.id, Money::from_major(10_000))?;
    println!("{}", outcome.message);

    Ok(())
}
