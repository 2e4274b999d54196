/// access control - bearer tokens resolve to principals, customers only see themselves
use loan_engine_rs::{
    CreateLoanRequest, LoanPolicy, LoanService, MemoryStore, Money, Principal, Rate,
    RegistrationRequest, RequestContext, SafeTimeProvider, StaticPrincipalResolver, TimeSource,
};
use rust_decimal_macros::dec;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt().with_env_filter("warn").init();

    let time = SafeTimeProvider::new(TimeSource::System);
    let service = LoanService::new(MemoryStore::new(), LoanPolicy::default(), &time)?;

    let jane = service
        .register_customer(RegistrationRequest::customer(
            "jane@bank.test",
            "Jane",
            "Doe",
            Money::from_major(10_000),
            Money::ZERO,
        ))?
        .customer_id;
    let john = service
        .register_customer(RegistrationRequest::customer(
            "john@bank.test",
            "John",
            "Roe",
            Money::from_major(10_000),
            Money::ZERO,
        ))?
        .customer_id;
    let root = service
        .register_customer(RegistrationRequest::admin("root@bank.test", "Root", "Admin"))?
        .customer_id;

    let resolver = StaticPrincipalResolver::new()
        .with_token("jane-token", Principal::customer(jane))
        .with_token("john-token", Principal::customer(john))
        .with_token("root-token", Principal::admin(root));

    // admins may originate on behalf of a customer
    let admin = service.authenticate(&resolver, &RequestContext::bearer("root-token"))?;
    let loan = service.create_loan(
        &admin,
        CreateLoanRequest {
            customer_id: jane,
            amount: Money::from_major(1_000),
            interest_rate: Rate::from_decimal(dec!(0.1)),
            number_of_installments: 6,
        },
    )?;
    println!("admin created loan {} for customer {}", loan.id, jane);

    let john_principal = service.authenticate(&resolver, &RequestContext::bearer("john-token"))?;
    for result in [
        service.list_loans(&john_principal, jane, None, None).map(|_| ()),
        service.list_loan_installments(&john_principal, loan.id).map(|_| ()),
        service.pay_loan(&john_principal, loan.id, Money::from_major(500)).map(|_| ()),
    ] {
        if let Err(err) = result {
            println!("{}", serde_json::to_string(&err.to_response())?);
        }
    }

    // admins hold no credit line
    if let Err(err) = service.create_loan(
        &admin,
        CreateLoanRequest {
            customer_id: root,
            amount: Money::from_major(1_000),
            interest_rate: Rate::from_decimal(dec!(0.1)),
            number_of_installments: 6,
        },
    ) {
        println!("{}", serde_json::to_string(&err.to_response())?);
    }

    if let Err(err) = service.authenticate(&resolver, &RequestContext::anonymous()) {
        println!("{}", serde_json::to_string(&err.to_response())?);
    }

    Ok(())
}
