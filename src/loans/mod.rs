//! Loan amortization engine

mod amortization;

pub use amortization::{
    amortization_schedule, calculate_loan_payment, calculate_max_borrowing_capacity,
    calculate_max_borrowing_capacity_for, calculate_remaining_balance, summarize_by_year,
    AmortizationPeriod, AmortizationYear, RepaymentFrequency, MAX_TERM_YEARS,
};
