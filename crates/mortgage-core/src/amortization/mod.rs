pub mod installment;
pub mod schedule;
