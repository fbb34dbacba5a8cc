pub mod commitments;
pub mod dsr;
pub mod income;
pub mod mitigation;
