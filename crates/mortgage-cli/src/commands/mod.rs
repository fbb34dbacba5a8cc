pub mod affordability;
pub mod costs;
pub mod flexi;
pub mod handbook;
pub mod loan;
