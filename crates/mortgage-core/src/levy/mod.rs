pub mod entry_costs;
pub mod tiered;
