pub mod calendar;
pub mod display;
pub mod error;
pub mod handbook;
pub mod normalize;
pub mod rounding;
pub mod types;

#[cfg(feature = "amortization")]
pub mod amortization;

#[cfg(feature = "levy")]
pub mod levy;

#[cfg(feature = "affordability")]
pub mod affordability;

#[cfg(feature = "reverse")]
pub mod reverse;

#[cfg(feature = "flexi")]
pub mod flexi;

pub use error::MortgageError;
pub use handbook::Handbook;
pub use types::*;

/// Standard result type for fallible mortgage-core operations
pub type MortgageResult<T> = Result<T, MortgageError>;
