pub mod contact;
pub mod event;
pub mod followup;
pub mod outcome;

pub use contact::*;
pub use event::*;
pub use followup::*;
pub use outcome::*;

/// TEXT column format for timestamps.
pub(crate) const DATETIME_FMT: &str = "%Y-%m-%d %H:%M:%S";
/// TEXT column format for dates.
pub(crate) const DATE_FMT: &str = "%Y-%m-%d";
