//! Reversible scalar memory.
//!
//! All in-search mutation of primitive solver state goes through
//! [`TrailedValues`]: a table of `i64` cells whose writes are recorded on a
//! [`Trail`](crate::basic_types::Trail) so that backtracking restores them
//! byte for byte. The reversible containers in [`crate::containers`] and the
//! variable stores in [`crate::engine`] are all built on top of it.

mod rev_switch;
mod trailed_values;

pub use rev_switch::RevSwitch;
pub use trailed_values::TrailedInt;
pub use trailed_values::TrailedValues;
