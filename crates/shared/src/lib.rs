//! Wire types and domain values shared by the print card core and the development host.

pub mod domain;
pub mod error;
pub mod protocol;
