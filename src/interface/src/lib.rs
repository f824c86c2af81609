//! Client-side instruction encoding for a program that time-locks token balances
#![deny(missing_docs)]
#![forbid(unsafe_code)]

pub mod error;
pub mod instruction;
pub mod operation;
mod pack_utils;
pub mod validation_utils;

pub use operation::TokenLock;
