#![no_std]

#[cfg(any(test, feature = "testutils"))]
extern crate std;

mod fee_reduction;

pub use fee_reduction::*;
