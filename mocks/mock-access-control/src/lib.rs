#![no_std]

#[cfg(any(test, feature = "testutils"))]
extern crate std;

mod access_control;
mod storage;

pub use access_control::*;
