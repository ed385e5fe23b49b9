#![no_std]

#[cfg(any(test, feature = "testutils"))]
extern crate std;

mod flash_receiver;

pub use flash_receiver::*;
