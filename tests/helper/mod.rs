//! Shared setup for end-to-end tests
#![allow(dead_code)]

mod proxy;

pub use proxy::*;
