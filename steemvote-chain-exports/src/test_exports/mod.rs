// Copyright (c) 2022 THE STEEMVOTE AUTHORS

mod test_chain;

pub use test_chain::*;
