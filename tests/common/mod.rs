#![allow(unused_imports)]

pub use tapbatch_test_utils::{builders, fake_brew, init_tracing, recording_source, with_timeout};
