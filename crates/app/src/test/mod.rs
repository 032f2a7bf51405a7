//! Test support

pub(crate) mod db;

pub(crate) use context::{PLATE, TestContext};
pub(crate) use logs::CapturedLogs;
pub(crate) use race::RacingWrites;
