//! Shared test harness modules for the rendezvous CLI.

use super::*;

mod helpers;
mod request_unit;
