//! Shared test harness modules for the Aquaroute CLI.

use super::*;

mod command_steps;
mod helpers;
