//! Modules.

use std::fmt::Debug;

use crate::domain::ClockDomain;
use crate::vir;

/// Synchronous hardware module.
///
/// A clock edge of a domain is simulated in two phases over every module: `eval` samples the current signal
/// values and schedules register updates with [`Signal::next`](crate::Signal::next), then `commit` applies them.
/// Modules must not observe scheduled values during `eval`.
pub trait Module: Debug {
    /// Module name.
    fn name(&self) -> &str;

    /// Clock domains whose edges update registers of this module.
    fn domains(&self) -> Vec<ClockDomain>;

    /// Samples inputs and schedules register updates for an edge of `domain`.
    fn eval(&self, domain: &ClockDomain);

    /// Applies the register updates scheduled for an edge of `domain`.
    fn commit(&self, domain: &ClockDomain);

    /// Elaborates the module to Verilog.
    fn to_vir(&self) -> vir::Module;
}
