//! Clock domains.

use std::fmt;

/// Name of the default system clock domain.
pub const SYS: &str = "sys";

/// A synchronous clock domain.
///
/// Registers of a domain only change on `Simulator::tick` of that domain. Two domains with different names
/// have no fixed phase relationship.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ClockDomain {
    name: String,
}

impl ClockDomain {
    /// Creates a new clock domain.
    pub fn new<S: Into<String>>(name: S) -> Self { Self { name: name.into() } }

    /// The system clock domain.
    pub fn sys() -> Self { Self::new(SYS) }

    /// Returns the domain name.
    pub fn name(&self) -> &str { &self.name }

    /// Returns the clock net name, `{name}_clk`.
    pub fn clk_name(&self) -> String { format!("{}_clk", self.name) }
}

impl Default for ClockDomain {
    fn default() -> Self { Self::sys() }
}

impl From<&str> for ClockDomain {
    fn from(name: &str) -> Self { Self::new(name) }
}

impl fmt::Display for ClockDomain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(&self.name) }
}
