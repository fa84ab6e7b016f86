//! Control/status registers.

use tracing::trace;

use crate::signal::Signal;

/// Read/write CSR backed by a storage signal.
///
/// The register lives in the clock domain of the CSR bank. Writes from the bus take effect immediately on the
/// storage signal; consumers in another clock domain must synchronize the storage before use.
#[derive(Debug, Clone)]
pub struct CsrStorage {
    name: String,
    storage: Signal,
    description: String,
}

impl CsrStorage {
    /// Creates a new CSR with the given width and reset value.
    pub fn new<S: Into<String>, D: Into<String>>(name: S, width: usize, reset: u64, description: D) -> Self {
        let name = name.into();
        let storage = Signal::with_reset(format!("{}_storage", name), width, reset);
        Self { name, storage, description: description.into() }
    }

    /// Register name.
    pub fn name(&self) -> &str { &self.name }

    /// Register width.
    pub fn width(&self) -> usize { self.storage.width() }

    /// Reset value.
    pub fn reset_value(&self) -> u64 { self.storage.reset_value() }

    /// Documentation of the register.
    pub fn description(&self) -> &str { &self.description }

    /// Storage signal.
    pub fn storage(&self) -> &Signal { &self.storage }

    /// Reads the register.
    pub fn read(&self) -> u64 { self.storage.get() }

    /// Writes the register. Bits beyond the register width are dropped.
    pub fn write(&self, value: u64) {
        self.storage.set(value);
        trace!(csr = %self.name, value, stored = self.storage.get(), "csr write");
    }
}
