//! Cycle-accurate simulator.

use std::rc::Rc;

use linked_hash_map::LinkedHashMap;
use tracing::trace;

use crate::domain::ClockDomain;
use crate::module::Module;

/// Simulator driving any number of clock domains.
///
/// Domains only advance when ticked, so the caller decides how edges of unrelated domains interleave.
#[derive(Debug, Default)]
pub struct Simulator {
    modules: Vec<Rc<dyn Module>>,
    cycles: LinkedHashMap<ClockDomain, u64>,
}

impl Simulator {
    /// Creates a new simulator.
    pub fn new() -> Self { Self::default() }

    /// Adds a module. The caller may keep a clone of the handle to inspect its signals.
    pub fn add(&mut self, module: Rc<dyn Module>) {
        for domain in module.domains() {
            let _ = self.cycles.entry(domain).or_insert(0);
        }
        self.modules.push(module);
    }

    /// Simulates one rising edge of `domain`.
    pub fn tick(&mut self, domain: &ClockDomain) {
        let clocked = self.modules.iter().filter(|module| module.domains().contains(domain)).collect::<Vec<_>>();

        for module in &clocked {
            module.eval(domain);
        }
        for module in &clocked {
            module.commit(domain);
        }

        let cycle = self.cycles.entry(domain.clone()).or_insert(0);
        *cycle += 1;
        trace!(%domain, cycle = *cycle, modules = clocked.len(), "tick");
    }

    /// Simulates `cycles` rising edges of `domain`.
    pub fn run(&mut self, domain: &ClockDomain, cycles: u64) {
        for _ in 0..cycles {
            self.tick(domain);
        }
    }

    /// Number of edges simulated so far in `domain`.
    pub fn cycles(&self, domain: &ClockDomain) -> u64 { self.cycles.get(domain).copied().unwrap_or(0) }

    /// Domains known to the simulator, in the order they were first seen.
    pub fn domains(&self) -> impl Iterator<Item = &ClockDomain> { self.cycles.keys() }
}
