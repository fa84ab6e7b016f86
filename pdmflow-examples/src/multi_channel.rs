use pdmflow::{ClockDomain, Signal};
use pdmflow_std::*;

pub const CHANNELS: usize = 4;
pub const BITS: usize = 6;

/// Channels sharing one counter, each fed by an external duty signal.
pub fn m() -> Result<(Counter, Vec<Pdm>), ConfigError> {
    let counter = Counter::new("shared_counter", BITS + 2, ClockDomain::sys());
    let channels = (0..CHANNELS)
        .map(|i| {
            let level = Signal::new(format!("level{}", i), BITS);
            level.set((i as u64 + 1) * 12);
            Pdm::new(PdmConfig::new().name(format!("pdm_ch{}", i)).duty(level).counter(counter.value().clone()))
        })
        .collect::<Result<Vec<_>, _>>()?;
    Ok((counter, channels))
}
