use pdmflow_std::*;

pub const BITS: usize = 8;

/// LED dimmer, duty written by the CPU through a CSR in the same domain.
pub fn m() -> Result<Pdm, ConfigError> {
    Pdm::new(PdmConfig::new().name("pdm_led").bits(BITS).default_duty(64).with_csr(true))
}
