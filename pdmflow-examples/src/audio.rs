use pdmflow_std::*;

pub const BITS: usize = 16;

/// Audio DAC clocked by its own domain. The sample register is written from `sys` and synchronized.
pub fn m() -> Result<Pdm, ConfigError> {
    Pdm::new(PdmConfig::new().name("pdm_audio").bits(BITS).with_csr(true).clock_domain("audio").csr_domain("sys"))
}
