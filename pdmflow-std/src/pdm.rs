//! Pulse Density Modulation.
//!
//! A free-running counter is compared against a duty value every clock cycle. The counter is bit-reversed before
//! the comparison, so that the `duty` asserted cycles of each `2^bits`-cycle period are spread across the period
//! instead of being bunched at its start. Compared with PWM this moves the switching energy to high frequencies,
//! which is what makes the output easy to low-pass filter. Setting the duty to 0 stops all switching.

use pdmflow::vir::{self, BinaryOp, ContinuousAssign, Declaration, Expression, ModuleItem, PortDeclaration, Statement};
use pdmflow::{bit_mask, bitreverse, ClockDomain, CsrStorage, Module, OwnedOrExternal, Signal, Value, MAX_WIDTH};
use static_assertions::const_assert;
use thiserror::Error;
use tracing::debug;

use crate::counter::Counter;
use crate::multi_reg::{MultiReg, MULTIREG_STAGES};

/// Default width of the duty value and of the owned counter.
pub const DEFAULT_BITS: usize = 8;

const_assert!(DEFAULT_BITS <= MAX_WIDTH);

/// Counter identifier in generated Verilog: the owned counter register, or the input port of an external one.
const COUNTER_IDENT: &str = "counter";

/// Output of the comparator for one cycle: whether the bit-reversed low `bits` bits of `counter` are below `duty`.
///
/// # Panics
///
/// Panics if `bits` is larger than [`MAX_WIDTH`].
///
/// ### Example
/// ```
/// use pdmflow_std::pdm_output;
///
/// let period = (0..8).map(|c| pdm_output(c, 3, 3) as u8).collect::<Vec<_>>();
/// assert_eq!(period, vec![1, 0, 1, 0, 1, 0, 0, 0]);
/// ```
pub fn pdm_output(counter: u64, duty: u64, bits: usize) -> bool { bitreverse(counter, bits) < duty }

/// Outputs over one full period, for counter values `0..2^bits`.
///
/// # Panics
///
/// Panics on iteration if `bits` is larger than [`MAX_WIDTH`].
pub fn pdm_pattern(duty: u64, bits: usize) -> impl Iterator<Item = bool> {
    (0..=bit_mask(bits)).map(move |counter| pdm_output(counter, duty, bits))
}

/// Width of an owned duty register, or an externally driven duty signal.
#[derive(Debug, Clone)]
pub enum BitsOrDuty {
    /// Width of the duty register created by the generator.
    Bits(usize),

    /// Duty signal driven by the caller. Its width becomes the generator width.
    Duty(Signal),
}

impl BitsOrDuty {
    /// Generator width.
    pub fn bits(&self) -> usize {
        match self {
            BitsOrDuty::Bits(bits) => *bits,
            BitsOrDuty::Duty(duty) => duty.width(),
        }
    }
}

impl From<usize> for BitsOrDuty {
    fn from(bits: usize) -> Self { BitsOrDuty::Bits(bits) }
}

impl From<Signal> for BitsOrDuty {
    fn from(duty: Signal) -> Self { BitsOrDuty::Duty(duty) }
}

#[allow(missing_docs)]
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("bits must be in 1..={max}, got {bits}")]
    InvalidWidth { bits: usize, max: usize },

    #[error("default_duty can not be set when external duty is supplied")]
    DefaultDutyWithExternalDuty,

    #[error("with_csr can not be set when external duty is supplied")]
    CsrWithExternalDuty,

    #[error("default_duty {default_duty} does not fit in {bits} bits")]
    DefaultDutyOutOfRange { default_duty: u64, bits: usize },

    #[error("counter must be a signal")]
    CounterNotSignal,

    #[error("counter width {width} < {bits}")]
    CounterTooNarrow { width: usize, bits: usize },

    #[error("out must be 1 bit wide, got {width}")]
    OutputWidth { width: usize },
}

#[allow(missing_docs)]
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PdmError {
    #[error("duty is not writable: {reason}")]
    DutyNotWritable { reason: &'static str },

    #[error("duty {duty} does not fit in {bits} bits")]
    DutyOutOfRange { duty: u64, bits: usize },
}

/// Configuration of a [`Pdm`] generator.
#[derive(Debug, Clone)]
pub struct PdmConfig {
    /// Module name.
    pub name: String,

    /// Output signal. Created when `None`.
    pub out: Option<Signal>,

    /// Width of the duty register, or external duty signal.
    pub bits_or_duty: BitsOrDuty,

    /// Reset value of the duty register. Must be 0 with an external duty signal.
    pub default_duty: u64,

    /// External counter. An owned counter of `bits` width is created when `None`.
    pub counter: Option<Value>,

    /// Exposes the duty register as a CSR.
    pub with_csr: bool,

    /// Domain clocking the counter and the comparator.
    pub clock_domain: ClockDomain,

    /// Domain of the CSR bank.
    pub csr_domain: ClockDomain,
}

impl Default for PdmConfig {
    fn default() -> Self {
        Self {
            name: "pdm".to_string(),
            out: None,
            bits_or_duty: BitsOrDuty::Bits(DEFAULT_BITS),
            default_duty: 0,
            counter: None,
            with_csr: false,
            clock_domain: ClockDomain::sys(),
            csr_domain: ClockDomain::sys(),
        }
    }
}

/// Configuration that passed validation.
struct Validated {
    bits: usize,
    counter: Option<Signal>,
}

impl PdmConfig {
    /// Creates the default configuration: 8 bits, duty 0, owned counter, no CSR, `sys` domain.
    pub fn new() -> Self { Self::default() }

    /// Sets the module name.
    #[must_use]
    pub fn name<S: Into<String>>(mut self, name: S) -> Self {
        self.name = name.into();
        self
    }

    /// Drives the given output signal.
    #[must_use]
    pub fn out(mut self, out: Signal) -> Self {
        self.out = Some(out);
        self
    }

    /// Uses an owned duty register of the given width.
    #[must_use]
    pub fn bits(mut self, bits: usize) -> Self {
        self.bits_or_duty = BitsOrDuty::Bits(bits);
        self
    }

    /// Uses an externally driven duty signal.
    #[must_use]
    pub fn duty(mut self, duty: Signal) -> Self {
        self.bits_or_duty = BitsOrDuty::Duty(duty);
        self
    }

    /// Sets the reset value of the duty register.
    #[must_use]
    pub fn default_duty(mut self, default_duty: u64) -> Self {
        self.default_duty = default_duty;
        self
    }

    /// Uses an externally driven counter.
    #[must_use]
    pub fn counter<V: Into<Value>>(mut self, counter: V) -> Self {
        self.counter = Some(counter.into());
        self
    }

    /// Exposes the duty register as a CSR.
    #[must_use]
    pub fn with_csr(mut self, with_csr: bool) -> Self {
        self.with_csr = with_csr;
        self
    }

    /// Sets the domain clocking the counter and the comparator.
    #[must_use]
    pub fn clock_domain<D: Into<ClockDomain>>(mut self, domain: D) -> Self {
        self.clock_domain = domain.into();
        self
    }

    /// Sets the domain of the CSR bank.
    #[must_use]
    pub fn csr_domain<D: Into<ClockDomain>>(mut self, domain: D) -> Self {
        self.csr_domain = domain.into();
        self
    }

    /// Checks every constraint between the fields, before anything is elaborated.
    pub fn check(&self) -> Result<(), ConfigError> { self.validate().map(|_| ()) }

    fn validate(&self) -> Result<Validated, ConfigError> {
        let bits = self.bits_or_duty.bits();
        if !(1..=MAX_WIDTH).contains(&bits) {
            return Err(ConfigError::InvalidWidth { bits, max: MAX_WIDTH });
        }

        if let BitsOrDuty::Duty(_) = self.bits_or_duty {
            if self.default_duty != 0 {
                return Err(ConfigError::DefaultDutyWithExternalDuty);
            }
            if self.with_csr {
                return Err(ConfigError::CsrWithExternalDuty);
            }
        }

        if self.default_duty > bit_mask(bits) {
            return Err(ConfigError::DefaultDutyOutOfRange { default_duty: self.default_duty, bits });
        }

        let counter = match &self.counter {
            None => None,
            Some(Value::Const(_)) => return Err(ConfigError::CounterNotSignal),
            Some(Value::Signal(counter)) if counter.width() < bits => {
                return Err(ConfigError::CounterTooNarrow { width: counter.width(), bits })
            }
            Some(Value::Signal(counter)) => Some(counter.clone()),
        };

        if let Some(out) = &self.out {
            if out.width() != 1 {
                return Err(ConfigError::OutputWidth { width: out.width() });
            }
        }

        Ok(Validated { bits, counter })
    }
}

/// Source of the duty value seen by the comparator.
#[derive(Debug)]
pub enum DutySource {
    /// Register owned by the generator, written directly from the same domain.
    Register(Signal),

    /// Signal driven by the caller. Read-only for the generator.
    External(Signal),

    /// CSR storage, synchronized into the generator domain.
    Csr {
        /// The CSR.
        csr: CsrStorage,

        /// Synchronizer from the CSR domain.
        sync: MultiReg,
    },
}

impl DutySource {
    /// Signal feeding the comparator.
    fn comparator_input(&self) -> &Signal {
        match self {
            DutySource::Register(duty) | DutySource::External(duty) => duty,
            DutySource::Csr { sync, .. } => sync.o(),
        }
    }
}

/// Pulse Density Modulation generator.
///
/// Every edge of its clock domain the output register takes
/// `bitreverse(counter[bits-1:0], bits) < duty`, computed from the counter and duty values before the edge,
/// and an owned counter increments. Over any `2^bits` consecutive counter values the output is high exactly
/// `duty` times.
#[derive(Debug)]
pub struct Pdm {
    name: String,
    bits: usize,
    domain: ClockDomain,
    out: OwnedOrExternal<Signal>,
    counter: OwnedOrExternal<Counter, Signal>,
    duty: DutySource,
}

impl Pdm {
    /// Elaborates a generator. Fails without creating any signal if the configuration is inconsistent.
    pub fn new(config: PdmConfig) -> Result<Self, ConfigError> {
        let Validated { bits, counter } = config.validate()?;
        let PdmConfig { name, out, bits_or_duty, default_duty, with_csr, clock_domain, csr_domain, .. } = config;

        let out = match out {
            Some(out) => OwnedOrExternal::External(out),
            None => OwnedOrExternal::Owned(Signal::bool("out")),
        };

        let counter = match counter {
            Some(counter) => OwnedOrExternal::External(counter),
            None => OwnedOrExternal::Owned(Counter::new("counter", bits, clock_domain.clone())),
        };

        let duty = match bits_or_duty {
            BitsOrDuty::Duty(duty) => DutySource::External(duty),
            BitsOrDuty::Bits(_) if with_csr => {
                let description = format!(
                    "PDM Width.\n\nDefines the *Duty cycle* of the PDM. PDM is active high for *Duty* ``{cd}_clk`` \
                     cycles and active low for *Period - Width* ``{cd}_clk`` cycles.",
                    cd = clock_domain
                );
                let csr = CsrStorage::new("duty", bits, default_duty, description);
                let depth = if csr_domain == clock_domain { 0 } else { MULTIREG_STAGES };
                let sync = MultiReg::new("duty", csr.storage().clone(), clock_domain.clone(), depth);
                DutySource::Csr { csr, sync }
            }
            BitsOrDuty::Bits(_) => DutySource::Register(Signal::with_reset("duty", bits, default_duty)),
        };

        let pdm = Self { name, bits, domain: clock_domain, out, counter, duty };
        debug!(
            name = %pdm.name,
            bits,
            domain = %pdm.domain,
            owned_counter = pdm.counter.is_owned(),
            owned_out = pdm.out.is_owned(),
            with_csr = pdm.csr().is_some(),
            sync_stages = pdm.sync_stages(),
            "elaborated pdm"
        );
        Ok(pdm)
    }

    /// Width of the duty value.
    pub fn bits(&self) -> usize { self.bits }

    /// Number of cycles in one period, `2^bits`. Saturates at `u64::MAX` for 64 bits.
    pub fn period(&self) -> u64 { bit_mask(self.bits).saturating_add(1) }

    /// Clock domain of the counter and the comparator.
    pub fn domain(&self) -> &ClockDomain { &self.domain }

    /// Output signal.
    pub fn out(&self) -> &Signal { self.out.get() }

    /// Counter signal, owned or external.
    pub fn counter(&self) -> &Signal {
        match &self.counter {
            OwnedOrExternal::Owned(counter) => counter.value(),
            OwnedOrExternal::External(counter) => counter,
        }
    }

    /// Returns `true` if the generator advances its own counter.
    pub fn owns_counter(&self) -> bool { self.counter.is_owned() }

    /// Duty source.
    pub fn duty_source(&self) -> &DutySource { &self.duty }

    /// Duty signal. `None` when the duty is exposed as a CSR, since it is then only written through the CSR.
    pub fn duty(&self) -> Option<&Signal> {
        match &self.duty {
            DutySource::Register(duty) | DutySource::External(duty) => Some(duty),
            DutySource::Csr { .. } => None,
        }
    }

    /// Writes the owned duty register.
    pub fn set_duty(&self, duty: u64) -> Result<(), PdmError> {
        match &self.duty {
            DutySource::Register(reg) => {
                if duty > reg.mask() {
                    return Err(PdmError::DutyOutOfRange { duty, bits: self.bits });
                }
                reg.set(duty);
                Ok(())
            }
            DutySource::External(_) => Err(PdmError::DutyNotWritable { reason: "duty is driven externally" }),
            DutySource::Csr { .. } => Err(PdmError::DutyNotWritable { reason: "duty is exposed as a CSR" }),
        }
    }

    /// The duty CSR, if enabled.
    pub fn csr(&self) -> Option<&CsrStorage> {
        match &self.duty {
            DutySource::Csr { csr, .. } => Some(csr),
            DutySource::Register(_) | DutySource::External(_) => None,
        }
    }

    /// All CSRs of the generator.
    pub fn csrs(&self) -> Vec<&CsrStorage> { self.csr().into_iter().collect() }

    /// Duty value the comparator uses at the next edge.
    pub fn effective_duty(&self) -> u64 { self.duty.comparator_input().get() }

    /// Number of synchronizer stages between the CSR and the comparator.
    pub fn sync_stages(&self) -> usize {
        match &self.duty {
            DutySource::Csr { sync, .. } => sync.depth(),
            DutySource::Register(_) | DutySource::External(_) => 0,
        }
    }

    /// Simulates one edge of the generator's domain.
    pub fn tick(&self) {
        let domain = self.domain.clone();
        self.eval(&domain);
        self.commit(&domain);
    }

    fn duty_ident(&self) -> String {
        match &self.duty {
            DutySource::Register(_) | DutySource::External(_) => "duty".to_string(),
            DutySource::Csr { csr, sync } => sync.output_ident(csr.storage().name()),
        }
    }
}

impl Module for Pdm {
    fn name(&self) -> &str { &self.name }

    fn domains(&self) -> Vec<ClockDomain> { vec![self.domain.clone()] }

    fn eval(&self, domain: &ClockDomain) {
        if *domain != self.domain {
            return;
        }
        self.out().next(pdm_output(self.counter().get(), self.effective_duty(), self.bits).into());
        if let OwnedOrExternal::Owned(counter) = &self.counter {
            counter.schedule();
        }
        if let DutySource::Csr { sync, .. } = &self.duty {
            sync.eval(domain);
        }
    }

    fn commit(&self, domain: &ClockDomain) {
        if *domain != self.domain {
            return;
        }
        self.out().commit();
        if let OwnedOrExternal::Owned(counter) = &self.counter {
            counter.value().commit();
        }
        if let DutySource::Csr { sync, .. } = &self.duty {
            sync.commit(domain);
        }
    }

    fn to_vir(&self) -> vir::Module {
        let clk = self.domain.clk_name();
        let mut port_decls = vec![PortDeclaration::input(1, clk.clone())];
        if let OwnedOrExternal::External(ext) = &self.counter {
            port_decls.push(PortDeclaration::input(ext.width(), COUNTER_IDENT));
        }
        match &self.duty {
            DutySource::Register(_) | DutySource::External(_) => port_decls.push(PortDeclaration::input(self.bits, "duty")),
            DutySource::Csr { csr, .. } => port_decls.push(PortDeclaration::input(self.bits, csr.storage().name())),
        }
        port_decls.push(PortDeclaration::output(1, "out"));

        let mut decls = vec![Declaration::reg(1, "out_reg").with_init(Expression::number(1, 0))];
        let mut stmts = vec![];
        if let OwnedOrExternal::Owned(owned) = &self.counter {
            decls.push(owned.declaration(COUNTER_IDENT));
            stmts.push(owned.statement(COUNTER_IDENT));
        }

        // Reversed least significant `bits` bits of the counter, most significant first.
        let reversed = Expression::concat((0..self.bits).map(|i| Expression::index(COUNTER_IDENT, i)));
        stmts.push(Statement::Conditional(
            Expression::binary(BinaryOp::Less, reversed, self.duty_ident().into()),
            vec![Statement::nonblocking_assignment("out_reg".into(), Expression::number(1, 1))],
            vec![Statement::nonblocking_assignment("out_reg".into(), Expression::number(1, 0))],
        ));

        let mut module_items = vec![ModuleItem::Declarations(decls)];
        if let DutySource::Csr { csr, sync } = &self.duty {
            module_items.extend(sync.vir_items(csr.storage().name()));
        }
        module_items.push(ModuleItem::always_posedge(&clk, stmts));
        module_items.push(ModuleItem::ContinuousAssigns(vec![ContinuousAssign::new("out".into(), "out_reg".into())]));

        vir::Module { name: self.name.clone(), port_decls, module_items }
    }
}

#[cfg(test)]
mod tests {
    use pdmflow::Const;

    use super::*;

    #[test]
    fn pattern_example() {
        let pattern = pdm_pattern(3, 3).map(u8::from).collect::<Vec<_>>();
        assert_eq!(pattern, vec![1, 0, 1, 0, 1, 0, 0, 0]);
    }

    #[test]
    fn comparator_is_total_and_deterministic() {
        let bits = 4;
        for counter in 0..16 {
            for duty in 0..16 {
                let expected = bitreverse(counter, bits) < duty;
                assert_eq!(pdm_output(counter, duty, bits), expected);
                assert_eq!(pdm_output(counter, duty, bits), pdm_output(counter, duty, bits));
            }
        }
    }

    #[test]
    fn comparator_ignores_high_counter_bits() {
        assert_eq!(pdm_output(0b1_0000_0010, 3, 3), pdm_output(0b010, 3, 3));
    }

    #[test]
    fn density_matches_duty() {
        for bits in 1..=8 {
            for duty in 0..=bit_mask(bits) {
                let high = pdm_pattern(duty, bits).filter(|&out| out).count() as u64;
                assert_eq!(high, duty, "bits = {}, duty = {}", bits, duty);
            }
        }
    }

    #[test]
    fn max_duty_has_one_low_cycle() {
        let bits = 5;
        let low = pdm_pattern(bit_mask(bits), bits).enumerate().filter(|(_, out)| !out).map(|(c, _)| c).collect::<Vec<_>>();
        assert_eq!(low, vec![31]);
    }

    #[test]
    fn default_configuration() {
        let pdm = Pdm::new(PdmConfig::new()).unwrap();
        assert_eq!(pdm.bits(), DEFAULT_BITS);
        assert_eq!(pdm.period(), 256);
        assert!(pdm.owns_counter());
        assert_eq!(pdm.effective_duty(), 0);
        assert!(pdm.csrs().is_empty());
        assert_eq!(pdm.domain(), &ClockDomain::sys());
    }

    #[test]
    fn validation_errors() {
        let duty = Signal::new("duty", 8);

        assert_eq!(
            PdmConfig::new().duty(duty.clone()).default_duty(1).check(),
            Err(ConfigError::DefaultDutyWithExternalDuty)
        );
        assert_eq!(PdmConfig::new().duty(duty.clone()).with_csr(true).check(), Err(ConfigError::CsrWithExternalDuty));
        assert_eq!(PdmConfig::new().counter(Const::new(0, 8)).check(), Err(ConfigError::CounterNotSignal));
        assert_eq!(
            PdmConfig::new().counter(Signal::new("counter", 7)).check(),
            Err(ConfigError::CounterTooNarrow { width: 7, bits: 8 })
        );
        assert_eq!(PdmConfig::new().bits(0).check(), Err(ConfigError::InvalidWidth { bits: 0, max: 64 }));
        assert_eq!(PdmConfig::new().bits(65).check(), Err(ConfigError::InvalidWidth { bits: 65, max: 64 }));
        assert_eq!(
            PdmConfig::new().bits(3).default_duty(8).check(),
            Err(ConfigError::DefaultDutyOutOfRange { default_duty: 8, bits: 3 })
        );
        assert_eq!(PdmConfig::new().out(Signal::new("out", 2)).check(), Err(ConfigError::OutputWidth { width: 2 }));

        assert_eq!(PdmConfig::new().duty(duty).counter(Signal::new("counter", 12)).check(), Ok(()));
        assert!(Pdm::new(PdmConfig::new().counter(Const::new(0, 8))).is_err());
    }

    #[test]
    fn counter_as_wide_as_duty_is_accepted() {
        let counter = Signal::new("c", 8);
        let config = PdmConfig::new().bits(8).counter(counter.clone());
        assert_eq!(config.check(), Ok(()));
        let pdm = Pdm::new(config).unwrap();
        assert!(!pdm.owns_counter());
        assert!(pdm.counter().ptr_eq(&counter));
        assert_eq!(pdm.period(), 256);
    }

    #[test]
    #[should_panic(expected = "width exceeds MAX_WIDTH")]
    fn comparator_rejects_wide_values() { let _ = pdm_output(1, 1, MAX_WIDTH + 1); }

    #[test]
    fn external_duty_sets_width() {
        let duty = Signal::new("level", 5);
        let pdm = Pdm::new(PdmConfig::new().bits(12).duty(duty.clone())).unwrap();
        assert_eq!(pdm.bits(), 5);
        assert!(pdm.duty().unwrap().ptr_eq(&duty));
        assert_eq!(pdm.set_duty(1), Err(PdmError::DutyNotWritable { reason: "duty is driven externally" }));
    }

    #[test]
    fn set_duty_checks_range() {
        let pdm = Pdm::new(PdmConfig::new().bits(4)).unwrap();
        assert_eq!(pdm.set_duty(16), Err(PdmError::DutyOutOfRange { duty: 16, bits: 4 }));
        assert_eq!(pdm.set_duty(15), Ok(()));
        assert_eq!(pdm.effective_duty(), 15);
    }

    #[test]
    fn csr_hides_duty_signal() {
        let pdm = Pdm::new(PdmConfig::new().bits(6).default_duty(9).with_csr(true)).unwrap();
        assert!(pdm.duty().is_none());
        assert_eq!(pdm.set_duty(1), Err(PdmError::DutyNotWritable { reason: "duty is exposed as a CSR" }));

        let csr = pdm.csr().unwrap();
        assert_eq!(csr.name(), "duty");
        assert_eq!(csr.width(), 6);
        assert_eq!(csr.reset_value(), 9);
        assert!(csr.description().contains("``sys_clk``"));
        assert_eq!(pdm.effective_duty(), 9);
        assert_eq!(pdm.sync_stages(), 0);
    }

    #[test]
    fn csr_stages_depend_on_domains() {
        let same = Pdm::new(PdmConfig::new().with_csr(true).clock_domain("pdm").csr_domain("pdm")).unwrap();
        let cross = Pdm::new(PdmConfig::new().with_csr(true).clock_domain("pdm")).unwrap();
        assert_eq!(same.sync_stages(), 0);
        assert_eq!(cross.sync_stages(), MULTIREG_STAGES);
    }

    #[test]
    fn output_follows_counter_before_edge() {
        let pdm = Pdm::new(PdmConfig::new().bits(3).default_duty(3)).unwrap();
        let mut outputs = vec![];
        for _ in 0..16 {
            let counter = pdm.counter().get();
            pdm.tick();
            assert_eq!(pdm.counter().get(), (counter + 1) % 8);
            outputs.push(pdm.out().get());
        }
        assert_eq!(outputs, vec![1, 0, 1, 0, 1, 0, 0, 0, 1, 0, 1, 0, 1, 0, 0, 0]);
    }

    #[test]
    fn verilog_reverses_counter() {
        let code = Pdm::new(PdmConfig::new().name("pdm_led").bits(3)).unwrap().to_vir().to_string();
        assert!(code.contains("module pdm_led"));
        assert!(code.contains("input wire sys_clk,"));
        assert!(code.contains("input wire [3-1:0] duty,"));
        assert!(code.contains("output wire out"));
        assert!(code.contains("reg [3-1:0] counter = 3'd0;"));
        assert!(code.contains("counter <= counter + 3'd1;"));
        assert!(code.contains("if ({counter[0], counter[1], counter[2]} < duty) begin"));
        assert!(code.contains("assign out = out_reg;"));
    }

    #[test]
    fn verilog_external_counter_and_csr() {
        let pdm = Pdm::new(
            PdmConfig::new().bits(2).counter(Signal::new("shared", 4)).with_csr(true).clock_domain("pdm"),
        )
        .unwrap();
        let code = pdm.to_vir().to_string();
        assert!(code.contains("input wire [4-1:0] counter,"));
        assert!(code.contains("input wire [2-1:0] duty_storage,"));
        assert!(!code.contains("shared"));
        assert!(!code.contains("counter <="));
        assert!(code.contains("always @(posedge pdm_clk) begin\n    duty_multireg0 <= duty_storage;"));
        assert!(code.contains("if ({counter[0], counter[1]} < duty_multireg1) begin"));
    }

    #[test]
    fn verilog_port_names_do_not_follow_caller_signals() {
        let pdm = Pdm::new(PdmConfig::new().bits(3).counter(Signal::new("duty", 4))).unwrap();
        let vir = pdm.to_vir();
        let ports = vir.port_decls.iter().map(ToString::to_string).collect::<Vec<_>>();
        assert_eq!(ports, vec![
            "input wire sys_clk",
            "input wire [4-1:0] counter",
            "input wire [3-1:0] duty",
            "output wire out"
        ]);
        assert!(vir.to_string().contains("if ({counter[0], counter[1], counter[2]} < duty) begin"));
    }

    #[test]
    fn verilog_external_duty() {
        let level = Signal::new("level", 5);
        let code = Pdm::new(PdmConfig::new().duty(level)).unwrap().to_vir().to_string();
        assert!(code.contains("input wire [5-1:0] duty,"));
        assert!(!code.contains("level"));
        assert!(!code.contains("duty <="));
        assert!(code.contains("reg [5-1:0] counter = 5'd0;"));
        assert!(code.contains("if ({counter[0], counter[1], counter[2], counter[3], counter[4]} < duty) begin"));
    }
}
