//! Counter modules.

use pdmflow::vir::{self, BinaryOp, ContinuousAssign, Declaration, Expression, ModuleItem, PortDeclaration, Statement};
use pdmflow::{ClockDomain, Module, Signal};

/// Free-running counter.
///
/// Starts at 0 and increments by one every edge of its domain, wrapping around at `2^width`.
#[derive(Debug)]
pub struct Counter {
    value: Signal,
    domain: ClockDomain,
}

impl Counter {
    /// Creates a new counter.
    ///
    /// # Panics
    ///
    /// Panics if `width` is 0 or larger than [`MAX_WIDTH`](pdmflow::MAX_WIDTH).
    pub fn new<S: Into<String>>(name: S, width: usize, domain: ClockDomain) -> Self {
        Self { value: Signal::new(name, width), domain }
    }

    /// Counter value.
    pub fn value(&self) -> &Signal { &self.value }

    /// Counter width.
    pub fn width(&self) -> usize { self.value.width() }

    /// Clock domain of the counter.
    pub fn domain(&self) -> &ClockDomain { &self.domain }

    /// Simulates one edge of the counter's domain.
    pub fn tick(&self) {
        self.schedule();
        self.value.commit();
    }

    pub(crate) fn schedule(&self) { self.value.next(self.value.get().wrapping_add(1)); }

    /// Register holding the count in generated Verilog, named `ident`.
    pub(crate) fn declaration(&self, ident: &str) -> Declaration {
        Declaration::reg(self.width(), ident).with_init(Expression::number(self.width(), 0))
    }

    pub(crate) fn statement(&self, ident: &str) -> Statement {
        Statement::nonblocking_assignment(
            ident.into(),
            Expression::binary(BinaryOp::Add, ident.into(), Expression::number(self.width(), 1)),
        )
    }
}

impl Module for Counter {
    fn name(&self) -> &str { self.value.name() }

    fn domains(&self) -> Vec<ClockDomain> { vec![self.domain.clone()] }

    fn eval(&self, domain: &ClockDomain) {
        if *domain == self.domain {
            self.schedule();
        }
    }

    fn commit(&self, domain: &ClockDomain) {
        if *domain == self.domain {
            self.value.commit();
        }
    }

    fn to_vir(&self) -> vir::Module {
        let reg = format!("{}_reg", self.value.name());

        vir::Module {
            name: self.value.name().to_string(),
            port_decls: vec![
                PortDeclaration::input(1, self.domain.clk_name()),
                PortDeclaration::output(self.width(), self.value.name()),
            ],
            module_items: vec![
                ModuleItem::Declarations(vec![self.declaration(&reg)]),
                ModuleItem::always_posedge(&self.domain.clk_name(), vec![self.statement(&reg)]),
                ModuleItem::ContinuousAssigns(vec![ContinuousAssign::new(self.value.name().into(), reg.into())]),
            ],
        }
    }
}
