//! Clock domain crossing.
//!
//! A value written in one clock domain is sampled by a chain of registers in the consumer domain before it is
//! used, giving a possibly metastable first stage time to settle. Each bit is synchronized independently: if a
//! multi-bit source changes while a previous value is still propagating, the consumer may observe a mix of old and
//! new bits for a cycle. Such values are only eventually consistent.

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::iter;

use itertools::Itertools;
use pdmflow::vir::{self, ContinuousAssign, Declaration, Expression, ModuleItem, PortDeclaration, Statement};
use pdmflow::{ClockDomain, Module, Signal};
use static_assertions::const_assert;

/// Number of synchronizer stages used between unrelated clock domains.
pub const MULTIREG_STAGES: usize = 2;

const_assert!(MULTIREG_STAGES >= 2);

/// Fixed-depth shift register of samples.
///
/// A value shifted in becomes the output after `depth` shifts. Depth 0 passes the input through.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Synchronizer<T> {
    stages: VecDeque<T>,
}

impl<T: Copy> Synchronizer<T> {
    /// Creates a new synchronizer with every stage holding `init`.
    pub fn new(depth: usize, init: T) -> Self { Self { stages: iter::repeat(init).take(depth).collect() } }

    /// Number of stages.
    pub fn depth(&self) -> usize { self.stages.len() }

    /// Shifts `input` into the first stage, dropping the last one.
    pub fn shift(&mut self, input: T) {
        if self.stages.is_empty() {
            return;
        }
        self.stages.push_front(input);
        let _ = self.stages.pop_back();
    }

    /// Output given the current `input`: the last stage, or `input` itself when the depth is 0.
    pub fn output(&self, input: T) -> T { self.stages.back().copied().unwrap_or(input) }

    /// Values held by the stages, first stage first.
    pub fn stages(&self) -> impl Iterator<Item = &T> { self.stages.iter() }
}

/// Synchronizes a signal into the clock domain `odomain`.
#[derive(Debug)]
pub struct MultiReg {
    name: String,
    i: Signal,
    o: Signal,
    odomain: ClockDomain,
    sync: RefCell<Synchronizer<u64>>,
    sampled: Cell<Option<u64>>,
}

impl MultiReg {
    /// Creates a new synchronizer of `depth` stages. The stages and the output reset to the reset value of `i`.
    ///
    /// With depth 0 the output is the input signal itself.
    pub fn new<S: Into<String>>(name: S, i: Signal, odomain: ClockDomain, depth: usize) -> Self {
        let name = name.into();
        let o = if depth == 0 { i.clone() } else { Signal::with_reset(format!("{}_o", name), i.width(), i.reset_value()) };
        let sync = RefCell::new(Synchronizer::new(depth, i.reset_value()));
        Self { name, i, o, odomain, sync, sampled: Cell::new(None) }
    }

    /// Input signal, in the source domain.
    pub fn i(&self) -> &Signal { &self.i }

    /// Output signal, in `odomain`.
    pub fn o(&self) -> &Signal { &self.o }

    /// Number of stages.
    pub fn depth(&self) -> usize { self.sync.borrow().depth() }

    /// Clock domain of the output.
    pub fn odomain(&self) -> &ClockDomain { &self.odomain }

    fn stage_names(&self) -> Vec<String> { (0..self.depth()).map(|k| format!("{}_multireg{}", self.name, k)).collect() }

    /// Identifier holding the synchronized value in generated Verilog, given the identifier of the input.
    pub(crate) fn output_ident(&self, input: &str) -> String {
        self.stage_names().pop().unwrap_or_else(|| input.to_string())
    }

    /// Register declarations and the shift chain in generated Verilog, fed from the identifier `input`.
    pub(crate) fn vir_items(&self, input: &str) -> Vec<ModuleItem> {
        let stages = self.stage_names();
        if stages.is_empty() {
            return vec![];
        }

        let width = self.i.width();
        let decls = stages
            .iter()
            .map(|stage| Declaration::reg(width, stage.clone()).with_init(Expression::number(width, self.i.reset_value())))
            .collect();
        let chain = iter::once(input.to_string())
            .chain(stages)
            .tuple_windows()
            .map(|(src, dst)| Statement::nonblocking_assignment(dst.into(), src.into()))
            .collect();

        vec![ModuleItem::Commented(format!("{} synchronizer into {}", self.name, self.odomain), vec![
            ModuleItem::Declarations(decls),
            ModuleItem::always_posedge(&self.odomain.clk_name(), chain),
        ])]
    }
}

impl Module for MultiReg {
    fn name(&self) -> &str { &self.name }

    fn domains(&self) -> Vec<ClockDomain> { vec![self.odomain.clone()] }

    fn eval(&self, domain: &ClockDomain) {
        if *domain == self.odomain && self.depth() > 0 {
            self.sampled.set(Some(self.i.get()));
        }
    }

    fn commit(&self, domain: &ClockDomain) {
        if *domain != self.odomain {
            return;
        }
        if let Some(sample) = self.sampled.take() {
            let mut sync = self.sync.borrow_mut();
            sync.shift(sample);
            self.o.set(sync.output(sample));
        }
    }

    fn to_vir(&self) -> vir::Module {
        let width = self.i.width();
        let mut module_items = self.vir_items("i");
        module_items
            .push(ModuleItem::ContinuousAssigns(vec![ContinuousAssign::new("o".into(), self.output_ident("i").into())]));

        vir::Module {
            name: self.name.clone(),
            port_decls: vec![
                PortDeclaration::input(1, self.odomain.clk_name()),
                PortDeclaration::input(width, "i"),
                PortDeclaration::output(width, "o"),
            ],
            module_items,
        }
    }
}
