//! Signals.
//!
//! A [`Signal`] is a shared handle to one register or wire. Cloning the handle does not copy the signal: all
//! clones observe and drive the same value. This is how a module hands one of its signals to another module, or
//! how a caller supplies a signal it owns to a module.

use std::cell::Cell;
use std::fmt;
use std::rc::Rc;

use crate::utils::bit_mask;

/// Maximum width of a signal.
pub const MAX_WIDTH: usize = u64::BITS as usize;

#[derive(Debug)]
struct SignalInner {
    name: String,
    width: usize,
    reset: u64,
    value: Cell<u64>,
    next: Cell<Option<u64>>,
}

/// Handle to a signal of width `1..=64`.
///
/// Registers are updated in two phases. [`Signal::next`] schedules the value a register takes at the coming clock
/// edge and [`Signal::commit`] applies it, so that every module evaluated during an edge samples the values from
/// before the edge.
#[derive(Debug, Clone)]
pub struct Signal {
    inner: Rc<SignalInner>,
}

impl Signal {
    /// Creates a new signal with reset value 0.
    ///
    /// # Panics
    ///
    /// Panics if `width` is 0 or larger than [`MAX_WIDTH`].
    pub fn new<S: Into<String>>(name: S, width: usize) -> Self { Self::with_reset(name, width, 0) }

    /// Creates a new one-bit signal.
    pub fn bool<S: Into<String>>(name: S) -> Self { Self::new(name, 1) }

    /// Creates a new signal with the given reset value, truncated to `width`.
    ///
    /// # Panics
    ///
    /// Panics if `width` is 0 or larger than [`MAX_WIDTH`].
    pub fn with_reset<S: Into<String>>(name: S, width: usize, reset: u64) -> Self {
        assert!((1..=MAX_WIDTH).contains(&width), "signal width must be in 1..={}, got {}", MAX_WIDTH, width);
        let reset = reset & bit_mask(width);
        Self {
            inner: Rc::new(SignalInner {
                name: name.into(),
                width,
                reset,
                value: Cell::new(reset),
                next: Cell::new(None),
            }),
        }
    }

    /// Returns the signal name.
    pub fn name(&self) -> &str { &self.inner.name }

    /// Returns the bit width.
    pub fn width(&self) -> usize { self.inner.width }

    /// Returns the reset value.
    pub fn reset_value(&self) -> u64 { self.inner.reset }

    /// Returns the all-ones mask of this signal's width.
    pub fn mask(&self) -> u64 { bit_mask(self.inner.width) }

    /// Returns the current value.
    pub fn get(&self) -> u64 { self.inner.value.get() }

    /// Returns `true` if the least significant bit is set.
    pub fn is_high(&self) -> bool { self.get() & 1 == 1 }

    /// Drives the signal immediately, truncating to its width.
    ///
    /// This models combinational logic or testbench stimulus. Registers should use [`Signal::next`].
    pub fn set(&self, value: u64) { self.inner.value.set(value & self.mask()) }

    /// Schedules the value the register takes at the coming clock edge.
    pub fn next(&self, value: u64) { self.inner.next.set(Some(value & self.mask())) }

    /// Applies the scheduled value, if any. Returns `true` if the value was updated.
    pub fn commit(&self) -> bool {
        match self.inner.next.take() {
            Some(value) => {
                self.inner.value.set(value);
                true
            }
            None => false,
        }
    }

    /// Restores the reset value and drops any scheduled update.
    pub fn reset(&self) {
        self.inner.next.set(None);
        self.inner.value.set(self.inner.reset);
    }

    /// Returns `true` if both handles refer to the same signal.
    pub fn ptr_eq(&self, other: &Signal) -> bool { Rc::ptr_eq(&self.inner, &other.inner) }
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[{}] = {:#x}", self.inner.name, self.inner.width, self.get())
    }
}

/// Constant value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Const {
    /// Value.
    pub value: u64,

    /// Bit width.
    pub width: usize,
}

impl Const {
    /// Creates a new constant, truncated to `width`.
    pub fn new(value: u64, width: usize) -> Self { Self { value: value & bit_mask(width), width } }
}

/// Operand accepted where a module expects a caller-supplied signal.
#[derive(Debug, Clone)]
pub enum Value {
    /// Signal handle.
    Signal(Signal),

    /// Constant.
    Const(Const),
}

impl Value {
    /// Returns the bit width.
    pub fn width(&self) -> usize {
        match self {
            Value::Signal(signal) => signal.width(),
            Value::Const(constant) => constant.width,
        }
    }

    /// Returns the signal handle, or `None` for constants.
    pub fn as_signal(&self) -> Option<&Signal> {
        match self {
            Value::Signal(signal) => Some(signal),
            Value::Const(_) => None,
        }
    }
}

impl From<Signal> for Value {
    fn from(signal: Signal) -> Self { Value::Signal(signal) }
}

impl From<Const> for Value {
    fn from(constant: Const) -> Self { Value::Const(constant) }
}

/// Either allocated by the module itself, or supplied by the caller.
///
/// Resolved once at construction.
#[derive(Debug, Clone)]
pub enum OwnedOrExternal<O, E = O> {
    /// Allocated and driven by the module.
    Owned(O),

    /// Supplied and driven by the caller.
    External(E),
}

impl<O, E> OwnedOrExternal<O, E> {
    /// Returns `true` if the module owns the value.
    pub fn is_owned(&self) -> bool { matches!(self, Self::Owned(_)) }

    /// Returns the owned value, if any.
    pub fn owned(&self) -> Option<&O> {
        match self {
            Self::Owned(owned) => Some(owned),
            Self::External(_) => None,
        }
    }
}

impl<T> OwnedOrExternal<T> {
    /// Returns the inner value regardless of ownership.
    pub fn get(&self) -> &T {
        match self {
            Self::Owned(inner) | Self::External(inner) => inner,
        }
    }
}
