//! Price structure: support/resistance and Fibonacci retracements

pub mod fibonacci;
pub mod support_resistance;

pub use fibonacci::{DEFAULT_FIB_LOOKBACK, FIB_RATIOS, FibonacciLevels, fibonacci_levels};
pub use support_resistance::{
    DEFAULT_HALF_WINDOW, DEFAULT_TOLERANCE, SupportResistance, support_resistance,
};
