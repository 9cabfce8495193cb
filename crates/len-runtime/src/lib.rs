//! Reference interpreter for line-length programs.
//!
//! Executes a decoded program directly with the same semantics as the
//! generated C++, including its defined fallbacks:
//! - Popping an empty stack yields zero
//! - Division by zero yields zero, arithmetic wraps
//! - An operand slot past the end reads as zero

pub mod context;
pub mod machine;

pub use context::ExecutionContext;
pub use machine::{ExecutionReport, Machine};

/// Interpreter configuration
#[derive(Debug, Clone, Default)]
pub struct RuntimeConfig {
    /// Maximum dispatched steps; `None` runs until the program ends
    pub max_steps: Option<u64>,
}

impl RuntimeConfig {
    pub fn with_max_steps(max_steps: u64) -> Self {
        Self {
            max_steps: Some(max_steps),
        }
    }
}
