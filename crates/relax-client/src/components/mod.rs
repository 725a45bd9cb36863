//! UI components.

mod relax_mode;

pub use relax_mode::RelaxMode;
