//! Custom hooks.

mod use_items;
mod use_relax_loop;

pub use use_items::{ItemsState, use_items};
pub use use_relax_loop::use_relax_loop;
