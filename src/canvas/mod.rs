pub mod action;
pub mod contract;
pub mod emit;
pub mod emit_runtime;
pub mod expr;
pub mod registry;
pub mod runtime;
pub mod spec;
pub mod state;
