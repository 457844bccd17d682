//! Glaze renders declarative JSON UI documents produced by a coding agent.
//!
//! The same canonical document drives two targets: a live interactive egui
//! canvas ([`canvas::runtime::CanvasRuntime`]) and a standalone generated
//! source file ([`canvas::emit::emit_source`]).

pub mod app;
pub mod canvas;
pub mod event;
pub mod feed;
pub mod theme;

pub use canvas::emit::emit_source;
pub use canvas::runtime::CanvasRuntime;
