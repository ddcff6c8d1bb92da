//! Render drivers.
//!
//! [`render_driver::RenderDriver`] is the canonical controller: it drains the
//! queue into keyframes once and renders each phase as one batched animation
//! job. [`immediate::ImmediateDriver`] is the documented fallback that pops
//! and renders one frame at a time without touching animation state.

pub mod immediate;
pub mod render_driver;
