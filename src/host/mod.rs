//! Injected host capabilities.
//!
//! The sweep core never talks to a concrete scene graph, render engine or
//! event loop. It receives a [`scene::SceneHandle`] and a
//! [`engine::RenderEngine`] per invocation and a [`scheduler::Subscription`]
//! for the lifetime of a job. [`memory`] provides in-memory implementations
//! for tests and host-less dry runs.

pub mod engine;
pub mod memory;
pub mod scene;
pub mod scheduler;
