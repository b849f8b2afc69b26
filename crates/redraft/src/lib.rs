//! Redraft - asynchronous AI text rewriting for mail composers.
//!
//! The crate is the orchestration core of a composer extension: it loads
//! prompt definitions and credentials, talks to an OpenAI-style completion
//! service, and coordinates one transform invocation at a time against a
//! single-threaded composer UI. The composer itself stays behind the
//! [`host::ComposerHost`] trait; the remote service stays behind
//! [`llm::TransformBackend`].
//!
//! Flow: the host activates an action from [`actions::ActionSet`], receives
//! an [`orchestrator::Invocation`], and drives it on its UI runtime. The
//! invocation fetches the composer text, runs the blocking service call on
//! a worker thread, shows a wait indicator only when the request runs long,
//! and delivers the result (or error) back through the host.

pub mod actions;
pub mod config;
pub mod extension;
pub mod host;
pub mod llm;
pub mod orchestrator;
pub mod registry;
