//! Periodic invocation through a per-user launchd agent.

pub(crate) mod launchd;
