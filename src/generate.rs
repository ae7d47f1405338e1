pub(crate) mod orchestrator;
pub(crate) mod service;
