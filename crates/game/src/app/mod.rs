mod bootstrap;
mod catalog;
mod config;
mod flow;
mod loop_runner;
mod puzzle;

pub(crate) use bootstrap::build_app;
pub(crate) use loop_runner::run;
