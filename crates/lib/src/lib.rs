//! gearbox-lib: build orchestration engine for gearbox.
//!
//! This crate turns a declarative module manifest (`build.json`) into build
//! artifacts. It owns the control flow only:
//! - `config`: tiered option resolution (caller > global config file > defaults)
//! - `queue`: the single-flight build queue
//! - `orchestrate`: the cascading build-source resolution that decides whether
//!   to build from a manifest, walk a directory tree, or convert a legacy
//!   format and retry
//!
//! The actual artifact transformation, directory-walk reporting, legacy
//! conversion, and file watching are collaborators behind narrow traits
//! (`builder`, `walk`, `legacy`, `watch`, `pack`); the implementations shipped
//! here are deliberately minimal.

pub mod builder;
pub mod config;
pub mod consts;
pub mod help;
pub mod legacy;
pub mod log;
pub mod manifest;
pub mod options;
pub mod orchestrate;
pub mod pack;
pub mod queue;
pub mod util;
pub mod walk;
pub mod watch;
