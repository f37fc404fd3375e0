//! Match-3 rules engine (workspace facade crate).
//!
//! Re-exports the member crates under one name so applications and the
//! integration tests depend on a single package:
//!
//! - [`types`]: plain data, config and events
//! - [`core`]: grid rules, board and piece lifecycle
//! - [`engine`]: play session, actions and the cascade

pub use match3_core as core;
pub use match3_engine as engine;
pub use match3_types as types;
