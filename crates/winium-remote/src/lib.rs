//! Remote wire-protocol plumbing for Winium drivers.
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`capabilities`] | Ordered capability payload for session negotiation |
//! | [`command`] | `CommandInfo` (verb + URL template) and `Command` |
//! | [`registry`] | Name → `CommandInfo` registry with the base command set |
//! | [`executor`] | `CommandExecutor` trait and the reqwest-backed HTTP executor |
//! | [`response`] | JSON wire / W3C response decoding and element references |
//! | [`config`] | Endpoint URL and per-command timeout |

pub mod capabilities;
pub mod command;
pub mod config;
pub mod error;
pub mod executor;
pub mod registry;
pub mod response;

pub use capabilities::Capabilities;
pub use command::{Command, CommandInfo, HttpVerb};
pub use config::RemoteConfig;
pub use error::RemoteError;
pub use executor::{CommandExecutor, HttpCommandExecutor};
pub use registry::CommandRegistry;
pub use response::Response;
