//! ELM327 protocol engine for a simulated OBD2 adapter
//!
//! This library answers the requests a scan tool sends to an ELM327
//! adapter: `AT` handshake commands, mode 01 current-data PIDs and a small
//! set of mode 21 vendor PIDs. Values come from a [`ValueStore`] refreshed
//! once per cycle, with engine speed derived from a shared
//! [`PulseCounter`].
//!
//! Transport is left to the caller: feed inbound bytes to [`Engine::feed`]
//! one at a time and it writes replies through a [`ReplyEmitter`].

pub mod config;
pub mod counter;
pub mod dispatcher;
pub mod emitter;
pub mod engine;
pub mod frame;
pub mod lexer;
pub mod pid;
pub mod request;
pub mod store;

pub use config::{ConfigError, Identity, LogLevel, SimulatorConfig};
pub use counter::{PulseCounter, Tachometer};
pub use dispatcher::Dispatcher;
pub use emitter::{EmitError, ReplyEmitter};
pub use engine::Engine;
pub use frame::{encode, encode_checked, ByteWidth, FrameOverflow};
pub use lexer::{LexEvent, LineLexer};
pub use request::{ControlCommand, LegacyCommand, Request};
pub use store::{AnalogInput, Measurement, Placeholders, ValueStore};
