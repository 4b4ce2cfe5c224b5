//! Builds the reply lines for a classified request.

use std::io::Write;

use crate::config::Identity;
use crate::emitter::{EmitError, ReplyEmitter};
use crate::frame::encode;
use crate::pid::{lookup, PidEntry, FALLBACK_WIDTH, STANDARD_PIDS, VENDOR_PIDS};
use crate::request::{ControlCommand, Request};
use crate::store::ValueStore;

/// Sent after every request
pub const PROMPT: &str = ">";
pub const OK: &str = "OK";

/// Mode 01 response tag
pub const STANDARD_REPLY_TAG: &str = "41";
/// Mode 21 response tag
pub const VENDOR_REPLY_TAG: &str = "61";

#[derive(Debug, Clone)]
pub struct Dispatcher {
    identity: Identity,
}

impl Dispatcher {
    #[must_use]
    pub fn new(identity: Identity) -> Self {
        Self { identity }
    }

    /// Reply lines for `request`, not including the prompt
    #[must_use]
    pub fn replies(&self, request: &Request<'_>, store: &ValueStore) -> Vec<String> {
        match *request {
            Request::Control(cmd) => self.control_replies(cmd),
            Request::Standard { pid } => {
                vec![data_reply(STANDARD_REPLY_TAG, STANDARD_PIDS, pid, store)]
            }
            Request::Vendor { pid } => vec![data_reply(VENDOR_REPLY_TAG, VENDOR_PIDS, pid, store)],
            Request::Unrecognized => Vec::new(),
        }
    }

    /// Emit the replies for `request`, then the prompt
    pub fn handle<W: Write>(
        &self,
        request: &Request<'_>,
        store: &ValueStore,
        emitter: &mut ReplyEmitter<W>,
    ) -> Result<(), EmitError> {
        for line in self.replies(request, store) {
            emitter.emit(&line)?;
        }
        emitter.emit(PROMPT)
    }

    fn control_replies(&self, cmd: ControlCommand<'_>) -> Vec<String> {
        let id = &self.identity;
        match cmd {
            ControlCommand::Reset => vec![id.version.clone(), OK.to_string()],
            ControlCommand::Identify => vec![id.version.clone()],
            ControlCommand::Describe => vec![id.device_description.clone()],
            ControlCommand::ProtocolNumber => vec![id.protocol_number.clone()],
            ControlCommand::Voltage => vec![id.voltage.clone()],
            ControlCommand::Close | ControlCommand::Legacy(_) | ControlCommand::Other(_) => {
                vec![OK.to_string()]
            }
        }
    }
}

/// `<tag><pid><payload>`; PIDs missing from `table` report zero
fn data_reply(tag: &str, table: &'static [PidEntry], pid: &str, store: &ValueStore) -> String {
    let payload = match lookup(table, pid) {
        Some(entry) => encode(entry.resolve(table, store), entry.width),
        None => encode(0, FALLBACK_WIDTH),
    };
    format!("{tag}{pid}{payload}")
}
