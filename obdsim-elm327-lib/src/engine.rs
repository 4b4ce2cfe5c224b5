//! The protocol engine: lexer, dispatcher and measurements behind one
//! byte-at-a-time interface.

use log::{debug, info};
use std::io::Write;

use crate::config::SimulatorConfig;
use crate::counter::{PulseCounter, Tachometer};
use crate::dispatcher::Dispatcher;
use crate::emitter::{EmitError, ReplyEmitter};
use crate::lexer::{LexEvent, LineLexer};
use crate::request::{ControlCommand, Request};
use crate::store::{AnalogInput, ValueStore};

pub struct Engine {
    lexer: LineLexer,
    dispatcher: Dispatcher,
    store: ValueStore,
    tachometer: Tachometer,
}

impl Engine {
    /// Build an engine counting pulses from `counter`
    #[must_use]
    pub fn new(config: &SimulatorConfig, counter: PulseCounter) -> Self {
        Self {
            lexer: LineLexer::new(config.max_line_len),
            dispatcher: Dispatcher::new(config.identity.clone()),
            store: ValueStore::new(config.placeholders, config.initial_engine_speed),
            tachometer: Tachometer::new(counter, config.pulse_threshold),
        }
    }

    /// Forget a request left unfinished by a previous session
    pub fn clear_pending(&mut self) {
        let pending = self.lexer.pending();
        if pending > 0 {
            debug!("Discarding {pending} pending request characters");
        }
        self.lexer.reset();
    }

    /// Once-per-cycle measurement update
    pub fn refresh(&mut self, analog: &mut dyn AnalogInput, now_us: u64) {
        self.store.refresh(&mut self.tachometer, analog, now_us);
    }

    /// Consume one inbound byte. Returns `true` if it completed a request
    /// that was answered.
    pub fn feed<W: Write>(
        &mut self,
        byte: u8,
        emitter: &mut ReplyEmitter<W>,
    ) -> Result<bool, EmitError> {
        match self.lexer.push(byte) {
            None => Ok(false),
            Some(LexEvent::Line(line)) => {
                self.handle_line(&line, emitter)?;
                Ok(true)
            }
            Some(LexEvent::Overflowed) => {
                self.dispatcher
                    .handle(&Request::Unrecognized, &self.store, emitter)?;
                Ok(true)
            }
        }
    }

    /// Dispatch a normalized request line
    pub fn handle_line<W: Write>(
        &mut self,
        line: &str,
        emitter: &mut ReplyEmitter<W>,
    ) -> Result<(), EmitError> {
        debug!("RX: {line}");
        let request = Request::parse(line);
        if request == Request::Control(ControlCommand::Reset) {
            info!("Reset requested");
            self.tachometer.reset();
            self.store.reset_engine_speed();
        }
        self.dispatcher.handle(&request, &self.store, emitter)
    }
}
