//! Forwarding application
//!
//! Relays every command from the terminal to the card and the card's
//! response back, optionally logging each exchange.

use crate::link::{CardLink, LinkError, TerminalLink};
use crate::log::{LogSink, MAX_COMMAND_LEN, MAX_RESPONSE_LEN};

/// Transparent terminal/card relay
#[derive(Debug)]
pub struct ForwardApp {
    logging: bool,
    session_counted: bool,
    command: [u8; MAX_COMMAND_LEN],
    response: [u8; MAX_RESPONSE_LEN],
}

impl ForwardApp {
    /// Create a relay; with `logging` off nothing reaches the log
    pub const fn new(logging: bool) -> Self {
        Self {
            logging,
            session_counted: false,
            command: [0; MAX_COMMAND_LEN],
            response: [0; MAX_RESPONSE_LEN],
        }
    }

    /// Relay one command/response exchange
    ///
    /// The first command of the session counts one transaction. A full log
    /// does not stop the relay; the exchange is just not recorded.
    pub fn step(
        &mut self,
        terminal: &mut impl TerminalLink,
        card: &mut impl CardLink,
        sink: &mut impl LogSink,
    ) -> Result<(), LinkError> {
        let command_len = terminal.receive_command(&mut self.command)?;
        if !self.session_counted {
            sink.transaction_started();
            self.session_counted = true;
        }

        let command = &self.command[..command_len];
        let response_len = card.exchange(command, &mut self.response)?;
        let response = &self.response[..response_len];
        terminal.send_response(response)?;

        if self.logging {
            // Capacity exhaustion is silent
            let _ = sink.record(command, response);
        }
        Ok(())
    }

    /// Relay until a link fails
    ///
    /// On the device this only returns when a front-end gives up; the
    /// caller then idles until the terminal reset handler restarts it.
    pub fn run(
        &mut self,
        terminal: &mut impl TerminalLink,
        card: &mut impl CardLink,
        sink: &mut impl LogSink,
    ) -> LinkError {
        loop {
            if let Err(error) = self.step(terminal, card, sink) {
                return error;
            }
        }
    }
}
