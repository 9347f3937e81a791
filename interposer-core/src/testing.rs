//! Test doubles for the hardware seams

use std::cell::Cell;
use std::collections::VecDeque;

use interposer_hal::{CardPower, InputPin, OutputPin, Watchdog};

use crate::link::{CardLink, LinkError, TerminalLink};
use crate::log::{AppendError, LogSink};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatchdogOp {
    Arm(u32),
    Disarm,
}

/// Watchdog that records every call
#[derive(Debug, Default)]
pub struct MockWatchdog {
    pub ops: Vec<WatchdogOp>,
}

impl MockWatchdog {
    /// Timeout of the countdown currently running, if any
    pub fn armed(&self) -> Option<u32> {
        match self.ops.last() {
            Some(WatchdogOp::Arm(timeout)) => Some(*timeout),
            _ => None,
        }
    }
}

impl Watchdog for MockWatchdog {
    fn arm(&mut self, timeout_ms: u32) {
        self.ops.push(WatchdogOp::Arm(timeout_ms));
    }

    fn disarm(&mut self) {
        self.ops.push(WatchdogOp::Disarm);
    }
}

#[derive(Debug, Default)]
pub struct MockPin {
    high: bool,
}

impl OutputPin for MockPin {
    fn set_high(&mut self) {
        self.high = true;
    }

    fn set_low(&mut self) {
        self.high = false;
    }

    fn is_set_high(&self) -> bool {
        self.high
    }
}

#[derive(Debug, Default)]
pub struct MockCard {
    powered: bool,
    pub deactivations: usize,
}

impl MockCard {
    pub fn powered() -> Self {
        Self {
            powered: true,
            deactivations: 0,
        }
    }
}

impl CardPower for MockCard {
    fn deactivate(&mut self) {
        self.powered = false;
        self.deactivations += 1;
    }

    fn is_powered(&self) -> bool {
        self.powered
    }
}

/// Input that flips level every `period` reads
#[derive(Debug)]
pub struct TogglingInput {
    period: Option<usize>,
    level: bool,
    reads: Cell<usize>,
}

impl TogglingInput {
    pub fn new(period: usize) -> Self {
        Self {
            period: Some(period),
            level: false,
            reads: Cell::new(0),
        }
    }

    pub fn stuck(level: bool) -> Self {
        Self {
            period: None,
            level,
            reads: Cell::new(0),
        }
    }
}

impl InputPin for TogglingInput {
    fn is_high(&self) -> bool {
        let reads = self.reads.get();
        self.reads.set(reads + 1);
        match self.period {
            Some(period) => (reads / period) % 2 == 1,
            None => self.level,
        }
    }
}

/// Log sink that keeps everything in a `Vec`
#[derive(Debug, Default)]
pub struct RecordingSink {
    pub records: Vec<(Vec<u8>, Vec<u8>)>,
    pub transactions: usize,
    capacity: Option<usize>,
}

impl RecordingSink {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            capacity: Some(capacity),
            ..Self::default()
        }
    }
}

impl LogSink for RecordingSink {
    fn record(&mut self, command: &[u8], response: &[u8]) -> Result<(), AppendError> {
        if self.capacity.is_some_and(|capacity| self.records.len() >= capacity) {
            return Err(AppendError::Full);
        }
        self.records.push((command.to_vec(), response.to_vec()));
        Ok(())
    }

    fn transaction_started(&mut self) {
        self.transactions += 1;
    }
}

/// Terminal that sends a fixed list of commands, then times out
#[derive(Debug, Default)]
pub struct ScriptedTerminal {
    commands: VecDeque<Vec<u8>>,
    pub responses: Vec<Vec<u8>>,
}

impl ScriptedTerminal {
    pub fn new(commands: &[&[u8]]) -> Self {
        Self {
            commands: commands.iter().map(|c| c.to_vec()).collect(),
            responses: Vec::new(),
        }
    }
}

impl TerminalLink for ScriptedTerminal {
    fn receive_command(&mut self, buf: &mut [u8]) -> Result<usize, LinkError> {
        let command = self.commands.pop_front().ok_or(LinkError::Timeout)?;
        if command.len() > buf.len() {
            return Err(LinkError::Overflow);
        }
        buf[..command.len()].copy_from_slice(&command);
        Ok(command.len())
    }

    fn send_response(&mut self, response: &[u8]) -> Result<(), LinkError> {
        self.responses.push(response.to_vec());
        Ok(())
    }
}

/// Card that answers with a fixed list of responses, then fails
#[derive(Debug, Default)]
pub struct ScriptedCard {
    responses: VecDeque<Vec<u8>>,
    pub commands: Vec<Vec<u8>>,
}

impl ScriptedCard {
    pub fn new(responses: &[&[u8]]) -> Self {
        Self {
            responses: responses.iter().map(|r| r.to_vec()).collect(),
            commands: Vec::new(),
        }
    }
}

impl CardLink for ScriptedCard {
    fn exchange(&mut self, command: &[u8], response: &mut [u8]) -> Result<usize, LinkError> {
        let answer = self.responses.pop_front().ok_or(LinkError::Io)?;
        self.commands.push(command.to_vec());
        if answer.len() > response.len() {
            return Err(LinkError::Overflow);
        }
        response[..answer.len()].copy_from_slice(&answer);
        Ok(answer.len())
    }
}
