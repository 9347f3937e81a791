//! Interrupt-priority tasks
//!
//! Both run on the high-priority executor so they preempt the relay loop
//! in thread mode.

pub mod card_presence;
pub mod terminal_reset;

pub use card_presence::card_presence_task;
pub use terminal_reset::terminal_reset_task;
