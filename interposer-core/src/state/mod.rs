//! Boot and reset phase machine
//!
//! Every boot walks a short, fixed path through these phases and ends in a
//! watchdog restart. The machine is explicit, finite and deterministic; the
//! reboot itself is just the `Restart -> Boot` edge.

pub mod events;
pub mod machine;

pub use events::Event;
pub use machine::Phase;
