//! Links to the ISO7816 front-end co-processors

pub mod uart;

pub use uart::{FrontendLink, MAX_FRAME_LEN, TIMEOUT_FRAME};
