//! Card power drivers

pub mod gpio;

pub use gpio::GpioCardPower;
