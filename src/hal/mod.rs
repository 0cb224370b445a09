//! Hardware Abstraction Layer for the link.
//!
//! The framers only see the capability traits below. `esp` backs them with ESP-IDF
//! peripherals; `sim` backs them with host doubles for tests and the loopback bench.
//! Business logic stays in core modules, HAL is just I/O.

pub mod gpio;
pub mod sim;
pub mod timer;

#[cfg(target_os = "espidf")]
pub mod esp;

pub use gpio::{EdgeTrigger, InputLine, OutputLine, RxPinConfig, TxPinConfig};
pub use timer::{PeriodicTimer, TimerConfig};

/// Peripheral setup failure.
#[derive(Debug)]
pub enum HalError {
    /// Driver call failed during setup.
    #[cfg(target_os = "espidf")]
    Esp(esp_idf_svc::sys::EspError),
    /// Peripheral was already set up.
    AlreadyInstalled,
}

impl core::fmt::Display for HalError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            #[cfg(target_os = "espidf")]
            HalError::Esp(e) => write!(f, "ESP error: {:?}", e),
            HalError::AlreadyInstalled => write!(f, "peripheral already installed"),
        }
    }
}

#[cfg(target_os = "espidf")]
impl From<esp_idf_svc::sys::EspError> for HalError {
    fn from(e: esp_idf_svc::sys::EspError) -> Self {
        HalError::Esp(e)
    }
}
