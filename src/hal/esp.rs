//! ESP-IDF backing for the capability traits.
//!
//! # Architecture
//!
//! ```text
//! gptimer TX alarm ──▶ on_tx_alarm ──▶ TxFramer::on_timer_tick ──▶ gpio_set_level(TX)
//! gptimer RX alarm ──▶ on_rx_alarm ──▶ RxFramer::on_timer_tick ◀── gpio_get_level(RX)
//! GPIO negedge(RX) ──▶ on_rx_edge  ──▶ RxFramer::on_falling_edge
//! ```
//!
//! # Rules
//!
//! - Callback contexts are `'static` and registered once at boot
//! - Callbacks touch pins, timers and rings only: no logging, no locks
//! - Driver errors inside callbacks are ignored (the trait paths are infallible)

use core::ffi::c_void;
use core::sync::atomic::{AtomicPtr, AtomicU32, Ordering};

use esp_idf_svc::sys::{self, esp, gpio_num_t, gptimer_handle_t, gptimer_t};

use super::{
    EdgeTrigger, HalError, InputLine, OutputLine, PeriodicTimer, RxPinConfig, TimerConfig,
    TxPinConfig,
};
use crate::ring::WordRing;
use crate::rx::RxFramer;
use crate::tx::TxFramer;

// ============================================================================
// GPIO
// ============================================================================

/// Push-pull output driving the TX line.
pub struct EspOutputPin {
    pin: gpio_num_t,
}

impl EspOutputPin {
    pub const fn new(cfg: TxPinConfig) -> Self {
        Self { pin: cfg.pin }
    }

    /// Configure the pad as an output and drive it to the idle (high) level.
    pub fn configure(&self) -> Result<(), HalError> {
        let conf = sys::gpio_config_t {
            pin_bit_mask: 1u64 << self.pin,
            mode: sys::gpio_mode_t_GPIO_MODE_OUTPUT,
            pull_up_en: sys::gpio_pullup_t_GPIO_PULLUP_DISABLE,
            pull_down_en: sys::gpio_pulldown_t_GPIO_PULLDOWN_DISABLE,
            intr_type: sys::gpio_int_type_t_GPIO_INTR_DISABLE,
            ..Default::default()
        };
        // SAFETY: conf lives across the call; the pin number comes from board config.
        unsafe {
            esp!(sys::gpio_config(&conf))?;
            esp!(sys::gpio_set_level(self.pin, 1))?;
        }
        Ok(())
    }
}

impl OutputLine for EspOutputPin {
    #[inline]
    fn set_high(&self) {
        // SAFETY: Plain register write on a configured output pad.
        unsafe {
            sys::gpio_set_level(self.pin, 1);
        }
    }

    #[inline]
    fn set_low(&self) {
        // SAFETY: Plain register write on a configured output pad.
        unsafe {
            sys::gpio_set_level(self.pin, 0);
        }
    }
}

/// Input reading the RX line, with its falling-edge interrupt.
pub struct EspInputPin {
    pin: gpio_num_t,
    pull_down: bool,
}

impl EspInputPin {
    pub const fn new(cfg: RxPinConfig) -> Self {
        Self {
            pin: cfg.pin,
            pull_down: cfg.pull_down,
        }
    }

    /// Configure the pad as a negative-edge interrupt input and hook `on_edge`.
    ///
    /// The interrupt stays disabled until [`EdgeTrigger::arm`].
    pub fn configure(
        &self,
        on_edge: unsafe extern "C" fn(*mut c_void),
        ctx: *mut c_void,
    ) -> Result<(), HalError> {
        let conf = sys::gpio_config_t {
            pin_bit_mask: 1u64 << self.pin,
            mode: sys::gpio_mode_t_GPIO_MODE_INPUT,
            pull_up_en: sys::gpio_pullup_t_GPIO_PULLUP_DISABLE,
            pull_down_en: if self.pull_down {
                sys::gpio_pulldown_t_GPIO_PULLDOWN_ENABLE
            } else {
                sys::gpio_pulldown_t_GPIO_PULLDOWN_DISABLE
            },
            intr_type: sys::gpio_int_type_t_GPIO_INTR_NEGEDGE,
            ..Default::default()
        };
        // SAFETY: conf lives across the call; ctx is a 'static callback context.
        unsafe {
            esp!(sys::gpio_config(&conf))?;
            esp!(sys::gpio_intr_disable(self.pin))?;
            let err = sys::gpio_install_isr_service(0);
            // Already installed by another driver is fine.
            if err != sys::ESP_ERR_INVALID_STATE {
                esp!(err)?;
            }
            esp!(sys::gpio_isr_handler_add(self.pin, Some(on_edge), ctx))?;
        }
        Ok(())
    }
}

impl InputLine for EspInputPin {
    #[inline]
    fn is_high(&self) -> bool {
        // SAFETY: Plain register read on a configured input pad.
        unsafe { sys::gpio_get_level(self.pin) != 0 }
    }
}

impl EdgeTrigger for EspInputPin {
    #[inline]
    fn arm(&self) {
        // SAFETY: ISR-safe interrupt enable on a configured pad.
        unsafe {
            sys::gpio_intr_enable(self.pin);
        }
    }

    #[inline]
    fn disarm(&self) {
        // SAFETY: ISR-safe interrupt disable on a configured pad.
        unsafe {
            sys::gpio_intr_disable(self.pin);
        }
    }
}

// ============================================================================
// GPTIMER
// ============================================================================

/// Alarm callback signature expected by the gptimer driver.
pub type AlarmCallback = unsafe extern "C" fn(
    gptimer_handle_t,
    *const sys::gptimer_alarm_event_data_t,
    *mut c_void,
) -> bool;

/// Auto-reloading gptimer used as a bit clock.
///
/// Created empty in a `static`; [`EspTimer::install`] allocates the driver handle.
pub struct EspTimer {
    handle: AtomicPtr<gptimer_t>,
    resolution_hz: AtomicU32,
}

impl EspTimer {
    pub const fn new() -> Self {
        Self {
            handle: AtomicPtr::new(core::ptr::null_mut()),
            resolution_hz: AtomicU32::new(0),
        }
    }

    /// Allocate the timer, register `on_alarm` with `ctx` and enable it (not started).
    pub fn install(
        &self,
        cfg: &TimerConfig,
        on_alarm: AlarmCallback,
        ctx: *mut c_void,
    ) -> Result<(), HalError> {
        if !self.handle.load(Ordering::Acquire).is_null() {
            return Err(HalError::AlreadyInstalled);
        }

        let timer_conf = sys::gptimer_config_t {
            clk_src: sys::soc_periph_gptimer_clk_src_t_GPTIMER_CLK_SRC_DEFAULT,
            direction: sys::gptimer_count_direction_t_GPTIMER_COUNT_UP,
            resolution_hz: cfg.resolution_hz,
            intr_priority: cfg.intr_priority,
            ..Default::default()
        };
        let callbacks = sys::gptimer_event_callbacks_t {
            on_alarm: Some(on_alarm),
        };

        let mut handle: gptimer_handle_t = core::ptr::null_mut();
        // SAFETY: Out-pointer and configs outlive the calls; ctx is 'static.
        unsafe {
            esp!(sys::gptimer_new_timer(&timer_conf, &mut handle))?;
            esp!(sys::gptimer_register_event_callbacks(handle, &callbacks, ctx))?;
            esp!(sys::gptimer_enable(handle))?;
        }

        self.resolution_hz.store(cfg.resolution_hz, Ordering::Relaxed);
        self.handle.store(handle, Ordering::Release);
        Ok(())
    }

    #[inline]
    fn ticks_for(&self, period_us: u32) -> u64 {
        u64::from(period_us) * u64::from(self.resolution_hz.load(Ordering::Relaxed)) / 1_000_000
    }
}

impl Default for EspTimer {
    fn default() -> Self {
        Self::new()
    }
}

impl PeriodicTimer for EspTimer {
    fn start(&self, period_us: u32) {
        let handle = self.handle.load(Ordering::Acquire);
        if handle.is_null() {
            return;
        }
        let mut alarm = sys::gptimer_alarm_config_t {
            alarm_count: self.ticks_for(period_us),
            reload_count: 0,
            ..Default::default()
        };
        alarm.flags.set_auto_reload_on_alarm(1);

        // SAFETY: Handle was created by install(); these calls are ISR-safe.
        unsafe {
            sys::gptimer_set_raw_count(handle, 0);
            sys::gptimer_set_alarm_action(handle, &alarm);
            sys::gptimer_start(handle);
        }
    }

    fn stop(&self) {
        let handle = self.handle.load(Ordering::Acquire);
        if handle.is_null() {
            return;
        }
        // SAFETY: Handle was created by install(); ISR-safe.
        unsafe {
            sys::gptimer_stop(handle);
        }
    }
}

// ============================================================================
// INTERRUPT CONTEXTS
// ============================================================================

/// Everything the TX alarm callback touches.
pub struct TxIsr {
    pub framer: &'static TxFramer,
    pub pin: &'static EspOutputPin,
    pub timer: &'static EspTimer,
}

impl TxIsr {
    /// Set up the TX pin and timer and bind them to this context.
    pub fn install(&'static self, cfg: &TimerConfig) -> Result<(), HalError> {
        self.pin.configure()?;
        self.timer
            .install(cfg, on_tx_alarm, self as *const Self as *mut c_void)
    }
}

/// Everything the RX edge and alarm callbacks touch.
pub struct RxIsr<const N: usize> {
    pub framer: &'static RxFramer,
    pub pin: &'static EspInputPin,
    pub timer: &'static EspTimer,
    pub ring: &'static WordRing<N>,
    pub period_us: u32,
}

impl<const N: usize> RxIsr<N> {
    /// Set up the RX pin, edge interrupt and timer and bind them to this context.
    pub fn install(&'static self, cfg: &TimerConfig) -> Result<(), HalError> {
        let ctx = self as *const Self as *mut c_void;
        self.timer.install(cfg, on_rx_alarm::<N>, ctx)?;
        self.pin.configure(on_rx_edge::<N>, ctx)
    }
}

unsafe extern "C" fn on_tx_alarm(
    _timer: gptimer_handle_t,
    _edata: *const sys::gptimer_alarm_event_data_t,
    ctx: *mut c_void,
) -> bool {
    // SAFETY: ctx is the &'static TxIsr registered in TxIsr::install.
    let isr = unsafe { &*(ctx as *const TxIsr) };
    isr.framer.on_timer_tick(isr.pin, isr.timer);
    false
}

unsafe extern "C" fn on_rx_alarm<const N: usize>(
    _timer: gptimer_handle_t,
    _edata: *const sys::gptimer_alarm_event_data_t,
    ctx: *mut c_void,
) -> bool {
    // SAFETY: ctx is the &'static RxIsr<N> registered in RxIsr::install.
    let isr = unsafe { &*(ctx as *const RxIsr<N>) };
    isr.framer
        .on_timer_tick(isr.pin, isr.timer, isr.pin, isr.ring);
    false
}

unsafe extern "C" fn on_rx_edge<const N: usize>(ctx: *mut c_void) {
    // SAFETY: ctx is the &'static RxIsr<N> registered in RxIsr::install.
    let isr = unsafe { &*(ctx as *const RxIsr<N>) };
    isr.framer.on_falling_edge(isr.timer, isr.pin, isr.period_us);
}

// ============================================================================
// UART0 CONSOLE
// ============================================================================

const CONSOLE_UART: sys::uart_port_t = 0;
const CONSOLE_RX_BUFFER: i32 = 256;

/// Blocking byte I/O on the USB/serial console UART.
pub struct UartConsole;

impl UartConsole {
    /// Install the UART0 driver (default pins and baud rate as set by the bootloader).
    pub fn install() -> Result<Self, HalError> {
        // SAFETY: No queue requested; driver owns its buffers.
        unsafe {
            esp!(sys::uart_driver_install(
                CONSOLE_UART,
                CONSOLE_RX_BUFFER,
                0,
                0,
                core::ptr::null_mut(),
                0,
            ))?;
        }
        Ok(Self)
    }

    /// Read one byte, waiting at most `timeout_ticks`.
    pub fn read_byte(&mut self, timeout_ticks: u32) -> Option<u8> {
        let mut byte = 0u8;
        // SAFETY: One-byte buffer outlives the call.
        let n = unsafe {
            sys::uart_read_bytes(
                CONSOLE_UART,
                &mut byte as *mut u8 as *mut c_void,
                1,
                timeout_ticks,
            )
        };
        (n == 1).then_some(byte)
    }
}

impl core::fmt::Write for UartConsole {
    fn write_str(&mut self, s: &str) -> core::fmt::Result {
        // SAFETY: Slice outlives the call; the driver copies into its TX FIFO.
        let n = unsafe {
            sys::uart_write_bytes(CONSOLE_UART, s.as_ptr() as *const c_void, s.len())
        };
        if n < 0 {
            Err(core::fmt::Error)
        } else {
            Ok(())
        }
    }
}

/// Microseconds since boot.
#[inline]
pub fn now_us() -> i64 {
    // SAFETY: Reads a free-running hardware counter.
    unsafe { sys::esp_timer_get_time() }
}
