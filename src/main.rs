//! VlcLink firmware entry point
//!
//! On target:
//! 1. Initialize logger, NVS and the link peripherals
//! 2. Spawn the TX coordinator on core 0 and the RX coordinator on core 1
//! 3. Spawn the serial console (and the log drain) on core 0
//!
//! On the host the binary runs the loopback bench once and prints what came out.

#![cfg_attr(target_os = "espidf", no_std)]
#![cfg_attr(target_os = "espidf", no_main)]

#[cfg(target_os = "espidf")]
mod firmware {
    use core::ffi::c_void;

    use esp_idf_svc::hal::delay::FreeRtos;
    use esp_idf_svc::log::EspLogger;
    use esp_idf_svc::nvs::EspDefaultNvsPartition;
    use esp_idf_svc::sys as esp_idf_sys;

    use rust_secure_vlc_link::config::nvs::ParamStore;
    use rust_secure_vlc_link::config::{
        self, BIT_PERIOD_US, POLL_INTERVAL_MS, RING_CAPACITY, RX_GPIO_PIN, TASK_STACK_BYTES,
        TX_GPIO_PIN,
    };
    use rust_secure_vlc_link::console::{Console, Shell};
    use rust_secure_vlc_link::hal::esp::{
        now_us, EspInputPin, EspOutputPin, EspTimer, RxIsr, TxIsr, UartConsole,
    };
    use rust_secure_vlc_link::hal::{RxPinConfig, TimerConfig, TxPinConfig};
    use rust_secure_vlc_link::log_drain::LogDrain;
    use rust_secure_vlc_link::tx::TxPoll;
    use rust_secure_vlc_link::{
        rt_debug, rt_info, rt_trace, rx, ContextSlot, LinkRing, RxCoordinator, RxFramer,
        TxCoordinator, TxFramer, RX_LOG_STREAM, TX_LOG_STREAM,
    };

    // Static allocations: everything an interrupt callback touches lives here.
    static TX_RING: LinkRing = LinkRing::new();
    static RX_RING: LinkRing = LinkRing::new();
    static TX_FRAMER: TxFramer = TxFramer::new();
    static RX_FRAMER: RxFramer = RxFramer::new();
    static RX_SLOT: ContextSlot = ContextSlot::new();

    static TX_PIN: EspOutputPin = EspOutputPin::new(TxPinConfig { pin: TX_GPIO_PIN });
    static RX_PIN: EspInputPin = EspInputPin::new(RxPinConfig {
        pin: RX_GPIO_PIN,
        pull_down: true,
    });
    static TX_TIMER: EspTimer = EspTimer::new();
    static RX_TIMER: EspTimer = EspTimer::new();

    static TX_ISR: TxIsr = TxIsr {
        framer: &TX_FRAMER,
        pin: &TX_PIN,
        timer: &TX_TIMER,
    };
    static RX_ISR: RxIsr<RING_CAPACITY> = RxIsr {
        framer: &RX_FRAMER,
        pin: &RX_PIN,
        timer: &RX_TIMER,
        ring: &RX_RING,
        period_us: BIT_PERIOD_US,
    };

    const TASK_PRIORITY: u32 = 5;
    const CONSOLE_READ_TIMEOUT_MS: u32 = 20;

    #[no_mangle]
    fn main() {
        esp_idf_sys::link_patches();
        EspLogger::initialize_default();
        log::info!(
            "{} starting, link {} Hz",
            env!("VERSION_STRING"),
            config::link_frequency_hz()
        );

        let timer_cfg = TimerConfig::default();
        if let Err(e) = TX_ISR.install(&timer_cfg) {
            log::error!("TX setup failed: {}", e);
            return;
        }
        if let Err(e) = RX_ISR.install(&timer_cfg) {
            log::error!("RX setup failed: {}", e);
            return;
        }

        spawn(tx_task, c"vlc_tx", config::TX_CORE);
        spawn(rx_task, c"vlc_rx", config::RX_CORE);
        spawn(console_task, c"vlc_console", config::CONSOLE_CORE);
    }

    fn spawn(task: unsafe extern "C" fn(*mut c_void), name: &'static core::ffi::CStr, core: i32) {
        // SAFETY: Task entry points never return and take no parameter.
        let created = unsafe {
            esp_idf_sys::xTaskCreatePinnedToCore(
                Some(task),
                name.as_ptr(),
                TASK_STACK_BYTES,
                core::ptr::null_mut(),
                TASK_PRIORITY,
                core::ptr::null_mut(),
                core,
            )
        };
        if created != 1 {
            log::error!("failed to spawn {:?}", name);
        }
    }

    /// TX coordinator task (core 0).
    unsafe extern "C" fn tx_task(_arg: *mut c_void) {
        let mut coordinator =
            TxCoordinator::new(&TX_FRAMER, &TX_RING, &TX_PIN, &TX_TIMER, BIT_PERIOD_US);
        coordinator.idle_line();
        rt_info!(TX_LOG_STREAM, now_us(), "TX coordinator up");

        loop {
            match coordinator.poll() {
                TxPoll::Settling => {
                    rt_trace!(TX_LOG_STREAM, now_us(), "settling, {} queued", coordinator.pending())
                }
                TxPoll::Armed(word) => rt_trace!(TX_LOG_STREAM, now_us(), "tx {:08X}", word),
                TxPoll::Idle | TxPoll::Busy => {}
            }
            FreeRtos::delay_ms(POLL_INTERVAL_MS);
        }
    }

    /// RX coordinator task (core 1).
    unsafe extern "C" fn rx_task(_arg: *mut c_void) {
        let mut coordinator = RxCoordinator::new(&RX_RING, &RX_FRAMER);
        let mut listening = false;

        loop {
            if coordinator.take_from(&RX_SLOT) {
                rt_info!(RX_LOG_STREAM, now_us(), "RX context installed");
                if !listening {
                    coordinator.start_listening(&RX_PIN);
                    listening = true;
                }
            }

            if coordinator.framer().take_word_complete() || coordinator.pending() > 0 {
                let bytes = coordinator.drain_received();
                if !bytes.is_empty() {
                    rt_debug!(RX_LOG_STREAM, now_us(), "{} bytes decrypted", bytes.len());
                    rx::log_received(&RX_LOG_STREAM, now_us(), &bytes);
                }
            }
            FreeRtos::delay_ms(POLL_INTERVAL_MS);
        }
    }

    /// Console and log drain (core 0).
    unsafe extern "C" fn console_task(_arg: *mut c_void) {
        run_console()
    }

    fn run_console() -> ! {
        let store = EspDefaultNvsPartition::take()
            .map_err(|e| log::error!("NVS partition unavailable: {:?}", e))
            .ok()
            .and_then(|partition| {
                ParamStore::open(partition)
                    .map_err(|e| log::error!("NVS open failed: {}", e))
                    .ok()
            });

        let mut shell = Shell::new(&TX_RING, &TX_FRAMER, &RX_RING, &RX_FRAMER, &RX_SLOT);
        if let Some(store) = store {
            log::info!("NVS: {:?}", store.status());
            shell = shell.with_store(store);
            let restored = shell.restore();
            if restored > 0 {
                log::info!("restored {} direction(s) from NVS", restored);
            }
        }

        let streams = [("TX", &TX_LOG_STREAM), ("RX", &RX_LOG_STREAM)];
        let mut drain = LogDrain::new(&streams);

        let mut uart = match UartConsole::install() {
            Ok(uart) => uart,
            Err(e) => {
                log::error!("console UART unavailable: {}", e);
                loop {
                    drain.poll(now_us());
                    FreeRtos::delay_ms(POLL_INTERVAL_MS);
                }
            }
        };

        let timeout_ticks = CONSOLE_READ_TIMEOUT_MS * esp_idf_sys::configTICK_RATE_HZ / 1000;
        let mut console = Console::new();
        console.print_banner(&mut uart);

        loop {
            if let Some(byte) = uart.read_byte(timeout_ticks) {
                console.process_byte(byte, &mut shell, &mut uart);
            }
            drain.poll(now_us());
        }
    }
}

#[cfg(not(target_os = "espidf"))]
fn main() {
    use rust_secure_vlc_link::config::{MapSeed, BIT_PERIOD_US};
    use rust_secure_vlc_link::log_drain::format_log_entry;
    use rust_secure_vlc_link::{
        rx, EncryptionContext, EncryptionParams, Loopback, MapVariant, RX_LOG_STREAM,
    };

    let params = EncryptionParams::new(
        MapVariant::Duffing,
        MapSeed::new(0.1, 0.2, 1000),
        MapSeed::new(0.3, 0.4, 1000),
    );
    let params = match params.validate() {
        Ok(p) => p,
        Err(e) => {
            eprintln!("bad demo params: {}", e);
            return;
        }
    };

    let bench = Loopback::new(BIT_PERIOD_US);
    let mut rx_coordinator = bench.rx_coordinator();
    rx_coordinator.install(EncryptionContext::from_params(&params));
    let mut tx_ctx = EncryptionContext::from_params(&params);

    let message = b"Hello World!";
    let received = bench.transfer(&mut tx_ctx, &mut rx_coordinator, message);

    rx::log_received(&RX_LOG_STREAM, 0, &received);
    while let Some(entry) = RX_LOG_STREAM.drain() {
        let mut line = String::new();
        let _ = format_log_entry(&entry, &mut line);
        println!("{}", line);
    }
    println!(
        "sent {} words, received {}, round trip {}",
        bench.tx_framer.words_sent(),
        bench.rx_framer.words_received(),
        if received.as_slice() == message { "ok" } else { "FAILED" }
    );
}
