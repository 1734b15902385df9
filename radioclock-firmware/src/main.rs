//! Radioclock - Network-Synchronised Analog Radio Clock
//!
//! Firmware for a Raspberry Pi Pico W behind the dial of an old radio.
//! A 28BYJ-48 stepper on a ULN2003 board moves the hand, a MAX98357
//! amplifier plays an internet radio station.
//!
//! - Core 0 boots, joins Wi-Fi, syncs time, then runs the audio stream
//!   next to the Wi-Fi and network stack tasks.
//! - Core 1 runs the motion loop and nothing else.
//! - The minute tick runs on a high-priority interrupt executor and only
//!   ever adds to the shared position target.

#![no_std]
#![no_main]

use cyw43::aligned_bytes;
use cyw43_pio::{PioSpi, DEFAULT_CLOCK_DIVIDER};
use defmt::*;
use embassy_executor::{Executor, InterruptExecutor, Spawner};
use embassy_net::tcp::TcpSocket;
use embassy_net::{DhcpConfig, StackResources};
use embassy_rp::bind_interrupts;
use embassy_rp::gpio::{Level, Output};
use embassy_rp::interrupt;
use embassy_rp::interrupt::{InterruptExt, Priority};
use embassy_rp::multicore::{spawn_core1, Stack};
use embassy_rp::peripherals::{PIO0, PIO1};
use embassy_rp::pio::Pio;
use embassy_rp::pio_programs::i2s::{PioI2sOut, PioI2sOutProgram};
use embassy_time::{Duration, Instant, Timer};
use static_cell::StaticCell;
use {defmt_rtt as _, panic_probe as _};

use radioclock_core::config::ClockConfig;
use radioclock_core::motion::{MotionController, TimeBase};
use radioclock_core::runtime::{bootstrap, BootReport};
use radioclock_core::time::UnixTime;
use radioclock_drivers::amp::Max98357;
use radioclock_drivers::stepper::Uln2003;

use crate::network::{SntpClient, WifiProvisioner};
use crate::shared::{AUDIO_BEAT, MOTION_BEAT, POSITION_TARGET};
use crate::stream::RadioStream;

mod config;
mod network;
mod shared;
mod stream;
mod tasks;

bind_interrupts!(struct Irqs {
    PIO0_IRQ_0 => embassy_rp::pio::InterruptHandler<PIO0>;
    PIO1_IRQ_0 => embassy_rp::pio::InterruptHandler<PIO1>;
});

/// Interval between liveness reports
const LIVENESS_INTERVAL: Duration = Duration::from_secs(60);

// Core 1 runs a single small task
static mut CORE1_STACK: Stack<8192> = Stack::new();
static EXECUTOR1: StaticCell<Executor> = StaticCell::new();

// Preempts both thread-mode executors
static TIME_BASE_EXECUTOR: InterruptExecutor = InterruptExecutor::new();

#[interrupt]
unsafe fn SWI_IRQ_1() {
    TIME_BASE_EXECUTOR.on_interrupt()
}

// Static cells (must live forever for task references)
static CLOCK_CONFIG: StaticCell<ClockConfig> = StaticCell::new();
static CYW43_STATE: StaticCell<cyw43::State> = StaticCell::new();
static NET_RESOURCES: StaticCell<StackResources<5>> = StaticCell::new();
static TCP_RX_BUF: StaticCell<[u8; stream::RX_BUF_LEN]> = StaticCell::new();
static TCP_TX_BUF: StaticCell<[u8; stream::TX_BUF_LEN]> = StaticCell::new();
static RADIO_STREAM: StaticCell<RadioStream> = StaticCell::new();

/// Main entry point
#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("Radioclock firmware starting...");

    let p = embassy_rp::init(Default::default());
    let mut rng = embassy_rp::clocks::RoscRng;
    info!("Peripherals initialized");

    let config: &'static ClockConfig = CLOCK_CONFIG.init(config::load());
    config::log_summary(config);

    // Hand: ULN2003 IN1..IN4, energised at the power-up position
    let stepper = Uln2003::new(
        [
            Output::new(p.PIN_22, Level::Low),
            Output::new(p.PIN_21, Level::Low),
            Output::new(p.PIN_17, Level::Low),
            Output::new(p.PIN_16, Level::Low),
        ],
        POSITION_TARGET.load(),
    );
    let controller = MotionController::new(&POSITION_TARGET, stepper, config.motion.profile());

    // Wi-Fi: CYW43439 over PIO0 SPI
    let fw = aligned_bytes!("../cyw43-firmware/43439A0.bin");
    let clm = aligned_bytes!("../cyw43-firmware/43439A0_clm.bin");
    let nvram = aligned_bytes!("../cyw43-firmware/nvram_rp2040.bin");

    let pwr = Output::new(p.PIN_23, Level::Low);
    let cs = Output::new(p.PIN_25, Level::High);
    let mut pio0 = Pio::new(p.PIO0, Irqs);
    let spi = PioSpi::new(
        &mut pio0.common,
        pio0.sm0,
        DEFAULT_CLOCK_DIVIDER,
        pio0.irq0,
        cs,
        p.PIN_24,
        p.PIN_29,
        p.DMA_CH0,
    );

    let state = CYW43_STATE.init(cyw43::State::new());
    let (net_device, mut control, runner) = cyw43::new(state, pwr, spi, fw, nvram).await;
    spawner.spawn(unwrap!(tasks::cyw43_task(runner)));

    control.init(clm).await;
    control
        .set_power_management(cyw43::PowerManagementMode::PowerSave)
        .await;

    let mut dhcp = DhcpConfig::default();
    dhcp.hostname = config.device.hostname().as_str().try_into().ok();
    let (net_stack, net_runner) = embassy_net::new(
        net_device,
        embassy_net::Config::dhcpv4(dhcp),
        NET_RESOURCES.init(StackResources::new()),
        rng.next_u64(),
    );
    spawner.spawn(unwrap!(tasks::net_task(net_runner)));

    // Provisioning and time sync; failures are logged, never fatal
    let report = {
        let mut provisioner = WifiProvisioner::new(&mut control, net_stack, &config.network);
        let mut sntp = SntpClient::new(net_stack, config.time.ntp_server.as_str());
        bootstrap(&mut provisioner, &mut sntp).await
    };
    let synced = log_boot_report(&report, config);

    // Audio: MAX98357 on PIO1 I2S
    let mut pio1 = Pio::new(p.PIO1, Irqs);
    let i2s_program = PioI2sOutProgram::new(&mut pio1.common);
    let i2s = PioI2sOut::new(
        &mut pio1.common,
        pio1.sm0,
        p.DMA_CH1,
        p.PIN_26,
        p.PIN_27,
        p.PIN_28,
        stream::SAMPLE_RATE,
        stream::BIT_DEPTH,
        &i2s_program,
    );

    let socket = TcpSocket::new(
        net_stack,
        TCP_RX_BUF.init([0; stream::RX_BUF_LEN]),
        TCP_TX_BUF.init([0; stream::TX_BUF_LEN]),
    );
    let radio = RADIO_STREAM.init_with(|| {
        RadioStream::new(
            net_stack,
            socket,
            i2s,
            &config.audio,
            config.device.name.as_str(),
        )
    });

    // SD low keeps the amplifier in shutdown until the I2S clocks run
    let amp_sd = Output::new(p.PIN_14, Level::Low);
    Timer::after_millis(10).await;
    let amp = Max98357::new(amp_sd, Output::new(p.PIN_15, Level::Low), config.audio.gain);
    info!("Amplifier enabled, gain {:?}", amp.gain());

    // Arm the time base, then start both loops
    interrupt::SWI_IRQ_1.set_priority(Priority::P2);
    let time_base_spawner = TIME_BASE_EXECUTOR.start(interrupt::SWI_IRQ_1);
    let time_base = TimeBase::new(&POSITION_TARGET, config.motion.increment());
    let interval = Duration::from_secs(u64::from(config.motion.tick_interval_s));
    time_base_spawner.spawn(unwrap!(tasks::time_base_task(time_base, interval)));

    spawn_core1(
        p.CORE1,
        unsafe { &mut *core::ptr::addr_of_mut!(CORE1_STACK) },
        move || {
            let executor1 = EXECUTOR1.init(Executor::new());
            executor1.run(move |spawner| spawner.spawn(unwrap!(tasks::motion_task(controller))));
        },
    );

    spawner.spawn(unwrap!(tasks::audio_task(radio)));
    info!("Setup complete");

    // Liveness diagnostics only
    let mut last_motion = 0u32;
    let mut last_audio = 0u32;
    loop {
        Timer::after(LIVENESS_INTERVAL).await;

        let motion = MOTION_BEAT.count();
        let audio = AUDIO_BEAT.count();
        info!(
            "Alive: target {}, motion +{}, audio +{}",
            POSITION_TARGET.load(),
            motion.wrapping_sub(last_motion),
            audio.wrapping_sub(last_audio)
        );
        if motion == last_motion {
            warn!("Motion loop made no progress");
        }
        if audio == last_audio {
            warn!("Audio loop made no progress");
        }
        last_motion = motion;
        last_audio = audio;

        if let Some((time, at)) = synced {
            let now = UnixTime::from_secs(time.as_secs() + at.elapsed().as_secs());
            debug!("{}", now.to_datetime().to_line().as_str());
        }
    }
}

/// Log the bootstrap outcome; returns the local time and when it was taken
fn log_boot_report(report: &BootReport, config: &ClockConfig) -> Option<(UnixTime, Instant)> {
    match report.network {
        Ok(()) => info!("Network up"),
        Err(e) => warn!("Provisioning failed: {:?}", e),
    }

    match report.time {
        Ok(time) => {
            let local = time.offset(config.time.local_offset_s());
            info!("{}", local.to_datetime().to_line().as_str());
            Some((local, Instant::now()))
        }
        Err(e) => {
            warn!("Failed to obtain time: {:?}", e);
            None
        }
    }
}
