#![no_std]
#![no_main]

use defmt::*;

use embassy_executor::{InterruptExecutor, Spawner};
use embassy_time::{Delay, Duration, Instant, Ticker};
use embassy_rp::bind_interrupts;
use embassy_rp::gpio::{Input, Level, Output, Pull};
use embassy_rp::i2c::{self, I2c, InterruptHandler};
use embassy_rp::interrupt;
use embassy_rp::interrupt::{InterruptExt, Priority};
use embassy_rp::peripherals::I2C0;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::signal::Signal;

use display_interface::DisplayError;
use display_interface_i2c::I2CInterface;

use embedded_graphics::mono_font::ascii::FONT_8X13;

use {defmt_rtt as _, panic_probe as _};

use pulse_rate_rs::buzzer::Clicker;
use pulse_rate_rs::clock::TickClock;
use pulse_rate_rs::report::Snapshot;
use pulse_rate_rs::ssd1308::Ssd1308;
use pulse_rate_rs::writer::Writer;
use pulse_rate_rs::{
    EventCounter, PulseRateSampler, CONSOLE_EVERY_SECONDS, OLED_DATA_BYTE, OLED_I2C_ADDRESS,
    TICK_MS,
};

type Display = Ssd1308<I2CInterface<I2c<'static, I2C0, i2c::Async>>>;

bind_interrupts!(struct Irqs {
    I2C0_IRQ => InterruptHandler<I2C0>;
});

// Runs the edge task above every thread-mode task, like the IRQ callback it stands in for.
static EXECUTOR_EDGES: InterruptExecutor = InterruptExecutor::new();

#[interrupt]
unsafe fn SWI_IRQ_1() {
    EXECUTOR_EDGES.on_interrupt()
}

static PULSES: EventCounter = EventCounter::new();
static CLICK: Signal<CriticalSectionRawMutex, ()> = Signal::new();
static SNAPSHOT: Signal<CriticalSectionRawMutex, Snapshot> = Signal::new();

/// BG51 pulse output. Rising edges wake this task through the GPIO interrupt;
/// it preempts the report and click tasks, so it re-arms within microseconds.
#[embassy_executor::task]
async fn pulse_input(mut signal: Input<'static>) {
    loop {
        signal.wait_for_rising_edge().await;
        PULSES.on_event();
        CLICK.signal(());
    }
}

#[embassy_executor::task]
async fn click(mut buzzer: Clicker<Output<'static>>) {
    let mut delay = Delay;
    loop {
        CLICK.wait().await;
        buzzer.click(&mut delay).await;
    }
}

/// Alternates between the console line and an OLED refresh, one per second.
#[embassy_executor::task]
async fn report(mut display: Display) {
    let mut writer = Writer::new(&FONT_8X13);
    writer.set_clip(true, true);

    loop {
        let snapshot = SNAPSHOT.wait().await;
        let second = snapshot.uptime_ms / TICK_MS;
        if second % u64::from(CONSOLE_EVERY_SECONDS) == 0 {
            info!("{}", Display2Format(&snapshot));
        } else if let Err(e) = redraw(&mut display, &mut writer, &snapshot).await {
            error!("display error: {:?}", Debug2Format(&e));
        }
    }
}

async fn redraw(
    display: &mut Display,
    writer: &mut Writer<'_>,
    snapshot: &Snapshot,
) -> Result<(), DisplayError> {
    let [uptime, rate, dose] = snapshot.display_lines();
    display.clear();
    for (row, line) in [(0, uptime), (22, rate), (42, dose)] {
        writer.set_textpos(row, 4);
        writer.print_str(display, &line)?;
    }
    display.show().await
}

#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("Program start");
    let peripherals = embassy_rp::init(Default::default());
    let mut delay = Delay;

    // BG51 radiation sensor and buzzer pins
    let bg51 = Input::new(peripherals.PIN_17, Pull::None);
    let buzzer = Output::new(peripherals.PIN_11, Level::Low);

    // Grove OLED on I2C0
    let sda = peripherals.PIN_4;
    let scl = peripherals.PIN_5;
    let mut i2c_config = i2c::Config::default();
    i2c_config.frequency = 100_000;
    let i2c = I2c::new_async(peripherals.I2C0, scl, sda, Irqs, i2c_config);

    let mut display = Ssd1308::new(I2CInterface::new(i2c, OLED_I2C_ADDRESS, OLED_DATA_BYTE));
    if let Err(e) = display.init(&mut delay).await {
        error!("display init failed: {:?}", Debug2Format(&e));
    }
    if let Err(e) = display.show().await {
        error!("display clear failed: {:?}", Debug2Format(&e));
    }

    unwrap!(spawner.spawn(click(Clicker::new(buzzer))));
    unwrap!(spawner.spawn(report(display)));
    interrupt::SWI_IRQ_1.set_priority(Priority::P2);
    let edge_spawner = EXECUTOR_EDGES.start(interrupt::SWI_IRQ_1);
    unwrap!(edge_spawner.spawn(pulse_input(bg51)));

    let mut sampler: PulseRateSampler<'static> = PulseRateSampler::new(&PULSES);
    // Clock before ticker so ticker deadlines never land ahead of a clock boundary.
    let mut clock = TickClock::new(Instant::now().as_millis());
    let mut ticker = Ticker::every(Duration::from_millis(TICK_MS));

    info!("Start measurement");
    loop {
        ticker.next().await;
        let now = Instant::now().as_millis();
        let tick = sampler.advance(clock.poll(now));
        if tick.missed > 0 {
            warn!("consumer late: {} second(s) recorded as empty", tick.missed);
        }
        if sampler.take_new_second() {
            SNAPSHOT.signal(sampler.snapshot(clock.uptime_ms(now)));
        }
    }
}
