#![no_std]
#![no_main]

use defmt::{error, info, unwrap};
use embassy_executor::Spawner;
use embassy_nrf::bind_interrupts;
use embassy_nrf::gpio::{Level, Output, OutputDrive};
use embassy_time::Duration;
use nrf_mpsl::{self as mpsl, MultiprotocolServiceLayer};
use nrf_timeslot::probe::heartbeat;
use nrf_timeslot::{Config, Negotiator, ProbeMode, ResourceOwner, Resources, CONTROL_CAPACITY};
use nrf_timeslot_firmware::deadline::Timer0Deadline;
use nrf_timeslot_firmware::probe::GpioProbe;
use nrf_timeslot_firmware::scheduler::{self, MpslScheduler};
use nrf_timeslot_firmware::DATA_CAP;
use static_cell::StaticCell;
use {defmt_rtt as _, panic_probe as _};

bind_interrupts!(struct Irqs {
    SWI0_EGU0 => mpsl::LowPrioInterruptHandler;
    POWER_CLOCK => mpsl::ClockInterruptHandler;
    RADIO => mpsl::HighPrioInterruptHandler;
    TIMER0 => mpsl::HighPrioInterruptHandler;
    RTC0 => mpsl::HighPrioInterruptHandler;
});

const HEARTBEAT: Duration = Duration::from_millis(15);

static RESOURCES: Resources<DATA_CAP, CONTROL_CAPACITY> = Resources::new();
static PROBE: GpioProbe = GpioProbe::new();
static CONFIG: Config = config();

const fn config() -> Config {
    let config = if cfg!(feature = "high-load") {
        Config::high_load()
    } else {
        Config::new()
    };
    if cfg!(feature = "pulse") {
        config.with_probe_mode(ProbeMode::Pulse)
    } else {
        config
    }
}

#[embassy_executor::task]
async fn mpsl_task(mpsl: &'static MultiprotocolServiceLayer<'static>) -> ! {
    mpsl.run().await
}

// The owner shares the thread executor with `mpsl_task`, so MPSL's low priority
// processing never runs in the middle of a session call.
#[embassy_executor::task]
async fn owner_task(mut owner: ResourceOwner<'static, MpslScheduler<'static>, CONTROL_CAPACITY>) -> ! {
    owner.run().await
}

#[embassy_executor::task]
async fn negotiator_task(negotiator: Negotiator<'static, &'static GpioProbe, DATA_CAP, CONTROL_CAPACITY>) -> ! {
    negotiator.run().await
}

#[embassy_executor::task]
async fn clear_task() -> ! {
    PROBE.run_clears().await
}

#[embassy_executor::main]
async fn main(spawner: Spawner) {
    let p = embassy_nrf::init(Default::default());

    let mpsl_p = mpsl::Peripherals::new(p.RTC0, p.TIMER0, p.TEMP, p.PPI_CH19, p.PPI_CH30, p.PPI_CH31);
    let lfclk_cfg = mpsl::raw::mpsl_clock_lfclk_cfg_t {
        source: mpsl::raw::MPSL_CLOCK_LF_SRC_RC as u8,
        rc_ctiv: mpsl::raw::MPSL_RECOMMENDED_RC_CTIV as u8,
        rc_temp_ctiv: mpsl::raw::MPSL_RECOMMENDED_RC_TEMP_CTIV as u8,
        accuracy_ppm: mpsl::raw::MPSL_DEFAULT_CLOCK_ACCURACY_PPM as u16,
        skip_wait_lfclk_started: mpsl::raw::MPSL_DEFAULT_SKIP_WAIT_LFCLK_STARTED != 0,
    };
    static MPSL: StaticCell<MultiprotocolServiceLayer> = StaticCell::new();
    static SESSION_MEM: StaticCell<mpsl::SessionMem<1>> = StaticCell::new();
    let mpsl: &'static MultiprotocolServiceLayer = MPSL.init(unwrap!(mpsl::MultiprotocolServiceLayer::with_timeslots(
        mpsl_p,
        Irqs,
        lfclk_cfg,
        SESSION_MEM.init(mpsl::SessionMem::new())
    )));
    spawner.must_spawn(mpsl_task(mpsl));

    // In `PinId::ALL` order.
    PROBE.install([
        Output::new(p.P1_01, Level::Low, OutputDrive::Standard),
        Output::new(p.P1_02, Level::Low, OutputDrive::Standard),
        Output::new(p.P1_03, Level::Low, OutputDrive::Standard),
        Output::new(p.P1_04, Level::Low, OutputDrive::Standard),
        Output::new(p.P1_05, Level::Low, OutputDrive::Standard),
        Output::new(p.P1_06, Level::Low, OutputDrive::Standard),
        Output::new(p.P1_07, Level::Low, OutputDrive::Standard),
        Output::new(p.P1_08, Level::Low, OutputDrive::Standard),
        Output::new(p.P1_10, Level::Low, OutputDrive::Standard),
        Output::new(p.P1_11, Level::Low, OutputDrive::Standard),
    ]);

    if let Err(err) = RESOURCES.bootstrap(&PROBE).await {
        error!("probe init error: {:?}", err);
        return;
    }

    scheduler::install(RESOURCES.slot_handler(&PROBE, Timer0Deadline, &CONFIG));
    spawner.must_spawn(clear_task());
    spawner.must_spawn(owner_task(RESOURCES.owner(MpslScheduler::new(mpsl), &CONFIG)));
    spawner.must_spawn(negotiator_task(RESOURCES.negotiator(&PROBE, &CONFIG)));
    info!("timeslot demo running: {:?}", CONFIG);

    heartbeat(&PROBE, HEARTBEAT).await
}
