mod common;

use std::cell::{Cell, RefCell};
use std::vec::Vec;

use common::{run_slot, InlineScheduler, NullTimer, RecordingProbe, RecordingScheduler};
use embassy_futures::block_on;
use embassy_futures::select::{select3, Either3};
use embassy_time::Duration;
use nrf_timeslot::{
    Config, PinId, ProbeError, Resources, Sample, SessionRequest, CONTROL_CAPACITY, DATA_CAPACITY,
};

fn drain_values<P: nrf_timeslot::Probe, const N: usize, const C: usize>(
    negotiator: &nrf_timeslot::Negotiator<'_, P, N, C>,
) -> Vec<u8> {
    let mut values = Vec::new();
    negotiator.drain(|s| values.push(s.value()));
    values
}

#[test]
fn full_negotiation_cycle() {
    let resources = Resources::<DATA_CAPACITY, CONTROL_CAPACITY>::new();
    let config = Config::new();
    let probe = RecordingProbe::default();
    let mut scheduler = RecordingScheduler::default();

    block_on(resources.bootstrap(&probe)).unwrap();
    assert_eq!(resources.control.len(), 1);

    let mut owner = resources.owner(&mut scheduler, &config);
    let negotiator = resources.negotiator(&probe, &config);
    let mut handler = resources.slot_handler(&probe, NullTimer, &config);

    // Open the session; this grants the first cycle.
    let request = resources.control.try_receive().unwrap();
    assert_eq!(request, SessionRequest::OpenSession);
    owner.process(request).unwrap();
    assert!(resources.gate.is_given());

    // First cycle.
    assert!(block_on(negotiator.negotiate()));
    owner.process(resources.control.try_receive().unwrap()).unwrap();
    run_slot(&mut handler);
    assert_eq!(resources.data.len(), 20);
    assert_eq!(drain_values(&negotiator), (1..=18).collect::<Vec<u8>>());
    assert_eq!(resources.data.len(), 2);

    // Second cycle picks up the leftovers first.
    assert!(block_on(negotiator.negotiate()));
    owner.process(resources.control.try_receive().unwrap()).unwrap();
    run_slot(&mut handler);
    assert_eq!(drain_values(&negotiator), (19..=36).collect::<Vec<u8>>());
    assert_eq!(resources.data.len(), 4);

    // No idle signal since the last request: this cycle is denied.
    assert!(resources.gate.try_take());
    assert!(!block_on(negotiator.negotiate()));
    assert!(resources.control.is_empty());

    drop(owner);
    assert_eq!(scheduler.opened, 1);
    assert_eq!(scheduler.requests, [config.request(), config.request()]);
    assert_eq!(probe.count(PinId::ReqAllowed), 2);
    assert_eq!(probe.count(PinId::ReqDenied), 1);
    assert_eq!(probe.count(PinId::SlotStart), 2);
    assert_eq!(probe.count(PinId::SlotTimer), 2);
    assert_eq!(probe.count(PinId::SlotIdle), 2);
}

#[test]
fn backlog_grows_until_the_channel_saturates() {
    let resources = Resources::<DATA_CAPACITY, CONTROL_CAPACITY>::new();
    let config = Config::new();
    let probe = RecordingProbe::default();
    let negotiator = resources.negotiator(&probe, &config);
    let mut handler = resources.slot_handler(&probe, NullTimer, &config);

    let mut backlog = Vec::new();
    for _ in 0..80 {
        run_slot(&mut handler);
        assert!(resources.data.len() <= DATA_CAPACITY);
        assert_eq!(negotiator.drain(|_| {}), config.drain_limit);
        backlog.push(resources.data.len());
    }

    assert_eq!(backlog[0], 2);
    assert!(backlog.windows(2).all(|w| w[0] <= w[1]));
    let saturated = DATA_CAPACITY - config.drain_limit;
    assert_eq!(*backlog.last().unwrap(), saturated);
    assert!(backlog[60..].iter().all(|&len| len == saturated));
    assert!(resources.data.dropped() > 0);
    // Everything produced is either still queued, consumed or counted as dropped.
    let produced = 80 * config.batch_size;
    let consumed = 80 * config.drain_limit;
    assert_eq!(produced, consumed + saturated + resources.data.dropped() as usize);
}

#[test]
fn dropped_samples_leave_a_gap() {
    let resources = Resources::<24, CONTROL_CAPACITY>::new();
    let config = Config::new();
    let probe = RecordingProbe::default();
    let negotiator = resources.negotiator(&probe, &config);
    let mut handler = resources.slot_handler(&probe, NullTimer, &config);

    run_slot(&mut handler);
    run_slot(&mut handler);
    assert_eq!(resources.data.dropped(), 16);

    let values = drain_values(&negotiator);
    assert_eq!(values[..], (1..=18).collect::<Vec<u8>>()[..]);
    // 21..=24 made it, 25..=40 were lost.
    assert_eq!(drain_values(&negotiator), [19, 20, 21, 22, 23, 24]);
    assert_eq!(handler.last_sample(), Sample(40));
}

#[test]
fn bootstrap_aborts_when_the_probe_fails() {
    let resources = Resources::<DATA_CAPACITY, CONTROL_CAPACITY>::new();
    let probe = RecordingProbe {
        fail_init: true,
        ..RecordingProbe::default()
    };

    assert_eq!(block_on(resources.bootstrap(&probe)), Err(ProbeError));
    assert!(resources.control.is_empty());
}

#[test]
fn loops_keep_negotiating() {
    let resources = Resources::<DATA_CAPACITY, CONTROL_CAPACITY>::new();
    let config = Config {
        interval: Duration::from_millis(1),
        ..Config::new()
    };
    let probe = RecordingProbe::default();
    let handler = RefCell::new(resources.slot_handler(&probe, NullTimer, &config));
    let requests = Cell::new(0);

    block_on(resources.bootstrap(&probe)).unwrap();
    let mut owner = resources.owner(
        InlineScheduler {
            handler: &handler,
            requests: &requests,
        },
        &config,
    );
    let negotiator = resources.negotiator(&probe, &config);

    let done = block_on(select3(owner.run(), negotiator.run(), async {
        while requests.get() < 5 {
            embassy_futures::yield_now().await;
        }
    }));
    assert!(matches!(done, Either3::Third(())));

    let granted = requests.get();
    assert!(granted >= 5);
    assert_eq!(handler.borrow().last_sample(), Sample((granted * 20) as u8));
    // Every slot ended in an idle signal before the next cycle, so none was denied.
    assert_eq!(probe.count(PinId::ReqDenied), 0);
    // The negotiator may have queued one more request than the owner served.
    assert!((granted..=granted + 1).contains(&probe.count(PinId::ReqAllowed)));
}
