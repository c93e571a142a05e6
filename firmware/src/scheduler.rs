//! [`Scheduler`] over the MPSL timeslot API.
use core::cell::RefCell;

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::blocking_mutex::Mutex;
use nrf_mpsl::{raw, MultiprotocolServiceLayer};
use nrf_timeslot::{
    Action, Error, HfclkConfig, Priority, RetVal, Scheduler, SessionId, SlotHandler, TimeslotRequest,
};

use crate::deadline::Timer0Deadline;
use crate::probe::GpioProbe;
use crate::DATA_CAP;

pub type Handler = SlotHandler<'static, &'static GpioProbe, Timer0Deadline, DATA_CAP>;

/// Callback state. MPSL keeps pointers to `request` and `return_param`, so both live here.
struct State {
    handler: Option<Handler>,
    request: raw::mpsl_timeslot_request_t,
    return_param: raw::mpsl_timeslot_signal_return_param_t,
}

// Safety:
// The request is only written before it is handed to MPSL, the return parameters only
// inside the callback. Both happen with the lock held.
unsafe impl Send for State {}

static STATE: Mutex<CriticalSectionRawMutex, RefCell<State>> = Mutex::new(RefCell::new(State {
    handler: None,
    request: raw::mpsl_timeslot_request_t {
        request_type: raw::MPSL_TIMESLOT_REQ_TYPE_EARLIEST as u8,
        params: raw::mpsl_timeslot_request_t__bindgen_ty_1 {
            earliest: raw::mpsl_timeslot_request_earliest_t {
                hfclk: raw::MPSL_TIMESLOT_HFCLK_CFG_NO_GUARANTEE as u8,
                priority: raw::MPSL_TIMESLOT_PRIORITY_NORMAL as u8,
                length_us: 0,
                timeout_us: 0,
            },
        },
    },
    return_param: raw::mpsl_timeslot_signal_return_param_t {
        callback_action: 0,
        params: raw::mpsl_timeslot_signal_return_param_t__bindgen_ty_1 {
            request: raw::mpsl_timeslot_signal_return_param_t__bindgen_ty_1__bindgen_ty_1 {
                p_next: core::ptr::null_mut(),
            },
        },
    },
}));

/// Install the timeslot callback state. Must happen before the session is opened.
pub fn install(handler: Handler) {
    STATE.lock(|state| state.borrow_mut().handler = Some(handler));
}

unsafe extern "C" fn timeslot_callback(
    _session_id: u8,
    signal: u32,
) -> *mut raw::mpsl_timeslot_signal_return_param_t {
    STATE.lock(|state| {
        let mut state = state.borrow_mut();
        let state = &mut *state;
        let Some(handler) = state.handler.as_mut() else {
            panic!("timeslot callback without a handler");
        };
        match handler.dispatch(signal) {
            Some(action) => {
                state.return_param.callback_action = match action {
                    Action::None => raw::MPSL_TIMESLOT_SIGNAL_ACTION_NONE,
                    Action::End => raw::MPSL_TIMESLOT_SIGNAL_ACTION_END,
                } as u8;
                &mut state.return_param as *mut _
            }
            None => core::ptr::null_mut(),
        }
    })
}

/// The MPSL timeslot session API.
pub struct MpslScheduler<'d> {
    _mpsl: &'d MultiprotocolServiceLayer<'d>,
}

impl<'d> MpslScheduler<'d> {
    /// `mpsl` must have been created with timeslot support.
    pub fn new(mpsl: &'d MultiprotocolServiceLayer<'d>) -> Self {
        Self { _mpsl: mpsl }
    }
}

impl Scheduler for MpslScheduler<'_> {
    fn open_session(&mut self) -> Result<SessionId, Error> {
        let mut session_id: u8 = 0;
        let ret = unsafe { raw::mpsl_timeslot_session_open(Some(timeslot_callback), &mut session_id) };
        RetVal::from(ret).to_result()?;
        Ok(SessionId(session_id))
    }

    fn request(&mut self, session: SessionId, request: &TimeslotRequest) -> Result<(), Error> {
        let hfclk = match request.hfclk {
            HfclkConfig::NoGuarantee => raw::MPSL_TIMESLOT_HFCLK_CFG_NO_GUARANTEE,
            HfclkConfig::XtalGuaranteed => raw::MPSL_TIMESLOT_HFCLK_CFG_XTAL_GUARANTEED,
        } as u8;
        let priority = match request.priority {
            Priority::Normal => raw::MPSL_TIMESLOT_PRIORITY_NORMAL,
            Priority::High => raw::MPSL_TIMESLOT_PRIORITY_HIGH,
        } as u8;

        // Release the lock before calling in, the callback takes it too.
        let request = STATE.lock(|state| {
            let mut state = state.borrow_mut();
            state.request.request_type = raw::MPSL_TIMESLOT_REQ_TYPE_EARLIEST as u8;
            state.request.params.earliest = raw::mpsl_timeslot_request_earliest_t {
                hfclk,
                priority,
                length_us: request.length_us,
                timeout_us: request.timeout_us,
            };
            core::ptr::from_ref(&state.request)
        });

        let ret = unsafe { raw::mpsl_timeslot_request(session.0, request) };
        RetVal::from(ret).to_result()?;
        Ok(())
    }

    fn close_session(&mut self, session: SessionId) -> Result<(), Error> {
        let ret = unsafe { raw::mpsl_timeslot_session_close(session.0) };
        RetVal::from(ret).to_result()?;
        Ok(())
    }
}
