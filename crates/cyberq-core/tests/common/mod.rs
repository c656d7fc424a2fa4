#![allow(clippy::unwrap_used, dead_code)]

// Instrumented in-process transport. Replies are scripted per call; every
// call is counted and checked for overlap with any other call.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use cyberq_core::{
    CoordinatorConfig, DeviceTransport, RawPayload, TransportError, WriteRequest,
};

/// One scripted fetch reply.
#[derive(Debug, Clone)]
pub enum Reply {
    /// Answer with the device's current payload.
    Current,
    Timeout,
    Refused,
    /// Answer with a payload that cannot be parsed.
    Garbage,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    FetchStart,
    FetchEnd,
    Write(String, String),
}

#[derive(Default)]
struct MockState {
    payload: Mutex<RawPayload>,
    replies: Mutex<VecDeque<Reply>>,
    write_rejects: Mutex<VecDeque<String>>,
    fetch_delay: Mutex<Duration>,
    write_delay: Mutex<Duration>,
    log: Mutex<Vec<Call>>,
    fetches: AtomicUsize,
    writes: AtomicUsize,
    in_flight: AtomicUsize,
    overlapped: AtomicBool,
}

#[derive(Clone, Default)]
pub struct MockTransport {
    state: Arc<MockState>,
}

impl MockTransport {
    pub fn new(payload: RawPayload) -> Self {
        let mock = Self::default();
        *mock.state.payload.lock().unwrap() = payload;
        mock
    }

    /// Queue replies for the next fetches. Once drained every fetch answers
    /// with the current payload.
    pub fn script(&self, replies: impl IntoIterator<Item = Reply>) {
        self.state.replies.lock().unwrap().extend(replies);
    }

    /// Make the next write echo `echoed` instead of the requested value.
    pub fn reject_next_write(&self, echoed: &str) {
        self.state.write_rejects.lock().unwrap().push_back(echoed.to_owned());
    }

    pub fn set(&self, key: &str, value: &str) {
        self.state.payload.lock().unwrap().insert(key, value);
    }

    pub fn set_fetch_delay(&self, delay: Duration) {
        *self.state.fetch_delay.lock().unwrap() = delay;
    }

    pub fn set_write_delay(&self, delay: Duration) {
        *self.state.write_delay.lock().unwrap() = delay;
    }

    pub fn fetches(&self) -> usize {
        self.state.fetches.load(Ordering::SeqCst)
    }

    pub fn writes(&self) -> usize {
        self.state.writes.load(Ordering::SeqCst)
    }

    pub fn calls(&self) -> usize {
        self.fetches() + self.writes()
    }

    pub fn overlapped(&self) -> bool {
        self.state.overlapped.load(Ordering::SeqCst)
    }

    pub fn log(&self) -> Vec<Call> {
        self.state.log.lock().unwrap().clone()
    }

    fn enter(&self) {
        if self.state.in_flight.fetch_add(1, Ordering::SeqCst) > 0 {
            self.state.overlapped.store(true, Ordering::SeqCst);
        }
    }

    fn leave(&self) {
        self.state.in_flight.fetch_sub(1, Ordering::SeqCst);
    }

    fn record(&self, call: Call) {
        self.state.log.lock().unwrap().push(call);
    }
}

impl DeviceTransport for MockTransport {
    async fn fetch(&self) -> Result<RawPayload, TransportError> {
        self.enter();
        self.state.fetches.fetch_add(1, Ordering::SeqCst);
        self.record(Call::FetchStart);

        let reply = self.state.replies.lock().unwrap().pop_front();
        let delay = *self.state.fetch_delay.lock().unwrap();
        tokio::time::sleep(delay).await;

        let result = match reply.unwrap_or(Reply::Current) {
            Reply::Current => Ok(self.state.payload.lock().unwrap().clone()),
            Reply::Timeout => Err(TransportError::TimedOut {
                url: "http://cyberq.test/config.xml".into(),
                timeout_ms: 4000,
            }),
            Reply::Refused => Err(TransportError::ConnectionRefused {
                url: "http://cyberq.test/config.xml".into(),
                reason: "connection refused".into(),
            }),
            Reply::Garbage => Ok([("COOK_TEMP", "2250")].into_iter().collect()),
        };

        self.record(Call::FetchEnd);
        self.leave();
        result
    }

    async fn write(&self, request: &WriteRequest) -> Result<(), TransportError> {
        self.enter();
        self.state.writes.fetch_add(1, Ordering::SeqCst);
        self.record(Call::Write(request.key.clone(), request.value.clone()));

        let delay = *self.state.write_delay.lock().unwrap();
        tokio::time::sleep(delay).await;

        let rejected = self.state.write_rejects.lock().unwrap().pop_front();
        let result = if let Some(echoed) = rejected {
            Err(TransportError::Rejected {
                key: request.key.clone(),
                requested: request.value.clone(),
                echoed,
            })
        } else {
            // the device stores what it echoes: tenths for setpoints
            let stored = request.expected_echo.as_ref().unwrap_or(&request.value);
            self.set(&request.key, stored);
            Ok(())
        };

        self.leave();
        result
    }
}

pub fn full_payload() -> RawPayload {
    [
        ("COOK_NAME", "Big Green Egg"),
        ("COOK_TEMP", "2250"),
        ("COOK_SET", "2250"),
        ("COOK_STATUS", "0"),
        ("FOOD1_NAME", "Brisket"),
        ("FOOD1_TEMP", "1653"),
        ("FOOD1_SET", "1950"),
        ("FOOD1_STATUS", "2"),
        ("FOOD2_NAME", "Food2"),
        ("FOOD2_TEMP", "OPEN"),
        ("FOOD2_SET", "1800"),
        ("FOOD2_STATUS", "4"),
        ("FOOD3_NAME", "Food3"),
        ("FOOD3_TEMP", "OPEN"),
        ("FOOD3_SET", "320"),
        ("FOOD3_STATUS", "4"),
        ("COOK_PROPBAND", "25"),
        ("COOK_CYCTIME", "6"),
        ("ALARMDEV", "50"),
        ("COOKHOLD", "2000"),
        ("COOK_RAMP", "1"),
        ("DEG_UNITS", "1"),
        ("ALARM_BEEPS", "3"),
        ("TIMEOUT_ACTION", "1"),
        ("LCD_BACKLIGHT", "47"),
        ("LCD_CONTRAST", "10"),
        ("MENU_SCROLLING", "1"),
        ("KEY_BEEPS", "0"),
        ("OPENDETECT", "1"),
        ("OUTPUT_PERCENT", "100"),
        ("TIMER_STATUS", "0"),
        ("TIMER_CURR", "01:30:15"),
        ("MAC", "00:1B:2C:3D:4E:5F"),
        ("FWVER", "1.7"),
    ]
    .into_iter()
    .collect()
}

/// 5 s polls, threshold 3, the defaults everywhere else.
pub fn config() -> CoordinatorConfig {
    CoordinatorConfig::new("cyberq.test")
}
