//! Test doubles for the hardware, transport, and clock seams.
//!
//! Every double is a cheap handle around shared state: clone one, hand the
//! clone to the provider, and inspect or steer it through the one you kept.

use crate::clock::Clock;
use crate::error::{ProviderError, Result};
use crate::hardware::{
    AcquisitionParams, Capabilities, EventSink, HardwareEvent, PhoneContextSettings,
    PositionSource,
};
use crate::transport::{Signal, Transport};
use crate::types::{ClientId, LocationSample, QueryReply, Timestamp};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicI64, AtomicU64, Ordering};
use std::sync::Arc;

// --- Hardware ---

/// A call made on a [`ScriptedSource`].
#[derive(Clone, Debug, PartialEq)]
pub enum SourceCall {
    Initialize,
    SetParameters(AcquisitionParams),
    Start,
    Stop,
    UpdatePhoneContext(PhoneContextSettings),
    Cleanup,
}

/// Discriminant of [`SourceCall`], for counting.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SourceCallKind {
    Initialize,
    SetParameters,
    Start,
    Stop,
    UpdatePhoneContext,
    Cleanup,
}

impl SourceCall {
    pub fn kind(&self) -> SourceCallKind {
        match self {
            SourceCall::Initialize => SourceCallKind::Initialize,
            SourceCall::SetParameters(_) => SourceCallKind::SetParameters,
            SourceCall::Start => SourceCallKind::Start,
            SourceCall::Stop => SourceCallKind::Stop,
            SourceCall::UpdatePhoneContext(_) => SourceCallKind::UpdatePhoneContext,
            SourceCall::Cleanup => SourceCallKind::Cleanup,
        }
    }
}

#[derive(Default)]
struct SourceState {
    calls: Vec<SourceCall>,
    sink: Option<EventSink>,
    fail_parameters: bool,
    fail_start: bool,
    fail_stop: bool,
}

/// A position source that records every call and fails on request.
#[derive(Clone)]
pub struct ScriptedSource {
    state: Arc<Mutex<SourceState>>,
    /// `None` makes `initialize` fail.
    capabilities: Option<Capabilities>,
}

impl ScriptedSource {
    /// A source with the base GPS interface only.
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(SourceState::default())),
            capabilities: Some(Capabilities::base()),
        }
    }

    pub fn with_capabilities(mut self, capabilities: Capabilities) -> Self {
        self.capabilities = Some(capabilities);
        self
    }

    pub fn with_failing_initialize(mut self) -> Self {
        self.capabilities = None;
        self
    }

    pub fn set_fail_parameters(&self, fail: bool) {
        self.state.lock().fail_parameters = fail;
    }

    pub fn set_fail_start(&self, fail: bool) {
        self.state.lock().fail_start = fail;
    }

    pub fn set_fail_stop(&self, fail: bool) {
        self.state.lock().fail_stop = fail;
    }

    pub fn calls(&self) -> Vec<SourceCall> {
        self.state.lock().calls.clone()
    }

    pub fn count(&self, kind: SourceCallKind) -> usize {
        self.state
            .lock()
            .calls
            .iter()
            .filter(|call| call.kind() == kind)
            .count()
    }

    /// Push an event as the driver would. Returns false before
    /// initialization or after the service is gone.
    pub fn emit(&self, event: HardwareEvent) -> bool {
        let sink = self.state.lock().sink.clone();
        match sink {
            Some(sink) => sink.send(event),
            None => false,
        }
    }

    pub fn deliver_fix(&self, sample: LocationSample) -> bool {
        self.emit(HardwareEvent::Fix(sample))
    }

    fn record(&self, call: SourceCall) {
        self.state.lock().calls.push(call);
    }
}

impl Default for ScriptedSource {
    fn default() -> Self {
        Self::new()
    }
}

impl PositionSource for ScriptedSource {
    fn initialize(&mut self, events: EventSink) -> Result<Capabilities> {
        self.record(SourceCall::Initialize);
        let capabilities = self.capabilities.ok_or(ProviderError::HardwareUnavailable)?;
        self.state.lock().sink = Some(events);
        Ok(capabilities)
    }

    fn set_acquisition_parameters(&mut self, params: &AcquisitionParams) -> Result<()> {
        self.record(SourceCall::SetParameters(*params));
        if self.state.lock().fail_parameters {
            return Err(ProviderError::Hardware {
                operation: "set_position_mode",
                code: -1,
            });
        }
        Ok(())
    }

    fn start(&mut self) -> Result<()> {
        self.record(SourceCall::Start);
        if self.state.lock().fail_start {
            return Err(ProviderError::Hardware {
                operation: "start",
                code: -1,
            });
        }
        Ok(())
    }

    fn stop(&mut self) -> Result<()> {
        self.record(SourceCall::Stop);
        if self.state.lock().fail_stop {
            return Err(ProviderError::Hardware {
                operation: "stop",
                code: -1,
            });
        }
        Ok(())
    }

    fn update_phone_context(&mut self, settings: &PhoneContextSettings) -> Result<()> {
        self.record(SourceCall::UpdatePhoneContext(*settings));
        Ok(())
    }

    fn cleanup(&mut self) {
        self.record(SourceCall::Cleanup);
        self.state.lock().sink = None;
    }
}

// --- Transport ---

#[derive(Default)]
struct TransportState {
    replies: Vec<(u64, QueryReply)>,
    signals: Vec<Signal>,
    watched: Vec<ClientId>,
    fail_replies: bool,
}

/// A transport whose calls are plain `u64` ids and whose output is recorded.
#[derive(Clone, Default)]
pub struct RecordingTransport {
    state: Arc<Mutex<TransportState>>,
}

impl RecordingTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every `reply` fail, as if the bus connection had dropped.
    pub fn set_fail_replies(&self, fail: bool) {
        self.state.lock().fail_replies = fail;
    }

    pub fn replies(&self) -> Vec<(u64, QueryReply)> {
        self.state.lock().replies.clone()
    }

    /// Ids of completed calls, in completion order.
    pub fn reply_calls(&self) -> Vec<u64> {
        self.state.lock().replies.iter().map(|(call, _)| *call).collect()
    }

    pub fn signals(&self) -> Vec<Signal> {
        self.state.lock().signals.clone()
    }

    /// Clients currently watched for liveness.
    pub fn watched(&self) -> Vec<ClientId> {
        self.state.lock().watched.clone()
    }
}

impl Transport for RecordingTransport {
    type Call = u64;

    fn reply(&mut self, call: u64, reply: QueryReply) -> Result<()> {
        let mut state = self.state.lock();
        if state.fail_replies {
            return Err(ProviderError::CallCompletion(format!(
                "call {} has no connection",
                call
            )));
        }
        state.replies.push((call, reply));
        Ok(())
    }

    fn emit(&mut self, signal: Signal) {
        self.state.lock().signals.push(signal);
    }

    fn watch_client(&mut self, client: &ClientId) {
        let mut state = self.state.lock();
        if !state.watched.contains(client) {
            state.watched.push(client.clone());
        }
    }

    fn unwatch_client(&mut self, client: &ClientId) {
        self.state.lock().watched.retain(|watched| watched != client);
    }
}

// --- Clock ---

/// A clock that only moves when told to.
///
/// `advance` moves both scales together, like real time passing. `set`
/// steps the wall clock alone, like an NTP correction.
#[derive(Clone, Debug)]
pub struct ManualClock {
    now: Arc<AtomicI64>,
    monotonic: Arc<AtomicU64>,
}

impl ManualClock {
    /// Wall clock at `start`, monotonic clock at zero.
    pub fn new(start: Timestamp) -> Self {
        Self {
            now: Arc::new(AtomicI64::new(start.0)),
            monotonic: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn set(&self, now: Timestamp) {
        self.now.store(now.0, Ordering::SeqCst);
    }

    pub fn advance(&self, millis: u64) {
        self.now.fetch_add(millis as i64, Ordering::SeqCst);
        self.monotonic.fetch_add(millis, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Timestamp {
        Timestamp(self.now.load(Ordering::SeqCst))
    }

    fn monotonic_ms(&self) -> u64 {
        self.monotonic.load(Ordering::SeqCst)
    }
}
