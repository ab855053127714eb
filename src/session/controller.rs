//! Demand tracking and hardware lifecycle.

use crate::clients::ClientRegistry;
use crate::clock::Clock;
use crate::config::ProviderConfig;
use crate::error::{ProviderError, Result};
use crate::hardware::{
    Capabilities, EventSink, HardwareEvent, PhoneContextRequest, PhoneContextSettings,
    PositionSource,
};
use crate::queries::{PendingQuery, PendingQueryQueue};
use crate::timer::IdleTimer;
use crate::transport::{CallContext, Signal, Transport};
use crate::types::{
    ClientId, LocationSample, Options, ProviderInfo, QueryKind, QueryReply, Status,
};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Result of a synchronous position or velocity query.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum QueryOutcome {
    /// The last fix was fresh; the reply has already been sent.
    Answered(QueryReply),
    /// The call was parked until the next fix.
    Deferred,
}

/// Owns all provider state and is the only caller of `start`/`stop`.
///
/// Demand is the number of outstanding client subscriptions plus the number
/// of pending queries. Hardware is started when demand leaves zero and
/// stopped when it returns to zero; the idle timer runs whenever demand is
/// zero.
pub struct SessionController<S, T: Transport, K> {
    config: ProviderConfig,
    source: S,
    transport: T,
    clock: K,
    capabilities: Capabilities,
    info: ProviderInfo,
    registry: ClientRegistry,
    queue: PendingQueryQueue<T::Call>,
    sample: LocationSample,
    timer: IdleTimer,
    /// Demand as of the last re-evaluation.
    demand: usize,
}

impl<S, T, K> SessionController<S, T, K>
where
    S: PositionSource,
    T: Transport,
    K: Clock,
{
    /// Initialize the hardware and arm the idle timer.
    ///
    /// A failed initialization is not an error: the provider keeps running
    /// and reports itself unavailable.
    pub fn new(
        mut source: S,
        transport: T,
        config: ProviderConfig,
        clock: K,
        events: EventSink,
    ) -> Self {
        let capabilities = match source.initialize(events) {
            Ok(capabilities) => {
                info!(
                    available = capabilities.is_available(),
                    extensions = ?capabilities.extension_names(),
                    "GPS interface initialised"
                );
                capabilities
            }
            Err(err) => {
                warn!(error = %err, "Failed to initialise GPS interface");
                Capabilities::none()
            }
        };

        let mut timer = IdleTimer::new(config.quit_idle_time_ms);
        timer.arm(clock.monotonic_ms());

        Self {
            config,
            source,
            transport,
            clock,
            capabilities,
            info: ProviderInfo::default(),
            registry: ClientRegistry::new(),
            queue: PendingQueryQueue::new(),
            sample: LocationSample::empty(),
            timer,
            demand: 0,
        }
    }

    // --- Client References ---

    /// `AddReference`: register demand from the calling client.
    pub fn add_reference(&mut self, context: &CallContext) -> Result<()> {
        let client = context
            .sender
            .clone()
            .ok_or(ProviderError::OutOfBandCall("AddReference"))?;
        debug!(%client, "AddReference");

        if self.registry.subscribe(client.clone()) {
            self.transport.watch_client(&client);
        }
        self.update_demand();
        Ok(())
    }

    /// `RemoveReference`: withdraw one unit of demand from the calling client.
    pub fn remove_reference(&mut self, context: &CallContext) -> Result<()> {
        let client = context
            .sender
            .as_ref()
            .ok_or(ProviderError::OutOfBandCall("RemoveReference"))?;
        debug!(%client, "RemoveReference");

        if self.registry.unsubscribe(client) {
            self.transport.unwatch_client(client);
        }
        self.update_demand();
        Ok(())
    }

    /// The transport reported that `client` left the bus.
    pub fn client_vanished(&mut self, client: &ClientId) {
        let removed = self.registry.remove_all(client);
        debug!(%client, removed, "Client vanished");

        if removed > 0 {
            self.transport.unwatch_client(client);
            self.update_demand();
        }
    }

    // --- Queries ---

    pub fn get_position(&mut self, call: T::Call) -> QueryOutcome {
        self.query(QueryKind::Position, call)
    }

    pub fn get_velocity(&mut self, call: T::Call) -> QueryOutcome {
        self.query(QueryKind::Velocity, call)
    }

    /// Answer from the current sample if it is fresh, otherwise park the call
    /// until the next fix.
    pub fn query(&mut self, kind: QueryKind, call: T::Call) -> QueryOutcome {
        let now = self.clock.now();
        debug!(method = kind.member(), "Query");

        if self.sample.is_fresh(now, self.config.max_location_age_ms) {
            let reply = self.sample.reply_for(kind);
            self.complete(call, reply);
            return QueryOutcome::Answered(reply);
        }

        // Current position is too old, wait for an update.
        self.queue.enqueue(PendingQuery::new(kind, call, now));
        self.update_demand();
        QueryOutcome::Deferred
    }

    pub fn status(&self) -> Status {
        if self.capabilities.any() {
            Status::Acquiring
        } else {
            Status::Unavailable
        }
    }

    pub fn provider_info(&self) -> &ProviderInfo {
        &self.info
    }

    /// `SetOptions` is accepted and ignored.
    pub fn set_options(&mut self, options: &Options) {
        debug!(?options, "SetOptions");
    }

    // --- Hardware Events ---

    pub fn on_hardware_event(&mut self, event: HardwareEvent) {
        match event {
            HardwareEvent::Fix(sample) => self.on_fix(sample),
            HardwareEvent::PhoneContextRequest(request) => self.on_phone_context_request(&request),
            HardwareEvent::Status(status) => debug!(?status, "GPS status"),
            HardwareEvent::SatelliteStatus { count } => debug!(count, "Satellite status"),
            HardwareEvent::Nmea {
                timestamp,
                sentence,
            } => debug!(timestamp, %sentence, "NMEA"),
            HardwareEvent::Capabilities(bits) => debug!("GPS capabilities {:#x}", bits),
            HardwareEvent::AcquireWakeLock => debug!("Acquire wakelock"),
            HardwareEvent::ReleaseWakeLock => debug!("Release wakelock"),
            HardwareEvent::RequestUtcTime => debug!("UTC time requested"),
        }
    }

    /// Replace the current sample, broadcast it, and answer every pending
    /// query from it.
    pub fn on_fix(&mut self, sample: LocationSample) {
        self.sample = sample;

        let position = self.sample.position_reply();
        let velocity = self.sample.velocity_reply();
        debug!(
            timestamp = ?position.timestamp,
            position_fields = ?position.fields,
            velocity_fields = ?velocity.fields,
            "Location changed"
        );

        self.transport.emit(Signal::PositionChanged(position));
        self.transport.emit(Signal::VelocityChanged(velocity));

        if self.queue.is_empty() {
            return;
        }

        for (query, reply) in self.queue.drain(&self.sample) {
            self.complete(query.call, reply);
        }
        self.update_demand();
    }

    fn on_phone_context_request(&mut self, request: &PhoneContextRequest) {
        debug!(?request, "Phone context requested");

        if !self.capabilities.ulp_phone_context {
            debug!("No phone context interface, ignoring request");
            return;
        }

        let settings = PhoneContextSettings::gps_only(request);
        if let Err(err) = self.source.update_phone_context(&settings) {
            warn!(error = %err, "Phone context settings update failed");
        }
    }

    // --- Idle Shutdown ---

    /// Check the idle timer. Returns true once, when the service should exit.
    pub fn poll_idle(&mut self) -> bool {
        let expired = self.timer.poll(self.clock.monotonic_ms());
        if expired {
            info!(idle_ms = self.timer.grace_ms(), "Idle timeout, quitting");
        }
        expired
    }

    /// Monotonic deadline of the running countdown, if any.
    pub fn idle_deadline(&self) -> Option<u64> {
        self.timer.deadline()
    }

    /// Time left on the running countdown, if any.
    pub fn idle_remaining(&self) -> Option<Duration> {
        self.timer.deadline().map(|deadline| {
            Duration::from_millis(deadline.saturating_sub(self.clock.monotonic_ms()))
        })
    }

    /// Release the hardware. Pending queries are dropped unanswered.
    pub fn shutdown(&mut self) {
        let oldest_ms = self.queue.oldest_age(self.clock.now());
        let dropped = self.queue.clear();
        if dropped > 0 {
            debug!(dropped, ?oldest_ms, "Dropping pending queries on shutdown");
        }

        if self.demand > 0 && self.capabilities.is_available() {
            if let Err(err) = self.source.stop() {
                warn!(error = %err, "Failed to stop positioning");
            }
        }
        self.demand = 0;
        self.source.cleanup();
    }

    // --- Accessors ---

    pub fn demand(&self) -> usize {
        self.demand
    }

    pub fn client_count(&self) -> usize {
        self.registry.count()
    }

    pub fn is_watched(&self, client: &ClientId) -> bool {
        self.registry.is_watched(client)
    }

    pub fn pending_queries(&self) -> usize {
        self.queue.len()
    }

    pub fn current_sample(&self) -> &LocationSample {
        &self.sample
    }

    pub fn capabilities(&self) -> Capabilities {
        self.capabilities
    }

    pub fn is_idle(&self) -> bool {
        self.timer.is_armed()
    }

    // --- Internal ---

    fn complete(&mut self, call: T::Call, reply: QueryReply) {
        if let Err(err) = self.transport.reply(call, reply) {
            warn!(
                method = reply.kind().member(),
                error = %err,
                "Dropping reply for pending call"
            );
        }
    }

    fn update_demand(&mut self) {
        let demand = self.registry.count() + self.queue.len();
        let previous = std::mem::replace(&mut self.demand, demand);

        match (previous, demand) {
            (0, 0) => {}
            (0, _) => self.start_positioning(),
            (_, 0) => self.stop_positioning(),
            _ => {}
        }
    }

    fn start_positioning(&mut self) {
        if self.timer.disarm() {
            debug!("Stopping idle timer");
        }

        if !self.capabilities.is_available() {
            debug!("GPS interface unavailable, not starting positioning");
            return;
        }

        let params = self.config.acquisition_params();
        debug!(?params, "Setting positioning mode");
        if let Err(err) = self.source.set_acquisition_parameters(&params) {
            warn!(error = %err, "Failed to set position mode");
            return;
        }

        info!("Starting positioning");
        if let Err(err) = self.source.start() {
            warn!(error = %err, "Failed to start positioning");
        }
    }

    fn stop_positioning(&mut self) {
        if self.capabilities.is_available() {
            info!("Stopping positioning");
            if let Err(err) = self.source.stop() {
                warn!(error = %err, "Failed to stop positioning");
            }
        }

        self.timer.arm(self.clock.monotonic_ms());
        debug!(idle_ms = self.timer.grace_ms(), "Going to quit when idle");
    }
}
