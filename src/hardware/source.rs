//! The position source trait and its delivery channel.

use crate::error::Result;
use crossbeam_channel::Sender;
use serde::{Deserialize, Serialize};

use super::events::{HardwareEvent, PhoneContextSettings, RawFix};
use crate::types::LocationSample;

/// Positioning mode requested from the hardware.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PositionMode {
    /// Receiver computes fixes on its own.
    Standalone,
    /// Mobile-station based assisted GPS.
    MsBased,
    /// Mobile-station assisted GPS.
    MsAssisted,
}

impl PositionMode {
    /// HAL constant.
    pub fn as_raw(self) -> u32 {
        match self {
            PositionMode::Standalone => 0,
            PositionMode::MsBased => 1,
            PositionMode::MsAssisted => 2,
        }
    }
}

/// Whether the hardware reports continuously or once.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Recurrence {
    Periodic,
    Single,
}

impl Recurrence {
    /// HAL constant.
    pub fn as_raw(self) -> u32 {
        match self {
            Recurrence::Periodic => 0,
            Recurrence::Single => 1,
        }
    }
}

/// Parameters applied before every acquisition start.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AcquisitionParams {
    pub mode: PositionMode,
    pub recurrence: Recurrence,
    pub min_interval_ms: u32,
    pub preferred_accuracy_m: u32,
    pub preferred_initial_fix_ms: u32,
}

/// Interfaces that initialized successfully.
///
/// Only `gps` is required for the source to be usable. Every extension is
/// independently optional.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Capabilities {
    pub gps: bool,
    pub ulp_network: bool,
    pub ulp_phone_context: bool,
    pub agps: bool,
    pub gps_ni: bool,
    pub agps_ril: bool,
    pub xtra: bool,
    pub debug: bool,
}

impl Capabilities {
    /// Base GPS interface only, no extensions.
    pub fn base() -> Self {
        Self {
            gps: true,
            ..Default::default()
        }
    }

    /// Nothing initialized.
    pub fn none() -> Self {
        Self::default()
    }

    /// Every interface present.
    pub fn all() -> Self {
        Self {
            gps: true,
            ulp_network: true,
            ulp_phone_context: true,
            agps: true,
            gps_ni: true,
            agps_ril: true,
            xtra: true,
            debug: true,
        }
    }

    pub fn is_available(&self) -> bool {
        self.gps
    }

    /// Whether any interface at all came up.
    pub fn any(&self) -> bool {
        self.gps
            || self.ulp_network
            || self.ulp_phone_context
            || self.agps
            || self.gps_ni
            || self.agps_ril
            || self.xtra
            || self.debug
    }

    /// Names of the extensions that are present, for logging.
    pub fn extension_names(&self) -> Vec<&'static str> {
        [
            ("ulp_network", self.ulp_network),
            ("ulp_phone_context", self.ulp_phone_context),
            ("agps", self.agps),
            ("gps_ni", self.gps_ni),
            ("agps_ril", self.agps_ril),
            ("xtra", self.xtra),
            ("debug", self.debug),
        ]
        .into_iter()
        .filter_map(|(name, present)| present.then_some(name))
        .collect()
    }
}

/// Hardware backend driven by the session controller.
///
/// `start` and `stop` are not assumed idempotent. The controller only calls
/// them when demand crosses zero.
pub trait PositionSource: Send {
    /// One-time setup. `Err` means the base interface could not be opened.
    /// The source keeps `events` and delivers everything through it.
    fn initialize(&mut self, events: EventSink) -> Result<Capabilities>;

    fn set_acquisition_parameters(&mut self, params: &AcquisitionParams) -> Result<()>;

    fn start(&mut self) -> Result<()>;

    fn stop(&mut self) -> Result<()>;

    /// Answer a phone-context request from the ULP extension.
    fn update_phone_context(&mut self, _settings: &PhoneContextSettings) -> Result<()> {
        Ok(())
    }

    /// Release the hardware. Called once when the service exits.
    fn cleanup(&mut self) {}
}

impl<S: PositionSource + ?Sized> PositionSource for Box<S> {
    fn initialize(&mut self, events: EventSink) -> Result<Capabilities> {
        (**self).initialize(events)
    }

    fn set_acquisition_parameters(&mut self, params: &AcquisitionParams) -> Result<()> {
        (**self).set_acquisition_parameters(params)
    }

    fn start(&mut self) -> Result<()> {
        (**self).start()
    }

    fn stop(&mut self) -> Result<()> {
        (**self).stop()
    }

    fn update_phone_context(&mut self, settings: &PhoneContextSettings) -> Result<()> {
        (**self).update_phone_context(settings)
    }

    fn cleanup(&mut self) {
        (**self).cleanup()
    }
}

/// Sending half of the hardware event channel.
///
/// Cheap to clone and safe to use from driver threads. Events sent after the
/// service has gone away are discarded.
#[derive(Clone, Debug)]
pub struct EventSink {
    sender: Sender<HardwareEvent>,
}

impl EventSink {
    pub fn new(sender: Sender<HardwareEvent>) -> Self {
        Self { sender }
    }

    /// Queue an event for the control thread. Returns false if the service
    /// is gone.
    pub fn send(&self, event: HardwareEvent) -> bool {
        match self.sender.send(event) {
            Ok(()) => true,
            Err(err) => {
                tracing::trace!(event = ?err.0, "Hardware event after service exit");
                false
            }
        }
    }

    pub fn deliver_fix(&self, sample: LocationSample) -> bool {
        self.send(HardwareEvent::Fix(sample))
    }

    pub fn deliver_raw_fix(&self, raw: &RawFix) -> bool {
        self.deliver_fix(raw.to_sample())
    }
}
