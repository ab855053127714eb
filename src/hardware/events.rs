//! Events delivered by the hardware and the raw HAL fix adapter.

use crate::types::{Accuracy, LocationSample, Timestamp};
use bitflags::bitflags;

bitflags! {
    /// Validity bits of a HAL fix.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct LocationFlags: u16 {
        const LAT_LONG = 0x0001;
        const ALTITUDE = 0x0002;
        const SPEED    = 0x0004;
        const BEARING  = 0x0008;
        const ACCURACY = 0x0010;
    }
}

impl Default for LocationFlags {
    fn default() -> Self {
        LocationFlags::empty()
    }
}

/// A location as reported by the HAL: values plus a validity bitmask.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct RawFix {
    pub flags: LocationFlags,
    pub latitude: f64,
    pub longitude: f64,
    pub altitude: f64,
    pub speed: f32,
    pub bearing: f32,
    pub accuracy: f32,
    /// Milliseconds since Unix epoch.
    pub timestamp: i64,
}

impl RawFix {
    /// Convert to a sample. Fields whose flag bit is clear are absent.
    pub fn to_sample(&self) -> LocationSample {
        let mut sample = LocationSample::at(Timestamp(self.timestamp));

        if self.flags.contains(LocationFlags::LAT_LONG) {
            sample = sample.with_coordinates(self.latitude, self.longitude);
        }
        if self.flags.contains(LocationFlags::ALTITUDE) {
            sample = sample.with_altitude(self.altitude);
        }
        if self.flags.contains(LocationFlags::SPEED) {
            sample = sample.with_speed(self.speed as f64);
        }
        if self.flags.contains(LocationFlags::BEARING) {
            sample = sample.with_bearing(self.bearing as f64);
        }
        if self.flags.contains(LocationFlags::ACCURACY) {
            let accuracy = self.accuracy as f64;
            sample = sample.with_accuracy(Accuracy::new(accuracy, accuracy));
        }

        sample
    }
}

/// Engine status reported by the HAL status callback.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GpsStatusValue {
    None,
    SessionBegin,
    SessionEnd,
    EngineOn,
    EngineOff,
    Unknown(u16),
}

impl GpsStatusValue {
    pub fn from_raw(raw: u16) -> Self {
        match raw {
            0 => GpsStatusValue::None,
            1 => GpsStatusValue::SessionBegin,
            2 => GpsStatusValue::SessionEnd,
            3 => GpsStatusValue::EngineOn,
            4 => GpsStatusValue::EngineOff,
            other => GpsStatusValue::Unknown(other),
        }
    }
}

/// A phone-context request from the ULP extension.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PhoneContextRequest {
    pub context_type: u16,
    pub request_type: u16,
    pub interval_ms: u32,
}

/// Phone settings reported back to the ULP extension.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PhoneContextSettings {
    pub context_type: u16,
    pub gps_enabled: bool,
    pub network_position_available: bool,
    pub wifi_setting_enabled: bool,
    pub battery_charging: bool,
    pub agps_enabled: bool,
    pub enhanced_location_services_enabled: bool,
}

impl PhoneContextSettings {
    /// Settings answered for `request`: GPS on, everything else off.
    pub fn gps_only(request: &PhoneContextRequest) -> Self {
        Self {
            context_type: request.context_type,
            gps_enabled: true,
            network_position_available: false,
            wifi_setting_enabled: false,
            battery_charging: false,
            agps_enabled: false,
            enhanced_location_services_enabled: false,
        }
    }
}

/// Everything the hardware can tell the control thread.
///
/// Only `Fix` and `PhoneContextRequest` change provider state. The rest are
/// logged.
#[derive(Clone, Debug)]
pub enum HardwareEvent {
    Fix(LocationSample),
    Status(GpsStatusValue),
    SatelliteStatus { count: i32 },
    Nmea { timestamp: i64, sentence: String },
    Capabilities(u32),
    AcquireWakeLock,
    ReleaseWakeLock,
    RequestUtcTime,
    PhoneContextRequest(PhoneContextRequest),
}
