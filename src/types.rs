//! Core types for the position provider.

use bitflags::bitflags;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::HashMap;
use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

/// Milliseconds since Unix epoch.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Timestamp(pub i64);

impl Timestamp {
    /// Marker for a sample that has never been set.
    pub const UNSET: Timestamp = Timestamp(i64::MIN);

    /// Current wall-clock time.
    pub fn now() -> Self {
        let millis = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as i64)
            .unwrap_or(0);
        Timestamp(millis)
    }

    pub fn is_set(self) -> bool {
        self != Self::UNSET
    }

    /// Milliseconds elapsed from `self` to `now`, or `None` if unset.
    pub fn age_at(self, now: Timestamp) -> Option<i64> {
        self.is_set().then(|| now.0.saturating_sub(self.0))
    }
}

impl Default for Timestamp {
    fn default() -> Self {
        Self::UNSET
    }
}

impl fmt::Debug for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_set() {
            write!(f, "Timestamp({})", self.0)
        } else {
            write!(f, "Timestamp(unset)")
        }
    }
}

/// Identity of a remote client, stable for the lifetime of its connection
/// (a bus unique name such as `:1.42`).
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ClientId(pub String);

impl ClientId {
    pub fn new(name: impl Into<String>) -> Self {
        ClientId(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ClientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ClientId({})", self.0)
    }
}

impl fmt::Display for ClientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Accuracy level reported alongside every position.
pub const ACCURACY_LEVEL_DETAILED: i32 = 6;

/// Serde adapter for NaN-as-absent floats: NaN is written as `null` and
/// `null` reads back as NaN.
mod absent {
    use super::*;

    pub fn serialize<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
        if value.is_nan() {
            serializer.serialize_none()
        } else {
            serializer.serialize_some(value)
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
        Ok(Option::<f64>::deserialize(deserializer)?.unwrap_or(f64::NAN))
    }
}

/// Horizontal and vertical accuracy in metres. NaN means unknown.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Accuracy {
    #[serde(with = "absent")]
    pub horizontal: f64,
    #[serde(with = "absent")]
    pub vertical: f64,
}

impl Accuracy {
    pub fn new(horizontal: f64, vertical: f64) -> Self {
        Self {
            horizontal,
            vertical,
        }
    }

    /// Wire form: `(level, horizontal, vertical)`.
    pub fn to_wire(&self) -> (i32, f64, f64) {
        (ACCURACY_LEVEL_DETAILED, self.horizontal, self.vertical)
    }
}

impl Default for Accuracy {
    fn default() -> Self {
        Self::new(f64::NAN, f64::NAN)
    }
}

/// The latest fix. Every `f64` field uses NaN as the "absent" sentinel.
///
/// Latitude and longitude can only be set together, through
/// [`LocationSample::with_coordinates`]. Deserialization goes through it too.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(from = "SampleRecord")]
pub struct LocationSample {
    pub timestamp: Timestamp,
    #[serde(with = "absent")]
    latitude: f64,
    #[serde(with = "absent")]
    longitude: f64,
    #[serde(with = "absent")]
    pub altitude: f64,
    #[serde(with = "absent")]
    pub speed: f64,
    #[serde(with = "absent")]
    pub bearing: f64,
    #[serde(with = "absent")]
    pub climb: f64,
    pub accuracy: Accuracy,
}

/// Unchecked wire form of a [`LocationSample`].
#[derive(Deserialize)]
struct SampleRecord {
    timestamp: Timestamp,
    #[serde(with = "absent")]
    latitude: f64,
    #[serde(with = "absent")]
    longitude: f64,
    #[serde(with = "absent")]
    altitude: f64,
    #[serde(with = "absent")]
    speed: f64,
    #[serde(with = "absent")]
    bearing: f64,
    #[serde(with = "absent")]
    climb: f64,
    accuracy: Accuracy,
}

impl From<SampleRecord> for LocationSample {
    fn from(record: SampleRecord) -> Self {
        LocationSample::at(record.timestamp)
            .with_coordinates(record.latitude, record.longitude)
            .with_altitude(record.altitude)
            .with_speed(record.speed)
            .with_bearing(record.bearing)
            .with_climb(record.climb)
            .with_accuracy(record.accuracy)
    }
}

impl LocationSample {
    /// An empty sample: no timestamp, every field absent.
    pub fn empty() -> Self {
        Self {
            timestamp: Timestamp::UNSET,
            latitude: f64::NAN,
            longitude: f64::NAN,
            altitude: f64::NAN,
            speed: f64::NAN,
            bearing: f64::NAN,
            climb: f64::NAN,
            accuracy: Accuracy::default(),
        }
    }

    /// An otherwise empty sample taken at `timestamp`.
    pub fn at(timestamp: Timestamp) -> Self {
        Self {
            timestamp,
            ..Self::empty()
        }
    }

    pub fn with_coordinates(mut self, latitude: f64, longitude: f64) -> Self {
        if latitude.is_nan() || longitude.is_nan() {
            self.latitude = f64::NAN;
            self.longitude = f64::NAN;
        } else {
            self.latitude = latitude;
            self.longitude = longitude;
        }
        self
    }

    pub fn with_altitude(mut self, altitude: f64) -> Self {
        self.altitude = altitude;
        self
    }

    pub fn with_speed(mut self, speed: f64) -> Self {
        self.speed = speed;
        self
    }

    pub fn with_bearing(mut self, bearing: f64) -> Self {
        self.bearing = bearing;
        self
    }

    pub fn with_climb(mut self, climb: f64) -> Self {
        self.climb = climb;
        self
    }

    pub fn with_accuracy(mut self, accuracy: Accuracy) -> Self {
        self.accuracy = accuracy;
        self
    }

    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    pub fn longitude(&self) -> f64 {
        self.longitude
    }

    /// Whether the sample is younger than `max_age_ms` at `now`.
    /// An unset sample is never fresh.
    pub fn is_fresh(&self, now: Timestamp, max_age_ms: u64) -> bool {
        match self.timestamp.age_at(now) {
            Some(age) => age < max_age_ms.min(i64::MAX as u64) as i64,
            None => false,
        }
    }

    pub fn position_fields(&self) -> PositionFields {
        let mut fields = PositionFields::empty();
        if !self.latitude.is_nan() {
            fields |= PositionFields::LATITUDE;
        }
        if !self.longitude.is_nan() {
            fields |= PositionFields::LONGITUDE;
        }
        if !self.altitude.is_nan() {
            fields |= PositionFields::ALTITUDE;
        }
        fields
    }

    pub fn velocity_fields(&self) -> VelocityFields {
        let mut fields = VelocityFields::empty();
        if !self.speed.is_nan() {
            fields |= VelocityFields::SPEED;
        }
        if !self.bearing.is_nan() {
            fields |= VelocityFields::DIRECTION;
        }
        if !self.climb.is_nan() {
            fields |= VelocityFields::CLIMB;
        }
        fields
    }

    pub fn position_reply(&self) -> PositionReply {
        PositionReply {
            fields: self.position_fields(),
            timestamp: self.timestamp,
            latitude: self.latitude,
            longitude: self.longitude,
            altitude: self.altitude,
            accuracy: self.accuracy,
        }
    }

    pub fn velocity_reply(&self) -> VelocityReply {
        VelocityReply {
            fields: self.velocity_fields(),
            timestamp: self.timestamp,
            speed: self.speed,
            bearing: self.bearing,
            climb: self.climb,
        }
    }

    pub fn reply_for(&self, kind: QueryKind) -> QueryReply {
        match kind {
            QueryKind::Position => QueryReply::Position(self.position_reply()),
            QueryKind::Velocity => QueryReply::Velocity(self.velocity_reply()),
        }
    }
}

impl Default for LocationSample {
    fn default() -> Self {
        Self::empty()
    }
}

bitflags! {
    /// Which position fields carry a value.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    #[serde(transparent)]
    pub struct PositionFields: i32 {
        const LATITUDE  = 1 << 0;
        const LONGITUDE = 1 << 1;
        const ALTITUDE  = 1 << 2;
    }
}

bitflags! {
    /// Which velocity fields carry a value.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    #[serde(transparent)]
    pub struct VelocityFields: i32 {
        const SPEED     = 1 << 0;
        const DIRECTION = 1 << 1;
        const CLIMB     = 1 << 2;
    }
}

/// Reply to `GetPosition`, also the payload of `PositionChanged`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PositionReply {
    pub fields: PositionFields,
    pub timestamp: Timestamp,
    #[serde(with = "absent")]
    pub latitude: f64,
    #[serde(with = "absent")]
    pub longitude: f64,
    #[serde(with = "absent")]
    pub altitude: f64,
    pub accuracy: Accuracy,
}

/// Reply to `GetVelocity`, also the payload of `VelocityChanged`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct VelocityReply {
    pub fields: VelocityFields,
    pub timestamp: Timestamp,
    #[serde(with = "absent")]
    pub speed: f64,
    #[serde(with = "absent")]
    pub bearing: f64,
    #[serde(with = "absent")]
    pub climb: f64,
}

/// Which synchronous query a call is waiting on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum QueryKind {
    Position,
    Velocity,
}

impl QueryKind {
    /// Method name on the bus.
    pub fn member(self) -> &'static str {
        match self {
            QueryKind::Position => "GetPosition",
            QueryKind::Velocity => "GetVelocity",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum QueryReply {
    Position(PositionReply),
    Velocity(VelocityReply),
}

impl QueryReply {
    pub fn kind(&self) -> QueryKind {
        match self {
            QueryReply::Position(_) => QueryKind::Position,
            QueryReply::Velocity(_) => QueryKind::Velocity,
        }
    }
}

/// Provider status as reported by `GetStatus`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[repr(i32)]
pub enum Status {
    Error = 0,
    Unavailable = 1,
    Acquiring = 2,
    Available = 3,
}

/// Static provider description returned by `GetProviderInfo`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderInfo {
    pub name: String,
    pub description: String,
}

impl Default for ProviderInfo {
    fn default() -> Self {
        Self {
            name: "Hybris".to_string(),
            description: "Android GPS provider".to_string(),
        }
    }
}

/// Options passed to `SetOptions`.
pub type Options = HashMap<String, serde_json::Value>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_sample_has_no_fields() {
        let sample = LocationSample::empty();
        assert!(!sample.timestamp.is_set());
        assert!(sample.position_fields().is_empty());
        assert!(sample.velocity_fields().is_empty());
    }

    #[test]
    fn test_coordinates_set_together() {
        let sample = LocationSample::at(Timestamp(0)).with_coordinates(1.0, f64::NAN);
        assert!(sample.latitude().is_nan());
        assert!(sample.longitude().is_nan());

        let sample = LocationSample::at(Timestamp(0)).with_coordinates(1.0, 2.0);
        assert_eq!(
            sample.position_fields(),
            PositionFields::LATITUDE | PositionFields::LONGITUDE
        );
    }

    #[test]
    fn test_lat_lon_only_presence() {
        let sample = LocationSample::at(Timestamp(0)).with_coordinates(1.0, 2.0);

        let position = sample.position_reply();
        assert!(position.fields.contains(PositionFields::LATITUDE));
        assert!(position.fields.contains(PositionFields::LONGITUDE));
        assert!(!position.fields.contains(PositionFields::ALTITUDE));

        let velocity = sample.velocity_reply();
        assert!(velocity.fields.is_empty());
    }

    #[test]
    fn test_freshness_threshold() {
        let sample = LocationSample::at(Timestamp(10_000));
        assert!(sample.is_fresh(Timestamp(10_000), 1000));
        assert!(sample.is_fresh(Timestamp(10_999), 1000));
        assert!(!sample.is_fresh(Timestamp(11_000), 1000));
        assert!(!LocationSample::empty().is_fresh(Timestamp(0), 1000));
    }

    #[test]
    fn test_accuracy_wire_level() {
        let accuracy = Accuracy::new(5.0, 7.5);
        assert_eq!(accuracy.to_wire(), (ACCURACY_LEVEL_DETAILED, 5.0, 7.5));
    }

    #[test]
    fn test_flags_wire_bits() {
        let flags = PositionFields::LATITUDE | PositionFields::ALTITUDE;
        assert_eq!(flags.bits(), 5);
        assert_eq!(VelocityFields::all().bits(), 7);
        assert_eq!(PositionFields::from_bits(8), None);
    }

    #[test]
    fn test_sample_json_keeps_absent_fields() {
        let sample = LocationSample::at(Timestamp(5))
            .with_coordinates(1.0, 2.0)
            .with_speed(3.0);

        let json = serde_json::to_string(&sample).unwrap();
        assert!(json.contains("\"altitude\":null"));

        let restored: LocationSample = serde_json::from_str(&json).unwrap();
        assert_eq!(restored.timestamp, Timestamp(5));
        assert_eq!(restored.latitude(), 1.0);
        assert_eq!(restored.longitude(), 2.0);
        assert!(restored.altitude.is_nan());
        assert!(restored.accuracy.horizontal.is_nan());
        assert_eq!(restored.position_fields(), sample.position_fields());
        assert_eq!(restored.velocity_fields(), sample.velocity_fields());
        assert_eq!(serde_json::to_string(&restored).unwrap(), json);
    }

    #[test]
    fn test_sample_json_enforces_coordinate_pairing() {
        let json = r#"{
            "timestamp": 5,
            "latitude": 1.0,
            "longitude": null,
            "altitude": 7.0,
            "speed": null,
            "bearing": null,
            "climb": null,
            "accuracy": { "horizontal": null, "vertical": null }
        }"#;
        let sample: LocationSample = serde_json::from_str(json).unwrap();

        assert!(sample.latitude().is_nan());
        assert_eq!(sample.position_fields(), PositionFields::ALTITUDE);
    }

    #[test]
    fn test_reply_json_round_trip() {
        let sample = LocationSample::at(Timestamp(9)).with_bearing(45.0);
        let reply = sample.velocity_reply();

        let json = serde_json::to_string(&reply).unwrap();
        let restored: VelocityReply = serde_json::from_str(&json).unwrap();
        assert_eq!(restored.fields, VelocityFields::DIRECTION);
        assert_eq!(restored.bearing, 45.0);
        assert!(restored.speed.is_nan());
    }

    #[test]
    fn test_status_wire_values() {
        assert_eq!(Status::Unavailable as i32, 1);
        assert_eq!(Status::Acquiring as i32, 2);
    }
}
