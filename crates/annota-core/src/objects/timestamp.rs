//! Acquisition time of a data item.

use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;

use crate::error::Result;
use crate::registry::{MetadataType, TypeRegistry};
use crate::schema::{AttributeDescriptor, MetadataKind, MetadataObject, SchemaVersion, StructSchema};

pub const NANOSECONDS_PER_SECOND: i64 = 1_000_000_000;

pub static TIMESTAMP_SCHEMA: Lazy<StructSchema> = Lazy::new(|| {
    StructSchema::builder("TimeStamp", SchemaVersion::new(0, 1), "Time at which data was recorded")
        .attribute(AttributeDescriptor::integer("seconds", "Seconds since the Unix epoch").with_default(0))
        .attribute(
            AttributeDescriptor::integer("nanoseconds", "Sub-second part")
                .with_int_range(Some(0), Some(NANOSECONDS_PER_SECOND))
                .with_default(0),
        )
        .build()
});

/// Marker for the `TimeStamp` struct.
pub struct TimeStamp;

impl MetadataKind for TimeStamp {
    fn schema() -> &'static StructSchema {
        &TIMESTAMP_SCHEMA
    }
}

impl TimeStamp {
    pub fn at(seconds: i64, nanoseconds: i64) -> Result<MetadataObject> {
        Self::from_values(vec![seconds.into(), nanoseconds.into()])
    }

    pub fn from_datetime(at: DateTime<Utc>) -> Result<MetadataObject> {
        Self::at(at.timestamp(), i64::from(at.timestamp_subsec_nanos()))
    }

    pub fn now() -> Result<MetadataObject> {
        Self::from_datetime(Utc::now())
    }

    /// Convert back to a UTC datetime; `None` for a non-TimeStamp object or a
    /// value out of chrono's range.
    pub fn to_datetime(object: &MetadataObject) -> Option<DateTime<Utc>> {
        if !Self::is_instance(object) {
            return None;
        }
        let seconds = object.get("seconds")?.as_int()?;
        let nanoseconds = object.get("nanoseconds")?.as_int()?;
        DateTime::from_timestamp(seconds, u32::try_from(nanoseconds).ok()?)
    }
}

pub(crate) fn register(registry: &mut TypeRegistry) {
    registry.register(MetadataType::TimeStamp, TimeStamp::schema(), false);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Value;
    use chrono::TimeZone;

    #[test]
    fn test_nanoseconds_range() {
        assert!(TimeStamp::at(1, NANOSECONDS_PER_SECOND).is_ok());
        assert!(TimeStamp::at(1, NANOSECONDS_PER_SECOND + 1).is_err());
        assert!(TimeStamp::at(1, -1).is_err());
    }

    #[test]
    fn test_datetime_conversion() {
        let at = Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap();
        let ts = TimeStamp::from_datetime(at).unwrap();
        assert_eq!(ts.get("seconds"), Some(&Value::Int(at.timestamp())));
        assert_eq!(TimeStamp::to_datetime(&ts), Some(at));
    }

    #[test]
    fn test_now_is_after_epoch() {
        let ts = TimeStamp::now().unwrap();
        assert!(ts.get("seconds").and_then(Value::as_int).unwrap() > 0);
    }
}
