//! Recording context of a dataset: where, when, with what, and in which
//! environment the data was captured.

use once_cell::sync::Lazy;

use crate::registry::{MetadataType, TypeRegistry};
use crate::schema::{
    AttributeDescriptor, EnumChoices, MetadataKind, SchemaVersion, StructSchema, ValueType,
};

/// Countries, valued by their ISO 3166-1 numeric code.
pub static COUNTRY: EnumChoices = EnumChoices::new(
    "Country",
    &[
        ("AUSTRALIA", 36),
        ("BELGIUM", 56),
        ("BRAZIL", 76),
        ("CANADA", 124),
        ("CHINA", 156),
        ("FRANCE", 250),
        ("GERMANY", 276),
        ("INDIA", 356),
        ("ITALY", 380),
        ("JAPAN", 392),
        ("SOUTH_KOREA", 410),
        ("MEXICO", 484),
        ("NETHERLANDS", 528),
        ("POLAND", 616),
        ("SPAIN", 724),
        ("SWITZERLAND", 756),
        ("UNITED_KINGDOM", 826),
        ("UNITED_STATES", 840),
        ("UNSPECIFIED", 0),
    ],
);

pub static DEVICE_MODEL: EnumChoices = EnumChoices::new(
    "DeviceModel",
    &[
        ("SOFTBANK_ROBOTICS__NAO_V4", 0),
        ("SOFTBANK_ROBOTICS__NAO_V5", 1),
        ("SOFTBANK_ROBOTICS__PEPPER_V16", 2),
        ("SOFTBANK_ROBOTICS__PEPPER_V17", 3),
        ("UNSPECIFIED", 4),
    ],
);

pub static ENVIRONMENT_CATEGORY: EnumChoices = EnumChoices::new(
    "EnvironmentCategory",
    &[
        ("INDOOR_BAR", 0),
        ("INDOOR_HOUSE", 1),
        ("INDOOR_OFFICE", 2),
        ("INDOOR_RESTAURANT", 3),
        ("INDOOR_SHOP", 4),
        ("INDOOR_UNSPECIFIED", 99),
        ("OUTDOOR_FOREST", 100),
        ("OUTDOOR_MOUNTAIN", 101),
        ("OUTDOOR_SKY", 102),
        ("OUTDOOR_STREET", 103),
        ("OUTDOOR_UNSPECIFIED", 199),
        ("TRANSPORT_BOAT", 201),
        ("TRANSPORT_BUS", 202),
        ("TRANSPORT_CAR", 203),
        ("TRANSPORT_PLANE", 204),
        ("TRANSPORT_SUBWAY", 205),
        ("TRANSPORT_TRAIN", 206),
        ("TRANSPORT_UNSPECIFIED", 299),
        ("UNSPECIFIED", 9999),
    ],
);

pub static OUTDOOR_LIGHT: EnumChoices = EnumChoices::new(
    "OutdoorLight",
    &[
        ("NO_OUTDOOR_LIGHT", 0),
        ("NIGHT_LIGHT", 1),
        ("STREET_LIGHT_AT_NIGHT", 2),
        ("CLOUDY_DAY_LIGHT", 3),
        ("SUNNY_DAY_LIGHT", 4),
        ("UNSPECIFIED", 99),
    ],
);

pub static INDOOR_LIGHT: EnumChoices = EnumChoices::new(
    "IndoorLight",
    &[
        ("NO_INDOOR_LIGHT", 0),
        ("CANDLE_LIGHT", 1),
        ("DIM_LIGHT", 2),
        ("BRIGHT_LIGHT", 3),
        ("FLASH_LIGHT", 4),
        ("UNSPECIFIED", 99),
    ],
);

fn v0_1() -> SchemaVersion {
    SchemaVersion::new(0, 1)
}

fn non_negative(name: &'static str, description: &'static str) -> AttributeDescriptor {
    AttributeDescriptor::float(name, description).with_float_range(Some(0.0), None)
}

pub static SPATIAL_LOCATION_SCHEMA: Lazy<StructSchema> = Lazy::new(|| {
    StructSchema::builder("SpatialLocation", v0_1(), "Where the recording took place")
        .attribute(AttributeDescriptor::enumeration("country", "Country", &COUNTRY))
        .attribute(AttributeDescriptor::string("city", "City").with_default(""))
        .attribute(
            AttributeDescriptor::float("latitude", "GPS latitude")
                .with_float_range(Some(-90.0), Some(90.0)),
        )
        .attribute(
            AttributeDescriptor::float("longitude", "GPS longitude")
                .with_float_range(Some(-180.0), Some(180.0)),
        )
        .attribute(AttributeDescriptor::vector("tags", "Free location tags", ValueType::String))
        .build()
});

pub static TIME_LOCATION_SCHEMA: Lazy<StructSchema> = Lazy::new(|| {
    StructSchema::builder("TimeLocation", v0_1(), "When the recording took place")
        .attribute(AttributeDescriptor::integer("year", "Year").with_int_range(Some(0), None))
        .attribute(AttributeDescriptor::integer("month", "Month").with_int_range(Some(1), Some(12)))
        .attribute(AttributeDescriptor::integer("day", "Day of month").with_int_range(Some(1), Some(31)))
        .attribute(AttributeDescriptor::integer("hour", "Hour of day").with_int_range(Some(0), Some(23)))
        .attribute(non_negative("starting_timestamp", "Start time, seconds since the Unix epoch"))
        .attribute(non_negative("length", "Duration in seconds"))
        .build()
});

pub static RECORDING_DEVICE_SCHEMA: Lazy<StructSchema> = Lazy::new(|| {
    StructSchema::builder("RecordingDevice", v0_1(), "Device that made the recording")
        .attribute(AttributeDescriptor::enumeration("device_model", "Device model", &DEVICE_MODEL))
        .attribute(AttributeDescriptor::string("device_id", "Device serial or name").with_default(""))
        .attribute(AttributeDescriptor::string("sw_version", "Device software version").with_default(""))
        .build()
});

pub static LIGHT_CONDITIONS_SCHEMA: Lazy<StructSchema> = Lazy::new(|| {
    StructSchema::builder("EnvironmentalLightConditions", v0_1(), "Lighting during the recording")
        .attribute(AttributeDescriptor::enumeration("outdoor_light", "Light coming from outside", &OUTDOOR_LIGHT))
        .attribute(AttributeDescriptor::enumeration("indoor_light", "Artificial light", &INDOOR_LIGHT))
        .attribute(non_negative("ambient_luminosity", "Measured luminosity in lux"))
        .build()
});

pub static SOUND_CONDITIONS_SCHEMA: Lazy<StructSchema> = Lazy::new(|| {
    StructSchema::builder("EnvironmentalSoundConditions", v0_1(), "Acoustics during the recording")
        .attribute(non_negative("ambient_sound_reverberation", "Reverberation time in seconds"))
        .attribute(AttributeDescriptor::float("ambient_sound_level", "Sound level in dB"))
        .build()
});

pub static ENVIRONMENT_SCHEMA: Lazy<StructSchema> = Lazy::new(|| {
    StructSchema::builder("EnvironmentalDescription", v0_1(), "Recording environment")
        .attribute(AttributeDescriptor::enumeration("category", "Environment category", &ENVIRONMENT_CATEGORY))
        .attribute(AttributeDescriptor::structure(
            "light_conditions",
            "Lighting",
            EnvironmentalLightConditions::schema,
        ))
        .attribute(AttributeDescriptor::structure(
            "sound_conditions",
            "Acoustics",
            EnvironmentalSoundConditions::schema,
        ))
        .build()
});

pub static CONTEXT_SCHEMA: Lazy<StructSchema> = Lazy::new(|| {
    StructSchema::builder("Context", v0_1(), "Context in which a dataset was recorded")
        .attribute(AttributeDescriptor::structure(
            "recording_location",
            "Where",
            SpatialLocation::schema,
        ))
        .attribute(AttributeDescriptor::structure(
            "recording_datetime",
            "When",
            TimeLocation::schema,
        ))
        .attribute(AttributeDescriptor::structure(
            "recording_device",
            "With what",
            RecordingDevice::schema,
        ))
        .attribute(AttributeDescriptor::vector(
            "recorder_names",
            "People who made the recording",
            ValueType::String,
        ))
        .attribute(AttributeDescriptor::structure(
            "environmental_description",
            "Surroundings",
            EnvironmentalDescription::schema,
        ))
        .attribute(AttributeDescriptor::vector("tags", "Free tags", ValueType::String))
        .build()
});

macro_rules! sub_struct {
    ($(#[$doc:meta])* $marker:ident => $schema:ident) => {
        $(#[$doc])*
        pub struct $marker;

        impl MetadataKind for $marker {
            fn schema() -> &'static StructSchema {
                &$schema
            }
        }
    };
}

sub_struct!(
    /// Marker for the `SpatialLocation` sub-struct.
    SpatialLocation => SPATIAL_LOCATION_SCHEMA
);
sub_struct!(
    /// Marker for the `TimeLocation` sub-struct.
    TimeLocation => TIME_LOCATION_SCHEMA
);
sub_struct!(
    /// Marker for the `RecordingDevice` sub-struct.
    RecordingDevice => RECORDING_DEVICE_SCHEMA
);
sub_struct!(
    /// Marker for the `EnvironmentalLightConditions` sub-struct.
    EnvironmentalLightConditions => LIGHT_CONDITIONS_SCHEMA
);
sub_struct!(
    /// Marker for the `EnvironmentalSoundConditions` sub-struct.
    EnvironmentalSoundConditions => SOUND_CONDITIONS_SCHEMA
);
sub_struct!(
    /// Marker for the `EnvironmentalDescription` sub-struct.
    EnvironmentalDescription => ENVIRONMENT_SCHEMA
);
sub_struct!(
    /// Marker for the `Context` struct.
    Context => CONTEXT_SCHEMA
);

/// Every schema defined here, nested ones included.
pub fn schemas() -> [&'static StructSchema; 7] {
    [
        Context::schema(),
        SpatialLocation::schema(),
        TimeLocation::schema(),
        RecordingDevice::schema(),
        EnvironmentalDescription::schema(),
        EnvironmentalLightConditions::schema(),
        EnvironmentalSoundConditions::schema(),
    ]
}

pub(crate) fn register(registry: &mut TypeRegistry) {
    registry.register(MetadataType::Context, Context::schema(), false);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::MetadataObject;
    use crate::value::Value;
    use serde_json::json;

    fn nested<'a>(obj: &'a MetadataObject, path: &[&str]) -> &'a Value {
        let (last, parents) = path.split_last().unwrap();
        let mut current = obj;
        for name in parents {
            current = current.get(name).and_then(Value::as_struct).unwrap();
        }
        current.get(last).unwrap()
    }

    #[test]
    fn test_default_context() {
        let ctx = Context::create();
        let unspecified = |path: &[&str]| nested(&ctx, path).as_enum().unwrap().is_unspecified();
        assert!(unspecified(&["recording_location", "country"]));
        assert!(unspecified(&["recording_device", "device_model"]));
        assert!(unspecified(&["environmental_description", "category"]));
        assert!(unspecified(&["environmental_description", "light_conditions", "indoor_light"]));
        assert_eq!(nested(&ctx, &["recording_location", "latitude"]), &Value::Null);
        assert_eq!(nested(&ctx, &["recording_datetime", "year"]), &Value::Null);
        assert_eq!(
            nested(&ctx, &["environmental_description", "sound_conditions", "ambient_sound_level"]),
            &Value::Null
        );
        assert_eq!(nested(&ctx, &["recorder_names"]), &Value::List(vec![]));
    }

    #[test]
    fn test_enum_values_by_name_and_code() {
        let data = json!({
            "recording_location": {"country": "FRANCE", "city": "Paris"},
            "recording_device": {"device_model": 3},
            "environmental_description": {"category": "OUTDOOR_STREET"}
        });
        let ctx = Context::from_dict(data.as_object().unwrap()).unwrap();
        assert_eq!(
            nested(&ctx, &["recording_location", "country"]).as_enum().unwrap().value(),
            250
        );
        assert_eq!(
            nested(&ctx, &["recording_device", "device_model"]).as_enum().unwrap().name(),
            "SOFTBANK_ROBOTICS__PEPPER_V17"
        );
        assert_eq!(
            nested(&ctx, &["environmental_description", "category"]).as_enum().unwrap().value(),
            103
        );
    }

    #[test]
    fn test_rejects_unknown_members_and_out_of_range() {
        let bad_country = json!({"recording_location": {"country": "ATLANTIS"}});
        assert!(Context::from_dict(bad_country.as_object().unwrap()).is_err());

        let bad_month = json!({"recording_datetime": {"month": 13}});
        assert!(Context::from_dict(bad_month.as_object().unwrap()).is_err());

        let bad_latitude = json!({"recording_location": {"latitude": -91}});
        assert!(Context::from_dict(bad_latitude.as_object().unwrap()).is_err());
    }

    #[test]
    fn test_context_round_trip() {
        let data = json!({
            "recording_location": {"country": "JAPAN", "latitude": 35.68, "tags": ["lab"]},
            "recording_datetime": {"year": 2017, "month": 5, "length": 12.5},
            "recorder_names": ["alice", "bob"],
            "environmental_description": {
                "light_conditions": {"outdoor_light": "SUNNY_DAY_LIGHT", "ambient_luminosity": 300}
            },
            "tags": ["demo"]
        });
        let ctx = Context::from_dict(data.as_object().unwrap()).unwrap();
        assert_eq!(Context::from_dict(&ctx.to_dict()).unwrap(), ctx);
    }

    #[test]
    fn test_all_context_schemas_consistent() {
        for schema in schemas() {
            assert!(schema.check_definition().is_ok(), "{}", schema.name());
        }
    }
}
