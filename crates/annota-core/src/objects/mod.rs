//! Catalog of concrete metadata structs.

pub mod context;
pub mod face;
pub mod object;
pub mod person;
pub mod property;
pub mod speech;
pub mod timestamp;
pub mod transform;

pub use context::{
    Context, EnvironmentalDescription, EnvironmentalLightConditions, EnvironmentalSoundConditions,
    RecordingDevice, SpatialLocation, TimeLocation,
};
pub use face::{Face, FacialPart};
pub use object::Object;
pub use person::Person;
pub use property::Property;
pub use speech::Speech;
pub use timestamp::TimeStamp;
pub use transform::{Rotation, Transform, Translation};
