//! Location validators per data type.
//!
//! Images take a pixel rectangle `[[x0, y0], [x1, y1]]`, audio a sample
//! range `[first, last]`. `None` (whole item) is always accepted.

use annota_core::Location;
use serde_json::Value as JsonValue;

use crate::datatype::DataType;

pub type LocationValidator = fn(Option<&Location>) -> bool;

fn is_int(value: &JsonValue) -> bool {
    value.is_i64() || value.is_u64()
}

fn is_int_list(value: &JsonValue, len: usize) -> bool {
    value
        .as_array()
        .is_some_and(|items| items.len() == len && items.iter().all(is_int))
}

pub fn image_location(location: Option<&Location>) -> bool {
    match location {
        None => true,
        Some(value) => value
            .as_array()
            .is_some_and(|corners| corners.len() == 2 && corners.iter().all(|c| is_int_list(c, 2))),
    }
}

pub fn audio_location(location: Option<&Location>) -> bool {
    match location {
        None => true,
        Some(value) => is_int_list(value, 2),
    }
}

/// Only whole-item annotations.
pub fn whole_item_location(location: Option<&Location>) -> bool {
    location.is_none()
}

pub fn validator_for(data_type: DataType) -> LocationValidator {
    if data_type.is_image() {
        image_location
    } else {
        audio_location
    }
}
