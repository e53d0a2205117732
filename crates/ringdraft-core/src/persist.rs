//! JSON persistence format.
//!
//! Exported numbers are rounded to four decimals so float noise does not
//! push grid coordinates off the grid across save/load cycles. Imports
//! accept documents written by older versions of the format.

use crate::anchor;
use crate::document::CourseDocument;
use crate::entities::{CoordsMut, Placeable};
use crate::settings::CourseMeta;
use crate::snap::{restore, restore_point};
use serde_json::{Map, Number, Value};
use thiserror::Error;
use uuid::Uuid;

/// Decimal places kept for numbers on export.
pub const EXPORT_DECIMALS: i32 = 4;

/// Old collection names and their current replacements.
const LEGACY_COLLECTIONS: [(&str, &str); 2] = [("deadZones", "zones"), ("step", "steps")];

#[derive(Debug, Error)]
pub enum FormatError {
    #[error("Invalid course JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Course document must be a JSON object")]
    NotAnObject,
}

/// Serialize a document to pretty JSON.
pub fn to_json(doc: &CourseDocument) -> Result<String, FormatError> {
    Ok(serde_json::to_string_pretty(&to_value(doc)?)?)
}

/// Keys of in-progress draws. They belong to the session, not the file.
const DRAW_KEYS: [&str; 3] = ["activeWall", "activeMeasurement", "activeTunnel"];

/// Serialize a document to a JSON value with rounded numbers.
pub fn to_value(doc: &CourseDocument) -> Result<Value, FormatError> {
    let mut value = serde_json::to_value(doc)?;
    if let Some(map) = value.as_object_mut() {
        for key in DRAW_KEYS {
            map.remove(key);
        }
    }
    round_numbers(&mut value);
    Ok(value)
}

/// Parse a document, upgrading older layouts and putting coordinates that
/// drifted through export rounding back on the grid.
pub fn from_json(json: &str) -> Result<CourseDocument, FormatError> {
    from_value(serde_json::from_str(json)?)
}

pub fn from_value(mut value: Value) -> Result<CourseDocument, FormatError> {
    let Some(map) = value.as_object_mut() else {
        return Err(FormatError::NotAnObject);
    };
    upgrade_legacy(map);
    let mut doc: CourseDocument = serde_json::from_value(value)?;
    restore_grid(&mut doc);
    Ok(doc)
}

fn restore_grid(doc: &mut CourseDocument) {
    let ring = &mut doc.meta.ring;
    ring.width = restore(ring.width);
    ring.height = restore(ring.height);
    let (meta, items) = doc.placeables_mut();
    for item in items {
        restore_coords(item, meta);
    }
    // Dock points are derived; rebuild them from the restored positions.
    anchor::recompute_all(doc);
}

fn restore_coords(item: &mut dyn Placeable, meta: &CourseMeta) {
    match item.coords_mut(meta) {
        CoordsMut::Box { pose, .. } => pose.set_origin(restore_point(pose.origin())),
        CoordsMut::Segment(a, b) => {
            *a = restore_point(*a);
            *b = restore_point(*b);
        }
        CoordsMut::Polyline(points) => {
            for p in points {
                *p = restore_point(*p);
            }
        }
    }
    for child in item.children_mut() {
        restore_coords(child, meta);
    }
}

fn round_numbers(value: &mut Value) {
    match value {
        Value::Number(n) if n.is_f64() => {
            if let Some(rounded) = n.as_f64().map(round).and_then(Number::from_f64) {
                *n = rounded;
            }
        }
        Value::Array(items) => items.iter_mut().for_each(round_numbers),
        Value::Object(map) => map.values_mut().for_each(round_numbers),
        _ => {}
    }
}

fn round(v: f64) -> f64 {
    let scale = 10f64.powi(EXPORT_DECIMALS);
    let rounded = (v * scale).round() / scale;
    // Avoid writing "-0.0".
    if rounded == 0.0 { 0.0 } else { rounded }
}

fn upgrade_legacy(map: &mut Map<String, Value>) {
    for (old, new) in LEGACY_COLLECTIONS {
        let Some(Value::Array(mut legacy)) = map.remove(old) else {
            continue;
        };
        log::debug!("Upgrading legacy collection '{old}' into '{new}'");
        match map.get_mut(new) {
            Some(Value::Array(current)) => current.append(&mut legacy),
            _ => {
                map.insert(new.to_string(), Value::Array(legacy));
            }
        }
    }
    // Old fixtures carried no kind; it follows from the collection.
    for (key, kind) in [("zones", "zone"), ("steps", "step")] {
        if let Some(Value::Array(items)) = map.get_mut(key) {
            for item in items.iter_mut().filter_map(Value::as_object_mut) {
                item.entry("kind").or_insert_with(|| Value::from(kind));
            }
        }
    }
    map.entry("id")
        .or_insert_with(|| Value::from(Uuid::new_v4().to_string()));
    map.entry("name").or_insert_with(|| Value::from("Untitled"));
}
