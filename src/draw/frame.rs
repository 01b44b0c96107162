//! Frame container: the ordered layers pushed by the backend for one step.

use super::portrayal::PortrayalRecord;
use log::warn;
use serde::de::{self, Deserializer, MapAccess, SeqAccess, Visitor};
use serde::Deserialize;
use serde_json::Value;
use std::fmt;

/// Layer key used for flat records that carry no `layer` field.
pub const DEFAULT_LAYER: &str = "0";

/// An ordered group of portrayals painted as a unit.
#[derive(Debug, Clone, PartialEq)]
pub struct Layer {
    pub key: String,
    /// Records in paint order (first = bottom, last = top)
    pub portrayals: Vec<PortrayalRecord>,
}

/// All layers of one frame, in paint order.
///
/// Layer order is insertion order, never key order: a frame deserialized from
/// `{"2": [...], "0": [...]}` paints layer `"2"` first.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Frame {
    layers: Vec<Layer>,
}

impl Frame {
    /// Creates a new empty frame with no layers.
    pub fn new() -> Self {
        Self { layers: Vec::new() }
    }

    /// Groups flat records by their `layer` field, in order of first appearance.
    ///
    /// This is how a Mesa canvas element assembles its per-step payload.
    pub fn from_records<I>(records: I) -> Self
    where
        I: IntoIterator<Item = PortrayalRecord>,
    {
        let mut frame = Self::new();
        for record in records {
            let key = record
                .layer
                .as_ref()
                .map(|id| id.to_string())
                .unwrap_or_else(|| DEFAULT_LAYER.to_string());
            frame.extend_layer(key, std::iter::once(record));
        }
        frame
    }

    /// Parses a frame from JSON (either a layer map or a flat record list).
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    /// Appends records to the layer named `key`, creating it at the end if new.
    pub fn extend_layer<I>(&mut self, key: impl Into<String>, records: I)
    where
        I: IntoIterator<Item = PortrayalRecord>,
    {
        let key = key.into();
        match self.layers.iter_mut().find(|layer| layer.key == key) {
            Some(layer) => layer.portrayals.extend(records),
            None => self.layers.push(Layer {
                key,
                portrayals: records.into_iter().collect(),
            }),
        }
    }

    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    /// Total number of records across all layers.
    pub fn portrayal_count(&self) -> usize {
        self.layers.iter().map(|layer| layer.portrayals.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.portrayal_count() == 0
    }
}

impl<'de> Deserialize<'de> for Frame {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(FrameVisitor)
    }
}

struct FrameVisitor;

impl<'de> Visitor<'de> for FrameVisitor {
    type Value = Frame;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a map of layer keys to portrayal lists, or a list of portrayals")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Frame, A::Error> {
        let mut frame = Frame::new();
        while let Some((key, value)) = access.next_entry::<String, Value>()? {
            let records = match value {
                Value::Array(items) => decode_records(&key, items),
                Value::Null => Vec::new(),
                other => {
                    warn!("Skipping layer '{}': expected a list, got {}", key, other);
                    continue;
                }
            };
            frame.extend_layer(key, records);
        }
        Ok(frame)
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut access: A) -> Result<Frame, A::Error> {
        let mut items = Vec::with_capacity(access.size_hint().unwrap_or(0));
        while let Some(item) = access.next_element::<Value>()? {
            items.push(item);
        }
        Ok(Frame::from_records(decode_records(DEFAULT_LAYER, items)))
    }

    fn visit_unit<E: de::Error>(self) -> Result<Frame, E> {
        Ok(Frame::new())
    }
}

/// Converts each item on its own; a malformed record is logged and dropped.
fn decode_records(layer: &str, items: Vec<Value>) -> Vec<PortrayalRecord> {
    items
        .into_iter()
        .enumerate()
        .filter_map(|(index, item)| match PortrayalRecord::deserialize(item) {
            Ok(record) => Some(record),
            Err(err) => {
                warn!("Skipping portrayal {} in layer '{}': {}", index, layer, err);
                None
            }
        })
        .collect()
}
