//! Weighted lists with a weighted-random draw.

use rand::Rng;

use crate::error::{DecodeError, DecodeErrorKind};
use crate::types::{Node, SchemaType, node_kind};

/// An ordered list of `(value, integer weight)` pairs.
///
/// Zero-weight entries are legal: they survive round trips but are never
/// drawn.
#[derive(Clone, Debug, PartialEq)]
pub struct WeightedList<T> {
    entries: Vec<(T, u32)>,
    total:   u64,
}

impl<T> Default for WeightedList<T> {
    fn default() -> Self {
        Self { entries: Vec::new(), total: 0 }
    }
}

impl<T> WeightedList<T> {
    pub fn new(entries: Vec<(T, u32)>) -> Self {
        let total = entries.iter().map(|(_, w)| u64::from(*w)).sum();
        Self { entries, total }
    }

    pub fn push(&mut self, value: T, weight: u32) {
        self.total += u64::from(weight);
        self.entries.push((value, weight));
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[(T, u32)] {
        &self.entries
    }

    pub fn total_weight(&self) -> u64 {
        self.total
    }

    /// Draw one element with probability proportional to its weight.
    ///
    /// Returns `None` if the list is empty or every weight is zero.
    pub fn draw<R: Rng>(&self, rng: &mut R) -> Option<&T> {
        if self.total == 0 {
            return None;
        }
        let mut roll = rng.gen_range(0..self.total);
        for (value, weight) in &self.entries {
            let weight = u64::from(*weight);
            if roll < weight {
                return Some(value);
            }
            roll -= weight;
        }
        // Unreachable while `total` equals the sum of weights.
        None
    }
}

/// Schema type for a [`WeightedList`] of `elem` values.
///
/// Text format: an array whose elements are either `{"value": v, "weight": n}`
/// objects or bare values (weight 1).  Encoding always emits the object form.
pub fn weighted_list<T: Clone + 'static>(elem: SchemaType<T>) -> SchemaType<WeightedList<T>> {
    let name: String = format!("weighted<{}>", elem.name());
    let e1 = elem.clone();
    let e2 = elem.clone();
    let e3 = elem.clone();
    let e4 = elem;

    SchemaType::new(
        name,
        move |wl: &WeightedList<T>| {
            Node::Array(
                wl.entries()
                    .iter()
                    .map(|(v, w)| {
                        let mut obj = serde_json::Map::new();
                        obj.insert("value".to_owned(), e1.to_text(v));
                        obj.insert("weight".to_owned(), Node::from(*w));
                        Node::Object(obj)
                    })
                    .collect(),
            )
        },
        move |node| {
            let items = node.as_array().ok_or_else(|| {
                DecodeError::reading(DecodeErrorKind::WrongType {
                    expected: "an array",
                    found:    node_kind(node),
                })
            })?;
            let mut out = WeightedList::default();
            for (i, item) in items.iter().enumerate() {
                let (value_node, weight) = match item.as_object() {
                    Some(obj) if obj.contains_key("value") => {
                        let weight = match obj.get("weight") {
                            Some(w) => w.as_u64().and_then(|w| u32::try_from(w).ok()).ok_or_else(
                                || {
                                    DecodeError::reading(DecodeErrorKind::Message(
                                        "weight must be a non-negative integer".to_owned(),
                                    ))
                                    .at("weight")
                                    .at_index(i)
                                },
                            )?,
                            None => 1,
                        };
                        (&obj["value"], weight)
                    }
                    // Bare value shorthand, weight 1.
                    _ => (item, 1),
                };
                let value = e2.from_text(value_node).map_err(|err| err.at_index(i))?;
                out.push(value, weight);
            }
            Ok(out)
        },
        move |wl, w| {
            w.put_len(wl.len());
            for (value, weight) in wl.entries() {
                // Weights travel as their raw u32 bit pattern.
                w.put_i32(*weight as i32);
                e3.to_bytes(value, w);
            }
        },
        move |r| {
            let len = r.get_len()?;
            let mut out = WeightedList::default();
            for i in 0..len {
                let weight = r.get_i32()? as u32;
                let value = e4.from_bytes(r).map_err(|err| err.at_index(i))?;
                out.push(value, weight);
            }
            Ok(out)
        },
    )
}
