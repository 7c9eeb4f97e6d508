//! Tagged value state of one bucket at one instant.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::attribute::{Attribute, AttributeKind, Denomination, ValueLayout};
use crate::errors::{Error, Result};

/// A single attribute value, tagged with its kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Value {
    Money(Decimal),
    Ratio(Decimal),
    Rate(Decimal),
    Date(NaiveDate),
    Units(Decimal),
}

impl Value {
    pub fn kind(&self) -> AttributeKind {
        match self {
            Value::Money(_) => AttributeKind::Money,
            Value::Ratio(_) => AttributeKind::Ratio,
            Value::Rate(_) => AttributeKind::Rate,
            Value::Date(_) => AttributeKind::Date,
            Value::Units(_) => AttributeKind::Units,
        }
    }

    /// The numeric payload, `None` for dates.
    pub fn as_decimal(&self) -> Option<Decimal> {
        match self {
            Value::Money(d) | Value::Ratio(d) | Value::Rate(d) | Value::Units(d) => Some(*d),
            Value::Date(_) => None,
        }
    }

    /// Builds a numeric value of the given kind. Dates have no numeric form.
    pub fn numeric(kind: AttributeKind, amount: Decimal) -> Option<Value> {
        match kind {
            AttributeKind::Money => Some(Value::Money(amount)),
            AttributeKind::Ratio => Some(Value::Ratio(amount)),
            AttributeKind::Rate => Some(Value::Rate(amount)),
            AttributeKind::Units => Some(Value::Units(amount)),
            AttributeKind::Date => None,
        }
    }
}

/// Mapping attribute -> value for one bucket at one instant.
///
/// The attribute set is closed by the [`ValueLayout`]. A `Values` handed out
/// as part of a snapshot is never mutated again; arithmetic always runs on a
/// fresh copy obtained through [`Values::full_snapshot`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Values {
    layout: ValueLayout,
    slots: BTreeMap<Attribute, Value>,
}

impl Values {
    /// Creates zeroed values for a layout. Date attributes start absent.
    pub fn new(layout: ValueLayout) -> Self {
        let slots = layout
            .attributes()
            .iter()
            .filter_map(|attr| Value::numeric(attr.kind(), Decimal::ZERO).map(|v| (*attr, v)))
            .collect();
        Values { layout, slots }
    }

    pub fn layout(&self) -> ValueLayout {
        self.layout
    }

    pub fn get(&self, attribute: Attribute) -> Option<Value> {
        self.slots.get(&attribute).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Attribute, Value)> + '_ {
        self.slots.iter().map(|(a, v)| (*a, *v))
    }

    /// Replaces the value of an attribute.
    pub fn set(&mut self, attribute: Attribute, value: Value) -> Result<()> {
        if !self.layout.contains(attribute) {
            return Err(Error::UnsupportedAttribute {
                attribute,
                layout: self.layout,
            });
        }
        if value.kind() != attribute.kind() {
            return Err(Error::InvalidAttribute {
                attribute,
                expected: attribute.kind(),
                found: value.kind(),
            });
        }
        self.slots.insert(attribute, value);
        Ok(())
    }

    pub fn set_money(&mut self, attribute: Attribute, amount: Decimal) -> Result<()> {
        self.set(attribute, Value::Money(amount))
    }

    pub fn set_units(&mut self, attribute: Attribute, amount: Decimal) -> Result<()> {
        self.set(attribute, Value::Units(amount))
    }

    pub fn set_rate(&mut self, attribute: Attribute, rate: Decimal) -> Result<()> {
        self.set(attribute, Value::Rate(rate))
    }

    pub fn set_ratio(&mut self, attribute: Attribute, ratio: Decimal) -> Result<()> {
        self.set(attribute, Value::Ratio(ratio))
    }

    pub fn set_date(&mut self, attribute: Attribute, date: NaiveDate) -> Result<()> {
        self.set(attribute, Value::Date(date))
    }

    /// Adds `delta` to a money attribute, treating an absent slot as zero.
    pub fn add_money(&mut self, attribute: Attribute, delta: Decimal) -> Result<()> {
        let current = self.money_or_zero(attribute)?;
        self.set_money(attribute, current + delta)
    }

    pub fn add_units(&mut self, attribute: Attribute, delta: Decimal) -> Result<()> {
        let current = self.units(attribute)?.unwrap_or_default();
        self.set_units(attribute, current + delta)
    }

    fn typed(&self, attribute: Attribute, requested: AttributeKind) -> Result<Option<Decimal>> {
        if attribute.kind() != requested {
            return Err(Error::InvalidAttribute {
                attribute,
                expected: attribute.kind(),
                found: requested,
            });
        }
        Ok(self.get(attribute).and_then(|v| v.as_decimal()))
    }

    pub fn money(&self, attribute: Attribute) -> Result<Option<Decimal>> {
        self.typed(attribute, AttributeKind::Money)
    }

    pub fn money_or_zero(&self, attribute: Attribute) -> Result<Decimal> {
        Ok(self.money(attribute)?.unwrap_or_default())
    }

    pub fn units(&self, attribute: Attribute) -> Result<Option<Decimal>> {
        self.typed(attribute, AttributeKind::Units)
    }

    pub fn rate(&self, attribute: Attribute) -> Result<Option<Decimal>> {
        self.typed(attribute, AttributeKind::Rate)
    }

    pub fn ratio(&self, attribute: Attribute) -> Result<Option<Decimal>> {
        self.typed(attribute, AttributeKind::Ratio)
    }

    pub fn date(&self, attribute: Attribute) -> Result<Option<NaiveDate>> {
        if attribute.kind() != AttributeKind::Date {
            return Err(Error::InvalidAttribute {
                attribute,
                expected: attribute.kind(),
                found: AttributeKind::Date,
            });
        }
        Ok(match self.get(attribute) {
            Some(Value::Date(d)) => Some(d),
            _ => None,
        })
    }

    /// New instance holding only counter attributes.
    ///
    /// Counters that do not carry forward restart at zero. Instantaneous
    /// attributes are left out entirely.
    pub fn counter_snapshot(&self) -> Values {
        let slots = self
            .slots
            .iter()
            .filter(|(attr, _)| attr.is_counter())
            .map(|(attr, value)| {
                if attr.carries_forward() {
                    (*attr, *value)
                } else {
                    let zero = Value::numeric(attr.kind(), Decimal::ZERO).unwrap_or(*value);
                    (*attr, zero)
                }
            })
            .collect();
        Values {
            layout: self.layout,
            slots,
        }
    }

    /// Independent deep copy of every attribute.
    pub fn full_snapshot(&self) -> Values {
        self.clone()
    }

    /// `self[attr] - other[attr]` for money and units counters.
    ///
    /// Instantaneous attributes and other kinds have no meaningful delta and
    /// return `None`. An attribute absent from `other` counts as zero.
    pub fn delta(&self, attribute: Attribute, other: &Values) -> Option<Decimal> {
        if !attribute.is_counter() {
            return None;
        }
        match attribute.kind() {
            AttributeKind::Money | AttributeKind::Units => {
                let current = self.get(attribute)?.as_decimal()?;
                let previous = other
                    .get(attribute)
                    .and_then(|v| v.as_decimal())
                    .unwrap_or_default();
                Some(current - previous)
            }
            _ => None,
        }
    }

    /// Subtracts `base`'s counter values in place.
    ///
    /// Only used when materialising a windowed bucket, where counters become
    /// relative to the state the window opens from.
    pub fn adjust_to_base(&mut self, base: &Values) {
        for (attr, value) in self.slots.iter_mut() {
            if !attr.is_counter() {
                continue;
            }
            let offset = base
                .get(*attr)
                .and_then(|v| v.as_decimal())
                .unwrap_or_default();
            if let Some(current) = value.as_decimal() {
                if let Some(adjusted) = Value::numeric(attr.kind(), current - offset) {
                    *value = adjusted;
                }
            }
        }
    }

    /// Zeroes every counter attribute in place.
    pub fn reset_counters(&mut self) {
        for (attr, value) in self.slots.iter_mut() {
            if attr.is_counter() {
                if let Some(zero) = Value::numeric(attr.kind(), Decimal::ZERO) {
                    *value = zero;
                }
            }
        }
    }

    /// Adds every base-currency money attribute of `other` that this layout
    /// also holds. Local-currency amounts are never summed across buckets.
    pub fn add(&mut self, other: &Values) {
        for (attr, value) in self.slots.iter_mut() {
            if attr.kind() != AttributeKind::Money || attr.denomination() != Denomination::Base {
                continue;
            }
            if let (Some(Value::Money(theirs)), Value::Money(ours)) = (other.get(*attr), *value) {
                *value = Value::Money(ours + theirs);
            }
        }
    }
}
