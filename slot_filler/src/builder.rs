pub use crate::config::*;

use std::ops::RangeInclusive;

/// A builder for layout tables.
///
/// A new document is added by describing its slots, not by writing code for it.
///
/// ```
/// use slot_filler::builder::LayoutBuilder;
/// use slot_filler::{Attribute, Labels};
/// # use slot_filler::FillError;
///
/// let layout = LayoutBuilder::new(
///     "first_aid",
///     Labels::new(["Name", "Address", "City", "Postal", "Email", "Phone", "Day", "Month", "Year"]),
/// )
/// .numbered(" ", 1..=10)
/// .literal(9, Attribute::Name, "10")
/// .build()?;
///
/// assert_eq!(layout.capacity(), 10);
/// assert_eq!(slot_filler::resolve(&layout, 0, Attribute::City)?, vec!["City 1".to_string()]);
/// # Ok::<(), FillError>(())
/// ```
pub struct LayoutBuilder {
    _name: String,
    _labels: Labels,
    _year_format: YearFormat,
    _slots: Vec<SlotSpec>,
    _overrides: Vec<(usize, Attribute, Override)>,
}

impl LayoutBuilder {
    pub fn new(name: &str, labels: Labels) -> LayoutBuilder {
        LayoutBuilder {
            _name: name.to_string(),
            _labels: labels,
            _year_format: YearFormat::default(),
            _slots: Vec::new(),
            _overrides: Vec::new(),
        }
    }

    pub fn year_format(mut self, year_format: YearFormat) -> LayoutBuilder {
        self._year_format = year_format;
        self
    }

    /// Adds the next slot. Its field names are `prefix + label + suffix`.
    pub fn slot(mut self, prefix: &str, suffix: &str) -> LayoutBuilder {
        self._slots.push(SlotSpec::new(prefix, suffix));
        self
    }

    /// Adds one slot per number, with the "Label N" convention.
    /// `separator` goes between the label and the number.
    pub fn numbered(mut self, separator: &str, numbers: RangeInclusive<usize>) -> LayoutBuilder {
        for n in numbers {
            self._slots
                .push(SlotSpec::new("", format!("{}{}", separator, n).as_str()));
        }
        self
    }

    /// The attribute of the slot at `position` (zero-based) goes to a single, fixed field.
    pub fn literal(mut self, position: usize, attribute: Attribute, target: &str) -> LayoutBuilder {
        self._overrides.push((
            position,
            attribute,
            Override::Literal(target.to_string()),
        ));
        self
    }

    /// The attribute of the slot at `position` (zero-based) is written to all the targets.
    pub fn fan_out(
        mut self,
        position: usize,
        attribute: Attribute,
        targets: &[&str],
    ) -> LayoutBuilder {
        self._overrides.push((
            position,
            attribute,
            Override::FanOut(targets.iter().map(|s| s.to_string()).collect()),
        ));
        self
    }

    pub fn build(self) -> Result<SlotLayout, FillError> {
        let mut slots = self._slots;
        let capacity = slots.len();
        for (position, attribute, o) in self._overrides {
            let slot = slots
                .get_mut(position)
                .ok_or(FillError::PositionOutOfRange { position, capacity })?;
            slot.overrides.insert(attribute, o);
        }
        Ok(SlotLayout {
            name: self._name,
            labels: self._labels,
            slots,
            year_format: self._year_format,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels() -> Labels {
        Labels::new(["N", "A", "C", "P", "E", "T", "D", "M", "Y"])
    }

    #[test]
    fn override_on_missing_slot() {
        let res = LayoutBuilder::new("x", labels())
            .slot("", "1")
            .literal(3, Attribute::Name, "4")
            .build();
        assert_eq!(
            res,
            Err(FillError::PositionOutOfRange {
                position: 3,
                capacity: 1
            })
        );
    }

    #[test]
    fn numbered_slots() {
        let layout = LayoutBuilder::new("x", labels())
            .numbered(" ", 1..=3)
            .year_format(YearFormat::FourDigit)
            .build()
            .unwrap();
        assert_eq!(layout.capacity(), 3);
        assert_eq!(layout.slots[2], SlotSpec::new("", " 3"));
        assert_eq!(layout.year_format, YearFormat::FourDigit);
    }

    #[test]
    fn later_override_wins() {
        let layout = LayoutBuilder::new("x", labels())
            .slot("", "1")
            .literal(0, Attribute::Name, "first")
            .literal(0, Attribute::Name, "second")
            .build()
            .unwrap();
        assert_eq!(
            layout.slots[0].overrides.get(&Attribute::Name),
            Some(&Override::Literal("second".to_string()))
        );
    }
}
