use simsweep_core::{ConfigurationRecord, SequenceIndex};

use crate::axes::AxisSet;

/// Lazily enumerates the cartesian product of `axes`.
///
/// Combinations come out in odometer order (the last declared axis varies
/// fastest) and are numbered from [`SequenceIndex::FIRST`]. Calling
/// `expand` again restarts the enumeration from the beginning. An axis with
/// no values makes the product empty; a set with no axes yields exactly one
/// empty record.
pub fn expand(axes: &AxisSet) -> Expansion<'_> {
    let exhausted = axes.iter().any(|axis| axis.values.is_empty());
    Expansion {
        axes,
        cursor: vec![0; axes.len()],
        next_index: SequenceIndex::FIRST,
        exhausted,
    }
}

/// Iterator returned by [`expand`].
#[derive(Debug, Clone)]
pub struct Expansion<'a> {
    axes: &'a AxisSet,
    cursor: Vec<usize>,
    next_index: SequenceIndex,
    exhausted: bool,
}

impl Expansion<'_> {
    fn current(&self) -> ConfigurationRecord {
        self.axes
            .iter()
            .zip(&self.cursor)
            .map(|(axis, &position)| (axis.name.clone(), axis.values[position].clone()))
            .collect()
    }

    // Returns false once every digit has wrapped.
    fn advance(&mut self) -> bool {
        for (digit, axis) in self.cursor.iter_mut().zip(self.axes.iter()).rev() {
            *digit += 1;
            if *digit < axis.values.len() {
                return true;
            }
            *digit = 0;
        }
        false
    }

    fn remaining(&self) -> Option<usize> {
        if self.exhausted {
            return Some(0);
        }
        // Mixed-radix value of the cursor gives the number already consumed.
        let mut consumed: usize = 0;
        let mut total: usize = 1;
        for (digit, axis) in self.cursor.iter().zip(self.axes.iter()) {
            let radix = axis.values.len();
            consumed = consumed.checked_mul(radix)?.checked_add(*digit)?;
            total = total.checked_mul(radix)?;
        }
        Some(total - consumed)
    }
}

impl Iterator for Expansion<'_> {
    type Item = (SequenceIndex, ConfigurationRecord);

    fn next(&mut self) -> Option<Self::Item> {
        if self.exhausted {
            return None;
        }
        let record = self.current();
        let index = self.next_index;
        self.next_index = index.next();
        self.exhausted = !self.advance();
        Some((index, record))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        match self.remaining() {
            Some(left) => (left, Some(left)),
            None => (0, None),
        }
    }
}
