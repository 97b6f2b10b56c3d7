/// One enumerable parameter axis: a name and the number of discrete values it takes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Axis {
    /// Axis (argument) name.
    pub name: String,
    /// Number of values.
    pub size: usize,
}

impl Axis {
    /// Create an axis.
    pub fn new(name: impl Into<String>, size: usize) -> Self {
        Self {
            name: name.into(),
            size,
        }
    }
}

/// One point of a [`ParameterSpace`]: a value index per axis, in axis order.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Combination {
    indices: Vec<usize>,
}

impl Combination {
    /// Value indices, one per axis.
    pub fn indices(&self) -> &[usize] {
        &self.indices
    }
}

/// Cross product of enumerable axes.
///
/// Enumeration follows odometer order: the all-zero combination comes first and the last axis
/// varies fastest. Every call to [`ParameterSpace::iter`] replays the space from the start.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ParameterSpace {
    axes: Vec<Axis>,
}

impl ParameterSpace {
    /// Build a space over `axes`, most significant first.
    pub fn new(axes: Vec<Axis>) -> Self {
        Self { axes }
    }

    /// Append an axis; it becomes the fastest-varying one.
    pub fn push(&mut self, axis: Axis) {
        self.axes.push(axis);
    }

    /// Axes in enumeration order.
    pub fn axes(&self) -> &[Axis] {
        &self.axes
    }

    /// Number of combinations (product of axis sizes; `1` for a space without axes).
    ///
    /// Saturates at `usize::MAX`; see [`ParameterSpace::checked_len`].
    pub fn len(&self) -> usize {
        self.checked_len().unwrap_or(usize::MAX)
    }

    /// Number of combinations, or `None` when the product does not fit in `usize`.
    pub fn checked_len(&self) -> Option<usize> {
        if self.empty_axis().is_some() {
            return Some(0);
        }
        self.axes
            .iter()
            .try_fold(1usize, |acc, a| acc.checked_mul(a.size))
    }

    /// Return `true` when some axis has no values.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// First axis with zero values, if any.
    pub fn empty_axis(&self) -> Option<&Axis> {
        self.axes.iter().find(|a| a.size == 0)
    }

    /// Enumerate every combination exactly once.
    pub fn iter(&self) -> Combinations<'_> {
        let next = if self.is_empty() {
            None
        } else {
            Some(vec![0; self.axes.len()])
        };
        Combinations {
            axes: &self.axes,
            next,
            remaining: self.len(),
        }
    }
}

impl<'a> IntoIterator for &'a ParameterSpace {
    type Item = Combination;
    type IntoIter = Combinations<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Sequential iterator over a [`ParameterSpace`].
#[derive(Clone, Debug)]
pub struct Combinations<'a> {
    axes: &'a [Axis],
    next: Option<Vec<usize>>,
    remaining: usize,
}

impl Iterator for Combinations<'_> {
    type Item = Combination;

    fn next(&mut self) -> Option<Combination> {
        let current = self.next.take()?;
        let mut successor = current.clone();
        if advance(&mut successor, self.axes) {
            self.next = Some(successor);
        }
        self.remaining = self.remaining.saturating_sub(1);
        Some(Combination { indices: current })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl ExactSizeIterator for Combinations<'_> {}

// Mixed-radix increment; returns false once the most significant digit overflows.
fn advance(idxs: &mut [usize], axes: &[Axis]) -> bool {
    for pos in (0..idxs.len()).rev() {
        idxs[pos] += 1;
        if idxs[pos] < axes[pos].size {
            return true;
        }
        idxs[pos] = 0;
    }
    false
}

#[cfg(test)]
#[path = "../../tests/unit/sweep/space.rs"]
mod tests;
