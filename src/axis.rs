//! Optional semantic labels for tensor axes.

use std::fmt;

use smallvec::SmallVec;

use crate::errors::{Error, Result};
use crate::extents::MAX_SHAPE;

/// Role of an axis in an image or batch layout.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum AxisUsage {
    #[default]
    Any,
    Width,
    Height,
    Channel,
    Batch,
}

impl fmt::Display for AxisUsage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AxisUsage::Any => "any",
            AxisUsage::Width => "width",
            AxisUsage::Height => "height",
            AxisUsage::Channel => "channel",
            AxisUsage::Batch => "batch",
        };
        f.write_str(name)
    }
}

/// Label for one axis of a tensor.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Axis {
    pub name: Option<String>,
    pub usage: AxisUsage,
}

impl Axis {
    pub fn new(usage: AxisUsage) -> Axis {
        Axis { name: None, usage }
    }

    pub fn named(name: impl Into<String>, usage: AxisUsage) -> Axis {
        Axis {
            name: Some(name.into()),
            usage,
        }
    }
}

impl From<AxisUsage> for Axis {
    fn from(usage: AxisUsage) -> Axis {
        Axis::new(usage)
    }
}

/// Labels for all axes of a tensor.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Axes {
    axes: SmallVec<[Axis; MAX_SHAPE]>,
}

impl Axes {
    /// Create labels for a tensor with `dims` axes, all of usage `Any`.
    pub fn any(dims: usize) -> Axes {
        Axes {
            axes: (0..dims).map(|_| Axis::default()).collect(),
        }
    }

    pub fn new(axes: impl IntoIterator<Item = Axis>) -> Result<Axes> {
        let axes: SmallVec<_> = axes.into_iter().collect();
        if axes.len() > MAX_SHAPE {
            return Err(Error::out_of_range(format!(
                "{} axes exceeds the maximum of {}",
                axes.len(),
                MAX_SHAPE
            )));
        }
        Ok(Axes { axes })
    }

    /// Create labels from per-axis usages.
    pub fn from_usages(usages: &[AxisUsage]) -> Result<Axes> {
        Axes::new(usages.iter().copied().map(Axis::new))
    }

    pub fn dims(&self) -> usize {
        self.axes.len()
    }

    pub fn get(&self, axis: usize) -> Option<&Axis> {
        self.axes.get(axis)
    }

    pub fn iter(&self) -> impl ExactSizeIterator<Item = &Axis> {
        self.axes.iter()
    }

    /// Return the index of the first axis with a given usage.
    pub fn find(&self, usage: AxisUsage) -> Option<usize> {
        self.axes.iter().position(|axis| axis.usage == usage)
    }

    pub(crate) fn insert(&mut self, index: usize, axis: Axis) {
        self.axes.insert(index, axis);
    }

    pub(crate) fn remove(&mut self, index: usize) {
        self.axes.remove(index);
    }

    pub(crate) fn retain_indices(&mut self, mut keep: impl FnMut(usize) -> bool) {
        let mut index = 0;
        self.axes.retain(|_| {
            let kept = keep(index);
            index += 1;
            kept
        });
    }
}
