//! Control-surface contract: categories, knob mapping, and [`ControlPanel`].
//!
//! A control surface (GUI, terminal, MIDI bridge) never touches the
//! [`Graph`](crate::Graph). It works through a [`ControlPanel`], a cloneable
//! snapshot of the graph's node list that shares each Constant node's
//! [`SharedValue`]. Setting a value through the panel is the sole way to
//! change a running graph.
//!
//! # Knob mapping
//!
//! Each [`ControlCategory`] maps a normalized knob position in `[0, 1]` to a
//! node value:
//!
//! | Category | Range | Curve |
//! |----------|-------|-------|
//! | `HFO` | 200 Hz – 10 kHz | logarithmic |
//! | `LFO` | 1 Hz – 200 Hz | linear |
//! | `PER` | 0 % – 100 % (stored 0.0 – 1.0) | linear |
//! | `NDS` | not surfaced | identity |

#[cfg(not(feature = "std"))]
use alloc::{string::String, sync::Arc, vec::Vec};
#[cfg(feature = "std")]
use std::sync::Arc;

use crate::node::{NodeId, NodeKind};
use crate::value::SharedValue;

/// Lowest frequency reachable by an `HFO` knob, in Hz.
pub const HFO_MIN_HZ: f32 = 200.0;
/// Highest frequency reachable by an `HFO` knob, in Hz.
pub const HFO_MAX_HZ: f32 = 10_000.0;
/// Lowest frequency reachable by an `LFO` knob, in Hz.
pub const LFO_MIN_HZ: f32 = 1.0;
/// Highest frequency reachable by an `LFO` knob, in Hz.
pub const LFO_MAX_HZ: f32 = 200.0;

/// UI category of a Constant node.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ControlCategory {
    /// Audio-range frequency control.
    Hfo,
    /// Low-frequency-oscillator rate control.
    Lfo,
    /// Percentage / attenuation control.
    Per,
    /// Not displayed on the control surface.
    Nds,
}

impl ControlCategory {
    /// All categories.
    pub const ALL: [ControlCategory; 4] = [Self::Hfo, Self::Lfo, Self::Per, Self::Nds];

    /// Three-letter tag used in patch files.
    pub fn code(self) -> &'static str {
        match self {
            Self::Hfo => "HFO",
            Self::Lfo => "LFO",
            Self::Per => "PER",
            Self::Nds => "NDS",
        }
    }

    /// Looks up a category by its tag.
    pub fn from_code(code: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.code() == code)
    }

    /// Whether a control surface should show this constant.
    pub fn is_surfaced(self) -> bool {
        self != Self::Nds
    }

    /// Maps a knob position (clamped to `[0, 1]`) to a node value.
    pub fn from_knob(self, position: f32) -> f32 {
        let p = position.clamp(0.0, 1.0);
        match self {
            Self::Hfo => HFO_MIN_HZ * libm::powf(HFO_MAX_HZ / HFO_MIN_HZ, p),
            Self::Lfo => LFO_MIN_HZ + p * (LFO_MAX_HZ - LFO_MIN_HZ),
            Self::Per | Self::Nds => p,
        }
    }

    /// Maps a node value back to a knob position in `[0, 1]`.
    pub fn to_knob(self, value: f32) -> f32 {
        let p = match self {
            Self::Hfo => {
                if value <= HFO_MIN_HZ {
                    0.0
                } else {
                    libm::logf(value / HFO_MIN_HZ) / libm::logf(HFO_MAX_HZ / HFO_MIN_HZ)
                }
            }
            Self::Lfo => (value - LFO_MIN_HZ) / (LFO_MAX_HZ - LFO_MIN_HZ),
            Self::Per | Self::Nds => value,
        };
        p.clamp(0.0, 1.0)
    }

    /// Formats `value` the way a control surface labels it.
    pub fn display(self, value: f32) -> DisplayValue {
        DisplayValue {
            category: self,
            value,
        }
    }
}

impl core::fmt::Display for ControlCategory {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.code())
    }
}

/// A value formatted for its category (`"440.00 Hz"`, `"50.00%"`).
#[derive(Clone, Copy, Debug)]
pub struct DisplayValue {
    category: ControlCategory,
    value: f32,
}

impl core::fmt::Display for DisplayValue {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self.category {
            ControlCategory::Hfo | ControlCategory::Lfo => write!(f, "{:.2} Hz", self.value),
            ControlCategory::Per => write!(f, "{:.2}%", self.value * 100.0),
            ControlCategory::Nds => write!(f, "{:.4}", self.value),
        }
    }
}

/// Errors from [`ControlPanel`] operations.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ControlError {
    /// No node has this index.
    NoSuchNode(usize),
    /// The node exists but is not a Constant.
    NotAConstant(usize),
    /// The constant is tagged `NDS` and has no knob mapping.
    NotSurfaced(usize),
    /// NaN or infinite values are rejected.
    NonFinite(f32),
}

impl core::fmt::Display for ControlError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::NoSuchNode(id) => write!(f, "no node #{id}"),
            Self::NotAConstant(id) => write!(f, "node #{id} is not a constant"),
            Self::NotSurfaced(id) => write!(f, "constant #{id} is not displayed (NDS)"),
            Self::NonFinite(v) => write!(f, "value {v} is not finite"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for ControlError {}

#[derive(Debug)]
struct ConstantControl {
    value: SharedValue,
    initial: f32,
    category: ControlCategory,
    label: String,
}

#[derive(Debug)]
struct Entry {
    kind: NodeKind,
    constant: Option<ConstantControl>,
}

/// Thread-safe view of a graph for a control surface.
///
/// Created by [`Graph::control_panel()`](crate::Graph::control_panel). Clones
/// are cheap and share the same constants.
#[derive(Clone, Debug)]
pub struct ControlPanel {
    entries: Arc<[Entry]>,
}

impl ControlPanel {
    pub(crate) fn from_nodes<'a>(
        nodes: impl Iterator<Item = (NodeKind, Option<&'a crate::node::Constant>)>,
    ) -> Self {
        let entries: Vec<Entry> = nodes
            .map(|(kind, constant)| Entry {
                kind,
                constant: constant.map(|c| ConstantControl {
                    value: c.shared(),
                    initial: c.initial_value(),
                    category: c.category(),
                    label: String::from(c.label()),
                }),
            })
            .collect();
        Self {
            entries: entries.into(),
        }
    }

    /// Number of nodes in the graph.
    pub fn node_count(&self) -> usize {
        self.entries.len()
    }

    /// Kind of node `id`.
    pub fn kind(&self, id: usize) -> Option<NodeKind> {
        self.entries.get(id).map(|e| e.kind)
    }

    /// Category of node `id`, or `None` when it is not a constant.
    pub fn category(&self, id: usize) -> Option<ControlCategory> {
        self.constant(id).ok().map(|c| c.category)
    }

    /// Label of constant `id`.
    pub fn label(&self, id: usize) -> Option<&str> {
        self.constant(id).ok().map(|c| c.label.as_str())
    }

    /// Initial value of constant `id`.
    pub fn initial_value(&self, id: usize) -> Option<f32> {
        self.constant(id).ok().map(|c| c.initial)
    }

    /// Current value of constant `id`.
    pub fn value(&self, id: usize) -> Option<f32> {
        self.constant(id).ok().map(|c| c.value.get())
    }

    /// Sets the current value of constant `id`.
    ///
    /// Visible to the scheduler from its next tick.
    pub fn set_value(&self, id: usize, value: f32) -> Result<(), ControlError> {
        if !value.is_finite() {
            return Err(ControlError::NonFinite(value));
        }
        self.constant(id)?.value.set(value);
        Ok(())
    }

    /// Sets constant `id` from a knob position, returning the applied value.
    pub fn set_knob(&self, id: usize, position: f32) -> Result<f32, ControlError> {
        if !position.is_finite() {
            return Err(ControlError::NonFinite(position));
        }
        let c = self.constant(id)?;
        if !c.category.is_surfaced() {
            return Err(ControlError::NotSurfaced(id));
        }
        let value = c.category.from_knob(position);
        c.value.set(value);
        Ok(value)
    }

    /// Restores constant `id` to its initial value.
    pub fn reset(&self, id: usize) -> Result<(), ControlError> {
        let c = self.constant(id)?;
        c.value.set(c.initial);
        Ok(())
    }

    /// Restores every constant to its initial value.
    pub fn reset_all(&self) {
        for c in self.entries.iter().filter_map(|e| e.constant.as_ref()) {
            c.value.set(c.initial);
        }
    }

    /// IDs of the constants a control surface should display, in graph order.
    pub fn surfaced(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.entries.iter().enumerate().filter_map(|(i, e)| {
            e.constant
                .as_ref()
                .filter(|c| c.category.is_surfaced())
                .map(|_| NodeId::new(i))
        })
    }

    fn constant(&self, id: usize) -> Result<&ConstantControl, ControlError> {
        let entry = self.entries.get(id).ok_or(ControlError::NoSuchNode(id))?;
        entry.constant.as_ref().ok_or(ControlError::NotAConstant(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_codes() {
        for c in ControlCategory::ALL {
            assert_eq!(ControlCategory::from_code(c.code()), Some(c));
        }
        assert_eq!(ControlCategory::from_code("XXX"), None);
        assert!(!ControlCategory::Nds.is_surfaced());
        assert!(ControlCategory::Hfo.is_surfaced());
    }

    #[test]
    fn hfo_knob_is_logarithmic() {
        let c = ControlCategory::Hfo;
        assert!((c.from_knob(0.0) - HFO_MIN_HZ).abs() < 1e-3);
        assert!((c.from_knob(1.0) - HFO_MAX_HZ).abs() < 0.5);
        // geometric midpoint
        let mid = libm::sqrtf(HFO_MIN_HZ * HFO_MAX_HZ);
        assert!((c.from_knob(0.5) - mid).abs() < 0.1);
    }

    #[test]
    fn knob_inverse() {
        for c in [ControlCategory::Hfo, ControlCategory::Lfo, ControlCategory::Per] {
            for p in [0.0, 0.1, 0.25, 0.5, 0.9, 1.0] {
                let back = c.to_knob(c.from_knob(p));
                assert!((back - p).abs() < 1e-4, "{c}: {p} -> {back}");
            }
        }
    }

    #[test]
    fn knob_clamps_position() {
        assert_eq!(ControlCategory::Lfo.from_knob(-1.0), LFO_MIN_HZ);
        assert_eq!(ControlCategory::Lfo.from_knob(3.0), LFO_MAX_HZ);
        assert_eq!(ControlCategory::Hfo.to_knob(50.0), 0.0);
        assert_eq!(ControlCategory::Hfo.to_knob(1e6), 1.0);
    }

    #[test]
    fn display_formats() {
        assert_eq!(ControlCategory::Hfo.display(440.0).to_string(), "440.00 Hz");
        assert_eq!(ControlCategory::Lfo.display(2.5).to_string(), "2.50 Hz");
        assert_eq!(ControlCategory::Per.display(0.5).to_string(), "50.00%");
    }
}
