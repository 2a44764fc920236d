//! Parameter Store
//!
//! Holds the current value of every control as an atomic f32 bit pattern,
//! so the real-time thread reads a whole block's snapshot with relaxed
//! atomic loads and no locks.
//!
//! Change notification is a single coalescing flag rather than listener
//! registration: setting any of the four noise-shaping parameters marks the
//! filter's [`RecomputeFlag`], and the control loop drains it on its next
//! tick. Setters are safe from any thread.

use std::sync::atomic::{AtomicU32, Ordering};

use satin_dsp::{BlockParams, ClipCurve, FilterShape, RecomputeFlag};

/// Identifies one control. The discriminant doubles as the storage index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParamId {
    ClipThreshold = 0,
    ClipKnee = 1,
    ClipRatio = 2,
    NoiseGate = 3,
    PreGain = 4,
    PostGain = 5,
    DryWet = 6,
    HpFreq = 7,
    HpQ = 8,
    LpFreq = 9,
    LpQ = 10,
}

pub const PARAM_COUNT: usize = 11;

/// Value mapping for one control.
///
/// `Exponential` maps the normalized [0, 1] position onto
/// `min * (max/min)^t`, which spreads frequency and Q controls evenly in
/// octaves the way a listener perceives them.
#[derive(Debug, Clone, Copy)]
pub enum ParamRange {
    Linear { min: f32, max: f32 },
    Exponential { min: f32, max: f32 },
}

impl ParamRange {
    pub fn min(&self) -> f32 {
        match *self {
            ParamRange::Linear { min, .. } | ParamRange::Exponential { min, .. } => min,
        }
    }

    pub fn max(&self) -> f32 {
        match *self {
            ParamRange::Linear { max, .. } | ParamRange::Exponential { max, .. } => max,
        }
    }

    /// Snap a value into the legal range.
    pub fn snap(&self, value: f32) -> f32 {
        value.clamp(self.min(), self.max())
    }

    /// Map a value in range to its normalized [0, 1] position.
    pub fn normalize(&self, value: f32) -> f32 {
        match *self {
            ParamRange::Linear { min, max } => (value - min) / (max - min),
            ParamRange::Exponential { min, max } => (value / min).ln() / (max / min).ln(),
        }
    }

    /// Map a normalized [0, 1] position back to a value in range.
    pub fn denormalize(&self, t: f32) -> f32 {
        match *self {
            ParamRange::Linear { min, max } => min + t * (max - min),
            ParamRange::Exponential { min, max } => min * (t * (max / min).ln()).exp(),
        }
    }
}

/// Static description of one control
#[derive(Debug, Clone, Copy)]
pub struct ParamSpec {
    pub id: ParamId,
    pub name: &'static str,
    pub range: ParamRange,
    pub default: f32,
}

/// All controls, indexed by `ParamId` discriminant
pub const PARAM_SPECS: [ParamSpec; PARAM_COUNT] = [
    ParamSpec {
        id: ParamId::ClipThreshold,
        name: "Clipping Threshold",
        range: ParamRange::Linear { min: 0.1, max: 1.0 },
        default: 1.0,
    },
    ParamSpec {
        id: ParamId::ClipKnee,
        name: "Clipping Knee",
        range: ParamRange::Linear { min: 0.0, max: 1.0 },
        default: 1.0,
    },
    ParamSpec {
        id: ParamId::ClipRatio,
        name: "Clipping Ratio",
        range: ParamRange::Linear { min: 1.0, max: 40.0 },
        default: 1.0,
    },
    ParamSpec {
        id: ParamId::NoiseGate,
        name: "Noise Threshold",
        range: ParamRange::Linear { min: 0.01, max: 1.0 },
        default: 0.5,
    },
    ParamSpec {
        id: ParamId::PreGain,
        name: "Pre-Gain",
        range: ParamRange::Linear { min: 0.0, max: 5.0 },
        default: 1.0,
    },
    ParamSpec {
        id: ParamId::PostGain,
        name: "Post-Gain",
        range: ParamRange::Linear { min: 0.0, max: 5.0 },
        default: 1.0,
    },
    ParamSpec {
        id: ParamId::DryWet,
        name: "Mix",
        range: ParamRange::Linear { min: 0.0, max: 1.0 },
        default: 1.0,
    },
    ParamSpec {
        id: ParamId::HpFreq,
        name: "Noise Highpass Frequency",
        range: ParamRange::Exponential {
            min: 4.0,
            max: 22000.0,
        },
        default: 4.0,
    },
    ParamSpec {
        id: ParamId::HpQ,
        name: "Noise Highpass Q",
        range: ParamRange::Exponential {
            min: 0.025,
            max: 40.0,
        },
        default: 1.0,
    },
    ParamSpec {
        id: ParamId::LpFreq,
        name: "Noise Lowpass Frequency",
        range: ParamRange::Exponential {
            min: 4.0,
            max: 22000.0,
        },
        default: 22000.0,
    },
    ParamSpec {
        id: ParamId::LpQ,
        name: "Noise Lowpass Q",
        range: ParamRange::Exponential {
            min: 0.025,
            max: 40.0,
        },
        default: 1.0,
    },
];

fn shapes_noise_filter(id: ParamId) -> bool {
    matches!(
        id,
        ParamId::HpFreq | ParamId::HpQ | ParamId::LpFreq | ParamId::LpQ
    )
}

/// Live parameter values.
///
/// Values are stored as f32 bit patterns in `AtomicU32`s (an atomic f32
/// does not exist in std).
pub struct Params {
    values: [AtomicU32; PARAM_COUNT],
    recompute: RecomputeFlag,
}

impl Params {
    /// Create a store at default values, wired to the filter's recompute
    /// flag.
    pub fn new(recompute: RecomputeFlag) -> Self {
        Self {
            values: core::array::from_fn(|i| AtomicU32::new(PARAM_SPECS[i].default.to_bits())),
            recompute,
        }
    }

    /// Static description of a control.
    pub fn spec(id: ParamId) -> &'static ParamSpec {
        &PARAM_SPECS[id as usize]
    }

    /// Current value. Safe from any thread, lock-free.
    #[inline]
    pub fn get(&self, id: ParamId) -> f32 {
        f32::from_bits(self.values[id as usize].load(Ordering::Relaxed))
    }

    /// Snap `value` into the control's range and store it. Safe from any
    /// thread; setting a noise-shaping control schedules a coefficient
    /// recomputation for the next control tick. Returns the snapped value.
    pub fn set(&self, id: ParamId, value: f32) -> f32 {
        let snapped = Self::spec(id).range.snap(value);
        self.values[id as usize].store(snapped.to_bits(), Ordering::Relaxed);
        if shapes_noise_filter(id) {
            self.recompute.mark();
        }
        snapped
    }

    /// Per-block view of the clip and mix controls.
    pub fn snapshot(&self) -> BlockParams {
        BlockParams {
            clip: ClipCurve {
                threshold: self.get(ParamId::ClipThreshold),
                knee: self.get(ParamId::ClipKnee),
                ratio: self.get(ParamId::ClipRatio),
            },
            noise_gate: self.get(ParamId::NoiseGate),
            pre_gain: self.get(ParamId::PreGain),
            post_gain: self.get(ParamId::PostGain),
            dry_wet: self.get(ParamId::DryWet),
        }
    }

    /// Current noise-shaping values.
    pub fn filter_shape(&self) -> FilterShape {
        FilterShape {
            hp_freq: self.get(ParamId::HpFreq),
            hp_q: self.get(ParamId::HpQ),
            lp_freq: self.get(ParamId::LpFreq),
            lp_q: self.get(ParamId::LpQ),
        }
    }
}
