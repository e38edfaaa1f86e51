// Purpose: the host-facing parameter table and normalized -> plain mapping
// Table order is the persisted-state order; never reorder entries.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Stable parameter identifiers. Discriminants are the host tags.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum ParamId {
    // MIDI controls
    Volume = 1,
    Expression = 2,
    PitchBend = 3,
    ModWheel = 4,
    SustainPedal = 5,
    SostenutoPedal = 6,
    SoftPedal = 7,

    // Voice
    OutVol = 100,
    OscMix = 101,
    IsRandomPhase = 102,
    Inharmonic = 103,
    Subscale = 104,
    InharmKeyFollow = 105,
    AmpEnvA = 106,
    AmpEnvD = 107,
    AmpEnvS = 108,
    AmpEnvR = 109,
    AmpVeloSens = 110,
    VibDelay = 111,
    VibDepth = 112,
    VibSpeed = 113,
    FiltType = 114,
    FiltCutoff = 115,
    FiltReso = 116,
    FiltEnvAmount = 117,
    FiltEnvA = 118,
    FiltEnvD = 119,
    FiltEnvS = 120,
    FiltEnvR = 121,
    FiltKeyFollow = 122,

    // Effects
    EqF = 200,
    EqG = 201,
    EqQ = 202,
    ChorusTime = 203,
    ChorusDepth = 204,
    ChorusSpeed = 205,
    ChorusAmount = 206,
    SampleDivision = 207,
    ReverbTime = 208,
    ReverbMix = 209,
}

/// Static description of one parameter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParamInfo {
    pub id: ParamId,
    pub title: &'static str,
    pub unit: &'static str,
    /// 0 for continuous parameters.
    pub step_count: u32,
    /// Normalized default.
    pub default: f64,
}

/// One normalized value change for a block.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParameterChange {
    pub id: ParamId,
    pub value: f64,
}

impl ParameterChange {
    pub fn new(id: ParamId, value: f64) -> Self {
        Self { id, value }
    }
}

pub const PARAM_COUNT: usize = 40;

const fn info(id: ParamId, title: &'static str, unit: &'static str, default: f64) -> ParamInfo {
    ParamInfo {
        id,
        title,
        unit,
        step_count: 0,
        default,
    }
}

const fn stepped(id: ParamId, title: &'static str, step_count: u32, default: f64) -> ParamInfo {
    ParamInfo {
        id,
        title,
        unit: "",
        step_count,
        default,
    }
}

pub static PARAMETERS: [ParamInfo; PARAM_COUNT] = [
    info(ParamId::Volume, "Volume", "", 1.0),
    info(ParamId::Expression, "Expression", "", 1.0),
    info(ParamId::PitchBend, "PitchBend", "", 0.5),
    info(ParamId::ModWheel, "ModWheel", "", 0.0),
    info(ParamId::SustainPedal, "SustainPedal", "", 0.0),
    info(ParamId::SostenutoPedal, "SostenutoPedal", "", 0.0),
    info(ParamId::SoftPedal, "SoftPedal", "", 0.0),
    info(ParamId::OutVol, "OutVol", "", 0.5),
    info(ParamId::OscMix, "OscMix", "", 0.3),
    stepped(ParamId::IsRandomPhase, "IsRandomPhase", 1, 0.0),
    info(ParamId::Inharmonic, "Inharmonic", "", 0.3),
    info(ParamId::Subscale, "Subscale", "", 0.25),
    info(ParamId::InharmKeyFollow, "InharmKeyFollow", "", 0.25),
    info(ParamId::AmpEnvA, "AmpEnvA", "ms", 0.15),
    info(ParamId::AmpEnvD, "AmpEnvD", "ms", 0.7),
    info(ParamId::AmpEnvS, "AmpEnvS", "", 0.25),
    info(ParamId::AmpEnvR, "AmpEnvR", "ms", 0.25),
    info(ParamId::AmpVeloSens, "AmpVeloSens", "", 0.7),
    info(ParamId::VibDelay, "VibDelay", "ms", 0.0),
    info(ParamId::VibDepth, "VibDepth", "cent", 0.0),
    info(ParamId::VibSpeed, "VibSpeed", "Hz", 0.0),
    stepped(ParamId::FiltType, "FiltType", 5, 0.0),
    info(ParamId::FiltCutoff, "FiltCutoff", "Hz", 1.0),
    info(ParamId::FiltReso, "FiltReso", "", 0.5),
    info(ParamId::FiltEnvAmount, "FiltEnvAmount", "oct", 0.5),
    info(ParamId::FiltEnvA, "FiltEnvA", "ms", 0.0),
    info(ParamId::FiltEnvD, "FiltEnvD", "ms", 0.5),
    info(ParamId::FiltEnvS, "FiltEnvS", "", 1.0),
    info(ParamId::FiltEnvR, "FiltEnvR", "ms", 0.0),
    info(ParamId::FiltKeyFollow, "FiltKeyFollow", "", 1.0),
    info(ParamId::EqF, "EqF", "Hz", 0.5),
    info(ParamId::EqG, "EqG", "dB", 0.5),
    info(ParamId::EqQ, "EqQ", "", 0.5),
    info(ParamId::ChorusTime, "ChorusTime", "ms", 0.75),
    info(ParamId::ChorusDepth, "ChorusDepth", "", 0.125),
    info(ParamId::ChorusSpeed, "ChorusSpeed", "Hz", 0.35),
    info(ParamId::ChorusAmount, "ChorusAmount", "", 0.6),
    stepped(ParamId::SampleDivision, "SampleDivision", 7, 0.0),
    info(ParamId::ReverbTime, "ReverbTime", "s", 0.75),
    info(ParamId::ReverbMix, "ReverbMix", "", 0.15),
];

/// Warped linear map from `[0, 1]` onto `[min, max]`.
///
/// `warp > 1` spends more of the control travel near `min`.
#[inline]
pub fn range_map(normalized: f64, warp: f64, min: f64, max: f64) -> f64 {
    normalized.max(0.0).min(1.0).powf(warp) * (max - min) + min
}

impl ParamId {
    pub const fn tag(self) -> u32 {
        self as u32
    }

    pub fn from_tag(tag: u32) -> Option<Self> {
        PARAMETERS
            .iter()
            .find(|info| info.id.tag() == tag)
            .map(|info| info.id)
    }

    pub fn from_title(title: &str) -> Option<Self> {
        PARAMETERS
            .iter()
            .find(|info| info.title == title)
            .map(|info| info.id)
    }

    /// Position in [`PARAMETERS`] and in persisted state.
    pub const fn index(self) -> usize {
        let tag = self as usize;
        match tag {
            1..=7 => tag - 1,
            100..=122 => tag - 93,
            _ => tag - 170,
        }
    }

    pub fn info(self) -> &'static ParamInfo {
        &PARAMETERS[self.index()]
    }

    /// Map a normalized value to the unit the engine consumes.
    ///
    /// Switches come back as 0.0 or 1.0, stepped parameters as whole numbers.
    pub fn plain_value(self, normalized: f64) -> f64 {
        let v = normalized.max(0.0).min(1.0);
        let switch = |on: bool| if on { 1.0 } else { 0.0 };
        match self {
            ParamId::Volume | ParamId::Expression | ParamId::SoftPedal => v,
            ParamId::PitchBend | ParamId::ModWheel => range_map(v, 1.0, -1.0, 1.0),
            ParamId::SustainPedal | ParamId::SostenutoPedal => switch(v >= 0.99),

            ParamId::OutVol => 0.5 * v * v,
            ParamId::OscMix => v,
            ParamId::IsRandomPhase => switch(v >= 0.5),
            ParamId::Inharmonic => 0.5 * v.powi(5),
            ParamId::Subscale | ParamId::InharmKeyFollow => v,
            ParamId::AmpEnvA => range_map(v, 5.0, 1.0, 5000.0),
            ParamId::AmpEnvD | ParamId::AmpEnvR => range_map(v, 3.0, 1.0, 5000.0),
            ParamId::AmpEnvS | ParamId::AmpVeloSens => v,
            ParamId::VibDelay => range_map(v, 3.0, 0.0, 2000.0),
            ParamId::VibDepth => range_map(v, 3.0, 0.0, 120.0),
            ParamId::VibSpeed => range_map(v, 3.0, 0.1, 20.0),
            ParamId::FiltType => (v * 5.0).round(),
            ParamId::FiltCutoff => range_map(v, 1.0, 6.0, 14.3).exp2(),
            ParamId::FiltReso => range_map(v, 2.0, 0.1, 4.0),
            ParamId::FiltEnvAmount => range_map(v, 1.0, -8.0, 8.0),
            ParamId::FiltEnvA | ParamId::FiltEnvD | ParamId::FiltEnvR => {
                range_map(v, 3.0, 1.0, 5000.0)
            }
            ParamId::FiltEnvS | ParamId::FiltKeyFollow => v,

            ParamId::EqF => range_map(v, 1.0, 20f64.log2(), 18_000f64.log2()).exp2(),
            ParamId::EqG => range_map(v, 1.0, -12.0, 12.0),
            ParamId::EqQ => range_map(v, 3.0, 0.1, 4.0),
            ParamId::ChorusTime => range_map(v, 3.0, 0.5, 20.0),
            ParamId::ChorusDepth => v,
            ParamId::ChorusSpeed => range_map(v, 3.0, 1.0 / 30.0, 20.0),
            ParamId::ChorusAmount => range_map(v, 1.0, 0.0, 0.707),
            ParamId::SampleDivision => range_map(v, 1.0, 1.0, 8.0).round(),
            ParamId::ReverbTime => range_map(v, 3.0, 0.1, 20.0),
            ParamId::ReverbMix => v,
        }
    }
}

/// Human readable plain value for display.
pub fn format_value(id: ParamId, normalized: f64) -> String {
    let plain = id.plain_value(normalized);
    let info = id.info();
    match id {
        ParamId::FiltType => {
            let mode = crate::dsp::FilterMode::from_index(plain as usize);
            let stages = if mode.cascade { "24" } else { "12" };
            format!("{:?} {}", mode.response, stages)
        }
        ParamId::SustainPedal | ParamId::SostenutoPedal | ParamId::IsRandomPhase => {
            let state = if plain > 0.5 { "on" } else { "off" };
            state.to_string()
        }
        ParamId::SampleDivision => format!("1/{}", plain as usize),
        _ if info.unit.is_empty() => format!("{:.3}", plain),
        _ if plain.abs() >= 100.0 => format!("{:.0} {}", plain, info.unit),
        _ => format!("{:.2} {}", plain, info.unit),
    }
}
