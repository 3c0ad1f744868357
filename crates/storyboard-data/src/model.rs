//! Plain data types that make up a parsed storyboard script.
//!
//! Nothing in this module performs interpolation or keyframe lowering — that
//! logic lives in `storyboard-core`, which consumes these types. This module
//! only describes *what was written in the script*.

use glam::DVec2;
use serde::{Deserialize, Serialize};

/// The compositing layer a sprite is drawn on, back to front.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Layer {
    Background,
    Fail,
    Pass,
    Foreground,
    Overlay,
}

impl Default for Layer {
    fn default() -> Self {
        Layer::Foreground
    }
}

impl Layer {
    /// Parses a script token, falling back to the authoring-tool default (`Foreground`)
    /// on an unrecognized name — see error kind 4 in the parser's design.
    pub fn parse(token: &str) -> Self {
        match token {
            "Background" => Layer::Background,
            "Fail" => Layer::Fail,
            "Pass" => Layer::Pass,
            "Foreground" => Layer::Foreground,
            "Overlay" => Layer::Overlay,
            _ => Layer::default(),
        }
    }
}

/// One of the nine compass-point anchor points used to position a sprite's image.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Origin {
    TopLeft,
    TopCentre,
    TopRight,
    CentreLeft,
    Centre,
    CentreRight,
    BottomLeft,
    BottomCentre,
    BottomRight,
}

impl Default for Origin {
    fn default() -> Self {
        Origin::Centre
    }
}

impl Origin {
    pub fn parse(token: &str) -> Self {
        match token {
            "TopLeft" => Origin::TopLeft,
            "TopCentre" => Origin::TopCentre,
            "TopRight" => Origin::TopRight,
            "CentreLeft" => Origin::CentreLeft,
            "Centre" => Origin::Centre,
            "CentreRight" => Origin::CentreRight,
            "BottomLeft" => Origin::BottomLeft,
            "BottomCentre" => Origin::BottomCentre,
            "BottomRight" => Origin::BottomRight,
            _ => Origin::default(),
        }
    }
}

/// How an `Animation` sprite's frame index advances once it runs past its
/// declared frame count.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum LoopType {
    LoopForever,
    LoopOnce,
    Custom,
}

impl Default for LoopType {
    fn default() -> Self {
        LoopType::LoopForever
    }
}

impl LoopType {
    pub fn parse(token: &str) -> Self {
        match token {
            "LoopForever" => LoopType::LoopForever,
            "LoopOnce" => LoopType::LoopOnce,
            "Custom" => LoopType::Custom,
            _ => LoopType::default(),
        }
    }
}

/// The boolean effect toggled on a `Parameter` event.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ParameterType {
    FlipH,
    FlipV,
    Additive,
}

impl Default for ParameterType {
    fn default() -> Self {
        ParameterType::Additive
    }
}

impl ParameterType {
    pub fn parse(token: &str) -> Self {
        match token {
            "H" => ParameterType::FlipH,
            "V" => ParameterType::FlipV,
            "A" => ParameterType::Additive,
            _ => ParameterType::default(),
        }
    }
}

/// Which command an `Event` line spells, independent of its payload type.
///
/// Every `Event` variant carries exactly one `EventKind`; this enum exists
/// so callers can switch on "what kind of event is this" without matching
/// the full `Event` (and its value payload) first.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventKind {
    Fade,
    Scale,
    VectorScale,
    Rotate,
    Move,
    MoveX,
    MoveY,
    Color,
    Parameter,
}

/// A reparametrization of normalized time `t ∈ [0,1]`, named after the
/// curve it applies. Declaration order matches the script's integer
/// easing index (`Step` = 0).
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[repr(i32)]
pub enum Easing {
    Step = 0,
    Linear = 1,
    Out = 2,
    In = 3,
    InQuad = 4,
    OutQuad = 5,
    InOutQuad = 6,
    InCubic = 7,
    OutCubic = 8,
    InOutCubic = 9,
    InQuart = 10,
    OutQuart = 11,
    InOutQuart = 12,
    InQuint = 13,
    OutQuint = 14,
    InOutQuint = 15,
    InSine = 16,
    OutSine = 17,
    InOutSine = 18,
    InExpo = 19,
    OutExpo = 20,
    InOutExpo = 21,
    InCirc = 22,
    OutCirc = 23,
    InOutCirc = 24,
    InElastic = 25,
    OutElastic = 26,
    OutElasticHalf = 27,
    OutElasticQuarter = 28,
    InOutElastic = 29,
    InBack = 30,
    OutBack = 31,
    InOutBack = 32,
    InBounce = 33,
    OutBounce = 34,
    InOutBounce = 35,
}

impl Easing {
    /// Maps the script's integer easing index onto a curve. Out-of-range
    /// indices fall back to `Linear`, matching the "unknown easing" rule.
    pub fn from_index(index: i64) -> Self {
        use Easing::*;
        match index {
            0 => Step,
            1 => Linear,
            2 => Out,
            3 => In,
            4 => InQuad,
            5 => OutQuad,
            6 => InOutQuad,
            7 => InCubic,
            8 => OutCubic,
            9 => InOutCubic,
            10 => InQuart,
            11 => OutQuart,
            12 => InOutQuart,
            13 => InQuint,
            14 => OutQuint,
            15 => InOutQuint,
            16 => InSine,
            17 => OutSine,
            18 => InOutSine,
            19 => InExpo,
            20 => OutExpo,
            21 => InOutExpo,
            22 => InCirc,
            23 => OutCirc,
            24 => InOutCirc,
            25 => InElastic,
            26 => OutElastic,
            27 => OutElasticHalf,
            28 => OutElasticQuarter,
            29 => InOutElastic,
            30 => InBack,
            31 => OutBack,
            32 => InOutBack,
            33 => InBounce,
            34 => OutBounce,
            35 => InOutBounce,
            _ => Linear,
        }
    }
}

/// An RGB color with components normalized to `0.0..=1.0`. The script text
/// declares components as `0..=255` integers; the parser divides by `255.0`
/// at parse time, matching the original tool's behavior, so every `Color`
/// that reaches this type is already normalized.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub r: f64,
    pub g: f64,
    pub b: f64,
}

impl Color {
    pub const WHITE: Color = Color {
        r: 1.0,
        g: 1.0,
        b: 1.0,
    };

    pub fn new(r: f64, g: f64, b: f64) -> Self {
        Self { r, g, b }
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::WHITE
    }
}

/// The common shape shared by every event kind: a value that eases from
/// `start_value` to `end_value` over `[start_time, end_time]`.
///
/// `end_time == start_time` marks an instantaneous "set" (see the event
/// record invariant).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TimedEvent<T> {
    pub easing: Easing,
    pub start_time: f64,
    pub end_time: f64,
    pub start_value: T,
    pub end_value: T,
}

impl<T: Clone> TimedEvent<T> {
    pub fn new(easing: Easing, start_time: f64, end_time: f64, start_value: T, end_value: T) -> Self {
        Self {
            easing,
            start_time,
            end_time,
            start_value,
            end_value,
        }
    }

    pub fn has_span(&self) -> bool {
        self.end_time > self.start_time
    }

    /// Returns a copy shifted by `offset`, used when a loop is expanded
    /// into `loop_count` independent copies.
    pub fn shifted(&self, offset: f64) -> Self {
        Self {
            start_time: self.start_time + offset,
            end_time: self.end_time + offset,
            ..self.clone()
        }
    }
}

/// One timed command on one sprite property.
///
/// Replaces the source's virtual-dispatch `IEvent`/`Event<T>` pair with a
/// single tagged union: the variant itself carries both the `EventKind`
/// and the concrete value type, so there is no runtime cast anywhere in
/// this crate.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Event {
    Fade(TimedEvent<f64>),
    Scale(TimedEvent<f64>),
    VectorScale(TimedEvent<DVec2>),
    Rotate(TimedEvent<f64>),
    Move(TimedEvent<DVec2>),
    MoveX(TimedEvent<f64>),
    MoveY(TimedEvent<f64>),
    Color(TimedEvent<Color>),
    Parameter(TimedEvent<ParameterType>),
}

impl Event {
    pub fn kind(&self) -> EventKind {
        match self {
            Event::Fade(_) => EventKind::Fade,
            Event::Scale(_) => EventKind::Scale,
            Event::VectorScale(_) => EventKind::VectorScale,
            Event::Rotate(_) => EventKind::Rotate,
            Event::Move(_) => EventKind::Move,
            Event::MoveX(_) => EventKind::MoveX,
            Event::MoveY(_) => EventKind::MoveY,
            Event::Color(_) => EventKind::Color,
            Event::Parameter(_) => EventKind::Parameter,
        }
    }

    pub fn start_time(&self) -> f64 {
        match self {
            Event::Fade(e) | Event::Scale(e) | Event::Rotate(e) | Event::MoveX(e) | Event::MoveY(e) => e.start_time,
            Event::VectorScale(e) | Event::Move(e) => e.start_time,
            Event::Color(e) => e.start_time,
            Event::Parameter(e) => e.start_time,
        }
    }

    pub fn end_time(&self) -> f64 {
        match self {
            Event::Fade(e) | Event::Scale(e) | Event::Rotate(e) | Event::MoveX(e) | Event::MoveY(e) => e.end_time,
            Event::VectorScale(e) | Event::Move(e) => e.end_time,
            Event::Color(e) => e.end_time,
            Event::Parameter(e) => e.end_time,
        }
    }

    /// Returns a copy with every time field shifted by `offset`; used by
    /// `Loop` expansion.
    pub fn shifted(&self, offset: f64) -> Self {
        match self {
            Event::Fade(e) => Event::Fade(e.shifted(offset)),
            Event::Scale(e) => Event::Scale(e.shifted(offset)),
            Event::VectorScale(e) => Event::VectorScale(e.shifted(offset)),
            Event::Rotate(e) => Event::Rotate(e.shifted(offset)),
            Event::Move(e) => Event::Move(e.shifted(offset)),
            Event::MoveX(e) => Event::MoveX(e.shifted(offset)),
            Event::MoveY(e) => Event::MoveY(e.shifted(offset)),
            Event::Color(e) => Event::Color(e.shifted(offset)),
            Event::Parameter(e) => Event::Parameter(e.shifted(offset)),
        }
    }
}

/// One compiled point in a property's sampled timeline.
///
/// `actual_start_time` differs from `time` only for a tail keyframe that
/// was visually truncated by a later, overlapping event — it preserves
/// the true span so easing still normalizes `t` correctly. See the
/// keyframe compiler for how this field is populated.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Keyframe<T> {
    pub time: f64,
    pub value: T,
    pub easing: Easing,
    pub actual_start_time: f64,
}

impl<T> Keyframe<T> {
    pub fn new(time: f64, value: T, easing: Easing, actual_start_time: f64) -> Self {
        Self {
            time,
            value,
            easing,
            actual_start_time,
        }
    }
}

/// A nested group of events repeated `loop_count` times starting at
/// `start_time`.
#[derive(Clone, Debug, Default)]
pub struct Loop {
    pub start_time: f64,
    pub loop_count: i64,
    pub events: Vec<Event>,
}

impl Loop {
    pub fn new(start_time: f64, loop_count: i64) -> Self {
        Self {
            start_time,
            loop_count,
            events: Vec::new(),
        }
    }

    /// Expands this loop's events into `loop_count` independent, time-shifted
    /// copies, clamping `loop_count < 1` to `1` (authoring-tool behavior).
    /// Returns the expanded events and the loop's resolved end time.
    pub fn expand(&self) -> (Vec<Event>, f64) {
        let loop_count = self.loop_count.max(1);
        let Some(last) = self.events.last() else {
            return (Vec::new(), self.start_time);
        };
        let loop_length = last.end_time();

        let mut expanded = Vec::with_capacity(self.events.len() * loop_count as usize);
        for k in 0..loop_count {
            let offset = self.start_time + loop_length * k as f64;
            for event in &self.events {
                expanded.push(event.shifted(offset));
            }
        }
        let end_time = self.start_time + loop_length * loop_count as f64;
        (expanded, end_time)
    }
}

/// A gameplay-conditional group of events. `initialise` is a no-op:
/// triggers are stored verbatim and never lowered into keyframes by this
/// core (see the trigger-activation design note).
#[derive(Clone, Debug)]
pub struct Trigger {
    pub name: String,
    pub start_time: f64,
    pub end_time: f64,
    pub group: i64,
    pub events: Vec<Event>,
}

impl Trigger {
    pub fn new(name: impl Into<String>, start_time: f64, end_time: f64, group: i64) -> Self {
        Self {
            name: name.into(),
            start_time,
            end_time,
            group,
            events: Vec::new(),
        }
    }
}

/// An audio cue. Opaque to this core beyond storage and ordering — actual
/// playback is an external collaborator's concern.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    pub time: f64,
    pub layer: Layer,
    pub filepath: String,
    pub volume: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unresolved_enum_tokens_fall_back_to_their_documented_default() {
        assert_eq!(Layer::parse("NotALayer"), Layer::Foreground);
        assert_eq!(Origin::parse("Nowhere"), Origin::Centre);
        assert_eq!(LoopType::parse("Whatever"), LoopType::LoopForever);
        assert_eq!(ParameterType::parse("Z"), ParameterType::Additive);
    }

    #[test]
    fn known_enum_tokens_round_trip() {
        assert_eq!(Layer::parse("Background"), Layer::Background);
        assert_eq!(Origin::parse("BottomRight"), Origin::BottomRight);
        assert_eq!(LoopType::parse("LoopOnce"), LoopType::LoopOnce);
        assert_eq!(ParameterType::parse("H"), ParameterType::FlipH);
        assert_eq!(ParameterType::parse("V"), ParameterType::FlipV);
    }

    #[test]
    fn easing_index_zero_is_step_and_out_of_range_falls_back_to_linear() {
        assert_eq!(Easing::from_index(0), Easing::Step);
        assert_eq!(Easing::from_index(1), Easing::Linear);
        assert_eq!(Easing::from_index(35), Easing::InOutBounce);
        assert_eq!(Easing::from_index(99), Easing::Linear);
        assert_eq!(Easing::from_index(-1), Easing::Linear);
    }

    #[test]
    fn loop_count_below_one_clamps_to_one() {
        let mut group = Loop::new(100.0, 0);
        group.events.push(Event::Fade(TimedEvent::new(Easing::Linear, 0.0, 50.0, 0.0, 1.0)));
        let (expanded, end_time) = group.expand();
        assert_eq!(expanded.len(), 1);
        assert_eq!(end_time, 150.0);
    }

    #[test]
    fn loop_expansion_shifts_every_copy_by_its_index_times_length() {
        let mut group = Loop::new(1000.0, 2);
        group.events.push(Event::Rotate(TimedEvent::new(Easing::Linear, 0.0, 200.0, 0.0, 1.0)));
        let (expanded, end_time) = group.expand();
        assert_eq!(expanded.len(), 2);
        assert_eq!(expanded[0].start_time(), 1000.0);
        assert_eq!(expanded[0].end_time(), 1200.0);
        assert_eq!(expanded[1].start_time(), 1200.0);
        assert_eq!(expanded[1].end_time(), 1400.0);
        assert_eq!(end_time, 1400.0);
    }

    #[test]
    fn empty_loop_expands_to_nothing_and_keeps_its_start_time_as_end() {
        let group = Loop::new(250.0, 5);
        let (expanded, end_time) = group.expand();
        assert!(expanded.is_empty());
        assert_eq!(end_time, 250.0);
    }

    #[test]
    fn color_defaults_to_white() {
        assert_eq!(Color::default(), Color::new(1.0, 1.0, 1.0));
    }

    #[test]
    fn timed_event_has_span_is_false_for_instantaneous_sets() {
        let instant = TimedEvent::new(Easing::Step, 500.0, 500.0, 1.0, 2.0);
        assert!(!instant.has_span());
        let spanned = TimedEvent::new(Easing::Linear, 0.0, 10.0, 1.0, 2.0);
        assert!(spanned.has_span());
    }
}
