//! Lowers a sprite's declared [`Event`]s into flat [`Keyframe`] sequences,
//! one per output channel, and samples them at an arbitrary time. Events are
//! processed in start-time order, but the emitted keyframe *times* are not
//! guaranteed non-decreasing (see [`sample`]'s doc comment) — a shorter
//! event nested entirely inside an earlier, longer one truncates the
//! earlier event's end keyframe below the running timeline's last emitted
//! instant.
//!
//! This is a from-scratch re-expression of the source engine's
//! `generateKeyframes`/`calculateKeyframes`/`keyframeValueAt` trio (the
//! original author's own comment calls the index bookkeeping there "a
//! little bit of dumb bullshit"); the observable behavior — overlap
//! truncation via a shared timestamp plus a preserved true start time for
//! easing normalization — is unchanged, but expressed here as a plain
//! sort-then-fold instead of parallel index counters.

use glam::DVec2;
use storyboard_data::model::{Color, Easing, Event, EventKind, Keyframe, ParameterType, TimedEvent};

use crate::easing::ease;
use crate::interpolate::Interpolatable;

/// Lowers one channel's events, in start-time order, into a keyframe
/// sequence.
///
/// A span event (`end_time > start_time`) contributes two keyframes: one at
/// its start carrying its own easing, one at its end holding the end value
/// with [`Easing::Step`] (a flat hold until whatever comes next). An
/// instant event (`end_time == start_time`) contributes a single
/// `Easing::Step` keyframe holding its end value.
///
/// When an event starts before the running timeline's last keyframe would
/// naturally land, the new keyframe is placed at that same shared instant
/// (a discontinuous handover) while `actual_start_time` keeps the event's
/// true start time, so its own easing curve still normalizes against its
/// own full declared duration rather than the shortened visible window.
pub fn compile_channel<T: Interpolatable>(events: &[TimedEvent<T>], default_value: T) -> Vec<Keyframe<T>> {
    if events.is_empty() {
        return vec![Keyframe::new(f64::NEG_INFINITY, default_value, Easing::Step, f64::NEG_INFINITY)];
    }

    let mut sorted: Vec<&TimedEvent<T>> = events.iter().collect();
    sorted.sort_by(|a, b| a.start_time.partial_cmp(&b.start_time).unwrap());

    let mut keyframes = Vec::with_capacity(sorted.len() * 2 + 1);
    keyframes.push(Keyframe::new(
        f64::NEG_INFINITY,
        sorted[0].start_value.clone(),
        Easing::Step,
        f64::NEG_INFINITY,
    ));

    for event in sorted {
        let has_span = event.has_span();
        let (value, easing) = if has_span {
            (event.start_value.clone(), event.easing)
        } else {
            (event.end_value.clone(), Easing::Step)
        };

        let prev_time = keyframes.last().expect("sentinel always present").time;
        let time = prev_time.max(event.start_time);
        keyframes.push(Keyframe::new(time, value, easing, event.start_time));

        if has_span {
            keyframes.push(Keyframe::new(event.end_time, event.end_value.clone(), Easing::Step, event.end_time));
        }
    }
    keyframes
}

/// Lowers `Parameter` events into a boolean on/off timeline.
///
/// Unlike [`compile_channel`], the leading sentinel here reads `true` when
/// any parameter event exists at all — a toggle effect is presumed active
/// until something turns it off — and only a span event's end pushes the
/// off transition. An instant parameter event (no span) re-asserts `true`
/// forever, since nothing ever pushes a matching `false`. Preserved
/// verbatim from the source tool rather than "fixed", since real scripts
/// depend on the first-event asymmetry to mean "on from the start".
pub fn compile_parameter_channel(events: &[TimedEvent<ParameterType>]) -> Vec<Keyframe<bool>> {
    if events.is_empty() {
        return vec![Keyframe::new(f64::NEG_INFINITY, false, Easing::Step, f64::NEG_INFINITY)];
    }

    let mut sorted: Vec<&TimedEvent<ParameterType>> = events.iter().collect();
    sorted.sort_by(|a, b| a.start_time.partial_cmp(&b.start_time).unwrap());

    let mut keyframes = vec![Keyframe::new(f64::NEG_INFINITY, true, Easing::Step, f64::NEG_INFINITY)];

    for (index, event) in sorted.into_iter().enumerate() {
        let has_span = event.has_span();
        if index > 0 {
            let easing = if has_span { event.easing } else { Easing::Step };
            let prev_time = keyframes.last().expect("sentinel always present").time;
            let time = prev_time.max(event.start_time);
            keyframes.push(Keyframe::new(time, true, easing, event.start_time));
        }
        if has_span {
            keyframes.push(Keyframe::new(event.end_time, false, Easing::Step, event.end_time));
        }
    }
    keyframes
}

/// Samples a compiled keyframe sequence at `time`, scanning for the first
/// keyframe past `time` and reapplying the earlier keyframe's easing over
/// its own true duration.
///
/// This is a linear scan, not a binary search: overlap truncation can place
/// a later-starting event's end keyframe *earlier* than an enclosing
/// event's own end keyframe (a shorter event nested inside a longer one),
/// so the sequence is not always strictly non-decreasing in `time`. A
/// `partition_point`/binary search would silently pick the wrong bracket in
/// that case; the source tool's own `keyframeValueAt` scans in keyframe
/// order for the same reason, and this mirrors it.
pub fn sample<T: Interpolatable>(keyframes: &[Keyframe<T>], time: f64) -> T {
    let idx = match keyframes.iter().position(|k| k.time > time) {
        Some(idx) => idx,
        None => return keyframes[keyframes.len() - 1].value.clone(),
    };
    if idx == 0 {
        return keyframes[0].value.clone();
    }
    let lo = &keyframes[idx - 1];
    let hi = &keyframes[idx];
    if lo.easing == Easing::Step {
        return lo.value.clone();
    }
    let denom = hi.time - lo.actual_start_time;
    let t = if denom.abs() < f64::EPSILON {
        1.0
    } else {
        (time - lo.actual_start_time) / denom
    };
    let eased = ease(lo.easing, t);
    T::interpolate(&lo.value, &hi.value, eased)
}

/// Every channel a sprite samples from, pre-lowered into flat keyframe
/// sequences at [`initialise`](crate::sprite::Sprite::initialise) time.
#[derive(Clone, Debug, Default)]
pub struct CompiledChannels {
    pub fade: Vec<Keyframe<f64>>,
    pub move_x: Vec<Keyframe<f64>>,
    pub move_y: Vec<Keyframe<f64>>,
    pub scale_x: Vec<Keyframe<f64>>,
    pub scale_y: Vec<Keyframe<f64>>,
    pub rotate: Vec<Keyframe<f64>>,
    pub color: Vec<Keyframe<Color>>,
    pub flip_h: Vec<Keyframe<bool>>,
    pub flip_v: Vec<Keyframe<bool>>,
    pub additive: Vec<Keyframe<bool>>,
}

fn project(events: &[&TimedEvent<DVec2>], axis: impl Fn(DVec2) -> f64) -> Vec<TimedEvent<f64>> {
    events
        .iter()
        .map(|e| TimedEvent::new(e.easing, e.start_time, e.end_time, axis(e.start_value), axis(e.end_value)))
        .collect()
}

fn as_fade(event: &Event) -> Option<&TimedEvent<f64>> {
    match event {
        Event::Fade(e) => Some(e),
        _ => None,
    }
}

fn as_rotate(event: &Event) -> Option<&TimedEvent<f64>> {
    match event {
        Event::Rotate(e) => Some(e),
        _ => None,
    }
}

fn as_color(event: &Event) -> Option<&TimedEvent<Color>> {
    match event {
        Event::Color(e) => Some(e),
        _ => None,
    }
}

/// Lowers a sprite's full declared [`Event`] list into every output
/// channel. `origin` supplies the sprite's declared (X, Y) for the
/// position channel's fallback when no Move/MoveX/MoveY event exists.
pub fn compile(events: &[Event], origin: DVec2) -> CompiledChannels {
    let fade_events: Vec<_> = events.iter().filter_map(as_fade).cloned().collect();
    let rotate_events: Vec<_> = events.iter().filter_map(as_rotate).cloned().collect();
    let color_events: Vec<_> = events.iter().filter_map(as_color).cloned().collect();

    let (move_x, move_y) = compile_position(events, origin);
    let (scale_x, scale_y) = compile_scale(events);

    let mut flip_h = Vec::new();
    let mut flip_v = Vec::new();
    let mut additive = Vec::new();
    for event in events {
        if let Event::Parameter(e) = event {
            match e.start_value {
                ParameterType::FlipH => flip_h.push(e.clone()),
                ParameterType::FlipV => flip_v.push(e.clone()),
                ParameterType::Additive => additive.push(e.clone()),
            }
        }
    }

    CompiledChannels {
        fade: compile_channel(&fade_events, 1.0),
        move_x,
        move_y,
        scale_x,
        scale_y,
        rotate: compile_channel(&rotate_events, 0.0),
        color: compile_channel(&color_events, Color::WHITE),
        flip_h: compile_parameter_channel(&flip_h),
        flip_v: compile_parameter_channel(&flip_v),
        additive: compile_parameter_channel(&additive),
    }
}

/// Move vs MoveX/MoveY is a one-shot latch: whichever kind appears first
/// among a sprite's declared events (in script order, not time order)
/// decides the mode for the whole sprite, and events of the other kind are
/// ignored — a sprite never mixes compound and per-axis position events.
fn compile_position(events: &[Event], origin: DVec2) -> (Vec<Keyframe<f64>>, Vec<Keyframe<f64>>) {
    let first_kind = events.iter().find_map(|e| match e.kind() {
        EventKind::Move | EventKind::MoveX | EventKind::MoveY => Some(e.kind()),
        _ => None,
    });

    match first_kind {
        None => (
            vec![Keyframe::new(f64::NEG_INFINITY, origin.x, Easing::Step, f64::NEG_INFINITY)],
            vec![Keyframe::new(f64::NEG_INFINITY, origin.y, Easing::Step, f64::NEG_INFINITY)],
        ),
        Some(EventKind::Move) => {
            let moves: Vec<&TimedEvent<DVec2>> = events
                .iter()
                .filter_map(|e| match e {
                    Event::Move(m) => Some(m),
                    _ => None,
                })
                .collect();
            let x = project(&moves, |v| v.x);
            let y = project(&moves, |v| v.y);
            (compile_channel(&x, origin.x), compile_channel(&y, origin.y))
        }
        Some(_) => {
            let xs: Vec<TimedEvent<f64>> = events
                .iter()
                .filter_map(|e| match e {
                    Event::MoveX(m) => Some(m.clone()),
                    _ => None,
                })
                .collect();
            let ys: Vec<TimedEvent<f64>> = events
                .iter()
                .filter_map(|e| match e {
                    Event::MoveY(m) => Some(m.clone()),
                    _ => None,
                })
                .collect();
            (compile_channel(&xs, origin.x), compile_channel(&ys, origin.y))
        }
    }
}

/// Scale vs VectorScale mirrors the position latch: `V` (a pair) takes the
/// compound path when it appears first; `S` (a scalar) broadcasts its
/// compiled curve identically to both axes. This corrects an apparent bug
/// in the source tool, where the scale path's axis filter was copy-pasted
/// from the position path and checked for `MX`/`MY` (events that are never
/// applicable to a Scale channel), silently dropping every Scale event.
fn compile_scale(events: &[Event]) -> (Vec<Keyframe<f64>>, Vec<Keyframe<f64>>) {
    let first_kind = events.iter().find_map(|e| match e.kind() {
        EventKind::Scale | EventKind::VectorScale => Some(e.kind()),
        _ => None,
    });

    match first_kind {
        None => (
            vec![Keyframe::new(f64::NEG_INFINITY, 1.0, Easing::Step, f64::NEG_INFINITY)],
            vec![Keyframe::new(f64::NEG_INFINITY, 1.0, Easing::Step, f64::NEG_INFINITY)],
        ),
        Some(EventKind::VectorScale) => {
            let vectors: Vec<&TimedEvent<DVec2>> = events
                .iter()
                .filter_map(|e| match e {
                    Event::VectorScale(v) => Some(v),
                    _ => None,
                })
                .collect();
            let x = project(&vectors, |v| v.x);
            let y = project(&vectors, |v| v.y);
            (compile_channel(&x, 1.0), compile_channel(&y, 1.0))
        }
        Some(_) => {
            let scalars: Vec<TimedEvent<f64>> = events
                .iter()
                .filter_map(|e| match e {
                    Event::Scale(s) => Some(s.clone()),
                    _ => None,
                })
                .collect();
            let compiled = compile_channel(&scalars, 1.0);
            (compiled.clone(), compiled)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use storyboard_data::model::Easing;

    fn span(easing: Easing, start_time: f64, end_time: f64, start_value: f64, end_value: f64) -> TimedEvent<f64> {
        TimedEvent::new(easing, start_time, end_time, start_value, end_value)
    }

    #[test]
    fn empty_channel_holds_default() {
        let keyframes = compile_channel::<f64>(&[], 42.0);
        assert_eq!(sample(&keyframes, 0.0), 42.0);
        assert_eq!(sample(&keyframes, 1_000_000.0), 42.0);
    }

    #[test]
    fn single_linear_event_interpolates() {
        let events = vec![span(Easing::Linear, 0.0, 1000.0, 0.0, 100.0)];
        let keyframes = compile_channel(&events, 0.0);
        assert_eq!(sample(&keyframes, -1.0), 0.0);
        assert_eq!(sample(&keyframes, 500.0), 50.0);
        assert_eq!(sample(&keyframes, 1000.0), 100.0);
        assert_eq!(sample(&keyframes, 5000.0), 100.0);
    }

    #[test]
    fn instant_event_snaps_and_holds() {
        let events = vec![span(Easing::Linear, 500.0, 500.0, 0.0, 9.0)];
        let keyframes = compile_channel(&events, 0.0);
        assert_eq!(sample(&keyframes, 0.0), 0.0);
        assert_eq!(sample(&keyframes, 500.0), 9.0);
        assert_eq!(sample(&keyframes, 600.0), 9.0);
    }

    #[test]
    fn overlapping_event_truncates_but_preserves_easing_normalization() {
        let a = span(Easing::Linear, 0.0, 1000.0, 0.0, 100.0);
        let b = span(Easing::Linear, 500.0, 1500.0, 1000.0, 2000.0);
        let keyframes = compile_channel(&[a, b], 0.0);
        // at the handover instant, a's value at its own 50% progress (50.0) is
        // overwritten discontinuously by b's start_value (1000.0)
        let just_before = sample(&keyframes, 499.999999);
        assert!((just_before - 50.0).abs() < 1e-3);
        assert_eq!(sample(&keyframes, 500.0), 1000.0);
        assert_eq!(sample(&keyframes, 1000.0), 1500.0);
        assert_eq!(sample(&keyframes, 1500.0), 2000.0);
    }

    #[test]
    fn nested_shorter_event_produces_non_monotonic_keyframe_times_but_still_samples() {
        // A later event fully nested inside an earlier, longer one truncates
        // the earlier event's end keyframe below the running timeline's last
        // emitted instant: times come out as [-inf, 0, 1000, 800], not
        // non-decreasing once the nested event's own end keyframe lands.
        let outer = span(Easing::Linear, 0.0, 1000.0, 0.0, 100.0);
        let inner = span(Easing::Linear, 500.0, 800.0, 500.0, 600.0);
        let keyframes = compile_channel(&[outer, inner], 0.0);
        let times: Vec<f64> = keyframes.iter().map(|k| k.time).collect();
        assert_eq!(times, vec![f64::NEG_INFINITY, 0.0, 1000.0, 800.0]);

        // sample must not panic and must clamp-right once time passes every
        // keyframe, even though the array isn't sorted by time.
        assert_eq!(sample(&keyframes, 1000.0), 600.0);
        assert_eq!(sample(&keyframes, 5000.0), 600.0);
        assert!((sample(&keyframes, 900.0) - 450.0).abs() < 1e-9);
    }

    #[test]
    fn step_easing_holds_until_the_next_keyframe() {
        let events = vec![span(Easing::Step, 0.0, 1000.0, 0.0, 100.0)];
        let keyframes = compile_channel(&events, 0.0);
        assert_eq!(sample(&keyframes, 500.0), 0.0);
        assert_eq!(sample(&keyframes, 1000.0), 100.0);
    }

    #[test]
    fn parameter_instant_event_turns_on_forever() {
        use storyboard_data::model::ParameterType;
        let span_event = TimedEvent::new(
            Easing::Linear,
            100.0,
            200.0,
            ParameterType::FlipH,
            ParameterType::FlipH,
        );
        let instant_event = TimedEvent::new(
            Easing::Step,
            300.0,
            300.0,
            ParameterType::FlipH,
            ParameterType::FlipH,
        );
        let keyframes = compile_parameter_channel(&[span_event, instant_event]);
        assert_eq!(sample(&keyframes, 0.0), true);
        assert_eq!(sample(&keyframes, 250.0), false);
        assert_eq!(sample(&keyframes, 300.0), true);
        assert_eq!(sample(&keyframes, 10_000.0), true);
    }
}
