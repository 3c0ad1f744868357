//! A single storyboard sprite: its declared events/loops/triggers, and the
//! compiled channels sampled at render time.

use glam::DVec2;
use storyboard_data::model::{Color, Event, Layer, Loop, Origin, ParameterType, Trigger};
use tracing::debug;

use crate::compiler::{self, CompiledChannels};

/// One `Sprite` (or `Animation`, via [`crate::animation::Animation`])
/// declared in the script, with its image path, declared layer/origin/base
/// position, and the events that animate it.
#[derive(Clone, Debug)]
pub struct Sprite {
    pub layer: Layer,
    pub origin: Origin,
    pub filepath: String,
    pub position: DVec2,
    pub events: Vec<Event>,
    pub loops: Vec<Loop>,
    pub triggers: Vec<Trigger>,
    /// `[min_start, max_end]` across every declared (post-loop-expansion)
    /// event, computed once by [`Sprite::initialise`]. A sprite with no
    /// events at all is active for the whole storyboard.
    pub active_interval: (f64, f64),
    compiled: CompiledChannels,
}

impl Sprite {
    pub fn new(layer: Layer, origin: Origin, filepath: impl Into<String>, position: DVec2) -> Self {
        Self {
            layer,
            origin,
            filepath: filepath.into(),
            position,
            events: Vec::new(),
            loops: Vec::new(),
            triggers: Vec::new(),
            active_interval: (f64::NEG_INFINITY, f64::INFINITY),
            // Every channel needs at least its `-inf` sentinel keyframe before
            // `initialise` runs, since `compiler::sample` indexes into the
            // slice unconditionally; compiling against an empty event list
            // gives the correct pre-compile defaults (declared position,
            // unit scale, etc.) for free.
            compiled: compiler::compile(&[], position),
        }
    }

    /// Expands every declared `Loop` into its constituent time-shifted
    /// events, then lowers the full event set into sampled channels.
    ///
    /// Triggers are left untouched: activating one is a gameplay decision
    /// made by an external collaborator (a beatmap/judgement engine), not
    /// something this core can resolve on its own — see the trigger design
    /// note.
    pub fn initialise(&mut self) {
        let mut all_events = self.events.clone();
        for group in &self.loops {
            let (expanded, _end_time) = group.expand();
            all_events.extend(expanded);
        }
        debug!(
            base_events = self.events.len(),
            loops = self.loops.len(),
            expanded_total = all_events.len(),
            "initialising sprite"
        );
        self.active_interval = if all_events.is_empty() {
            (f64::NEG_INFINITY, f64::INFINITY)
        } else {
            let min_start = all_events.iter().map(|e| e.start_time()).fold(f64::INFINITY, f64::min);
            let max_end = all_events.iter().map(|e| e.end_time()).fold(f64::NEG_INFINITY, f64::max);
            (min_start, max_end)
        };
        self.compiled = compiler::compile(&all_events, self.position);
    }

    pub fn opacity_at(&self, time: f64) -> f64 {
        compiler::sample(&self.compiled.fade, time)
    }

    pub fn position_at(&self, time: f64) -> DVec2 {
        DVec2::new(
            compiler::sample(&self.compiled.move_x, time),
            compiler::sample(&self.compiled.move_y, time),
        )
    }

    pub fn scale_at(&self, time: f64) -> DVec2 {
        DVec2::new(
            compiler::sample(&self.compiled.scale_x, time),
            compiler::sample(&self.compiled.scale_y, time),
        )
    }

    pub fn rotation_at(&self, time: f64) -> f64 {
        compiler::sample(&self.compiled.rotate, time)
    }

    pub fn color_at(&self, time: f64) -> Color {
        compiler::sample(&self.compiled.color, time)
    }

    pub fn flip_h_at(&self, time: f64) -> bool {
        compiler::sample(&self.compiled.flip_h, time)
    }

    pub fn flip_v_at(&self, time: f64) -> bool {
        compiler::sample(&self.compiled.flip_v, time)
    }

    pub fn additive_at(&self, time: f64) -> bool {
        compiler::sample(&self.compiled.additive, time)
    }

    /// `true` once every channel has settled onto its last keyframe's flat
    /// tail, i.e. the sprite has nothing left to animate after `time`.
    pub fn finished_at(&self, time: f64) -> bool {
        let last_move_x = self.compiled.move_x.last().map(|k| k.time).unwrap_or(f64::NEG_INFINITY);
        let last_move_y = self.compiled.move_y.last().map(|k| k.time).unwrap_or(f64::NEG_INFINITY);
        let last_fade = self.compiled.fade.last().map(|k| k.time).unwrap_or(f64::NEG_INFINITY);
        let last_scale_x = self.compiled.scale_x.last().map(|k| k.time).unwrap_or(f64::NEG_INFINITY);
        let last_scale_y = self.compiled.scale_y.last().map(|k| k.time).unwrap_or(f64::NEG_INFINITY);
        let last_rotate = self.compiled.rotate.last().map(|k| k.time).unwrap_or(f64::NEG_INFINITY);
        let last_color = self.compiled.color.last().map(|k| k.time).unwrap_or(f64::NEG_INFINITY);
        let last = [last_move_x, last_move_y, last_fade, last_scale_x, last_scale_y, last_rotate, last_color]
            .into_iter()
            .fold(f64::NEG_INFINITY, f64::max);
        time >= last
    }

    /// Samples whichever boolean parameter channel `kind` identifies.
    pub fn effect_at(&self, time: f64, kind: ParameterType) -> bool {
        match kind {
            ParameterType::FlipH => self.flip_h_at(time),
            ParameterType::FlipV => self.flip_v_at(time),
            ParameterType::Additive => self.additive_at(time),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use storyboard_data::model::{Easing, TimedEvent};

    #[test]
    fn uninitialised_sprite_samples_its_declared_position() {
        let sprite = Sprite::new(Layer::Foreground, Origin::Centre, "sprite.png", DVec2::new(100.0, 200.0));
        assert_eq!(sprite.position_at(0.0), DVec2::new(100.0, 200.0));
    }

    #[test]
    fn initialise_compiles_declared_events() {
        let mut sprite = Sprite::new(Layer::Foreground, Origin::Centre, "sprite.png", DVec2::new(100.0, 200.0));
        sprite.events.push(Event::Fade(TimedEvent::new(Easing::Linear, 0.0, 1000.0, 0.0, 1.0)));
        sprite.initialise();
        assert_eq!(sprite.opacity_at(-1.0), 0.0);
        assert_eq!(sprite.opacity_at(500.0), 0.5);
        assert_eq!(sprite.opacity_at(2000.0), 1.0);
        // channels untouched by any event fall back to the declared position
        assert_eq!(sprite.position_at(0.0), DVec2::new(100.0, 200.0));
    }

    #[test]
    fn loops_expand_before_compiling() {
        let mut sprite = Sprite::new(Layer::Foreground, Origin::Centre, "sprite.png", DVec2::ZERO);
        let mut group = Loop::new(0.0, 3);
        group.events.push(Event::Fade(TimedEvent::new(Easing::Linear, 0.0, 100.0, 0.0, 1.0)));
        sprite.loops.push(group);
        sprite.initialise();
        assert_eq!(sprite.opacity_at(50.0), 0.5);
        assert_eq!(sprite.opacity_at(150.0), 0.5);
        assert_eq!(sprite.opacity_at(250.0), 0.5);
        assert_eq!(sprite.opacity_at(1000.0), 1.0);
    }
}
