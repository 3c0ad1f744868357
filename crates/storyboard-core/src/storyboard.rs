//! The compiled storyboard as a whole: every sprite/animation and audio
//! sample, ready to be sampled frame by frame.

use glam::DVec2;
use storyboard_data::model::{Color, Layer, Origin, Sample};
use tracing::info;

use crate::animation::Animation;
use crate::sprite::Sprite;

/// Either kind of drawable object a script can declare.
#[derive(Clone, Debug)]
pub enum StoryboardObject {
    Sprite(Sprite),
    Animation(Animation),
}

impl StoryboardObject {
    fn initialise(&mut self) {
        match self {
            StoryboardObject::Sprite(s) => s.initialise(),
            StoryboardObject::Animation(a) => a.initialise(),
        }
    }

    fn sprite(&self) -> &Sprite {
        match self {
            StoryboardObject::Sprite(s) => s,
            StoryboardObject::Animation(a) => &a.sprite,
        }
    }

    /// Gives the parser a place to attach events/loops/triggers declared
    /// under the most recently parsed `Sprite`/`Animation` line.
    pub(crate) fn sprite_mut(&mut self) -> &mut Sprite {
        match self {
            StoryboardObject::Sprite(s) => s,
            StoryboardObject::Animation(a) => &mut a.sprite,
        }
    }

    fn filepath_at(&self, time: f64) -> String {
        match self {
            StoryboardObject::Sprite(s) => s.filepath.clone(),
            StoryboardObject::Animation(a) => a.filepath_at(time),
        }
    }
}

/// One fully-resolved instant of one object's visual state, ready for a
/// renderer to composite. Resolving `filepath` to decoded pixels, and
/// scaling `scale` by the image's own declared width/height (a renderer
/// concern, not known to this core) before it becomes an on-screen size in
/// pixels, is a renderer's job — this core only computes the transform.
#[derive(Clone, Debug, PartialEq)]
pub struct DrawCommand {
    pub layer: Layer,
    pub origin: Origin,
    pub filepath: String,
    /// Sprite-space position already multiplied by [`Storyboard::frame_scale`].
    pub center: DVec2,
    pub scale: DVec2,
    pub rotation: f64,
    pub opacity: f64,
    pub color: Color,
    pub flip_h: bool,
    pub flip_v: bool,
    pub additive: bool,
}

/// The storyboard virtual width every declared coordinate is authored
/// against, regardless of the actual output resolution.
const VIRTUAL_WIDTH: f64 = 854.0;

/// A fully parsed and compiled storyboard.
#[derive(Clone, Debug, Default)]
pub struct Storyboard {
    pub objects: Vec<StoryboardObject>,
    pub samples: Vec<Sample>,
    /// Scales storyboard-space coordinates (authored against a virtual
    /// 854-wide field) into the renderer's actual output resolution.
    pub frame_scale: f64,
}

impl Storyboard {
    /// `output_width` is the renderer's actual target resolution width in
    /// pixels; `frame_scale` is derived from it as `output_width / 854.0`.
    pub fn new(objects: Vec<StoryboardObject>, samples: Vec<Sample>, output_width: f64) -> Self {
        let mut storyboard = Self {
            objects,
            samples,
            frame_scale: output_width / VIRTUAL_WIDTH,
        };
        info!(objects = storyboard.objects.len(), "initialising storyboard");
        // Each object's channels are independent, so this dispatch is safe to
        // parallelize with a rayon `par_iter_mut` if profiling ever shows it's
        // worth the thread-pool overhead; left sequential for now.
        for object in &mut storyboard.objects {
            object.initialise();
        }
        storyboard
    }

    /// Samples every object at `time` and returns the draw commands in
    /// back-to-front layer order. `passing` selects which of the mutually
    /// exclusive `Pass`/`Fail` layers is visible, mirroring the two
    /// gameplay-conditional backgrounds a beatmap can declare. Sprites whose
    /// active interval excludes `time`, or that are fully transparent or
    /// zero-scaled on either axis, are skipped entirely.
    pub fn draw_frame(&self, time: f64, passing: bool) -> Vec<DrawCommand> {
        let mut commands: Vec<DrawCommand> = self
            .objects
            .iter()
            .filter(|object| match object.sprite().layer {
                Layer::Fail => !passing,
                Layer::Pass => passing,
                _ => true,
            })
            .filter(|object| {
                let (start, end) = object.sprite().active_interval;
                time >= start && time <= end
            })
            .filter_map(|object| {
                let sprite = object.sprite();
                let opacity = sprite.opacity_at(time);
                let scale = sprite.scale_at(time);
                if opacity == 0.0 || scale.x == 0.0 || scale.y == 0.0 {
                    return None;
                }
                Some(DrawCommand {
                    layer: sprite.layer,
                    origin: sprite.origin,
                    filepath: object.filepath_at(time),
                    center: sprite.position_at(time) * self.frame_scale,
                    scale,
                    rotation: sprite.rotation_at(time),
                    opacity,
                    color: sprite.color_at(time),
                    flip_h: sprite.flip_h_at(time),
                    flip_v: sprite.flip_v_at(time),
                    additive: sprite.additive_at(time),
                })
            })
            .collect();

        commands.sort_by_key(|c| layer_order(c.layer));
        commands
    }
}

fn layer_order(layer: Layer) -> u8 {
    match layer {
        Layer::Background => 0,
        Layer::Fail | Layer::Pass => 1,
        Layer::Foreground => 2,
        Layer::Overlay => 3,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use storyboard_data::model::{Easing, Event, TimedEvent};

    #[test]
    fn draw_frame_orders_by_layer_and_resolves_opacity() {
        let mut background = Sprite::new(Layer::Background, Origin::Centre, "bg.jpg", DVec2::ZERO);
        background.events.push(Event::Fade(TimedEvent::new(Easing::Linear, 0.0, 1000.0, 0.0, 1.0)));

        let overlay = Sprite::new(Layer::Overlay, Origin::Centre, "overlay.png", DVec2::ZERO);

        let storyboard = Storyboard::new(
            vec![
                StoryboardObject::Sprite(overlay),
                StoryboardObject::Sprite(background),
            ],
            vec![],
            1.0,
        );

        let commands = storyboard.draw_frame(500.0, true);
        assert_eq!(commands.len(), 2);
        assert_eq!(commands[0].layer, Layer::Background);
        assert_eq!(commands[0].opacity, 0.5);
        assert_eq!(commands[1].layer, Layer::Overlay);
    }

    #[test]
    fn pass_and_fail_layers_are_mutually_exclusive() {
        let pass = Sprite::new(Layer::Pass, Origin::Centre, "pass.png", DVec2::ZERO);
        let fail = Sprite::new(Layer::Fail, Origin::Centre, "fail.png", DVec2::ZERO);

        let storyboard = Storyboard::new(
            vec![StoryboardObject::Sprite(pass), StoryboardObject::Sprite(fail)],
            vec![],
            1.0,
        );

        let passing = storyboard.draw_frame(0.0, true);
        assert_eq!(passing.len(), 1);
        assert_eq!(passing[0].filepath, "pass.png");

        let failing = storyboard.draw_frame(0.0, false);
        assert_eq!(failing.len(), 1);
        assert_eq!(failing[0].filepath, "fail.png");
    }
}
