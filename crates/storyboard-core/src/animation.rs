//! `Animation`: a [`Sprite`] whose image is itself a numbered frame
//! sequence, advancing at a fixed delay once playback starts.

use glam::DVec2;
use storyboard_data::model::{Layer, LoopType, Origin};

use crate::sprite::Sprite;

/// A sprite backed by `frame_count` numbered frame images (`path0.png`,
/// `path1.png`, ...), advancing one frame every `frame_delay` milliseconds
/// starting at `start_time`.
#[derive(Clone, Debug)]
pub struct Animation {
    pub sprite: Sprite,
    pub frame_count: u32,
    pub frame_delay: f64,
    pub loop_type: LoopType,
    pub start_time: f64,
}

impl Animation {
    pub fn new(
        layer: Layer,
        origin: Origin,
        filepath_prefix: impl Into<String>,
        position: DVec2,
        frame_count: u32,
        frame_delay: f64,
        loop_type: LoopType,
        start_time: f64,
    ) -> Self {
        Self {
            sprite: Sprite::new(layer, origin, filepath_prefix, position),
            frame_count,
            frame_delay,
            loop_type,
            start_time,
        }
    }

    pub fn initialise(&mut self) {
        self.sprite.initialise();
    }

    /// Resolves which numbered frame is showing at `time`, returning the
    /// full path (`"<prefix><index><extension>"`, extension preserved
    /// verbatim from the declared filepath).
    ///
    /// `LoopOnce` clamps to the final frame once playback runs past the end;
    /// `LoopForever` wraps around; `Custom` behaves like `LoopForever` since
    /// neither this engine nor the authoring tool it was modeled on ever
    /// branches differently on it.
    pub fn filepath_at(&self, time: f64) -> String {
        if self.frame_count == 0 {
            return self.sprite.filepath.clone();
        }
        let elapsed = (time - self.start_time).max(0.0);
        let raw_index = (elapsed / self.frame_delay).floor() as i64;

        let index = match self.loop_type {
            LoopType::LoopOnce => raw_index.clamp(0, self.frame_count as i64 - 1),
            LoopType::LoopForever | LoopType::Custom => raw_index.rem_euclid(self.frame_count as i64),
        };

        frame_path(&self.sprite.filepath, index as u32)
    }
}

fn frame_path(filepath: &str, index: u32) -> String {
    match filepath.rfind('.') {
        Some(dot) => format!("{}{}{}", &filepath[..dot], index, &filepath[dot..]),
        None => format!("{filepath}{index}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loop_forever_wraps_the_frame_index() {
        let anim = Animation::new(
            Layer::Foreground,
            Origin::Centre,
            "sb/anim.png",
            DVec2::ZERO,
            4,
            100.0,
            LoopType::LoopForever,
            0.0,
        );
        assert_eq!(anim.filepath_at(0.0), "sb/anim0.png");
        assert_eq!(anim.filepath_at(350.0), "sb/anim3.png");
        assert_eq!(anim.filepath_at(400.0), "sb/anim0.png");
        assert_eq!(anim.filepath_at(450.0), "sb/anim1.png");
    }

    #[test]
    fn loop_once_clamps_to_the_last_frame() {
        let anim = Animation::new(
            Layer::Foreground,
            Origin::Centre,
            "sb/anim.png",
            DVec2::ZERO,
            4,
            100.0,
            LoopType::LoopOnce,
            0.0,
        );
        assert_eq!(anim.filepath_at(350.0), "sb/anim3.png");
        assert_eq!(anim.filepath_at(10_000.0), "sb/anim3.png");
    }

    #[test]
    fn time_before_start_holds_the_first_frame() {
        let anim = Animation::new(
            Layer::Foreground,
            Origin::Centre,
            "sb/anim.png",
            DVec2::ZERO,
            4,
            100.0,
            LoopType::LoopForever,
            1000.0,
        );
        assert_eq!(anim.filepath_at(0.0), "sb/anim0.png");
    }
}
