//! Integration coverage for the S1-S6 testable scenarios: each drives a
//! sprite through `storyboard_core::parser::parse` the way a real script
//! would declare it, rather than constructing `Event`s by hand.

use storyboard_core::StoryboardObject;

fn compiled_sprite(script: &str) -> storyboard_core::Sprite {
    let parsed = storyboard_core::parse(script);
    let StoryboardObject::Sprite(mut sprite) = parsed.objects.into_iter().next().expect("one sprite") else {
        panic!("expected a Sprite object");
    };
    sprite.initialise();
    sprite
}

fn sprite_script(body: &str) -> String {
    format!("[Events]\nSprite,Foreground,Centre,\"sprite.png\",320,240\n{body}")
}

/// S1 - basic fade: `F,0,1000,2000,0,1`.
#[test]
fn s1_basic_fade() {
    let sprite = compiled_sprite(&sprite_script("F,1,1000,2000,0,1\n"));
    assert_eq!(sprite.opacity_at(999.0), 0.0);
    assert_eq!(sprite.opacity_at(1000.0), 0.0);
    assert!((sprite.opacity_at(1500.0) - 0.5).abs() < 1e-9);
    assert_eq!(sprite.opacity_at(2000.0), 1.0);
    assert_eq!(sprite.opacity_at(2001.0), 1.0);
}

/// S2 - overlap: two fades on the same channel, the second starting
/// before the first ends. Until the first event's original end time
/// (1000), its own curve keeps playing; the second event's truncated
/// keyframe is handed over discontinuously at that instant, so it only
/// "dominates" from 1000 onward.
#[test]
fn s2_overlap() {
    let script = sprite_script("F,1,0,1000,0,1\nF,1,500,1500,1,0\n");
    let sprite = compiled_sprite(&script);
    assert!((sprite.opacity_at(500.0) - 0.5).abs() < 1e-9);
    assert!((sprite.opacity_at(1000.0) - 0.5).abs() < 1e-9);
    assert!((sprite.opacity_at(1500.0) - 0.0).abs() < 1e-9);
}

/// S3 - instantaneous set: zero-duration scale event snaps and holds.
#[test]
fn s3_instantaneous_set() {
    let sprite = compiled_sprite(&sprite_script("S,0,1000,1000,2,2\n"));
    assert_eq!(sprite.scale_at(999.0), glam::DVec2::new(1.0, 1.0));
    assert_eq!(sprite.scale_at(1000.0), glam::DVec2::new(2.0, 2.0));
    assert_eq!(sprite.scale_at(10_000.0), glam::DVec2::new(2.0, 2.0));
}

/// S4 - loop: one inner fade repeated 3 times.
#[test]
fn s4_loop() {
    let script = sprite_script(" L,0,3\n  F,1,0,100,0,1\n");
    let sprite = compiled_sprite(&script);
    assert!((sprite.opacity_at(150.0) - 0.5).abs() < 1e-9);
    assert!((sprite.opacity_at(50.0) - 0.5).abs() < 1e-9);
    assert!((sprite.opacity_at(250.0) - 0.5).abs() < 1e-9);
}

/// S5 - MX/MY separate mode.
#[test]
fn s5_move_separate_mode() {
    let script = "[Events]\nSprite,Foreground,Centre,\"sprite.png\",100,100\nMX,1,0,1000,100,300\nMY,1,0,1000,100,200\n";
    let sprite = compiled_sprite(script);
    let position = sprite.position_at(500.0);
    assert!((position.x - 200.0).abs() < 1e-9);
    assert!((position.y - 150.0).abs() < 1e-9);
}

/// S6 - M compound override: once a `Move` event appears first, `MoveX`/
/// `MoveY` events on the same sprite are ignored.
#[test]
fn s6_move_compound_override() {
    let script = "[Events]\nSprite,Foreground,Centre,\"sprite.png\",0,0\nM,1,0,1000,0,0,100,100\nMX,1,0,1000,500,500\n";
    let sprite = compiled_sprite(script);
    let position = sprite.position_at(500.0);
    assert!((position.x - 50.0).abs() < 1e-9);
    assert!((position.y - 50.0).abs() < 1e-9);
}

/// Loop expansion invariant: `len(expanded) == loop_count * len(original)`
/// and the loop's resolved end time matches `start + count * length`.
#[test]
fn loop_expansion_matches_invariant() {
    use storyboard_data::model::{Easing, Event, Loop, TimedEvent};

    let mut group = Loop::new(0.0, 4);
    group.events.push(Event::Fade(TimedEvent::new(Easing::Linear, 0.0, 100.0, 0.0, 1.0)));
    group.events.push(Event::Rotate(TimedEvent::new(Easing::Linear, 0.0, 100.0, 0.0, 1.0)));

    let (expanded, end_time) = group.expand();
    assert_eq!(expanded.len(), 4 * 2);
    assert_eq!(end_time, 400.0);
}

/// Parameter channel default-inversion quirk (§9): the sentinel is `true`
/// and an instant event re-asserts `true` forever, since nothing pushes a
/// matching `false`.
#[test]
fn parameter_channel_default_is_on() {
    let script = sprite_script("P,0,500,1000,A\n");
    let sprite = compiled_sprite(&script);
    use storyboard_data::model::ParameterType;
    assert!(sprite.effect_at(0.0, ParameterType::Additive));
    assert!(!sprite.effect_at(750.0, ParameterType::Additive));
    assert!(sprite.effect_at(1000.0, ParameterType::Additive));
}
