//! Turns a storyboard script's raw text into sprites, animations, and
//! audio samples, attaching events/loops/triggers to whichever
//! `Sprite`/`Animation` line most recently opened them.
//!
//! This is a straight line-oriented re-expression of the source tool's
//! `ParseStoryboard`: section headers switch a small state machine,
//! `[Events]` lines split on commas after variable substitution and
//! indentation stripping, and unrecognized tokens fall back to the
//! authoring-tool defaults documented in the data model rather than
//! failing the whole parse.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use glam::DVec2;
use storyboard_data::model::{
    Color, Easing, Event, EventKind, Layer, Loop, LoopType, Origin, ParameterType, Sample, TimedEvent, Trigger,
};
use tracing::warn;

use crate::animation::Animation;
use crate::errors::{DiagnosticLevel, LineDiagnostic, ParseError};
use crate::sprite::Sprite;
use crate::storyboard::StoryboardObject;

/// Logs `diagnostic` at the severity it carries, then records it so the
/// caller gets both an immediate log line and a structured summary.
fn record(diagnostics: &mut Vec<LineDiagnostic>, diagnostic: LineDiagnostic) {
    match diagnostic.level {
        DiagnosticLevel::Warning => warn!(line = diagnostic.line, "{}", diagnostic.message),
        DiagnosticLevel::Error => tracing::error!(line = diagnostic.line, "{}", diagnostic.message),
    }
    diagnostics.push(diagnostic);
}

/// Everything recovered from one script: the declared objects and
/// samples, plus every metadata key/value found under `[General]`/
/// `[Metadata]`, plus a diagnostic for every line that could not be
/// fully understood. A script with zero well-formed lines still parses
/// successfully to an empty [`ParsedScript`] — see error kind 2 in the
/// design notes.
#[derive(Clone, Debug, Default)]
pub struct ParsedScript {
    pub objects: Vec<StoryboardObject>,
    pub samples: Vec<Sample>,
    pub metadata: HashMap<String, String>,
    pub diagnostics: Vec<LineDiagnostic>,
}

#[derive(Copy, Clone, PartialEq, Eq)]
enum Section {
    None,
    Events,
    Variables,
    Info,
}

/// Which nested group, if any, currently receives events parsed at the
/// active indentation depth.
#[derive(Clone, Debug)]
enum OpenGroup {
    None,
    Loop,
    Trigger,
}

/// Reads `path` and parses it. The only failure this can surface is the
/// file itself being unreadable; every malformed line inside a readable
/// file degrades to a recoverable [`LineDiagnostic`] instead.
pub fn parse_file(path: impl AsRef<Path>) -> Result<ParsedScript, ParseError> {
    let source = fs::read_to_string(path)?;
    Ok(parse(&source))
}

/// Parses an already-loaded script. Infallible: a script packed entirely
/// with malformed lines parses to an empty, fully-diagnosed result.
pub fn parse(source: &str) -> ParsedScript {
    let mut objects: Vec<StoryboardObject> = Vec::new();
    let mut samples = Vec::new();
    let mut variables: Vec<(String, String)> = Vec::new();
    let mut metadata = HashMap::new();
    let mut diagnostics = Vec::new();

    let mut section = Section::None;
    let mut open_group = OpenGroup::None;

    for (index, raw_line) in source.lines().enumerate() {
        let line_number = index + 1;
        let line = raw_line.trim_end_matches('\r');
        if line.is_empty() || line.starts_with("//") {
            continue;
        }

        if let Some(heading) = section_heading(line) {
            section = match heading {
                "Events" => Section::Events,
                "Variables" => Section::Variables,
                "General" | "Metadata" => Section::Info,
                _ => Section::None,
            };
            continue;
        }

        match section {
            Section::None => continue,
            Section::Variables => parse_variable_line(line, &mut variables),
            Section::Info => parse_info_line(line, &mut metadata),
            Section::Events => parse_event_line(
                line,
                line_number,
                &variables,
                &mut objects,
                &mut samples,
                &mut open_group,
                &mut diagnostics,
            ),
        }
    }

    ParsedScript {
        objects,
        samples,
        metadata,
        diagnostics,
    }
}

/// Returns the bracketed heading's inner text (`"[Events]"` → `Some("Events")`)
/// if `line` opens a new section, or `None` if it's an ordinary content line.
fn section_heading(line: &str) -> Option<&str> {
    let trimmed = line.trim();
    if trimmed.starts_with('[') && trimmed.ends_with(']') && trimmed.len() >= 2 {
        Some(&trimmed[1..trimmed.len() - 1])
    } else {
        None
    }
}

fn parse_variable_line(line: &str, variables: &mut Vec<(String, String)>) {
    let Some((key, value)) = line.split_once('=') else {
        return;
    };
    if value.is_empty() {
        return;
    }
    // First declaration wins, matching the source tool's `unordered_map::emplace`.
    if !variables.iter().any(|(k, _)| k == key) {
        variables.push((key.to_string(), value.to_string()));
    }
}

fn parse_info_line(line: &str, metadata: &mut HashMap<String, String>) {
    let Some((key, value)) = line.split_once(':') else {
        return;
    };
    metadata.entry(key.to_string()).or_insert_with(|| value.trim_start().to_string());
}

/// Substitutes every declared variable's literal name with its value.
/// Mirrors `applyVariables`: plain substring replacement, applied in
/// declaration order, with no recursive expansion.
fn apply_variables(line: &str, variables: &[(String, String)]) -> String {
    let mut result = line.to_string();
    for (key, value) in variables {
        result = result.replace(key.as_str(), value.as_str());
    }
    result
}

/// Strips leading space/underscore indentation and returns the nesting
/// depth it represents (0 = top-level `Sprite`/`Animation`/`Sample`/`L`/`T`).
fn strip_indent(line: &str) -> (usize, &str) {
    let depth = line.chars().take_while(|&c| c == ' ' || c == '_').count();
    (depth, &line[depth..])
}

fn parse_event_line(
    raw_line: &str,
    line_number: usize,
    variables: &[(String, String)],
    objects: &mut Vec<StoryboardObject>,
    samples: &mut Vec<Sample>,
    open_group: &mut OpenGroup,
    diagnostics: &mut Vec<LineDiagnostic>,
) {
    let (depth, rest) = strip_indent(raw_line);
    let substituted = apply_variables(rest, variables);
    let fields: Vec<&str> = substituted.split(',').collect();

    // A dedent below "inside a group" closes whatever group was open;
    // events at depth >= 2 stay attributed to it.
    if depth < 2 {
        *open_group = OpenGroup::None;
    }

    let Some(&keyword) = fields.first() else {
        return;
    };

    match keyword {
        "Sprite" => match parse_sprite_line(&fields) {
            Some(sprite) => objects.push(StoryboardObject::Sprite(sprite)),
            None => record(diagnostics, LineDiagnostic::warning(line_number, "malformed Sprite line, skipped")),
        },
        "Animation" => match parse_animation_line(&fields) {
            Some(animation) => objects.push(StoryboardObject::Animation(animation)),
            None => record(diagnostics, LineDiagnostic::warning(line_number, "malformed Animation line, skipped")),
        },
        "Sample" => match parse_sample_line(&fields) {
            Some(sample) => samples.push(sample),
            None => record(diagnostics, LineDiagnostic::warning(line_number, "malformed Sample line, skipped")),
        },
        "L" => {
            if matches!(open_group, OpenGroup::Loop | OpenGroup::Trigger) {
                record(diagnostics, LineDiagnostic::error(line_number, "nested L inside an open loop/trigger, skipped"));
                return;
            }
            let Some(sprite) = objects.last_mut().map(StoryboardObject::sprite_mut) else {
                record(diagnostics, LineDiagnostic::warning(line_number, "L with no preceding Sprite/Animation, skipped"));
                return;
            };
            match parse_loop_header(&fields) {
                Some((start_time, loop_count)) => {
                    sprite.loops.push(Loop::new(start_time, loop_count));
                    *open_group = OpenGroup::Loop;
                }
                None => record(diagnostics, LineDiagnostic::warning(line_number, "malformed L line, skipped")),
            }
        }
        "T" => {
            if matches!(open_group, OpenGroup::Loop | OpenGroup::Trigger) {
                record(diagnostics, LineDiagnostic::error(line_number, "nested T inside an open loop/trigger, skipped"));
                return;
            }
            let Some(sprite) = objects.last_mut().map(StoryboardObject::sprite_mut) else {
                record(diagnostics, LineDiagnostic::warning(line_number, "T with no preceding Sprite/Animation, skipped"));
                return;
            };
            match parse_trigger_header(&fields) {
                Some(trigger) => {
                    sprite.triggers.push(trigger);
                    *open_group = OpenGroup::Trigger;
                }
                None => record(diagnostics, LineDiagnostic::warning(line_number, "malformed T line, skipped")),
            }
        }
        _ => match parse_event(&fields) {
            Some(event) => {
                let Some(sprite) = objects.last_mut().map(StoryboardObject::sprite_mut) else {
                    record(diagnostics, LineDiagnostic::warning(line_number, "event with no preceding Sprite/Animation, skipped"));
                    return;
                };
                match open_group {
                    OpenGroup::Loop => {
                        if let Some(group) = sprite.loops.last_mut() {
                            group.events.push(event);
                        }
                    }
                    OpenGroup::Trigger => {
                        if let Some(group) = sprite.triggers.last_mut() {
                            group.events.push(event);
                        }
                    }
                    OpenGroup::None => sprite.events.push(event),
                }
            }
            None => record(diagnostics, LineDiagnostic::warning(line_number, format!("unrecognized event keyword '{keyword}', skipped"))),
        },
    }
}

fn strip_quotes(s: &str) -> &str {
    let trimmed = s.trim();
    if trimmed.len() >= 2 && trimmed.starts_with('"') && trimmed.ends_with('"') {
        &trimmed[1..trimmed.len() - 1]
    } else {
        trimmed
    }
}

fn parse_sprite_line(fields: &[&str]) -> Option<Sprite> {
    if fields.len() < 6 {
        return None;
    }
    let layer = Layer::parse(fields[1].trim());
    let origin = Origin::parse(fields[2].trim());
    let path = strip_quotes(fields[3]);
    let x: f64 = fields[4].trim().parse().ok()?;
    let y: f64 = fields[5].trim().parse().ok()?;
    Some(Sprite::new(layer, origin, path, DVec2::new(x, y)))
}

fn parse_animation_line(fields: &[&str]) -> Option<Animation> {
    if fields.len() < 8 {
        return None;
    }
    let layer = Layer::parse(fields[1].trim());
    let origin = Origin::parse(fields[2].trim());
    let path = strip_quotes(fields[3]);
    let x: f64 = fields[4].trim().parse().ok()?;
    let y: f64 = fields[5].trim().parse().ok()?;
    let frame_count: u32 = fields[6].trim().parse().ok()?;
    let frame_delay: f64 = fields[7].trim().parse().ok()?;
    let loop_type = fields.get(8).map(|t| LoopType::parse(t.trim())).unwrap_or_default();
    Some(Animation::new(layer, origin, path, DVec2::new(x, y), frame_count, frame_delay, loop_type, 0.0))
}

fn parse_sample_line(fields: &[&str]) -> Option<Sample> {
    if fields.len() < 5 {
        return None;
    }
    let time: f64 = fields[1].trim().parse().ok()?;
    let layer_index: i64 = fields[2].trim().parse().ok()?;
    let layer = layer_from_index(layer_index);
    let path = strip_quotes(fields[3]).to_string();
    let volume: f64 = fields[4].trim().parse().ok()?;
    Some(Sample { time, layer, filepath: path, volume })
}

/// `Sample` declares its layer as a bare integer index rather than a name,
/// matching a `static_cast<Layer>(stoi(...))` in the source tool.
fn layer_from_index(index: i64) -> Layer {
    match index {
        0 => Layer::Background,
        1 => Layer::Fail,
        2 => Layer::Pass,
        3 => Layer::Foreground,
        4 => Layer::Overlay,
        _ => Layer::default(),
    }
}

fn parse_loop_header(fields: &[&str]) -> Option<(f64, i64)> {
    if fields.len() < 3 {
        return None;
    }
    let start_time: f64 = fields[1].trim().parse().ok()?;
    let loop_count: i64 = fields[2].trim().parse().ok()?;
    Some((start_time, loop_count))
}

fn parse_trigger_header(fields: &[&str]) -> Option<Trigger> {
    if fields.len() < 4 {
        return None;
    }
    let name = fields[1].trim().to_string();
    let start_time: f64 = fields[2].trim().parse().ok()?;
    let end_time: f64 = fields[3].trim().parse().ok()?;
    let group: i64 = fields.get(4).and_then(|g| g.trim().parse().ok()).unwrap_or(0);
    Some(Trigger::new(name, start_time, end_time, group))
}

/// Parses one nested `KIND,easing,start,end,v0[,v1...]` line into an
/// `Event`, dispatching on `KIND`. An empty `end` field repeats `start`
/// (the "instantaneous set" shorthand).
fn parse_event(fields: &[&str]) -> Option<Event> {
    if fields.len() < 4 {
        return None;
    }
    let easing = Easing::from_index(fields[1].trim().parse().ok()?);
    let start_time: f64 = fields[2].trim().parse().ok()?;
    let end_time: f64 = if fields[3].trim().is_empty() {
        start_time
    } else {
        fields[3].trim().parse().ok()?
    };

    let kind = event_kind(fields[0])?;
    match kind {
        EventKind::Fade | EventKind::Scale | EventKind::Rotate | EventKind::MoveX | EventKind::MoveY => {
            let (start_value, end_value) = parse_scalar_pair(fields, 4)?;
            let timed = TimedEvent::new(easing, start_time, end_time, start_value, end_value);
            Some(match kind {
                EventKind::Fade => Event::Fade(timed),
                EventKind::Scale => Event::Scale(timed),
                EventKind::Rotate => Event::Rotate(timed),
                EventKind::MoveX => Event::MoveX(timed),
                EventKind::MoveY => Event::MoveY(timed),
                _ => unreachable!(),
            })
        }
        EventKind::VectorScale | EventKind::Move => {
            let (start_value, end_value) = parse_vector_pair(fields, 4)?;
            let timed = TimedEvent::new(easing, start_time, end_time, start_value, end_value);
            Some(if kind == EventKind::VectorScale {
                Event::VectorScale(timed)
            } else {
                Event::Move(timed)
            })
        }
        EventKind::Color => {
            let (start_value, end_value) = parse_color_pair(fields, 4)?;
            Some(Event::Color(TimedEvent::new(easing, start_time, end_time, start_value, end_value)))
        }
        EventKind::Parameter => {
            let parameter = ParameterType::parse(fields.get(4)?.trim());
            Some(Event::Parameter(TimedEvent::new(easing, start_time, end_time, parameter, parameter)))
        }
    }
}

fn event_kind(token: &str) -> Option<EventKind> {
    Some(match token {
        "F" => EventKind::Fade,
        "S" => EventKind::Scale,
        "V" => EventKind::VectorScale,
        "R" => EventKind::Rotate,
        "M" => EventKind::Move,
        "MX" => EventKind::MoveX,
        "MY" => EventKind::MoveY,
        "C" => EventKind::Color,
        "P" => EventKind::Parameter,
        _ => return None,
    })
}

fn parse_scalar_pair(fields: &[&str], at: usize) -> Option<(f64, f64)> {
    let start: f64 = fields.get(at)?.trim().parse().ok()?;
    let end = match fields.get(at + 1) {
        Some(field) if !field.trim().is_empty() => field.trim().parse().ok()?,
        _ => start,
    };
    Some((start, end))
}

fn parse_vector_pair(fields: &[&str], at: usize) -> Option<(DVec2, DVec2)> {
    let start_x: f64 = fields.get(at)?.trim().parse().ok()?;
    let start_y: f64 = fields.get(at + 1)?.trim().parse().ok()?;
    let start = DVec2::new(start_x, start_y);
    let end = match (fields.get(at + 2), fields.get(at + 3)) {
        (Some(x), Some(y)) if !x.trim().is_empty() && !y.trim().is_empty() => {
            DVec2::new(x.trim().parse().ok()?, y.trim().parse().ok()?)
        }
        _ => start,
    };
    Some((start, end))
}

fn parse_color_pair(fields: &[&str], at: usize) -> Option<(Color, Color)> {
    let r: f64 = fields.get(at)?.trim().parse::<f64>().ok()?;
    let g: f64 = fields.get(at + 1)?.trim().parse::<f64>().ok()?;
    let b: f64 = fields.get(at + 2)?.trim().parse::<f64>().ok()?;
    let start = Color::new(r / 255.0, g / 255.0, b / 255.0);
    let end = match (fields.get(at + 3), fields.get(at + 4), fields.get(at + 5)) {
        (Some(r), Some(g), Some(b)) if ![r, g, b].iter().any(|f| f.trim().is_empty()) => Color::new(
            r.trim().parse::<f64>().ok()? / 255.0,
            g.trim().parse::<f64>().ok()? / 255.0,
            b.trim().parse::<f64>().ok()? / 255.0,
        ),
        _ => start,
    };
    Some((start, end))
}
