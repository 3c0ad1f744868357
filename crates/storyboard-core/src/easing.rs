//! The 36-curve easing catalog.
//!
//! Every curve is a pure reparametrization of normalized time `t ∈ [0,1]`;
//! none of them touch the value being interpolated. `Step` and `Linear`
//! (aliased to `Out`/`In` by the script's parser for bare "easing 2"/"easing
//! 3") are the two curves most storyboard scripts ever actually use; the
//! rest mirror a standard easing-function catalog.

use std::f64::consts::PI;
use storyboard_data::model::Easing;

const BACK_C1: f64 = 1.70158;
const BACK_C3: f64 = BACK_C1 + 1.0;
const BOUNCE_N1: f64 = 7.5625;
const BOUNCE_D1: f64 = 2.75;

/// Applies `easing` to normalized time `t`, clamping `t` to `[0, 1]` first.
pub fn ease(easing: Easing, t: f64) -> f64 {
    let t = t.clamp(0.0, 1.0);
    match easing {
        Easing::Step => {
            if t >= 1.0 {
                1.0
            } else {
                0.0
            }
        }
        Easing::Linear => t,
        Easing::Out => out_quad(t),
        Easing::In => in_quad(t),
        Easing::InQuad => in_quad(t),
        Easing::OutQuad => out_quad(t),
        Easing::InOutQuad => in_out_quad(t),
        Easing::InCubic => in_cubic(t),
        Easing::OutCubic => out_cubic(t),
        Easing::InOutCubic => in_out_cubic(t),
        Easing::InQuart => in_quart(t),
        Easing::OutQuart => out_quart(t),
        Easing::InOutQuart => in_out_quart(t),
        Easing::InQuint => in_quint(t),
        Easing::OutQuint => out_quint(t),
        Easing::InOutQuint => in_out_quint(t),
        Easing::InSine => in_sine(t),
        Easing::OutSine => out_sine(t),
        Easing::InOutSine => in_out_sine(t),
        Easing::InExpo => in_expo(t),
        Easing::OutExpo => out_expo(t),
        Easing::InOutExpo => in_out_expo(t),
        Easing::InCirc => in_circ(t),
        Easing::OutCirc => out_circ(t),
        Easing::InOutCirc => in_out_circ(t),
        Easing::InElastic => in_elastic(t),
        Easing::OutElastic => out_elastic(t),
        Easing::OutElasticHalf => out_elastic_half(t),
        Easing::OutElasticQuarter => out_elastic_quarter(t),
        Easing::InOutElastic => in_out_elastic(t),
        Easing::InBack => in_back(t),
        Easing::OutBack => out_back(t),
        Easing::InOutBack => in_out_back(t),
        Easing::InBounce => in_bounce(t),
        Easing::OutBounce => out_bounce(t),
        Easing::InOutBounce => in_out_bounce(t),
    }
}

fn in_quad(t: f64) -> f64 {
    t * t
}

fn out_quad(t: f64) -> f64 {
    1.0 - (1.0 - t) * (1.0 - t)
}

fn in_out_quad(t: f64) -> f64 {
    if t < 0.5 {
        2.0 * t * t
    } else {
        1.0 - (-2.0 * t + 2.0).powi(2) / 2.0
    }
}

fn in_cubic(t: f64) -> f64 {
    t * t * t
}

fn out_cubic(t: f64) -> f64 {
    1.0 - (1.0 - t).powi(3)
}

fn in_out_cubic(t: f64) -> f64 {
    if t < 0.5 {
        4.0 * t * t * t
    } else {
        1.0 - (-2.0 * t + 2.0).powi(3) / 2.0
    }
}

fn in_quart(t: f64) -> f64 {
    t.powi(4)
}

fn out_quart(t: f64) -> f64 {
    1.0 - (1.0 - t).powi(4)
}

fn in_out_quart(t: f64) -> f64 {
    if t < 0.5 {
        8.0 * t.powi(4)
    } else {
        1.0 - (-2.0 * t + 2.0).powi(4) / 2.0
    }
}

fn in_quint(t: f64) -> f64 {
    t.powi(5)
}

fn out_quint(t: f64) -> f64 {
    1.0 - (1.0 - t).powi(5)
}

fn in_out_quint(t: f64) -> f64 {
    if t < 0.5 {
        16.0 * t.powi(5)
    } else {
        1.0 - (-2.0 * t + 2.0).powi(5) / 2.0
    }
}

fn in_sine(t: f64) -> f64 {
    1.0 - (t * PI / 2.0).cos()
}

fn out_sine(t: f64) -> f64 {
    (t * PI / 2.0).sin()
}

fn in_out_sine(t: f64) -> f64 {
    -((PI * t).cos() - 1.0) / 2.0
}

fn in_expo(t: f64) -> f64 {
    if t == 0.0 {
        0.0
    } else {
        2f64.powf(10.0 * t - 10.0)
    }
}

fn out_expo(t: f64) -> f64 {
    if t == 1.0 {
        1.0
    } else {
        1.0 - 2f64.powf(-10.0 * t)
    }
}

fn in_out_expo(t: f64) -> f64 {
    if t == 0.0 {
        0.0
    } else if t == 1.0 {
        1.0
    } else if t < 0.5 {
        2f64.powf(20.0 * t - 10.0) / 2.0
    } else {
        (2.0 - 2f64.powf(-20.0 * t + 10.0)) / 2.0
    }
}

fn in_circ(t: f64) -> f64 {
    1.0 - (1.0 - t * t).sqrt()
}

fn out_circ(t: f64) -> f64 {
    (1.0 - (t - 1.0).powi(2)).sqrt()
}

fn in_out_circ(t: f64) -> f64 {
    if t < 0.5 {
        (1.0 - (1.0 - (2.0 * t).powi(2)).sqrt()) / 2.0
    } else {
        ((1.0 - (-2.0 * t + 2.0).powi(2)).sqrt() + 1.0) / 2.0
    }
}

fn in_back(t: f64) -> f64 {
    BACK_C3 * t * t * t - BACK_C1 * t * t
}

fn out_back(t: f64) -> f64 {
    1.0 + BACK_C3 * (t - 1.0).powi(3) + BACK_C1 * (t - 1.0).powi(2)
}

fn in_out_back(t: f64) -> f64 {
    let c2 = BACK_C1 * 1.525;
    if t < 0.5 {
        ((2.0 * t).powi(2) * ((c2 + 1.0) * 2.0 * t - c2)) / 2.0
    } else {
        ((2.0 * t - 2.0).powi(2) * ((c2 + 1.0) * (t * 2.0 - 2.0) + c2) + 2.0) / 2.0
    }
}

/// `t−0.075` scaled by a *quadratic* (not linear) frequency term `(2t)/0.3` —
/// this is the source tool's own formula, not the standard easings.net one
/// (which instead uses a fixed `2π/3` frequency). The endpoint guards exist
/// only to satisfy the `ease(e,0)=0`/`ease(e,1)=1` round-trip invariant; the
/// raw formula evaluates to `1.0` at `t=0`.
fn out_elastic(t: f64) -> f64 {
    if t <= 0.0 {
        0.0
    } else if t >= 1.0 {
        1.0
    } else {
        2f64.powf(-10.0 * t) * ((t - 0.075) * (2.0 * t) / 0.3).sin() + 1.0
    }
}

fn in_elastic(t: f64) -> f64 {
    if t <= 0.0 {
        0.0
    } else if t >= 1.0 {
        1.0
    } else {
        1.0 - out_elastic(1.0 - t)
    }
}

/// `amplitude` is the `Half`/`Quarter` phase multiplier (`0.5`/`0.25`); unlike
/// [`out_elastic`] these use a fixed `2π/0.3` frequency rather than a
/// quadratic one.
fn out_elastic_damped(t: f64, amplitude: f64) -> f64 {
    if t <= 0.0 {
        0.0
    } else if t >= 1.0 {
        1.0
    } else {
        let c4 = (2.0 * PI) / 0.3;
        2f64.powf(-10.0 * t) * ((amplitude * t - 0.075) * c4).sin() + 1.0
    }
}

fn out_elastic_half(t: f64) -> f64 {
    out_elastic_damped(t, 0.5)
}

fn out_elastic_quarter(t: f64) -> f64 {
    out_elastic_damped(t, 0.25)
}

fn in_out_elastic(t: f64) -> f64 {
    if t < 0.5 {
        0.5 * in_elastic(2.0 * t)
    } else {
        0.5 * (2.0 - in_elastic(2.0 - 2.0 * t))
    }
}

fn out_bounce(t: f64) -> f64 {
    if t < 1.0 / BOUNCE_D1 {
        BOUNCE_N1 * t * t
    } else if t < 2.0 / BOUNCE_D1 {
        let t = t - 1.5 / BOUNCE_D1;
        BOUNCE_N1 * t * t + 0.75
    } else if t < 2.5 / BOUNCE_D1 {
        let t = t - 2.25 / BOUNCE_D1;
        BOUNCE_N1 * t * t + 0.9375
    } else {
        let t = t - 2.625 / BOUNCE_D1;
        BOUNCE_N1 * t * t + 0.984375
    }
}

fn in_bounce(t: f64) -> f64 {
    1.0 - out_bounce(1.0 - t)
}

fn in_out_bounce(t: f64) -> f64 {
    if t < 0.5 {
        (1.0 - out_bounce(1.0 - 2.0 * t)) / 2.0
    } else {
        (1.0 + out_bounce(2.0 * t - 1.0)) / 2.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoints_hold_for_every_curve() {
        let curves = [
            Easing::Step,
            Easing::Linear,
            Easing::Out,
            Easing::In,
            Easing::InQuad,
            Easing::OutQuad,
            Easing::InOutQuad,
            Easing::InCubic,
            Easing::OutCubic,
            Easing::InOutCubic,
            Easing::InQuart,
            Easing::OutQuart,
            Easing::InOutQuart,
            Easing::InQuint,
            Easing::OutQuint,
            Easing::InOutQuint,
            Easing::InSine,
            Easing::OutSine,
            Easing::InOutSine,
            Easing::InExpo,
            Easing::OutExpo,
            Easing::InOutExpo,
            Easing::InCirc,
            Easing::OutCirc,
            Easing::InOutCirc,
            Easing::InElastic,
            Easing::OutElastic,
            Easing::OutElasticHalf,
            Easing::OutElasticQuarter,
            Easing::InOutElastic,
            Easing::InBack,
            Easing::OutBack,
            Easing::InOutBack,
            Easing::InBounce,
            Easing::OutBounce,
            Easing::InOutBounce,
        ];
        for curve in curves {
            let start = ease(curve, 0.0);
            let end = ease(curve, 1.0);
            assert!((start - 0.0).abs() < 1e-9, "{curve:?} at t=0 was {start}");
            assert!((end - 1.0).abs() < 1e-9, "{curve:?} at t=1 was {end}");
        }
    }

    #[test]
    fn out_elastic_matches_the_source_tools_quadratic_phase_formula() {
        // pow(2, -5) * sin((0.5 - 0.075) * 1.0 / 0.3) + 1
        let value = ease(Easing::OutElastic, 0.5);
        assert!((value - 1.03087).abs() < 1e-4, "OutElastic(0.5) was {value}");
    }

    #[test]
    fn linear_is_identity() {
        assert_eq!(ease(Easing::Linear, 0.25), 0.25);
        assert_eq!(ease(Easing::Linear, 0.75), 0.75);
    }

    #[test]
    fn step_holds_until_the_end() {
        assert_eq!(ease(Easing::Step, 0.0), 0.0);
        assert_eq!(ease(Easing::Step, 0.99), 0.0);
        assert_eq!(ease(Easing::Step, 1.0), 1.0);
    }

    #[test]
    fn out_of_range_t_is_clamped() {
        assert_eq!(ease(Easing::Linear, -1.0), 0.0);
        assert_eq!(ease(Easing::Linear, 2.0), 1.0);
    }
}
