use serde::{Deserialize, Serialize};

/// Segment interpolation. Ordered so the stronger side of a segment wins.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Interpolation {
    Constant,
    Linear,
    Ease,
}

#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct Keyframe {
    pub time: f32,
    pub value: f32,
    pub in_interpolation: Interpolation,
    pub out_interpolation: Interpolation,
    pub in_tangent: f32,
    pub out_tangent: f32,
    pub in_weight: f32,
    pub out_weight: f32,
}

impl Keyframe {
    #[allow(clippy::too_many_arguments)]
    pub const fn new(
        time: f32,
        value: f32,
        in_interpolation: Interpolation,
        out_interpolation: Interpolation,
        in_tangent: f32,
        out_tangent: f32,
        in_weight: f32,
        out_weight: f32,
    ) -> Self {
        Self {
            time,
            value,
            in_interpolation,
            out_interpolation,
            in_tangent,
            out_tangent,
            in_weight,
            out_weight,
        }
    }

    /// Flat-tangent ease key, the editor's default.
    pub const fn simple(time: f32, value: f32) -> Self {
        Self::new(
            time,
            value,
            Interpolation::Ease,
            Interpolation::Ease,
            0.0,
            0.0,
            1.0 / 3.0,
            1.0 / 3.0,
        )
    }

    pub const fn linear(time: f32, value: f32) -> Self {
        Self::new(
            time,
            value,
            Interpolation::Linear,
            Interpolation::Linear,
            0.0,
            0.0,
            1.0 / 3.0,
            1.0 / 3.0,
        )
    }

    pub const fn constant(time: f32, value: f32) -> Self {
        Self::new(
            time,
            value,
            Interpolation::Constant,
            Interpolation::Constant,
            0.0,
            0.0,
            1.0 / 3.0,
            1.0 / 3.0,
        )
    }
}

/// Evaluates a keyframe curve at `t`. Empty curves evaluate to 0.
pub fn evaluate(keyframes: &[Keyframe], t: f32) -> f32 {
    KeyframeCursor::new().evaluate(keyframes, t)
}

/// Evaluates the segment `[start, end]` at `t`, with `start.time <= t <= end.time`.
pub fn evaluate_segment(start: &Keyframe, end: &Keyframe, t: f32) -> f32 {
    if start.out_interpolation == Interpolation::Constant {
        return start.value;
    }
    if end.in_interpolation == Interpolation::Constant {
        return end.value;
    }

    let dt = end.time - start.time;
    if dt <= 0.0 {
        return end.value;
    }
    let u = (t - start.time) / dt;

    match start.out_interpolation.max(end.in_interpolation) {
        Interpolation::Linear => start.value + (end.value - start.value) * u,
        Interpolation::Ease => {
            let p0 = start.value;
            let p1 = p0 + start.out_tangent * dt * start.out_weight;
            let p3 = end.value;
            let p2 = p3 - end.in_tangent * dt * end.in_weight;
            cubic_bezier(p0, p1, p2, p3, u)
        }
        Interpolation::Constant => start.value,
    }
}

fn cubic_bezier(p0: f32, p1: f32, p2: f32, p3: f32, u: f32) -> f32 {
    let one_minus_u = 1.0 - u;
    let one_minus_u2 = one_minus_u * one_minus_u;
    let u2 = u * u;
    one_minus_u2 * one_minus_u * p0
        + 3.0 * one_minus_u2 * u * p1
        + 3.0 * one_minus_u * u2 * p2
        + u2 * u * p3
}

/// Carries the last bracketing segment between evaluations.
///
/// Builds sample curves at increasing parameters, so the segment search
/// usually advances by zero or one key. Moving backwards restarts the scan.
#[derive(Debug, Default, Clone, Copy)]
pub struct KeyframeCursor {
    index: usize,
}

impl KeyframeCursor {
    pub const fn new() -> Self {
        Self { index: 0 }
    }

    pub fn evaluate(&mut self, keyframes: &[Keyframe], t: f32) -> f32 {
        let (first, last) = match (keyframes.first(), keyframes.last()) {
            (Some(first), Some(last)) => (first, last),
            _ => return 0.0,
        };
        if t <= first.time {
            return first.value;
        }
        if t >= last.time {
            return last.value;
        }

        if self.index >= keyframes.len() - 1 || keyframes[self.index].time > t {
            self.index = 0;
        }
        while keyframes[self.index + 1].time <= t {
            self.index += 1;
        }

        evaluate_segment(&keyframes[self.index], &keyframes[self.index + 1], t)
    }
}
