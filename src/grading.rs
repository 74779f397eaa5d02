use crate::models::GradingMethod;

/// Scores below this earn zero grade points under every method.
pub const PASSING_SCORE: f64 = 60.0;

/// Converts a percentage score into grade points on the method's scale.
///
/// Failing scores short-circuit to `0.0` before the method is consulted.
/// Continuous formulas are rounded to two decimals; step scales are exact.
pub fn convert(score: f64, method: GradingMethod) -> f64 {
    if score < PASSING_SCORE {
        return 0.0;
    }

    match method {
        GradingMethod::Subtractive => round_to((score - 50.0) / 10.0, 2),
        GradingMethod::Linear => round_to(score / 20.0, 2),
        GradingMethod::Wes => match score {
            s if s >= 90.0 => 5.0,
            s if s >= 80.0 => 4.0,
            s if s >= 70.0 => 3.0,
            _ => 2.0,
        },
        GradingMethod::Standard4 => match score {
            s if s >= 90.0 => 4.0,
            s if s >= 80.0 => 3.0,
            s if s >= 70.0 => 2.0,
            _ => 1.0,
        },
        GradingMethod::Formula4 => {
            let curve = 4.0 - 3.0 * (100.0 - score).powi(2) / 1600.0;
            round_to(curve.max(0.0), 2)
        }
        GradingMethod::Scale45 => round_to((score - 50.0) / 10.0 * 0.9, 2),
    }
}

/// Extra digits printed past the rounding position; enough to expose the
/// exact binary value of any score-sized `f64`.
const GUARD_DIGITS: usize = 30;

/// Rounds half away from zero to `places` decimals, judged on the exact
/// decimal expansion of `value` the way fixed-point formatting does, so
/// `3.7549999..` stays `3.75` even though `* 100.0` lands on `375.5`.
pub fn round_to(value: f64, places: i32) -> f64 {
    if !value.is_finite() {
        return value;
    }

    let places = places.max(0) as usize;
    let expanded = format!("{:.*}", places + GUARD_DIGITS, value.abs());
    let (whole, fraction) = expanded.split_once('.').unwrap_or((expanded.as_str(), ""));
    let round_up = fraction.as_bytes().get(places).is_some_and(|digit| *digit >= b'5');

    let mut digits: Vec<u8> = whole.bytes().chain(fraction.bytes().take(places)).collect();
    if round_up {
        increment(&mut digits);
    }

    let split = digits.len() - places;
    let (int_part, frac_part) = digits.split_at(split);
    let text = if frac_part.is_empty() {
        String::from_utf8_lossy(int_part).into_owned()
    } else {
        format!(
            "{}.{}",
            String::from_utf8_lossy(int_part),
            String::from_utf8_lossy(frac_part)
        )
    };

    let magnitude: f64 = text.parse().unwrap_or(value.abs());
    // normalise -0.0 so formatted output never shows a sign on zero
    if magnitude == 0.0 {
        0.0
    } else {
        magnitude.copysign(value)
    }
}

/// Adds one to a string of ASCII decimal digits, growing it on overflow.
fn increment(digits: &mut Vec<u8>) {
    for digit in digits.iter_mut().rev() {
        if *digit == b'9' {
            *digit = b'0';
        } else {
            *digit += 1;
            return;
        }
    }
    digits.insert(0, b'1');
}
