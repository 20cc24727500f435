use letrio_db::models::{Statistics, Validation};

pub fn statistics(validations: &[Validation]) -> Statistics {
    let total = validations.len() as u32;
    let hits = validations.iter().filter(|v| v.is_hit()).count() as u32;

    let overall_accuracy = if total == 0 {
        0
    } else {
        (100.0 * hits as f64 / total as f64).round() as u32
    };

    let current_streak = validations.iter().rev().take_while(|v| v.is_hit()).count() as u32;

    let mut longest_streak = 0u32;
    let mut run = 0u32;
    for v in validations {
        if v.is_hit() {
            run += 1;
            longest_streak = longest_streak.max(run);
        } else {
            run = 0;
        }
    }

    Statistics {
        overall_accuracy,
        current_streak,
        longest_streak,
        total,
        hits,
        hundred_hits: validations.iter().filter(|v| v.hundred_hit).count() as u32,
        ten_hits: validations.iter().filter(|v| v.ten_hit).count() as u32,
        one_hits: validations.iter().filter(|v| v.one_hit).count() as u32,
    }
}
