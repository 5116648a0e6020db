//! Forgetting - priority decay toward quality.
//!
//! `priority' = floor + (priority - floor) * exp(-elapsed / durability)`
//! where `floor` is the quality (zero when quality is unused). Elapsed time is
//! measured in duration units. Steps that would change priority by less than
//! `relative_threshold * priority` are skipped and leave the budget untouched,
//! including its forget timestamp, so skipped time accumulates into the next step.

use super::Budget;

/// Decay `budget` by `elapsed_durations` duration units.
///
/// Pure and deterministic. Never raises priority and never drops it below the
/// quality floor. An applied step stamps the result with `reference_time`.
///
/// # Panics
/// Panics if `elapsed_durations` is negative or NaN, if `relative_threshold` is
/// outside [0, 1), or if the budget's priority or durability is not finite.
///
/// # Example
/// ```
/// use attend_core::budget::{forget, Budget};
/// let b = Budget::new(0.9, 0.5, 0.2);
/// let decayed = forget(&b, 1.0, 0.01, 10);
/// assert!(decayed.priority() < 0.9);
/// assert!(decayed.priority() >= 0.2);
/// assert_eq!(decayed.last_forget_time(), Some(10));
/// ```
#[must_use]
pub fn forget(
    budget: &Budget,
    elapsed_durations: f64,
    relative_threshold: f64,
    reference_time: u64,
) -> Budget {
    // Preconditions
    assert!(
        elapsed_durations >= 0.0,
        "elapsed_durations must be >= 0, got {}",
        elapsed_durations
    );
    assert!(
        (0.0..1.0).contains(&relative_threshold),
        "relative_threshold must be in [0, 1), got {}",
        relative_threshold
    );
    assert!(
        budget.validate().is_ok(),
        "cannot forget a malformed budget {}",
        budget
    );

    let priority = budget.priority();
    let floor = budget.quality_floor();
    if elapsed_durations == 0.0 || priority <= floor {
        return *budget;
    }

    let retention = if budget.durability() <= 0.0 {
        0.0
    } else {
        (-elapsed_durations / budget.durability()).exp()
    };
    let decayed = (floor + (priority - floor) * retention).clamp(floor, priority);

    if priority - decayed < relative_threshold * priority || decayed == priority {
        return *budget;
    }

    let result = budget
        .with_priority(decayed)
        .with_last_forget_time(reference_time);

    // Postconditions
    assert!(result.priority() <= priority, "forgetting raised priority");
    assert!(result.priority() >= floor, "forgetting overshot quality");
    result
}

/// Decay by the time elapsed since the budget was last forgotten.
///
/// `forget_period` is the number of time units per duration unit of decay.
/// A budget that was never forgotten is only stamped with `now`.
///
/// # Panics
/// Panics if `forget_period` is not positive, or under the same conditions as [`forget`].
#[must_use]
pub fn forget_periodic(
    budget: &Budget,
    now: u64,
    forget_period: f64,
    relative_threshold: f64,
) -> Budget {
    // Precondition
    assert!(
        forget_period > 0.0,
        "forget_period must be > 0, got {}",
        forget_period
    );

    match budget.last_forget_time() {
        None => budget.with_last_forget_time(now),
        Some(last) => {
            let elapsed = now.saturating_sub(last);
            if elapsed == 0 {
                return *budget;
            }
            #[allow(clippy::cast_precision_loss)]
            let elapsed_durations = elapsed as f64 / forget_period;
            forget(budget, elapsed_durations, relative_threshold, now)
        }
    }
}
