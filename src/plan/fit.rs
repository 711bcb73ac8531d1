use crate::error::FitError;
use crate::model::Task;

/// Force the task durations to add up to exactly `budget` minutes.
///
/// Extra time goes to the last task. Excess time is removed by scaling every
/// task proportionally, then the rounding drift is spread one minute at a time
/// in plan order, never taking a task below one minute.
pub fn fit_to_budget(tasks: &mut [Task], budget: u32) -> Result<(), FitError> {
    if tasks.is_empty() {
        return Ok(());
    }
    let total: u64 = tasks.iter().map(|t| u64::from(t.duration_minutes())).sum();
    if total == 0 {
        return Ok(());
    }
    let target = u64::from(budget);

    if total < target {
        if let Some(last) = tasks.last_mut() {
            last.extend(budget - total as u32);
        }
        return Ok(());
    }
    if total == target {
        return Ok(());
    }
    if target < tasks.len() as u64 {
        return Err(FitError::BudgetTooSmall {
            budget,
            tasks: tasks.len(),
        });
    }

    let mut minutes: Vec<u64> = tasks
        .iter()
        .map(|t| scale_half_up(u64::from(t.duration_minutes()), target, total).max(1))
        .collect();

    let mut drift = target as i64 - minutes.iter().sum::<u64>() as i64;
    let mut idx = 0;
    while drift != 0 {
        if drift > 0 {
            minutes[idx] += 1;
            drift -= 1;
        } else if minutes[idx] > 1 {
            minutes[idx] -= 1;
            drift += 1;
        }
        idx = (idx + 1) % minutes.len();
    }

    for (task, m) in tasks.iter_mut().zip(minutes) {
        // every value is within 1..=budget here
        let applied = task.set_duration(m as u32);
        debug_assert!(applied.is_ok(), "fitted duration {m} out of range");
    }
    Ok(())
}

/// `value * target / total` rounded half-up. Products of two `u32` minute
/// counts can exceed `u64` once doubled, so the arithmetic runs in `u128`.
fn scale_half_up(value: u64, target: u64, total: u64) -> u64 {
    let (value, target, total) = (u128::from(value), u128::from(target), u128::from(total));
    ((2 * value * target + total) / (2 * total)) as u64
}
