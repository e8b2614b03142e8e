use std::collections::HashSet;
use uuid::Uuid;

/// Completion percentage of an order, rounded to one decimal.
///
/// Only completed modules that still belong to the course count. A course
/// without modules is at 0%.
pub fn calculate(completed: &HashSet<Uuid>, course_modules: &[Uuid]) -> f64 {
    if course_modules.is_empty() {
        return 0.0;
    }
    let done = course_modules
        .iter()
        .filter(|id| completed.contains(id))
        .count();
    round_to_tenth(done as f64 * 100.0 / course_modules.len() as f64)
}

/// Number of completed modules that belong to the course.
pub fn completed_count(completed: &HashSet<Uuid>, course_modules: &[Uuid]) -> usize {
    course_modules
        .iter()
        .filter(|id| completed.contains(id))
        .count()
}

/// Whole percent persisted on the order.
pub fn stored(percent: f64) -> i32 {
    percent.clamp(0.0, 100.0).trunc() as i32
}

/// How many modules a manual progress value stands for.
///
/// `percent` is clamped to 0..=100; halves round to even.
pub fn modules_for_percent(percent: i32, total_modules: usize) -> usize {
    let percent = percent.clamp(0, 100);
    let wanted = (f64::from(percent) / 100.0 * total_modules as f64).round_ties_even();
    (wanted as usize).min(total_modules)
}

/// Mean stored progress of a set of orders, one decimal; 0 without orders.
pub fn average(stored: &[i32]) -> f64 {
    if stored.is_empty() {
        return 0.0;
    }
    let sum: i64 = stored.iter().map(|p| i64::from(*p)).sum();
    round_to_tenth(sum as f64 / stored.len() as f64)
}

fn round_to_tenth(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(n: usize) -> Vec<Uuid> {
        (0..n).map(|_| Uuid::new_v4()).collect()
    }

    #[test]
    fn zero_modules_is_zero_percent() {
        assert_eq!(calculate(&HashSet::new(), &[]), 0.0);
    }

    #[test]
    fn half_of_four_modules() {
        let modules = ids(4);
        let completed: HashSet<_> = modules[..2].iter().copied().collect();
        assert_eq!(calculate(&completed, &modules), 50.0);
    }

    #[test]
    fn all_modules_is_one_hundred() {
        let modules = ids(4);
        let completed: HashSet<_> = modules.iter().copied().collect();
        assert_eq!(calculate(&completed, &modules), 100.0);
    }

    #[test]
    fn thirds_round_to_one_decimal() {
        let modules = ids(3);
        let completed: HashSet<_> = modules[..1].iter().copied().collect();
        assert_eq!(calculate(&completed, &modules), 33.3);
        let completed: HashSet<_> = modules[..2].iter().copied().collect();
        assert_eq!(calculate(&completed, &modules), 66.7);
    }

    #[test]
    fn foreign_modules_do_not_count() {
        let modules = ids(2);
        let completed: HashSet<_> = [modules[0], Uuid::new_v4()].into_iter().collect();
        assert_eq!(calculate(&completed, &modules), 50.0);
        assert_eq!(completed_count(&completed, &modules), 1);
    }

    #[test]
    fn stored_progress_truncates() {
        assert_eq!(stored(66.7), 66);
        assert_eq!(stored(100.0), 100);
        assert_eq!(stored(-3.0), 0);
    }

    #[test]
    fn manual_progress_maps_to_module_count() {
        assert_eq!(modules_for_percent(50, 4), 2);
        assert_eq!(modules_for_percent(100, 7), 7);
        assert_eq!(modules_for_percent(0, 7), 0);
        assert_eq!(modules_for_percent(30, 10), 3);
    }

    #[test]
    fn manual_progress_rounds_halves_to_even() {
        // 50% of 5 modules is 2.5, 50% of 3 is 1.5
        assert_eq!(modules_for_percent(50, 5), 2);
        assert_eq!(modules_for_percent(50, 3), 2);
    }

    #[test]
    fn manual_progress_is_clamped() {
        assert_eq!(modules_for_percent(250, 4), 4);
        assert_eq!(modules_for_percent(-20, 4), 0);
        assert_eq!(modules_for_percent(80, 0), 0);
    }

    #[test]
    fn average_of_stored_progress() {
        assert_eq!(average(&[]), 0.0);
        assert_eq!(average(&[100, 50, 0]), 50.0);
        assert_eq!(average(&[33, 66]), 49.5);
        assert_eq!(average(&[10, 20, 20]), 16.7);
    }
}
