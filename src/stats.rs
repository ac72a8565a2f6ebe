use crate::config::ProgressSettings;
use crate::models::{Streak, TaskRecord, WeeklyPoint, WeeklyResponse};
use crate::progress::percentage;
use chrono::{Duration, NaiveDate};

pub const WINDOW_DAYS: i64 = 7;

pub fn build_weekly_at(
    today: NaiveDate,
    user_id: &str,
    rows: &[TaskRecord],
    settings: &ProgressSettings,
) -> WeeklyResponse {
    let points = weekly_trend(today, rows, settings.weekly_fallback_total);
    let streak = streaks(&points, settings.good_day_threshold);
    WeeklyResponse {
        user_id: user_id.to_string(),
        points,
        streak,
    }
}

/// Seven points, oldest first, ending at `today`. Rows outside the window are ignored.
pub fn weekly_trend(today: NaiveDate, rows: &[TaskRecord], fallback_total: u32) -> Vec<WeeklyPoint> {
    (0..WINDOW_DAYS)
        .rev()
        .map(|offset| {
            let date = today - Duration::days(offset);
            let (completed, count) = rows
                .iter()
                .filter(|row| row.date == date)
                .fold((0u32, 0u32), |(done, all), row| {
                    (done + u32::from(row.completed), all + 1)
                });
            weekly_point(date, completed, count, fallback_total)
        })
        .collect()
}

/// Row-level point for one day. A day with no rows is measured against `fallback_total`.
pub fn weekly_point(date: NaiveDate, completed: u32, row_count: u32, fallback_total: u32) -> WeeklyPoint {
    let total = if row_count == 0 { fallback_total } else { row_count };
    WeeklyPoint {
        date,
        label: day_label(date),
        percentage: percentage(completed, total),
        completed,
        total,
    }
}

/// `points` must be ordered oldest to newest.
pub fn streaks(points: &[WeeklyPoint], threshold: u32) -> Streak {
    let good = |point: &WeeklyPoint| point.percentage >= threshold;

    let current = points.iter().rev().take_while(|&point| good(point)).count() as u32;

    let mut best = 0u32;
    let mut run = 0u32;
    for point in points {
        if good(point) {
            run += 1;
            best = best.max(run);
        } else {
            run = 0;
        }
    }

    Streak { current, best }
}

fn day_label(date: NaiveDate) -> String {
    date.format("%a").to_string()
}
