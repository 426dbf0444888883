use chrono::{DateTime, Datelike, NaiveDate, NaiveTime, TimeZone, Utc};

use crate::errors::{Result, ScheduleError};

/// step `months` calendar months forward from `date`, keeping the day of month
/// and clamping to the last day when the target month is shorter
pub fn add_months(date: NaiveDate, months: u32) -> Result<NaiveDate> {
    let zero_based = date.month0() as i64 + months as i64;
    let year = date.year() as i64 + zero_based / 12;
    let month = (zero_based % 12) as u32 + 1;

    let year = i32::try_from(year).map_err(|_| ScheduleError::InvalidDate {
        message: format!("{} + {} months is out of range", date, months),
    })?;

    let day = date.day().min(days_in_month(year, month));

    NaiveDate::from_ymd_opt(year, month, day).ok_or_else(|| ScheduleError::InvalidDate {
        message: format!("{} + {} months is out of range", date, months),
    })
}

/// due date of the 1-based `period`, always anchored on the first payment date
pub fn due_date_for_period(first_payment_date: NaiveDate, period: u32) -> Result<NaiveDate> {
    add_months(first_payment_date, period.saturating_sub(1))
}

/// fixed midday instant for a calendar date
pub fn at_midday(date: NaiveDate) -> DateTime<Utc> {
    let noon = NaiveTime::from_hms_opt(12, 0, 0).unwrap_or_default();
    Utc.from_utc_datetime(&date.and_time(noon))
}

pub fn days_in_month(year: i32, month: u32) -> u32 {
    match month {
        1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
        4 | 6 | 9 | 11 => 30,
        2 => {
            if is_leap_year(year) {
                29
            } else {
                28
            }
        }
        _ => 30,
    }
}

fn is_leap_year(year: i32) -> bool {
    (year % 4 == 0 && year % 100 != 0) || (year % 400 == 0)
}
