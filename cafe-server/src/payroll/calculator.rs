//! Payroll calculator
//!
//! ```text
//! overtime_pay = overtime_hours · overtime_rate
//! gross        = basic_salary + overtime_pay
//! deductions   = late_penalty · late_days + absence_penalty · absent_days
//! net          = gross − deductions            (may be negative)
//! ```

use std::collections::{HashMap, HashSet};

use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use rust_decimal::prelude::*;
use serde::Serialize;
use shared::models::{Attendance, OvertimeRequest};

use crate::pricing::money::{round_money, to_decimal, to_f64};

/// Monday to Friday, for employees without a shift template
pub const DEFAULT_WORK_DAYS: [u32; 5] = [1, 2, 3, 4, 5];

/// Everything the calculation needs for one employee and one month
#[derive(Debug, Clone)]
pub struct PayrollInput<'a> {
    pub basic_salary: f64,
    pub overtime_rate: f64,
    pub attendance: &'a [Attendance],
    pub approved_overtime: &'a [OvertimeRequest],
    pub late_penalty: f64,
    pub absence_penalty: f64,
    pub overtime_requires_approval: bool,
    /// ISO weekdays (1 = Monday) the employee is scheduled to work
    pub work_days: &'a [u32],
    pub period_start: NaiveDate,
    /// Last day counted for absences: `min(period end, today)`
    pub cutoff: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PayrollBreakdown {
    pub basic_salary: f64,
    pub overtime_hours: f64,
    pub overtime_pay: f64,
    pub late_days: i64,
    pub absent_days: i64,
    pub late_deduction: f64,
    pub absence_deduction: f64,
    pub gross: f64,
    pub deductions: f64,
    pub net: f64,
}

/// Overtime hours counted for pay
///
/// With approval required, each day's overtime is capped at the hours the
/// owner approved for that day.
fn counted_overtime_hours(input: &PayrollInput<'_>) -> Decimal {
    let mut approved: HashMap<&str, Decimal> = HashMap::new();
    for req in input.approved_overtime {
        *approved.entry(req.work_date.as_str()).or_default() += to_decimal(req.hours);
    }

    input
        .attendance
        .iter()
        .filter_map(|row| row.overtime_minutes.map(|m| (row, m)))
        .map(|(row, minutes)| {
            let worked = Decimal::from(minutes.max(0)) / Decimal::from(60);
            if input.overtime_requires_approval {
                let cap = approved
                    .get(row.work_date.as_str())
                    .copied()
                    .unwrap_or_default();
                worked.min(cap)
            } else {
                worked
            }
        })
        .sum()
}

/// Scheduled days in `[period_start, cutoff]` with no attendance row
fn absent_days(input: &PayrollInput<'_>) -> i64 {
    let present: HashSet<&str> = input
        .attendance
        .iter()
        .map(|a| a.work_date.as_str())
        .collect();

    input
        .period_start
        .iter_days()
        .take_while(|d| *d <= input.cutoff)
        .filter(|d| input.work_days.contains(&d.weekday().number_from_monday()))
        .filter(|d| !present.contains(d.format("%Y-%m-%d").to_string().as_str()))
        .count() as i64
}

pub fn calculate(input: &PayrollInput<'_>) -> PayrollBreakdown {
    let overtime_hours = counted_overtime_hours(input)
        .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    let late_days = input.attendance.iter().filter(|a| a.is_late).count() as i64;
    let absent_days = absent_days(input);

    // Components are rounded to whole rupiah before they are summed, so the
    // stored totals satisfy the identities above exactly.
    let basic = round_money(to_decimal(input.basic_salary));
    let overtime_pay = round_money(overtime_hours * to_decimal(input.overtime_rate));
    let late_deduction = round_money(to_decimal(input.late_penalty) * Decimal::from(late_days));
    let absence_deduction =
        round_money(to_decimal(input.absence_penalty) * Decimal::from(absent_days));

    let gross = basic + overtime_pay;
    let deductions = late_deduction + absence_deduction;
    let net = gross - deductions;

    PayrollBreakdown {
        basic_salary: to_f64(basic),
        overtime_hours: overtime_hours.to_f64().unwrap_or_default(),
        overtime_pay: to_f64(overtime_pay),
        late_days,
        absent_days,
        late_deduction: to_f64(late_deduction),
        absence_deduction: to_f64(absence_deduction),
        gross: to_f64(gross),
        deductions: to_f64(deductions),
        net: to_f64(net),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::models::OvertimeStatus;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn attendance(day: &str, overtime_minutes: Option<i64>, is_late: bool) -> Attendance {
        Attendance {
            id: 1,
            employee_id: 7,
            work_date: day.into(),
            clock_in_at: 0,
            clock_in_lat: 0.0,
            clock_in_lng: 0.0,
            clock_in_distance_m: 0.0,
            clock_out_at: overtime_minutes.map(|_| 1),
            clock_out_lat: None,
            clock_out_lng: None,
            clock_out_distance_m: None,
            scheduled_minutes: 480,
            worked_minutes: overtime_minutes.map(|m| 480 + m),
            overtime_minutes,
            is_late,
            late_minutes: if is_late { 15 } else { 0 },
            created_at: 0,
            updated_at: 0,
        }
    }

    fn approved(day: &str, hours: f64) -> OvertimeRequest {
        OvertimeRequest {
            id: 1,
            employee_id: 7,
            work_date: day.into(),
            hours,
            reason: "stock take".into(),
            status: OvertimeStatus::Approved,
            reviewed_by: Some(1),
            reviewed_at: Some(0),
            review_note: None,
            created_at: 0,
        }
    }

    fn input<'a>(rows: &'a [Attendance], ot: &'a [OvertimeRequest]) -> PayrollInput<'a> {
        PayrollInput {
            basic_salary: 4_000_000.0,
            overtime_rate: 25_000.0,
            attendance: rows,
            approved_overtime: ot,
            late_penalty: 20_000.0,
            absence_penalty: 100_000.0,
            overtime_requires_approval: false,
            work_days: &DEFAULT_WORK_DAYS,
            // 2024-05-01 is a Wednesday
            period_start: date("2024-05-01"),
            cutoff: date("2024-05-03"),
        }
    }

    #[test]
    fn test_net_is_gross_minus_deductions() {
        let rows = vec![
            attendance("2024-05-01", Some(90), true),
            attendance("2024-05-02", Some(0), false),
        ];
        let b = calculate(&input(&rows, &[]));

        assert_eq!(b.overtime_hours, 1.5);
        assert_eq!(b.overtime_pay, 37_500.0);
        assert_eq!(b.late_days, 1);
        // Friday 2024-05-03 has no row
        assert_eq!(b.absent_days, 1);
        assert_eq!(b.gross, b.basic_salary + b.overtime_pay);
        assert_eq!(b.deductions, 20_000.0 * 1.0 + 100_000.0 * 1.0);
        assert_eq!(b.net, b.gross - b.deductions);
        assert_eq!(b.net, 3_917_500.0);
    }

    #[test]
    fn test_overtime_capped_by_approval() {
        let rows = vec![
            attendance("2024-05-01", Some(120), false),
            attendance("2024-05-02", Some(60), false),
            attendance("2024-05-03", Some(0), false),
        ];
        let ot = vec![approved("2024-05-01", 1.0)];
        let mut i = input(&rows, &ot);
        i.overtime_requires_approval = true;

        let b = calculate(&i);
        // 2h worked but 1h approved; 1h on the 2nd was never approved
        assert_eq!(b.overtime_hours, 1.0);
        assert_eq!(b.overtime_pay, 25_000.0);
        assert_eq!(b.absent_days, 0);
    }

    #[test]
    fn test_weekends_are_not_absences() {
        let mut i = input(&[], &[]);
        i.cutoff = date("2024-05-31");
        // May 2024 has 23 weekdays
        assert_eq!(calculate(&i).absent_days, 23);

        let weekend_only = [6, 7];
        i.work_days = &weekend_only;
        assert_eq!(calculate(&i).absent_days, 8);
    }

    #[test]
    fn test_future_period_has_no_absences() {
        let mut i = input(&[], &[]);
        i.cutoff = date("2024-04-30");
        assert_eq!(calculate(&i).absent_days, 0);
    }

    #[test]
    fn test_net_is_not_clamped() {
        let mut i = input(&[], &[]);
        i.basic_salary = 100_000.0;
        i.cutoff = date("2024-05-31");
        let b = calculate(&i);
        assert_eq!(b.deductions, 2_300_000.0);
        assert_eq!(b.net, -2_200_000.0);
    }

    #[test]
    fn test_open_rows_have_no_overtime() {
        let rows = vec![attendance("2024-05-01", None, false)];
        let b = calculate(&input(&rows, &[]));
        assert_eq!(b.overtime_hours, 0.0);
    }

    #[test]
    fn test_fractional_inputs_keep_totals_consistent() {
        let rows = vec![attendance("2024-05-01", Some(50), true)];
        let mut i = input(&rows, &[]);
        i.basic_salary = 100.4;
        i.overtime_rate = 10.3;
        i.late_penalty = 0.5;
        i.cutoff = date("2024-05-01");

        let b = calculate(&i);
        assert_eq!(b.basic_salary, 100.0);
        // 0.83 h · 10.3 = 8.549
        assert_eq!(b.overtime_pay, 9.0);
        assert_eq!(b.late_deduction, 1.0);
        assert_eq!(b.gross, b.basic_salary + b.overtime_pay);
        assert_eq!(b.deductions, b.late_deduction + b.absence_deduction);
        assert_eq!(b.net, b.gross - b.deductions);
        assert_eq!(b.net, 108.0);
    }
}
