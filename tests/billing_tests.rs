use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use piv_billing::billing::{
    build_ledger, calculate_monthly_billing, monthly_charge, panel_history_for_month,
    BillingPeriod, MonthlyStatement, PanelSnapshot, DEFAULT_MONTHLY_RATE,
};
use piv_billing::config::{EventKind, MonthlyRate, PanelEvent, PanelRecord, Panels, Roster};
use piv_billing::status::PanelStatus;

fn date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

fn period(year: i32, month: u32) -> BillingPeriod {
    BillingPeriod::new(year, month).unwrap()
}

fn panel(install: Option<&str>, deinstall: Option<&str>, reinstall: Option<&str>) -> PanelRecord {
    PanelRecord {
        install_date: install.map(str::to_string),
        deinstall_date: deinstall.map(str::to_string),
        reinstall_date: reinstall.map(str::to_string),
        ..Default::default()
    }
}

fn with_rate(mut record: PanelRecord, rate: f64) -> PanelRecord {
    record.monthly_rate = Some(MonthlyRate::Amount(rate));
    record
}

fn roster_of(records: Vec<(&str, PanelRecord)>) -> Panels {
    records
        .into_iter()
        .map(|(id, record)| (id.to_string(), record))
        .collect()
}

fn billable_days_of(record: &PanelRecord, p: BillingPeriod) -> Vec<u32> {
    use chrono::Datelike;
    build_ledger(&PanelSnapshot::from(record), p, date("2024-06-01"))
        .iter()
        .filter(|d| d.is_billable)
        .map(|d| d.date.day())
        .collect()
}

// ============================================================================
// Billed days
// ============================================================================

mod billed_day_tests {
    use super::*;

    #[test]
    fn test_no_install_date_bills_nothing() {
        let panels = roster_of(vec![("P1", panel(None, Some("2024-01-10"), Some("2024-01-20")))]);

        for month in 1..=12 {
            let result = calculate_monthly_billing("P1", period(2024, month), &panels);
            assert_eq!(result.billed_days, 0);
            assert_eq!(result.amount, Decimal::ZERO);
            assert!(result.panel.is_some());
        }
    }

    #[test]
    fn test_full_month_normalizes_to_thirty() {
        let panels = roster_of(vec![("P1", panel(Some("2022-11-15"), None, None))]);

        for (year, month) in [(2024, 1), (2024, 2), (2023, 2), (2024, 4), (2024, 12)] {
            let result = calculate_monthly_billing("P1", period(year, month), &panels);
            assert_eq!(result.billed_days, 30, "{year}-{month}");
            assert_eq!(result.total_days_in_month, 30);
            assert_eq!(result.amount, dec!(37.70));
        }
    }

    #[test]
    fn test_deinstall_day_is_billable() {
        let record = panel(Some("2024-01-01"), Some("2024-01-15"), None);
        let panels = roster_of(vec![("P1", record.clone())]);

        let result = calculate_monthly_billing("P1", period(2024, 1), &panels);
        assert_eq!(result.billed_days, 15);
        assert_eq!(billable_days_of(&record, period(2024, 1)), (1..=15).collect::<Vec<_>>());

        let ledger = panel_history_for_month("P1", period(2024, 1), &panels, date("2024-06-01"));
        let day_15 = &ledger[14];
        assert!(day_15.is_billable);
        assert_eq!(day_15.status, PanelStatus::Installed);
        assert!(day_15.note.contains("23:59"));
        assert!(day_15.note.contains("full day billable"));
        assert_eq!(ledger[15].status, PanelStatus::Removed);
    }

    #[test]
    fn test_gap_between_removal_and_reinstall_is_excluded() {
        let record = panel(Some("2024-01-01"), Some("2024-01-10"), Some("2024-01-20"));
        let panels = roster_of(vec![("P1", record.clone())]);

        let result = calculate_monthly_billing("P1", period(2024, 1), &panels);
        assert_eq!(result.billed_days, 22);

        let expected: Vec<u32> = (1..=10).chain(20..=31).collect();
        assert_eq!(billable_days_of(&record, period(2024, 1)), expected);
    }

    #[test]
    fn test_reinstall_only_replaces_install() {
        let record = panel(Some("2024-01-01"), None, Some("2024-01-25"));
        let panels = roster_of(vec![("P1", record.clone())]);

        let result = calculate_monthly_billing("P1", period(2024, 1), &panels);
        assert_eq!(result.billed_days, 7);
        assert_eq!(billable_days_of(&record, period(2024, 1)), (25..=31).collect::<Vec<_>>());

        let ledger = build_ledger(&PanelSnapshot::from(&record), period(2024, 1), date("2024-06-01"));
        assert_eq!(ledger[0].status, PanelStatus::Removed);
        assert!(ledger[0].note.contains("PIV installed"));
        assert!(ledger[24].note.contains("replaces original installation"));
    }

    #[test]
    fn test_same_day_removal_and_reinstall_bills_from_that_day() {
        let record = panel(Some("2024-01-01"), Some("2024-01-10"), Some("2024-01-10"));
        let panels = roster_of(vec![("P1", record.clone())]);

        // billing restarts on the swap day and runs through month end
        assert_eq!(billable_days_of(&record, period(2024, 1)), (10..=31).collect::<Vec<_>>());
        let result = calculate_monthly_billing("P1", period(2024, 1), &panels);
        assert_eq!(result.billed_days, 22);
        assert_eq!(result.amount, dec!(27.65));

        let ledger = panel_history_for_month("P1", period(2024, 1), &panels, date("2024-06-01"));
        assert_eq!(ledger[8].status, PanelStatus::Removed);
        assert!(ledger[9].is_billable);
        assert!(ledger[9].note.contains("PIV reinstalled at 00:01"));

        // a later month is fully billed
        let result = calculate_monthly_billing("P1", period(2024, 2), &panels);
        assert_eq!(result.billed_days, 30);
    }

    #[test]
    fn test_reinstall_before_removal_bills_through_removal() {
        let record = panel(Some("2024-01-01"), Some("2024-01-20"), Some("2024-01-05"));
        let panels = roster_of(vec![("P1", record.clone())]);

        let result = calculate_monthly_billing("P1", period(2024, 1), &panels);
        assert_eq!(result.billed_days, 20);
        assert_eq!(billable_days_of(&record, period(2024, 1)), (1..=20).collect::<Vec<_>>());
    }

    #[test]
    fn test_partial_month_is_not_rescaled() {
        // 12..=31 of a 31-day month
        let panels = roster_of(vec![("P1", panel(Some("2024-01-12"), None, None))]);
        let result = calculate_monthly_billing("P1", period(2024, 1), &panels);
        assert_eq!(result.billed_days, 20);

        // 1..=28 of February 2023 is the whole month
        let panels = roster_of(vec![("P1", panel(Some("2023-02-01"), None, None))]);
        let result = calculate_monthly_billing("P1", period(2023, 2), &panels);
        assert_eq!(result.billed_days, 30);
    }

    #[test]
    fn test_events_from_earlier_months_carry_over() {
        let reinstalled = panel(Some("2023-06-01"), Some("2023-07-01"), Some("2023-09-15"));
        let removed = panel(Some("2023-06-01"), Some("2023-12-31"), None);
        let panels = roster_of(vec![("R", reinstalled), ("D", removed)]);

        assert_eq!(calculate_monthly_billing("R", period(2024, 1), &panels).billed_days, 30);
        assert_eq!(calculate_monthly_billing("R", period(2023, 8), &panels).billed_days, 0);
        assert_eq!(calculate_monthly_billing("D", period(2024, 1), &panels).billed_days, 0);
        assert_eq!(calculate_monthly_billing("D", period(2023, 12), &panels).billed_days, 30);
    }

    #[test]
    fn test_invalid_dates_are_treated_as_absent() {
        let panels = roster_of(vec![
            ("BAD_DEINSTALL", panel(Some("2023-01-01"), Some("2024-13-45"), None)),
            ("BAD_INSTALL", panel(Some("01/01/2023"), None, None)),
        ]);

        let result = calculate_monthly_billing("BAD_DEINSTALL", period(2024, 1), &panels);
        assert_eq!(result.billed_days, 30);

        let result = calculate_monthly_billing("BAD_INSTALL", period(2024, 1), &panels);
        assert_eq!(result.billed_days, 0);
        assert_eq!(result.amount, Decimal::ZERO);
    }
}

// ============================================================================
// Amounts
// ============================================================================

mod amount_tests {
    use super::*;

    #[test]
    fn test_amount_is_prorated_on_thirty_days() {
        // April 16..=30 is 15 days
        let panels = roster_of(vec![("P1", with_rate(panel(Some("2024-04-16"), None, None), 30.0))]);
        let result = calculate_monthly_billing("P1", period(2024, 4), &panels);
        assert_eq!(result.billed_days, 15);
        assert_eq!(result.amount, dec!(15.00));
    }

    #[test]
    fn test_missing_rate_uses_default() {
        let panels = roster_of(vec![("P1", panel(Some("2024-01-01"), None, None))]);
        let result = calculate_monthly_billing("P1", period(2024, 3), &panels);
        assert_eq!(result.billed_days, 30);
        assert_eq!(result.amount, DEFAULT_MONTHLY_RATE);
        assert_eq!(result.amount, dec!(37.70));
    }

    #[test]
    fn test_zero_negative_and_unparseable_rates_use_default() {
        for rate in [
            MonthlyRate::Amount(0.0),
            MonthlyRate::Amount(-12.0),
            MonthlyRate::Text("n/a".to_string()),
            MonthlyRate::Text("".to_string()),
        ] {
            let mut record = panel(Some("2024-01-01"), None, None);
            record.monthly_rate = Some(rate);
            assert_eq!(PanelSnapshot::from(&record).effective_rate(), dec!(37.70));
        }
    }

    #[test]
    fn test_text_rate_is_accepted() {
        let mut record = panel(Some("2024-01-01"), None, None);
        record.monthly_rate = Some(MonthlyRate::Text(" 45.00 ".to_string()));
        let charge = monthly_charge(&PanelSnapshot::from(&record), period(2024, 2));
        assert_eq!(charge.billed_days, 30);
        assert_eq!(charge.amount, dec!(45.00));
    }

    #[test]
    fn test_amount_rounds_to_cents() {
        // 7 * 37.70 / 30 = 8.7966...
        let panels = roster_of(vec![("P1", panel(Some("2024-01-01"), None, Some("2024-01-25")))]);
        let result = calculate_monthly_billing("P1", period(2024, 1), &panels);
        assert_eq!(result.billed_days, 7);
        assert_eq!(result.amount, dec!(8.80));
    }
}

// ============================================================================
// Ledger
// ============================================================================

mod ledger_tests {
    use super::*;

    #[test]
    fn test_ledger_covers_actual_month_length() {
        let panels = roster_of(vec![("P1", panel(Some("2020-01-01"), None, None))]);
        let today = date("2024-06-01");

        for (month, len) in [(1, 31), (2, 29), (4, 30)] {
            let ledger = panel_history_for_month("P1", period(2024, month), &panels, today);
            assert_eq!(ledger.len(), len);
            assert!(ledger.windows(2).all(|w| w[0].date < w[1].date));
        }
    }

    #[test]
    fn test_unknown_panel_has_empty_ledger_and_zero_result() {
        let panels = roster_of(vec![("P1", panel(Some("2024-01-01"), None, None))]);

        let ledger = panel_history_for_month("NOPE", period(2024, 1), &panels, date("2024-06-01"));
        assert!(ledger.is_empty());

        let result = calculate_monthly_billing("NOPE", period(2024, 1), &panels);
        assert_eq!(result.panel_id, "NOPE");
        assert_eq!(result.billed_days, 0);
        assert_eq!(result.total_days_in_month, 30);
        assert_eq!(result.amount, Decimal::ZERO);
        assert!(result.panel.is_none());
    }

    #[test]
    fn test_missing_install_marks_every_day_unknown() {
        let record = panel(None, None, None);
        let ledger = build_ledger(&PanelSnapshot::from(&record), period(2024, 2), date("2024-06-01"));
        assert_eq!(ledger.len(), 29);
        assert!(ledger.iter().all(|d| !d.is_billable && d.status == PanelStatus::Unknown));
    }

    #[test]
    fn test_days_before_future_install_are_pending() {
        let record = panel(Some("2024-01-20"), None, None);
        let snapshot = PanelSnapshot::from(&record);

        let ledger = build_ledger(&snapshot, period(2024, 1), date("2024-01-05"));
        assert_eq!(ledger[0].status, PanelStatus::PendingInstallation);
        assert!(ledger[0].note.contains("scheduled 2024-01-20"));
        assert!(!ledger[18].is_billable);
        assert!(ledger[19].is_billable);
        assert!(ledger[19].note.starts_with("PIV installed"));

        // once installation is in the past the same days read as unknown
        let ledger = build_ledger(&snapshot, period(2024, 1), date("2024-02-01"));
        assert_eq!(ledger[0].status, PanelStatus::Unknown);
        assert_eq!(ledger[19].status, PanelStatus::Installed);
    }

    #[test]
    fn test_reinstall_day_note_after_removal() {
        let record = panel(Some("2024-01-01"), Some("2024-01-10"), Some("2024-01-20"));
        let ledger = build_ledger(&PanelSnapshot::from(&record), period(2024, 1), date("2024-06-01"));

        assert!(ledger[19].is_billable);
        assert!(ledger[19].note.contains("00:01"));
        assert!(!ledger[19].note.contains("replaces"));
        assert_eq!(ledger[12].status, PanelStatus::Removed);
    }

    #[test]
    fn test_reinstall_before_removal_is_flagged_in_notes() {
        let record = panel(Some("2024-01-01"), Some("2024-01-20"), Some("2024-01-05"));
        let ledger = build_ledger(&PanelSnapshot::from(&record), period(2024, 1), date("2024-06-01"));

        let day_5 = &ledger[4];
        assert!(day_5.is_billable);
        assert_eq!(day_5.status, PanelStatus::Installed);
        assert!(day_5.note.contains("dated before removal"));
        assert!(!day_5.note.contains("full day billable"));

        assert!(ledger[19].note.contains("PIV removed at 23:59"));
        assert_eq!(ledger[20].status, PanelStatus::Removed);
        assert!(ledger[20..].iter().all(|d| !d.is_billable));
    }

    #[test]
    fn test_repeated_calls_are_identical() {
        let record = with_rate(panel(Some("2024-01-01"), Some("2024-01-10"), Some("2024-01-20")), 41.5);
        let panels = roster_of(vec![("P1", record)]);
        let today = date("2024-06-01");

        assert_eq!(
            panel_history_for_month("P1", period(2024, 1), &panels, today),
            panel_history_for_month("P1", period(2024, 1), &panels, today)
        );
        assert_eq!(
            calculate_monthly_billing("P1", period(2024, 1), &panels),
            calculate_monthly_billing("P1", period(2024, 1), &panels)
        );
    }
}

// ============================================================================
// Monthly statement
// ============================================================================

mod statement_tests {
    use super::*;

    fn event(id: &str, panel_id: &str, kind: EventKind, date: &str) -> PanelEvent {
        PanelEvent {
            id: id.to_string(),
            panel_id: panel_id.to_string(),
            kind,
            date: date.to_string(),
            notes: None,
        }
    }

    #[test]
    fn test_statement_filters_and_totals() {
        let roster = Roster {
            panels: roster_of(vec![
                ("A", with_rate(panel(Some("2023-01-01"), None, None), 30.0)),
                ("B", panel(Some("2024-01-01"), Some("2024-01-15"), None)),
                ("C", panel(None, None, None)),
                ("D", panel(Some("2023-01-01"), Some("2023-06-30"), None)),
            ]),
            events: vec![
                event("E1", "B", EventKind::Deinstallation, "2024-01-15"),
                event("E2", "D", EventKind::Deinstallation, "2023-06-30"),
            ],
        };

        let statement = MonthlyStatement::build(&roster, period(2024, 1), date("2024-06-01"));
        let ids: Vec<_> = statement.lines.iter().map(|l| l.billing.panel_id.as_str()).collect();

        // C was never installed and D was removed before January
        assert_eq!(ids, vec!["A", "B"]);
        assert_eq!(statement.lines[1].status, PanelStatus::Removed);
        assert_eq!(statement.total_billed_days, 45);
        // 30.00 + 15 * 37.70 / 30
        assert_eq!(statement.total_amount, dec!(48.85));
    }

    #[test]
    fn test_installed_panel_with_no_days_is_listed() {
        let roster = Roster {
            panels: roster_of(vec![("A", panel(Some("2023-01-01"), Some("2023-03-01"), None))]),
            events: Vec::new(),
        };

        let statement = MonthlyStatement::build(&roster, period(2024, 1), date("2024-06-01"));
        assert_eq!(statement.lines.len(), 1);
        assert_eq!(statement.lines[0].billing.billed_days, 0);
        assert_eq!(statement.total_amount, Decimal::ZERO);
    }
}
