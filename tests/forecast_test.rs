mod helpers;

use daybrief::brief::forecast::{revision_notice, ForecastReconciler};
use daybrief::memory::types::{date_start_utc, Source};
use helpers::*;

#[test]
fn scenario_newer_forecast_wins_and_is_flagged() {
    let store = test_store();
    let day = date(2025, 4, 21);
    add_forecast(&store, "Helsinki", day, "sunny", utc(2025, 4, 20, 6, 0));
    add_forecast(&store, "Helsinki", day, "rainy", utc(2025, 4, 20, 18, 0));

    let reconciler = ForecastReconciler::new(&store, "Helsinki");
    let start = utc(2025, 4, 21, 5, 0);
    let end = utc(2025, 4, 22, 5, 0);

    let latest = reconciler.latest_forecasts(start, end).unwrap();
    assert_eq!(latest.get(&day).map(String::as_str), Some("rainy"));

    let changes = reconciler.forecast_changes(start, end).unwrap();
    assert_eq!(changes.len(), 1);
    assert_eq!(changes[&day], revision_notice(day));
}

#[test]
fn latest_wins_regardless_of_insertion_order() {
    let store = test_store();
    let day = date(2025, 4, 21);
    // Newest fetch inserted first.
    add_forecast(&store, "Helsinki", day, "stormy", utc(2025, 4, 20, 21, 0));
    add_forecast(&store, "Helsinki", day, "sunny", utc(2025, 4, 20, 3, 0));
    add_forecast(&store, "Helsinki", day, "cloudy", utc(2025, 4, 20, 12, 0));

    let latest = ForecastReconciler::new(&store, "Helsinki")
        .latest_forecasts(date_start_utc(day), date_start_utc(day))
        .unwrap();
    assert_eq!(latest[&day], "stormy");
}

#[test]
fn equal_fetch_times_resolve_to_the_later_row() {
    let store = test_store();
    let day = date(2025, 4, 21);
    let t = utc(2025, 4, 20, 6, 0);
    add_forecast(&store, "Helsinki", day, "first row", t);
    add_forecast(&store, "Helsinki", day, "second row", t);

    let reconciler = ForecastReconciler::new(&store, "Helsinki");
    for _ in 0..3 {
        let latest = reconciler
            .latest_forecasts(date_start_utc(day), date_start_utc(day))
            .unwrap();
        assert_eq!(latest[&day], "second row");
    }
}

#[test]
fn change_detection_cases() {
    let store = test_store();
    let (single, same, differ) = (date(2025, 4, 21), date(2025, 4, 22), date(2025, 4, 23));
    add_forecast(&store, "Helsinki", single, "sunny", utc(2025, 4, 20, 6, 0));
    add_forecast(&store, "Helsinki", same, "windy", utc(2025, 4, 20, 6, 0));
    add_forecast(&store, "Helsinki", same, "windy", utc(2025, 4, 20, 12, 0));
    add_forecast(&store, "Helsinki", differ, "sunny", utc(2025, 4, 20, 6, 0));
    add_forecast(&store, "Helsinki", differ, "snow", utc(2025, 4, 20, 12, 0));

    let changes = ForecastReconciler::new(&store, "Helsinki")
        .forecast_changes(date_start_utc(single), date_start_utc(differ))
        .unwrap();
    assert_eq!(changes.keys().copied().collect::<Vec<_>>(), vec![differ]);
}

#[test]
fn only_the_configured_location_is_read() {
    let store = test_store();
    let day = date(2025, 4, 21);
    add_forecast(&store, "Helsinki", day, "sunny", utc(2025, 4, 20, 6, 0));
    add_forecast(&store, "Oslo", day, "fog", utc(2025, 4, 20, 9, 0));
    add_fact(&store, "Manual note", Some(day), Source::manual());

    let latest = ForecastReconciler::new(&store, "Helsinki")
        .latest_forecasts(date_start_utc(day), date_start_utc(day))
        .unwrap();
    assert_eq!(latest.len(), 1);
    assert_eq!(latest[&day], "sunny");
}

#[test]
fn window_is_widened_to_whole_days() {
    let store = test_store();
    let day = date(2025, 4, 23);
    add_forecast(&store, "Helsinki", day, "hail", utc(2025, 4, 20, 6, 0));

    // End instant falls mid-morning of the 23rd; the forecast at 00:00 is still in.
    let latest = ForecastReconciler::new(&store, "Helsinki")
        .latest_forecasts(utc(2025, 4, 21, 9, 30), utc(2025, 4, 23, 9, 30))
        .unwrap();
    assert_eq!(latest[&day], "hail");

    // And a start late on the 23rd still sees it.
    let latest = ForecastReconciler::new(&store, "Helsinki")
        .latest_forecasts(utc(2025, 4, 23, 22, 0), utc(2025, 4, 24, 9, 0))
        .unwrap();
    assert_eq!(latest[&day], "hail");
}
