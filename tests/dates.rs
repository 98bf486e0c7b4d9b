use cert_splitter::package::{date_stamp, manifest_file_name};
use cert_splitter::util::date_or_utc;
use time::{Date, Month, OffsetDateTime};

#[test]
fn known_local_date_is_used_as_is() {
    let d = Date::from_calendar_date(2024, Month::March, 5).unwrap();
    assert_eq!(date_or_utc(Some(d)), d);
    assert_eq!(date_stamp(date_or_utc(Some(d))), "20240305");
}

#[test]
fn missing_local_offset_falls_back_to_utc_today() {
    let before = OffsetDateTime::now_utc().date();
    let got = date_or_utc(None);
    let after = OffsetDateTime::now_utc().date();
    assert!(got == before || got == after);
}

#[test]
fn manifest_name_carries_the_run_date() {
    let d = Date::from_calendar_date(2025, Month::December, 31).unwrap();
    assert_eq!(
        manifest_file_name("Nilai 1", d, "A1", "A9"),
        "Nilai 1_20251231_A1-A9.txt"
    );
}
