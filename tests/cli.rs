use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;

/// Binary pinned to a throwaway home so no real config or database is read.
fn minasati(home: &Path) -> Command {
    let mut cmd = Command::cargo_bin("minasati").expect("binary minasati is built");
    cmd.env("HOME", home)
        .env("XDG_CONFIG_HOME", home.join("config"))
        .env("XDG_DATA_HOME", home.join("data"))
        .env_remove("RUST_LOG");
    cmd
}

fn add_day(home: &Path, db: &Path, date: &str) {
    minasati(home)
        .args(["--db", db.to_str().unwrap(), "add", "--date", date])
        .args(["--fajr", "4:10", "--dhuhr", "12:05", "--asr", "15:40"])
        .args(["--maghrib", "18:50", "--isha", "20:10"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Saved prayer times"));
}

#[test]
fn add_then_times_shows_countdown() {
    let dir = tempfile::tempdir().unwrap();
    let db = dir.path().join("m.db");
    add_day(dir.path(), &db, "2025-06-05");

    minasati(dir.path())
        .args(["--db", db.to_str().unwrap(), "--now", "2025-06-05T16:00", "times"])
        .assert()
        .success()
        .stdout(predicate::str::contains("18:50"))
        .stdout(predicate::str::contains("06:00"))
        .stdout(predicate::str::contains("المغرب"))
        .stdout(predicate::str::contains("02:50:0"))
        .stdout(predicate::str::contains("منذ 00:20"));
}

#[test]
fn times_without_data_shows_placeholders() {
    let dir = tempfile::tempdir().unwrap();
    let db = dir.path().join("m.db");

    minasati(dir.path())
        .args(["--db", db.to_str().unwrap(), "--now", "2025-06-05T16:00", "times"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--:--"));
}

#[test]
fn add_rejects_missing_field() {
    let dir = tempfile::tempdir().unwrap();
    let db = dir.path().join("m.db");

    minasati(dir.path())
        .args(["--db", db.to_str().unwrap(), "add", "--date", "2025-06-05"])
        .args(["--fajr", "4:10", "--dhuhr", "12:05", "--asr", "15:40", "--isha", "20:10"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("maghrib"));

    minasati(dir.path())
        .args(["--db", db.to_str().unwrap(), "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No stored prayer times"));
}

#[test]
fn add_rejects_impossible_time() {
    let dir = tempfile::tempdir().unwrap();
    let db = dir.path().join("m.db");

    minasati(dir.path())
        .args(["--db", db.to_str().unwrap(), "add", "--date", "2025-06-05"])
        .args(["--fajr", "25:10", "--dhuhr", "12:05", "--asr", "15:40"])
        .args(["--maghrib", "18:50", "--isha", "20:10"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("25:10"));
}

#[test]
fn delete_reports_whether_anything_was_removed() {
    let dir = tempfile::tempdir().unwrap();
    let db = dir.path().join("m.db");
    add_day(dir.path(), &db, "2025-06-05");

    minasati(dir.path())
        .args(["--db", db.to_str().unwrap(), "delete", "2025-06-05"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Deleted 2025-06-05"));

    minasati(dir.path())
        .args(["--db", db.to_str().unwrap(), "delete", "2025-06-05"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Nothing stored"));
}

#[test]
fn method_is_persisted() {
    let dir = tempfile::tempdir().unwrap();
    let db = dir.path().join("m.db");

    minasati(dir.path())
        .args(["--db", db.to_str().unwrap(), "method"])
        .assert()
        .success()
        .stdout(predicate::str::contains("●  2"));

    minasati(dir.path())
        .args(["--db", db.to_str().unwrap(), "method", "13"])
        .assert()
        .success();

    minasati(dir.path())
        .args(["--db", db.to_str().unwrap(), "method"])
        .assert()
        .success()
        .stdout(predicate::str::contains("● 13"));

    minasati(dir.path())
        .args(["--db", db.to_str().unwrap(), "method", "99"])
        .assert()
        .failure();
}

#[test]
fn export_writes_selected_prayers() {
    let dir = tempfile::tempdir().unwrap();
    let db = dir.path().join("m.db");
    let out = dir.path().join("prayers.ics");
    add_day(dir.path(), &db, "2025-06-05");
    add_day(dir.path(), &db, "2025-06-06");

    let tasks = dir.path().join("tasks.json");
    fs::write(
        &tasks,
        r#"[{"title": "Read", "dueDate": "2025-06-05T14:30:00.000Z", "completed": false}]"#,
    )
    .unwrap();

    minasati(dir.path())
        .args(["--db", db.to_str().unwrap(), "export", "--out", out.to_str().unwrap()])
        .args(["--prayers", "fajr,maghrib", "--tasks", tasks.to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains("Wrote 5 events"));

    let ics = fs::read_to_string(&out).unwrap();
    assert!(ics.starts_with("BEGIN:VCALENDAR\r\n"));
    assert_eq!(ics.matches("BEGIN:VEVENT").count(), 5);
    assert!(ics.contains("DTSTART:20250606T185000"));
    assert!(ics.contains("TRIGGER:-PT15M"));
}

#[test]
fn import_overlays_pasted_table() {
    let dir = tempfile::tempdir().unwrap();
    let db = dir.path().join("m.db");
    add_day(dir.path(), &db, "2025-06-05");

    let table = dir.path().join("june.txt");
    fs::write(
        &table,
        "Prayer times June 2025\n\
         Day Fajr Sunrise Dhuhr Asr Maghrib Isha\n\
         5 4:05 AM 5:52 AM 12:48 PM 4:28 PM 7:44 PM 9:20 PM\n\
         6 04:04 05:51 12:48 16:29 19:45 21:21\n",
    )
    .unwrap();

    minasati(dir.path())
        .args(["--db", db.to_str().unwrap(), "import", table.to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains("Imported 2 days"));

    minasati(dir.path())
        .args(["--db", db.to_str().unwrap(), "list", "--month", "2025-06"])
        .assert()
        .success()
        .stdout(predicate::str::contains("2025-06-05"))
        .stdout(predicate::str::contains("19:44"))
        .stdout(predicate::str::contains("21:21"))
        .stdout(predicate::str::contains("18:50").not());
}

#[test]
fn invalid_now_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let db = dir.path().join("m.db");

    minasati(dir.path())
        .args(["--db", db.to_str().unwrap(), "--now", "yesterday", "times"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--now"));
}

#[test]
fn export_without_prayer_times_writes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let db = dir.path().join("m.db");
    let out = dir.path().join("prayers.ics");

    minasati(dir.path())
        .args(["--db", db.to_str().unwrap(), "export", "--out", out.to_str().unwrap()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("لا توجد أوقات صلاة للتصدير"));
    assert!(!out.exists());
}
