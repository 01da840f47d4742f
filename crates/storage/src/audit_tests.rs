// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn append_writes_to_dated_file() {
    let dir = tempfile::tempdir().unwrap();
    let log = AuditLog::new(dir.path());

    let entry = AuditEntry::new("telegram--1", "telegram", true);
    log.append(&entry).unwrap();

    let date = entry.timestamp.date_naive();
    let expected = dir
        .path()
        .join("daily")
        .join(format!("{}.jsonl", date.format("%Y-%m-%d")));
    assert!(expected.exists());

    let read = log.read_day(date).unwrap();
    assert_eq!(read, vec![entry]);
}

#[test]
fn read_missing_day_is_empty() {
    let dir = tempfile::tempdir().unwrap();
    let log = AuditLog::new(dir.path());
    let date = NaiveDate::from_ymd_opt(2026, 1, 1).unwrap();
    assert!(log.read_day(date).unwrap().is_empty());
}

#[test]
fn malformed_lines_are_skipped_on_read() {
    let dir = tempfile::tempdir().unwrap();
    let log = AuditLog::new(dir.path());

    let entry = AuditEntry::new("slack--C1", "slack", false);
    log.append(&entry).unwrap();

    let date = entry.timestamp.date_naive();
    let path = dir
        .path()
        .join("daily")
        .join(format!("{}.jsonl", date.format("%Y-%m-%d")));
    {
        use std::io::Write;
        let mut file = std::fs::OpenOptions::new().append(true).open(&path).unwrap();
        writeln!(file, "garbage line").unwrap();
    }

    let read = log.read_day(date).unwrap();
    assert_eq!(read.len(), 1);
    assert!(!read[0].ok);
}
