use attendance_tool::{
    Timetable, UserDirectory, calendar, load_directory_from_json, load_ledger_from_csv,
    save_directory_to_json, save_ledger_to_csv, weekday_from_name, weekday_name,
};
use chrono::{NaiveDate, Utc, Weekday};
use std::collections::BTreeMap;
use std::io::{self, BufRead, Write};
use uuid::Uuid;

const SCHOOL_WEEK: [Weekday; 5] = [
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
];

fn print_help() {
    println!(
        "Commands:\n  help                                Show this help\n  users                               List users\n  adduser <name...>                   Create a user with the default timetable\n  deluser <user>                      Delete a user and their attendance data\n  timetable <user>                    Show a user's weekly timetable\n  setday <user> <day> <s1,s2,...>     Replace one weekday's subject list\n  attendance <user>                   Show recorded attendance by date\n  mark <user> <date> <subject>=<present|absent> [start=YYYY-MM-DD]\n                                      Toggle one subject's mark for a date\n  percent <user> [start] [end]        Per-subject attendance percentages\n  save <path>                         Save all users to a JSON snapshot\n  load <path>                         Load users from a JSON snapshot\n  exportcsv <user> <path>             Export a user's ledger to CSV\n  importcsv <user> <path>             Import a user's ledger from CSV\n  quit|exit                           Exit"
    );
}

/// Users may be addressed by id or by exact name.
fn resolve_user(directory: &UserDirectory, token: &str) -> Option<Uuid> {
    if let Ok(id) = Uuid::parse_str(token) {
        if directory.user(id).is_some() {
            return Some(id);
        }
        return None;
    }
    directory
        .users()
        .into_iter()
        .find(|user| user.name == token)
        .map(|user| user.id)
}

fn print_timetable(timetable: &Timetable) {
    for weekday in SCHOOL_WEEK {
        let subjects = timetable.subjects_on(weekday);
        if subjects.is_empty() {
            continue;
        }
        println!("{:<9}: {}", weekday_name(weekday), subjects.join(", "));
    }
}

fn parse_mark_value(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "present" | "true" => Some(true),
        "absent" | "false" => Some(false),
        _ => None,
    }
}

fn parse_date_arg(input: &str) -> Option<NaiveDate> {
    match calendar::parse_date(input) {
        Ok(date) => Some(date),
        Err(err) => {
            println!("{err}");
            None
        }
    }
}

fn cmd_mark(directory: &mut UserDirectory, user_id: Uuid, date: NaiveDate, rest: &[&str]) {
    let mut window_start = None;
    let mut assignment = rest;
    if let Some(last) = rest.last() {
        if let Some(raw) = last.strip_prefix("start=") {
            let Some(start) = parse_date_arg(raw) else {
                return;
            };
            window_start = Some(start);
            assignment = &rest[..rest.len() - 1];
        }
    }
    let joined = assignment.join(" ");
    let Some((subject, value)) = joined.rsplit_once('=') else {
        println!("Expected <subject>=<present|absent>.");
        return;
    };
    let Some(present) = parse_mark_value(value) else {
        println!("Expected 'present' or 'absent', got '{value}'.");
        return;
    };

    // Full-replace ledger contract: read the existing marks, flip the one
    // subject, write the complete mapping back.
    let mut marks: BTreeMap<String, bool> = directory
        .ledger(user_id)
        .and_then(|ledger| ledger.record_on(date))
        .map(|record| record.marks.clone())
        .unwrap_or_default();
    if window_start.is_none() {
        window_start = directory
            .ledger(user_id)
            .and_then(|ledger| ledger.record_on(date))
            .and_then(|record| record.window_start);
    }
    marks.insert(subject.trim().to_string(), present);

    match directory.record_attendance(user_id, date, marks, window_start) {
        Ok(()) => println!(
            "Marked '{}' {} on {date}.",
            subject.trim(),
            if present { "present" } else { "absent" }
        ),
        Err(err) => println!("{err}"),
    }
}

fn cmd_percent(directory: &UserDirectory, user_id: Uuid, args: &[&str]) {
    let start = match args.first() {
        Some(raw) => match parse_date_arg(raw) {
            Some(date) => Some(date),
            None => return,
        },
        None => None,
    };
    let end = match args.get(1) {
        Some(raw) => match parse_date_arg(raw) {
            Some(date) => Some(date),
            None => return,
        },
        None => None,
    };
    let today = Utc::now().date_naive();
    match directory.percentage_report(user_id, start, end, today) {
        Ok(report) => {
            for (subject, formatted) in report.formatted() {
                println!("{subject} : {formatted}");
            }
        }
        Err(err) => println!("{err}"),
    }
}

fn main() {
    let _logger = flexi_logger::Logger::try_with_env_or_str("warn")
        .and_then(|logger| logger.start())
        .ok();

    let mut directory = UserDirectory::new();
    let stdin = io::stdin();
    let stdout = io::stdout();

    for line in stdin.lock().lines() {
        let line = match line {
            Ok(v) => v,
            Err(_) => break,
        };
        let parts: Vec<&str> = line.split_whitespace().collect();
        match parts.as_slice() {
            [] => {}
            ["help"] => print_help(),
            ["quit"] | ["exit"] => break,
            ["users"] => {
                for user in directory.users() {
                    println!("{}  {}", user.id, user.name);
                }
            }
            ["adduser", name @ ..] if !name.is_empty() => {
                match directory.create_user(&name.join(" "), Timetable::default_weekly()) {
                    Ok(user) => println!("Created user {} ({}).", user.id, user.name),
                    Err(err) => println!("{err}"),
                }
            }
            ["deluser", user] => match resolve_user(&directory, user) {
                Some(id) if directory.delete_user(id) => println!("Deleted user {id}."),
                _ => println!("Unknown user '{user}'."),
            },
            ["timetable", user] => match resolve_user(&directory, user) {
                Some(id) => {
                    if let Some(timetable) = directory.timetable(id) {
                        print_timetable(timetable);
                    }
                }
                None => println!("Unknown user '{user}'."),
            },
            ["setday", user, day, rest @ ..] if !rest.is_empty() => {
                let Some(id) = resolve_user(&directory, user) else {
                    println!("Unknown user '{user}'.");
                    continue;
                };
                let Some(weekday) = weekday_from_name(day) else {
                    println!("Unknown weekday '{day}'.");
                    continue;
                };
                let subjects: Vec<String> = rest
                    .join(" ")
                    .split(',')
                    .map(|subject| subject.trim().to_string())
                    .filter(|subject| !subject.is_empty())
                    .collect();
                match directory.replace_timetable_day(id, weekday, subjects) {
                    Ok(()) => println!("Updated {} for user {id}.", weekday_name(weekday)),
                    Err(err) => println!("{err}"),
                }
            }
            ["attendance", user] => match resolve_user(&directory, user) {
                Some(id) => {
                    if let Some(ledger) = directory.ledger(id) {
                        for record in ledger.records() {
                            let marks = record
                                .marks
                                .iter()
                                .map(|(subject, present)| {
                                    format!(
                                        "{subject}={}",
                                        if *present { "present" } else { "absent" }
                                    )
                                })
                                .collect::<Vec<_>>()
                                .join(", ");
                            println!("{}  {marks}", record.date);
                        }
                    }
                }
                None => println!("Unknown user '{user}'."),
            },
            ["mark", user, date, rest @ ..] if !rest.is_empty() => {
                let Some(id) = resolve_user(&directory, user) else {
                    println!("Unknown user '{user}'.");
                    continue;
                };
                let Some(date) = parse_date_arg(date) else {
                    continue;
                };
                cmd_mark(&mut directory, id, date, rest);
            }
            ["percent", user, args @ ..] => match resolve_user(&directory, user) {
                Some(id) => cmd_percent(&directory, id, args),
                None => println!("Unknown user '{user}'."),
            },
            ["save", path] => match save_directory_to_json(&directory, path) {
                Ok(()) => println!("Directory saved to {path}."),
                Err(err) => println!("Save failed: {err}"),
            },
            ["load", path] => match load_directory_from_json(path) {
                Ok(loaded) => {
                    directory = loaded;
                    println!("Directory loaded from {path}.");
                }
                Err(err) => println!("Load failed: {err}"),
            },
            ["exportcsv", user, path] => match resolve_user(&directory, user) {
                Some(id) => {
                    let Some(ledger) = directory.ledger(id) else {
                        println!("Unknown user '{user}'.");
                        continue;
                    };
                    match save_ledger_to_csv(ledger, path) {
                        Ok(()) => println!("Ledger exported to {path}."),
                        Err(err) => println!("Export failed: {err}"),
                    }
                }
                None => println!("Unknown user '{user}'."),
            },
            ["importcsv", user, path] => match resolve_user(&directory, user) {
                Some(id) => match load_ledger_from_csv(path) {
                    Ok(ledger) => {
                        let mut count = 0usize;
                        for record in ledger.records() {
                            let result = directory.record_attendance(
                                id,
                                record.date,
                                record.marks.clone(),
                                record.window_start,
                            );
                            match result {
                                Ok(()) => count += 1,
                                Err(err) => println!("Skipped {}: {err}", record.date),
                            }
                        }
                        println!("Imported {count} record(s) from {path}.");
                    }
                    Err(err) => println!("Import failed: {err}"),
                },
                None => println!("Unknown user '{user}'."),
            },
            _ => println!("Unknown command. Type 'help' for usage."),
        }
        let _ = stdout.lock().flush();
    }
}
