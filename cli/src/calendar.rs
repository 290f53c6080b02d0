use chrono::{Datelike, NaiveDate};
use habitual_core::{CompletionRatio, DayKey, MonthCalendar};
use tabled::builder::Builder;
use tabled::settings::object::Rows;
use tabled::settings::{Color, Modify, Style};

const WEEKDAYS: [&str; 7] = ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"];

pub fn show_month(calendar: &MonthCalendar, today: DayKey) {
    println!(
        "\n\x1b[1;36m{} {}\x1b[0m",
        calendar.name(),
        calendar.year
    );

    let mut builder = Builder::default();
    builder.push_record(WEEKDAYS.iter().map(|d| d.to_string()));
    for week in weeks(calendar, today) {
        builder.push_record(week);
    }

    let mut table = builder.build();
    table
        .with(Style::modern())
        .with(Modify::new(Rows::first()).with(Color::FG_CYAN));
    println!("{}", table);

    let average = calendar
        .average()
        .map(|a| format!("{:.0}%", a * 100.0))
        .unwrap_or_else(|| "-".to_string());
    println!(
        "Completed days: {}  Average: {}",
        calendar.completed_days(),
        average
    );
}

/// Rows of seven cells, Monday first, padded with blanks.
fn weeks(calendar: &MonthCalendar, today: DayKey) -> Vec<Vec<String>> {
    let offset = NaiveDate::from_ymd_opt(calendar.year, calendar.month, 1)
        .map(|d| d.weekday().num_days_from_monday() as usize)
        .unwrap_or(0);

    let mut cells: Vec<String> = vec![String::new(); offset];
    for day in &calendar.days {
        let is_today = today.year() == calendar.year
            && today.month() == calendar.month
            && today.day() == day.day;
        cells.push(cell(day.day, day.ratio, is_today));
    }
    while cells.len() % 7 != 0 {
        cells.push(String::new());
    }

    cells.chunks(7).map(|week| week.to_vec()).collect()
}

fn cell(day: u32, ratio: CompletionRatio, is_today: bool) -> String {
    let mark = match ratio {
        CompletionRatio::Ratio(r) if r >= 1.0 => "✔".to_string(),
        CompletionRatio::Ratio(r) if r > 0.0 => format!("{:.0}%", r * 100.0),
        CompletionRatio::Ratio(_) => "·".to_string(),
        CompletionRatio::NoData => String::new(),
    };
    let label = if is_today {
        format!("[{}]", day)
    } else {
        day.to_string()
    };
    if mark.is_empty() {
        label
    } else {
        format!("{} {}", label, mark)
    }
}
