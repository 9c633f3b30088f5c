//! Terminal rendering shared by the commands. Everything returns strings so commands stay
//! printable and testable.

use ansi_term::{Colour, Style};
use uuid::Uuid;

use crate::{
    tracking::calendar::{CalendarCell, HeatLevel, MonthView},
    utils::percentage::Percentage,
};

const SHORT_ID_LENGTH: usize = 8;
const BAR_WIDTH: usize = 20;

/// Prefix of an id that is long enough to be typed back into commands.
pub fn short_id(id: Uuid) -> String {
    id.to_string()[..SHORT_ID_LENGTH].to_string()
}

pub fn checkbox(done: bool) -> &'static str {
    if done {
        "[x]"
    } else {
        "[ ]"
    }
}

/// `[#########-----------] 45%`
pub fn progress_bar(percentage: Percentage) -> String {
    let filled = (*percentage as usize * BAR_WIDTH / 100).min(BAR_WIDTH);
    format!(
        "[{}{}] {percentage}",
        "#".repeat(filled),
        "-".repeat(BAR_WIDTH - filled)
    )
}

fn heat_style(level: HeatLevel) -> Style {
    match level {
        HeatLevel::OutsideMonth => Style::new().dimmed(),
        HeatLevel::Empty => Style::new(),
        HeatLevel::Untouched => Colour::Red.normal(),
        HeatLevel::Started => Colour::Yellow.normal(),
        HeatLevel::Most => Colour::Green.normal(),
        HeatLevel::Complete => Colour::Green.bold(),
    }
}

fn render_cell(cell: &CalendarCell) -> String {
    let mut style = heat_style(cell.level);
    if cell.is_today {
        style = style.underline();
    }
    style.paint(format!("{:>3}", cell.date.day())).to_string()
}

/// Month grid with Monday first, days coloured by how many of their tasks were done.
pub fn heat_map(view: &MonthView) -> String {
    let mut lines = vec![
        format!("{}", Style::new().bold().paint(view.first.naive().format("%B %Y").to_string())),
        " Mo Tu We Th Fr Sa Su".to_string(),
    ];
    for week in view.weeks() {
        lines.push(week.iter().map(render_cell).collect::<String>());
    }
    lines.push(format!(
        "{} none {} some {} most {} all",
        heat_style(HeatLevel::Untouched).paint("■"),
        heat_style(HeatLevel::Started).paint("■"),
        heat_style(HeatLevel::Most).paint("■"),
        heat_style(HeatLevel::Complete).paint("■"),
    ));
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use uuid::Uuid;

    use crate::{
        tracking::{aggregate::TaskRecord, calendar::month_view},
        utils::percentage::Percentage,
    };

    use super::{heat_map, progress_bar, short_id};

    #[test]
    fn bars_are_clamped() {
        assert_eq!(progress_bar(Percentage::ZERO), format!("[{}] 0%", "-".repeat(20)));
        assert_eq!(progress_bar(Percentage::FULL), format!("[{}] 100%", "#".repeat(20)));
        assert_eq!(progress_bar(Percentage::rounded(1, 2)), format!("[{}{}] 50%", "#".repeat(10), "-".repeat(10)));
    }

    #[test]
    fn short_ids_prefix_full_ids() {
        let id = Uuid::new_v4();
        assert!(id.to_string().starts_with(&short_id(id)));
        assert_eq!(short_id(id).len(), 8);
    }

    #[test]
    fn heat_map_has_a_row_per_week() {
        let today = "2024-02-14".parse().unwrap();
        let records = [TaskRecord {
            date: today,
            completed: true,
        }];
        let view = month_view(2024, 2, &records, today).unwrap();
        let map = heat_map(&view);
        // Title, weekday header, 5 weeks and the legend
        assert_eq!(map.lines().count(), 8);
        assert!(map.contains("February 2024"));
        assert!(map.contains(" 29"));
    }
}
