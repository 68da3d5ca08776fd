//! Default prompt template.
//!
//! Reads [`BriefContext`] by attribute key only. A section appears when its key
//! is present; today's weather is always written.

use super::context::{Attribute, BriefContext, WEATHER_NOT_AVAILABLE};

/// A rendered chat prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt {
    pub system: String,
    pub user: String,
}

const SYSTEM_TEMPLATE: &str = "You are a personal assistant writing a short daily brief for a family. \
Use only the information given. Start with the date and today's weather, then mention what is \
happening now, upcoming events and reminders, and finish with the weather outlook. \
Keep it friendly and under 200 words. Write the brief in the language with tag `{language}`.";

pub fn render_prompt(context: &BriefContext) -> Prompt {
    let system = SYSTEM_TEMPLATE.replace("{language}", &context.language);

    let mut user = String::new();
    let date = context.get(Attribute::Date).unwrap_or_default();
    let time = context.get(Attribute::Time).unwrap_or_default();
    user.push_str(&format!("Today is {date}, the time is {time}"));
    if let Some(tz) = context.get(Attribute::Timezone) {
        user.push_str(&format!(" ({tz})"));
    }
    user.push_str(".\n");
    if let Some(location) = context.get(Attribute::Location) {
        user.push_str(&format!("Location: {location}\n"));
    }
    if let Some(names) = context.get(Attribute::FamilyNames) {
        user.push_str(&format!("Family members: {names}\n"));
    }

    let today = context
        .get(Attribute::WeatherToday)
        .unwrap_or(WEATHER_NOT_AVAILABLE);
    user.push_str(&format!("\nWeather today: {today}\n"));

    section(&mut user, "Happening right now", context.get(Attribute::OngoingEvents));
    section(&mut user, "Birthdays today", context.get(Attribute::Birthdays));
    section(&mut user, "Weather in the coming days", context.get(Attribute::WeatherFuture));
    section(&mut user, "Forecast updates", context.get(Attribute::WeatherChanges));

    if !context.fact_strings.is_empty() {
        user.push_str("\nEvents and reminders:\n");
        for line in &context.fact_strings {
            user.push_str("- ");
            user.push_str(line);
            user.push('\n');
        }
    }

    Prompt { system, user }
}

fn section(out: &mut String, title: &str, body: Option<&str>) {
    if let Some(body) = body {
        out.push_str(&format!("\n{title}:\n{body}\n"));
    }
}
