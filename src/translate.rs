//! Jenkins event to Discord message translation
//!
//! Everything here is pure: no I/O and no shared state, so handlers can call
//! [`convert`] from any number of requests at once.

use chrono::{DateTime, Local, SecondsFormat, TimeZone};
use std::fmt::Display;

use crate::discord::{DiscordWebhook, Embed, EmbedField, EmbedFooter};
use crate::event::{FlatEvent, JenkinsEvent, NestedEvent};

pub const GREEN: u32 = 0x00FF00;
pub const RED: u32 = 0xFF0000;
pub const ORANGE: u32 = 0xFFA500;
pub const GRAY: u32 = 0x808080;
pub const BLUE: u32 = 0x0099FF;

pub const FOOTER_TEXT: &str = "Jenkins CI/CD";

const MINUTE_MS: i64 = 60 * 1000;
const HOUR_MS: i64 = 60 * MINUTE_MS;

/// Build outcome as shown on the card
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildStatus {
    Success,
    Failure,
    Unstable,
    Aborted,
    Started,
    Completed,
    /// Unrecognised code, echoed back verbatim
    Other(String),
}

impl BuildStatus {
    /// Classifies a nested-shape build. A non-empty `result` wins over `status`.
    pub fn classify(result: &str, status: &str) -> Self {
        if !result.is_empty() {
            return match result {
                "SUCCESS" => BuildStatus::Success,
                "FAILURE" => BuildStatus::Failure,
                "UNSTABLE" => BuildStatus::Unstable,
                "ABORTED" => BuildStatus::Aborted,
                other => BuildStatus::Other(other.to_string()),
            };
        }

        match status {
            "STARTED" => BuildStatus::Started,
            "COMPLETED" => BuildStatus::Completed,
            other => BuildStatus::Other(other.to_string()),
        }
    }

    /// Classifies the lowercase `event` word of the flat shape
    pub fn from_event(event: &str) -> Self {
        match event {
            "success" => BuildStatus::Success,
            "failure" | "failed" => BuildStatus::Failure,
            "unstable" => BuildStatus::Unstable,
            "aborted" => BuildStatus::Aborted,
            "started" => BuildStatus::Started,
            other => BuildStatus::Other(other.to_string()),
        }
    }

    pub fn color(&self) -> u32 {
        match self {
            BuildStatus::Success | BuildStatus::Completed => GREEN,
            BuildStatus::Failure => RED,
            BuildStatus::Unstable => ORANGE,
            BuildStatus::Started => BLUE,
            BuildStatus::Aborted | BuildStatus::Other(_) => GRAY,
        }
    }

    pub fn label(&self) -> &str {
        match self {
            BuildStatus::Success => "✅ Success",
            BuildStatus::Failure => "❌ Failure",
            BuildStatus::Unstable => "⚠️ Unstable",
            BuildStatus::Aborted => "🛑 Aborted",
            BuildStatus::Started => "🔄 Started",
            BuildStatus::Completed => "✅ Completed",
            BuildStatus::Other(raw) => raw,
        }
    }
}

/// Renders a build duration using the largest whole unit, one decimal place.
///
/// Jenkins reports 0 for builds that are still running, so 0 is shown as
/// `N/A` rather than `0.0s`.
pub fn format_duration(ms: i64) -> String {
    if ms == 0 {
        return "N/A".to_string();
    }

    if ms >= HOUR_MS {
        format!("{:.1}h", ms as f64 / HOUR_MS as f64)
    } else if ms >= MINUTE_MS {
        format!("{:.1}m", ms as f64 / MINUTE_MS as f64)
    } else {
        format!("{:.1}s", ms as f64 / 1000.0)
    }
}

/// Epoch milliseconds to RFC 3339 in the local timezone. Sub-second
/// precision is truncated.
pub fn format_timestamp(ms: i64) -> Option<String> {
    render_timestamp(ms, &Local)
}

fn render_timestamp<Tz>(ms: i64, tz: &Tz) -> Option<String>
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    tz.timestamp_opt(ms / 1000, 0)
        .single()
        .map(|dt| dt.to_rfc3339_opts(SecondsFormat::Secs, true))
}

/// Renders Jenkins' `{KEY=value, OTHER=value}` text as markdown lines.
///
/// Only one outer brace pair is stripped, so values containing `{`/`}` or
/// `", "` come out mangled. Entries without `=` are skipped.
pub fn parse_build_vars(raw: &str) -> String {
    let inner = raw
        .strip_prefix('{')
        .and_then(|s| s.strip_suffix('}'))
        .unwrap_or(raw);
    if inner.is_empty() {
        return String::new();
    }

    inner
        .split(", ")
        .filter_map(|entry| entry.split_once('='))
        .map(|(key, value)| format!("**{}**: {}", key.trim(), value.trim()))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Builds the Discord message for an inbound event
pub fn convert(event: &JenkinsEvent) -> DiscordWebhook {
    convert_at(event, Local::now())
}

fn convert_at(event: &JenkinsEvent, now: DateTime<Local>) -> DiscordWebhook {
    let embed = match event {
        JenkinsEvent::Nested(e) => nested_embed(e),
        JenkinsEvent::Flat(e) => flat_embed(e, now),
    };

    DiscordWebhook {
        content: String::new(),
        embeds: vec![embed],
    }
}

fn footer() -> Option<EmbedFooter> {
    Some(EmbedFooter {
        text: FOOTER_TEXT.to_string(),
    })
}

fn nested_embed(event: &NestedEvent) -> Embed {
    let build = &event.build;
    let status = BuildStatus::classify(&build.result, &build.status);

    let mut fields = vec![
        EmbedField::inline("Build Number", format!("#{}", build.number)),
        EmbedField::inline("Status", status.label()),
        EmbedField::inline("Duration", format_duration(build.duration)),
        EmbedField::inline("Phase", build.status.as_str()),
    ];
    if !build.cause.is_empty() {
        fields.push(EmbedField::block("Cause", build.cause.as_str()));
    }

    let timestamp = if build.timestamp == 0 {
        None
    } else {
        format_timestamp(build.timestamp)
    };

    Embed {
        title: format!("{} - Build #{}", event.job_label(), build.number),
        description: build.full_display_name.clone(),
        url: build.link().to_string(),
        color: status.color(),
        fields,
        timestamp,
        footer: footer(),
    }
}

fn flat_embed(event: &FlatEvent, now: DateTime<Local>) -> Embed {
    let status = BuildStatus::from_event(&event.event);

    let mut fields = vec![
        EmbedField::inline("Build", event.build_name.as_str()),
        EmbedField::inline("Status", status.label()),
        EmbedField::inline("Project", event.project_name.as_str()),
    ];
    let vars = parse_build_vars(&event.build_vars);
    if !vars.is_empty() {
        fields.push(EmbedField::block("Build Variables", vars));
    }

    Embed {
        title: format!("{} - {}", event.project_name, event.build_name),
        description: format!("Build {}", event.event),
        url: event.build_url.clone(),
        color: status.color(),
        fields,
        timestamp: Some(now.to_rfc3339_opts(SecondsFormat::Secs, true)),
        footer: footer(),
    }
}
