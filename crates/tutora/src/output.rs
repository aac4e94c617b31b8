//! Output formatting: table, JSON, YAML, plain.
//!
//! Renders data in the format selected by `--output`. Table uses `tabled`,
//! structured formats use serde, plain emits one identifier per line.

use std::io::{self, IsTerminal, Write};

use chrono::DateTime;
use owo_colors::OwoColorize;
use tabled::{Table, Tabled, settings::Style};

use tutora_core::{CartItem, Child, FavoriteItem, Reservation, ReservationStatus, Session};

use crate::cli::{ColorMode, OutputFormat};

/// Determine whether color output should be enabled.
pub fn should_color(mode: &ColorMode) -> bool {
    match mode {
        ColorMode::Always => true,
        ColorMode::Never => false,
        ColorMode::Auto => io::stdout().is_terminal() && std::env::var("NO_COLOR").is_err(),
    }
}

/// Green check line for human-readable confirmations.
pub fn success(message: &str, color: bool) -> String {
    if color {
        format!("{} {message}", "✓".green())
    } else {
        message.to_owned()
    }
}

// ── Render dispatchers ───────────────────────────────────────────────

/// Render a list of serde-serializable + tabled items in the chosen format.
pub fn render_list<T, R>(
    format: &OutputFormat,
    data: &[T],
    to_row: impl Fn(&T) -> R,
    id_fn: impl Fn(&T) -> String,
) -> String
where
    T: serde::Serialize,
    R: Tabled,
{
    match format {
        OutputFormat::Table => {
            let rows: Vec<R> = data.iter().map(to_row).collect();
            render_table(&rows)
        }
        OutputFormat::Json => render_json(data, false),
        OutputFormat::JsonCompact => render_json(data, true),
        OutputFormat::Yaml => render_yaml(data),
        OutputFormat::Plain => data.iter().map(&id_fn).collect::<Vec<_>>().join("\n"),
    }
}

/// Render a single serde-serializable item in the chosen format.
///
/// Table rendering uses `detail_fn`, since detail views are key/value
/// text rather than a `Tabled` grid.
pub fn render_single<T>(
    format: &OutputFormat,
    data: &T,
    detail_fn: impl Fn(&T) -> String,
    id_fn: impl Fn(&T) -> String,
) -> String
where
    T: serde::Serialize,
{
    match format {
        OutputFormat::Table => detail_fn(data),
        OutputFormat::Json => render_json(data, false),
        OutputFormat::JsonCompact => render_json(data, true),
        OutputFormat::Yaml => render_yaml(data),
        OutputFormat::Plain => id_fn(data),
    }
}

/// Print the rendered output to stdout, respecting quiet mode.
pub fn print_output(output: &str, quiet: bool) {
    if quiet || output.is_empty() {
        return;
    }
    let mut stdout = io::stdout().lock();
    let _ = writeln!(stdout, "{output}");
}

// ── Format-specific renderers ────────────────────────────────────────

fn render_table<R: Tabled>(rows: &[R]) -> String {
    Table::new(rows).with(Style::rounded()).to_string()
}

fn render_json<T: serde::Serialize + ?Sized>(data: &T, compact: bool) -> String {
    let rendered = if compact {
        serde_json::to_string(data)
    } else {
        serde_json::to_string_pretty(data)
    };
    rendered.unwrap_or_else(|e| format!("{{\"error\":\"serialization failed: {e}\"}}"))
}

fn render_yaml<T: serde::Serialize + ?Sized>(data: &T) -> String {
    serde_yaml::to_string(data).unwrap_or_else(|e| format!("error: serialization failed: {e}"))
}

// ── Row types ────────────────────────────────────────────────────────

fn or_dash<T: ToString>(value: Option<T>) -> String {
    value.map_or_else(|| "-".into(), |v| v.to_string())
}

fn price(amount: f64) -> String {
    format!("{amount:.2}")
}

#[derive(Tabled)]
pub struct ChildRow {
    #[tabled(rename = "")]
    pub active: String,
    #[tabled(rename = "ID")]
    pub id: String,
    #[tabled(rename = "Name")]
    pub name: String,
    #[tabled(rename = "Level")]
    pub level: String,
}

impl ChildRow {
    pub fn new(child: &Child, active: bool) -> Self {
        Self {
            active: if active { "*".into() } else { String::new() },
            id: child.id.to_string(),
            name: child.display_name(),
            level: or_dash(child.level_id),
        }
    }
}

#[derive(Tabled)]
pub struct SessionRow {
    #[tabled(rename = "ID")]
    pub id: String,
    #[tabled(rename = "Title")]
    pub title: String,
    #[tabled(rename = "Kind")]
    pub kind: String,
    #[tabled(rename = "Price")]
    pub price: String,
    #[tabled(rename = "Discount")]
    pub discount: String,
    #[tabled(rename = "Slots")]
    pub slots: String,
}

impl From<&Session> for SessionRow {
    fn from(s: &Session) -> Self {
        let slots = s
            .times
            .iter()
            .map(|t| format!("#{} {} {}-{}", t.id, t.day, clock(t.start), clock(t.end)))
            .collect::<Vec<_>>()
            .join("\n");
        Self {
            id: s.id.to_string(),
            title: s.title.clone().unwrap_or_default(),
            kind: s.kind.to_string(),
            price: price(tutora_core::reservation::discounted_price(s.price, s.discount)),
            discount: if s.discount > 0.0 {
                format!("{}%", s.discount)
            } else {
                String::new()
            },
            slots,
        }
    }
}

/// Epoch seconds as a UTC `HH:MM`, matching the time sent when reserving.
fn clock(epoch_secs: i64) -> String {
    DateTime::from_timestamp(epoch_secs, 0)
        .map_or_else(|| "--:--".into(), |t| t.format("%H:%M").to_string())
}

#[derive(Tabled)]
pub struct ReservationRow {
    #[tabled(rename = "ID")]
    pub id: String,
    #[tabled(rename = "Session")]
    pub meeting: String,
    #[tabled(rename = "Date")]
    pub date: String,
    #[tabled(rename = "Time")]
    pub time: String,
    #[tabled(rename = "Paid")]
    pub paid: String,
    #[tabled(rename = "Status")]
    pub status: String,
}

impl ReservationRow {
    pub fn new(r: &Reservation, color: bool) -> Self {
        let status = r.status.to_string();
        let status = if color {
            match r.status {
                ReservationStatus::Paid => status.green().to_string(),
                ReservationStatus::Reserved => status.yellow().to_string(),
                ReservationStatus::Cancelled => status.red().to_string(),
                _ => status.dimmed().to_string(),
            }
        } else {
            status
        };
        Self {
            id: r.id.to_string(),
            meeting: r.meeting_id.to_string(),
            date: or_dash(r.date.as_deref()),
            time: or_dash(r.time.as_deref()),
            paid: or_dash(r.paid_amount.map(price)),
            status,
        }
    }
}

#[derive(Tabled)]
pub struct CartRow {
    #[tabled(rename = "ID")]
    pub id: String,
    #[tabled(rename = "Item")]
    pub item: String,
    #[tabled(rename = "Price")]
    pub price: String,
}

impl From<&CartItem> for CartRow {
    fn from(c: &CartItem) -> Self {
        let item = match (c.meeting_id, c.webinar_id) {
            (Some(m), _) => format!("session {m}"),
            (None, Some(w)) => format!("webinar {w}"),
            (None, None) => "-".into(),
        };
        Self {
            id: c.id.to_string(),
            item,
            price: price(c.price),
        }
    }
}

#[derive(Tabled)]
pub struct FavoriteRow {
    #[tabled(rename = "ID")]
    pub id: String,
    #[tabled(rename = "Title")]
    pub title: String,
    #[tabled(rename = "Kind")]
    pub kind: String,
}

impl From<&FavoriteItem> for FavoriteRow {
    fn from(f: &FavoriteItem) -> Self {
        Self {
            id: f.id.to_string(),
            title: f.title.clone().unwrap_or_default(),
            kind: or_dash(f.kind.as_deref()),
        }
    }
}
