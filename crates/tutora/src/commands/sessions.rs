//! Session browsing and reservation handlers.

use serde::Serialize;

use tutora_core::{LevelId, MeetingId, Reservation, SaleId, SlotId, Tutora};

use crate::cli::{GlobalOpts, ReserveArgs, SessionsArgs, SessionsCommand};
use crate::error::CliError;
use crate::output::{self, CartRow, ReservationRow, SessionRow};

use super::util;

/// `--level`, else the active child's level.
fn level_for(app: &Tutora, explicit: Option<i64>) -> Result<LevelId, CliError> {
    if let Some(level) = explicit {
        return Ok(LevelId(level));
    }
    app.state()
        .active_child()
        .and_then(|c| c.level_id)
        .ok_or_else(|| CliError::Validation {
            field: "level".into(),
            reason: "the active child has no level; pass --level".into(),
        })
}

pub async fn handle(app: &Tutora, args: SessionsArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        SessionsCommand::List { level } => {
            let level = level_for(app, level)?;
            let sessions = app.catalog().fetch_sessions_by_level(level).await?;
            let out = output::render_list(
                &global.output,
                &sessions,
                |s| SessionRow::from(s),
                |s| s.id.to_string(),
            );
            output::print_output(&out, global.quiet);
            Ok(())
        }
    }
}

#[derive(Serialize)]
struct BookingView<'a> {
    reservation: &'a Reservation,
    attempts: u8,
    added_to_cart: bool,
}

pub async fn reserve(app: &Tutora, args: ReserveArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let booking = app
        .reserve_and_add_to_cart(
            MeetingId(args.meeting),
            args.slot.map(SlotId),
            args.sale.map(SaleId),
        )
        .await?;

    let color = output::should_color(&global.color);
    let view = BookingView {
        reservation: &booking.outcome.reservation,
        attempts: booking.outcome.attempts,
        added_to_cart: booking.cart.is_ok(),
    };
    let out = output::render_single(
        &global.output,
        &view,
        |v| {
            let row = ReservationRow::new(v.reservation, color);
            format!(
                "Reservation:   #{}\nSession:       {}\nDate:          {} {}\nStatus:        {}",
                row.id, row.meeting, row.date, row.time, row.status
            )
        },
        |v| v.reservation.id.to_string(),
    );
    output::print_output(&out, global.quiet);

    match booking.cart {
        Ok(cart) => {
            util::report(global, "Added to cart");
            if matches!(global.output, crate::cli::OutputFormat::Table) && !global.quiet {
                let rows: Vec<CartRow> = cart.iter().map(CartRow::from).collect();
                eprintln!("{}", tabled::Table::new(rows));
            }
        }
        Err(e) => {
            if !global.quiet {
                eprintln!(
                    "Reserved, but adding it to the cart failed: {}\nAdd it with: tutora cart add --meeting {}",
                    e.user_message(),
                    args.meeting
                );
            }
        }
    }
    Ok(())
}
