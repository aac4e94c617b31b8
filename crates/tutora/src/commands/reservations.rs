//! Reservation list and cancel handlers.

use tutora_core::{ReservationId, Tutora};

use crate::cli::{GlobalOpts, ReservationsArgs, ReservationsCommand};
use crate::error::CliError;
use crate::output::{self, ReservationRow};

use super::util;

pub async fn handle(
    app: &Tutora,
    args: ReservationsArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match args.command {
        ReservationsCommand::List => {
            let reservations = app.reservations().list_reservations().await?;
            let color = output::should_color(&global.color);
            let out = output::render_list(
                &global.output,
                &reservations,
                |r| ReservationRow::new(r, color),
                |r| r.id.to_string(),
            );
            output::print_output(&out, global.quiet);
            Ok(())
        }

        ReservationsCommand::Cancel { id } => {
            if !util::confirm(&format!("Cancel reservation #{id}?"), "reservations cancel", global.yes)? {
                return Ok(());
            }
            let resp = app.reservations().cancel(ReservationId(id)).await?;
            let message = resp
                .message
                .unwrap_or_else(|| format!("Reservation #{id} cancelled"));
            util::report(global, &message);
            Ok(())
        }
    }
}
