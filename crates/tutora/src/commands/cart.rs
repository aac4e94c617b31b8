//! Cart handlers.

use tutora_core::{CartItemId, CartTarget, MeetingId, Tutora, WebinarId};

use crate::cli::{CartArgs, CartCommand, GlobalOpts};
use crate::error::CliError;
use crate::output::{self, CartRow};

use super::util;

fn print_cart(items: &[tutora_core::CartItem], global: &GlobalOpts) {
    let out = output::render_list(&global.output, items, |c| CartRow::from(c), |c| c.id.to_string());
    output::print_output(&out, global.quiet);
}

pub async fn handle(app: &Tutora, args: CartArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        CartCommand::List => {
            let items = app.cart().fetch_cart().await?;
            print_cart(&items, global);
            Ok(())
        }

        CartCommand::Add { meeting, webinar } => {
            let target = match (meeting, webinar) {
                (Some(id), _) => CartTarget::Meeting(MeetingId(id)),
                (None, Some(id)) => CartTarget::Webinar(WebinarId(id)),
                (None, None) => {
                    return Err(CliError::Validation {
                        field: "target".into(),
                        reason: "pass --meeting or --webinar".into(),
                    });
                }
            };
            let items = app.cart().add_to_cart(target).await?;
            util::report(global, "Added to cart");
            print_cart(&items, global);
            Ok(())
        }

        CartCommand::Remove { id } => {
            let items = app.cart().remove_from_cart(CartItemId(id)).await?;
            util::report(global, &format!("Removed cart item #{id}"));
            print_cart(&items, global);
            Ok(())
        }

        CartCommand::Checkout => {
            // A fresh process has no cart snapshot yet.
            let items = app.cart().fetch_cart().await?;
            let total: f64 = items.iter().map(|i| i.price).sum();
            if !items.is_empty()
                && !util::confirm(
                    &format!("Pay {total:.2} for {} item(s)?", items.len()),
                    "cart checkout",
                    global.yes,
                )?
            {
                return Ok(());
            }

            let receipt = app.cart().checkout().await?;
            let out = output::render_single(
                &global.output,
                &receipt,
                |r| {
                    let mut lines = vec![
                        r.message
                            .clone()
                            .unwrap_or_else(|| "Payment complete".into()),
                    ];
                    if let Some(sale) = r.sale_id {
                        lines.push(format!("Sale:   #{sale}"));
                    }
                    if let Some(total) = r.total {
                        lines.push(format!("Total:  {total:.2}"));
                    }
                    lines.join("\n")
                },
                |r| r.sale_id.map(|s| s.to_string()).unwrap_or_default(),
            );
            output::print_output(&out, global.quiet);
            Ok(())
        }
    }
}
