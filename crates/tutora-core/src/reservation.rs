// ── Reservation workflow ──
//
// One reservation attempt per call, plus at most one retry:
//
//   Idle -> Submitting -> (Succeeded | Retrying | Failed)
//   Retrying -> Succeeded | Failed
//
// The only recoverable rejection is the server refusing the speculative
// `sale_id`. Everything else, including the retry's own failure, is final.

use std::sync::Arc;

use chrono::{DateTime, SecondsFormat, Utc};
use tracing::{debug, info, warn};

use tutora_api::{
    ApiClient, CancelResponse, ChildId, Reservation, ReservationId, ReservationRequest,
    ReservationStatus, SaleId, Session, SlotId, TimeSlot,
};

use crate::catalog::SessionCatalog;
use crate::error::CoreError;
use crate::state::AppState;

/// Where the current (or last) reservation attempt stands.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ReservationPhase {
    #[default]
    Idle,
    Submitting,
    /// First attempt rejected for its `sale_id`; resubmitting without it.
    Retrying,
    Succeeded,
    Failed {
        message: String,
    },
}

/// A reservation the server accepted.
#[derive(Debug, Clone, PartialEq)]
pub struct ReservationOutcome {
    pub reservation: Reservation,
    /// Requests sent: 1, or 2 when the sale-free retry was needed.
    pub attempts: u8,
}

/// Whether a server rejection refers to the `sale_id` field.
///
/// This is the one place where retry behavior depends on message text.
pub fn is_sale_id_rejection(message: &str) -> bool {
    const MARKERS: [&str; 3] = ["sale_id", "sale not found", "vente introuvable"];
    let message = message.to_lowercase();
    MARKERS.iter().any(|marker| message.contains(marker))
}

/// Pick the requested slot, or the session's first one.
pub fn select_slot(session: &Session, slot_id: Option<SlotId>) -> Result<&TimeSlot, CoreError> {
    match slot_id {
        Some(id) => session.times.iter().find(|t| t.id == id).ok_or_else(|| {
            CoreError::validation(format!("Session {} has no time slot {id}", session.id))
        }),
        None => session
            .times
            .first()
            .ok_or_else(|| CoreError::validation(format!("Session {} has no time slots", session.id))),
    }
}

/// Build the first-attempt payload.
///
/// `sale_id` is the known sale when there is one, otherwise the meeting id.
pub fn build_request(
    session: &Session,
    slot: &TimeSlot,
    child_id: ChildId,
    known_sale: Option<SaleId>,
    now: DateTime<Utc>,
) -> ReservationRequest {
    let start = DateTime::from_timestamp(slot.start, 0).unwrap_or_default();
    let end = DateTime::from_timestamp(slot.end, 0).unwrap_or_default();

    ReservationRequest {
        meeting_id: session.id,
        meeting_time_id: slot.id,
        user_id: child_id,
        date: start.format("%Y-%m-%d").to_string(),
        time: format!("{}-{}", start.format("%H:%M"), end.format("%H:%M")),
        paid_amount: discounted_price(session.price, session.discount),
        kind: session.kind,
        status: ReservationStatus::Reserved,
        created_at: now.to_rfc3339_opts(SecondsFormat::Secs, true),
        sale_id: Some(known_sale.unwrap_or(SaleId(session.id.0))),
    }
}

/// Price after a percentage discount, rounded to cents.
pub fn discounted_price(price: f64, discount: f64) -> f64 {
    let discount = discount.clamp(0.0, 100.0);
    (price * (100.0 - discount)).round() / 100.0
}

#[derive(Clone)]
pub struct ReservationWorkflow {
    api: ApiClient,
    state: Arc<AppState>,
    catalog: SessionCatalog,
}

impl ReservationWorkflow {
    pub fn new(api: ApiClient, state: Arc<AppState>, catalog: SessionCatalog) -> Self {
        Self {
            api,
            state,
            catalog,
        }
    }

    /// Reserve a slot of `session` for the active child.
    ///
    /// Local preconditions (signed in, active child, slot exists) are
    /// checked before any request. At most two requests are sent.
    pub async fn reserve(
        &self,
        session: &Session,
        slot_id: Option<SlotId>,
        known_sale: Option<SaleId>,
    ) -> Result<ReservationOutcome, CoreError> {
        let child = self.state.child_credentials()?;
        let slot = select_slot(session, slot_id)?;
        let request = build_request(session, slot, child.child_id(), known_sale, Utc::now());

        self.state.set_reservation_phase(ReservationPhase::Submitting);
        let result = match self.api.reserve(&child, &request).await {
            Ok(reservation) => Ok((reservation, 1)),
            Err(e) if e.server_message().is_some_and(is_sale_id_rejection) => {
                info!(meeting = %session.id, error = %e, "sale_id rejected; retrying without it");
                self.state.set_reservation_phase(ReservationPhase::Retrying);
                self.api
                    .reserve(&child, &request.without_sale_id())
                    .await
                    .map(|reservation| (reservation, 2))
            }
            Err(e) => Err(e),
        };

        match result {
            Ok((reservation, attempts)) => {
                info!(reservation = %reservation.id, attempts, "reservation accepted");
                self.state.set_reservation_phase(ReservationPhase::Succeeded);
                self.state.publish_success(reservation.clone());
                Ok(ReservationOutcome {
                    reservation,
                    attempts,
                })
            }
            Err(e) => {
                let err = CoreError::from(e);
                warn!(meeting = %session.id, error = %err, "reservation failed");
                self.state.set_reservation_phase(ReservationPhase::Failed {
                    message: err.user_message(),
                });
                Err(err)
            }
        }
    }

    /// Consume the pending success event, if any.
    ///
    /// Returns `Some` at most once per accepted reservation and puts the
    /// workflow back to idle.
    pub fn acknowledge_success(&self) -> Option<Reservation> {
        let reservation = self.state.take_success()?;
        self.state.set_reservation_phase(ReservationPhase::Idle);
        Some(reservation)
    }

    /// Consume the pending success event only if it is for `id`.
    ///
    /// An event belonging to another reservation stays pending for its
    /// own caller.
    pub fn acknowledge_success_for(&self, id: ReservationId) -> Option<Reservation> {
        let reservation = self.state.take_success_if(id)?;
        self.state.set_reservation_phase(ReservationPhase::Idle);
        Some(reservation)
    }

    /// Cancel a reservation and refresh the level it freed capacity in.
    pub async fn cancel(&self, reservation_id: ReservationId) -> Result<CancelResponse, CoreError> {
        let child = self.state.child_credentials()?;
        let resp = self.api.cancel_reservation(&child, reservation_id).await?;
        info!(%reservation_id, "reservation cancelled");

        if let Some(level_id) = resp.level_id() {
            if let Err(e) = self.catalog.fetch_sessions_by_level(level_id).await {
                warn!(%level_id, error = %e, "session refresh after cancel failed");
            }
        } else {
            debug!(%reservation_id, "cancel response carries no level");
        }
        Ok(resp)
    }

    pub async fn list_reservations(&self) -> Result<Vec<Reservation>, CoreError> {
        let child = self.state.child_credentials()?;
        Ok(self.api.list_reservations(&child).await?)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use pretty_assertions::assert_eq;
    use tutora_api::{MeetingId, SessionKind};

    use super::*;

    fn session(times: Vec<TimeSlot>) -> Session {
        Session {
            id: MeetingId(42),
            kind: SessionKind::Individual,
            price: 30.0,
            discount: 15.0,
            times,
            level_id: None,
            teacher_id: None,
            title: None,
        }
    }

    fn slot(id: i64) -> TimeSlot {
        TimeSlot {
            id: SlotId(id),
            day: "Mardi".into(),
            // 2024-03-05 14:00:00 UTC .. 15:30:00 UTC
            start: 1_709_647_200,
            end: 1_709_652_600,
            material_id: Some(4),
        }
    }

    #[test]
    fn predicate_matches_sale_markers_only() {
        assert!(is_sale_id_rejection("sale_id manquant"));
        assert!(is_sale_id_rejection("The SALE_ID field is invalid"));
        assert!(is_sale_id_rejection("Sale not found"));
        assert!(is_sale_id_rejection("Vente introuvable"));
        assert!(!is_sale_id_rejection("Erreur: champ invalide"));
        assert!(!is_sale_id_rejection("sale closed"));
        assert!(!is_sale_id_rejection(""));
    }

    #[test]
    fn payload_is_derived_from_the_slot() {
        let session = session(vec![slot(7)]);
        let now = DateTime::from_timestamp(1_709_600_000, 0).unwrap();
        let req = build_request(&session, &session.times[0], ChildId(5), None, now);

        assert_eq!(req.meeting_id, MeetingId(42));
        assert_eq!(req.meeting_time_id, SlotId(7));
        assert_eq!(req.user_id, ChildId(5));
        assert_eq!(req.date, "2024-03-05");
        assert_eq!(req.time, "14:00-15:30");
        assert_eq!(req.paid_amount, 25.5);
        assert_eq!(req.kind, SessionKind::Individual);
        assert_eq!(req.status, ReservationStatus::Reserved);
        assert_eq!(req.created_at, "2024-03-05T00:53:20Z");
        assert_eq!(req.sale_id, Some(SaleId(42)));
    }

    #[test]
    fn known_sale_wins_over_meeting_fallback() {
        let session = session(vec![slot(7)]);
        let req = build_request(&session, &session.times[0], ChildId(5), Some(SaleId(900)), Utc::now());
        assert_eq!(req.sale_id, Some(SaleId(900)));
        assert_eq!(req.without_sale_id().sale_id, None);
    }

    #[test]
    fn slot_selection() {
        let session = session(vec![slot(7), slot(8)]);
        assert_eq!(select_slot(&session, None).unwrap().id, SlotId(7));
        assert_eq!(select_slot(&session, Some(SlotId(8))).unwrap().id, SlotId(8));
        assert!(matches!(
            select_slot(&session, Some(SlotId(99))),
            Err(CoreError::Validation { .. })
        ));

        let empty = self::session(Vec::new());
        assert!(matches!(
            select_slot(&empty, None),
            Err(CoreError::Validation { .. })
        ));
    }

    #[test]
    fn discount_rounds_to_cents() {
        assert_eq!(discounted_price(19.99, 33.0), 13.39);
        assert_eq!(discounted_price(50.0, 0.0), 50.0);
        assert_eq!(discounted_price(50.0, 140.0), 0.0);
    }
}
