// Live-session endpoints (child-scoped).
//
// The level catalog is keyed by the child's grade level and must be read
// with the child token, not the parent's.

use tracing::debug;

use crate::auth::ChildCredentials;
use crate::client::ApiClient;
use crate::error::Error;
use crate::models::{
    CancelResponse, LevelId, Reservation, ReservationEnvelope, ReservationId, ReservationRequest,
    Session,
};

impl ApiClient {
    /// Sessions offered for a grade level, in server order.
    ///
    /// `GET /meetings/level/{level_id}`
    pub async fn list_sessions_by_level(
        &self,
        child: &ChildCredentials,
        level_id: LevelId,
    ) -> Result<Vec<Session>, Error> {
        debug!(%level_id, "listing sessions");
        let sessions: Option<Vec<Session>> = self
            .get(&format!("meetings/level/{level_id}"), child.into())
            .await?;
        Ok(sessions.unwrap_or_default())
    }

    /// Submit a reservation.
    ///
    /// `POST /meetings/reserve`. A single attempt; retry policy lives in
    /// the caller.
    pub async fn reserve(
        &self,
        child: &ChildCredentials,
        request: &ReservationRequest,
    ) -> Result<Reservation, Error> {
        debug!(
            meeting = %request.meeting_id,
            slot = %request.meeting_time_id,
            with_sale = request.sale_id.is_some(),
            "submitting reservation"
        );
        let envelope: ReservationEnvelope =
            self.post("meetings/reserve", request, child.into()).await?;
        Ok(envelope.into())
    }

    /// Cancel a reservation by its server-assigned id.
    ///
    /// `DELETE /meetings/cancel/{reservation_id}`
    pub async fn cancel_reservation(
        &self,
        child: &ChildCredentials,
        reservation_id: ReservationId,
    ) -> Result<CancelResponse, Error> {
        debug!(%reservation_id, "cancelling reservation");
        let resp: Option<CancelResponse> = self
            .delete_with_response(&format!("meetings/cancel/{reservation_id}"), child.into())
            .await?;
        Ok(resp.unwrap_or_default())
    }

    /// The child's own reservations.
    ///
    /// `GET /meetings/reservations`
    pub async fn list_reservations(
        &self,
        child: &ChildCredentials,
    ) -> Result<Vec<Reservation>, Error> {
        debug!("listing reservations");
        let list: Option<Vec<Reservation>> =
            self.get("meetings/reservations", child.into()).await?;
        Ok(list.unwrap_or_default())
    }
}
