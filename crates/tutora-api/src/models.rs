// Wire models for the Tutora REST API.
//
// Field names follow the server's snake_case JSON. Optional fields are
// tolerant (`#[serde(default)]`) because the backend omits nulls.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

// ── Identifiers ──────────────────────────────────────────────────────

macro_rules! id_type {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub i64);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl FromStr for $name {
            type Err = std::num::ParseIntError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                s.trim().parse().map(Self)
            }
        }

        impl From<i64> for $name {
            fn from(v: i64) -> Self {
                Self(v)
            }
        }
    };
}

id_type!(
    /// Learner profile identifier.
    ChildId
);
id_type!(
    /// Grade level identifier.
    LevelId
);
id_type!(MeetingId);
id_type!(SlotId);
id_type!(ReservationId);
id_type!(CartItemId);
id_type!(WebinarId);
id_type!(
    /// Any favoritable content item (book, webinar, meeting).
    ContentId
);
id_type!(TeacherId);
id_type!(
    /// Backend billing/order context a reservation may be linked to.
    SaleId
);

// ── Users & children ─────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest<'a> {
    pub mobile: &'a str,
    pub password: &'a str,
}

#[derive(Debug, Clone, Serialize)]
pub struct RegisterRequest {
    pub first_name: String,
    pub last_name: String,
    pub mobile: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub password: String,
}

/// Raw body of `login` / `register`. `token` is optional on the wire so
/// that a 2xx without a token is reported as a contract violation rather
/// than a decode error.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct TokenResponse {
    #[serde(default)]
    pub token: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct SwitchChildResponse {
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default, alias = "user", alias = "enfant")]
    pub child: Option<Child>,
}

/// A learner profile owned by the parent account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Child {
    pub id: ChildId,
    #[serde(alias = "nom", alias = "name")]
    pub first_name: String,
    #[serde(default, alias = "prenom")]
    pub last_name: Option<String>,
    #[serde(default)]
    pub level_id: Option<LevelId>,
    #[serde(default)]
    pub avatar: Option<String>,
}

impl Child {
    pub fn display_name(&self) -> String {
        match &self.last_name {
            Some(last) if !last.is_empty() => format!("{} {last}", self.first_name),
            _ => self.first_name.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct NewChild {
    pub first_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    pub level_id: LevelId,
}

// ── Sessions (meetings) ──────────────────────────────────────────────

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum::Display, strum::EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum SessionKind {
    Group,
    Individual,
}

/// A bookable live-tutoring offering. Read-only on the client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub id: MeetingId,
    #[serde(rename = "type")]
    pub kind: SessionKind,
    #[serde(default)]
    pub price: f64,
    /// Discount percentage, 0-100.
    #[serde(default)]
    pub discount: f64,
    #[serde(default, alias = "meeting_times")]
    pub times: Vec<TimeSlot>,
    #[serde(default)]
    pub level_id: Option<LevelId>,
    #[serde(default)]
    pub teacher_id: Option<TeacherId>,
    #[serde(default)]
    pub title: Option<String>,
}

/// One schedulable occurrence of a session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeSlot {
    pub id: SlotId,
    #[serde(default)]
    pub day: String,
    /// Start, epoch seconds.
    pub start: i64,
    /// End, epoch seconds.
    pub end: i64,
    #[serde(default, alias = "subject_id")]
    pub material_id: Option<i64>,
}

// ── Reservations ─────────────────────────────────────────────────────

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum::Display, strum::EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ReservationStatus {
    Reserved,
    Paid,
    Cancelled,
    Finished,
    #[serde(other)]
    Unknown,
}

/// Body of `POST /meetings/reserve`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReservationRequest {
    pub meeting_id: MeetingId,
    pub meeting_time_id: SlotId,
    pub user_id: ChildId,
    pub date: String,
    pub time: String,
    pub paid_amount: f64,
    #[serde(rename = "type")]
    pub kind: SessionKind,
    pub status: ReservationStatus,
    pub created_at: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sale_id: Option<SaleId>,
}

impl ReservationRequest {
    /// The same payload with `sale_id` removed.
    pub fn without_sale_id(&self) -> Self {
        Self {
            sale_id: None,
            ..self.clone()
        }
    }
}

/// A reservation as recorded by the server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reservation {
    pub id: ReservationId,
    pub meeting_id: MeetingId,
    #[serde(default)]
    pub meeting_time_id: Option<SlotId>,
    #[serde(default)]
    pub user_id: Option<ChildId>,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub time: Option<String>,
    #[serde(default)]
    pub paid_amount: Option<f64>,
    #[serde(default, rename = "type")]
    pub kind: Option<SessionKind>,
    #[serde(default = "default_status")]
    pub status: ReservationStatus,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub sale_id: Option<SaleId>,
}

fn default_status() -> ReservationStatus {
    ReservationStatus::Reserved
}

/// `reserve` answers either with the bare record or wrapped in
/// `{ "reservation": ... }`.
#[derive(Deserialize)]
#[serde(untagged)]
pub(crate) enum ReservationEnvelope {
    Wrapped { reservation: Reservation },
    Bare(Reservation),
}

impl From<ReservationEnvelope> for Reservation {
    fn from(env: ReservationEnvelope) -> Self {
        match env {
            ReservationEnvelope::Wrapped { reservation } | ReservationEnvelope::Bare(reservation) => {
                reservation
            }
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CancelResponse {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    level_id: Option<LevelId>,
    #[serde(default)]
    meeting: Option<MeetingRef>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct MeetingRef {
    #[serde(default)]
    level_id: Option<LevelId>,
}

impl CancelResponse {
    /// Level of the meeting the cancelled reservation belonged to, when
    /// the server reports it.
    pub fn level_id(&self) -> Option<LevelId> {
        self.level_id
            .or_else(|| self.meeting.as_ref().and_then(|m| m.level_id))
    }
}

// ── Cart ─────────────────────────────────────────────────────────────

/// What a cart line points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CartTarget {
    Meeting(MeetingId),
    Webinar(WebinarId),
}

impl CartTarget {
    pub(crate) fn to_body(self) -> serde_json::Value {
        match self {
            Self::Meeting(id) => serde_json::json!({ "meeting_id": id }),
            Self::Webinar(id) => serde_json::json!({ "webinar_id": id }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartItem {
    pub id: CartItemId,
    #[serde(default)]
    pub meeting_id: Option<MeetingId>,
    #[serde(default)]
    pub webinar_id: Option<WebinarId>,
    #[serde(default)]
    pub price: f64,
    #[serde(default)]
    pub teacher_id: Option<TeacherId>,
}

impl CartItem {
    pub fn target(&self) -> Option<CartTarget> {
        self.meeting_id
            .map(CartTarget::Meeting)
            .or_else(|| self.webinar_id.map(CartTarget::Webinar))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CheckoutReceipt {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub sale_id: Option<SaleId>,
    #[serde(default)]
    pub total: Option<f64>,
}

// ── Favorites & follows ──────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct FavoriteToggleResponse {
    #[serde(alias = "favorite", alias = "liked")]
    pub is_favorite: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FavoriteItem {
    #[serde(alias = "content_id")]
    pub id: ContentId,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default, alias = "type")]
    pub kind: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct IsFollowingResponse {
    #[serde(alias = "following")]
    pub is_following: bool,
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct FollowRequest {
    pub follower_id: ChildId,
    pub teacher_id: TeacherId,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct FollowerCountResponse {
    #[serde(alias = "followers", alias = "total")]
    pub count: u64,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    #[test]
    fn session_parses_server_shape() {
        let raw = json!({
            "id": 12,
            "type": "group",
            "price": 40.0,
            "discount": 25,
            "meeting_times": [
                { "id": 3, "day": "Lundi", "start": 1_700_000_000, "end": 1_700_003_600, "subject_id": 9 }
            ]
        });
        let session: Session = serde_json::from_value(raw).unwrap();
        assert_eq!(session.kind, SessionKind::Group);
        assert_eq!(session.times.len(), 1);
        assert_eq!(session.times[0].material_id, Some(9));
        assert_eq!(session.level_id, None);
    }

    #[test]
    fn without_sale_id_drops_only_that_field() {
        let req = ReservationRequest {
            meeting_id: MeetingId(1),
            meeting_time_id: SlotId(2),
            user_id: ChildId(3),
            date: "2024-01-01".into(),
            time: "10:00-11:00".into(),
            paid_amount: 10.0,
            kind: SessionKind::Individual,
            status: ReservationStatus::Reserved,
            created_at: "2024-01-01T00:00:00Z".into(),
            sale_id: Some(SaleId(1)),
        };
        let stripped = serde_json::to_value(req.without_sale_id()).unwrap();
        let full = serde_json::to_value(&req).unwrap();
        assert!(stripped.get("sale_id").is_none());
        assert_eq!(full["sale_id"], json!(1));
        assert_eq!(stripped["meeting_time_id"], full["meeting_time_id"]);
        assert_eq!(stripped["type"], json!("individual"));
    }

    #[test]
    fn cancel_response_level_from_nested_meeting() {
        let resp: CancelResponse =
            serde_json::from_value(json!({ "meeting": { "level_id": 4 } })).unwrap();
        assert_eq!(resp.level_id(), Some(LevelId(4)));

        let empty: CancelResponse = serde_json::from_value(json!({})).unwrap();
        assert_eq!(empty.level_id(), None);
    }

    #[test]
    fn unknown_reservation_status_is_tolerated() {
        let r: Reservation =
            serde_json::from_value(json!({ "id": 1, "meeting_id": 2, "status": "on_hold" }))
                .unwrap();
        assert_eq!(r.status, ReservationStatus::Unknown);
    }

    #[test]
    fn cart_target_prefers_meeting() {
        let item = CartItem {
            id: CartItemId(1),
            meeting_id: Some(MeetingId(5)),
            webinar_id: None,
            price: 0.0,
            teacher_id: None,
        };
        assert_eq!(item.target(), Some(CartTarget::Meeting(MeetingId(5))));
    }
}
