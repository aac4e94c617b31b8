#![allow(clippy::unwrap_used)]
// End-to-end workflow tests: `Tutora` facade against a wiremock backend.

use std::sync::Arc;
use std::time::Duration;

use pretty_assertions::assert_eq;
use secrecy::SecretString;
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Match, Mock, MockServer, Request, ResponseTemplate};

use tutora_api::ApiClient;
use tutora_core::storage::keys;
use tutora_core::{
    ApplicationPhase, CartItemId, ChildId, ContentId, CoreError, FollowState, KeyValueStore,
    LevelId, MeetingId, MemoryStore, ReservationId, ReservationPhase, TeacherId, Tutora,
};

// ── Helpers ─────────────────────────────────────────────────────────

const LINA: &str = r#"{"id":1,"first_name":"Lina","level_id":3}"#;

fn app(server: &MockServer, store: Arc<MemoryStore>) -> Tutora {
    let api = ApiClient::with_client(reqwest::Client::new(), &server.uri()).unwrap();
    Tutora::with_api(api, store)
}

/// Parent signed in, child 1 active, children cached. Restoring this
/// sends no request.
async fn signed_in() -> (MockServer, Tutora, Arc<MemoryStore>) {
    let server = MockServer::start().await;
    let store = Arc::new(MemoryStore::new());
    store.set(keys::TOKEN, "parent-token").unwrap();
    store.set(keys::TOKEN_CHILD, "child-1-token").unwrap();
    store.set(keys::ACTIVE_CHILD_ID, "1").unwrap();
    store.set(keys::ACTIVE_CHILD, LINA).unwrap();
    store.set(keys::CHILDREN, &format!("[{LINA}]")).unwrap();

    let app = app(&server, Arc::clone(&store));
    assert_eq!(app.restore_session().await, ApplicationPhase::HasChildren);
    (server, app, store)
}

async fn mount_level_3(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/meetings/level/3"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{
            "id": 12,
            "type": "group",
            "price": 40.0,
            "discount": 25,
            "meeting_times": [{ "id": 3, "day": "Lundi", "start": 1_709_553_600, "end": 1_709_557_200 }]
        }])))
        .mount(server)
        .await;
}

async fn request_count(server: &MockServer) -> usize {
    server.received_requests().await.unwrap().len()
}

/// Matches reservation bodies by presence of `sale_id`.
struct HasSaleId(bool);

impl Match for HasSaleId {
    fn matches(&self, request: &Request) -> bool {
        serde_json::from_slice::<serde_json::Value>(&request.body)
            .is_ok_and(|body| body.get("sale_id").is_some() == self.0)
    }
}

// ── Reservation retry ───────────────────────────────────────────────

#[tokio::test]
async fn test_second_rejection_is_final() {
    let (server, app, _) = signed_in().await;
    mount_level_3(&server).await;

    Mock::given(method("POST"))
        .and(path("/meetings/reserve"))
        .respond_with(
            ResponseTemplate::new(422).set_body_json(json!({ "message": "sale_id invalide" })),
        )
        .expect(2)
        .mount(&server)
        .await;

    let result = app.reserve_and_add_to_cart(MeetingId(12), None, None).await;
    assert!(matches!(result, Err(CoreError::Api { status: Some(422), .. })));
    assert!(matches!(
        app.state().reservation_phase(),
        ReservationPhase::Failed { .. }
    ));
    assert!(!app.state().has_pending_success());
}

#[tokio::test]
async fn test_unrelated_rejection_is_not_retried() {
    let (server, app, _) = signed_in().await;
    mount_level_3(&server).await;

    Mock::given(method("POST"))
        .and(path("/meetings/reserve"))
        .respond_with(
            ResponseTemplate::new(400)
                .set_body_json(json!({ "message": "Erreur: champ invalide" })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let err = app
        .reserve_and_add_to_cart(MeetingId(12), None, None)
        .await
        .unwrap_err();
    assert_eq!(err.user_message(), "Erreur: champ invalide");
}

#[tokio::test]
async fn test_transport_failure_is_not_retried() {
    let (server, _, store) = signed_in().await;
    mount_level_3(&server).await;

    Mock::given(method("POST"))
        .and(path("/meetings/reserve"))
        .respond_with(
            ResponseTemplate::new(201)
                .set_body_json(json!({ "id": 501, "meeting_id": 12 }))
                .set_delay(Duration::from_secs(2)),
        )
        .expect(1)
        .mount(&server)
        .await;

    let http = reqwest::Client::builder()
        .timeout(Duration::from_millis(200))
        .build()
        .unwrap();
    let api = ApiClient::with_client(http, &server.uri()).unwrap();
    let app = Tutora::with_api(api, store);
    assert_eq!(app.restore_session().await, ApplicationPhase::HasChildren);

    let err = app
        .reserve_and_add_to_cart(MeetingId(12), None, None)
        .await
        .unwrap_err();
    assert!(
        matches!(err, CoreError::Timeout | CoreError::ConnectionFailed { .. }),
        "{err:?}"
    );
    assert!(matches!(
        app.state().reservation_phase(),
        ReservationPhase::Failed { .. }
    ));
    assert!(!app.state().has_pending_success());

    let reserves = server
        .received_requests()
        .await
        .unwrap()
        .iter()
        .filter(|r| r.url.path() == "/meetings/reserve")
        .count();
    assert_eq!(reserves, 1);
}

#[tokio::test]
async fn test_sale_rejection_retries_without_sale_id_then_adds_to_cart() {
    let (server, app, _) = signed_in().await;
    mount_level_3(&server).await;

    Mock::given(method("POST"))
        .and(path("/meetings/reserve"))
        .and(HasSaleId(true))
        .respond_with(
            ResponseTemplate::new(422).set_body_json(json!({ "message": "sale_id manquant" })),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/meetings/reserve"))
        .and(HasSaleId(false))
        .and(header("authorization", "Bearer child-1-token"))
        .respond_with(
            ResponseTemplate::new(201)
                .set_body_json(json!({ "id": 501, "meeting_id": 12, "status": "reserved" })),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/cart"))
        .and(body_json(json!({ "meeting_id": 12 })))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/cart"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!([{ "id": 8, "meeting_id": 12, "price": 30.0 }])),
        )
        .mount(&server)
        .await;

    let booking = app
        .reserve_and_add_to_cart(MeetingId(12), None, None)
        .await
        .unwrap();
    assert_eq!(booking.outcome.attempts, 2);
    assert_eq!(booking.outcome.reservation.id, ReservationId(501));
    assert_eq!(booking.cart.unwrap().len(), 1);

    // The success event was consumed by the cart add.
    assert_eq!(app.reservations().acknowledge_success(), None);
    assert_eq!(app.state().reservation_phase(), ReservationPhase::Idle);
}

#[tokio::test]
async fn test_unknown_slot_sends_nothing() {
    let (server, app, _) = signed_in().await;
    mount_level_3(&server).await;

    let result = app
        .reserve_and_add_to_cart(MeetingId(12), Some(tutora_core::SlotId(99)), None)
        .await;
    assert!(matches!(result, Err(CoreError::Validation { .. })));
    // Only the catalog fetch went out.
    assert_eq!(request_count(&server).await, 1);
}

#[tokio::test]
async fn test_cancel_refreshes_level() {
    let (server, app, _) = signed_in().await;

    Mock::given(method("DELETE"))
        .and(path("/meetings/cancel/77"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "message": "Annulée", "meeting": { "level_id": 3 } })),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/meetings/level/3"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;

    let resp = app.reservations().cancel(ReservationId(77)).await.unwrap();
    assert_eq!(resp.message.as_deref(), Some("Annulée"));
    assert_eq!(app.catalog().cached(LevelId(3)).unwrap().len(), 0);
}

// ── Identity ────────────────────────────────────────────────────────

#[tokio::test]
async fn test_restore_with_empty_storage() {
    let server = MockServer::start().await;
    let app = app(&server, Arc::new(MemoryStore::new()));

    assert_eq!(app.restore_session().await, ApplicationPhase::Unauthenticated);
    assert_eq!(request_count(&server).await, 0);
    assert!(matches!(
        app.state().child_credentials(),
        Err(CoreError::NotAuthenticated)
    ));
}

#[tokio::test]
async fn test_restore_fetches_children_when_cache_is_empty() {
    let server = MockServer::start().await;
    let store = Arc::new(MemoryStore::new());
    store.set(keys::TOKEN, "parent-token").unwrap();

    Mock::given(method("GET"))
        .and(path("/enfants"))
        .and(header("authorization", "Bearer parent-token"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(format!("[{LINA}]"), "application/json"))
        .expect(1)
        .mount(&server)
        .await;

    let app = app(&server, Arc::clone(&store));
    assert_eq!(app.restore_session().await, ApplicationPhase::HasChildren);
    assert!(store.get(keys::CHILDREN).unwrap().is_some());
}

#[tokio::test]
async fn test_restore_survives_network_failure() {
    let server = MockServer::start().await;
    let store = Arc::new(MemoryStore::new());
    store.set(keys::TOKEN, "parent-token").unwrap();

    Mock::given(method("GET"))
        .and(path("/enfants"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let app = app(&server, store);
    assert_eq!(app.restore_session().await, ApplicationPhase::NeedsChild);
}

#[tokio::test]
async fn test_login_commits_parent_and_loads_children() {
    let server = MockServer::start().await;
    let store = Arc::new(MemoryStore::new());

    Mock::given(method("POST"))
        .and(path("/users/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "token": "fresh" })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/enfants"))
        .and(header("authorization", "Bearer fresh"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    let app = app(&server, Arc::clone(&store));
    let phase = app
        .login("0600000000", &SecretString::from("pw".to_string()))
        .await
        .unwrap();
    assert_eq!(phase, ApplicationPhase::NeedsChild);
    assert_eq!(store.get(keys::TOKEN).unwrap().as_deref(), Some("fresh"));
}

#[tokio::test]
async fn test_failed_login_keeps_previous_identity() {
    let (server, app, store) = signed_in().await;

    Mock::given(method("POST"))
        .and(path("/users/login"))
        .respond_with(
            ResponseTemplate::new(400).set_body_json(json!({ "message": "Mot de passe incorrect" })),
        )
        .mount(&server)
        .await;

    let err = app
        .login("0600000000", &SecretString::from("bad".to_string()))
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::AuthenticationFailed { .. }));
    assert_eq!(store.get(keys::TOKEN).unwrap().as_deref(), Some("parent-token"));
    assert_eq!(app.state().active_child_id().unwrap(), ChildId(1));
}

#[tokio::test]
async fn test_login_with_failed_children_fetch_drops_previous_cart() {
    let (server, app, store) = signed_in().await;

    Mock::given(method("GET"))
        .and(path("/cart"))
        .and(header("authorization", "Bearer child-1-token"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!([{ "id": 5, "meeting_id": 12, "price": 30.0 }])),
        )
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/users/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "token": "other-parent" })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/enfants"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({ "message": "boom" })))
        .mount(&server)
        .await;

    assert_eq!(app.cart().fetch_cart().await.unwrap().len(), 1);

    assert!(
        app.login("0611111111", &SecretString::from("pw".to_string()))
            .await
            .is_err()
    );

    // The new account is signed in without a child; nothing of child 1 remains.
    assert_eq!(store.get(keys::TOKEN).unwrap().as_deref(), Some("other-parent"));
    assert_eq!(store.get(keys::TOKEN_CHILD).unwrap(), None);
    assert!(app.state().active_child_id().is_err());
    assert!(app.cart().snapshot().is_empty());
}

#[tokio::test]
async fn test_failed_switch_keeps_previous_child() {
    let (server, app, store) = signed_in().await;

    Mock::given(method("POST"))
        .and(path("/users/switch-child"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({ "message": "boom" })))
        .expect(1)
        .mount(&server)
        .await;

    assert!(app.switch_active_child(ChildId(2)).await.is_err());
    assert_eq!(app.state().active_child_id().unwrap(), ChildId(1));
    assert_eq!(
        store.get(keys::TOKEN_CHILD).unwrap().as_deref(),
        Some("child-1-token")
    );
    assert_eq!(store.get(keys::ACTIVE_CHILD_ID).unwrap().as_deref(), Some("1"));
}

#[tokio::test]
async fn test_switch_replaces_pair_and_loads_cart() {
    let (server, app, store) = signed_in().await;

    Mock::given(method("POST"))
        .and(path("/users/switch-child"))
        .and(header("authorization", "Bearer parent-token"))
        .and(body_json(json!({ "child_id": 2 })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "token": "child-2-token",
            "child": { "id": 2, "first_name": "Adam", "level_id": 5 }
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/enfants"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "id": 1, "first_name": "Lina", "level_id": 3 },
            { "id": 2, "first_name": "Adam", "level_id": 5 }
        ])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/cart"))
        .and(header("authorization", "Bearer child-2-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{ "id": 4, "webinar_id": 9 }])))
        .expect(1)
        .mount(&server)
        .await;

    let child = app.switch_active_child(ChildId(2)).await.unwrap();
    assert_eq!(child.first_name, "Adam");
    assert_eq!(app.state().active_child_id().unwrap(), ChildId(2));
    assert_eq!(app.state().identity().children.len(), 2);
    assert_eq!(app.cart().snapshot().len(), 1);
    assert_eq!(
        store.get(keys::TOKEN_CHILD).unwrap().as_deref(),
        Some("child-2-token")
    );
    assert_eq!(store.get(keys::ACTIVE_CHILD_ID).unwrap().as_deref(), Some("2"));
}

#[tokio::test]
async fn test_logout_clears_storage() {
    let (_server, app, store) = signed_in().await;
    app.logout();
    assert!(store.is_empty());
    assert_eq!(app.state().phase(), ApplicationPhase::Unauthenticated);
}

// ── Cart ────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_removed_item_is_gone_after_refetch() {
    let (server, app, _) = signed_in().await;

    Mock::given(method("GET"))
        .and(path("/cart"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "id": 5, "meeting_id": 12, "price": 30.0 },
            { "id": 6, "webinar_id": 2, "price": 10.0 }
        ])))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/cart/5"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/cart"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!([{ "id": 6, "webinar_id": 2, "price": 10.0 }])),
        )
        .mount(&server)
        .await;

    assert_eq!(app.cart().fetch_cart().await.unwrap().len(), 2);

    let after = app.cart().remove_from_cart(CartItemId(5)).await.unwrap();
    assert!(after.iter().all(|item| item.id != CartItemId(5)));

    let fresh = app.cart().fetch_cart().await.unwrap();
    assert!(fresh.iter().all(|item| item.id != CartItemId(5)));
}

#[tokio::test]
async fn test_empty_checkout_sends_nothing() {
    let (server, app, _) = signed_in().await;

    let err = app.cart().checkout().await.unwrap_err();
    assert!(matches!(err, CoreError::Validation { .. }));
    assert!(err.is_local());
    assert_eq!(request_count(&server).await, 0);
}

#[tokio::test]
async fn test_checkout_refreshes_cart() {
    let (server, app, _) = signed_in().await;

    Mock::given(method("GET"))
        .and(path("/cart"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{ "id": 5, "meeting_id": 12 }])))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/cart/checkout"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "sale_id": 900, "total": 30.0 })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/cart"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    app.cart().fetch_cart().await.unwrap();
    let receipt = app.cart().checkout().await.unwrap();
    assert_eq!(receipt.sale_id, Some(tutora_core::SaleId(900)));
    assert!(app.cart().snapshot().is_empty());
}

// ── Favorites & follows ─────────────────────────────────────────────

#[tokio::test]
async fn test_favorite_toggled_twice_returns_to_original() {
    let (server, app, _) = signed_in().await;

    Mock::given(method("POST"))
        .and(path("/likes/favorite/9"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "is_favorite": true })))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/likes/favorite/9"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "is_favorite": false })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/likes/favorites"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{ "id": 9, "title": "Algèbre" }])))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/likes/favorites"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    let original = app.state().is_favorite(ContentId(9));

    assert!(app.ledger().toggle_favorite(ContentId(9)).await.unwrap());
    assert!(app.state().is_favorite(ContentId(9)));
    assert!(app.state().favorites().iter().any(|f| f.id == ContentId(9)));

    assert!(!app.ledger().toggle_favorite(ContentId(9)).await.unwrap());
    assert_eq!(app.state().is_favorite(ContentId(9)), original);
    assert!(app.state().favorites().iter().all(|f| f.id != ContentId(9)));
}

#[tokio::test]
async fn test_follower_count_comes_from_server() {
    let (server, app, _) = signed_in().await;

    Mock::given(method("GET"))
        .and(path("/follows/is-following/1/4"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "is_following": false })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/follows/subscribe"))
        .and(body_json(json!({ "follower_id": 1, "teacher_id": 4 })))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/follows/count/4"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "count": 57 })))
        .mount(&server)
        .await;

    let state = app.ledger().toggle_follow(TeacherId(4)).await.unwrap();
    assert_eq!(
        state,
        FollowState {
            following: true,
            followers: 57
        }
    );
    assert_eq!(app.state().follower_count(TeacherId(4)), Some(57));
    assert_eq!(app.state().is_following(TeacherId(4)), Some(true));
}
