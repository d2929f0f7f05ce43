#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    clippy::indexing_slicing
)]
//! Integration tests for the `CrisisClient` runtime.
//!
//! Uses the scripted `MockConnector` from `tests/common` to play the server's
//! side of a session and checks what reaches the wire, the render channel and
//! the published view.

mod common;

use std::time::Duration;

use crisis_survival_client::lifecycle::LinkState;
use crisis_survival_client::{
    ClientConfig, ClientError, ClientMessage, CrisisClient, Diagnostic, Mode, RenderInstruction,
    Screen, SessionView,
};
use tokio::sync::{mpsc, watch};
use tokio_test::assert_ok;

use common::{
    connected_json, game_starting_json, item_grabbed_json, keyword_options_json, mock_pair,
    phase_json, round_end_json, round_start_json, scavenge_json, ConnectScript, MockConnector,
};

fn config() -> ClientConfig {
    ClientConfig::new("ws://game.test")
}

/// Wait until the published view satisfies `predicate`.
async fn view_where(
    views: &mut watch::Receiver<SessionView>,
    predicate: impl FnMut(&SessionView) -> bool,
) -> SessionView {
    views
        .wait_for(predicate)
        .await
        .expect("session loop exited")
        .clone()
}

/// Drain render instructions until an alert arrives.
async fn next_alert(renders: &mut mpsc::Receiver<RenderInstruction>) -> Diagnostic {
    loop {
        match renders.recv().await.expect("render channel closed") {
            RenderInstruction::Alert(diagnostic) => return diagnostic,
            _ => continue,
        }
    }
}

fn alerts_in(renders: &mut mpsc::Receiver<RenderInstruction>) -> Vec<Diagnostic> {
    let mut alerts = Vec::new();
    while let Ok(instruction) = renders.try_recv() {
        if let RenderInstruction::Alert(diagnostic) = instruction {
            alerts.push(diagnostic);
        }
    }
    alerts
}

// ════════════════════════════════════════════════════════════════════
// Connecting
// ════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn solo_session_connects_with_encoded_name_and_starts() {
    let (connector, mut server) = MockConnector::accepting();
    let (mut client, _renders) = CrisisClient::start(connector.clone(), config());
    let mut views = client.subscribe();

    assert_ok!(client.enter_name("Ann Lee"));
    assert_ok!(client.start_solo());
    view_where(&mut views, |view| matches!(view.link, LinkState::Open(_))).await;
    assert_eq!(connector.urls(), vec!["ws://game.test/ws/Ann%20Lee"]);

    server.push(connected_json("p1"));
    assert_eq!(server.next_message().await, ClientMessage::StartSolo);

    let view = view_where(&mut views, |view| view.player_id.is_some()).await;
    assert_eq!(view.screen, Screen::Matching);
    assert_eq!(view.display_name, "Ann Lee");

    client.shutdown().await;
    assert!(server.client_closed());
}

#[tokio::test]
async fn refused_connection_alerts_and_returns_home() {
    let connector = MockConnector::new(vec![ConnectScript::Refuse]);
    let (mut client, mut renders) = CrisisClient::start(connector, config());

    client.start_solo().unwrap();

    assert_eq!(next_alert(&mut renders).await, Diagnostic::ConnectFailed);
    let view = view_where(&mut client.subscribe(), |view| view.screen == Screen::Home).await;
    assert_eq!(view.home_hint.as_deref(), Some(Diagnostic::ConnectFailed.message()));

    client.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn handshake_timeout_fires_after_configured_deadline() {
    let connector = MockConnector::new(vec![ConnectScript::Hang]);
    let (mut client, mut renders) = CrisisClient::start(
        connector,
        config().with_handshake_timeout(Duration::from_secs(5)),
    );
    let started = tokio::time::Instant::now();

    client.start_matching().unwrap();

    assert_eq!(next_alert(&mut renders).await, Diagnostic::HandshakeTimeout);
    assert!(started.elapsed() >= Duration::from_secs(5));
    let view = view_where(&mut client.subscribe(), |view| view.screen == Screen::Home).await;
    assert_eq!(view.link, LinkState::Closed);
    assert_eq!(view.countdown, None);

    client.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn opened_connection_never_times_out() {
    let (connector, mut server) = MockConnector::accepting();
    let (mut client, mut renders) = CrisisClient::start(connector, config());
    let mut views = client.subscribe();

    client.start_solo().unwrap();
    view_where(&mut views, |view| matches!(view.link, LinkState::Open(_))).await;

    tokio::time::sleep(Duration::from_secs(30)).await;

    assert!(alerts_in(&mut renders).is_empty());
    assert!(matches!(client.view().link, LinkState::Open(_)));
    assert!(server.drain_messages().is_empty());

    client.shutdown().await;
}

#[tokio::test]
async fn restarting_supersedes_pending_attempt() {
    let (transport, mut server) = mock_pair();
    let connector = MockConnector::new(vec![ConnectScript::Hang, ConnectScript::Accept(transport)]);
    let (mut client, mut renders) = CrisisClient::start(connector.clone(), config());
    let mut views = client.subscribe();

    client.start_matching().unwrap();
    while connector.urls().is_empty() {
        tokio::task::yield_now().await;
    }
    client.start_solo().unwrap();
    view_where(&mut views, |view| matches!(view.link, LinkState::Open(_))).await;

    assert_eq!(client.view().mode, Mode::Solo);
    server.push(connected_json("p2"));
    assert_eq!(server.next_message().await, ClientMessage::StartSolo);
    assert!(alerts_in(&mut renders).is_empty());

    client.shutdown().await;
}

// ════════════════════════════════════════════════════════════════════
// Matching countdown
// ════════════════════════════════════════════════════════════════════

#[tokio::test(start_paused = true)]
async fn countdown_ticks_once_per_second_until_zero() {
    let (connector, _server) = MockConnector::accepting();
    let (mut client, _renders) =
        CrisisClient::start(connector, config().with_matching_countdown(3));
    let mut views = client.subscribe();

    client.start_matching().unwrap();
    view_where(&mut views, |view| view.countdown == Some(3)).await;

    let started = tokio::time::Instant::now();
    view_where(&mut views, |view| view.countdown == Some(0)).await;
    assert!(started.elapsed() >= Duration::from_secs(3));

    tokio::time::sleep(Duration::from_secs(5)).await;
    assert_eq!(client.view().countdown, Some(0));
    assert_eq!(client.view().screen, Screen::Matching);

    client.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn cancel_stops_countdown_and_sends_cancel() {
    let (connector, mut server) = MockConnector::accepting();
    let (mut client, mut renders) = CrisisClient::start(connector, config());
    let mut views = client.subscribe();

    client.start_matching().unwrap();
    view_where(&mut views, |view| matches!(view.link, LinkState::Open(_))).await;
    server.push(connected_json("p1"));
    assert_eq!(server.next_message().await, ClientMessage::StartMatching);

    client.cancel_matching().unwrap();
    assert_eq!(server.next_message().await, ClientMessage::CancelMatching);
    let view = view_where(&mut views, |view| view.screen == Screen::Home).await;
    assert_eq!(view.countdown, None);
    assert!(server.client_closed());

    // The server dropping its end afterwards is expected.
    server.hang_up();
    tokio::time::sleep(Duration::from_secs(2)).await;
    assert!(alerts_in(&mut renders).is_empty());
    assert_eq!(client.view().countdown, None);

    client.shutdown().await;
}

// ════════════════════════════════════════════════════════════════════
// Playing
// ════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn full_round_reaches_the_wire_and_the_view() {
    let (connector, mut server) = MockConnector::accepting();
    let (mut client, _renders) = CrisisClient::start(connector, config());
    let mut views = client.subscribe();

    client.enter_name("A").unwrap();
    client.start_solo().unwrap();
    view_where(&mut views, |view| matches!(view.link, LinkState::Open(_))).await;
    server.push(connected_json("p1"));
    assert_eq!(server.next_message().await, ClientMessage::StartSolo);

    server.push(game_starting_json(&[("A", false), ("B", true), ("C", true)]));
    server.push(round_start_json(1, 3));
    server.push(phase_json("crisis_setup"));
    server.push(keyword_options_json(&["flood", "zombie", "meteor"]));
    view_where(&mut views, |view| {
        view.game
            .as_ref()
            .is_some_and(|game| game.round.keywords.options.len() == 3)
    })
    .await;

    client.choose_keyword(2).unwrap();
    assert_eq!(
        server.next_message().await,
        ClientMessage::KeywordChoice {
            choice: "meteor".into()
        }
    );

    server.push(scavenge_json(&[("Radio", "legendary"), ("Rope", "normal")]));
    view_where(&mut views, |view| {
        view.game.as_ref().is_some_and(|game| game.round.items.len() == 2)
    })
    .await;
    client.grab_item(0).unwrap();
    assert_eq!(server.next_message().await, ClientMessage::GrabItem { index: 0 });

    server.push(item_grabbed_json(0, "A", "Radio"));
    server.push(round_end_json(1, &[("A", 3), ("B", 1), ("C", 0)]));
    let view = view_where(&mut views, |view| {
        view.game
            .as_ref()
            .and_then(|game| game.roster_entry("A"))
            .is_some_and(|entry| entry.score == 3)
    })
    .await;
    let game = view.game.unwrap();
    assert_eq!(game.round.items[0].grabbed_by.as_deref(), Some("A"));
    assert!(game.round.commentary.is_some());

    client.shutdown().await;
}

#[tokio::test]
async fn undecodable_messages_are_skipped() {
    let (connector, mut server) = MockConnector::accepting();
    let (mut client, mut renders) = CrisisClient::start(connector, config());
    let mut views = client.subscribe();

    client.start_solo().unwrap();
    view_where(&mut views, |view| matches!(view.link, LinkState::Open(_))).await;
    server.push("{not json");
    server.push(r#"{"type":"lobby_chat","text":"hi"}"#);
    server.push(r#"{"queue_size":1}"#);
    server.push(connected_json("p1"));

    assert_eq!(server.next_message().await, ClientMessage::StartSolo);
    assert_eq!(client.view().screen, Screen::Matching);
    assert!(alerts_in(&mut renders).is_empty());

    client.shutdown().await;
}

// ════════════════════════════════════════════════════════════════════
// Closing
// ════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn server_hang_up_in_game_alerts() {
    let (connector, mut server) = MockConnector::accepting();
    let (mut client, mut renders) = CrisisClient::start(connector, config());
    let mut views = client.subscribe();

    client.enter_name("A").unwrap();
    client.start_solo().unwrap();
    view_where(&mut views, |view| matches!(view.link, LinkState::Open(_))).await;
    server.push(connected_json("p1"));
    server.push(game_starting_json(&[("A", false), ("B", true)]));
    view_where(&mut views, |view| view.screen == Screen::Game).await;

    server.hang_up();

    assert_eq!(next_alert(&mut renders).await, Diagnostic::UnintentionalDisconnect);
    let view = view_where(&mut views, |view| view.screen == Screen::Home).await;
    assert!(view.game.is_none());

    client.shutdown().await;
}

#[tokio::test]
async fn receive_error_counts_as_disconnect() {
    let (connector, server) = MockConnector::accepting();
    let (mut client, mut renders) = CrisisClient::start(connector, config());
    let mut views = client.subscribe();

    client.start_solo().unwrap();
    view_where(&mut views, |view| matches!(view.link, LinkState::Open(_))).await;
    server.fail();

    assert_eq!(next_alert(&mut renders).await, Diagnostic::UnintentionalDisconnect);

    client.shutdown().await;
}

#[tokio::test]
async fn failed_send_counts_as_disconnect() {
    let (connector, mut server) = MockConnector::accepting();
    let (mut client, mut renders) = CrisisClient::start(connector, config());
    let mut views = client.subscribe();

    client.start_solo().unwrap();
    view_where(&mut views, |view| matches!(view.link, LinkState::Open(_))).await;
    server.push(connected_json("p1"));
    server.push(game_starting_json(&[("Anonymous", false), ("B", true)]));
    server.push(phase_json("crisis_setup"));
    server.push(keyword_options_json(&["flood", "zombie"]));
    view_where(&mut views, |view| {
        view.game
            .as_ref()
            .is_some_and(|game| !game.round.keywords.options.is_empty())
    })
    .await;
    assert_eq!(server.next_message().await, ClientMessage::StartSolo);

    server.reject_sends();
    assert_ok!(client.choose_keyword(0));

    assert_eq!(next_alert(&mut renders).await, Diagnostic::UnintentionalDisconnect);
    let view = view_where(&mut views, |view| view.screen == Screen::Home).await;
    assert!(view.game.is_none());
    assert_eq!(view.link, LinkState::Closed);
    assert!(server.drain_messages().is_empty());

    tokio::task::yield_now().await;
    assert!(alerts_in(&mut renders).is_empty());

    client.shutdown().await;
}

#[tokio::test]
async fn confirmed_exit_sends_exit_game_without_alert() {
    let (connector, mut server) = MockConnector::accepting();
    let (mut client, mut renders) = CrisisClient::start(connector, config());
    let mut views = client.subscribe();

    client.start_solo().unwrap();
    view_where(&mut views, |view| matches!(view.link, LinkState::Open(_))).await;
    server.push(connected_json("p1"));
    server.push(game_starting_json(&[("Anonymous", false), ("B", true)]));
    view_where(&mut views, |view| view.screen == Screen::Game).await;

    client.request_exit().unwrap();
    client.confirm_exit().unwrap();

    assert_eq!(server.next_message().await, ClientMessage::StartSolo);
    assert_eq!(server.next_message().await, ClientMessage::ExitGame);
    view_where(&mut views, |view| view.screen == Screen::Home).await;
    assert!(server.client_closed());

    server.hang_up();
    tokio::task::yield_now().await;
    assert!(alerts_in(&mut renders).is_empty());

    client.shutdown().await;
}

#[tokio::test]
async fn intents_fail_once_loop_has_stopped() {
    let connector = MockConnector::new(Vec::new());
    let (mut client, renders) = CrisisClient::start(connector, config());

    client.shutdown().await;
    drop(renders);

    assert!(!client.is_running());
    assert!(matches!(client.grab_item(0), Err(ClientError::NotConnected)));
    assert!(matches!(client.play_again(), Err(ClientError::NotConnected)));
}

#[tokio::test]
async fn render_channel_closes_after_shutdown() {
    let connector = MockConnector::new(Vec::new());
    let (mut client, mut renders) =
        CrisisClient::start(connector, config().with_render_channel_capacity(1));

    client.start_solo().unwrap();
    client.shutdown().await;

    while renders.recv().await.is_some() {}
}
