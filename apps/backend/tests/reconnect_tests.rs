//! Disconnection, reconnection resync, stale-disconnect races, and
//! forfeit-driven teardown.

mod common;

use std::time::Duration;

use actix::Actor;
use backend::config::TimingConfig;
use backend::services::room::{Room, RoomCmd, SeatInit};
use backend::ws::protocol::ServerMsg;
use common::{has_msg, spawn_client, spawn_notice_sink, wait_until, TestClient};

fn relaxed_timing() -> TimingConfig {
    TimingConfig {
        turn_timeout: Duration::from_secs(60),
        bid_timeout: Duration::from_secs(60),
        surcoinche_delay: Duration::from_millis(20),
        surcoinche_window_secs: 1,
        matchmaking_countdown_secs: 1,
        tick_interval: Duration::from_millis(20),
    }
}

fn start_room(humans: &[(u8, &TestClient)], seed: u64) -> actix::Addr<Room> {
    let (notices, _) = spawn_notice_sink();
    start_room_with_notices(humans, seed, notices)
}

fn start_room_with_notices(
    humans: &[(u8, &TestClient)],
    seed: u64,
    notices: actix::Recipient<backend::services::coordinator::RoomNotice>,
) -> actix::Addr<Room> {
    let seats = (0..4u8)
        .map(|seat| match humans.iter().find(|(s, _)| *s == seat) {
            Some((_, client)) => SeatInit {
                name: format!("Player {seat}"),
                conn: Some((client.conn_id, client.tx.clone())),
                bot: false,
            },
            None => SeatInit {
                name: format!("Bot {seat}"),
                conn: None,
                bot: true,
            },
        })
        .collect();
    Room::new(11, relaxed_timing(), seats, notices, Some(seed)).start()
}

/// Drive seats 0 and 1 (open 160 Hearts from seat 0, pass otherwise, play
/// the first legal card) until `stop` holds over seat 0's log.
async fn drive_until(
    room: &actix::Addr<Room>,
    alice: &TestClient,
    bob: &TestClient,
    stop: impl Fn(&[ServerMsg]) -> bool,
) {
    let mut cursors = [0usize; 2];
    let mut opened = false;
    let deadline = std::time::Instant::now() + Duration::from_secs(30);
    loop {
        if stop(&alice.snapshot()) {
            return;
        }
        for (i, client) in [alice, bob].into_iter().enumerate() {
            let msgs = client.snapshot();
            for msg in &msgs[cursors[i]..] {
                let ServerMsg::GameState(state) = msg else {
                    continue;
                };
                if state.current_player != i as u8 || stop(&alice.snapshot()) {
                    continue;
                }
                if state.bidding_phase {
                    let (bid_value, suit) = if i == 0 && !opened {
                        opened = true;
                        (9, Some(3))
                    } else {
                        (12, None)
                    };
                    room.do_send(RoomCmd::MakeBid {
                        seat: i as u8,
                        bid_value,
                        suit,
                    });
                } else if state.atout.is_some() {
                    if let Some(&idx) = state.playable_cards.as_ref().and_then(|p| p.first()) {
                        room.do_send(RoomCmd::PlayCard {
                            seat: i as u8,
                            card_index: idx,
                        });
                    }
                }
            }
            cursors[i] = msgs.len();
        }
        assert!(
            std::time::Instant::now() < deadline,
            "drive_until never reached its stop condition"
        );
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
}

/// The state is paused on seat 0's turn during trick play with at least
/// one card already gone: a stable window to exercise reconnection.
fn paused_on_seat0_turn(log: &[ServerMsg]) -> bool {
    let cards_played = log
        .iter()
        .filter(|m| matches!(m, ServerMsg::CardPlayed { .. }))
        .count();
    if cards_played == 0 {
        return false;
    }
    log.iter().rev().find_map(|m| match m {
        ServerMsg::GameState(state) => Some(!state.bidding_phase && state.current_player == 0),
        _ => None,
    }) == Some(true)
}

#[actix_web::test]
async fn reconnecting_yields_the_same_legal_set() {
    let alice = spawn_client();
    let bob = spawn_client();
    let room = start_room(&[(0, &alice), (1, &bob)], 21);

    drive_until(&room, &alice, &bob, paused_on_seat0_turn).await;

    let before = bob
        .latest_game_state()
        .expect("seat 1 saw game states")
        .playable_cards
        .expect("playable set present during trick play");
    let bob_played = bob.count_where(|m| {
        matches!(m, ServerMsg::CardPlayed { player_index: 1, .. })
    });

    // Transport drop: the seat turns bot but stays bound to the identity.
    room.do_send(RoomCmd::ConnectionLost {
        seat: 1,
        conn_id: bob.conn_id,
    });
    assert!(
        wait_until(&alice, Duration::from_secs(2), |log| {
            has_msg(log, |m| matches!(m, ServerMsg::PlayerDisconnected { player_index: 1 }))
                && has_msg(log, |m| matches!(m, ServerMsg::BotReplacement { player_index: 1 }))
        })
        .await,
        "disconnect was not announced"
    );

    // A fresh connection presents the same identity.
    let bob2 = spawn_client();
    room.do_send(RoomCmd::Rebind {
        seat: 1,
        conn_id: bob2.conn_id,
        tx: bob2.tx.clone(),
    });
    assert!(
        wait_until(&bob2, Duration::from_secs(2), |log| {
            log.iter().any(|m| matches!(
                m,
                ServerMsg::GameState(state) if state.my_cards.is_some()
            ))
        })
        .await,
        "no resync after rebind"
    );

    let resync = bob2
        .snapshot()
        .into_iter()
        .find_map(|m| match m {
            ServerMsg::GameState(state) if state.my_cards.is_some() => Some(state),
            _ => None,
        })
        .unwrap();

    // Nothing moved while the seat was away (the room is waiting on seat
    // 0), so the legal set must be byte-for-byte identical.
    assert_eq!(resync.playable_cards.as_deref(), Some(&before[..]));
    assert_eq!(
        resync.my_cards.as_ref().map(Vec::len),
        Some(8 - bob_played),
        "resynced hand size disagrees with the cards seat 1 played"
    );
    let opponents = resync.opponents.expect("opponent card counts in resync");
    assert_eq!(opponents.len(), 3);
    assert!(resync.atout.is_some());

    // The old connection's disconnect arrives late: it must be a no-op
    // for the already-superseded binding.
    let disconnects_before = alice.count_where(|m| {
        matches!(m, ServerMsg::PlayerDisconnected { player_index: 1 })
    });
    room.do_send(RoomCmd::ConnectionLost {
        seat: 1,
        conn_id: bob.conn_id,
    });
    tokio::time::sleep(Duration::from_millis(150)).await;
    assert_eq!(
        alice.count_where(|m| matches!(m, ServerMsg::PlayerDisconnected { player_index: 1 })),
        disconnects_before,
        "a stale disconnect acted on a superseded connection"
    );
}

#[actix_web::test]
async fn forfeits_evict_permanently_and_tear_the_room_down() {
    let alice = spawn_client();
    let bob = spawn_client();
    let (notices, log) = spawn_notice_sink();
    let room = start_room_with_notices(&[(0, &alice), (1, &bob)], 22, notices);

    assert!(
        wait_until(&alice, Duration::from_secs(2), |log| {
            has_msg(log, |m| matches!(m, ServerMsg::GameFound { .. }))
        })
        .await
    );

    room.do_send(RoomCmd::Forfeit { seat: 1 });
    assert!(
        wait_until(&alice, Duration::from_secs(2), |log| {
            has_msg(log, |m| matches!(m, ServerMsg::PlayerForfeited { player_index: 1 }))
        })
        .await,
        "forfeit was not announced"
    );

    // A forfeited identity may not rebind.
    let bob2 = spawn_client();
    room.do_send(RoomCmd::Rebind {
        seat: 1,
        conn_id: bob2.conn_id,
        tx: bob2.tx.clone(),
    });
    assert!(
        wait_until(&bob2, Duration::from_secs(2), |log| {
            has_msg(log, |m| matches!(m, ServerMsg::GameNoLongerExists))
        })
        .await,
        "a forfeited seat was allowed back in"
    );

    // Once the last human forfeits, nobody is eligible to return and the
    // room reports itself closed.
    room.do_send(RoomCmd::Forfeit { seat: 0 });
    let deadline = std::time::Instant::now() + Duration::from_secs(3);
    loop {
        let notices = log.lock().unwrap().clone();
        if notices.iter().any(|n| n == "closed") {
            assert!(notices.iter().any(|n| n.starts_with("forfeit:")));
            break;
        }
        assert!(
            std::time::Instant::now() < deadline,
            "room never reported teardown"
        );
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
}
