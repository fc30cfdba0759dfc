//! WebSocket end-to-end: four clients register, queue, get matched into a
//! room and see the opening bid broadcast.

use std::sync::Arc;
use std::time::Duration;

use actix::Actor;
use actix_web::{web, App, HttpServer};
use futures_util::{SinkExt, StreamExt};
use serde_json::{json, Value};
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};

use backend::adapters::{LogMailer, MemoryStatsStore};
use backend::config::TimingConfig;
use backend::routes;
use backend::services::coordinator::Coordinator;
use backend::state::app_state::AppState;

type WsStream = WebSocketStream<MaybeTlsStream<tokio::net::TcpStream>>;

struct WsClient {
    stream: WsStream,
}

impl WsClient {
    async fn connect(port: u16) -> Self {
        let (stream, _) = connect_async(format!("ws://127.0.0.1:{port}/ws"))
            .await
            .expect("websocket handshake");
        Self { stream }
    }

    async fn send(&mut self, value: Value) {
        self.stream
            .send(Message::text(value.to_string()))
            .await
            .expect("send frame");
    }

    /// Read frames until one with the given `type` tag arrives.
    async fn wait_type(&mut self, wanted: &str) -> Value {
        let deadline = Duration::from_secs(5);
        tokio::time::timeout(deadline, async {
            loop {
                let msg = self
                    .stream
                    .next()
                    .await
                    .expect("stream open")
                    .expect("frame ok");
                let Ok(text) = msg.to_text() else { continue };
                if text.is_empty() {
                    continue;
                }
                let Ok(value) = serde_json::from_str::<Value>(text) else {
                    continue;
                };
                if value["type"] == wanted {
                    return value;
                }
            }
        })
        .await
        .unwrap_or_else(|_| panic!("timed out waiting for {wanted}"))
    }
}

#[actix_web::test]
async fn matchmaking_seats_four_clients_and_broadcasts_bids() {
    let mut timing = TimingConfig::short_for_tests();
    timing.bid_timeout = Duration::from_secs(30);
    timing.turn_timeout = Duration::from_secs(30);

    let stats = Arc::new(MemoryStatsStore::new());
    let mailer = Arc::new(LogMailer);
    let coordinator = Coordinator::new(timing.clone(), stats, mailer).start();
    let data = web::Data::new(AppState::new(coordinator, timing));

    let server = HttpServer::new(move || {
        App::new()
            .app_data(data.clone())
            .configure(routes::configure)
    })
    .workers(1)
    .bind(("127.0.0.1", 0))
    .expect("bind test server");
    let port = server.addrs()[0].port();
    actix_web::rt::spawn(server.run());

    let mut clients = Vec::new();
    for i in 0..4 {
        let mut client = WsClient::connect(port).await;
        client.wait_type("connected").await;
        client
            .send(json!({ "type": "register", "playerName": format!("Joueur {i}") }))
            .await;
        let registered = client.wait_type("registered").await;
        assert_eq!(registered["playerName"], format!("Joueur {i}"));
        client.send(json!({ "type": "joinMatchmaking" })).await;
        let status = client.wait_type("matchmakingStatus").await;
        assert_eq!(status["status"], "searching");
        clients.push(client);
    }

    // Four queued: countdown, then the room forms and deals.
    clients[0].wait_type("matchmakingCountdown").await;
    for (i, client) in clients.iter_mut().enumerate() {
        let found = client.wait_type("gameFound").await;
        assert_eq!(found["playerPosition"], i as u64);
        assert_eq!(found["myCards"].as_array().unwrap().len(), 8);
        assert_eq!(found["opponents"].as_array().unwrap().len(), 3);
    }

    // Seat 0 opens; everyone sees the bid.
    clients[0]
        .send(json!({ "type": "makeBid", "bidValue": 1, "suit": 3 }))
        .await;
    for client in clients.iter_mut() {
        let bid = client.wait_type("bidMade").await;
        assert_eq!(bid["playerIndex"], 0);
        assert_eq!(bid["bidValue"], 1);
        assert_eq!(bid["suit"], 3);
    }

    // An out-of-turn bid is rejected without touching the game.
    clients[0]
        .send(json!({ "type": "makeBid", "bidValue": 2, "suit": 4 }))
        .await;
    let err = clients[0].wait_type("error").await;
    assert!(err["message"].as_str().unwrap().contains("turn"));
}
