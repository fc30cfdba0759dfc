//! Shared harness for room-level tests: recorder actors standing in for
//! WebSocket sessions, plus polling helpers.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use actix::prelude::*;
use uuid::Uuid;

use backend::services::coordinator::RoomNotice;
use backend::ws::protocol::{GameStateInfo, ServerMsg};
use backend::ws::session::Outbound;

/// Captures every frame a seat would have received.
pub struct Recorder {
    log: Arc<Mutex<Vec<ServerMsg>>>,
}

impl Actor for Recorder {
    type Context = Context<Self>;
}

impl Handler<Outbound> for Recorder {
    type Result = ();

    fn handle(&mut self, msg: Outbound, _ctx: &mut Self::Context) -> Self::Result {
        self.log.lock().unwrap().push(msg.0);
    }
}

#[derive(Clone)]
pub struct TestClient {
    pub conn_id: Uuid,
    pub log: Arc<Mutex<Vec<ServerMsg>>>,
    pub tx: Recipient<Outbound>,
}

pub fn spawn_client() -> TestClient {
    let log = Arc::new(Mutex::new(Vec::new()));
    let addr = Recorder { log: log.clone() }.start();
    TestClient {
        conn_id: Uuid::new_v4(),
        log,
        tx: addr.recipient(),
    }
}

impl TestClient {
    pub fn snapshot(&self) -> Vec<ServerMsg> {
        self.log.lock().unwrap().clone()
    }

    pub fn latest_game_state(&self) -> Option<GameStateInfo> {
        self.snapshot()
            .into_iter()
            .rev()
            .find_map(|msg| match msg {
                ServerMsg::GameState(state) => Some(state),
                _ => None,
            })
    }

    pub fn count_where(&self, pred: impl Fn(&ServerMsg) -> bool) -> usize {
        self.snapshot().iter().filter(|m| pred(m)).count()
    }
}

/// Swallows room→coordinator notices so rooms can run standalone.
pub struct NoticeSink {
    pub notices: Arc<Mutex<Vec<String>>>,
}

impl Actor for NoticeSink {
    type Context = Context<Self>;
}

impl Handler<RoomNotice> for NoticeSink {
    type Result = ();

    fn handle(&mut self, msg: RoomNotice, _ctx: &mut Self::Context) -> Self::Result {
        let tag = match msg {
            RoomNotice::SeatForfeited { ref name, .. } => format!("forfeit:{name}"),
            RoomNotice::MatchFinished { .. } => "finished".to_string(),
            RoomNotice::RoomClosed { .. } => "closed".to_string(),
        };
        self.notices.lock().unwrap().push(tag);
    }
}

pub fn spawn_notice_sink() -> (Recipient<RoomNotice>, Arc<Mutex<Vec<String>>>) {
    let notices = Arc::new(Mutex::new(Vec::new()));
    let addr = NoticeSink {
        notices: notices.clone(),
    }
    .start();
    (addr.recipient(), notices)
}

/// Poll until `pred` holds over the client's log, or the deadline passes.
pub async fn wait_until(
    client: &TestClient,
    timeout: Duration,
    pred: impl Fn(&[ServerMsg]) -> bool,
) -> bool {
    let deadline = std::time::Instant::now() + timeout;
    loop {
        if pred(&client.snapshot()) {
            return true;
        }
        if std::time::Instant::now() >= deadline {
            return false;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
}

pub fn has_msg(log: &[ServerMsg], pred: impl Fn(&ServerMsg) -> bool) -> bool {
    log.iter().any(|m| pred(m))
}
