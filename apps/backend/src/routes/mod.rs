use actix_web::web;

use crate::health;
use crate::ws;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/healthz", web::get().to(health::healthz))
        .route("/ws", web::get().to(ws::session::upgrade));
}
