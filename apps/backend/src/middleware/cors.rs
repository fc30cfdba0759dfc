use actix_cors::Cors;

/// Browser clients connect from arbitrary origins (itch-style web builds,
/// the Qt WebView); the protocol carries no cookies, so a permissive
/// policy is fine here.
pub fn cors_middleware() -> Cors {
    Cors::default()
        .allow_any_origin()
        .allow_any_method()
        .allow_any_header()
        .max_age(3600)
}
