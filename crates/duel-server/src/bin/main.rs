#[tokio::main]
async fn main() {
    let db_url = std::env::var("DATABASE_URL")
        .unwrap_or_else(|_| "sqlite:duel.db?mode=rwc".to_string());
    let (app, _state) = duel_server::build_app(&db_url).await;

    let port = std::env::var("PORT").unwrap_or_else(|_| "8080".to_string());
    let addr = format!("0.0.0.0:{}", port);

    if std::env::var("GENERATOR_URL").is_err() {
        println!("╔═══════════════════════════════════════════════════════╗");
        println!("║  DUEL SERVER — BUILT-IN GENERATOR                     ║");
        println!("║  GENERATOR_URL unset; using the heuristic generator.  ║");
        println!("╚═══════════════════════════════════════════════════════╝");
        println!();
    }

    println!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("Failed to bind");

    axum::serve(listener, app).await.expect("Server error");
}
