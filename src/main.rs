use std::net::SocketAddr;
use tokio::net::TcpListener;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();
    dotenvy::dotenv().ok();

    let database_url = std::env::var("DATABASE_URL")
        .unwrap_or_else(|_| "sqlite:data/custodia.db".to_string());

    let pool = custodia::db::init_pool(&database_url).await;

    let args: Vec<String> = std::env::args().collect();
    match args.get(1).map(String::as_str) {
        Some("create-user") => {
            let Some(name) = args.get(2) else {
                eprintln!("Usage: custodia create-user <name> [email]");
                std::process::exit(1);
            };
            if let Err(e) =
                custodia::cli::create_user(&pool, name, args.get(3).map(String::as_str)).await
            {
                eprintln!("create-user failed: {e}");
                std::process::exit(1);
            }
            return;
        }
        Some("import") => {
            let Some(file) = args.get(2) else {
                eprintln!("Usage: custodia import <items.json>");
                std::process::exit(1);
            };
            if let Err(e) = custodia::cli::import_items(&pool, file).await {
                eprintln!("import failed: {e}");
                std::process::exit(1);
            }
            return;
        }
        Some("sweep") => {
            if let Err(e) = custodia::cli::sweep_archive(&pool).await {
                eprintln!("sweep failed: {e}");
                std::process::exit(1);
            }
            return;
        }
        Some(other) => {
            eprintln!("Unknown command: {other}");
            std::process::exit(1);
        }
        None => {}
    }

    let secure_cookies = std::env::var("SECURE_COOKIES")
        .map(|v| v == "1" || v == "true")
        .unwrap_or(false);

    let app = custodia::build_app(pool, secure_cookies).await;

    let addr = SocketAddr::from(([0, 0, 0, 0], 3000));
    let listener = TcpListener::bind(addr).await.unwrap();

    tracing::info!("listening on {}", addr);
    axum::serve(listener, app).await.unwrap();
}
