use std::{net::SocketAddr, sync::Arc};

use tracing::info;
use tracing_subscriber::{EnvFilter, fmt};

use daily_log::config::Config;
use daily_log::remote::{AuthSession, HttpRemoteStore, RemoteStore};
use daily_log::repository::LogRepository;
use daily_log::state::AppState;
use daily_log::storage::{DurableStore, SessionStore};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse()?))
        .init();

    let config = Config::from_env();

    let remote: Option<Arc<dyn RemoteStore>> = config
        .remote
        .as_ref()
        .map(|settings| Arc::new(HttpRemoteStore::new(settings)) as Arc<dyn RemoteStore>);

    let auth = match &remote {
        Some(store) => {
            let user = store.current_user().await;
            match &user {
                Some(user) => info!("signed in as {}", user.0),
                None => info!("cloud configured but no user session, running anonymously"),
            }
            AuthSession::new(user)
        }
        None => {
            info!("no cloud configured, running anonymously");
            AuthSession::anonymous()
        }
    };

    let mut auth_changes = auth.subscribe();
    tokio::spawn(async move {
        while auth_changes.changed().await.is_ok() {
            match auth_changes.borrow().clone() {
                Some(user) => info!("auth state changed: signed in as {}", user.0),
                None => info!("auth state changed: signed out"),
            }
        }
    });

    let repo = LogRepository::new(
        DurableStore::new(config.data_path.clone()),
        SessionStore::new(),
        remote,
        auth,
    );
    let state = AppState::new(repo);
    let app = daily_log::router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    info!("listening on http://{addr}");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
