use once_cell::sync::Lazy;
use reqwest::Client;
use serde::Deserialize;
use std::net::TcpListener;
use std::process::{Child, Command, Stdio};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tokio::time::sleep;

#[derive(Debug, Deserialize)]
struct WorkTime {
    amount: u32,
    unit: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LogEntry {
    id: String,
    created_at: String,
    project: String,
    work_time: WorkTime,
}

#[derive(Debug, Deserialize)]
struct ProjectStats {
    total_minutes: u64,
    working_days: usize,
    streak: u32,
}

struct TestServer {
    base_url: String,
    child: Child,
}

impl Drop for TestServer {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}

static TEST_LOCK: Lazy<Mutex<()>> = Lazy::new(|| Mutex::new(()));
static SERVER: Lazy<Mutex<Option<Arc<TestServer>>>> = Lazy::new(|| Mutex::new(None));

#[cfg(unix)]
mod cleanup {
    use std::sync::Once;
    use std::sync::atomic::{AtomicI32, Ordering};

    static REGISTER: Once = Once::new();
    static PID: AtomicI32 = AtomicI32::new(0);

    pub fn register(pid: u32) {
        REGISTER.call_once(|| {
            PID.store(pid as i32, Ordering::SeqCst);
            unsafe {
                libc::atexit(on_exit);
            }
        });
    }

    extern "C" fn on_exit() {
        let pid = PID.load(Ordering::SeqCst);
        if pid > 0 {
            unsafe {
                libc::kill(pid, libc::SIGTERM);
            }
        }
    }
}

fn pick_free_port() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind random port");
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    port
}

fn unique_data_path() -> String {
    let nanos = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    let mut path = std::env::temp_dir();
    path.push(format!("daily_log_http_{}_{}.json", std::process::id(), nanos));
    path.to_string_lossy().to_string()
}

async fn wait_until_ready(base_url: &str) {
    let client = Client::new();
    let deadline = Instant::now() + Duration::from_secs(3);
    loop {
        if let Ok(resp) = client.get(format!("{base_url}/api/logs")).send().await {
            if resp.status().is_success() {
                return;
            }
        }
        if Instant::now() > deadline {
            panic!("server did not become ready");
        }
        sleep(Duration::from_millis(100)).await;
    }
}

async fn spawn_server() -> TestServer {
    let port = pick_free_port();
    let data_path = unique_data_path();
    let child = Command::new(env!("CARGO_BIN_EXE_daily_log"))
        .env("PORT", port.to_string())
        .env("APP_DATA_PATH", data_path)
        .env("RUST_LOG", "info")
        .env_remove("REMOTE_DB_URL")
        .env_remove("REMOTE_DB_KEY")
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit())
        .spawn()
        .expect("failed to spawn server");

    #[cfg(unix)]
    cleanup::register(child.id());

    let base_url = format!("http://127.0.0.1:{port}");
    wait_until_ready(&base_url).await;

    TestServer { base_url, child }
}

async fn shared_server() -> Arc<TestServer> {
    let mut guard = SERVER.lock().await;
    if let Some(server) = guard.as_ref() {
        return Arc::clone(server);
    }
    let server = Arc::new(spawn_server().await);
    *guard = Some(Arc::clone(&server));
    server
}

fn draft(project: &str, minutes: u32) -> serde_json::Value {
    serde_json::json!({
        "project": project,
        "workTime": { "amount": minutes, "unit": "minutes" },
        "gains": "made solid progress on the storage layer today",
        "challenges": "the duplicate check needed careful date handling",
        "plan": "tomorrow I will wire up the statistics endpoints"
    })
}

#[tokio::test]
async fn http_create_and_list_round_trip() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();

    let response = client
        .post(format!("{}/api/logs", server.base_url))
        .json(&draft("RoundTrip", 90))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 201);
    let created: LogEntry = response.json().await.unwrap();
    assert_eq!(created.project, "RoundTrip");
    assert_eq!(created.work_time.amount, 90);
    assert_eq!(created.work_time.unit, "minutes");
    assert!(!created.created_at.is_empty());

    let logs: Vec<LogEntry> = client
        .get(format!("{}/api/logs", server.base_url))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(logs.iter().any(|entry| entry.id == created.id));
}

#[tokio::test]
async fn http_duplicate_create_conflicts() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();

    let first = client
        .post(format!("{}/api/logs", server.base_url))
        .json(&draft("Duplicate", 30))
        .send()
        .await
        .unwrap();
    assert_eq!(first.status(), 201);

    let second = client
        .post(format!("{}/api/logs", server.base_url))
        .json(&draft("Duplicate", 45))
        .send()
        .await
        .unwrap();
    assert_eq!(second.status(), 409);
}

#[tokio::test]
async fn http_short_text_is_rejected() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();

    let mut payload = draft("Validation", 30);
    payload["plan"] = serde_json::json!("too short");

    let response = client
        .post(format!("{}/api/logs", server.base_url))
        .json(&payload)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 400);
}

#[tokio::test]
async fn http_delete_then_get_is_not_found() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();

    let created: LogEntry = client
        .post(format!("{}/api/logs", server.base_url))
        .json(&draft("Deletable", 30))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    let deleted = client
        .delete(format!("{}/api/logs/{}", server.base_url, created.id))
        .send()
        .await
        .unwrap();
    assert_eq!(deleted.status(), 204);

    let missing = client
        .get(format!("{}/api/logs/{}", server.base_url, created.id))
        .send()
        .await
        .unwrap();
    assert_eq!(missing.status(), 404);

    // Idempotent at the HTTP boundary too.
    let again = client
        .delete(format!("{}/api/logs/{}", server.base_url, created.id))
        .send()
        .await
        .unwrap();
    assert_eq!(again.status(), 204);
}

#[tokio::test]
async fn http_update_changes_fields_and_keeps_identity() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();

    let created: LogEntry = client
        .post(format!("{}/api/logs", server.base_url))
        .json(&draft("Editable", 30))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    let mut payload = draft("Editable", 0);
    payload["workTime"] = serde_json::json!({ "amount": 2, "unit": "hours" });
    let updated: LogEntry = client
        .put(format!("{}/api/logs/{}", server.base_url, created.id))
        .json(&payload)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(updated.id, created.id);
    assert_eq!(updated.created_at, created.created_at);
    assert_eq!(updated.work_time.unit, "hours");
}

#[tokio::test]
async fn http_stats_for_todays_entry() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();

    let response = client
        .post(format!("{}/api/logs", server.base_url))
        .json(&draft("StatsProject", 135))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 201);

    let stats: ProjectStats = client
        .get(format!("{}/api/stats", server.base_url))
        .query(&[("project", "StatsProject")])
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(stats.total_minutes, 135);
    assert_eq!(stats.working_days, 1);
    assert_eq!(stats.streak, 1);
}

#[tokio::test]
async fn http_export_downloads_the_session_dump() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();

    // At least one session entry must exist by now; earlier tests created
    // some, but make sure this test stands on its own.
    let _ = client
        .post(format!("{}/api/logs", server.base_url))
        .json(&draft("Exportable", 30))
        .send()
        .await
        .unwrap();

    let response = client
        .get(format!("{}/export", server.base_url))
        .send()
        .await
        .unwrap();
    assert!(response.status().is_success());
    let disposition = response
        .headers()
        .get("content-disposition")
        .unwrap()
        .to_str()
        .unwrap()
        .to_string();
    assert!(disposition.starts_with("attachment; filename=\"logs-"));

    let body: Vec<serde_json::Value> = response.json().await.unwrap();
    assert!(body.iter().any(|entry| entry["project"] == "Exportable"));
}

#[tokio::test]
async fn http_migration_requires_a_cloud_session() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();

    let response = client
        .post(format!("{}/api/migrate", server.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 400);
}
