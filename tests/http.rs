use once_cell::sync::Lazy;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::{json, Value};
use std::net::TcpListener;
use std::process::{Child, Command, Stdio};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tokio::time::sleep;

#[derive(Debug, Deserialize)]
struct ApiResponse {
    success: bool,
    message: Option<String>,
    id: Option<i64>,
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
static NEXT_USER: AtomicUsize = AtomicUsize::new(0);

#[cfg(unix)]
mod cleanup {
    use std::sync::atomic::{AtomicI32, Ordering};
    use std::sync::Once;

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

fn unique_database_url() -> String {
    let nanos = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    let mut path = std::env::temp_dir();
    path.push(format!("berrysweet_http_{}_{}.db", std::process::id(), nanos));
    format!("sqlite://{}", path.to_string_lossy())
}

async fn wait_until_ready(base_url: &str) {
    let client = Client::new();
    let deadline = Instant::now() + Duration::from_secs(5);
    loop {
        if let Ok(resp) = client.get(format!("{base_url}/login")).send().await {
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
    let child = Command::new(env!("CARGO_BIN_EXE_berrysweet"))
        .env("PORT", port.to_string())
        .env("DATABASE_URL", unique_database_url())
        .env("RUST_LOG", "info")
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

fn fresh_username(prefix: &str) -> String {
    format!("{prefix}{}", NEXT_USER.fetch_add(1, Ordering::SeqCst))
}

/// Registers `username` and returns a client holding its session cookie.
async fn signed_in(server: &TestServer, username: &str) -> Client {
    let client = Client::builder().cookie_store(true).build().unwrap();

    let registered = client
        .post(format!("{}/register", server.base_url))
        .form(&[
            ("username", username),
            ("email", &format!("{username}@example.com")),
            ("password", "berries42"),
            ("confirm_password", "berries42"),
        ])
        .send()
        .await
        .unwrap();
    assert!(registered.status().is_success(), "register: {}", registered.status());
    assert!(registered.url().path().ends_with("/login"));

    let login = client
        .post(format!("{}/login", server.base_url))
        .form(&[("username", username), ("password", "berries42")])
        .send()
        .await
        .unwrap();
    assert_eq!(login.status(), StatusCode::OK);
    assert!(login.url().path().ends_with("/api/dashboard"));
    client
}

async fn get_json(client: &Client, url: String) -> Value {
    let resp = client.get(url).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    resp.json().await.unwrap()
}

#[tokio::test]
async fn http_register_login_and_dashboard() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let username = fresh_username("berry");
    let client = signed_in(&server, &username).await;

    let dashboard = get_json(&client, format!("{}/api/dashboard", server.base_url)).await;
    assert_eq!(dashboard["username"], username.as_str());
    assert_eq!(dashboard["theme"], "strawberry");
    assert_eq!(dashboard["active_todos"], 0);
    assert_eq!(dashboard["weekly_progress"].as_array().unwrap().len(), 7);

    let again = client
        .post(format!("{}/register", server.base_url))
        .form(&[
            ("username", username.as_str()),
            ("email", "someone-else@example.com"),
            ("password", "berries42"),
            ("confirm_password", "berries42"),
        ])
        .send()
        .await
        .unwrap();
    assert_eq!(again.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn http_wrong_password_is_rejected() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let username = fresh_username("lychee");
    signed_in(&server, &username).await;

    let client = Client::builder().cookie_store(true).build().unwrap();
    let resp = client
        .post(format!("{}/login", server.base_url))
        .form(&[("username", username.as_str()), ("password", "wrong-one")])
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let body: ApiResponse = resp.json().await.unwrap();
    assert!(!body.success);
}

#[tokio::test]
async fn http_api_requires_a_session() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();

    let resp = client
        .get(format!("{}/api/dashboard", server.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let body: ApiResponse = resp.json().await.unwrap();
    assert!(!body.success);
    assert_eq!(body.message.as_deref(), Some("not signed in"));

    let root = client.get(format!("{}/", server.base_url)).send().await.unwrap();
    assert_eq!(root.status(), StatusCode::OK);
    assert!(root.url().path().ends_with("/login"));
}

#[tokio::test]
async fn http_task_lifecycle_updates_dashboard() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = signed_in(&server, &fresh_username("mango")).await;
    let base = &server.base_url;

    let created: ApiResponse = client
        .post(format!("{base}/api/tasks"))
        .json(&json!({ "title": "Water the plants", "priority": "high" }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(created.success);
    let id = created.id.expect("task id");

    let task = get_json(&client, format!("{base}/api/tasks/{id}")).await;
    assert_eq!(task["status"], "pending");
    assert_eq!(task["priority"], "high");

    let patched = client
        .patch(format!("{base}/api/tasks/{id}"))
        .json(&json!({ "status": "completed" }))
        .send()
        .await
        .unwrap();
    assert_eq!(patched.status(), StatusCode::OK);

    let task = get_json(&client, format!("{base}/api/tasks/{id}")).await;
    assert_eq!(task["status"], "completed");
    assert!(task["completed_at"].is_string());

    let dashboard = get_json(&client, format!("{base}/api/dashboard")).await;
    assert_eq!(dashboard["active_todos"], 0);
    assert_eq!(dashboard["completed_today"], 1);
    assert_eq!(dashboard["completion_rate"], 100.0);

    let todos = get_json(&client, format!("{base}/api/todos")).await;
    assert_eq!(todos["completed"], 1);
    assert_eq!(todos["todos"][0]["due"], "No date available");

    let deleted = client.delete(format!("{base}/api/tasks/{id}")).send().await.unwrap();
    assert_eq!(deleted.status(), StatusCode::OK);
    let gone = client.get(format!("{base}/api/tasks/{id}")).send().await.unwrap();
    assert_eq!(gone.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn http_other_users_rows_are_not_found() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let base = &server.base_url;
    let alice = signed_in(&server, &fresh_username("alice")).await;
    let bob = signed_in(&server, &fresh_username("bob")).await;

    let created: ApiResponse = alice
        .post(format!("{base}/api/tasks"))
        .json(&json!({ "title": "Private" }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let id = created.id.unwrap();

    let peek = bob.get(format!("{base}/api/tasks/{id}")).send().await.unwrap();
    assert_eq!(peek.status(), StatusCode::NOT_FOUND);
    let delete = bob.delete(format!("{base}/api/tasks/{id}")).send().await.unwrap();
    assert_eq!(delete.status(), StatusCode::NOT_FOUND);

    let still_there = alice.get(format!("{base}/api/tasks/{id}")).send().await.unwrap();
    assert_eq!(still_there.status(), StatusCode::OK);
}

#[tokio::test]
async fn http_budget_and_expenses() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let base = &server.base_url;
    let client = signed_in(&server, &fresh_username("melon")).await;

    let budget = client
        .put(format!("{base}/api/budget"))
        .json(&json!({ "amount": 1000 }))
        .send()
        .await
        .unwrap();
    assert_eq!(budget.status(), StatusCode::OK);

    for (amount, category) in [(200.0, "Food"), (50.0, "Transport")] {
        let resp = client
            .post(format!("{base}/api/expenses"))
            .json(&json!({ "amount": amount, "category": category }))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
    }

    let view = get_json(&client, format!("{base}/api/expenses")).await;
    assert_eq!(view["budget"]["monthly_spent"], 250.0);
    assert_eq!(view["budget"]["remaining"], 750.0);
    assert_eq!(view["budget"]["percent_used"], 25.0);
    assert_eq!(view["budget"]["status"], "on_track");
    assert_eq!(view["categories"][0]["category"], "Food");
    assert_eq!(view["categories"][0]["percentage"], 80.0);
    assert_eq!(view["week"]["total"], 250.0);
    assert_eq!(view["week"]["daily_average"], 35.71);

    for week in ["%2B262142-12-31", "-262143-01-01", "not-a-date"] {
        let resp = client
            .get(format!("{base}/api/expenses?week={week}"))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST, "{week}");
    }

    let negative = client
        .post(format!("{base}/api/expenses"))
        .json(&json!({ "amount": -1, "category": "Food" }))
        .send()
        .await
        .unwrap();
    assert_eq!(negative.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn http_focus_goal_and_validation() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let base = &server.base_url;
    let client = signed_in(&server, &fresh_username("blueberry")).await;

    let focus = get_json(&client, format!("{base}/api/focus")).await;
    assert_eq!(focus["today"]["target_sessions"], 1);
    assert_eq!(focus["streak"], 0);

    let too_many = client
        .put(format!("{base}/api/focus/goal"))
        .json(&json!({ "target_sessions": 25 }))
        .send()
        .await
        .unwrap();
    assert_eq!(too_many.status(), StatusCode::BAD_REQUEST);

    let goal: Value = client
        .put(format!("{base}/api/focus/goal"))
        .json(&json!({ "target_sessions": 2 }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(goal["remaining"], 2);

    let mut last = Value::Null;
    for delta in [1, 1, 1, -1] {
        last = client
            .post(format!("{base}/api/focus/session"))
            .json(&json!({ "delta": delta }))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
    }
    assert_eq!(last["completed_sessions"], 2);
    assert_eq!(last["achieved"], true);

    let focus = get_json(&client, format!("{base}/api/focus")).await;
    assert_eq!(focus["streak"], 1);

    let malformed = client
        .post(format!("{base}/api/tasks"))
        .header("content-type", "application/json")
        .body("{not json")
        .send()
        .await
        .unwrap();
    assert_eq!(malformed.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn http_habit_log_and_theme() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let base = &server.base_url;
    let client = signed_in(&server, &fresh_username("peach")).await;

    let created: ApiResponse = client
        .post(format!("{base}/api/habits"))
        .json(&json!({ "name": "Stretch", "frequency": "daily" }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let id = created.id.unwrap();

    let habit: Value = client
        .post(format!("{base}/api/habits/{id}/log"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(habit["streak"], 1);
    assert_eq!(habit["completion_rate"], 100.0);

    let skipped = client
        .post(format!("{base}/api/habits/{id}/skip"))
        .json(&json!({ "reason": "travelling" }))
        .send()
        .await
        .unwrap();
    assert_eq!(skipped.status(), StatusCode::OK);

    let view = get_json(&client, format!("{base}/api/habits")).await;
    assert_eq!(view["habits"][0]["logged_today"], true);
    assert_eq!(view["habits"][0]["recent_skips"][0]["reason"], "travelling");

    let theme = client
        .put(format!("{base}/api/settings/theme"))
        .json(&json!({ "theme": "mango" }))
        .send()
        .await
        .unwrap();
    assert_eq!(theme.status(), StatusCode::OK);
    let settings = get_json(&client, format!("{base}/api/settings")).await;
    assert_eq!(settings["theme"], "mango");
}
