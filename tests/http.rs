use once_cell::sync::Lazy;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::net::TcpListener;
use std::process::{Child, Command, Stdio};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tokio::time::sleep;

#[derive(Debug, Deserialize)]
struct UserProfile {
    id: String,
}

#[derive(Debug, Deserialize)]
struct Progress {
    completed: u32,
    total: u32,
    percentage: u32,
}

#[derive(Debug, Deserialize)]
struct Row {
    id: u64,
    task_id: String,
    parent_id: Option<String>,
    completed: bool,
}

#[derive(Debug, Deserialize)]
struct Template {
    id: String,
}

#[derive(Debug, Deserialize)]
struct TaskView {
    template: Template,
    satisfied: bool,
    rows: Vec<Row>,
}

#[derive(Debug, Deserialize)]
struct TodayResponse {
    progress: Progress,
    tasks: Vec<TaskView>,
}

impl TodayResponse {
    fn task(&self, id: &str) -> &TaskView {
        self.tasks
            .iter()
            .find(|task| task.template.id == id)
            .expect("missing task")
    }

    fn row_id(&self, task_id: &str) -> u64 {
        self.tasks
            .iter()
            .flat_map(|task| task.rows.iter())
            .find(|row| row.task_id == task_id)
            .map(|row| row.id)
            .expect("missing row")
    }
}

#[derive(Debug, Deserialize)]
struct WeeklyPoint {
    completed: u32,
    total: u32,
    percentage: u32,
}

#[derive(Debug, Deserialize)]
struct WeeklyResponse {
    points: Vec<WeeklyPoint>,
}

#[derive(Debug, Deserialize)]
struct TeamMember {
    user_id: String,
    display_name: String,
    percentage: u32,
}

#[derive(Debug, Deserialize)]
struct TeamSummary {
    members: Vec<TeamMember>,
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
static EMAIL_SEQ: AtomicU32 = AtomicU32::new(0);

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

fn unique_data_path() -> String {
    let nanos = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    let mut path = std::env::temp_dir();
    path.push(format!("daily_tasks_http_{}_{}.json", std::process::id(), nanos));
    path.to_string_lossy().to_string()
}

async fn wait_until_ready(base_url: &str) {
    let client = Client::new();
    let deadline = Instant::now() + Duration::from_secs(3);
    loop {
        if let Ok(resp) = client.get(format!("{base_url}/api/catalog")).send().await {
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
    let child = Command::new(env!("CARGO_BIN_EXE_daily_tasks"))
        .env("PORT", port.to_string())
        .env("APP_DATA_PATH", data_path)
        .env_remove("TASK_CATALOG_PATH")
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

async fn register(client: &Client, server: &TestServer, name: &str) -> String {
    let seq = EMAIL_SEQ.fetch_add(1, Ordering::SeqCst);
    let profile: UserProfile = client
        .post(format!("{}/api/users", server.base_url))
        .json(&serde_json::json!({ "email": format!("{name}{seq}@example.com"), "name": name }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    profile.id
}

async fn today(client: &Client, server: &TestServer, user_id: &str) -> TodayResponse {
    client
        .get(format!("{}/api/users/{user_id}/today", server.base_url))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap()
}

async fn set_row(
    client: &Client,
    server: &TestServer,
    user_id: &str,
    row_id: u64,
    completed: bool,
) -> reqwest::Response {
    client
        .post(format!("{}/api/users/{user_id}/rows/{row_id}", server.base_url))
        .json(&serde_json::json!({ "completed": completed }))
        .send()
        .await
        .unwrap()
}

#[tokio::test]
async fn http_first_visit_provisions_default_tasks() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();
    let user_id = register(&client, &server, "fresh").await;

    let first = today(&client, &server, &user_id).await;
    assert_eq!(first.tasks.len(), 6);
    assert_eq!(
        (first.progress.completed, first.progress.total, first.progress.percentage),
        (0, 6, 0)
    );
    let rows: usize = first.tasks.iter().map(|task| task.rows.len()).sum();
    assert_eq!(rows, 12);

    let second = today(&client, &server, &user_id).await;
    assert_eq!(second.row_id("hydrate"), first.row_id("hydrate"));
}

#[tokio::test]
async fn http_simple_toggle_updates_progress() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();
    let user_id = register(&client, &server, "simple").await;

    let before = today(&client, &server, &user_id).await;
    let response = set_row(&client, &server, &user_id, before.row_id("hydrate"), true).await;
    assert!(response.status().is_success());

    let after: TodayResponse = response.json().await.unwrap();
    assert!(after.task("hydrate").satisfied);
    assert_eq!((after.progress.completed, after.progress.percentage), (1, 17));
}

#[tokio::test]
async fn http_all_of_task_needs_every_subtask() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();
    let user_id = register(&client, &server, "standup").await;
    let view = today(&client, &server, &user_id).await;

    for task_id in ["standup_yesterday", "standup_blockers"] {
        set_row(&client, &server, &user_id, view.row_id(task_id), true).await;
    }
    let partial = today(&client, &server, &user_id).await;
    assert!(!partial.task("standup").satisfied);

    set_row(&client, &server, &user_id, view.row_id("standup_plan"), true).await;
    let done = today(&client, &server, &user_id).await;
    let standup = done.task("standup");
    assert!(standup.satisfied);
    let parent = standup
        .rows
        .iter()
        .find(|row| row.parent_id.is_none())
        .expect("parent row");
    assert!(parent.completed);

    let direct = set_row(&client, &server, &user_id, view.row_id("standup"), false).await;
    assert_eq!(direct.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn http_weekly_trend_ends_with_today() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();
    let user_id = register(&client, &server, "weekly").await;
    let view = today(&client, &server, &user_id).await;
    set_row(&client, &server, &user_id, view.row_id("learning_article"), true).await;

    let weekly: WeeklyResponse = client
        .get(format!("{}/api/users/{user_id}/weekly", server.base_url))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(weekly.points.len(), 7);
    let last = weekly.points.last().unwrap();
    // The sub-task row plus its synced parent row.
    assert_eq!((last.completed, last.total, last.percentage), (2, 12, 17));
    let first = &weekly.points[0];
    assert_eq!((first.completed, first.total, first.percentage), (0, 6, 0));
}

#[tokio::test]
async fn http_team_lists_members_with_names() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();
    let user_id = register(&client, &server, "Teammate").await;
    let view = today(&client, &server, &user_id).await;
    set_row(&client, &server, &user_id, view.row_id("workout"), true).await;

    let team: TeamSummary = client
        .get(format!("{}/api/team", server.base_url))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    let member = team
        .members
        .iter()
        .find(|member| member.user_id == user_id)
        .expect("member listed");
    assert_eq!(member.display_name, "Teammate");
    // 1 of 12 rows.
    assert_eq!(member.percentage, 8);
}

#[tokio::test]
async fn http_unknown_user_and_bad_email_are_rejected() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();

    let missing = client
        .get(format!("{}/api/users/nobody/today", server.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(missing.status(), StatusCode::NOT_FOUND);

    let bad = client
        .post(format!("{}/api/users", server.base_url))
        .json(&serde_json::json!({ "email": "not-an-email" }))
        .send()
        .await
        .unwrap();
    assert_eq!(bad.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn http_index_renders_selected_user() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();
    let user_id = register(&client, &server, "Viewer").await;

    let page = client
        .get(format!("{}/?user={user_id}", server.base_url))
        .send()
        .await
        .unwrap();
    assert!(page.status().is_success());
    let body = page.text().await.unwrap();
    assert!(body.contains("Daily standup prep"));
    assert!(body.contains("Current streak"));
}
