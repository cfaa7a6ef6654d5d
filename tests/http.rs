mod common;

use common::{BACKEND, BROKEN_PRINCIPAL, OVERLOADED_PRINCIPAL};
use once_cell::sync::Lazy;
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use std::net::TcpListener;
use std::process::{Child, Command, Stdio};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tokio::time::sleep;

#[derive(Debug, Deserialize)]
struct Panel {
    tab: String,
    visible: bool,
    content: Value,
}

#[derive(Debug, Deserialize)]
struct Snapshot {
    active_tab: String,
    loading: bool,
    panels: Vec<Panel>,
    chart: Option<Value>,
}

impl Snapshot {
    fn panel(&self, tab: &str) -> &Panel {
        self.panels
            .iter()
            .find(|panel| panel.tab == tab)
            .expect("missing panel")
    }
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

async fn wait_until_ready(base_url: &str) {
    let client = Client::new();
    let deadline = Instant::now() + Duration::from_secs(5);
    loop {
        if let Ok(resp) = client.get(format!("{base_url}/api/ui")).send().await {
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
    let child = Command::new(env!("CARGO_BIN_EXE_invest_sim_web"))
        .env("PORT", port.to_string())
        .env("API_BASE_URL", &BACKEND.base_url)
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

async fn snapshot(client: &Client, server: &TestServer) -> Snapshot {
    client
        .get(format!("{}/api/ui", server.base_url))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap()
}

async fn submit(client: &Client, server: &TestServer, tab: &str, form: &[(&str, &str)]) -> String {
    let response = client
        .post(format!("{}/calculate/{tab}", server.base_url))
        .form(form)
        .send()
        .await
        .unwrap();
    assert!(response.status().is_success(), "redirect to the page");
    response.text().await.unwrap()
}

async fn switch(client: &Client, server: &TestServer, tab: &str) {
    let response = client
        .post(format!("{}/tabs/{tab}", server.base_url))
        .send()
        .await
        .unwrap();
    assert!(response.status().is_success());
}

fn bond_form(principal: &str) -> Vec<(&str, &str)> {
    vec![
        ("principal", principal),
        ("interest_rate", "2.5"),
        ("years", "5"),
        ("inflation_rate", "2.0"),
        ("is_compound", "true"),
    ]
}

fn goal_form(deposit: &str) -> Vec<(&str, &str)> {
    vec![
        ("goal_name", "Retirement"),
        ("target_amount", "10000000"),
        ("initial_amount", "1000000"),
        ("monthly_amount", "30000"),
        ("investment_period", "20"),
        ("risk_tolerance", "medium"),
        ("stock_allocation", "40"),
        ("bond_allocation", "30"),
        ("etf_allocation", "20"),
        ("deposit_allocation", deposit),
    ]
}

#[tokio::test]
async fn http_bond_backend_detail_is_shown_verbatim() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();
    switch(&client, &server, "bond").await;

    submit(&client, &server, "bond", &bond_form(OVERLOADED_PRINCIPAL)).await;
    let ui = snapshot(&client, &server).await;
    let panel = ui.panel("bond");
    assert!(panel.visible);
    assert_eq!(panel.content["kind"], "error");
    assert_eq!(panel.content["value"], "overloaded");
    assert!(!ui.loading);

    submit(&client, &server, "bond", &bond_form(BROKEN_PRINCIPAL)).await;
    let ui = snapshot(&client, &server).await;
    assert_eq!(ui.panel("bond").content["value"], "HTTP 500: Internal Server Error");
}

#[tokio::test]
async fn http_bond_success_renders_result_page() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();
    switch(&client, &server, "bond").await;

    let page = submit(&client, &server, "bond", &bond_form("1000000")).await;
    assert!(page.contains("NT$1,100,000"));
    assert!(page.contains(r#"<div id="bond-result" class="result show">"#));

    let sent = BACKEND.recorded.calls_to("/bond-deposit");
    let last = sent.last().expect("bond request recorded");
    assert_eq!(last["is_compound"], Value::Bool(true));
    assert_eq!(last["principal"], serde_json::json!(1000000.0));
}

#[tokio::test]
async fn http_goal_allocation_is_checked_before_sending() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();
    switch(&client, &server, "goal").await;
    let before = BACKEND.recorded.calls_to("/financial-goal").len();

    submit(&client, &server, "goal", &goal_form("9")).await;

    let ui = snapshot(&client, &server).await;
    assert_eq!(ui.panel("goal").content["kind"], "error");
    assert_eq!(
        ui.panel("goal").content["value"],
        "Investment allocation must total 100%, currently 99%"
    );
    assert_eq!(BACKEND.recorded.calls_to("/financial-goal").len(), before);

    submit(&client, &server, "goal", &goal_form("10.005")).await;

    let ui = snapshot(&client, &server).await;
    assert_eq!(ui.panel("goal").content["kind"], "rendered");
    assert_eq!(BACKEND.recorded.calls_to("/financial-goal").len(), before + 1);
    let chart = ui.chart.expect("goal chart drawn");
    assert_eq!(chart["points"], 3);
}

#[tokio::test]
async fn http_switching_tabs_clears_previous_panel_only() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();

    switch(&client, &server, "stock").await;
    submit(
        &client,
        &server,
        "stock",
        &[
            ("initial_amount", "2000000"),
            ("monthly_amount", "200000"),
            ("expected_return", "12"),
            ("volatility", "15"),
            ("years", "10"),
            ("simulations", "10000"),
        ],
    )
    .await;

    switch(&client, &server, "house").await;
    submit(
        &client,
        &server,
        "house",
        &[
            ("house_price", "10000000"),
            ("down_payment", "2000000"),
            ("loan_rate", "2.0"),
            ("loan_years", "20"),
            ("appreciation_rate_a", "40"),
            ("appreciation_rate_b", "60"),
            ("annual_cost", "50000"),
            ("simulation_years", "10"),
            ("scenario", "A"),
        ],
    )
    .await;

    let ui = snapshot(&client, &server).await;
    assert_eq!(ui.active_tab, "house");
    assert!(!ui.panel("stock").visible);
    assert_eq!(ui.panel("stock").content["kind"], "empty");
    assert_eq!(ui.panel("house").content["kind"], "rendered");

    switch(&client, &server, "stock").await;
    let ui = snapshot(&client, &server).await;
    assert_eq!(ui.active_tab, "stock");
    assert_eq!(ui.panel("house").content["kind"], "empty");
}

#[tokio::test]
async fn http_unknown_tab_is_not_found() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();

    let response = client
        .post(format!("{}/tabs/crypto", server.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), reqwest::StatusCode::NOT_FOUND);
    assert_eq!(response.text().await.unwrap(), "unknown tab 'crypto'");
}

#[tokio::test]
async fn http_proxied_reads() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();

    let health: Value = client
        .get(format!("{}/api/health", server.base_url))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(health["status"], "healthy");
    assert_eq!(health["backend"]["status"], "healthy");
    assert!(health["backend_error"].is_null());

    let types: Value = client
        .get(format!("{}/api/investment-types", server.base_url))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(types["investment_types"][0]["id"], "stock");
}
