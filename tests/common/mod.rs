#![allow(dead_code)]

use pvgis_enrich::{Config, FetchOutcome, PacingPolicy};
use reqwest::Url;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

pub const METADATA_LINES: &str =
    "Source: rooftop survey\nCRS: EPSG:4326\nline 3\nline 4\nline 5\nline 6\nline 7\nline 8\n";

/// 桩服务器的响应
pub enum StubResponse {
    /// 200 + 正文
    Json(String),
    /// 指定状态码 + 正文
    Status(u16, String),
    /// 永不响应（用于超时）
    Stall,
}

pub fn yield_body(e_y: f64) -> String {
    format!(r#"{{"inputs":{{}},"outputs":{{"totals":{{"fixed":{{"E_d":3.1,"E_y":{}}}}}}}}}"#, e_y)
}

/// 进程内的 PVGIS 桩服务器
pub struct StubServer {
    pub endpoint: String,
    requests: Arc<Mutex<Vec<HashMap<String, String>>>>,
}

impl StubServer {
    pub async fn start<F>(handler: F) -> Self
    where
        F: Fn(&HashMap<String, String>) -> StubResponse + Send + Sync + 'static,
    {
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("绑定端口失败");
        let addr = listener.local_addr().expect("获取端口失败");
        let requests = Arc::new(Mutex::new(Vec::new()));
        let handler = Arc::new(handler);

        let log = requests.clone();
        tokio::spawn(async move {
            while let Ok((mut socket, _)) = listener.accept().await {
                let handler = handler.clone();
                let log = log.clone();
                tokio::spawn(async move {
                    let Some(target) = read_request_target(&mut socket).await else {
                        return;
                    };
                    let params = parse_query(&target);
                    let response = handler(&params);
                    log.lock().unwrap().push(params);

                    let (status, body) = match response {
                        StubResponse::Json(body) => (200, body),
                        StubResponse::Status(code, body) => (code, body),
                        StubResponse::Stall => {
                            tokio::time::sleep(Duration::from_secs(30)).await;
                            return;
                        }
                    };

                    let reply = format!(
                        "HTTP/1.1 {} Stub\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                        status,
                        body.len(),
                        body
                    );
                    let _ = socket.write_all(reply.as_bytes()).await;
                    let _ = socket.shutdown().await;
                });
            }
        });

        Self {
            endpoint: format!("http://{}/api/v5_2/PVcalc", addr),
            requests,
        }
    }

    /// 按到达顺序返回所有请求的查询参数
    pub fn requests(&self) -> Vec<HashMap<String, String>> {
        self.requests.lock().unwrap().clone()
    }

    pub fn aspects(&self) -> Vec<String> {
        self.requests()
            .iter()
            .map(|p| p.get("aspect").cloned().unwrap_or_default())
            .collect()
    }
}

async fn read_request_target(socket: &mut TcpStream) -> Option<String> {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 1024];
    loop {
        let n = socket.read(&mut chunk).await.ok()?;
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);
        if buf.windows(4).any(|w| w == b"\r\n\r\n") {
            break;
        }
    }
    let head = String::from_utf8_lossy(&buf);
    head.lines()
        .next()?
        .split_whitespace()
        .nth(1)
        .map(str::to_string)
}

fn parse_query(target: &str) -> HashMap<String, String> {
    Url::parse(&format!("http://stub{}", target))
        .map(|url| url.query_pairs().into_owned().collect())
        .unwrap_or_default()
}

/// 记录调用次数、不等待的节奏策略
#[derive(Clone, Default)]
pub struct CountingPacer {
    pub calls: Arc<AtomicUsize>,
    pub failures: Arc<AtomicUsize>,
}

impl CountingPacer {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn failures(&self) -> usize {
        self.failures.load(Ordering::SeqCst)
    }
}

impl PacingPolicy for CountingPacer {
    fn delay_after(&self, outcome: &FetchOutcome) -> Duration {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if outcome.is_err() {
            self.failures.fetch_add(1, Ordering::SeqCst);
        }
        Duration::ZERO
    }
}

/// 测试用临时目录，离开作用域时删除
pub struct TempDir(PathBuf);

impl TempDir {
    pub fn new(name: &str) -> Self {
        static COUNTER: AtomicUsize = AtomicUsize::new(0);
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos())
            .unwrap_or_default();
        let path = std::env::temp_dir().join(format!(
            "pvgis_{}_{}_{}_{}",
            name,
            std::process::id(),
            COUNTER.fetch_add(1, Ordering::SeqCst),
            nanos
        ));
        std::fs::create_dir_all(&path).expect("创建临时目录失败");
        Self(path)
    }

    pub fn path(&self) -> &Path {
        &self.0
    }
}

impl Drop for TempDir {
    fn drop(&mut self) {
        let _ = std::fs::remove_dir_all(&self.0);
    }
}

/// 写入一个带 8 行元数据的输入文件
pub fn write_input(dir: &Path, name: &str, table: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, format!("{}{}", METADATA_LINES, table)).expect("写入输入文件失败");
    path
}

pub fn test_config(endpoint: &str, input_dir: &Path, output_dir: &Path) -> Config {
    Config {
        input_dir: input_dir.to_path_buf(),
        output_dir: output_dir.to_path_buf(),
        api_url: endpoint.to_string(),
        request_timeout_secs: 5,
        request_delay_secs: 0.0,
        ..Config::default()
    }
}
