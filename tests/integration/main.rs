//! Integration tests for muck

use std::fs;
use std::path::Path;

fn write(root: &Path, rel: &str, content: &str) {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

/// A local HTTP server answering every request with one fixed response
mod server {
    use std::io::{BufRead, BufReader, Write};
    use std::net::TcpListener;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::thread;

    pub struct TestServer {
        pub port: u16,
        hits: Arc<AtomicUsize>,
    }

    impl TestServer {
        pub fn start(status: u16, reason: &'static str, body: &'static str) -> Self {
            let listener = TcpListener::bind("127.0.0.1:0").unwrap();
            let port = listener.local_addr().unwrap().port();
            let hits = Arc::new(AtomicUsize::new(0));
            let counter = Arc::clone(&hits);

            thread::spawn(move || {
                for stream in listener.incoming() {
                    let Ok(mut stream) = stream else { continue };
                    counter.fetch_add(1, Ordering::SeqCst);

                    let mut reader = BufReader::new(stream.try_clone().unwrap());
                    let mut line = String::new();
                    while reader.read_line(&mut line).unwrap_or(0) > 0 {
                        if line == "\r\n" {
                            break;
                        }
                        line.clear();
                    }

                    let response = format!(
                        "HTTP/1.1 {} {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                        status,
                        reason,
                        body.len(),
                        body
                    );
                    let _ = stream.write_all(response.as_bytes());
                }
            });

            Self { port, hits }
        }

        pub fn url(&self, path: &str) -> String {
            format!("http://127.0.0.1:{}{}", self.port, path)
        }

        pub fn hits(&self) -> usize {
            self.hits.load(Ordering::SeqCst)
        }
    }

    /// A port with nothing listening on it
    pub fn closed_port() -> u16 {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    }
}

mod cli_tests {
    use super::server::TestServer;
    use super::write;
    use assert_cmd::{cargo::cargo_bin_cmd, Command};
    use predicates::prelude::*;
    use tempfile::TempDir;

    fn muck() -> Command {
        let mut cmd = cargo_bin_cmd!("muck");
        cmd.env_remove("MUCK_CONFIG");
        cmd
    }

    #[test]
    fn help_displays() {
        muck()
            .arg("--help")
            .assert()
            .success()
            .stdout(predicate::str::contains("Runtime support for muck build scripts"));
    }

    #[test]
    fn version_displays() {
        muck()
            .arg("--version")
            .assert()
            .success()
            .stdout(predicate::str::contains("muck"));
    }

    #[test]
    fn vars_prints_bound_values() {
        muck()
            .args(["vars", "weather-%-%.json.py", "_build/weather-nyc-2020.json"])
            .assert()
            .success()
            .stdout("nyc\n2020\n");
    }

    #[test]
    fn vars_mismatch_fails() {
        muck()
            .args(["vars", "weather-%.json.py", "_build/other.json"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("does not match"));
    }

    #[test]
    fn product_path() {
        muck()
            .args(["product-path", "data/out.csv"])
            .assert()
            .success()
            .stdout("_build/data/out.csv\n");
    }

    #[test]
    fn product_path_rejects_product() {
        muck()
            .args(["product-path", "_build/data/out.csv"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("prefixed with build dir"));
    }

    #[test]
    fn resolve_source_then_product() {
        let temp = TempDir::new().unwrap();
        write(temp.path(), "in.txt", "x");

        muck()
            .arg("-C")
            .arg(temp.path())
            .args(["resolve", "in.txt"])
            .assert()
            .success()
            .stdout("in.txt\n");
        muck()
            .arg("-C")
            .arg(temp.path())
            .args(["resolve", "out.txt"])
            .assert()
            .success()
            .stdout("_build/out.txt\n");
    }

    #[test]
    fn load_json_and_csv() {
        let temp = TempDir::new().unwrap();
        write(temp.path(), "conf.json", r#"{"k": [1, 2]}"#);
        write(temp.path(), "_build/table.csv", "a;b\n1;2\n");

        muck()
            .arg("-C")
            .arg(temp.path())
            .args(["load", "conf.json"])
            .assert()
            .success()
            .stdout(predicate::str::contains("\"k\""));

        muck()
            .arg("-C")
            .arg(temp.path())
            .args(["load", "table.csv", "-o", "delimiter=;"])
            .assert()
            .success()
            .stdout(predicate::str::contains("\"a\"").and(predicate::str::contains("\"2\"")));
    }

    #[test]
    fn load_txt_prints_raw_text() {
        let temp = TempDir::new().unwrap();
        write(temp.path(), "notes.txt", "line one\r\nline two\n");

        muck()
            .arg("-C")
            .arg(temp.path())
            .args(["load", "notes.txt"])
            .assert()
            .success()
            .stdout("line one\nline two\n");
    }

    #[test]
    fn load_missing_names_both_paths() {
        let temp = TempDir::new().unwrap();

        muck()
            .arg("-C")
            .arg(temp.path())
            .args(["load", "missing.json"])
            .assert()
            .failure()
            .stderr(
                predicate::str::contains("_build/missing.json")
                    .and(predicate::str::contains("source path: missing.json")),
            );
    }

    #[test]
    fn load_unknown_extension() {
        let temp = TempDir::new().unwrap();
        write(temp.path(), "blob.bin", "x");

        muck()
            .arg("-C")
            .arg(temp.path())
            .args(["load", "blob.bin"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("No loader found"));
    }

    #[test]
    fn cache_path() {
        muck()
            .args(["cache-path", "https://example.com/data/t.csv?x=1"])
            .assert()
            .success()
            .stdout("_fetch/https/example.com/data%/t.csv%3Fx=1\n");
    }

    #[test]
    fn malformed_config_fails() {
        let temp = TempDir::new().unwrap();
        write(temp.path(), ".muck.toml", "[fetch\n");

        muck()
            .arg("-C")
            .arg(temp.path())
            .args(["resolve", "x.txt"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("Invalid configuration"));
    }

    #[test]
    fn fetch_then_load_from_cache() {
        let server = TestServer::start(200, "OK", r#"{"rows": 3}"#);
        let temp = TempDir::new().unwrap();
        let url = server.url("/api/summary.json");
        let expected = format!("_fetch/http/127.0.0.1:{}/api%/summary.json", server.port);

        for _ in 0..2 {
            muck()
                .arg("-C")
                .arg(temp.path())
                .args(["fetch", &url])
                .assert()
                .success()
                .stdout(format!("{}\n", expected));
        }
        assert_eq!(server.hits(), 1);

        muck()
            .arg("-C")
            .arg(temp.path())
            .args(["load", &expected])
            .assert()
            .success()
            .stdout(predicate::str::contains("\"rows\": 3"));
    }

    #[test]
    fn fetch_file_then_nested_url() {
        let server = TestServer::start(200, "OK", "[1]");
        let temp = TempDir::new().unwrap();

        for path in ["/items", "/items/1.json"] {
            muck()
                .arg("-C")
                .arg(temp.path())
                .args(["fetch", &server.url(path)])
                .assert()
                .success();
        }
        assert_eq!(server.hits(), 2);
    }

    #[test]
    fn fetch_bad_status_fails() {
        let server = TestServer::start(404, "Not Found", "nope");
        let temp = TempDir::new().unwrap();

        muck()
            .arg("-C")
            .arg(temp.path())
            .args(["fetch", &server.url("/gone.csv")])
            .assert()
            .failure()
            .stderr(predicate::str::contains(
                "fetch failed with HTTP code: 404: Not Found",
            ));
    }
}

mod library_tests {
    use super::server::{closed_port, TestServer};
    use super::write;
    use muck::fetch::{FetchOptions, Fetcher};
    use muck::{Context, FetchFailureKind, Kwargs, MuckError, Project};
    use serde_json::json;
    use serial_test::serial;
    use std::time::Duration;
    use tempfile::TempDir;

    #[test]
    fn fetch_real_client_caches() {
        let server = TestServer::start(200, "OK", "a,b\n1,2\n");
        let temp = TempDir::new().unwrap();
        let fetcher = Fetcher::new(Project::new(temp.path()));

        let url = server.url("/t.csv");
        let first = fetcher.fetch(&url, &FetchOptions::default()).unwrap();
        let second = fetcher.fetch(&url, &FetchOptions::default()).unwrap();
        assert_eq!(first, second);
        assert_eq!(server.hits(), 1);
        assert_eq!(
            std::fs::read_to_string(temp.path().join(&first)).unwrap(),
            "a,b\n1,2\n"
        );
    }

    #[test]
    fn fetch_real_client_status_error() {
        let server = TestServer::start(500, "Internal Server Error", "");
        let temp = TempDir::new().unwrap();
        let fetcher = Fetcher::new(Project::new(temp.path()));

        let err = fetcher
            .fetch(&server.url("/x.json"), &FetchOptions::default())
            .unwrap_err();
        assert!(matches!(
            err,
            MuckError::FetchFailed {
                kind: FetchFailureKind::Status(500),
                ..
            }
        ));
    }

    #[test]
    fn fetch_connection_refused_is_transport_failure() {
        let temp = TempDir::new().unwrap();
        let fetcher = Fetcher::new(Project::new(temp.path()));
        let url = format!("http://127.0.0.1:{}/x.json", closed_port());
        let options = FetchOptions {
            timeout: Duration::from_secs(2),
            ..FetchOptions::default()
        };

        let err = fetcher.fetch(&url, &options).unwrap_err();
        match err {
            MuckError::FetchFailed { kind, detail, .. } => {
                assert_eq!(kind, FetchFailureKind::Transport);
                assert!(detail.starts_with("fetch failed with exception: "));
            }
            other => panic!("expected FetchFailed, got {:?}", other),
        }
    }

    #[test]
    fn context_load_url() {
        let server = TestServer::start(200, "OK", "{\"a\": 1}\n{\"a\": 2}\n");
        let temp = TempDir::new().unwrap();
        let ctx = Context::new(temp.path());

        let loaded = ctx
            .load_url(
                &server.url("/events.jsonl"),
                None,
                ctx.fetch_defaults(),
                Kwargs::new(),
            )
            .unwrap();
        assert_eq!(loaded.into_json().unwrap(), json!([{"a": 1}, {"a": 2}]));
    }

    #[test]
    #[serial]
    fn current_project_follows_cwd() {
        let temp = TempDir::new().unwrap();
        write(temp.path(), "data/in.json", "[1]");
        let original = std::env::current_dir().unwrap();

        std::env::set_current_dir(temp.path()).unwrap();
        let project = Project::current();
        let ctx = Context::current();
        std::env::set_current_dir(original).unwrap();

        let project = project.unwrap();
        assert_eq!(
            project.root().canonicalize().unwrap(),
            temp.path().canonicalize().unwrap()
        );
        let loaded = ctx.unwrap().load("data/in.json", None, Kwargs::new()).unwrap();
        assert_eq!(loaded.into_json().unwrap(), json!([1]));
    }
}
