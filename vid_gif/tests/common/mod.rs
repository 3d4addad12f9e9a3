#![allow(dead_code)]

use std::cell::RefCell;
use std::fs;
use std::io::{BufRead, BufReader, Read, Write};
use std::net::TcpListener;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::thread::{self, JoinHandle};

use url::Url;
use vid_gif::{Fetcher, ImageHost, Pipeline, Result, TranscodeBackend, VidGifError};

pub type Events = Rc<RefCell<Vec<String>>>;

pub struct FakeFetcher {
    pub events: Events,
}

impl Fetcher for FakeFetcher {
    fn fetch(&self, url: &Url, destination: &Path) -> Result<u64> {
        self.events.borrow_mut().push(format!("fetch {}", url));
        fs::write(destination, b"downloaded video")?;
        Ok(16)
    }
}

pub struct FakeBackend {
    pub events: Events,
    pub fail_transcode: bool,
}

impl TranscodeBackend for FakeBackend {
    fn transcode(&self, input: &Path, width: &str, output: &Path) -> Result<PathBuf> {
        self.events
            .borrow_mut()
            .push(format!("transcode {} {}", input.display(), width));
        if self.fail_transcode {
            return Err(VidGifError::Transcode {
                status: "exit status: 1".to_string(),
                diagnostics: "Invalid data found when processing input".to_string(),
            });
        }
        fs::write(output, b"GIF89a")?;
        Ok(output.to_path_buf())
    }

    fn optimize(&self, path: &Path) -> Result<()> {
        self.events
            .borrow_mut()
            .push(format!("optimize {}", path.display()));
        Ok(())
    }
}

pub enum HostReply {
    Link(&'static str),
    ApiError(&'static str),
}

pub struct FakeHost {
    pub events: Events,
    pub reply: HostReply,
}

impl ImageHost for FakeHost {
    fn upload(&self, file: &Path, credential: &str) -> Result<String> {
        assert!(file.exists(), "upload of a missing file");
        self.events
            .borrow_mut()
            .push(format!("upload {} {}", file.display(), credential));
        match self.reply {
            HostReply::Link(link) => Ok(link.to_string()),
            HostReply::ApiError(message) => Err(VidGifError::HostingApi(message.to_string())),
        }
    }
}

/// A pipeline wired to fakes, plus the shared event log.
pub fn fake_pipeline(fail_transcode: bool, reply: HostReply) -> (Pipeline, Events) {
    let events: Events = Rc::new(RefCell::new(Vec::new()));
    let pipeline = Pipeline::new(
        Box::new(FakeFetcher {
            events: events.clone(),
        }),
        Box::new(FakeBackend {
            events: events.clone(),
            fail_transcode,
        }),
        Box::new(FakeHost {
            events: events.clone(),
            reply,
        }),
    );
    (pipeline, events)
}

/// What the one-shot server received.
#[derive(Debug)]
pub struct CapturedRequest {
    pub request_line: String,
    /// Lower-cased names.
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl CapturedRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }
}

/// A local HTTP listener answering exactly one request with a canned response.
pub struct OneShotServer {
    pub base_url: String,
    handle: JoinHandle<CapturedRequest>,
}

impl OneShotServer {
    pub fn start(status: &'static str, content_type: &'static str, body: Vec<u8>) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let base_url = format!("http://{}", listener.local_addr().unwrap());

        let handle = thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            let mut reader = BufReader::new(stream.try_clone().unwrap());

            let mut request_line = String::new();
            reader.read_line(&mut request_line).unwrap();

            let mut headers = Vec::new();
            loop {
                let mut line = String::new();
                reader.read_line(&mut line).unwrap();
                let line = line.trim_end();
                if line.is_empty() {
                    break;
                }
                if let Some((name, value)) = line.split_once(':') {
                    headers.push((name.trim().to_ascii_lowercase(), value.trim().to_string()));
                }
            }

            let length = headers
                .iter()
                .find(|(k, _)| k == "content-length")
                .and_then(|(_, v)| v.parse::<usize>().ok())
                .unwrap_or(0);
            let mut request_body = vec![0; length];
            reader.read_exact(&mut request_body).unwrap();

            let head = format!(
                "HTTP/1.1 {}\r\nContent-Type: {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
                status,
                content_type,
                body.len()
            );
            // The client may hang up early on error statuses.
            let _ = stream.write_all(head.as_bytes());
            let _ = stream.write_all(&body);
            let _ = stream.flush();

            CapturedRequest {
                request_line: request_line.trim_end().to_string(),
                headers,
                body: request_body,
            }
        });

        Self { base_url, handle }
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub fn request(self) -> CapturedRequest {
        self.handle.join().unwrap()
    }
}

/// Direct connections only, whatever proxy the environment configures.
pub fn local_client() -> reqwest::blocking::Client {
    reqwest::blocking::Client::builder()
        .no_proxy()
        .timeout(std::time::Duration::from_secs(10))
        .build()
        .unwrap()
}
