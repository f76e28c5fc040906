//! JSON-lines protocol spoken with the front-end.
//!
//! Every input line is a request `{"id", "method", "params"}` answered by exactly one output
//! line, either `{"id", "result"}` or `{"id", "error": {"kind", "message"}}`. Change events are
//! interleaved as `{"event": "updatePath", "path"}` lines. Requests are served in order.

use arcitect_core::{ErrorKind, LocalFileSystem, Request, Response, VirtualPath};

use anyhow::{anyhow, Context};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tokio::{
	io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader},
	spawn,
	sync::mpsc,
};
use tracing::{debug, error, trace, warn};

const UPDATE_PATH_EVENT: &str = "updatePath";

#[derive(Debug, Deserialize)]
struct Envelope {
	#[serde(default)]
	id: Option<u64>,
	method: String,
	#[serde(default)]
	params: Value,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum Outbound {
	Reply {
		id: Option<u64>,
		#[serde(flatten)]
		outcome: Outcome,
	},
	Event {
		event: &'static str,
		path: VirtualPath,
	},
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "lowercase")]
enum Outcome {
	Result(Response),
	Error(Failure),
}

#[derive(Debug, Serialize)]
struct Failure {
	kind: FailureKind,
	message: String,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum FailureKind {
	Request(ErrorKind),
	Protocol(&'static str),
}

impl Failure {
	fn invalid_request(message: impl ToString) -> Self {
		Self {
			kind: FailureKind::Protocol("InvalidRequest"),
			message: message.to_string(),
		}
	}
}

/// Serve requests from `reader` until it reaches EOF, writing replies and change events to
/// `writer`. The connection is attached to the notifier as its most recent surface.
pub async fn run<R, W>(local_fs: LocalFileSystem, reader: R, writer: W) -> anyhow::Result<()>
where
	R: AsyncRead + Unpin,
	W: AsyncWrite + Unpin + Send + 'static,
{
	let (lines_tx, lines_rx) = mpsc::unbounded_channel();
	let writer_handle = spawn(write_lines(writer, lines_rx));

	let mut surface = local_fs.notifier().subscribe().await;
	debug!(surface = %surface.id(), "Front-end connected;");

	let events_tx = lines_tx.clone();
	let forwarder = spawn(async move {
		while let Some(event) = surface.recv().await {
			let line = Outbound::Event {
				event: UPDATE_PATH_EVENT,
				path: event.affected_directory,
			};
			if queue(&events_tx, &line).is_err() {
				break;
			}
		}
	});

	let mut lines = BufReader::new(reader).lines();

	while let Some(line) = lines.next_line().await.context("reading request")? {
		if line.trim().is_empty() {
			continue;
		}

		let reply = handle_line(&local_fs, &line).await;
		queue(&lines_tx, &reply)?;
	}

	debug!("Front-end disconnected");

	forwarder.abort();
	if let Err(e) = forwarder.await {
		if !e.is_cancelled() {
			error!(?e, "Event forwarder failed;");
		}
	}

	drop(lines_tx);
	writer_handle
		.await
		.context("joining output writer")?
		.context("writing output")
}

async fn handle_line(local_fs: &LocalFileSystem, line: &str) -> Outbound {
	let envelope = match serde_json::from_str::<Envelope>(line) {
		Ok(envelope) => envelope,
		Err(e) => {
			warn!(%e, "Malformed request line;");
			return Outbound::Reply {
				id: None,
				outcome: Outcome::Error(Failure::invalid_request(e)),
			};
		}
	};

	let id = envelope.id;

	let request = match into_request(envelope) {
		Ok(request) => request,
		Err(e) => {
			warn!(?id, %e, "Invalid request;");
			return Outbound::Reply {
				id,
				outcome: Outcome::Error(Failure::invalid_request(e)),
			};
		}
	};

	trace!(?id, ?request, "Request received;");

	let outcome = match local_fs.handle(request).await {
		Ok(response) => Outcome::Result(response),
		Err(e) => {
			debug!(?id, %e, "Request failed;");
			Outcome::Error(Failure {
				kind: FailureKind::Request(e.kind()),
				message: e.to_string(),
			})
		}
	};

	Outbound::Reply { id, outcome }
}

fn into_request(
	Envelope { method, params, .. }: Envelope,
) -> Result<Request, serde_json::Error> {
	let mut tagged = Map::new();
	tagged.insert("method".to_string(), Value::String(method));
	if !params.is_null() {
		tagged.insert("params".to_string(), params);
	}

	serde_json::from_value(Value::Object(tagged))
}

fn queue(lines_tx: &mpsc::UnboundedSender<String>, message: &Outbound) -> anyhow::Result<()> {
	let line = serde_json::to_string(message).context("serializing output line")?;
	lines_tx
		.send(line)
		.map_err(|_| anyhow!("output writer is gone"))
}

async fn write_lines<W>(mut writer: W, mut lines_rx: mpsc::UnboundedReceiver<String>) -> std::io::Result<()>
where
	W: AsyncWrite + Unpin,
{
	while let Some(line) = lines_rx.recv().await {
		writer.write_all(line.as_bytes()).await?;
		writer.write_all(b"\n").await?;
		writer.flush().await?;
	}

	writer.shutdown().await
}

#[cfg(test)]
mod tests {
	use super::*;

	use arcitect_core::ServiceConfig;

	use std::time::Duration;

	use serde_json::json;
	use tempfile::tempdir;
	use tokio::{
		io::{duplex, AsyncBufReadExt, AsyncWriteExt, BufReader, DuplexStream, Lines},
		task::JoinHandle,
		time::timeout,
	};

	struct Client {
		input: DuplexStream,
		output: Lines<BufReader<DuplexStream>>,
		server: JoinHandle<anyhow::Result<()>>,
	}

	impl Client {
		fn connect() -> Self {
			let (input, server_in) = duplex(64 * 1024);
			let (server_out, output) = duplex(64 * 1024);
			let local_fs = LocalFileSystem::new(&ServiceConfig::default());

			Self {
				input,
				output: BufReader::new(output).lines(),
				server: spawn(async move {
					let res = run(local_fs.clone(), server_in, server_out).await;
					local_fs.shutdown().await;
					res
				}),
			}
		}

		async fn send(&mut self, line: &str) {
			self.input.write_all(line.as_bytes()).await.unwrap();
			self.input.write_all(b"\n").await.unwrap();
		}

		async fn next(&mut self) -> Value {
			let line = timeout(Duration::from_secs(5), self.output.next_line())
				.await
				.expect("timed out waiting for output")
				.unwrap()
				.expect("output closed");

			serde_json::from_str(&line).unwrap()
		}

		async fn close(self) {
			drop(self.input);
			self.server.await.unwrap().unwrap();
		}
	}

	#[tokio::test]
	async fn answers_with_results_and_errors() {
		let dir = tempdir().unwrap();
		let file = VirtualPath::from_native(dir.path().join("a.md"));
		let mut client = Client::connect();

		client
			.send(&json!({ "id": 1, "method": "writeFile", "params": [file, "hello"] }).to_string())
			.await;
		assert_eq!(client.next().await, json!({ "id": 1, "result": null }));

		client
			.send(&json!({ "id": 2, "method": "readFile", "params": file }).to_string())
			.await;
		assert_eq!(client.next().await, json!({ "id": 2, "result": "hello" }));

		let missing = VirtualPath::from_native(dir.path().join("missing.md"));
		client
			.send(&json!({ "id": 3, "method": "readFile", "params": missing }).to_string())
			.await;
		let reply = client.next().await;
		assert_eq!(reply["id"], 3);
		assert_eq!(reply["error"]["kind"], "NotFound");

		client
			.send(&json!({ "id": 4, "method": "getPathSeparator" }).to_string())
			.await;
		assert_eq!(
			client.next().await,
			json!({ "id": 4, "result": std::path::MAIN_SEPARATOR.to_string() })
		);

		client.close().await;
	}

	#[tokio::test]
	async fn malformed_lines_get_an_error_without_id() {
		let mut client = Client::connect();

		client.send("{ this is not json").await;
		let reply = client.next().await;
		assert_eq!(reply["id"], Value::Null);
		assert_eq!(reply["error"]["kind"], "InvalidRequest");

		client
			.send(&json!({ "id": 7, "method": "selectDir" }).to_string())
			.await;
		let reply = client.next().await;
		assert_eq!(reply["id"], 7);
		assert_eq!(reply["error"]["kind"], "InvalidRequest");

		client.close().await;
	}

	#[tokio::test(flavor = "multi_thread")]
	async fn forwards_change_events() {
		let dir = tempdir().unwrap();
		let root = dir.path().canonicalize().unwrap();
		let mut client = Client::connect();

		client
			.send(
				&json!({
					"id": 1,
					"method": "registerChangeListener",
					"params": VirtualPath::from_native(&root),
				})
				.to_string(),
			)
			.await;
		assert_eq!(client.next().await, json!({ "id": 1, "result": null }));

		std::fs::write(root.join("new.md"), "").unwrap();

		assert_eq!(
			client.next().await,
			json!({ "event": "updatePath", "path": VirtualPath::from_native(&root) })
		);

		client.close().await;
	}
}
