//! One request/response cycle: connect, send, collect responses, classify them.

use crate::builder::{MessageBuilder, SipMessage};
use crate::config::RequestConfig;
use crate::error::{Error, Result};
use crate::ident::{IdGenerator, Identifiers};
use crate::transport::{self, LineReader};
use crate::verdict::{Status, Verdict};
use sip_types::msg::StatusLine;
use sip_types::{Code, TransportKind};
use std::io;
use std::net::SocketAddr;
use std::time::Duration;
use tokio::time::{Instant, timeout, timeout_at};

mod classify;
mod collect;

pub use classify::{Classification, classify};
pub use collect::{CollectState, Collected, ResponseCollector, ResponseRecord};

/// Raw request and response text, kept when the configuration has `debug` set
#[derive(Debug, Clone)]
pub struct RawExchange {
    pub request: SipMessage,
    /// All received lines in receipt order, without line terminators
    pub response: Vec<String>,
}

/// Successful exchange, the server answered with the expected number of responses
#[derive(Debug, Clone)]
pub struct ExchangeResult {
    transport: TransportKind,
    local: SocketAddr,
    peer: SocketAddr,
    records: Vec<ResponseRecord>,
    received: Vec<Code>,
    classifications: Vec<Classification>,
    elapsed: Duration,
    raw: Option<RawExchange>,
}

impl ExchangeResult {
    pub fn transport(&self) -> TransportKind {
        self.transport
    }

    /// Address the request was sent from
    pub fn local(&self) -> SocketAddr {
        self.local
    }

    pub fn peer(&self) -> SocketAddr {
        self.peer
    }

    /// One record per expected response
    pub fn records(&self) -> &[ResponseRecord] {
        &self.records
    }

    /// Status codes in receipt order
    pub fn received(&self) -> &[Code] {
        &self.received
    }

    pub fn classifications(&self) -> &[Classification] {
        &self.classifications
    }

    /// Time from connecting until the last expected response was complete
    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    pub fn raw(&self) -> Option<&RawExchange> {
        self.raw.as_ref()
    }

    /// Warning if any slot is not ok
    pub fn status(&self) -> Status {
        self.classifications
            .iter()
            .map(Classification::status)
            .max()
            .unwrap_or(Status::Ok)
    }

    pub fn verdict(&self) -> Verdict {
        let message = self
            .classifications
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", ");

        Verdict::new(self.status(), message)
            .with_perfdata(format!("time={:.6}s", self.elapsed.as_secs_f64()))
    }
}

/// Run an exchange with freshly generated identifiers
pub async fn run(config: &RequestConfig) -> Result<ExchangeResult> {
    let ids = Identifiers::generate(&mut IdGenerator::thread_local());

    run_with(config, ids).await
}

/// Run an exchange using the given identifiers for the request
#[tracing::instrument(
    name = "exchange",
    level = "debug",
    skip_all,
    fields(server = config.server_address(), transport = %config.transport())
)]
pub async fn run_with(config: &RequestConfig, ids: Identifiers) -> Result<ExchangeResult> {
    let transport = config.transport();
    let duration = config.timeout();
    let start = Instant::now();

    let (mut connection, local_ip) = timeout(duration, transport::open(config))
        .await
        .map_err(|_| Error::ConnectTimeout {
            transport,
            timeout: duration,
        })??;

    let request = MessageBuilder::new(config, local_ip).build(&ids);

    log::debug!(
        "sending {} bytes over {} from {}",
        request.len(),
        connection.name(),
        connection.bound()
    );
    log::trace!("request:\n{request}");

    timeout(duration, connection.send(request.as_bytes()))
        .await
        .map_err(|_| Error::RequestTimeout {
            transport,
            timeout: duration,
        })?
        .map_err(|e| Error::transport(transport, e))?;

    let mut collector = ResponseCollector::new(config.expected().response_count());
    let mut lines = LineReader::new(connection.as_mut());
    let receive = collect(&mut lines, &mut collector, transport);

    // all reads share one deadline, none if it can't be represented
    let received = match Instant::now().checked_add(duration) {
        Some(deadline) => timeout_at(deadline, receive).await,
        None => Ok(receive.await),
    };

    received.map_err(|_| Error::ResponseTimeout {
        transport,
        timeout: duration,
    })??;

    let elapsed = start.elapsed();
    let local = connection.bound();
    let peer = connection.peer();

    validate_first_line(&collector, transport)?;

    let collected = collector.finish();
    let classifications = classify(config.expected(), &collected.codes);

    log::debug!("exchange completed in {elapsed:?}: {classifications:?}");

    Ok(ExchangeResult {
        transport,
        local,
        peer,
        records: collected.records,
        received: collected.codes,
        classifications,
        elapsed,
        raw: config.debug().then(|| RawExchange {
            request,
            response: collected.lines,
        }),
    })
}

async fn collect(
    lines: &mut LineReader<'_>,
    collector: &mut ResponseCollector,
    transport: TransportKind,
) -> Result<()> {
    loop {
        let line = lines
            .next_line()
            .await
            .map_err(|e| Error::transport(transport, e))?;

        let Some(line) = line else {
            validate_first_line(collector, transport)?;

            return Err(Error::transport(
                transport,
                io::Error::new(
                    io::ErrorKind::UnexpectedEof,
                    format!(
                        "connection closed after {} of {} responses",
                        collector.completed(),
                        collector.expected_responses()
                    ),
                ),
            ));
        };

        log::trace!("< {line}");

        if collector.push_line(line) == CollectState::Complete {
            return Ok(());
        }
    }
}

/// The first received line must be a status line
fn validate_first_line(collector: &ResponseCollector, transport: TransportKind) -> Result<()> {
    match collector.first_line() {
        Some(line) if StatusLine::from_line(line).is_none() => Err(Error::WrongResponse {
            transport,
            line: line.to_owned(),
        }),
        _ => Ok(()),
    }
}
