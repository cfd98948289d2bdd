//! Fetch command - intercept one request through the engine

use crate::cli::args::FetchArgs;
use crate::config::Config;
use crate::engine::Warden;
use crate::error::{WardenError, WardenResult};
use crate::request::{Destination, Request, Response, FROM_CACHE_HEADER};
use crate::router::Interception;
use std::io::{self, Write};
use tracing::{debug, info};
use url::Url;

/// Execute the fetch command
pub async fn execute(args: FetchArgs, config: &Config) -> WardenResult<()> {
    let warden = Warden::from_config(config.clone())?;
    let state = warden.boot().await?;
    debug!("Engine is {}", state);

    let url = resolve_url(&args.url, &config.engine.origin)?;
    let destination: Destination = args.destination.parse()?;
    let mut request = Request::new(&args.method, url.as_str())?.with_destination(destination);
    for header in &args.headers {
        let (name, value) = parse_header(header)?;
        request = request.with_header(name, value);
    }
    if let Some(data) = args.data {
        request = request.with_body(data);
    }

    let response = match warden.handle(request.clone()).await? {
        Interception::Respond(response) => response,
        Interception::Passthrough if !warden.classifier().accepts(&request) => {
            return Err(WardenError::UnsupportedScheme(request.url.scheme().to_string()));
        }
        Interception::Passthrough => {
            info!(request_id = %request.id, "Not intercepted, fetching directly");
            warden.engine().fetcher().fetch(&request).await?
        }
    };

    // background refreshes must land before the process exits
    warden.drain().await;

    print_response(&response, args.include_headers)
}

/// Accept an absolute URL or a path relative to the app origin
fn resolve_url(input: &str, origin: &str) -> WardenResult<Url> {
    if let Ok(url) = Url::parse(input) {
        return Ok(url);
    }

    let origin = Url::parse(origin).map_err(|e| WardenError::InvalidUrl {
        url: origin.to_string(),
        reason: e.to_string(),
    })?;
    origin.join(input).map_err(|e| WardenError::InvalidUrl {
        url: input.to_string(),
        reason: e.to_string(),
    })
}

/// Split a "Name: value" header argument
fn parse_header(input: &str) -> WardenResult<(&str, &str)> {
    match input.split_once(':') {
        Some((name, value)) if !name.trim().is_empty() => Ok((name.trim(), value.trim())),
        _ => Err(WardenError::User(format!(
            "Invalid header '{}'. Expected \"Name: value\"",
            input
        ))),
    }
}

fn print_response(response: &Response, include_headers: bool) -> WardenResult<()> {
    let mut out = io::stdout().lock();
    let write_err = |e| WardenError::io("writing response to stdout", e);

    if include_headers {
        writeln!(out, "HTTP {}", response.status).map_err(write_err)?;
        for (name, value) in &response.headers {
            writeln!(out, "{}: {}", name, value).map_err(write_err)?;
        }
        writeln!(out).map_err(write_err)?;
    } else if let Some(source) = response.header(FROM_CACHE_HEADER) {
        debug!("Served from {}", source);
    }

    out.write_all(&response.body).map_err(write_err)?;
    out.flush().map_err(write_err)
}
