//! Ask command implementation

use crate::cli::{load_config, AskArgs};
use crate::routing::{AIRouter, RequestEnvelope};
use futures_util::StreamExt;
use std::io::Write;

/// Handle `genesis ask` command
///
/// Streams the answer to stdout as it arrives. Ctrl-C cancels the request.
pub async fn handle_ask(args: AskArgs) -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config(&args.config)?;
    let router = AIRouter::from_config(&config);

    let mut request = RequestEnvelope::new(args.prompt, args.request_type);
    request.context = args.context;
    request.max_tokens = args.max_tokens;
    request.temperature = args.temperature;

    let mut stream = router.route_request(request)?;
    let cancel = stream.cancellation_token();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            cancel.cancel();
        }
    });

    let mut stdout = std::io::stdout();
    let mut fallback = false;
    while let Some(chunk) = stream.next().await {
        fallback |= chunk.is_fallback();
        if args.json {
            writeln!(stdout, "{}", serde_json::to_string(&chunk)?)?;
        } else {
            write!(stdout, "{}", chunk.text)?;
        }
        stdout.flush()?;
    }

    if !args.json {
        writeln!(stdout)?;
    }
    if fallback {
        eprintln!("(no AI provider was available; showing a prepared response)");
    }
    Ok(())
}
