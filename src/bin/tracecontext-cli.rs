use clap::{Parser, Subcommand};
use serde_json::{json, Value};

use tracecontext::context::{TraceContext, TRACEPARENT_HEADER, TRACESTATE_HEADER};
use tracecontext::traceparent::TraceParent;
use tracecontext::tracestate::TraceState;
use tracecontext::HeaderCarrier;

#[derive(Parser)]
#[command(name = "tracecontext-cli")]
#[command(about = "Inspect and generate W3C Trace Context headers", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Decode traceparent / tracestate header values
    Parse {
        #[arg(long)]
        traceparent: String,

        /// May be repeated; values are combined in order
        #[arg(long)]
        tracestate: Vec<String>,
    },
    /// Print a new random traceparent
    Generate {
        #[arg(long)]
        recorded: bool,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Parse {
            traceparent,
            tracestate,
        } => {
            let mut headers: Vec<(String, String)> =
                vec![(TRACEPARENT_HEADER.to_string(), traceparent)];
            headers.extend(
                tracestate
                    .into_iter()
                    .map(|value| (TRACESTATE_HEADER.to_string(), value)),
            );
            let carrier = ArgHeaders(headers);

            match TraceContext::from_headers(&carrier) {
                Ok(context) => {
                    let raw_state = carrier.get_all(TRACESTATE_HEADER).join(&b","[..]);
                    let state_error = TraceState::parse(&raw_state).err();
                    println!(
                        "{}",
                        serde_json::to_string_pretty(&describe(&context, state_error))?
                    );
                }
                Err(e) => {
                    eprintln!("Error: {}", e);
                    std::process::exit(1);
                }
            }
        }
        Commands::Generate { recorded } => {
            println!("{}", TraceParent::random(recorded));
        }
    }

    Ok(())
}

/// Command-line header pairs, in argument order.
struct ArgHeaders(Vec<(String, String)>);

impl HeaderCarrier for ArgHeaders {
    fn get_all(&self, name: &str) -> Vec<&[u8]> {
        self.0
            .iter()
            .filter(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_bytes())
            .collect()
    }

    fn set(&mut self, name: &str, value: String) {
        self.0.retain(|(key, _)| !key.eq_ignore_ascii_case(name));
        self.0.push((name.to_string(), value));
    }
}

fn describe(context: &TraceContext, state_error: Option<tracecontext::StateError>) -> Value {
    let parent = &context.trace_parent;
    let members: Vec<Value> = context
        .trace_state
        .iter()
        .map(|m| {
            json!({
                "vendor": m.vendor(),
                "tenant": m.tenant(),
                "value": m.value(),
            })
        })
        .collect();

    json!({
        "traceparent": {
            "version": parent.version,
            "trace_id": parent.trace_id.to_string(),
            "span_id": parent.span_id.to_string(),
            "recorded": parent.flags.recorded,
        },
        "tracestate": members,
        "tracestate_discarded": state_error.map(|e| e.to_string()),
    })
}
