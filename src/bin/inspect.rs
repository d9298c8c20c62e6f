//! hotrod-inspect
//!
//! Decodes a hex-encoded Hot Rod response frame and prints what the codec
//! makes of it.

use clap::Parser;
use hotrod_codec::codec::HeaderParams;
use hotrod_codec::protocol::{opcode, ClientIntelligence, Operation};
use hotrod_codec::topology::TopologyOutcome;
use hotrod_codec::{ClusterTopology, CodecConfig, TopologyAddress};
use tracing_subscriber::{fmt, EnvFilter};

/// Hot Rod response frame inspector
#[derive(Parser, Debug)]
#[command(name = "hotrod-inspect")]
#[command(about = "Decode a Hot Rod response frame")]
#[command(version)]
struct Args {
    /// Response bytes as hex (whitespace allowed)
    frame: String,

    /// Request op code the response answers (default: put)
    #[arg(short, long, default_value = "1")]
    op_code: u8,

    /// Cache name the request targeted
    #[arg(short, long, default_value = "")]
    cache: String,

    /// Client intelligence: 1 basic, 2 topology aware, 3 hash aware
    #[arg(short, long, default_value = "3")]
    intelligence: u8,

    /// Server the frame came from (host:port)
    #[arg(short, long, default_value = "127.0.0.1:11222")]
    server: String,
}

fn main() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,hotrod_codec=debug"));

    fmt().with_env_filter(filter).with_target(true).init();

    let args = Args::parse();

    if let Err(message) = run(&args) {
        tracing::error!("{}", message);
        std::process::exit(1);
    }
}

fn run(args: &Args) -> Result<(), String> {
    let frame = parse_hex(&args.frame)?;
    let intelligence = ClientIntelligence::from_u8(args.intelligence)
        .ok_or_else(|| format!("invalid client intelligence {}", args.intelligence))?;
    let operation = Operation::from_request_code(args.op_code)
        .ok_or_else(|| format!("unknown request op code {:#04x}", args.op_code))?;
    let server = parse_server(&args.server)?;

    let config = CodecConfig::builder()
        .client_intelligence(intelligence)
        .build()
        .map_err(|e| e.to_string())?;
    let codec = config.codec();
    let cluster = ClusterTopology::new(vec![server.clone()]);

    let params: HeaderParams = config.header_params(&cluster, operation, 0, args.cache.as_bytes());
    let mut cursor: &[u8] = &frame;

    match codec.read_header(&mut cursor, &params, &cluster, &server) {
        Ok(header) => {
            println!("message id : {}", header.message_id);
            println!(
                "op code    : {:#04x} ({})",
                header.op_code,
                opcode::name_of(header.op_code)
            );
            println!("status     : {:#04x} ({:?})", header.status, header.outcome());
            match &header.topology {
                TopologyOutcome::Absent => println!("topology   : none"),
                TopologyOutcome::Applied(update) | TopologyOutcome::Discarded(update) => {
                    println!("topology   : id {} ({} members)", update.topology_id, update.servers.len());
                    for member in &update.servers {
                        println!("  - {}", member);
                    }
                    if let Some(hash) = &update.hash {
                        println!(
                            "hash       : version {}, {} segments",
                            hash.hash_function_version, hash.num_segments
                        );
                    }
                }
            }
            println!("remaining  : {} bytes", cursor.len());
            Ok(())
        }
        Err(e) => Err(format!("{} (recovery: {:?})", e, e.recovery_hint())),
    }
}

fn parse_hex(input: &str) -> Result<Vec<u8>, String> {
    let digits: Vec<char> = input.chars().filter(|c| !c.is_whitespace()).collect();
    if digits.len() % 2 != 0 {
        return Err("hex input has an odd number of digits".to_string());
    }
    digits
        .chunks(2)
        .map(|pair| {
            let text: String = pair.iter().collect();
            u8::from_str_radix(&text, 16).map_err(|_| format!("invalid hex byte '{}'", text))
        })
        .collect()
}

fn parse_server(input: &str) -> Result<TopologyAddress, String> {
    let (host, port) = input
        .rsplit_once(':')
        .ok_or_else(|| format!("server '{}' is not host:port", input))?;
    let port = port
        .parse::<u16>()
        .map_err(|_| format!("invalid port in '{}'", input))?;
    Ok(TopologyAddress::new(host.trim_matches(|c| c == '[' || c == ']'), port))
}
