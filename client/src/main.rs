mod cli_display;
mod client;

use clap::Parser;
use shared::CAVE_PORT;

use crate::client::Client;

#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    #[arg(short, long, default_value = "127.0.0.1")]
    server_address: String,

    #[arg(short, long, default_value_t = CAVE_PORT)]
    port: u16,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    let exit_code = match Client::run(&args.server_address, args.port).await {
        Ok(()) => 0,
        Err(e) => {
            eprintln!("{}", e);
            1
        }
    };

    // Stdin is read on a blocking thread that would otherwise keep the
    // runtime alive after the cave hangs up.
    std::process::exit(exit_code);
}
