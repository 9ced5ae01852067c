use log::{error, info};
use rand::{SeedableRng, rngs::StdRng};
use server::{cave::Cave, cave_server::CaveServer, directory::DirectoryClient};
use shared::CAVE_PORT;

use clap::Parser;

#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    #[arg(long, default_value = "0.0.0.0")]
    host: String,

    #[arg(short, long, default_value_t = CAVE_PORT)]
    port: u16,

    /// Directory service to register with, as host or host:port
    #[arg(short, long)]
    directory: Option<String>,

    /// Host name players should use to reach this cave
    #[arg(short, long, default_value = "localhost")]
    advertise: String,

    /// Seed for the cave layout and every later random draw
    #[arg(short, long)]
    seed: Option<u64>,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let rng = match args.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };

    let tcp_addr = format!("{}:{}", args.host, args.port);

    let server = match CaveServer::bind(tcp_addr.clone(), Cave::new(rng)).await {
        Ok(cave_server) => cave_server,
        Err(e) => {
            error!("Error binding {}: {}", tcp_addr, e);
            return;
        }
    };

    let port = match server.local_addr() {
        Ok(addr) => addr.port(),
        Err(e) => {
            error!("{}", e);
            return;
        }
    };

    if let Some(directory) = &args.directory {
        let directory_addr = DirectoryClient::directory_addr(directory);
        let advertised_addr = format!("{}:{}", args.advertise, port);

        if let Err(e) = DirectoryClient::register(&directory_addr, &advertised_addr).await {
            error!("Error registering with directory {}: {}", directory_addr, e);
            return;
        }

        info!("Cave registered with {} as {}", directory_addr, advertised_addr);
    }

    info!("Cave listening on TCP: {}", tcp_addr);

    let shutdown = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Error waiting for shutdown signal: {}", e);
            std::future::pending::<()>().await;
        }
    };

    match server.listen(shutdown).await {
        Ok(_) => (),
        Err(e) => {
            error!("{}", e);
            return;
        }
    };
}
