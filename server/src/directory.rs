use core::error::Error;

use shared::{
    DIRECTORY_PORT, received_tcp_command::ReceivedTcpCommand, tcp_command::TcpCommand,
    tcp_command_id::TcpCommandId,
};
use tokio::net::TcpStream;

pub struct DirectoryClient;

impl DirectoryClient {
    /// `host` alone means the directory's well-known port.
    pub fn directory_addr(directory: &str) -> String {
        let has_port = directory
            .rsplit_once(':')
            .is_some_and(|(_, port)| port.parse::<u16>().is_ok());

        if has_port {
            directory.to_string()
        } else {
            format!("{}:{}", directory, DIRECTORY_PORT)
        }
    }

    pub async fn register(
        directory_addr: &str,
        advertised_addr: &str,
    ) -> Result<(), Box<dyn Error + Send + Sync>> {
        let mut stream = TcpStream::connect(directory_addr).await?;

        TcpCommand::String(TcpCommandId::RegisterCave, advertised_addr.to_string())
            .write_to_stream(&mut stream)
            .await?;

        let received_command = match TcpCommand::read_from_stream(&mut stream).await? {
            ReceivedTcpCommand::EOF => {
                return Err("Directory closed the connection during registration".into());
            }
            ReceivedTcpCommand::Command(command) => command,
        };

        match received_command {
            TcpCommand::Simple(TcpCommandId::RegisterAck) => Ok(()),
            TcpCommand::String(TcpCommandId::ErrorResponse, error) => Err(error.into()),
            _ => Err("Invalid response from directory during registration".into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use tokio::net::TcpListener;

    use super::*;

    async fn directory_replying(reply: TcpCommand) -> (String, tokio::task::JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap().to_string();

        let task = tokio::spawn(async move {
            let (mut stream, _) = listener.accept().await.unwrap();
            let registered = match TcpCommand::read_from_stream(&mut stream).await.unwrap() {
                ReceivedTcpCommand::Command(TcpCommand::String(
                    TcpCommandId::RegisterCave,
                    addr,
                )) => addr,
                other => panic!("unexpected registration {:?}", other),
            };
            reply.write_to_stream(&mut stream).await.unwrap();
            registered
        });

        (addr, task)
    }

    #[test]
    fn bare_host_gets_the_directory_port() {
        assert_eq!(
            DirectoryClient::directory_addr("caves.local"),
            format!("caves.local:{}", DIRECTORY_PORT)
        );
        assert_eq!(
            DirectoryClient::directory_addr("caves.local:4000"),
            "caves.local:4000"
        );
    }

    #[tokio::test]
    async fn registration_is_acknowledged() {
        let (addr, directory) =
            directory_replying(TcpCommand::Simple(TcpCommandId::RegisterAck)).await;

        DirectoryClient::register(&addr, "localhost:2000")
            .await
            .unwrap();

        assert_eq!(directory.await.unwrap(), "localhost:2000");
    }

    #[tokio::test]
    async fn rejection_is_an_error() {
        let (addr, directory) = directory_replying(TcpCommand::String(
            TcpCommandId::ErrorResponse,
            "cave already registered".to_string(),
        ))
        .await;

        let error = DirectoryClient::register(&addr, "localhost:2000")
            .await
            .unwrap_err();

        assert_eq!(error.to_string(), "cave already registered");
        directory.await.unwrap();
    }

    #[tokio::test]
    async fn unreachable_directory_is_an_error() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap().to_string();
        drop(listener);

        assert!(DirectoryClient::register(&addr, "localhost:2000").await.is_err());
    }
}
