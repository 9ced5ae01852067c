use core::error::Error;

use shared::{
    player_action::PlayerAction, received_tcp_command::ReceivedTcpCommand,
    tcp_command::TcpCommand, tcp_command_id::TcpCommandId,
};
use tokio::{
    io::{AsyncBufReadExt, AsyncRead, BufReader},
    net::TcpStream,
};

use crate::cli_display::CliDisplay;

pub struct Client;

impl Client {
    pub async fn run(server_addr: &str, port: u16) -> Result<(), Box<dyn Error + Send + Sync>> {
        let server_tcp_addr = format!("{}:{}", server_addr, port);

        let tcp_stream = TcpStream::connect(&server_tcp_addr).await?;
        CliDisplay::print_connected_message(&server_tcp_addr);

        let (mut reader, mut writer) = tcp_stream.into_split();

        let mut server_task =
            tokio::spawn(async move { Self::print_server_commands(&mut reader).await });

        let mut lines = BufReader::new(tokio::io::stdin()).lines();

        loop {
            tokio::select! {

                result = &mut server_task => {

                    return result?;
                }

                line = lines.next_line() => {

                    let Some(line) = line? else {
                        return Ok(());
                    };

                    let line = line.trim();
                    if line.is_empty() {
                        continue;
                    }

                    let action = PlayerAction::parse(line);

                    TcpCommand::String(TcpCommandId::PlayerAction, action.to_string())
                        .write_to_stream(&mut writer)
                        .await?;
                }
            }
        }
    }

    async fn print_server_commands<R>(reader: &mut R) -> Result<(), Box<dyn Error + Send + Sync>>
    where
        R: AsyncRead + Unpin,
    {
        loop {
            let command = match TcpCommand::read_from_stream(reader).await? {
                ReceivedTcpCommand::EOF => {
                    CliDisplay::print_disconnected();
                    return Ok(());
                }
                ReceivedTcpCommand::Command(command) => command,
            };

            match command {
                TcpCommand::StringList(TcpCommandId::Senses, senses) => {
                    CliDisplay::print_senses(&senses)
                }
                TcpCommand::StringList(TcpCommandId::Notifications, notifications) => {
                    CliDisplay::print_notifications(&notifications)
                }
                TcpCommand::Simple(TcpCommandId::Died) => CliDisplay::print_died(),
                TcpCommand::String(TcpCommandId::ErrorResponse, error) => return Err(error.into()),
                other => return Err(format!("Unexpected command from cave: {:?}", other.id()).into()),
            }
        }
    }
}
