use core::error::Error;
use std::sync::Arc;

use log::{info, warn};
use shared::{
    player_action::PlayerAction, received_tcp_command::ReceivedTcpCommand,
    tcp_command::TcpCommand, tcp_command_id::TcpCommandId,
};
use tokio::{
    io::{AsyncRead, AsyncWrite, ReadHalf, WriteHalf},
    sync::mpsc,
};

use crate::{
    cave::Cave,
    command_handler::{CommandHandler, Reply},
    session::SessionHandle,
};

type IncomingAction = Result<PlayerAction, Box<dyn Error + Send + Sync>>;

pub struct Connection;

impl Connection {
    /// Plays one session over `stream` until the player dies, escapes, quits
    /// or disconnects. The player never outlives this call in the cave.
    pub async fn handle_stream<S>(
        stream: S,
        cave: Arc<Cave>,
        handle: Arc<SessionHandle>,
    ) -> Result<(), Box<dyn Error + Send + Sync>>
    where
        S: AsyncRead + AsyncWrite + Unpin + Send + 'static,
    {
        let (reader, mut writer) = tokio::io::split(stream);

        let (action_tx, mut action_rx) = mpsc::channel(16);
        let reader_task = tokio::spawn(Self::read_actions(reader, action_tx));

        let mut handler = CommandHandler::new(cave.clone(), handle.clone());

        let result = Self::play(&mut handler, &cave, &handle, &mut action_rx, &mut writer).await;

        handle.kill();
        handler.abandon().await;
        reader_task.abort();

        result
    }

    async fn play<S>(
        handler: &mut CommandHandler,
        cave: &Cave,
        handle: &SessionHandle,
        action_rx: &mut mpsc::Receiver<IncomingAction>,
        writer: &mut WriteHalf<S>,
    ) -> Result<(), Box<dyn Error + Send + Sync>>
    where
        S: AsyncRead + AsyncWrite + Unpin,
    {
        handle.add_notification("Welcome!");
        Self::flush_notifications(handle, writer).await?;

        let start = cave.random_room().await;
        info!("Player {} enters the cave in room {}", handle.player_id, start);

        let replies = handler.enter_cave(start).await;
        Self::send_replies(&replies, writer).await?;

        while !handler.is_over() {
            let incoming = tokio::select! {
                biased;

                _ = handle.woken() => None,

                action = action_rx.recv() => Some(action),
            };

            Self::flush_notifications(handle, writer).await?;

            if !handle.is_alive() {
                if handler.terminate().await {
                    Self::send_replies(&[Reply::Died], writer).await?;
                }
                return Ok(());
            }

            let action = match incoming {
                None => continue,
                Some(None) => {
                    info!("Player {} disconnected", handle.player_id);
                    handler.terminate().await;
                    return Ok(());
                }
                Some(Some(action)) => action?,
            };

            let replies = handler.handle_action(&action).await;
            Self::send_replies(&replies, writer).await?;
        }

        Ok(())
    }

    async fn read_actions<S>(mut reader: ReadHalf<S>, action_tx: mpsc::Sender<IncomingAction>)
    where
        S: AsyncRead + AsyncWrite + Unpin,
    {
        loop {
            let incoming = match TcpCommand::read_from_stream(&mut reader).await {
                Ok(ReceivedTcpCommand::EOF) => return,
                Ok(ReceivedTcpCommand::Command(TcpCommand::String(
                    TcpCommandId::PlayerAction,
                    line,
                ))) => Ok(PlayerAction::parse(&line)),
                Ok(ReceivedTcpCommand::Command(command)) => {
                    warn!("Unexpected command from player: {:?}", command.id());
                    Err(format!("Unexpected command {:?}", command.id()).into())
                }
                Err(e) => Err(e),
            };

            let failed = incoming.is_err();
            if action_tx.send(incoming).await.is_err() || failed {
                return;
            }
        }
    }

    async fn flush_notifications<W>(
        handle: &SessionHandle,
        writer: &mut W,
    ) -> Result<(), Box<dyn Error + Send + Sync>>
    where
        W: AsyncWrite + Unpin,
    {
        if !handle.has_notifications() {
            return Ok(());
        }

        TcpCommand::StringList(TcpCommandId::Notifications, handle.take_notifications())
            .write_to_stream(writer)
            .await
    }

    async fn send_replies<W>(
        replies: &[Reply],
        writer: &mut W,
    ) -> Result<(), Box<dyn Error + Send + Sync>>
    where
        W: AsyncWrite + Unpin,
    {
        for reply in replies {
            let command = match reply {
                Reply::Senses(senses) => {
                    TcpCommand::StringList(TcpCommandId::Senses, senses.clone())
                }
                Reply::Notifications(notes) => {
                    TcpCommand::StringList(TcpCommandId::Notifications, notes.clone())
                }
                Reply::Died => TcpCommand::Simple(TcpCommandId::Died),
            };

            command.write_to_stream(writer).await?;
        }

        Ok(())
    }
}
