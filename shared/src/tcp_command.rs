use core::error::Error;
use std::str::from_utf8;

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::{
    received_tcp_command::ReceivedTcpCommand, tcp_command_id::TcpCommandId,
    tcp_command_payload_type::TcpCommandPayloadType,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TcpCommand {
    Simple(TcpCommandId),
    String(TcpCommandId, String),
    StringList(TcpCommandId, Vec<String>),
}

impl TcpCommand {
    pub fn id(&self) -> TcpCommandId {
        match self {
            TcpCommand::Simple(id)
            | TcpCommand::String(id, _)
            | TcpCommand::StringList(id, _) => *id,
        }
    }

    fn encode(&self) -> Result<Vec<u8>, Box<dyn Error + Send + Sync>> {
        let id = self.id();

        let payload_type = match self {
            TcpCommand::Simple(_) => TcpCommandPayloadType::Simple,
            TcpCommand::String(..) => TcpCommandPayloadType::String,
            TcpCommand::StringList(..) => TcpCommandPayloadType::StringList,
        };
        if payload_type != id.get_payload_type() {
            return Err(format!("{:?} does not carry a {:?} payload", id, payload_type).into());
        }

        let bytes = match self {
            TcpCommand::Simple(_) => vec![id.to_byte()],
            TcpCommand::String(_, payload) => {
                if payload.len() > u8::MAX as usize {
                    return Err("String payload too large".into());
                }

                let mut bytes = vec![id.to_byte(), payload.len() as u8];
                bytes.extend(payload.as_bytes());
                bytes
            }
            TcpCommand::StringList(_, payload) => {
                if payload.len() > u8::MAX as usize {
                    return Err("StringList payload too large".into());
                }

                let mut bytes = vec![id.to_byte(), payload.len() as u8];

                for str in payload {
                    if str.len() > u8::MAX as usize {
                        return Err("String in StringList payload too large".into());
                    }

                    bytes.push(str.len() as u8);
                    bytes.extend(str.as_bytes());
                }
                bytes
            }
        };

        Ok(bytes)
    }

    pub async fn write_to_stream<W>(
        &self,
        stream: &mut W,
    ) -> Result<(), Box<dyn Error + Send + Sync>>
    where
        W: AsyncWrite + Unpin,
    {
        let bytes = self.encode()?;

        stream.write_all(&bytes).await?;
        stream.flush().await?;

        Ok(())
    }

    /// Reads one frame. Not cancel safe: dropping the future part way through
    /// a frame loses the bytes already consumed.
    pub async fn read_from_stream<R>(
        stream: &mut R,
    ) -> Result<ReceivedTcpCommand, Box<dyn Error + Send + Sync>>
    where
        R: AsyncRead + Unpin,
    {
        let mut buf = [0; 1];

        let first_byte = match stream.read(&mut buf).await {
            Ok(0) => return Ok(ReceivedTcpCommand::EOF),
            Ok(_) => buf[0],
            Err(e) => return Err(e.into()),
        };

        let command_id = TcpCommandId::from_byte(first_byte)?;

        match command_id.get_payload_type() {
            TcpCommandPayloadType::Simple => {
                Ok(ReceivedTcpCommand::Command(TcpCommand::Simple(command_id)))
            }
            TcpCommandPayloadType::String => {
                let payload = read_string(stream).await?;

                Ok(ReceivedTcpCommand::Command(TcpCommand::String(
                    command_id, payload,
                )))
            }
            TcpCommandPayloadType::StringList => {
                let mut list_len_buf = [0];
                stream.read_exact(&mut list_len_buf).await?;
                let list_len = list_len_buf[0] as usize;

                let mut result = Vec::with_capacity(list_len);

                for _ in 0..list_len {
                    result.push(read_string(stream).await?);
                }

                Ok(ReceivedTcpCommand::Command(TcpCommand::StringList(
                    command_id, result,
                )))
            }
        }
    }
}

async fn read_string<R>(stream: &mut R) -> Result<String, Box<dyn Error + Send + Sync>>
where
    R: AsyncRead + Unpin,
{
    let mut str_len_buf = [0];
    stream.read_exact(&mut str_len_buf).await?;
    let str_len = str_len_buf[0] as usize;

    let mut str_buf = vec![0; str_len];
    stream.read_exact(&mut str_buf).await?;

    Ok(from_utf8(&str_buf)?.to_string())
}
