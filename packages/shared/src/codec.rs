//! Newline-delimited frame codec.
//!
//! A frame is one line of text terminated by `\n` (a preceding `\r` is
//! dropped). The codec knows nothing about frame kinds: chat messages and
//! system notices travel the same way.

use std::io;

use futures_util::StreamExt;
use thiserror::Error;
use tokio::io::AsyncRead;
use tokio_util::{
    bytes::BytesMut,
    codec::{Decoder, Encoder, FramedRead, LinesCodec, LinesCodecError},
};

/// Upper bound on a single frame, terminator excluded.
pub const MAX_FRAME_LENGTH: usize = 4096;

/// Errors raised while reading or writing frames.
#[derive(Debug, Error)]
pub enum FrameError {
    #[error("i/o error: {0}")]
    Io(#[from] io::Error),

    #[error("frame exceeds {MAX_FRAME_LENGTH} bytes")]
    TooLong,
}

impl FrameError {
    /// `true` when the peer went away (reset, broken pipe, aborted).
    pub fn is_disconnect(&self) -> bool {
        match self {
            FrameError::Io(e) => matches!(
                e.kind(),
                io::ErrorKind::ConnectionReset
                    | io::ErrorKind::BrokenPipe
                    | io::ErrorKind::ConnectionAborted
                    | io::ErrorKind::UnexpectedEof
            ),
            FrameError::TooLong => false,
        }
    }
}

impl From<LinesCodecError> for FrameError {
    fn from(err: LinesCodecError) -> Self {
        match err {
            LinesCodecError::MaxLineLengthExceeded => FrameError::TooLong,
            LinesCodecError::Io(e) => FrameError::Io(e),
        }
    }
}

/// Codec turning a byte stream into text frames and back.
#[derive(Debug, Clone)]
pub struct FrameCodec {
    lines: LinesCodec,
}

impl FrameCodec {
    pub fn new() -> Self {
        Self {
            lines: LinesCodec::new_with_max_length(MAX_FRAME_LENGTH),
        }
    }
}

impl Default for FrameCodec {
    fn default() -> Self {
        Self::new()
    }
}

impl Decoder for FrameCodec {
    type Item = String;
    type Error = FrameError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<String>, FrameError> {
        Ok(self.lines.decode(src)?)
    }

    fn decode_eof(&mut self, src: &mut BytesMut) -> Result<Option<String>, FrameError> {
        Ok(self.lines.decode_eof(src)?)
    }
}

impl<T> Encoder<T> for FrameCodec
where
    T: AsRef<str>,
{
    type Error = FrameError;

    fn encode(&mut self, frame: T, dst: &mut BytesMut) -> Result<(), FrameError> {
        Ok(self.lines.encode(frame, dst)?)
    }
}

/// Outcome of reading the next frame off a connection.
#[derive(Debug)]
pub enum Inbound {
    Frame(String),
    /// The peer closed the stream, or sent an empty frame.
    EndOfStream,
    Error(FrameError),
}

/// Read the next frame.
///
/// Cancel safe: the partially read line stays buffered inside `frames`.
pub async fn read_frame<R>(frames: &mut FramedRead<R, FrameCodec>) -> Inbound
where
    R: AsyncRead + Unpin,
{
    match frames.next().await {
        None => Inbound::EndOfStream,
        Some(Ok(frame)) if frame.is_empty() => Inbound::EndOfStream,
        Some(Ok(frame)) => Inbound::Frame(frame),
        Some(Err(e)) => Inbound::Error(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::AsyncWriteExt;

    fn framed(reader: tokio::io::DuplexStream) -> FramedRead<tokio::io::DuplexStream, FrameCodec> {
        FramedRead::new(reader, FrameCodec::new())
    }

    #[test]
    fn test_encode_appends_single_newline() {
        // テスト項目: エンコードすると改行が1つだけ付与される
        // given (前提条件):
        let mut codec = FrameCodec::new();
        let mut buf = BytesMut::new();

        // when (操作):
        codec.encode("alice: hello", &mut buf).unwrap();

        // then (期待する結果):
        assert_eq!(&buf[..], b"alice: hello\n");
    }

    #[tokio::test]
    async fn test_read_frame_splits_on_newline() {
        // テスト項目: 1回の書き込みに含まれる複数フレームが順番に取り出される
        // given (前提条件):
        let (mut writer, reader) = tokio::io::duplex(256);
        let mut frames = framed(reader);
        writer
            .write_all(b"alice: hello\r\nbob: hi\n")
            .await
            .unwrap();

        // when (操作):
        let first = read_frame(&mut frames).await;
        let second = read_frame(&mut frames).await;

        // then (期待する結果):
        assert!(matches!(first, Inbound::Frame(f) if f == "alice: hello"));
        assert!(matches!(second, Inbound::Frame(f) if f == "bob: hi"));
    }

    #[tokio::test]
    async fn test_read_frame_reports_end_of_stream_on_close() {
        // テスト項目: 相手が切断すると EndOfStream になる
        // given (前提条件):
        let (writer, reader) = tokio::io::duplex(64);
        let mut frames = framed(reader);

        // when (操作):
        drop(writer);
        let inbound = read_frame(&mut frames).await;

        // then (期待する結果):
        assert!(matches!(inbound, Inbound::EndOfStream));
    }

    #[tokio::test]
    async fn test_read_frame_treats_empty_frame_as_end_of_stream() {
        // テスト項目: 空のフレームは EndOfStream と同じ扱いになる
        // given (前提条件):
        let (mut writer, reader) = tokio::io::duplex(64);
        let mut frames = framed(reader);
        writer.write_all(b"\n").await.unwrap();

        // when (操作):
        let inbound = read_frame(&mut frames).await;

        // then (期待する結果):
        assert!(matches!(inbound, Inbound::EndOfStream));
    }

    #[tokio::test]
    async fn test_read_frame_delivers_unterminated_tail() {
        // テスト項目: 改行なしで切断された末尾データもフレームとして渡される
        // given (前提条件):
        let (mut writer, reader) = tokio::io::duplex(64);
        let mut frames = framed(reader);
        writer.write_all(b"Server: bob left").await.unwrap();
        drop(writer);

        // when (操作):
        let tail = read_frame(&mut frames).await;
        let after = read_frame(&mut frames).await;

        // then (期待する結果):
        assert!(matches!(tail, Inbound::Frame(f) if f == "Server: bob left"));
        assert!(matches!(after, Inbound::EndOfStream));
    }

    #[tokio::test]
    async fn test_read_frame_rejects_oversized_frame() {
        // テスト項目: 上限を超えるフレームはエラーになる
        // given (前提条件):
        let (mut writer, reader) = tokio::io::duplex(MAX_FRAME_LENGTH * 2);
        let mut frames = framed(reader);
        let oversized = vec![b'x'; MAX_FRAME_LENGTH + 1];
        writer.write_all(&oversized).await.unwrap();
        writer.write_all(b"\n").await.unwrap();

        // when (操作):
        let inbound = read_frame(&mut frames).await;

        // then (期待する結果):
        assert!(matches!(inbound, Inbound::Error(FrameError::TooLong)));
    }

    #[test]
    fn test_is_disconnect_classifies_peer_failures() {
        // テスト項目: リセットや broken pipe は切断として分類される
        // given (前提条件):
        let reset = FrameError::Io(io::Error::from(io::ErrorKind::ConnectionReset));
        let pipe = FrameError::Io(io::Error::from(io::ErrorKind::BrokenPipe));
        let other = FrameError::Io(io::Error::from(io::ErrorKind::InvalidData));

        // when (操作) / then (期待する結果):
        assert!(reset.is_disconnect());
        assert!(pipe.is_disconnect());
        assert!(!other.is_disconnect());
        assert!(!FrameError::TooLong.is_disconnect());
    }
}
