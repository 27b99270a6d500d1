// Blocking protocol-level TCP client.
//
// A thin typed wrapper over one connection: send `Command`s, receive
// `Response`s. The protocol is strictly sequential per session, so plain
// blocking send/recv covers every flow; the only wrinkle is the server's
// unsolicited TIME ticks, which `recv_skipping_time` filters out for
// callers that are waiting on a reply to a command.
//
// This module lives in the server crate (not a crate of its own) because
// it is purely std TCP plus the protocol crate — the integration tests and
// any frontend drive the server through the same code path. The excluded
// rendering client sits on top of this: it does no drawing and captures no
// input.

use std::io::{self, BufReader, BufWriter};
use std::net::{TcpStream, ToSocketAddrs};
use std::time::Duration;

use minesweep_protocol::command::{Command, UpdateAction};
use minesweep_protocol::framing;
use minesweep_protocol::response::Response;
use minesweep_protocol::types::Slot;

pub struct GameClient {
    reader: BufReader<TcpStream>,
    writer: BufWriter<TcpStream>,
}

impl GameClient {
    pub fn connect(addr: impl ToSocketAddrs) -> io::Result<Self> {
        let stream = TcpStream::connect(addr)?;
        let reader = BufReader::new(stream.try_clone()?);
        Ok(Self {
            reader,
            writer: BufWriter::new(stream),
        })
    }

    /// Bound how long `recv` blocks; `None` restores blocking reads.
    pub fn set_read_timeout(&self, timeout: Option<Duration>) -> io::Result<()> {
        self.reader.get_ref().set_read_timeout(timeout)
    }

    pub fn send(&mut self, command: &Command) -> io::Result<()> {
        framing::write_line(&mut self.writer, &command.encode())
    }

    /// Receive the next response, TIME ticks included.
    pub fn recv(&mut self) -> io::Result<Response> {
        let line = framing::read_line(&mut self.reader)?;
        Response::parse(&line).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
    }

    /// Receive the next response that is not a TIME tick.
    pub fn recv_skipping_time(&mut self) -> io::Result<Response> {
        loop {
            let response = self.recv()?;
            if !matches!(response, Response::Time(_)) {
                return Ok(response);
            }
        }
    }

    pub fn new_game(&mut self) -> io::Result<()> {
        self.send(&Command::New)
    }

    pub fn update(&mut self, action: UpdateAction, y: usize, x: usize) -> io::Result<()> {
        self.send(&Command::Update { action, y, x })
    }

    pub fn get_load(&mut self) -> io::Result<()> {
        self.send(&Command::GetLoad)
    }

    pub fn load_from(&mut self, slot: Slot) -> io::Result<()> {
        self.send(&Command::LoadFrom(slot))
    }

    pub fn get_save(&mut self) -> io::Result<()> {
        self.send(&Command::GetSave)
    }

    pub fn save_to(&mut self, slot: Slot) -> io::Result<()> {
        self.send(&Command::SaveTo(slot))
    }

    pub fn score(&mut self) -> io::Result<()> {
        self.send(&Command::Score)
    }

    pub fn submit_name(&mut self, name: &str, score: u32) -> io::Result<()> {
        self.send(&Command::Name {
            name: name.to_string(),
            score,
        })
    }

    pub fn exit(&mut self) -> io::Result<()> {
        self.send(&Command::Exit)
    }
}
