//! Minimal scripted server side for client tests.
#![allow(dead_code)]

use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};

use plainws::frame::{mask, FrameHead, OpCode, MAX_HEAD_LENGTH};
use plainws::handshake::derive_accept_key;

pub struct ServerFrame {
    pub fin: bool,
    pub opcode: u8,
    pub payload: Vec<u8>,
}

/// Accept one tcp connection and answer its websocket upgrade.
pub fn accept_websocket(lis: &TcpListener) -> TcpStream {
    let (mut tcp, _) = lis.accept().unwrap();

    let mut head = Vec::new();
    let mut byte = [0u8; 1];
    while !head.ends_with(b"\r\n\r\n") {
        tcp.read_exact(&mut byte).unwrap();
        head.push(byte[0]);
    }

    let head = String::from_utf8(head).unwrap();
    let key = head
        .split("\r\n")
        .find_map(|line| {
            let (name, value) = line.split_once(':')?;
            name.eq_ignore_ascii_case("sec-websocket-key")
                .then(|| value.trim().to_owned())
        })
        .expect("request carries no sec-websocket-key");

    let accept = derive_accept_key(key.as_bytes());
    let response = format!(
        "HTTP/1.1 101 Switching Protocols\r\n\
         Upgrade: websocket\r\n\
         Connection: Upgrade\r\n\
         Sec-WebSocket-Accept: {}\r\n\r\n",
        std::str::from_utf8(&accept).unwrap()
    );
    tcp.write_all(response.as_bytes()).unwrap();
    tcp
}

/// Read one client frame, unmasking the payload.
pub fn read_frame(tcp: &mut TcpStream) -> ServerFrame {
    let mut flags = [0u8; 2];
    tcp.read_exact(&mut flags).unwrap();

    let fin = flags[0] & 0x80 != 0;
    let opcode = flags[0] & 0x0f;
    let masked = flags[1] & 0x80 != 0;

    let len = match flags[1] & 0x7f {
        126 => {
            let mut ext = [0u8; 2];
            tcp.read_exact(&mut ext).unwrap();
            u16::from_be_bytes(ext) as u64
        }
        127 => {
            let mut ext = [0u8; 8];
            tcp.read_exact(&mut ext).unwrap();
            u64::from_be_bytes(ext)
        }
        n => n as u64,
    };

    let mut key = [0u8; 4];
    if masked {
        tcp.read_exact(&mut key).unwrap();
    }

    let mut payload = vec![0u8; len as usize];
    tcp.read_exact(&mut payload).unwrap();
    if masked {
        mask::apply(key, &mut payload, 0);
    }

    ServerFrame {
        fin,
        opcode,
        payload,
    }
}

/// Write one unmasked server frame.
pub fn write_frame(tcp: &mut TcpStream, fin: bool, opcode: OpCode, payload: &[u8]) {
    let mut head = [0u8; MAX_HEAD_LENGTH];
    let n = FrameHead::new(fin, opcode, None, payload.len() as u64).encode(&mut head);
    tcp.write_all(&head[..n]).unwrap();
    tcp.write_all(payload).unwrap();
}
