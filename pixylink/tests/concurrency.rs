//! Transactions from several threads must not interleave on the link

use std::collections::VecDeque;
use std::thread::{self, ThreadId};
use std::time::Duration;

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use pixylink::hal::{Link, LinkError};
use pixylink::protocol::checksum;
use pixylink::{Pixy2, Response};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Never;

impl LinkError for Never {
    fn is_transient(&self) -> bool {
        false
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Op {
    Send,
    Receive,
}

/// Answers every request with a well-formed reply of the matching type
#[derive(Default)]
struct EchoLink {
    rx: VecDeque<u8>,
    log: Vec<(ThreadId, Op)>,
}

fn frame(tag: u8, payload: &[u8]) -> Vec<u8> {
    let sum = checksum(payload).to_le_bytes();
    let mut bytes = vec![0xAF, 0xC1, tag, payload.len() as u8, sum[0], sum[1]];
    bytes.extend_from_slice(payload);
    bytes
}

impl Link for EchoLink {
    type Error = Never;

    fn send(&mut self, bytes: &[u8]) -> Result<(), Never> {
        self.log.push((thread::current().id(), Op::Send));
        // Give the other thread a chance to barge in
        thread::sleep(Duration::from_micros(200));
        let reply = match bytes[2] {
            0x0E => {
                let mut payload = vec![0x22, 0x00, 3, 1, 0x10, 0x00];
                payload.extend_from_slice(b"general\0\0\0");
                frame(0x0F, &payload)
            }
            0x20 => frame(0x21, &[1, 0, 10, 0, 20, 0, 4, 0, 4, 0, 0, 0, 0, 1]),
            other => panic!("unexpected request {other:#x}"),
        };
        // Leading noise forces a resync on every reply
        self.rx.extend([0x00, 0xAE, 0x12]);
        self.rx.extend(reply);
        Ok(())
    }

    fn receive(&mut self, buffer: &mut [u8]) -> Result<(), Never> {
        self.log.push((thread::current().id(), Op::Receive));
        for byte in buffer.iter_mut() {
            *byte = self.rx.pop_front().unwrap_or(0);
        }
        Ok(())
    }
}

#[test]
fn test_transactions_are_serialized() {
    let pixy: Pixy2<EchoLink, CriticalSectionRawMutex> = Pixy2::new(EchoLink::default());

    thread::scope(|s| {
        for worker in 0..2 {
            let pixy = &pixy;
            s.spawn(move || {
                let mut response = Response::new();
                for round in 0..25 {
                    if (round + worker) % 2 == 0 {
                        let version = pixy.get_version().unwrap();
                        assert_eq!(version.fw_major, 3);
                    } else {
                        let blocks = pixy.get_objects(0xFF, 1, &mut response).unwrap();
                        assert_eq!(blocks.len(), 1);
                        assert_eq!(blocks[0].x(), 10);
                    }
                }
            });
        }
    });

    let log = pixy.into_link().log;
    assert_eq!(log.iter().filter(|(_, op)| *op == Op::Send).count(), 50);

    // Every receive belongs to the thread that sent the latest request
    let mut owner = None;
    for (thread, op) in log {
        match op {
            Op::Send => owner = Some(thread),
            Op::Receive => assert_eq!(Some(thread), owner),
        }
    }
}
