use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;
use std::time::Duration;

use candy_dispenser::{
    release_candy, Arduino, DispenseConfig, Error, FormatOut, Link, MasterConfig, Reply,
    SerialMaster,
};
use embedded_hal::delay::DelayNs;

const ADDRESS: u8 = 17;
const MOVE_STEPPER: u8 = 0x10;

#[derive(Debug, Clone, PartialEq)]
enum Event {
    Sent { command: u8, flags: u8, payload: Vec<u8> },
    Delay(Duration),
}

type Log = Rc<RefCell<Vec<Event>>>;

fn xor(bytes: &[u8]) -> u8 {
    bytes.iter().fold(0, |acc, b| acc ^ b)
}

/// Pretends to be the dispenser's Arduino: acknowledges every request that
/// asks for a reply with `"ok"`.
struct FakeDispenser {
    log: Log,
    pending: VecDeque<u8>,
}

impl Link for FakeDispenser {
    fn set_baud_rate(&mut self, _baud: u32) -> Result<(), Error> {
        Ok(())
    }

    fn write_all(&mut self, bytes: &[u8]) -> Result<(), Error> {
        let (&terminator, frame) = bytes.split_last().unwrap();
        assert_eq!(terminator, 0x00);
        let packet = cobs::decode_vec(frame).unwrap();

        let (&sum, body) = packet.split_last().unwrap();
        assert_eq!(sum, xor(body));
        let [address, command, flags, len, payload @ ..] = body else {
            panic!("short request {packet:?}");
        };
        assert_eq!(*address, ADDRESS);
        assert_eq!(*len as usize, payload.len());

        self.log.borrow_mut().push(Event::Sent {
            command: *command,
            flags: *flags,
            payload: payload.to_vec(),
        });

        if flags & 1 == 1 {
            let mut reply = vec![ADDRESS, 0, 2, b'o', b'k'];
            reply.push(xor(&reply));
            self.pending.extend(cobs::encode_vec(&reply));
            self.pending.push_back(0x00);
        }
        Ok(())
    }

    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Error> {
        let n = self.pending.len().min(buf.len());
        for (slot, byte) in buf.iter_mut().zip(self.pending.drain(..n)) {
            *slot = byte;
        }
        Ok(n)
    }
}

struct RecordingDelay(Log);

impl DelayNs for RecordingDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.0
            .borrow_mut()
            .push(Event::Delay(Duration::from_nanos(ns.into())));
    }
}

fn dispenser(log: &Log) -> Arduino<FakeDispenser> {
    let link = FakeDispenser {
        log: log.clone(),
        pending: VecDeque::new(),
    };
    let config = MasterConfig::builder()
        .response_timeout(Duration::from_millis(50))
        .build();
    Arduino::new(SerialMaster::with_config(link, config).unwrap(), ADDRESS)
}

/// Collapse consecutive delay events into one total.
fn coalesce(events: Vec<Event>) -> Vec<Event> {
    let mut out: Vec<Event> = Vec::new();
    for event in events {
        if let Event::Delay(more) = event {
            if let Some(Event::Delay(total)) = out.last_mut() {
                *total += more;
                continue;
            }
        }
        out.push(event);
    }
    out
}

#[test]
fn release_candy_moves_forward_waits_then_reverses() {
    let log = Log::default();
    let mut arduino = dispenser(&log);
    let mut printed: Vec<u8> = Vec::new();

    let replies = release_candy(
        &mut arduino,
        &DispenseConfig::default(),
        RecordingDelay(log.clone()),
        &mut printed,
    )
    .unwrap();

    let events = coalesce(log.take());
    assert_eq!(events.len(), 3, "{events:?}");

    assert_eq!(
        events[0],
        Event::Sent {
            command: MOVE_STEPPER,
            flags: 1,
            payload: vec![1, 1, 200, 0],
        }
    );
    let Event::Delay(pause) = &events[1] else {
        panic!("expected a pause, got {:?}", events[1]);
    };
    assert!(*pause >= Duration::from_secs(3));
    assert_eq!(
        events[2],
        Event::Sent {
            command: MOVE_STEPPER,
            flags: 1,
            payload: vec![1, 0, 200, 0],
        }
    );

    assert_eq!(
        replies,
        [Reply::String("ok".into()), Reply::String("ok".into())]
    );
    assert_eq!(String::from_utf8(printed).unwrap(), "ok\nok\n");
}

#[test]
fn release_candy_without_replies_prints_none() {
    let log = Log::default();
    let mut arduino = dispenser(&log);
    let mut printed: Vec<u8> = Vec::new();
    let config = DispenseConfig::builder()
        .steps(0x0190)
        .pause(Duration::from_millis(10))
        .format(FormatOut::NoResponse)
        .build();

    let replies = release_candy(
        &mut arduino,
        &config,
        RecordingDelay(log.clone()),
        &mut printed,
    )
    .unwrap();

    assert_eq!(replies, [Reply::None, Reply::None]);
    assert_eq!(String::from_utf8(printed).unwrap(), "None\nNone\n");

    let sent: Vec<_> = log
        .take()
        .into_iter()
        .filter_map(|event| match event {
            Event::Sent { flags, payload, .. } => Some((flags, payload)),
            Event::Delay(..) => None,
        })
        .collect();
    assert_eq!(
        sent,
        [(0, vec![1, 1, 0x90, 0x01]), (0, vec![1, 0, 0x90, 0x01])]
    );
}
