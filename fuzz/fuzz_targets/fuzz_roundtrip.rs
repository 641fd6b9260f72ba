#![no_main]
use std::cell::RefCell;

use arbitrary::{Arbitrary, Unstructured};
use libfuzzer_sys::{fuzz_mutator, fuzz_target, fuzzer_mutate};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use yamlmodem::{
    Emitter, EmitterOptions, Encoding, Event, EventData, EventType, LineBreak, Parser,
    ParserOptions,
};

const HEADER: usize = 8;

thread_local! {
    static RNG: RefCell<SmallRng> = RefCell::new(SmallRng::from_os_rng());
}

/// Fragments that steer the mutator towards YAML structure.
static FRAGMENTS: &[&[u8]] = &[
    b"\n",
    b"  ",
    b"- ",
    b": ",
    b"? ",
    b"[",
    b"]",
    b"{",
    b"}",
    b", ",
    b"&a ",
    b"*a",
    b"!!str ",
    b"!e!x ",
    b"'q'",
    b"\"\\u00e9\\n\"",
    b"|\n",
    b">-\n",
    b"---\n",
    b"...\n",
    b"%YAML 1.1\n",
    b"%TAG !e! tag:e.com:\n",
    b"# c\n",
    b"\t",
    "\u{2028}".as_bytes(),
];

fn with_rng<F, R>(f: F) -> R
where
    F: FnOnce(&mut SmallRng) -> R,
{
    RNG.with(|cell| f(&mut cell.borrow_mut()))
}

/// Inserts a handful of fragments at random positions after the header.
fn splice_fragments(data: &mut [u8], mut size: usize, max_size: usize) -> usize {
    let count = with_rng(|rng| rng.random_range(1..=4));
    for _ in 0..count {
        let fragment = with_rng(|rng| FRAGMENTS[rng.random_range(0..FRAGMENTS.len())]);
        if size + fragment.len() > max_size {
            break;
        }
        let at = with_rng(|rng| rng.random_range(HEADER..=size));
        data.copy_within(at..size, at + fragment.len());
        data[at..at + fragment.len()].copy_from_slice(fragment);
        size += fragment.len();
    }
    size
}

fn mutator(data: &mut [u8], size: usize, max_size: usize, seed: u32) -> usize {
    if size < HEADER {
        let header: [u8; HEADER] = with_rng(|rng| rng.random());
        let len = HEADER.min(max_size);
        data[..len].copy_from_slice(&header[..len]);
        len
    } else if seed % 4 == 0 {
        splice_fragments(data, size, max_size)
    } else {
        fuzzer_mutate(data, size, max_size)
    }
}

fuzz_mutator!(|data: &mut [u8], size: usize, max_size: usize, seed: u32| {
    mutator(data, size, max_size, seed)
});

#[derive(Debug, Arbitrary)]
struct Settings {
    canonical: bool,
    unicode: bool,
    indent: u8,
    width: i16,
    line_break: u8,
    utf16: bool,
}

impl Settings {
    fn options(&self) -> EmitterOptions {
        EmitterOptions {
            encoding: if self.utf16 {
                Encoding::Utf16Le
            } else {
                Encoding::Utf8
            },
            canonical: self.canonical,
            indent: i32::from(self.indent % 12),
            width: i32::from(self.width),
            unicode: self.unicode,
            line_break: match self.line_break % 4 {
                0 => LineBreak::Any,
                1 => LineBreak::Cr,
                2 => LineBreak::Ln,
                _ => LineBreak::CrLn,
            },
        }
    }
}

fn parse(input: &[u8]) -> Option<Vec<Event>> {
    let parser = Parser::with_options(
        input,
        ParserOptions {
            panic_on_error: false,
            ..Default::default()
        },
    );
    parser.collect::<Result<_, _>>().ok()
}

fn shape(events: &[Event]) -> Vec<(EventType, Option<Vec<u8>>)> {
    events
        .iter()
        .map(|event| {
            let value = match &event.data {
                EventData::Scalar { value, .. } => Some(value.to_vec()),
                _ => None,
            };
            (event.event_type(), value)
        })
        .collect()
}

fn roundtrip(data: &[u8]) {
    if data.len() < HEADER {
        return;
    }
    let Ok(settings) = Settings::arbitrary(&mut Unstructured::new(&data[..HEADER])) else {
        return;
    };
    let Some(events) = parse(&data[HEADER..]) else {
        return;
    };
    let expected = shape(&events);

    let mut emitter = Emitter::with_options(Vec::new(), settings.options());
    if emitter.emit_all(events).is_err() {
        // Some parsed streams carry directives the emitter refuses to write.
        return;
    }
    let text = emitter.into_inner();
    let reparsed = parse(&text).unwrap_or_else(|| {
        panic!(
            "emitted text does not parse back ({settings:?}): {:?}",
            String::from_utf8_lossy(&text)
        )
    });
    assert_eq!(shape(&reparsed), expected, "{settings:?}");
}

fuzz_target!(|data: &[u8]| roundtrip(data));
