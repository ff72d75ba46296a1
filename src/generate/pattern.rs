//! Synthesizes strings that match a regular expression.
//!
//! The pattern is parsed once into `regex-syntax`'s high-level IR and walked on
//! every draw: literals are copied, classes yield one member, repetitions pick a
//! count, alternations pick a branch. Classes prefer printable ASCII members when
//! they have any. Anchors contribute nothing; word-boundary assertions are not
//! enforced.

use rand::Rng;
use regex_syntax::hir::{
    Class, ClassBytes, ClassBytesRange, ClassUnicode, ClassUnicodeRange, Hir, HirKind,
};

/// Extra repetitions allowed past the minimum for unbounded `*`, `+` and `{n,}`.
pub const MAX_UNBOUNDED_EXTRA: u32 = 8;

#[derive(Debug, Clone)]
pub struct Pattern {
    source: String,
    hir: Hir,
}

impl Pattern {
    /// Parses `source`, rejecting patterns that can never produce a string.
    pub fn parse(source: &str) -> Result<Pattern, String> {
        let hir = regex_syntax::Parser::new()
            .parse(source)
            .map_err(|e| e.to_string())?;
        ensure_generable(&hir)?;
        Ok(Pattern {
            source: source.to_string(),
            hir,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }

    pub fn generate<R: Rng + ?Sized>(&self, rng: &mut R) -> String {
        let mut out = String::new();
        emit(&self.hir, rng, &mut out);
        out
    }
}

fn ensure_generable(hir: &Hir) -> Result<(), String> {
    match hir.kind() {
        HirKind::Class(Class::Unicode(class)) if class.ranges().is_empty() => {
            Err("character class matches nothing".to_string())
        }
        HirKind::Class(Class::Bytes(class)) if class.ranges().is_empty() => {
            Err("byte class matches nothing".to_string())
        }
        HirKind::Class(Class::Bytes(class)) if ascii_bytes(class).ranges().is_empty() => {
            Err("byte classes must contain ASCII bytes".to_string())
        }
        HirKind::Repetition(rep) => ensure_generable(&rep.sub),
        HirKind::Capture(cap) => ensure_generable(&cap.sub),
        HirKind::Concat(subs) | HirKind::Alternation(subs) => {
            subs.iter().try_for_each(ensure_generable)
        }
        _ => Ok(()),
    }
}

fn emit<R: Rng + ?Sized>(hir: &Hir, rng: &mut R, out: &mut String) {
    match hir.kind() {
        HirKind::Empty | HirKind::Look(_) => {}
        HirKind::Literal(lit) => out.push_str(&String::from_utf8_lossy(&lit.0)),
        HirKind::Class(Class::Unicode(class)) => out.push(pick_char(class, rng)),
        HirKind::Class(Class::Bytes(class)) => out.push(char::from(pick_byte(class, rng))),
        HirKind::Repetition(rep) => {
            let max = rep.max.unwrap_or(rep.min.saturating_add(MAX_UNBOUNDED_EXTRA));
            let count = rng.gen_range(rep.min..=max);
            for _ in 0..count {
                emit(&rep.sub, rng, out);
            }
        }
        HirKind::Capture(cap) => emit(&cap.sub, rng, out),
        HirKind::Concat(subs) => {
            for sub in subs {
                emit(sub, rng, out);
            }
        }
        HirKind::Alternation(subs) => {
            let branch = &subs[rng.gen_range(0..subs.len())];
            emit(branch, rng, out);
        }
    }
}

fn pick_char<R: Rng + ?Sized>(class: &ClassUnicode, rng: &mut R) -> char {
    let mut printable = class.clone();
    printable.intersect(&ClassUnicode::new([ClassUnicodeRange::new(' ', '~')]));
    let class = if printable.ranges().is_empty() {
        class
    } else {
        &printable
    };

    let total: u32 = class
        .ranges()
        .iter()
        .map(|r| r.end() as u32 - r.start() as u32 + 1)
        .sum();
    let mut offset = rng.gen_range(0..total);
    for range in class.ranges() {
        let len = range.end() as u32 - range.start() as u32 + 1;
        if offset < len {
            // Offsets landing in the surrogate gap fall back to the range start.
            return char::from_u32(range.start() as u32 + offset).unwrap_or(range.start());
        }
        offset -= len;
    }
    class.ranges()[0].start()
}

fn pick_byte<R: Rng + ?Sized>(class: &ClassBytes, rng: &mut R) -> u8 {
    let ascii = ascii_bytes(class);
    let mut printable = ascii.clone();
    printable.intersect(&ClassBytes::new([ClassBytesRange::new(b' ', b'~')]));
    let class = if printable.ranges().is_empty() {
        &ascii
    } else {
        &printable
    };

    let total: u32 = class
        .ranges()
        .iter()
        .map(|r| u32::from(r.end()) - u32::from(r.start()) + 1)
        .sum();
    let mut offset = rng.gen_range(0..total);
    for range in class.ranges() {
        let len = u32::from(range.end()) - u32::from(range.start()) + 1;
        if offset < len {
            return range.start() + offset as u8;
        }
        offset -= len;
    }
    class.ranges()[0].start()
}

fn ascii_bytes(class: &ClassBytes) -> ClassBytes {
    let mut ascii = class.clone();
    ascii.intersect(&ClassBytes::new([ClassBytesRange::new(0, 0x7F)]));
    ascii
}
