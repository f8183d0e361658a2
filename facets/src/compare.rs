//! Natural string ordering for facet values: `item2` sorts before `item10`,
//! letters compare without regard to case, lowercase wins a case-only tie.

use std::cmp::Ordering;


#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Chunk<'a> {
    Digits(&'a str),
    Text(&'a str),
}

fn chunks(s: &str) -> impl Iterator<Item = Chunk<'_>> {
    let mut rest = s;
    std::iter::from_fn(move || {
        let first = rest.chars().next()?;
        let is_digit = first.is_ascii_digit();
        let end = rest.find(|c: char| c.is_ascii_digit() != is_digit).unwrap_or(rest.len());
        let (run, tail) = rest.split_at(end);
        rest = tail;
        Some(if is_digit { Chunk::Digits(run) } else { Chunk::Text(run) })
    })
}

fn cmp_chunk(a: Chunk<'_>, b: Chunk<'_>) -> Ordering {
    match (a, b) {
        (Chunk::Digits(x), Chunk::Digits(y)) => {
            let x = x.trim_start_matches('0');
            let y = y.trim_start_matches('0');
            x.len().cmp(&y.len()).then_with(|| x.cmp(y))
        }
        (Chunk::Digits(_), Chunk::Text(_)) => Ordering::Less,
        (Chunk::Text(_), Chunk::Digits(_)) => Ordering::Greater,
        (Chunk::Text(x), Chunk::Text(y)) => {
            x.chars().flat_map(char::to_lowercase).cmp(y.chars().flat_map(char::to_lowercase))
        }
    }
}

// Case pattern of the non-digit characters, so zero padding never shifts
// which letters get paired up.
fn case_pattern(s: &str) -> impl Iterator<Item = bool> + '_ {
    s.chars().filter(|c| !c.is_ascii_digit()).map(char::is_uppercase)
}

fn cmp_case(a: &str, b: &str) -> Ordering {
    case_pattern(a).cmp(case_pattern(b))
}

/// Total order: natural chunks, then case, then raw bytes.
pub fn natural_cmp(a: &str, b: &str) -> Ordering {
    let mut left = chunks(a);
    let mut right = chunks(b);
    loop {
        match (left.next(), right.next()) {
            (None, None) => break,
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (Some(x), Some(y)) => match cmp_chunk(x, y) {
                Ordering::Equal => {}
                other => return other,
            },
        }
    }
    cmp_case(a, b).then_with(|| a.cmp(b))
}
