//! Boolean set operations over ascending posting lists.
//!
//! Every operation walks its inputs with forward cursors and returns a new
//! ascending list with freshly built skips.

use std::cmp::Ordering;

use crate::postings::PostingList;

/// Documents present in both lists.
pub fn intersect(a: &PostingList, b: &PostingList) -> PostingList {
    let mut out = Vec::with_capacity(a.len().min(b.len()));
    let (mut p1, mut p2) = (a.cursor(), b.cursor());
    while let (Some(x), Some(y)) = (p1.doc_id(), p2.doc_id()) {
        match x.cmp(&y) {
            Ordering::Equal => {
                out.push(x);
                p1.advance();
                p2.advance();
            }
            Ordering::Less => p1.advance_towards(y),
            Ordering::Greater => p2.advance_towards(x),
        }
    }
    PostingList::from_sorted(out)
}

/// Documents present in either list.
pub fn union(a: &PostingList, b: &PostingList) -> PostingList {
    let mut out = Vec::with_capacity(a.len() + b.len());
    let (mut p1, mut p2) = (a.cursor(), b.cursor());
    loop {
        match (p1.doc_id(), p2.doc_id()) {
            (Some(x), Some(y)) => match x.cmp(&y) {
                Ordering::Less => {
                    out.push(x);
                    p1.advance();
                }
                Ordering::Greater => {
                    out.push(y);
                    p2.advance();
                }
                Ordering::Equal => {
                    out.push(x);
                    p1.advance();
                    p2.advance();
                }
            },
            (Some(_), None) => {
                out.extend_from_slice(p1.remaining());
                break;
            }
            (None, Some(_)) => {
                out.extend_from_slice(p2.remaining());
                break;
            }
            (None, None) => break,
        }
    }
    PostingList::from_sorted(out)
}

/// Documents of `universe` absent from `list`. `list` is expected to be a
/// subset of `universe`; stray ids in it are ignored.
pub fn negate(list: &PostingList, universe: &PostingList) -> PostingList {
    let mut out = Vec::with_capacity(universe.len().saturating_sub(list.len()));
    let mut p = list.cursor();
    for &u in universe {
        while matches!(p.doc_id(), Some(x) if x < u) {
            p.advance();
        }
        if p.doc_id() == Some(u) {
            p.advance();
        } else {
            out.push(u);
        }
    }
    PostingList::from_sorted(out)
}

/// Documents of `a` absent from `b`.
pub fn and_not(a: &PostingList, b: &PostingList) -> PostingList {
    let mut out = Vec::with_capacity(a.len());
    let (mut p1, mut p2) = (a.cursor(), b.cursor());
    while let Some(x) = p1.doc_id() {
        let Some(y) = p2.doc_id() else {
            out.extend_from_slice(p1.remaining());
            break;
        };
        match x.cmp(&y) {
            Ordering::Less => match p1.skip_doc_id() {
                // Everything up to the skip target lies strictly between the
                // last id consumed from `b` and `y`.
                Some(s) if s < y => {
                    out.extend_from_slice(p1.run_to_skip());
                    p1.skip();
                }
                _ => {
                    out.push(x);
                    p1.advance();
                }
            },
            Ordering::Equal => {
                p1.advance();
                p2.advance();
            }
            Ordering::Greater => p2.advance_towards(x),
        }
    }
    PostingList::from_sorted(out)
}
