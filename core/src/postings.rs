//! Skip-augmented posting lists.
//!
//! A list is a contiguous ascending array of document ids. Skip links are not
//! stored: with spacing `s`, position `i` links to `i + s` whenever `i` is a
//! multiple of `s` and `i + s` is still in range.

use std::fmt;

use crate::index::DocId;

/// `round(sqrt(len))`, the spacing used for a list of `len` postings.
pub fn skip_spacing(len: usize) -> usize {
    (len as f64).sqrt().round() as usize
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PostingList {
    ids: Vec<DocId>,
    spacing: usize,
}

impl PostingList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap an ascending, duplicate-free id vector and build its skips.
    pub fn from_sorted(ids: Vec<DocId>) -> Self {
        debug_assert!(ids.windows(2).all(|w| w[0] < w[1]), "postings must be strictly ascending");
        let spacing = skip_spacing(ids.len());
        Self { ids, spacing }
    }

    /// Wrap ids read back from disk together with their stored spacing.
    pub fn with_spacing(ids: Vec<DocId>, spacing: usize) -> Self {
        Self { ids, spacing }
    }

    /// Append a document id. Ids must arrive in ascending order; repeating
    /// the last id is a no-op.
    pub fn append(&mut self, doc_id: DocId) {
        match self.ids.last() {
            Some(&last) if last == doc_id => {}
            Some(&last) => {
                debug_assert!(last < doc_id, "append out of order: {doc_id} after {last}");
                self.ids.push(doc_id);
            }
            None => self.ids.push(doc_id),
        }
    }

    /// Fix the skip spacing once the list is complete.
    pub fn build_skips(&mut self, spacing: usize) {
        self.spacing = spacing;
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn spacing(&self) -> usize {
        self.spacing
    }

    pub fn as_slice(&self) -> &[DocId] {
        &self.ids
    }

    pub fn into_vec(self) -> Vec<DocId> {
        self.ids
    }

    pub fn iter(&self) -> std::slice::Iter<'_, DocId> {
        self.ids.iter()
    }

    pub fn cursor(&self) -> Cursor<'_> {
        Cursor { list: self, pos: 0 }
    }

    /// Target index of the skip link leaving `pos`, if there is one.
    pub fn skip_target(&self, pos: usize) -> Option<usize> {
        let s = self.spacing;
        if s == 0 || pos % s != 0 {
            return None;
        }
        let target = pos + s;
        (target < self.ids.len()).then_some(target)
    }

    /// All skip links as `(from, to)` index pairs.
    pub fn skips(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        let step = self.spacing.max(1);
        (0..self.ids.len())
            .step_by(step)
            .filter_map(move |i| self.skip_target(i).map(|t| (i, t)))
    }
}

impl<'a> IntoIterator for &'a PostingList {
    type Item = &'a DocId;
    type IntoIter = std::slice::Iter<'a, DocId>;

    fn into_iter(self) -> Self::IntoIter {
        self.ids.iter()
    }
}

/// Space-separated ids, the representation used in result lines.
impl fmt::Display for PostingList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for id in &self.ids {
            if !first {
                f.write_str(" ")?;
            }
            write!(f, "{id}")?;
            first = false;
        }
        Ok(())
    }
}

/// Read-only forward position within a posting list.
#[derive(Debug, Clone, Copy)]
pub struct Cursor<'a> {
    list: &'a PostingList,
    pos: usize,
}

impl<'a> Cursor<'a> {
    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn at_end(&self) -> bool {
        self.pos >= self.list.ids.len()
    }

    pub fn doc_id(&self) -> Option<DocId> {
        self.list.ids.get(self.pos).copied()
    }

    pub fn advance(&mut self) {
        if !self.at_end() {
            self.pos += 1;
        }
    }

    pub fn has_skip(&self) -> bool {
        self.list.skip_target(self.pos).is_some()
    }

    /// Document id at the far end of the current skip link.
    pub fn skip_doc_id(&self) -> Option<DocId> {
        self.list.skip_target(self.pos).map(|t| self.list.ids[t])
    }

    /// Follow the skip link at the current position. Returns false, without
    /// moving, when there is none.
    pub fn skip(&mut self) -> bool {
        match self.list.skip_target(self.pos) {
            Some(t) => {
                self.pos = t;
                true
            }
            None => false,
        }
    }

    /// Move forward towards `target` without passing it: follow skip links
    /// while they land at or before `target`, otherwise take one step.
    pub fn advance_towards(&mut self, target: DocId) {
        let mut skipped = false;
        while matches!(self.skip_doc_id(), Some(d) if d <= target) {
            self.skip();
            skipped = true;
        }
        if !skipped {
            self.advance();
        }
    }

    /// Ids covered by the current skip link, excluding its target.
    pub fn run_to_skip(&self) -> &'a [DocId] {
        match self.list.skip_target(self.pos) {
            Some(t) => &self.list.ids[self.pos..t],
            None => &[],
        }
    }

    pub fn remaining(&self) -> &'a [DocId] {
        &self.list.ids[self.pos.min(self.list.ids.len())..]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spacing_is_rounded_square_root() {
        assert_eq!(skip_spacing(0), 0);
        assert_eq!(skip_spacing(1), 1);
        assert_eq!(skip_spacing(2), 1);
        assert_eq!(skip_spacing(3), 2);
        assert_eq!(skip_spacing(9), 3);
        assert_eq!(skip_spacing(12), 3);
        assert_eq!(skip_spacing(13), 4);
    }

    #[test]
    fn skip_links_point_forward_and_stay_in_bounds() {
        for n in 0..60u32 {
            let list = PostingList::from_sorted((0..n).map(|i| i * 3).collect());
            for (from, to) in list.skips() {
                assert!(to > from);
                assert!(to < list.len());
                assert_eq!(to - from, list.spacing());
            }
        }
    }

    #[test]
    fn short_lists_have_no_skips() {
        assert_eq!(PostingList::from_sorted(vec![]).skips().count(), 0);
        assert_eq!(PostingList::from_sorted(vec![7]).skips().count(), 0);
    }

    #[test]
    fn nine_postings_skip_every_three() {
        let list = PostingList::from_sorted((1..=9).collect());
        let links: Vec<_> = list.skips().collect();
        assert_eq!(links, vec![(0, 3), (3, 6)]);
    }

    #[test]
    fn append_drops_repeats() {
        let mut list = PostingList::new();
        for id in [1, 1, 4, 4, 9] {
            list.append(id);
        }
        list.build_skips(skip_spacing(list.len()));
        assert_eq!(list.as_slice(), &[1, 4, 9]);
        assert_eq!(list.spacing(), 2);
    }

    #[test]
    fn cursor_walks_and_skips() {
        let list = PostingList::from_sorted((10..19).collect());
        let mut c = list.cursor();
        assert_eq!(c.doc_id(), Some(10));
        assert!(c.has_skip());
        assert_eq!(c.run_to_skip(), &[10, 11, 12]);
        assert!(c.skip());
        assert_eq!(c.doc_id(), Some(13));
        c.advance();
        assert!(!c.has_skip());
        assert!(!c.skip());
        assert_eq!(c.doc_id(), Some(14));
        c.advance_towards(17);
        assert_eq!(c.doc_id(), Some(15));
        c.advance_towards(100);
        assert_eq!(c.doc_id(), Some(16));
        while !c.at_end() {
            c.advance();
        }
        assert_eq!(c.doc_id(), None);
        assert!(c.remaining().is_empty());
    }

    #[test]
    fn displays_space_separated() {
        assert_eq!(PostingList::from_sorted(vec![1, 2, 30]).to_string(), "1 2 30");
        assert_eq!(PostingList::new().to_string(), "");
    }
}
