//! Rune-keyed prefix tree with longest-prefix lookup.

use std::collections::HashMap;

/// One node per arena slot; children are direct-addressed for ASCII with an
/// overflow map for everything else. Index 0 is the root, so 0 doubles as
/// the "no child" marker.
struct TrieNode<T> {
    terminal: Option<T>,
    ascii: [u32; 128],
    other: HashMap<char, u32>,
}

impl<T> TrieNode<T> {
    fn new() -> Self {
        Self {
            terminal: None,
            ascii: [0; 128],
            other: HashMap::new(),
        }
    }
}

pub struct Trie<T> {
    nodes: Vec<TrieNode<T>>,
}

impl<T: Copy> Trie<T> {
    pub fn new() -> Self {
        Self {
            nodes: vec![TrieNode::new()],
        }
    }

    pub fn from_entries(entries: &[(&str, T)]) -> Self {
        let mut trie = Trie::new();
        for (key, value) in entries {
            trie.insert(key, *value);
        }
        trie
    }

    pub fn insert(&mut self, key: &str, value: T) {
        let mut idx = 0;
        for ch in key.chars() {
            idx = match self.child(idx, ch) {
                Some(next) => next,
                None => {
                    self.nodes.push(TrieNode::new());
                    let next = self.nodes.len() - 1;
                    self.link(idx, ch, next as u32);
                    next
                }
            };
        }
        self.nodes[idx].terminal = Some(value);
    }

    /// The deepest terminal on the path along `input`, with its byte width.
    /// `(None, 0)` when not even one rune matches.
    pub fn longest_match(&self, input: &str) -> (Option<T>, usize) {
        let mut idx = 0;
        let mut best = None;
        let mut width = 0;
        for (pos, ch) in input.char_indices() {
            match self.child(idx, ch) {
                Some(next) => {
                    idx = next;
                    if let Some(value) = self.nodes[idx].terminal {
                        best = Some(value);
                        width = pos + ch.len_utf8();
                    }
                }
                None => break,
            }
        }
        (best, width)
    }

    fn child(&self, idx: usize, ch: char) -> Option<usize> {
        let node = &self.nodes[idx];
        let next = if (ch as u32) < 128 {
            node.ascii[ch as usize]
        } else {
            node.other.get(&ch).copied().unwrap_or(0)
        };
        if next == 0 {
            None
        } else {
            Some(next as usize)
        }
    }

    fn link(&mut self, idx: usize, ch: char, next: u32) {
        let node = &mut self.nodes[idx];
        if (ch as u32) < 128 {
            node.ascii[ch as usize] = next;
        } else {
            node.other.insert(ch, next);
        }
    }
}

impl<T: Copy> Default for Trie<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Trie<u32> {
        Trie::from_entries(&[("and", 1), ("a", 2), ("android", 3), ("@else if", 4), ("ಠ_ಠ", 5)])
    }

    #[test]
    fn longest_match_wins() {
        let trie = sample();
        assert_eq!(trie.longest_match("a"), (Some(2), 1));
        assert_eq!(trie.longest_match("an"), (Some(2), 1));
        assert_eq!(trie.longest_match("and"), (Some(1), 3));
        assert_eq!(trie.longest_match("andro"), (Some(1), 3));
        assert_eq!(trie.longest_match("android killer"), (Some(3), 7));
    }

    #[test]
    fn no_match() {
        let trie = sample();
        assert_eq!(trie.longest_match(""), (None, 0));
        assert_eq!(trie.longest_match("x"), (None, 0));
        assert_eq!(trie.longest_match("ಠ"), (None, 0));
    }

    #[test]
    fn keys_may_contain_spaces() {
        let trie = sample();
        assert_eq!(trie.longest_match("@else if x"), (Some(4), 8));
        assert_eq!(trie.longest_match("@else"), (None, 0));
    }

    #[test]
    fn widths_are_bytes() {
        let trie = sample();
        assert_eq!(trie.longest_match("ಠ_ಠ!"), (Some(5), 7));
    }
}
