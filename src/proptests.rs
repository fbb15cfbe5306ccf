use super::*;

use proptest::prelude::*;
use proptest_derive::Arbitrary;
use std::collections::BTreeSet;

fn validate_tree(t: &CritbitTree) {
    let issues = t.verify_integrity();
    assert!(issues.is_empty(), "integrity issues: {issues:#?}");
}

fn key_strategy() -> impl Strategy<Value = Vec<u8>> + Clone {
    // Keys differing only by trailing 0x00 bytes route identically, so keys
    // never end in 0x00; interior zeros stay. The narrow alphabet forces
    // shared prefixes and prefix-of-key relationships.
    prop_oneof![
        prop::collection::vec(0u8..=3, 0..=6),
        prop::collection::vec(any::<u8>(), 0..=24),
    ]
    .prop_map(|mut key| {
        while key.last() == Some(&0) {
            key.pop();
        }
        key
    })
}

#[derive(Clone, Debug, Arbitrary)]
enum Op {
    #[proptest(weight = 50)]
    Insert(#[proptest(strategy = "key_strategy()")] Vec<u8>),
    #[proptest(weight = 25)]
    Delete(#[proptest(strategy = "key_strategy()")] Vec<u8>),
    #[proptest(weight = 20)]
    Contains(#[proptest(strategy = "key_strategy()")] Vec<u8>),
    #[proptest(weight = 5)]
    Prefix(#[proptest(strategy = "prop::collection::vec(0u8..=3, 0..=3)")] Vec<u8>),
}

fn model_prefix(m: &BTreeSet<Vec<u8>>, prefix: &[u8]) -> Vec<Vec<u8>> {
    m.iter().filter(|k| k.starts_with(prefix)).cloned().collect()
}

fn tree_prefix(t: &CritbitTree, prefix: &[u8]) -> Vec<Vec<u8>> {
    let mut out = Vec::new();
    let complete = t.iterate(prefix, |key| {
        out.push(key.to_vec());
        true
    });
    assert!(complete);
    out
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(192))]

    #[test]
    fn prop_equivalence(ops in prop::collection::vec(any::<Op>(), 0..=1000)) {
        let mut t = CritbitTree::new();
        let mut m: BTreeSet<Vec<u8>> = BTreeSet::new();

        for op in ops {
            match op {
                Op::Insert(key) => {
                    prop_assert_eq!(t.insert(&key), m.insert(key));
                }
                Op::Delete(key) => {
                    prop_assert_eq!(t.delete(&key), m.remove(&key));
                }
                Op::Contains(key) => {
                    prop_assert_eq!(t.contains(&key), m.contains(&key));
                }
                Op::Prefix(prefix) => {
                    prop_assert_eq!(tree_prefix(&t, &prefix), model_prefix(&m, &prefix));
                }
            }

            prop_assert_eq!(t.len(), m.len());
        }

        validate_tree(&t);
        let got: Vec<Vec<u8>> = t.keys().iter().map(|k| k.to_vec()).collect();
        let expected: Vec<Vec<u8>> = m.iter().cloned().collect();
        prop_assert_eq!(got, expected);
    }

    #[test]
    fn prop_prefix_iteration(
        keys in prop::collection::btree_set(key_strategy(), 0..=64),
        prefix in prop::collection::vec(0u8..=3, 0..=4),
    ) {
        let t: CritbitTree = keys.iter().collect();
        prop_assert_eq!(tree_prefix(&t, &prefix), model_prefix(&keys, &prefix));

        // Every prefix of every key, including the key itself.
        for key in &keys {
            for end in 0..=key.len() {
                let p = &key[..end];
                prop_assert_eq!(tree_prefix(&t, p), model_prefix(&keys, p));
            }
        }
    }

    #[test]
    fn prop_early_abort(
        keys in prop::collection::btree_set(key_strategy(), 1..=64),
        stop_at in any::<prop::sample::Index>(),
    ) {
        let t: CritbitTree = keys.iter().collect();
        let stop = stop_at.index(keys.len());

        let mut seen = Vec::new();
        let complete = t.iterate(b"", |key| {
            seen.push(key.to_vec());
            seen.len() <= stop
        });

        prop_assert!(!complete);
        let expected: Vec<Vec<u8>> = keys.iter().take(stop + 1).cloned().collect();
        prop_assert_eq!(seen, expected);
    }

    #[test]
    fn prop_copy_independence(
        keys in prop::collection::btree_set(key_strategy(), 0..=64),
        extra in prop::collection::vec(key_strategy(), 0..=32),
    ) {
        let mut orig: CritbitTree = keys.iter().collect();
        let before = orig.keys();
        let mut copy = orig.copy();
        validate_tree(&copy);

        for key in &extra {
            if !copy.delete(key) {
                copy.insert(key);
            }
        }
        prop_assert_eq!(orig.keys(), before.clone());
        prop_assert_eq!(orig.len(), keys.len());

        let copied = copy.keys();
        for key in &keys {
            orig.delete(key);
        }
        prop_assert!(orig.is_empty());
        prop_assert_eq!(copy.keys(), copied);
        validate_tree(&copy);
    }
}

/// Calls `f` with every ordering of `keys`, permuting a scratch copy in place.
fn each_ordering(keys: &[Vec<u8>], mut f: impl FnMut(&[Vec<u8>])) {
    fn permute(keys: &mut [Vec<u8>], fixed: usize, f: &mut impl FnMut(&[Vec<u8>])) {
        if fixed == keys.len() {
            f(keys);
            return;
        }
        for i in fixed..keys.len() {
            keys.swap(fixed, i);
            permute(keys, fixed + 1, f);
            keys.swap(fixed, i);
        }
    }

    let mut scratch = keys.to_vec();
    permute(&mut scratch, 0, &mut f);
}

fn small_set() -> Vec<Vec<u8>> {
    vec![
        b"".to_vec(),
        b"a".to_vec(),
        b"b".to_vec(),
        b"aa".to_vec(),
        b"ab".to_vec(),
        b"ba".to_vec(),
        b"a\0a".to_vec(),
    ]
}

#[test]
fn exhaustive_insert_order_small_set() {
    let keys = small_set();
    let mut expected = keys.clone();
    expected.sort();

    each_ordering(&keys, |order| {
        let mut t = CritbitTree::new();
        for k in order {
            assert!(t.insert(k));
        }
        for k in order {
            assert!(!t.insert(k));
        }

        validate_tree(&t);
        let got: Vec<Vec<u8>> = t.keys().iter().map(|k| k.to_vec()).collect();
        assert_eq!(got, expected);
    });
}

#[test]
fn exhaustive_delete_order_small_set() {
    let keys = small_set();

    // Insert in a fixed order, then delete in all permutations.
    let base: CritbitTree = keys.iter().collect();

    each_ordering(&keys, |order| {
        let mut t = base.copy();
        let mut m: BTreeSet<Vec<u8>> = keys.iter().cloned().collect();

        for k in order {
            assert_eq!(t.delete(k), m.remove(k));
            assert!(!t.delete(k));
            assert_eq!(t.len(), m.len());
            validate_tree(&t);
        }
        assert_eq!(t.len(), 0);
        assert!(t.root.is_none());
    });
    assert_eq!(base.len(), keys.len());
}
