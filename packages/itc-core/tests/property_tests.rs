use proptest::prelude::*;
use itc_core::{Event, Stamp};

#[derive(Clone, Debug)]
enum Step {
    Fork(usize),
    Advance(usize),
    Join(usize, usize),
}

fn step() -> impl Strategy<Value = Step> {
    prop_oneof![
        1 => any::<usize>().prop_map(Step::Fork),
        3 => any::<usize>().prop_map(Step::Advance),
        1 => (any::<usize>(), any::<usize>()).prop_map(|(a, b)| Step::Join(a, b)),
    ]
}

/// Replay a history from the seed. Returns the live lineages (pairwise disjoint ownership) and
/// every stamp that was ever produced.
fn replay(steps: &[Step]) -> (Vec<Stamp>, Vec<Stamp>) {
    let mut live = vec![Stamp::seed()];
    let mut seen = vec![Stamp::seed()];
    for step in steps {
        match *step {
            Step::Fork(i) => {
                let (a, b) = live.swap_remove(i % live.len()).fork();
                seen.push(a.clone());
                seen.push(b.clone());
                live.push(a);
                live.push(b);
            }
            Step::Advance(i) => {
                let i = i % live.len();
                live[i] = live[i].advance().unwrap();
                seen.push(live[i].clone());
            }
            Step::Join(i, j) => {
                if live.len() < 2 {
                    continue;
                }
                let a = live.swap_remove(i % live.len());
                let b = live.swap_remove(j % live.len());
                let joined = a.join(&b).unwrap();
                seen.push(joined.clone());
                live.push(joined);
            }
        }
    }
    (live, seen)
}

fn arb_event() -> impl Strategy<Value = Event> {
    let leaf = (0u64..6).prop_map(Event::leaf);
    leaf.prop_recursive(4, 24, 2, |inner| {
        (0u64..6, inner.clone(), inner).prop_map(|(v, l, r)| Event::node(v, l, r))
    })
}

fn arb_canonical_event() -> impl Strategy<Value = Event> {
    arb_event().prop_map(|e| e.normalized().unwrap())
}

proptest! {
    #[test]
    fn every_produced_stamp_is_canonical(steps in prop::collection::vec(step(), 0..24)) {
        let (_, seen) = replay(&steps);
        for stamp in &seen {
            prop_assert!(stamp.is_canonical(), "{stamp} is not canonical");
        }
    }

    #[test]
    fn advance_is_strictly_monotonic(steps in prop::collection::vec(step(), 0..24)) {
        let (live, _) = replay(&steps);
        for stamp in &live {
            let next = stamp.advance().unwrap();
            prop_assert!(stamp.leq(&next));
            prop_assert!(!next.leq(stamp));
            prop_assert_eq!(next.id(), stamp.id());
        }
    }

    #[test]
    fn join_of_fork_is_identity(steps in prop::collection::vec(step(), 0..24)) {
        let (live, _) = replay(&steps);
        for stamp in &live {
            let (a, b) = stamp.fork();
            prop_assert_eq!(&a.join(&b).unwrap(), stamp);
            prop_assert_eq!(&b.join(&a).unwrap(), stamp);
        }
    }

    #[test]
    fn join_is_a_commutative_upper_bound(steps in prop::collection::vec(step(), 0..24)) {
        let (live, _) = replay(&steps);
        for (i, a) in live.iter().enumerate() {
            for b in &live[i + 1..] {
                let ab = a.join(b).unwrap();
                prop_assert_eq!(&ab, &b.join(a).unwrap());
                prop_assert!(a.leq(&ab));
                prop_assert!(b.leq(&ab));
            }
        }
    }

    #[test]
    fn join_is_associative(steps in prop::collection::vec(step(), 0..24)) {
        let (live, _) = replay(&steps);
        if live.len() >= 3 {
            let (a, b, c) = (&live[0], &live[1], &live[2]);
            let left = a.join(b).unwrap().join(c).unwrap();
            let right = a.join(&b.join(c).unwrap()).unwrap();
            prop_assert_eq!(left, right);
        }
    }

    #[test]
    fn leq_is_a_partial_order(steps in prop::collection::vec(step(), 0..16)) {
        let (_, seen) = replay(&steps);
        for a in &seen {
            prop_assert!(a.leq(a));
            for b in &seen {
                if a.leq(b) && b.leq(a) {
                    prop_assert_eq!(a.event(), b.event());
                }
                if !a.leq(b) {
                    continue;
                }
                for c in &seen {
                    if b.leq(c) {
                        prop_assert!(a.leq(c));
                    }
                }
            }
        }
    }

    #[test]
    fn normalization_is_idempotent_and_preserves_bounds(e in arb_event()) {
        let once = e.normalized().unwrap();
        prop_assert!(once.is_canonical());
        prop_assert_eq!(&once.normalized().unwrap(), &once);
        prop_assert_eq!(&once.normalize().unwrap(), &once);
        prop_assert_eq!(once.min().unwrap(), e.min().unwrap());
        prop_assert_eq!(once.max().unwrap(), e.max().unwrap());
    }

    #[test]
    fn event_join_laws(
        a in arb_canonical_event(),
        b in arb_canonical_event(),
        c in arb_canonical_event(),
    ) {
        let ab = a.join(&b).unwrap();
        prop_assert!(ab.is_canonical());
        prop_assert!(a.leq(&ab));
        prop_assert!(b.leq(&ab));
        prop_assert_eq!(&ab, &b.join(&a).unwrap());
        prop_assert_eq!(ab.join(&c).unwrap(), a.join(&b.join(&c).unwrap()).unwrap());
        prop_assert_eq!(&a.join(&a).unwrap(), &a);
        // The join is the least bound: anything above both is above the join.
        if a.leq(&c) && b.leq(&c) {
            prop_assert!(ab.leq(&c));
        }
    }
}
