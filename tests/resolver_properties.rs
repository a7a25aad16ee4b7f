use resolve_hits::core::segment::{any_interaction, are_overlapping, overlap_by};
use resolve_hits::core::Boundary;
use resolve_hits::{resolve, CandidateHit, Score, SegmentRun};

/// Small deterministic generator so failures are reproducible
struct Lcg(u64);

impl Lcg {
    fn next(&mut self) -> u64 {
        self.0 = self
            .0
            .wrapping_mul(6_364_136_223_846_793_005)
            .wrapping_add(1_442_695_040_888_963_407);
        self.0 >> 33
    }

    fn below(&mut self, n: u64) -> u32 {
        u32::try_from(self.next() % n).unwrap()
    }

    /// Fisher-Yates shuffle
    fn shuffle<T>(&mut self, items: &mut [T]) {
        for i in (1..items.len()).rev() {
            let j = self.below(i as u64 + 1) as usize;
            items.swap(i, j);
        }
    }
}

fn contiguous_hits(rng: &mut Lcg, count: usize) -> Vec<CandidateHit> {
    (0..count)
        .map(|i| {
            let first = rng.below(200);
            let last = first + rng.below(40);
            let score = f64::from(1 + rng.below(50));
            let run = SegmentRun::from_residue_ranges(&[(first, last)]).unwrap();
            CandidateHit::new(run, Score::new(score), format!("hit{i}"))
        })
        .collect()
}

fn mixed_hits(rng: &mut Lcg, count: usize) -> Vec<CandidateHit> {
    (0..count)
        .map(|i| {
            let first = rng.below(200);
            let mid = first + 5 + rng.below(20);
            let ranges = if rng.below(3) == 0 {
                let resume = mid + 5 + rng.below(30);
                vec![(first, mid), (resume, resume + 5 + rng.below(20))]
            } else {
                vec![(first, mid)]
            };
            let run = SegmentRun::from_residue_ranges(&ranges).unwrap();
            let score = f64::from(1 + rng.below(50));
            CandidateHit::new(run, Score::new(score), format!("hit{i}"))
        })
        .collect()
}

fn labels(hits: &[CandidateHit]) -> Vec<String> {
    hits.iter().map(|h| h.label().to_string()).collect()
}

/// Whether `inner` lies wholly inside one of the gaps of `outer`
fn nested_in_gap(inner: &SegmentRun, outer: &SegmentRun) -> bool {
    outer
        .fragments()
        .iter()
        .any(|gap| inner.start() >= gap.start() && inner.stop() <= gap.stop())
}

/// Two hits may be combined if they share no residue and either their spans are
/// disjoint or one sits inside a gap of the other
fn combinable(a: &SegmentRun, b: &SegmentRun) -> bool {
    !are_overlapping(a, b)
        && (!any_interaction(a, b) || nested_in_gap(a, b) || nested_in_gap(b, a))
}

/// Highest total over every pairwise-compatible subset
fn brute_force_best(
    hits: &[CandidateHit],
    compatible: impl Fn(&SegmentRun, &SegmentRun) -> bool,
) -> f64 {
    let n = hits.len();
    let mut best = 0.0;
    for mask in 0u32..(1 << n) {
        let chosen: Vec<&CandidateHit> = (0..n)
            .filter(|i| mask & (1 << i) != 0)
            .map(|i| &hits[i])
            .collect();
        let allowed = chosen
            .iter()
            .enumerate()
            .all(|(i, a)| chosen[i + 1..].iter().all(|b| compatible(a.run(), b.run())));
        if allowed {
            let total: f64 = chosen.iter().map(|h| h.score().value()).sum();
            if total > best {
                best = total;
            }
        }
    }
    best
}

#[test]
fn test_result_never_contains_overlapping_hits() {
    let mut rng = Lcg(7);
    for _ in 0..200 {
        let hits = mixed_hits(&mut rng, 12);
        let result = resolve(&hits);
        let chosen = result.architecture().hits();
        for (i, a) in chosen.iter().enumerate() {
            for b in &chosen[i + 1..] {
                assert!(
                    !are_overlapping(a.run(), b.run()),
                    "{a} overlaps {b} in {:?}",
                    labels(chosen)
                );
            }
        }
        let total: Score = chosen.iter().map(CandidateHit::score).sum();
        assert_eq!(total, result.score());
    }
}

#[test]
fn test_resolution_is_optimal_for_contiguous_hits() {
    let mut rng = Lcg(11);
    for _ in 0..100 {
        let hits = contiguous_hits(&mut rng, 10);
        let result = resolve(&hits);
        let best = brute_force_best(&hits, |a, b| !are_overlapping(a, b));
        assert_eq!(result.score().value(), best);
    }
}

#[test]
fn test_resolution_is_optimal_with_nested_discontiguous_hits() {
    let mut rng = Lcg(47);
    for _ in 0..300 {
        let hits = mixed_hits(&mut rng, 10);
        let result = resolve(&hits);
        assert_eq!(
            result.score().value(),
            brute_force_best(&hits, combinable),
            "{:?}",
            hits.iter().map(ToString::to_string).collect::<Vec<_>>()
        );

        let chosen = result.architecture().hits();
        for (i, a) in chosen.iter().enumerate() {
            for b in &chosen[i + 1..] {
                assert!(combinable(a.run(), b.run()), "{a} cannot sit with {b}");
            }
        }
    }
}

#[test]
fn test_resolution_ignores_input_order() {
    let mut rng = Lcg(23);
    for _ in 0..100 {
        let hits = mixed_hits(&mut rng, 10);
        let expected = resolve(&hits);

        let mut reversed = hits.clone();
        reversed.reverse();
        let mut permutations = vec![reversed];
        for _ in 0..5 {
            let mut shuffled = hits.clone();
            rng.shuffle(&mut shuffled);
            permutations.push(shuffled);
        }

        for permuted in permutations {
            let result = resolve(&permuted);
            assert_eq!(result.score(), expected.score());
            assert_eq!(
                labels(result.architecture().hits()),
                labels(expected.architecture().hits())
            );
        }
    }
}

#[test]
fn test_disjoint_hits_are_all_kept() {
    // [0,5) and [8,12)
    let hits = vec![
        CandidateHit::new("0-4".parse().unwrap(), Score::new(3.0), "a"),
        CandidateHit::new("8-11".parse().unwrap(), Score::new(4.0), "b"),
    ];
    let result = resolve(&hits);
    assert_eq!(result.score(), Score::new(7.0));
    assert_eq!(labels(result.architecture().hits()), vec!["a", "b"]);
}

#[test]
fn test_overlap_measures() {
    let mut rng = Lcg(31);
    for _ in 0..200 {
        let hits = mixed_hits(&mut rng, 2);
        let (a, b) = (hits[0].run(), hits[1].run());

        assert_eq!(overlap_by(a, b), overlap_by(b, a));
        assert_eq!(overlap_by(a, a), a.total_length());
        assert_eq!(are_overlapping(a, b), overlap_by(a, b) > 0);
        if !any_interaction(a, b) {
            assert_eq!(overlap_by(a, b), 0);
        }
    }
}

#[test]
fn test_boundary_before_and_after_agree() {
    for residue in [1, 2, 10, 1000, u32::MAX - 1] {
        assert_eq!(Boundary::before(residue), Boundary::after(residue - 1));
    }
    assert!(Boundary::start_of_sequence() < Boundary::after(0));
}
