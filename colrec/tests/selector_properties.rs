use std::collections::BTreeSet;
use std::f64::consts::PI;

use colrec::dijet::{DijetPairSelector, Rejection, SelectionResult};
use colrec::event::Jet;
use proptest::prelude::*;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

fn direction(cos_theta: f64, phi: f64) -> [f64; 3] {
    let sin_theta = (1. - cos_theta * cos_theta).sqrt();
    [sin_theta * phi.cos(), sin_theta * phi.sin(), cos_theta]
}

fn massless(e: f64, d: [f64; 3]) -> Jet {
    Jet::from_components(e, e * d[0], e * d[1], e * d[2])
}

fn isotropic_jets(rng: &mut StdRng, n: usize) -> Vec<Jet> {
    (0..n)
        .map(|_| {
            let d = direction(rng.gen_range(-1.0..1.0), rng.gen_range(0.0..2. * PI));
            massless(rng.gen_range(5.0..100.0), d)
        })
        .collect()
}

/// Two narrow jet pairs around roughly back-to-back axes, in shuffled order.
/// Most of these pass the topology cuts.
fn two_pair_jets(rng: &mut StdRng) -> Vec<Jet> {
    let axis_phi: f64 = rng.gen_range(0.0..2. * PI);
    let axis_cos: f64 = rng.gen_range(-0.5..0.5);
    let mut jets = Vec::with_capacity(4);
    let tilts: [(f64, f64); 2] = [(1., 0.), (-1., rng.gen_range(-0.4..0.4))];
    for (sign, tilt) in tilts.iter() {
        let opening: f64 = rng.gen_range(0.3..0.9);
        for side in [-1f64, 1.].iter() {
            let d = direction(
                (sign * axis_cos + side * 0.5 * opening * tilt).max(-1.).min(1.),
                axis_phi + if *sign > 0. { 0. } else { PI } + side * opening,
            );
            jets.push(massless(rng.gen_range(10.0..80.0), d));
        }
    }
    jets.shuffle(rng);
    jets
}

fn permutations4() -> Vec<[usize; 4]> {
    let mut perms = Vec::with_capacity(24);
    for a in 0..4 {
        for b in 0..4 {
            for c in 0..4 {
                for d in 0..4 {
                    let set: BTreeSet<usize> = [a, b, c, d].iter().copied().collect();
                    if set.len() == 4 {
                        perms.push([a, b, c, d]);
                    }
                }
            }
        }
    }
    perms
}

fn sorted_pair(p: (usize, usize)) -> (usize, usize) {
    (p.0.min(p.1), p.0.max(p.1))
}

/// Pairing expressed in the original jet labels, independent of pair order.
fn relabelled(result: &SelectionResult, perm: &[usize; 4]) -> Option<BTreeSet<(usize, usize)>> {
    result.accepted().map(|p| {
        [p.pair_a, p.pair_b]
            .iter()
            .map(|&(i, j)| sorted_pair((perm[i], perm[j])))
            .collect()
    })
}

fn sorted_masses(result: &SelectionResult) -> Option<[f64; 2]> {
    result.accepted().map(|p| {
        let mut m = p.masses;
        m.sort_by(|a, b| a.partial_cmp(b).unwrap());
        m
    })
}

fn check_permutation_symmetry(jets: &[Jet]) -> Result<(), TestCaseError> {
    let selector = DijetPairSelector::default();
    let reference = selector.select(jets);
    let identity = [0, 1, 2, 3];

    for perm in permutations4() {
        let permuted: Vec<Jet> = perm.iter().map(|&k| jets[k].clone()).collect();
        let result = selector.select(&permuted);

        prop_assert_eq!(result.rejection(), reference.rejection());
        prop_assert_eq!(relabelled(&result, &perm), relabelled(&reference, &identity));
        if let (Some(a), Some(b)) = (sorted_masses(&result), sorted_masses(&reference)) {
            prop_assert!((a[0] - b[0]).abs() < 1e-9 && (a[1] - b[1]).abs() < 1e-9);
        }
    }
    Ok(())
}

proptest! {
    #[test]
    fn wrong_multiplicity_is_always_rejected(seed in any::<u64>(), n in 0usize..10) {
        prop_assume!(n != 4);
        let mut rng = StdRng::seed_from_u64(seed);
        let jets = isotropic_jets(&mut rng, n);
        prop_assert_eq!(
            DijetPairSelector::default().select(&jets),
            SelectionResult::Rejected(Rejection::WrongJetCount { found: n })
        );
    }

    #[test]
    fn isotropic_events_are_permutation_symmetric(seed in any::<u64>()) {
        let mut rng = StdRng::seed_from_u64(seed);
        let jets = isotropic_jets(&mut rng, 4);
        check_permutation_symmetry(&jets)?;
    }

    #[test]
    fn two_pair_events_are_permutation_symmetric(seed in any::<u64>()) {
        let mut rng = StdRng::seed_from_u64(seed);
        let jets = two_pair_jets(&mut rng);
        check_permutation_symmetry(&jets)?;
    }

    #[test]
    fn accepted_pairs_partition_the_event(seed in any::<u64>()) {
        let mut rng = StdRng::seed_from_u64(seed);
        let jets = two_pair_jets(&mut rng);
        let selector = DijetPairSelector::default();
        let result = selector.select(&jets);

        prop_assert_eq!(result, selector.select(&jets));
        if let Some(p) = result.accepted() {
            let used: BTreeSet<usize> = [p.pair_a.0, p.pair_a.1, p.pair_b.0, p.pair_b.1]
                .iter()
                .copied()
                .collect();
            prop_assert_eq!(used, (0..4).collect::<BTreeSet<usize>>());
            for angle in p.angles.iter() {
                prop_assert!(*angle >= 100. && *angle <= 140.);
            }
        }
    }
}

#[test]
fn hand_built_event_is_symmetric_under_all_relabellings() {
    let planar = |e: f64, deg: f64| {
        let phi = deg.to_radians();
        Jet::from_components(e, e * phi.cos(), e * phi.sin(), 0.)
    };
    let jets = vec![
        planar(40., 0.),
        planar(50., 30.),
        planar(45., 135.),
        planar(35., 165.),
    ];
    assert!(DijetPairSelector::default().select(&jets).is_accepted());
    check_permutation_symmetry(&jets).unwrap();
}
