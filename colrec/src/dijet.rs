//! Four-jet, two-dijet event selection.
//!
//! The selection runs in two stages. The two angularly closest jet pairs must
//! both be narrower than `narrow_angle_max` and must not share a jet. This
//! only validates the event shape. The pairing that is actually reported is
//! taken from the remaining, wider pairs: two disjoint pairs whose opening
//! angles fall inside `[wide_angle_min, wide_angle_max]`.
//!
//! Reporting the wide pairs rather than the narrow ones is the intended
//! selection, not an oversight.

use crate::event::Jet;
use serde::{Deserialize, Serialize};
use std::fmt;

/// How to choose between several wide pairings that all pass the window.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WidePairingPolicy {
    /// Smallest summed distance of both opening angles from the window centre.
    /// Ties keep the pairing found first.
    ClosestToWindowCentre,
    /// The last qualifying pairing in candidate order.
    LastMatch,
}

impl Default for WidePairingPolicy {
    fn default() -> WidePairingPolicy {
        WidePairingPolicy::ClosestToWindowCentre
    }
}

/// Angular cuts of the selection, in degrees.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DijetCuts {
    pub narrow_angle_max: f64,
    pub wide_angle_min: f64,
    pub wide_angle_max: f64,
    pub pairing_policy: WidePairingPolicy,
}

impl Default for DijetCuts {
    fn default() -> DijetCuts {
        DijetCuts {
            narrow_angle_max: 100.,
            wide_angle_min: 100.,
            wide_angle_max: 140.,
            pairing_policy: WidePairingPolicy::default(),
        }
    }
}

impl DijetCuts {
    #[inline]
    fn in_wide_window(&self, angle: f64) -> bool {
        angle >= self.wide_angle_min && angle <= self.wide_angle_max
    }

    #[inline]
    fn window_centre(&self) -> f64 {
        0.5 * (self.wide_angle_min + self.wide_angle_max)
    }
}

/// A jet pair with its opening angle (degrees) and invariant mass.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct JetPairCandidate {
    pub i: usize,
    pub j: usize,
    pub angle: f64,
    pub mass: f64,
}

impl JetPairCandidate {
    #[inline]
    pub fn shares_jet(&self, other: &JetPairCandidate) -> bool {
        self.i == other.i || self.i == other.j || self.j == other.i || self.j == other.j
    }

    #[inline]
    pub fn indices(&self) -> (usize, usize) {
        (self.i, self.j)
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Rejection {
    WrongJetCount { found: usize },
    AngleTooWide,
    NonDisjointMinimalPairs,
    NoValidWidePairing,
}

impl Rejection {
    /// Stable name used in cut-flow tables.
    pub fn label(&self) -> &'static str {
        match self {
            Rejection::WrongJetCount { .. } => "wrong_jet_count",
            Rejection::AngleTooWide => "angle_too_wide",
            Rejection::NonDisjointMinimalPairs => "non_disjoint_minimal_pairs",
            Rejection::NoValidWidePairing => "no_valid_wide_pairing",
        }
    }
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Rejection::WrongJetCount { found } => write!(f, "expected 4 jets, found {}", found),
            Rejection::AngleTooWide => write!(f, "closest jet pairs are too wide"),
            Rejection::NonDisjointMinimalPairs => write!(f, "closest jet pairs share a jet"),
            Rejection::NoValidWidePairing => write!(f, "no disjoint wide-angle pairing"),
        }
    }
}

/// The accepted pairing. `pair_a` is the pair that comes first in candidate order.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct DijetPairing {
    pub pair_a: (usize, usize),
    pub pair_b: (usize, usize),
    pub angles: [f64; 2],
    pub masses: [f64; 2],
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub enum SelectionResult {
    Rejected(Rejection),
    Accepted(DijetPairing),
}

impl SelectionResult {
    pub fn is_accepted(&self) -> bool {
        matches!(self, SelectionResult::Accepted(_))
    }

    pub fn accepted(&self) -> Option<&DijetPairing> {
        match self {
            SelectionResult::Accepted(p) => Some(p),
            SelectionResult::Rejected(_) => None,
        }
    }

    pub fn rejection(&self) -> Option<Rejection> {
        match self {
            SelectionResult::Rejected(r) => Some(*r),
            SelectionResult::Accepted(_) => None,
        }
    }
}

impl fmt::Display for SelectionResult {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            SelectionResult::Rejected(r) => write!(f, "rejected: {}", r),
            SelectionResult::Accepted(p) => write!(
                f,
                "accepted: ({}, {}) m={:.4} angle={:.2}, ({}, {}) m={:.4} angle={:.2}",
                p.pair_a.0,
                p.pair_a.1,
                p.masses[0],
                p.angles[0],
                p.pair_b.0,
                p.pair_b.1,
                p.masses[1],
                p.angles[1],
            ),
        }
    }
}

/// Every unordered jet pair `i < j`, in nested-loop order.
pub fn pair_candidates(jets: &[Jet]) -> Vec<JetPairCandidate> {
    let n = jets.len();
    let mut candidates = Vec::with_capacity(n * n.saturating_sub(1) / 2);
    for i in 0..n {
        for j in i + 1..n {
            let (p1, p2) = (&jets[i].momentum, &jets[j].momentum);
            candidates.push(JetPairCandidate {
                i,
                j,
                angle: p1.angle(p2).to_degrees(),
                mass: (p1 + p2).mass(),
            });
        }
    }
    candidates
}

/// Positions of the two smallest angles. Strict comparison keeps the first of equal angles.
fn two_smallest(candidates: &[JetPairCandidate]) -> (Option<usize>, Option<usize>) {
    let mut first: Option<usize> = None;
    let mut second: Option<usize> = None;

    for (k, c) in candidates.iter().enumerate() {
        if first.map_or(true, |f| c.angle < candidates[f].angle) {
            second = first;
            first = Some(k);
        } else if second.map_or(true, |s| c.angle < candidates[s].angle) {
            second = Some(k);
        }
    }

    (first, second)
}

/// Picks two disjoint in-window pairs out of `wide` according to the policy.
fn pick_wide_pairing(
    wide: &[&JetPairCandidate],
    cuts: &DijetCuts,
) -> Option<(JetPairCandidate, JetPairCandidate)> {
    let centre = cuts.window_centre();
    let mut best: Option<(f64, JetPairCandidate, JetPairCandidate)> = None;

    for (x, a) in wide.iter().enumerate() {
        if !cuts.in_wide_window(a.angle) {
            continue;
        }
        for b in &wide[x + 1..] {
            if !cuts.in_wide_window(b.angle) || a.shares_jet(b) {
                continue;
            }

            let score = (a.angle - centre).abs() + (b.angle - centre).abs();
            let replace = match (&best, cuts.pairing_policy) {
                (None, _) => true,
                (Some(_), WidePairingPolicy::LastMatch) => true,
                (Some((s, _, _)), WidePairingPolicy::ClosestToWindowCentre) => score < *s,
            };
            if replace {
                best = Some((score, **a, **b));
            }
        }
    }

    best.map(|(_, a, b)| (a, b))
}

/// Stateless selector; one instance can be shared between any number of events.
#[derive(Debug, Copy, Clone, Default)]
pub struct DijetPairSelector {
    cuts: DijetCuts,
}

impl DijetPairSelector {
    pub fn new(cuts: DijetCuts) -> DijetPairSelector {
        DijetPairSelector { cuts }
    }

    pub fn select(&self, jets: &[Jet]) -> SelectionResult {
        if jets.len() != 4 {
            return SelectionResult::Rejected(Rejection::WrongJetCount { found: jets.len() });
        }

        let candidates = pair_candidates(jets);

        let (min1, min2) = match two_smallest(&candidates) {
            (Some(a), Some(b)) => (a, b),
            _ => return SelectionResult::Rejected(Rejection::WrongJetCount { found: jets.len() }),
        };
        let (narrow1, narrow2) = (&candidates[min1], &candidates[min2]);

        if narrow1.angle > self.cuts.narrow_angle_max || narrow2.angle > self.cuts.narrow_angle_max {
            return SelectionResult::Rejected(Rejection::AngleTooWide);
        }

        if narrow1.shares_jet(narrow2) {
            return SelectionResult::Rejected(Rejection::NonDisjointMinimalPairs);
        }

        let wide: Vec<&JetPairCandidate> = candidates
            .iter()
            .enumerate()
            .filter(|(k, _)| *k != min1 && *k != min2)
            .map(|(_, c)| c)
            .collect();

        match pick_wide_pairing(&wide, &self.cuts) {
            Some((a, b)) => SelectionResult::Accepted(DijetPairing {
                pair_a: a.indices(),
                pair_b: b.indices(),
                angles: [a.angle, b.angle],
                masses: [a.mass, b.mass],
            }),
            None => SelectionResult::Rejected(Rejection::NoValidWidePairing),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    /// Massless jet of energy `e` in the x-y plane at azimuth `phi_deg`.
    fn planar(e: f64, phi_deg: f64) -> Jet {
        let phi = phi_deg.to_radians();
        Jet::from_components(e, e * phi.cos(), e * phi.sin(), 0.)
    }

    fn massless_pair_mass(e1: f64, e2: f64, angle_deg: f64) -> f64 {
        (2. * e1 * e2 * (1. - angle_deg.to_radians().cos())).sqrt()
    }

    fn scenario_a() -> Vec<Jet> {
        // narrow pairs (0,1) and (2,3) at 30 degrees, (0,2) and (1,3) at 135
        vec![
            planar(40., 0.),
            planar(50., 30.),
            planar(45., 135.),
            planar(35., 165.),
        ]
    }

    fn candidate(i: usize, j: usize, angle: f64) -> JetPairCandidate {
        JetPairCandidate {
            i,
            j,
            angle,
            mass: angle,
        }
    }

    #[test]
    fn candidates_cover_each_pair_once() {
        let candidates = pair_candidates(&scenario_a());
        assert_eq!(candidates.len(), 6);

        let pairs: HashSet<(usize, usize)> = candidates.iter().map(|c| c.indices()).collect();
        assert_eq!(pairs.len(), 6);
        assert!(pairs.iter().all(|&(i, j)| i < j && j < 4));
    }

    #[test]
    fn two_smallest_keeps_first_on_ties() {
        let candidates = vec![
            candidate(0, 1, 50.),
            candidate(0, 2, 20.),
            candidate(0, 3, 20.),
            candidate(1, 2, 20.),
        ];
        assert_eq!(two_smallest(&candidates), (Some(1), Some(2)));
        assert_eq!(two_smallest(&[]), (None, None));
        assert_eq!(two_smallest(&candidates[..1]), (Some(0), None));
    }

    #[test]
    fn scenario_a_accepts_wide_pairs() {
        let jets = scenario_a();
        let result = DijetPairSelector::default().select(&jets);
        let pairing = *result.accepted().expect("event should pass");

        assert_eq!(pairing.pair_a, (0, 2));
        assert_eq!(pairing.pair_b, (1, 3));
        assert!((pairing.angles[0] - 135.).abs() < 1e-9);
        assert!((pairing.angles[1] - 135.).abs() < 1e-9);
        assert!((pairing.masses[0] - massless_pair_mass(40., 45., 135.)).abs() < 1e-9);
        assert!((pairing.masses[1] - massless_pair_mass(50., 35., 135.)).abs() < 1e-9);
    }

    #[test]
    fn scenario_b_three_jets() {
        let jets = &scenario_a()[..3];
        assert_eq!(
            DijetPairSelector::default().select(jets),
            SelectionResult::Rejected(Rejection::WrongJetCount { found: 3 })
        );
    }

    #[test]
    fn wrong_count_for_any_other_multiplicity() {
        let selector = DijetPairSelector::default();
        for n in [0usize, 1, 2, 3, 5, 6, 9].iter() {
            let jets: Vec<Jet> = (0..*n).map(|k| planar(10., 10. * k as f64)).collect();
            assert_eq!(
                selector.select(&jets).rejection(),
                Some(Rejection::WrongJetCount { found: *n })
            );
        }
    }

    #[test]
    fn scenario_c_second_closest_pair_too_wide() {
        let jets = vec![
            planar(40., 0.),
            planar(40., 30.),
            planar(40., 135.),
            planar(40., 255.),
        ];
        assert_eq!(
            DijetPairSelector::default().select(&jets).rejection(),
            Some(Rejection::AngleTooWide)
        );
    }

    #[test]
    fn scenario_c_tetrahedral_jets() {
        // every opening angle is about 109.5 degrees
        let jets = vec![
            Jet::from_components(1., 1., 1., 1.),
            Jet::from_components(1., 1., -1., -1.),
            Jet::from_components(1., -1., 1., -1.),
            Jet::from_components(1., -1., -1., 1.),
        ];
        assert_eq!(
            DijetPairSelector::default().select(&jets).rejection(),
            Some(Rejection::AngleTooWide)
        );
    }

    #[test]
    fn scenario_d_minimal_pairs_overlap() {
        let jets = vec![
            planar(30., 0.),
            planar(30., 20.),
            planar(30., 40.),
            planar(30., 200.),
        ];
        assert_eq!(
            DijetPairSelector::default().select(&jets).rejection(),
            Some(Rejection::NonDisjointMinimalPairs)
        );
    }

    #[test]
    fn scenario_e_no_wide_pairing() {
        let jets = vec![
            planar(30., 0.),
            planar(30., 30.),
            planar(30., 150.),
            planar(30., 180.),
        ];
        assert_eq!(
            DijetPairSelector::default().select(&jets).rejection(),
            Some(Rejection::NoValidWidePairing)
        );
    }

    #[test]
    fn window_edges_are_inclusive() {
        let cuts = DijetCuts::default();
        assert!(cuts.in_wide_window(100.));
        assert!(cuts.in_wide_window(140.));
        assert!(!cuts.in_wide_window(99.999));
        assert!(!cuts.in_wide_window(140.001));
    }

    #[test]
    fn accepted_pairs_partition_the_jets() {
        let result = DijetPairSelector::default().select(&scenario_a());
        let p = result.accepted().unwrap();
        let mut all = vec![p.pair_a.0, p.pair_a.1, p.pair_b.0, p.pair_b.1];
        all.sort_unstable();
        assert_eq!(all, vec![0, 1, 2, 3]);
    }

    #[test]
    fn selection_is_repeatable() {
        let jets = scenario_a();
        let selector = DijetPairSelector::default();
        assert_eq!(selector.select(&jets), selector.select(&jets));
    }

    #[test]
    fn policy_decides_between_two_pairings() {
        let c02 = candidate(0, 2, 121.);
        let c03 = candidate(0, 3, 139.);
        let c12 = candidate(1, 2, 101.);
        let c13 = candidate(1, 3, 119.);
        let wide = vec![&c02, &c03, &c12, &c13];

        let centre = DijetCuts::default();
        let (a, b) = pick_wide_pairing(&wide, &centre).unwrap();
        assert_eq!((a.indices(), b.indices()), ((0, 2), (1, 3)));

        let last = DijetCuts {
            pairing_policy: WidePairingPolicy::LastMatch,
            ..DijetCuts::default()
        };
        let (a, b) = pick_wide_pairing(&wide, &last).unwrap();
        assert_eq!((a.indices(), b.indices()), ((0, 3), (1, 2)));
    }

    #[test]
    fn minimal_pair_on_the_narrow_cut_passes() {
        // (0,1) and (2,3) are the minimal pairs
        let candidates = pair_candidates(&scenario_a());
        let cut = candidates[0].angle.max(candidates[5].angle);
        let at_cut = DijetPairSelector::new(DijetCuts {
            narrow_angle_max: cut,
            ..DijetCuts::default()
        });
        assert!(at_cut.select(&scenario_a()).is_accepted());

        let below_cut = DijetPairSelector::new(DijetCuts {
            narrow_angle_max: cut - 1e-9,
            ..DijetCuts::default()
        });
        assert_eq!(
            below_cut.select(&scenario_a()).rejection(),
            Some(Rejection::AngleTooWide)
        );
    }

    #[test]
    fn custom_cuts_are_applied() {
        // with a 25 degree narrow cut the 30 degree pairs no longer qualify
        let tight = DijetPairSelector::new(DijetCuts {
            narrow_angle_max: 25.,
            ..DijetCuts::default()
        });
        assert_eq!(
            tight.select(&scenario_a()).rejection(),
            Some(Rejection::AngleTooWide)
        );
    }

    #[test]
    fn policy_reads_from_yaml() {
        let cuts: DijetCuts = serde_yaml::from_str("pairing_policy: last_match\nwide_angle_max: 150.0").unwrap();
        assert_eq!(cuts.pairing_policy, WidePairingPolicy::LastMatch);
        assert_eq!(cuts.wide_angle_max, 150.);
        assert_eq!(cuts.narrow_angle_max, 100.);
    }
}
