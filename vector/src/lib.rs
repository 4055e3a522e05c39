extern crate num;
extern crate serde;

use num::Float;
use num::Num;
use std::fmt::{Debug, Display};
use std::iter::Sum;
use std::ops::{Add, AddAssign, Div, Index, Mul, MulAssign, Neg, Sub, SubAssign};

mod deserialize;

pub trait Field
where
    Self: Num,
    Self: Mul<Self, Output = Self>,
    Self: MulAssign<Self>,
    Self: AddAssign<Self>,
    Self: SubAssign<Self>,
    Self: Div<Self, Output = Self>,
    Self: Add<Self, Output = Self>,
    Self: Sub<Self, Output = Self>,
    Self: Neg<Output = Self>,
    Self: Sum<Self>,
    Self: PartialEq,
    Self: Copy,
    Self: Default,
    Self: Debug,
    Self: Display,
{
}

/// A field with a total real ordering and the usual transcendental functions.
/// Kinematic quantities (angles, masses, rapidities) are only defined for these.
pub trait RealNumberLike
where
    Self: Field,
    Self: Float,
{
}

impl Field for f32 {}
impl Field for f64 {}

impl RealNumberLike for f32 {}
impl RealNumberLike for f64 {}

/// A four-vector `(t, x, y, z)` with metric `(+, -, -, -)`. For momenta `t` is the energy.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct LorentzVector<T: Field> {
    pub t: T,
    pub x: T,
    pub y: T,
    pub z: T,
}

impl<T: Field> Default for LorentzVector<T> {
    fn default() -> LorentzVector<T> {
        LorentzVector {
            t: T::default(),
            x: T::default(),
            y: T::default(),
            z: T::default(),
        }
    }
}

impl<T: Field> LorentzVector<T> {
    #[inline]
    pub fn from_args(t: T, x: T, y: T, z: T) -> LorentzVector<T> {
        LorentzVector { t, x, y, z }
    }

    #[inline]
    pub fn square(&self) -> T {
        self.t * self.t - self.x * self.x - self.y * self.y - self.z * self.z
    }

    #[inline]
    pub fn dot(&self, other: &LorentzVector<T>) -> T {
        self.t * other.t - self.x * other.x - self.y * other.y - self.z * other.z
    }

    #[inline]
    pub fn spatial_squared(&self) -> T {
        self.x * self.x + self.y * self.y + self.z * self.z
    }

    #[inline]
    pub fn spatial_dot(&self, other: &LorentzVector<T>) -> T {
        self.x * other.x + self.y * other.y + self.z * other.z
    }

    #[inline]
    pub fn pt_squared(&self) -> T {
        self.x * self.x + self.y * self.y
    }
}

impl<T: RealNumberLike> LorentzVector<T> {
    #[inline]
    pub fn pt(&self) -> T {
        self.pt_squared().sqrt()
    }

    /// Invariant mass. A space-like vector yields `-sqrt(-m^2)`.
    #[inline]
    pub fn mass(&self) -> T {
        let m2 = self.square();
        if m2 < T::zero() {
            -(-m2).sqrt()
        } else {
            m2.sqrt()
        }
    }

    /// Opening angle between the 3-momenta in radians, in `[0, pi]`.
    /// Returns zero when either vector has no spatial component.
    pub fn angle(&self, other: &LorentzVector<T>) -> T {
        let norm = (self.spatial_squared() * other.spatial_squared()).sqrt();
        if norm == T::zero() {
            return T::zero();
        }

        let cos = self.spatial_dot(other) / norm;
        cos.max(-T::one()).min(T::one()).acos()
    }

    /// Polar angle with respect to the z-axis, in `[0, pi]`.
    #[inline]
    pub fn theta(&self) -> T {
        if self.spatial_squared() == T::zero() {
            return T::zero();
        }
        self.pt().atan2(self.z)
    }

    /// Azimuthal angle in `(-pi, pi]`.
    #[inline]
    pub fn phi(&self) -> T {
        if self.x == T::zero() && self.y == T::zero() {
            return T::zero();
        }
        self.y.atan2(self.x)
    }

    /// Pseudorapidity `-ln tan(theta / 2)`, computed as `asinh(pz / pt)`.
    /// Vectors along the beam axis give `+-inf`.
    pub fn pseudorapidity(&self) -> T {
        let pt = self.pt();
        if pt == T::zero() {
            return if self.z >= T::zero() {
                T::infinity()
            } else {
                T::neg_infinity()
            };
        }
        (self.z / pt).asinh()
    }
}

impl<'a, T: Field> Add<&'a LorentzVector<T>> for &'a LorentzVector<T> {
    type Output = LorentzVector<T>;

    #[inline]
    fn add(self, other: &'a LorentzVector<T>) -> LorentzVector<T> {
        LorentzVector {
            t: self.t + other.t,
            x: self.x + other.x,
            y: self.y + other.y,
            z: self.z + other.z,
        }
    }
}

impl<'a, T: Field> Add<&'a LorentzVector<T>> for LorentzVector<T> {
    type Output = LorentzVector<T>;

    #[inline]
    fn add(self, other: &'a LorentzVector<T>) -> LorentzVector<T> {
        &self + other
    }
}

impl<T: Field> Add<LorentzVector<T>> for LorentzVector<T> {
    type Output = LorentzVector<T>;

    #[inline]
    fn add(self, other: LorentzVector<T>) -> LorentzVector<T> {
        &self + &other
    }
}

impl<T: Field> AddAssign<LorentzVector<T>> for LorentzVector<T> {
    #[inline]
    fn add_assign(&mut self, other: LorentzVector<T>) {
        self.t += other.t;
        self.x += other.x;
        self.y += other.y;
        self.z += other.z;
    }
}

impl<T: Field> Sum for LorentzVector<T> {
    fn sum<I: Iterator<Item = LorentzVector<T>>>(iter: I) -> LorentzVector<T> {
        iter.fold(LorentzVector::default(), |acc, p| acc + p)
    }
}

impl<'a, T: Field> Sum<&'a LorentzVector<T>> for LorentzVector<T> {
    fn sum<I: Iterator<Item = &'a LorentzVector<T>>>(iter: I) -> LorentzVector<T> {
        iter.fold(LorentzVector::default(), |acc, p| acc + p)
    }
}

impl<T: Field> Index<usize> for LorentzVector<T> {
    type Output = T;

    #[inline]
    fn index(&self, index: usize) -> &T {
        match index {
            0 => &self.t,
            1 => &self.x,
            2 => &self.y,
            3 => &self.z,
            _ => panic!("Index is not between 0 and 3"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::LorentzVector;
    use std::f64::consts::{FRAC_PI_2, PI};

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-12
    }

    #[test]
    fn mass_of_back_to_back_pair() {
        let p1 = LorentzVector::from_args(50., 0., 0., 50.);
        let p2 = LorentzVector::from_args(50., 0., 0., -50.);
        assert!(approx((p1 + p2).mass(), 100.));
        assert!(approx(p1.mass(), 0.));
        assert!(approx(p1.dot(&p2), 5000.));
        assert!(approx((p1 + p2).square(), p1.dot(&p1) + 2. * p1.dot(&p2) + p2.dot(&p2)));
    }

    #[test]
    fn spacelike_mass_is_negative() {
        let p = LorentzVector::from_args(3., 0., 0., 5.);
        assert!(approx(p.mass(), -4.));
    }

    #[test]
    fn angle_between_vectors() {
        let px = LorentzVector::from_args(1., 1., 0., 0.);
        let py = LorentzVector::from_args(1., 0., 2., 0.);
        let mx = LorentzVector::from_args(1., -3., 0., 0.);
        assert!(approx(px.angle(&py), FRAC_PI_2));
        assert!(approx(px.angle(&mx), PI));
        assert!(approx(px.angle(&px), 0.));
        assert_eq!(px.angle(&LorentzVector::from_args(1., 0., 0., 0.)), 0.);
    }

    #[test]
    fn polar_coordinates() {
        let p = LorentzVector::from_args(2., 0., 1., 1.);
        assert!(approx(p.theta(), PI / 4.));
        assert!(approx(p.phi(), FRAC_PI_2));
        assert!(approx(p.pseudorapidity(), (1f64).asinh()));

        let central = LorentzVector::from_args(1., 1., 0., 0.);
        assert!(approx(central.pseudorapidity(), 0.));

        let beam = LorentzVector::from_args(1., 0., 0., -1.);
        assert_eq!(beam.pseudorapidity(), std::f64::NEG_INFINITY);
    }

    #[test]
    fn sum_and_index() {
        let ps = vec![
            LorentzVector::from_args(1., 2., 3., 4.),
            LorentzVector::from_args(1., -2., -3., -4.),
        ];
        let total: LorentzVector<f64> = ps.iter().sum();
        assert_eq!(total, LorentzVector::from_args(2., 0., 0., 0.));
        assert_eq!(ps[0][3], 4.);

        let mut acc = LorentzVector::default();
        acc += ps[0];
        assert_eq!(acc, ps[0]);
    }
}
