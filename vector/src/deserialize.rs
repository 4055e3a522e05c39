use serde::de::{Deserializer, Error, SeqAccess, Visitor};
use serde::ser::{SerializeTuple, Serializer};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::marker::PhantomData;
use crate::{Field, LorentzVector};

/// Reads a four-vector written as `[E, px, py, pz]`.
struct LorentzVectorVisitor<T: Field> {
    _marker: PhantomData<fn() -> LorentzVector<T>>,
}

impl<'de, T: Field + Deserialize<'de>> Visitor<'de> for LorentzVectorVisitor<T> {
    type Value = LorentzVector<T>;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("four floats")
    }

    fn visit_seq<M>(self, mut access: M) -> Result<Self::Value, M::Error>
    where
        M: SeqAccess<'de>,
    {
        let t = access
            .next_element::<T>()?
            .ok_or_else(|| M::Error::custom("Cannot read t-component"))?;
        let x = access
            .next_element::<T>()?
            .ok_or_else(|| M::Error::custom("Cannot read x-component"))?;
        let y = access
            .next_element::<T>()?
            .ok_or_else(|| M::Error::custom("Cannot read y-component"))?;
        let z = access
            .next_element::<T>()?
            .ok_or_else(|| M::Error::custom("Cannot read z-component"))?;

        if access.next_element::<T>()?.is_some() {
            return Err(M::Error::custom("Expected exactly four components"));
        }

        Ok(LorentzVector::from_args(t, x, y, z))
    }
}

impl<'de, T: Field + Deserialize<'de>> Deserialize<'de> for LorentzVector<T> {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_seq(LorentzVectorVisitor {
            _marker: PhantomData,
        })
    }
}

impl<T: Field + Serialize> Serialize for LorentzVector<T> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut tup = serializer.serialize_tuple(4)?;
        tup.serialize_element(&self.t)?;
        tup.serialize_element(&self.x)?;
        tup.serialize_element(&self.y)?;
        tup.serialize_element(&self.z)?;
        tup.end()
    }
}
