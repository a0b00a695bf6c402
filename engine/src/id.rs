//! Identifiers for every stored document.
//!
//! Each id wraps a MongoDB [`ObjectId`] but crosses the HTTP boundary as its 24 character hex string,
//! so path parameters and JSON bodies never see the extended-JSON `{"$oid": ..}` form.
use bson::Bson;
use bson::oid::ObjectId;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt::{Display, Formatter};
use std::ops::Deref;
use std::str::FromStr;

#[derive(Debug, thiserror::Error)]
#[error("'{0}' is not a valid id")]
pub struct InvalidId(pub String);

macro_rules! object_id {
    ($($(#[$meta:meta])* $name:ident),+ $(,)?) => {
        $(
            $(#[$meta])*
            #[derive(Debug, PartialEq, Eq, Hash, Clone, Copy, utoipa::ToSchema)]
            #[repr(transparent)]
            #[schema(value_type = String)]
            pub struct $name(ObjectId);

            impl $name {
                pub fn new() -> Self {
                    Self(ObjectId::new())
                }

                pub fn from_object_id(id: ObjectId) -> Self {
                    Self(id)
                }

                pub fn object_id(&self) -> ObjectId {
                    self.0
                }
            }

            impl Default for $name {
                fn default() -> Self {
                    Self::new()
                }
            }

            impl Deref for $name {
                type Target = ObjectId;

                fn deref(&self) -> &Self::Target {
                    &self.0
                }
            }

            impl From<ObjectId> for $name {
                fn from(value: ObjectId) -> Self {
                    Self(value)
                }
            }

            impl From<$name> for ObjectId {
                fn from(value: $name) -> Self {
                    value.0
                }
            }

            impl From<$name> for Bson {
                fn from(value: $name) -> Self {
                    value.0.into()
                }
            }

            impl FromStr for $name {
                type Err = InvalidId;

                fn from_str(s: &str) -> Result<Self, Self::Err> {
                    ObjectId::parse_str(s.trim())
                        .map(Self)
                        .map_err(|_| InvalidId(s.to_string()))
                }
            }

            impl Display for $name {
                fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
                    write!(f, "{}", self.0.to_hex())
                }
            }

            impl Serialize for $name {
                fn serialize<S>(&self, ser: S) -> Result<S::Ok, S::Error>
                where
                    S: Serializer,
                {
                    self.0.to_hex().serialize(ser)
                }
            }

            impl<'de> Deserialize<'de> for $name {
                fn deserialize<D>(de: D) -> Result<Self, D::Error>
                where
                    D: Deserializer<'de>,
                {
                    let raw = String::deserialize(de)?;
                    raw.parse().map_err(D::Error::custom)
                }
            }
        )+
    };
}

object_id!(
    /// Identifies a defect.
    DefectId,
    /// Identifies a project that defects are filed against.
    ProjectId,
    /// Identifies a user. Authenticated identities carry the same id in their token subject.
    UserId,
    ReviewId,
    CommentId,
    AchievementId,
);
