use std::{borrow::Cow, fmt::Display, str::FromStr};

use serde::{de::Error, Deserialize, Deserializer, Serialize, Serializer};

/// A wrapper around [`uuid::Uuid`] used for every identifier in the portal
/// (users, roles, permissions). It serializes as a plain hex string and parses
/// from either the hyphenated or the simple form.
///
/// Subjects, role IDs and permission IDs should be passed around as this type
/// rather than [`uuid::Uuid`], so that the storage and wire representations
/// stay in one place.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Uuid(uuid::Uuid);

impl Uuid {
	/// Creates a new v4 (randomly generated) [`Uuid`]
	pub fn new_v4() -> Self {
		Self(uuid::Uuid::new_v4())
	}

	/// Parses a [`Uuid`] from a string of hexadecimal digits with optional
	/// hyphens.
	pub fn parse_str(input: &str) -> Result<Self, uuid::Error> {
		uuid::Uuid::try_parse(input).map(Self)
	}
}

impl Display for Uuid {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "{}", self.0.simple())
	}
}

impl Serialize for Uuid {
	fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
	where
		S: Serializer,
	{
		serializer.serialize_str(&self.to_string())
	}
}

impl<'de> Deserialize<'de> for Uuid {
	fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
	where
		D: Deserializer<'de>,
	{
		let string: Cow<'de, str> = Deserialize::deserialize(deserializer)?;
		Self::parse_str(string.as_ref()).map_err(Error::custom)
	}
}

impl FromStr for Uuid {
	type Err = uuid::Error;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Self::parse_str(s)
	}
}

#[cfg(feature = "sqlx")]
impl sqlx::Type<sqlx::Sqlite> for Uuid {
	fn type_info() -> <sqlx::Sqlite as sqlx::Database>::TypeInfo {
		<uuid::fmt::Simple as sqlx::Type<sqlx::Sqlite>>::type_info()
	}

	fn compatible(ty: &<sqlx::Sqlite as sqlx::Database>::TypeInfo) -> bool {
		<uuid::fmt::Simple as sqlx::Type<sqlx::Sqlite>>::compatible(ty)
	}
}

#[cfg(feature = "sqlx")]
impl<'a> sqlx::Encode<'a, sqlx::Sqlite> for Uuid {
	fn encode_by_ref(
		&self,
		buf: &mut <sqlx::Sqlite as sqlx::Database>::ArgumentBuffer<'a>,
	) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
		<uuid::fmt::Simple as sqlx::Encode<'a, sqlx::Sqlite>>::encode_by_ref(&self.0.simple(), buf)
	}
}

#[cfg(feature = "sqlx")]
impl<'a> sqlx::Decode<'a, sqlx::Sqlite> for Uuid {
	fn decode(
		value: <sqlx::Sqlite as sqlx::Database>::ValueRef<'a>,
	) -> Result<Self, sqlx::error::BoxDynError> {
		<uuid::fmt::Simple as sqlx::Decode<'a, sqlx::Sqlite>>::decode(value)
			.map(uuid::fmt::Simple::into_uuid)
			.map(Self)
	}
}
