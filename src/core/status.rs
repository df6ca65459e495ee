//! Closed enumerations shared by every layer of the service
//!
//! Both enums follow the same codec contract:
//!
//! - decoding (from a column string or a wire code) never fails: anything
//!   unrecognized, including the empty string, becomes `Unknown`
//! - encoding is total and `Unknown` encodes to `"unknown"` / code `0`
//!
//! So `decode(encode(v)) == v` holds for every known variant, while encoding a
//! decoded garbage string yields `"unknown"`.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Label used for the `Unknown` variant of every enum
pub const UNKNOWN_CODE: &str = "unknown";

/// Lifecycle status of an order
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", from = "String")]
#[repr(i32)]
pub enum OrderStatus {
    #[default]
    Unknown = 0,
    Created = 1,
    Rejected = 2,
    InProgress = 3,
    Done = 4,
}

impl OrderStatus {
    /// Every variant, `Unknown` included, in code order
    pub const ALL: [OrderStatus; 5] = [
        OrderStatus::Unknown,
        OrderStatus::Created,
        OrderStatus::Rejected,
        OrderStatus::InProgress,
        OrderStatus::Done,
    ];

    /// Decode a storage string. Unrecognized input maps to `Unknown`.
    pub fn decode(code: &str) -> Self {
        match code {
            "created" => OrderStatus::Created,
            "rejected" => OrderStatus::Rejected,
            "in_progress" => OrderStatus::InProgress,
            "done" => OrderStatus::Done,
            _ => OrderStatus::Unknown,
        }
    }

    pub fn encode(self) -> &'static str {
        match self {
            OrderStatus::Unknown => UNKNOWN_CODE,
            OrderStatus::Created => "created",
            OrderStatus::Rejected => "rejected",
            OrderStatus::InProgress => "in_progress",
            OrderStatus::Done => "done",
        }
    }

    /// Decode a numeric code. Out-of-range codes map to `Unknown`.
    pub fn from_code(code: i32) -> Self {
        Self::ALL
            .into_iter()
            .find(|status| status.code() == code)
            .unwrap_or_default()
    }

    pub fn code(self) -> i32 {
        self as i32
    }

    pub fn is_known(self) -> bool {
        self != OrderStatus::Unknown
    }
}

/// Volume category of a move
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", from = "String")]
#[repr(i32)]
pub enum PropertySize {
    #[default]
    Unknown = 0,
    Studio = 1,
    OneBedroom = 2,
    TwoBedrooms = 3,
    ThreeBedrooms = 4,
    FourPlusBedrooms = 5,
    Commercial = 6,
}

impl PropertySize {
    /// Every variant, `Unknown` included, in code order
    pub const ALL: [PropertySize; 7] = [
        PropertySize::Unknown,
        PropertySize::Studio,
        PropertySize::OneBedroom,
        PropertySize::TwoBedrooms,
        PropertySize::ThreeBedrooms,
        PropertySize::FourPlusBedrooms,
        PropertySize::Commercial,
    ];

    /// Decode a storage string. Unrecognized input maps to `Unknown`.
    pub fn decode(code: &str) -> Self {
        match code {
            "studio" => PropertySize::Studio,
            "1_bedroom" => PropertySize::OneBedroom,
            "2_bedrooms" => PropertySize::TwoBedrooms,
            "3_bedrooms" => PropertySize::ThreeBedrooms,
            "4_plus_bedrooms" => PropertySize::FourPlusBedrooms,
            "commercial" => PropertySize::Commercial,
            _ => PropertySize::Unknown,
        }
    }

    pub fn encode(self) -> &'static str {
        match self {
            PropertySize::Unknown => UNKNOWN_CODE,
            PropertySize::Studio => "studio",
            PropertySize::OneBedroom => "1_bedroom",
            PropertySize::TwoBedrooms => "2_bedrooms",
            PropertySize::ThreeBedrooms => "3_bedrooms",
            PropertySize::FourPlusBedrooms => "4_plus_bedrooms",
            PropertySize::Commercial => "commercial",
        }
    }

    /// Decode a numeric code. Out-of-range codes map to `Unknown`.
    pub fn from_code(code: i32) -> Self {
        Self::ALL
            .into_iter()
            .find(|size| size.code() == code)
            .unwrap_or_default()
    }

    pub fn code(self) -> i32 {
        self as i32
    }

    pub fn is_known(self) -> bool {
        self != PropertySize::Unknown
    }
}

macro_rules! impl_string_codec {
    ($ty:ty) => {
        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.encode())
            }
        }

        impl From<&str> for $ty {
            fn from(code: &str) -> Self {
                Self::decode(code)
            }
        }

        impl From<String> for $ty {
            fn from(code: String) -> Self {
                Self::decode(&code)
            }
        }

        impl From<$ty> for String {
            fn from(value: $ty) -> Self {
                value.encode().to_string()
            }
        }
    };
}

impl_string_codec!(OrderStatus);
impl_string_codec!(PropertySize);
