//! Transaction record types.

use serde::Serialize;
use std::fmt;

/// Customer gender, normalized from the raw `M`/`F` codes at load time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub enum Gender {
    Female,
    Male,
}

impl Gender {
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "F" | "Female" => Some(Self::Female),
            "M" | "Male" => Some(Self::Male),
            _ => None,
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Female => write!(f, "Female"),
            Self::Male => write!(f, "Male"),
        }
    }
}

/// Age bracket, one of the dataset's fixed ordered bins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub enum AgeBracket {
    Under18,
    From18To25,
    From26To35,
    From36To45,
    From46To50,
    From51To55,
    Over55,
}

impl AgeBracket {
    pub const ALL: [Self; 7] = [
        Self::Under18,
        Self::From18To25,
        Self::From26To35,
        Self::From36To45,
        Self::From46To50,
        Self::From51To55,
        Self::Over55,
    ];

    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "0-17" => Some(Self::Under18),
            "18-25" => Some(Self::From18To25),
            "26-35" => Some(Self::From26To35),
            "36-45" => Some(Self::From36To45),
            "46-50" => Some(Self::From46To50),
            "51-55" => Some(Self::From51To55),
            "55+" => Some(Self::Over55),
            _ => None,
        }
    }

    /// Life-stage label used by the narrative views.
    pub fn life_stage(&self) -> &'static str {
        match self {
            Self::Under18 => "Teenagers",
            Self::From18To25 => "Young Adults",
            Self::From26To35 => "Early Career",
            Self::From36To45 => "Mid Career",
            Self::From46To50 => "Established",
            Self::From51To55 => "Senior",
            Self::Over55 => "Mature",
        }
    }
}

impl fmt::Display for AgeBracket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Under18 => "0-17",
            Self::From18To25 => "18-25",
            Self::From26To35 => "26-35",
            Self::From36To45 => "36-45",
            Self::From46To50 => "46-50",
            Self::From51To55 => "51-55",
            Self::Over55 => "55+",
        };
        write!(f, "{label}")
    }
}

/// City category (A, B or C).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub enum CityCategory {
    A,
    B,
    C,
}

impl CityCategory {
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "A" => Some(Self::A),
            "B" => Some(Self::B),
            "C" => Some(Self::C),
            _ => None,
        }
    }
}

impl fmt::Display for CityCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::A => write!(f, "A"),
            Self::B => write!(f, "B"),
            Self::C => write!(f, "C"),
        }
    }
}

/// Years resident in the current city; the dataset caps the count at `4+`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub enum StayYears {
    Zero,
    One,
    Two,
    Three,
    FourPlus,
}

impl StayYears {
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "0" => Some(Self::Zero),
            "1" => Some(Self::One),
            "2" => Some(Self::Two),
            "3" => Some(Self::Three),
            "4+" => Some(Self::FourPlus),
            _ => None,
        }
    }
}

impl fmt::Display for StayYears {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Zero => write!(f, "0"),
            Self::One => write!(f, "1"),
            Self::Two => write!(f, "2"),
            Self::Three => write!(f, "3"),
            Self::FourPlus => write!(f, "4+"),
        }
    }
}

/// One purchase event. Immutable once loaded.
#[derive(Debug, Clone, Serialize)]
pub struct Record {
    pub customer_id: u32,
    pub product_id: String,
    pub gender: Gender,
    pub age: AgeBracket,
    pub occupation: u8,
    pub city: CityCategory,
    pub stay_years: StayYears,
    pub married: bool,
    pub product_category: u8,
    pub purchase: f64,
}
