//! Shop catalog: vehicles and abilities
//!
//! Items are addressed by their upper-snake id (`CAR_NEON`, `DOUBLE_JUMP`, ...)
//! which is also how they are stored in the save blob.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Player vehicles
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum CarId {
    #[serde(rename = "CAR_NEON")]
    Neon,
    #[serde(rename = "CAR_SHADOW")]
    Shadow,
    #[serde(rename = "CAR_BIKE")]
    Bike,
    #[serde(rename = "CAR_RETRO")]
    Retro,
    #[serde(rename = "CAR_TRUCK")]
    Truck,
    #[serde(rename = "CAR_MUSCLE")]
    Muscle,
    #[serde(rename = "CAR_BLADE")]
    Blade,
    #[serde(rename = "CAR_AERO")]
    Aero,
    #[serde(rename = "CAR_VOID")]
    Void,
}

impl CarId {
    pub const ALL: [CarId; 9] = [
        CarId::Neon,
        CarId::Shadow,
        CarId::Bike,
        CarId::Retro,
        CarId::Truck,
        CarId::Muscle,
        CarId::Blade,
        CarId::Aero,
        CarId::Void,
    ];

    /// The vehicle every player starts with
    pub const STARTER: CarId = CarId::Neon;

    pub fn as_str(&self) -> &'static str {
        match self {
            CarId::Neon => "CAR_NEON",
            CarId::Shadow => "CAR_SHADOW",
            CarId::Bike => "CAR_BIKE",
            CarId::Retro => "CAR_RETRO",
            CarId::Truck => "CAR_TRUCK",
            CarId::Muscle => "CAR_MUSCLE",
            CarId::Blade => "CAR_BLADE",
            CarId::Aero => "CAR_AERO",
            CarId::Void => "CAR_VOID",
        }
    }

    /// Catalog price in credits
    pub fn price(&self) -> u64 {
        match self {
            CarId::Neon => 0,
            CarId::Truck => 2500,
            CarId::Muscle => 3500,
            CarId::Shadow => 4000,
            CarId::Blade => 5000,
            CarId::Bike => 5500,
            CarId::Retro => 6500,
            CarId::Aero => 7000,
            CarId::Void => 9000,
        }
    }
}

impl fmt::Display for CarId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Anything purchasable in the shop
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShopItem {
    Car(CarId),
    DoubleJump,
    MaxLife,
    Heal,
    Immortal,
}

impl ShopItem {
    pub fn as_str(&self) -> &'static str {
        match self {
            ShopItem::Car(car) => car.as_str(),
            ShopItem::DoubleJump => "DOUBLE_JUMP",
            ShopItem::MaxLife => "MAX_LIFE",
            ShopItem::Heal => "HEAL",
            ShopItem::Immortal => "IMMORTAL",
        }
    }

    /// Catalog price in credits
    pub fn price(&self) -> u64 {
        match self {
            ShopItem::Car(car) => car.price(),
            ShopItem::DoubleJump => 1000,
            ShopItem::MaxLife => 1500,
            ShopItem::Heal => 500,
            ShopItem::Immortal => 3000,
        }
    }
}

impl fmt::Display for ShopItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unknown item id
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown shop item: {0}")]
pub struct UnknownItem(pub String);

impl FromStr for ShopItem {
    type Err = UnknownItem;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.trim().to_uppercase();
        match upper.as_str() {
            "DOUBLE_JUMP" => return Ok(ShopItem::DoubleJump),
            "MAX_LIFE" => return Ok(ShopItem::MaxLife),
            "HEAL" => return Ok(ShopItem::Heal),
            "IMMORTAL" => return Ok(ShopItem::Immortal),
            _ => {}
        }
        CarId::ALL
            .iter()
            .find(|car| car.as_str() == upper)
            .map(|car| ShopItem::Car(*car))
            .ok_or(UnknownItem(s.to_string()))
    }
}
