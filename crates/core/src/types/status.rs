//! Status enums for various entities.

use rand::Rng;
use serde::{Deserialize, Serialize};

/// Fulfillment status shown on a completed purchase.
///
/// There is no fulfillment pipeline behind it: a status is drawn at random
/// when the purchase record is created and never changes afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PurchaseStatus {
    Shipped,
    Processing,
    Delivered,
}

impl PurchaseStatus {
    /// All statuses, in the order they are drawn from.
    pub const ALL: [Self; 3] = [Self::Shipped, Self::Processing, Self::Delivered];

    /// Draw a status uniformly at random.
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        match rng.random_range(0..3_u8) {
            0 => Self::Shipped,
            1 => Self::Processing,
            _ => Self::Delivered,
        }
    }

    /// Human-readable label.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Shipped => "Shipped",
            Self::Processing => "Processing",
            Self::Delivered => "Delivered",
        }
    }
}

impl std::fmt::Display for PurchaseStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for PurchaseStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Shipped" => Ok(Self::Shipped),
            "Processing" => Ok(Self::Processing),
            "Delivered" => Ok(Self::Delivered),
            _ => Err(format!("invalid purchase status: {s}")),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;

    #[test]
    fn test_random_covers_every_status() {
        let mut rng = StdRng::seed_from_u64(7);
        let drawn: Vec<PurchaseStatus> = (0..200)
            .map(|_| PurchaseStatus::random(&mut rng))
            .collect();

        for status in PurchaseStatus::ALL {
            assert!(drawn.contains(&status), "{status} never drawn");
        }
    }

    #[test]
    fn test_random_is_deterministic_for_a_seed() {
        let a = PurchaseStatus::random(&mut StdRng::seed_from_u64(42));
        let b = PurchaseStatus::random(&mut StdRng::seed_from_u64(42));
        assert_eq!(a, b);
    }

    #[test]
    fn test_serde_uses_display_names() {
        let json = serde_json::to_string(&PurchaseStatus::Processing).unwrap();
        assert_eq!(json, "\"Processing\"");
        assert_eq!(
            "Delivered".parse::<PurchaseStatus>().unwrap(),
            PurchaseStatus::Delivered
        );
        assert!("Lost".parse::<PurchaseStatus>().is_err());
    }
}
