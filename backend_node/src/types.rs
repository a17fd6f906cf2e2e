//! Wire and domain types shared across stores and API handlers.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A single inventory item. Identity is `id` within the owning address's
/// item list; `attributes` is an open mapping supplied by the game client.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Item {
    pub id: String,
    #[serde(rename = "type")]
    pub item_type: String,
    pub rarity: String,
    pub image: String,
    pub attributes: Map<String, Value>,
}

/// Per-user profile record, keyed by lowercased address.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Profile {
    pub address: String,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub nickname: Option<String>,
    #[serde(default)]
    pub local_gems: i64,
}

/// Canonical NFT record written to `NFT/{tokenId}.json`. Field names follow
/// the marketplace contract's camelCase convention.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FinalNft {
    pub token_id: u64,
    pub item_type: String,
    pub rarity: u32,
    pub bonus: Map<String, Value>,
    pub image: String,
    pub uri: String,
    pub owner: String,
}

/// Global sell-price configuration, one record process-wide.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SellPrices {
    pub common: u64,
    pub rare: u64,
    pub epic: u64,
    pub legendary: u64,
}

impl Default for SellPrices {
    fn default() -> Self {
        Self {
            common: 5,
            rare: 20,
            epic: 50,
            legendary: 100,
        }
    }
}

/// Partial sell-price update. Unknown JSON keys are dropped during
/// deserialization; absent fields leave the current value untouched.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SellPriceUpdate {
    #[serde(default)]
    pub common: Option<u64>,
    #[serde(default)]
    pub rare: Option<u64>,
    #[serde(default)]
    pub epic: Option<u64>,
    #[serde(default)]
    pub legendary: Option<u64>,
}

/// Canonical form of a user address: addresses are case-insensitive and are
/// stored, cached and listed under their lowercase form.
pub fn canonical_address(address: &str) -> String {
    address.to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn item_round_trips_with_type_rename() {
        let json = serde_json::json!({
            "id": "itm-1",
            "type": "Sword",
            "rarity": "rare",
            "image": "https://cdn.example/itm-1.png",
            "attributes": {"bonusValue": 12}
        });
        let item: Item = serde_json::from_value(json.clone()).unwrap();
        assert_eq!(item.item_type, "Sword");
        assert_eq!(serde_json::to_value(&item).unwrap(), json);
    }

    #[test]
    fn profile_defaults_apply() {
        let profile: Profile = serde_json::from_str(r#"{"address":"0xAB"}"#).unwrap();
        assert_eq!(profile.local_gems, 0);
        assert!(profile.nickname.is_none());
    }

    #[test]
    fn final_nft_uses_camel_case() {
        let nft = FinalNft {
            token_id: 7,
            item_type: "Sword".into(),
            rarity: 2,
            bonus: Map::new(),
            image: "https://cdn.example/7.png".into(),
            uri: "https://storage.example/bucket/nft_data/a_b_c.json".into(),
            owner: "0xabc".into(),
        };
        let value = serde_json::to_value(&nft).unwrap();
        assert_eq!(value["tokenId"], 7);
        assert_eq!(value["itemType"], "Sword");
    }

    #[test]
    fn sell_price_update_ignores_unknown_keys() {
        let update: SellPriceUpdate =
            serde_json::from_str(r#"{"epic":75,"mythic":400}"#).unwrap();
        assert_eq!(update.epic, Some(75));
        assert!(update.common.is_none());
    }
}
