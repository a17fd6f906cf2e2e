pub mod inventory;
pub mod nft;
pub mod pricing;
pub mod profiles;
pub mod sell_prices;
pub mod status;
