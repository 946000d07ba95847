// shop.rs — catalog and purchase rules
//
// All the money logic the shop screens share: the product table, wallet
// checks, multi-buy planning, the gems-to-coins conversion tiers, the
// real-money gem packs and the expenses export. Screens present these
// results; they don't do arithmetic of their own.

use thiserror::Error;

use crate::account::{
    self, AccD, Account, CONSUMABLE_EARNINATOR, CONSUMABLE_EXTRALIVES, CONSUMABLE_FLOATIFIER,
    CONSUMABLE_SPEEDIFIER, PRODUCT_BALLS, PRODUCT_BONUS, PRODUCT_LEVELS, PRODUCT_MEDIATION,
};

/// Hard cap on stockpiled extra balls for a single set.
pub const MAX_BALLS_LIMIT: i32 = 1110;

/// Extra balls bought from the fail screen cost this many gems.
pub const ASK_MORE_BALLS_GEMS: i32 = 15;

/// Mediation from the fail screen: coins or gems.
pub const MEDIATION_COINS: i32 = 120;
pub const MEDIATION_GEMS: i32 = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Currency {
    Coins,
    Gems,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProductKey {
    Levels,
    Balls,
    Bonus,
    Mediation,
    Earninator,
    Floatifier,
    Speedifier,
    ExtraBalls,
}

impl ProductKey {
    pub const ALL: [ProductKey; 8] = [
        ProductKey::Levels,
        ProductKey::Balls,
        ProductKey::Bonus,
        ProductKey::Mediation,
        ProductKey::Earninator,
        ProductKey::Floatifier,
        ProductKey::Speedifier,
        ProductKey::ExtraBalls,
    ];

    pub fn index(self) -> i32 {
        match self {
            ProductKey::Levels => 0,
            ProductKey::Balls => 1,
            ProductKey::Bonus => 2,
            ProductKey::Mediation => 3,
            ProductKey::Earninator => 4,
            ProductKey::Floatifier => 5,
            ProductKey::Speedifier => 6,
            ProductKey::ExtraBalls => 7,
        }
    }

    pub fn from_index(i: i32) -> Option<Self> {
        Self::ALL.get(i as usize).copied().filter(|p| p.index() == i)
    }

    pub fn name(self) -> &'static str {
        match self {
            ProductKey::Levels => "Extra Levels",
            ProductKey::Balls => "Online Balls",
            ProductKey::Bonus => "Bonus Pack",
            ProductKey::Mediation => "Mediation",
            ProductKey::Earninator => "Earninator",
            ProductKey::Floatifier => "Floatifier",
            ProductKey::Speedifier => "Speedifier",
            ProductKey::ExtraBalls => "Extra Balls",
        }
    }

    pub fn cost(self) -> i32 {
        match self {
            ProductKey::Levels | ProductKey::Balls => 250,
            ProductKey::Bonus | ProductKey::Mediation => 120,
            ProductKey::Earninator | ProductKey::Floatifier | ProductKey::Speedifier => 75,
            ProductKey::ExtraBalls => 15,
        }
    }

    /// Extra balls are the one gem-priced catalog entry.
    pub fn currency(self) -> Currency {
        match self {
            ProductKey::ExtraBalls => Currency::Gems,
            _ => Currency::Coins,
        }
    }

    pub fn consumable(self) -> bool {
        matches!(
            self,
            ProductKey::Earninator
                | ProductKey::Floatifier
                | ProductKey::Speedifier
                | ProductKey::ExtraBalls
        )
    }

    /// Ownership flag for one-shot products.
    fn owned_flag(self) -> Option<AccD> {
        match self {
            ProductKey::Levels => Some(PRODUCT_LEVELS),
            ProductKey::Balls => Some(PRODUCT_BALLS),
            ProductKey::Bonus => Some(PRODUCT_BONUS),
            ProductKey::Mediation => Some(PRODUCT_MEDIATION),
            _ => None,
        }
    }

    fn stock_value(self) -> Option<AccD> {
        match self {
            ProductKey::Earninator => Some(CONSUMABLE_EARNINATOR),
            ProductKey::Floatifier => Some(CONSUMABLE_FLOATIFIER),
            ProductKey::Speedifier => Some(CONSUMABLE_SPEEDIFIER),
            ProductKey::ExtraBalls => Some(CONSUMABLE_EXTRALIVES),
            _ => None,
        }
    }
}

pub fn owned(acc: &Account, key: ProductKey) -> bool {
    key.owned_flag().map(|f| acc.get_d(f) != 0).unwrap_or(false)
}

fn wallet_of(acc: &Account, currency: Currency) -> i32 {
    match currency {
        Currency::Coins => acc.get_d(account::WALLET_COINS),
        Currency::Gems => acc.get_d(account::WALLET_GEMS),
    }
}

fn set_wallet(acc: &mut Account, currency: Currency, value: i32) {
    match currency {
        Currency::Coins => acc.set_d(account::WALLET_COINS, value),
        Currency::Gems => acc.set_d(account::WALLET_GEMS, value),
    }
}

pub fn has_enough(acc: &Account, key: ProductKey, pieces: i32) -> bool {
    wallet_of(acc, key.currency()) >= key.cost() * pieces
}

// ============================================================
// Purchases
// ============================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Quantity {
    One,
    Five,
    /// Keep buying while the wallet can pay for another piece.
    DrainWallet,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Purchase {
    pub pieces: i32,
    pub paid: i32,
    pub currency: Currency,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PurchaseError {
    #[error("not enough funds: need {needed}")]
    InsufficientFunds { needed: i32 },
    #[error("product already owned")]
    AlreadyOwned,
    #[error("extra-ball limit reached")]
    MaxBalls,
    #[error("product cannot be bought in multiples")]
    NotConsumable,
}

/// Work out how many pieces a quantity request comes to, and the total
/// price. This is what the confirmation screen shows before committing.
pub fn plan(acc: &Account, key: ProductKey, quantity: Quantity) -> Result<Purchase, PurchaseError> {
    if owned(acc, key) {
        return Err(PurchaseError::AlreadyOwned);
    }
    if !key.consumable() && !matches!(quantity, Quantity::One) {
        return Err(PurchaseError::NotConsumable);
    }

    let cost = key.cost();
    let wallet = wallet_of(acc, key.currency());

    let mut pieces: i32;
    let mut total: i32;

    match quantity {
        Quantity::One => {
            pieces = 1;
            total = cost;
        }
        Quantity::Five => {
            pieces = 5;
            total = cost * 5;
        }
        Quantity::DrainWallet => {
            pieces = 1;
            total = cost;
            while total + cost < wallet {
                total += cost;
                pieces += 1;
            }
        }
    }

    if key == ProductKey::ExtraBalls {
        let stock = acc.get_d(CONSUMABLE_EXTRALIVES);
        while pieces > 0 && MAX_BALLS_LIMIT < stock + pieces {
            pieces -= 1;
            total = cost * pieces;
        }
        if pieces == 0 {
            return Err(PurchaseError::MaxBalls);
        }
    }

    if wallet < total {
        return Err(PurchaseError::InsufficientFunds { needed: total - wallet });
    }

    Ok(Purchase {
        pieces,
        paid: total,
        currency: key.currency(),
    })
}

/// Commit a purchase: deduct the wallet and apply the product.
pub fn purchase(
    acc: &mut Account,
    key: ProductKey,
    quantity: Quantity,
) -> Result<Purchase, PurchaseError> {
    let plan = plan(acc, key, quantity)?;

    let wallet = wallet_of(acc, plan.currency);
    set_wallet(acc, plan.currency, wallet - plan.paid);

    if let Some(flag) = key.owned_flag() {
        acc.set_d(flag, 1);
    }
    if let Some(stock) = key.stock_value() {
        let held = acc.get_d(stock);
        acc.set_d(stock, held + plan.pieces);
    }

    Ok(plan)
}

// ============================================================
// IAP tiers
// ============================================================

#[derive(Debug, Clone, Copy)]
pub struct IapTier {
    pub name: &'static str,
    /// Gems spent to convert this tier into coins.
    pub gems_cost: i32,
    /// Coins received from a conversion.
    pub coins_value: i32,
    /// Gems received when buying this tier for money.
    pub gems_value: i32,
    /// Money price in EUR.
    pub price_eur: f32,
}

pub const IAP_TIERS: [IapTier; 6] = [
    IapTier { name: "tier-1", gems_cost: 10, coins_value: 50, gems_value: 25, price_eur: 0.59 },
    IapTier { name: "tier-2", gems_cost: 20, coins_value: 100, gems_value: 50, price_eur: 1.14 },
    IapTier { name: "tier-3", gems_cost: 50, coins_value: 250, gems_value: 100, price_eur: 2.29 },
    IapTier { name: "tier-4", gems_cost: 100, coins_value: 500, gems_value: 275, price_eur: 5.49 },
    IapTier { name: "tier-5", gems_cost: 190, coins_value: 960, gems_value: 550, price_eur: 10.99 },
    IapTier { name: "tier-6", gems_cost: 380, coins_value: 1920, gems_value: 1200, price_eur: 21.99 },
];

/// Convert a tier's worth of gems into coins.
pub fn convert_gems_to_coins(acc: &mut Account, tier: usize) -> Result<(), PurchaseError> {
    let tier = &IAP_TIERS[tier];
    let gems = acc.get_d(account::WALLET_GEMS);

    if gems < tier.gems_cost {
        return Err(PurchaseError::InsufficientFunds {
            needed: tier.gems_cost - gems,
        });
    }

    acc.set_d(account::WALLET_GEMS, gems - tier.gems_cost);
    acc.add_coins(tier.coins_value);
    Ok(())
}

/// Credit a money-bought gem pack.
pub fn credit_gem_pack(acc: &mut Account, tier: usize) {
    let gems = acc.get_d(account::WALLET_GEMS);
    acc.set_d(account::WALLET_GEMS, gems + IAP_TIERS[tier].gems_value);
}

// ============================================================
// Expenses export
// ============================================================

/// Cents of value attributed to one gem in the export report.
pub const GEM_CENTS: i32 = 16;

/// Coins per gem when the export drains the coin wallet.
pub const COINS_PER_GEM: i32 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExpensesExport {
    pub gems_transferred: i32,
    pub total_cents: i32,
}

/// Drain the wallet into the expenses report: coins convert five-to-one
/// into gems (remainder stays), gems zero out, and the report values the
/// lot at 16 cents per gem.
pub fn export_expenses(acc: &mut Account) -> ExpensesExport {
    let coins = acc.get_d(account::WALLET_COINS);
    let gems_from_coins = coins / COINS_PER_GEM;
    acc.set_d(account::WALLET_COINS, coins % COINS_PER_GEM);

    let total_gems = gems_from_coins + acc.get_d(account::WALLET_GEMS);
    acc.set_d(account::WALLET_GEMS, 0);

    ExpensesExport {
        gems_transferred: total_gems,
        total_cents: total_gems * GEM_CENTS,
    }
}

// ============================================================
// Goal-screen shop notification
// ============================================================

/// The first still-unowned product the wallet (plus this level's score)
/// could pay for, cheapest threshold first.
pub fn product_available(acc: &Account, score: i32) -> Option<ProductKey> {
    let funds = acc.get_d(account::WALLET_COINS) + score;

    let thresholds = [
        (ProductKey::Mediation, 120),
        (ProductKey::Bonus, 180),
        (ProductKey::Balls, 250),
        (ProductKey::Levels, 310),
    ];

    thresholds
        .into_iter()
        .find(|&(key, at)| !owned(acc, key) && funds >= at)
        .map(|(key, _)| key)
}

// ============================================================
// Currency display
// ============================================================

/// Currency code shown next to the coin balance, by language tag.
pub fn currency_label(lang: &str) -> &'static str {
    if lang == "en_GB" {
        return "GBP";
    }

    match lang.get(..2).unwrap_or("en") {
        "de" | "es" | "fr" | "it" | "nl" => "EUR",
        "br" => "BRL",
        "ch" => "CHF",
        "hu" => "HUF",
        "ja" => "JPY",
        "ko" => "KRW",
        "id" => "IDR",
        "th" => "THB",
        _ => "USD",
    }
}

/// Money price rendered for the IAP grid.
pub fn format_price(lang: &str, eur: f32) -> String {
    format!("{:.2} {}", eur, currency_label(lang))
}

// ============================================================
// Tests
// ============================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::account::{Account, CONSUMABLE_EXTRALIVES, WALLET_COINS, WALLET_GEMS};

    fn rich() -> Account {
        let mut acc = Account::new();
        acc.set_d(WALLET_COINS, 1_000);
        acc.set_d(WALLET_GEMS, 200);
        acc
    }

    #[test]
    fn product_table() {
        assert_eq!(ProductKey::from_index(3), Some(ProductKey::Mediation));
        assert_eq!(ProductKey::from_index(8), None);
        assert_eq!(ProductKey::Mediation.cost(), 120);
        assert_eq!(ProductKey::ExtraBalls.currency(), Currency::Gems);
        assert!(!ProductKey::Bonus.consumable());
    }

    #[test]
    fn one_shot_products_cannot_repeat() {
        let mut acc = rich();
        purchase(&mut acc, ProductKey::Bonus, Quantity::One).unwrap();
        assert_eq!(acc.get_d(WALLET_COINS), 880);
        assert!(owned(&acc, ProductKey::Bonus));

        assert_eq!(
            purchase(&mut acc, ProductKey::Bonus, Quantity::One),
            Err(PurchaseError::AlreadyOwned)
        );
        assert_eq!(
            plan(&acc, ProductKey::Levels, Quantity::Five),
            Err(PurchaseError::NotConsumable)
        );
    }

    #[test]
    fn insufficient_funds_reports_shortfall() {
        let mut acc = Account::new();
        acc.set_d(WALLET_COINS, 100);
        assert_eq!(
            purchase(&mut acc, ProductKey::Mediation, Quantity::One),
            Err(PurchaseError::InsufficientFunds { needed: 20 })
        );
        // Nothing was deducted.
        assert_eq!(acc.get_d(WALLET_COINS), 100);
    }

    #[test]
    fn buy_five_consumables() {
        let mut acc = rich();
        let p = purchase(&mut acc, ProductKey::Speedifier, Quantity::Five).unwrap();
        assert_eq!(p.pieces, 5);
        assert_eq!(p.paid, 375);
        assert_eq!(acc.get_d(crate::account::CONSUMABLE_SPEEDIFIER), 6);
    }

    #[test]
    fn drain_wallet_leaves_change() {
        let mut acc = Account::new();
        acc.set_d(WALLET_COINS, 300);
        let p = purchase(&mut acc, ProductKey::Earninator, Quantity::DrainWallet).unwrap();
        // 75 + 75 + 75 = 225; a fourth piece would need 300 which is not
        // strictly under the wallet.
        assert_eq!(p.pieces, 3);
        assert_eq!(acc.get_d(WALLET_COINS), 75);
    }

    #[test]
    fn extra_balls_cap_trims_the_plan() {
        let mut acc = rich();
        acc.set_d(CONSUMABLE_EXTRALIVES, MAX_BALLS_LIMIT - 2);

        let p = purchase(&mut acc, ProductKey::ExtraBalls, Quantity::Five).unwrap();
        assert_eq!(p.pieces, 2);
        assert_eq!(acc.get_d(CONSUMABLE_EXTRALIVES), MAX_BALLS_LIMIT);

        assert_eq!(
            purchase(&mut acc, ProductKey::ExtraBalls, Quantity::One),
            Err(PurchaseError::MaxBalls)
        );
    }

    #[test]
    fn gems_pay_for_extra_balls() {
        let mut acc = rich();
        let p = purchase(&mut acc, ProductKey::ExtraBalls, Quantity::One).unwrap();
        assert_eq!(p.currency, Currency::Gems);
        assert_eq!(acc.get_d(WALLET_GEMS), 185);
        assert_eq!(acc.get_d(WALLET_COINS), 1_000);
    }

    #[test]
    fn gem_conversion_tiers() {
        let mut acc = Account::new();
        acc.set_d(WALLET_GEMS, 25);

        convert_gems_to_coins(&mut acc, 1).unwrap();
        assert_eq!(acc.get_d(WALLET_GEMS), 5);
        assert_eq!(acc.get_d(WALLET_COINS), 100);

        assert_eq!(
            convert_gems_to_coins(&mut acc, 5),
            Err(PurchaseError::InsufficientFunds { needed: 375 })
        );
    }

    #[test]
    fn gem_pack_credits() {
        let mut acc = Account::new();
        credit_gem_pack(&mut acc, 0);
        assert_eq!(acc.get_d(WALLET_GEMS), 40);
    }

    #[test]
    fn expenses_export_math() {
        let mut acc = Account::new();
        acc.set_d(WALLET_COINS, 23);
        acc.set_d(WALLET_GEMS, 3);

        let report = export_expenses(&mut acc);
        // 23 coins -> 4 gems with 3 coins change, plus 3 held gems.
        assert_eq!(report.gems_transferred, 7);
        assert_eq!(report.total_cents, 112);
        assert_eq!(acc.get_d(WALLET_COINS), 3);
        assert_eq!(acc.get_d(WALLET_GEMS), 0);
    }

    #[test]
    fn shop_notification_prefers_cheapest_unowned() {
        let mut acc = Account::new();
        acc.set_d(WALLET_COINS, 100);
        assert_eq!(product_available(&acc, 30), Some(ProductKey::Mediation));

        acc.set_d(crate::account::PRODUCT_MEDIATION, 1);
        assert_eq!(product_available(&acc, 30), None);
        assert_eq!(product_available(&acc, 90), Some(ProductKey::Bonus));
    }

    #[test]
    fn currency_labels() {
        assert_eq!(currency_label("de_DE"), "EUR");
        assert_eq!(currency_label("en_GB"), "GBP");
        assert_eq!(currency_label("en_US"), "USD");
        assert_eq!(currency_label(""), "USD");
        assert_eq!(format_price("ja", 0.59), "0.59 JPY");
    }
}
