// st_shop.rs — the shop
//
// Storefront, purchase confirmation, the gems/coins top-up grid and the
// expenses export. All price arithmetic lives in the shop module; these
// screens only gate on policy/registration and present the results.
// Buying requires a registered player name so purchases land in a real
// account file.

use rollway_common::config;

use crate::account;
use crate::audio::AUD_BUY_PRODUCT;
use crate::gui::{
    FontSize, Token, Trunc, WidgetId, GLYPH_DIAMOND, GUI_ALL, GUI_GRN, GUI_GRY, GUI_RED, GUI_WHT,
    GUI_YEL, NONE,
};
use crate::shop::{self, Currency, ProductKey, PurchaseError, Quantity, IAP_TIERS};
use crate::state::{AnimDir, Ctx, Screen, ScreenId};
use crate::transition::Intent;

use super::st_name::goto_name;
use super::st_shared::{action_gate, player_name_ok};

// ============================================================
// Entry points
// ============================================================

/// Open the top-up grid. `min` filters tiers that cannot cover a
/// pending transaction; `gems` selects the money page.
pub fn goto_shop_iap(
    ctx: &mut Ctx,
    ok: ScreenId,
    cancel: ScreenId,
    min: i32,
    gems: bool,
    multipage: bool,
) {
    ctx.links.iap_ok = ok;
    ctx.links.iap_cancel = cancel;
    ctx.links.iap_min = min;
    ctx.links.iap_page_gems = gems;
    ctx.links.iap_multipage = multipage;
    ctx.goto_full(ScreenId::ShopIap, AnimDir::None, AnimDir::None, false);
}

/// Renaming from the shop warns first: a new name is a new account.
pub fn goto_shop_rename(ctx: &mut Ctx, ok: ScreenId, cancel: ScreenId, draw_back: bool) {
    ctx.links.name_ok = ok;
    ctx.links.name_cancel = cancel;
    ctx.links.name_draw_back = draw_back;

    if ctx.cfg.get_s(config::PLAYER).chars().count() < 3 {
        goto_name(ctx, ok, cancel, draw_back);
    } else {
        ctx.goto(ScreenId::ShopRename);
    }
}

fn policy_on(ctx: &Ctx, p: rollway_common::config::PolicyD) -> bool {
    ctx.policy.get_d(p) != 0
}

fn registered(ctx: &Ctx) -> bool {
    player_name_ok(ctx.cfg.get_s(config::PLAYER))
}

fn save_account(ctx: &mut Ctx) {
    let path = ctx.dirs.account_file();
    if let Err(e) = ctx.account.save(&path) {
        log::error!("account save: {e}");
    }
}

// ============================================================
// Storefront
// ============================================================

const SHOP_CHANGE_NAME: Token = Token::Action(1);
const SHOP_IAP: Token = Token::Action(2);
const SHOP_BUY: Token = Token::Action(3);

pub struct ShopScreen;

impl ShopScreen {
    fn product_tile(ctx: &mut Ctx, parent: WidgetId, key: ProductKey) {
        let tile = ctx.gui.vstack(parent);
        ctx.gui.space(tile);

        let owned = shop::owned(&ctx.account, key);
        let color = if owned { GUI_GRN } else { GUI_WHT };

        let name_id = ctx.gui.label(tile, "XXXXXXXXX", FontSize::Sml, GUI_WHT, color);
        ctx.gui.set_trunc(name_id, Trunc::Tail);
        ctx.gui.set_label(name_id, key.name());

        let (w, h) = ctx.gui.view();
        let image = format!("gui/shop/{}.jpg", key.name().to_lowercase().replace(' ', "_"));
        ctx.gui.image(tile, &image, w / 6, h / 6);
        ctx.gui.filler(tile);

        let token = if owned { Token::None } else { SHOP_BUY };
        ctx.gui.set_state(tile, token, key.index());
    }

    fn build(ctx: &mut Ctx) -> WidgetId {
        let coins = ctx.account.get_d(account::WALLET_COINS);
        let gems = ctx.account.get_d(account::WALLET_GEMS);

        let id = ctx.gui.vstack(NONE);

        // Wallet header.
        let bar = ctx.gui.hstack(id);
        if ctx.console.is_pc() && registered(ctx) && policy_on(ctx, config::POLICY_SHOP_ENABLED_IAP)
        {
            ctx.gui.state(bar, "+", FontSize::Sml, SHOP_IAP, 0);
        }

        ctx.gui.label(
            bar,
            &format!("{GLYPH_DIAMOND}: {gems}"),
            FontSize::Sml,
            GUI_WHT,
            crate::gui::GUI_CYA,
        );
        ctx.gui.space(bar);

        let currency = shop::currency_label(ctx.cfg.get_s(config::LANGUAGE));
        ctx.gui.label(
            bar,
            &format!("{currency}: {coins}"),
            FontSize::Sml,
            GUI_WHT,
            GUI_YEL,
        );

        if registered(ctx) {
            ctx.gui.space(bar);
            let player_id = ctx.gui.label(bar, "XXXXXXXXXXXX", FontSize::Sml, GUI_WHT, GUI_YEL);
            ctx.gui.set_trunc(player_id, Trunc::Tail);
            let player = ctx.cfg.get_s(config::PLAYER).to_string();
            ctx.gui.set_label(player_id, &player);
            if !ctx.wgcl.name_read_only() {
                ctx.gui.set_state(player_id, SHOP_CHANGE_NAME, 0);
            }
        }

        ctx.gui.filler(bar);
        if ctx.console.is_pc() {
            ctx.gui.space(bar);
            ctx.gui.start(bar, "Back", FontSize::Sml, Token::Back, 0);
        }

        ctx.gui.space(id);

        // Product grid.
        let grid = ctx.gui.hstack(id);
        ctx.gui.filler(grid);

        let consumables_open = policy_on(ctx, config::POLICY_SHOP_ENABLED_CONSUMABLES)
            && (ctx.account.get_d(account::SET_UNLOCKS) > 0
                || ctx.policy.get_d(config::POLICY_EDITION) > 1);

        if consumables_open {
            let col = ctx.gui.vstack(grid);
            Self::product_tile(ctx, col, ProductKey::Speedifier);
            Self::product_tile(ctx, col, ProductKey::ExtraBalls);

            let col = ctx.gui.vstack(grid);
            Self::product_tile(ctx, col, ProductKey::Earninator);
            Self::product_tile(ctx, col, ProductKey::Floatifier);

            ctx.gui.space(grid);
        }

        if policy_on(ctx, config::POLICY_SHOP_ENABLED_MANAGED) {
            let col = ctx.gui.vstack(grid);
            Self::product_tile(ctx, col, ProductKey::Bonus);
            Self::product_tile(ctx, col, ProductKey::Mediation);

            let col = ctx.gui.vstack(grid);
            Self::product_tile(ctx, col, ProductKey::Levels);
            Self::product_tile(ctx, col, ProductKey::Balls);
        }

        ctx.gui.filler(grid);

        // Consumable stock line.
        if consumables_open {
            ctx.gui.space(id);
            let stock = ctx.gui.hstack(id);
            ctx.gui.filler(stock);
            let line = format!(
                "Balls ({})  Speedifier ({})  Floatifier ({})  Earninator ({})",
                ctx.account.get_d(account::CONSUMABLE_EXTRALIVES),
                ctx.account.get_d(account::CONSUMABLE_SPEEDIFIER),
                ctx.account.get_d(account::CONSUMABLE_FLOATIFIER),
                ctx.account.get_d(account::CONSUMABLE_EARNINATOR),
            );
            ctx.gui.label(stock, &line, FontSize::Sml, GUI_WHT, crate::gui::GUI_CYA);
            ctx.gui.filler(stock);
            ctx.gui.set_rect(stock, GUI_ALL);
        }

        ctx.gui.layout(id, 0, 0);
        id
    }
}

impl Screen for ShopScreen {
    fn enter(&mut self, ctx: &mut Ctx, _prev: ScreenId, _intent: Intent) -> WidgetId {
        Self::build(ctx)
    }

    fn paint(&self, ctx: &Ctx, id: WidgetId, _t: f32, renderer: &mut dyn crate::gui::Renderer) {
        ctx.gui.paint(id, renderer);
        ctx.console
            .paint(&ctx.gui, crate::console_control::HintBar::Shop, renderer);
    }

    fn buttn(&mut self, ctx: &mut Ctx, b: i32, d: bool) -> bool {
        if d {
            if ctx.cfg.tst_d(config::JOYSTICK_BUTTON_A, b) {
                let active = ctx.gui.active();
                let token = ctx.gui.token(active);
                let value = ctx.gui.value(active);
                return self.action(ctx, token, value);
            }
            if ctx.cfg.tst_d(config::JOYSTICK_BUTTON_B, b) {
                return self.action(ctx, Token::Back, 0);
            }
            if ctx.cfg.tst_d(config::JOYSTICK_BUTTON_Y, b)
                && policy_on(ctx, config::POLICY_SHOP_ENABLED_IAP)
            {
                return self.action(ctx, SHOP_IAP, 0);
            }
        }
        true
    }

    fn action(&mut self, ctx: &mut Ctx, token: Token, value: i32) -> bool {
        if !action_gate(ctx, token) {
            return true;
        }

        match token {
            Token::Back => {
                ctx.goto_full(ScreenId::Title, AnimDir::N, AnimDir::None, false);
            }

            SHOP_CHANGE_NAME => {
                goto_shop_rename(ctx, ScreenId::Shop, ScreenId::Shop, false);
            }

            SHOP_IAP => {
                if registered(ctx) {
                    goto_shop_iap(ctx, ScreenId::Shop, ScreenId::Shop, 0, false, true);
                }
            }

            SHOP_BUY => {
                let Some(key) = ProductKey::from_index(value) else {
                    return true;
                };
                ctx.links.shop_product = Some(key);
                ctx.links.shop_use_gems = key.currency() == Currency::Gems;

                if registered(ctx) {
                    ctx.goto(ScreenId::ShopBuy);
                } else {
                    ctx.goto(ScreenId::ShopUnregistered);
                }
            }

            _ => {}
        }
        true
    }
}

// ============================================================
// Rename warning
// ============================================================

const RENAME_YES: Token = Token::Action(1);

pub struct ShopRenameScreen;

impl Screen for ShopRenameScreen {
    fn enter(&mut self, ctx: &mut Ctx, _prev: ScreenId, _intent: Intent) -> WidgetId {
        let id = ctx.gui.vstack(NONE);
        ctx.gui
            .title_header(id, "Rename player?", FontSize::Med, GUI_GRY, GUI_RED);
        ctx.gui.space(id);
        ctx.gui.multi(
            id,
            "Renaming players will log in\nto another account.",
            FontSize::Sml,
            GUI_WHT,
            GUI_WHT,
        );
        ctx.gui.space(id);

        let buttons = ctx.gui.harray(id);
        ctx.gui.start(buttons, "No", FontSize::Sml, Token::Back, 0);
        ctx.gui.state(buttons, "Yes", FontSize::Sml, RENAME_YES, 0);

        ctx.gui.layout(id, 0, 0);
        id
    }

    fn action(&mut self, ctx: &mut Ctx, token: Token, _value: i32) -> bool {
        if !action_gate(ctx, token) {
            return true;
        }

        match token {
            RENAME_YES => {
                save_account(ctx);
                let (ok, cancel, back) = (
                    ctx.links.name_ok,
                    ctx.links.name_cancel,
                    ctx.links.name_draw_back,
                );
                goto_name(ctx, ok, cancel, back);
            }
            _ => ctx.goto(ctx.links.name_cancel),
        }
        true
    }
}

// ============================================================
// Unregistered gate
// ============================================================

const UNREGISTERED_YES: Token = Token::Action(1);

pub struct ShopUnregisteredScreen;

impl Screen for ShopUnregisteredScreen {
    fn enter(&mut self, ctx: &mut Ctx, _prev: ScreenId, _intent: Intent) -> WidgetId {
        let player = ctx.cfg.get_s(config::PLAYER);
        let invalid = super::st_shared::has_reserved_chars(player);
        let too_short = !player.is_empty() && player.chars().count() < 3;

        let (title, body) = if invalid {
            (
                "Invalid Player Name!",
                "Your player name uses reserved\ncharacters! Would you like to fix\nthe name before you buy?",
            )
        } else if too_short {
            (
                "Too few characters!",
                "Your player name is too short!\nWould you like to extend it\nbefore you buy?",
            )
        } else {
            (
                "Unregistered!",
                "You haven't registered a player name yet!\nWould you like to register now before you buy?",
            )
        };

        let id = ctx.gui.vstack(NONE);
        ctx.gui.title_header(id, title, FontSize::Med, GUI_GRY, GUI_RED);
        ctx.gui.space(id);
        ctx.gui.multi(id, body, FontSize::Sml, GUI_WHT, GUI_WHT);
        ctx.gui.space(id);

        let buttons = ctx.gui.harray(id);
        ctx.gui.start(buttons, "No", FontSize::Sml, Token::Back, 0);
        ctx.gui.state(buttons, "Yes", FontSize::Sml, UNREGISTERED_YES, 0);

        ctx.gui.layout(id, 0, 0);
        id
    }

    fn action(&mut self, ctx: &mut Ctx, token: Token, _value: i32) -> bool {
        if !action_gate(ctx, token) {
            return true;
        }

        match token {
            UNREGISTERED_YES => goto_name(ctx, ScreenId::ShopBuy, ScreenId::Shop, false),
            _ => ctx.goto(ScreenId::Shop),
        }
        true
    }
}

// ============================================================
// Top-up grid
// ============================================================

const IAP_BUY: Token = Token::Action(1);
const IAP_SWITCH: Token = Token::Action(2);
const IAP_EXPORT: Token = Token::Action(3);

pub struct ShopIapScreen;

impl ShopIapScreen {
    fn build(ctx: &mut Ctx) -> WidgetId {
        let coins = ctx.account.get_d(account::WALLET_COINS);
        let gems = ctx.account.get_d(account::WALLET_GEMS);
        let gems_page = ctx.links.iap_page_gems;
        let min = ctx.links.iap_min;

        let id = ctx.gui.vstack(NONE);

        let bar = ctx.gui.hstack(id);
        let wallet = if gems_page {
            format!("You have {gems} Gems")
        } else {
            format!("You have {coins} Coins")
        };
        ctx.gui.label(bar, &wallet, FontSize::Sml, GUI_YEL, GUI_RED);

        if ctx.links.iap_multipage {
            ctx.gui.space(bar);
            let label = if gems_page { "Switch to Coins" } else { "Switch to Gems" };
            ctx.gui.state(bar, label, FontSize::Sml, IAP_SWITCH, 0);
        }

        ctx.gui.filler(bar);
        ctx.gui.space(bar);
        if ctx.console.is_pc() {
            ctx.gui.start(bar, "Back", FontSize::Sml, Token::Back, 0);
        }

        if min > 0 {
            ctx.gui.space(id);
            let wallet_now = if gems_page { gems } else { coins };
            let need = (min - wallet_now).max(0);
            let kind = if gems_page { "gems" } else { "coins" };
            ctx.gui.label(
                id,
                &format!("Need {need} {kind} to complete the transaction!"),
                FontSize::Sml,
                GUI_RED,
                GUI_RED,
            );
        }

        ctx.gui.space(id);

        let grid = ctx.gui.hstack(id);
        ctx.gui.filler(grid);
        let (w, h) = ctx.gui.view();

        for (tier, info) in IAP_TIERS.iter().enumerate() {
            if gems_page {
                // Money page: skip packs too small for the pending
                // transaction.
                if min > 0 && info.gems_value < min - gems {
                    continue;
                }

                let cell = ctx.gui.vstack(grid);
                ctx.gui
                    .image(cell, &format!("gui/shop/gems-{}.png", info.name), w / 7, h / 5);
                let lang = ctx.cfg.get_s(config::LANGUAGE).to_string();
                let price = shop::format_price(&lang, info.price_eur);
                ctx.gui.label(cell, &price, FontSize::Sml, GUI_WHT, GUI_WHT);
                ctx.gui.filler(cell);
                ctx.gui.set_state(cell, IAP_BUY, tier as i32);
            } else {
                if min > 0 && info.coins_value < min - coins {
                    continue;
                }

                let affordable = gems >= info.gems_cost;
                let color = if affordable { GUI_WHT } else { GUI_RED };
                let token = if affordable { IAP_BUY } else { Token::None };

                let cell = ctx.gui.vstack(grid);
                ctx.gui
                    .image(cell, &format!("gui/shop/coins-{}.png", info.name), w / 7, h / 5);
                ctx.gui.label(
                    cell,
                    &format!("{GLYPH_DIAMOND} {}", info.gems_cost),
                    FontSize::Sml,
                    color,
                    color,
                );
                ctx.gui.filler(cell);
                ctx.gui.set_state(cell, token, tier as i32);
            }
        }

        ctx.gui.filler(grid);

        // Drain-everything escape hatch for managed deployments.
        if ctx.policy.get_d(config::POLICY_EDITION) >= 10_000
            && (coins / shop::COINS_PER_GEM >= 1 || gems >= 1)
            && min == 0
        {
            ctx.gui.space(id);
            ctx.gui
                .state(id, "Export to Expenses", FontSize::Sml, IAP_EXPORT, 0);
        }

        ctx.gui.layout(id, 0, 0);
        id
    }
}

impl Screen for ShopIapScreen {
    fn enter(&mut self, ctx: &mut Ctx, _prev: ScreenId, _intent: Intent) -> WidgetId {
        Self::build(ctx)
    }

    fn paint(&self, ctx: &Ctx, id: WidgetId, _t: f32, renderer: &mut dyn crate::gui::Renderer) {
        ctx.gui.paint(id, renderer);
        ctx.console
            .paint(&ctx.gui, crate::console_control::HintBar::GetCoins, renderer);
    }

    fn action(&mut self, ctx: &mut Ctx, token: Token, value: i32) -> bool {
        if !action_gate(ctx, token) {
            return true;
        }

        match token {
            Token::Back => ctx.goto(ctx.links.iap_cancel),

            IAP_BUY => {
                let tier = value as usize;
                if ctx.links.iap_page_gems {
                    // Money purchase fulfilled by the external payment
                    // surface; the pack credits on completion.
                    shop::credit_gem_pack(&mut ctx.account, tier);
                    save_account(ctx);
                    ctx.audio.play(AUD_BUY_PRODUCT, 1.0);
                    ctx.goto(ctx.links.iap_ok);
                } else {
                    match shop::convert_gems_to_coins(&mut ctx.account, tier) {
                        Ok(()) => {
                            let info = &IAP_TIERS[tier];
                            log::info!(
                                "converted {} gems to {} coins",
                                info.gems_cost,
                                info.coins_value
                            );
                            save_account(ctx);
                            ctx.audio.play(AUD_BUY_PRODUCT, 1.0);
                            ctx.goto(ctx.links.iap_ok);
                        }
                        Err(e) => log::warn!("conversion refused: {e}"),
                    }
                }
            }

            IAP_SWITCH => {
                ctx.links.iap_page_gems = !ctx.links.iap_page_gems;
                let dir = if ctx.links.iap_page_gems { AnimDir::W } else { AnimDir::E };
                ctx.goto_full(ScreenId::ShopIap, dir, AnimDir::None, false);
            }

            IAP_EXPORT => ctx.goto(ScreenId::ExpensesExport),

            _ => {}
        }
        true
    }
}

// ============================================================
// Purchase confirmation
// ============================================================

const BUY_YES: Token = Token::Action(1);
const BUY_FIVE: Token = Token::Action(2);
const BUY_WHOLE: Token = Token::Action(3);
const BUY_IAP: Token = Token::Action(4);

#[derive(Default)]
pub struct ShopBuyScreen {
    /// Five/drain purchases confirm on a second screen.
    confirm: Option<Quantity>,
}

impl ShopBuyScreen {
    fn commit(&mut self, ctx: &mut Ctx, quantity: Quantity) {
        let Some(key) = ctx.links.shop_product else {
            ctx.goto(ScreenId::Shop);
            return;
        };

        match shop::purchase(&mut ctx.account, key, quantity) {
            Ok(_) => {
                ctx.audio.play(AUD_BUY_PRODUCT, 1.0);
                save_account(ctx);
                ctx.goto(ScreenId::Shop);
            }
            Err(e) => {
                log::warn!("purchase failed: {e}");
                ctx.goto(ScreenId::Shop);
            }
        }
    }

    fn confirm_gui(&mut self, ctx: &mut Ctx, quantity: Quantity) -> WidgetId {
        let key = ctx.links.shop_product.unwrap_or(ProductKey::Bonus);
        let plan = shop::plan(&ctx.account, key, quantity);

        let id = ctx.gui.vstack(NONE);
        ctx.gui
            .title_header(id, "Buy multiple Products?", FontSize::Med, GUI_YEL, GUI_RED);
        ctx.gui.space(id);

        let body = match plan {
            Ok(p) => {
                let unit = if p.currency == Currency::Gems { "Gems" } else { "Coins" };
                format!(
                    "You're trying to buy multiple Products!\n{} {} costs {} {}.",
                    p.pieces,
                    key.name(),
                    p.paid,
                    unit
                )
            }
            Err(ref e) => e.to_string(),
        };
        ctx.gui.multi(id, &body, FontSize::Sml, GUI_WHT, GUI_WHT);
        ctx.gui.space(id);

        let buttons = ctx.gui.harray(id);
        ctx.gui.start(buttons, "No", FontSize::Sml, Token::Back, 0);
        if plan.is_ok() {
            let token = if quantity == Quantity::DrainWallet { BUY_WHOLE } else { BUY_FIVE };
            ctx.gui.state(buttons, "Yes", FontSize::Sml, token, 0);
        }

        ctx.gui.layout(id, 0, 0);
        id
    }

    fn offer_gui(&mut self, ctx: &mut Ctx) -> WidgetId {
        let key = ctx.links.shop_product.unwrap_or(ProductKey::Bonus);
        let owned = shop::owned(&ctx.account, key);
        let single = shop::plan(&ctx.account, key, Quantity::One);
        let iap_on = policy_on(ctx, config::POLICY_SHOP_ENABLED_IAP);

        let id = ctx.gui.vstack(NONE);

        let title = match &single {
            _ if owned => "Product owned!",
            Err(PurchaseError::MaxBalls) => "Max balls!",
            Err(PurchaseError::InsufficientFunds { .. }) => "Insufficient wallet!",
            _ => "Buy Products?",
        };
        let title_color = if matches!(single, Ok(_)) { GUI_YEL } else { GUI_GRY };
        ctx.gui.title_header(id, title, FontSize::Med, title_color, GUI_RED);
        ctx.gui.space(id);

        let unit = if key.currency() == Currency::Gems { "gems" } else { "coins" };

        match single {
            _ if owned => {
                ctx.gui.multi(
                    id,
                    "You already own this product,\nso don't buy it again!",
                    FontSize::Sml,
                    GUI_WHT,
                    GUI_WHT,
                );
                ctx.gui.space(id);
                ctx.gui.start(id, "Buy more!", FontSize::Sml, Token::Back, 0);
            }

            Err(PurchaseError::MaxBalls) => {
                let body = format!(
                    "You can't stock more than {} balls\nfor a single level set.",
                    shop::MAX_BALLS_LIMIT
                );
                ctx.gui.multi(id, &body, FontSize::Sml, GUI_WHT, GUI_WHT);
                ctx.gui.space(id);
                ctx.gui.start(id, "Sorry, I'm too excited!", FontSize::Sml, Token::Back, 0);
            }

            Ok(_) => {
                let body = format!(
                    "Would you like to buy this Product?\n{} costs {} {}.",
                    key.name(),
                    key.cost(),
                    unit
                );
                ctx.gui.multi(id, &body, FontSize::Sml, GUI_WHT, GUI_WHT);

                if key.consumable() && shop::has_enough(&ctx.account, key, 5) {
                    ctx.gui.space(id);
                    ctx.gui
                        .state(id, "Unload balance and buy!", FontSize::Sml, BUY_WHOLE, 0);
                    ctx.gui.space(id);
                    ctx.gui
                        .state(id, "Buy 5 products!", FontSize::Sml, BUY_FIVE, 0);
                }

                ctx.gui.space(id);
                let buttons = ctx.gui.harray(id);
                ctx.gui.start(buttons, "No", FontSize::Sml, Token::Back, 0);
                ctx.gui.state(buttons, "Yes", FontSize::Sml, BUY_YES, 0);
            }

            Err(PurchaseError::InsufficientFunds { .. }) => {
                let body = if iap_on {
                    format!(
                        "You need at least {} {} to buy {},\nbut you can top up from the shop.",
                        key.cost(),
                        unit,
                        key.name()
                    )
                } else {
                    format!("You need at least {} {} to buy {}.", key.cost(), unit, key.name())
                };
                ctx.gui.multi(id, &body, FontSize::Sml, GUI_WHT, GUI_WHT);
                ctx.gui.space(id);

                let buttons = ctx.gui.harray(id);
                ctx.gui.start(buttons, "Back", FontSize::Sml, Token::Back, 0);
                let label = if key.currency() == Currency::Gems { "Get Gems!" } else { "Get coins!" };
                let get_id = ctx.gui.state(buttons, label, FontSize::Sml, BUY_IAP, 0);
                if !iap_on {
                    ctx.gui.set_color(get_id, GUI_GRY, GUI_GRY);
                    ctx.gui.set_state(get_id, Token::None, 0);
                }
            }

            Err(_) => {
                ctx.gui.start(id, "Back", FontSize::Sml, Token::Back, 0);
            }
        }

        ctx.gui.layout(id, 0, 0);
        id
    }
}

impl Screen for ShopBuyScreen {
    fn enter(&mut self, ctx: &mut Ctx, _prev: ScreenId, _intent: Intent) -> WidgetId {
        match self.confirm {
            Some(quantity) => self.confirm_gui(ctx, quantity),
            None => self.offer_gui(ctx),
        }
    }

    fn action(&mut self, ctx: &mut Ctx, token: Token, _value: i32) -> bool {
        if !action_gate(ctx, token) {
            return true;
        }

        match token {
            Token::Back => {
                self.confirm = None;
                ctx.goto(ScreenId::Shop);
            }

            BUY_YES => self.commit(ctx, Quantity::One),

            BUY_FIVE => {
                if self.confirm.is_none() {
                    self.confirm = Some(Quantity::Five);
                    ctx.goto(ScreenId::ShopBuy);
                } else {
                    self.confirm = None;
                    self.commit(ctx, Quantity::Five);
                }
            }

            BUY_WHOLE => {
                if self.confirm.is_none() {
                    self.confirm = Some(Quantity::DrainWallet);
                    ctx.goto(ScreenId::ShopBuy);
                } else {
                    self.confirm = None;
                    self.commit(ctx, Quantity::DrainWallet);
                }
            }

            BUY_IAP => {
                let key = ctx.links.shop_product.unwrap_or(ProductKey::Bonus);
                let gems = key.currency() == Currency::Gems;
                goto_shop_iap(ctx, ScreenId::ShopBuy, ScreenId::Shop, key.cost(), gems, false);
            }

            _ => {}
        }
        true
    }
}

// ============================================================
// Expenses export
// ============================================================

const EXPORT_START: Token = Token::Action(1);

#[derive(Default)]
pub struct ExpensesExportScreen {
    exported: Option<shop::ExpensesExport>,
}

impl Screen for ExpensesExportScreen {
    fn enter(&mut self, ctx: &mut Ctx, prev: ScreenId, _intent: Intent) -> WidgetId {
        if prev == ScreenId::ShopIap {
            self.exported = None;
        }

        let id = ctx.gui.vstack(NONE);

        if let Some(report) = self.exported {
            ctx.gui
                .title_header(id, "Exported to Expenses", FontSize::Med, GUI_WHT, GUI_WHT);
            ctx.gui.space(id);

            let whole = report.total_cents / 100;
            let cents = report.total_cents % 100;
            let body = format!(
                "We have {whole},{cents:02} EUR on your file.\n{} Gems have been transferred.\nConsider opening your Expenses app.",
                report.gems_transferred
            );
            ctx.gui.multi(id, &body, FontSize::Sml, GUI_WHT, GUI_WHT);
            ctx.gui.space(id);
            ctx.gui.start(id, "OK", FontSize::Sml, Token::Back, 0);
        } else {
            ctx.gui
                .title_header(id, "Export to Expenses?", FontSize::Med, GUI_WHT, GUI_WHT);
            ctx.gui.space(id);
            ctx.gui.multi(
                id,
                "Export Gems and transfer them to the Expenses app?",
                FontSize::Sml,
                GUI_WHT,
                GUI_WHT,
            );
            ctx.gui.space(id);

            let buttons = ctx.gui.harray(id);
            ctx.gui.start(buttons, "No", FontSize::Sml, Token::Back, 0);
            ctx.gui.state(buttons, "Yes", FontSize::Sml, EXPORT_START, 0);
        }

        ctx.gui.layout(id, 0, 0);
        id
    }

    fn action(&mut self, ctx: &mut Ctx, token: Token, _value: i32) -> bool {
        if !action_gate(ctx, token) {
            return true;
        }

        match token {
            EXPORT_START => {
                ctx.audio.play(AUD_BUY_PRODUCT, 1.0);
                self.exported = Some(shop::export_expenses(&mut ctx.account));
                save_account(ctx);
                ctx.goto(ScreenId::ExpensesExport);
            }
            _ => ctx.goto(ScreenId::Shop),
        }
        true
    }
}

// ============================================================
// Tests
// ============================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::account::{PRODUCT_BONUS, PRODUCT_LEVELS};
    use crate::keys::{AXIS_X0, BUTTON_LEFT, KEY_EXIT};
    use crate::screens::testutil::machine;

    fn registered_rich(ctx: &mut Ctx) {
        ctx.cfg.set_s(config::PLAYER, "Marble");
        ctx.account.set_d(account::WALLET_COINS, 500);
        ctx.account.set_d(account::WALLET_GEMS, 100);
    }

    #[test]
    fn back_returns_to_title() {
        let (mut sm, mut ctx, _dir) = machine(ScreenId::Title);
        registered_rich(&mut ctx);

        ctx.goto(ScreenId::Shop);
        sm.tick(&mut ctx, 0.0);
        assert_eq!(sm.curr(), Some(ScreenId::Shop));

        sm.keybd(&mut ctx, KEY_EXIT, true);
        assert_eq!(sm.curr(), Some(ScreenId::Title));
    }

    #[test]
    fn unregistered_buy_gates_to_name_entry() {
        let (mut sm, mut ctx, _dir) = machine(ScreenId::Title);
        ctx.account.set_d(account::WALLET_COINS, 500);

        ctx.goto(ScreenId::Shop);
        sm.tick(&mut ctx, 0.0);

        ctx.links.shop_product = Some(ProductKey::Bonus);
        // Simulate activating a product tile while unregistered.
        let mut shop = ShopScreen;
        shop.action(&mut ctx, SHOP_BUY, ProductKey::Bonus.index());
        sm.tick(&mut ctx, 0.0);
        assert_eq!(sm.curr(), Some(ScreenId::ShopUnregistered));

        // Yes leads into name entry.
        sm.stick(&mut ctx, AXIS_X0, 1.0);
        sm.click(&mut ctx, BUTTON_LEFT, true);
        assert_eq!(sm.curr(), Some(ScreenId::Name));
    }

    #[test]
    fn buy_single_product_deducts_and_marks_owned() {
        let (mut sm, mut ctx, _dir) = machine(ScreenId::Title);
        registered_rich(&mut ctx);
        ctx.links.shop_product = Some(ProductKey::Bonus);
        ctx.links.shop_use_gems = false;

        ctx.goto(ScreenId::ShopBuy);
        sm.tick(&mut ctx, 0.0);

        sm.stick(&mut ctx, AXIS_X0, 1.0);
        sm.click(&mut ctx, BUTTON_LEFT, true);

        assert_eq!(sm.curr(), Some(ScreenId::Shop));
        assert_eq!(ctx.account.get_d(account::WALLET_COINS), 380);
        assert_eq!(ctx.account.get_d(PRODUCT_BONUS), 1);
    }

    #[test]
    fn buy_five_asks_for_confirmation_first() {
        let (mut sm, mut ctx, _dir) = machine(ScreenId::Title);
        registered_rich(&mut ctx);
        ctx.links.shop_product = Some(ProductKey::Speedifier);

        ctx.goto(ScreenId::ShopBuy);
        sm.tick(&mut ctx, 0.0);

        let mut buy = ShopBuyScreen::default();
        buy.action(&mut ctx, BUY_FIVE, 0);
        sm.tick(&mut ctx, 0.0);
        // Still on ShopBuy, but nothing deducted yet.
        assert_eq!(sm.curr(), Some(ScreenId::ShopBuy));
        assert_eq!(ctx.account.get_d(account::WALLET_COINS), 500);

        buy.action(&mut ctx, BUY_FIVE, 0);
        sm.tick(&mut ctx, 0.0);
        assert_eq!(ctx.account.get_d(account::WALLET_COINS), 125);
        assert_eq!(ctx.account.get_d(account::CONSUMABLE_SPEEDIFIER), 6);
    }

    #[test]
    fn insufficient_funds_offers_topup_and_min_filters_tiers() {
        let (mut sm, mut ctx, _dir) = machine(ScreenId::Title);
        ctx.cfg.set_s(config::PLAYER, "Marble");
        ctx.account.set_d(account::WALLET_COINS, 10);
        ctx.account.set_d(account::WALLET_GEMS, 100);
        ctx.links.shop_product = Some(ProductKey::Levels);

        ctx.goto(ScreenId::ShopBuy);
        sm.tick(&mut ctx, 0.0);

        let mut trace = crate::gui::TraceRenderer::default();
        sm.paint(&mut ctx, 0.0, &mut trace);
        assert!(trace.texts.iter().any(|t| t == "Get coins!"));

        // Take the top-up route.
        sm.stick(&mut ctx, AXIS_X0, 1.0);
        sm.click(&mut ctx, BUTTON_LEFT, true);
        assert_eq!(sm.curr(), Some(ScreenId::ShopIap));
        assert_eq!(ctx.links.iap_min, 250);

        // Tier grid only offers conversions large enough to cover the
        // missing 240 coins: tier-3 (250) up.
        let mut trace = crate::gui::TraceRenderer::default();
        sm.paint(&mut ctx, 0.0, &mut trace);
        assert!(!trace.images.iter().any(|p| p.contains("coins-tier-1")));
        assert!(trace.images.iter().any(|p| p.contains("coins-tier-3")));
    }

    #[test]
    fn gem_conversion_credits_coins_and_returns() {
        let (mut sm, mut ctx, _dir) = machine(ScreenId::Title);
        registered_rich(&mut ctx);

        goto_shop_iap(&mut ctx, ScreenId::Shop, ScreenId::Shop, 0, false, true);
        sm.tick(&mut ctx, 0.0);

        let mut iap = ShopIapScreen;
        iap.action(&mut ctx, IAP_BUY, 2);
        sm.tick(&mut ctx, 0.0);

        assert_eq!(sm.curr(), Some(ScreenId::Shop));
        assert_eq!(ctx.account.get_d(account::WALLET_GEMS), 50);
        assert_eq!(ctx.account.get_d(account::WALLET_COINS), 750);
    }

    #[test]
    fn expenses_export_flow() {
        let (mut sm, mut ctx, _dir) = machine(ScreenId::Title);
        registered_rich(&mut ctx);
        ctx.policy.set_d(config::POLICY_EDITION, 10_000);

        goto_shop_iap(&mut ctx, ScreenId::Shop, ScreenId::Shop, 0, false, false);
        sm.tick(&mut ctx, 0.0);

        let mut iap = ShopIapScreen;
        iap.action(&mut ctx, IAP_EXPORT, 0);
        sm.tick(&mut ctx, 0.0);
        assert_eq!(sm.curr(), Some(ScreenId::ExpensesExport));

        sm.stick(&mut ctx, AXIS_X0, 1.0);
        sm.click(&mut ctx, BUTTON_LEFT, true);

        // 500 coins -> 100 gems, plus 100 held gems = 200 gems at 16c.
        assert_eq!(ctx.account.get_d(account::WALLET_COINS), 0);
        assert_eq!(ctx.account.get_d(account::WALLET_GEMS), 0);

        let mut trace = crate::gui::TraceRenderer::default();
        sm.paint(&mut ctx, 0.0, &mut trace);
        assert!(trace.texts.iter().any(|t| t.contains("32,00 EUR")));
        assert!(trace.texts.iter().any(|t| t.contains("200 Gems")));
    }

    #[test]
    fn owned_products_cannot_be_rebought() {
        let (mut sm, mut ctx, _dir) = machine(ScreenId::Title);
        registered_rich(&mut ctx);
        ctx.account.set_d(PRODUCT_LEVELS, 1);
        ctx.links.shop_product = Some(ProductKey::Levels);

        ctx.goto(ScreenId::ShopBuy);
        sm.tick(&mut ctx, 0.0);

        let mut trace = crate::gui::TraceRenderer::default();
        sm.paint(&mut ctx, 0.0, &mut trace);
        assert!(trace.texts.iter().any(|t| t == "Product owned!"));
    }

    #[test]
    fn rename_warns_before_name_entry() {
        let (mut sm, mut ctx, _dir) = machine(ScreenId::Title);
        registered_rich(&mut ctx);

        goto_shop_rename(&mut ctx, ScreenId::Shop, ScreenId::Shop, false);
        sm.tick(&mut ctx, 0.0);
        assert_eq!(sm.curr(), Some(ScreenId::ShopRename));

        sm.stick(&mut ctx, AXIS_X0, 1.0);
        sm.click(&mut ctx, BUTTON_LEFT, true);
        assert_eq!(sm.curr(), Some(ScreenId::Name));
    }
}
