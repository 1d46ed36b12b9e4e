//! Parser table for calls that mint through the RenVM BTC gateway
//!
//! One entry per calldata shape seen from the gateway's downstream
//! integrations. Keys are the selectors observed on chain; `check()` verifies
//! them against the declarations.

use crate::domain::abi::{parse_selector, ParserRegistry, RegistryError, WantedField};

use super::TxDataParser;

fn wants(beneficiary: &str, amount: &str) -> Vec<WantedField> {
    vec![WantedField::calldata(beneficiary), WantedField::calldata(amount)]
}

fn sender_and(amount: &str) -> Vec<WantedField> {
    vec![WantedField::Sender, WantedField::calldata(amount)]
}

/// Build the registry of every known gateway integration
pub fn gateway_registry() -> Result<ParserRegistry, RegistryError> {
    let mut registry = ParserRegistry::new();

    // Gateway mint called directly
    registry.insert(
        parse_selector("0x77f61403")?,
        TxDataParser::new(
            "mint(string,address,uint256,bytes32,bytes)",
            ["_symbol", "_recipient", "_amount", "_nHash", "_sig"],
            wants("_recipient", "_amount"),
        )?,
    )?;

    // Biconomy-style relayed call, wraps one of the calls below
    registry.insert(
        parse_selector("0xd039fca1")?,
        TxDataParser::new(
            "executeMetaTransaction(address,bytes,string,string,bytes32,bytes32,uint8)",
            ["userAddress", "functionSignature", "message", "length", "sigR", "sigS", "sigV"],
            wants("userAddress", "functionSignature"),
        )?
        .meta_transaction(),
    )?;

    // Curve sBTC pool adapter
    registry.insert(
        parse_selector("0x29349116")?,
        TxDataParser::new(
            "mintThenSwap(uint256,uint256,uint256,int128,address,uint256,bytes32,bytes)",
            [
                "_minExchangeRate",
                "_newMinExchangeRate",
                "_slippage",
                "_j",
                "_coinDestination",
                "_amount",
                "_nHash",
                "_sig",
            ],
            wants("_coinDestination", "_amount"),
        )?,
    )?;

    registry.insert(
        parse_selector("0xa318f9de")?,
        TxDataParser::new(
            "mintThenDeposit(address,uint256,uint256[3],uint256,uint256,bytes32,bytes)",
            [
                "_wbtcDestination",
                "_amount",
                "_amounts",
                "_min_mint_amount",
                "_new_min_mint_amount",
                "_nHash",
                "_sig",
            ],
            wants("_wbtcDestination", "_amount"),
        )?,
    )?;

    // Curve renBTC pool adapter
    registry.insert(
        parse_selector("0x74955c42")?,
        TxDataParser::new(
            "mintThenSwap(uint256,uint256,uint256,address,uint256,bytes32,bytes)",
            [
                "_minExchangeRate",
                "_newMinExchangeRate",
                "_slippage",
                "_wbtcDestination",
                "_amount",
                "_nHash",
                "_sig",
            ],
            wants("_wbtcDestination", "_amount"),
        )?,
    )?;

    registry.insert(
        parse_selector("0xdcf0bb3a")?,
        TxDataParser::new(
            "mintThenDeposit(address,uint256,uint256[2],uint256,uint256,bytes32,bytes)",
            [
                "_wbtcDestination",
                "_amount",
                "_amounts",
                "_min_mint_amount",
                "_new_min_mint_amount",
                "_nHash",
                "_sig",
            ],
            wants("_wbtcDestination", "_amount"),
        )?,
    )?;

    // `encoded` carries no usable beneficiary
    registry.insert(
        parse_selector("0x0bfe8b92")?,
        TxDataParser::new(
            "recoverStuck(bytes,uint256,bytes32,bytes)",
            ["encoded", "_amount", "_nHash", "_sig"],
            sender_and("_amount"),
        )?,
    )?;

    registry.insert(
        parse_selector("0x834a7182")?,
        TxDataParser::new(
            "mintThenSwap(uint256,address,uint256,bytes32,bytes)",
            ["_minWbtcAmount", "_wbtcDestination", "_amount", "_nHash", "_sig"],
            wants("_wbtcDestination", "_amount"),
        )?,
    )?;

    registry.insert(
        parse_selector("0x47f701e7")?,
        TxDataParser::new(
            "mintRenBTC(address,uint256,uint256,uint256,bytes32,bytes)",
            ["_recipient", "_gasFee", "_serviceFeeRate", "_amount", "_nHash", "_sig"],
            wants("_recipient", "_amount"),
        )?,
    )?;

    // `_btcAddr` is a BTC address, not the minter
    registry.insert(
        parse_selector("0x0f5b02cd")?,
        TxDataParser::new(
            "mintDai(uint256,bytes,uint256,uint256,bytes32,bytes)",
            ["_dart", "_btcAddr", "_minWbtcAmount", "_amount", "_nHash", "_sig"],
            sender_and("_amount"),
        )?,
    )?;

    registry.insert(
        parse_selector("0x2012aca7")?,
        TxDataParser::new(
            "deposit(bytes,uint256,bytes32,bytes)",
            ["_msg", "_amount", "_nHash", "_sig"],
            sender_and("_amount"),
        )?,
    )?;

    registry.insert(
        parse_selector("0xec369f7d")?,
        TxDataParser::new(
            "depositbtc(address,bytes,uint256,bytes32,bytes)",
            ["_user", "_msg", "_amount", "_nHash", "_sig"],
            wants("_user", "_amount"),
        )?,
    )?;

    // Argent relayer, wraps one of the calls above
    registry.insert(
        parse_selector("0xaacaaf88")?,
        TxDataParser::new(
            "execute(address,bytes,uint256,bytes,uint256,uint256)",
            ["_wallet", "_data", "_nonce", "_signatures", "_gasPrice", "_gasLimit"],
            wants("_wallet", "_data"),
        )?
        .meta_transaction(),
    )?;

    Ok(registry)
}
