use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::domain::mint::DEFAULT_MAX_UNWRAP_DEPTH;

/// Gateway integrations whose calldata cannot be decoded
const UNABLE_TO_DECODE: &[&str] = &[
    "0x103675510a219bd84CE91d1bcb82Ca194D665a09", // Argent
    "0x545B5f104Ce8DA0f37e63e5A977043291f790e04",
    "0x9a8DB724493AF5B607F896Db1DB5dAfB4EdAf154",
    "0xa5361000C661cffC4aFda1dC075e6cDf554494a9",
    "0xcb6B6775d2Ff480173149afd4Bb1B1ebE4e68705", // Authereum
    "0xFc52320B42733D7af775F2D6dAB1b1Daa76FC83f",
    "0x3047570d07521E5967EA1909270769F90fdF1f05",
    "0xbFC842e1dd050FCFD7711BB7E4A87716c10C64a4",
    "0x0875385D86CAcF735b81f110Fd37755EACc8c30b",
    "0x8A6A35dB19567e21580E28FEb3994e0dE6b930D8",
    "0x8e3c62EDA37287be1daA40dB00dDaa13028D52ce",
    "0x544965987424c0F2b0d7743553a68C88f32749fe",
    "0x9505538D02eA45b93d531FEB2D3EBaFDAbC74607",
    "0x15Bb78ED1a9AC8b3C02869dECeBC72c1CB6C313D",
    "0xd40A7f8EfbdfBD5c9c2428ad81E8Db6D53292E35",
    "0x0ebC541c3f518d23d6B02b4Ce1A9147D551D3660",
    "0x763E365A606527fa4511b0e83d8252F46c4DdB56",
    "0xa664693d89B7086E9f7a4299E3B9cAE74b54a313",
    "0xf5E48DFd5Bc1e548D7417D1F569774aF767f17d9",
    "0xFE3030eE66756F40FCc9873539feeE1Ea1D7e1E1",
    "0xFF44cf4ed99695AfdfeDB3fe3fAF8020ab9ABf81",
    "0x21EFB8C09cb22Fd9761B5C280F8C8AEc03502e06",
    "0x681D9F765039AAFD4aeE1A0CD359340497fbfe3F",
    "0x055dBBe0a2FCA92A67DE714A5ECb13D420f934f0",
    "0xD5C0d8FFc9C90b6dfc55614a5c5b844214c99716",
    "0x24553725F1dC1548D3a046e49daE2e44B09425e3",
    "0x94C2e8fee611da4cfec9dCD34Daa88465bcd1aC9", // Authereum
    "0x1a0606300CeCA332B356a3fcFe99471B5a7f22BA",
    "0xe920B3F96Cb2bF1Ee9ee8921837de08273724242",
];

/// Gateway integrations without a published ABI
const NO_ABI_AVAILABLE: &[&str] = &[
    "0x9E7D5a22b213cD77aa26622C7154E5f1810929E0",
    "0x62c9b69fB4252272aAFc30241E696Ea56116c4f1",
    "0x19cC75e2899480B802cA46A053c41C53dBC64230",
    "0x89FB5Fa10b2171C0A558ff6fA0df6FAf086c3E52",
    "0x5ca5007BE6743a1516f9a8A7a5e18027971130D4",
    "0xcda99344041A5CE1aF1654d48e9c1cd99da0ef7B",
    "0xe920B3F96Cb2bF1Ee9ee8921837de08273724242",
    "0x1a0606300CeCA332B356a3fcFe99471B5a7f22BA",
    "0x40DDE6092a77eC2d00eB4fa14f0c5d92d835d673",
];

/// Extra parser entry, in the same shape as the built-in table
#[derive(Debug, Clone, Deserialize)]
pub struct ParserSpec {
    /// Selector observed on chain; defaults to the declaration's selector
    pub selector: Option<String>,
    pub declaration: String,
    pub names: Vec<String>,
    pub wanted: Vec<String>,
    #[serde(default)]
    pub meta_transaction: bool,
    #[serde(default)]
    pub use_sender_address: bool,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    pub unable_to_decode: Vec<String>,
    pub no_abi_available: Vec<String>,
    pub max_unwrap_depth: usize,
    pub parsers: Vec<ParserSpec>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            unable_to_decode: UNABLE_TO_DECODE.iter().map(|s| s.to_string()).collect(),
            no_abi_available: NO_ABI_AVAILABLE.iter().map(|s| s.to_string()).collect(),
            max_unwrap_depth: DEFAULT_MAX_UNWRAP_DEPTH,
            parsers: Vec::new(),
        }
    }
}

impl Config {
    /// Every address whose calls are kept away from the decoder
    pub fn skip_addresses(&self) -> impl Iterator<Item = &str> {
        self.unable_to_decode
            .iter()
            .chain(&self.no_abi_available)
            .map(String::as_str)
    }
}

/// Load the config file, falling back to defaults when there is none
pub fn load() -> Result<Config> {
    match config_path() {
        Some(path) if path.exists() => load_from(&path),
        _ => Ok(Config::default()),
    }
}

pub fn load_from(path: &Path) -> Result<Config> {
    let content =
        fs::read_to_string(path).with_context(|| format!("read config {}", path.display()))?;
    toml::from_str::<Config>(&content).with_context(|| format!("parse config {}", path.display()))
}

pub fn config_path() -> Option<PathBuf> {
    if let Some(path) = std::env::var_os("MINT_AUDIT_CONFIG").map(PathBuf::from) {
        return Some(path);
    }
    if let Some(xdg) = std::env::var_os("XDG_CONFIG_HOME").map(PathBuf::from) {
        return Some(xdg.join("mint-audit").join("config.toml"));
    }
    if let Some(home) = std::env::var_os("HOME").map(PathBuf::from) {
        return Some(home.join(".config").join("mint-audit").join("config.toml"));
    }

    directories::ProjectDirs::from("io", "mint-audit", "mint-audit")
        .map(|dirs| dirs.config_dir().join("config.toml"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_skip_lists() {
        let config = Config::default();
        assert_eq!(config.unable_to_decode.len(), 29);
        assert_eq!(config.no_abi_available.len(), 9);
        assert_eq!(config.skip_addresses().count(), 38);
        assert_eq!(config.max_unwrap_depth, 1);
    }

    #[test]
    fn test_parse_partial_config() {
        let config: Config = toml::from_str(
            r#"
            max_unwrap_depth = 2
            no_abi_available = ["0x40DDE6092a77eC2d00eB4fa14f0c5d92d835d673"]

            [[parsers]]
            declaration = "mintTo(address,uint256,bytes32,bytes)"
            names = ["_to", "_amount", "_nHash", "_sig"]
            wanted = ["_to", "_amount"]
            "#,
        )
        .unwrap();

        assert_eq!(config.max_unwrap_depth, 2);
        assert_eq!(config.no_abi_available.len(), 1);
        // Unset keys keep their defaults
        assert_eq!(config.unable_to_decode.len(), 29);
        assert_eq!(config.parsers.len(), 1);
        assert!(config.parsers[0].selector.is_none());
        assert!(!config.parsers[0].use_sender_address);
    }

    #[test]
    fn test_load_from_reports_bad_toml() {
        let path = std::env::temp_dir().join(format!("mint-audit-bad-{}.toml", std::process::id()));
        fs::write(&path, "max_unwrap_depth = \"one\"").unwrap();

        let result = load_from(&path);
        let _ = fs::remove_file(&path);

        assert!(result.is_err());
    }
}
