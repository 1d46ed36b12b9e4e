//! End-to-end resolution against the built-in gateway registry

use alloy_primitives::{address, Address, Bytes, FixedBytes, B256, U256};
use alloy_sol_types::{sol, SolCall};

use mint_audit::domain::abi::selector_of;
use mint_audit::domain::mint::{MintResolver, ResolveError, TransactionRecord};
use mint_audit::infrastructure::abi::gateway_registry;

sol! {
    function mint(string _symbol, address _recipient, uint256 _amount, bytes32 _nHash, bytes _sig);
    function executeMetaTransaction(address userAddress, bytes functionSignature, string message, string length, bytes32 sigR, bytes32 sigS, uint8 sigV);
    function execute(address _wallet, bytes _data, uint256 _nonce, bytes _signatures, uint256 _gasPrice, uint256 _gasLimit);
    function recoverStuck(bytes encoded, uint256 _amount, bytes32 _nHash, bytes _sig);
    function deposit(bytes _msg, uint256 _amount, bytes32 _nHash, bytes _sig);
    function mintDai(uint256 _dart, bytes _btcAddr, uint256 _minWbtcAmount, uint256 _amount, bytes32 _nHash, bytes _sig);
    function mintThenSwap(uint256 _minWbtcAmount, address _wbtcDestination, uint256 _amount, bytes32 _nHash, bytes _sig);
    function transfer(address to, uint256 amount);
}

const SENDER: Address = address!("5555555555555555555555555555555555555555");
const RECIPIENT: Address = address!("1111111111111111111111111111111111111111");
const SIGNER: Address = address!("2222222222222222222222222222222222222222");

fn tx(input: Vec<u8>) -> TransactionRecord {
    TransactionRecord {
        hash: B256::with_last_byte(7),
        from: SENDER,
        to: None,
        input: Bytes::from(input),
    }
}

fn mint_call(amount: u64) -> Vec<u8> {
    mintCall {
        _symbol: "BTC".to_string(),
        _recipient: RECIPIENT,
        _amount: U256::from(amount),
        _nHash: FixedBytes::repeat_byte(0x33),
        _sig: Bytes::from(vec![0x44; 65]),
    }
    .abi_encode()
}

fn relayed(inner: Vec<u8>) -> Vec<u8> {
    executeMetaTransactionCall {
        userAddress: SIGNER,
        functionSignature: Bytes::from(inner),
        message: "relay".to_string(),
        length: "4".to_string(),
        sigR: FixedBytes::repeat_byte(1),
        sigS: FixedBytes::repeat_byte(2),
        sigV: 27,
    }
    .abi_encode()
}

fn argent(inner: Vec<u8>) -> Vec<u8> {
    executeCall {
        _wallet: SIGNER,
        _data: Bytes::from(inner),
        _nonce: U256::from(1u64),
        _signatures: Bytes::from(vec![0x55; 65]),
        _gasPrice: U256::from(20_000_000_000u64),
        _gasLimit: U256::from(300_000u64),
    }
    .abi_encode()
}

#[test]
fn test_direct_mint() {
    let registry = gateway_registry().unwrap();
    let resolver = MintResolver::new(&registry);

    let resolved = resolver.resolve(&tx(mint_call(150_000))).unwrap();

    assert_eq!(resolved.beneficiary, RECIPIENT);
    assert_eq!(resolved.amount, U256::from(150_000u64));
}

#[test]
fn test_direct_mint_uses_calldata_not_sender() {
    let registry = gateway_registry().unwrap();
    let resolver = MintResolver::new(&registry);

    let resolved = resolver.resolve(&tx(mint_call(1))).unwrap();

    assert_ne!(resolved.beneficiary, SENDER);
}

#[test]
fn test_meta_transaction_resolves_inner_call() {
    let registry = gateway_registry().unwrap();
    let resolver = MintResolver::new(&registry);

    let resolved = resolver.resolve(&tx(relayed(mint_call(42)))).unwrap();

    // The envelope's signer is not the beneficiary
    assert_eq!(resolved.beneficiary, RECIPIENT);
    assert_eq!(resolved.amount, U256::from(42u64));
}

#[test]
fn test_argent_execute_resolves_inner_call() {
    let registry = gateway_registry().unwrap();
    let resolver = MintResolver::new(&registry);

    let inner = mintThenSwapCall {
        _minWbtcAmount: U256::from(90u64),
        _wbtcDestination: RECIPIENT,
        _amount: U256::from(100u64),
        _nHash: FixedBytes::ZERO,
        _sig: Bytes::new(),
    }
    .abi_encode();

    let resolved = resolver.resolve(&tx(argent(inner))).unwrap();

    assert_eq!(resolved.beneficiary, RECIPIENT);
    assert_eq!(resolved.amount, U256::from(100u64));
}

#[test]
fn test_nested_meta_transaction_is_rejected() {
    let registry = gateway_registry().unwrap();
    let resolver = MintResolver::new(&registry);

    let err = resolver
        .resolve(&tx(relayed(argent(mint_call(5)))))
        .unwrap_err();

    assert!(matches!(
        err,
        ResolveError::NestedMetaTransaction { max_depth: 1, .. }
    ));
    assert_eq!(err.hash(), B256::with_last_byte(7));
}

#[test]
fn test_nested_meta_transaction_with_deeper_limit() {
    let registry = gateway_registry().unwrap();
    let resolver = MintResolver::new(&registry).with_max_unwrap_depth(2);

    let resolved = resolver.resolve(&tx(relayed(argent(mint_call(5))))).unwrap();

    assert_eq!(resolved.beneficiary, RECIPIENT);
    assert_eq!(resolved.amount, U256::from(5u64));
}

#[test]
fn test_sender_substitution() {
    let registry = gateway_registry().unwrap();
    let resolver = MintResolver::new(&registry);

    let calls = [
        recoverStuckCall {
            encoded: Bytes::from(vec![0xaa; 40]),
            _amount: U256::from(7u64),
            _nHash: FixedBytes::ZERO,
            _sig: Bytes::new(),
        }
        .abi_encode(),
        depositCall {
            _msg: Bytes::from(vec![0xbb; 3]),
            _amount: U256::from(7u64),
            _nHash: FixedBytes::ZERO,
            _sig: Bytes::new(),
        }
        .abi_encode(),
        mintDaiCall {
            _dart: U256::from(1u64),
            _btcAddr: Bytes::from(b"bc1qexample".to_vec()),
            _minWbtcAmount: U256::from(6u64),
            _amount: U256::from(7u64),
            _nHash: FixedBytes::ZERO,
            _sig: Bytes::new(),
        }
        .abi_encode(),
    ];

    for input in calls {
        let resolved = resolver.resolve(&tx(input)).unwrap();
        assert_eq!(resolved.beneficiary, SENDER);
        assert_eq!(resolved.amount, U256::from(7u64));
    }
}

#[test]
fn test_sender_substitution_inside_meta_transaction() {
    let registry = gateway_registry().unwrap();
    let resolver = MintResolver::new(&registry);

    let inner = depositCall {
        _msg: Bytes::new(),
        _amount: U256::from(9u64),
        _nHash: FixedBytes::ZERO,
        _sig: Bytes::new(),
    }
    .abi_encode();

    let resolved = resolver.resolve(&tx(relayed(inner))).unwrap();

    // The unwrapped call keeps the outer transaction's sender
    assert_eq!(resolved.beneficiary, SENDER);
    assert_eq!(resolved.amount, U256::from(9u64));
}

#[test]
fn test_unknown_selector() {
    let registry = gateway_registry().unwrap();
    let resolver = MintResolver::new(&registry);

    let input = transferCall {
        to: RECIPIENT,
        amount: U256::from(1u64),
    }
    .abi_encode();

    let err = resolver.resolve(&tx(input.clone())).unwrap_err();

    assert!(err.is_unknown_selector());
    match err {
        ResolveError::UnknownSelector { selector, .. } => {
            assert_eq!(selector, selector_of(input.as_slice()).unwrap());
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_unknown_selector_inside_meta_transaction() {
    let registry = gateway_registry().unwrap();
    let resolver = MintResolver::new(&registry);

    let inner = transferCall {
        to: RECIPIENT,
        amount: U256::from(1u64),
    }
    .abi_encode();

    let err = resolver.resolve(&tx(relayed(inner))).unwrap_err();
    assert!(err.is_unknown_selector());
}

#[test]
fn test_truncated_mint_is_decode_failure() {
    let registry = gateway_registry().unwrap();
    let resolver = MintResolver::new(&registry);

    let mut input = mint_call(10);
    input.truncate(4 + 32 * 3);

    let err = resolver.resolve(&tx(input)).unwrap_err();
    assert!(matches!(err, ResolveError::Decode { .. }));
}
