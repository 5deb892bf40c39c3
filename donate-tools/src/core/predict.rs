// Copyright 2025, Offchain Labs, Inc.
// For licensing, see https://github.com/OffchainLabs/stylus-sdk-rs/blob/main/licenses/COPYRIGHT.md

//! Deterministic deployment addresses.
//!
//! The factory namespaces every salt by the account calling it, so the same logical key used by
//! two different wallets lands at two different addresses:
//!
//! ```text
//! salt        = keccak256(abi.encode(string key))
//! deploy_salt = keccak256(abi.encode(sender, salt))
//! address     = keccak256(0xff ++ factory ++ deploy_salt ++ keccak256(init_code))[12..]
//! ```

use alloy::{
    primitives::{keccak256, Address, B256},
    sol_types::SolValue,
};

/// Derives the 32-byte salt for a logical deployment key.
///
/// The same derivation must be used when predicting and when submitting, otherwise the predicted
/// and actual addresses diverge.
pub fn salt_from_key(key: &str) -> B256 {
    keccak256(key.to_string().abi_encode())
}

/// Salt actually used by the factory for `CREATE2`, scoped to the sender.
pub fn deploy_salt(sender: Address, salt: B256) -> B256 {
    keccak256((sender, salt).abi_encode())
}

/// Address the factory will deploy `init_code` to when called by `sender` with `salt`.
pub fn create2_address(factory: Address, sender: Address, salt: B256, init_code: &[u8]) -> Address {
    factory.create2(deploy_salt(sender, salt), keccak256(init_code))
}

/// Predicts the address of a factory deployment identified by a logical key.
pub fn predict(factory: Address, sender: Address, init_code: &[u8], key: &str) -> Address {
    create2_address(factory, sender, salt_from_key(key), init_code)
}

/// Predicts the address of a plain `CREATE` deployment from `sender` at `nonce`.
pub fn predict_create(sender: Address, nonce: u64) -> Address {
    sender.create(nonce)
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::primitives::{address, U256};

    const FACTORY: Address = address!("0xFAC0000000000000000000000000000000000001");
    const OWNER: Address = address!("0x0111000000000000000000000000000000000002");

    #[test]
    fn salt_is_keccak_of_abi_encoded_string() {
        let mut encoded = Vec::new();
        encoded.extend(U256::from(32).to_be_bytes::<32>());
        encoded.extend(U256::from(6).to_be_bytes::<32>());
        let mut word = [0u8; 32];
        word[..6].copy_from_slice(b"Donate");
        encoded.extend(word);

        assert_eq!(salt_from_key("Donate"), keccak256(&encoded));
    }

    #[test]
    fn distinct_keys_give_distinct_salts() {
        assert_ne!(salt_from_key("Donate"), salt_from_key("Donate2"));
        assert_ne!(salt_from_key(""), salt_from_key(" "));
    }

    #[test]
    fn predict_is_deterministic() {
        let code = [0x60, 0x80, 0x60, 0x40, 0x52];
        let first = predict(FACTORY, OWNER, &code, "Donate");
        let second = predict(FACTORY, OWNER, &code, "Donate");
        assert_eq!(first, second);
    }

    #[test]
    fn predict_matches_formula() {
        let code = b"donate init code".to_vec();
        let salt = salt_from_key("Donate");

        let mut scoped = Vec::with_capacity(64);
        scoped.extend([0u8; 12]);
        scoped.extend(OWNER.as_slice());
        scoped.extend(salt.as_slice());
        let scoped = keccak256(&scoped);

        let mut preimage = vec![0xff];
        preimage.extend(FACTORY.as_slice());
        preimage.extend(scoped.as_slice());
        preimage.extend(keccak256(&code).as_slice());
        let expected = Address::from_slice(&keccak256(&preimage)[12..]);

        assert_eq!(predict(FACTORY, OWNER, &code, "Donate"), expected);
    }

    #[test]
    fn bytecode_changes_address() {
        let mut code = b"constructor args: 0x01".to_vec();
        let a = predict(FACTORY, OWNER, &code, "Donate");
        *code.last_mut().unwrap() = b'2';
        let b = predict(FACTORY, OWNER, &code, "Donate");
        assert_ne!(a, b);
    }

    #[test]
    fn sender_scopes_address() {
        let code = b"code";
        let other = address!("0x0222000000000000000000000000000000000003");
        assert_ne!(
            predict(FACTORY, OWNER, code, "Donate"),
            predict(FACTORY, other, code, "Donate")
        );
    }

    #[test]
    fn predict_create_uses_nonce() {
        assert_ne!(predict_create(OWNER, 0), predict_create(OWNER, 1));
        assert_eq!(predict_create(OWNER, 7), OWNER.create(7));
    }
}
