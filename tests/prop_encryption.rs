//! Round-trip and tamper properties of the encrypted blob over arbitrary input.

use proptest::prelude::*;
use prompetize::crypto::{decrypt, encrypt, DerivedKey, EncryptedBlob, KEY_LEN};
use prompetize::Error;

fn key_strategy() -> impl Strategy<Value = DerivedKey> {
    prop::array::uniform32(any::<u8>()).prop_map(DerivedKey::from)
}

proptest! {
    #[test]
    fn encrypt_then_decrypt_returns_input(plaintext in any::<String>(), key in key_strategy()) {
        let first = encrypt(&plaintext, &key).expect("encrypt");
        let second = encrypt(&plaintext, &key).expect("encrypt");

        prop_assert_ne!(&first, &second, "nonce reused");
        prop_assert_eq!(decrypt(&first, &key).expect("decrypt"), plaintext.clone());
        prop_assert_eq!(decrypt(&second, &key).expect("decrypt"), plaintext);
    }

    #[test]
    fn foreign_key_is_rejected(plaintext in ".{0,64}", key in key_strategy(), other in key_strategy()) {
        prop_assume!(key != other);
        let blob = encrypt(&plaintext, &key).expect("encrypt");
        prop_assert!(matches!(decrypt(&blob, &other), Err(Error::Decryption)));
    }

    #[test]
    fn arbitrary_text_never_decrypts(garbage in ".{0,128}") {
        let key = DerivedKey::from([7u8; KEY_LEN]);
        let result = decrypt(&EncryptedBlob::from(garbage), &key);
        prop_assert!(matches!(result, Err(Error::Decryption)));
    }
}
