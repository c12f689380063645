use num_bigint::BigUint;

use bitblast::BitVector;
use bitblast_analyzer::Analysis;
use bitblast_stdlib::{gamma0, gamma1, init_words, word, Sha256, SIZE_WORD};

fn words(digest: &[BitVector]) -> Vec<u32> {
    digest
        .iter()
        .map(|word| {
            let digits = word.to_integer().unwrap().to_u32_digits();
            digits.first().copied().unwrap_or(0)
        })
        .collect()
}

#[test]
fn digest_of_abc() {
    let digest = Sha256::new().finalize(&BitVector::from_integer(0x616263u32, 24)).unwrap();
    assert_eq!(
        words(&digest),
        [
            0xba7816bf, 0x8f01cfea, 0x414140de, 0x5dae2223, 0xb00361a3, 0x96177a9c, 0xb410ff61,
            0xf20015ad,
        ]
    );
}

#[test]
fn digest_of_the_empty_message() {
    let digest = Sha256::new().finalize(&BitVector::from_integer(0u8, 0)).unwrap();
    assert_eq!(
        words(&digest),
        [
            0xe3b0c442, 0x98fc1c14, 0x9afbf4c8, 0x996fb924, 0x27ae41e4, 0x649b934c, 0xa495991b,
            0x7852b855,
        ]
    );
}

#[test]
fn digest_of_a_two_block_message() {
    let message = BigUint::parse_bytes(
        b"6162636462636465636465666465666765666768666768696768696a68696a6b\
          696a6b6c6a6b6c6d6b6c6d6e6c6d6e6f6d6e6f706e6f7071",
        16,
    )
    .unwrap();
    let digest = Sha256::new().finalize(&BitVector::from_integer(message, 14 * 32)).unwrap();
    assert_eq!(
        words(&digest),
        [
            0x248d6a61, 0xd20638b8, 0xe5c02693, 0x0c3e6039, 0xa33ce459, 0x64ff2167, 0xf6ecedd4,
            0x19db06c1,
        ]
    );
}

#[test]
fn schedule_mixers_stay_symbolic_over_variable_words() {
    let free_word = BitVector::variables(SIZE_WORD);

    let analysis = Analysis::new(gamma0(&free_word).unwrap());
    assert_eq!(analysis.inputs_len(), SIZE_WORD);
    // Every output position mixes three rotations of the input word, so
    // positions depend on up to three source bits; the shifted-out tail
    // depends on fewer.
    let individualized = analysis.inputs_len_individualized();
    assert_eq!(individualized.len(), SIZE_WORD);
    assert!(individualized.iter().all(|count| (2..=3).contains(count)));

    let analysis = Analysis::new(gamma1(&free_word).unwrap());
    assert_eq!(analysis.inputs_len(), SIZE_WORD);
}

#[test]
fn padding_keeps_message_bits_symbolic() {
    let message = BitVector::variables(256);
    let padded = Sha256::pad(&message).unwrap();
    assert_eq!(padded.len(), 512);

    let analysis = Analysis::new(padded);
    assert_eq!(analysis.inputs_len(), 256);
    // Everything after the message is concrete: the one bit, the zero
    // fill and the 64-bit length.
    assert!(analysis.vector().is_concrete_range(256..512).unwrap());
}

#[test]
fn expanded_schedule_words_depend_on_the_message() {
    let padded = Sha256::pad(&BitVector::variables(256)).unwrap();
    let schedule = init_words(&padded).unwrap();

    // Word 17 is gamma1(w15) + w10 + gamma0(w2) + w1; all of its source
    // words carry free message bits.
    let analysis = Analysis::new(schedule.slice(word(17)).unwrap());
    assert!(analysis.inputs_len() > SIZE_WORD);
}
