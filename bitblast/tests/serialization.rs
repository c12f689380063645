use bitblast::serialization::{deserialize, serialize, SerializationError};
use bitblast::{Bit, BitVector};

fn round_trip(vector: &BitVector) -> BitVector {
    let mut buffer = Vec::new();
    serialize(vector, &mut buffer).unwrap();
    deserialize(buffer.as_slice()).unwrap()
}

#[test]
fn gate_chain_round_trips() {
    let mut vector = BitVector::variables(8);
    vector.assign(0..1, 1u8).unwrap();
    vector.assign(1..2, 0u8).unwrap();
    vector.assign(3..4, Bit::or(vector.bit(2), vector.bit(1))).unwrap();
    vector.assign(4..5, Bit::and(vector.bit(3), vector.bit(2))).unwrap();
    vector.assign(5..6, Bit::or(vector.bit(4), vector.bit(3))).unwrap();
    vector.assign(6..7, Bit::and(vector.bit(5), vector.bit(4))).unwrap();
    vector.assign(7..8, Bit::or(vector.bit(6), vector.bit(5))).unwrap();

    let restored = round_trip(&vector);
    assert_eq!(restored.len(), vector.len());
    assert!(!restored.is_concrete());

    // The lone free variable (position 2) drives every gate; restored and
    // original agree for both of its values.
    for value in [0u8, 1] {
        vector.bit(2).assign(Some(value)).unwrap();
        let expected = vector.to_integer().unwrap();
        vector.bit(2).assign(None).unwrap();

        let free = (0..restored.len())
            .map(|index| restored.bit(index).clone())
            .find(|bit| bit.is_variable() && !bit.is_concrete())
            .expect("restored vector keeps its free variable");
        free.assign(Some(value)).unwrap();
        assert_eq!(restored.to_integer().unwrap(), expected);
        free.assign(None).unwrap();
    }
}

#[test]
fn shared_nodes_serialize_once() {
    let shared = Bit::variable();
    let parent_a = Bit::and(&shared, &Bit::one());
    let parent_b = Bit::or(&shared, &Bit::zero());
    let vector = BitVector::new(vec![parent_a, parent_b]);

    let mut buffer = Vec::new();
    serialize(&vector, &mut buffer).unwrap();
    let document = String::from_utf8(buffer).unwrap();

    // Five nodes in total: the shared variable, both constants and the two
    // gates; the shared variable is not duplicated.
    assert_eq!(document.matches("- id:").count(), 5);
}

#[test]
fn ids_are_dense_and_children_come_first() {
    let variable = Bit::variable();
    let gate = Bit::xor(&variable, &Bit::one());
    let vector = BitVector::new(vec![gate]);

    let mut buffer = Vec::new();
    serialize(&vector, &mut buffer).unwrap();
    let document: serde_yaml::Value = serde_yaml::from_slice(&buffer).unwrap();

    let bits = document["bits"].as_sequence().unwrap();
    assert_eq!(bits.len(), 3);
    for (position, record) in bits.iter().enumerate() {
        assert_eq!(record["id"].as_u64(), Some(position as u64));
    }

    // The variable is visited first, then the constant, then the gate that
    // depends on both.
    assert!(bits[0].get("value").is_none());
    assert!(bits[0].get("gate").is_none());
    assert_eq!(bits[1]["value"].as_u64(), Some(1));
    assert_eq!(bits[2]["gate"].as_u64(), Some(6));
    assert_eq!(
        bits[2]["dependencies"].as_sequence().unwrap().len(),
        2
    );
    assert_eq!(bits[2]["dependencies"][0].as_u64(), Some(0));
    assert_eq!(bits[2]["dependencies"][1].as_u64(), Some(1));
    assert_eq!(document["bitvector"][0].as_u64(), Some(2));
}

#[test]
fn assigned_variables_restore_as_constants() {
    let variable = Bit::variable();
    variable.assign(Some(1)).unwrap();
    let vector = BitVector::new(vec![variable]);

    let restored = round_trip(&vector);
    assert!(restored.bit(0).is_constant());
    assert_eq!(restored.bit(0).eval(), Ok(1));
}

#[test]
fn constants_round_trip() {
    let vector = BitVector::from_integer(0xff0110u32, 24);
    let restored = round_trip(&vector);
    assert_eq!(restored.to_integer().unwrap(), vector.to_integer().unwrap());
}

#[test]
fn forward_references_are_rejected() {
    let document = "bits:\n\
                    - id: 0\n\
                    \x20 gate: 6\n\
                    \x20 dependencies:\n\
                    \x20 - 1\n\
                    \x20 - 2\n\
                    - id: 1\n\
                    - id: 2\n\
                    bitvector:\n\
                    - 0\n";
    let error = deserialize(document.as_bytes()).unwrap_err();
    assert!(matches!(
        error,
        SerializationError::UndefinedDependency { id: 0, dependency: 1 }
    ));
}

#[test]
fn bad_arity_is_rejected() {
    let document = "bits:\n\
                    - id: 0\n\
                    - id: 1\n\
                    - id: 2\n\
                    - id: 3\n\
                    - id: 4\n\
                    \x20 gate: 1\n\
                    \x20 dependencies: [0, 1, 2, 3]\n\
                    bitvector:\n\
                    - 4\n";
    let error = deserialize(document.as_bytes()).unwrap_err();
    assert!(matches!(error, SerializationError::BadArity { id: 4, count: 4 }));
}

#[test]
fn oversized_tables_are_rejected() {
    let document = "bits:\n\
                    - id: 0\n\
                    - id: 1\n\
                    \x20 gate: 16\n\
                    \x20 dependencies: [0]\n\
                    bitvector:\n\
                    - 1\n";
    let error = deserialize(document.as_bytes()).unwrap_err();
    assert!(matches!(error, SerializationError::BadTable { id: 1 }));
}

#[test]
fn duplicate_ids_are_rejected() {
    let document = "bits:\n\
                    - id: 0\n\
                    - id: 0\n\
                    \x20 value: 1\n\
                    bitvector:\n\
                    - 0\n";
    let error = deserialize(document.as_bytes()).unwrap_err();
    assert!(matches!(error, SerializationError::DuplicateNode { id: 0 }));
}

#[test]
fn mixed_records_are_rejected() {
    let document = "bits:\n\
                    - id: 0\n\
                    \x20 value: 1\n\
                    \x20 gate: 2\n\
                    bitvector:\n\
                    - 0\n";
    let error = deserialize(document.as_bytes()).unwrap_err();
    assert!(matches!(error, SerializationError::AmbiguousNode { id: 0 }));
}

#[test]
fn unknown_top_level_ids_are_rejected() {
    let document = "bits:\n\
                    - id: 0\n\
                    bitvector:\n\
                    - 7\n";
    let error = deserialize(document.as_bytes()).unwrap_err();
    assert!(matches!(error, SerializationError::UndefinedTopLevel { id: 7 }));
}
