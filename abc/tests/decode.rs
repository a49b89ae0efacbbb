//! End-to-end decode tests built from literal ABC byte streams, constructed
//! by hand from the published ABC layout rather than round-tripped through
//! an encoder (this crate doesn't ship one).

use abc::{AbcFile, MethodFlags, TraitKind};

fn var_u32(mut value: u32, out: &mut Vec<u8>) {
    loop {
        let byte = (value & 0x7f) as u8;
        value >>= 7;
        if value == 0 {
            out.push(byte);
            break;
        } else {
            out.push(byte | 0x80);
        }
    }
}

fn empty_constant_pool(out: &mut Vec<u8>) {
    // ints, uints, doubles, strings, namespaces, namespace_sets, multinames:
    // all empty (count = 0, meaning "no entries besides the sentinel").
    for _ in 0..7 {
        out.push(0);
    }
}

/// Builds the smallest possible well-formed ABC file: no methods, classes,
/// scripts or bodies, just version + empty constant pool + four empty
/// tables + zero classes + empty scripts + empty bodies.
fn minimal_abc() -> Vec<u8> {
    let mut bytes = Vec::new();
    bytes.extend_from_slice(&16u16.to_le_bytes()); // minor
    bytes.extend_from_slice(&46u16.to_le_bytes()); // major
    empty_constant_pool(&mut bytes);
    bytes.push(0); // methods count
    bytes.push(0); // metadata count
    bytes.push(0); // class_count
    bytes.push(0); // scripts count
    bytes.push(0); // method_bodies count
    bytes
}

#[test]
fn decodes_minimal_file() {
    let abc = AbcFile::decode(&minimal_abc()).unwrap();
    assert_eq!(abc.minor_version, 16);
    assert_eq!(abc.major_version, 46);
    assert!(abc.methods.is_empty());
    assert!(abc.instances.is_empty());
}

#[test]
fn constant_pool_sentinels() {
    let abc = AbcFile::decode(&minimal_abc()).unwrap();
    let pool = &abc.constant_pool;
    assert_eq!(pool.int(0), 0);
    assert_eq!(pool.uint(0), 0);
    assert!(pool.double(0).is_nan());
    assert_eq!(pool.string(0), "");
    assert!(pool.namespace_set(0).namespaces.is_empty());
    assert!(pool.multiname(0).is_none());
}

/// One method whose body is `pushbyte 3; pushbyte 4; add; returnvalue`
/// (spec §8 scenario 1). This only exercises the decoder: executing the
/// body is covered in the `avm2` crate's integration tests.
#[test]
fn decodes_method_with_arithmetic_body() {
    let mut bytes = Vec::new();
    bytes.extend_from_slice(&0u16.to_le_bytes());
    bytes.extend_from_slice(&46u16.to_le_bytes());
    empty_constant_pool(&mut bytes);

    // methods: one method, 0 params, untyped return, no name, no flags.
    bytes.push(1); // method count
    var_u32(0, &mut bytes); // param_count
    var_u32(0, &mut bytes); // return_type (untyped)
    var_u32(0, &mut bytes); // name_index
    bytes.push(0); // flags

    bytes.push(0); // metadata count
    bytes.push(0); // class_count
    bytes.push(0); // scripts count

    // one method body for method 0
    bytes.push(1); // method_bodies count
    var_u32(0, &mut bytes); // method index
    var_u32(2, &mut bytes); // max_stack
    var_u32(1, &mut bytes); // local_count (just the receiver)
    var_u32(0, &mut bytes); // init_scope_depth
    var_u32(1, &mut bytes); // max_scope_depth

    let code: Vec<u8> = vec![
        0x24, 3, // pushbyte 3
        0x24, 4, // pushbyte 4
        0xa0, // add
        0x48, // returnvalue
    ];
    var_u32(code.len() as u32, &mut bytes);
    bytes.extend_from_slice(&code);
    bytes.push(0); // exception_count
    bytes.push(0); // trait_count

    let abc = AbcFile::decode(&bytes).unwrap();
    assert_eq!(abc.methods.len(), 1);
    assert_eq!(abc.method_bodies.len(), 1);
    assert_eq!(abc.method_bodies[0].method_index, 0);
    assert_eq!(abc.method_bodies[0].code, code);
    assert_eq!(abc.method_bodies[0].max_stack, 2);
}

#[test]
fn decodes_qname_multiname() {
    let mut bytes = Vec::new();
    bytes.extend_from_slice(&0u16.to_le_bytes());
    bytes.extend_from_slice(&46u16.to_le_bytes());

    // ints, uints, doubles empty
    bytes.push(0);
    bytes.push(0);
    bytes.push(0);
    // strings: ["x"]
    bytes.push(2); // count = n, 1 real entry
    var_u32(1, &mut bytes);
    bytes.push(b'x');
    // namespaces: [PackageNamespace(name_index=0)]
    bytes.push(2);
    bytes.push(0x16);
    var_u32(0, &mut bytes);
    // namespace sets empty
    bytes.push(0);
    // multinames: [QName{ns=1, name=1}]
    bytes.push(2);
    bytes.push(0x07);
    var_u32(1, &mut bytes);
    var_u32(1, &mut bytes);

    bytes.push(0); // methods
    bytes.push(0); // metadata
    bytes.push(0); // class_count
    bytes.push(0); // scripts
    bytes.push(0); // method_bodies

    let abc = AbcFile::decode(&bytes).unwrap();
    assert_eq!(abc.constant_pool.multinames.len(), 1);
    match &abc.constant_pool.multinames[0] {
        abc::Multiname::QName {
            namespace_index,
            name_index,
        } => {
            assert_eq!(*namespace_index, 1);
            assert_eq!(*name_index, 1);
        }
        other => panic!("expected QName, got {other:?}"),
    }
    assert_eq!(abc.constant_pool.string(1), "x");
}

#[test]
fn decodes_trait_kinds_and_flags() {
    let mut bytes = Vec::new();
    bytes.extend_from_slice(&0u16.to_le_bytes());
    bytes.extend_from_slice(&46u16.to_le_bytes());
    empty_constant_pool(&mut bytes);
    bytes.push(0); // methods
    bytes.push(0); // metadata

    // one class with a single Const trait, FINAL attribute set
    bytes.push(1); // class_count

    // instance_info
    var_u32(0, &mut bytes); // name_index
    var_u32(0, &mut bytes); // super_name_index
    bytes.push(0); // flags (no protected ns)
    bytes.push(0); // interface_count
    var_u32(0, &mut bytes); // instance_init
    bytes.push(1); // trait_count
    var_u32(0, &mut bytes); // trait name_index
    bytes.push(0x16); // attributes=FINAL(0x1)<<4=0x10 | kind=Const(6) -> 0x16
    var_u32(0, &mut bytes); // slot_id
    var_u32(0, &mut bytes); // type_name_index
    var_u32(0, &mut bytes); // value_index (0 -> no value_kind byte)

    // class_info
    var_u32(0, &mut bytes); // class_init
    bytes.push(0); // trait_count

    bytes.push(0); // scripts
    bytes.push(0); // method_bodies

    let abc = AbcFile::decode(&bytes).unwrap();
    let trait_ = &abc.instances[0].traits[0];
    assert!(trait_.attributes.contains(abc::TraitAttributes::FINAL));
    match trait_.kind {
        TraitKind::Const { value_index, .. } => assert_eq!(value_index, 0),
        ref other => panic!("expected Const, got {other:?}"),
    }
}

#[test]
fn method_flags_round_trip_bit_values() {
    assert_eq!(MethodFlags::NEED_REST.bits(), 0x04);
    assert_eq!(MethodFlags::HAS_OPTIONAL.bits(), 0x08);
    assert_eq!(MethodFlags::SET_DXNS.bits(), 0x40);
}

#[test]
fn truncated_input_is_an_error() {
    let bytes = vec![1, 2, 3];
    assert!(AbcFile::decode(&bytes).is_err());
}
