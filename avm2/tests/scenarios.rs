//! End-to-end interpreter scenarios (spec §8), each built from a literal
//! ABC byte stream (no encoder exists in this workspace, so these are
//! hand-assembled exactly like `abc`'s own decode tests) and run through
//! the full `Avm2::load` / `execute_method` path.

use avm2::{Avm2, Object, Value};

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

/// Assembles a minimal single-method ABC program: an empty constant pool
/// except for the `doubles`/`strings`/`namespaces` the caller supplies, one
/// niladic method (index 0) with the given body, and nothing else (no
/// classes, no scripts — callers that need those build them directly).
struct AbcBuilder {
    doubles: Vec<f64>,
    strings: Vec<String>,
    namespaces: Vec<(u8, u32)>,
    multinames: Vec<Vec<u8>>,
    code: Vec<u8>,
    max_stack: u32,
    local_count: u32,
    max_scope_depth: u32,
}

impl AbcBuilder {
    fn new(code: Vec<u8>) -> Self {
        AbcBuilder {
            doubles: Vec::new(),
            strings: Vec::new(),
            namespaces: Vec::new(),
            multinames: Vec::new(),
            code,
            max_stack: 8,
            local_count: 1,
            max_scope_depth: 1,
        }
    }

    fn with_doubles(mut self, doubles: Vec<f64>) -> Self {
        self.doubles = doubles;
        self
    }

    fn with_strings(mut self, strings: Vec<&str>) -> Self {
        self.strings = strings.into_iter().map(String::from).collect();
        self
    }

    /// One QName multiname per `(namespace_index, name_index)` pair; the
    /// namespace pool gets one public namespace (empty name) for every
    /// QName built this way, matching the scenario's `"::x"`-style names.
    fn with_qname(mut self, name_string_index: u32) -> Self {
        self.namespaces.push((0x16, 0)); // PackageNamespace, empty name
        let namespace_index = self.namespaces.len() as u32;
        let mut bytes = vec![0x07]; // QName
        var_u32(namespace_index, &mut bytes);
        var_u32(name_string_index, &mut bytes);
        self.multinames.push(bytes);
        self
    }

    fn build(self) -> Vec<u8> {
        let mut out = Vec::new();
        out.extend_from_slice(&16u16.to_le_bytes());
        out.extend_from_slice(&46u16.to_le_bytes());

        // constant pool
        out.push(0); // ints
        out.push(0); // uints
        write_count_prefixed(&mut out, &self.doubles, |out, d| out.extend_from_slice(&d.to_le_bytes()));
        write_count_prefixed(&mut out, &self.strings, |out, s| {
            var_u32(s.len() as u32, out);
            out.extend_from_slice(s.as_bytes());
        });
        write_count_prefixed(&mut out, &self.namespaces, |out, (kind, name_index)| {
            out.push(*kind);
            var_u32(*name_index, out);
        });
        out.push(0); // namespace_sets
        write_count_prefixed(&mut out, &self.multinames, |out, bytes| out.extend_from_slice(bytes));

        // methods: one niladic method, no flags.
        out.push(1);
        var_u32(0, &mut out); // param_count
        var_u32(0, &mut out); // return_type_index
        var_u32(0, &mut out); // name_index
        out.push(0); // flags

        out.push(0); // metadata
        out.push(0); // class_count
        out.push(0); // scripts

        // method_bodies: one body for method 0.
        out.push(1);
        var_u32(0, &mut out); // method_index
        var_u32(self.max_stack, &mut out);
        var_u32(self.local_count, &mut out);
        var_u32(0, &mut out); // init_scope_depth
        var_u32(self.max_scope_depth, &mut out);
        var_u32(self.code.len() as u32, &mut out);
        out.extend_from_slice(&self.code);
        out.push(0); // exceptions
        out.push(0); // traits

        out
    }
}

fn write_count_prefixed<T>(out: &mut Vec<u8>, items: &[T], mut write_one: impl FnMut(&mut Vec<u8>, &T)) {
    if items.is_empty() {
        out.push(0);
        return;
    }
    var_u32(items.len() as u32 + 1, out);
    for item in items {
        write_one(out, item);
    }
}

fn run(bytes: &[u8]) -> avm2::error::Result<Value> {
    let mut vm = Avm2::load(bytes)?;
    vm.execute_method(0, Value::Undefined, &[])
}

fn assert_int(value: Value, expected: i32) {
    assert_eq!(value.to_int32(), expected, "got {value:?}");
}

#[test]
fn arithmetic_add() {
    // pushbyte 3; pushbyte 4; add; returnvalue
    let code = vec![0x24, 3, 0x24, 4, 0xa0, 0x48];
    let result = run(&AbcBuilder::new(code).build()).unwrap();
    assert_int(result, 7);
}

#[test]
fn integer_add_coerces_through_int32() {
    // pushdouble(doubles[1]=2.5); pushdouble(doubles[2]=3.7); add_i; returnvalue
    let code = vec![0x2f, 1, 0x2f, 2, 0xc3, 0x48];
    let result = run(&AbcBuilder::new(code).with_doubles(vec![2.5, 3.7]).build()).unwrap();
    assert_int(result, 5);
}

#[test]
fn branch_taken_on_lessthan() {
    // pushbyte 1; pushbyte 2; iflt +3; pushbyte 10; returnvalue; pushbyte 20; returnvalue
    let code = vec![
        0x24, 1, // pushbyte 1
        0x24, 2, // pushbyte 2
        0x15, 3, 0, 0, // iflt +3 (s24)
        0x24, 10, 0x48, // pushbyte 10; returnvalue
        0x24, 20, 0x48, // pushbyte 20; returnvalue
    ];
    let result = run(&AbcBuilder::new(code).build()).unwrap();
    assert_int(result, 20);
}

#[test]
fn branch_not_taken_falls_through() {
    // pushbyte 2; pushbyte 1; iflt +3; pushbyte 10; returnvalue; pushbyte 20; returnvalue
    let code = vec![
        0x24, 2, 0x24, 1, 0x15, 3, 0, 0, 0x24, 10, 0x48, 0x24, 20, 0x48,
    ];
    let result = run(&AbcBuilder::new(code).build()).unwrap();
    assert_int(result, 10);
}

#[test]
fn dup_and_swap_correctness() {
    // pushbyte 1; pushbyte 2; dup; pop; pop; returnvalue
    let code = vec![0x24, 1, 0x24, 2, 0x2a, 0x29, 0x29, 0x48];
    let result = run(&AbcBuilder::new(code).build()).unwrap();
    assert_int(result, 1);
}

#[test]
fn divide_produces_a_double() {
    // pushdouble(doubles[1]=10.0); pushdouble(doubles[2]=4.0); divide; returnvalue
    let code = vec![0x2f, 1, 0x2f, 2, 0xa3, 0x48];
    let result = run(&AbcBuilder::new(code).with_doubles(vec![10.0, 4.0]).build()).unwrap();
    assert_eq!(result.to_number(), 2.5);
}

#[test]
fn initproperty_then_getproperty_roundtrips() {
    // getlocal_0; pushbyte 42; initproperty "::x"; getlocal_0; getproperty
    // "::x"; returnvalue. The multiname's local name ("x") is fixed at
    // decode time (a QName), not pushed on the operand stack.
    let code = vec![
        0xd0, // getlocal_0
        0x24, 42, // pushbyte 42
        0x68, 1, // initproperty multinames[1]
        0xd0, // getlocal_0
        0x66, 1, // getproperty multinames[1]
        0x48, // returnvalue
    ];
    let bytes = AbcBuilder::new(code)
        .with_strings(vec!["x"])
        .with_qname(1)
        .build();
    let mut vm = Avm2::load(&bytes).unwrap();
    let this = Object::new_plain(None);
    let result = vm.execute_method(0, Value::Object(this), &[]).unwrap();
    assert_int(result, 42);
}
