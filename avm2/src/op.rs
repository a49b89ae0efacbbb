//! The instruction set (spec §4.5): one-byte opcodes followed by zero or
//! more operand fields, decoded in the order the opcode's schema lists
//! them. [`Op::decode`] materializes one instruction's operands from an
//! [`abc::Reader`] positioned just past the opcode byte; the interpreter
//! (`crate::interpreter`) owns execution semantics, this module only owns
//! the shape.

use crate::error::{Error, Result};
use abc::Reader;

#[derive(Debug, Clone, PartialEq)]
pub enum Op {
    // --- constant pushers ---
    PushByte(i8),
    PushShort(i32),
    PushInt(u32),
    PushUint(u32),
    PushDouble(u32),
    PushString(u32),
    PushNamespace(u32),
    PushTrue,
    PushFalse,
    PushNull,
    PushNan,
    PushUndefined,

    // --- arithmetic / bitwise ---
    Add,
    AddI,
    Subtract,
    SubtractI,
    Multiply,
    MultiplyI,
    Divide,
    Modulo,
    Negate,
    NegateI,
    Increment,
    IncrementI,
    Decrement,
    DecrementI,
    Inclocal(u32),
    Declocal(u32),
    InclocalI(u32),
    DeclocalI(u32),
    BitAnd,
    BitOr,
    BitXor,
    BitNot,
    Lshift,
    Rshift,
    Urshift,

    // --- comparison ---
    Equals,
    StrictEquals,
    LessThan,
    LessEquals,
    GreaterThan,
    GreaterEquals,
    Not,
    IsType(u32),
    IsTypeLate,
    InstanceOf,
    In,
    TypeOf,

    // --- stack ---
    Dup,
    Pop,
    Swap,
    Label,
    Nop,

    // --- registers ---
    GetLocal(u32),
    SetLocal(u32),
    GetLocal0,
    GetLocal1,
    GetLocal2,
    GetLocal3,
    SetLocal0,
    SetLocal1,
    SetLocal2,
    SetLocal3,
    Kill(u32),

    // --- scope ---
    PushScope,
    PushWith,
    PopScope,
    GetScopeObject(u32),
    GetGlobalScope,
    NewActivation,
    NewCatch(u32),

    // --- property ---
    GetProperty(u32),
    SetProperty(u32),
    InitProperty(u32),
    DeleteProperty(u32),
    FindProperty(u32),
    FindPropStrict(u32),
    GetLex(u32),
    GetSlot(u32),
    SetSlot(u32),
    GetGlobalSlot(u32),
    SetGlobalSlot(u32),
    GetSuper(u32),
    SetSuper(u32),
    GetDescendants(u32),
    CheckFilter,

    // --- calls & construction ---
    Call { arg_count: u32 },
    CallMethod { index: u32, arg_count: u32 },
    CallStatic { index: u32, arg_count: u32 },
    CallSuper { index: u32, arg_count: u32 },
    CallSuperVoid { index: u32, arg_count: u32 },
    CallProperty { index: u32, arg_count: u32 },
    CallPropLex { index: u32, arg_count: u32 },
    CallPropVoid { index: u32, arg_count: u32 },
    Construct { arg_count: u32 },
    ConstructSuper { arg_count: u32 },
    ConstructProp { index: u32, arg_count: u32 },
    NewObject { arg_count: u32 },
    NewArray { arg_count: u32 },
    NewClass(u32),
    NewFunction(u32),
    ApplyType { arg_count: u32 },

    // --- control flow ---
    Jump(i32),
    IfTrue(i32),
    IfFalse(i32),
    IfEq(i32),
    IfNe(i32),
    IfStrictEq(i32),
    IfStrictNe(i32),
    IfLt(i32),
    IfLe(i32),
    IfGt(i32),
    IfGe(i32),
    IfNlt(i32),
    IfNle(i32),
    IfNgt(i32),
    IfNge(i32),
    LookupSwitch { default_offset: i32, case_offsets: Vec<i32> },
    ReturnValue,
    ReturnVoid,
    Throw,

    // --- iteration ---
    HasNext,
    HasNext2 { object_register: u32, index_register: u32 },
    NextName,
    NextValue,

    // --- coercions ---
    ConvertI,
    ConvertU,
    ConvertD,
    ConvertB,
    ConvertS,
    ConvertO,
    Coerce(u32),
    CoerceA,
    CoerceS,
    EscXAttr,
    EscXElem,
    Dxns(u32),
    DxnsLate,

    // --- debug ---
    Debug { kind: u8, name_index: u32, register: u8, extra: u32 },
    DebugFile(u32),
    DebugLine(u32),
}

impl Op {
    /// Decodes one instruction starting at `reader`'s current position
    /// (which must be the opcode byte). On return, `reader` is positioned
    /// immediately past the last operand byte consumed, which is also the
    /// reference point relative-branch offsets are computed from (spec
    /// §4.5 control flow paragraph).
    pub fn decode(reader: &mut Reader) -> Result<Self> {
        let offset = reader.position();
        let opcode = reader.read_u8().map_err(Error::from)?;
        decode_body(reader, opcode).map_err(|_| {
            Error::Link(format!("unknown or malformed opcode 0x{opcode:02x} at offset {offset}"))
        })
    }
}

fn decode_body(r: &mut Reader, opcode: u8) -> std::result::Result<Op, abc::DecodeError> {
    Ok(match opcode {
        0x02 => Op::Nop,
        0x03 => Op::Throw,
        0x04 => Op::GetSuper(r.read_var_u32()?),
        0x05 => Op::SetSuper(r.read_var_u32()?),
        0x06 => Op::Dxns(r.read_var_u32()?),
        0x07 => Op::DxnsLate,
        0x08 => Op::Kill(r.read_var_u32()?),
        0x09 => Op::Label,
        0x0c => Op::IfNlt(r.read_s24()?),
        0x0d => Op::IfNle(r.read_s24()?),
        0x0e => Op::IfNgt(r.read_s24()?),
        0x0f => Op::IfNge(r.read_s24()?),
        0x10 => Op::Jump(r.read_s24()?),
        0x11 => Op::IfTrue(r.read_s24()?),
        0x12 => Op::IfFalse(r.read_s24()?),
        0x13 => Op::IfEq(r.read_s24()?),
        0x14 => Op::IfNe(r.read_s24()?),
        0x15 => Op::IfLt(r.read_s24()?),
        0x16 => Op::IfLe(r.read_s24()?),
        0x17 => Op::IfGt(r.read_s24()?),
        0x18 => Op::IfGe(r.read_s24()?),
        0x19 => Op::IfStrictEq(r.read_s24()?),
        0x1a => Op::IfStrictNe(r.read_s24()?),
        0x1b => {
            let default_offset = r.read_s24()?;
            let case_count = r.read_var_u32()?;
            let mut case_offsets = Vec::with_capacity(case_count as usize + 1);
            for _ in 0..=case_count {
                case_offsets.push(r.read_s24()?);
            }
            Op::LookupSwitch { default_offset, case_offsets }
        }
        0x1c => Op::PushWith,
        0x1d => Op::PopScope,
        0x1e => Op::NextName,
        0x1f => Op::HasNext,
        0x20 => Op::PushNull,
        0x21 => Op::PushUndefined,
        0x23 => Op::NextValue,
        0x24 => Op::PushByte(r.read_u8()? as i8),
        0x25 => Op::PushShort(r.read_var_u32()? as i32),
        0x26 => Op::PushTrue,
        0x27 => Op::PushFalse,
        0x28 => Op::PushNan,
        0x29 => Op::Pop,
        0x2a => Op::Dup,
        0x2b => Op::Swap,
        0x2c => Op::PushString(r.read_var_u32()?),
        0x2d => Op::PushInt(r.read_var_u32()?),
        0x2e => Op::PushUint(r.read_var_u32()?),
        0x2f => Op::PushDouble(r.read_var_u32()?),
        0x30 => Op::PushScope,
        0x31 => Op::PushNamespace(r.read_var_u32()?),
        0x32 => Op::HasNext2 {
            object_register: r.read_var_u32()?,
            index_register: r.read_var_u32()?,
        },
        0x40 => Op::NewFunction(r.read_var_u32()?),
        0x41 => Op::Call { arg_count: r.read_var_u32()? },
        0x42 => Op::Construct { arg_count: r.read_var_u32()? },
        0x43 => Op::CallMethod { index: r.read_var_u32()?, arg_count: r.read_var_u32()? },
        0x44 => Op::CallStatic { index: r.read_var_u32()?, arg_count: r.read_var_u32()? },
        0x45 => Op::CallSuper { index: r.read_var_u32()?, arg_count: r.read_var_u32()? },
        0x46 => Op::CallProperty { index: r.read_var_u32()?, arg_count: r.read_var_u32()? },
        0x47 => Op::ReturnVoid,
        0x48 => Op::ReturnValue,
        0x49 => Op::ConstructSuper { arg_count: r.read_var_u32()? },
        0x4a => Op::ConstructProp { index: r.read_var_u32()?, arg_count: r.read_var_u32()? },
        0x4c => Op::CallPropLex { index: r.read_var_u32()?, arg_count: r.read_var_u32()? },
        0x4e => Op::CallSuperVoid { index: r.read_var_u32()?, arg_count: r.read_var_u32()? },
        0x4f => Op::CallPropVoid { index: r.read_var_u32()?, arg_count: r.read_var_u32()? },
        0x53 => Op::ApplyType { arg_count: r.read_var_u32()? },
        0x55 => Op::NewObject { arg_count: r.read_var_u32()? },
        0x56 => Op::NewArray { arg_count: r.read_var_u32()? },
        0x57 => Op::NewActivation,
        0x58 => Op::NewClass(r.read_var_u32()?),
        0x59 => Op::GetDescendants(r.read_var_u32()?),
        0x5a => Op::NewCatch(r.read_var_u32()?),
        0x5d => Op::FindPropStrict(r.read_var_u32()?),
        0x5e => Op::FindProperty(r.read_var_u32()?),
        0x60 => Op::GetLex(r.read_var_u32()?),
        0x61 => Op::SetProperty(r.read_var_u32()?),
        0x62 => Op::GetLocal(r.read_var_u32()?),
        0x63 => Op::SetLocal(r.read_var_u32()?),
        0x64 => Op::GetGlobalScope,
        0x65 => Op::GetScopeObject(r.read_var_u32()?),
        0x66 => Op::GetProperty(r.read_var_u32()?),
        0x68 => Op::InitProperty(r.read_var_u32()?),
        0x6a => Op::DeleteProperty(r.read_var_u32()?),
        0x6c => Op::GetSlot(r.read_var_u32()?),
        0x6d => Op::SetSlot(r.read_var_u32()?),
        0x6e => Op::GetGlobalSlot(r.read_var_u32()?),
        0x6f => Op::SetGlobalSlot(r.read_var_u32()?),
        0x70 => Op::ConvertS,
        0x71 => Op::EscXElem,
        0x72 => Op::EscXAttr,
        0x73 => Op::ConvertI,
        0x74 => Op::ConvertU,
        0x75 => Op::ConvertD,
        0x76 => Op::ConvertB,
        0x77 => Op::ConvertO,
        0x78 => Op::CheckFilter,
        0x80 => Op::Coerce(r.read_var_u32()?),
        0x82 => Op::CoerceA,
        0x85 => Op::CoerceS,
        0x86 => Op::IsType(r.read_var_u32()?),
        0x87 => Op::IsTypeLate,
        0x90 => Op::Negate,
        0x91 => Op::Increment,
        0x92 => Op::Inclocal(r.read_var_u32()?),
        0x93 => Op::Decrement,
        0x94 => Op::Declocal(r.read_var_u32()?),
        0x95 => Op::TypeOf,
        0x96 => Op::Not,
        0x97 => Op::BitNot,
        0xa0 => Op::Add,
        0xa1 => Op::Subtract,
        0xa2 => Op::Multiply,
        0xa3 => Op::Divide,
        0xa4 => Op::Modulo,
        0xa5 => Op::Lshift,
        0xa6 => Op::Rshift,
        0xa7 => Op::Urshift,
        0xa8 => Op::BitAnd,
        0xa9 => Op::BitOr,
        0xaa => Op::BitXor,
        0xab => Op::Equals,
        0xac => Op::StrictEquals,
        0xad => Op::LessThan,
        0xae => Op::LessEquals,
        0xaf => Op::GreaterThan,
        0xb0 => Op::GreaterEquals,
        0xb1 => Op::InstanceOf,
        0xb4 => Op::In,
        0xc0 => Op::IncrementI,
        0xc1 => Op::DecrementI,
        0xc2 => Op::NegateI,
        0xc3 => Op::AddI,
        0xc4 => Op::SubtractI,
        0xc5 => Op::MultiplyI,
        0xc6 => Op::InclocalI(r.read_var_u32()?),
        0xc7 => Op::DeclocalI(r.read_var_u32()?),
        0xd0 => Op::GetLocal0,
        0xd1 => Op::GetLocal1,
        0xd2 => Op::GetLocal2,
        0xd3 => Op::GetLocal3,
        0xd4 => Op::SetLocal0,
        0xd5 => Op::SetLocal1,
        0xd6 => Op::SetLocal2,
        0xd7 => Op::SetLocal3,
        0xef => Op::Debug {
            kind: r.read_u8()?,
            name_index: r.read_var_u32()?,
            register: r.read_u8()?,
            extra: r.read_var_u32()?,
        },
        0xf0 => Op::DebugLine(r.read_var_u32()?),
        0xf1 => Op::DebugFile(r.read_var_u32()?),
        other => return Err(abc::DecodeError::InvalidConstantKind { offset: r.position(), kind: other }),
    })
}
