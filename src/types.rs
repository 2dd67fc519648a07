//! Structural type variants and the typeid canonicalization service.
//!
//! Every non-primitive type collapses to a single representative per
//! structural shape, keyed by a printable fingerprint (its "tid"). Two
//! types with byte-equal fingerprints are the same type.

use std::collections::HashMap;
use std::sync::RwLock;

use bitflags::bitflags;

use crate::symbol::{Interner, Symbol};

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct StructFlags: u8 {
        const ANONYMOUS = 0b0000_0001;
    }
}

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct FunctionFlags: u8 {
        const METHOD = 0b0000_0001;
        const MUTABLE_RECEIVER = 0b0000_0010;
    }
}

/// Primitive scalar kinds. Each carries a one-byte tid assigned once, at
/// interner initialization, rather than computed through the encoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Primitive {
    Void,
    Bool,
    I8,
    I16,
    I32,
    I64,
    U8,
    U16,
    U32,
    U64,
    /// Target-dependent signed integer; concrete width supplied by the
    /// compiler object (1, 2, 4, or 8 bytes, default 8 on 64-bit targets).
    Int,
    Uint,
    F32,
    F64,
}

impl Primitive {
    fn prefix_byte(self) -> u8 {
        match self {
            Primitive::Void => b'v',
            Primitive::Bool => b'b',
            Primitive::I8 => b'1',
            Primitive::I16 => b'2',
            Primitive::I32 => b'4',
            Primitive::I64 => b'8',
            Primitive::U8 => b'A',
            Primitive::U16 => b'B',
            Primitive::U32 => b'C',
            Primitive::U64 => b'D',
            Primitive::Int => b'i',
            Primitive::Uint => b'u',
            Primitive::F32 => b'f',
            Primitive::F64 => b'd',
        }
    }
}

pub type TypeRef = u32;

/// A field in a struct type: name plus field type.
#[derive(Debug, Clone)]
pub struct Field {
    pub name: Symbol,
    pub ty: TypeRef,
}

/// A method registered on a receiver type.
#[derive(Debug, Clone)]
pub struct Method {
    pub name: Symbol,
    pub func_ty: TypeRef,
}

#[derive(Debug, Clone)]
pub enum TypeKind {
    Primitive(Primitive),
    Pointer(TypeRef),
    Reference { target: TypeRef, mutable: bool },
    Slice { element: TypeRef, mutable: bool },
    Optional(TypeRef),
    Array { element: TypeRef, len: u64 },
    Function { params: Vec<TypeRef>, result: TypeRef, flags: FunctionFlags },
    Struct { name: Option<Symbol>, fields: Vec<Field>, methods: Vec<Method>, flags: StructFlags },
    Alias { name: Symbol, target: TypeRef },
}

#[derive(Debug, Clone)]
pub struct TypeNode {
    pub kind: TypeKind,
    pub tid: Option<Symbol>,
    pub size: u64,
    pub align: u64,
}

/// Owns all type nodes for a compilation and the tid → node canonicalization
/// map. Primitives are interned once at construction with fixed, one-byte
/// tids; structural types are canonicalized lazily as they're built.
pub struct TypeStore {
    nodes: Vec<TypeNode>,
    by_tid: RwLock<HashMap<Symbol, TypeRef>>,
    pub primitives: PrimitiveTypes,
    pointer_width: u64,
    native_int_width: u64,
}

#[derive(Debug, Clone, Copy)]
pub struct PrimitiveTypes {
    pub void: TypeRef,
    pub bool_: TypeRef,
    pub i8: TypeRef,
    pub i16: TypeRef,
    pub i32: TypeRef,
    pub i64: TypeRef,
    pub u8: TypeRef,
    pub u16: TypeRef,
    pub u32: TypeRef,
    pub u64: TypeRef,
    pub int: TypeRef,
    pub uint: TypeRef,
    pub f32: TypeRef,
    pub f64: TypeRef,
}

impl TypeStore {
    pub fn new(interner: &Interner, pointer_width: u64, native_int_width: u64) -> Self {
        let mut nodes = Vec::new();
        let mut push_primitive = |p: Primitive, size: u64, align: u64| -> TypeRef {
            let idx = nodes.len() as TypeRef;
            let tid = interner.intern(&[p.prefix_byte()]);
            nodes.push(TypeNode {
                kind: TypeKind::Primitive(p),
                tid: Some(tid),
                size,
                align,
            });
            idx
        };
        let void = push_primitive(Primitive::Void, 0, 1);
        let bool_ = push_primitive(Primitive::Bool, 1, 1);
        let i8 = push_primitive(Primitive::I8, 1, 1);
        let i16 = push_primitive(Primitive::I16, 2, 2);
        let i32 = push_primitive(Primitive::I32, 4, 4);
        let i64 = push_primitive(Primitive::I64, 8, 8);
        let u8 = push_primitive(Primitive::U8, 1, 1);
        let u16 = push_primitive(Primitive::U16, 2, 2);
        let u32 = push_primitive(Primitive::U32, 4, 4);
        let u64 = push_primitive(Primitive::U64, 8, 8);
        let int = push_primitive(Primitive::Int, native_int_width, native_int_width);
        let uint = push_primitive(Primitive::Uint, native_int_width, native_int_width);
        let f32 = push_primitive(Primitive::F32, 4, 4);
        let f64 = push_primitive(Primitive::F64, 8, 8);

        let by_tid = RwLock::new(HashMap::new());
        let mut store = TypeStore {
            nodes,
            by_tid,
            primitives: PrimitiveTypes {
                void,
                bool_,
                i8,
                i16,
                i32,
                i64,
                u8,
                u16,
                u32,
                u64,
                int,
                uint,
                f32,
                f64,
            },
            pointer_width,
            native_int_width,
        };
        for idx in 0..store.nodes.len() as TypeRef {
            let tid = store.nodes[idx as usize].tid.unwrap();
            store
                .by_tid
                .get_mut()
                .expect("lock poisoned")
                .insert(tid, idx);
        }
        store
    }

    pub fn get(&self, r: TypeRef) -> &TypeNode {
        &self.nodes[r as usize]
    }

    pub fn pointer_width(&self) -> u64 {
        self.pointer_width
    }

    pub fn native_int_width(&self) -> u64 {
        self.native_int_width
    }

    fn push_node(&mut self, kind: TypeKind, size: u64, align: u64) -> TypeRef {
        let idx = self.nodes.len() as TypeRef;
        self.nodes.push(TypeNode {
            kind,
            tid: None,
            size,
            align,
        });
        idx
    }

    pub fn make_pointer(&mut self, interner: &Interner, target: TypeRef) -> TypeRef {
        let idx = self.push_node(TypeKind::Pointer(target), self.pointer_width, self.pointer_width);
        self.canonicalize(interner, idx)
    }

    pub fn make_reference(&mut self, interner: &Interner, target: TypeRef, mutable: bool) -> TypeRef {
        let idx = self.push_node(
            TypeKind::Reference { target, mutable },
            self.pointer_width,
            self.pointer_width,
        );
        self.canonicalize(interner, idx)
    }

    pub fn make_slice(&mut self, interner: &Interner, element: TypeRef, mutable: bool) -> TypeRef {
        let idx = self.push_node(
            TypeKind::Slice { element, mutable },
            self.pointer_width * 2,
            self.pointer_width,
        );
        self.canonicalize(interner, idx)
    }

    pub fn make_optional(&mut self, interner: &Interner, target: TypeRef) -> TypeRef {
        let inner = self.get(target);
        let size = inner.size + 1;
        let align = inner.align;
        let idx = self.push_node(TypeKind::Optional(target), size, align);
        self.canonicalize(interner, idx)
    }

    pub fn make_array(&mut self, interner: &Interner, element: TypeRef, len: u64) -> TypeRef {
        let inner = self.get(element);
        let size = inner.size * len;
        let align = inner.align;
        let idx = self.push_node(TypeKind::Array { element, len }, size, align);
        self.canonicalize(interner, idx)
    }

    /// Constructs (or returns the existing canonical) function type. Per
    /// §4.4, the parser's `funtype` constructor consults the tid→type map
    /// explicitly so function-type identity can be tested by `TypeRef`
    /// equality after construction.
    pub fn make_function(
        &mut self,
        interner: &Interner,
        params: Vec<TypeRef>,
        result: TypeRef,
        flags: FunctionFlags,
    ) -> TypeRef {
        let idx = self.push_node(
            TypeKind::Function { params, result, flags },
            self.pointer_width,
            self.pointer_width,
        );
        self.canonicalize(interner, idx)
    }

    pub fn make_struct(
        &mut self,
        interner: &Interner,
        name: Option<Symbol>,
        fields: Vec<Field>,
        flags: StructFlags,
    ) -> TypeRef {
        let mut offset: u64 = 0;
        let mut align: u64 = 1;
        for f in &fields {
            let fty = self.get(f.ty);
            let falign = fty.align.max(1);
            offset = round_up(offset, falign) + fty.size;
            align = align.max(falign);
        }
        let size = round_up(offset, align);
        let idx = self.push_node(
            TypeKind::Struct {
                name,
                fields,
                methods: Vec::new(),
                flags,
            },
            size,
            align,
        );
        self.canonicalize(interner, idx)
    }

    pub fn make_alias(&mut self, interner: &Interner, name: Symbol, target: TypeRef) -> TypeRef {
        let inner = self.get(target);
        let (size, align) = (inner.size, inner.align);
        let idx = self.push_node(TypeKind::Alias { name, target }, size, align);
        self.canonicalize(interner, idx)
    }

    pub fn add_method(&mut self, receiver: TypeRef, method: Method) {
        if let TypeKind::Struct { methods, .. } = &mut self.nodes[receiver as usize].kind {
            methods.push(method);
        }
    }

    pub fn methods_of(&self, receiver: TypeRef) -> &[Method] {
        match &self.nodes[receiver as usize].kind {
            TypeKind::Struct { methods, .. } => methods,
            _ => &[],
        }
    }

    /// Runs the canonicalization algorithm from §4.4 on a freshly-built
    /// node at `idx`: encode, intern, and fold into the existing
    /// representative if one exists for this fingerprint. When a prior
    /// entry exists for the resulting tid, the fresh node at `idx` is left
    /// in place (arena nodes are never removed) but the returned `TypeRef`
    /// points at the canonical, earlier node.
    fn canonicalize(&mut self, interner: &Interner, idx: TypeRef) -> TypeRef {
        if self.nodes[idx as usize].tid.is_some() {
            return idx;
        }
        let mut buf = Vec::new();
        self.encode_into(interner, idx, &mut buf);
        let tid = interner.intern(&buf);
        self.nodes[idx as usize].tid = Some(tid);

        let mut table = self.by_tid.write().expect("lock poisoned");
        match table.get(&tid) {
            Some(existing) => *existing,
            None => {
                table.insert(tid, idx);
                idx
            }
        }
    }

    /// Recursively encodes `idx`'s structural contents into `buf`. When a
    /// child already has a tid, that tid's bytes are spliced in directly
    /// instead of re-encoding the child's own contents (children are
    /// always canonicalized before their parent is built, by construction
    /// order — see `make_*`).
    fn encode_into(&self, interner: &Interner, idx: TypeRef, buf: &mut Vec<u8>) {
        let node = &self.nodes[idx as usize];
        match &node.kind {
            TypeKind::Primitive(p) => buf.push(p.prefix_byte()),
            TypeKind::Pointer(target) => {
                buf.push(b'p');
                self.splice_child(interner, *target, buf);
            }
            TypeKind::Reference { target, mutable } => {
                buf.push(if *mutable { b'M' } else { b'r' });
                self.splice_child(interner, *target, buf);
            }
            TypeKind::Slice { element, mutable } => {
                buf.push(if *mutable { b'S' } else { b's' });
                self.splice_child(interner, *element, buf);
            }
            TypeKind::Optional(target) => {
                buf.push(b'o');
                self.splice_child(interner, *target, buf);
            }
            TypeKind::Array { element, len } => {
                buf.push(b'a');
                buf.extend_from_slice(format!("{:x};", len).as_bytes());
                self.splice_child(interner, *element, buf);
            }
            TypeKind::Function { params, result, .. } => {
                // `flags` (method-ness, receiver mutability) is stored on
                // the node but deliberately left out of the fingerprint:
                // the round-trip law keys a function type only on its
                // parameter and result shape, so two signatures differing
                // only in method-ness must still collapse to one tid.
                buf.push(b'F');
                buf.extend_from_slice(format!("{:x};", params.len()).as_bytes());
                for p in params {
                    self.splice_child(interner, *p, buf);
                }
                self.splice_child(interner, *result, buf);
            }
            TypeKind::Struct { fields, .. } => {
                buf.push(b'T');
                buf.extend_from_slice(format!("{:x};", fields.len()).as_bytes());
                for f in fields {
                    self.splice_child(interner, f.ty, buf);
                }
            }
            TypeKind::Alias { name, .. } => {
                buf.push(b'A');
                let name_bytes = interner.as_bytes(*name);
                buf.extend_from_slice(format!("{:x};", name_bytes.len()).as_bytes());
                buf.extend_from_slice(&name_bytes);
            }
        }
    }

    /// Splices an already-canonical child's tid bytes directly, or encodes
    /// it fresh if it has none yet (children are canonicalized before their
    /// parent by construction order, so this branch is the common case).
    fn splice_child(&self, interner: &Interner, child: TypeRef, buf: &mut Vec<u8>) {
        match self.nodes[child as usize].tid {
            Some(tid) => {
                let bytes = interner.as_bytes(tid);
                buf.extend_from_slice(&bytes);
                buf.push(b';');
            }
            None => self.encode_into(interner, child, buf),
        }
    }
}

fn round_up(offset: u64, align: u64) -> u64 {
    if align == 0 {
        offset
    } else {
        (offset + align - 1) / align * align
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_up_aligns() {
        assert_eq!(round_up(0, 8), 0);
        assert_eq!(round_up(1, 8), 8);
        assert_eq!(round_up(8, 8), 8);
        assert_eq!(round_up(9, 4), 12);
    }

    #[test]
    fn structurally_equal_types_share_a_tid() {
        let interner = Interner::new();
        let mut store = TypeStore::new(&interner, 8, 8);
        let p1 = store.make_pointer(&interner, store.primitives.i32);
        let p2 = store.make_pointer(&interner, store.primitives.i32);
        assert_eq!(p1, p2);
        assert_eq!(store.get(p1).tid, store.get(p2).tid);
    }

    #[test]
    fn structurally_different_types_have_different_tids() {
        let interner = Interner::new();
        let mut store = TypeStore::new(&interner, 8, 8);
        let p_i32 = store.make_pointer(&interner, store.primitives.i32);
        let p_i64 = store.make_pointer(&interner, store.primitives.i64);
        assert_ne!(store.get(p_i32).tid, store.get(p_i64).tid);
    }

    #[test]
    fn function_type_identity_is_by_pointer_after_construction() {
        let interner = Interner::new();
        let mut store = TypeStore::new(&interner, 8, 8);
        let f1 = store.make_function(
            &interner,
            vec![store.primitives.int, store.primitives.int],
            store.primitives.int,
            FunctionFlags::empty(),
        );
        let f2 = store.make_function(
            &interner,
            vec![store.primitives.int, store.primitives.int],
            store.primitives.int,
            FunctionFlags::empty(),
        );
        assert_eq!(f1, f2);
    }

    #[test]
    fn struct_size_and_align_follow_field_layout() {
        let interner = Interner::new();
        let mut store = TypeStore::new(&interner, 8, 8);
        let name_x = interner.intern_str("x");
        let name_y = interner.intern_str("y");
        let s = store.make_struct(
            &interner,
            None,
            vec![
                Field { name: name_x, ty: store.primitives.i8 },
                Field { name: name_y, ty: store.primitives.i64 },
            ],
            StructFlags::ANONYMOUS,
        );
        let node = store.get(s);
        assert_eq!(node.align, 8);
        assert_eq!(node.size, 16);
    }
}
