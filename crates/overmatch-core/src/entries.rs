//! Registered type entries: fundamental types, classes, enumerations.

use crate::type_hash::{TypeHash, primitives};

/// The C++ fundamental types the conversion tables know about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveKind {
    Void,
    Bool,
    Char,
    SignedChar,
    UnsignedChar,
    Short,
    UnsignedShort,
    Int,
    UnsignedInt,
    Long,
    UnsignedLong,
    LongLong,
    UnsignedLongLong,
    Float,
    Double,
    LongDouble,
    NullPtr,
}

impl PrimitiveKind {
    /// Every fundamental type, in declaration order.
    pub const ALL: [PrimitiveKind; 17] = [
        PrimitiveKind::Void,
        PrimitiveKind::Bool,
        PrimitiveKind::Char,
        PrimitiveKind::SignedChar,
        PrimitiveKind::UnsignedChar,
        PrimitiveKind::Short,
        PrimitiveKind::UnsignedShort,
        PrimitiveKind::Int,
        PrimitiveKind::UnsignedInt,
        PrimitiveKind::Long,
        PrimitiveKind::UnsignedLong,
        PrimitiveKind::LongLong,
        PrimitiveKind::UnsignedLongLong,
        PrimitiveKind::Float,
        PrimitiveKind::Double,
        PrimitiveKind::LongDouble,
        PrimitiveKind::NullPtr,
    ];

    /// The spelled-out type name.
    pub fn name(self) -> &'static str {
        match self {
            PrimitiveKind::Void => "void",
            PrimitiveKind::Bool => "bool",
            PrimitiveKind::Char => "char",
            PrimitiveKind::SignedChar => "signed char",
            PrimitiveKind::UnsignedChar => "unsigned char",
            PrimitiveKind::Short => "short",
            PrimitiveKind::UnsignedShort => "unsigned short",
            PrimitiveKind::Int => "int",
            PrimitiveKind::UnsignedInt => "unsigned int",
            PrimitiveKind::Long => "long",
            PrimitiveKind::UnsignedLong => "unsigned long",
            PrimitiveKind::LongLong => "long long",
            PrimitiveKind::UnsignedLongLong => "unsigned long long",
            PrimitiveKind::Float => "float",
            PrimitiveKind::Double => "double",
            PrimitiveKind::LongDouble => "long double",
            PrimitiveKind::NullPtr => "std::nullptr_t",
        }
    }

    /// The constant hash for this type.
    pub fn type_hash(self) -> TypeHash {
        match self {
            PrimitiveKind::Void => primitives::VOID,
            PrimitiveKind::Bool => primitives::BOOL,
            PrimitiveKind::Char => primitives::CHAR,
            PrimitiveKind::SignedChar => primitives::SCHAR,
            PrimitiveKind::UnsignedChar => primitives::UCHAR,
            PrimitiveKind::Short => primitives::SHORT,
            PrimitiveKind::UnsignedShort => primitives::USHORT,
            PrimitiveKind::Int => primitives::INT,
            PrimitiveKind::UnsignedInt => primitives::UINT,
            PrimitiveKind::Long => primitives::LONG,
            PrimitiveKind::UnsignedLong => primitives::ULONG,
            PrimitiveKind::LongLong => primitives::LONGLONG,
            PrimitiveKind::UnsignedLongLong => primitives::ULONGLONG,
            PrimitiveKind::Float => primitives::FLOAT,
            PrimitiveKind::Double => primitives::DOUBLE,
            PrimitiveKind::LongDouble => primitives::LONGDOUBLE,
            PrimitiveKind::NullPtr => primitives::NULLPTR,
        }
    }

    /// Integral types: `bool`, the character types, and the standard
    /// integer types.
    pub fn is_integral(self) -> bool {
        matches!(
            self,
            PrimitiveKind::Bool
                | PrimitiveKind::Char
                | PrimitiveKind::SignedChar
                | PrimitiveKind::UnsignedChar
                | PrimitiveKind::Short
                | PrimitiveKind::UnsignedShort
                | PrimitiveKind::Int
                | PrimitiveKind::UnsignedInt
                | PrimitiveKind::Long
                | PrimitiveKind::UnsignedLong
                | PrimitiveKind::LongLong
                | PrimitiveKind::UnsignedLongLong
        )
    }

    pub fn is_floating(self) -> bool {
        matches!(
            self,
            PrimitiveKind::Float | PrimitiveKind::Double | PrimitiveKind::LongDouble
        )
    }

    pub fn is_arithmetic(self) -> bool {
        self.is_integral() || self.is_floating()
    }

    /// Types whose integral promotion target is `int`: `int` represents
    /// every value of these on the usual data models.
    pub fn promotes_to_int(self) -> bool {
        matches!(
            self,
            PrimitiveKind::Bool
                | PrimitiveKind::Char
                | PrimitiveKind::SignedChar
                | PrimitiveKind::UnsignedChar
                | PrimitiveKind::Short
                | PrimitiveKind::UnsignedShort
        )
    }

    /// Position on the usual-arithmetic-conversions ladder; the common
    /// type of two arithmetic operands is the one further along. `None`
    /// for non-arithmetic types.
    pub fn arithmetic_order(self) -> Option<u8> {
        let order = match self {
            PrimitiveKind::Bool => 0,
            PrimitiveKind::Char | PrimitiveKind::SignedChar | PrimitiveKind::UnsignedChar => 1,
            PrimitiveKind::Short | PrimitiveKind::UnsignedShort => 2,
            PrimitiveKind::Int => 3,
            PrimitiveKind::UnsignedInt => 4,
            PrimitiveKind::Long => 5,
            PrimitiveKind::UnsignedLong => 6,
            PrimitiveKind::LongLong => 7,
            PrimitiveKind::UnsignedLongLong => 8,
            PrimitiveKind::Float => 9,
            PrimitiveKind::Double => 10,
            PrimitiveKind::LongDouble => 11,
            PrimitiveKind::Void | PrimitiveKind::NullPtr => return None,
        };
        Some(order)
    }
}

/// A registered class type and its declared implicit conversions.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassEntry {
    /// Qualified class name, e.g. `std::string`.
    pub name: String,
    /// Targets reachable through a conversion operator on this class.
    pub converts_to: Vec<TypeHash>,
    /// Sources accepted by a converting constructor of this class.
    pub constructible_from: Vec<TypeHash>,
}

impl ClassEntry {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            converts_to: Vec::new(),
            constructible_from: Vec::new(),
        }
    }

    /// Declare `operator Target()` on this class.
    pub fn with_conversion_to(mut self, target: TypeHash) -> Self {
        self.converts_to.push(target);
        self
    }

    /// Declare a converting constructor taking `source`.
    pub fn with_converting_constructor(mut self, source: TypeHash) -> Self {
        self.constructible_from.push(source);
        self
    }

    pub fn type_hash(&self) -> TypeHash {
        TypeHash::from_name(&self.name)
    }
}

/// A registered enumeration type.
#[derive(Debug, Clone, PartialEq)]
pub struct EnumEntry {
    /// Qualified enumeration name.
    pub name: String,
    /// Scoped enumerations (`enum class`) never convert implicitly.
    pub scoped: bool,
    /// Underlying type, used when an unscoped enumeration promotes.
    pub underlying: PrimitiveKind,
}

impl EnumEntry {
    /// An unscoped enumeration with `int` underlying type.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            scoped: false,
            underlying: PrimitiveKind::Int,
        }
    }

    /// A scoped enumeration (`enum class`).
    pub fn scoped(name: impl Into<String>) -> Self {
        Self {
            scoped: true,
            ..Self::new(name)
        }
    }

    pub fn with_underlying(mut self, underlying: PrimitiveKind) -> Self {
        self.underlying = underlying;
        self
    }

    pub fn type_hash(&self) -> TypeHash {
        TypeHash::from_name(&self.name)
    }
}

/// What a type hash resolves to in the registry.
#[derive(Debug, Clone, PartialEq)]
pub enum TypeEntry {
    Primitive(PrimitiveKind),
    Class(ClassEntry),
    Enum(EnumEntry),
}

impl TypeEntry {
    pub fn name(&self) -> &str {
        match self {
            TypeEntry::Primitive(kind) => kind.name(),
            TypeEntry::Class(class) => &class.name,
            TypeEntry::Enum(entry) => &entry.name,
        }
    }

    pub fn type_hash(&self) -> TypeHash {
        match self {
            TypeEntry::Primitive(kind) => kind.type_hash(),
            TypeEntry::Class(class) => class.type_hash(),
            TypeEntry::Enum(entry) => entry.type_hash(),
        }
    }

    pub fn as_primitive(&self) -> Option<PrimitiveKind> {
        match self {
            TypeEntry::Primitive(kind) => Some(*kind),
            _ => None,
        }
    }

    pub fn as_class(&self) -> Option<&ClassEntry> {
        match self {
            TypeEntry::Class(class) => Some(class),
            _ => None,
        }
    }

    pub fn as_enum(&self) -> Option<&EnumEntry> {
        match self {
            TypeEntry::Enum(entry) => Some(entry),
            _ => None,
        }
    }

    pub fn is_class(&self) -> bool {
        matches!(self, TypeEntry::Class(_))
    }
}
