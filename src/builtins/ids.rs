// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use crate::ast::{Ref, Term};
use crate::builtins::{arrays, objects, strings, time, BuiltinFcn};
use crate::types::Type;

macro_rules! builtins {
    ($( $variant:ident => {
        name: $name:literal,
        params: [$( $param:expr ),* $(,)?],
        required: $required:expr,
        returns: $returns:expr,
        eval: $eval:path
    } ),* $(,)?) => {
        /// Built-in function identifier.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
        pub enum Builtin {
            $( $variant, )*
        }

        impl Builtin {
            pub const ALL: &'static [Builtin] = &[ $( Builtin::$variant, )* ];

            pub const fn name(self) -> &'static str {
                match self {
                    $( Self::$variant => $name, )*
                }
            }

            /// Declared type of every parameter, optional ones included.
            pub fn parameter_types(self) -> Vec<Type> {
                match self {
                    $( Self::$variant => vec![$( $param ),*], )*
                }
            }

            /// Number of leading parameters that must be supplied.
            pub const fn required_args(self) -> usize {
                match self {
                    $( Self::$variant => $required, )*
                }
            }

            pub fn return_type(self) -> Type {
                match self {
                    $( Self::$variant => $returns, )*
                }
            }

            pub(crate) fn evaluator(self) -> BuiltinFcn {
                match self {
                    $( Self::$variant => $eval, )*
                }
            }
        }
    };
}

builtins! {
    ArrayLength => {
        name: "arrays.length",
        params: [Type::array_of(Type::Any)],
        required: 1,
        returns: Type::Number,
        eval: arrays::length
    },
    ArrayIndex => {
        name: "arrays.index",
        params: [Type::array_of(Type::Any), Type::Number],
        required: 2,
        returns: Type::Any,
        eval: arrays::index
    },
    ArraySuperSet => {
        name: "arrays.superSet",
        params: [Type::array_of(Type::Any), Type::array_of(Type::Any)],
        required: 2,
        returns: Type::Boolean,
        eval: arrays::super_set
    },
    StringLength => {
        name: "string.length",
        params: [Type::String],
        required: 1,
        returns: Type::Number,
        eval: strings::length
    },
    StringEquals => {
        name: "string.equals",
        params: [Type::String, Type::String],
        required: 2,
        returns: Type::Boolean,
        eval: strings::equals
    },
    SubString => {
        name: "string.subString",
        params: [Type::String, Type::String],
        required: 2,
        returns: Type::Boolean,
        eval: strings::sub_string
    },
    IsNumeric => {
        name: "string.isNumeric",
        params: [Type::String],
        required: 1,
        returns: Type::Boolean,
        eval: strings::is_numeric
    },
    IsUrl => {
        name: "string.isUrl",
        params: [Type::String],
        required: 1,
        returns: Type::Boolean,
        eval: strings::is_url
    },
    MatchesRegex => {
        name: "string.matchesRegex",
        params: [Type::String, Type::String],
        required: 2,
        returns: Type::Boolean,
        eval: strings::matches_regex
    },
    IsEmail => {
        name: "string.isEmail",
        params: [Type::String],
        required: 1,
        returns: Type::Boolean,
        eval: strings::is_email
    },
    IsDate => {
        name: "string.isDate",
        params: [Type::String, Type::array_of(Type::String)],
        required: 1,
        returns: Type::Boolean,
        eval: time::is_date
    },
    IsDateTime => {
        name: "string.isDateTime",
        params: [Type::String, Type::array_of(Type::String)],
        required: 1,
        returns: Type::Boolean,
        eval: time::is_date_time
    },
    IsHour => {
        name: "string.isHour",
        params: [Type::String, Type::array_of(Type::String)],
        required: 1,
        returns: Type::Boolean,
        eval: time::is_hour
    },
    ObjectReference => {
        name: "objects.reference",
        params: [Type::Complex, Type::String],
        required: 2,
        returns: Type::Any,
        eval: objects::reference
    },
}

impl Builtin {
    /// Whether a call with these arguments can be constructed.
    pub fn accepts(self, args: &[Ref<Term>]) -> bool {
        let params = self.parameter_types();
        if args.len() < self.required_args() || args.len() > params.len() {
            return false;
        }
        match self {
            // The pattern and the member path must be known up front.
            Builtin::MatchesRegex | Builtin::ObjectReference => args[1].as_str().is_some(),
            _ => true,
        }
    }
}
