// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Entity attribute values.
//!
//! Owned, mutable counterpart of the tokens the parser produces. Every
//! forward reference an entity holds lives somewhere inside one of these
//! values, so the visitor/rewrite helpers here are the only places that
//! enumerate or edit references.

use std::fmt::Write;

/// IFC entity attribute value
#[derive(Debug, Clone, PartialEq)]
pub enum AttributeValue {
    /// Entity reference: #123
    EntityRef(u32),
    /// String value
    String(String),
    /// Integer value
    Integer(i64),
    /// Float value
    Float(f64),
    /// Enum value: .TRUE., .NOTDEFINED.
    Enum(String),
    /// List of values
    List(Vec<AttributeValue>),
    /// Wrapped measure value: IFCTEXT('-'), IFCBOOLEAN(.T.)
    /// Kept distinct from List so it round-trips through the writer.
    Typed {
        name: String,
        args: Vec<AttributeValue>,
    },
    /// Null/undefined: $
    Null,
    /// Derived value: *
    Derived,
}

impl AttributeValue {
    /// Get as entity reference
    #[inline]
    pub fn as_entity_ref(&self) -> Option<u32> {
        match self {
            AttributeValue::EntityRef(id) => Some(*id),
            _ => None,
        }
    }

    /// Get as string
    #[inline]
    pub fn as_string(&self) -> Option<&str> {
        match self {
            AttributeValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// Get as enum value (without the wrapping dots)
    #[inline]
    pub fn as_enum(&self) -> Option<&str> {
        match self {
            AttributeValue::Enum(s) => Some(s),
            _ => None,
        }
    }

    /// Get as float
    #[inline]
    pub fn as_float(&self) -> Option<f64> {
        match self {
            AttributeValue::Float(f) => Some(*f),
            AttributeValue::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    /// Get as integer
    #[inline]
    pub fn as_int(&self) -> Option<i64> {
        match self {
            AttributeValue::Integer(i) => Some(*i),
            _ => None,
        }
    }

    /// Get as list
    #[inline]
    pub fn as_list(&self) -> Option<&[AttributeValue]> {
        match self {
            AttributeValue::List(items) => Some(items),
            _ => None,
        }
    }

    /// Check if null/derived
    #[inline]
    pub fn is_null(&self) -> bool {
        matches!(self, AttributeValue::Null | AttributeValue::Derived)
    }

    /// Visit every entity reference inside this value, depth first.
    pub fn for_each_ref(&self, f: &mut impl FnMut(u32)) {
        match self {
            AttributeValue::EntityRef(id) => f(*id),
            AttributeValue::List(items) => {
                for item in items {
                    item.for_each_ref(f);
                }
            }
            AttributeValue::Typed { args, .. } => {
                for arg in args {
                    arg.for_each_ref(f);
                }
            }
            _ => {}
        }
    }

    /// Rewrite every reference to `old` so it points at `new`.
    /// Returns the number of slots rewritten.
    pub fn replace_ref(&mut self, old: u32, new: u32) -> usize {
        match self {
            AttributeValue::EntityRef(id) if *id == old => {
                *id = new;
                1
            }
            AttributeValue::List(items) => {
                items.iter_mut().map(|item| item.replace_ref(old, new)).sum()
            }
            AttributeValue::Typed { args, .. } => {
                args.iter_mut().map(|arg| arg.replace_ref(old, new)).sum()
            }
            _ => 0,
        }
    }

    /// Drop every reference to `old`: a single-value slot becomes `$`, a
    /// list slot loses the element. Returns the number of slots detached.
    pub fn detach_ref(&mut self, old: u32) -> usize {
        match self {
            AttributeValue::EntityRef(id) if *id == old => {
                *self = AttributeValue::Null;
                1
            }
            AttributeValue::List(items) => {
                let before = items.len();
                items.retain(|item| item.as_entity_ref() != Some(old));
                let mut detached = before - items.len();
                for item in items.iter_mut() {
                    detached += item.detach_ref(old);
                }
                detached
            }
            AttributeValue::Typed { args, .. } => {
                args.iter_mut().map(|arg| arg.detach_ref(old)).sum()
            }
            _ => 0,
        }
    }

    /// Serialize this value in STEP physical-file notation.
    pub fn write_step(&self, out: &mut String) {
        match self {
            AttributeValue::EntityRef(id) => {
                let _ = write!(out, "#{}", id);
            }
            AttributeValue::String(s) => {
                out.push('\'');
                for c in s.chars() {
                    // STEP escapes a quote by doubling it
                    if c == '\'' {
                        out.push('\'');
                    }
                    out.push(c);
                }
                out.push('\'');
            }
            AttributeValue::Integer(i) => {
                let _ = write!(out, "{}", i);
            }
            AttributeValue::Float(f) => {
                out.push_str(&format_step_float(*f));
            }
            AttributeValue::Enum(e) => {
                let _ = write!(out, ".{}.", e);
            }
            AttributeValue::List(items) => {
                out.push('(');
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        out.push(',');
                    }
                    item.write_step(out);
                }
                out.push(')');
            }
            AttributeValue::Typed { name, args } => {
                out.push_str(name);
                out.push('(');
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        out.push(',');
                    }
                    arg.write_step(out);
                }
                out.push(')');
            }
            AttributeValue::Null => out.push('$'),
            AttributeValue::Derived => out.push('*'),
        }
    }
}

/// Format a float in STEP notation: shortest representation that still
/// carries a decimal point (`0.`, `3.14`, `1.5e-10`).
pub fn format_step_float(value: f64) -> String {
    let mut s = format!("{}", value);
    if !s.contains('.') && !s.contains('e') && !s.contains('E') && !s.contains("inf") && !s.contains("NaN") {
        s.push('.');
    }
    s
}
