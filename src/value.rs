//! Conversion of placeholder arguments to text
//!
//! The conversion table is part of the line format, so it is fixed:
//!
//! | value                          | rendered as                               |
//! |--------------------------------|-------------------------------------------|
//! | `bool`                         | `true` / `false`                          |
//! | `i8`..`i128`, `u8`..`u128`     | decimal, no padding                       |
//! | `f32`, `f64`                   | shortest round-trip decimal, no exponent  |
//! | `str`, `String`, `char`        | verbatim                                  |
//! | `[u8]`, `Vec<u8>`              | raw bytes, not escaped                    |
//! | [`Shown`]                      | its `Display` output                      |

use std::fmt;
use std::io::Write;

/// A value that can fill a `?` placeholder
pub trait LogValue {
    /// Append the text form of this value to `out`
    fn write_to(&self, out: &mut Vec<u8>);
}

impl<T: LogValue + ?Sized> LogValue for &T {
    fn write_to(&self, out: &mut Vec<u8>) {
        (**self).write_to(out)
    }
}

impl LogValue for bool {
    fn write_to(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(if *self { b"true" } else { b"false" });
    }
}

macro_rules! decimal_value {
    ($($ty:ty),*) => {
        $(
            impl LogValue for $ty {
                fn write_to(&self, out: &mut Vec<u8>) {
                    // Writing into a Vec cannot fail
                    let _ = write!(out, "{}", self);
                }
            }
        )*
    };
}

decimal_value!(i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize);

macro_rules! float_value {
    ($($ty:ty),*) => {
        $(
            impl LogValue for $ty {
                fn write_to(&self, out: &mut Vec<u8>) {
                    if self.is_infinite() {
                        let text: &[u8] = if self.is_sign_positive() { b"+Inf" } else { b"-Inf" };
                        out.extend_from_slice(text);
                    } else {
                        // Display is the shortest repr that round-trips at this width
                        let _ = write!(out, "{}", self);
                    }
                }
            }
        )*
    };
}

float_value!(f32, f64);

impl LogValue for str {
    fn write_to(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(self.as_bytes());
    }
}

impl LogValue for String {
    fn write_to(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(self.as_bytes());
    }
}

impl LogValue for char {
    fn write_to(&self, out: &mut Vec<u8>) {
        let mut utf8 = [0u8; 4];
        out.extend_from_slice(self.encode_utf8(&mut utf8).as_bytes());
    }
}

impl LogValue for [u8] {
    fn write_to(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(self);
    }
}

impl LogValue for Vec<u8> {
    fn write_to(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(self);
    }
}

/// Fallback for any other type: renders through `Display`
///
/// ```
/// use levelog::{LogValue, Shown};
///
/// let addr: std::net::IpAddr = "127.0.0.1".parse().unwrap();
/// let mut out = Vec::new();
/// Shown(addr).write_to(&mut out);
/// assert_eq!(out, b"127.0.0.1");
/// ```
#[derive(Debug, Clone, Copy)]
pub struct Shown<T>(pub T);

impl<T: fmt::Display> LogValue for Shown<T> {
    fn write_to(&self, out: &mut Vec<u8>) {
        let _ = write!(out, "{}", self.0);
    }
}

/// Render a single value to a `String`, lossily for non-UTF-8 bytes
#[cfg(test)]
fn to_text(value: &dyn LogValue) -> String {
    let mut out = Vec::new();
    value.write_to(&mut out);
    String::from_utf8_lossy(&out).into_owned()
}
