//! Scalar text for host numbers.
//!
//! Integers are written in base 10. Floats use the shortest text that reads
//! back to the same value, with YAML's `.nan`, `.inf` and `-.inf` for the
//! non-finite ones. Complex numbers are written as `re + imim`.

use alloc::{format, string::String};

/// Types that have a canonical scalar text.
pub trait ScalarText {
    /// The scalar text for `self`.
    fn to_scalar_text(&self) -> String;
}

macro_rules! integer_scalar_text {
    ($($ty:ty),*) => {
        $(
            impl ScalarText for $ty {
                fn to_scalar_text(&self) -> String {
                    format!("{self}")
                }
            }
        )*
    };
}

integer_scalar_text!(i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize);

fn float_text(value: f64) -> String {
    if value.is_nan() {
        String::from(".nan")
    } else if value.is_infinite() {
        String::from(if value > 0.0 { ".inf" } else { "-.inf" })
    } else {
        // `Debug` is the shortest round-trip form and switches to exponent
        // notation for very large and very small magnitudes.
        format!("{value:?}")
    }
}

impl ScalarText for f64 {
    fn to_scalar_text(&self) -> String {
        float_text(*self)
    }
}

impl ScalarText for f32 {
    fn to_scalar_text(&self) -> String {
        if self.is_finite() {
            format!("{self:?}")
        } else {
            float_text(f64::from(*self))
        }
    }
}

/// A complex number, written as `re + imim`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Complex {
    /// Real part.
    pub re: f64,
    /// Imaginary part.
    pub im: f64,
}

impl ScalarText for Complex {
    fn to_scalar_text(&self) -> String {
        let sign = if self.im.is_sign_negative() && !self.im.is_nan() {
            '-'
        } else {
            '+'
        };
        format!(
            "{} {sign} {}im",
            float_text(self.re),
            float_text(self.im.abs())
        )
    }
}
