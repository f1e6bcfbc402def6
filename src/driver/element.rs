//! Primitive types a channel can move in a memory copy

use super::config::DataWidth;

mod private {
    pub trait Sealed {}
}

/// A fixed-width element that maps onto one XDMAC data unit.
pub trait Element: Copy + private::Sealed {
    /// Data width of one element
    const WIDTH: DataWidth;
}

macro_rules! element {
    ($($ty:ty => $width:expr),* $(,)?) => {
        $(
            impl private::Sealed for $ty {}
            impl Element for $ty {
                const WIDTH: DataWidth = $width;
            }
        )*
    };
}

element!(
    u8 => DataWidth::Byte,
    i8 => DataWidth::Byte,
    u16 => DataWidth::HalfWord,
    i16 => DataWidth::HalfWord,
    u32 => DataWidth::Word,
    i32 => DataWidth::Word,
);
