use bytes::Bytes;

use crate::reader::ReadError;

/// Fallible companion to [`bytes::Buf`]. The plain getters panic when the
/// buffer runs dry, which turns a truncated class file into a crash instead
/// of a parse error.
pub trait SafeBuf: bytes::Buf {
    fn try_take_bytes(&mut self, count: usize) -> Result<Bytes, ReadError>;

    fn try_get_u8(&mut self) -> Result<u8, ReadError>;
    fn try_get_i8(&mut self) -> Result<i8, ReadError>;
    fn try_get_u16(&mut self) -> Result<u16, ReadError>;
    fn try_get_i16(&mut self) -> Result<i16, ReadError>;
    fn try_get_u32(&mut self) -> Result<u32, ReadError>;
    fn try_get_i32(&mut self) -> Result<i32, ReadError>;
    fn try_get_u64(&mut self) -> Result<u64, ReadError>;
    fn try_get_i64(&mut self) -> Result<i64, ReadError>;
    fn try_get_f32(&mut self) -> Result<f32, ReadError>;
    fn try_get_f64(&mut self) -> Result<f64, ReadError>;
}

macro_rules! safe_get {
    ($name: ident, $get: ident, $ty: ty) => {
        fn $name(&mut self) -> Result<$ty, ReadError> {
            let wanted = std::mem::size_of::<$ty>();
            let remaining = bytes::Buf::remaining(self);
            if remaining < wanted {
                return Err(ReadError::Overflow { wanted, remaining });
            }

            // All multi-byte reads are big-endian, matching the class-file wire order
            Ok(bytes::Buf::$get(self))
        }
    };
}

impl<B: bytes::Buf> SafeBuf for B {
    fn try_take_bytes(&mut self, count: usize) -> Result<Bytes, ReadError> {
        let remaining = bytes::Buf::remaining(self);
        if remaining < count {
            return Err(ReadError::Overflow {
                wanted: count,
                remaining,
            });
        }

        Ok(bytes::Buf::copy_to_bytes(self, count))
    }

    safe_get!(try_get_u8, get_u8, u8);
    safe_get!(try_get_i8, get_i8, i8);
    safe_get!(try_get_u16, get_u16, u16);
    safe_get!(try_get_i16, get_i16, i16);
    safe_get!(try_get_u32, get_u32, u32);
    safe_get!(try_get_i32, get_i32, i32);
    safe_get!(try_get_u64, get_u64, u64);
    safe_get!(try_get_i64, get_i64, i64);
    safe_get!(try_get_f32, get_f32, f32);
    safe_get!(try_get_f64, get_f64, f64);
}
