use std::{
    convert::TryInto,
    io::{self, Error, ErrorKind, Write},
};

pub const OPTION_NONE: u8 = 0;
pub const OPTION_SOME: u8 = 1;

/// Writes the presence flag, then the value bytes only if present
pub fn pack_option<T, W: Write, const N: usize>(
    opt: &Option<T>,
    dst: &mut W,
    build_fn: impl FnOnce(&T) -> [u8; N],
) -> io::Result<()> {
    match opt {
        Some(val) => {
            dst.write_all(&[OPTION_SOME])?;
            dst.write_all(&build_fn(val))
        }
        None => dst.write_all(&[OPTION_NONE]),
    }
}

/// Reads a presence flag and, if set, the next `N` value bytes, advancing `src`
pub fn unpack_option<T, const N: usize>(
    src: &mut &[u8],
    build_fn: impl FnOnce([u8; N]) -> T,
) -> io::Result<Option<T>> {
    let tag = unpack_u8(src)?;

    Ok(match tag {
        OPTION_NONE => None,
        OPTION_SOME => Some(build_fn(unpack_array(src)?)),
        _ => {
            return Err(Error::new(
                ErrorKind::InvalidData,
                format!("invalid presence flag {}", tag),
            ))
        }
    })
}

pub fn unpack_u8(src: &mut &[u8]) -> io::Result<u8> {
    let [byte] = unpack_array::<1>(src)?;
    Ok(byte)
}

fn unpack_array<const N: usize>(src: &mut &[u8]) -> io::Result<[u8; N]> {
    if src.len() < N {
        return Err(Error::new(
            ErrorKind::UnexpectedEof,
            format!("expected {} bytes, found {}", N, src.len()),
        ));
    }
    let (bytes, rest) = src.split_at(N);
    *src = rest;
    bytes
        .try_into()
        .map_err(|_| Error::new(ErrorKind::InvalidData, "slice length mismatch"))
}
