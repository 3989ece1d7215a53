//! Windows cursors. `imagesize` only knows the icon variant of this
//! container, so the directory is read here.

use super::{dimensions, Detection, ImageFormat, SniffError};

const SIGNATURE: [u8; 4] = [0, 0, 2, 0];
const ENTRY_LEN: usize = 16;

/// Stored as one byte each; 0 stands for 256.
fn side(b: u8) -> u32 {
    if b == 0 {
        256
    } else {
        u32::from(b)
    }
}

/// Reports the largest directory entry, like `imagesize` does for icons.
pub(crate) fn detect(bytes: &[u8]) -> Detection {
    if bytes.get(..4)? != SIGNATURE {
        return None;
    }
    let format = ImageFormat::Cur;
    let count = match bytes.get(4..6) {
        Some(c) => u16::from_le_bytes([c[0], c[1]]) as usize,
        None => return Some(Err(SniffError::Truncated { format })),
    };
    if count == 0 {
        return Some(Err(SniffError::Malformed {
            format,
            reason: "empty directory",
        }));
    }

    let largest = bytes[6..]
        .chunks_exact(ENTRY_LEN)
        .take(count)
        .map(|e| (side(e[0]), side(e[1])))
        .max_by_key(|&(w, h)| u64::from(w) * u64::from(h));
    Some(match largest {
        Some((w, h)) => dimensions(format, w, h),
        None => Err(SniffError::Truncated { format }),
    })
}
