//! Queue elements

use std::fmt;

/// An element detached from a queue.
///
/// Returned by [`remove_head`](crate::QueueStorage::remove_head) and
/// [`remove_tail`](crate::QueueStorage::remove_tail); the caller owns it and
/// dropping it releases the string.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Element {
    value: String,
}

impl Element {
    pub(crate) fn new(value: String) -> Self {
        Element { value }
    }

    /// The element's value.
    #[inline]
    pub fn value(&self) -> &str {
        &self.value
    }

    /// Consumes the element, handing over its string.
    #[inline]
    pub fn into_value(self) -> String {
        self.value
    }
}

impl fmt::Debug for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Element").field(&self.value).finish()
    }
}

impl AsRef<str> for Element {
    fn as_ref(&self) -> &str {
        &self.value
    }
}

/// Copies `value` into a C-style bounded buffer.
///
/// At most `buf.len() - 1` bytes are copied, followed by a NUL. Longer values
/// are truncated silently. A zero-length buffer is left untouched.
pub(crate) fn copy_out(value: &str, buf: &mut [u8]) {
    let Some(cap) = buf.len().checked_sub(1) else {
        return;
    };
    let n = value.len().min(cap);
    buf[..n].copy_from_slice(&value.as_bytes()[..n]);
    buf[n] = 0;
}
