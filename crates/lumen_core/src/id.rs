//! Mailbox names for shared images
//!
//! A mailbox is the name a shared image is registered under so that other
//! consumers can refer to the same GPU resource. Names are 64 bits: the
//! upper half identifies the client namespace, the lower half a per-client
//! index.

use core::fmt;
use core::sync::atomic::{AtomicU32, Ordering};
use serde::{Deserialize, Serialize};

/// Shared image name
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Mailbox {
    bits: u64,
}

impl Mailbox {
    /// Build a mailbox from a client namespace and a per-client index
    #[inline]
    pub const fn new(namespace: u32, index: u32) -> Self {
        Self {
            bits: (namespace as u64) << 32 | index as u64,
        }
    }

    /// The zero mailbox, never handed out by a generator
    #[inline]
    pub const fn zero() -> Self {
        Self { bits: 0 }
    }

    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.bits == 0
    }

    /// Client namespace portion
    #[inline]
    pub const fn namespace(&self) -> u32 {
        (self.bits >> 32) as u32
    }

    /// Per-client index portion
    #[inline]
    pub const fn index(&self) -> u32 {
        self.bits as u32
    }

    #[inline]
    pub const fn to_bits(&self) -> u64 {
        self.bits
    }

    #[inline]
    pub const fn from_bits(bits: u64) -> Self {
        Self { bits }
    }

    /// Derive a stable mailbox from a debug name (FNV-1a).
    ///
    /// Useful for fixtures and tools that need reproducible names.
    pub fn from_name(name: &str) -> Self {
        let mut hash = 0xcbf29ce484222325u64;
        for byte in name.bytes() {
            hash ^= byte as u64;
            hash = hash.wrapping_mul(0x100000001b3);
        }
        // Zero is reserved
        Self { bits: hash.max(1) }
    }
}

impl fmt::Debug for Mailbox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_zero() {
            write!(f, "Mailbox(zero)")
        } else {
            write!(f, "Mailbox({:08x}:{:08x})", self.namespace(), self.index())
        }
    }
}

impl fmt::Display for Mailbox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:016x}", self.bits)
    }
}

/// Thread-safe mailbox generator for one client namespace
pub struct MailboxGenerator {
    namespace: u32,
    next: AtomicU32,
}

impl MailboxGenerator {
    pub const fn new(namespace: u32) -> Self {
        Self {
            namespace,
            // Index 0 in namespace 0 would collide with the zero mailbox
            next: AtomicU32::new(1),
        }
    }

    /// Generate the next mailbox in this namespace
    pub fn generate(&self) -> Mailbox {
        let index = self.next.fetch_add(1, Ordering::Relaxed);
        Mailbox::new(self.namespace, index)
    }

    pub fn namespace(&self) -> u32 {
        self.namespace
    }
}
