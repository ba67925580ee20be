//! Core XML parsing primitives
//!
//! This module contains the fundamental building blocks for XML parsing:
//! - Scanner: SIMD-accelerated delimiter detection using memchr
//! - UnifiedScanner: strict ScanHandler-based tokenizer feeding the index
//! - Entities: XML entity decoding with Cow (zero-copy when possible) and escaping

pub mod entities;
pub mod scanner;
pub mod unified_scanner;
