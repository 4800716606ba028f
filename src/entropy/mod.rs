//! Entropy calculation primitives.
//!
//! Shannon entropy over a 256-bin byte histogram, shared by the obfuscation
//! analyzer and the memoized `BinaryImage::entropy`.

pub mod core;

pub use self::core::{byte_histogram, entropy_from_histogram, shannon_entropy};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mixed_content_is_between_extremes() {
        let mut data = vec![0u8; 1024];
        data.extend((0..=255u8).cycle().take(1024));
        let h = shannon_entropy(&data);
        assert!(h > 3.0 && h < 6.0);
    }
}
