//! Histogram-based entropy.

/// Per-byte-value occurrence counts.
#[inline]
pub fn byte_histogram(data: &[u8]) -> [usize; 256] {
    let mut histogram = [0usize; 256];
    for &byte in data {
        histogram[byte as usize] += 1;
    }
    histogram
}

/// Shannon entropy in bits per byte, `H = -sum(p * log2 p)`, always in
/// `[0, 8]`. Empty input yields 0.0.
#[inline]
pub fn shannon_entropy(data: &[u8]) -> f64 {
    entropy_from_histogram(&byte_histogram(data), data.len())
}

/// Entropy of a histogram whose counts sum to `total`.
pub fn entropy_from_histogram(histogram: &[usize; 256], total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    let total = total as f64;
    let h: f64 = histogram
        .iter()
        .filter(|&&count| count > 0)
        .map(|&count| {
            let p = count as f64 / total;
            -p * p.log2()
        })
        .sum();
    // a single symbol yields -0.0
    if h <= 0.0 {
        0.0
    } else {
        h.min(8.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shannon_entropy_empty() {
        assert_eq!(shannon_entropy(b""), 0.0);
    }

    #[test]
    fn test_shannon_entropy_repeated_byte() {
        let data = vec![0x41u8; 1024];
        assert_eq!(shannon_entropy(&data), 0.0);
    }

    #[test]
    fn test_shannon_entropy_uniform() {
        let data: Vec<u8> = (0..=255).collect();
        assert!((shannon_entropy(&data) - 8.0).abs() < 1e-9);

        let data: Vec<u8> = (0..=255).cycle().take(256 * 100).collect();
        assert!((shannon_entropy(&data) - 8.0).abs() < 1e-9);
    }

    #[test]
    fn test_two_symbols_is_one_bit() {
        assert!((shannon_entropy(b"ABABABAB") - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_entropy_stays_in_domain() {
        let samples: [&[u8]; 4] = [b"a", b"hello world", &[0, 255, 0, 255, 7], &[1; 3]];
        for s in samples {
            let h = shannon_entropy(s);
            assert!((0.0..=8.0).contains(&h), "{h} out of range");
        }
    }

    #[test]
    fn test_histogram_counts() {
        let hist = byte_histogram(b"AAB");
        assert_eq!(hist[b'A' as usize], 2);
        assert_eq!(hist[b'B' as usize], 1);
        assert_eq!(hist.iter().sum::<usize>(), 3);
    }
}
